//! Listing configuration.
//!
//! A [`ListingConfig`] is built once, when the listing action is set up, and
//! shared read-only by every request that action serves. It can be built two
//! ways, both going through the same validator:
//!
//! - [`ListingConfig::from_options`]: an ordered list of `(key, value)` pairs,
//!   the shape a host server's config syntax hands over.
//! - [`load_config`]: a TOML file whose top-level keys are the option names.
//!
//! ## Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! # sort = "name"                  # accepted, not implemented (logs a warning)
//! # css = "/style/dirlist.css"     # external stylesheet instead of the built-in one
//!
//! hide-dotfiles = true             # hide entries beginning with "."
//! hide-tildefiles = true           # hide entries ending with "~"
//! hide-directories = false         # list files only
//!
//! include-header = false           # show HEADER.txt above the listing
//! hide-header = false              # drop HEADER.txt from the table
//! encode-header = true             # false if HEADER.txt holds real HTML
//!
//! include-readme = true            # show README.txt below the listing
//! hide-readme = false              # drop README.txt from the table
//! encode-readme = true             # false if README.txt holds real HTML
//!
//! exclude-suffix = []              # hide entries ending with any of these
//! exclude-prefix = []              # hide entries beginning with any of these
//!
//! debug = false                    # log every listing generated
//! content-type = "text/html; charset=utf-8"
//! ```
//!
//! Unknown keys and mistyped values reject the whole configuration.

use serde::Serialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("unknown option \"{0}\"")]
    UnknownOption(String),
    #[error("option \"{key}\" must be {expected}")]
    InvalidType { key: String, expected: &'static str },
}

/// A loosely typed option value as supplied by the host's config syntax.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    String(String),
    Bool(bool),
    List(Vec<OptionValue>),
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::String(s.to_string())
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl<const N: usize> From<[&str; N]> for OptionValue {
    fn from(items: [&str; N]) -> Self {
        OptionValue::List(items.into_iter().map(OptionValue::from).collect())
    }
}

impl TryFrom<toml::Value> for OptionValue {
    type Error = toml::Value;

    fn try_from(value: toml::Value) -> Result<Self, Self::Error> {
        match value {
            toml::Value::String(s) => Ok(OptionValue::String(s)),
            toml::Value::Boolean(b) => Ok(OptionValue::Bool(b)),
            toml::Value::Array(items) => items
                .into_iter()
                .map(OptionValue::try_from)
                .collect::<Result<_, _>>()
                .map(OptionValue::List),
            other => Err(other),
        }
    }
}

pub const DEFAULT_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Validated listing options.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ListingConfig {
    /// Requested sort criterion. Accepted but not applied: entries keep the
    /// order the stat cache returned them in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    /// External stylesheet URL; replaces the built-in stylesheet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub css: Option<String>,
    pub hide_dotfiles: bool,
    pub hide_tildefiles: bool,
    pub hide_directories: bool,
    pub include_header: bool,
    pub hide_header: bool,
    pub encode_header: bool,
    pub include_readme: bool,
    pub hide_readme: bool,
    pub encode_readme: bool,
    pub exclude_suffix: Vec<String>,
    pub exclude_prefix: Vec<String>,
    pub debug: bool,
    pub content_type: String,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            sort: None,
            css: None,
            hide_dotfiles: true,
            hide_tildefiles: true,
            hide_directories: false,
            include_header: false,
            hide_header: false,
            encode_header: true,
            include_readme: true,
            hide_readme: false,
            encode_readme: true,
            exclude_suffix: Vec::new(),
            exclude_prefix: Vec::new(),
            debug: false,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
        }
    }
}

impl ListingConfig {
    /// Build a configuration from `(key, value)` pairs, applied in order on
    /// top of the defaults.
    ///
    /// Scalar options overwrite earlier occurrences; `exclude-suffix` and
    /// `exclude-prefix` accumulate.
    pub fn from_options<K: AsRef<str>>(
        options: &[(K, OptionValue)],
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        for (key, value) in options {
            config.apply(key.as_ref(), value)?;
        }
        Ok(config)
    }

    fn apply(&mut self, key: &str, value: &OptionValue) -> Result<(), ConfigError> {
        match key {
            "sort" => {
                let criterion = expect_string(key, value)?;
                tracing::warn!(sort = %criterion, "dirlist: sort parameter not supported yet");
                self.sort = Some(criterion);
            }
            "css" => self.css = Some(expect_string(key, value)?),
            "hide-dotfiles" => self.hide_dotfiles = expect_bool(key, value)?,
            "hide-tildefiles" => self.hide_tildefiles = expect_bool(key, value)?,
            "hide-directories" => self.hide_directories = expect_bool(key, value)?,
            "include-header" => self.include_header = expect_bool(key, value)?,
            "hide-header" => self.hide_header = expect_bool(key, value)?,
            "encode-header" => self.encode_header = expect_bool(key, value)?,
            "include-readme" => self.include_readme = expect_bool(key, value)?,
            "hide-readme" => self.hide_readme = expect_bool(key, value)?,
            "encode-readme" => self.encode_readme = expect_bool(key, value)?,
            "exclude-suffix" => self.exclude_suffix.extend(expect_string_list(key, value)?),
            "exclude-prefix" => self.exclude_prefix.extend(expect_string_list(key, value)?),
            "debug" => self.debug = expect_bool(key, value)?,
            "content-type" => self.content_type = expect_string(key, value)?,
            _ => return Err(ConfigError::UnknownOption(key.to_string())),
        }
        Ok(())
    }
}

fn expect_string(key: &str, value: &OptionValue) -> Result<String, ConfigError> {
    match value {
        OptionValue::String(s) => Ok(s.clone()),
        _ => Err(invalid_type(key, "a string")),
    }
}

fn expect_bool(key: &str, value: &OptionValue) -> Result<bool, ConfigError> {
    match value {
        OptionValue::Bool(b) => Ok(*b),
        _ => Err(invalid_type(key, "a boolean (true or false)")),
    }
}

fn expect_string_list(key: &str, value: &OptionValue) -> Result<Vec<String>, ConfigError> {
    let OptionValue::List(items) = value else {
        return Err(invalid_type(key, "a list of strings"));
    };
    items
        .iter()
        .map(|item| match item {
            OptionValue::String(s) => Ok(s.clone()),
            _ => Err(invalid_type(key, "a list of strings")),
        })
        .collect()
}

fn invalid_type(key: &str, expected: &'static str) -> ConfigError {
    ConfigError::InvalidType {
        key: key.to_string(),
        expected,
    }
}

/// Parse TOML text into a configuration.
pub fn parse_config(content: &str) -> Result<ListingConfig, ConfigError> {
    let table: toml::Table = toml::from_str(content)?;
    let mut options = Vec::with_capacity(table.len());
    for (key, value) in table {
        let value = OptionValue::try_from(value).map_err(|_| {
            invalid_type(&key, "a string, a boolean or a list of strings")
        })?;
        options.push((key, value));
    }
    ListingConfig::from_options(&options)
}

/// Load a configuration file.
///
/// `None` yields the defaults.
pub fn load_config(path: Option<&Path>) -> Result<ListingConfig, ConfigError> {
    match path {
        Some(path) => parse_config(&fs::read_to_string(path)?),
        None => Ok(ListingConfig::default()),
    }
}

/// Returns a fully-commented stock configuration file.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# dirlist configuration
# =====================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Sort criterion ("name", "size" or "type"). Accepted but not implemented:
# entries are listed in the order the filesystem returns them.
# sort = "name"

# External stylesheet. When set, the built-in stylesheet is not emitted.
# css = "/style/dirlist.css"

# ---------------------------------------------------------------------------
# Hiding entries
# ---------------------------------------------------------------------------
# Hide entries beginning with a dot.
hide-dotfiles = true

# Hide entries ending with a tilde (~), often used for backups.
hide-tildefiles = true

# Hide directories from the listing.
hide-directories = false

# Hide entries ending with one of these strings.
exclude-suffix = []

# Hide entries beginning with one of these strings.
exclude-prefix = []

# ---------------------------------------------------------------------------
# HEADER.txt (shown above the listing)
# ---------------------------------------------------------------------------
include-header = false
hide-header = false
# Set to false if HEADER.txt contains real HTML.
encode-header = true

# ---------------------------------------------------------------------------
# README.txt (shown below the listing)
# ---------------------------------------------------------------------------
include-readme = true
hide-readme = false
# Set to false if README.txt contains real HTML.
encode-readme = true

# ---------------------------------------------------------------------------
# Misc
# ---------------------------------------------------------------------------
# Log every generated listing.
debug = false

content-type = "text/html; charset=utf-8"
"##
}
