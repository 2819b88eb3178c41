//! # dirlist
//!
//! Directory listing generation for a static file server. Given a request
//! whose path maps to a directory, produce an HTML page listing that
//! directory's contents; otherwise step aside so the next handler in the
//! pipeline can serve the request.
//!
//! # Request Flow
//!
//! ```text
//! Exchange ──▶ DirList::handle
//!                 │ method / already handled / unmapped?      → Pass
//!                 │ StatCache::get_dirlist
//!                 │    pending                                → Suspend
//!                 │    missing / not a directory              → Pass
//!                 │    unreadable                             → 403
//!                 │ no trailing slash                         → 301
//!                 │ ETag / Last-Modified fresh                → 304
//!                 ▼
//!              classify ──▶ render_listing ──▶ Response::body (ChunkQueue)
//! ```
//!
//! Nothing is written to the response before the stat cache has answered,
//! so a suspended request can be re-run from the top any number of times.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`generate`] | The [`DirList`](generate::DirList) handler and its outcomes |
//! | [`filter`] | Which entries are shown, and whether `HEADER.txt` / `README.txt` get spliced in |
//! | [`render`] | XHTML page assembly and escaping |
//! | [`include`] | Reading or streaming `HEADER.txt` / `README.txt` |
//! | [`format`] | Human-readable sizes and timestamps |
//! | [`config`] | [`ListingConfig`](config::ListingConfig): option pairs and TOML loading |
//! | [`stat_cache`] | The stat cache seam and a filesystem-backed implementation |
//! | [`etag`] | Conditional request validators |
//! | [`mime`] | MIME type lookup for the Type column |
//! | [`http`] | Minimal request/response model and the chunked body queue |
//! | [`types`] | Snapshot types shared between the cache and the generator |
//! | [`output`] | CLI summary of a generation outcome |
//!
//! # Design Decisions
//!
//! ## Fixed Markup
//!
//! The page is old-school XHTML 1.0 Transitional with a handful of ids and
//! classes (`#dirlist`, `td.size`, `val="..."` sort keys). Existing
//! stylesheets and sorting scripts depend on exactly that markup, so it is
//! reproduced byte for byte rather than modernised.
//!
//! ## The Host Owns I/O
//!
//! The generator never stats anything itself and never writes to a socket.
//! Directory metadata comes through [`StatCache`](stat_cache::StatCache) and
//! the body goes into a [`ChunkQueue`](http::ChunkQueue), which may hold open
//! files for the transport to send. A server embeds `DirList` with its own
//! cache and transport; the `dirlist` binary uses
//! [`FsStatCache`](stat_cache::FsStatCache) and stdout.
//!
//! ## Configuration Is Validated Once
//!
//! Options arrive as loosely typed `(key, value)` pairs and are checked when
//! the handler is built. Requests only ever see the resulting typed struct.

use std::sync::OnceLock;

pub mod config;
pub mod etag;
pub mod filter;
pub mod format;
pub mod generate;
pub mod http;
pub mod include;
pub mod mime;
pub mod output;
pub mod render;
pub mod stat_cache;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;

/// Version string: the package version on release tags, `dev@{git hash}`
/// otherwise.
pub fn version_string() -> &'static str {
    static VERSION: OnceLock<String> = OnceLock::new();
    VERSION.get_or_init(|| {
        if env!("ON_RELEASE_TAG") == "true" {
            return env!("CARGO_PKG_VERSION").to_string();
        }
        match env!("GIT_HASH") {
            "" => "dev@unknown".to_string(),
            hash => format!("dev@{hash}"),
        }
    })
}

/// Default footer text, e.g. `dirlist/0.3.0`.
pub fn default_server_tag() -> String {
    format!("dirlist/{}", version_string())
}
