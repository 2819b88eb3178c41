//! The listing handler.
//!
//! [`DirList`] is one stage of a request pipeline. It looks at an
//! [`Exchange`] and either answers it or passes it on:
//!
//! | Situation | Outcome | Response |
//! |-----------|---------|----------|
//! | not GET/HEAD, already answered, no physical path | `Pass` | untouched |
//! | stat cache not ready | `Suspend` | untouched |
//! | path missing or not a directory | `Pass` | untouched |
//! | directory unreadable | `Handled(Forbidden)` | 403 |
//! | other stat failure, broken cache | `Error` | untouched |
//! | directory, no trailing slash | `Handled(Redirect)` | 301 + `Location` |
//! | directory, client copy fresh | `Handled(NotModified)` | 304, no body |
//! | directory | `Handled(Listing)` | 200 + HTML body |
//!
//! `Suspend` means "call me again with the same exchange later". Everything
//! before the stat cache answers is read-only, so re-running is harmless.

use crate::config::ListingConfig;
use crate::etag;
use crate::filter::classify;
use crate::http::{Exchange, Method, Request};
use crate::mime::{GuessMime, MimeLookup};
use crate::render::{self, render_listing};
use crate::stat_cache::{Lookup, StatCache, StatCacheError};
use crate::types::StatError;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("stat cache error: {0}")]
    StatCache(#[from] StatCacheError),
    #[error("stat of {} failed: {source}", path.display())]
    Metadata { path: PathBuf, source: StatError },
    #[error("response already handled by another stage")]
    AlreadyHandled,
}

/// How a handled request was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Listing,
    NotModified,
    Redirect,
    Forbidden,
}

#[derive(Debug)]
pub enum Outcome {
    /// Not ours; the next stage should try.
    Pass,
    /// Metadata not available yet; retry later with the same exchange.
    Suspend,
    Handled(Disposition),
    Error(GenerateError),
}

impl Outcome {
    pub fn is_handled(&self) -> bool {
        matches!(self, Outcome::Handled(_))
    }
}

/// A pipeline stage.
pub trait Handler {
    fn handle(&self, ex: &mut Exchange) -> Outcome;
}

/// Directory listing handler.
///
/// Holds the validated configuration, shared read-only between requests,
/// plus the stat cache and MIME table it consults.
pub struct DirList<C, M = GuessMime> {
    config: Arc<ListingConfig>,
    cache: C,
    mime: M,
    server_tag: String,
}

impl<C: StatCache> DirList<C> {
    pub fn new(config: impl Into<Arc<ListingConfig>>, cache: C) -> Self {
        Self {
            config: config.into(),
            cache,
            mime: GuessMime,
            server_tag: crate::default_server_tag(),
        }
    }
}

impl<C, M> DirList<C, M> {
    /// Use a different MIME table for the Type column.
    pub fn with_mime<N: MimeLookup>(self, mime: N) -> DirList<C, N> {
        DirList {
            config: self.config,
            cache: self.cache,
            mime,
            server_tag: self.server_tag,
        }
    }

    /// Text shown in the page footer.
    pub fn with_server_tag(mut self, tag: impl Into<String>) -> Self {
        self.server_tag = tag.into();
        self
    }

    pub fn config(&self) -> &ListingConfig {
        &self.config
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }
}

impl<C: StatCache, M: MimeLookup> Handler for DirList<C, M> {
    fn handle(&self, ex: &mut Exchange) -> Outcome {
        let request = &ex.request;
        if !matches!(request.method, Method::Get | Method::Head) {
            return Outcome::Pass;
        }
        if ex.response.is_handled() || request.physical_path.as_os_str().is_empty() {
            return Outcome::Pass;
        }

        let listing = match self.cache.get_dirlist(&request.physical_path) {
            Lookup::Ready(listing) => listing,
            Lookup::Pending => return Outcome::Suspend,
            Lookup::Failed(err) => return Outcome::Error(err.into()),
        };

        let stat = match &listing.stat {
            Ok(stat) => stat,
            Err(StatError::NotFound | StatError::NotADirectory) => return Outcome::Pass,
            Err(StatError::PermissionDenied) => {
                if !ex.response.claim() {
                    return Outcome::Error(GenerateError::AlreadyHandled);
                }
                ex.response.status = 403;
                return Outcome::Handled(Disposition::Forbidden);
            }
            Err(err) => {
                tracing::error!(
                    path = %request.physical_path.display(),
                    error = %err,
                    "stat failed"
                );
                return Outcome::Error(GenerateError::Metadata {
                    path: request.physical_path.clone(),
                    source: err.clone(),
                });
            }
        };

        if !stat.kind.is_dir() {
            return Outcome::Pass;
        }

        if !request.uri_path.ends_with('/') {
            let location = slash_location(request);
            if !ex.response.redirect(location) {
                return Outcome::Error(GenerateError::AlreadyHandled);
            }
            return Outcome::Handled(Disposition::Redirect);
        }

        if !ex.response.claim() {
            return Outcome::Error(GenerateError::AlreadyHandled);
        }
        ex.response.status = 200;

        if self.config.debug {
            tracing::debug!(
                "dirlist for {}, {} entries",
                request.physical_path.display(),
                listing.entries.len()
            );
        }

        ex.response
            .headers
            .overwrite("Content-Type", self.config.content_type.as_str());

        if etag::set_header(request, &mut ex.response, stat) {
            ex.response.status = 304;
            return Outcome::Handled(Disposition::NotModified);
        }

        let classified = classify(&listing.entries, &self.config);
        let page = render::Listing {
            uri_path: &request.uri_path,
            dir: &request.physical_path,
            entries: &listing.entries,
            classified: &classified,
            server_tag: &self.server_tag,
        };
        render_listing(&mut ex.response.body, &page, &self.config, &self.mime);

        Outcome::Handled(Disposition::Listing)
    }
}

/// `Location` for the trailing-slash redirect, keeping the query string.
///
/// `uri_path` is decoded, so each segment is percent-encoded again. The
/// query is passed through as received, except that spaces and control
/// characters are encoded so it cannot break out of the header line.
fn slash_location(request: &Request) -> String {
    let segments: Vec<_> = request.uri_path.split('/').map(render::escape_uri).collect();
    let mut location = segments.join("/");
    location.push('/');
    if let Some(query) = request.query.as_deref().filter(|q| !q.is_empty()) {
        location.push('?');
        for c in query.chars() {
            if c == ' ' || c.is_control() {
                let mut buf = [0; 4];
                for b in c.encode_utf8(&mut buf).bytes() {
                    location.push_str(&format!("%{b:02X}"));
                }
            } else {
                location.push(c);
            }
        }
    }
    location
}
