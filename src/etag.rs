//! Cache validators for generated listings.
//!
//! A listing only changes when the directory does, so the directory's own
//! stat result is enough to validate a client's cached copy:
//!
//! - **ETag**: the first 16 hex digits of SHA-256 over (inode, size, mtime),
//!   quoted. Adding, removing or renaming a child bumps the directory mtime.
//! - **Last-Modified**: the directory mtime as an HTTP-date.
//!
//! A request is fresh when `If-None-Match` lists the ETag (or `*`), or, when
//! there is no `If-None-Match`, when `If-Modified-Since` is not older than
//! the directory mtime. Weak comparison is used for `If-None-Match`, as
//! RFC 9110 requires for GET/HEAD.

use crate::http::{Request, Response};
use crate::types::DirStat;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Strong ETag for a directory stat, including the quotes.
pub fn compute_etag(stat: &DirStat) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"dirlist\0");
    hasher.update(stat.inode.to_le_bytes());
    hasher.update(stat.size.to_le_bytes());
    hasher.update(stat.mtime.to_le_bytes());
    let digest = format!("{:x}", hasher.finalize());
    format!("\"{}\"", &digest[..16])
}

/// Format a Unix timestamp as an HTTP-date (`Sun, 06 Nov 1994 08:49:37 GMT`).
pub fn http_date(mtime: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(mtime, 0).map(|dt| dt.format(HTTP_DATE_FORMAT).to_string())
}

/// Set `ETag` and `Last-Modified` on the response and report whether the
/// client's cached copy is still fresh.
pub fn set_header(request: &Request, response: &mut Response, stat: &DirStat) -> bool {
    let etag = compute_etag(stat);
    response.headers.overwrite("ETag", etag.as_str());
    if let Some(date) = http_date(stat.mtime) {
        response.headers.overwrite("Last-Modified", date);
    }

    if let Some(if_none_match) = request.headers.get("If-None-Match") {
        return etag_matches(if_none_match, &etag);
    }
    match request.headers.get("If-Modified-Since") {
        Some(since) => not_modified_since(since, stat.mtime),
        None => false,
    }
}

fn etag_matches(header: &str, etag: &str) -> bool {
    header.split(',').map(str::trim).any(|candidate| {
        candidate == "*" || candidate.strip_prefix("W/").unwrap_or(candidate) == etag
    })
}

fn not_modified_since(header: &str, mtime: i64) -> bool {
    DateTime::parse_from_rfc2822(header.trim())
        .map(|since| since.timestamp() >= mtime)
        .unwrap_or(false)
}
