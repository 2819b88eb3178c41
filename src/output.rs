//! CLI output formatting.
//!
//! The `render` command writes the listing body to stdout, so everything
//! about the exchange itself (what the handler decided, status, headers)
//! goes to stderr as a short summary:
//!
//! ```text
//! 200 OK (listing)
//!     Content-Type: text/html; charset=utf-8
//!     ETag: "3f9a0c1d2b4e5f60"
//!     Last-Modified: Sat, 01 Jan 2005 22:23:24 GMT
//!     Body: 2741 bytes
//! ```
//!
//! Unhandled outcomes get a single line:
//!
//! ```text
//! Passed: not a directory listing request
//! Suspended: directory metadata not ready
//! Error: stat of /srv/www failed: Input/output error
//! ```
//!
//! As with the rest of the CLI, [`format_outcome`] is pure and returns lines;
//! [`print_outcome`] is the thin wrapper that writes them.

use crate::generate::{Disposition, Outcome};
use crate::http::{Response, status_text};

fn disposition_label(disposition: Disposition) -> &'static str {
    match disposition {
        Disposition::Listing => "listing",
        Disposition::NotModified => "not modified",
        Disposition::Redirect => "redirect",
        Disposition::Forbidden => "forbidden",
    }
}

fn status_line(status: u16, disposition: Disposition) -> String {
    match status_text(status) {
        "" => format!("{} ({})", status, disposition_label(disposition)),
        text => format!("{} {} ({})", status, text, disposition_label(disposition)),
    }
}

/// Summarize what the handler did with the exchange.
pub fn format_outcome(outcome: &Outcome, response: &Response) -> Vec<String> {
    let disposition = match outcome {
        Outcome::Pass => return vec!["Passed: not a directory listing request".to_string()],
        Outcome::Suspend => return vec!["Suspended: directory metadata not ready".to_string()],
        Outcome::Error(e) => return vec![format!("Error: {e}")],
        Outcome::Handled(d) => *d,
    };

    let mut lines = vec![status_line(response.status, disposition)];
    for (name, value) in response.headers.iter() {
        lines.push(format!("    {name}: {value}"));
    }
    if !response.body.is_empty() {
        lines.push(format!("    Body: {} bytes", response.body.len()));
    }
    lines
}

pub fn print_outcome(outcome: &Outcome, response: &Response) {
    for line in format_outcome(outcome, response) {
        eprintln!("{}", line);
    }
}
