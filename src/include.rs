//! Splicing `HEADER.txt` / `README.txt` into a listing.
//!
//! Two modes, picked by the `encode-header` / `encode-readme` options:
//!
//! - **encoded** (default): the file is plain text. Its content is read into
//!   memory, HTML-escaped and wrapped in `<pre>…</pre>` inside the page
//!   buffer.
//! - **raw**: the file is hand-written HTML. The page buffer built so far is
//!   flushed to the response body, then the open file itself is queued, and
//!   the caller continues in a fresh buffer. The transport sends the file's
//!   bytes without them ever passing through the page buffer.
//!
//! Either way, files larger than [`MAX_INCLUDE_FILE_SIZE`] and any open/stat/
//! read failure are skipped silently: the listing is still served, just
//! without the extra text.

use crate::http::ChunkQueue;
use maud::Render;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Largest `HEADER.txt` / `README.txt` that gets included.
pub const MAX_INCLUDE_FILE_SIZE: u64 = 64 * 1024;

/// Initial capacity of page buffers.
pub(crate) const PAGE_BUFFER_SIZE: usize = 4 * 1024 - 1;

/// What [`append_file`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Included {
    /// Escaped into the page buffer.
    Inline,
    /// Queued as a file chunk after flushing the page buffer.
    Streamed,
    Skipped,
}

/// Include `dir/filename` at the current position of the page.
///
/// `page` is the in-progress page buffer; in raw mode it is flushed into
/// `out` and replaced by an empty one.
pub fn append_file(
    out: &mut ChunkQueue,
    page: &mut String,
    dir: &Path,
    filename: &str,
    encode_html: bool,
) -> Included {
    let path = dir.join(filename);
    let result = if encode_html {
        read_bounded(&path).map(|contents| {
            let text: &str = &String::from_utf8_lossy(&contents);
            page.push_str("<pre>");
            text.render_to(page);
            page.push_str("</pre>");
            Included::Inline
        })
    } else {
        open_bounded(&path).map(|(file, len)| {
            let flushed = std::mem::replace(page, String::with_capacity(PAGE_BUFFER_SIZE));
            out.append_string(flushed);
            out.append_file(file, len);
            Included::Streamed
        })
    };

    result.unwrap_or_else(|reason| {
        tracing::debug!(path = %path.display(), %reason, "skipping include");
        Included::Skipped
    })
}

fn open_bounded(path: &Path) -> Result<(File, u64), String> {
    let file = File::open(path).map_err(|e| e.to_string())?;
    let meta = file.metadata().map_err(|e| e.to_string())?;
    if !meta.is_file() {
        return Err("not a regular file".to_string());
    }
    let len = meta.len();
    if len > MAX_INCLUDE_FILE_SIZE {
        return Err(format!("file too big ({len} bytes)"));
    }
    Ok((file, len))
}

fn read_bounded(path: &Path) -> Result<Vec<u8>, String> {
    let file = File::open(path).map_err(|e| e.to_string())?;
    let mut contents = Vec::new();
    file.take(MAX_INCLUDE_FILE_SIZE + 1)
        .read_to_end(&mut contents)
        .map_err(|e| e.to_string())?;
    if contents.len() as u64 > MAX_INCLUDE_FILE_SIZE {
        return Err("file too big".to_string());
    }
    Ok(contents)
}
