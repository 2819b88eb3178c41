//! HTML assembly for directory listings.
//!
//! ## Page Layout
//!
//! ```text
//! XHTML prologue, <title>Index of {uri}</title>
//! built-in <style> block, or <link> to the configured stylesheet
//! </head><body>
//! HEADER.txt                       (optional)
//! <h2>Index of {uri}</h2>
//! table: Name | Last Modified | Size | Type
//!   ../        Parent Directory
//!   {dir}/     one row per directory
//!   {file}     one row per file
//! README.txt                       (optional)
//! footer with the server tag
//! ```
//!
//! The markup is a compatibility contract (stylesheets and scripts in the
//! wild select on the ids, classes and `val` attributes), so the prologue,
//! stylesheet and table scaffolding are fixed strings. Rows are built with
//! maud, which produces them on a single line.
//!
//! ## Escaping
//!
//! Entry names end up in two contexts and get a different escape in each:
//!
//! - link targets (`href`) are percent-encoded with [`escape_uri`]
//! - visible text and attribute values are HTML-escaped with [`escape_html`]
//!
//! The two are not interchangeable: a percent-encoded name is not safe as
//! element text, and an HTML-escaped one is not a valid link to the file.

use crate::config::ListingConfig;
use crate::filter::{Classified, HEADER_FILE, README_FILE};
use crate::format::{format_size, format_time};
use crate::http::ChunkQueue;
use crate::include::{self, PAGE_BUFFER_SIZE};
use crate::mime::MimeLookup;
use crate::types::DirEntrySnapshot;
use maud::{Markup, Render, html};
use std::borrow::Cow;
use std::path::Path;

const PROLOGUE: &str = "<?xml version=\"1.0\" encoding=\"iso-8859-1\"?>\n\
<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Transitional//EN\"\n\
\x20        \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd\">\n\
<html xmlns=\"http://www.w3.org/1999/xhtml\" xml:lang=\"en\" lang=\"en\">\n\
\t<head>\n";

const HEAD_END: &str = "\t</head>\n\t<body>\n";

const TABLE_HEAD: &str = "\t\t<div id=\"dirlist\">\n\
\t\t\t<table summary=\"Directory Listing\" cellpadding=\"0\" cellspacing=\"0\">\n\
\t\t\t\t<thead><tr><th id=\"name\">Name</th><th id=\"modified\">Last Modified</th>\
<th id=\"size\">Size</th><th id=\"type\">Type</th></tr></thead>\n\
\t\t\t\t<tbody>\n";

const TABLE_END: &str = "\t\t\t\t</tbody>\n\t\t\t</table>\n\t\t</div>\n";

const ROW_INDENT: &str = "\t\t\t\t";

pub const DEFAULT_CSS: &str = "<style type=\"text/css\">\n\
\tbody { background-color: #F5F5F5; }\n\
\th2#title { margin-bottom: 12px; }\n\
\ta, a:active { text-decoration: none; color: blue; }\n\
\ta:visited { color: #48468F; }\n\
\ta:hover, a:focus { text-decoration: underline; color: red; }\n\
\ttable { margin-left: 12px; }\n\
\tth, td { font: 90% monospace; text-align: left; }\n\
\tth { font-weight: bold; padding-right: 14px; padding-bottom: 3px; }\n\
\ttd { padding-right: 14px; }\n\
\ttd.size, th#size { text-align: right; }\n\
\t#dirlist { background-color: white; border-top: 1px solid #646464; \
border-bottom: 1px solid #646464; padding-top: 10px; padding-bottom: 14px; }\n\
\tdiv#footer { font: 90% monospace; color: #787878; padding-top: 4px; }\n\
</style>\n";

pub const OCTET_STREAM: &str = "application/octet-stream";

/// Everything the renderer needs to know about one listing.
pub struct Listing<'a> {
    /// Logical request path, shown in the title.
    pub uri_path: &'a str,
    /// Physical directory, where `HEADER.txt` / `README.txt` are read from.
    pub dir: &'a Path,
    pub entries: &'a [DirEntrySnapshot],
    pub classified: &'a Classified,
    pub server_tag: &'a str,
}

/// Percent-encode a name for use as a link target.
pub fn escape_uri(s: &str) -> Cow<'_, str> {
    urlencoding::encode(s)
}

/// HTML-escape a string for element text or attribute values.
pub fn escape_html(s: &str) -> String {
    s.render().into_string()
}

/// In-progress page: the current text buffer plus the body it flushes into.
pub struct RenderContext<'o> {
    out: &'o mut ChunkQueue,
    page: String,
}

impl<'o> RenderContext<'o> {
    pub fn new(out: &'o mut ChunkQueue) -> Self {
        Self {
            out,
            page: String::with_capacity(PAGE_BUFFER_SIZE),
        }
    }

    fn push(&mut self, s: &str) {
        self.page.push_str(s);
    }

    fn push_escaped(&mut self, s: &str) {
        s.render_to(&mut self.page);
    }

    fn push_row(&mut self, row: Markup) {
        self.page.push_str(ROW_INDENT);
        self.page.push_str(&row.into_string());
        self.page.push('\n');
    }

    fn include(&mut self, dir: &Path, filename: &str, encode_html: bool) {
        include::append_file(self.out, &mut self.page, dir, filename, encode_html);
    }

    fn finish(self) {
        self.out.append_string(self.page);
    }
}

/// Render the whole listing page into `out`.
pub fn render_listing(
    out: &mut ChunkQueue,
    listing: &Listing<'_>,
    config: &ListingConfig,
    mime: &dyn MimeLookup,
) {
    let mut ctx = RenderContext::new(out);

    ctx.push(PROLOGUE);
    ctx.push("\t\t<title>Index of ");
    ctx.push_escaped(listing.uri_path);
    ctx.push("</title>\n");

    match &config.css {
        Some(css) => {
            ctx.push("\t\t<link rel=\"stylesheet\" type=\"text/css\" href=\"");
            ctx.push_escaped(css);
            ctx.push("\" />\n");
        }
        None => ctx.push(DEFAULT_CSS),
    }
    ctx.push(HEAD_END);

    if listing.classified.has_header {
        ctx.include(listing.dir, HEADER_FILE, config.encode_header);
    }

    ctx.push("\t\t<h2 id=\"title\">Index of ");
    ctx.push_escaped(listing.uri_path);
    ctx.push("</h2>\n");
    ctx.push(TABLE_HEAD);

    ctx.push_row(parent_row());

    if !config.hide_directories {
        for &i in &listing.classified.directories {
            ctx.push_row(directory_row(&listing.entries[i]));
        }
    }

    for &i in &listing.classified.files {
        let entry = &listing.entries[i];
        let mime_type = mime.lookup(&entry.name);
        ctx.push_row(file_row(entry, mime_type.as_deref().unwrap_or(OCTET_STREAM)));
    }

    ctx.push(TABLE_END);

    if listing.classified.has_readme {
        ctx.include(listing.dir, README_FILE, config.encode_readme);
    }

    ctx.push("\t<div id=\"footer\">");
    ctx.push_escaped(listing.server_tag);
    ctx.push("</div>\n\t</body>\n</html>");

    ctx.finish();
}

fn parent_row() -> Markup {
    html! {
        tr {
            td { a href="../" { "Parent Directory" } }
            td class="modified" val="0" {}
            td class="size" val="0" { "-" }
            td class="type" { "Directory" }
        }
    }
}

fn directory_row(entry: &DirEntrySnapshot) -> Markup {
    let href = format!("{}/", escape_uri(&entry.name));
    html! {
        tr {
            td { a href=(href) { (entry.name) } }
            td class="modified" val=(entry.mtime) { (format_time(entry.mtime)) }
            td class="size" val="0" { "-" }
            td class="type" { "Directory" }
        }
    }
}

fn file_row(entry: &DirEntrySnapshot, mime_type: &str) -> Markup {
    let href = escape_uri(&entry.name);
    html! {
        tr {
            td { a href=(href.as_ref()) { (entry.name) } }
            td class="modified" val=(entry.mtime) { (format_time(entry.mtime)) }
            td class="size" val=(entry.size) { (format_size(entry.size)) }
            td class="type" { (mime_type) }
        }
    }
}
