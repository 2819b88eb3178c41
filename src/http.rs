//! The slice of a request/response exchange the listing touches.
//!
//! A host server maps its own request state onto [`Request`], lets the
//! handler fill in [`Response`], and then drains [`Response::body`] to the
//! client. The body is a [`ChunkQueue`]: generated text and whole files are
//! appended in order, and files are handed over as open handles so the
//! transport can send them however it likes (`sendfile`, mmap, plain
//! copies). Once a file is in the queue, the queue owns it.

use std::fmt;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Other(String),
}

impl Method {
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Method::Get,
            "HEAD" => Method::Head,
            other => Method::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Head => write!(f, "HEAD"),
            Method::Other(m) => write!(f, "{m}"),
        }
    }
}

/// Header list with case-insensitive names. Keeps insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Replace every header called `name` with a single value.
    pub fn overwrite(&mut self, name: &str, value: impl Into<String>) {
        self.remove(name);
        self.0.push((name.to_string(), value.into()));
    }

    pub fn append(&mut self, name: &str, value: impl Into<String>) {
        self.0.push((name.to_string(), value.into()));
    }

    pub fn remove(&mut self, name: &str) {
        self.0.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Incoming request, after the host mapped the URL to a physical path.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Decoded logical path, e.g. `/files/`.
    pub uri_path: String,
    pub query: Option<String>,
    /// Filesystem path the URI maps to. Empty when unmapped.
    pub physical_path: PathBuf,
    pub headers: Headers,
}

impl Request {
    pub fn new(method: Method, uri_path: impl Into<String>, physical_path: impl Into<PathBuf>) -> Self {
        Self {
            method,
            uri_path: uri_path.into(),
            query: None,
            physical_path: physical_path.into(),
            headers: Headers::new(),
        }
    }

    pub fn get(uri_path: impl Into<String>, physical_path: impl Into<PathBuf>) -> Self {
        Self::new(Method::Get, uri_path, physical_path)
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }
}

/// One segment of the response body.
#[derive(Debug)]
pub enum Chunk {
    Text(String),
    /// `len` bytes of `file`, starting at its current position.
    File { file: File, len: u64 },
}

/// Ordered response body.
#[derive(Debug, Default)]
pub struct ChunkQueue {
    chunks: Vec<Chunk>,
}

impl ChunkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_string(&mut self, text: String) {
        if !text.is_empty() {
            self.chunks.push(Chunk::Text(text));
        }
    }

    /// Queue a whole file. The queue takes ownership of the handle.
    pub fn append_file(&mut self, file: File, len: u64) {
        self.chunks.push(Chunk::File { file, len });
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Total body length in bytes.
    pub fn len(&self) -> u64 {
        self.chunks
            .iter()
            .map(|c| match c {
                Chunk::Text(t) => t.len() as u64,
                Chunk::File { len, .. } => *len,
            })
            .sum()
    }

    /// Drain every chunk into `out`, in order.
    pub fn write_to<W: Write>(&mut self, out: &mut W) -> io::Result<u64> {
        let mut written = 0;
        for chunk in self.chunks.drain(..) {
            match chunk {
                Chunk::Text(text) => {
                    out.write_all(text.as_bytes())?;
                    written += text.len() as u64;
                }
                Chunk::File { file, len } => {
                    written += io::copy(&mut file.take(len), out)?;
                }
            }
        }
        Ok(written)
    }

    /// Drain the whole body into memory.
    pub fn into_bytes(mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(buf)
    }
}

/// Outgoing response. A handler must [`claim`](Response::claim) it before
/// setting a status or writing a body.
#[derive(Debug)]
pub struct Response {
    handled: bool,
    pub status: u16,
    pub headers: Headers,
    pub body: ChunkQueue,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            handled: false,
            status: 0,
            headers: Headers::new(),
            body: ChunkQueue::new(),
        }
    }
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_handled(&self) -> bool {
        self.handled
    }

    /// Take ownership of the response. Fails if another stage already did.
    pub fn claim(&mut self) -> bool {
        if self.handled {
            return false;
        }
        self.handled = true;
        true
    }

    /// Claim the response and answer with a 301 to `location`.
    pub fn redirect(&mut self, location: impl Into<String>) -> bool {
        if !self.claim() {
            return false;
        }
        self.status = 301;
        self.headers.overwrite("Location", location);
        true
    }
}

/// A request together with the response being built for it.
#[derive(Debug)]
pub struct Exchange {
    pub request: Request,
    pub response: Response,
}

impl Exchange {
    pub fn new(request: Request) -> Self {
        Self {
            request,
            response: Response::new(),
        }
    }
}

pub fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        301 => "Moved Permanently",
        304 => "Not Modified",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Seek;
    use tempfile::tempfile;

    #[test]
    fn method_parse_is_case_insensitive() {
        assert_eq!(Method::parse("get"), Method::Get);
        assert_eq!(Method::parse("HEAD"), Method::Head);
        assert_eq!(Method::parse("Post"), Method::Other("POST".into()));
        assert_eq!(Method::parse("delete"), Method::Other("DELETE".into()));
        assert_eq!(Method::parse("propfind").to_string(), "PROPFIND");
    }

    #[test]
    fn headers_are_case_insensitive() {
        let mut h = Headers::new();
        h.append("Content-Type", "text/plain");
        assert_eq!(h.get("content-type"), Some("text/plain"));
        h.overwrite("CONTENT-TYPE", "text/html");
        assert_eq!(h.len(), 1);
        assert_eq!(h.get("Content-Type"), Some("text/html"));
        h.remove("content-type");
        assert!(h.is_empty());
    }

    #[test]
    fn response_can_be_claimed_once() {
        let mut r = Response::new();
        assert!(!r.is_handled());
        assert!(r.claim());
        assert!(r.is_handled());
        assert!(!r.claim());
        assert!(!r.redirect("/x/"));
    }

    #[test]
    fn redirect_sets_location() {
        let mut r = Response::new();
        assert!(r.redirect("/dir/"));
        assert_eq!(r.status, 301);
        assert_eq!(r.headers.get("location"), Some("/dir/"));
    }

    #[test]
    fn chunk_queue_keeps_order() {
        let mut file = tempfile().unwrap();
        file.write_all(b"<b>raw</b>").unwrap();
        file.rewind().unwrap();

        let mut q = ChunkQueue::new();
        q.append_string("before ".to_string());
        q.append_file(file, 10);
        q.append_string(String::new());
        q.append_string(" after".to_string());
        assert_eq!(q.chunks().len(), 3);
        assert_eq!(q.len(), 23);

        let body = q.into_bytes().unwrap();
        assert_eq!(body, b"before <b>raw</b> after");
    }

    #[test]
    fn file_chunk_is_bounded_by_len() {
        let mut file = tempfile().unwrap();
        file.write_all(b"0123456789").unwrap();
        file.rewind().unwrap();

        let mut q = ChunkQueue::new();
        q.append_file(file, 4);
        assert_eq!(q.into_bytes().unwrap(), b"0123");
    }
}
