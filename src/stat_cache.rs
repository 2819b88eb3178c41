//! Directory stat cache.
//!
//! Generating a listing needs the listed directory's own stat result and a
//! stat result for every child. The host server usually owns a cache of
//! these (and may fill it asynchronously), so the generator only talks to
//! the [`StatCache`] trait. A lookup either has the listing ready, asks the
//! caller to come back later, or fails outright.
//!
//! # Failure layers
//!
//! There are three distinct ways a lookup can go wrong, and they are kept
//! apart on purpose:
//!
//! - [`Lookup::Failed`]: the cache itself broke. The request errors out.
//! - [`DirListing::stat`] is `Err`: the cache worked, but stat'ing the
//!   listed path failed (missing, not a directory, unreadable, ...).
//! - [`DirEntrySnapshot::failed`]: one child could not be stat'ed. The
//!   listing simply leaves it out.
//!
//! # `FsStatCache`
//!
//! [`FsStatCache`] reads the local filesystem synchronously and keeps each
//! directory listing for a TTL ([`DEFAULT_TTL`] unless set with
//! [`FsStatCache::with_ttl`]), or until [`FsStatCache::invalidate`] or
//! [`FsStatCache::clear`] drops it. Failed stats are never kept: a path that
//! was missing is looked up again on the next request, and arbitrary client
//! URLs cannot grow the map. Expired entries are swept whenever a new
//! listing is inserted.
//!
//! Children are enumerated with `walkdir` at depth 1 and without sorting, so
//! entry order is whatever the filesystem returns.

use crate::types::{DirEntrySnapshot, DirListing, DirStat, FileKind, StatError};
use std::collections::HashMap;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, UNIX_EPOCH};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatCacheError {
    #[error("stat cache lock poisoned")]
    Poisoned,
    #[error("stat cache unavailable: {0}")]
    Unavailable(String),
}

/// Result of asking the cache for a directory listing.
#[derive(Debug)]
pub enum Lookup<T> {
    Ready(T),
    /// Not cached yet; the caller must suspend and retry with the same inputs.
    Pending,
    Failed(StatCacheError),
}

pub trait StatCache {
    fn get_dirlist(&self, path: &Path) -> Lookup<Arc<DirListing>>;
}

impl<C: StatCache + ?Sized> StatCache for Arc<C> {
    fn get_dirlist(&self, path: &Path) -> Lookup<Arc<DirListing>> {
        (**self).get_dirlist(path)
    }
}

/// How long [`FsStatCache`] keeps a listing by default.
pub const DEFAULT_TTL: Duration = Duration::from_secs(10);

#[derive(Debug)]
struct CachedListing {
    listing: Arc<DirListing>,
    expires_at: Instant,
}

/// Filesystem-backed cache of successful listings, with a TTL.
#[derive(Debug)]
pub struct FsStatCache {
    entries: Mutex<HashMap<PathBuf, CachedListing>>,
    ttl: Duration,
}

impl Default for FsStatCache {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl: DEFAULT_TTL,
        }
    }
}

impl FsStatCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep listings for `ttl` instead of [`DEFAULT_TTL`]. Zero disables
    /// caching.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Forget the cached listing for `path`, if any.
    pub fn invalidate(&self, path: &Path) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(path);
        }
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StatCache for FsStatCache {
    fn get_dirlist(&self, path: &Path) -> Lookup<Arc<DirListing>> {
        let Ok(mut entries) = self.entries.lock() else {
            return Lookup::Failed(StatCacheError::Poisoned);
        };
        let now = Instant::now();
        if let Some(cached) = entries.get(path) {
            if now < cached.expires_at {
                return Lookup::Ready(Arc::clone(&cached.listing));
            }
        }

        let listing = Arc::new(read_listing(path));
        if listing.stat.is_err() || self.ttl.is_zero() {
            entries.remove(path);
            return Lookup::Ready(listing);
        }

        entries.retain(|_, cached| now < cached.expires_at);
        entries.insert(
            path.to_path_buf(),
            CachedListing {
                listing: Arc::clone(&listing),
                expires_at: now + self.ttl,
            },
        );
        Lookup::Ready(listing)
    }
}

/// Stat `path` and, if it is a directory, every child of it.
pub fn read_listing(path: &Path) -> DirListing {
    let meta = match std::fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) => return DirListing::failed(path, StatError::from(&e)),
    };
    let stat = dir_stat(&meta);
    if !stat.kind.is_dir() {
        return DirListing {
            path: path.to_path_buf(),
            stat: Ok(stat),
            entries: Vec::new(),
        };
    }

    // Opening the directory can fail even though stat'ing it succeeded.
    if let Err(e) = std::fs::read_dir(path) {
        return DirListing::failed(path, StatError::from(&e));
    }

    let entries = WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(snapshot(
                entry.file_name().to_string_lossy().into_owned(),
                entry.metadata().ok(),
            )),
            // A dangling symlink still has a name worth reporting as failed.
            Err(e) if e.depth() == 0 => None,
            Err(e) => e
                .path()
                .and_then(|p| p.file_name())
                .map(|name| snapshot(name.to_string_lossy().into_owned(), None)),
        })
        .collect();

    DirListing {
        path: path.to_path_buf(),
        stat: Ok(stat),
        entries,
    }
}

fn snapshot(name: String, meta: Option<Metadata>) -> DirEntrySnapshot {
    match meta {
        Some(meta) => DirEntrySnapshot {
            name,
            kind: file_kind(&meta),
            size: meta.len(),
            mtime: mtime_secs(&meta),
            failed: false,
        },
        None => DirEntrySnapshot {
            name,
            kind: FileKind::Other,
            size: 0,
            mtime: 0,
            failed: true,
        },
    }
}

fn dir_stat(meta: &Metadata) -> DirStat {
    DirStat {
        kind: file_kind(meta),
        inode: inode(meta),
        size: meta.len(),
        mtime: mtime_secs(meta),
    }
}

fn file_kind(meta: &Metadata) -> FileKind {
    let ft = meta.file_type();
    if ft.is_dir() {
        FileKind::Directory
    } else if ft.is_file() {
        FileKind::Regular
    } else {
        FileKind::Other
    }
}

fn mtime_secs(meta: &Metadata) -> i64 {
    match meta.modified() {
        Ok(t) => match t.duration_since(UNIX_EPOCH) {
            Ok(d) => d.as_secs() as i64,
            Err(before) => -(before.duration().as_secs() as i64),
        },
        Err(_) => 0,
    }
}

#[cfg(unix)]
fn inode(meta: &Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    meta.ino()
}

#[cfg(not(unix))]
fn inode(_meta: &Metadata) -> u64 {
    0
}
