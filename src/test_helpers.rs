//! Shared test utilities.
//!
//! Snapshot builders for classifier/renderer tests, a canned [`StatCache`]
//! for driving the generator without touching the filesystem, and request
//! shorthands.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let entries = vec![dir("sub"), file("a.txt", 5), file(".hidden", 1)];
//! let cache = CannedCache::directory("/srv/www", entries);
//! let handler = DirList::new(ListingConfig::default(), cache);
//! let mut ex = get("/", "/srv/www");
//! handler.handle(&mut ex);
//! ```

use std::cell::Cell;
use std::path::Path;
use std::sync::Arc;

use crate::http::{Exchange, Request};
use crate::stat_cache::{Lookup, StatCache, StatCacheError};
use crate::types::{DirEntrySnapshot, DirListing, DirStat, FileKind, StatError};

/// Fixed modification time for snapshot entries: 2005-Jan-01 22:23:24 UTC.
pub const MTIME: i64 = 1104618204;

// =========================================================================
// Snapshot builders
// =========================================================================

pub fn file(name: &str, size: u64) -> DirEntrySnapshot {
    DirEntrySnapshot {
        name: name.to_string(),
        kind: FileKind::Regular,
        size,
        mtime: MTIME,
        failed: false,
    }
}

pub fn dir(name: &str) -> DirEntrySnapshot {
    DirEntrySnapshot {
        name: name.to_string(),
        kind: FileKind::Directory,
        size: 4096,
        mtime: MTIME,
        failed: false,
    }
}

pub fn failed(name: &str) -> DirEntrySnapshot {
    DirEntrySnapshot {
        name: name.to_string(),
        kind: FileKind::Other,
        size: 0,
        mtime: 0,
        failed: true,
    }
}

/// Names of the entries at `indices`, in order.
pub fn names(entries: &[DirEntrySnapshot], indices: &[usize]) -> Vec<String> {
    indices.iter().map(|&i| entries[i].name.clone()).collect()
}

pub fn dir_stat(mtime: i64) -> DirStat {
    DirStat {
        kind: FileKind::Directory,
        inode: 7,
        size: 4096,
        mtime,
    }
}

// =========================================================================
// Canned stat cache
// =========================================================================

/// A stat cache that always answers with one fixed listing, optionally
/// after reporting `Pending` a number of times first.
pub struct CannedCache {
    answer: Result<Arc<DirListing>, StatCacheError>,
    pending: Cell<u32>,
    lookups: Cell<u32>,
}

impl CannedCache {
    pub fn new(listing: DirListing) -> Self {
        Self {
            answer: Ok(Arc::new(listing)),
            pending: Cell::new(0),
            lookups: Cell::new(0),
        }
    }

    pub fn directory(path: &str, entries: Vec<DirEntrySnapshot>) -> Self {
        Self::new(DirListing {
            path: path.into(),
            stat: Ok(dir_stat(MTIME)),
            entries,
        })
    }

    pub fn regular_file(path: &str) -> Self {
        Self::new(DirListing {
            path: path.into(),
            stat: Ok(DirStat {
                kind: FileKind::Regular,
                ..dir_stat(MTIME)
            }),
            entries: Vec::new(),
        })
    }

    pub fn stat_error(path: &str, err: StatError) -> Self {
        Self::new(DirListing::failed(path, err))
    }

    pub fn broken(err: StatCacheError) -> Self {
        Self {
            answer: Err(err),
            pending: Cell::new(0),
            lookups: Cell::new(0),
        }
    }

    /// Answer `Pending` for the next `n` lookups.
    pub fn pending_for(self, n: u32) -> Self {
        self.pending.set(n);
        self
    }

    pub fn lookups(&self) -> u32 {
        self.lookups.get()
    }
}

impl StatCache for CannedCache {
    fn get_dirlist(&self, _path: &Path) -> Lookup<Arc<DirListing>> {
        self.lookups.set(self.lookups.get() + 1);
        if self.pending.get() > 0 {
            self.pending.set(self.pending.get() - 1);
            return Lookup::Pending;
        }
        match &self.answer {
            Ok(listing) => Lookup::Ready(Arc::clone(listing)),
            Err(e) => Lookup::Failed(e.clone()),
        }
    }
}

// =========================================================================
// Requests
// =========================================================================

pub fn get(uri_path: &str, physical_path: &str) -> Exchange {
    Exchange::new(Request::get(uri_path, physical_path))
}

pub fn body_string(ex: &mut Exchange) -> String {
    let body = std::mem::take(&mut ex.response.body);
    String::from_utf8(body.into_bytes().unwrap()).unwrap()
}
