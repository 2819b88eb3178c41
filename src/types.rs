//! Shared types passed between the stat cache and the listing stages.
//!
//! The stat cache owns these values. A listing only borrows them for the
//! duration of one generation call; the classifier refers to entries by
//! their index into [`DirListing::entries`] rather than copying them.

use thiserror::Error;
use std::path::PathBuf;

/// File type of a directory entry, reduced to what the listing cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Directory,
    Regular,
    /// Symlinks that could not be followed, sockets, fifos, devices.
    Other,
}

impl FileKind {
    pub fn is_dir(self) -> bool {
        self == FileKind::Directory
    }
}

/// One child of a listed directory, as cached by the stat cache.
///
/// `name` is the file name component only, never a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntrySnapshot {
    pub name: String,
    pub kind: FileKind,
    /// Size in bytes. Meaningless when `failed` is set.
    pub size: u64,
    /// Modification time in seconds since the Unix epoch.
    pub mtime: i64,
    /// `stat()` failed for this entry.
    pub failed: bool,
}

/// Stat result for the listed directory itself.
///
/// Feeds the validator (ETag / Last-Modified).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirStat {
    pub kind: FileKind,
    pub inode: u64,
    pub size: u64,
    pub mtime: i64,
}

/// Why the stat of the listed path failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatError {
    #[error("no such file or directory")]
    NotFound,
    #[error("not a directory")]
    NotADirectory,
    #[error("permission denied")]
    PermissionDenied,
    #[error("{0}")]
    Other(String),
}

impl From<&std::io::Error> for StatError {
    fn from(err: &std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => StatError::NotFound,
            std::io::ErrorKind::NotADirectory => StatError::NotADirectory,
            std::io::ErrorKind::PermissionDenied => StatError::PermissionDenied,
            _ => StatError::Other(err.to_string()),
        }
    }
}

/// Cached listing of one directory: its own stat result plus its children.
///
/// When `stat` is an error, `entries` is empty.
#[derive(Debug, Clone)]
pub struct DirListing {
    pub path: PathBuf,
    pub stat: Result<DirStat, StatError>,
    pub entries: Vec<DirEntrySnapshot>,
}

impl DirListing {
    pub fn failed(path: impl Into<PathBuf>, err: StatError) -> Self {
        Self {
            path: path.into(),
            stat: Err(err),
            entries: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn io_errors_map_to_stat_errors() {
        let nf = io::Error::from(io::ErrorKind::NotFound);
        let nd = io::Error::from(io::ErrorKind::NotADirectory);
        let pd = io::Error::from(io::ErrorKind::PermissionDenied);
        let other = io::Error::other("disk on fire");

        assert_eq!(StatError::from(&nf), StatError::NotFound);
        assert_eq!(StatError::from(&nd), StatError::NotADirectory);
        assert_eq!(StatError::from(&pd), StatError::PermissionDenied);
        assert_eq!(
            StatError::from(&other),
            StatError::Other("disk on fire".into())
        );
    }

    #[test]
    fn failed_listing_has_no_entries() {
        let l = DirListing::failed("/nope", StatError::NotFound);
        assert!(l.entries.is_empty());
        assert_eq!(l.stat, Err(StatError::NotFound));
    }

    #[test]
    fn stat_error_messages() {
        assert_eq!(StatError::NotFound.to_string(), "no such file or directory");
        assert_eq!(StatError::NotADirectory.to_string(), "not a directory");
        assert_eq!(StatError::PermissionDenied.to_string(), "permission denied");
        assert_eq!(StatError::Other("disk on fire".into()).to_string(), "disk on fire");

        let err: &dyn std::error::Error = &StatError::NotFound;
        assert!(err.source().is_none());
    }
}
