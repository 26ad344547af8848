//! Virtual filesystem over an opened archive.
//!
//! [`ArchiveFs`] is the surface a static file server consumes: open a
//! path to get an [`EntryHandle`], stat it, or list a directory. Two
//! interchangeable variants decide how file entries are exposed:
//!
//! - [`StreamingFs`] wraps each entry in a [`LookaheadEntryReader`], keeping
//!   at most [`LOOKAHEAD_SIZE`] bytes in memory per open handle.
//! - [`BufferingFs`] decompresses each entry fully into a
//!   [`MaterializedEntryReader`] at open time, refusing entries at or
//!   above its [`SizeLimit`](crate::SizeLimit).
//!
//! Paths use the `io/fs` model: slash separated, no leading or trailing
//! slash, `.` for the root.

mod buffering;
mod detect;
mod handle;
mod lookahead;
mod materialized;
mod streaming;
mod sub;

pub use buffering::BufferingFs;
pub use detect::{EXCLUDED_FILES, TRAVERSE_LIMIT, detect_root, detect_root_path};
pub use handle::{DirHandle, EntryHandle};
pub use lookahead::{LOOKAHEAD_SIZE, LookaheadEntryReader};
pub use materialized::MaterializedEntryReader;
pub use streaming::StreamingFs;
pub use sub::{SubFs, sub};

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::io::ReadAt;
use crate::zip::{DosDateTime, IndexNode, ROOT, ZipArchive};

/// Archive type shared by every filesystem view.
pub type Archive = ZipArchive<dyn ReadAt>;

/// File information for one path, as reported by `stat` and directory listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    /// Base name of the entry, `.` for the root.
    pub name: String,
    /// Uncompressed size; zero for directories.
    pub size: u64,
    pub is_dir: bool,
    /// Timestamp from the archive, absent for implied directories.
    pub modified: Option<DosDateTime>,
}

/// Read-only filesystem contract consumed by the file server.
///
/// Implementations are shared across requests; every `open` returns a
/// fresh handle that is never shared with other callers.
#[async_trait]
pub trait ArchiveFs: Send + Sync {
    async fn open(&self, path: &str) -> Result<EntryHandle>;

    async fn stat(&self, path: &str) -> Result<Metadata>;

    /// Children of a directory, sorted by name.
    async fn read_dir(&self, path: &str) -> Result<Vec<Metadata>>;

    /// Short name of the implementation, for logs.
    fn name(&self) -> &'static str;
}

/// Reports whether `path` is a valid filesystem path.
///
/// Valid paths are `.` or slash separated elements that are neither
/// empty, `.` nor `..`.
pub fn valid_path(path: &str) -> bool {
    if path == ROOT {
        return true;
    }
    !path.is_empty()
        && path
            .split('/')
            .all(|element| !element.is_empty() && element != "." && element != "..")
}

pub(crate) fn base_name(path: &str) -> &str {
    path.rsplit_once('/').map_or(path, |(_, name)| name)
}

/// Join a directory and a child name under the `.`-rooted path model.
pub(crate) fn join(dir: &str, name: &str) -> String {
    if dir == ROOT {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

pub(crate) fn lookup<'a>(archive: &'a Archive, path: &str) -> Result<&'a IndexNode> {
    if !valid_path(path) {
        return Err(Error::InvalidPath {
            path: path.to_string(),
        });
    }
    archive
        .index()
        .get(path)
        .ok_or_else(|| Error::not_found(path))
}

pub(crate) fn metadata(path: &str, node: &IndexNode) -> Metadata {
    Metadata {
        name: base_name(path).to_string(),
        size: if node.is_dir { 0 } else { node.size },
        is_dir: node.is_dir,
        modified: node.modified,
    }
}

/// Directory listing straight from the archive index; never buffered or capped.
pub(crate) fn list_dir(archive: &Archive, path: &str) -> Result<Vec<Metadata>> {
    let node = lookup(archive, path)?;
    if !node.is_dir {
        return Err(Error::NotADirectory {
            path: path.to_string(),
        });
    }
    node.children()
        .map(|name| {
            let child = join(path, name);
            lookup(archive, &child).map(|child_node| metadata(&child, child_node))
        })
        .collect()
}
