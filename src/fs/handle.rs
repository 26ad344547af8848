use std::io::SeekFrom;

use crate::error::{Error, Result};
use crate::sniff::detect_content_type;

use super::{LookaheadEntryReader, MaterializedEntryReader, Metadata};

/// Listing state for an opened directory.
pub struct DirHandle {
    path: String,
    meta: Metadata,
    entries: Vec<Metadata>,
    cursor: usize,
}

impl DirHandle {
    pub(crate) fn new(path: &str, meta: Metadata, entries: Vec<Metadata>) -> Self {
        Self {
            path: path.to_string(),
            meta,
            entries,
            cursor: 0,
        }
    }

    /// Return up to `max` further children, or all remaining ones when `max` is 0.
    /// An empty slice means the listing is exhausted.
    pub fn read_dir(&mut self, max: usize) -> &[Metadata] {
        let remaining = self.entries.len() - self.cursor;
        let n = if max == 0 { remaining } else { max.min(remaining) };
        let start = self.cursor;
        self.cursor += n;
        &self.entries[start..start + n]
    }
}

/// Per-open state returned by [`ArchiveFs::open`](super::ArchiveFs::open).
///
/// Each handle is owned by a single caller and closed by dropping it.
pub enum EntryHandle {
    Directory(DirHandle),
    Streaming(LookaheadEntryReader),
    Buffered(MaterializedEntryReader),
}

impl EntryHandle {
    pub fn metadata(&self) -> &Metadata {
        match self {
            Self::Directory(dir) => &dir.meta,
            Self::Streaming(reader) => reader.metadata(),
            Self::Buffered(reader) => reader.metadata(),
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, Self::Directory(_))
    }

    pub async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        match self {
            Self::Directory(dir) => Err(Error::IsADirectory {
                path: dir.path.clone(),
            }),
            Self::Streaming(reader) => reader.read(buf).await,
            Self::Buffered(reader) => reader.read(buf),
        }
    }

    /// Seek within the entry. Streaming handles only support
    /// `SeekFrom::Start(0)` and `SeekFrom::End(0)`.
    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        match self {
            Self::Directory(dir) => Err(Error::IsADirectory {
                path: dir.path.clone(),
            }),
            Self::Streaming(reader) => reader.seek(pos),
            Self::Buffered(reader) => reader.seek(pos),
        }
    }

    /// Read from the current position to the end of the entry.
    pub async fn read_to_end(&mut self, out: &mut Vec<u8>) -> Result<usize> {
        let start = out.len();
        let mut chunk = vec![0u8; 32 * 1024];
        loop {
            let n = self.read(&mut chunk).await?;
            if n == 0 {
                return Ok(out.len() - start);
            }
            out.extend_from_slice(&chunk[..n]);
        }
    }

    pub fn read_dir(&mut self, max: usize) -> Result<&[Metadata]> {
        match self {
            Self::Directory(dir) => Ok(dir.read_dir(max)),
            Self::Streaming(reader) => Err(Error::NotADirectory {
                path: reader.metadata().name.clone(),
            }),
            Self::Buffered(reader) => Err(Error::NotADirectory {
                path: reader.metadata().name.clone(),
            }),
        }
    }

    /// The entry's leading bytes, available without moving the read position.
    pub fn sniff_bytes(&self) -> &[u8] {
        match self {
            Self::Directory(_) => &[],
            Self::Streaming(reader) => reader.lookahead(),
            Self::Buffered(reader) => reader.sniff_bytes(),
        }
    }

    /// Sniffed MIME type of a file entry; `None` for directories.
    pub fn content_type(&self) -> Option<&'static str> {
        if self.is_dir() {
            return None;
        }
        Some(detect_content_type(self.sniff_bytes()))
    }
}
