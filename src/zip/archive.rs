use std::sync::Arc;

use crate::error::{Error, Result};
use crate::io::ReadAt;

use super::index::{ArchiveIndex, IndexNode};
use super::parser::ZipParser;
use super::stream::EntryStream;
use super::structures::ZipFileEntry;

/// An opened ZIP archive: the parsed central directory plus its byte source.
///
/// Read-only once constructed and shared behind an `Arc` by every
/// filesystem view and open entry stream.
pub struct ZipArchive<R: ReadAt + ?Sized> {
    parser: ZipParser<R>,
    index: ArchiveIndex,
}

impl<R: ReadAt + ?Sized> ZipArchive<R> {
    /// Read the central directory of `reader` and build the entry tree.
    pub async fn open(reader: Arc<R>) -> Result<Self> {
        let parser = ZipParser::new(reader);
        let entries = parser.list_files().await?;
        log::debug!("archive contains {} entries", entries.len());
        Ok(Self {
            parser,
            index: ArchiveIndex::new(entries),
        })
    }

    pub fn index(&self) -> &ArchiveIndex {
        &self.index
    }

    /// List all entries in central directory order.
    pub fn list_files(&self) -> &[ZipFileEntry] {
        self.index.entries()
    }

    /// Start a fresh decompressing stream for the file at `path`.
    ///
    /// Every call returns an independent stream; nothing is shared
    /// between streams of the same entry.
    pub async fn open_stream(&self, path: &str, node: &IndexNode) -> Result<EntryStream<R>> {
        if node.is_dir {
            return Err(Error::IsADirectory {
                path: path.to_string(),
            });
        }
        let entry = self
            .index
            .entry(node)
            .ok_or_else(|| Error::not_found(path))?;
        if entry.is_encrypted() {
            return Err(Error::Encrypted {
                path: path.to_string(),
            });
        }

        let data_offset = self.parser.get_data_offset(entry).await?;
        EntryStream::new(
            Arc::clone(self.parser.reader()),
            path.to_string(),
            entry,
            data_offset,
        )
    }
}
