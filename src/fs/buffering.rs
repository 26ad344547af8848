use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;
use crate::limit::SizeLimit;

use super::{
    Archive, ArchiveFs, DirHandle, EntryHandle, MaterializedEntryReader, Metadata, list_dir,
    lookup, metadata,
};

/// Filesystem view that loads each opened file entry completely into memory.
///
/// Entries whose size is at or above `limit` cannot be opened; directories
/// are listed from the archive index and never count against it.
pub struct BufferingFs {
    archive: Arc<Archive>,
    limit: SizeLimit,
}

impl BufferingFs {
    pub fn new(archive: Arc<Archive>, limit: SizeLimit) -> Self {
        Self { archive, limit }
    }

    pub fn limit(&self) -> SizeLimit {
        self.limit
    }
}

#[async_trait]
impl ArchiveFs for BufferingFs {
    async fn open(&self, path: &str) -> Result<EntryHandle> {
        log::debug!("open: {}", path);
        let node = lookup(&self.archive, path).inspect_err(|e| {
            log::debug!("error opening {}: {}", path, e);
        })?;

        if node.is_dir {
            let entries = list_dir(&self.archive, path)?;
            return Ok(EntryHandle::Directory(DirHandle::new(
                path,
                metadata(path, node),
                entries,
            )));
        }

        let reader = MaterializedEntryReader::open(&self.archive, path, node, self.limit).await?;
        Ok(EntryHandle::Buffered(reader))
    }

    async fn stat(&self, path: &str) -> Result<Metadata> {
        lookup(&self.archive, path).map(|node| metadata(path, node))
    }

    async fn read_dir(&self, path: &str) -> Result<Vec<Metadata>> {
        list_dir(&self.archive, path)
    }

    fn name(&self) -> &'static str {
        "BufferingFs"
    }
}
