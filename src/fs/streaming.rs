use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;

use super::{
    Archive, ArchiveFs, DirHandle, EntryHandle, LookaheadEntryReader, Metadata, list_dir, lookup,
    metadata,
};

/// Filesystem view that streams file entries through a lookahead buffer.
pub struct StreamingFs {
    archive: Arc<Archive>,
}

impl StreamingFs {
    pub fn new(archive: Arc<Archive>) -> Self {
        Self { archive }
    }
}

#[async_trait]
impl ArchiveFs for StreamingFs {
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

        let reader = LookaheadEntryReader::open(&self.archive, path, node).await?;
        Ok(EntryHandle::Streaming(reader))
    }

    async fn stat(&self, path: &str) -> Result<Metadata> {
        lookup(&self.archive, path).map(|node| metadata(path, node))
    }

    async fn read_dir(&self, path: &str) -> Result<Vec<Metadata>> {
        list_dir(&self.archive, path)
    }

    fn name(&self) -> &'static str {
        "StreamingFs"
    }
}
