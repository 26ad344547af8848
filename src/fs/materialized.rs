use std::io::{Cursor, Read, Seek, SeekFrom};

use crate::error::{Error, Result};
use crate::limit::SizeLimit;
use crate::sniff::SNIFF_SIZE;
use crate::zip::IndexNode;

use super::{Archive, Metadata, metadata};

/// Fully decompressed entry with unrestricted random access.
pub struct MaterializedEntryReader {
    meta: Metadata,
    data: Cursor<Vec<u8>>,
}

impl MaterializedEntryReader {
    /// Decompress the whole entry, provided its recorded size is below `limit`.
    ///
    /// Oversized entries fail with [`Error::SizeLimitExceeded`] before any
    /// archive data is read.
    pub async fn open(
        archive: &Archive,
        path: &str,
        node: &IndexNode,
        limit: SizeLimit,
    ) -> Result<Self> {
        if !limit.admits(node.size) {
            log::debug!(
                "buffer size exceeded for entry: {}, size: {}",
                path,
                node.size
            );
            return Err(Error::SizeLimitExceeded {
                path: path.to_string(),
                size: node.size,
                limit: limit.bytes(),
            });
        }
        let len = usize::try_from(node.size).map_err(|_| Error::SizeLimitExceeded {
            path: path.to_string(),
            size: node.size,
            limit: limit.bytes(),
        })?;

        let mut stream = archive.open_stream(path, node).await?;
        let mut data = vec![0u8; len];
        let mut filled = 0;
        while filled < len {
            let n = stream.read(&mut data[filled..]).await?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        // Reaching the end of the stream verifies the length and checksum;
        // any byte past the recorded size is reported by the stream itself.
        stream.read(&mut [0u8; 1]).await?;

        Ok(Self {
            meta: metadata(path, node),
            data: Cursor::new(data),
        })
    }

    pub fn metadata(&self) -> &Metadata {
        &self.meta
    }

    pub fn bytes(&self) -> &[u8] {
        self.data.get_ref()
    }

    /// Leading bytes used for content sniffing.
    pub fn sniff_bytes(&self) -> &[u8] {
        let data = self.data.get_ref();
        &data[..data.len().min(SNIFF_SIZE)]
    }

    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        Ok(self.data.read(buf)?)
    }

    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        Ok(self.data.seek(pos)?)
    }
}
