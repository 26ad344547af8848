use std::io::SeekFrom;

use crate::error::{Error, Result};
use crate::io::ReadAt;
use crate::sniff::SNIFF_SIZE;
use crate::zip::{EntryStream, IndexNode};

use super::{Archive, Metadata, metadata};

/// Bytes retained at open time for content sniffing and rewinding.
pub const LOOKAHEAD_SIZE: usize = 2 * SNIFF_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Reads are served from the lookahead buffer.
    Sniffing,
    /// The buffer is drained; reads go to the live stream.
    Streaming,
}

/// Streaming entry handle with a small lookahead buffer.
///
/// Only the first [`LOOKAHEAD_SIZE`] bytes are decompressed eagerly;
/// the rest is pulled from the archive as the caller reads. Seeking is
/// limited to rewinding to offset 0 and asking for the size with
/// `SeekFrom::End(0)`.
pub struct LookaheadEntryReader {
    path: String,
    meta: Metadata,
    stream: EntryStream<dyn ReadAt>,
    lookahead: Vec<u8>,
    pos: usize,
    phase: Phase,
}

impl LookaheadEntryReader {
    /// Open a fresh stream for a file entry and fill the lookahead buffer.
    pub async fn open(archive: &Archive, path: &str, node: &IndexNode) -> Result<Self> {
        let mut stream = archive.open_stream(path, node).await?;

        let mut lookahead = vec![0u8; LOOKAHEAD_SIZE];
        let mut filled = 0;
        while filled < lookahead.len() {
            let n = stream.read(&mut lookahead[filled..]).await?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        lookahead.truncate(filled);

        let phase = if lookahead.is_empty() {
            Phase::Streaming
        } else {
            Phase::Sniffing
        };

        Ok(Self {
            path: path.to_string(),
            meta: metadata(path, node),
            stream,
            lookahead,
            pos: 0,
            phase,
        })
    }

    pub fn metadata(&self) -> &Metadata {
        &self.meta
    }

    /// The entry's leading `min(LOOKAHEAD_SIZE, size)` bytes, independent of the read position.
    pub fn lookahead(&self) -> &[u8] {
        &self.lookahead
    }

    pub async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        match self.phase {
            Phase::Sniffing => {
                let rest = &self.lookahead[self.pos..];
                let n = rest.len().min(buf.len());
                buf[..n].copy_from_slice(&rest[..n]);
                self.pos += n;
                if self.pos == self.lookahead.len() {
                    self.phase = Phase::Streaming;
                }
                Ok(n)
            }
            Phase::Streaming => self.stream.read(buf).await,
        }
    }

    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        match pos {
            SeekFrom::Start(0) => {
                if self.stream_advanced() {
                    // Rewinding replays the buffer, then resumes where the stream left off.
                    log::debug!("{}: rewound after streaming past the lookahead", self.path);
                }
                self.pos = 0;
                if !self.lookahead.is_empty() {
                    self.phase = Phase::Sniffing;
                }
                Ok(0)
            }
            SeekFrom::End(0) => Ok(self.meta.size),
            pos => Err(Error::UnsupportedSeek {
                path: self.path.clone(),
                seek: pos,
            }),
        }
    }

    fn stream_advanced(&self) -> bool {
        self.stream.position() > self.lookahead.len() as u64
    }
}
