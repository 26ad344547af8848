//! Forward-only decompressing stream over one archive entry.

use flate2::{Decompress, FlushDecompress, Status};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::io::ReadAt;

use super::structures::{CompressionMethod, ZipFileEntry};

/// Compressed bytes fetched from the source per read.
const INPUT_CHUNK: usize = 32 * 1024;

enum Codec {
    Stored,
    Deflate(Box<Decompress>),
}

/// Decompressing reader for a single entry.
///
/// Holds its own position into the source, so streams for the same or
/// different entries can be read concurrently.
pub struct EntryStream<R: ReadAt + ?Sized> {
    source: Source<R>,
    path: String,
    codec: Codec,
    expected_size: u64,
    expected_crc: u32,
    produced: u64,
    hasher: crc32fast::Hasher,
    inflate_done: bool,
    finished: bool,
}

impl<R: ReadAt + ?Sized> EntryStream<R> {
    pub(crate) fn new(
        reader: Arc<R>,
        path: String,
        entry: &ZipFileEntry,
        data_offset: u64,
    ) -> Result<Self> {
        let codec = match entry.compression_method {
            CompressionMethod::Stored => Codec::Stored,
            CompressionMethod::Deflate => Codec::Deflate(Box::new(Decompress::new(false))),
            CompressionMethod::Unknown(method) => {
                return Err(Error::UnsupportedCompression { path, method });
            }
        };

        Ok(Self {
            source: Source {
                reader,
                offset: data_offset,
                remaining: entry.compressed_size,
                input: Vec::new(),
                input_pos: 0,
            },
            path,
            codec,
            expected_size: entry.uncompressed_size,
            expected_crc: entry.crc32,
            produced: 0,
            hasher: crc32fast::Hasher::new(),
            inflate_done: false,
            finished: false,
        })
    }

    /// Uncompressed size recorded in the central directory.
    pub fn size(&self) -> u64 {
        self.expected_size
    }

    /// Decompressed bytes produced so far.
    pub fn position(&self) -> u64 {
        self.produced
    }

    /// Read decompressed bytes; `Ok(0)` marks the verified end of the entry.
    pub async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() || self.finished {
            return Ok(0);
        }

        let n = match &mut self.codec {
            Codec::Stored => read_stored(&mut self.source, &self.path, buf).await?,
            Codec::Deflate(decompress) => {
                if self.inflate_done {
                    0
                } else {
                    let (n, done) =
                        read_deflate(&mut self.source, &self.path, decompress, buf).await?;
                    self.inflate_done = done;
                    n
                }
            }
        };

        if n == 0 {
            self.finish()?;
            return Ok(0);
        }

        self.produced += n as u64;
        if self.produced > self.expected_size {
            return Err(Error::corrupt(&self.path, "more data than the recorded size"));
        }
        self.hasher.update(&buf[..n]);
        Ok(n)
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        if self.produced != self.expected_size {
            return Err(Error::corrupt(
                &self.path,
                format!(
                    "decompressed {} bytes, expected {}",
                    self.produced, self.expected_size
                ),
            ));
        }
        let crc = std::mem::take(&mut self.hasher).finalize();
        if crc != self.expected_crc {
            return Err(Error::corrupt(
                &self.path,
                format!("crc32 {:08x}, expected {:08x}", crc, self.expected_crc),
            ));
        }
        Ok(())
    }
}

/// Compressed bytes of one entry still to be fetched from the source.
struct Source<R: ReadAt + ?Sized> {
    reader: Arc<R>,
    /// Absolute offset of the next compressed byte to fetch.
    offset: u64,
    /// Compressed bytes not yet fetched.
    remaining: u64,
    input: Vec<u8>,
    input_pos: usize,
}

impl<R: ReadAt + ?Sized> Source<R> {
    fn buffered(&self) -> &[u8] {
        &self.input[self.input_pos..]
    }

    fn exhausted(&self) -> bool {
        self.input_pos == self.input.len() && self.remaining == 0
    }

    async fn fill(&mut self, path: &str) -> Result<()> {
        let want = (INPUT_CHUNK as u64).min(self.remaining) as usize;
        self.input.resize(want, 0);
        let n = self.reader.read_at(self.offset, &mut self.input).await?;
        if n == 0 {
            return Err(Error::corrupt(path, "archive ended inside entry data"));
        }
        self.input.truncate(n);
        self.input_pos = 0;
        self.offset += n as u64;
        self.remaining -= n as u64;
        Ok(())
    }
}

async fn read_stored<R: ReadAt + ?Sized>(
    source: &mut Source<R>,
    path: &str,
    buf: &mut [u8],
) -> Result<usize> {
    let want = (buf.len() as u64).min(source.remaining) as usize;
    if want == 0 {
        return Ok(0);
    }
    let n = source.reader.read_at(source.offset, &mut buf[..want]).await?;
    if n == 0 {
        return Err(Error::corrupt(path, "archive ended inside entry data"));
    }
    source.offset += n as u64;
    source.remaining -= n as u64;
    Ok(n)
}

/// Inflate into `buf`, returning the bytes written and whether the deflate stream ended.
async fn read_deflate<R: ReadAt + ?Sized>(
    source: &mut Source<R>,
    path: &str,
    decompress: &mut Decompress,
    buf: &mut [u8],
) -> Result<(usize, bool)> {
    loop {
        if source.buffered().is_empty() && source.remaining > 0 {
            source.fill(path).await?;
        }

        let before_in = decompress.total_in();
        let before_out = decompress.total_out();
        let status = decompress
            .decompress(source.buffered(), buf, FlushDecompress::None)
            .map_err(|e| Error::corrupt(path, e))?;
        let consumed = (decompress.total_in() - before_in) as usize;
        let written = (decompress.total_out() - before_out) as usize;
        source.input_pos += consumed;

        let done = status == Status::StreamEnd;
        if written > 0 || done {
            return Ok((written, done));
        }
        if source.exhausted() {
            return Err(Error::corrupt(path, "deflate stream is truncated"));
        }
        if consumed == 0 && !source.buffered().is_empty() {
            return Err(Error::corrupt(path, "deflate stream makes no progress"));
        }
    }
}
