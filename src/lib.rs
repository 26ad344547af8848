//! # zserve
//!
//! Expose the contents of a ZIP archive as a read-only virtual filesystem
//! that a static file server can serve directly.
//!
//! The archive is read through the [`ReadAt`] trait, so it may live on
//! local disk, in memory, or on a remote HTTP server that supports Range
//! requests. Only the central directory is read when the archive is
//! opened; entry data is decompressed when a path is opened.
//!
//! ## Features
//!
//! - Two interchangeable filesystem variants: [`StreamingFs`] keeps memory
//!   per open file bounded by a small lookahead buffer, [`BufferingFs`]
//!   materializes entries below a [`SizeLimit`] for full random access
//! - Root detection that skips wrapper folders left by zipping a directory
//! - Content-type sniffing over an entry's leading bytes
//! - ZIP64, STORED and DEFLATE entries, CRC-32 verified
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use zserve::{FsConfig, LocalFileReader, ReadAt, ZipArchive, open_fs};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let reader: Arc<dyn ReadAt> = Arc::new(LocalFileReader::new(Path::new("site.zip"))?);
//!     let archive = Arc::new(ZipArchive::open(reader).await?);
//!
//!     let config = FsConfig {
//!         detect_root: true,
//!         ..FsConfig::default()
//!     };
//!     let fsys = open_fs(archive, &config).await?;
//!
//!     let mut file = fsys.open("index.html").await?;
//!     println!("{:?}", file.content_type());
//!     let mut body = Vec::new();
//!     file.read_to_end(&mut body).await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod fs;
pub mod io;
pub mod limit;
pub mod sniff;
pub mod zip;

pub use cli::Cli;
pub use config::{FsConfig, Mode, open_fs};
pub use error::{Error, Result};
pub use fs::{
    ArchiveFs, BufferingFs, EntryHandle, LookaheadEntryReader, MaterializedEntryReader, Metadata,
    StreamingFs, detect_root,
};
pub use io::{HttpRangeReader, LocalFileReader, MemoryReader, ReadAt};
pub use limit::SizeLimit;
pub use sniff::detect_content_type;
pub use zip::{ZipArchive, ZipFileEntry};
