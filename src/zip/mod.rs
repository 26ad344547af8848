//! ZIP archive parsing and the per-entry decompressing stream.
//!
//! ## Architecture
//!
//! - [`structures`]: Data structures representing ZIP format elements (EOCD, file headers, etc.)
//! - [`parser`]: Low-level parsing of ZIP structures from raw bytes
//! - [`index`]: Directory tree built from the central directory
//! - [`stream`]: Forward-only decompression of one entry
//! - [`archive`]: The opened archive tying the above together
//!
//! The EOCD is read first (from the end of the file), then the Central
//! Directory, so opening an archive never touches entry data.
//!
//! ## Supported Features
//!
//! - Standard ZIP format (PKZIP APPNOTE 6.3.x compatible)
//! - ZIP64 extensions for files > 4GB
//! - STORED and DEFLATE compression methods
//! - CRC-32 verification at the end of every entry
//!
//! ## Limitations
//!
//! - No encryption support
//! - No multi-disk archive support
//! - No BZIP2, LZMA, or other compression methods

mod archive;
mod index;
mod parser;
mod stream;
mod structures;

pub use archive::ZipArchive;
pub use index::{ArchiveIndex, IndexNode, ROOT, normalize_entry_name};
pub use parser::ZipParser;
pub use stream::EntryStream;
pub use structures::*;
