//! Filesystem configuration, built once at startup and passed by reference.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::fs::{Archive, ArchiveFs, BufferingFs, StreamingFs, detect_root, sub};
use crate::limit::SizeLimit;
use crate::zip::ROOT;

/// How file entries are exposed to readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Decompress on demand behind a small lookahead buffer.
    #[default]
    Streaming,
    /// Decompress each opened entry completely into memory.
    Buffering,
}

#[derive(Debug, Clone)]
pub struct FsConfig {
    pub mode: Mode,
    /// Only consulted in [`Mode::Buffering`].
    pub buffer_limit: SizeLimit,
    /// Directory inside the archive to serve, `.` for the archive root.
    pub root: String,
    pub detect_root: bool,
}

impl FsConfig {
    pub const DEFAULT_BUFFER_LIMIT: SizeLimit = SizeLimit::from_bytes(256 * 1024 * 1024);

    pub fn validate(&self) -> Result<()> {
        if self.detect_root && self.root != ROOT {
            return Err(Error::Config(
                "conflicting options: set root and detect root".into(),
            ));
        }
        Ok(())
    }
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            buffer_limit: Self::DEFAULT_BUFFER_LIMIT,
            root: ROOT.to_string(),
            detect_root: false,
        }
    }
}

/// Build the filesystem view described by `config` over `archive`.
///
/// A failed root detection is logged and the undetected view is kept.
pub async fn open_fs(archive: Arc<Archive>, config: &FsConfig) -> Result<Arc<dyn ArchiveFs>> {
    config.validate()?;

    let mut fsys: Arc<dyn ArchiveFs> = match config.mode {
        Mode::Streaming => Arc::new(StreamingFs::new(archive)),
        Mode::Buffering => Arc::new(BufferingFs::new(archive, config.buffer_limit)),
    };

    if config.root != ROOT {
        log::debug!("opening sub-filesystem at {}", config.root);
        fsys = sub(fsys, &config.root).await?;
    }

    if config.detect_root {
        match detect_root(Arc::clone(&fsys)).await {
            Ok(detected) => fsys = detected,
            Err(e) => log::warn!("auto-detection of website root failed: {}", e),
        }
    }

    Ok(fsys)
}
