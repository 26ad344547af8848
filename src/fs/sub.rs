use async_trait::async_trait;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::zip::ROOT;

use super::{ArchiveFs, EntryHandle, Metadata, join, valid_path};

/// A view of another filesystem rooted at one of its directories.
///
/// Paths are prefixed with `dir` and forwarded unchanged otherwise; the
/// wrapped filesystem and archive are never modified.
pub struct SubFs {
    inner: Arc<dyn ArchiveFs>,
    dir: String,
}

impl SubFs {
    fn full_path(&self, path: &str) -> Result<String> {
        if !valid_path(path) {
            return Err(Error::InvalidPath {
                path: path.to_string(),
            });
        }
        if path == ROOT {
            Ok(self.dir.clone())
        } else {
            Ok(join(&self.dir, path))
        }
    }
}

/// Narrow `fsys` to the directory `dir`, which must exist.
///
/// `dir == "."` returns `fsys` itself.
pub async fn sub(fsys: Arc<dyn ArchiveFs>, dir: &str) -> Result<Arc<dyn ArchiveFs>> {
    if !valid_path(dir) {
        return Err(Error::InvalidPath {
            path: dir.to_string(),
        });
    }
    if dir == ROOT {
        return Ok(fsys);
    }
    if !fsys.stat(dir).await?.is_dir {
        return Err(Error::NotADirectory {
            path: dir.to_string(),
        });
    }
    Ok(Arc::new(SubFs {
        inner: fsys,
        dir: dir.to_string(),
    }))
}

#[async_trait]
impl ArchiveFs for SubFs {
    async fn open(&self, path: &str) -> Result<EntryHandle> {
        let full = self.full_path(path)?;
        self.inner.open(&full).await
    }

    async fn stat(&self, path: &str) -> Result<Metadata> {
        let full = self.full_path(path)?;
        self.inner.stat(&full).await
    }

    async fn read_dir(&self, path: &str) -> Result<Vec<Metadata>> {
        let full = self.full_path(path)?;
        self.inner.read_dir(&full).await
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}
