//! Locating the content root of archives made by zipping a folder.

use std::sync::Arc;

use crate::error::Result;
use crate::zip::ROOT;

use super::{ArchiveFs, join, sub};

/// Stray artifacts that do not count when deciding whether a directory is a wrapper.
pub const EXCLUDED_FILES: &[&str] = &["wget.log", "nohup.out"];

/// Maximum number of wrapper directories descended into.
pub const TRAVERSE_LIMIT: usize = 5;

/// Find the content root of `fsys` and return a view narrowed to it.
///
/// Descends while the current directory holds exactly one entry apart
/// from [`EXCLUDED_FILES`] and that entry is a directory. Anything
/// ambiguous stops the descent, so the result may be `fsys` itself.
pub async fn detect_root(fsys: Arc<dyn ArchiveFs>) -> Result<Arc<dyn ArchiveFs>> {
    let root = detect_root_path(fsys.as_ref()).await?;
    if root != ROOT {
        log::info!("detected root: {}", root);
    }
    sub(fsys, &root).await
}

/// Path of the detected content root within `fsys`, `.` if nothing was collapsed.
pub async fn detect_root_path(fsys: &dyn ArchiveFs) -> Result<String> {
    let mut root = ROOT.to_string();
    for _ in 0..TRAVERSE_LIMIT {
        match single_child_dir(fsys, &root).await? {
            Some(child) => root = join(&root, &child),
            None => break,
        }
    }
    Ok(root)
}

/// Name of the single directory child of `dir`, if there is exactly one candidate.
async fn single_child_dir(fsys: &dyn ArchiveFs, dir: &str) -> Result<Option<String>> {
    let children = fsys.read_dir(dir).await?;
    let mut candidates = children
        .into_iter()
        .filter(|child| !EXCLUDED_FILES.contains(&child.name.as_str()));

    match (candidates.next(), candidates.next()) {
        (Some(only), None) if only.is_dir => Ok(Some(only.name)),
        _ => Ok(None),
    }
}
