#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::sync::Arc;

use zip::CompressionMethod;
use zip::write::FileOptions;

use zserve::fs::Archive;
use zserve::{
    ArchiveFs, BufferingFs, MemoryReader, ReadAt, Result, SizeLimit, StreamingFs, ZipArchive,
};

pub const LARGE_LIMIT: SizeLimit = SizeLimit::from_bytes(256 * 1024 * 1024 * 1024);

pub fn build_zip_with(entries: &[(&str, &[u8])], method: CompressionMethod) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(method);
    for (name, body) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(body).unwrap();
        }
    }
    writer.finish().unwrap().into_inner()
}

pub fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    build_zip_with(entries, CompressionMethod::Deflated)
}

pub async fn open_archive(bytes: Vec<u8>) -> Arc<Archive> {
    let reader: Arc<dyn ReadAt> = Arc::new(MemoryReader::new(bytes));
    Arc::new(ZipArchive::open(reader).await.unwrap())
}

/// A buffering and a streaming view over the same archive bytes.
pub async fn both_fs(entries: &[(&str, &[u8])]) -> Vec<Arc<dyn ArchiveFs>> {
    both_fs_from(build_zip(entries), LARGE_LIMIT).await
}

pub async fn both_fs_from(bytes: Vec<u8>, limit: SizeLimit) -> Vec<Arc<dyn ArchiveFs>> {
    let archive = open_archive(bytes).await;
    let buffering: Arc<dyn ArchiveFs> = Arc::new(BufferingFs::new(Arc::clone(&archive), limit));
    let streaming: Arc<dyn ArchiveFs> = Arc::new(StreamingFs::new(archive));
    vec![buffering, streaming]
}

pub async fn read_all(fsys: &dyn ArchiveFs, path: &str) -> Vec<u8> {
    let mut handle = fsys.open(path).await.unwrap();
    let mut out = Vec::new();
    handle.read_to_end(&mut out).await.unwrap();
    out
}

/// Open and read `path` to the end, surfacing the first error from either step.
pub async fn try_read_all(fsys: &dyn ArchiveFs, path: &str) -> Result<Vec<u8>> {
    let mut handle = fsys.open(path).await?;
    let mut out = Vec::new();
    handle.read_to_end(&mut out).await?;
    Ok(out)
}

pub async fn child_names(fsys: &dyn ArchiveFs, path: &str) -> Vec<String> {
    fsys.read_dir(path)
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.name)
        .collect()
}

/// Deterministic bytes that do not compress well.
pub fn noise(len: usize) -> Vec<u8> {
    let mut state: u32 = 0x1234_5678;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 24) as u8
        })
        .collect()
}

/// Offsets of every central directory file header in `bytes`.
pub fn cdfh_offsets(bytes: &[u8]) -> Vec<usize> {
    bytes
        .windows(4)
        .enumerate()
        .filter(|(_, w)| *w == b"PK\x01\x02")
        .map(|(i, _)| i)
        .collect()
}

/// Overwrite a little-endian `u32` field of the first central directory header.
pub fn patch_cdfh_u32(bytes: &mut [u8], field_offset: usize, value: u32) {
    let at = cdfh_offsets(bytes)[0] + field_offset;
    bytes[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

pub const CDFH_COMPRESSED_SIZE: usize = 20;
pub const CDFH_UNCOMPRESSED_SIZE: usize = 24;
