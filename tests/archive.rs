mod common;

use std::io::{Cursor, Write};
use std::sync::Arc;

use zip::write::FileOptions;

use common::*;
use zserve::fs::Archive;
use zserve::zip::CompressionMethod;
use zserve::{
    ArchiveFs, Error, LocalFileReader, MemoryReader, ReadAt, StreamingFs, ZipArchive,
};

async fn try_open(bytes: Vec<u8>) -> zserve::Result<Archive> {
    let reader: Arc<dyn ReadAt> = Arc::new(MemoryReader::new(bytes));
    ZipArchive::open(reader).await
}

#[tokio::test]
async fn lists_entries_in_directory_order() {
    let bytes = build_zip_with(
        &[
            ("b.txt", b"bee"),
            ("a/", b""),
            ("a/c.bin", &noise(2048)),
        ],
        zip::CompressionMethod::Deflated,
    );
    let archive = ZipArchive::open(Arc::new(MemoryReader::new(bytes)))
        .await
        .unwrap();

    let names: Vec<_> = archive
        .list_files()
        .iter()
        .map(|e| e.file_name.as_str())
        .collect();
    assert_eq!(names, vec!["b.txt", "a/", "a/c.bin"]);

    let files = archive.list_files();
    assert!(!files[0].is_directory);
    assert_eq!(files[0].uncompressed_size, 3);
    assert_eq!(files[0].compression_method, CompressionMethod::Deflate);
    assert!(files[1].is_directory);
    assert_eq!(files[2].uncompressed_size, 2048);
    assert!(files.iter().all(|e| !e.is_encrypted()));

    let root = archive.index().get(".").unwrap();
    assert_eq!(root.children().collect::<Vec<_>>(), vec!["a", "b.txt"]);
    let dir = archive.index().get("a").unwrap();
    assert!(dir.is_dir);
    assert!(dir.entry.is_some());
}

#[tokio::test]
async fn finds_directory_behind_archive_comment() {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer.set_comment("built for the docs site, see index.html ".repeat(20));
    writer
        .start_file("index.html", FileOptions::default())
        .unwrap();
    writer.write_all(b"<html></html>").unwrap();
    let bytes = writer.finish().unwrap().into_inner();

    let archive = Arc::new(try_open(bytes).await.unwrap());
    let fsys = StreamingFs::new(archive);
    assert_eq!(read_all(&fsys, "index.html").await, b"<html></html>");
}

#[tokio::test]
async fn empty_archive_has_an_empty_root() {
    let bytes = build_zip(&[]);
    let archive = Arc::new(try_open(bytes).await.unwrap());
    assert!(archive.list_files().is_empty());
    let fsys = StreamingFs::new(archive);
    assert!(fsys.read_dir(".").await.unwrap().is_empty());
    assert!(fsys.stat(".").await.unwrap().is_dir);
}

#[tokio::test]
async fn rejects_data_that_is_not_an_archive() {
    for bytes in [Vec::new(), b"PK\x05\x06".to_vec(), noise(4096)] {
        assert!(matches!(
            try_open(bytes).await,
            Err(Error::InvalidArchive(_))
        ));
    }
}

#[tokio::test]
async fn rejects_central_directory_outside_the_file() {
    let mut bytes = build_zip(&[("a.txt", b"a")]);
    let eocd = bytes.len() - 22;
    // central directory offset
    bytes[eocd + 16..eocd + 20].copy_from_slice(&0x00ff_ffffu32.to_le_bytes());
    assert!(matches!(
        try_open(bytes).await,
        Err(Error::InvalidArchive(_))
    ));
}

#[tokio::test]
async fn unsupported_and_encrypted_entries_fail_on_open() {
    let bytes = build_zip_with(
        &[("odd.bin", b"odd"), ("secret.txt", b"secret")],
        zip::CompressionMethod::Stored,
    );
    let mut patched = bytes.clone();
    let headers = cdfh_offsets(&bytes);
    assert_eq!(headers.len(), 2);
    // compression method 12 (bzip2) on the first, encryption flag on the second
    patched[headers[0] + 10..headers[0] + 12].copy_from_slice(&12u16.to_le_bytes());
    patched[headers[1] + 8] |= 0x01;

    let archive = Arc::new(try_open(patched).await.unwrap());
    assert_eq!(
        archive.list_files()[0].compression_method,
        CompressionMethod::Unknown(12)
    );

    for fsys in [
        Arc::new(StreamingFs::new(Arc::clone(&archive))) as Arc<dyn ArchiveFs>,
        Arc::new(zserve::BufferingFs::new(archive, LARGE_LIMIT)),
    ] {
        assert!(matches!(
            fsys.open("odd.bin").await,
            Err(Error::UnsupportedCompression { method: 12, .. })
        ));
        assert!(matches!(
            fsys.open("secret.txt").await,
            Err(Error::Encrypted { .. })
        ));
        // listing never touches entry data
        assert_eq!(child_names(fsys.as_ref(), ".").await, vec!["odd.bin", "secret.txt"]);
    }
}

#[tokio::test]
async fn entry_names_are_normalized() {
    let bytes = build_zip(&[
        ("./site/index.html", b"<html>"),
        ("site\\css\\main.css", b"body{}"),
        ("../escape.txt", b"nope"),
        ("/abs.txt", b"abs"),
    ]);
    let archive = Arc::new(try_open(bytes).await.unwrap());
    assert_eq!(archive.list_files().len(), 4);

    let fsys = StreamingFs::new(archive);
    assert_eq!(child_names(&fsys, ".").await, vec!["abs.txt", "site"]);
    assert_eq!(child_names(&fsys, "site").await, vec!["css", "index.html"]);
    assert_eq!(read_all(&fsys, "site/css/main.css").await, b"body{}");
    assert!(fsys.stat("escape.txt").await.is_err());
}

#[tokio::test]
async fn serves_archive_from_local_file() {
    let body = noise(70_000);
    let bytes = build_zip(&[("assets/blob.bin", &body), ("index.html", b"<html>")]);
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&bytes).unwrap();
    file.flush().unwrap();

    let reader: Arc<dyn ReadAt> = Arc::new(LocalFileReader::new(file.path()).unwrap());
    assert_eq!(reader.size(), bytes.len() as u64);

    let archive = Arc::new(ZipArchive::open(reader).await.unwrap());
    for fsys in [
        Arc::new(StreamingFs::new(Arc::clone(&archive))) as Arc<dyn ArchiveFs>,
        Arc::new(zserve::BufferingFs::new(archive, LARGE_LIMIT)),
    ] {
        assert_eq!(read_all(fsys.as_ref(), "assets/blob.bin").await, body);
        assert_eq!(read_all(fsys.as_ref(), "index.html").await, b"<html>");
    }
}
