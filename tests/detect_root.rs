mod common;

use std::sync::Arc;

use async_trait::async_trait;

use common::*;
use zserve::fs::{detect_root_path, sub};
use zserve::{
    ArchiveFs, EntryHandle, Error, FsConfig, Metadata, Mode, Result, SizeLimit, detect_root,
    open_fs,
};

async fn detected_listing(entries: &[(&str, &[u8])]) -> Vec<Vec<String>> {
    let mut listings = Vec::new();
    for fsys in both_fs(entries).await {
        let root = detect_root(fsys).await.unwrap();
        listings.push(child_names(root.as_ref(), ".").await);
    }
    listings
}

#[tokio::test]
async fn collapses_single_wrapper_directory() {
    let listings = detected_listing(&[
        ("www.website.com/abc/1.html", b"1"),
        ("www.website.com/abc/2.html", b"2"),
        ("www.website.com/def/1.html", b"1"),
        ("www.website.com/def/2.html", b"2"),
        ("www.website.com/index.html", b"<html>"),
    ])
    .await;
    for listing in listings {
        assert_eq!(listing, vec!["abc", "def", "index.html"]);
    }
}

#[tokio::test]
async fn keeps_root_with_several_children() {
    let listings = detected_listing(&[
        ("abc/1.html", b"1"),
        ("def/1.html", b"1"),
        ("index.html", b"<html>"),
    ])
    .await;
    for listing in listings {
        assert_eq!(listing, vec!["abc", "def", "index.html"]);
    }
}

#[tokio::test]
async fn ignores_excluded_files() {
    let listings = detected_listing(&[
        ("def/1.html", b"1"),
        ("def/index.html", b"<html>"),
        ("wget.log", b"log"),
        ("nohup.out", b"out"),
    ])
    .await;
    for listing in listings {
        assert_eq!(listing, vec!["1.html", "index.html"]);
    }
}

#[tokio::test]
async fn stops_at_traverse_limit() {
    for fsys in both_fs(&[("a/b/c/d/e/f/g/index.html", b"deep")]).await {
        assert_eq!(detect_root_path(fsys.as_ref()).await.unwrap(), "a/b/c/d/e");

        let root = detect_root(fsys).await.unwrap();
        assert_eq!(child_names(root.as_ref(), ".").await, vec!["f"]);
        assert_eq!(read_all(root.as_ref(), "f/g/index.html").await, b"deep");
    }
}

#[tokio::test]
async fn single_file_child_is_not_descended() {
    for fsys in both_fs(&[("site/index.html", b"<html>")]).await {
        assert_eq!(detect_root_path(fsys.as_ref()).await.unwrap(), "site");
    }
    for fsys in both_fs(&[("index.html", b"<html>")]).await {
        assert_eq!(detect_root_path(fsys.as_ref()).await.unwrap(), ".");
    }
}

#[tokio::test]
async fn only_excluded_files_keep_the_root() {
    for fsys in both_fs(&[("wget.log", b"log")]).await {
        assert_eq!(detect_root_path(fsys.as_ref()).await.unwrap(), ".");
    }
}

struct BrokenFs;

#[async_trait]
impl ArchiveFs for BrokenFs {
    async fn open(&self, path: &str) -> Result<EntryHandle> {
        Err(Error::NotFound {
            path: path.to_string(),
        })
    }

    async fn stat(&self, _path: &str) -> Result<Metadata> {
        Ok(Metadata {
            name: ".".to_string(),
            size: 0,
            is_dir: true,
            modified: None,
        })
    }

    async fn read_dir(&self, _path: &str) -> Result<Vec<Metadata>> {
        Err(std::io::Error::other("listing failed").into())
    }

    fn name(&self) -> &'static str {
        "BrokenFs"
    }
}

#[tokio::test]
async fn listing_failure_is_propagated() {
    let fsys: Arc<dyn ArchiveFs> = Arc::new(BrokenFs);
    assert!(matches!(detect_root(fsys).await, Err(Error::Io(_))));
}

#[tokio::test]
async fn sub_views_prefix_paths() {
    for fsys in both_fs(&[("site/css/main.css", b"body{}"), ("other.txt", b"x")]).await {
        let site = sub(fsys, "site").await.unwrap();
        assert_eq!(child_names(site.as_ref(), ".").await, vec!["css"]);
        assert_eq!(read_all(site.as_ref(), "css/main.css").await, b"body{}");
        assert!(matches!(
            site.open("other.txt").await,
            Err(Error::NotFound { .. })
        ));
        assert!(matches!(
            site.open("../other.txt").await,
            Err(Error::InvalidPath { .. })
        ));

        let nested = sub(site, "css").await.unwrap();
        assert_eq!(nested.stat("main.css").await.unwrap().size, 6);
    }
}

#[tokio::test]
async fn sub_requires_an_existing_directory() {
    for fsys in both_fs(&[("site/index.html", b"<html>")]).await {
        assert!(matches!(
            sub(Arc::clone(&fsys), "missing").await,
            Err(Error::NotFound { .. })
        ));
        assert!(matches!(
            sub(Arc::clone(&fsys), "site/index.html").await,
            Err(Error::NotADirectory { .. })
        ));
        assert!(matches!(
            sub(fsys, "/site").await,
            Err(Error::InvalidPath { .. })
        ));
    }
}

#[tokio::test]
async fn config_rejects_root_with_detection() {
    let archive = open_archive(build_zip(&[("site/index.html", b"<html>")])).await;
    let config = FsConfig {
        root: "site".to_string(),
        detect_root: true,
        ..FsConfig::default()
    };
    assert!(matches!(
        open_fs(archive, &config).await,
        Err(Error::Config(_))
    ));
}

#[tokio::test]
async fn config_serves_configured_root() {
    let bytes = build_zip(&[("public/index.html", b"<html>"), ("src/main.rs", b"fn main() {}")]);
    for mode in [Mode::Streaming, Mode::Buffering] {
        let archive = open_archive(bytes.clone()).await;
        let config = FsConfig {
            mode,
            root: "public".to_string(),
            ..FsConfig::default()
        };
        let fsys = open_fs(archive, &config).await.unwrap();
        assert_eq!(child_names(fsys.as_ref(), ".").await, vec!["index.html"]);

        let archive = open_archive(bytes.clone()).await;
        let config = FsConfig {
            mode,
            root: "missing".to_string(),
            ..FsConfig::default()
        };
        assert!(matches!(
            open_fs(archive, &config).await,
            Err(Error::NotFound { .. })
        ));
    }
}

#[tokio::test]
async fn config_detects_root_in_both_modes() {
    let bytes = build_zip(&[
        ("export/www/index.html", b"<html>"),
        ("export/www/app.js", b"run()"),
        ("wget.log", b"log"),
    ]);
    for (mode, expected) in [(Mode::Streaming, "StreamingFs"), (Mode::Buffering, "BufferingFs")] {
        let archive = open_archive(bytes.clone()).await;
        let config = FsConfig {
            mode,
            buffer_limit: SizeLimit::from_bytes(1024),
            detect_root: true,
            ..FsConfig::default()
        };
        let fsys = open_fs(archive, &config).await.unwrap();
        assert_eq!(fsys.name(), expected);
        assert_eq!(child_names(fsys.as_ref(), ".").await, vec!["app.js", "index.html"]);
        assert_eq!(read_all(fsys.as_ref(), "app.js").await, b"run()");
    }
}
