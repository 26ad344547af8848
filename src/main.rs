//! Command-line front end for zserve.
//!
//! Opens a local or remote ZIP archive, builds the configured virtual
//! filesystem and either lists it or prints entries through the same
//! open/read contract a file server uses.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

use zserve::cli::normalize_arg_path;
use zserve::{ArchiveFs, Cli, HttpRangeReader, LocalFileReader, ReadAt, ZipArchive, open_fs};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    if cli.is_http_url() {
        let reader = HttpRangeReader::new(cli.archive.clone())
            .await
            .context("cannot open remote archive")?;
        let transferred_before = reader.transferred_bytes();
        let reader = Arc::new(reader);

        process_zip(reader.clone(), &cli).await?;

        let transferred = reader.transferred_bytes() - transferred_before;
        log::info!("Total bytes transferred: {}", format_size(transferred));
    } else {
        let reader = LocalFileReader::new(Path::new(&cli.archive))
            .with_context(|| format!("cannot open input file {}", cli.archive))?;
        process_zip(Arc::new(reader), &cli).await?;
    }

    Ok(())
}

/// Open the archive, build the filesystem view and run the requested action.
async fn process_zip(reader: Arc<dyn ReadAt>, cli: &Cli) -> Result<()> {
    let archive = ZipArchive::open(reader)
        .await
        .context("cannot open input ZIP file")?;
    let fsys = open_fs(Arc::new(archive), &cli.fs_config())
        .await
        .context("cannot open served root")?;
    log::debug!("serving through {}", fsys.name());

    if cli.list || cli.paths.is_empty() {
        return list_tree(fsys.as_ref()).await;
    }

    for path in &cli.paths {
        let path = normalize_arg_path(path);
        if cli.content_type {
            print_content_type(fsys.as_ref(), &path).await?;
        } else {
            print_entry(fsys.as_ref(), &path).await?;
        }
    }

    Ok(())
}

/// Print every path of the served tree with size and modification time.
async fn list_tree(fsys: &dyn ArchiveFs) -> Result<()> {
    println!("{:>10}  {:>10}  {:>5}  Name", "Length", "Date", "Time");
    println!("{}", "-".repeat(50));

    let mut total_size = 0u64;
    let mut file_count = 0usize;
    let mut pending = vec![".".to_string()];

    while let Some(dir) = pending.pop() {
        let children = fsys
            .read_dir(&dir)
            .await
            .with_context(|| format!("cannot list {}", dir))?;

        let paths: Vec<String> = children
            .iter()
            .map(|child| {
                if dir == "." {
                    child.name.clone()
                } else {
                    format!("{}/{}", dir, child.name)
                }
            })
            .collect();

        // Reversed so the stack pops directories in name order
        for (child, path) in children.iter().zip(&paths).rev() {
            if child.is_dir {
                pending.push(path.clone());
            }
        }

        for (child, path) in children.iter().zip(&paths) {
            let (date, time) = match child.modified {
                Some(modified) => {
                    let (year, month, day) = modified.ymd();
                    let (hour, minute, _second) = modified.hms();
                    (
                        format!("{:04}-{:02}-{:02}", year, month, day),
                        format!("{:02}:{:02}", hour, minute),
                    )
                }
                None => (String::new(), String::new()),
            };
            if child.is_dir {
                println!("{:>10}  {:>10}  {:>5}  {}/", "", date, time, path);
            } else {
                println!("{:>10}  {:>10}  {:>5}  {}", child.size, date, time, path);
                total_size += child.size;
                file_count += 1;
            }
        }
    }

    println!("{}", "-".repeat(50));
    println!("{:>10}  {:>17}  {} files", total_size, "", file_count);
    Ok(())
}

async fn print_content_type(fsys: &dyn ArchiveFs, path: &str) -> Result<()> {
    let handle = fsys
        .open(path)
        .await
        .with_context(|| format!("cannot open {}", path))?;
    println!("{}: {}", path, handle.content_type().unwrap_or("directory"));
    Ok(())
}

/// Copy an entry to stdout, or list its children if it is a directory.
async fn print_entry(fsys: &dyn ArchiveFs, path: &str) -> Result<()> {
    let mut handle = fsys
        .open(path)
        .await
        .with_context(|| format!("cannot open {}", path))?;

    if handle.is_dir() {
        for child in handle.read_dir(0)? {
            let suffix = if child.is_dir { "/" } else { "" };
            println!("{}{}", child.name, suffix);
        }
        return Ok(());
    }

    let mut stdout = tokio::io::stdout();
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        let n = handle
            .read(&mut buf)
            .await
            .with_context(|| format!("cannot read {}", path))?;
        if n == 0 {
            break;
        }
        stdout.write_all(&buf[..n]).await?;
    }
    stdout.flush().await?;
    Ok(())
}

/// Format a byte size into a human-readable string.
///
/// ```ignore
/// assert_eq!(format_size(500), "500 bytes");
/// assert_eq!(format_size(1536), "1.50 KB");
/// ```
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
