use clap::Parser;

use crate::config::{FsConfig, Mode};
use crate::limit::SizeLimit;

#[derive(Parser, Debug)]
#[command(name = "zserve")]
#[command(version)]
#[command(about = "Browse and read a ZIP archive as a virtual filesystem", long_about = None)]
#[command(after_help = "Examples:\n  \
  zserve -l site.zip                     list the served tree\n  \
  zserve -R site.zip index.html          print index.html from the detected root\n  \
  zserve -t https://example.com/site.zip a.html b.png   show sniffed content types")]
pub struct Cli {
    /// ZIP file path or HTTP URL
    #[arg(value_name = "ARCHIVE")]
    pub archive: String,

    /// Paths inside the served tree to print (default: list the tree)
    #[arg(value_name = "PATHS")]
    pub paths: Vec<String>,

    /// Load files completely into memory before serving them
    #[arg(short = 'b', long)]
    pub buffer: bool,

    /// Maximum file size allowed in buffer mode (e.g. 1500, 512K, 256M, 4G)
    #[arg(short = 'Z', long, value_name = "SIZE", default_value = "256M")]
    pub max_buffer_size: SizeLimit,

    /// Root of the served tree relative to the archive
    #[arg(short = 'r', long, value_name = "DIR", default_value = ".")]
    pub root: String,

    /// Auto detect the root folder by skipping single wrapper directories
    #[arg(short = 'R', long, conflicts_with = "root")]
    pub detect_root: bool,

    /// List the served tree
    #[arg(short = 'l', long)]
    pub list: bool,

    /// Print the sniffed content type of each path instead of its contents
    #[arg(short = 't', long)]
    pub content_type: bool,

    /// Verbose output
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    pub fn is_http_url(&self) -> bool {
        self.archive.starts_with("http://") || self.archive.starts_with("https://")
    }

    pub fn log_level(&self) -> log::LevelFilter {
        match (self.verbose, self.quiet) {
            (true, _) => log::LevelFilter::Debug,
            (false, 0) => log::LevelFilter::Info,
            (false, 1) => log::LevelFilter::Warn,
            (false, _) => log::LevelFilter::Error,
        }
    }

    pub fn fs_config(&self) -> FsConfig {
        FsConfig {
            mode: if self.buffer {
                Mode::Buffering
            } else {
                Mode::Streaming
            },
            buffer_limit: self.max_buffer_size,
            root: normalize_arg_path(&self.root),
            detect_root: self.detect_root,
        }
    }
}

/// Accept `/a/b/`-style paths on the command line.
pub fn normalize_arg_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        ".".to_string()
    } else {
        trimmed.to_string()
    }
}
