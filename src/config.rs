//! Runtime settings. Precedence is command-line flag, then environment, then
//! the home-directory default.

use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use crate::storage::default_data_dir;

/// Environment variable consulted when `--data-dir` is not given.
pub const DATA_DIR_ENV: &str = "MINI_LIBRARY_DATA_DIR";
/// Log file name used inside the data directory by default.
const LOG_FILE_NAME: &str = "mini-library.log";

#[derive(Debug, Parser)]
#[command(name = "mini-library", about = "Terminal catalogue for books, members and loans")]
pub struct Args {
    /// Directory holding books.json, members.json and loans.json
    #[arg(long, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    /// Where to write the log (defaults to the data directory)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub log_file: PathBuf,
    pub verbose: bool,
}

impl Config {
    /// Resolve `args` against the process environment.
    pub fn from_args(args: Args) -> Result<Self> {
        Self::resolve(args, std::env::var_os(DATA_DIR_ENV), default_data_dir)
    }

    /// `fallback` is only consulted when neither the flag nor the environment
    /// names a directory.
    fn resolve(
        args: Args,
        env_dir: Option<OsString>,
        fallback: impl FnOnce() -> Result<PathBuf>,
    ) -> Result<Self> {
        let data_dir = match (args.data_dir, env_dir) {
            (Some(dir), _) => dir,
            (None, Some(dir)) if !dir.is_empty() => PathBuf::from(dir),
            _ => fallback()?,
        };
        let log_file = args
            .log_file
            .unwrap_or_else(|| data_dir.join(LOG_FILE_NAME));

        Ok(Self {
            data_dir,
            log_file,
            verbose: args.verbose,
        })
    }

    /// Route the `log` macros to the configured file. The terminal belongs to
    /// the UI, so nothing is ever logged to stdout or stderr.
    pub fn init_logging(&self) -> Result<()> {
        if let Some(parent) = self.log_file.parent() {
            fs::create_dir_all(parent).context("failed to create log directory")?;
        }
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)
            .with_context(|| format!("failed to open log file {}", self.log_file.display()))?;

        let level = if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        };
        let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
        WriteLogger::init(level, log_config, file).context("failed to install logger")
    }
}
