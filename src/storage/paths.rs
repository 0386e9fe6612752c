use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".mini-library";

/// The three files that make up a saved catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Books,
    Members,
    Loans,
}

impl Resource {
    pub fn file_name(self) -> &'static str {
        match self {
            Resource::Books => "books.json",
            Resource::Members => "members.json",
            Resource::Loans => "loans.json",
        }
    }

    pub fn path_in(self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }
}

/// Resolve `~/.mini-library`, the data directory used when nothing else is
/// configured.
pub fn default_data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}
