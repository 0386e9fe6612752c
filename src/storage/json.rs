//! Typed JSON array files. Reading is forgiving (a bad file or record costs
//! only itself), writing is not.

use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{LibraryError, Result};

/// Read a JSON array of records from `path`.
///
/// A missing file is an empty collection. A file that cannot be read or is not
/// a JSON array is logged and also treated as empty. Array elements that do not
/// match the record shape are skipped one by one.
pub(crate) fn load_records<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    match read_array(path) {
        Ok(Some(values)) => values
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value(value) {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!(
                        "skipping malformed record #{index} in {}: {err}",
                        path.display()
                    );
                    None
                }
            })
            .collect(),
        Ok(None) => {
            info!("{} not found, starting empty", path.display());
            Vec::new()
        }
        Err(err) => {
            warn!("{err}; starting empty");
            Vec::new()
        }
    }
}

/// `Ok(None)` when the file does not exist.
fn read_array(path: &Path) -> Result<Option<Vec<Value>>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(LibraryError::read(path, err)),
    };
    let values = serde_json::from_str(&contents).map_err(|err| LibraryError::read(path, err))?;
    Ok(Some(values))
}

/// Write `records` as an indented JSON array next to `path`, under a temporary
/// name, and return that name. Nothing at `path` changes until
/// [`commit_staged`].
pub(crate) fn stage_records<T: Serialize>(path: &Path, records: &[T]) -> Result<PathBuf> {
    let staged = staged_path(path);
    let mut encoded =
        serde_json::to_string_pretty(records).map_err(|err| LibraryError::write(path, err))?;
    encoded.push('\n');
    fs::write(&staged, encoded).map_err(|err| LibraryError::write(&staged, err))?;
    Ok(staged)
}

/// Move a staged file over its final name.
pub(crate) fn commit_staged(staged: &Path, path: &Path) -> Result<()> {
    fs::rename(staged, path).map_err(|err| LibraryError::write(path, err))
}

pub(crate) fn staged_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
