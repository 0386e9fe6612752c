use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::{LibraryError, Result};
use crate::models::{Book, Loan, Member};
use crate::store::EntityStore;

use super::json::{commit_staged, load_records, stage_records, staged_path};
use super::paths::Resource;

/// Read all three collections from `dir`. Never fails: each resource falls
/// back to empty on its own.
pub fn load_all(dir: &Path) -> (Vec<Book>, Vec<Member>, Vec<Loan>) {
    let books = load_records(&Resource::Books.path_in(dir));
    let members = load_records(&Resource::Members.path_in(dir));
    let loans = load_records(&Resource::Loans.path_in(dir));
    (books, members, loans)
}

/// Load `dir` and rebuild a consistent store from whatever survived.
pub fn load_store(dir: &Path) -> EntityStore {
    let (books, members, loans) = load_all(dir);
    let store = EntityStore::from_records(books, members, loans);
    info!(
        "loaded {} books, {} members, {} loans from {}",
        store.books().len(),
        store.members().len(),
        store.loans().len(),
        dir.display()
    );
    store
}

/// Write every collection under `dir`, creating the directory if needed.
///
/// All three files are staged before any of them replaces its predecessor, so
/// a failed write leaves the previous save intact.
pub fn save_all(dir: &Path, store: &EntityStore) -> Result<()> {
    fs::create_dir_all(dir).map_err(|err| LibraryError::write(dir, err))?;

    let targets = [
        Resource::Books.path_in(dir),
        Resource::Members.path_in(dir),
        Resource::Loans.path_in(dir),
    ];
    let staged = stage_all(&targets, store).inspect_err(|_| {
        for target in &targets {
            let _ = fs::remove_file(staged_path(target));
        }
    })?;
    for (staged, target) in staged.iter().zip(&targets) {
        commit_staged(staged, target)?;
    }

    info!(
        "saved {} books, {} members, {} loans to {}",
        store.books().len(),
        store.members().len(),
        store.loans().len(),
        dir.display()
    );
    Ok(())
}

fn stage_all(targets: &[PathBuf; 3], store: &EntityStore) -> Result<[PathBuf; 3]> {
    let [books, members, loans] = targets;
    Ok([
        stage_records(books, store.books())?,
        stage_records(members, store.members())?,
        stage_records(loans, store.loans())?,
    ])
}
