//! Flat-file persistence split across logical submodules.

mod json;
mod paths;
mod snapshot;

pub use paths::{default_data_dir, Resource};
pub use snapshot::{load_all, load_store, save_all};
