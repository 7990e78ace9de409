//! JSON store snapshot on disk.
//!
//! A missing file is an empty store. An unreadable snapshot is logged and
//! replaced by an empty store. Saves go through a temporary sibling file and
//! a rename so a crash never leaves a half-written snapshot.

#[cfg(test)]
#[path = "store_file_test.rs"]
mod store_file_test;

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use canvas::store::MemoryStore;
use tracing::info;

use crate::CliError;

/// Load the store at `path`.
pub fn load(path: &Path) -> Result<MemoryStore, CliError> {
    match fs::read_to_string(path) {
        Ok(json) => {
            let store = MemoryStore::from_json_or_default(&json);
            info!(path = %path.display(), files = store.len(), "store loaded");
            Ok(store)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!(path = %path.display(), "no store file; starting empty");
            Ok(MemoryStore::new())
        }
        Err(e) => Err(e.into()),
    }
}

/// Write `store` to `path`.
pub fn save(path: &Path, store: &MemoryStore) -> Result<(), CliError> {
    let json = store.to_json()?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    info!(path = %path.display(), files = store.len(), "store saved");
    Ok(())
}
