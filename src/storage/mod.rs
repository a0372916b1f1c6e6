//! JSON-file-backed stores
//!
//! Each store owns one JSON document under the data directory, guards its
//! in-memory collection with a reader/writer lock, and rewrites the whole
//! file on every mutation through an atomic temp-file replace. A missing
//! file is an empty collection; a malformed one is a startup error.

pub mod environments;
pub mod history;
pub mod projects;
pub mod requests;
pub mod tabs;
pub mod tokens;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLockReadGuard, RwLockWriteGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::errors::{ReqlabError, Result};

pub const DATA_DIR_NAME: &str = ".reqlab";

/// Default per-user data directory (`~/.reqlab`)
pub fn default_data_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ReqlabError::Storage("could not determine home directory".into()))?;
    Ok(home.join(DATA_DIR_NAME))
}

pub(crate) fn load_or_default<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    match fs::read(path) {
        Ok(data) => serde_json::from_slice(&data)
            .map_err(|e| ReqlabError::Storage(format!("malformed {}: {e}", path.display()))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(e.into()),
    }
}

pub(crate) fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| ReqlabError::Storage(format!("no parent directory for {}", path.display())))?;
    fs::create_dir_all(dir)?;
    let mut file = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut file, value)?;
    file.persist(path)
        .map_err(|e| ReqlabError::Storage(format!("failed to replace {}: {e}", path.display())))?;
    Ok(())
}

/// Lock accessors that recover from poisoning instead of panicking.
pub(crate) fn read_lock<T>(lock: &std::sync::RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write_lock<T>(lock: &std::sync::RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
