use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{KeyValueStorage, validate_key};
use crate::error::{HomesError, Result};

/// Storage backed by one `<key>.json` file per slot inside a directory.
///
/// Writes go to a temp file which is then renamed over the target, so a slot
/// is never observed half-written.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Use `dir` as the storage root. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`.
    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn storage_error(key: &str, operation: &str, path: &Path, e: std::io::Error) -> HomesError {
        HomesError::Storage {
            key: key.to_string(),
            message: format!("failed to {operation} {}: {e}", path.display()),
        }
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        let path = self.slot_path(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::storage_error(key, "read", &path, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        fs::create_dir_all(&self.dir)
            .map_err(|e| Self::storage_error(key, "create directory", &self.dir, e))?;

        let path = self.slot_path(key);
        let temp_path = path.with_extension("tmp");

        fs::write(&temp_path, value)
            .map_err(|e| Self::storage_error(key, "write", &temp_path, e))?;
        fs::rename(&temp_path, &path).map_err(|e| Self::storage_error(key, "rename", &path, e))
    }

    fn remove(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        let path = self.slot_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::storage_error(key, "delete", &path, e)),
        }
    }
}
