//! Durable string-keyed storage slots.
//!
//! Favorites are persisted through the [`KeyValueStorage`] trait so the store
//! does not care whether values live on disk ([`FileStorage`]) or in memory
//! ([`MemoryStorage`]). Every operation returns a `Result`; callers decide
//! what the fallback is.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::error::{HomesError, Result};

/// A single-writer key-value store holding string values.
pub trait KeyValueStorage: Send + Sync {
    /// Read the value stored under `key`, or `None` if the slot is empty.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite the slot for `key` with `value`.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Clear the slot for `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

impl<S: KeyValueStorage + ?Sized> KeyValueStorage for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// Keys become file names, so only a conservative character set is allowed.
pub(crate) fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(HomesError::Storage {
            key: key.to_string(),
            message: "keys may only contain ASCII letters, digits, '-' and '_'".to_string(),
        })
    }
}
