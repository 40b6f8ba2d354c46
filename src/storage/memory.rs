use std::collections::HashMap;

use parking_lot::Mutex;

use super::{KeyValueStorage, validate_key};
use crate::error::Result;

/// Process-local storage; values are lost when it is dropped.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage pre-populated with a single slot.
    pub fn with_value(key: &str, value: &str) -> Self {
        let storage = Self::new();
        storage
            .slots
            .lock()
            .insert(key.to_string(), value.to_string());
        storage
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        Ok(self.slots.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        self.slots.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        self.slots.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_slots() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("favorites").unwrap(), None);

        storage.set("favorites", "[1]").unwrap();
        assert_eq!(storage.get("favorites").unwrap().as_deref(), Some("[1]"));

        storage.remove("favorites").unwrap();
        storage.remove("favorites").unwrap();
        assert_eq!(storage.get("favorites").unwrap(), None);
    }
}
