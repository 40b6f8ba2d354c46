//! RAII guard for environment variables in tests.
//!
//! Tests touching the environment must also be marked `#[serial]`; the
//! environment is process-global.

use std::env;
use std::ffi::{OsStr, OsString};

/// Restores an environment variable to its original value (or absence) on drop.
pub struct EnvGuard {
    key: String,
    original: Option<OsString>,
}

impl EnvGuard {
    /// Snapshot `key` and set it to `value`.
    ///
    /// # Safety
    /// Calls `std::env::set_var`; the caller must be the only thread touching
    /// the environment.
    pub unsafe fn set(key: &str, value: impl AsRef<OsStr>) -> Self {
        let guard = Self {
            key: key.to_string(),
            original: env::var_os(key),
        };
        unsafe { env::set_var(key, value) };
        guard
    }

    /// Snapshot `key` and remove it.
    ///
    /// # Safety
    /// Calls `std::env::remove_var`; the caller must be the only thread
    /// touching the environment.
    pub unsafe fn remove(key: &str) -> Self {
        let guard = Self {
            key: key.to_string(),
            original: env::var_os(key),
        };
        unsafe { env::remove_var(key) };
        guard
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        // SAFETY: tests holding an EnvGuard run under #[serial]
        match &self.original {
            Some(value) => unsafe { env::set_var(&self.key, value) },
            None => unsafe { env::remove_var(&self.key) },
        }
    }
}
