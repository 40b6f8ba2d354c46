//! The favorites store.
//!
//! Holds the set of favorited listing ids and mirrors it to the `"favorites"`
//! storage slot as a JSON array of integers. Storage problems never reach the
//! caller: a missing or corrupt slot loads as an empty set, and a failed write
//! leaves the in-memory set authoritative until the process exits.
//!
//! Outside the crate the store is read-only; changes go through
//! [`HomeService`](crate::service::HomeService) so the cached page is
//! re-annotated with them.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::cell::{Cell, ReadOnlyCell};
use crate::error::Result;
use crate::storage::KeyValueStorage;
use crate::types::HomeId;

/// Storage slot holding the persisted favorites.
pub const FAVORITES_KEY: &str = "favorites";

pub struct FavoritesStore {
    ids: Cell<BTreeSet<HomeId>>,
    storage: Arc<dyn KeyValueStorage>,
}

impl FavoritesStore {
    /// Create a store backed by `storage`, restoring any persisted favorites.
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        let store = Self {
            ids: Cell::new(BTreeSet::new()),
            storage,
        };
        store.load_from_storage();
        store
    }

    pub fn is_favorite(&self, id: HomeId) -> bool {
        self.ids.with(|ids| ids.contains(&id))
    }

    /// Flip membership of `id` and persist. Returns the new membership.
    pub(crate) fn toggle(&self, id: HomeId) -> bool {
        let mut now_favorite = false;
        self.ids.update(|ids| {
            now_favorite = ids.insert(id);
            if !now_favorite {
                ids.remove(&id);
            }
        });
        self.persist();
        now_favorite
    }

    /// Replace the in-memory set with the persisted one.
    ///
    /// Absent, empty or malformed data yields an empty set.
    pub(crate) fn load_from_storage(&self) {
        let ids = match self.read_persisted() {
            Ok(Some(ids)) => ids,
            Ok(None) => BTreeSet::new(),
            Err(e) => {
                tracing::warn!("Failed to load favorites, starting empty: {e}");
                BTreeSet::new()
            }
        };
        tracing::debug!(count = ids.len(), "Loaded favorites");
        self.ids.set(ids);
    }

    /// Write the current set to storage. Failures are logged, not returned.
    pub(crate) fn persist(&self) {
        if let Err(e) = self.write_persisted() {
            tracing::warn!("Failed to persist favorites, keeping them in memory only: {e}");
        }
    }

    /// Forget every favorite and clear the storage slot.
    pub(crate) fn clear(&self) {
        self.ids.set(BTreeSet::new());
        if let Err(e) = self.storage.remove(FAVORITES_KEY) {
            tracing::warn!("Failed to clear persisted favorites: {e}");
        }
    }

    /// Snapshot of the favorited ids in ascending order.
    pub fn ids(&self) -> Vec<HomeId> {
        self.ids.with(|ids| ids.iter().copied().collect())
    }

    pub fn len(&self) -> usize {
        self.ids.with(|ids| ids.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Observable view of the favorited id set.
    pub fn cell(&self) -> ReadOnlyCell<BTreeSet<HomeId>> {
        self.ids.read_only()
    }

    fn read_persisted(&self) -> Result<Option<BTreeSet<HomeId>>> {
        let Some(raw) = self.storage.get(FAVORITES_KEY)? else {
            return Ok(None);
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }
        let ids: Vec<HomeId> = serde_json::from_str(&raw)?;
        Ok(Some(ids.into_iter().collect()))
    }

    fn write_persisted(&self) -> Result<()> {
        let ids = self.ids();
        let content = serde_json::to_string(&ids)?;
        self.storage.set(FAVORITES_KEY, &content)
    }
}

impl std::fmt::Debug for FavoritesStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FavoritesStore")
            .field("ids", &self.ids())
            .finish()
    }
}
