//! The listing cache: the current page, its metadata, and load state.
//!
//! The page and its metadata live in a single [`PageSnapshot`] cell so a
//! successful fetch swaps records, item count and page count in one
//! assignment; readers never observe a half-updated page.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::cell::{Cell, Computed, PendingNotify, ReadOnlyCell};
use crate::types::{HomeId, Listing};

/// Lifecycle of the cache.
///
/// A failed fetch still ends in `Loaded`; the failure is carried by the
/// separate error field alongside the previous page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
}

/// One page of records plus pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageSnapshot {
    /// Records in server order
    pub records: Arc<Vec<Listing>>,
    /// Total number of records across all pages
    pub total_homes: u64,
    /// Total number of pages
    pub total_pages: u32,
    /// Page number these records came from
    pub page: Option<u32>,
}

impl PageSnapshot {
    pub fn new(records: Vec<Listing>, total_homes: u64, total_pages: u32, page: u32) -> Self {
        Self {
            records: Arc::new(records),
            total_homes,
            total_pages,
            page: Some(page),
        }
    }
}

pub struct ListingCache {
    page: Cell<PageSnapshot>,
    state: Cell<LoadState>,
    error: Cell<Option<String>>,
    in_flight: Mutex<usize>,
}

impl ListingCache {
    pub fn new() -> Self {
        Self {
            page: Cell::new(PageSnapshot::default()),
            state: Cell::new(LoadState::Idle),
            error: Cell::new(None),
            in_flight: Mutex::new(0),
        }
    }

    /// Enter the loading state and clear the previous error.
    ///
    /// The state returns to `Loaded` when the last outstanding guard drops,
    /// whether the fetch succeeded, failed, panicked or was abandoned.
    pub(crate) fn begin_loading(&self) -> LoadingGuard<'_> {
        *self.in_flight.lock() += 1;
        self.error.set(None);
        self.state.set(LoadState::Loading);
        LoadingGuard { cache: self }
    }

    fn finish_loading(&self) {
        let remaining = {
            let mut in_flight = self.in_flight.lock();
            *in_flight = in_flight.saturating_sub(1);
            *in_flight
        };
        if remaining == 0 {
            self.state.set(LoadState::Loaded);
        }
    }

    /// Replace the cached page wholesale.
    ///
    /// Page listeners run when the returned notification drops.
    pub(crate) fn replace_page(&self, snapshot: PageSnapshot) -> PendingNotify {
        self.page.set_deferred(snapshot)
    }

    /// Record a failed fetch. Cached records are left untouched.
    pub(crate) fn record_error(&self, message: impl Into<String>) {
        self.error.set(Some(message.into()));
    }

    /// Set `favorited` on every cached record with `id`.
    ///
    /// Returns how many records changed. No other field of any record is
    /// touched. Page listeners run when the returned notification drops.
    pub(crate) fn reannotate(&self, id: HomeId, favorited: bool) -> (usize, PendingNotify) {
        self.reannotate_with(|record| {
            if record.id == Some(id) {
                favorited
            } else {
                record.favorited
            }
        })
    }

    /// Recompute `favorited` for every cached record from `is_favorite`.
    pub(crate) fn reannotate_all(
        &self,
        is_favorite: impl Fn(HomeId) -> bool,
    ) -> (usize, PendingNotify) {
        self.reannotate_with(|record| record.id.is_some_and(&is_favorite))
    }

    fn reannotate_with(&self, wanted: impl Fn(&Listing) -> bool) -> (usize, PendingNotify) {
        let needs_change = self
            .page
            .with(|p| p.records.iter().any(|r| r.favorited != wanted(r)));
        if !needs_change {
            return (0, PendingNotify::none());
        }

        let mut changed = 0;
        let pending = self.page.update_deferred(|p| {
            for record in Arc::make_mut(&mut p.records) {
                let favorited = wanted(record);
                if record.favorited != favorited {
                    record.favorited = favorited;
                    changed += 1;
                }
            }
        });
        (changed, pending)
    }

    pub fn snapshot(&self) -> PageSnapshot {
        self.page.get()
    }

    pub fn records(&self) -> Arc<Vec<Listing>> {
        self.page.with(|p| Arc::clone(&p.records))
    }

    pub fn total_homes(&self) -> u64 {
        self.page.with(|p| p.total_homes)
    }

    pub fn total_pages(&self) -> u32 {
        self.page.with(|p| p.total_pages)
    }

    pub fn current_page(&self) -> Option<u32> {
        self.page.with(|p| p.page)
    }

    pub fn load_state(&self) -> LoadState {
        self.state.get()
    }

    pub fn is_loading(&self) -> bool {
        self.load_state() == LoadState::Loading
    }

    pub fn error(&self) -> Option<String> {
        self.error.get()
    }

    pub fn page_cell(&self) -> ReadOnlyCell<PageSnapshot> {
        self.page.read_only()
    }

    pub fn load_state_cell(&self) -> ReadOnlyCell<LoadState> {
        self.state.read_only()
    }

    pub fn error_cell(&self) -> ReadOnlyCell<Option<String>> {
        self.error.read_only()
    }

    pub fn records_cell(&self) -> Computed<Arc<Vec<Listing>>> {
        self.page.map(|p| Arc::clone(&p.records))
    }

    pub fn total_homes_cell(&self) -> Computed<u64> {
        self.page.map(|p| p.total_homes)
    }

    pub fn total_pages_cell(&self) -> Computed<u32> {
        self.page.map(|p| p.total_pages)
    }

    pub fn is_loading_cell(&self) -> Computed<bool> {
        self.state.map(|s| *s == LoadState::Loading)
    }
}

impl Default for ListingCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Clears the loading state of its [`ListingCache`] on drop.
#[must_use = "the cache leaves the loading state when this guard drops"]
pub struct LoadingGuard<'a> {
    cache: &'a ListingCache,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.cache.finish_loading();
    }
}
