//! The home service: fetch coordination, the favorite toggle protocol, and
//! the derived views presentation layers read from.
//!
//! `HomeService` is constructed explicitly and handed to whatever renders the
//! listings; there is no global instance.

use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::cache::{ListingCache, PageSnapshot};
use crate::cell::Computed;
use crate::config::Config;
use crate::error::Result;
use crate::events::{EventBus, HomesEvent};
use crate::favorites::FavoritesStore;
use crate::remote::{HomesSource, HttpHomesSource};
use crate::storage::{FileStorage, KeyValueStorage};
use crate::types::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, HomeId, Listing, PageRequest};

/// How responses to overlapping fetches are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchOrdering {
    /// Every response is applied as it arrives; the last one to settle wins,
    /// even if it answers an older request.
    #[default]
    LastResponseWins,
    /// Responses to anything but the most recently issued request are dropped.
    LatestRequestWins,
}

impl fmt::Display for FetchOrdering {
    /// The spelling used in the config file.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchOrdering::LastResponseWins => write!(f, "last-response-wins"),
            FetchOrdering::LatestRequestWins => write!(f, "latest-request-wins"),
        }
    }
}

/// What happened to a completed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page replaced the cache
    Applied,
    /// A newer request was issued while this one was in flight
    Discarded,
}

pub struct HomeService<S> {
    source: S,
    favorites: FavoritesStore,
    cache: ListingCache,
    events: EventBus,
    ordering: FetchOrdering,
    page_size: u32,
    latest_request: AtomicU64,
    // Serializes cache writes that depend on favorites state. Never held
    // while cell listeners run.
    apply_lock: Mutex<()>,
}

impl HomeService<HttpHomesSource> {
    /// Build a service talking HTTP and persisting favorites on disk, as
    /// described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let source = HttpHomesSource::from_config(config)?;
        let storage = Arc::new(FileStorage::new(config.data_dir()));
        Ok(HomeService::new(source, storage)
            .with_ordering(config.fetch_ordering)
            .with_page_size(config.page_size))
    }
}

impl<S: HomesSource> HomeService<S> {
    /// Create a service, restoring favorites from `storage`.
    pub fn new(source: S, storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            source,
            favorites: FavoritesStore::new(storage),
            cache: ListingCache::new(),
            events: EventBus::new(),
            ordering: FetchOrdering::default(),
            page_size: DEFAULT_PAGE_SIZE,
            latest_request: AtomicU64::new(0),
            apply_lock: Mutex::new(()),
        }
    }

    pub fn with_ordering(mut self, ordering: FetchOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    /// Set the page size used by [`fetch_default`](Self::fetch_default).
    /// Zero is ignored with a warning and the previous size is kept.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        if page_size == 0 {
            tracing::warn!(
                page_size = self.page_size,
                "Ignoring page size 0, keeping the current page size"
            );
            return self;
        }
        self.page_size = page_size;
        self
    }

    pub fn ordering(&self) -> FetchOrdering {
        self.ordering
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Fetch `page` with `per_page` records into the cache.
    ///
    /// Both values must be at least 1. The page is not checked against the
    /// known page count.
    pub async fn fetch(&self, page: u32, per_page: u32) -> Result<FetchOutcome> {
        let request = PageRequest::new(page, per_page)?;
        self.fetch_request(request).await
    }

    /// Fetch the first page using the configured page size.
    pub async fn fetch_default(&self) -> Result<FetchOutcome> {
        self.fetch(DEFAULT_PAGE, self.page_size).await
    }

    /// Fetch `page` using the configured page size.
    pub async fn fetch_page(&self, page: u32) -> Result<FetchOutcome> {
        self.fetch(page, self.page_size).await
    }

    /// Fetch a validated page request into the cache.
    ///
    /// On failure the error message is stored in the cache, the previous page
    /// is kept, and the error is also returned. The loading state is left
    /// before the terminal event is emitted.
    pub async fn fetch_request(&self, request: PageRequest) -> Result<FetchOutcome> {
        let token = self.latest_request.fetch_add(1, Ordering::SeqCst) + 1;
        let loading = self.cache.begin_loading();
        self.events.emit(HomesEvent::FetchStarted {
            page: request.page(),
            per_page: request.per_page(),
        });
        tracing::debug!(%request, token, "Fetching listings");

        let result = self.source.fetch_page(request).await;

        if self.is_stale(token) {
            drop(loading);
            tracing::debug!(%request, token, "Discarding response to superseded request");
            self.events.emit(HomesEvent::StaleResponseDiscarded {
                page: request.page(),
            });
            return Ok(FetchOutcome::Discarded);
        }

        match result {
            Ok(page) => {
                let records = page.data.len();
                let total_pages = page.pages;
                let pending = {
                    let _apply = self.apply_lock.lock();
                    let mut data = page.data;
                    for listing in &mut data {
                        listing.annotate(|id| self.favorites.is_favorite(id));
                    }
                    self.cache.replace_page(PageSnapshot::new(
                        data,
                        page.items,
                        page.pages,
                        request.page(),
                    ))
                };
                pending.notify();
                drop(loading);

                tracing::debug!(%request, records, total_pages, "Loaded listings");
                self.events.emit(HomesEvent::PageLoaded {
                    page: request.page(),
                    records,
                    total_pages,
                });
                Ok(FetchOutcome::Applied)
            }
            Err(e) => {
                let message = format!("Failed to load homes: {e}");
                tracing::warn!(%request, "{message}");
                self.cache.record_error(message.clone());
                drop(loading);

                self.events.emit(HomesEvent::FetchFailed {
                    page: request.page(),
                    message,
                });
                Err(e)
            }
        }
    }

    fn is_stale(&self, token: u64) -> bool {
        self.ordering == FetchOrdering::LatestRequestWins
            && token != self.latest_request.load(Ordering::SeqCst)
    }

    /// Flip the favorite state of `id` and update the cached page.
    ///
    /// A listing without an id cannot be favorited; `None` is ignored and
    /// returns `None`. Otherwise returns the new favorite state. No request is
    /// made to the remote source.
    ///
    /// Cell listeners may call back into the service.
    pub fn toggle_favorite(&self, id: Option<HomeId>) -> Option<bool> {
        let Some(id) = id else {
            tracing::debug!("Ignoring favorite toggle for a listing without an id");
            return None;
        };

        let favorited = self.favorites.toggle(id);

        // Re-read the store: a listener may have toggled `id` again already.
        let (changed, pending) = {
            let _apply = self.apply_lock.lock();
            self.cache.reannotate(id, self.favorites.is_favorite(id))
        };
        pending.notify();

        tracing::info!(id, favorited, changed, "Toggled favorite");
        self.events
            .emit(HomesEvent::FavoriteToggled { id, favorited });
        Some(favorited)
    }

    /// Forget every favorite, in storage and on the cached page.
    ///
    /// Returns how many favorites were removed.
    pub fn clear_favorites(&self) -> usize {
        let removed = self.favorites.len();
        self.favorites.clear();

        let (changed, pending) = {
            let _apply = self.apply_lock.lock();
            self.cache.reannotate_all(|id| self.favorites.is_favorite(id))
        };
        pending.notify();

        tracing::info!(removed, changed, "Cleared favorites");
        removed
    }

    pub fn is_favorite(&self, id: HomeId) -> bool {
        self.favorites.is_favorite(id)
    }

    /// Favorited records of the current page, in page order.
    pub fn favorites_subset(&self) -> Vec<Listing> {
        self.cache
            .records()
            .iter()
            .filter(|r| r.favorited)
            .cloned()
            .collect()
    }

    /// A derived view of [`favorites_subset`](Self::favorites_subset),
    /// recomputed from the cache on every read.
    pub fn favorites_subset_cell(&self) -> Computed<Vec<Listing>> {
        self.cache
            .page_cell()
            .map(|p| p.records.iter().filter(|r| r.favorited).cloned().collect())
    }

    /// Page numbers `1..=total_pages`; empty when there are no pages.
    pub fn valid_page_numbers(&self) -> RangeInclusive<u32> {
        page_numbers(self.cache.total_pages())
    }

    /// A derived view of [`valid_page_numbers`](Self::valid_page_numbers).
    pub fn valid_page_numbers_cell(&self) -> Computed<RangeInclusive<u32>> {
        self.cache.page_cell().map(|p| page_numbers(p.total_pages))
    }

    pub fn has_any_records(&self) -> bool {
        !self.cache.records().is_empty()
    }

    /// Presentation-facing cache state.
    pub fn cache(&self) -> &ListingCache {
        &self.cache
    }

    /// Read access to the favorites store. Mutate it through
    /// [`toggle_favorite`](Self::toggle_favorite) and
    /// [`clear_favorites`](Self::clear_favorites).
    pub fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Receive an event for every state transition from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<HomesEvent> {
        self.events.subscribe()
    }
}

fn page_numbers(total_pages: u32) -> RangeInclusive<u32> {
    // 1..=0 is empty
    1..=total_pages
}
