pub mod cache;
pub mod cell;
pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod favorites;
pub mod remote;
pub mod service;
pub mod storage;
pub mod types;

pub use cache::{ListingCache, LoadState, PageSnapshot};
pub use cell::{Cell, Computed, ReadOnlyCell, Subscription};
pub use config::Config;
pub use error::{HomesError, Result};
pub use events::HomesEvent;
pub use favorites::{FAVORITES_KEY, FavoritesStore};
pub use remote::{HomesSource, HttpHomesSource, RetryPolicy};
pub use service::{FetchOrdering, FetchOutcome, HomeService};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use types::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, HomeId, Listing, PageRequest, Paginated};
