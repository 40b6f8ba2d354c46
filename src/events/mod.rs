//! Change notifications for presentation layers.
//!
//! The service broadcasts a [`HomesEvent`] after every state transition.
//! Subscribers that fall behind miss the oldest events (`RecvError::Lagged`)
//! and should re-read the cells; events are hints, the cells are the truth.

use tokio::sync::broadcast;

use crate::types::HomeId;

/// Capacity of the broadcast channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// A state transition observed by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HomesEvent {
    /// A fetch was issued and the cache entered the loading state
    FetchStarted { page: u32, per_page: u32 },
    /// A page replaced the cached records
    PageLoaded {
        page: u32,
        records: usize,
        total_pages: u32,
    },
    /// A fetch failed; previously cached records were kept
    FetchFailed { page: u32, message: String },
    /// A response arrived after a newer request had been issued and was dropped
    StaleResponseDiscarded { page: u32 },
    /// A favorite was flipped
    FavoriteToggled { id: HomeId, favorited: bool },
}

/// Broadcast sender shared by the service.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<HomesEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Send an event. Having no subscribers is not an error.
    pub fn emit(&self, event: HomesEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<HomesEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
