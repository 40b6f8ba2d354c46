//! An in-memory listings source with scripted failures and latency.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use homes::{HomesError, HomesSource, Listing, PageRequest, Paginated, Result};

/// Serves pages from a fixed dataset the way json-server does.
pub struct MockSource {
    listings: Vec<Listing>,
    failing: AtomicBool,
    delays: Mutex<HashMap<u32, Duration>>,
    requests: Mutex<Vec<PageRequest>>,
}

impl MockSource {
    pub fn new(listings: Vec<Listing>) -> Self {
        Self {
            listings,
            failing: AtomicBool::new(false),
            delays: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Make every following request fail with a transport error
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Delay responses for `page` by `delay`
    pub fn set_delay(&self, page: u32, delay: Duration) {
        self.delays.lock().insert(page, delay);
    }

    /// Requests received so far, in arrival order
    pub fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().clone()
    }

    fn page(&self, request: PageRequest) -> Paginated<Listing> {
        let per_page = request.per_page() as usize;
        let total = self.listings.len();
        let pages = total.div_ceil(per_page) as u32;
        let start = (request.page() as usize - 1) * per_page;
        let data = self
            .listings
            .iter()
            .skip(start)
            .take(per_page)
            .cloned()
            .collect();
        Paginated::new(data, total as u64, pages)
    }
}

impl HomesSource for MockSource {
    async fn fetch_page(&self, request: PageRequest) -> Result<Paginated<Listing>> {
        self.requests.lock().push(request);

        let delay = self.delays.lock().get(&request.page()).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(HomesError::Api(
                "listings API error: connection refused".to_string(),
            ));
        }
        Ok(self.page(request))
    }
}
