//! A local HTTP server answering like json-server's paginated collections.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::json;

use homes::Listing;

use super::sample_listings;

/// Scripted behaviour and request log of the server.
#[derive(Default)]
pub struct ServerState {
    pub listings: Vec<Listing>,
    /// Answer this many requests with 503 before serving pages
    pub fail_first: AtomicU32,
    /// Answer every request with 429 and this Retry-After
    pub rate_limit: Option<u64>,
    pub queries: Mutex<Vec<HashMap<String, String>>>,
}

impl ServerState {
    /// A server holding `sample_listings(count)`
    pub fn with_listings(count: u64) -> Self {
        Self {
            listings: sample_listings(count),
            ..Self::default()
        }
    }

    pub fn request_count(&self) -> usize {
        self.queries.lock().len()
    }
}

/// A running server. `/homes` serves pages and `/broken` answers with HTML.
pub struct MockServer {
    pub addr: SocketAddr,
    pub state: Arc<ServerState>,
}

impl MockServer {
    pub async fn start(state: ServerState) -> Self {
        let state = Arc::new(state);
        let router = Router::new()
            .route("/homes", get(list_homes))
            .route("/broken", get(malformed))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0))
            .await
            .expect("Failed to bind mock server");
        let addr = listener.local_addr().expect("Mock server has no address");
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        Self { addr, state }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

async fn list_homes(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.queries.lock().push(params.clone());

    if let Some(seconds) = state.rate_limit {
        let mut response = StatusCode::TOO_MANY_REQUESTS.into_response();
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from(seconds));
        return response;
    }

    let remaining = state.fail_first.load(Ordering::SeqCst);
    if remaining > 0 {
        state.fail_first.store(remaining - 1, Ordering::SeqCst);
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }

    let page: usize = params
        .get("_page")
        .and_then(|p| p.parse().ok())
        .filter(|p| *p > 0)
        .unwrap_or(1);
    let per_page: usize = params
        .get("_per_page")
        .and_then(|p| p.parse().ok())
        .filter(|p| *p > 0)
        .unwrap_or(10);
    let items = state.listings.len();
    let pages = items.div_ceil(per_page);
    let data: Vec<_> = state
        .listings
        .iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .collect();

    Json(json!({
        "first": 1,
        "prev": if page > 1 { Some(page - 1) } else { None },
        "next": if page < pages { Some(page + 1) } else { None },
        "last": pages,
        "pages": pages,
        "items": items,
        "data": data,
    }))
    .into_response()
}

async fn malformed() -> &'static str {
    "<html>not json</html>"
}
