//! HTTP listings source speaking the json-server pagination contract.
//!
//! `GET <endpoint>?_page=<n>&_per_page=<m>` answers with
//! `{ "data": [...], "items": <total>, "pages": <total pages>, ... }`.
//! The query parameter names are configurable for servers that differ.

use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::config::Config;
use crate::error::Result;
use crate::types::{Listing, PageRequest, Paginated};

use super::{ApiError, HomesSource, RetryPolicy, execute_with_retry};

/// Default query parameter carrying the page number.
pub const DEFAULT_PAGE_PARAM: &str = "_page";

/// Default query parameter carrying the page size.
pub const DEFAULT_PER_PAGE_PARAM: &str = "_per_page";

/// Listings source backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpHomesSource {
    client: Client,
    endpoint: Url,
    page_param: String,
    per_page_param: String,
    retry: RetryPolicy,
}

impl HttpHomesSource {
    /// Create a source for `endpoint` with default parameters and timeouts.
    pub fn new(endpoint: Url) -> Result<Self> {
        Self::with_timeout(endpoint, Duration::from_secs(30))
    }

    /// Create a source for `endpoint` whose requests time out after `timeout`.
    ///
    /// The connect timeout is capped at 10s within that budget.
    pub fn with_timeout(endpoint: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            page_param: DEFAULT_PAGE_PARAM.to_string(),
            per_page_param: DEFAULT_PER_PAGE_PARAM.to_string(),
            retry: RetryPolicy::default(),
        })
    }

    /// Create a source from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let source = Self::with_timeout(config.endpoint()?, config.remote_timeout())?
            .with_query_params(&config.page_param, &config.per_page_param);
        Ok(source)
    }

    /// Override the query parameter names.
    pub fn with_query_params(
        mut self,
        page_param: impl Into<String>,
        per_page_param: impl Into<String>,
    ) -> Self {
        self.page_param = page_param.into();
        self.per_page_param = per_page_param.into();
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// The full URL requested for `request`.
    pub fn page_url(&self, request: PageRequest) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair(&self.page_param, &request.page().to_string())
            .append_pair(&self.per_page_param, &request.per_page().to_string());
        url
    }

    async fn get_page(&self, url: &Url) -> std::result::Result<Paginated<Listing>, ApiError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok());
            let mut err = ApiError::with_status(format!("HTTP {status} from {url}"), status);
            if let Some(seconds) = retry_after {
                err = err.with_retry_after(seconds);
            }
            return Err(err);
        }

        response
            .json::<Paginated<Listing>>()
            .await
            .map_err(|e| ApiError::new(format!("invalid listings payload from {url}: {e}")))
    }
}

impl HomesSource for HttpHomesSource {
    async fn fetch_page(&self, request: PageRequest) -> Result<Paginated<Listing>> {
        let url = self.page_url(request);
        tracing::debug!(%url, "Requesting listings page");

        let page = execute_with_retry(self.retry, || self.get_page(&url)).await?;

        tracing::debug!(
            %url,
            records = page.data.len(),
            items = page.items,
            pages = page.pages,
            "Received listings page"
        );
        Ok(page)
    }
}
