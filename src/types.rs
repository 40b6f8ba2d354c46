//! Core data types: listing records, page requests and paginated payloads.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{HomesError, Result};

/// Server-assigned listing identifier.
pub type HomeId = u64;

/// Page number used when none is given.
pub const DEFAULT_PAGE: u32 = 1;

/// Page size used when none is given.
pub const DEFAULT_PAGE_SIZE: u32 = 6;

/// A single home listing as returned by the listings endpoint.
///
/// `favorited` is a local annotation. It is skipped on both serialization and
/// deserialization so it is never trusted from, or sent to, the remote source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    /// Absent for records the remote source has not created yet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<HomeId>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub rooms: u32,
    #[serde(default)]
    pub bathrooms: u32,
    #[serde(default)]
    pub has_pool: bool,
    #[serde(default)]
    pub picture: String,
    #[serde(skip)]
    pub favorited: bool,
}

impl Listing {
    /// Recompute `favorited` from a membership predicate.
    ///
    /// Records without an id are never favorited.
    pub fn annotate(&mut self, is_favorite: impl Fn(HomeId) -> bool) {
        self.favorited = self.id.is_some_and(is_favorite);
    }
}

/// A validated page request. Both values are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    pub fn new(page: u32, per_page: u32) -> Result<Self> {
        if page == 0 {
            return Err(HomesError::InvalidPageRequest(
                "page numbers start at 1".to_string(),
            ));
        }
        if per_page == 0 {
            return Err(HomesError::InvalidPageRequest(
                "page size must be at least 1".to_string(),
            ));
        }
        Ok(Self { page, per_page })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

impl fmt::Display for PageRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page {} (size {})", self.page, self.per_page)
    }
}

/// A page of records plus pagination metadata, in json-server's shape.
///
/// `first`, `prev`, `next` and `last` are navigation hints some servers
/// include; they are kept when present but never required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    /// Total number of records across all pages
    #[serde(default)]
    pub items: u64,
    /// Total number of pages
    #[serde(default)]
    pub pages: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last: Option<u32>,
}

impl<T> Paginated<T> {
    /// Build a page without navigation hints.
    pub fn new(data: Vec<T>, items: u64, pages: u32) -> Self {
        Self {
            data,
            items,
            pages,
            first: None,
            prev: None,
            next: None,
            last: None,
        }
    }

    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}
