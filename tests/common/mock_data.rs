//! Mock data builders for creating test listings.

use homes::{HomeId, Listing};

/// Builder for creating test listings
pub struct ListingBuilder {
    listing: Listing,
}

impl ListingBuilder {
    /// Create a new listing builder with the given ID
    pub fn new(id: HomeId) -> Self {
        Self {
            listing: Listing {
                id: Some(id),
                title: format!("Home {id}"),
                description: format!("Description of home {id}"),
                city: "Malibu".to_string(),
                rooms: 3,
                bathrooms: 2,
                has_pool: false,
                picture: format!("https://images.example.com/home-{id}.jpg"),
                favorited: false,
            },
        }
    }

    /// Create a listing the remote source has not assigned an ID to yet
    pub fn unsaved() -> Self {
        let mut builder = Self::new(0);
        builder.listing.id = None;
        builder.listing.title = "Unsaved home".to_string();
        builder
    }

    pub fn title(mut self, title: &str) -> Self {
        self.listing.title = title.to_string();
        self
    }

    pub fn city(mut self, city: &str) -> Self {
        self.listing.city = city.to_string();
        self
    }

    pub fn rooms(mut self, rooms: u32) -> Self {
        self.listing.rooms = rooms;
        self
    }

    pub fn with_pool(mut self) -> Self {
        self.listing.has_pool = true;
        self
    }

    /// Pretend the remote source claims this listing is a favorite
    pub fn remote_favorited(mut self) -> Self {
        self.listing.favorited = true;
        self
    }

    pub fn build(self) -> Listing {
        self.listing
    }
}

/// `count` listings with ids `1..=count`, every third one with a pool
pub fn sample_listings(count: u64) -> Vec<Listing> {
    (1..=count)
        .map(|id| {
            let builder = ListingBuilder::new(id).rooms((id % 5 + 1) as u32);
            if id % 3 == 0 {
                builder.with_pool().build()
            } else {
                builder.build()
            }
        })
        .collect()
}
