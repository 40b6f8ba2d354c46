//! Command implementations for the `homes` binary.

mod config;
mod favorite;
mod ls;

pub use config::{cmd_config_path, cmd_config_show};
pub use favorite::{cmd_clear_favorites, cmd_toggle};
pub use ls::{cmd_favorites, cmd_list, cmd_pages};

use owo_colors::OwoColorize;
use serde_json::{Value, json};

use crate::types::Listing;

/// Format a listing for single-line display
pub fn format_listing_line(listing: &Listing) -> String {
    let id = listing
        .id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    let id_padded = format!("{:>5}", id);

    let marker = if listing.favorited {
        "♥".red().to_string()
    } else {
        " ".to_string()
    };

    let pool = if listing.has_pool { ", pool" } else { "" };
    let details = format!(
        "({} rooms, {} bath{})",
        listing.rooms, listing.bathrooms, pool
    );

    format!(
        "{} {} {} - {} {}",
        id_padded.cyan(),
        marker,
        listing.title,
        listing.city,
        details.dimmed()
    )
}

/// JSON representation of a listing, including its favorite annotation
pub fn listing_to_json(listing: &Listing) -> Value {
    json!({
        "id": listing.id,
        "title": listing.title,
        "description": listing.description,
        "city": listing.city,
        "rooms": listing.rooms,
        "bathrooms": listing.bathrooms,
        "hasPool": listing.has_pool,
        "picture": listing.picture,
        "favorited": listing.favorited,
    })
}
