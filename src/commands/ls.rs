use owo_colors::OwoColorize;
use serde_json::json;

use super::{format_listing_line, listing_to_json};
use crate::error::Result;
use crate::remote::HomesSource;
use crate::service::HomeService;
use crate::types::Listing;

fn print_listings(listings: &[Listing], output_json: bool) -> Result<()> {
    if output_json {
        let items: Vec<_> = listings.iter().map(listing_to_json).collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    for listing in listings {
        println!("{}", format_listing_line(listing));
    }
    Ok(())
}

/// Fetch a page and list its homes
pub async fn cmd_list<S: HomesSource>(
    service: &HomeService<S>,
    page: u32,
    per_page: u32,
    output_json: bool,
) -> Result<()> {
    service.fetch(page, per_page).await?;
    let cache = service.cache();
    let records = cache.records();

    if output_json {
        let items: Vec<_> = records.iter().map(listing_to_json).collect();
        let output = json!({
            "page": page,
            "per_page": per_page,
            "pages": cache.total_pages(),
            "items": cache.total_homes(),
            "data": items,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if !service.has_any_records() {
        println!("{}", "No homes on this page".dimmed());
    } else {
        print_listings(&records, false)?;
    }
    println!(
        "{}",
        format!(
            "Page {} of {} ({} homes)",
            page,
            cache.total_pages(),
            cache.total_homes()
        )
        .dimmed()
    );
    Ok(())
}

/// Fetch a page and list only its favorited homes
pub async fn cmd_favorites<S: HomesSource>(
    service: &HomeService<S>,
    page: u32,
    per_page: u32,
    output_json: bool,
) -> Result<()> {
    service.fetch(page, per_page).await?;
    let favorites = service.favorites_subset();

    if favorites.is_empty() && !output_json {
        println!("{}", "No favorites on this page".dimmed());
        return Ok(());
    }
    print_listings(&favorites, output_json)
}

/// Show the valid page numbers for a page size
pub async fn cmd_pages<S: HomesSource>(
    service: &HomeService<S>,
    per_page: u32,
    output_json: bool,
) -> Result<()> {
    service.fetch(1, per_page).await?;
    let pages: Vec<u32> = service.valid_page_numbers().collect();

    if output_json {
        let output = json!({
            "per_page": per_page,
            "items": service.cache().total_homes(),
            "pages": pages,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let rendered: Vec<String> = pages.iter().map(|p| p.to_string()).collect();
    println!("{}", rendered.join(" "));
    Ok(())
}
