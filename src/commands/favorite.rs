use owo_colors::OwoColorize;
use serde_json::json;

use crate::error::Result;
use crate::remote::HomesSource;
use crate::service::HomeService;
use crate::types::HomeId;

/// Flip the favorite state of a home
pub fn cmd_toggle<S: HomesSource>(
    service: &HomeService<S>,
    id: HomeId,
    output_json: bool,
) -> Result<()> {
    let favorited = service.toggle_favorite(Some(id)).unwrap_or(false);

    if output_json {
        let output = json!({ "id": id, "favorited": favorited });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if favorited {
        println!("{} Added home {} to favorites", "♥".red(), id.cyan());
    } else {
        println!("Removed home {} from favorites", id.cyan());
    }
    Ok(())
}

/// Forget every favorite
pub fn cmd_clear_favorites<S: HomesSource>(service: &HomeService<S>) -> Result<()> {
    let count = service.clear_favorites();
    println!("Cleared {} favorite(s)", count);
    Ok(())
}
