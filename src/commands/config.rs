//! Configuration commands.
//!
//! - `config show`: Display current configuration
//! - `config path`: Print the config file location

use owo_colors::OwoColorize;
use serde_json::json;

use crate::config::Config;
use crate::error::Result;

/// Show current configuration
pub fn cmd_config_show(output_json: bool) -> Result<()> {
    let config = Config::load()?;
    let endpoint = config.endpoint()?;

    if output_json {
        let output = json!({
            "endpoint": endpoint.as_str(),
            "page_param": config.page_param,
            "per_page_param": config.per_page_param,
            "page_size": config.page_size,
            "remote_timeout": config.remote_timeout,
            "data_dir": config.data_dir().display().to_string(),
            "fetch_ordering": config.fetch_ordering,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", "Configuration:".bold());
    println!("  endpoint:       {}", endpoint.as_str().cyan());
    println!(
        "  pagination:     {}=<page>&{}=<size>",
        config.page_param, config.per_page_param
    );
    println!("  page_size:      {}", config.page_size);
    println!("  remote_timeout: {}s", config.remote_timeout);
    println!("  data_dir:       {}", config.data_dir().display());
    println!("  fetch_ordering: {}", config.fetch_ordering);
    Ok(())
}

/// Print the path of the config file
pub fn cmd_config_path() -> Result<()> {
    println!("{}", Config::config_path().display());
    Ok(())
}
