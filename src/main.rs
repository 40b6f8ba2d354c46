use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use homes::commands::{
    cmd_clear_favorites, cmd_config_path, cmd_config_show, cmd_favorites, cmd_list, cmd_pages,
    cmd_toggle,
};
use homes::{Config, HomeService, Result};

#[derive(Parser)]
#[command(name = "homes")]
#[command(about = "Browse home listings and keep local favorites")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the homes on a page
    #[command(visible_alias = "ls")]
    List {
        /// Page number (starts at 1)
        #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,

        /// Homes per page (default: configured page size)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        per_page: Option<u32>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the favorited homes on a page
    Favorites {
        /// Page number (starts at 1)
        #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,

        /// Homes per page (default: configured page size)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        per_page: Option<u32>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a home to favorites, or remove it if already there
    Toggle {
        /// Home ID
        id: u64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Forget all favorites
    ClearFavorites,

    /// Show the available page numbers
    Pages {
        /// Homes per page (default: configured page size)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        per_page: Option<u32>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the config file path
    Path,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();
}

async fn run(command: Commands) -> Result<()> {
    if let Commands::Config { action } = command {
        return match action {
            ConfigAction::Show { json } => cmd_config_show(json),
            ConfigAction::Path => cmd_config_path(),
        };
    }

    let config = Config::load()?;
    let service = HomeService::from_config(&config)?;
    let page_size = config.page_size;

    match command {
        Commands::List {
            page,
            per_page,
            json,
        } => cmd_list(&service, page, per_page.unwrap_or(page_size), json).await,
        Commands::Favorites {
            page,
            per_page,
            json,
        } => cmd_favorites(&service, page, per_page.unwrap_or(page_size), json).await,
        Commands::Toggle { id, json } => cmd_toggle(&service, id, json),
        Commands::ClearFavorites => cmd_clear_favorites(&service),
        Commands::Pages { per_page, json } => {
            cmd_pages(&service, per_page.unwrap_or(page_size), json).await
        }
        Commands::Config { .. } => Ok(()),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
