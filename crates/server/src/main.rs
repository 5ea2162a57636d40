//! Pokédex
//!
//! Command-line driver and JSON API over the catalog store.

use anyhow::Context;
use clap::{Parser, Subcommand};
use config::PersistedConfig;
use pokedex_core::storage::io::get_runtime_path;
use pokedex_core::{CatalogConfig, CatalogStore, EntryRef};
use serde::Serialize;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;

#[derive(Parser, Clone)]
#[command(author, version, about = "Pokédex - browse the Pokémon catalog and keep favorites")]
struct Args {
    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand, Clone)]
enum CliCommand {
    /// Start the JSON API server (default)
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },
    /// Fetch one page of the catalog
    List {
        /// Page size (defaults to the configured page size)
        #[arg(short, long)]
        limit: Option<u32>,
        #[arg(short, long, default_value = "0")]
        offset: u32,
    },
    /// Show one Pokémon with its evolution line
    Show {
        /// Id or name
        pokemon: String,
    },
    /// Search by exact name, falling back to a partial match on the first page
    Search { text: String },
    /// List the type names
    Types,
    /// Manage favorites
    Favorites {
        #[command(subcommand)]
        action: FavoritesCommand,
    },
    /// Show what the response cache currently holds
    CacheStats,
    /// Inspect or write `.pokedex/config.json`
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Subcommand, Clone)]
enum FavoritesCommand {
    List,
    Add { id: u32 },
    Remove { id: u32 },
    Toggle { id: u32 },
    Clear,
}

#[derive(Subcommand, Clone)]
enum ConfigCommand {
    /// Print the effective settings
    Show,
    /// Write the effective settings to config.json
    Init {
        /// Replace an existing config.json
        #[arg(long)]
        force: bool,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run_command(store: Arc<CatalogStore>, command: CliCommand) -> anyhow::Result<()> {
    match command {
        CliCommand::Serve { port } => run_server(store, port).await?,
        CliCommand::List { limit, offset } => {
            let limit = limit.unwrap_or(store.snapshot().page_size);
            let page = store.fetch_list(limit, offset).await?;
            for entry in &page.results {
                println!("#{:<5} {:<20} {}", entry.id, entry.name, entry.types.join("/"));
            }
            println!("{} of {} shown", page.results.len(), page.count);
        }
        CliCommand::Show { pokemon } => {
            let entry = store
                .fetch_detail(EntryRef::from(pokemon.as_str()))
                .await
                .with_context(|| format!("Could not load {}", pokemon))?;
            print_json(&entry)?;
            let evolution = store.snapshot().current_evolution;
            if !evolution.is_empty() {
                let line: Vec<&str> = evolution.iter().map(|node| node.name.as_str()).collect();
                println!("Evolution: {}", line.join(" -> "));
            }
        }
        CliCommand::Search { text } => {
            if store.entries().is_empty() {
                let page_size = store.snapshot().page_size;
                if let Err(e) = store.fetch_list(page_size, 0).await {
                    tracing::warn!(error = %e, "Searching without a loaded list");
                }
            }
            let found = store.search(&text).await;
            if found.is_empty() {
                println!("No Pokémon match \"{}\"", text);
            }
            for entry in found {
                println!("#{:<5} {}", entry.id, entry.name);
            }
        }
        CliCommand::Types => {
            for name in store.fetch_categories().await {
                println!("{}", name);
            }
        }
        CliCommand::Favorites { action } => run_favorites(&store, action).await?,
        CliCommand::CacheStats => print_json(&store.client().cache_stats())?,
        CliCommand::Config { action } => run_config(store.client().config(), action).await?,
    }

    Ok(())
}

async fn run_favorites(store: &CatalogStore, action: FavoritesCommand) -> anyhow::Result<()> {
    match action {
        FavoritesCommand::List => {
            for entry in store.favorites() {
                println!("#{:<5} {}", entry.id, entry.name);
            }
        }
        FavoritesCommand::Add { id } => {
            let entry = store.client().get_entry(id).await?;
            let name = entry.name.clone();
            if store.add_favorite(entry) {
                println!("Added {} to favorites", name);
            } else {
                println!("{} is already a favorite", name);
            }
        }
        FavoritesCommand::Remove { id } => {
            if store.remove_favorite(id) {
                println!("Removed #{} from favorites", id);
            } else {
                println!("#{} was not a favorite", id);
            }
        }
        FavoritesCommand::Toggle { id } => {
            let favorite = store.toggle_favorite(id).await?;
            println!("#{} {}", id, if favorite { "added" } else { "removed" });
        }
        FavoritesCommand::Clear => {
            store.clear_all_favorites();
            println!("Favorites cleared");
        }
    }

    Ok(())
}

async fn run_config(config: &CatalogConfig, action: ConfigCommand) -> anyhow::Result<()> {
    let effective = PersistedConfig::from_effective(config);
    match action {
        ConfigCommand::Show => print_json(&effective)?,
        ConfigCommand::Init { force } => {
            let existing = get_runtime_path().join("config.json");
            if existing.exists() && !force {
                anyhow::bail!("{:?} already exists; pass --force to replace it", existing);
            }
            let path = effective.save().await?;
            tracing::info!(path = ?path, "Wrote configuration");
            println!("Wrote {}", path.display());
        }
    }

    Ok(())
}

async fn run_server(store: Arc<CatalogStore>, port: u16) -> anyhow::Result<()> {
    let app = api::routes().with_state(store);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    tracing::info!(%addr, "Pokédex API listening");
    println!("Pokédex API running at http://{}", addr);
    println!("   Catalog:   /api/v1/pokemon, /pokemon/more, /pokemon/view, /pokemon/:id");
    println!("   Search:    /api/v1/search?q=, /api/v1/types");
    println!("   Favorites: /api/v1/favorites, /favorites/:id/toggle");
    println!("   Admin:     /api/v1/state, /api/v1/cache");

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = config::resolve().await;
    tracing::debug!(base_url = %config.base_url, "Resolved configuration");

    let command = args.command.unwrap_or(CliCommand::Serve { port: 8080 });
    let command = match command {
        CliCommand::Config { action } => return run_config(&config, action).await,
        other => other,
    };

    let store = Arc::new(
        CatalogStore::open(config)
            .await
            .context("Failed to open the catalog store")?,
    );
    run_command(store, command).await
}
