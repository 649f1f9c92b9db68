//! chainpresence CLI — seed, create, inspect and update presence records.
//!
//! Usage:
//! ```bash
//! chainpresence seed
//! chainpresence create --id A1 --name John --surname Doe --name-tag Tag1 --twitter t1 --validated
//! chainpresence get --id A1 --json
//! chainpresence update-name-tag --id A1 --value Tag2
//! chainpresence update-handle --id A1 --platform twitch --handle live1
//! chainpresence info
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use chainpresence_core::{
    bootstrap_records, KeyValueStore, NewRecord, Owner, Record, Registry, SocialPlatform,
};
use chainpresence_storage::SqliteStore;
use clap::{Parser, Subcommand};

mod config;
mod logging;

use config::{AppConfig, DB_ENV};

#[derive(Parser)]
#[command(
    name = "chainpresence",
    about = "Identity/presence record registry — ChainPresence CLI",
    long_about = "
ChainPresence CLI: create-once identity records with social handles,
stored in a local SQLite key-value file.

Concurrent `create` runs against one file are serialized by SQLite
(create_guard: atomic, the default). A key_lock guard only protects
creates inside a single process.

ENVIRONMENT VARIABLES:
  CHAINPRESENCE_DB    SQLite file path (overridden by --db)
",
    version
)]
struct Cli {
    /// YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// SQLite file path or sqlite: URL
    #[arg(long, global = true)]
    db: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the bootstrap record set (overwrites those ids)
    Seed,

    /// Create a new record; fails if the id is taken
    Create {
        #[arg(long)]
        id: String,
        /// Owner first name
        #[arg(long)]
        name: String,
        /// Owner surname
        #[arg(long)]
        surname: String,
        #[arg(long)]
        name_tag: String,
        #[arg(long)]
        twitter: Option<String>,
        #[arg(long)]
        discord: Option<String>,
        #[arg(long)]
        instagram: Option<String>,
        #[arg(long)]
        twitch: Option<String>,
        /// Mark the owner's identity as externally confirmed
        #[arg(long)]
        validated: bool,
    },

    /// Print a record
    Get {
        #[arg(long)]
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replace a record's name tag
    #[command(name = "update-name-tag")]
    UpdateNameTag {
        #[arg(long)]
        id: String,
        #[arg(long)]
        value: String,
    },

    /// Replace one social handle
    #[command(name = "update-handle")]
    UpdateHandle {
        #[arg(long)]
        id: String,
        /// twitter | discord | instagram | twitch
        #[arg(long)]
        platform: SocialPlatform,
        #[arg(long)]
        handle: String,
    },

    /// Show configuration and capability info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if cli.verbose {
        config.log.level = "debug".into();
    }
    logging::init_tracing(&config.log);

    let db = config
        .storage
        .resolve_path(cli.db.as_deref(), std::env::var(DB_ENV).ok());

    match cli.command {
        Commands::Seed => {
            let registry = open_registry(&config, &db).await?;
            cmd_seed(&registry).await
        }

        Commands::Create {
            id,
            name,
            surname,
            name_tag,
            twitter,
            discord,
            instagram,
            twitch,
            validated,
        } => {
            let mut new = NewRecord::new(id, Owner::new(name, surname), name_tag)
                .with_validated(validated);
            let handles = [
                (SocialPlatform::Twitter, twitter),
                (SocialPlatform::Discord, discord),
                (SocialPlatform::Instagram, instagram),
                (SocialPlatform::Twitch, twitch),
            ];
            for (platform, handle) in handles {
                if let Some(handle) = handle {
                    new = new.with_handle(platform, handle);
                }
            }
            let registry = open_registry(&config, &db).await?;
            cmd_create(&registry, new).await
        }

        Commands::Get { id, json } => {
            let registry = open_registry(&config, &db).await?;
            cmd_get(&registry, &id, json).await
        }

        Commands::UpdateNameTag { id, value } => {
            let registry = open_registry(&config, &db).await?;
            registry
                .update_name_tag(&id, value)
                .await
                .with_context(|| format!("update name tag of '{id}'"))?;
            println!("Updated '{id}'");
            Ok(())
        }

        Commands::UpdateHandle {
            id,
            platform,
            handle,
        } => {
            let registry = open_registry(&config, &db).await?;
            registry
                .update_social_handle(&id, platform, handle)
                .await
                .with_context(|| format!("update {platform} handle of '{id}'"))?;
            println!("Updated '{id}'");
            Ok(())
        }

        Commands::Info => {
            cmd_info(&config, &db);
            Ok(())
        }
    }
}

async fn open_registry(config: &AppConfig, db: &str) -> Result<Registry<SqliteStore>> {
    let store = SqliteStore::open(db)
        .await
        .with_context(|| format!("open store '{db}'"))?;
    Ok(Registry::with_config(store, config.registry.to_config()))
}

// ─── Command implementations ─────────────────────────────────────────────────

async fn cmd_seed<S: KeyValueStore>(registry: &Registry<S>) -> Result<()> {
    let records = bootstrap_records();
    registry.seed(&records).await.context("seed registry")?;
    println!("Seeded {} records", records.len());
    for record in &records {
        println!("  {}", record.id);
    }
    Ok(())
}

async fn cmd_create<S: KeyValueStore>(registry: &Registry<S>, new: NewRecord) -> Result<()> {
    let id = new.id.clone();
    registry
        .create(new)
        .await
        .with_context(|| format!("create '{id}'"))?;
    println!("Created '{id}'");
    Ok(())
}

async fn cmd_get<S: KeyValueStore>(registry: &Registry<S>, id: &str, as_json: bool) -> Result<()> {
    let record = registry
        .get(id)
        .await
        .with_context(|| format!("get '{id}'"))?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print_record(&record);
    }
    Ok(())
}

fn print_record(record: &Record) {
    println!("ID:         {}", record.id);
    println!("Owner:      {} {}", record.owner.name, record.owner.surname);
    println!("Name tag:   {}", record.name_tag);
    println!("Validated:  {}", record.validated);
    println!("Condition:  {}", record.condition);
    if !record.social_handles.is_empty() {
        println!("Handles:");
        for (platform, handle) in &record.social_handles {
            println!("  {platform}: {handle}");
        }
    }
}

fn cmd_info(config: &AppConfig, db: &str) {
    println!("ChainPresence v{}", env!("CARGO_PKG_VERSION"));
    println!("  Store:          SQLite ({db})");
    println!("  Create guard:   {:?}", config.registry.to_config().create_guard);
    println!("  Record format:  JSON");
    println!(
        "  Platforms:      {}",
        SocialPlatform::ALL
            .iter()
            .map(SocialPlatform::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    );
}
