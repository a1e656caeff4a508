//! collector-admin: maintenance commands for one owner's catalog.
//!
//! Reads `COLLECTOR_DATA_DIR`, `DATABASE_URL` and the other catalog
//! variables from the environment (a `.env` file is honoured).

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use collector_catalog::{telemetry, Catalog, CatalogConfig, ImportBundle};
use collector_core::{DeleteCategoryRequest, OwnerId};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "collector-admin")]
#[command(author, version, about = "Maintenance commands for the collector catalog")]
#[command(propagate_version = true)]
struct Cli {
    /// Owner (user) id every command is scoped to
    #[arg(short, long)]
    owner: Uuid,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List categories with their fields and record counts
    Categories,

    /// Delete a category
    DeleteCategory {
        /// Category key
        key: String,

        /// Also delete every record of the category
        #[arg(long)]
        cascade: bool,
    },

    /// Write the owner's categories, records and settings as JSON
    Export {
        /// Output file (default: stdout)
        #[arg(short = 'f', long)]
        output: Option<PathBuf>,
    },

    /// Load an export bundle into the owner's account
    Import {
        /// Bundle produced by `export`, or an older flat-item backup
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let _log_guard = telemetry::init("collector_catalog=info,collector_db=warn")?;

    let cli = Cli::parse();
    let config = CatalogConfig::from_env()?;
    let catalog = Catalog::open(&config)
        .await
        .with_context(|| format!("opening catalog at {}", config.data_dir.display()))?;
    let owner = OwnerId::new(cli.owner);

    match cli.command {
        Commands::Categories => cmd_categories(&catalog, owner).await?,
        Commands::DeleteCategory { key, cascade } => {
            let response = catalog
                .registry
                .delete(
                    owner,
                    DeleteCategoryRequest {
                        key,
                        cascade_delete_records: cascade,
                    },
                )
                .await?;
            println!("{}", response.message);
            if response.failed_records > 0 {
                eprintln!("{} records could not be deleted", response.failed_records);
            }
        }
        Commands::Export { output } => {
            let bundle = catalog.export(owner).await?;
            let json = serde_json::to_string_pretty(&bundle)?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, json)
                        .await
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!(
                        "Exported {} categories and {} records to {}",
                        bundle.categories.len(),
                        bundle.items.len(),
                        path.display()
                    );
                }
                None => println!("{json}"),
            }
        }
        Commands::Import { input } => {
            let bytes = tokio::fs::read(&input)
                .await
                .with_context(|| format!("reading {}", input.display()))?;
            let bundle = ImportBundle::from_json(&bytes)?;
            let summary = catalog.import(owner, bundle).await?;
            println!(
                "Imported {} categories ({} skipped) and {} records ({} failed)",
                summary.categories,
                summary.skipped_categories,
                summary.items,
                summary.failed_items
            );
        }
    }
    Ok(())
}

async fn cmd_categories(catalog: &Catalog, owner: OwnerId) -> anyhow::Result<()> {
    let categories = catalog.registry.list(owner).await?;
    if categories.is_empty() {
        println!("No categories");
        return Ok(());
    }

    for category in categories {
        let count = catalog.records.count(owner, Some(category.key.as_str())).await?;
        println!("{} ({}) - {} records", category.name, category.key, count);
        for field in &category.fields {
            println!("    {:<24} {}", field.display_label(), field.field_type);
        }
    }
    Ok(())
}
