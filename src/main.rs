use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{ConfigCommand, ExportCommand, ImportCommand, StructureCommand};
use docmirror::{Config, DocumentStore, FirestoreStore, MemoryStore};

#[derive(Parser)]
#[command(name = "docmirror")]
#[command(version)]
#[command(about = "Mirror a document database to and from JSON files", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Use an empty in-process store instead of Firestore
    #[arg(long, global = true)]
    memory: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Export every collection to a folder of JSON files
    Export(ExportCommand),

    /// Replace the database contents with a folder of JSON files
    Import(ImportCommand),

    /// Export or import the single-file nested snapshot
    Structure(StructureCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docmirror=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.clone())?;

    match cli.command {
        Some(Commands::Export(cmd)) => {
            let store = open_store(cli.memory, &config)?;
            cmd.run(store.as_ref(), &config).await?;
        }
        Some(Commands::Import(cmd)) => {
            let store = open_store(cli.memory, &config)?;
            cmd.run(store.as_ref(), &config).await?;
        }
        Some(Commands::Structure(cmd)) => {
            let store = open_store(cli.memory, &config)?;
            cmd.run(store.as_ref(), &config).await?;
        }
        Some(Commands::Config(cmd)) => {
            cmd.run(&config, cli.config)?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}

fn open_store(
    memory: bool,
    config: &Config,
) -> Result<Box<dyn DocumentStore>, Box<dyn std::error::Error>> {
    if memory {
        tracing::info!("Using in-memory store");
        return Ok(Box::new(MemoryStore::new()));
    }
    let store = FirestoreStore::from_config(&config.store)?;
    tracing::info!("Using Firestore at {}", store.base_url());
    Ok(Box::new(store))
}
