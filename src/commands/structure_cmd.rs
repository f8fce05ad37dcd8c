use std::path::PathBuf;

use clap::{Args, Subcommand};

use docmirror::{Config, DocumentStore, SyncDriver};

use super::{normalizer, print_report};

/// Single-file nested snapshot of the whole database
#[derive(Args)]
pub struct StructureCommand {
    #[command(subcommand)]
    pub command: StructureSubcommand,
}

#[derive(Subcommand)]
pub enum StructureSubcommand {
    /// Write every collection into one nested JSON file
    Export(StructureArgs),
    /// Upsert documents from a nested JSON file (nothing is deleted)
    Import(StructureArgs),
}

#[derive(Args)]
pub struct StructureArgs {
    /// Snapshot file (default: structure_file from config)
    #[arg(long, short)]
    pub file: Option<PathBuf>,

    /// Skip timestamp and sharedWith conversion
    #[arg(long)]
    pub raw: bool,
}

impl StructureCommand {
    pub async fn run(
        &self,
        store: &dyn DocumentStore,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            StructureSubcommand::Export(args) => {
                let file = args.file_or(config);
                let driver = SyncDriver::new(store, normalizer(config, args.raw));
                let report = driver.export_structure(&file).await?;

                println!("Exported structure to {}", file.display());
                print_report(&report);
            }
            StructureSubcommand::Import(args) => {
                let file = args.file_or(config);
                let driver = SyncDriver::new(store, normalizer(config, args.raw));
                let report = driver.import_structure(&file).await?;

                println!("Imported structure from {}", file.display());
                print_report(&report);
            }
        }
        Ok(())
    }
}

impl StructureArgs {
    fn file_or(&self, config: &Config) -> PathBuf {
        self.file
            .clone()
            .unwrap_or_else(|| config.structure_file.value.clone())
    }
}
