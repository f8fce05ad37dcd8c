use std::path::PathBuf;

use clap::Args;

use docmirror::{Config, DocumentStore, SyncDriver};

use super::{normalizer, print_report};

#[derive(Args)]
pub struct ImportCommand {
    /// Source folder (default: export_dir from config)
    #[arg(long, short)]
    pub dir: Option<PathBuf>,

    /// Store timestamp strings and sharedWith arrays as plain values
    #[arg(long)]
    pub raw: bool,
}

impl ImportCommand {
    /// Deletes everything in the store, then mirrors the folder into it.
    pub async fn run(
        &self,
        store: &dyn DocumentStore,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let dir = self
            .dir
            .clone()
            .unwrap_or_else(|| config.export_dir.value.clone());

        let driver = SyncDriver::new(store, normalizer(config, self.raw));
        let report = driver.full_import(&dir).await?;

        println!("Imported from {}", dir.display());
        print_report(&report);
        Ok(())
    }
}
