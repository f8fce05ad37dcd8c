use std::path::PathBuf;

use clap::Args;

use docmirror::{Config, DocumentStore, SyncDriver};

use super::{normalizer, print_report};

#[derive(Args)]
pub struct ExportCommand {
    /// Destination folder (default: export_dir from config)
    #[arg(long, short)]
    pub dir: Option<PathBuf>,

    /// Keep timestamps and sharedWith maps exactly as stored
    #[arg(long)]
    pub raw: bool,
}

impl ExportCommand {
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
        let report = driver.full_export(&dir).await?;

        println!("Exported to {}", dir.display());
        print_report(&report);
        Ok(())
    }
}
