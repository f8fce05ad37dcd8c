mod config_cmd;
mod export_cmd;
mod import_cmd;
mod structure_cmd;

pub use config_cmd::ConfigCommand;
pub use export_cmd::ExportCommand;
pub use import_cmd::ImportCommand;
pub use structure_cmd::StructureCommand;

use docmirror::{Config, Normalizer, SyncReport};

/// Normalizer for one run: `--raw` switches normalization off regardless of
/// the configured value.
fn normalizer(config: &Config, raw: bool) -> Normalizer {
    Normalizer::new(config.normalize_timestamps.value && !raw)
}

fn print_report(report: &SyncReport) {
    println!("  collections:       {}", report.collections);
    println!("  documents written: {}", report.documents_written);
    if report.documents_deleted > 0 {
        println!("  documents deleted: {}", report.documents_deleted);
    }
    if report.files_written > 0 {
        println!("  files written:     {}", report.files_written);
    }
}
