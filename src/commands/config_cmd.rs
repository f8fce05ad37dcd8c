use std::fs;
use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use docmirror::Config;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Create a default config file
    Init,
}

const DEFAULT_CONFIG: &str = r#"# docmirror configuration

# Folder used by `docmirror export` and `docmirror import`
# export_dir: collections

# Snapshot file used by `docmirror structure export|import`
# structure_file: exported_structure/db_structure.json

# Render timestamps as "M/D/YYYY, h:mm:ss AM UTC+7" and sharedWith maps
# as arrays of keys. Set to false to keep raw values.
# normalize_timestamps: true

# store:
#   project_id: my-project
#   database_id: "(default)"
#   # access_token is best supplied via DOCMIRROR_ACCESS_TOKEN
#   emulator_host: localhost:8080
"#;

impl ConfigCommand {
    /// `config_path` is the `--config` flag; `init` writes there when given.
    pub fn run(
        &self,
        config: &Config,
        config_path: Option<PathBuf>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => show_text(config),
                }
                Ok(())
            }

            ConfigSubcommand::Init => {
                let config_path = config_path.unwrap_or_else(Config::default_config_path);

                if config_path.exists() {
                    println!("Config file already exists: {}", config_path.display());
                    println!("Use 'docmirror config show' to view current configuration.");
                    return Ok(());
                }

                if let Some(parent) = config_path.parent() {
                    fs::create_dir_all(parent)?;
                }

                let mut file = fs::File::create(&config_path)?;
                file.write_all(DEFAULT_CONFIG.as_bytes())?;

                println!("Created config file: {}", config_path.display());
                println!("\nEdit this file to customize your settings.");
                Ok(())
            }
        }
    }
}

fn show_text(config: &Config) {
    println!("Configuration");
    println!("=============\n");

    if let Some(path) = &config.config_file {
        println!("Config file: {}", path.display());
    } else {
        println!(
            "Config file: {} (not found)",
            Config::default_config_path().display()
        );
    }
    println!();

    println!("export_dir: {}", config.export_dir.value.display());
    println!("  source: {}", config.export_dir.source);
    println!();

    println!("structure_file: {}", config.structure_file.value.display());
    println!("  source: {}", config.structure_file.source);
    println!();

    println!("normalize_timestamps: {}", config.normalize_timestamps.value);
    println!("  source: {}", config.normalize_timestamps.source);
    println!();

    let store = &config.store;
    println!("store:");
    match &store.project_id {
        Some(project) => println!("  project_id: {}", project),
        None => println!("  project_id: (not set)"),
    }
    println!(
        "  database_id: {}",
        store.database_id.as_deref().unwrap_or("(default)")
    );
    println!(
        "  access_token: {}",
        if store.access_token.is_some() {
            "(set)"
        } else {
            "(not set)"
        }
    );
    if let Some(host) = &store.emulator_host {
        println!("  emulator_host: {}", host);
    }
}
