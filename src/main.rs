// src/main.rs

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use order_export::logging::setup_tracing;
use order_export::{prepare, run, validate, Config, VipPolicy};

#[derive(Parser)]
#[command(name = "order-export")]
#[command(
    about = "Flatten customer orders into a CSV table, flagging VIP customers",
    long_about = None
)]
struct Cli {
    /// Path to a YAML or JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Serialized customer/order collection
    #[arg(long, global = true)]
    orders: Option<PathBuf>,

    /// VIP list, one customer id per line
    #[arg(long, global = true)]
    vip: Option<PathBuf>,

    /// Destination CSV file
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Input format (json, pkl); defaults to the file extension
    #[arg(long, global = true)]
    format: Option<String>,

    /// Keep only rows of VIP customers instead of flagging all rows
    #[arg(long, global = true)]
    vip_only: bool,

    /// Skip the data-quality report
    #[arg(long, global = true)]
    no_validate: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the export (default if no command specified)
    Run,

    /// Load and flatten the inputs and report data quality without writing
    Validate,

    /// Write a configuration file with the default settings
    GenerateConfig {
        /// Where to write the configuration
        #[arg(short = 'o', long = "path", default_value = "order-export.yaml")]
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    setup_tracing();

    let cli = Cli::parse();

    match &cli.command {
        None | Some(Commands::Run) => {
            let config = resolve_config(&cli)?;
            let summary = run(&config)?;
            info!(
                customers = summary.customers,
                vip_ids = summary.vip_ids,
                rows = summary.rows,
                vip_rows = summary.vip_rows,
                output = %summary.output.display(),
                "Extraction complete"
            );
        }

        Some(Commands::Validate) => {
            let config = resolve_config(&cli)?;
            let prepared = prepare(&config)?;
            validate(&prepared.flattened.rows).log();
        }

        Some(Commands::GenerateConfig { path }) => {
            generate_config(path)?;
        }
    }

    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(path) = &cli.orders {
        config.input.orders_path = path.clone();
    }
    if let Some(path) = &cli.vip {
        config.input.vip_path = path.clone();
    }
    if let Some(path) = &cli.output {
        config.output.path = path.clone();
    }
    if let Some(format) = &cli.format {
        config.input.format = Some(format.clone());
    }
    if cli.vip_only {
        config.processing.vip_policy = VipPolicy::VipOnly;
    }
    if cli.no_validate {
        config.processing.validate = false;
    }

    config.validate()?;
    Ok(config)
}

fn generate_config(output: &Path) -> Result<()> {
    let yaml = Config::default().to_yaml()?;
    std::fs::write(output, yaml)
        .with_context(|| format!("failed to write {}", output.display()))?;
    info!(path = %output.display(), "Generated default configuration");
    Ok(())
}
