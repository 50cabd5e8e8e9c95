use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "catalog-datasets")]
#[command(about = "Inspect versioned study and model datasets declared in a catalog")]
pub struct CliConfig {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Validate the catalog and show where each dataset resolves
    Inspect {
        /// Path to the TOML catalog
        #[arg(short, long, default_value = "catalog.toml")]
        catalog: String,

        /// Only inspect this dataset
        #[arg(short, long)]
        dataset: Option<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate the catalog without touching any backend
    Validate {
        #[arg(short, long, default_value = "catalog.toml")]
        catalog: String,
    },
}
