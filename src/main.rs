use catalog_datasets::app::inspect::{inspect, DatasetReport, VersionState};
use catalog_datasets::config::cli::Command;
use catalog_datasets::utils::{logger, validation::Validate};
use catalog_datasets::{CatalogConfig, CliConfig};
use clap::Parser;

fn load_catalog(path: &str) -> anyhow::Result<CatalogConfig> {
    tracing::info!("📁 Loading catalog from: {}", path);
    let catalog = CatalogConfig::from_file(path)
        .map_err(|e| anyhow::anyhow!("failed to load catalog '{}': {}", path, e))?;
    catalog.validate()?;
    tracing::info!("✅ Catalog loaded with {} datasets", catalog.datasets.len());
    Ok(catalog)
}

fn print_report(report: &DatasetReport) {
    let versions = match &report.versions {
        VersionState::Disabled => "versioning disabled".to_string(),
        VersionState::Latest(v) => format!("latest version {}", v),
        VersionState::Pinned(v) => format!("pinned to {}", v),
        VersionState::NoVersions => "no versions saved yet".to_string(),
        VersionState::Unknown => "versions resolved at load time".to_string(),
    };
    println!("{} ({})", report.name, report.kind);
    println!("  location: {}", report.location);
    println!("  versions: {}", versions);
    println!("  definition: {}", report.definition);
}

fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }
    tracing::debug!("CLI config: {:?}", config);

    match config.command {
        Command::Inspect {
            catalog,
            dataset,
            json,
        } => {
            let catalog = load_catalog(&catalog)?;
            let reports = inspect(&catalog, dataset.as_deref())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else {
                reports.iter().for_each(print_report);
            }
        }
        Command::Validate { catalog } => {
            if let Err(e) = load_catalog(&catalog) {
                tracing::error!("❌ Catalog validation failed: {}", e);
                eprintln!("❌ {}", e);
                std::process::exit(1);
            }
            println!("✅ {} is valid", catalog);
        }
    }

    Ok(())
}
