use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kure_ingest_config::{Config, ModuleManifest, MANIFEST_FILE};
use kure_ingest_extract::model::{Package, PackageSet};
use kure_ingest_extract::{classify_packages, generate_bundle, write_bundle};

#[derive(Debug, Parser)]
#[command(name = "kure-ingest")]
#[command(about = "Generate Kure API definitions from a typed package model")]
struct Cli {
    /// kure.toml configuration file.
    #[arg(short = 'c', long, default_value = "kure.toml")]
    config: PathBuf,

    /// Change to this directory before starting.
    #[arg(short = 'd', long)]
    cd: Option<PathBuf>,

    /// Directory to write generated schemas.
    #[arg(short = 'o', long, default_value = "schema")]
    output: PathBuf,

    /// Package model JSON files to scan.
    #[arg(required = true, value_name = "PACKAGES")]
    packages: Vec<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    // Resolve the output path before any chdir so relative -o keeps meaning
    // what the caller wrote.
    let output = std::path::absolute(&cli.output)
        .map_err(|err| format!("failed to resolve output path '{}': {err}", cli.output.display()))?;

    let mut config = Config::load(&cli.config)
        .map_err(|err| format!("failed to load {}: {err}", cli.config.display()))?;

    if let Some(dir) = &cli.cd {
        std::env::set_current_dir(dir)
            .map_err(|err| format!("failed to change directory to '{}': {err}", dir.display()))?;
    }

    let manifest = ModuleManifest::load(MANIFEST_FILE)
        .map_err(|err| format!("failed to load {MANIFEST_FILE}: {err}"))?;

    let mut packages: Vec<Package> = Vec::new();
    for path in &cli.packages {
        let set = PackageSet::load(path)
            .map_err(|err| format!("failed to load packages from '{}': {err}", path.display()))?;
        packages.extend(set.packages);
    }
    info!(packages = packages.len(), "loaded package model");

    config
        .resolve_versions(&manifest)
        .map_err(|err| format!("failed to resolve dependency version: {err}"))?;

    let scanned = classify_packages(&config, &manifest, packages);

    let bundle = generate_bundle(&config, &scanned).map_err(|err| err.to_string())?;

    println!("API: {}", bundle.api.name);

    write_bundle(&bundle, &output).map_err(|err| err.to_string())?;

    Ok(())
}
