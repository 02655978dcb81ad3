//! Définition et implémentation des commandes CLI
//!
//! - commande par défaut: CSV → géocodage → GeoJSON (+ CSV consolidé)
//! - `to-geojson`: CSV déjà géocodé → GeoJSON (sans appel réseau)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use tracing::{info, warn};

use burgh_geocode::config::Config;
use burgh_geocode::run::{self, OutputPaths};
use burgh_geocode::NominatimLookup;

#[derive(Subcommand)]
pub enum Commands {
    /// Convert an already geocoded CSV (with lat/long columns) to GeoJSON
    ToGeojson {
        /// Consolidated CSV file
        #[arg(short, long)]
        input: PathBuf,

        /// Output GeoJSON file
        #[arg(short, long)]
        output: PathBuf,

        /// Config file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Emit "geometry": null for rows without coordinates
        #[arg(long)]
        strict_geometry: bool,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
}

/// Arguments du géocodage (commande par défaut)
#[derive(Args, Debug, Default)]
pub struct GeocodeArgs {
    /// Directory of CSV files (or a single CSV file)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output GeoJSON file
    #[arg(short, long)]
    pub output: PathBuf,

    /// Also write the consolidated CSV (source columns + Burgh_Cleaned, lat, long)
    #[arg(long)]
    pub csv_output: Option<PathBuf>,

    /// Save the run report as JSON
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Config file (JSON)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Column holding the burgh name (défaut : Burgh)
    #[arg(long)]
    pub name_column: Option<String>,

    /// Geocoder base URL (défaut : env BURGH_GEOCODER_URL / Nominatim public)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// HTTP User-Agent sent to the geocoder (défaut : geo_burgh_locator)
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Contact email sent to the geocoder
    #[arg(long)]
    pub email: Option<String>,

    /// Restrict matches to these country codes (ex: gb)
    #[arg(long)]
    pub country_codes: Option<String>,

    /// Lookup timeout in seconds (0 = no timeout)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Minimum delay between two lookups, in milliseconds (0 = no limit)
    #[arg(long)]
    pub min_interval_ms: Option<u64>,

    /// Maximum number of lookups in flight per file
    #[arg(long, alias = "threads")]
    pub jobs: Option<usize>,

    /// Emit "geometry": null for rows without coordinates
    #[arg(long)]
    pub strict_geometry: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Exécute le géocodage
pub async fn cmd_geocode(args: GeocodeArgs) -> Result<()> {
    let config = load_config(args.config.as_deref(), |config| apply_overrides(config, &args))?;

    let sources = burgh::list_sources(&args.input, &config.extension)
        .with_context(|| format!("Failed to list sources in {}", args.input.display()))?;

    if sources.is_empty() {
        anyhow::bail!(
            "No .{} sources found in {}",
            config.extension,
            args.input.display()
        );
    }

    println!("=== Geocoding ===");
    println!("Input: {}", args.input.display());
    println!("Sources: {}", sources.len());
    println!("Name column: {}", config.name_column);
    println!("Geocoder: {}", config.geocoder.endpoint);
    println!("Jobs: {}", config.geocoder.concurrency);
    println!(
        "Rate limit: {}",
        config
            .geocoder
            .min_interval()
            .map(|d| format!("1 request / {:?}", d))
            .unwrap_or_else(|| "none".to_string())
    );

    info!(sources = sources.len(), input = %args.input.display(), "Starting geocoding");

    let lookup = NominatimLookup::new(&config.geocoder)?;
    let outputs = OutputPaths {
        geojson: args.output.clone(),
        csv: args.csv_output.clone(),
        report: args.report.clone(),
    };

    let result = run::geocode_sources(&sources, &config, lookup, &outputs).await?;

    result.report.display();

    if result.report.sources_failed > 0 {
        warn!("{} sources skipped", result.report.sources_failed);
    }
    println!(
        "Geocoding complete: {} ({} features to {})",
        result.report.summary(),
        result.collection.len(),
        args.output.display()
    );

    Ok(())
}

/// Exécute la conversion CSV géocodé → GeoJSON
pub fn cmd_to_geojson(
    input: &Path,
    output: &Path,
    config_path: Option<&Path>,
    strict_geometry: bool,
    pretty: bool,
) -> Result<()> {
    let config = load_config(config_path, |config| {
        config.output.strict_geometry |= strict_geometry;
        config.output.pretty |= pretty;
    })?;

    let count = run::convert_geocoded_csv(input, output, &config)?;
    println!("Export complete: {} features to {}", count, output.display());

    Ok(())
}

/// Défauts < fichier JSON < environnement < CLI
fn load_config(path: Option<&Path>, overrides: impl FnOnce(&mut Config)) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config.apply_env();
    overrides(&mut config);
    config.validate()?;
    Ok(config)
}

fn apply_overrides(config: &mut Config, args: &GeocodeArgs) {
    if let Some(name_column) = &args.name_column {
        config.name_column = name_column.clone();
    }
    if let Some(endpoint) = &args.endpoint {
        config.geocoder.endpoint = endpoint.clone();
    }
    if let Some(user_agent) = &args.user_agent {
        config.geocoder.user_agent = user_agent.clone();
    }
    if let Some(email) = &args.email {
        config.geocoder.email = Some(email.clone());
    }
    if let Some(country_codes) = &args.country_codes {
        config.geocoder.country_codes = Some(country_codes.clone());
    }
    if let Some(timeout) = args.timeout {
        config.geocoder.timeout_secs = timeout;
    }
    if let Some(min_interval_ms) = args.min_interval_ms {
        config.geocoder.min_interval_ms = min_interval_ms;
    }
    if let Some(jobs) = args.jobs {
        config.geocoder.concurrency = jobs;
    }
    config.output.strict_geometry |= args.strict_geometry;
    config.output.pretty |= args.pretty;
}
