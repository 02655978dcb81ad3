//! Point d'entrée CLI pour burgh-geocode

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

/// Charge `.env`: d'abord en remontant depuis le répertoire courant,
/// sinon à côté de l'exécutable
fn load_env() {
    if dotenvy::dotenv().is_ok() {
        return;
    }
    let beside_exe = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(".env")));
    if let Some(path) = beside_exe {
        let _ = dotenvy::from_path(path);
    }
}

mod cli;

use cli::{Commands, GeocodeArgs};

/// Géocoder des listes CSV de burghs écossais vers un GeoJSON unique
#[derive(Parser)]
#[command(name = "burgh-geocode")]
#[command(author, version)]
#[command(about = "Géocoder des listes CSV de burghs écossais vers GeoJSON (défaut) ou convertir un CSV déjà géocodé")]
#[command(long_about = "Nettoie les noms de burghs, les géocode via Nominatim (1 requête/s, cache par run) et consolide tous les fichiers en une FeatureCollection.\n\nPar défaut, géocode un dossier de CSV. Utilisez 'to-geojson' pour convertir un CSV consolidé existant.")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Sous-commande (défaut: géocodage)
    #[command(subcommand)]
    command: Option<Commands>,

    /// Arguments du géocodage (commande par défaut)
    #[command(flatten)]
    geocode: Option<GeocodeArgs>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    // Configurer le logging
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Some(Commands::ToGeojson {
            input,
            output,
            config,
            strict_geometry,
            pretty,
        }) => {
            info!(input = %input.display(), output = %output.display(), "Conversion vers GeoJSON");
            cli::cmd_to_geojson(&input, &output, config.as_deref(), strict_geometry, pretty)?;
        }
        None => {
            // Commande par défaut: géocodage
            let Some(args) = cli.geocode else {
                anyhow::bail!("Arguments requis: --input et --output");
            };
            info!(input = %args.input.display(), output = %args.output.display(), "Géocodage vers GeoJSON");
            cli::cmd_geocode(args).await?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
