//! Enchaînement complet d'un run: sources -> pipeline -> fichiers de sortie

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use burgh::{
    ClientOptions, FeatureCollection, GeocodeClient, LoadOptions, Lookup, Pipeline,
    PipelineOptions, PipelineOutcome,
};
use tracing::{info, warn};

use crate::config::Config;
use crate::export;
use crate::report::RunReport;

/// Fichiers produits par un run
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub geojson: PathBuf,
    pub csv: Option<PathBuf>,
    /// Rapport JSON, écrit aussi lorsque le run échoue
    pub report: Option<PathBuf>,
}

/// Résultat d'un run
#[derive(Debug)]
pub struct RunOutput {
    pub outcome: PipelineOutcome,
    pub collection: FeatureCollection,
    pub report: RunReport,
}

/// Construit le pipeline à partir de la configuration
pub fn build_pipeline<L: Lookup>(config: &Config, lookup: L) -> Pipeline<L> {
    let client = GeocodeClient::with_options(
        lookup,
        ClientOptions {
            timeout: config.geocoder.timeout(),
            min_interval: config.geocoder.min_interval(),
        },
    );

    Pipeline::new(
        client,
        PipelineOptions {
            name_column: config.name_column.clone(),
            delimiter: config.delimiter_byte(),
            concurrency: config.geocoder.concurrency,
        },
    )
}

/// Géocode toutes les sources et écrit les sorties.
///
/// Les sources illisibles et les géocodages en échec sont reportés dans le
/// rapport; seules les erreurs structurelles (aucune source lisible, sortie
/// impossible à écrire) sont retournées. Dans ce cas le rapport porte une
/// erreur fatale et le statut `Failed`, et il est tout de même sauvegardé.
pub async fn geocode_sources<L: Lookup>(
    sources: &[PathBuf],
    config: &Config,
    lookup: L,
    outputs: &OutputPaths,
) -> Result<RunOutput> {
    let started_at = Instant::now();
    let pipeline = build_pipeline(config, lookup);

    let (outcome, collection) = match produce_outputs(&pipeline, sources, config, outputs).await {
        Ok(produced) => produced,
        Err(e) => {
            let mut report = RunReport::default();
            report.record_fatal(&format!("{:#}", e));
            report.set_duration(started_at.elapsed());
            report.finalize();
            if let Some(report_path) = &outputs.report {
                if let Err(save_err) = report.save_to_file(report_path) {
                    warn!(error = %save_err, "Failed to save run report");
                }
            }
            return Err(e);
        }
    };

    let mut report = RunReport::from_outcome(&outcome, pipeline.client().stats());
    report.set_duration(started_at.elapsed());
    report.finalize();

    if let Some(report_path) = &outputs.report {
        report
            .save_to_file(report_path)
            .with_context(|| format!("Failed to save report to {}", report_path.display()))?;
    }

    Ok(RunOutput {
        outcome,
        collection,
        report,
    })
}

async fn produce_outputs<L: Lookup>(
    pipeline: &Pipeline<L>,
    sources: &[PathBuf],
    config: &Config,
    outputs: &OutputPaths,
) -> Result<(PipelineOutcome, FeatureCollection)> {
    let outcome = pipeline.run(sources).await?;
    let collection = burgh::to_feature_collection(&outcome.consolidated);

    export::export_to_geojson(&collection, &config.output, &outputs.geojson)?;
    info!(
        features = collection.len(),
        output = %outputs.geojson.display(),
        "GeoJSON written"
    );

    if let Some(csv_path) = &outputs.csv {
        export::export_to_csv(&outcome.consolidated, csv_path)?;
        info!(output = %csv_path.display(), "Consolidated CSV written");
    }

    Ok((outcome, collection))
}

/// Convertit un CSV déjà géocodé (colonnes `lat`/`long`) en GeoJSON, sans appel
/// externe; les lignes sont reprises telles quelles.
pub fn convert_geocoded_csv(input: &Path, output: &Path, config: &Config) -> Result<usize> {
    let options = LoadOptions {
        required_columns: vec![
            burgh::DerivedColumns::LAT.to_string(),
            burgh::DerivedColumns::LONG.to_string(),
        ],
        delimiter: config.delimiter_byte(),
    };
    let records = burgh::load(input, &options)
        .with_context(|| format!("Failed to load {}", input.display()))?;

    let collection = burgh::records_to_feature_collection(
        &records,
        burgh::DerivedColumns::LAT,
        burgh::DerivedColumns::LONG,
    );
    export::export_to_geojson(&collection, &config.output, output)?;

    Ok(collection.len())
}
