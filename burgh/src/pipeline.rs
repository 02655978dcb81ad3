//! Orchestration: chargement -> nettoyage -> géocodage -> consolidation

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::consolidate;
use crate::error::{LoadError, PipelineError};
use crate::geocode::{GeocodeClient, Lookup};
use crate::loader::{self, LoadOptions};
use crate::normalize::normalize;
use crate::types::{AnnotatedRecord, ConsolidatedSet, DerivedColumns, RawRecord};

/// Options du pipeline
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Colonne portant le nom du burgh
    pub name_column: String,

    /// Séparateur des fichiers sources
    pub delimiter: u8,

    /// Nombre de géocodages en vol simultanément pour une source
    pub concurrency: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            name_column: "Burgh".to_string(),
            delimiter: b',',
            concurrency: 1,
        }
    }
}

/// Résumé d'une source traitée
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSummary {
    pub path: PathBuf,
    pub records: usize,
}

/// Résultat d'un run complet
#[derive(Debug)]
pub struct PipelineOutcome {
    pub consolidated: ConsolidatedSet,

    /// Sources chargées, dans l'ordre de traitement
    pub sources: Vec<SourceSummary>,

    /// Sources ignorées et leur erreur
    pub failed_sources: Vec<(PathBuf, LoadError)>,
}

/// Pipeline de géocodage pour un run
pub struct Pipeline<L> {
    client: GeocodeClient<L>,
    options: PipelineOptions,
    derived: DerivedColumns,
}

impl<L: Lookup> Pipeline<L> {
    pub fn new(client: GeocodeClient<L>, options: PipelineOptions) -> Self {
        let derived = DerivedColumns::for_name_column(&options.name_column);
        Self {
            client,
            options,
            derived,
        }
    }

    pub fn client(&self) -> &GeocodeClient<L> {
        &self.client
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Traite toutes les sources dans l'ordre donné.
    ///
    /// # Errors
    ///
    /// `PipelineError::NoReadableSource` si des sources ont été fournies et
    /// qu'aucune n'a pu être chargée.
    pub async fn run(&self, sources: &[PathBuf]) -> Result<PipelineOutcome, PipelineError> {
        let mut sequences = Vec::with_capacity(sources.len());
        let mut summaries = Vec::new();
        let mut failed_sources = Vec::new();

        for path in sources {
            match self.process_source(path).await {
                Ok(records) => {
                    summaries.push(SourceSummary {
                        path: path.clone(),
                        records: records.len(),
                    });
                    sequences.push(records);
                }
                Err(e) => {
                    warn!(source = %path.display(), error = %e, "Skipping source");
                    failed_sources.push((path.clone(), e));
                }
            }
        }

        if !sources.is_empty() && summaries.is_empty() {
            return Err(PipelineError::NoReadableSource {
                count: sources.len(),
            });
        }

        let consolidated = consolidate::merge(sequences);
        let stats = self.client.stats();
        info!(
            sources = summaries.len(),
            failed = failed_sources.len(),
            records = consolidated.len(),
            lookups = stats.external_lookups,
            "Pipeline complete"
        );

        Ok(PipelineOutcome {
            consolidated,
            sources: summaries,
            failed_sources,
        })
    }

    /// Charge puis annote une source
    pub async fn process_source(&self, path: &Path) -> Result<Vec<AnnotatedRecord>, LoadError> {
        let load_options = LoadOptions {
            required_columns: vec![self.options.name_column.clone()],
            delimiter: self.options.delimiter,
        };
        let records = loader::load(path, &load_options)?;
        info!(source = %path.display(), records = records.len(), "Processing file");

        Ok(self.annotate(path, records).await)
    }

    /// Nettoie et géocode chaque enregistrement, en conservant l'ordre
    pub async fn annotate(&self, path: &Path, records: Vec<RawRecord>) -> Vec<AnnotatedRecord> {
        let source = Arc::new(path.to_path_buf());
        let concurrency = self.options.concurrency.max(1);

        stream::iter(records)
            .map(|raw| {
                let source = Arc::clone(&source);
                async move {
                    let cleaned_name = raw
                        .get(&self.options.name_column)
                        .map(|name| normalize(&name.as_text()))
                        .unwrap_or_default();
                    let geocode = self.client.resolve(&cleaned_name).await;
                    AnnotatedRecord {
                        source,
                        raw,
                        cleaned_name,
                        geocode,
                        derived: self.derived.clone(),
                    }
                }
            })
            .buffered(concurrency)
            .collect()
            .await
    }
}
