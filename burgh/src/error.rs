//! Types d'erreurs pour le crate burgh

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Erreurs de chargement d'une source tabulaire.
///
/// Une `LoadError` n'est jamais fatale pour un run: la source est ignorée
/// et les autres sources continuent d'être traitées.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Fichier illisible
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV invalide
    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Colonne obligatoire absente de l'en-tête
    #[error("Missing required column '{column}' in {path}")]
    MissingColumn { path: PathBuf, column: String },

    /// Ligne mal formée
    #[error("Malformed row in {path} at line {line}: {reason}")]
    Malformed {
        path: PathBuf,
        line: u64,
        reason: String,
    },
}

impl LoadError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn missing_column(path: impl Into<PathBuf>, column: impl Into<String>) -> Self {
        Self::MissingColumn {
            path: path.into(),
            column: column.into(),
        }
    }
}

/// Erreurs remontées par une capacité de géocodage externe.
///
/// Elles sont contenues par `GeocodeClient` et deviennent `GeocodeResult::Failed`.
#[derive(Debug, Clone, Error)]
pub enum LookupError {
    /// Erreur réseau (connexion, TLS, DNS...)
    #[error("transport error: {0}")]
    Transport(String),

    /// Statut HTTP non 2xx
    #[error("service returned HTTP {0}")]
    Status(u16),

    /// Réponse illisible
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Délai dépassé
    #[error("lookup timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Other(String),
}

/// Erreur de sérialisation du FeatureCollection (fatale pour le run)
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error while writing output: {0}")]
    Io(#[from] std::io::Error),
}

/// Erreurs structurelles du pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Toutes les sources ont échoué au chargement
    #[error("None of the {count} sources could be loaded")]
    NoReadableSource { count: usize },
}
