//! # burgh
//!
//! Géocodage des listes historiques de burghs écossais vers GeoJSON.
//!
//! ## Features
//!
//! - Nettoyage des noms ("Royal Burgh of Ayr" -> "of Ayr")
//! - Client de géocodage injectable avec cache single-flight, timeout et limitation de débit
//! - Lecture CSV tolérante (UTF-8 ou Windows-1252, lignes courtes)
//! - Consolidation multi-fichiers sans perte de ligne
//! - FeatureCollection Point `[longitude, latitude]`, valeurs absentes en `""`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use burgh::{GeocodeClient, Pipeline, PipelineOptions};
//!
//! let pipeline = Pipeline::new(GeocodeClient::new(my_lookup), PipelineOptions::default());
//! let sources = burgh::list_sources(Path::new("./burghs"), "csv")?;
//! let outcome = pipeline.run(&sources).await?;
//! let collection = burgh::to_feature_collection(&outcome.consolidated);
//! collection.to_writer(std::fs::File::create("burghs_data.json")?)?;
//! ```

pub mod consolidate;
pub mod error;
pub mod geocode;
pub mod loader;
pub mod normalize;
pub mod pipeline;
pub mod serialize;
pub mod types;

pub use error::{LoadError, LookupError, PipelineError, SerializationError};
pub use geocode::{ClientOptions, ClientStats, GeocodeClient, Lookup};
pub use loader::{list_sources, load, LoadOptions};
pub use normalize::normalize;
pub use pipeline::{Pipeline, PipelineOptions, PipelineOutcome, SourceSummary};
pub use serialize::{records_to_feature_collection, to_feature_collection, FeatureCollection};
pub use types::{
    AnnotatedRecord, ConsolidatedSet, Coordinates, DerivedColumns, GeocodeResult, RawRecord,
    Scalar,
};
