//! # burgh-geocode
//!
//! Géocodage des listes de burghs écossais (CSV) vers un GeoJSON unique.
//!
//! ## Features
//!
//! - Recherche Nominatim avec User-Agent, timeout et 1 requête/s par défaut
//! - Cache par run: un nom répété n'est recherché qu'une fois
//! - Export GeoJSON (compatible Leaflet) et CSV consolidé
//! - Rapport de run (console / JSON)
//!
//! ## Usage CLI
//!
//! ```bash
//! # Géocoder un dossier de CSV
//! burgh-geocode --input ./burghs --output ./burghs_data.json --csv-output ./consolidated_burghs.csv
//!
//! # Convertir un CSV déjà géocodé
//! burgh-geocode to-geojson --input ./consolidated_burghs.csv --output ./burghs_data.json
//! ```

pub mod config;
pub mod export;
pub mod nominatim;
pub mod report;
pub mod run;

pub use config::Config;
pub use nominatim::NominatimLookup;
pub use report::{RunReport, RunStatus};
pub use run::{convert_geocoded_csv, geocode_sources, OutputPaths, RunOutput};
