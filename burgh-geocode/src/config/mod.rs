//! Configuration du système
//!
//! Ordre de priorité: valeurs par défaut < fichier JSON < variables
//! d'environnement (`.env` compris) < arguments CLI.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};

/// Endpoint public Nominatim
pub const DEFAULT_ENDPOINT: &str = "https://nominatim.openstreetmap.org";

/// User-Agent exigé par la politique d'usage Nominatim
pub const DEFAULT_USER_AGENT: &str = "geo_burgh_locator";

/// Configuration principale
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Colonne portant le nom du burgh
    pub name_column: String,

    /// Extension des fichiers sources
    pub extension: String,

    /// Séparateur des fichiers sources
    pub delimiter: char,

    pub geocoder: GeocoderConfig,

    pub output: OutputConfig,
}

/// Configuration du service de géocodage
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GeocoderConfig {
    /// URL de base du service (sans `/search`)
    pub endpoint: String,

    pub user_agent: String,

    /// Email de contact transmis au service
    pub email: Option<String>,

    /// Restriction pays, ex: "gb"
    pub country_codes: Option<String>,

    /// Délai maximal d'une recherche en secondes (0 = illimité)
    pub timeout_secs: u64,

    /// Intervalle minimal entre deux requêtes en millisecondes
    pub min_interval_ms: u64,

    /// Recherches simultanées par fichier
    pub concurrency: usize,
}

/// Configuration de la sortie GeoJSON
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// `"geometry": null` pour les features sans coordonnées (au lieu de `["", ""]`)
    pub strict_geometry: bool,

    /// JSON indenté
    pub pretty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name_column: "Burgh".to_string(),
            extension: "csv".to_string(),
            delimiter: ',',
            geocoder: GeocoderConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            email: None,
            country_codes: None,
            timeout_secs: 10,
            min_interval_ms: 1000,
            concurrency: 1,
        }
    }
}

impl GeocoderConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    pub fn min_interval(&self) -> Option<Duration> {
        (self.min_interval_ms > 0).then(|| Duration::from_millis(self.min_interval_ms))
    }
}

impl Config {
    /// Charge une configuration depuis un fichier
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("Failed to parse config JSON")?;
        config.validate()?;
        Ok(config)
    }

    /// Applique les variables d'environnement `BURGH_*`
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    fn apply_env_with(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(endpoint) = var("BURGH_GEOCODER_URL") {
            self.geocoder.endpoint = endpoint;
        }
        if let Some(user_agent) = var("BURGH_USER_AGENT") {
            self.geocoder.user_agent = user_agent;
        }
        if let Some(email) = var("BURGH_GEOCODER_EMAIL") {
            self.geocoder.email = Some(email);
        }
        if let Some(secs) = var("BURGH_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            self.geocoder.timeout_secs = secs;
        }
        if let Some(ms) = var("BURGH_MIN_INTERVAL_MS").and_then(|s| s.parse().ok()) {
            self.geocoder.min_interval_ms = ms;
        }
        if let Some(jobs) = var("BURGH_JOBS").and_then(|s| s.parse().ok()) {
            self.geocoder.concurrency = jobs;
        }
    }

    /// Vérifie la cohérence de la configuration
    pub fn validate(&self) -> Result<()> {
        if self.name_column.trim().is_empty() {
            anyhow::bail!("name_column must not be empty");
        }
        if !self.delimiter.is_ascii() {
            anyhow::bail!("delimiter must be a single ASCII character, got {:?}", self.delimiter);
        }
        if self.geocoder.user_agent.trim().is_empty() {
            anyhow::bail!("geocoder.user_agent must not be empty");
        }
        if self.geocoder.concurrency == 0 {
            anyhow::bail!("geocoder.concurrency must be at least 1");
        }
        Ok(())
    }

    /// Séparateur sous forme d'octet (validé ASCII)
    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.name_column, "Burgh");
        assert_eq!(config.geocoder.user_agent, "geo_burgh_locator");
        assert_eq!(config.geocoder.min_interval(), Some(Duration::from_secs(1)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config = Config::from_json(
            r#"{"name_column": "Name", "geocoder": {"country_codes": "gb", "timeout_secs": 0}}"#,
        )
        .unwrap();
        assert_eq!(config.name_column, "Name");
        assert_eq!(config.geocoder.country_codes.as_deref(), Some("gb"));
        assert_eq!(config.geocoder.timeout(), None);
        // champs absents: valeurs par défaut
        assert_eq!(config.geocoder.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.delimiter, ',');
    }

    #[test]
    fn test_invalid_config() {
        assert!(Config::from_json(r#"{"name_column": " "}"#).is_err());
        assert!(Config::from_json(r#"{"delimiter": "é"}"#).is_err());
        assert!(Config::from_json(r#"{"geocoder": {"concurrency": 0}}"#).is_err());
        assert!(Config::from_json("not json").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("BURGH_GEOCODER_URL", "http://localhost:8080"),
            ("BURGH_MIN_INTERVAL_MS", "0"),
            ("BURGH_JOBS", "4"),
            ("BURGH_TIMEOUT_SECS", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env_with(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.geocoder.endpoint, "http://localhost:8080");
        assert_eq!(config.geocoder.min_interval(), None);
        assert_eq!(config.geocoder.concurrency, 4);
        assert_eq!(config.geocoder.timeout_secs, 10);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(Config::load(Path::new("nonexistent.json")).is_err());
    }
}
