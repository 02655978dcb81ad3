//! Rapport de run avec graceful degradation
//!
//! Collecte les sources ignorées, les géocodages en échec et les compteurs
//! d'un run, pour affichage console ou sauvegarde JSON.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use burgh::{ClientStats, GeocodeResult, PipelineOutcome};
use serde::Serialize;

/// Statut global du run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunStatus {
    /// Toutes les sources lues, tous les noms résolus
    Success,
    /// Sortie produite avec des sources ignorées ou des noms non résolus
    PartialSuccess,
    /// Aucune sortie exploitable
    Failed,
}

/// Niveau de sévérité
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorLevel {
    /// Erreur fatale: run abandonné
    Fatal,
    /// Source ignorée
    Error,
}

/// Erreur de run avec contexte
#[derive(Debug, Clone, Serialize)]
pub struct RunError {
    pub level: ErrorLevel,
    /// Fichier source concerné (optionnel)
    pub source: Option<String>,
    pub message: String,
}

/// Warning: un nom dont le géocodage a échoué
#[derive(Debug, Clone, Serialize)]
pub struct RunWarning {
    pub source: String,
    pub name: String,
    pub message: String,
}

/// Rapport complet d'un run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub duration_secs: f64,
    pub status: RunStatus,

    pub sources_processed: usize,
    pub sources_failed: usize,

    pub records_total: usize,
    pub resolved: usize,
    pub unresolved: usize,
    pub failed: usize,

    /// Appels effectifs au service de géocodage
    pub external_lookups: usize,
    /// Noms distincts mis en cache
    pub distinct_names: usize,

    pub errors: Vec<RunError>,
    pub warnings: Vec<RunWarning>,
}

impl Default for RunReport {
    fn default() -> Self {
        Self {
            duration_secs: 0.0,
            status: RunStatus::Success,
            sources_processed: 0,
            sources_failed: 0,
            records_total: 0,
            resolved: 0,
            unresolved: 0,
            failed: 0,
            external_lookups: 0,
            distinct_names: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

impl RunReport {
    /// Construit le rapport depuis le résultat du pipeline
    pub fn from_outcome(outcome: &PipelineOutcome, stats: ClientStats) -> Self {
        let mut report = Self {
            external_lookups: stats.external_lookups,
            distinct_names: stats.cached_names,
            ..Default::default()
        };

        for _ in &outcome.sources {
            report.record_source_success();
        }
        for (path, error) in &outcome.failed_sources {
            report.record_source_failure(&path.display().to_string(), &error.to_string());
        }
        for record in outcome.consolidated.iter() {
            report.record_geocode(
                &record.source.display().to_string(),
                &record.cleaned_name,
                &record.geocode,
            );
        }

        report
    }

    pub fn record_source_success(&mut self) {
        self.sources_processed += 1;
    }

    pub fn record_source_failure(&mut self, source: &str, message: &str) {
        self.sources_processed += 1;
        self.sources_failed += 1;
        self.errors.push(RunError {
            level: ErrorLevel::Error,
            source: Some(source.to_string()),
            message: message.to_string(),
        });
    }

    /// Erreur fatale (sortie illisible, aucune source lisible...)
    pub fn record_fatal(&mut self, message: &str) {
        self.errors.push(RunError {
            level: ErrorLevel::Fatal,
            source: None,
            message: message.to_string(),
        });
    }

    pub fn record_geocode(&mut self, source: &str, name: &str, result: &GeocodeResult) {
        self.records_total += 1;
        match result {
            GeocodeResult::Resolved(_) => self.resolved += 1,
            GeocodeResult::Unresolved => self.unresolved += 1,
            GeocodeResult::Failed { reason } => {
                self.failed += 1;
                self.warnings.push(RunWarning {
                    source: source.to_string(),
                    name: name.to_string(),
                    message: reason.clone(),
                });
            }
        }
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final
    pub fn finalize(&mut self) {
        let has_fatal = self.errors.iter().any(|e| e.level == ErrorLevel::Fatal);
        let degraded = !self.errors.is_empty() || self.unresolved > 0 || self.failed > 0;

        let all_sources_failed =
            self.sources_processed > 0 && self.sources_failed == self.sources_processed;

        self.status = if has_fatal || all_sources_failed {
            RunStatus::Failed
        } else if degraded {
            RunStatus::PartialSuccess
        } else {
            RunStatus::Success
        };
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("GEOCODING REPORT");
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Duration: {:.2}s", self.duration_secs);

        println!("\n--- SUMMARY ---");
        println!(
            "Sources: {} processed, {} failed",
            self.sources_processed, self.sources_failed
        );
        println!(
            "Records: {} total, {} resolved, {} unresolved, {} failed",
            self.records_total, self.resolved, self.unresolved, self.failed
        );
        println!(
            "Lookups: {} external calls for {} distinct names",
            self.external_lookups, self.distinct_names
        );

        if !self.warnings.is_empty() {
            println!("\n--- WARNINGS ({}) ---", self.warnings.len());
            for w in self.warnings.iter().take(10) {
                println!("  [{}] {}: {}", w.source, w.name, w.message);
            }
            if self.warnings.len() > 10 {
                println!("  ... and {} more", self.warnings.len() - 10);
            }
        }

        if !self.errors.is_empty() {
            println!("\n--- ERRORS ({}) ---", self.errors.len());
            for e in self.errors.iter().take(20) {
                let location = e
                    .source
                    .as_ref()
                    .map(|s| format!("[{}]", s))
                    .unwrap_or_default();
                println!("  {:?} {} {}", e.level, location, e.message);
            }
            if self.errors.len() > 20 {
                println!("  ... and {} more", self.errors.len() - 20);
            }
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{} records: {} resolved, {} unresolved, {} failed ({} lookups)",
            self.records_total, self.resolved, self.unresolved, self.failed, self.external_lookups
        )
    }
}
