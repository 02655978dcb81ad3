//! Cache de géocodage à vol unique (single-flight)
//!
//! Chaque nom possède une cellule `OnceCell` partagée: le premier appelant
//! exécute la recherche, les appelants concurrents attendent le même résultat.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OnceCell;

use crate::types::GeocodeResult;

type Slot = Arc<OnceCell<GeocodeResult>>;

/// Cache nom nettoyé -> résultat, limité à la durée d'un run
#[derive(Debug, Default)]
pub struct SingleFlightCache {
    slots: Mutex<HashMap<String, Slot>>,
}

impl SingleFlightCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retourne le résultat en cache ou exécute `init` une seule fois pour ce nom
    pub async fn get_or_resolve<F, Fut>(&self, name: &str, init: F) -> GeocodeResult
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = GeocodeResult>,
    {
        let slot = self.slot(name);
        slot.get_or_init(init).await.clone()
    }

    /// Nombre de noms ayant un résultat
    pub fn resolved_names(&self) -> usize {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.values().filter(|slot| slot.initialized()).count()
    }

    fn slot(&self, name: &str) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(name.to_string()).or_default())
    }
}
