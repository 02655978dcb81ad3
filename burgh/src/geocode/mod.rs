//! Client de géocodage avec cache, confinement des erreurs et limitation de débit
//!
//! Le service externe est injecté via le trait [`Lookup`]: les tests substituent
//! une implémentation factice, l'application branche Nominatim.

pub mod cache;
pub mod throttle;

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::{debug, warn};

use crate::error::LookupError;
use crate::types::{Coordinates, GeocodeResult};

pub use cache::SingleFlightCache;
pub use throttle::Throttle;

/// Capacité de géocodage externe: nom -> coordonnées éventuelles
pub trait Lookup: Send + Sync {
    fn lookup<'a>(&'a self, query: &'a str)
        -> BoxFuture<'a, Result<Option<Coordinates>, LookupError>>;
}

impl<L: Lookup + ?Sized> Lookup for Arc<L> {
    fn lookup<'a>(
        &'a self,
        query: &'a str,
    ) -> BoxFuture<'a, Result<Option<Coordinates>, LookupError>> {
        (**self).lookup(query)
    }
}

impl<L: Lookup + ?Sized> Lookup for Box<L> {
    fn lookup<'a>(
        &'a self,
        query: &'a str,
    ) -> BoxFuture<'a, Result<Option<Coordinates>, LookupError>> {
        (**self).lookup(query)
    }
}

/// Options du client
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// Délai maximal d'une recherche (None = pas de limite)
    pub timeout: Option<Duration>,

    /// Intervalle minimal entre deux appels externes (None = pas de limite)
    pub min_interval: Option<Duration>,
}

/// Statistiques d'un run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientStats {
    /// Noms distincts présents dans le cache
    pub cached_names: usize,
    /// Appels effectifs au service externe
    pub external_lookups: usize,
}

/// Client de géocodage pour un run
pub struct GeocodeClient<L> {
    lookup: L,
    cache: SingleFlightCache,
    throttle: Option<Throttle>,
    timeout: Option<Duration>,
    external_lookups: AtomicUsize,
}

impl<L: Lookup> GeocodeClient<L> {
    pub fn new(lookup: L) -> Self {
        Self::with_options(lookup, ClientOptions::default())
    }

    pub fn with_options(lookup: L, options: ClientOptions) -> Self {
        Self {
            lookup,
            cache: SingleFlightCache::new(),
            throttle: options
                .min_interval
                .filter(|d| !d.is_zero())
                .map(Throttle::new),
            timeout: options.timeout,
            external_lookups: AtomicUsize::new(0),
        }
    }

    /// Géocode un nom nettoyé. Ne retourne jamais d'erreur: les échecs
    /// deviennent `GeocodeResult::Failed` et sont mis en cache comme le reste.
    pub async fn resolve(&self, name: &str) -> GeocodeResult {
        if name.is_empty() {
            return GeocodeResult::Unresolved;
        }
        self.cache
            .get_or_resolve(name, || self.fetch(name))
            .await
    }

    pub fn stats(&self) -> ClientStats {
        ClientStats {
            cached_names: self.cache.resolved_names(),
            external_lookups: self.external_lookups.load(Ordering::Relaxed),
        }
    }

    async fn fetch(&self, name: &str) -> GeocodeResult {
        if let Some(throttle) = &self.throttle {
            throttle.wait().await;
        }
        self.external_lookups.fetch_add(1, Ordering::Relaxed);

        // une implémentation qui panique produit un échec, comme une erreur
        let guarded = async {
            AssertUnwindSafe(async { self.lookup.lookup(name).await })
                .catch_unwind()
                .await
                .unwrap_or_else(|_| Err(LookupError::Other("lookup panicked".to_string())))
        };
        let response = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, guarded)
                .await
                .unwrap_or(Err(LookupError::Timeout(limit))),
            None => guarded.await,
        };

        match response {
            Ok(Some(coords)) if coords.is_valid() => {
                debug!(
                    query = name,
                    lat = coords.latitude,
                    long = coords.longitude,
                    "Resolved"
                );
                GeocodeResult::Resolved(coords)
            }
            Ok(Some(coords)) => {
                let reason = format!(
                    "malformed coordinates: lat={}, long={}",
                    coords.latitude, coords.longitude
                );
                warn!(query = name, reason = %reason, "Geocoding failed");
                GeocodeResult::Failed { reason }
            }
            Ok(None) => {
                debug!(query = name, "No match");
                GeocodeResult::Unresolved
            }
            Err(e) => {
                warn!(query = name, reason = %e, "Geocoding failed");
                GeocodeResult::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}
