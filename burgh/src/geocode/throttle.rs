//! Limitation de débit des appels au service externe

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Garantit un intervalle minimal entre deux appels successifs
#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_call: Mutex::new(None),
        }
    }

    /// Attend que l'intervalle depuis le dernier appel soit écoulé puis réserve le créneau
    pub async fn wait(&self) {
        let mut last_call = self.last_call.lock().await;
        if let Some(last) = *last_call {
            let next = last + self.interval;
            if next > Instant::now() {
                tokio::time::sleep_until(next).await;
            }
        }
        *last_call = Some(Instant::now());
    }
}
