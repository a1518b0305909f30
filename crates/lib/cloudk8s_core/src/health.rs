//! Readiness and liveness checks.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

/// A probe answered by the `/health` and `/readiness` routes.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn is_ok(&self) -> bool;
}

/// Always healthy. Used when a probe has nothing to check.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysHealthy;

#[async_trait]
impl HealthCheck for AlwaysHealthy {
    async fn is_ok(&self) -> bool {
        true
    }
}

/// Fixed answer, for tests and for probes toggled by the caller.
#[derive(Debug, Default)]
pub struct StaticHealth(pub AtomicBool);

impl StaticHealth {
    pub fn new(ok: bool) -> Self {
        Self(AtomicBool::new(ok))
    }

    pub fn set(&self, ok: bool) {
        self.0.store(ok, Ordering::SeqCst);
    }
}

#[async_trait]
impl HealthCheck for StaticHealth {
    async fn is_ok(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
