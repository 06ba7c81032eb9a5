//! Degraded-Mode Controller.
//!
//! Process-wide flag set by infrastructure probes (startup store check, configuration) and read
//! by request handlers. [`DegradedMode::run`] is the single place where a feature decides
//! between its live path and synthetic data.

use crate::error::CoreError;
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

/// Where a feature response's data came from. The payload shape is the same for all three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DataSource {
    Live,
    /// Global degraded mode.
    Synthetic,
    /// Live path failed for this one request.
    LocalDegrade,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Live => "live",
            DataSource::Synthetic => "synthetic",
            DataSource::LocalDegrade => "localDegrade",
        }
    }

    pub fn is_synthetic(&self) -> bool {
        !matches!(self, DataSource::Live)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DegradedModeState {
    pub enabled: bool,
    pub reason: Option<String>,
}

/// Value tagged with its [`DataSource`].
#[derive(Debug, Clone, PartialEq)]
pub struct Sourced<T> {
    pub value: T,
    pub source: DataSource,
}

#[derive(Debug, Default)]
pub struct DegradedMode {
    enabled: AtomicBool,
    reason: RwLock<Option<String>>,
}

impl DegradedMode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_degraded(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub fn state(&self) -> DegradedModeState {
        DegradedModeState {
            enabled: self.is_degraded(),
            reason: self.reason.read().unwrap_or_else(|p| p.into_inner()).clone(),
        }
    }

    pub fn enable(&self, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!(target: "synomind::degraded", reason = %reason, "degraded mode enabled");
        *self.reason.write().unwrap_or_else(|p| p.into_inner()) = Some(reason);
        self.enabled.store(true, Ordering::Release);
    }

    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Release);
        *self.reason.write().unwrap_or_else(|p| p.into_inner()) = None;
        tracing::info!(target: "synomind::degraded", "degraded mode disabled");
    }

    /// Samples the flag once for the current request.
    pub fn decide(&self) -> DataSource {
        if self.is_degraded() {
            DataSource::Synthetic
        } else {
            DataSource::Live
        }
    }

    /// Runs `live` unless degraded; a live failure falls back to `synthetic` for this request
    /// only. Validation must happen before this call.
    pub async fn run<T, L, Fut, S>(&self, feature: &str, live: L, synthetic: S) -> Sourced<T>
    where
        L: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
        S: FnOnce() -> T,
    {
        match self.decide() {
            DataSource::Live => match live().await {
                Ok(value) => Sourced { value, source: DataSource::Live },
                Err(e) => {
                    tracing::warn!(target: "synomind::degraded", feature, error = %e, "live path failed, serving synthetic data");
                    Sourced { value: synthetic(), source: DataSource::LocalDegrade }
                }
            },
            _ => {
                tracing::debug!(target: "synomind::degraded", feature, "degraded mode, serving synthetic data");
                Sourced { value: synthetic(), source: DataSource::Synthetic }
            }
        }
    }
}
