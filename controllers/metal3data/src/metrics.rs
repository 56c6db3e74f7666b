//! Prometheus metrics and the probe/metrics HTTP server.

use crate::error::ControllerError;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::{extract::State, routing::get, Router};
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

/// Outcome label values for reconcile counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ready,
    Requeue,
    Error,
    Deleted,
}

impl Outcome {
    fn as_str(self) -> &'static str {
        match self {
            Outcome::Ready => "ready",
            Outcome::Requeue => "requeue",
            Outcome::Error => "error",
            Outcome::Deleted => "deleted",
        }
    }
}

/// Reconcile counters, labelled by outcome
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    reconciliations: IntCounterVec,
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics").finish_non_exhaustive()
    }
}

impl Metrics {
    pub fn new() -> Result<Self, ControllerError> {
        let registry = Registry::new();
        let reconciliations = IntCounterVec::new(
            Opts::new(
                "metal3data_reconciliations_total",
                "Metal3Data reconciliations by outcome",
            ),
            &["outcome"],
        )
        .map_err(|e| ControllerError::InvalidConfig(format!("metrics: {}", e)))?;
        registry
            .register(Box::new(reconciliations.clone()))
            .map_err(|e| ControllerError::InvalidConfig(format!("metrics: {}", e)))?;

        Ok(Self {
            registry,
            reconciliations,
        })
    }

    pub fn record(&self, outcome: Outcome) {
        self.reconciliations.with_label_values(&[outcome.as_str()]).inc();
    }

    /// Reconciliations recorded with `outcome`
    #[cfg(test)]
    pub fn count(&self, outcome: Outcome) -> u64 {
        self.reconciliations.with_label_values(&[outcome.as_str()]).get()
    }

    /// Text exposition of every registered metric
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

async fn metrics_handler(State(metrics): State<Arc<Metrics>>) -> impl IntoResponse {
    match metrics.render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// Routes for `/healthz`, `/readyz` and `/metrics`
pub fn router(metrics: Arc<Metrics>) -> Router {
    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route("/readyz", get(|| async { "ok" }))
        .route("/metrics", get(metrics_handler))
        .with_state(metrics)
}

/// Serve the probe and metrics endpoints until the task is aborted
pub async fn serve(address: SocketAddr, metrics: Arc<Metrics>) -> Result<(), ControllerError> {
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|e| ControllerError::InvalidConfig(format!("cannot bind {}: {}", address, e)))?;

    info!("Metrics server listening on {}", address);

    axum::serve(listener, router(metrics))
        .await
        .map_err(|e| ControllerError::Watch(format!("metrics server failed: {}", e)))
}
