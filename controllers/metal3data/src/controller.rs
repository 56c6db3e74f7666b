//! Main controller implementation.
//!
//! This module contains the `Controller` struct that wires the Kubernetes
//! client, the reconciler, the Metal3Data watcher and the metrics server, and
//! runs them until one of them exits or Ctrl-C is received.

use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::metrics::{self, Metrics};
use crate::reconciler::Reconciler;
use crate::watcher::Watcher;
use crds::{IPClaim, Metal3Data};
use kube::{Api, Client};
use std::sync::Arc;
use store_client::KubeStoreClient;
use tokio::task::JoinHandle;
use tracing::info;

/// Main controller for Metal3Data management.
#[derive(Debug)]
pub struct Controller {
    data_watcher: JoinHandle<Result<(), ControllerError>>,
    metrics_server: JoinHandle<Result<(), ControllerError>>,
}

impl Controller {
    /// Creates a new controller instance and starts its tasks.
    pub async fn new(config: ControllerConfig) -> Result<Self, ControllerError> {
        info!("Initializing Metal3Data Controller");

        let kube_client = Client::try_default().await?;

        let (data_api, ip_claim_api): (Api<Metal3Data>, Api<IPClaim>) = match config.namespace.as_deref() {
            Some(ns) => (
                Api::namespaced(kube_client.clone(), ns),
                Api::namespaced(kube_client.clone(), ns),
            ),
            None => (Api::all(kube_client.clone()), Api::all(kube_client.clone())),
        };

        let metrics = Arc::new(Metrics::new()?);
        let store = Arc::new(KubeStoreClient::new(kube_client));
        let reconciler = Arc::new(Reconciler::new(store, config.requeue_after, Arc::clone(&metrics)));

        let watcher = Watcher::new(
            reconciler,
            data_api,
            ip_claim_api,
            config.debounce,
            config.concurrency,
        );

        let data_watcher = tokio::spawn(watcher.watch_data());
        let metrics_server = tokio::spawn(metrics::serve(config.metrics_bind_address, metrics));

        Ok(Self {
            data_watcher,
            metrics_server,
        })
    }

    /// Runs the controller until shutdown.
    pub async fn run(mut self) -> Result<(), ControllerError> {
        info!("Metal3Data Controller running");

        let result = tokio::select! {
            result = &mut self.data_watcher => {
                result.map_err(|e| ControllerError::Watch(format!("Metal3Data watcher panicked: {}", e)))?
            }
            result = &mut self.metrics_server => {
                result.map_err(|e| ControllerError::Watch(format!("metrics server panicked: {}", e)))?
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl-C, shutting down");
                Ok(())
            }
        };

        self.data_watcher.abort();
        self.metrics_server.abort();
        result
    }
}
