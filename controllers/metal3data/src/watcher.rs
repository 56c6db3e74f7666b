//! Kubernetes resource watchers.
//!
//! Metal3Data objects are reconciled through `kube_runtime::Controller`,
//! which handles reconnection and per-object serialization. IPClaims owned by
//! a Metal3Data are watched as well so that an allocation finishing on the
//! claim triggers the owner's reconciliation.

use crate::error::ControllerError;
use crate::reconciler::{object_key, Reconciler};
use crds::{IPClaim, Metal3Data};
use futures::StreamExt;
use kube::Api;
use kube_runtime::{controller::{Action, Config as RuntimeConfig}, watcher, Controller};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Watches Metal3Data and the IPClaims they own.
pub struct Watcher {
    reconciler: Arc<Reconciler>,
    data_api: Api<Metal3Data>,
    ip_claim_api: Api<IPClaim>,
    debounce: Duration,
    concurrency: u16,
}

impl std::fmt::Debug for Watcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watcher")
            .field("debounce", &self.debounce)
            .field("concurrency", &self.concurrency)
            .finish_non_exhaustive()
    }
}

fn error_policy(data: Arc<Metal3Data>, error: &ControllerError, reconciler: Arc<Reconciler>) -> Action {
    let delay = reconciler.retry_delay(&data, error);
    if error.is_transient() {
        debug!("Requeue Metal3Data {} in {:?}: {}", object_key(&data), delay, error);
    } else {
        error!("Reconciliation error for Metal3Data {}: {} (retry in {:?})", object_key(&data), error, delay);
    }
    Action::requeue(delay)
}

impl Watcher {
    /// Creates a new watcher instance.
    pub fn new(
        reconciler: Arc<Reconciler>,
        data_api: Api<Metal3Data>,
        ip_claim_api: Api<IPClaim>,
        debounce: Duration,
        concurrency: u16,
    ) -> Self {
        Self {
            reconciler,
            data_api,
            ip_claim_api,
            debounce,
            concurrency,
        }
    }

    /// Starts watching Metal3Data resources; runs until the watch stream ends.
    pub async fn watch_data(self) -> Result<(), ControllerError> {
        info!("Starting Metal3Data watcher");

        let reconcile = |data: Arc<Metal3Data>, reconciler: Arc<Reconciler>| async move {
            reconciler.reconcile_data(&data).await
        };

        let controller_config = RuntimeConfig::default()
            .debounce(self.debounce)
            .concurrency(self.concurrency);

        Controller::new(self.data_api, watcher::Config::default())
            .owns(self.ip_claim_api, watcher::Config::default())
            .with_config(controller_config)
            .run(reconcile, error_policy, self.reconciler)
            .for_each(|res| async move {
                match res {
                    Ok((object, _)) => debug!("Reconciled Metal3Data {}", object.name),
                    Err(e) => error!("Controller error for Metal3Data: {}", e),
                }
            })
            .await;

        info!("Metal3Data watcher stopped");
        Ok(())
    }
}
