//! Reconciliation logic for Metal3Data.
//!
//! The `Reconciler` wraps `DataManager` with the persistence steps: the
//! release finalizer is written before any IPClaim or Secret is created, the
//! status is written back after every pass that changed it, and the finalizer
//! is only dropped once all leases are released.

use crate::backoff::BackoffTracker;
use crate::error::ControllerError;
use crate::manager::DataManager;
use crate::metrics::{Metrics, Outcome};
use chrono::Utc;
use crds::Metal3Data;
use kube::ResourceExt;
use kube_runtime::controller::Action;
use std::sync::Arc;
use std::time::Duration;
use store_client::StoreClientTrait;
use tracing::{debug, info, warn};

/// Reconciles Metal3Data resources.
pub struct Reconciler {
    store: Arc<dyn StoreClientTrait>,
    requeue_after: Duration,
    backoff: BackoffTracker,
    metrics: Arc<Metrics>,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("requeue_after", &self.requeue_after)
            .field("backoff", &self.backoff)
            .finish_non_exhaustive()
    }
}

/// `namespace/name` key used for logs and backoff state
pub fn object_key(data: &Metal3Data) -> String {
    format!("{}/{}", data.namespace().unwrap_or_default(), data.name_any())
}

impl Reconciler {
    /// Creates a new reconciler instance.
    pub fn new(store: Arc<dyn StoreClientTrait>, requeue_after: Duration, metrics: Arc<Metrics>) -> Self {
        Self {
            store,
            requeue_after,
            backoff: BackoffTracker::default(),
            metrics,
        }
    }

    /// Delay before the next attempt after `error`
    pub fn retry_delay(&self, data: &Metal3Data, error: &ControllerError) -> Duration {
        error
            .requeue_after()
            .unwrap_or_else(|| self.backoff.next_for(&object_key(data)))
    }

    /// Reconciles a Metal3Data resource.
    pub async fn reconcile_data(&self, data: &Metal3Data) -> Result<Action, ControllerError> {
        let key = object_key(data);
        info!("Reconciling Metal3Data {}", key);

        let data = data.clone();
        let result = if data.metadata.deletion_timestamp.is_some() {
            self.reconcile_delete(data).await
        } else {
            self.reconcile_normal(data).await
        };

        match &result {
            Ok(_) => self.backoff.reset(&key),
            Err(e) if e.is_transient() => {
                debug!("Metal3Data {} not ready: {}", key, e);
                self.metrics.record(Outcome::Requeue);
            }
            Err(e) => {
                warn!("Metal3Data {} failed: {}", key, e);
                self.metrics.record(Outcome::Error);
            }
        }
        result
    }

    async fn reconcile_normal(&self, mut data: Metal3Data) -> Result<Action, ControllerError> {
        if DataManager::new(self.store.as_ref(), &mut data, self.requeue_after).set_finalizer() {
            let updated = self.store.update_data(&data).await?;
            data.metadata.resource_version = updated.metadata.resource_version;
            debug!("Added finalizer to Metal3Data {}", object_key(&data));
        }

        let original_status = data.status.clone();
        let result = DataManager::new(self.store.as_ref(), &mut data, self.requeue_after)
            .reconcile()
            .await;

        if data.status != original_status {
            if let Some(status) = data.status.as_mut() {
                status.last_updated = Some(Utc::now());
            }
            self.store.update_data_status(&data).await?;
        }

        result?;
        self.metrics.record(Outcome::Ready);
        Ok(Action::await_change())
    }

    async fn reconcile_delete(&self, mut data: Metal3Data) -> Result<Action, ControllerError> {
        let key = object_key(&data);
        let mut mgr = DataManager::new(self.store.as_ref(), &mut data, self.requeue_after);
        mgr.release_leases().await?;

        if mgr.unset_finalizer() {
            match self.store.update_data(&data).await {
                Ok(_) => {}
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e.into()),
            }
        }

        info!("Released Metal3Data {}", key);
        self.metrics.record(Outcome::Deleted);
        Ok(Action::await_change())
    }
}
