//! Metal3Data Controller
//!
//! Reconciles `Metal3Data` objects: resolves the IP pools their template
//! references through `IPClaim`s, renders the per-machine metadata and
//! network-config documents and stores them in Secrets, and releases the
//! claims again when the Metal3Data is deleted.

mod backoff;
mod config;
mod controller;
mod error;
mod finalizers;
mod manager;
mod metrics;
mod reconciler;
mod render;
mod watcher;

#[cfg(test)]
mod reconciler_test;
#[cfg(test)]
mod test_utils;

use crate::config::ControllerConfig;
use crate::error::ControllerError;
use controller::Controller;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    tracing_subscriber::fmt::init();

    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| ControllerError::InvalidConfig("rustls crypto provider already installed".to_string()))?;

    info!("Starting Metal3Data Controller");

    let config = ControllerConfig::from_env()?;

    info!("Configuration:");
    info!("  Namespace: {}", config.namespace.as_deref().unwrap_or("all namespaces"));
    info!("  Requeue after: {:?}", config.requeue_after);
    info!("  Concurrency: {}", config.concurrency);
    info!("  Metrics address: {}", config.metrics_bind_address);

    let controller = Controller::new(config).await?;
    controller.run().await?;

    Ok(())
}
