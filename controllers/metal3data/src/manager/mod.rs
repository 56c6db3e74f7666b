//! Metal3Data lifecycle management.
//!
//! `DataManager` drives one reconciliation of one Metal3Data: finalizer and
//! error bookkeeping, secret idempotence, address resolution through the
//! IPClaim protocol and rendering of the output documents. It only mutates the
//! in-memory object; persisting it is up to the caller.

mod owners;
mod resolver;
mod secrets;


pub use owners::ProviderMachineLookup;
pub use resolver::referenced_pools;
pub use secrets::{
    build_secret, metadata_secret_name, network_data_secret_name, METADATA_KEY, NETWORK_DATA_KEY,
};

use crate::error::ControllerError;
use crate::finalizers::{add_finalizer, remove_finalizer};
use crate::render::{render_meta_data, render_network_data, RenderContext, RenderError};
use crds::{Metal3Data, Metal3DataStatus, Metal3DataTemplate, ObjectRef, DATA_FINALIZER};
use kube::ResourceExt;
use std::time::Duration;
use store_client::{OptionalExt, StoreClientTrait};
use tracing::{debug, info};

/// Reconciliation state for one Metal3Data
pub struct DataManager<'a> {
    client: &'a dyn StoreClientTrait,
    data: &'a mut Metal3Data,
    requeue_after: Duration,
}

impl std::fmt::Debug for DataManager<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataManager")
            .field("data", &self.data.name_any())
            .field("requeue_after", &self.requeue_after)
            .finish_non_exhaustive()
    }
}

impl<'a> DataManager<'a> {
    pub fn new(
        client: &'a dyn StoreClientTrait,
        data: &'a mut Metal3Data,
        requeue_after: Duration,
    ) -> Self {
        Self {
            client,
            data,
            requeue_after,
        }
    }

    fn namespace(&self) -> String {
        self.data.namespace().unwrap_or_default()
    }

    fn status_mut(&mut self) -> &mut Metal3DataStatus {
        self.data.status.get_or_insert_with(Metal3DataStatus::default)
    }

    fn error_message(&self) -> Option<&str> {
        self.data.status.as_ref().and_then(|s| s.error_message.as_deref())
    }

    /// Add the release finalizer; returns `true` if it was missing
    pub fn set_finalizer(&mut self) -> bool {
        add_finalizer(&mut self.data.metadata, DATA_FINALIZER)
    }

    /// Remove the release finalizer; returns `true` if it was present
    pub fn unset_finalizer(&mut self) -> bool {
        remove_finalizer(&mut self.data.metadata, DATA_FINALIZER)
    }

    /// Record a user-visible error; `ready` is left untouched
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.status_mut().error_message = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        if let Some(status) = self.data.status.as_mut() {
            status.error_message = None;
        }
    }

    /// Forward reconciliation.
    ///
    /// Transient outcomes are returned as they are. Hard errors are recorded
    /// on the status unless a more specific message was already recorded.
    pub async fn reconcile(&mut self) -> Result<(), ControllerError> {
        self.clear_error();

        match self.create_secrets().await {
            Ok(()) => Ok(()),
            Err(e) if e.is_transient() => Err(e),
            Err(e) => {
                if self.error_message().is_none() {
                    self.set_error(e.to_string());
                }
                Err(e)
            }
        }
    }

    /// Ensure the metadata and network-config secrets exist.
    ///
    /// Secrets that already exist are never rendered again; missing ones are
    /// all rendered before the first one is written.
    pub async fn create_secrets(&mut self) -> Result<(), ControllerError> {
        let namespace = self.namespace();
        let Some(template) = self.template().await? else {
            return Ok(());
        };

        let m3m = match self.provider_machine(&template).await? {
            ProviderMachineLookup::Found(m3m) => m3m,
            ProviderMachineLookup::NotFound(what) => {
                return Err(ControllerError::requeue(
                    self.requeue_after,
                    format!("{} not found", what),
                ));
            }
            ProviderMachineLookup::NotOwned => {
                return Err(ControllerError::Ownership(format!(
                    "Metal3DataClaim {} has no Metal3Machine owner",
                    self.data.spec.claim.name
                )));
            }
            ProviderMachineLookup::TemplateMismatch => return Ok(()),
        };

        let machine_name = m3m.name_any();
        let metadata_name = metadata_secret_name(&machine_name);
        let network_data_name = network_data_secret_name(&machine_name);
        let wants_metadata = template.spec.meta_data.is_some();
        let wants_network_data = template.spec.network_data.is_some();

        let mut missing_metadata = false;
        if wants_metadata {
            if self.client.get_secret(&namespace, &metadata_name).await.optional()?.is_some() {
                self.status_mut().meta_data = Some(ObjectRef::with_namespace(&metadata_name, &namespace));
            } else {
                missing_metadata = true;
            }
        }

        let mut missing_network_data = false;
        if wants_network_data {
            if self.client.get_secret(&namespace, &network_data_name).await.optional()?.is_some() {
                self.status_mut().network_data =
                    Some(ObjectRef::with_namespace(&network_data_name, &namespace));
            } else {
                missing_network_data = true;
            }
        }

        if !missing_metadata && !missing_network_data {
            debug!("Secrets for Metal3Data {}/{} already exist", namespace, self.data.name_any());
            self.mark_ready();
            return Ok(());
        }

        let pool_addresses = self.get_addresses_from_pool(&template.spec).await?;

        let Some(machine) = self.owner_machine(&m3m).await? else {
            return Err(ControllerError::requeue(
                self.requeue_after,
                format!("owner Machine of Metal3Machine {} not found", machine_name),
            ));
        };
        let Some(host) = self.host(&m3m).await? else {
            return Err(ControllerError::requeue(
                self.requeue_after,
                format!("BareMetalHost of Metal3Machine {} not found", machine_name),
            ));
        };

        let ctx = RenderContext {
            data: self.data,
            provider_machine: &m3m,
            machine: &machine,
            host: &host,
            pool_addresses: &pool_addresses,
        };
        let metadata = if missing_metadata {
            render_meta_data(template.spec.meta_data.as_ref(), &ctx)
                .map_err(|e| ("metadata", e))
        } else {
            Ok(None)
        };
        let network_data = if missing_network_data {
            render_network_data(template.spec.network_data.as_ref(), &host, &pool_addresses)
                .map_err(|e| ("network data", e))
        } else {
            Ok(None)
        };
        let (metadata, network_data) = match (metadata, network_data) {
            (Ok(metadata), Ok(network_data)) => (metadata, network_data),
            (Err((what, e)), _) | (_, Err((what, e))) => return Err(self.render_failed(what, e)),
        };

        let cluster_name = template.spec.cluster_name.as_str();
        if let Some(content) = metadata {
            let secret = build_secret(self.data, &metadata_name, METADATA_KEY, content, cluster_name);
            self.client.create_secret(&secret).await?;
            info!("Created Secret {}/{}", namespace, metadata_name);
            self.status_mut().meta_data = Some(ObjectRef::with_namespace(&metadata_name, &namespace));
        }
        if let Some(content) = network_data {
            let secret = build_secret(self.data, &network_data_name, NETWORK_DATA_KEY, content, cluster_name);
            self.client.create_secret(&secret).await?;
            info!("Created Secret {}/{}", namespace, network_data_name);
            self.status_mut().network_data =
                Some(ObjectRef::with_namespace(&network_data_name, &namespace));
        }

        self.mark_ready();
        Ok(())
    }

    /// Release every IPClaim created for the template's pools
    pub async fn release_leases(&mut self) -> Result<(), ControllerError> {
        let Some(template) = self.template().await? else {
            return Ok(());
        };

        for pool in referenced_pools(&template.spec) {
            self.release_address_from_pool(&pool).await?;
        }
        Ok(())
    }

    /// Referenced template; `Ok(None)` when there is nothing to do.
    ///
    /// A missing template requeues, except on a deleting Metal3Data where
    /// nothing is left to release.
    async fn template(&self) -> Result<Option<Metal3DataTemplate>, ControllerError> {
        let template_ref = &self.data.spec.template;
        if template_ref.name.is_empty() {
            return Ok(None);
        }

        let namespace = self.namespace();
        let template_namespace = template_ref.namespace_or(&namespace);
        match self
            .client
            .get_data_template(template_namespace, &template_ref.name)
            .await
            .optional()?
        {
            Some(template) => Ok(Some(template)),
            None if self.data.metadata.deletion_timestamp.is_some() => {
                debug!(
                    "Metal3DataTemplate {}/{} gone, nothing to release",
                    template_namespace, template_ref.name
                );
                Ok(None)
            }
            None => Err(ControllerError::requeue(
                self.requeue_after,
                format!(
                    "Metal3DataTemplate {}/{} not found",
                    template_namespace, template_ref.name
                ),
            )),
        }
    }

    fn render_failed(&mut self, what: &str, err: RenderError) -> ControllerError {
        self.set_error(format!("Failed to render the {} secret: {}", what, err));
        ControllerError::Render(err)
    }

    fn mark_ready(&mut self) {
        let status = self.status_mut();
        status.ready = true;
        status.error_message = None;
    }
}
