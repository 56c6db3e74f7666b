//! StoreClient trait for mocking
//!
//! This trait abstracts the object store so the reconciler can be unit tested
//! against an in-memory implementation. `KubeStoreClient` implements it over
//! the Kubernetes API.

use crate::error::StoreError;
use crds::{
    BareMetalHost, IPAddress, IPClaim, Machine, Metal3Data, Metal3DataClaim, Metal3DataTemplate,
    Metal3Machine,
};
use k8s_openapi::api::core::v1::Secret;

/// Trait for object store operations used by the Metal3Data controller
///
/// Writes are conditional on `metadata.resourceVersion` when it is set; a stale
/// version yields `StoreError::Conflict`. All async methods must be `Send` to
/// work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait StoreClientTrait: Send + Sync {
    // Metal3Data
    async fn update_data(&self, data: &Metal3Data) -> Result<Metal3Data, StoreError>;
    async fn update_data_status(&self, data: &Metal3Data) -> Result<Metal3Data, StoreError>;

    // Read-only inputs
    async fn get_data_template(&self, namespace: &str, name: &str) -> Result<Metal3DataTemplate, StoreError>;
    async fn get_data_claim(&self, namespace: &str, name: &str) -> Result<Metal3DataClaim, StoreError>;
    async fn get_metal3_machine(&self, namespace: &str, name: &str) -> Result<Metal3Machine, StoreError>;
    async fn get_machine(&self, namespace: &str, name: &str) -> Result<Machine, StoreError>;
    async fn get_host(&self, namespace: &str, name: &str) -> Result<BareMetalHost, StoreError>;

    // IPAM
    async fn get_ip_claim(&self, namespace: &str, name: &str) -> Result<IPClaim, StoreError>;
    async fn create_ip_claim(&self, claim: &IPClaim) -> Result<IPClaim, StoreError>;
    async fn update_ip_claim(&self, claim: &IPClaim) -> Result<IPClaim, StoreError>;
    async fn delete_ip_claim(&self, namespace: &str, name: &str) -> Result<(), StoreError>;
    async fn get_ip_address(&self, namespace: &str, name: &str) -> Result<IPAddress, StoreError>;

    // Secrets
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret, StoreError>;
    async fn create_secret(&self, secret: &Secret) -> Result<Secret, StoreError>;
}
