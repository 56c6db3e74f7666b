//! Mock StoreClient for unit testing
//!
//! This module provides an in-memory implementation of `StoreClientTrait`
//! that can be used in unit tests without a running API server.
//!
//! The mock is organized as one generic table per kind (`table.rs`) with the
//! kind-specific write rules (status vs. spec updates) in this module.

mod table;

use crate::error::StoreError;
use crate::store_trait::StoreClientTrait;
use crds::{
    BareMetalHost, IPAddress, IPClaim, Machine, Metal3Data, Metal3DataClaim, Metal3DataTemplate,
    Metal3Machine,
};
use k8s_openapi::api::core::v1::Secret;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use table::Table;

/// Mock StoreClient for testing
///
/// Objects added with the `add_*` helpers get a uid and resource version.
/// Writes carrying a stale resource version fail with `StoreError::Conflict`,
/// and deleting an object with finalizers only sets its deletion timestamp.
#[derive(Clone)]
pub struct MockStoreClient {
    data: Table<Metal3Data>,
    templates: Table<Metal3DataTemplate>,
    claims: Table<Metal3DataClaim>,
    metal3_machines: Table<Metal3Machine>,
    machines: Table<Machine>,
    hosts: Table<BareMetalHost>,
    ip_claims: Table<IPClaim>,
    ip_addresses: Table<IPAddress>,
    secrets: Table<Secret>,
    fail_deletes: Arc<AtomicBool>,
}

impl Default for MockStoreClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStoreClient {
    /// Create an empty mock store
    pub fn new() -> Self {
        let versions = Arc::new(AtomicU64::new(0));
        Self {
            data: Table::new("Metal3Data", Arc::clone(&versions)),
            templates: Table::new("Metal3DataTemplate", Arc::clone(&versions)),
            claims: Table::new("Metal3DataClaim", Arc::clone(&versions)),
            metal3_machines: Table::new("Metal3Machine", Arc::clone(&versions)),
            machines: Table::new("Machine", Arc::clone(&versions)),
            hosts: Table::new("BareMetalHost", Arc::clone(&versions)),
            ip_claims: Table::new("IPClaim", Arc::clone(&versions)),
            ip_addresses: Table::new("IPAddress", Arc::clone(&versions)),
            secrets: Table::new("Secret", versions),
            fail_deletes: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Make every subsequent IPClaim delete fail with an API-style error
    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    // Setup helpers

    pub fn add_data(&self, data: Metal3Data) {
        self.data.insert(data);
    }

    pub fn add_data_template(&self, template: Metal3DataTemplate) {
        self.templates.insert(template);
    }

    pub fn add_data_claim(&self, claim: Metal3DataClaim) {
        self.claims.insert(claim);
    }

    pub fn add_metal3_machine(&self, machine: Metal3Machine) {
        self.metal3_machines.insert(machine);
    }

    pub fn add_machine(&self, machine: Machine) {
        self.machines.insert(machine);
    }

    pub fn add_host(&self, host: BareMetalHost) {
        self.hosts.insert(host);
    }

    pub fn add_ip_claim(&self, claim: IPClaim) {
        self.ip_claims.insert(claim);
    }

    pub fn add_ip_address(&self, address: IPAddress) {
        self.ip_addresses.insert(address);
    }

    pub fn add_secret(&self, secret: Secret) {
        self.secrets.insert(secret);
    }

    // Inspection helpers

    pub fn data(&self, namespace: &str, name: &str) -> Option<Metal3Data> {
        self.data.find(namespace, name)
    }

    pub fn ip_claim(&self, namespace: &str, name: &str) -> Option<IPClaim> {
        self.ip_claims.find(namespace, name)
    }

    pub fn ip_claim_count(&self) -> usize {
        self.ip_claims.len()
    }

    pub fn secret(&self, namespace: &str, name: &str) -> Option<Secret> {
        self.secrets.find(namespace, name)
    }

    pub fn secret_count(&self) -> usize {
        self.secrets.len()
    }
}

#[async_trait::async_trait]
impl StoreClientTrait for MockStoreClient {
    async fn update_data(&self, data: &Metal3Data) -> Result<Metal3Data, StoreError> {
        self.data.update(data, |stored, incoming| Metal3Data {
            metadata: incoming.metadata.clone(),
            spec: incoming.spec.clone(),
            status: stored.status.clone(),
        })
    }

    async fn update_data_status(&self, data: &Metal3Data) -> Result<Metal3Data, StoreError> {
        self.data.update(data, |stored, incoming| Metal3Data {
            metadata: stored.metadata.clone(),
            spec: stored.spec.clone(),
            status: incoming.status.clone(),
        })
    }

    async fn get_data_template(&self, namespace: &str, name: &str) -> Result<Metal3DataTemplate, StoreError> {
        self.templates.get(namespace, name)
    }

    async fn get_data_claim(&self, namespace: &str, name: &str) -> Result<Metal3DataClaim, StoreError> {
        self.claims.get(namespace, name)
    }

    async fn get_metal3_machine(&self, namespace: &str, name: &str) -> Result<Metal3Machine, StoreError> {
        self.metal3_machines.get(namespace, name)
    }

    async fn get_machine(&self, namespace: &str, name: &str) -> Result<Machine, StoreError> {
        self.machines.get(namespace, name)
    }

    async fn get_host(&self, namespace: &str, name: &str) -> Result<BareMetalHost, StoreError> {
        self.hosts.get(namespace, name)
    }

    async fn get_ip_claim(&self, namespace: &str, name: &str) -> Result<IPClaim, StoreError> {
        self.ip_claims.get(namespace, name)
    }

    async fn create_ip_claim(&self, claim: &IPClaim) -> Result<IPClaim, StoreError> {
        self.ip_claims.create(claim)
    }

    async fn update_ip_claim(&self, claim: &IPClaim) -> Result<IPClaim, StoreError> {
        self.ip_claims.update(claim, |_, incoming| incoming.clone())
    }

    async fn delete_ip_claim(&self, namespace: &str, name: &str) -> Result<(), StoreError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StoreError::Conflict(format!(
                "delete of IPClaim {}/{} rejected",
                namespace, name
            )));
        }
        self.ip_claims.delete(namespace, name)
    }

    async fn get_ip_address(&self, namespace: &str, name: &str) -> Result<IPAddress, StoreError> {
        self.ip_addresses.get(namespace, name)
    }

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret, StoreError> {
        self.secrets.get(namespace, name)
    }

    async fn create_secret(&self, secret: &Secret) -> Result<Secret, StoreError> {
        self.secrets.create(secret)
    }
}
