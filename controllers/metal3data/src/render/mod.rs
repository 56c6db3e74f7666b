//! Rendering engine.
//!
//! Pure functions turning a Metal3DataTemplate plus resolved inputs into the
//! metadata and network-config YAML documents. Nothing here performs I/O;
//! the same inputs always produce byte-identical output because every
//! mapping is emitted with sorted keys.

mod mac;
mod mask;
mod metadata;
mod network;

#[cfg(test)]
mod network_test;

pub use metadata::render_meta_data;
pub use network::render_network_data;

use crds::{BareMetalHost, Machine, Metal3Data, Metal3Machine, ObjectSelector};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised while rendering; all of them are hard errors
#[derive(Debug, Error)]
pub enum RenderError {
    /// A directive references a pool that was not resolved
    #[error("IP pool {0} has no resolved address")]
    PoolNotFound(String),

    /// The host has not been inspected
    #[error("host {0} has no hardware NIC details")]
    NoHardwareDetails(String),

    /// The host inventory has no interface with that name
    #[error("interface {interface} not found on host {host}")]
    InterfaceNotFound {
        /// Requested interface
        interface: String,
        /// Host searched
        host: String,
    },

    /// Object selector is not machine, metal3machine or baremetalhost
    #[error("unknown object type {0}")]
    InvalidObject(String),

    /// Static network without pool or literal address
    #[error("network {0} has neither ipAddressFromIPPool nor ipAddress")]
    MissingAddress(String),

    /// YAML encoding error
    #[error("YAML encoding failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Values resolved from one IP pool claim
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressFromPool {
    pub address: String,
    pub prefix: u8,
    pub gateway: String,
    pub dns_servers: Vec<String>,
}

/// Pool name to resolved values, rebuilt on every reconciliation
pub type PoolAddresses = BTreeMap<String, AddressFromPool>;

/// Objects a render pass reads from
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub data: &'a Metal3Data,
    pub provider_machine: &'a Metal3Machine,
    pub machine: &'a Machine,
    pub host: &'a BareMetalHost,
    pub pool_addresses: &'a PoolAddresses,
}

impl<'a> RenderContext<'a> {
    /// Metadata of the object a directive points at
    pub fn object(&self, selector: &ObjectSelector) -> Result<&'a ObjectMeta, RenderError> {
        match selector {
            ObjectSelector::Machine => Ok(&self.machine.metadata),
            ObjectSelector::Metal3Machine => Ok(&self.provider_machine.metadata),
            ObjectSelector::BareMetalHost => Ok(&self.host.metadata),
            ObjectSelector::Invalid(raw) => Err(RenderError::InvalidObject(raw.clone())),
        }
    }
}

pub(crate) fn pool_address<'p>(
    pools: &'p PoolAddresses,
    name: &str,
) -> Result<&'p AddressFromPool, RenderError> {
    pools
        .get(name)
        .ok_or_else(|| RenderError::PoolNotFound(name.to_string()))
}
