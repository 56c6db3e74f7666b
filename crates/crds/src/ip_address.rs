//! IPAddress CRD
//!
//! Immutable allocation record produced by the IP pool allocator.

use crate::references::ObjectRef;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "ipam.metal3.io",
    version = "v1alpha1",
    kind = "IPAddress",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct IPAddressSpec {
    /// Claim the address was allocated for
    #[serde(default)]
    pub claim: ObjectRef,

    /// Pool the address was allocated from
    #[serde(default)]
    pub pool: ObjectRef,

    /// Allocated address
    pub address: String,

    /// Prefix length of the allocated network
    #[serde(default)]
    pub prefix: u8,

    /// Gateway of the allocated network
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,

    /// DNS servers for the allocated network
    #[serde(default, rename = "dnsServers")]
    pub dns_servers: Vec<String>,
}
