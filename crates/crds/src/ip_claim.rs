//! IPClaim CRD
//!
//! Requests an IP allocation from an IPPool. The allocator fills in
//! `status.address` (or `status.errorMessage`); this workspace only creates,
//! reads and releases claims.

use crate::references::ObjectRef;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "ipam.metal3.io",
    version = "v1alpha1",
    kind = "IPClaim",
    namespaced,
    status = "IPClaimStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct IPClaimSpec {
    /// Pool the address is requested from
    pub pool: ObjectRef,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IPClaimStatus {
    /// Allocated IPAddress object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<ObjectRef>,

    /// Error message if allocation failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}
