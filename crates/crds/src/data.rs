//! Metal3Data and Metal3DataClaim CRDs
//!
//! A Metal3Data is one per-machine instantiation of a Metal3DataTemplate.
//! A Metal3DataClaim binds the requesting Metal3Machine to its Metal3Data.

use crate::references::ObjectRef;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Finalizer placed on Metal3Data objects and on the IPClaims they own
pub const DATA_FINALIZER: &str = "metal3data.infrastructure.cluster.x-k8s.io";

#[derive(CustomResource, Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "infrastructure.cluster.x-k8s.io",
    version = "v1beta1",
    kind = "Metal3Data",
    plural = "metal3datas",
    namespaced,
    status = "Metal3DataStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct Metal3DataSpec {
    /// Position of this instance within its template
    #[serde(default)]
    pub index: i64,

    /// Template this instance renders
    #[serde(default)]
    pub template: ObjectRef,

    /// Claim this instance was created for
    #[serde(default)]
    pub claim: ObjectRef,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Metal3DataStatus {
    /// Rendered secrets exist
    #[serde(default)]
    pub ready: bool,

    /// Last hard error, cleared by the next successful pass
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Secret holding the rendered metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_data: Option<ObjectRef>,

    /// Secret holding the rendered network configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_data: Option<ObjectRef>,

    /// Last status change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(CustomResource, Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "infrastructure.cluster.x-k8s.io",
    version = "v1beta1",
    kind = "Metal3DataClaim",
    namespaced,
    status = "Metal3DataClaimStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct Metal3DataClaimSpec {
    /// Template the claim requests data from
    #[serde(default)]
    pub template: ObjectRef,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Metal3DataClaimStatus {
    /// Metal3Data bound to this claim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render_data: Option<ObjectRef>,

    /// Error message if binding failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}
