//! Machine-side CRDs read during rendering
//!
//! Only the fields the Metal3Data reconciler consumes are modelled; unknown
//! fields are ignored on deserialization.

use crate::references::ObjectRef;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Annotation on a Metal3Machine naming its BareMetalHost as `namespace/name`
pub const HOST_ANNOTATION: &str = "metal3.io/BareMetalHost";

#[derive(CustomResource, Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "infrastructure.cluster.x-k8s.io",
    version = "v1beta1",
    kind = "Metal3Machine",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct Metal3MachineSpec {
    /// Template the machine's Metal3Data is rendered from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_template: Option<ObjectRef>,

    /// Provider ID set once the host is provisioned
    #[serde(default, rename = "providerID", skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
}

#[derive(CustomResource, Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "cluster.x-k8s.io",
    version = "v1beta1",
    kind = "Machine",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct MachineSpec {
    /// Owning cluster
    #[serde(default)]
    pub cluster_name: String,
}
