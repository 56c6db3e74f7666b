//! BareMetalHost CRD (read only)
//!
//! Provides the hardware NIC inventory used to resolve MAC addresses.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "metal3.io",
    version = "v1alpha1",
    kind = "BareMetalHost",
    namespaced,
    status = "BareMetalHostStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct BareMetalHostSpec {
    /// Desired power state
    #[serde(default)]
    pub online: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BareMetalHostStatus {
    /// Inspected hardware, absent until inspection completes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardware: Option<HardwareDetails>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HardwareDetails {
    /// Network interfaces in inventory order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nics: Option<Vec<Nic>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Nic {
    /// Interface name
    #[serde(default)]
    pub name: String,
    /// MAC address
    #[serde(default)]
    pub mac: String,
}

impl BareMetalHost {
    /// NIC inventory, if the host has been inspected
    pub fn nics(&self) -> Option<&[Nic]> {
        self.status
            .as_ref()?
            .hardware
            .as_ref()?
            .nics
            .as_deref()
    }
}
