//! Output secret construction.

use crds::Metal3Data;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use kube::{Resource, ResourceExt};
use std::collections::BTreeMap;

/// Data key of the metadata secret
pub const METADATA_KEY: &str = "metaData";
/// Data key of the network-config secret
pub const NETWORK_DATA_KEY: &str = "networkData";
pub const SECRET_TYPE: &str = "infrastructure.cluster.x-k8s.io/secret";
pub const CLUSTER_NAME_LABEL: &str = "cluster.x-k8s.io/cluster-name";

pub fn metadata_secret_name(machine_name: &str) -> String {
    format!("{}-metadata", machine_name)
}

pub fn network_data_secret_name(machine_name: &str) -> String {
    format!("{}-networkdata", machine_name)
}

/// Secret holding one rendered document, controlled by `data`
pub fn build_secret(
    data: &Metal3Data,
    name: &str,
    key: &str,
    content: Vec<u8>,
    cluster_name: &str,
) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: data.namespace(),
            labels: Some(BTreeMap::from([(
                CLUSTER_NAME_LABEL.to_string(),
                cluster_name.to_string(),
            )])),
            owner_references: data.controller_owner_ref(&()).map(|owner| vec![owner]),
            ..Default::default()
        },
        data: Some(BTreeMap::from([(key.to_string(), ByteString(content))])),
        type_: Some(SECRET_TYPE.to_string()),
        ..Default::default()
    }
}
