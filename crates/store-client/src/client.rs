//! Kubernetes-backed object store client
//!
//! Implements `StoreClientTrait` with `kube::Api`. Every call is namespaced;
//! the client itself is not bound to a namespace.

use crate::error::StoreError;
use crate::store_trait::StoreClientTrait;
use crds::{
    BareMetalHost, IPAddress, IPClaim, Machine, Metal3Data, Metal3DataClaim, Metal3DataTemplate,
    Metal3Machine,
};
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::NamespaceResourceScope;
use kube::api::{Api, DeleteParams, Patch, PatchParams, PostParams};
use kube::{Client, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use tracing::debug;

/// Object store client over the Kubernetes API
#[derive(Clone)]
pub struct KubeStoreClient {
    client: Client,
}

impl KubeStoreClient {
    /// Create a new store client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api<K>(&self, namespace: &str) -> Api<K>
    where
        K: Resource<Scope = NamespaceResourceScope>,
        K::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), namespace)
    }

    async fn get<K>(&self, namespace: &str, name: &str) -> Result<K, StoreError>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug,
        K::DynamicType: Default,
    {
        self.api::<K>(namespace)
            .get(name)
            .await
            .map_err(|e| StoreError::from_kube(e, StoreError::Conflict))
    }

    async fn create<K>(&self, obj: &K) -> Result<K, StoreError>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Serialize + Debug,
        K::DynamicType: Default,
    {
        let namespace = obj.namespace().unwrap_or_default();
        debug!("Creating {}/{}", namespace, obj.name_any());
        self.api::<K>(&namespace)
            .create(&PostParams::default(), obj)
            .await
            .map_err(|e| StoreError::from_kube(e, StoreError::AlreadyExists))
    }

    async fn replace<K>(&self, obj: &K) -> Result<K, StoreError>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Serialize + Debug,
        K::DynamicType: Default,
    {
        let namespace = obj.namespace().unwrap_or_default();
        self.api::<K>(&namespace)
            .replace(&obj.name_any(), &PostParams::default(), obj)
            .await
            .map_err(|e| StoreError::from_kube(e, StoreError::Conflict))
    }
}

#[async_trait::async_trait]
impl StoreClientTrait for KubeStoreClient {
    async fn update_data(&self, data: &Metal3Data) -> Result<Metal3Data, StoreError> {
        self.replace(data).await
    }

    async fn update_data_status(&self, data: &Metal3Data) -> Result<Metal3Data, StoreError> {
        let status = data.status.clone().unwrap_or_default();
        // Explicit nulls so cleared fields are removed by the merge patch
        let mut patch = serde_json::json!({
            "status": {
                "ready": status.ready,
                "errorMessage": status.error_message,
                "metaData": status.meta_data,
                "networkData": status.network_data,
                "lastUpdated": status.last_updated,
            }
        });
        if let Some(version) = data.resource_version() {
            patch["metadata"] = serde_json::json!({ "resourceVersion": version });
        }

        let namespace = data.namespace().unwrap_or_default();
        self.api::<Metal3Data>(&namespace)
            .patch_status(&data.name_any(), &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .map_err(|e| StoreError::from_kube(e, StoreError::Conflict))
    }

    async fn get_data_template(&self, namespace: &str, name: &str) -> Result<Metal3DataTemplate, StoreError> {
        self.get(namespace, name).await
    }

    async fn get_data_claim(&self, namespace: &str, name: &str) -> Result<Metal3DataClaim, StoreError> {
        self.get(namespace, name).await
    }

    async fn get_metal3_machine(&self, namespace: &str, name: &str) -> Result<Metal3Machine, StoreError> {
        self.get(namespace, name).await
    }

    async fn get_machine(&self, namespace: &str, name: &str) -> Result<Machine, StoreError> {
        self.get(namespace, name).await
    }

    async fn get_host(&self, namespace: &str, name: &str) -> Result<BareMetalHost, StoreError> {
        self.get(namespace, name).await
    }

    async fn get_ip_claim(&self, namespace: &str, name: &str) -> Result<IPClaim, StoreError> {
        self.get(namespace, name).await
    }

    async fn create_ip_claim(&self, claim: &IPClaim) -> Result<IPClaim, StoreError> {
        self.create(claim).await
    }

    async fn update_ip_claim(&self, claim: &IPClaim) -> Result<IPClaim, StoreError> {
        self.replace(claim).await
    }

    async fn delete_ip_claim(&self, namespace: &str, name: &str) -> Result<(), StoreError> {
        debug!("Deleting IPClaim {}/{}", namespace, name);
        self.api::<IPClaim>(namespace)
            .delete(name, &DeleteParams::default())
            .await
            .map(|_| ())
            .map_err(|e| StoreError::from_kube(e, StoreError::Conflict))
    }

    async fn get_ip_address(&self, namespace: &str, name: &str) -> Result<IPAddress, StoreError> {
        self.get(namespace, name).await
    }

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret, StoreError> {
        self.get(namespace, name).await
    }

    async fn create_secret(&self, secret: &Secret) -> Result<Secret, StoreError> {
        self.create(secret).await
    }
}
