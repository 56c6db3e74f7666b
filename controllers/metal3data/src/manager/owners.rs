//! Ownership-graph lookups: Metal3DataClaim to Metal3Machine to Machine, plus
//! the host annotation on the Metal3Machine.

use super::DataManager;
use crate::error::ControllerError;
use crds::{BareMetalHost, Machine, Metal3DataTemplate, Metal3Machine, HOST_ANNOTATION};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use kube::ResourceExt;
use store_client::OptionalExt;
use tracing::debug;

const PROVIDER_MACHINE_KIND: &str = "Metal3Machine";
const PROVIDER_MACHINE_GROUP: &str = "infrastructure.cluster.x-k8s.io";
const MACHINE_KIND: &str = "Machine";
const MACHINE_GROUP: &str = "cluster.x-k8s.io";

/// Outcome of following the Metal3DataClaim back to its Metal3Machine
#[derive(Debug)]
pub enum ProviderMachineLookup {
    /// The claim or the Metal3Machine does not exist (yet)
    NotFound(String),
    /// The claim has no Metal3Machine owner reference
    NotOwned,
    /// The Metal3Machine uses another template
    TemplateMismatch,
    Found(Box<Metal3Machine>),
}

/// First owner reference of `kind` within API `group`, any version
pub(crate) fn find_owner<'m>(meta: &'m ObjectMeta, kind: &str, group: &str) -> Option<&'m OwnerReference> {
    meta.owner_references.iter().flatten().find(|owner| {
        owner.kind == kind && owner.api_version.split('/').next() == Some(group)
    })
}

/// `namespace/name` from the host annotation; a bare name uses `default_namespace`
pub(crate) fn parse_host_annotation(value: &str, default_namespace: &str) -> (String, String) {
    match value.split_once('/') {
        Some((namespace, name)) => (namespace.to_string(), name.to_string()),
        None => (default_namespace.to_string(), value.to_string()),
    }
}

impl DataManager<'_> {
    /// Follow the Metal3DataClaim owner reference to the Metal3Machine using `template`
    pub async fn provider_machine(
        &self,
        template: &Metal3DataTemplate,
    ) -> Result<ProviderMachineLookup, ControllerError> {
        let claim_ref = &self.data.spec.claim;
        if claim_ref.name.is_empty() {
            return Err(ControllerError::InvalidConfig(format!(
                "Metal3Data {} does not reference a Metal3DataClaim",
                self.data.name_any()
            )));
        }

        let namespace = self.namespace();
        let claim_namespace = claim_ref.namespace_or(&namespace);
        let Some(claim) = self
            .client
            .get_data_claim(claim_namespace, &claim_ref.name)
            .await
            .optional()?
        else {
            return Ok(ProviderMachineLookup::NotFound(format!(
                "Metal3DataClaim {}/{}",
                claim_namespace, claim_ref.name
            )));
        };

        let Some(owner) = find_owner(&claim.metadata, PROVIDER_MACHINE_KIND, PROVIDER_MACHINE_GROUP) else {
            return Ok(ProviderMachineLookup::NotOwned);
        };

        let Some(m3m) = self
            .client
            .get_metal3_machine(claim_namespace, &owner.name)
            .await
            .optional()?
        else {
            return Ok(ProviderMachineLookup::NotFound(format!(
                "Metal3Machine {}/{}",
                claim_namespace, owner.name
            )));
        };

        let template_namespace = template.namespace().unwrap_or_default();
        let m3m_namespace = m3m.namespace().unwrap_or_default();
        let uses_template = m3m.spec.data_template.as_ref().is_some_and(|reference| {
            reference.name == template.name_any()
                && reference.namespace_or(&m3m_namespace) == template_namespace
        });
        if !uses_template {
            debug!(
                "Metal3Machine {}/{} does not use Metal3DataTemplate {}/{}",
                m3m_namespace,
                m3m.name_any(),
                template_namespace,
                template.name_any()
            );
            return Ok(ProviderMachineLookup::TemplateMismatch);
        }

        Ok(ProviderMachineLookup::Found(Box::new(m3m)))
    }

    /// Machine owning the Metal3Machine, `None` until it is linked and visible
    pub async fn owner_machine(&self, m3m: &Metal3Machine) -> Result<Option<Machine>, ControllerError> {
        let Some(owner) = find_owner(&m3m.metadata, MACHINE_KIND, MACHINE_GROUP) else {
            return Ok(None);
        };
        let namespace = m3m.namespace().unwrap_or_default();
        Ok(self.client.get_machine(&namespace, &owner.name).await.optional()?)
    }

    /// BareMetalHost named by the Metal3Machine annotation, `None` until associated
    pub async fn host(&self, m3m: &Metal3Machine) -> Result<Option<BareMetalHost>, ControllerError> {
        let Some(annotation) = m3m.annotations().get(HOST_ANNOTATION) else {
            return Ok(None);
        };
        let (namespace, name) = parse_host_annotation(annotation, &m3m.namespace().unwrap_or_default());
        Ok(self.client.get_host(&namespace, &name).await.optional()?)
    }
}
