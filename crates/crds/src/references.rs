//! Kubernetes object references for Metal3 CRDs
//!
//! Provides a namespaced reference used for cross-resource links (template,
//! claim, pool, secret and address references).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Reference to a namespaced object by name
///
/// `namespace` is optional and defaults to the namespace of the referencing
/// resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRef {
    /// Name of the referenced resource
    #[serde(default)]
    pub name: String,

    /// Namespace of the referenced resource (defaults to the referencing resource's namespace)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl ObjectRef {
    /// Create a reference in the same namespace as the referencing resource
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
        }
    }

    /// Create a reference with an explicit namespace
    pub fn with_namespace(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: Some(namespace.into()),
        }
    }

    /// Namespace of the referenced object, falling back to `default`
    pub fn namespace_or<'a>(&'a self, default: &'a str) -> &'a str {
        match self.namespace.as_deref() {
            Some(ns) if !ns.is_empty() => ns,
            _ => default,
        }
    }

    /// Whether the reference names nothing
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }
}
