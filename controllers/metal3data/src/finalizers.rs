//! Finalizer set operations on object metadata.
//!
//! Finalizers are stored as a string list; these helpers treat the list as a
//! set so adding and removing are idempotent. Metadata is only rewritten when
//! membership actually changes.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeSet;

/// Set view of an object's finalizers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinalizerSet(BTreeSet<String>);

impl FinalizerSet {
    /// Finalizers currently on `meta`
    pub fn of(meta: &ObjectMeta) -> Self {
        Self(meta.finalizers.iter().flatten().cloned().collect())
    }

    /// Returns `true` if the finalizer was not present
    pub fn insert(&mut self, finalizer: &str) -> bool {
        self.0.insert(finalizer.to_string())
    }

    /// Returns `true` if the finalizer was present
    pub fn remove(&mut self, finalizer: &str) -> bool {
        self.0.remove(finalizer)
    }

    /// Write the set back; an empty set clears the field
    pub fn apply(self, meta: &mut ObjectMeta) {
        meta.finalizers = if self.0.is_empty() {
            None
        } else {
            Some(self.0.into_iter().collect())
        };
    }
}

/// Add `finalizer`; returns `true` if metadata changed
pub fn add_finalizer(meta: &mut ObjectMeta, finalizer: &str) -> bool {
    let mut set = FinalizerSet::of(meta);
    let changed = set.insert(finalizer);
    if changed {
        set.apply(meta);
    }
    changed
}

/// Remove `finalizer`; returns `true` if metadata changed
pub fn remove_finalizer(meta: &mut ObjectMeta, finalizer: &str) -> bool {
    let mut set = FinalizerSet::of(meta);
    let changed = set.remove(finalizer);
    if changed {
        set.apply(meta);
    }
    changed
}
