//! Generic in-memory object table
//!
//! Stores objects by `(namespace, name)` and emulates the API server rules the
//! controller relies on: resource versions, uid assignment and
//! finalizer-gated deletion.

use crate::error::StoreError;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use kube::Resource;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Key = (String, String);

#[derive(Clone)]
pub(crate) struct Table<K> {
    kind: &'static str,
    objects: Arc<Mutex<HashMap<Key, K>>>,
    versions: Arc<AtomicU64>,
}

fn key_of<K: Resource>(obj: &K) -> Key {
    let meta = obj.meta();
    (
        meta.namespace.clone().unwrap_or_default(),
        meta.name.clone().unwrap_or_default(),
    )
}

pub(crate) fn now() -> Result<Time, StoreError> {
    let stamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    Ok(serde_json::from_value(serde_json::Value::String(stamp))?)
}

impl<K: Resource + Clone> Table<K> {
    pub(crate) fn new(kind: &'static str, versions: Arc<AtomicU64>) -> Self {
        Self {
            kind,
            objects: Arc::new(Mutex::new(HashMap::new())),
            versions,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Key, K>> {
        self.objects.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_version(&self) -> String {
        (self.versions.fetch_add(1, Ordering::SeqCst) + 1).to_string()
    }

    fn describe(&self, key: &Key) -> String {
        format!("{} {}/{}", self.kind, key.0, key.1)
    }

    /// Store an object as-is apart from filling uid and resource version
    pub(crate) fn insert(&self, mut obj: K) {
        let version = self.next_version();
        let meta = obj.meta_mut();
        if meta.uid.is_none() {
            meta.uid = Some(uuid::Uuid::new_v4().to_string());
        }
        meta.resource_version = Some(version);
        self.lock().insert(key_of(&obj), obj);
    }

    pub(crate) fn find(&self, namespace: &str, name: &str) -> Option<K> {
        self.lock()
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    pub(crate) fn get(&self, namespace: &str, name: &str) -> Result<K, StoreError> {
        let key = (namespace.to_string(), name.to_string());
        self.lock()
            .get(&key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(self.describe(&key)))
    }

    pub(crate) fn create(&self, obj: &K) -> Result<K, StoreError> {
        let key = key_of(obj);
        let mut objects = self.lock();
        if objects.contains_key(&key) {
            return Err(StoreError::AlreadyExists(self.describe(&key)));
        }
        let mut created = obj.clone();
        let version = self.next_version();
        let meta = created.meta_mut();
        meta.uid = Some(uuid::Uuid::new_v4().to_string());
        meta.resource_version = Some(version);
        meta.deletion_timestamp = None;
        objects.insert(key, created.clone());
        Ok(created)
    }

    /// Conditional update; `merge` builds the stored value from (stored, incoming)
    pub(crate) fn update(
        &self,
        obj: &K,
        merge: impl FnOnce(&K, &K) -> K,
    ) -> Result<K, StoreError> {
        let key = key_of(obj);
        let mut objects = self.lock();
        let stored = objects
            .get(&key)
            .ok_or_else(|| StoreError::NotFound(self.describe(&key)))?;

        let expected = obj.meta().resource_version.as_deref();
        if expected.is_some() && expected != stored.meta().resource_version.as_deref() {
            return Err(StoreError::Conflict(format!(
                "{} has been modified",
                self.describe(&key)
            )));
        }

        let mut updated = merge(stored, obj);
        let version = self.next_version();
        let meta = updated.meta_mut();
        meta.uid = stored.meta().uid.clone();
        meta.deletion_timestamp = stored.meta().deletion_timestamp.clone();
        meta.resource_version = Some(version);

        let releasable = meta.deletion_timestamp.is_some()
            && meta.finalizers.as_ref().is_none_or(|f| f.is_empty());
        if releasable {
            objects.remove(&key);
        } else {
            objects.insert(key, updated.clone());
        }
        Ok(updated)
    }

    /// Remove the object, or mark it deleting while finalizers remain
    pub(crate) fn delete(&self, namespace: &str, name: &str) -> Result<(), StoreError> {
        let key = (namespace.to_string(), name.to_string());
        let mut objects = self.lock();
        let Some(stored) = objects.get_mut(&key) else {
            return Err(StoreError::NotFound(self.describe(&key)));
        };
        let finalized = stored.meta().finalizers.as_ref().is_some_and(|f| !f.is_empty());
        if finalized {
            if stored.meta().deletion_timestamp.is_none() {
                let stamp = now()?;
                let version = self.next_version();
                let meta = stored.meta_mut();
                meta.deletion_timestamp = Some(stamp);
                meta.resource_version = Some(version);
            }
        } else {
            objects.remove(&key);
        }
        Ok(())
    }
}
