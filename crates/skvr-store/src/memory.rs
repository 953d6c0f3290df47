use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::traits::KvStore;

/// In-memory, HashMap-based store.
///
/// Intended for tests and embedding. The whole map sits behind one `RwLock`,
/// which mirrors the engine contract closely enough for the dispatcher:
/// concurrent reads, serialized writes, atomic per-call updates. `flush` is
/// a no-op since nothing is persisted.
pub struct InMemoryStore {
    namespaces: RwLock<HashMap<String, BTreeMap<String, Vec<u8>>>>,
}

impl InMemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            namespaces: RwLock::new(HashMap::new()),
        }
    }

    /// Number of namespaces currently present.
    pub fn namespace_count(&self) -> usize {
        self.namespaces.read().expect("lock poisoned").len()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KvStore for InMemoryStore {
    fn list_namespaces(&self) -> StoreResult<Vec<String>> {
        let map = self.namespaces.read().expect("lock poisoned");
        Ok(map.keys().cloned().collect())
    }

    fn list_keys(&self, namespace: &str) -> StoreResult<Vec<String>> {
        let map = self.namespaces.read().expect("lock poisoned");
        let keys = map
            .get(namespace)
            .ok_or_else(|| StoreError::NamespaceNotFound(namespace.to_owned()))?;
        Ok(keys.keys().cloned().collect())
    }

    fn get(&self, namespace: &str, key: &str) -> StoreResult<Vec<u8>> {
        let map = self.namespaces.read().expect("lock poisoned");
        let keys = map
            .get(namespace)
            .ok_or_else(|| StoreError::NamespaceNotFound(namespace.to_owned()))?;
        keys.get(key)
            .cloned()
            .ok_or_else(|| StoreError::key_not_found(namespace, key))
    }

    fn put(&self, namespace: &str, key: Option<&str>, value: Option<&[u8]>) -> StoreResult<()> {
        let mut map = self.namespaces.write().expect("lock poisoned");
        let keys = map.entry(namespace.to_owned()).or_default();
        if let (Some(key), Some(value)) = (key, value) {
            keys.insert(key.to_owned(), value.to_vec());
        }
        Ok(())
    }

    fn delete(&self, namespace: &str, key: &str) -> StoreResult<()> {
        let mut map = self.namespaces.write().expect("lock poisoned");
        let keys = map
            .get_mut(namespace)
            .ok_or_else(|| StoreError::NamespaceNotFound(namespace.to_owned()))?;
        if keys.remove(key).is_none() {
            return Err(StoreError::key_not_found(namespace, key));
        }
        Ok(())
    }

    fn delete_namespace(&self, namespace: &str) -> StoreResult<()> {
        let mut map = self.namespaces.write().expect("lock poisoned");
        if map.remove(namespace).is_none() {
            return Err(StoreError::NamespaceNotFound(namespace.to_owned()));
        }
        Ok(())
    }

    fn exists(&self, namespace: &str, key: Option<&str>) -> StoreResult<bool> {
        let map = self.namespaces.read().expect("lock poisoned");
        Ok(match (map.get(namespace), key) {
            (Some(_), None) => true,
            (Some(keys), Some(key)) => keys.contains_key(key),
            (None, _) => false,
        })
    }

    fn flush(&self) -> StoreResult<()> {
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("namespace_count", &self.namespace_count())
            .finish()
    }
}
