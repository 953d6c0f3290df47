use crate::error::StoreResult;

/// Two-level key-value store: namespace → key → value.
///
/// Every method is one atomic transaction against the backing engine.
/// Implementations must satisfy these invariants:
/// - Keys are unique within their namespace; a put fully overwrites.
/// - A namespace with zero keys can exist; "exists with no keys" and
///   "does not exist" are distinguishable states.
/// - Deleting a namespace removes it and all contained keys atomically.
/// - Values are opaque bytes; the store never interprets them.
pub trait KvStore: Send + Sync {
    /// List all namespaces, in engine-defined order.
    fn list_namespaces(&self) -> StoreResult<Vec<String>>;

    /// List all keys in `namespace`, in engine-defined order.
    ///
    /// Fails with `NamespaceNotFound` if the namespace does not exist.
    fn list_keys(&self, namespace: &str) -> StoreResult<Vec<String>>;

    /// Read the value stored under `namespace`/`key`.
    ///
    /// Fails with `NamespaceNotFound` or `KeyNotFound`.
    fn get(&self, namespace: &str, key: &str) -> StoreResult<Vec<u8>>;

    /// Upsert `key` → `value` in `namespace`, creating the namespace first
    /// if it is absent (idempotent).
    ///
    /// When `key` and `value` are both `None` the call stops after namespace
    /// creation, writing no key. After a successful commit the backend
    /// schedules an asynchronous best-effort durability flush; the flush is
    /// never awaited here and its failure is never surfaced to the caller.
    fn put(&self, namespace: &str, key: Option<&str>, value: Option<&[u8]>) -> StoreResult<()>;

    /// Remove `key` from `namespace`.
    ///
    /// Fails with `NamespaceNotFound` or `KeyNotFound`.
    fn delete(&self, namespace: &str, key: &str) -> StoreResult<()>;

    /// Remove `namespace` and all its keys atomically.
    ///
    /// Fails with `NamespaceNotFound` if the namespace does not exist.
    fn delete_namespace(&self, namespace: &str) -> StoreResult<()>;

    /// Boolean existence probe. With `Some(key)` checks the key, with `None`
    /// checks only the namespace. Both missing-namespace and missing-key
    /// collapse to `false`.
    fn exists(&self, namespace: &str, key: Option<&str>) -> StoreResult<bool>;

    /// Synchronous durability barrier: persist all committed data to stable
    /// storage. Called by the flush coordinator, not by request paths.
    fn flush(&self) -> StoreResult<()>;
}
