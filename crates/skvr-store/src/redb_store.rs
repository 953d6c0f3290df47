use std::path::Path;
use std::sync::OnceLock;

use redb::{
    Database, Durability, ReadTransaction, ReadOnlyTable, ReadableTable, TableDefinition,
    TableError, TableHandle, WriteTransaction,
};

use crate::error::{StoreError, StoreResult};
use crate::flush::FlushHandle;
use crate::traits::KvStore;

/// File name of the database inside the storage directory.
const DB_FILE: &str = "db";

/// Each namespace is one redb table keyed by name.
fn ns_table(name: &str) -> TableDefinition<'_, &'static str, &'static [u8]> {
    TableDefinition::new(name)
}

/// redb-backed store adapter.
///
/// One `Database` handle is shared for the process lifetime. redb gives us
/// the engine contract directly: snapshot reads that never block each other,
/// and a single serialized writer across all namespaces. Write commits use
/// `Durability::Eventual` so the request path never waits on fsync; the
/// attached [`FlushHandle`] turns committed data durable out of band.
pub struct RedbStore {
    db: Database,
    flush_hook: OnceLock<FlushHandle>,
}

impl RedbStore {
    /// Open (or create) the store under `dir`.
    ///
    /// The directory is created if missing; failure to create it or to open
    /// the database file is fatal to the caller.
    pub fn open(dir: &Path) -> StoreResult<Self> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(DB_FILE);
        let db = Database::create(&path).map_err(StoreError::engine)?;
        tracing::info!(path = %path.display(), "opened store");
        Ok(Self {
            db,
            flush_hook: OnceLock::new(),
        })
    }

    /// Attach the durability-flush handle. Before attachment (startup,
    /// tests) puts commit without requesting a flush.
    pub fn set_flush_handle(&self, handle: FlushHandle) {
        let _ = self.flush_hook.set(handle);
    }

    fn open_read_table(
        tx: &ReadTransaction,
        namespace: &str,
    ) -> StoreResult<Option<ReadOnlyTable<&'static str, &'static [u8]>>> {
        match tx.open_table(ns_table(namespace)) {
            Ok(table) => Ok(Some(table)),
            Err(TableError::TableDoesNotExist(_)) => Ok(None),
            Err(err) => Err(StoreError::engine(err)),
        }
    }

    fn table_exists(tx: &WriteTransaction, namespace: &str) -> StoreResult<bool> {
        let mut tables = tx.list_tables()?;
        Ok(tables.any(|handle| handle.name() == namespace))
    }
}

impl KvStore for RedbStore {
    fn list_namespaces(&self) -> StoreResult<Vec<String>> {
        let tx = self.db.begin_read()?;
        let names = tx
            .list_tables()?
            .map(|handle| handle.name().to_owned())
            .collect();
        Ok(names)
    }

    fn list_keys(&self, namespace: &str) -> StoreResult<Vec<String>> {
        let tx = self.db.begin_read()?;
        let table = Self::open_read_table(&tx, namespace)?
            .ok_or_else(|| StoreError::NamespaceNotFound(namespace.to_owned()))?;
        let mut keys = Vec::new();
        for entry in table.iter()? {
            let (key, _value) = entry?;
            keys.push(key.value().to_owned());
        }
        Ok(keys)
    }

    fn get(&self, namespace: &str, key: &str) -> StoreResult<Vec<u8>> {
        let tx = self.db.begin_read()?;
        let table = Self::open_read_table(&tx, namespace)?
            .ok_or_else(|| StoreError::NamespaceNotFound(namespace.to_owned()))?;
        match table.get(key)? {
            Some(guard) => Ok(guard.value().to_vec()),
            None => Err(StoreError::key_not_found(namespace, key)),
        }
    }

    fn put(&self, namespace: &str, key: Option<&str>, value: Option<&[u8]>) -> StoreResult<()> {
        let mut tx = self.db.begin_write()?;
        tx.set_durability(Durability::Eventual);
        let created = !Self::table_exists(&tx, namespace)?;
        {
            // Opening a table in a write transaction creates it if absent.
            let mut table = tx
                .open_table(ns_table(namespace))
                .map_err(StoreError::engine)?;
            if let (Some(key), Some(value)) = (key, value) {
                table.insert(key, value)?;
            }
        }
        tx.commit()?;
        if created {
            tracing::info!(namespace, "created namespace");
        }
        if let Some(hook) = self.flush_hook.get() {
            hook.request();
        }
        Ok(())
    }

    fn delete(&self, namespace: &str, key: &str) -> StoreResult<()> {
        let mut tx = self.db.begin_write()?;
        tx.set_durability(Durability::Eventual);
        if !Self::table_exists(&tx, namespace)? {
            return Err(StoreError::NamespaceNotFound(namespace.to_owned()));
        }
        let removed = {
            let mut table = tx
                .open_table(ns_table(namespace))
                .map_err(StoreError::engine)?;
            let was_present = table.remove(key)?.is_some();
            was_present
        };
        if !removed {
            return Err(StoreError::key_not_found(namespace, key));
        }
        tx.commit()?;
        Ok(())
    }

    fn delete_namespace(&self, namespace: &str) -> StoreResult<()> {
        let mut tx = self.db.begin_write()?;
        tx.set_durability(Durability::Eventual);
        let existed = tx
            .delete_table(ns_table(namespace))
            .map_err(StoreError::engine)?;
        if !existed {
            return Err(StoreError::NamespaceNotFound(namespace.to_owned()));
        }
        tx.commit()?;
        Ok(())
    }

    fn exists(&self, namespace: &str, key: Option<&str>) -> StoreResult<bool> {
        let tx = self.db.begin_read()?;
        let Some(table) = Self::open_read_table(&tx, namespace)? else {
            return Ok(false);
        };
        match key {
            None => Ok(true),
            Some(key) => Ok(table.get(key)?.is_some()),
        }
    }

    fn flush(&self) -> StoreResult<()> {
        // An empty transaction committed with Immediate durability persists
        // everything committed before it at Eventual durability.
        let mut tx = self.db.begin_write()?;
        tx.set_durability(Durability::Immediate);
        tx.commit()?;
        Ok(())
    }
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").finish_non_exhaustive()
    }
}
