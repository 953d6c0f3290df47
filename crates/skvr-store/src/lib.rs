//! Store adapter for skvr: a two-level key-value store (namespace → key →
//! value) over an embedded transactional engine.
//!
//! The engine is treated as a capability: atomic per-call transactions,
//! snapshot reads, and one serialized writer process-wide. Everything above
//! this crate (resolution, verb dispatch, HTTP) talks only to the
//! [`KvStore`] trait and branches on [`StoreError`] kinds, never on error
//! message text.
//!
//! # Backends
//!
//! - [`RedbStore`] -- redb-backed, single data file under the storage
//!   directory, the production backend
//! - [`InMemoryStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Durability
//!
//! Write commits are atomic but not immediately fsynced. After each
//! successful put the backend asks the [`FlushCoordinator`] for a
//! best-effort durability flush; the request path never waits on it and a
//! failed flush is logged, never surfaced. A client may therefore observe a
//! success response before the data is crash-durable.

pub mod error;
pub mod flush;
pub mod memory;
pub mod redb_store;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{StoreError, StoreResult};
pub use flush::{FlushCoordinator, FlushHandle};
pub use memory::InMemoryStore;
pub use redb_store::RedbStore;
pub use traits::KvStore;
