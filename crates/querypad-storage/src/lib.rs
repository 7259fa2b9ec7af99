//! Querypad storage crate - the adapter capability contract, its on-device
//! and hosted-backend implementations, and startup selection.
//!
//! `StorageManager` picks exactly one `StorageAdapter` when constructed:
//! the remote variant when a hosted backend is configured and reachable
//! enough to build a client, the local variant otherwise. Selection never
//! fails the caller; it only degrades capability.

pub mod adapter;
pub mod kv;
pub mod local;
pub mod manager;
pub mod remote;
pub mod wire;

pub use adapter::StorageAdapter;
pub use kv::KvStore;
pub use local::LocalAdapter;
pub use manager::{BackendKind, StorageManager};
pub use remote::RemoteAdapter;
pub use wire::QueryRow;
