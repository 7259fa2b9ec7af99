//! Startup adapter selection and forwarding.
//!
//! The manager picks one adapter when constructed and keeps it for its whole
//! lifetime. Selection can never fail the caller: a remote backend that is
//! configured but cannot be initialized degrades to the injected on-device
//! fallback, with the failure logged rather than raised.

use tracing::{info, warn};

use querypad_core::config::RemoteConfig;
use querypad_core::{Query, Result, User, Visibility};

use crate::adapter::StorageAdapter;
use crate::local::LocalAdapter;
use crate::remote::RemoteAdapter;

/// Which backend a manager ended up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Remote,
    Local,
}

/// Selects a storage adapter once and forwards every operation to it.
///
/// Holds no query state of its own. Constructed explicitly with the remote
/// configuration and a fallback adapter; nothing here inspects ambient
/// environment state.
pub struct StorageManager {
    adapter: Box<dyn StorageAdapter>,
    kind: BackendKind,
}

impl StorageManager {
    /// Select the backing adapter.
    ///
    /// A fully configured `remote` section wins when the remote client can be
    /// built; otherwise the injected `fallback` is used and the construction
    /// failure is logged, never surfaced.
    pub fn select(remote: Option<&RemoteConfig>, fallback: LocalAdapter) -> Self {
        match remote {
            Some(config) if config.is_configured() => match RemoteAdapter::new(config) {
                Ok(adapter) => {
                    info!(url = %config.url, "Remote storage adapter selected");
                    Self {
                        adapter: Box::new(adapter),
                        kind: BackendKind::Remote,
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Remote adapter initialization failed, falling back to on-device store");
                    Self {
                        adapter: Box::new(fallback),
                        kind: BackendKind::Local,
                    }
                }
            },
            _ => {
                info!("On-device storage adapter selected");
                Self {
                    adapter: Box::new(fallback),
                    kind: BackendKind::Local,
                }
            }
        }
    }

    /// The backend this manager settled on at construction time.
    pub fn backend(&self) -> BackendKind {
        self.kind
    }

    pub async fn get_queries(&self, user_id: &str) -> Result<Vec<Query>> {
        self.adapter.get_queries(user_id).await
    }

    pub async fn save_query(&self, query: &Query) -> Result<()> {
        self.adapter.save_query(query).await
    }

    pub async fn update_query(&self, query: &Query) -> Result<()> {
        self.adapter.update_query(query).await
    }

    pub async fn delete_query(&self, id: i64, user_id: Option<&str>) -> Result<()> {
        self.adapter.delete_query(id, user_id).await
    }

    pub async fn get_all_queries(&self) -> Result<Vec<Query>> {
        self.adapter.get_all_queries().await
    }

    pub async fn list_public_queries(&self) -> Result<Vec<Query>> {
        self.adapter.list_public_queries().await
    }

    pub async fn list_user_queries(&self, user_id: &str) -> Result<Vec<Query>> {
        self.adapter.list_user_queries(user_id).await
    }

    pub async fn set_query_visibility(
        &self,
        query_id: i64,
        visibility: Visibility,
        user_id: &str,
    ) -> Result<()> {
        self.adapter
            .set_query_visibility(query_id, visibility, user_id)
            .await
    }

    pub async fn get_users(&self) -> Result<Vec<User>> {
        self.adapter.get_users().await
    }

    pub async fn delete_user(&self, id: &str) -> Result<()> {
        self.adapter.delete_user(id).await
    }

    pub async fn update_user(&self, user: &User) -> Result<()> {
        self.adapter.update_user(user).await
    }
}

impl std::fmt::Debug for StorageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageManager")
            .field("kind", &self.kind)
            .finish()
    }
}
