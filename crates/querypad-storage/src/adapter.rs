//! The storage capability contract.
//!
//! Both backend variants implement this trait; `StorageManager` treats them
//! as interchangeable behind a trait object.

use async_trait::async_trait;

use querypad_core::{Query, Result, User, Visibility};

/// One backend's implementation of query and visibility storage.
///
/// Ownership scoping is part of the contract: mutations match on id AND
/// owner, and an owner mismatch on `update_query` or `set_query_visibility`
/// is a silent no-op rather than an error. Callers that must know whether a
/// write took effect re-read the record afterwards.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Queries owned by `user_id`, any visibility.
    async fn get_queries(&self, user_id: &str) -> Result<Vec<Query>>;

    /// Insert a new query. Refuses an id that is already stored instead of
    /// silently overwriting it.
    async fn save_query(&self, query: &Query) -> Result<()>;

    /// Replace a query matched by id AND owner. Does nothing when no record
    /// matches.
    async fn update_query(&self, query: &Query) -> Result<()>;

    /// Delete by id. With `user_id` present only a record owned by that user
    /// is removed. Without it this is the privileged form that deletes by id
    /// alone and must only be reached through trusted (admin) callers.
    async fn delete_query(&self, id: i64, user_id: Option<&str>) -> Result<()>;

    /// Every stored query regardless of owner. Admin-only by contract; the
    /// adapter itself does not gate this.
    async fn get_all_queries(&self) -> Result<Vec<Query>>;

    /// Public queries across all owners.
    async fn list_public_queries(&self) -> Result<Vec<Query>>;

    /// All queries of a single owner, regardless of visibility.
    async fn list_user_queries(&self, user_id: &str) -> Result<Vec<Query>>;

    /// Set a query's visibility, scoped to its owner.
    async fn set_query_visibility(
        &self,
        query_id: i64,
        visibility: Visibility,
        user_id: &str,
    ) -> Result<()>;

    /// All registered users. Admin-only by contract.
    async fn get_users(&self) -> Result<Vec<User>>;

    /// Remove a user by id. Admin-only by contract.
    async fn delete_user(&self, id: &str) -> Result<()>;

    /// Replace a user record matched by id. Admin-only by contract.
    async fn update_user(&self, user: &User) -> Result<()>;
}
