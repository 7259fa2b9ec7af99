//! On-device storage adapter.
//!
//! Holds each collection as a JSON document under a fixed key in the
//! key-value store, so every operation is a whole-collection round-trip:
//! read all, filter or mutate, write all. This is not transactional across
//! concurrent callers; the contract assumes one writer at a time per device.

use async_trait::async_trait;

use querypad_core::{Query, QuerypadError, Result, User, Visibility};

use crate::adapter::StorageAdapter;
use crate::kv::KvStore;

/// Fixed key holding the saved-query collection.
const QUERIES_KEY: &str = "sql_queries";
/// Fixed key holding the user collection.
const USERS_KEY: &str = "users";

/// Storage adapter backed by the on-device key-value store.
pub struct LocalAdapter {
    store: KvStore,
}

impl LocalAdapter {
    pub fn new(store: KvStore) -> Self {
        Self { store }
    }

    fn read_queries(&self) -> Result<Vec<Query>> {
        match self.store.get(QUERIES_KEY)? {
            Some(text) => Ok(serde_json::from_str(&text)?),
            None => Ok(Vec::new()),
        }
    }

    fn write_queries(&self, queries: &[Query]) -> Result<()> {
        self.store.set(QUERIES_KEY, &serde_json::to_string(queries)?)
    }

    fn read_users(&self) -> Result<Vec<User>> {
        match self.store.get(USERS_KEY)? {
            Some(text) => Ok(serde_json::from_str(&text)?),
            None => Ok(Vec::new()),
        }
    }

    fn write_users(&self, users: &[User]) -> Result<()> {
        self.store.set(USERS_KEY, &serde_json::to_string(users)?)
    }
}

#[async_trait]
impl StorageAdapter for LocalAdapter {
    async fn get_queries(&self, user_id: &str) -> Result<Vec<Query>> {
        Ok(self
            .read_queries()?
            .into_iter()
            .filter(|q| q.is_owned_by(user_id))
            .collect())
    }

    async fn save_query(&self, query: &Query) -> Result<()> {
        let mut queries = self.read_queries()?;
        if queries.iter().any(|q| q.id == query.id) {
            return Err(QuerypadError::Validation(format!(
                "query id {} already exists",
                query.id
            )));
        }
        // Most-recent-first ordering.
        queries.insert(0, query.clone());
        self.write_queries(&queries)
    }

    async fn update_query(&self, query: &Query) -> Result<()> {
        let mut queries = self.read_queries()?;
        if let Some(stored) = queries
            .iter_mut()
            .find(|q| q.id == query.id && q.user_id == query.user_id)
        {
            *stored = query.clone();
            self.write_queries(&queries)?;
        }
        Ok(())
    }

    async fn delete_query(&self, id: i64, user_id: Option<&str>) -> Result<()> {
        let mut queries = self.read_queries()?;
        match user_id {
            Some(owner) => queries.retain(|q| !(q.id == id && q.user_id == owner)),
            None => queries.retain(|q| q.id != id),
        }
        self.write_queries(&queries)
    }

    async fn get_all_queries(&self) -> Result<Vec<Query>> {
        self.read_queries()
    }

    async fn list_public_queries(&self) -> Result<Vec<Query>> {
        Ok(self
            .read_queries()?
            .into_iter()
            .filter(|q| q.visibility == Visibility::Public)
            .collect())
    }

    async fn list_user_queries(&self, user_id: &str) -> Result<Vec<Query>> {
        Ok(self
            .read_queries()?
            .into_iter()
            .filter(|q| q.is_owned_by(user_id))
            .collect())
    }

    async fn set_query_visibility(
        &self,
        query_id: i64,
        visibility: Visibility,
        user_id: &str,
    ) -> Result<()> {
        let mut queries = self.read_queries()?;
        if let Some(stored) = queries
            .iter_mut()
            .find(|q| q.id == query_id && q.user_id == user_id)
        {
            stored.visibility = visibility;
            self.write_queries(&queries)?;
        }
        // Owner mismatch or unknown id: no effect, no error.
        Ok(())
    }

    async fn get_users(&self) -> Result<Vec<User>> {
        self.read_users()
    }

    async fn delete_user(&self, id: &str) -> Result<()> {
        let mut users = self.read_users()?;
        users.retain(|u| u.id != id);
        self.write_users(&users)
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        let mut users = self.read_users()?;
        if let Some(stored) = users.iter_mut().find(|u| u.id == user.id) {
            *stored = user.clone();
            self.write_users(&users)?;
        }
        Ok(())
    }
}
