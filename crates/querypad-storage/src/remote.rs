//! Hosted-backend storage adapter.
//!
//! Every operation is an HTTP call to a Querypad API server; any single call
//! may fail (connectivity, auth, validation) and surfaces as
//! `QuerypadError::Remote` carrying the server's message. Field mapping
//! between the logical query and the stored row happens at this boundary
//! only, via `QueryRow`.

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde_json::json;

use querypad_core::config::RemoteConfig;
use querypad_core::{Query, QuerypadError, Result, User, Visibility};

use crate::adapter::StorageAdapter;
use crate::wire::QueryRow;

/// Storage adapter backed by the hosted Querypad API.
#[derive(Debug)]
pub struct RemoteAdapter {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RemoteAdapter {
    /// Build a client for the configured backend.
    ///
    /// Fails when the base URL does not parse or the HTTP client cannot be
    /// constructed; `StorageManager` recovers from this by falling back to
    /// the on-device store.
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let url = config.url.trim();
        Url::parse(url)
            .map_err(|e| QuerypadError::Remote(format!("Invalid base URL '{}': {}", url, e)))?;

        let client = Client::builder()
            .build()
            .map_err(|e| QuerypadError::Remote(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response> {
        let response = request
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| QuerypadError::Remote(format!("Request failed: {}", e)))?;
        Self::check(response).await
    }

    /// Turn a non-success status into an error carrying the server message.
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| {
                body.get("message")
                    .or_else(|| body.get("error"))
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| format!("HTTP {}", status));

        Err(QuerypadError::Remote(format!("{}: {}", status, message)))
    }

    async fn fetch_queries(&self, path: &str) -> Result<Vec<Query>> {
        let response = self.send(self.client.get(self.endpoint(path))).await?;
        let rows: Vec<QueryRow> = response
            .json()
            .await
            .map_err(|e| QuerypadError::Remote(format!("Malformed response body: {}", e)))?;
        rows.into_iter().map(QueryRow::into_query).collect()
    }
}

#[async_trait]
impl StorageAdapter for RemoteAdapter {
    /// The backend scopes listings to the authenticated caller, so the
    /// `user_id` argument is not sent over the wire.
    async fn get_queries(&self, _user_id: &str) -> Result<Vec<Query>> {
        self.fetch_queries("queries").await
    }

    async fn save_query(&self, query: &Query) -> Result<()> {
        let row = QueryRow::from_query(query)?;
        self.send(self.client.post(self.endpoint("queries")).json(&row))
            .await?;
        Ok(())
    }

    async fn update_query(&self, query: &Query) -> Result<()> {
        let row = QueryRow::from_query(query)?;
        self.send(
            self.client
                .put(self.endpoint(&format!("queries/{}", query.id)))
                .json(&row),
        )
        .await?;
        Ok(())
    }

    async fn delete_query(&self, id: i64, user_id: Option<&str>) -> Result<()> {
        // The owner-scoped form deletes through the caller's own route; the
        // privileged form goes through the admin route.
        let path = match user_id {
            Some(_) => format!("queries/{}", id),
            None => format!("admin/queries/{}", id),
        };
        self.send(self.client.delete(self.endpoint(&path))).await?;
        Ok(())
    }

    async fn get_all_queries(&self) -> Result<Vec<Query>> {
        self.fetch_queries("admin/queries").await
    }

    async fn list_public_queries(&self) -> Result<Vec<Query>> {
        self.fetch_queries("queries/public").await
    }

    async fn list_user_queries(&self, _user_id: &str) -> Result<Vec<Query>> {
        self.fetch_queries("queries").await
    }

    /// Unlike the local variant, an unauthorized attempt here surfaces the
    /// endpoint's explicit access-denied response as an error.
    async fn set_query_visibility(
        &self,
        query_id: i64,
        visibility: Visibility,
        _user_id: &str,
    ) -> Result<()> {
        self.send(
            self.client
                .patch(self.endpoint(&format!("queries/{}/visibility", query_id)))
                .json(&json!({ "visibility": visibility })),
        )
        .await?;
        Ok(())
    }

    async fn get_users(&self) -> Result<Vec<User>> {
        let response = self.send(self.client.get(self.endpoint("admin/users"))).await?;
        response
            .json()
            .await
            .map_err(|e| QuerypadError::Remote(format!("Malformed response body: {}", e)))
    }

    async fn delete_user(&self, id: &str) -> Result<()> {
        self.send(
            self.client
                .delete(self.endpoint(&format!("admin/users/{}", id))),
        )
        .await?;
        Ok(())
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        self.send(
            self.client
                .put(self.endpoint(&format!("admin/users/{}", user.id)))
                .json(user),
        )
        .await?;
        Ok(())
    }
}
