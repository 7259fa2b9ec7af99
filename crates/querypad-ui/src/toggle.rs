//! Owner-gated visibility toggle control.
//!
//! Models the control's lifecycle explicitly:
//! - ReadOnly: the viewer is not the owner. A static label, no transitions.
//! - Idle: the owner sees the current value as an actionable control.
//! - Updating: a toggle is in flight; the control is disabled.
//!
//! Invoking the toggle tries the remote visibility endpoint first and falls
//! back to the storage manager. Both outcomes and the double failure are
//! reported as a typed `ToggleOutcome` rather than nested error suppression;
//! on double failure the displayed value reverts to what it was before the
//! attempt and the change callback never fires.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::json;

use querypad_core::config::RemoteConfig;
use querypad_core::{Query, QuerypadError, Result, Visibility};
use querypad_storage::StorageManager;

/// Rendering state of the toggle control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToggleState {
    /// Viewer is not the owner. Terminal for this render.
    ReadOnly,
    /// Owner view; the current visibility is actionable.
    Idle,
    /// A toggle is in flight; the control is disabled.
    Updating,
}

impl ToggleState {
    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &ToggleState) -> bool {
        matches!(
            (self, target),
            (ToggleState::Idle, ToggleState::Updating)
                | (ToggleState::Updating, ToggleState::Idle)
        )
    }
}

/// What a toggle invocation ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The remote endpoint accepted the change.
    RemoteApplied,
    /// The remote path failed; the storage manager accepted the change.
    FallbackApplied,
    /// Both paths failed. The control reverted to the pre-attempt value.
    Failed,
    /// The control was not interactive (read-only or already updating).
    Ignored,
}

/// The remote-first path for visibility changes.
#[async_trait]
pub trait VisibilityEndpoint: Send + Sync {
    async fn set_visibility(&self, query_id: i64, visibility: Visibility) -> Result<()>;
}

/// Production endpoint that PATCHes the hosted API's visibility route.
pub struct HttpVisibilityEndpoint {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpVisibilityEndpoint {
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
}

#[async_trait]
impl VisibilityEndpoint for HttpVisibilityEndpoint {
    async fn set_visibility(&self, query_id: i64, visibility: Visibility) -> Result<()> {
        let response = self
            .client
            .patch(format!("{}/queries/{}/visibility", self.base_url, query_id))
            .bearer_auth(&self.api_key)
            .json(&json!({ "visibility": visibility }))
            .send()
            .await
            .map_err(|e| QuerypadError::Remote(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(QuerypadError::Remote(format!(
                "Visibility update rejected: HTTP {}",
                status
            )))
        }
    }
}

/// Change-notification callback: (query id, new visibility).
pub type ChangeCallback = Box<dyn Fn(i64, Visibility) + Send + Sync>;

/// The owner-gated toggle for one query's visibility.
pub struct VisibilityToggle {
    query_id: i64,
    viewer_id: String,
    visibility: Visibility,
    state: ToggleState,
    on_change: ChangeCallback,
}

impl VisibilityToggle {
    /// Build the control for `query` as seen by `viewer_id`.
    ///
    /// Non-owners get a read-only control that renders a static label; no
    /// mutation is reachable from it. `on_change` fires only after a toggle
    /// attempt succeeds on at least one path.
    pub fn new(query: &Query, viewer_id: &str, on_change: ChangeCallback) -> Self {
        let state = if query.is_owned_by(viewer_id) {
            ToggleState::Idle
        } else {
            ToggleState::ReadOnly
        };
        Self {
            query_id: query.id,
            viewer_id: viewer_id.to_string(),
            visibility: query.visibility,
            state,
            on_change,
        }
    }

    pub fn state(&self) -> ToggleState {
        self.state
    }

    /// The visibility value the control currently displays.
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Whether invoking the toggle can do anything right now.
    pub fn is_interactive(&self) -> bool {
        self.state == ToggleState::Idle
    }

    /// Text the control renders in its current state.
    pub fn label(&self) -> &'static str {
        match self.state {
            ToggleState::Updating => "Updating...",
            _ => match self.visibility {
                Visibility::Public => "Public",
                Visibility::Private => "Private",
            },
        }
    }

    /// Flip the visibility: remote endpoint first, storage manager second.
    ///
    /// The displayed value is only committed once a path reports success; a
    /// double failure logs the errors, reverts to the pre-attempt value, and
    /// fires no notification.
    pub async fn toggle(
        &mut self,
        endpoint: &dyn VisibilityEndpoint,
        manager: &StorageManager,
    ) -> ToggleOutcome {
        if !self.is_interactive() {
            return ToggleOutcome::Ignored;
        }
        self.state = ToggleState::Updating;
        let target = self.visibility.toggled();

        let outcome = match endpoint.set_visibility(self.query_id, target).await {
            Ok(()) => ToggleOutcome::RemoteApplied,
            Err(remote_err) => {
                tracing::debug!(
                    error = %remote_err,
                    query_id = self.query_id,
                    "Remote visibility update failed, falling back to storage manager"
                );
                match manager
                    .set_query_visibility(self.query_id, target, &self.viewer_id)
                    .await
                {
                    Ok(()) => ToggleOutcome::FallbackApplied,
                    Err(fallback_err) => {
                        tracing::error!(
                            remote_error = %remote_err,
                            fallback_error = %fallback_err,
                            query_id = self.query_id,
                            "Failed to update visibility on both paths"
                        );
                        ToggleOutcome::Failed
                    }
                }
            }
        };

        self.state = ToggleState::Idle;
        if outcome != ToggleOutcome::Failed {
            self.visibility = target;
            (self.on_change)(self.query_id, target);
        }
        outcome
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use querypad_core::now_rfc3339;
    use querypad_storage::{KvStore, LocalAdapter, StorageManager};

    struct StubEndpoint {
        fail: bool,
    }

    #[async_trait]
    impl VisibilityEndpoint for StubEndpoint {
        async fn set_visibility(&self, _query_id: i64, _visibility: Visibility) -> Result<()> {
            if self.fail {
                Err(QuerypadError::Remote("endpoint unreachable".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn query(id: i64, user_id: &str, visibility: Visibility) -> Query {
        Query {
            id,
            name: "q".to_string(),
            sql: "SELECT 1".to_string(),
            description: "".to_string(),
            result: "".to_string(),
            result_image: None,
            date: "2025-06-01".to_string(),
            timestamp: now_rfc3339(),
            last_edited: None,
            versions: vec![],
            current_version: 1,
            tags: vec![],
            is_favorite: false,
            user_id: user_id.to_string(),
            visibility,
        }
    }

    fn local_manager() -> StorageManager {
        StorageManager::select(None, LocalAdapter::new(KvStore::in_memory().unwrap()))
    }

    /// A manager stuck on an unreachable remote backend, so every forwarded
    /// call fails.
    fn broken_manager() -> StorageManager {
        let remote = RemoteConfig {
            url: "http://127.0.0.1:1".to_string(),
            api_key: "k".to_string(),
        };
        StorageManager::select(
            Some(&remote),
            LocalAdapter::new(KvStore::in_memory().unwrap()),
        )
    }

    fn capture() -> (ChangeCallback, Arc<Mutex<Vec<(i64, Visibility)>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        let callback: ChangeCallback = Box::new(move |id, visibility| {
            sink.lock().unwrap().push((id, visibility));
        });
        (callback, calls)
    }

    #[test]
    fn test_state_transitions() {
        assert!(ToggleState::Idle.can_transition_to(&ToggleState::Updating));
        assert!(ToggleState::Updating.can_transition_to(&ToggleState::Idle));

        // ReadOnly is terminal.
        assert!(!ToggleState::ReadOnly.can_transition_to(&ToggleState::Idle));
        assert!(!ToggleState::ReadOnly.can_transition_to(&ToggleState::Updating));
        assert!(!ToggleState::Idle.can_transition_to(&ToggleState::ReadOnly));
    }

    #[test]
    fn test_non_owner_gets_read_only_control() {
        let (callback, _calls) = capture();
        let toggle = VisibilityToggle::new(
            &query(1, "u1", Visibility::Public),
            "u2",
            callback,
        );
        assert_eq!(toggle.state(), ToggleState::ReadOnly);
        assert!(!toggle.is_interactive());
        assert_eq!(toggle.label(), "Public");
    }

    #[tokio::test]
    async fn test_read_only_toggle_never_mutates() {
        let manager = local_manager();
        manager
            .save_query(&query(1, "u1", Visibility::Private))
            .await
            .unwrap();

        let (callback, calls) = capture();
        let mut toggle =
            VisibilityToggle::new(&query(1, "u1", Visibility::Private), "u2", callback);

        let outcome = toggle
            .toggle(&StubEndpoint { fail: false }, &manager)
            .await;
        assert_eq!(outcome, ToggleOutcome::Ignored);
        assert!(calls.lock().unwrap().is_empty());
        assert!(manager.list_public_queries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_owner_toggle_via_remote_notifies_once() {
        let manager = local_manager();
        let (callback, calls) = capture();
        let mut toggle =
            VisibilityToggle::new(&query(1, "u1", Visibility::Public), "u1", callback);

        let outcome = toggle
            .toggle(&StubEndpoint { fail: false }, &manager)
            .await;

        assert_eq!(outcome, ToggleOutcome::RemoteApplied);
        assert_eq!(toggle.visibility(), Visibility::Private);
        assert_eq!(toggle.label(), "Private");
        assert_eq!(toggle.state(), ToggleState::Idle);

        let calls = calls.lock().unwrap();
        assert_eq!(calls.as_slice(), &[(1, Visibility::Private)]);
    }

    #[tokio::test]
    async fn test_remote_failure_falls_back_to_manager() {
        let manager = local_manager();
        manager
            .save_query(&query(1, "u1", Visibility::Private))
            .await
            .unwrap();

        let (callback, calls) = capture();
        let mut toggle =
            VisibilityToggle::new(&query(1, "u1", Visibility::Private), "u1", callback);

        let outcome = toggle.toggle(&StubEndpoint { fail: true }, &manager).await;

        assert_eq!(outcome, ToggleOutcome::FallbackApplied);
        assert_eq!(toggle.visibility(), Visibility::Public);
        assert_eq!(calls.lock().unwrap().len(), 1);

        // The fallback write actually landed.
        let public = manager.list_public_queries().await.unwrap();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].id, 1);
    }

    #[tokio::test]
    async fn test_double_failure_reverts_and_stays_silent() {
        let manager = broken_manager();
        let (callback, calls) = capture();
        let mut toggle =
            VisibilityToggle::new(&query(1, "u1", Visibility::Public), "u1", callback);

        let outcome = toggle.toggle(&StubEndpoint { fail: true }, &manager).await;

        assert_eq!(outcome, ToggleOutcome::Failed);
        // Displayed value reverts to the pre-attempt visibility.
        assert_eq!(toggle.visibility(), Visibility::Public);
        assert_eq!(toggle.label(), "Public");
        assert_eq!(toggle.state(), ToggleState::Idle);
        assert!(calls.lock().unwrap().is_empty());

        // The control is usable again after the failure.
        assert!(toggle.is_interactive());
    }

    #[tokio::test]
    async fn test_toggle_flips_back_and_forth() {
        let manager = local_manager();
        let (callback, calls) = capture();
        let mut toggle =
            VisibilityToggle::new(&query(1, "u1", Visibility::Private), "u1", callback);

        toggle.toggle(&StubEndpoint { fail: false }, &manager).await;
        toggle.toggle(&StubEndpoint { fail: false }, &manager).await;

        assert_eq!(toggle.visibility(), Visibility::Private);
        let calls = calls.lock().unwrap();
        assert_eq!(
            calls.as_slice(),
            &[(1, Visibility::Public), (1, Visibility::Private)]
        );
    }
}
