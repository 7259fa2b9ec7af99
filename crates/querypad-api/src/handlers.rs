//! Route handler functions for all API endpoints.
//!
//! Each handler extracts parameters via axum extractors, talks to the
//! storage manager in AppState, and returns JSON responses in the stored
//! row form (`QueryRow`).

use axum::extract::{Path, State};
use axum::{Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use querypad_core::{now_rfc3339, AuthUser, Query, QuerypadError, User, Visibility};
use querypad_storage::{BackendKind, QueryRow};

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Request / response types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct VisibilityUpdate {
    pub visibility: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VisibilityResponse {
    pub success: bool,
    pub visibility: Visibility,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ActionResponse {
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub backend: String,
    pub uptime_secs: u64,
}

// =============================================================================
// Helpers
// =============================================================================

fn require_admin(user: &AuthUser) -> Result<(), ApiError> {
    if user.is_admin {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "Administrator access required".to_string(),
        ))
    }
}

fn to_rows(queries: Vec<Query>) -> Result<Vec<QueryRow>, ApiError> {
    queries
        .iter()
        .map(|q| QueryRow::from_query(q).map_err(ApiError::from))
        .collect()
}

// =============================================================================
// Public handlers
// =============================================================================

/// GET /health - liveness, version, and selected backend.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let backend = match state.store.backend() {
        BackendKind::Remote => "remote",
        BackendKind::Local => "local",
    };
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: backend.to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET /queries/public - public queries across all owners, no auth required.
pub async fn public_queries(
    State(state): State<AppState>,
) -> Result<Json<Vec<QueryRow>>, ApiError> {
    let queries = state.store.list_public_queries().await?;
    Ok(Json(to_rows(queries)?))
}

// =============================================================================
// Owner-scoped handlers
// =============================================================================

/// GET /queries - the caller's queries, any visibility.
pub async fn list_queries(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<QueryRow>>, ApiError> {
    let queries = state.store.list_user_queries(&user.id).await?;
    Ok(Json(to_rows(queries)?))
}

/// POST /queries - save a new query for the caller.
///
/// The owning user id always comes from the session, never the body. An id
/// of 0 asks the server to assign one; visibility defaults to private.
pub async fn create_query(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(row): Json<QueryRow>,
) -> Result<Json<QueryRow>, ApiError> {
    let mut query = row
        .into_query()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    query.user_id = user.id.clone();
    if query.id == 0 {
        query.id = Utc::now().timestamp_millis();
    }
    if query.timestamp.is_empty() {
        query.timestamp = now_rfc3339();
    }
    if query.current_version == 0 {
        query.current_version = 1;
    }

    state.store.save_query(&query).await.map_err(|e| match e {
        QuerypadError::Validation(msg) => ApiError::Conflict(msg),
        other => other.into(),
    })?;

    Ok(Json(QueryRow::from_query(&query)?))
}

/// PUT /queries/{id} - replace one of the caller's queries.
///
/// A record that does not match both id and owner is left untouched; the
/// call still reports success, mirroring the adapter contract.
pub async fn update_query(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(row): Json<QueryRow>,
) -> Result<Json<ActionResponse>, ApiError> {
    let mut query = row
        .into_query()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    query.id = id;
    query.user_id = user.id.clone();

    state.store.update_query(&query).await?;
    Ok(Json(ActionResponse { success: true }))
}

/// DELETE /queries/{id} - owner-scoped delete.
pub async fn delete_query(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<ActionResponse>, ApiError> {
    state.store.delete_query(id, Some(&user.id)).await?;
    Ok(Json(ActionResponse { success: true }))
}

/// PATCH /queries/{id}/visibility - set a query's publication state.
///
/// Validates the value before any mutation, answers 404 when the query is
/// not the caller's, and treats setting the current value as a no-op
/// success.
pub async fn set_visibility(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(update): Json<VisibilityUpdate>,
) -> Result<Json<VisibilityResponse>, ApiError> {
    let Some(visibility) = Visibility::parse(&update.visibility) else {
        return Err(ApiError::BadRequest("Invalid visibility value".to_string()));
    };

    let owned = state.store.list_user_queries(&user.id).await?;
    let Some(current) = owned.iter().find(|q| q.id == id) else {
        return Err(ApiError::NotFound(
            "Query not found or access denied".to_string(),
        ));
    };

    if current.visibility != visibility {
        state
            .store
            .set_query_visibility(id, visibility, &user.id)
            .await?;
    }

    Ok(Json(VisibilityResponse {
        success: true,
        visibility,
    }))
}

// =============================================================================
// Admin handlers
// =============================================================================

/// GET /admin/queries - every stored query, unscoped.
pub async fn admin_queries(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<QueryRow>>, ApiError> {
    require_admin(&user)?;
    let queries = state.store.get_all_queries().await?;
    Ok(Json(to_rows(queries)?))
}

/// DELETE /admin/queries/{id} - privileged delete by id alone.
pub async fn admin_delete_query(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<ActionResponse>, ApiError> {
    require_admin(&user)?;
    state.store.delete_query(id, None).await?;
    Ok(Json(ActionResponse { success: true }))
}

/// GET /admin/users - all registered users.
pub async fn admin_users(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<User>>, ApiError> {
    require_admin(&user)?;
    Ok(Json(state.store.get_users().await?))
}

/// PUT /admin/users/{id} - replace a user record.
pub async fn admin_update_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(mut body): Json<User>,
) -> Result<Json<ActionResponse>, ApiError> {
    require_admin(&user)?;
    body.id = id;
    state.store.update_user(&body).await?;
    Ok(Json(ActionResponse { success: true }))
}

/// DELETE /admin/users/{id} - remove a user.
pub async fn admin_delete_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, ApiError> {
    require_admin(&user)?;
    state.store.delete_user(&id).await?;
    Ok(Json(ActionResponse { success: true }))
}
