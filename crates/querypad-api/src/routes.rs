//! Router setup with all API routes and middleware.
//!
//! Configures the axum Router with CORS, tracing, compression, and all
//! endpoint handlers, splitting the public surface from the authenticated
//! one.

use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method};
use axum::routing::{delete, get, patch, put};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // Notebook frontends live on other origins, so CORS stays open; the
    // bearer token is what actually gates access.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    // Routes that do NOT require authentication.
    let public_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/queries/public", get(handlers::public_queries));

    // Everything else resolves the calling user first.
    let protected_routes = Router::new()
        .route(
            "/queries",
            get(handlers::list_queries).post(handlers::create_query),
        )
        .route(
            "/queries/{id}",
            put(handlers::update_query).delete(handlers::delete_query),
        )
        .route("/queries/{id}/visibility", patch(handlers::set_visibility))
        .route("/admin/queries", get(handlers::admin_queries))
        .route("/admin/queries/{id}", delete(handlers::admin_delete_query))
        .route("/admin/users", get(handlers::admin_users))
        .route(
            "/admin/users/{id}",
            put(handlers::admin_update_user).delete(handlers::admin_delete_user),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::auth::require_auth,
        ));

    public_routes
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(1024 * 1024)) // 1MB global limit
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
