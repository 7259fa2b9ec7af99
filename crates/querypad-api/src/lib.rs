//! Querypad API crate - axum HTTP server for the hosted backend.
//!
//! Exposes the query, visibility, and admin endpoints over the storage
//! layer, with bearer-token authentication resolving the calling user.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
