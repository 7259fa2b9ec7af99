//! API authentication via bearer tokens.
//!
//! Provides token generation, persistence, and middleware for resolving
//! `Authorization: Bearer <token>` headers to the calling user on protected
//! endpoints. Issuing and rotating tokens belongs to the external auth
//! provider; this module only validates what was provisioned.

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rand::Rng;

use crate::state::AppState;

/// Generate a random 32-character hex token.
pub fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    hex::encode(bytes)
}

/// Load token from file, or generate and save a new one.
pub fn load_or_generate_token(token_path: &std::path::Path) -> String {
    if let Ok(contents) = std::fs::read_to_string(token_path) {
        let token = contents.trim().to_string();
        if !token.is_empty() {
            tracing::info!("API token loaded from {}", token_path.display());
            return token;
        }
    }

    let token = generate_token();

    if let Some(parent) = token_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = std::fs::write(token_path, &token) {
        tracing::warn!(error = %e, "Failed to save API token to {}", token_path.display());
    } else {
        // Restrict token file to owner-only access.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = std::fs::set_permissions(token_path, std::fs::Permissions::from_mode(0o600));
        }
        tracing::info!("API token saved to {}", token_path.display());
    }

    token
}

/// Middleware that resolves bearer-token authentication.
///
/// Extracts the token from `Authorization: Bearer <token>`, looks it up in
/// the state's token registry, and injects the resolved `AuthUser` into the
/// request extensions. Returns 401 if missing or unknown.
pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let auth_header = req.headers().get("authorization");

    let Some(value) = auth_header else {
        return unauthorized("Missing Authorization header");
    };

    let Ok(value_str) = value.to_str() else {
        return unauthorized("Invalid Authorization header encoding");
    };

    let Some(token) = value_str.strip_prefix("Bearer ") else {
        return unauthorized("Expected a bearer token");
    };

    match state.resolve_token(token) {
        Some(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        None => unauthorized("Invalid bearer token"),
    }
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": "unauthorized",
            "message": message,
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_shape() {
        let token = generate_token();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generated_tokens_differ() {
        assert_ne!(generate_token(), generate_token());
    }
}
