//! Bearer-token authentication for admin routes.
//!
//! Every `/api/admin` route requires `Authorization: Bearer <token>` with
//! the token from `ADMIN_API_TOKEN`. Comparison is constant-time to avoid
//! leaking prefix matches.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use secrecy::ExposeSecret;

use crate::error::AppError;
use crate::state::AppState;

/// Middleware enforcing the admin bearer token.
///
/// # Errors
///
/// Returns `AppError::Unauthorized` for a missing, malformed, or wrong
/// token.
pub async fn require_bearer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let presented = header
        .strip_prefix("Bearer ")
        .ok_or(AppError::Unauthorized)?;

    let expected = state.config().api_token.expose_secret();
    if !constant_time_eq(presented.as_bytes(), expected.as_bytes()) {
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(request).await)
}

/// Compare two byte strings without short-circuiting on the first mismatch.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"token", b"token"));
        assert!(!constant_time_eq(b"token", b"Token"));
        assert!(!constant_time_eq(b"token", b"token2"));
        assert!(!constant_time_eq(b"", b"x"));
        assert!(constant_time_eq(b"", b""));
    }
}
