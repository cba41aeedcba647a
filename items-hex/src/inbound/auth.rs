//! Authentication middleware for bearer token validation.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use items_types::{AppError, ItemRepository};

use super::handlers::{ApiError, AppState};

/// Extracts the token from an `Authorization: Bearer <token>` header.
///
/// The scheme is matched case-insensitively; any other scheme yields `None`.
/// A header holding only the scheme yields an empty token.
fn extract_bearer_token(auth_header: Option<&str>) -> Option<&str> {
    let auth_header = auth_header?;
    let (scheme, token) = auth_header.split_once(' ').unwrap_or((auth_header, ""));
    if scheme.eq_ignore_ascii_case("bearer") {
        Some(token)
    } else {
        None
    }
}

/// Authentication middleware for the item routes.
///
/// This middleware:
/// 1. Extracts the bearer token from the Authorization header
/// 2. Resolves it to a `Principal` through the auth gate
/// 3. Inserts the principal into request extensions for the handler
/// 4. Returns 401 Unauthorized with a `WWW-Authenticate: Bearer` challenge otherwise
pub async fn auth_middleware<R: ItemRepository>(
    State(state): State<Arc<AppState<R>>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let token = match extract_bearer_token(auth_header) {
        Some(token) => token,
        None => {
            return ApiError(AppError::Unauthorized("Not authenticated".into())).into_response();
        }
    };

    match state.auth.authenticate(token) {
        Ok(principal) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!("bearer token rejected");
            ApiError(e).into_response()
        }
    }
}
