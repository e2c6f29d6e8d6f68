use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use vesper_core::AppError;

use crate::error::HttpAppError;
use crate::state::AppState;

/// Verifies the bearer token when one is presented and stores the caller in request
/// extensions. Requests without a token pass through anonymously; routes that need a caller
/// reject them through the [`crate::auth::CurrentUser`] extractor. A malformed or invalid
/// token is always a 401, even on public routes.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = match request.headers().get(AUTHORIZATION) {
        None => return next.run(request).await,
        Some(value) => value.to_str().ok(),
    };

    let token = match header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) if !token.trim().is_empty() => token.trim(),
        _ => {
            return HttpAppError(AppError::Unauthorized(
                "Invalid authorization header format".to_string(),
            ))
            .into_response();
        }
    };

    match state.jwt.authenticate(token) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => HttpAppError(e).into_response(),
    }
}
