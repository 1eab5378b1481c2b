use crate::errors::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use log::warn;

/// Validates the bearer token of the request and exposes its claims to the
/// handlers as a `Claims` extension
pub(super) async fn authentication_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = request.headers().get(http::header::AUTHORIZATION);
    let claims = match state.validator.validate_header(header) {
        Ok(claims) => claims,
        Err(e) => {
            warn!("Authentication failed: {}", e);
            return ApiError::from(e).into_response();
        }
    };

    request.extensions_mut().insert(claims);
    next.run(request).await
}
