use crate::errors::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use log::{debug, warn};

/// Validates the identity token the user signed in with and exposes its
/// claims to the handlers as a `Claims` extension
pub(super) async fn authentication_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = request.headers().get(http::header::AUTHORIZATION);
    let claims = match state.validator.validate_header(header) {
        Ok(claims) => claims,
        Err(e) => {
            warn!("Sign-in required: {}", e);
            return ApiError::from(e).into_response();
        }
    };
    debug!(
        "Request by '{}'",
        claims.name.as_deref().or(claims.subject()).unwrap_or("unknown")
    );

    request.extensions_mut().insert(claims);
    next.run(request).await
}
