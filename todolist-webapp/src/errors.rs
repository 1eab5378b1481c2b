use axum::response::IntoResponse;
use axum::Json;
use http::header::WWW_AUTHENTICATE;
use http::{HeaderValue, StatusCode};
use serde_json::json;
use todolist_core::AuthError;

#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub detail: String,
    pub status_code: StatusCode,
}

impl ApiError {
    /// Create a new ApiError with a detail message and status code
    pub fn new<S: ToString>(detail: S, status_code: StatusCode) -> Self {
        Self {
            detail: detail.to_string(),
            status_code,
        }
    }

    /// Create new Unauthorized Error (401) with a detail message
    pub fn unauthorized<S: ToString>(detail: S) -> Self {
        Self::new(detail, StatusCode::UNAUTHORIZED)
    }

    /// Create new Bad Request Error (400) with a detail message
    pub fn bad_request<S: ToString>(detail: S) -> Self {
        Self::new(detail, StatusCode::BAD_REQUEST)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::unauthorized(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status_code = self.status_code;
        let body = json!({
            "detail": self.detail,
        });
        let mut response = (status_code, Json(body)).into_response();
        if status_code == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
