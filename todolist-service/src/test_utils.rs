use crate::config::ServiceConfig;
use crate::create_app;
use crate::state::AppState;
use axum::body::Body;
use axum::Router;
use http::{header, Method, Request, StatusCode};
use http_body_util::BodyExt;
use jsonwebtoken::{encode, get_current_timestamp, EncodingKey, Header};
use log::LevelFilter;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use tower::ServiceExt;

pub(crate) const TEST_SECRET: &str = "todolist-test-secret";
pub(crate) const TRUSTED_CLIENT_ID: &str = "todolist-webapp";
pub(crate) const NATIVE_CLIENT_ID: &str = "native-client";

/// Signs the given claims with an HMAC secret
pub(crate) fn mint_token(secret: &str, claims: Value) -> String {
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("Failed to sign test token")
}

/// Test fixture running the complete application in-process.
///
/// Requests are dispatched with `tower::ServiceExt::oneshot`, tokens are
/// signed with the secret the fixture configured the service with.
///
/// ```rust
/// let fixture = TestFixture::new();
/// let token = fixture.user_token("alice");
/// fixture
///     .post_json("/api/todolist", &token, &json!({"Title": "Buy milk"}))
///     .await
///     .assert_status(StatusCode::NO_CONTENT);
/// ```
pub struct TestFixture {
    /// The application router
    pub app: Router,
    /// Configuration the application runs with
    pub config: ServiceConfig,
}

impl TestFixture {
    pub fn new() -> Self {
        // Initialize test logger
        let _ = env_logger::builder()
            .filter_level(LevelFilter::Debug)
            .is_test(true)
            .try_init();

        let config = ServiceConfig::for_test(TEST_SECRET, TRUSTED_CLIENT_ID);
        let state = AppState::new(&config).expect("Failed to create test state");
        let app = create_app(state);

        Self { app, config }
    }

    /// Signs a token for the service, adding audience and expiry when absent
    pub fn token(&self, claims: Value) -> String {
        let mut claims = claims;
        if let Value::Object(ref mut obj) = claims {
            if let Some(audience) = &self.config.auth.audience {
                obj.entry("aud").or_insert_with(|| json!(audience));
            }
            obj.entry("exp")
                .or_insert_with(|| json!(get_current_timestamp() + 600));
        }
        mint_token(TEST_SECRET, claims)
    }

    /// A user-delegated token as a native client would present it
    pub fn user_token(&self, oid: &str) -> String {
        self.token(json!({
            "appid": NATIVE_CLIENT_ID,
            "scp": "user_impersonation",
            "oid": oid,
            "sub": format!("sub-{oid}"),
        }))
    }

    /// An application token of the trusted caller, obtained with client credentials
    pub fn trusted_token(&self) -> String {
        self.token(json!({
            "appid": TRUSTED_CLIENT_ID,
            "roles": [],
        }))
    }

    fn request_builder(&self, method: Method, uri: &str, token: Option<&str>) -> http::request::Builder {
        let builder = Request::builder().method(method).uri(uri);
        match token {
            Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {token}")),
            None => builder,
        }
    }

    pub async fn get(&self, uri: &str, token: &str) -> TestResponse {
        let request = self
            .request_builder(Method::GET, uri, Some(token))
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(request).await
    }

    pub async fn get_anonymous(&self, uri: &str) -> TestResponse {
        let request = self
            .request_builder(Method::GET, uri, None)
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(request).await
    }

    pub async fn post_json<T: Serialize>(&self, uri: &str, token: &str, body: &T) -> TestResponse {
        let json_body = serde_json::to_vec(body).expect("Failed to serialize body to JSON");
        self.post_raw(uri, token, "application/json", json_body)
            .await
    }

    pub async fn post_form(&self, uri: &str, token: &str, body: &str) -> TestResponse {
        self.post_raw(
            uri,
            token,
            "application/x-www-form-urlencoded",
            body.to_string(),
        )
        .await
    }

    pub async fn post_raw(
        &self,
        uri: &str,
        token: &str,
        content_type: &str,
        body: impl Into<Body>,
    ) -> TestResponse {
        let request = self
            .request_builder(Method::POST, uri, Some(token))
            .header(header::CONTENT_TYPE, content_type)
            .body(body.into())
            .expect("Failed to build request");
        self.send(request).await
    }

    /// Sends a request and returns a TestResponse.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes();

        // Try to parse as JSON, defaulting to empty object if parsing fails or empty body
        let json = if !body.is_empty() {
            serde_json::from_slice(&body).unwrap_or_else(|_| json!({}))
        } else {
            json!({})
        };

        TestResponse { status, json }
    }
}

/// Response from a test request that provides convenient access to status and JSON body.
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response body as JSON (if present and valid JSON)
    pub json: Value,
}

impl TestResponse {
    /// Asserts that the response has the expected status code.
    ///
    /// # Panics
    ///
    /// Panics if the status code doesn't match the expected value.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {} but got {} with body: {}",
            expected,
            self.status,
            serde_json::to_string_pretty(&self.json).unwrap_or_default()
        );
        self
    }

    /// Asserts that the response status is OK (200).
    pub fn assert_ok(&self) -> &Self {
        self.assert_status(StatusCode::OK)
    }

    /// Converts the response body to the specified type.
    ///
    /// # Panics
    ///
    /// Panics if deserialization fails.
    pub fn json_as<T: DeserializeOwned>(&self) -> T {
        serde_json::from_value(self.json.clone()).expect("Failed to deserialize response JSON")
    }
}
