use crate::config::WebAppConfig;
use crate::create_app;
use crate::state::AppState;
use crate::token::TEMPORARILY_UNAVAILABLE;
use axum::body::Body;
use axum::Router;
use http::{header, Method, Request, StatusCode};
use http_body_util::BodyExt;
use jsonwebtoken::{encode, get_current_timestamp, EncodingKey, Header};
use log::LevelFilter;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub(crate) const TEST_SECRET: &str = "todolist-webapp-test-secret";
/// Application token handed out by the mocked identity provider
pub(crate) const APP_TOKEN: &str = "webapp-application-token";

/// Test fixture running the front-end in-process against a mocked identity
/// provider and a mocked To-Do List service.
///
/// ```rust
/// let fixture = TestFixture::new().await;
/// fixture.mock_app_token(1).await;
/// Mock::given(method("GET"))
///     .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
///     .mount(&fixture.list_api)
///     .await;
/// fixture.get("/todolist", &fixture.user_token("alice")).await.assert_ok();
/// ```
pub struct TestFixture {
    /// The application router
    pub app: Router,
    /// Configuration the application runs with
    pub config: WebAppConfig,
    /// Mocked OAuth token endpoint
    pub identity: MockServer,
    /// Mocked To-Do List service
    pub list_api: MockServer,
}

impl TestFixture {
    pub async fn new() -> Self {
        // Initialize test logger
        let _ = env_logger::builder()
            .filter_level(LevelFilter::Debug)
            .is_test(true)
            .try_init();

        let identity = MockServer::start().await;
        let list_api = MockServer::start().await;
        let config = WebAppConfig::for_test_with_mocks(&identity, &list_api, TEST_SECRET);
        let state = AppState::new(&config).expect("Failed to create test state");
        let app = create_app(state);

        Self {
            app,
            config,
            identity,
            list_api,
        }
    }

    /// Serves application tokens, expecting `times` token requests
    pub async fn mock_app_token(&self, times: u64) {
        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": APP_TOKEN,
                "token_type": "Bearer",
                "expires_in": 3600,
            })))
            .expect(times)
            .mount(&self.identity)
            .await;
    }

    /// Lets the token endpoint report itself unavailable, expecting `times` requests
    pub async fn mock_token_unavailable(&self, times: u64) {
        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": TEMPORARILY_UNAVAILABLE,
            })))
            .expect(times)
            .mount(&self.identity)
            .await;
    }

    /// Signs an identity token, adding audience and expiry when absent
    pub fn token(&self, claims: Value) -> String {
        let mut claims = claims;
        if let Value::Object(ref mut obj) = claims {
            if let Some(audience) = &self.config.auth.audience {
                obj.entry("aud").or_insert_with(|| json!(audience));
            }
            obj.entry("exp")
                .or_insert_with(|| json!(get_current_timestamp() + 600));
        }
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .expect("Failed to sign test token")
    }

    /// The identity token of a signed-in user
    pub fn user_token(&self, sub: &str) -> String {
        self.token(json!({
            "sub": sub,
            "name": format!("User {sub}"),
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

    pub async fn post_form(&self, uri: &str, token: &str, body: &str) -> TestResponse {
        let request = self
            .request_builder(Method::POST, uri, Some(token))
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
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
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
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

        TestResponse {
            status,
            json,
            location,
        }
    }
}

/// Response from a test request that provides convenient access to status and JSON body.
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response body as JSON (if present and valid JSON)
    pub json: Value,
    /// Target of a redirect
    pub location: Option<String>,
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
