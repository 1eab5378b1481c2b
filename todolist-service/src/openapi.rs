use crate::api::{health, todolist};
use crate::state::AppState;
use axum::{routing::get, Json, Router};
use todolist_core::{NewTodoItem, TodoItem};
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

pub(crate) const HEALTH_TAG: &str = "Health API";
pub(crate) const TODOLIST_TAG: &str = "To-Do List API";

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        health::ready_check,
        todolist::get_todo_list,
        todolist::post_todo_item,
    ),
    components(schemas(TodoItem, NewTodoItem)),
    modifiers(&BearerSecurity),
    tags(
        (name = HEALTH_TAG, description = "Health check endpoints"),
        (name = TODOLIST_TAG, description = "Per-user to-do lists"),
    ),
    info(
        title = "To-Do List Service",
        description = "To-do lists protected by bearer tokens, with a trusted sub-system caller",
        version = "0.1.0"
    )
)]
pub(crate) struct ApiDoc;

/// Registers the bearer token scheme of the protected endpoints
struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

/// Handler for the OpenAPI JSON specification endpoint
async fn openapi_json_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Creates a router for OpenAPI documentation routes
pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json_handler))
}
