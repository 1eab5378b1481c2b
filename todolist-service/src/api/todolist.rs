use crate::errors::ApiError;
use crate::openapi::TODOLIST_TAG;
use crate::state::AppState;
use axum::{
    extract::{Form, FromRequest, Query, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    routing::get,
    Extension, Json, Router,
};
use log::{debug, info};
use serde::Deserialize;
use todolist_core::{Claims, NewTodoItem, TodoItem};
use utoipa::IntoParams;

pub(super) fn router() -> Router<AppState> {
    Router::new().route("/api/todolist", get(get_todo_list).post(post_todo_item))
}

/// Query parameters of the list endpoint
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct ListQuery {
    /// Owner whose list to return, only allowed for the trusted caller
    ownerid: Option<String>,
}

/// Returns the to-do list of the caller, or of `ownerid` for the trusted caller
#[utoipa::path(
    get,
    path = "/api/todolist",
    tag = TODOLIST_TAG,
    params(
        ListQuery,
        ("Authorization" = String, Header, description = "Bearer token"),
    ),
    responses(
        (status = 200, description = "Items of the owner", body = [TodoItem]),
        (status = 401, description = "Missing, invalid or insufficient token")
    )
)]
pub(crate) async fn get_todo_list(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<TodoItem>>, ApiError> {
    let actor = state.policy.actor(&claims)?;
    let owner = actor.owner_for_read(query.ownerid.as_deref())?;

    let items = state.store.for_owner(&owner).await;
    debug!("Returning {} items of owner '{}'", items.len(), owner);
    Ok(Json(items))
}

/// Adds an item to the caller's to-do list, or to the posted owner's list for
/// the trusted caller
#[utoipa::path(
    post,
    path = "/api/todolist",
    tag = TODOLIST_TAG,
    request_body(
        content = NewTodoItem,
        description = "Item to add, also accepted form-encoded"
    ),
    params(
        ("Authorization" = String, Header, description = "Bearer token"),
    ),
    responses(
        (status = 204, description = "Item accepted"),
        (status = 400, description = "Invalid item"),
        (status = 401, description = "Missing, invalid or insufficient token"),
        (status = 415, description = "Unsupported content type")
    )
)]
pub(crate) async fn post_todo_item(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    request: Request,
) -> Result<StatusCode, ApiError> {
    // The caller is classified before the body is read
    let actor = state.policy.actor(&claims)?;
    let NewItemPayload(item) = NewItemPayload::from_request(request, &state).await?;
    let owner = actor.owner_for_write(item.requested_owner())?;

    if !actor.is_trusted() && !item.has_title() {
        debug!("Ignoring item without a title for owner '{}'", owner);
        return Ok(StatusCode::NO_CONTENT);
    }

    if actor.is_trusted() {
        info!("Trusted caller added an item for owner '{}'", owner);
    }
    state.store.add(item.into_item(owner)).await;
    Ok(StatusCode::NO_CONTENT)
}

/// Posted item, accepted either as JSON or as a form-encoded body
pub(crate) struct NewItemPayload(NewTodoItem);

impl<S> FromRequest<S> for NewItemPayload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        if content_type.starts_with("application/json") {
            Json::<NewTodoItem>::from_request(req, state)
                .await
                .map(|Json(item)| NewItemPayload(item))
                .map_err(|e| ApiError::bad_request(format!("Invalid JSON in request body: {e}")))
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            Form::<NewTodoItem>::from_request(req, state)
                .await
                .map(|Form(item)| NewItemPayload(item))
                .map_err(|e| ApiError::bad_request(format!("Invalid form in request body: {e}")))
        } else {
            Err(ApiError::unsupported_media_type(
                "Expected a JSON or form-encoded request body",
            ))
        }
    }
}
