use crate::errors::ApiError;
use crate::list_client::ListApiError;
use crate::state::AppState;
use crate::token::TokenError;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Extension, Form, Json, Router,
};
use log::{error, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use todolist_core::{Claims, TodoItem};

const TODOLIST_PAGE: &str = "/todolist";

/// Placeholder item shown when the list could not be loaded
pub const NO_ITEMS: &str = "(No items in list)";
/// Message shown when the To-Do List service could not be reached
pub const UNEXPECTED_ERROR: &str = "UnexpectedError";

pub fn router() -> Router<AppState> {
    Router::new().route(TODOLIST_PAGE, get(todo_list).post(add_item))
}

/// The signed-in user's to-do list as rendered by the front-end
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TodoListView {
    pub items: Vec<TodoItem>,
    pub error_message: Option<String>,
}

impl TodoListView {
    fn unavailable() -> Self {
        Self {
            items: vec![TodoItem::new(NO_ITEMS, "")],
            error_message: Some(UNEXPECTED_ERROR.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddItemForm {
    #[serde(default)]
    item: String,
}

#[derive(Debug, Error)]
enum ListCallError {
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    ListApi(#[from] ListApiError),
}

/// The owner key of the signed-in user
fn signed_in_owner(claims: &Claims) -> Result<&str, ApiError> {
    claims
        .subject()
        .ok_or_else(|| ApiError::unauthorized("The identity token does not contain a subject claim"))
}

/// Logs a failed call and drops the application token if the service rejected it
async fn recover(state: &AppState, err: &ListCallError) -> TodoListView {
    error!("To-Do List service call failed: {}", err);
    if let ListCallError::ListApi(e) = err {
        if e.is_unauthorized() {
            info!("To-Do List service rejected the application token, clearing the token cache");
            state.tokens.invalidate().await;
        }
    }
    TodoListView::unavailable()
}

async fn fetch_items(state: &AppState, owner: &str) -> Result<Vec<TodoItem>, ListCallError> {
    let token = state.tokens.acquire_token().await?;
    Ok(state.list_api.get_items(&token, owner).await?)
}

async fn store_item(state: &AppState, title: &str, owner: &str) -> Result<(), ListCallError> {
    let token = state.tokens.acquire_token().await?;
    Ok(state.list_api.add_item(&token, title, owner).await?)
}

/// Shows the signed-in user's items
pub(crate) async fn todo_list(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<TodoListView>, ApiError> {
    let owner = signed_in_owner(&claims)?;
    let view = match fetch_items(&state, owner).await {
        Ok(items) => TodoListView {
            items,
            error_message: None,
        },
        Err(e) => recover(&state, &e).await,
    };
    Ok(Json(view))
}

/// Adds an item to the signed-in user's list and returns to the list
pub(crate) async fn add_item(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Form(form): Form<AddItemForm>,
) -> Result<Response, ApiError> {
    let owner = signed_in_owner(&claims)?;
    let title = form.item.trim();
    if title.is_empty() {
        return Err(ApiError::bad_request("The item field is required"));
    }

    match store_item(&state, title, owner).await {
        Ok(()) => Ok(Redirect::to(TODOLIST_PAGE).into_response()),
        Err(e) => Ok(Json(recover(&state, &e).await).into_response()),
    }
}
