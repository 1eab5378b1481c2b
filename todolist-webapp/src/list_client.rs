use log::debug;
use reqwest::StatusCode;
use thiserror::Error;
use todolist_core::TodoItem;
use url::Url;

const TODOLIST_PATH: [&str; 2] = ["api", "todolist"];

#[derive(Debug, Error)]
pub enum ListApiError {
    #[error("Invalid To-Do List service address: {0}")]
    InvalidUrl(String),
    #[error("To-Do List service request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("To-Do List service returned status {0}")]
    Status(StatusCode),
    #[error("Invalid To-Do List service response: {0}")]
    InvalidResponse(String),
}

impl ListApiError {
    /// Whether the service rejected the application token
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ListApiError::Status(StatusCode::UNAUTHORIZED))
    }
}

/// HTTP client of the To-Do List service's `/api/todolist` resource
#[derive(Debug, Clone)]
pub struct ListApiClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl ListApiClient {
    pub fn new(client: reqwest::Client, base_url: &str) -> Result<Self, ListApiError> {
        let mut endpoint =
            Url::parse(base_url).map_err(|e| ListApiError::InvalidUrl(e.to_string()))?;
        endpoint
            .path_segments_mut()
            .map_err(|_| ListApiError::InvalidUrl(format!("{base_url} cannot be a base")))?
            .pop_if_empty()
            .extend(TODOLIST_PATH);
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Reads the items of `owner` as the trusted caller
    pub async fn get_items(&self, token: &str, owner: &str) -> Result<Vec<TodoItem>, ListApiError> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("ownerid", owner);
        debug!("Fetching To-Do List from {}", url);

        let response = self.client.get(url).bearer_auth(token).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ListApiError::Status(status));
        }
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ListApiError::InvalidResponse(e.to_string()))
    }

    /// Adds an item on behalf of `owner` as the trusted caller
    pub async fn add_item(&self, token: &str, title: &str, owner: &str) -> Result<(), ListApiError> {
        debug!("Adding To-Do item for '{}'", owner);
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(token)
            .form(&[("Title", title), ("Owner", owner)])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ListApiError::Status(status));
        }
        Ok(())
    }
}
