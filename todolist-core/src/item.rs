use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An item of a user's to-do list
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct TodoItem {
    /// Free text title of the item
    #[serde(rename = "Title", alias = "title")]
    pub title: String,
    /// Identifier of the user owning the item
    #[serde(rename = "Owner", alias = "owner", default)]
    pub owner: String,
}

impl TodoItem {
    pub fn new<T: Into<String>, O: Into<String>>(title: T, owner: O) -> Self {
        Self {
            title: title.into(),
            owner: owner.into(),
        }
    }
}

/// An item as posted by a caller, before an owner has been assigned to it
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq, Default)]
pub struct NewTodoItem {
    /// Free text title of the item
    #[serde(rename = "Title", alias = "title", default)]
    pub title: String,
    /// Owner of the item, only honoured for trusted callers
    #[serde(
        rename = "Owner",
        alias = "owner",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub owner: Option<String>,
}

impl NewTodoItem {
    /// Whether the title holds anything but whitespace
    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }

    /// The posted owner, ignoring blank values
    pub fn requested_owner(&self) -> Option<&str> {
        self.owner
            .as_deref()
            .map(str::trim)
            .filter(|owner| !owner.is_empty())
    }

    /// Assigns the item to an owner
    pub fn into_item<O: Into<String>>(self, owner: O) -> TodoItem {
        TodoItem {
            title: self.title,
            owner: owner.into(),
        }
    }
}
