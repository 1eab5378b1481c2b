use std::sync::Arc;
use std::time::Duration;
use todolist_core::TodoItem;
use tokio::sync::RwLock;

/// How long a readiness probe waits for concurrent writers to finish
const READ_TIMEOUT: Duration = Duration::from_secs(1);

/// To-do items of all users.
///
/// The list lives in memory only and is lost when the service restarts. Items
/// are never updated or removed, and reads return them in no particular order.
#[derive(Clone, Default)]
pub struct TodoStore {
    items: Arc<RwLock<Vec<TodoItem>>>,
}

impl TodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, item: TodoItem) {
        self.items.write().await.push(item);
    }

    /// All items belonging to the given owner
    pub async fn for_owner(&self, owner: &str) -> Vec<TodoItem> {
        self.items
            .read()
            .await
            .iter()
            .filter(|item| item.owner == owner)
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    /// Whether the store can be read within a short time
    pub async fn is_available(&self) -> bool {
        tokio::time::timeout(READ_TIMEOUT, self.items.read())
            .await
            .is_ok()
    }
}
