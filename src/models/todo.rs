use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(rename_all = "kebab-case")]
pub enum TodoStatus {
    NotStarted,
    InProgress,
    Done,
}

impl Default for TodoStatus {
    fn default() -> Self {
        TodoStatus::NotStarted
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Todo {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub status: TodoStatus,
    /// Due date as `YYYY-MM-DD`.
    pub deadline: String,
    pub content: String,
    pub tags: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTodoRequest {
    pub title: String,
    pub status: Option<TodoStatus>,
    pub deadline: Option<String>,
    pub content: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Partial update. Absent fields are left unchanged; a supplied tag list
/// replaces the stored one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTodoRequest {
    pub title: Option<String>,
    pub status: Option<TodoStatus>,
    pub deadline: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Tags are a set: drops duplicates, keeps first-occurrence order.
pub fn dedupe_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tags.into_iter().filter(|t| seen.insert(t.clone())).collect()
}
