use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HabitGroup {
    pub id: String,
    pub name: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Habit {
    pub id: String,
    pub group_id: String,
    pub name: String,
    pub duration_minutes: i64,
    /// Index within the group's ordered habit list. Append-only.
    pub position: i64,
    pub created_at: String,
}

/// Group with its habits in position order, as the client consumes it.
#[derive(Debug, Clone, Serialize)]
pub struct GroupDetail {
    pub id: String,
    pub name: String,
    pub created_at: String,
    pub habits: Vec<Habit>,
}

impl GroupDetail {
    pub fn new(group: HabitGroup, habits: Vec<Habit>) -> Self {
        Self {
            id: group.id,
            name: group.name,
            created_at: group.created_at,
            habits,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewGroupRequest {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewHabitRequest {
    pub name: String,
    pub duration_minutes: i64,
}
