use chrono::{SecondsFormat, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::models::todo::dedupe_tags;
use crate::models::{
    Habit, HabitGroup, NewGroupRequest, NewHabitRequest, NewTodoRequest, PasswordReset, Todo,
    UpdateTodoRequest, UpdateUserRequest, User,
};

/// Fixed-width timestamps so lexicographic order matches insertion order.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn today() -> String {
    Utc::now().date_naive().to_string()
}

// ---- users ----

pub async fn find_user(db: &SqlitePool, id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, email, password_hash, is_admin, created_at FROM users WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

/// True when either the id or the email is already registered.
pub async fn identity_taken(db: &SqlitePool, id: &str, email: &str) -> Result<bool, sqlx::Error> {
    let row = sqlx::query("SELECT id FROM users WHERE id = ? OR email = ?")
        .bind(id)
        .bind(email)
        .fetch_optional(db)
        .await?;
    Ok(row.is_some())
}

pub async fn insert_user(
    db: &SqlitePool,
    id: &str,
    email: &str,
    password_hash: &str,
) -> Result<User, sqlx::Error> {
    let now = now_rfc3339();

    sqlx::query(
        "INSERT INTO users (id, email, password_hash, is_admin, created_at) VALUES (?, ?, ?, 0, ?)",
    )
    .bind(id)
    .bind(email)
    .bind(password_hash)
    .bind(&now)
    .execute(db)
    .await?;

    Ok(User {
        id: id.to_owned(),
        email: email.to_owned(),
        password_hash: password_hash.to_owned(),
        is_admin: false,
        created_at: now,
    })
}

pub async fn fetch_users(db: &SqlitePool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, email, password_hash, is_admin, created_at FROM users ORDER BY created_at DESC",
    )
    .fetch_all(db)
    .await
}

pub async fn update_user(
    db: &SqlitePool,
    id: &str,
    req: UpdateUserRequest,
) -> Result<Option<User>, sqlx::Error> {
    let mut current = match find_user(db, id).await? {
        Some(user) => user,
        None => return Ok(None),
    };

    if let Some(email) = req.email {
        current.email = email;
    }
    if let Some(is_admin) = req.is_admin {
        current.is_admin = is_admin;
    }

    sqlx::query("UPDATE users SET email = ?, is_admin = ? WHERE id = ?")
        .bind(&current.email)
        .bind(current.is_admin)
        .bind(id)
        .execute(db)
        .await?;

    Ok(Some(current))
}

/// Email uniqueness check for admin edits; the user being edited is excluded.
pub async fn email_taken_by_other(
    db: &SqlitePool,
    id: &str,
    email: &str,
) -> Result<bool, sqlx::Error> {
    let row = sqlx::query("SELECT id FROM users WHERE email = ? AND id != ?")
        .bind(email)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(row.is_some())
}

/// Removes the user together with everything they own.
pub async fn delete_user(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let mut tx = db.begin().await?;

    sqlx::query("DELETE FROM todos WHERE user_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM password_resets WHERE user_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(result.rows_affected() > 0)
}

// ---- password resets ----

pub async fn insert_reset(
    db: &SqlitePool,
    user_id: &str,
    expires_at: &str,
) -> Result<String, sqlx::Error> {
    let token = Uuid::new_v4().to_string();

    sqlx::query("INSERT INTO password_resets (token, user_id, expires_at, used) VALUES (?, ?, ?, 0)")
        .bind(&token)
        .bind(user_id)
        .bind(expires_at)
        .execute(db)
        .await?;

    Ok(token)
}

pub async fn find_reset(db: &SqlitePool, token: &str) -> Result<Option<PasswordReset>, sqlx::Error> {
    sqlx::query_as::<_, PasswordReset>(
        "SELECT token, user_id, expires_at, used FROM password_resets WHERE token = ?",
    )
    .bind(token)
    .fetch_optional(db)
    .await
}

/// Replaces the stored hash and consumes the capability in one transaction.
pub async fn apply_password_reset(
    db: &SqlitePool,
    token: &str,
    user_id: &str,
    password_hash: &str,
) -> Result<(), sqlx::Error> {
    let mut tx = db.begin().await?;

    sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
        .bind(password_hash)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("UPDATE password_resets SET used = 1 WHERE token = ?")
        .bind(token)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

// ---- todos ----

#[derive(FromRow)]
struct TodoRow {
    id: String,
    user_id: String,
    title: String,
    status: crate::models::TodoStatus,
    deadline: String,
    content: String,
    tags: String,
    created_at: String,
    updated_at: String,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Todo {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            status: row.status,
            deadline: row.deadline,
            content: row.content,
            tags: serde_json::from_str(&row.tags).unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const TODO_COLUMNS: &str = "id, user_id, title, status, deadline, content, tags, created_at, updated_at";

pub async fn fetch_todos(db: &SqlitePool, owner: &str) -> Result<Vec<Todo>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TodoRow>(&format!(
        "SELECT {TODO_COLUMNS} FROM todos WHERE user_id = ? ORDER BY created_at DESC, rowid DESC",
    ))
    .bind(owner)
    .fetch_all(db)
    .await?;

    Ok(rows.into_iter().map(Todo::from).collect())
}

pub async fn insert_todo(
    db: &SqlitePool,
    owner: &str,
    req: NewTodoRequest,
) -> Result<Todo, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = now_rfc3339();
    let todo = Todo {
        id,
        user_id: owner.to_owned(),
        title: req.title,
        status: req.status.unwrap_or_default(),
        deadline: req.deadline.unwrap_or_else(today),
        content: req.content.unwrap_or_default(),
        tags: dedupe_tags(req.tags),
        created_at: now.clone(),
        updated_at: now,
    };
    let tags_json = serde_json::to_string(&todo.tags).unwrap_or_else(|_| "[]".to_string());

    sqlx::query(
        "INSERT INTO todos (id, user_id, title, status, deadline, content, tags, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&todo.id)
    .bind(&todo.user_id)
    .bind(&todo.title)
    .bind(todo.status)
    .bind(&todo.deadline)
    .bind(&todo.content)
    .bind(&tags_json)
    .bind(&todo.created_at)
    .bind(&todo.updated_at)
    .execute(db)
    .await?;

    Ok(todo)
}

/// Ownership-scoped lookup: a todo that exists but belongs to someone else is
/// indistinguishable from one that does not exist.
pub async fn find_todo(db: &SqlitePool, id: &str, owner: &str) -> Result<Option<Todo>, sqlx::Error> {
    let row = sqlx::query_as::<_, TodoRow>(&format!(
        "SELECT {TODO_COLUMNS} FROM todos WHERE id = ? AND user_id = ?",
    ))
    .bind(id)
    .bind(owner)
    .fetch_optional(db)
    .await?;

    Ok(row.map(Todo::from))
}

pub async fn update_todo(
    db: &SqlitePool,
    id: &str,
    owner: &str,
    req: UpdateTodoRequest,
) -> Result<Option<Todo>, sqlx::Error> {
    let mut current = match find_todo(db, id, owner).await? {
        Some(todo) => todo,
        None => return Ok(None),
    };

    if let Some(title) = req.title {
        current.title = title;
    }
    if let Some(status) = req.status {
        current.status = status;
    }
    if let Some(deadline) = req.deadline {
        current.deadline = deadline;
    }
    if let Some(content) = req.content {
        current.content = content;
    }
    if let Some(tags) = req.tags {
        current.tags = dedupe_tags(tags);
    }
    current.updated_at = now_rfc3339();
    let tags_json = serde_json::to_string(&current.tags).unwrap_or_else(|_| "[]".to_string());

    sqlx::query(
        "UPDATE todos
         SET title = ?, status = ?, deadline = ?, content = ?, tags = ?, updated_at = ?
         WHERE id = ? AND user_id = ?",
    )
    .bind(&current.title)
    .bind(current.status)
    .bind(&current.deadline)
    .bind(&current.content)
    .bind(&tags_json)
    .bind(&current.updated_at)
    .bind(id)
    .bind(owner)
    .execute(db)
    .await?;

    Ok(Some(current))
}

pub async fn delete_todo(db: &SqlitePool, id: &str, owner: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM todos WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(owner)
        .execute(db)
        .await?;

    Ok(result.rows_affected() > 0)
}

// ---- habit groups / habits ----

pub async fn fetch_groups(db: &SqlitePool) -> Result<Vec<HabitGroup>, sqlx::Error> {
    sqlx::query_as::<_, HabitGroup>(
        "SELECT id, name, created_at FROM habit_groups ORDER BY created_at DESC, rowid DESC",
    )
    .fetch_all(db)
    .await
}

pub async fn find_group(db: &SqlitePool, id: &str) -> Result<Option<HabitGroup>, sqlx::Error> {
    sqlx::query_as::<_, HabitGroup>("SELECT id, name, created_at FROM habit_groups WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn insert_group(db: &SqlitePool, req: NewGroupRequest) -> Result<HabitGroup, sqlx::Error> {
    let group = HabitGroup {
        id: Uuid::new_v4().to_string(),
        name: req.name,
        created_at: now_rfc3339(),
    };

    sqlx::query("INSERT INTO habit_groups (id, name, created_at) VALUES (?, ?, ?)")
        .bind(&group.id)
        .bind(&group.name)
        .bind(&group.created_at)
        .execute(db)
        .await?;

    Ok(group)
}

/// Removes the group and its habits.
pub async fn delete_group(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let mut tx = db.begin().await?;

    sqlx::query("DELETE FROM habits WHERE group_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let result = sqlx::query("DELETE FROM habit_groups WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(result.rows_affected() > 0)
}

pub async fn fetch_habits(db: &SqlitePool, group_id: &str) -> Result<Vec<Habit>, sqlx::Error> {
    sqlx::query_as::<_, Habit>(
        "SELECT id, group_id, name, duration_minutes, position, created_at
         FROM habits WHERE group_id = ? ORDER BY position ASC",
    )
    .bind(group_id)
    .fetch_all(db)
    .await
}

/// Appends the habit at the end of the group's order.
pub async fn insert_habit(
    db: &SqlitePool,
    group_id: &str,
    req: NewHabitRequest,
) -> Result<Habit, sqlx::Error> {
    let position: i64 =
        sqlx::query_scalar("SELECT COALESCE(MAX(position) + 1, 0) FROM habits WHERE group_id = ?")
            .bind(group_id)
            .fetch_one(db)
            .await?;

    let habit = Habit {
        id: Uuid::new_v4().to_string(),
        group_id: group_id.to_owned(),
        name: req.name,
        duration_minutes: req.duration_minutes,
        position,
        created_at: now_rfc3339(),
    };

    sqlx::query(
        "INSERT INTO habits (id, group_id, name, duration_minutes, position, created_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&habit.id)
    .bind(&habit.group_id)
    .bind(&habit.name)
    .bind(habit.duration_minutes)
    .bind(habit.position)
    .bind(&habit.created_at)
    .execute(db)
    .await?;

    Ok(habit)
}
