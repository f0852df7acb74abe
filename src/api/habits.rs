use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::auth::MaybeAuthUser;
use crate::db::repository;
use crate::error::AppError;
use crate::models::{GroupDetail, Habit, HabitGroup, NewGroupRequest, NewHabitRequest};
use crate::services::{ExecutionStatus, StepOutcome};
use crate::state::AppState;

use super::MessageResponse;

/// The standalone habit tracker ran without accounts, so these routes are
/// public by default. OPEN_HABIT_ROUTES=false turns the gate on.
fn check_access(state: &AppState, user: &MaybeAuthUser) -> Result<(), AppError> {
    if state.config.open_habit_routes || user.0.is_some() {
        Ok(())
    } else {
        Err(AppError::Unauthenticated)
    }
}

pub async fn list_groups(
    State(state): State<AppState>,
    user: MaybeAuthUser,
) -> Result<Json<Vec<GroupDetail>>, AppError> {
    check_access(&state, &user)?;

    let groups = repository::fetch_groups(&state.db).await?;
    let mut details = Vec::with_capacity(groups.len());
    for group in groups {
        let habits = repository::fetch_habits(&state.db, &group.id).await?;
        details.push(GroupDetail::new(group, habits));
    }
    Ok(Json(details))
}

pub async fn create_group(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Json(req): Json<NewGroupRequest>,
) -> Result<(StatusCode, Json<HabitGroup>), AppError> {
    check_access(&state, &user)?;
    if req.name.trim().is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }

    let group = repository::insert_group(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

pub async fn get_group(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path(id): Path<String>,
) -> Result<Json<GroupDetail>, AppError> {
    check_access(&state, &user)?;

    let group = repository::find_group(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    let habits = repository::fetch_habits(&state.db, &id).await?;
    Ok(Json(GroupDetail::new(group, habits)))
}

pub async fn delete_group(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    check_access(&state, &user)?;

    // Any in-flight run dies with the group.
    state.executions.clear(&id).await;
    if repository::delete_group(&state.db, &id).await? {
        Ok(MessageResponse::new("Group deleted"))
    } else {
        Err(AppError::NotFound)
    }
}

pub async fn add_habit(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path(id): Path<String>,
    Json(req): Json<NewHabitRequest>,
) -> Result<(StatusCode, Json<Habit>), AppError> {
    check_access(&state, &user)?;
    if req.name.trim().is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }
    if req.duration_minutes <= 0 {
        return Err(AppError::Validation(
            "Duration must be at least one minute".to_string(),
        ));
    }

    repository::find_group(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    let habit = repository::insert_habit(&state.db, &id, req).await?;
    Ok((StatusCode::CREATED, Json(habit)))
}

async fn habit_ids(state: &AppState, group_id: &str) -> Result<Vec<String>, AppError> {
    repository::find_group(&state.db, group_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let habits = repository::fetch_habits(&state.db, group_id).await?;
    Ok(habits.into_iter().map(|h| h.id).collect())
}

pub async fn start_execution(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path(id): Path<String>,
) -> Result<Json<ExecutionStatus>, AppError> {
    check_access(&state, &user)?;

    let ids = habit_ids(&state, &id).await?;
    Ok(Json(state.executions.start(&id, &ids).await))
}

pub async fn complete_current(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path(id): Path<String>,
) -> Result<Json<ExecutionStatus>, AppError> {
    check_access(&state, &user)?;

    let ids = habit_ids(&state, &id).await?;
    let status = state
        .executions
        .advance(&id, &ids, StepOutcome::Completed)
        .await?;
    Ok(Json(status))
}

pub async fn skip_current(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path(id): Path<String>,
) -> Result<Json<ExecutionStatus>, AppError> {
    check_access(&state, &user)?;

    let ids = habit_ids(&state, &id).await?;
    let status = state
        .executions
        .advance(&id, &ids, StepOutcome::Skipped)
        .await?;
    Ok(Json(status))
}
