use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::info;

use crate::error::AppError;

/// Cursor of one run through a group's ordered habit list.
///
/// Transient by design: not persisted across restarts. At most one run exists
/// per group; starting again resets it.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionStatus {
    pub group_id: String,
    pub current_habit_index: usize,
    pub completed_habits: Vec<String>,
    pub skipped_habits: Vec<String>,
    pub is_completed: bool,
}

impl ExecutionStatus {
    fn new(group_id: &str, habit_count: usize) -> Self {
        Self {
            group_id: group_id.to_owned(),
            current_habit_index: 0,
            completed_habits: Vec::new(),
            skipped_habits: Vec::new(),
            // A group with no habits has nothing to step through.
            is_completed: habit_count == 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Completed,
    Skipped,
}

/// Keyed store of per-group execution cursors.
///
/// All transitions go through one async mutex, so two concurrent
/// complete/skip calls against the same group cannot both read the same index
/// and double-advance it.
#[derive(Clone, Default)]
pub struct ExecutionTracker {
    inner: Arc<Mutex<HashMap<String, ExecutionStatus>>>,
}

impl ExecutionTracker {
    pub async fn start(&self, group_id: &str, habit_ids: &[String]) -> ExecutionStatus {
        let mut runs = self.inner.lock().await;
        let status = ExecutionStatus::new(group_id, habit_ids.len());
        runs.insert(group_id.to_owned(), status.clone());
        info!("execution started for group {} ({} habits)", group_id, habit_ids.len());
        status
    }

    /// Records the outcome for the current habit and advances the cursor.
    /// The index holds at the habit count once the run finishes.
    pub async fn advance(
        &self,
        group_id: &str,
        habit_ids: &[String],
        outcome: StepOutcome,
    ) -> Result<ExecutionStatus, AppError> {
        let mut runs = self.inner.lock().await;
        let status = runs.get_mut(group_id).ok_or(AppError::NoActiveExecution)?;
        if status.is_completed {
            return Err(AppError::AlreadyCompleted);
        }

        // Groups are append-only, so the index stays in bounds for the list
        // the run started with.
        let habit_id = habit_ids
            .get(status.current_habit_index)
            .ok_or(AppError::AlreadyCompleted)?
            .clone();

        match outcome {
            StepOutcome::Completed => status.completed_habits.push(habit_id),
            StepOutcome::Skipped => status.skipped_habits.push(habit_id),
        }
        status.current_habit_index += 1;
        if status.current_habit_index >= habit_ids.len() {
            status.is_completed = true;
            info!("execution completed for group {}", group_id);
        }

        Ok(status.clone())
    }

    /// Drops any run for the group. Called when the group is deleted.
    pub async fn clear(&self, group_id: &str) {
        self.inner.lock().await.remove(group_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[tokio::test]
    async fn walks_group_to_completion() {
        let tracker = ExecutionTracker::default();
        let habits = ids(&["a", "b"]);

        let status = tracker.start("g1", &habits).await;
        assert_eq!(status.current_habit_index, 0);
        assert!(!status.is_completed);

        let status = tracker.advance("g1", &habits, StepOutcome::Completed).await.unwrap();
        assert_eq!(status.completed_habits, vec!["a"]);
        assert_eq!(status.current_habit_index, 1);
        assert!(!status.is_completed);

        let status = tracker.advance("g1", &habits, StepOutcome::Completed).await.unwrap();
        assert_eq!(status.completed_habits, vec!["a", "b"]);
        assert_eq!(status.current_habit_index, 2);
        assert!(status.is_completed);
    }

    #[tokio::test]
    async fn skip_records_separately() {
        let tracker = ExecutionTracker::default();
        let habits = ids(&["a", "b"]);
        tracker.start("g1", &habits).await;

        let status = tracker.advance("g1", &habits, StepOutcome::Skipped).await.unwrap();
        assert_eq!(status.skipped_habits, vec!["a"]);
        assert!(status.completed_habits.is_empty());
    }

    #[tokio::test]
    async fn advance_without_start_fails() {
        let tracker = ExecutionTracker::default();
        let habits = ids(&["a"]);
        let err = tracker.advance("g1", &habits, StepOutcome::Completed).await.unwrap_err();
        assert!(matches!(err, AppError::NoActiveExecution));
    }

    #[tokio::test]
    async fn advance_after_completion_fails() {
        let tracker = ExecutionTracker::default();
        let habits = ids(&["a"]);
        tracker.start("g1", &habits).await;
        tracker.advance("g1", &habits, StepOutcome::Completed).await.unwrap();

        let err = tracker.advance("g1", &habits, StepOutcome::Completed).await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyCompleted));
    }

    #[tokio::test]
    async fn empty_group_completes_immediately() {
        let tracker = ExecutionTracker::default();
        let status = tracker.start("g1", &[]).await;
        assert!(status.is_completed);
        assert_eq!(status.current_habit_index, 0);
    }

    #[tokio::test]
    async fn restart_resets_the_run() {
        let tracker = ExecutionTracker::default();
        let habits = ids(&["a", "b"]);
        tracker.start("g1", &habits).await;
        tracker.advance("g1", &habits, StepOutcome::Completed).await.unwrap();

        let status = tracker.start("g1", &habits).await;
        assert_eq!(status.current_habit_index, 0);
        assert!(status.completed_habits.is_empty());
        assert!(!status.is_completed);
    }

    #[tokio::test]
    async fn concurrent_advances_never_double_count() {
        let tracker = ExecutionTracker::default();
        let habits: Vec<String> = (0..8).map(|i| format!("h{i}")).collect();
        tracker.start("g1", &habits).await;

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let tracker = tracker.clone();
            let habits = habits.clone();
            tasks.push(tokio::spawn(async move {
                tracker.advance("g1", &habits, StepOutcome::Completed).await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        // Eight habits, eight successful advances: had any pair raced past
        // each other, one of the eight would have failed above.
        let err = tracker.advance("g1", &habits, StepOutcome::Completed).await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyCompleted));
    }
}
