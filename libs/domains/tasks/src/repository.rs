use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{TaskError, TaskResult};
use crate::models::{
    CompletionStatus, CreateTask, SortDirection, SortField, Task, TaskFilter, TaskSort,
    UpdateTask,
};

/// Repository trait for Task persistence
///
/// Implementations must return tasks in ascending id order unless a sort is
/// requested, and must break sort ties by ascending id. An absent due date
/// orders before any present one, and titles compare bytewise, so "Banana"
/// sorts before "apple".
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// List tasks matching the filter, in the requested order
    async fn list(&self, filter: TaskFilter) -> TaskResult<Vec<Task>>;

    /// Get a task by ID
    async fn get_by_id(&self, id: i32) -> TaskResult<Option<Task>>;

    /// Persist a new task under a store-assigned id
    async fn create(&self, input: CreateTask) -> TaskResult<Task>;

    /// Replace every field of task `id`
    async fn replace(&self, id: i32, input: UpdateTask) -> TaskResult<Task>;

    /// Delete a task; `false` if it did not exist
    async fn delete(&self, id: i32) -> TaskResult<bool>;

    /// Flip the completion status; `false` if the task did not exist
    async fn toggle_status(&self, id: i32) -> TaskResult<bool>;

    /// Set the status to complete; `false` if the task did not exist
    async fn mark_complete(&self, id: i32) -> TaskResult<bool>;
}

/// Order two tasks by `sort`, falling back to ascending id
pub fn compare_tasks(a: &Task, b: &Task, sort: TaskSort) -> Ordering {
    let primary = match sort.field {
        SortField::Title => a.title.cmp(&b.title),
        SortField::Status => {
            bool::from(a.completion_status).cmp(&bool::from(b.completion_status))
        }
        SortField::DueDate => a.due_date.cmp(&b.due_date),
    };

    let primary = match sort.direction {
        SortDirection::Asc => primary,
        SortDirection::Desc => primary.reverse(),
    };

    primary.then_with(|| a.id.cmp(&b.id))
}

#[derive(Default)]
struct Store {
    tasks: BTreeMap<i32, Task>,
    last_id: i32,
}

/// In-memory implementation of TaskRepository (for development and tests)
#[derive(Clone, Default)]
pub struct InMemoryTaskRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store; later creates continue after the highest seeded id.
    pub fn with_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let tasks: BTreeMap<i32, Task> = tasks.into_iter().map(|t| (t.id, t)).collect();
        let last_id = tasks.keys().next_back().copied().unwrap_or_default();

        Self {
            store: Arc::new(RwLock::new(Store { tasks, last_id })),
        }
    }

    async fn set_status<F>(&self, id: i32, f: F) -> bool
    where
        F: FnOnce(CompletionStatus) -> CompletionStatus,
    {
        let mut store = self.store.write().await;
        match store.tasks.get_mut(&id) {
            Some(task) => {
                task.completion_status = f(task.completion_status);
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn list(&self, filter: TaskFilter) -> TaskResult<Vec<Task>> {
        let store = self.store.read().await;

        let mut tasks: Vec<Task> = store
            .tasks
            .values()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();

        if let Some(sort) = filter.sort {
            tasks.sort_by(|a, b| compare_tasks(a, b, sort));
        }

        Ok(tasks)
    }

    async fn get_by_id(&self, id: i32) -> TaskResult<Option<Task>> {
        let store = self.store.read().await;
        Ok(store.tasks.get(&id).cloned())
    }

    async fn create(&self, input: CreateTask) -> TaskResult<Task> {
        let mut store = self.store.write().await;

        store.last_id = store
            .last_id
            .checked_add(1)
            .ok_or_else(|| TaskError::Internal("Task id space exhausted".to_string()))?;

        let task = Task {
            id: store.last_id,
            title: input.title,
            description: input.description,
            completion_status: input.completion_status,
            due_date: input.due_date,
        };
        store.tasks.insert(task.id, task.clone());

        tracing::info!(task_id = task.id, "Created task");
        Ok(task)
    }

    async fn replace(&self, id: i32, input: UpdateTask) -> TaskResult<Task> {
        let mut store = self.store.write().await;
        let task = store.tasks.get_mut(&id).ok_or(TaskError::NotFound(id))?;

        task.replace_with(input);

        tracing::info!(task_id = id, "Updated task");
        Ok(task.clone())
    }

    async fn delete(&self, id: i32) -> TaskResult<bool> {
        let mut store = self.store.write().await;
        let removed = store.tasks.remove(&id).is_some();

        if removed {
            tracing::info!(task_id = id, "Deleted task");
        }
        Ok(removed)
    }

    async fn toggle_status(&self, id: i32) -> TaskResult<bool> {
        let toggled = self.set_status(id, CompletionStatus::toggled).await;
        if toggled {
            tracing::info!(task_id = id, "Toggled task status");
        }
        Ok(toggled)
    }

    async fn mark_complete(&self, id: i32) -> TaskResult<bool> {
        let updated = self
            .set_status(id, |_| CompletionStatus::Complete)
            .await;
        if updated {
            tracing::info!(task_id = id, "Marked task complete");
        }
        Ok(updated)
    }
}
