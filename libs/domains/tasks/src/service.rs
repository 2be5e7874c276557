use std::sync::Arc;
use tracing::instrument;
use validator::Validate;

use crate::error::{TaskError, TaskResult};
use crate::models::{CreateTask, Task, TaskFilter, UpdateTask};
use crate::repository::TaskRepository;

/// Service layer for Task business logic
pub struct TaskService<R: TaskRepository> {
    repository: Arc<R>,
}

impl<R: TaskRepository> Clone for TaskService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// List tasks, filtered then ordered
    #[instrument(skip(self))]
    pub async fn list_tasks(&self, filter: TaskFilter) -> TaskResult<Vec<Task>> {
        self.repository.list(filter).await
    }

    /// Create a new task with validation
    #[instrument(skip(self, input), fields(task_title = %input.title))]
    pub async fn create_task(&self, input: CreateTask) -> TaskResult<Task> {
        input.validate()?;

        self.repository.create(input).await
    }

    /// Get a task by ID
    #[instrument(skip(self), fields(task_id = id))]
    pub async fn get_task(&self, id: i32) -> TaskResult<Task> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(TaskError::NotFound(id))
    }

    /// Replace a task. An `input.id` that differs from `id` is treated as a
    /// missing task.
    #[instrument(skip(self, input), fields(task_id = id))]
    pub async fn update_task(&self, id: i32, input: UpdateTask) -> TaskResult<Task> {
        if input.id != id {
            tracing::info!(submitted_id = input.id, "Task id mismatch");
            return Err(TaskError::NotFound(id));
        }

        input.validate()?;

        self.repository.replace(id, input).await
    }

    /// Delete a task
    #[instrument(skip(self), fields(task_id = id))]
    pub async fn delete_task(&self, id: i32) -> TaskResult<()> {
        let deleted = self.repository.delete(id).await?;

        if !deleted {
            return Err(TaskError::NotFound(id));
        }

        Ok(())
    }

    /// Flip a task between complete and incomplete
    #[instrument(skip(self), fields(task_id = id))]
    pub async fn toggle_status(&self, id: i32) -> TaskResult<()> {
        if !self.repository.toggle_status(id).await? {
            return Err(TaskError::NotFound(id));
        }

        Ok(())
    }

    /// Mark a task as completed
    #[instrument(skip(self), fields(task_id = id))]
    pub async fn complete_task(&self, id: i32) -> TaskResult<()> {
        if !self.repository.mark_complete(id).await? {
            return Err(TaskError::NotFound(id));
        }

        Ok(())
    }
}
