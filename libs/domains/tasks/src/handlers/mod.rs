mod pages;

use axum::{
    Router,
    routing::{get, post},
};
use axum_helpers::ErrorResponse;
use axum_helpers::errors::responses::{
    ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::models::{CompletionStatus, CreateTask, Task, UpdateTask};
use crate::repository::TaskRepository;
use crate::service::TaskService;
use crate::views::TaskViews;

/// OpenAPI documentation for the task pages
#[derive(OpenApi)]
#[openapi(
    paths(
        pages::list_tasks,
        pages::create_form,
        pages::create_task,
        pages::task_details,
        pages::edit_form,
        pages::update_task,
        pages::delete_confirm,
        pages::delete_task,
        pages::toggle_status,
        pages::complete_task,
    ),
    components(
        schemas(Task, CreateTask, UpdateTask, CompletionStatus, ErrorResponse),
        responses(NotFoundResponse, ForbiddenResponse, InternalServerErrorResponse)
    ),
    tags(
        (name = "tasks", description = "Server-rendered task pages")
    )
)]
pub struct TasksApiDoc;

/// Shared handler state
pub struct TasksState<R: TaskRepository> {
    pub service: TaskService<R>,
    pub views: Arc<TaskViews>,
}

impl<R: TaskRepository> Clone for TasksState<R> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            views: Arc::clone(&self.views),
        }
    }
}

/// Router for the task pages; mount it at [`entity::Model::URL`](crate::entity::Model::URL).
pub fn router<R: TaskRepository + 'static>(service: TaskService<R>, views: Arc<TaskViews>) -> Router {
    let state = TasksState { service, views };

    Router::new()
        .route("/", get(pages::list_tasks).post(pages::create_task))
        .route("/create", get(pages::create_form))
        .route("/{id}", get(pages::task_details).post(pages::update_task))
        .route("/{id}/edit", get(pages::edit_form))
        .route(
            "/{id}/delete",
            get(pages::delete_confirm).post(pages::delete_task),
        )
        .route("/{id}/toggle", post(pages::toggle_status))
        .route("/{id}/complete", post(pages::complete_task))
        .with_state(state)
}
