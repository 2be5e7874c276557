use axum::{
    Extension, Form,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_helpers::errors::responses::{
    ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
};
use axum_helpers::{CsrfToken, IdPath};
use validator::ValidationErrors;

use super::TasksState;
use crate::entity;
use crate::error::{TaskError, TaskResult};
use crate::models::{TaskForm, TaskQuery};
use crate::repository::TaskRepository;

type Csrf = Option<Extension<CsrfToken>>;

fn token(csrf: &Csrf) -> &str {
    csrf.as_ref().map(|Extension(t)| t.as_str()).unwrap_or_default()
}

fn back_to_list() -> Response {
    Redirect::to(entity::Model::URL).into_response()
}

/// List tasks, optionally filtered by status and sorted by a column
#[utoipa::path(
    get,
    path = "",
    tag = "tasks",
    params(TaskQuery),
    responses(
        (status = 200, description = "Task list page", content_type = "text/html", body = String),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
pub async fn list_tasks<R: TaskRepository>(
    State(state): State<TasksState<R>>,
    query: Result<Query<TaskQuery>, QueryRejection>,
    csrf: Csrf,
) -> TaskResult<Html<String>> {
    // A malformed query string lists everything unfiltered
    let query = query.map(|Query(q)| q).unwrap_or_else(|rejection| {
        tracing::debug!(%rejection, "Ignoring malformed list query");
        TaskQuery::default()
    });
    let tasks = state.service.list_tasks(query.to_filter()).await?;
    Ok(Html(state.views.index(&tasks, &query, token(&csrf))?))
}

/// Empty create form
#[utoipa::path(
    get,
    path = "/create",
    tag = "tasks",
    responses(
        (status = 200, description = "Create form", content_type = "text/html", body = String)
    )
)]
pub async fn create_form<R: TaskRepository>(
    State(state): State<TasksState<R>>,
    csrf: Csrf,
) -> TaskResult<Html<String>> {
    Ok(Html(state.views.create(&TaskForm::default(), None, token(&csrf))?))
}

/// Create a task from the submitted form
#[utoipa::path(
    post,
    path = "",
    tag = "tasks",
    request_body(content = String, content_type = "application/x-www-form-urlencoded",
        description = "title, description, completion_status, due_date, csrf_token"),
    responses(
        (status = 303, description = "Created; redirect to the list"),
        (status = 200, description = "Form re-rendered with validation errors", content_type = "text/html", body = String),
        (status = 403, response = ForbiddenResponse)
    )
)]
pub async fn create_task<R: TaskRepository>(
    State(state): State<TasksState<R>>,
    csrf: Csrf,
    Form(form): Form<TaskForm>,
) -> TaskResult<Response> {
    let rerender = |errors: ValidationErrors| -> TaskResult<Response> {
        Ok(Html(state.views.create(&form, Some(&errors), token(&csrf))?).into_response())
    };

    let input = match form.to_create() {
        Ok(input) => input,
        Err(errors) => return rerender(errors),
    };

    match state.service.create_task(input).await {
        Ok(_) => Ok(back_to_list()),
        Err(TaskError::Validation(errors)) => rerender(errors),
        Err(e) => Err(e),
    }
}

/// Detail fragment for one task
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "tasks",
    params(("id" = i32, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task details fragment", content_type = "text/html", body = String),
        (status = 404, response = NotFoundResponse)
    )
)]
pub async fn task_details<R: TaskRepository>(
    State(state): State<TasksState<R>>,
    IdPath(id): IdPath,
) -> TaskResult<Html<String>> {
    let task = state.service.get_task(id).await?;
    Ok(Html(state.views.details(&task)?))
}

/// Edit form pre-filled with the stored task
#[utoipa::path(
    get,
    path = "/{id}/edit",
    tag = "tasks",
    params(("id" = i32, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Edit form", content_type = "text/html", body = String),
        (status = 404, response = NotFoundResponse)
    )
)]
pub async fn edit_form<R: TaskRepository>(
    State(state): State<TasksState<R>>,
    IdPath(id): IdPath,
    csrf: Csrf,
) -> TaskResult<Html<String>> {
    let task = state.service.get_task(id).await?;
    Ok(Html(state.views.edit(id, &TaskForm::from(&task), None, token(&csrf))?))
}

/// Replace a task with the submitted form
#[utoipa::path(
    post,
    path = "/{id}",
    tag = "tasks",
    params(("id" = i32, Path, description = "Task ID")),
    request_body(content = String, content_type = "application/x-www-form-urlencoded",
        description = "id, title, description, completion_status, due_date, csrf_token"),
    responses(
        (status = 303, description = "Updated; redirect to the list"),
        (status = 200, description = "Form re-rendered with validation errors", content_type = "text/html", body = String),
        (status = 404, response = NotFoundResponse)
    )
)]
pub async fn update_task<R: TaskRepository>(
    State(state): State<TasksState<R>>,
    IdPath(id): IdPath,
    csrf: Csrf,
    Form(form): Form<TaskForm>,
) -> TaskResult<Response> {
    if form.id() != Some(id) {
        return Err(TaskError::NotFound(id));
    }

    let rerender = |errors: ValidationErrors| -> TaskResult<Response> {
        Ok(Html(state.views.edit(id, &form, Some(&errors), token(&csrf))?).into_response())
    };

    let input = match form.to_update() {
        Ok(input) => input,
        Err(errors) => return rerender(errors),
    };

    match state.service.update_task(id, input).await {
        Ok(_) => Ok(back_to_list()),
        Err(TaskError::Validation(errors)) => rerender(errors),
        Err(e) => Err(e),
    }
}

/// Delete confirmation page
#[utoipa::path(
    get,
    path = "/{id}/delete",
    tag = "tasks",
    params(("id" = i32, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Delete confirmation", content_type = "text/html", body = String),
        (status = 404, response = NotFoundResponse)
    )
)]
pub async fn delete_confirm<R: TaskRepository>(
    State(state): State<TasksState<R>>,
    IdPath(id): IdPath,
    csrf: Csrf,
) -> TaskResult<Html<String>> {
    let task = state.service.get_task(id).await?;
    Ok(Html(state.views.delete(&task, token(&csrf))?))
}

/// Delete a task
#[utoipa::path(
    post,
    path = "/{id}/delete",
    tag = "tasks",
    params(("id" = i32, Path, description = "Task ID")),
    responses(
        (status = 303, description = "Deleted; redirect to the list"),
        (status = 404, response = NotFoundResponse)
    )
)]
pub async fn delete_task<R: TaskRepository>(
    State(state): State<TasksState<R>>,
    IdPath(id): IdPath,
) -> TaskResult<Response> {
    state.service.delete_task(id).await?;
    Ok(back_to_list())
}

/// Flip a task's completion status
#[utoipa::path(
    post,
    path = "/{id}/toggle",
    tag = "tasks",
    params(("id" = i32, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Status toggled"),
        (status = 404, response = NotFoundResponse)
    )
)]
pub async fn toggle_status<R: TaskRepository>(
    State(state): State<TasksState<R>>,
    IdPath(id): IdPath,
) -> TaskResult<StatusCode> {
    state.service.toggle_status(id).await?;
    Ok(StatusCode::OK)
}

/// Mark a task complete and return to the list
#[utoipa::path(
    post,
    path = "/{id}/complete",
    tag = "tasks",
    params(("id" = i32, Path, description = "Task ID")),
    responses(
        (status = 303, description = "Completed; redirect to the list"),
        (status = 404, response = NotFoundResponse)
    )
)]
pub async fn complete_task<R: TaskRepository>(
    State(state): State<TasksState<R>>,
    IdPath(id): IdPath,
) -> TaskResult<Response> {
    state.service.complete_task(id).await?;
    Ok(back_to_list())
}
