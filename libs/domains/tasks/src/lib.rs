//! Tasks Domain
//!
//! Task items with create, read, update, delete, filter, sort and a
//! completion toggle, served as server-rendered HTML pages.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← Form parsing, views, redirects
//! └──────┬──────┘
//! ┌──────▼──────┐
//! │   Service   │  ← Validation, id checks
//! └──────┬──────┘
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + Postgres / in-memory)
//! └──────┬──────┘
//! ┌──────▼──────┐
//! │   Models    │  ← Entity, DTOs, enums
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use domain_tasks::{PgTaskRepository, TaskService, TaskViews, handlers};
//! use sea_orm::Database;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::connect("postgres://...").await?;
//!
//! let service = TaskService::new(PgTaskRepository::new(db));
//! let views = Arc::new(TaskViews::new()?);
//! let app = axum::Router::new().nest("/tasks", handlers::router(service, views));
//! # Ok(())
//! # }
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;
pub mod views;

pub use error::{TaskError, TaskResult};
pub use handlers::TasksApiDoc;
pub use models::{
    CompletionStatus, CreateTask, SortDirection, SortField, Task, TaskFilter, TaskForm, TaskQuery,
    TaskSort, UpdateTask,
};
pub use postgres::PgTaskRepository;
pub use repository::{InMemoryTaskRepository, TaskRepository};
pub use service::TaskService;
pub use views::TaskViews;
