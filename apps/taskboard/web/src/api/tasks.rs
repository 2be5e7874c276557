//! Task page routes

use std::sync::Arc;

use axum::Router;
use domain_tasks::{PgTaskRepository, TaskService, handlers};

use crate::state::AppState;

/// Task pages backed by PostgreSQL
pub fn router(state: &AppState) -> Router {
    let repository = PgTaskRepository::new(state.db.clone());
    let service = TaskService::new(repository);
    handlers::router(service, Arc::clone(&state.views))
}
