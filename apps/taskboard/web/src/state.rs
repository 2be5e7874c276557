//! Application state management

use std::sync::Arc;

use database::postgres::DatabaseConnection;
use domain_tasks::TaskViews;

/// Shared application state.
///
/// Cloned into each router; every field is a cheap handle.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// PostgreSQL database connection pool
    pub db: DatabaseConnection,
    /// Compiled page templates
    pub views: Arc<TaskViews>,
}
