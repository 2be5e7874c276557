//! Taskboard - server-rendered task list on PostgreSQL

use axum_helpers::server::{close_postgres, create_production_app};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_tasks::TaskViews;
use migration::Migrator;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    let config = Config::from_env()?;

    init_tracing(&config.environment);

    info!("Connecting to PostgreSQL");

    let db = database::postgres::connect_from_config_with_retry(config.database.clone(), None)
        .await
        .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;

    if config.run_migrations {
        database::postgres::run_migrations::<Migrator>(&db, config.app.name).await?;
    }

    let views = Arc::new(TaskViews::new()?);

    let state = AppState { config, db, views };

    let app = api::app(&state);
    let db = state.db.clone();

    info!(
        "Starting {} v{} on {}",
        state.config.app.name,
        state.config.app.version,
        state.config.server.address()
    );

    create_production_app(
        app,
        &state.config.server,
        Duration::from_secs(30),
        async move { close_postgres(db, "main").await },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Taskboard shutdown complete");
    Ok(())
}
