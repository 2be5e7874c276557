use sea_orm::DatabaseConnection;
use tracing::debug;

use crate::common::DatabaseError;

/// Readiness probe: round-trips a ping over the pool
pub async fn check_health(db: &DatabaseConnection) -> Result<(), DatabaseError> {
    debug!("Running PostgreSQL health check");

    db.ping().await.map_err(|e| {
        DatabaseError::HealthCheckFailed(format!("PostgreSQL health check failed: {}", e))
    })?;

    Ok(())
}
