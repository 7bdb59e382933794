//! Precinct administration binary: applies migrations and seeds the catalog.

#![forbid(unsafe_code)]

mod admin_config;
mod catalog;
mod seed;

use std::sync::Arc;

use precinct_application::AccessControlServices;
use precinct_core::{AppError, AppResult};
use precinct_infrastructure::{PostgresAccessControlStore, SystemClock};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::admin_config::{AdminCommand, AdminConfig, init_tracing};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AdminConfig::load()?;
    let pool = connect_pool(config.database_url.as_str(), config.max_connections).await?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    if config.command == AdminCommand::Migrate {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let services = AccessControlServices::new(
        Arc::new(PostgresAccessControlStore::new(pool)),
        Arc::new(SystemClock),
    );
    seed::run(&services, config.bootstrap_admin_user_id).await
}

async fn connect_pool(database_url: &str, max_connections: u32) -> AppResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))
}
