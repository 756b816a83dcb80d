pub mod api;
pub mod config;
pub mod entities;
pub mod middleware;
pub mod pricing;
pub mod store;

#[cfg(test)]
mod test_utils;

use axum::Router;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::sync::Arc;
use tracing::info;

use crate::api::create_api_router;
use crate::config::AppConfig;
use crate::entities::{seed_admin, setup_schema};

/// Opens the pool. An in-memory SQLite database lives inside a single
/// connection, so the pool is pinned to one.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    if database_url.contains(":memory:") {
        options.max_connections(1).min_connections(1);
    }
    options.sqlx_logging(false);
    Database::connect(options).await
}

/// Creates the schema and the configured admin account.
pub async fn init(db: &DatabaseConnection, config: &AppConfig) -> Result<(), DbErr> {
    setup_schema(db).await?;
    info!("Database schema ready");

    if let Some(admin) = &config.admin {
        seed_admin(db, &admin.username, &admin.password).await?;
    }
    Ok(())
}

pub fn app(db: Arc<DatabaseConnection>, config: Arc<AppConfig>) -> Router {
    create_api_router(db, config)
}
