// Core modules
pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod enrichment;
pub mod error;
pub mod types;
pub mod users;

// Re-export key types and functions
pub use api::{AppState, SharedState, create_router};
pub use config::AppConfig;
pub use db::{DatabaseConfig, create_connection, ensure_schema};
pub use error::ApiError;
pub use users::{UserRecord, UserStore};

use anyhow::Result;
use axum::Router;
use std::sync::Arc;

/// Convenience function to create a fully configured user API router.
///
/// Connects to the database, ensures the schema, and wires the store and
/// configuration into the HTTP surface.
pub async fn create_app(db_config: DatabaseConfig, config: AppConfig) -> Result<Router> {
    let db = create_connection(db_config).await?;
    ensure_schema(&db).await?;

    let store = UserStore::new(db);
    let state = Arc::new(AppState::new(store, config));

    Ok(create_router(state))
}
