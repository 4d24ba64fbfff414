//! HTTP surface for the user resource.

pub mod users;

use axum::{
    Router,
    http::StatusCode,
    response::Json,
    routing::get,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::cache::ImageCacheClient;
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::users::UserStore;

/// Shared, read-only application state. Per-request state (identity,
/// resolution, the enrichment race) is constructed inside the handlers.
pub struct AppState {
    pub store: UserStore,
    pub config: AppConfig,
    /// Cache invalidation client, when an image cache is configured.
    pub image_cache: Option<ImageCacheClient>,
}

impl AppState {
    /// Build application state from config and a connected store.
    pub fn new(store: UserStore, config: AppConfig) -> Self {
        let image_cache = config.image_cache.as_ref().and_then(|cache_config| {
            match ImageCacheClient::new(cache_config, &config.env_name) {
                Ok(client) => Some(client),
                Err(e) => {
                    warn!(error = %e, "Image cache client unavailable; delete cleanup disabled");
                    None
                }
            }
        });

        Self {
            store,
            config,
            image_cache,
        }
    }
}

pub type SharedState = Arc<AppState>;

pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // A collection-level request carries no target identifier; reject
        // it before any lookup happens.
        .route(
            "/v1/users",
            get(missing_user_id)
                .put(missing_user_id)
                .delete(missing_user_id),
        )
        .route(
            "/v1/users/{id}",
            get(users::get_user)
                .put(users::put_user)
                .delete(users::delete_user),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn health_check() -> Result<Json<Value>, StatusCode> {
    Ok(Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}

async fn missing_user_id() -> ApiError {
    ApiError::Validation("Please provide user ID.".to_string())
}
