//! HTTP API application wiring (Axum router + service wiring).
//!
//! This folder is structured like:
//! - `services.rs`: store wiring and the application workflows
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &ApiConfig) -> anyhow::Result<Router> {
    let services = match &config.database_url {
        Some(url) => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(5)
                .connect(url)
                .await?;
            let store = Arc::new(tradepost_store::PostgresStore::new(pool));
            store.ensure_schema().await?;
            AppServices::new(
                store.clone(),
                store.clone(),
                store,
                &config.jwt_secret,
                config.upload_dir.clone(),
            )
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using the in-memory store");
            let store = Arc::new(tradepost_store::InMemoryStore::new());
            AppServices::new(
                store.clone(),
                store.clone(),
                store,
                &config.jwt_secret,
                config.upload_dir.clone(),
            )
        }
    };

    Ok(build_router(Arc::new(services)))
}

/// Assemble the router around already-wired services. Tests call this
/// directly to get the production routing tree over an in-memory store.
pub fn build_router(services: Arc<AppServices>) -> Router {
    let auth_state = middleware::AuthState {
        jwt: services.jwt(),
    };

    let public = Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api/auth", routes::auth::router())
        .route("/api/products", get(routes::products::list_products))
        .route("/api/products/:id", get(routes::products::get_product));

    // Protected routes: bearer token required.
    let protected = routes::protected_router().route_layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .merge(public)
        .merge(protected)
        .nest_service("/uploads", ServeDir::new(services.upload_dir()))
        .layer(Extension(services))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
