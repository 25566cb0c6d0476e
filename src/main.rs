mod api;
mod core;
mod infra;
mod models;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use dashmap::DashMap;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::api::catalog::{list_columns, list_data_sources, list_objects, register_data_source};
use crate::api::chat::chat_query;
use crate::api::query::{export_query, run_query};
use crate::api::session::{login, require_session};
use crate::infra::config::AppConfig;
use crate::infra::db::PoolManager;

pub mod ax_state {
    use super::*;
    use crate::core::catalog::SchemaCatalog;
    use crate::models::source::DataSource;
    use chrono::{DateTime, Utc};
    use uuid::Uuid;

    pub struct AppState {
        pub config: AppConfig,
        pub sources: DashMap<String, DataSource>,
        pub pool_manager: PoolManager,
        pub catalogs: DashMap<String, Arc<SchemaCatalog>>,
        pub sessions: DashMap<Uuid, DateTime<Utc>>,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    let addr = config.bind_addr;

    let state = Arc::new(ax_state::AppState {
        pool_manager: PoolManager::new(config.connect_timeout),
        sources: DashMap::new(),
        catalogs: DashMap::new(),
        sessions: DashMap::new(),
        config,
    });

    if let Some(source) = &state.config.default_source {
        state.sources.insert(source.id.clone(), source.clone());
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // everything touching a database sits behind the gate
    let protected = Router::new()
        .route("/api/datasources", get(list_data_sources))
        .route("/api/datasource", post(register_data_source))
        .route("/api/objects", get(list_objects))
        .route("/api/columns", get(list_columns))
        .route("/api/chat", post(chat_query))
        .route("/api/query", post(run_query))
        .route("/api/export", post(export_query))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    let app = Router::new()
        .route("/api/login", post(login))
        .merge(protected)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    println!("🚀 NLQ Backend running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
