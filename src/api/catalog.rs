use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::info;

use crate::ax_state::AppState;
use crate::core::catalog::{ColumnSet, SchemaCatalog};
use crate::models::request::MetadataQuery;
use crate::models::source::{CreateDataSourceRequest, DataSource};

/// Register or replace a data source. Replacing drops the cached pool and
/// catalog, so the next request reconnects and re-probes.
pub async fn register_data_source(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateDataSourceRequest>,
) -> impl IntoResponse {
    let source: DataSource = payload.into();
    state.pool_manager.evict(&source.id);
    state.catalogs.remove(&source.id);
    info!(source_id = %source.id, "data source registered");
    state.sources.insert(source.id.clone(), source);
    (StatusCode::CREATED, "Source registered")
}

pub async fn list_data_sources(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let sources: Vec<DataSource> = state.sources.iter().map(|e| e.value().clone()).collect();
    Json(sources)
}

/// Base tables and views of the source, for the object picker.
pub async fn list_objects(
    State(state): State<Arc<AppState>>,
    Query(req): Query<MetadataQuery>,
) -> impl IntoResponse {
    let source = match resolve_source(&state, req.source_id.as_deref()) {
        Ok(s) => s,
        Err(e) => return e.into_response(),
    };
    match catalog_for(&state, &source).await {
        Ok(catalog) => Json(catalog.objects.clone()).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Catalog probe failed: {e}"),
        )
            .into_response(),
    }
}

/// Ordered column names of one object.
pub async fn list_columns(
    State(state): State<Arc<AppState>>,
    Query(req): Query<MetadataQuery>,
) -> impl IntoResponse {
    let Some(object) = req.object.as_deref() else {
        return (StatusCode::UNPROCESSABLE_ENTITY, "Missing 'object' parameter").into_response();
    };
    let source = match resolve_source(&state, req.source_id.as_deref()) {
        Ok(s) => s,
        Err(e) => return e.into_response(),
    };
    let catalog = match catalog_for(&state, &source).await {
        Ok(c) => c,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Catalog probe failed: {e}"),
            )
                .into_response()
        }
    };
    let Some(object) = catalog.find_object(object).map(|o| o.name.clone()) else {
        return (StatusCode::NOT_FOUND, "Object not found in catalog").into_response();
    };
    match columns_for(&state, &source, &catalog, &object).await {
        Ok(columns) => Json(columns.names().to_vec()).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Column probe failed: {e}"),
        )
            .into_response(),
    }
}

pub(crate) fn resolve_source(
    state: &AppState,
    source_id: Option<&str>,
) -> Result<DataSource, (StatusCode, String)> {
    let id = source_id.unwrap_or("default");
    state
        .sources
        .get(id)
        .map(|e| e.value().clone())
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                format!("Data source '{id}' is not registered"),
            )
        })
}

/// Catalog is fetched once per source and held until the source is
/// re-registered.
pub(crate) async fn catalog_for(
    state: &AppState,
    source: &DataSource,
) -> anyhow::Result<Arc<SchemaCatalog>> {
    if let Some(catalog) = state.catalogs.get(&source.id) {
        return Ok(catalog.value().clone());
    }
    let objects = state.pool_manager.list_objects(source).await?;
    info!(source_id = %source.id, count = objects.len(), "catalog loaded");
    let catalog = Arc::new(SchemaCatalog::new(objects));
    state.catalogs.insert(source.id.clone(), catalog.clone());
    Ok(catalog)
}

pub(crate) async fn columns_for(
    state: &AppState,
    source: &DataSource,
    catalog: &SchemaCatalog,
    object: &str,
) -> anyhow::Result<Arc<ColumnSet>> {
    if let Some(columns) = catalog.cached_columns(object) {
        return Ok(columns);
    }
    let names = state.pool_manager.list_columns(source, object).await?;
    let columns = Arc::new(ColumnSet::build(names)?);
    catalog.store_columns(object, columns.clone());
    Ok(columns)
}
