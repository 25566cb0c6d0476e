use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::api::catalog::{catalog_for, columns_for, resolve_source};
use crate::ax_state::AppState;
use crate::core::catalog::ColumnSet;
use crate::core::render::{build_bound, render, Dialect};
use crate::infra::export::{export_filename, workbook_bytes, XLSX_MIME};
use crate::models::query::{Filter, OrderSpec, QuerySpec};
use crate::models::request::QueryRequest;
use crate::models::source::DataSource;

pub(crate) struct ExecutionOutcome {
    pub sql: String,
    pub executed_sql: String,
    pub rows: Vec<serde_json::Value>,
}

/// Render, bind and run one spec against its source. Shared by the
/// structured, free-text and export paths.
pub(crate) async fn execute_spec(
    state: &AppState,
    source: &DataSource,
    spec: &QuerySpec,
) -> Result<ExecutionOutcome, (StatusCode, String)> {
    let Some(dialect) = Dialect::from_db_type(&source.db_type) else {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("Unsupported db_type '{}'", source.db_type),
        ));
    };

    let sql = render(spec, &source.database, &state.config.numeric_text_columns);
    info!(%sql, object = %spec.object, "query generated");

    let bound = build_bound(spec, dialect, &state.config.numeric_text_columns);
    let rows = state
        .pool_manager
        .run_query(source, &bound)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Query execution failed: {e}"),
            )
        })?;

    Ok(ExecutionOutcome {
        sql,
        executed_sql: bound.sql,
        rows,
    })
}

/// Assemble a QuerySpec from discrete form selections. Strict where the
/// free-text path is lenient: unknown columns and empty values are errors
/// here, since they can only come from a broken client.
fn spec_from_request(
    req: &QueryRequest,
    object: String,
    columns: &ColumnSet,
    default_row_limit: u32,
) -> Result<QuerySpec, (StatusCode, String)> {
    let row_limit = req.row_limit.unwrap_or(default_row_limit);
    if row_limit < 1 {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "row_limit must be at least 1".to_string(),
        ));
    }

    let mut spec = QuerySpec::new(object, row_limit);

    if let Some(order) = &req.order {
        let Some(column) = columns.resolve(&order.column) else {
            return Err((
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Unknown order column '{}'", order.column),
            ));
        };
        spec.order = Some(OrderSpec {
            column: column.to_string(),
            direction: order.direction,
        });
    }

    for filter in &req.filters {
        if filter.value.trim().is_empty() {
            return Err((
                StatusCode::UNPROCESSABLE_ENTITY,
                "Filter value must not be empty".to_string(),
            ));
        }
        let Some(column) = columns.resolve(&filter.column) else {
            return Err((
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Unknown filter column '{}'", filter.column),
            ));
        };
        spec.filters.push(Filter {
            column: column.to_string(),
            value: filter.value.clone(),
        });
    }

    Ok(spec)
}

async fn prepare(
    state: &AppState,
    req: &QueryRequest,
) -> Result<(DataSource, QuerySpec), (StatusCode, String)> {
    let source = resolve_source(state, req.source_id.as_deref())?;
    let catalog = catalog_for(state, &source).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Catalog probe failed: {e}"),
        )
    })?;
    let Some(object) = catalog.find_object(&req.object).map(|o| o.name.clone()) else {
        return Err((
            StatusCode::NOT_FOUND,
            "Object not found in catalog".to_string(),
        ));
    };
    let columns = columns_for(state, &source, &catalog, &object)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Column probe failed: {e}"),
            )
        })?;
    let spec = spec_from_request(req, object, &columns, state.config.default_row_limit)?;
    Ok((source, spec))
}

/// Structured form path: the same QuerySpec pipeline as /api/chat, minus
/// the translator.
pub async fn run_query(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<QueryRequest>,
) -> impl IntoResponse {
    let (source, spec) = match prepare(&state, &payload).await {
        Ok(p) => p,
        Err(e) => return e.into_response(),
    };
    match execute_spec(&state, &source, &spec).await {
        Ok(outcome) => Json(json!({
            "status": "success",
            "data": outcome.rows,
            "meta": {
                "sql": outcome.sql,
                "executed_sql": outcome.executed_sql,
                "row_count": outcome.rows.len(),
                "spec": spec,
            }
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Same body as /api/query, but the result set comes back as a one-sheet
/// workbook download. An empty result is a normal terminal state with no
/// artifact to offer.
pub async fn export_query(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<QueryRequest>,
) -> impl IntoResponse {
    let (source, spec) = match prepare(&state, &payload).await {
        Ok(p) => p,
        Err(e) => return e.into_response(),
    };
    let outcome = match execute_spec(&state, &source, &spec).await {
        Ok(o) => o,
        Err(e) => return e.into_response(),
    };
    if outcome.rows.is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }

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
    let columns = match columns_for(&state, &source, &catalog, &spec.object).await {
        Ok(c) => c,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Column probe failed: {e}"),
            )
                .into_response()
        }
    };

    let bytes = match workbook_bytes(columns.names(), &outcome.rows) {
        Ok(b) => b,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Export failed: {e}"),
            )
                .into_response()
        }
    };
    let filename = export_filename(&spec.object, chrono::Local::now().naive_local());
    info!(%filename, rows = outcome.rows.len(), "result exported");

    Response::builder()
        .header(header::CONTENT_TYPE, XLSX_MIME)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .body(axum::body::Body::from(bytes))
        .unwrap()
}
