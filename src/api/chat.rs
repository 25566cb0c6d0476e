use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

use crate::api::catalog::{catalog_for, columns_for, resolve_source};
use crate::api::query::execute_spec;
use crate::ax_state::AppState;
use crate::core::translator::translate;
use crate::models::request::ChatRequest;

/// Free-text path: interpret the prompt against the chosen object and run
/// the resulting bounded query. Tokens the translator could not resolve
/// come back in the metadata instead of being silently swallowed.
pub async fn chat_query(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatRequest>,
) -> impl IntoResponse {
    let prompt = payload.prompt.trim();

    let source = match resolve_source(&state, payload.source_id.as_deref()) {
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
    let Some(object) = catalog.find_object(&payload.object).map(|o| o.name.clone()) else {
        return (StatusCode::NOT_FOUND, "Object not found in catalog").into_response();
    };
    let columns = match columns_for(&state, &source, &catalog, &object).await {
        Ok(c) => c,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Column probe failed: {e}"),
            )
                .into_response()
        }
    };

    let translation = translate(prompt, &object, &columns, state.config.default_row_limit);

    match execute_spec(&state, &source, &translation.spec).await {
        Ok(outcome) => Json(json!({
            "status": "success",
            "data": outcome.rows,
            "columns": columns.names(),
            "meta": {
                "sql": outcome.sql,
                "executed_sql": outcome.executed_sql,
                "row_count": outcome.rows.len(),
                "ignored_terms": translation.ignored,
                "spec": translation.spec,
            }
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}
