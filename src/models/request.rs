use serde::Deserialize;

use crate::models::query::Direction;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

/// Free-text path: the prompt is interpreted against the chosen object.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub source_id: Option<String>,
    pub object: String,
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct FilterInput {
    pub column: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct OrderInput {
    pub column: String,
    pub direction: Direction,
}

/// Structured form path: discrete selections assemble the same QuerySpec
/// the translator produces. Also the body of /api/export.
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub source_id: Option<String>,
    pub object: String,
    #[serde(default)]
    pub row_limit: Option<u32>,
    #[serde(default)]
    pub order: Option<OrderInput>,
    #[serde(default)]
    pub filters: Vec<FilterInput>,
}

#[derive(Debug, Deserialize)]
pub struct MetadataQuery {
    #[serde(default)]
    pub source_id: Option<String>,
    #[serde(default)]
    pub object: Option<String>,
}
