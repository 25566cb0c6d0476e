use serde::{Deserialize, Serialize};

/// A registered external database. `database` is the logical database name
/// used to qualify objects in the rendered statement; `db_type` selects the
/// pool backend ("postgres" or "mysql").
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DataSource {
    pub id: String,
    pub db_type: String,
    pub connection_url: String,
    pub database: String,
    pub display_name: String,
    /// Schema the catalog is scoped to. Defaults per backend when absent
    /// ("public" for Postgres, the connected database for MySQL).
    #[serde(default)]
    pub schema: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateDataSourceRequest {
    pub id: String,
    pub db_type: String,
    pub connection_url: String,
    pub database: String,
    pub display_name: String,
    #[serde(default)]
    pub schema: Option<String>,
}

impl From<CreateDataSourceRequest> for DataSource {
    fn from(req: CreateDataSourceRequest) -> Self {
        Self {
            id: req.id,
            db_type: req.db_type,
            connection_url: req.connection_url,
            database: req.database,
            display_name: req.display_name,
            schema: req.schema,
        }
    }
}
