use dashmap::DashMap;
use sqlx::{mysql::MySqlPoolOptions, postgres::PgPoolOptions, MySql, Pool, Postgres, Row};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::core::catalog::{CatalogObject, ObjectKind};
use crate::core::render::{BindValue, BoundQuery};
use crate::infra::rows::{mysql_row_to_json, pg_row_to_json};
use crate::models::source::DataSource;

pub enum DynamicPool {
    Postgres(Pool<Postgres>),
    MySql(Pool<MySql>),
}

/// One lazily created pool per registered source, reused for the whole
/// session. Re-registering a source evicts its pool.
pub struct PoolManager {
    pools: DashMap<String, Arc<DynamicPool>>,
    connect_timeout: Duration,
}

impl PoolManager {
    pub fn new(connect_timeout: Duration) -> Self {
        Self {
            pools: DashMap::new(),
            connect_timeout,
        }
    }

    pub async fn get_or_create_pool(&self, source: &DataSource) -> anyhow::Result<Arc<DynamicPool>> {
        if let Some(pool) = self.pools.get(&source.id) {
            return Ok(pool.clone());
        }
        let new_pool = match source.db_type.to_lowercase().as_str() {
            "postgres" | "postgresql" => {
                let pool = PgPoolOptions::new()
                    .max_connections(5)
                    .acquire_timeout(self.connect_timeout)
                    .connect(&source.connection_url)
                    .await?;
                Arc::new(DynamicPool::Postgres(pool))
            }
            "mysql" => {
                let pool = MySqlPoolOptions::new()
                    .max_connections(5)
                    .acquire_timeout(self.connect_timeout)
                    .connect(&source.connection_url)
                    .await?;
                Arc::new(DynamicPool::MySql(pool))
            }
            other => return Err(anyhow::anyhow!("Unsupported DB type: {other}")),
        };
        info!(source_id = %source.id, db_type = %source.db_type, "pool created");
        self.pools.insert(source.id.clone(), new_pool.clone());
        Ok(new_pool)
    }

    pub fn evict(&self, source_id: &str) {
        self.pools.remove(source_id);
    }

    /// Base tables and views of the source's schema, sorted by name.
    pub async fn list_objects(&self, source: &DataSource) -> anyhow::Result<Vec<CatalogObject>> {
        let pool = self.get_or_create_pool(source).await?;
        let mut objects = match &*pool {
            DynamicPool::Postgres(p) => {
                let schema = source.schema.as_deref().unwrap_or("public");
                let mut found = Vec::new();
                let tables = sqlx::query(
                    "SELECT table_name FROM information_schema.tables WHERE table_type = 'BASE TABLE' AND table_schema = $1",
                )
                .bind(schema)
                .fetch_all(p)
                .await?;
                found.extend(tables.into_iter().filter_map(|r| {
                    r.try_get::<String, _>(0).ok().map(|name| CatalogObject {
                        name,
                        kind: ObjectKind::Table,
                    })
                }));
                let views = sqlx::query(
                    "SELECT table_name FROM information_schema.views WHERE table_schema = $1",
                )
                .bind(schema)
                .fetch_all(p)
                .await?;
                found.extend(views.into_iter().filter_map(|r| {
                    r.try_get::<String, _>(0).ok().map(|name| CatalogObject {
                        name,
                        kind: ObjectKind::View,
                    })
                }));
                found
            }
            DynamicPool::MySql(p) => {
                let schema = source.schema.clone().unwrap_or_default();
                let (tables_sql, views_sql) = if schema.is_empty() {
                    (
                        "SELECT table_name FROM information_schema.tables WHERE table_type = 'BASE TABLE' AND table_schema = DATABASE()",
                        "SELECT table_name FROM information_schema.views WHERE table_schema = DATABASE()",
                    )
                } else {
                    (
                        "SELECT table_name FROM information_schema.tables WHERE table_type = 'BASE TABLE' AND table_schema = ?",
                        "SELECT table_name FROM information_schema.views WHERE table_schema = ?",
                    )
                };
                let mut found = Vec::new();
                let mut tables_query = sqlx::query(tables_sql);
                let mut views_query = sqlx::query(views_sql);
                if !schema.is_empty() {
                    tables_query = tables_query.bind(schema.clone());
                    views_query = views_query.bind(schema);
                }
                found.extend(tables_query.fetch_all(p).await?.into_iter().filter_map(|r| {
                    r.try_get::<String, _>(0).ok().map(|name| CatalogObject {
                        name,
                        kind: ObjectKind::Table,
                    })
                }));
                found.extend(views_query.fetch_all(p).await?.into_iter().filter_map(|r| {
                    r.try_get::<String, _>(0).ok().map(|name| CatalogObject {
                        name,
                        kind: ObjectKind::View,
                    })
                }));
                found
            }
        };
        objects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(objects)
    }

    /// Column names of one object, in ordinal order.
    pub async fn list_columns(&self, source: &DataSource, object: &str) -> anyhow::Result<Vec<String>> {
        let pool = self.get_or_create_pool(source).await?;
        match &*pool {
            DynamicPool::Postgres(p) => {
                let schema = source.schema.as_deref().unwrap_or("public");
                let rows = sqlx::query(
                    "SELECT column_name FROM information_schema.columns WHERE table_schema = $1 AND table_name = $2 ORDER BY ordinal_position",
                )
                .bind(schema)
                .bind(object)
                .fetch_all(p)
                .await?;
                Ok(rows
                    .into_iter()
                    .filter_map(|r| r.try_get::<String, _>(0).ok())
                    .collect())
            }
            DynamicPool::MySql(p) => {
                let schema = source.schema.clone().unwrap_or_default();
                let sql = if schema.is_empty() {
                    "SELECT column_name FROM information_schema.columns WHERE table_schema = DATABASE() AND table_name = ? ORDER BY ordinal_position"
                } else {
                    "SELECT column_name FROM information_schema.columns WHERE table_schema = ? AND table_name = ? ORDER BY ordinal_position"
                };
                let mut query = sqlx::query(sql);
                if !schema.is_empty() {
                    query = query.bind(schema);
                }
                let rows = query.bind(object).fetch_all(p).await?;
                Ok(rows
                    .into_iter()
                    .filter_map(|r| r.try_get::<String, _>(0).ok())
                    .collect())
            }
        }
    }

    /// Execute one bound statement and materialize every row as JSON.
    pub async fn run_query(
        &self,
        source: &DataSource,
        query: &BoundQuery,
    ) -> anyhow::Result<Vec<serde_json::Value>> {
        let pool = self.get_or_create_pool(source).await?;
        match &*pool {
            DynamicPool::Postgres(p) => {
                let mut q = sqlx::query(&query.sql);
                for bind in &query.binds {
                    q = match bind {
                        BindValue::Int(n) => q.bind(*n),
                        BindValue::Text(s) => q.bind(s.clone()),
                    };
                }
                let rows = q.fetch_all(p).await?;
                Ok(rows.iter().map(pg_row_to_json).collect())
            }
            DynamicPool::MySql(p) => {
                let mut q = sqlx::query(&query.sql);
                for bind in &query.binds {
                    q = match bind {
                        BindValue::Int(n) => q.bind(*n),
                        BindValue::Text(s) => q.bind(s.clone()),
                    };
                }
                let rows = q.fetch_all(p).await?;
                Ok(rows.iter().map(mysql_row_to_json).collect())
            }
        }
    }
}
