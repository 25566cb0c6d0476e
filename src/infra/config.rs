use anyhow::Context;
use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use crate::models::source::DataSource;

/// Everything read from the environment at startup. Handlers receive this
/// through the shared state; nothing re-reads env vars afterwards.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// Shared secret the gate checks before any database interaction.
    pub app_password: String,
    /// Row limit used when a prompt carries no integer token.
    pub default_row_limit: u32,
    /// Columns stored as text but holding digits; ordering casts them.
    pub numeric_text_columns: Vec<String>,
    pub connect_timeout: Duration,
    /// Source seeded from DATABASE_URL, registered under the id "default".
    pub default_source: Option<DataSource>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()
            .context("invalid BIND_ADDR")?;

        let app_password = env::var("APP_PASSWORD").context("APP_PASSWORD must be set")?;

        let default_row_limit = match env::var("DEFAULT_ROW_LIMIT") {
            Ok(raw) => raw.parse().context("invalid DEFAULT_ROW_LIMIT")?,
            Err(_) => 50,
        };

        let numeric_text_columns = match env::var("NUMERIC_TEXT_COLUMNS") {
            Ok(raw) => raw
                .split(',')
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect(),
            Err(_) => vec!["hp".to_string(), "sv_client_unit_count".to_string()],
        };

        let connect_timeout = Duration::from_secs(
            env::var("CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(5),
        );

        let default_source = env::var("DATABASE_URL").ok().map(|url| DataSource {
            id: "default".to_string(),
            db_type: env::var("DATABASE_KIND").unwrap_or_else(|_| "postgres".to_string()),
            connection_url: url,
            database: env::var("DATABASE_NAME").unwrap_or_else(|_| "default".to_string()),
            display_name: "Default source".to_string(),
            schema: env::var("DATABASE_SCHEMA").ok(),
        });

        Ok(Self {
            bind_addr,
            app_password,
            default_row_limit,
            numeric_text_columns,
            connect_timeout,
            default_source,
        })
    }
}
