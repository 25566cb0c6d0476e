use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use serde_json::{json, Map, Value};
use sqlx::mysql::MySqlRow;
use sqlx::postgres::PgRow;
use sqlx::{Column, Row, TypeInfo};

/// Convert one Postgres row into a JSON object keyed by column name.
/// Unreadable or unknown-typed cells degrade to null rather than failing
/// the whole result set.
pub fn pg_row_to_json(row: &PgRow) -> Value {
    let mut map = Map::new();
    for col in row.columns() {
        let name = col.name();
        let val = match col.type_info().name() {
            "INT2" | "INT4" => json!(row.try_get::<Option<i32>, _>(name).unwrap_or(None)),
            "INT8" => json!(row.try_get::<Option<i64>, _>(name).unwrap_or(None)),
            "FLOAT4" | "FLOAT8" => json!(row.try_get::<Option<f64>, _>(name).unwrap_or(None)),
            "NUMERIC" => {
                let v: Option<rust_decimal::Decimal> = row.try_get(name).unwrap_or(None);
                json!(v.and_then(|d| d.to_f64()))
            }
            "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => {
                json!(row.try_get::<Option<String>, _>(name).unwrap_or(None))
            }
            "BOOL" => json!(row.try_get::<Option<bool>, _>(name).unwrap_or(None)),
            "DATE" => json!(row
                .try_get::<Option<NaiveDate>, _>(name)
                .unwrap_or(None)
                .map(|d| d.to_string())),
            "TIMESTAMP" | "TIMESTAMPTZ" => json!(row
                .try_get::<Option<NaiveDateTime>, _>(name)
                .unwrap_or(None)
                .map(|dt| dt.to_string())),
            "JSON" | "JSONB" => row
                .try_get::<Option<Value>, _>(name)
                .unwrap_or(None)
                .unwrap_or(Value::Null),
            _ => json!(row.try_get::<Option<String>, _>(name).unwrap_or(None)),
        };
        map.insert(name.to_string(), val);
    }
    Value::Object(map)
}

/// MySQL counterpart of [`pg_row_to_json`].
pub fn mysql_row_to_json(row: &MySqlRow) -> Value {
    let mut map = Map::new();
    for col in row.columns() {
        let name = col.name();
        let val = match col.type_info().name() {
            "TINYINT" | "SMALLINT" | "INT" | "MEDIUMINT" => {
                json!(row.try_get::<Option<i32>, _>(name).unwrap_or(None))
            }
            "BIGINT" => json!(row.try_get::<Option<i64>, _>(name).unwrap_or(None)),
            "FLOAT" | "DOUBLE" => json!(row.try_get::<Option<f64>, _>(name).unwrap_or(None)),
            "DECIMAL" | "NEWDECIMAL" => {
                let v: Option<rust_decimal::Decimal> = row.try_get(name).unwrap_or(None);
                json!(v.and_then(|d| d.to_f64()))
            }
            "CHAR" | "VARCHAR" | "TEXT" | "LONGTEXT" => {
                json!(row.try_get::<Option<String>, _>(name).unwrap_or(None))
            }
            "DATE" => json!(row
                .try_get::<Option<NaiveDate>, _>(name)
                .unwrap_or(None)
                .map(|d| d.to_string())),
            "DATETIME" | "TIMESTAMP" => json!(row
                .try_get::<Option<NaiveDateTime>, _>(name)
                .unwrap_or(None)
                .map(|dt| dt.to_string())),
            _ => json!(row.try_get::<Option<String>, _>(name).unwrap_or(None)),
        };
        map.insert(name.to_string(), val);
    }
    Value::Object(map)
}
