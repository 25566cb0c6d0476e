use crate::models::query::QuerySpec;

/// Backend the executable statement is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    MySql,
}

impl Dialect {
    pub fn from_db_type(db_type: &str) -> Option<Self> {
        match db_type.to_lowercase().as_str() {
            "postgres" | "postgresql" => Some(Dialect::Postgres),
            "mysql" => Some(Dialect::MySql),
            _ => None,
        }
    }
}

/// Filter value on the execution path. Digit-only values travel as integers,
/// everything else as upper-cased text, matching the display form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindValue {
    Int(i64),
    Text(String),
}

/// Executable statement plus its bind parameters, in filter order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundQuery {
    pub sql: String,
    pub binds: Vec<BindValue>,
}

/// Canonical statement text: what the user sees and what the logs record.
/// Deterministic: the same QuerySpec always yields the same string, with no
/// whitespace drift. Identifiers are bracket-delimited; callers must have
/// validated them against the catalog before rendering.
pub fn render(spec: &QuerySpec, database: &str, numeric_text_columns: &[String]) -> String {
    let mut sql = format!(
        "SELECT TOP {} * FROM [{}].[dbo].[{}]",
        spec.row_limit, database, spec.object
    );

    if !spec.filters.is_empty() {
        let conditions: Vec<String> = spec
            .filters
            .iter()
            .map(|f| {
                if f.is_numeric() {
                    format!("[{}] = {}", f.column, f.value)
                } else {
                    format!("[{}] = '{}'", f.column, f.value.to_uppercase())
                }
            })
            .collect();
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }

    if let Some(order) = &spec.order {
        let direction = order.direction.keyword();
        if is_numeric_text(&order.column, numeric_text_columns) {
            sql.push_str(&format!(
                " ORDER BY CAST([{}] AS INT) {}",
                order.column, direction
            ));
        } else {
            sql.push_str(&format!(" ORDER BY [{}] {}", order.column, direction));
        }
    }

    sql
}

/// Executable form for the sqlx round trip: filter values become bind
/// parameters, the validated row limit renders as a LIMIT clause.
pub fn build_bound(spec: &QuerySpec, dialect: Dialect, numeric_text_columns: &[String]) -> BoundQuery {
    let mut sql = format!("SELECT * FROM {}", quote_ident(&spec.object, dialect));
    let mut binds = Vec::with_capacity(spec.filters.len());

    if !spec.filters.is_empty() {
        let conditions: Vec<String> = spec
            .filters
            .iter()
            .enumerate()
            .map(|(i, f)| {
                binds.push(bind_value(&f.value));
                format!(
                    "{} = {}",
                    quote_ident(&f.column, dialect),
                    placeholder(dialect, i)
                )
            })
            .collect();
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }

    if let Some(order) = &spec.order {
        let column = quote_ident(&order.column, dialect);
        let direction = order.direction.keyword();
        if is_numeric_text(&order.column, numeric_text_columns) {
            let int_type = match dialect {
                Dialect::Postgres => "INTEGER",
                Dialect::MySql => "SIGNED",
            };
            sql.push_str(&format!(" ORDER BY CAST({column} AS {int_type}) {direction}"));
        } else {
            sql.push_str(&format!(" ORDER BY {column} {direction}"));
        }
    }

    sql.push_str(&format!(" LIMIT {}", spec.row_limit));

    BoundQuery { sql, binds }
}

fn is_numeric_text(column: &str, numeric_text_columns: &[String]) -> bool {
    numeric_text_columns
        .iter()
        .any(|c| c.eq_ignore_ascii_case(column))
}

fn quote_ident(name: &str, dialect: Dialect) -> String {
    match dialect {
        Dialect::Postgres => format!("\"{}\"", name),
        Dialect::MySql => format!("`{}`", name),
    }
}

fn placeholder(dialect: Dialect, index: usize) -> String {
    match dialect {
        Dialect::Postgres => format!("${}", index + 1),
        Dialect::MySql => "?".to_string(),
    }
}

fn bind_value(value: &str) -> BindValue {
    let numeric = !value.is_empty() && value.chars().all(|c| c.is_ascii_digit());
    if numeric {
        // digit runs too long for i64 stay textual
        match value.parse::<i64>() {
            Ok(n) => BindValue::Int(n),
            Err(_) => BindValue::Text(value.to_string()),
        }
    } else {
        BindValue::Text(value.to_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::query::{Direction, Filter, OrderSpec, QuerySpec};

    fn numeric_text() -> Vec<String> {
        vec!["hp".to_string(), "sv_client_unit_count".to_string()]
    }

    #[test]
    fn top_and_cast_ordering_for_numeric_text_column() {
        let mut spec = QuerySpec::new("CTOP", 10);
        spec.order = Some(OrderSpec {
            column: "hp".to_string(),
            direction: Direction::Desc,
        });
        let sql = render(&spec, "PlanCapWrk", &numeric_text());
        assert_eq!(
            sql,
            "SELECT TOP 10 * FROM [PlanCapWrk].[dbo].[CTOP] ORDER BY CAST([hp] AS INT) DESC"
        );
    }

    #[test]
    fn plain_ordering_for_regular_column() {
        let mut spec = QuerySpec::new("CTOP", 5);
        spec.order = Some(OrderSpec {
            column: "valor".to_string(),
            direction: Direction::Asc,
        });
        let sql = render(&spec, "PlanCapWrk", &numeric_text());
        assert_eq!(
            sql,
            "SELECT TOP 5 * FROM [PlanCapWrk].[dbo].[CTOP] ORDER BY [valor] ASC"
        );
    }

    #[test]
    fn no_order_clause_without_order_spec() {
        let spec = QuerySpec::new("CTOP", 50);
        let sql = render(&spec, "PlanCapWrk", &numeric_text());
        assert_eq!(sql, "SELECT TOP 50 * FROM [PlanCapWrk].[dbo].[CTOP]");
    }

    #[test]
    fn text_values_render_quoted_and_upper_cased() {
        let mut spec = QuerySpec::new("CTOP", 50);
        spec.filters = vec![
            Filter {
                column: "status".to_string(),
                value: "active".to_string(),
            },
            Filter {
                column: "region".to_string(),
                value: "north".to_string(),
            },
        ];
        let sql = render(&spec, "PlanCapWrk", &numeric_text());
        assert_eq!(
            sql,
            "SELECT TOP 50 * FROM [PlanCapWrk].[dbo].[CTOP] WHERE [status] = 'ACTIVE' AND [region] = 'NORTH'"
        );
    }

    #[test]
    fn digit_only_values_render_unquoted() {
        let mut spec = QuerySpec::new("CTOP", 50);
        spec.filters = vec![Filter {
            column: "hp".to_string(),
            value: "10".to_string(),
        }];
        let sql = render(&spec, "PlanCapWrk", &numeric_text());
        assert_eq!(
            sql,
            "SELECT TOP 50 * FROM [PlanCapWrk].[dbo].[CTOP] WHERE [hp] = 10"
        );
    }

    #[test]
    fn rendering_is_deterministic() {
        let mut spec = QuerySpec::new("CTOP", 7);
        spec.filters = vec![Filter {
            column: "status".to_string(),
            value: "active".to_string(),
        }];
        spec.order = Some(OrderSpec {
            column: "hp".to_string(),
            direction: Direction::Desc,
        });
        let first = render(&spec, "PlanCapWrk", &numeric_text());
        let second = render(&spec, "PlanCapWrk", &numeric_text());
        assert_eq!(first, second);
    }

    #[test]
    fn bound_query_for_postgres_uses_numbered_placeholders() {
        let mut spec = QuerySpec::new("ctop", 10);
        spec.filters = vec![
            Filter {
                column: "status".to_string(),
                value: "active".to_string(),
            },
            Filter {
                column: "hp".to_string(),
                value: "42".to_string(),
            },
        ];
        let bound = build_bound(&spec, Dialect::Postgres, &numeric_text());
        assert_eq!(
            bound.sql,
            "SELECT * FROM \"ctop\" WHERE \"status\" = $1 AND \"hp\" = $2 LIMIT 10"
        );
        assert_eq!(
            bound.binds,
            vec![
                BindValue::Text("ACTIVE".to_string()),
                BindValue::Int(42),
            ]
        );
    }

    #[test]
    fn bound_query_for_mysql_uses_question_marks_and_signed_cast() {
        let mut spec = QuerySpec::new("ctop", 3);
        spec.order = Some(OrderSpec {
            column: "hp".to_string(),
            direction: Direction::Desc,
        });
        spec.filters = vec![Filter {
            column: "status".to_string(),
            value: "done".to_string(),
        }];
        let bound = build_bound(&spec, Dialect::MySql, &numeric_text());
        assert_eq!(
            bound.sql,
            "SELECT * FROM `ctop` WHERE `status` = ? ORDER BY CAST(`hp` AS SIGNED) DESC LIMIT 3"
        );
        assert_eq!(bound.binds, vec![BindValue::Text("DONE".to_string())]);
    }

    #[test]
    fn oversized_digit_run_binds_as_text() {
        assert_eq!(
            bind_value("99999999999999999999999"),
            BindValue::Text("99999999999999999999999".to_string())
        );
    }
}
