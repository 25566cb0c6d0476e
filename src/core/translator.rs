use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::core::catalog::ColumnSet;
use crate::models::query::{Direction, Filter, OrderSpec, QuerySpec};

static ROW_LIMIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

// Direction keyword, optional filler, optional "on/of column" phrase, then
// the candidate column token. Punctuation between keyword and token breaks
// the match, so "maiores, status = x" does not order by the filter column.
static ORDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(maiores|largest|biggest|menores|smallest|lowest)\s+(?:(?:valores|registros|values|records)\s+)?(?:(?:na|da)\s+coluna\s+|(?:in|of|on)\s+(?:the\s+)?column\s+)?(\w+)",
    )
    .unwrap()
});

static FILTER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\w+)\s*=\s*(\w+)").unwrap());

const FILTER_TRIGGERS: [&str; 2] = ["traga apenas o que for", "bring only what is"];

// Vocabulary the order rule may swallow when the prompt ends early, e.g.
// "os 10 maiores valores". Not worth reporting as an unknown column.
const ORDER_FILLERS: [&str; 12] = [
    "valores", "registros", "values", "records", "na", "da", "coluna", "in", "of", "on", "the",
    "column",
];

/// Where an ignored token came from.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IgnoredRole {
    OrderColumn,
    FilterColumn,
}

/// A prompt token that looked meaningful but did not resolve against the
/// catalog. Surfaced to the caller instead of being silently dropped.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct IgnoredTerm {
    pub role: IgnoredRole,
    pub token: String,
}

#[derive(Debug)]
pub struct Translation {
    pub spec: QuerySpec,
    pub ignored: Vec<IgnoredTerm>,
}

/// Interpret a free-text prompt against a chosen object and its columns.
///
/// Heuristic, not a grammar: ambiguous text always yields some bounded
/// query rather than failing. The prompt is lower-cased once; every rule
/// below works on that form.
pub fn translate(
    prompt: &str,
    object: &str,
    columns: &ColumnSet,
    default_row_limit: u32,
) -> Translation {
    let lowered = prompt.to_lowercase();
    let mut ignored = Vec::new();

    let row_limit = extract_row_limit(&lowered, default_row_limit);
    let order = extract_order(&lowered, columns, &mut ignored);
    let filters = extract_filters(&lowered, columns, &mut ignored);

    debug!(
        row_limit,
        order = ?order,
        filter_count = filters.len(),
        "prompt interpreted"
    );

    let mut spec = QuerySpec::new(object, row_limit);
    spec.order = order;
    spec.filters = filters;

    Translation { spec, ignored }
}

/// First integer token wins; no integer falls back to the configured
/// default. A value that overflows u32 is treated as absent.
fn extract_row_limit(lowered: &str, default_row_limit: u32) -> u32 {
    ROW_LIMIT_RE
        .find(lowered)
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .unwrap_or(default_row_limit)
}

fn extract_order(
    lowered: &str,
    columns: &ColumnSet,
    ignored: &mut Vec<IgnoredTerm>,
) -> Option<OrderSpec> {
    let caps = ORDER_RE.captures(lowered)?;
    let direction = match &caps[1] {
        "maiores" | "largest" | "biggest" => Direction::Desc,
        _ => Direction::Asc,
    };
    let candidate = &caps[2];

    match columns.resolve(candidate) {
        Some(column) => Some(OrderSpec {
            column: column.to_string(),
            direction,
        }),
        None => {
            if !ORDER_FILLERS.contains(&candidate) {
                warn!(token = candidate, "order column not in catalog, dropped");
                ignored.push(IgnoredTerm {
                    role: IgnoredRole::OrderColumn,
                    token: candidate.to_string(),
                });
            }
            None
        }
    }
}

/// Rewrite the filter trigger phrase to an equality sign, treat commas as
/// separators, then scan every `word = word` pair. Pairs keep first-seen
/// order; duplicate columns are all retained.
fn extract_filters(
    lowered: &str,
    columns: &ColumnSet,
    ignored: &mut Vec<IgnoredTerm>,
) -> Vec<Filter> {
    let mut rewritten = lowered.to_string();
    for trigger in FILTER_TRIGGERS {
        rewritten = rewritten.replace(trigger, "=");
    }
    let rewritten = rewritten.replace(',', " ");

    let mut filters = Vec::new();
    for caps in FILTER_RE.captures_iter(&rewritten) {
        let (token, value) = (&caps[1], &caps[2]);
        match columns.resolve(token) {
            Some(column) => filters.push(Filter {
                column: column.to_string(),
                value: value.to_string(),
            }),
            None => {
                warn!(token, "filter column not in catalog, dropped");
                ignored.push(IgnoredTerm {
                    role: IgnoredRole::FilterColumn,
                    token: token.to_string(),
                });
            }
        }
    }
    filters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::ColumnSet;

    const DEFAULT_LIMIT: u32 = 50;

    fn columns() -> ColumnSet {
        ColumnSet::build(vec![
            "hp".to_string(),
            "status".to_string(),
            "region".to_string(),
            "valor".to_string(),
        ])
        .unwrap()
    }

    fn run(prompt: &str) -> Translation {
        translate(prompt, "CTOP", &columns(), DEFAULT_LIMIT)
    }

    #[test]
    fn first_integer_token_becomes_row_limit() {
        assert_eq!(run("quais os 10 maiores valores?").spec.row_limit, 10);
        assert_eq!(run("traga 25 registros e depois 99").spec.row_limit, 25);
    }

    #[test]
    fn missing_integer_uses_default() {
        assert_eq!(run("mostre os registros").spec.row_limit, DEFAULT_LIMIT);
    }

    #[test]
    fn zero_clamps_to_one() {
        assert_eq!(run("traga 0 registros").spec.row_limit, 1);
    }

    #[test]
    fn overflowing_integer_falls_back_to_default() {
        assert_eq!(
            run("traga 99999999999999999999 registros").spec.row_limit,
            DEFAULT_LIMIT
        );
    }

    #[test]
    fn maiores_with_known_column_orders_descending() {
        let t = run("os 10 maiores valores na coluna hp");
        assert_eq!(
            t.spec.order,
            Some(OrderSpec {
                column: "hp".to_string(),
                direction: Direction::Desc,
            })
        );
        assert_eq!(t.spec.row_limit, 10);
    }

    #[test]
    fn menores_orders_ascending() {
        let t = run("os menores registros da coluna valor");
        assert_eq!(
            t.spec.order,
            Some(OrderSpec {
                column: "valor".to_string(),
                direction: Direction::Asc,
            })
        );
    }

    #[test]
    fn english_keyword_and_column_phrase() {
        let t = run("show the 10 largest values in column hp");
        assert_eq!(t.spec.row_limit, 10);
        assert_eq!(
            t.spec.order,
            Some(OrderSpec {
                column: "hp".to_string(),
                direction: Direction::Desc,
            })
        );
    }

    #[test]
    fn keyword_directly_followed_by_column() {
        let t = run("maiores hp");
        assert_eq!(t.spec.order.unwrap().column, "hp");
    }

    #[test]
    fn unknown_order_column_yields_no_order_and_is_reported() {
        let t = run("os maiores valores na coluna inexistente");
        assert!(t.spec.order.is_none());
        assert_eq!(
            t.ignored,
            vec![IgnoredTerm {
                role: IgnoredRole::OrderColumn,
                token: "inexistente".to_string(),
            }]
        );
    }

    #[test]
    fn direction_keyword_without_candidate_produces_no_order() {
        let t = run("maiores");
        assert!(t.spec.order.is_none());
        assert!(t.ignored.is_empty());
    }

    #[test]
    fn punctuation_after_keyword_does_not_bind_filter_column() {
        let t = run("maiores, status = active");
        assert!(t.spec.order.is_none());
        assert_eq!(t.spec.filters.len(), 1);
    }

    #[test]
    fn trigger_phrase_and_commas_become_filters_in_order() {
        let t = run("bring only what is status = active, region = north");
        assert_eq!(
            t.spec.filters,
            vec![
                Filter {
                    column: "status".to_string(),
                    value: "active".to_string(),
                },
                Filter {
                    column: "region".to_string(),
                    value: "north".to_string(),
                },
            ]
        );
    }

    #[test]
    fn portuguese_trigger_phrase_is_rewritten() {
        let t = run("traga apenas o que for status = ativo");
        assert_eq!(t.spec.filters.len(), 1);
        assert_eq!(t.spec.filters[0].value, "ativo");
    }

    #[test]
    fn duplicate_filter_columns_are_all_retained() {
        let t = run("status = active, status = closed");
        assert_eq!(t.spec.filters.len(), 2);
        assert_eq!(t.spec.filters[0].value, "active");
        assert_eq!(t.spec.filters[1].value, "closed");
    }

    #[test]
    fn unknown_filter_column_is_dropped_and_reported() {
        let t = run("status = active, nothere = x");
        assert_eq!(t.spec.filters.len(), 1);
        assert_eq!(
            t.ignored,
            vec![IgnoredTerm {
                role: IgnoredRole::FilterColumn,
                token: "nothere".to_string(),
            }]
        );
    }

    #[test]
    fn filter_column_resolution_ignores_case() {
        let t = run("STATUS = active");
        assert_eq!(t.spec.filters[0].column, "status");
    }
}
