use serde::{Deserialize, Serialize};

/// Sort direction extracted from a prompt or picked in the form.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[serde(alias = "ascending")]
    Asc,
    #[serde(alias = "descending")]
    Desc,
}

impl Direction {
    pub fn keyword(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct OrderSpec {
    pub column: String,
    pub direction: Direction,
}

/// One equality condition. The value is kept as extracted; quoting and
/// upper-casing happen at render time depending on whether it is all digits.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub value: String,
}

impl Filter {
    /// Digit-only values are emitted as unquoted numeric literals.
    pub fn is_numeric(&self) -> bool {
        !self.value.is_empty() && self.value.chars().all(|c| c.is_ascii_digit())
    }
}

/// Immutable description of one bounded SELECT. Built fresh per request,
/// rendered to exactly one SQL string, discarded after execution.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    pub object: String,
    pub row_limit: u32,
    pub order: Option<OrderSpec>,
    pub filters: Vec<Filter>,
}

impl QuerySpec {
    pub fn new(object: impl Into<String>, row_limit: u32) -> Self {
        Self {
            object: object.into(),
            // a query is always bounded, even when the caller passes 0
            row_limit: row_limit.max(1),
            order: None,
            filters: Vec::new(),
        }
    }
}
