use dashmap::DashMap;
use fst::Map as FstMap;
use fst::MapBuilder;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Table,
    View,
}

#[derive(Debug, Serialize, Clone)]
pub struct CatalogObject {
    pub name: String,
    pub kind: ObjectKind,
}

/// Ordered column names of one object plus an FST index from lower-cased
/// name to ordinal, so prompt tokens resolve case-insensitively back to the
/// stored casing.
pub struct ColumnSet {
    names: Vec<String>,
    index: FstMap<Vec<u8>>,
}

impl ColumnSet {
    pub fn build(names: Vec<String>) -> anyhow::Result<Self> {
        // FST keys must be inserted in sorted order
        let mut sorted: BTreeMap<String, u64> = BTreeMap::new();
        for (idx, name) in names.iter().enumerate() {
            sorted.insert(name.to_lowercase(), idx as u64);
        }

        let mut builder = MapBuilder::memory();
        for (key, idx) in sorted {
            builder.insert(key, idx)?;
        }
        let bytes = builder.into_inner()?;

        Ok(Self {
            names,
            index: FstMap::new(bytes)?,
        })
    }

    /// Resolve a token to the stored column name, ignoring case.
    pub fn resolve(&self, token: &str) -> Option<&str> {
        let idx = self.index.get(token.to_lowercase())?;
        self.names.get(idx as usize).map(String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Queryable objects of one data source. Fetched once, cached for the
/// session, replaced wholesale when the source is re-registered.
pub struct SchemaCatalog {
    pub objects: Vec<CatalogObject>,
    columns: DashMap<String, Arc<ColumnSet>>,
}

impl SchemaCatalog {
    pub fn new(objects: Vec<CatalogObject>) -> Self {
        Self {
            objects,
            columns: DashMap::new(),
        }
    }

    /// Case-insensitive lookup returning the catalog's stored name.
    pub fn find_object(&self, name: &str) -> Option<&CatalogObject> {
        self.objects
            .iter()
            .find(|o| o.name.eq_ignore_ascii_case(name))
    }

    pub fn cached_columns(&self, object: &str) -> Option<Arc<ColumnSet>> {
        self.columns.get(object).map(|e| e.value().clone())
    }

    pub fn store_columns(&self, object: &str, set: Arc<ColumnSet>) {
        self.columns.insert(object.to_string(), set);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ColumnSet {
        ColumnSet::build(vec![
            "Id".to_string(),
            "hp".to_string(),
            "Region".to_string(),
        ])
        .unwrap()
    }

    #[test]
    fn resolve_ignores_case_and_returns_stored_casing() {
        let cols = sample();
        assert_eq!(cols.resolve("REGION"), Some("Region"));
        assert_eq!(cols.resolve("id"), Some("Id"));
        assert_eq!(cols.resolve("hp"), Some("hp"));
        assert!(cols.resolve("missing").is_none());
    }

    #[test]
    fn names_keep_catalog_order() {
        let cols = sample();
        assert_eq!(cols.names(), &["Id", "hp", "Region"]);
    }

    #[test]
    fn find_object_is_case_insensitive() {
        let catalog = SchemaCatalog::new(vec![CatalogObject {
            name: "CTOP".to_string(),
            kind: ObjectKind::Table,
        }]);
        assert_eq!(catalog.find_object("ctop").unwrap().name, "CTOP");
        assert!(catalog.find_object("other").is_none());
    }
}
