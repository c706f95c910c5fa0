//! Physical fact and dimension table definitions.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::column::Column;
use super::types::Annotation;

/// A physical fact table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactTable {
    /// Physical table name.
    pub name: String,

    /// Columns keyed by physical name. Keying enforces name uniqueness
    /// within the table.
    pub columns: BTreeMap<String, Column>,

    /// Storage-layout annotations.
    pub annotations: BTreeSet<Annotation>,

    /// Event-time column; target of the day-range predicate when no
    /// partition predicate applies.
    pub time_column: String,

    /// Public-dimension name -> physical foreign-key column.
    pub foreign_keys: BTreeMap<String, String>,
}

impl FactTable {
    pub fn new(name: impl Into<String>, time_column: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: BTreeMap::new(),
            annotations: BTreeSet::new(),
            time_column: time_column.into(),
            foreign_keys: BTreeMap::new(),
        }
    }

    /// Add a column, keyed by its physical name.
    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.insert(column.name().to_string(), column);
        self
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.insert(annotation);
        self
    }

    /// Register the foreign key joining this fact to a public dimension.
    pub fn with_foreign_key(
        mut self,
        public_dim: impl Into<String>,
        fk_column: impl Into<String>,
    ) -> Self {
        self.foreign_keys.insert(public_dim.into(), fk_column.into());
        self
    }

    pub fn is_partitioned(&self) -> bool {
        self.annotations.contains(&Annotation::Partitioned)
    }
}

/// A physical dimension table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionTable {
    /// Physical table name.
    pub name: String,

    /// Columns keyed by physical name.
    pub columns: BTreeMap<String, Column>,

    /// Storage-layout annotations.
    pub annotations: BTreeSet<Annotation>,

    /// Primary-key column name.
    pub primary_key: String,
}

impl DimensionTable {
    pub fn new(name: impl Into<String>, primary_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: BTreeMap::new(),
            annotations: BTreeSet::new(),
            primary_key: primary_key.into(),
        }
    }

    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.insert(column.name().to_string(), column);
        self
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.insert(annotation);
        self
    }

    pub fn is_partitioned(&self) -> bool {
        self.annotations.contains(&Annotation::Partitioned)
    }
}
