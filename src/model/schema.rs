//! Public schema layer - the alias-based contract exposed to callers.
//!
//! Public tables decouple output aliases from physical table and column
//! names. One physical column may carry several aliases; forced filters
//! are predicates the schema owner mandates on every query.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::filter::Filter;

/// The externally visible view of a fact table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicFact {
    /// Public name; callers and dimension bundles refer to this.
    pub name: String,

    /// Output alias -> physical column name.
    pub alias_to_name: BTreeMap<String, String>,

    /// Predicates applied regardless of caller input.
    pub forced_filters: Vec<Filter>,

    /// Schema revision; bumped whenever the mapping changes.
    pub revision: u32,
}

impl PublicFact {
    pub fn new(name: impl Into<String>, revision: u32) -> Self {
        Self {
            name: name.into(),
            alias_to_name: BTreeMap::new(),
            forced_filters: Vec::new(),
            revision,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>, name: impl Into<String>) -> Self {
        self.alias_to_name.insert(alias.into(), name.into());
        self
    }

    pub fn with_forced_filter(mut self, filter: Filter) -> Self {
        self.forced_filters.push(filter);
        self
    }

    /// Physical name for an alias, if mapped.
    pub fn physical_name(&self, alias: &str) -> Option<&str> {
        self.alias_to_name.get(alias).map(String::as_str)
    }

    /// All aliases mapped to a physical column, in alias order.
    pub fn aliases_for(&self, name: &str) -> Vec<&str> {
        self.alias_to_name
            .iter()
            .filter(|(_, n)| n.as_str() == name)
            .map(|(a, _)| a.as_str())
            .collect()
    }
}

/// The externally visible view of a dimension table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicDim {
    /// Public name; facts key their foreign-key map by this.
    pub name: String,

    /// Output alias -> physical column name.
    pub alias_to_name: BTreeMap<String, String>,

    /// Predicates applied regardless of caller input.
    pub forced_filters: Vec<Filter>,

    /// Schema revision.
    pub revision: u32,
}

impl PublicDim {
    pub fn new(name: impl Into<String>, revision: u32) -> Self {
        Self {
            name: name.into(),
            alias_to_name: BTreeMap::new(),
            forced_filters: Vec::new(),
            revision,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>, name: impl Into<String>) -> Self {
        self.alias_to_name.insert(alias.into(), name.into());
        self
    }

    pub fn with_forced_filter(mut self, filter: Filter) -> Self {
        self.forced_filters.push(filter);
        self
    }

    /// Physical name for an alias, if mapped.
    pub fn physical_name(&self, alias: &str) -> Option<&str> {
        self.alias_to_name.get(alias).map(String::as_str)
    }
}
