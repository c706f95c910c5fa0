//! Per-query alias bookkeeping.
//!
//! The registry is the single source of truth for rendered identifiers
//! during one compilation call. It is created empty at the start of the
//! call, mutated only by the compiler that owns the call, and read-only
//! to downstream consumers once compilation finishes.

use std::collections::BTreeMap;

use serde::Serialize;

use super::{CompileError, CompileResult};
use crate::planner::DimensionBundle;
use crate::sql::dialect::{Dialect, SqlDialect};

/// Registry entry for a dimension-served output alias.
#[derive(Debug, Clone, Serialize)]
pub struct DimensionAliasEntry {
    /// Rendered (quoted) column alias inside the derived table.
    pub rendered: String,

    /// Table alias of the owning derived table (e.g. `t1`).
    pub table_alias: String,

    /// Public dimension the alias is served by.
    pub public_dim: String,
}

/// Alias registry for one compilation call.
///
/// Every alias is registered at most once; registering it again, or
/// looking up an alias that was never registered, is a fatal error - it
/// means a column was referenced before being compiled.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AliasRegistry {
    /// Output alias -> fully rendered source reference on the fact
    /// fragment (e.g. `"t0"."Total Marks"`).
    outer_aliases: BTreeMap<String, String>,

    /// Public table name -> assigned table alias.
    table_aliases: BTreeMap<String, String>,

    /// Next index for assign-on-first-use table aliases.
    next_table_index: usize,

    /// Output alias -> dimension derived-table entry.
    dimension_aliases: BTreeMap<String, DimensionAliasEntry>,

    /// Partition columns consulted while compiling; exposed for the
    /// request-logging pipeline, never acted on here.
    partition_columns: Vec<String>,
}

impl AliasRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fact-served output alias with its rendered source.
    pub fn register_outer_alias(
        &mut self,
        alias: &str,
        rendered: String,
    ) -> CompileResult<()> {
        if self.outer_aliases.contains_key(alias) || self.dimension_aliases.contains_key(alias) {
            return Err(CompileError::DuplicateAlias(alias.to_string()));
        }
        self.outer_aliases.insert(alias.to_string(), rendered);
        Ok(())
    }

    /// Table alias for a public table, assigned on first use and stable
    /// thereafter. The fact is registered first, so it is always `t0`.
    pub fn table_alias_for(&mut self, public_table_name: &str) -> String {
        if let Some(alias) = self.table_aliases.get(public_table_name) {
            return alias.clone();
        }
        let alias = format!("t{}", self.next_table_index);
        self.next_table_index += 1;
        self.table_aliases
            .insert(public_table_name.to_string(), alias.clone());
        alias
    }

    /// Register a dimension-served output alias.
    pub fn set_dimension_column_alias(
        &mut self,
        alias: &str,
        rendered: String,
        table_alias: &str,
        public_dim: &str,
    ) -> CompileResult<()> {
        if self.outer_aliases.contains_key(alias) || self.dimension_aliases.contains_key(alias) {
            return Err(CompileError::DuplicateAlias(alias.to_string()));
        }
        self.dimension_aliases.insert(
            alias.to_string(),
            DimensionAliasEntry {
                rendered,
                table_alias: table_alias.to_string(),
                public_dim: public_dim.to_string(),
            },
        );
        Ok(())
    }

    /// Rendered column alias for a dimension-served output alias.
    pub fn dimension_column_rendered_name(&self, alias: &str) -> CompileResult<&str> {
        self.dimension_aliases
            .get(alias)
            .map(|e| e.rendered.as_str())
            .ok_or_else(|| CompileError::UnregisteredAlias(alias.to_string()))
    }

    /// Deterministic primary-key alias for a bundle:
    /// `<tableAlias>_<primaryKeyName>`. Join predicates and outer-column
    /// lookups depend on this exact convention.
    pub fn primary_key_alias_for(&mut self, bundle: &DimensionBundle) -> String {
        let table_alias = self.table_alias_for(&bundle.public.name);
        format!("{}_{}", table_alias, bundle.table.primary_key)
    }

    /// Fully rendered outer-scope source for an output alias, whichever
    /// fragment serves it.
    pub fn outer_source(&self, alias: &str, dialect: Dialect) -> CompileResult<String> {
        if let Some(rendered) = self.outer_aliases.get(alias) {
            return Ok(rendered.clone());
        }
        if let Some(entry) = self.dimension_aliases.get(alias) {
            return Ok(format!(
                "{}.{}",
                dialect.quote_identifier(&entry.table_alias),
                entry.rendered
            ));
        }
        Err(CompileError::UnregisteredAlias(alias.to_string()))
    }

    /// Record a partition column consulted during compilation.
    pub fn record_partition_column(&mut self, column: String) {
        if !self.partition_columns.contains(&column) {
            self.partition_columns.push(column);
        }
    }

    /// Partition columns consulted, in first-use order.
    pub fn partition_columns(&self) -> &[String] {
        &self.partition_columns
    }

    /// Alias -> rendered-name mapping for the serialization layer.
    pub fn alias_map_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for (alias, rendered) in &self.outer_aliases {
            map.insert(alias.clone(), serde_json::Value::String(rendered.clone()));
        }
        for (alias, entry) in &self.dimension_aliases {
            map.insert(alias.clone(), serde_json::Value::String(entry.rendered.clone()));
        }
        serde_json::Value::Object(map)
    }
}
