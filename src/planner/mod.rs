//! Planner output consumed by the compiler.
//!
//! The upstream planner selects the best fact/dimension combination for a
//! request and resolves every filter and requested column against it.
//! The compiler treats these structs as read-only, already-validated
//! input; a mismatch discovered during compilation is a planner or schema
//! bug, not a user error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::filter::Filter;
use crate::model::schema::{PublicDim, PublicFact};
use crate::model::table::{DimensionTable, FactTable};

/// A requested column resolved to its physical backing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedField {
    /// Output alias from the request.
    pub alias: String,

    /// Physical column name on the owning table.
    pub column: String,
}

impl ResolvedField {
    pub fn new(alias: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            column: column.into(),
        }
    }
}

/// Planner cost metadata. Passed through untouched; the compiler never
/// reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CostEstimate {
    pub estimated_rows: u64,
    pub estimated_bytes: u64,
}

/// The fact chosen by the planner for one request, with everything the
/// compiler needs already resolved against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactBestCandidate {
    /// Public schema layer of the chosen fact.
    pub public: PublicFact,

    /// Physical fact table.
    pub table: FactTable,

    /// Caller filters, resolved to physical field names.
    pub filters: Vec<Filter>,

    /// Requested dimension columns stored on the fact table.
    pub dimension_fields: Vec<ResolvedField>,

    /// Requested measure columns.
    pub measure_fields: Vec<ResolvedField>,

    /// Duplicate output alias -> canonical alias, for values requested
    /// under more than one name.
    pub duplicate_aliases: BTreeMap<String, String>,

    /// Planner cost metadata (pass-through).
    pub cost: CostEstimate,
}

/// One requested dimension: the chosen table, its filters, and the
/// requested field aliases in caller order.
///
/// Bundles order totally by public-dimension name so join emission order
/// is reproducible across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionBundle {
    /// Public schema layer of the chosen dimension.
    pub public: PublicDim,

    /// Physical dimension table.
    pub table: DimensionTable,

    /// Caller filters on this dimension, by public alias.
    pub filters: Vec<Filter>,

    /// Requested field aliases, in caller order.
    pub fields: Vec<String>,
}

impl DimensionBundle {
    /// Canonical ordering key. Compilation sorts bundles by this before
    /// any emission, so join order is part of the deterministic output.
    pub fn sort_key(&self) -> &str {
        &self.public.name
    }
}
