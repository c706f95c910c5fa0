//! Column variants for fact and dimension tables.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::expr::ColumnExpr;
use super::types::{DataType, RollupType};

/// A column on a physical table.
///
/// This is a closed union: every consumer matches all variants explicitly
/// and fails on a variant that cannot appear in its position (a measure
/// where a grouping key is required, and vice versa). No silent fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Column {
    /// A stored measure column with its rollup aggregation.
    PhysicalFact {
        name: String,
        data_type: DataType,
        rollup: RollupType,
    },

    /// A measure computed from an expression over other columns.
    ///
    /// `aggregate` marks expressions that already collapse to a scalar
    /// aggregate (they never contribute a grouping key).
    DerivedFact {
        name: String,
        expr: ColumnExpr,
        aggregate: bool,
    },

    /// A stored descriptive column.
    ///
    /// `static_mapping` optionally maps stored values to display values;
    /// mappings apply to string-typed columns. SELECT and GROUP BY use
    /// the mapped rendering, filters compare against the stored value.
    PhysicalDim {
        name: String,
        data_type: DataType,
        static_mapping: Option<BTreeMap<String, String>>,
    },

    /// A descriptive column computed from an expression.
    DerivedDim {
        name: String,
        expr: ColumnExpr,
        aggregate: bool,
    },
}

impl Column {
    /// Physical name of this column.
    pub fn name(&self) -> &str {
        match self {
            Column::PhysicalFact { name, .. }
            | Column::DerivedFact { name, .. }
            | Column::PhysicalDim { name, .. }
            | Column::DerivedDim { name, .. } => name,
        }
    }

    /// Whether this column is a measure (fact-side) column.
    pub fn is_measure(&self) -> bool {
        matches!(
            self,
            Column::PhysicalFact { .. } | Column::DerivedFact { .. }
        )
    }
}
