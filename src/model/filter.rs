//! Filter predicates over logical fields.
//!
//! Filters are immutable and engine-agnostic: a logical field name, an
//! operator, and one or more operand literals. Rendering against a
//! physical column happens in the compiler.

use serde::{Deserialize, Serialize};

use super::expr::Literal;

/// Filter operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
    NotIn,
    Between,
    Like,
}

/// Filter operand: scalar, list, or range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterValue {
    Scalar(Literal),
    List(Vec<Literal>),
    Range(Literal, Literal),
}

/// A predicate over a logical field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// Logical field name. Candidate filters arrive resolved to physical
    /// column names; schema-level (forced) and bundle filters carry
    /// public aliases.
    pub field: String,

    pub op: FilterOp,

    pub value: FilterValue,
}

impl Filter {
    pub fn new(field: impl Into<String>, op: FilterOp, value: FilterValue) -> Self {
        Self {
            field: field.into(),
            op,
            value,
        }
    }

    /// Shorthand for an equality filter on a scalar.
    pub fn eq(field: impl Into<String>, value: Literal) -> Self {
        Self::new(field, FilterOp::Eq, FilterValue::Scalar(value))
    }

    /// Shorthand for a between filter.
    pub fn between(field: impl Into<String>, low: Literal, high: Literal) -> Self {
        Self::new(field, FilterOp::Between, FilterValue::Range(low, high))
    }
}
