//! Shared scalar types for the schema model.

use serde::{Deserialize, Serialize};

/// Logical data type of a physical column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    String,
    Int,
    Decimal,
    Float,
    Bool,
    Date,
    Timestamp,
}

/// Aggregation bound to a physical measure column.
///
/// Every variant must be handled by the rollup renderer - the compiler
/// enforces this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RollupType {
    Sum,
    Min,
    Max,
    Avg,
    Count,
    CountDistinct,
}

/// Engine-level annotations on a physical table.
///
/// Annotations describe storage layout, not query semantics; dialects
/// consult them when deciding whether a specialized predicate applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Annotation {
    /// The table is laid out in engine partitions that can be pruned
    /// with a partition predicate instead of a day-range scan.
    Partitioned,
}
