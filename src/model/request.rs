//! The request surface the compiler consumes.

use serde::{Deserialize, Serialize};

/// Inclusive date window, ISO `YYYY-MM-DD` bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: String,
    pub end: String,
}

impl TimeWindow {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

/// Time granularity of the query.
///
/// Carried through for downstream consumers; no compilation rule depends
/// on it beyond the window itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Grain {
    #[default]
    Day,
    Week,
    Month,
    All,
}

/// Per-query compilation flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestFlags {
    /// When cleared, a partitioned fact falls back to the day-range
    /// predicate instead of the partition predicate. Exactly one time
    /// predicate is emitted either way.
    pub allow_partition_pruning: bool,
}

impl Default for RequestFlags {
    fn default() -> Self {
        Self {
            allow_partition_pruning: true,
        }
    }
}

/// An already-planned analytic query request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestModel {
    /// Requested output aliases, in the caller's order. Projection order
    /// equals this order.
    pub fields: Vec<String>,

    /// Requested date window.
    pub window: TimeWindow,

    /// Time granularity.
    pub grain: Grain,

    /// Per-query flags.
    pub flags: RequestFlags,

    /// Maximum row count; zero leaves the statement unbounded.
    pub max_rows: u64,
}

impl RequestModel {
    pub fn new(fields: Vec<String>, window: TimeWindow) -> Self {
        Self {
            fields,
            window,
            grain: Grain::default(),
            flags: RequestFlags::default(),
            max_rows: 0,
        }
    }

    pub fn with_max_rows(mut self, max_rows: u64) -> Self {
        self.max_rows = max_rows;
        self
    }

    pub fn with_grain(mut self, grain: Grain) -> Self {
        self.grain = grain;
        self
    }
}
