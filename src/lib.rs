//! # Quarry
//!
//! Compiles planned fact/dimension query requests into multi-dialect
//! OLAP SQL.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        Planner Output (external, already validated)      │
//! │   (FactBestCandidate, DimensionBundles, RequestModel)    │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [compiler]
//! ┌─────────────────────────────────────────────────────────┐
//! │   AliasRegistry + dimension joins + fact fragment        │
//! │              + outer projection                          │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [token serialization, per dialect]
//! ┌─────────────────────────────────────────────────────────┐
//! │                    SQL statement                         │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The compilation algorithm is shared across engines; everything
//! engine-specific (quoting, literals, rollups, partition predicates,
//! row limiting) goes through the [`sql::dialect::SqlDialect`] strategy.
//! Compilation is a pure, synchronous transformation: per-call registry
//! and accumulator, no I/O, no shared state.

pub mod compiler;
pub mod model;
pub mod planner;
pub mod sql;

// Re-export SQL submodules at crate level for convenient paths
pub use sql::dialect;
pub use sql::token;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::compiler::{compile, AliasRegistry, CompileError, CompiledQuery};
    pub use crate::dialect::{Dialect, SqlDialect};
    pub use crate::model::{
        Annotation, Column, ColumnExpr, DimensionTable, FactTable, Filter, FilterOp, FilterValue,
        Grain, Literal, PublicDim, PublicFact, RequestModel, RollupType, TimeWindow,
    };
    pub use crate::planner::{DimensionBundle, FactBestCandidate, ResolvedField};
    pub use crate::token::{Token, TokenStream};
}

// Also export at crate root for convenience
pub use compiler::{compile, CompileError, CompileResult, CompiledQuery};
pub use dialect::Dialect;
