//! Schema and request model.
//!
//! Everything here is immutable planning input: physical tables and
//! columns, the public alias layer, filters, and the request surface.

pub mod column;
pub mod expr;
pub mod filter;
pub mod request;
pub mod schema;
pub mod table;
pub mod types;

pub use column::Column;
pub use expr::{BinaryOp, ColumnExpr, Literal};
pub use filter::{Filter, FilterOp, FilterValue};
pub use request::{Grain, RequestFlags, RequestModel, TimeWindow};
pub use schema::{PublicDim, PublicFact};
pub use table::{DimensionTable, FactTable};
pub use types::{Annotation, DataType, RollupType};
