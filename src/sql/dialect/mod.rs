//! SQL dialect definitions and rendering strategies.
//!
//! One compilation algorithm serves every engine; everything
//! engine-specific goes through the `SqlDialect` trait:
//!
//! - Identifier quoting: `"` (Presto) vs `` ` `` (BigQuery, Hive)
//! - Date literals: `DATE '...'` vs plain strings (Hive)
//! - Rollup rendering (BigQuery uses approximate distinct counts)
//! - Static value mappings (CASE rendering)
//! - Partition predicates for partitioned facts and dimensions
//! - Row limiting
//!
//! The core never branches on an engine value; it calls the trait.

mod bigquery;
pub mod helpers;
mod hive;
mod presto;

pub use bigquery::BigQuery;
pub use hive::Hive;
pub use presto::Presto;

use std::collections::BTreeMap;

use super::token::{Token, TokenStream};
use crate::model::request::TimeWindow;
use crate::model::table::{DimensionTable, FactTable};
use crate::model::types::RollupType;

/// A partition-pruning predicate together with the column it prunes on.
///
/// The column is recorded in the alias registry so the telemetry layer
/// can see which partitions a statement consulted.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionPredicate {
    pub column: String,
    pub predicate: TokenStream,
}

/// SQL dialect trait - defines how SQL constructs are rendered.
///
/// Default implementations follow ANSI SQL where possible; dialects
/// override what their engine does differently.
pub trait SqlDialect: std::fmt::Debug {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    // =========================================================================
    // Identifier and Literal Quoting
    // =========================================================================

    /// Quote an identifier (table, column, alias).
    fn quote_identifier(&self, ident: &str) -> String;

    /// Quote a string literal.
    ///
    /// All supported dialects use single quotes with `''` for escaping.
    fn quote_string(&self, s: &str) -> String {
        helpers::quote_string_single(s)
    }

    /// Format a boolean literal.
    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_literal(b)
    }

    /// Format a date literal from an ISO `YYYY-MM-DD` string.
    ///
    /// Hive stores partition dates as plain strings and overrides this.
    fn format_date_literal(&self, date: &str) -> String {
        format!("DATE '{}'", date)
    }

    // =========================================================================
    // Column Rendering
    // =========================================================================

    /// Render a rollup aggregation over a physical column.
    fn render_rollup(&self, rollup: RollupType, column: &str) -> TokenStream {
        let mut ts = TokenStream::new();
        let func = match rollup {
            RollupType::Sum => "SUM",
            RollupType::Min => "MIN",
            RollupType::Max => "MAX",
            RollupType::Avg => "AVG",
            RollupType::Count | RollupType::CountDistinct => "COUNT",
        };
        ts.push(Token::FunctionName(func.into()));
        ts.lparen();
        if rollup == RollupType::CountDistinct {
            ts.push(Token::Distinct).space();
        }
        ts.push(Token::Ident(column.into()));
        ts.rparen();
        ts
    }

    /// Render a static value mapping as a simple CASE over the stored
    /// column; unmapped values fall through to the stored value.
    fn render_static_mapping(
        &self,
        column: &str,
        mapping: &BTreeMap<String, String>,
    ) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.push(Token::Case)
            .space()
            .push(Token::Ident(column.into()));
        for (stored, display) in mapping {
            ts.space()
                .push(Token::When)
                .space()
                .push(Token::LitString(stored.clone()))
                .space()
                .push(Token::Then)
                .space()
                .push(Token::LitString(display.clone()));
        }
        ts.space()
            .push(Token::Else)
            .space()
            .push(Token::Ident(column.into()))
            .space()
            .push(Token::End);
        ts
    }

    /// Render one outer-projection column from an already-rendered
    /// source reference and its output alias.
    fn render_outer_column(&self, source: &str, alias: &str) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.push(Token::Raw(source.into()))
            .space()
            .push(Token::As)
            .space()
            .push(Token::Ident(alias.into()));
        ts
    }

    // =========================================================================
    // Time Predicates
    // =========================================================================

    /// The day-range predicate over the fact's event-time column.
    fn day_range_predicate(&self, time_column: &str, window: &TimeWindow) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.push(Token::Ident(time_column.into()))
            .space()
            .push(Token::Between)
            .space()
            .push(Token::LitDate(window.start.clone()))
            .space()
            .push(Token::And)
            .space()
            .push(Token::LitDate(window.end.clone()));
        ts
    }

    /// Partition predicate for a partitioned fact, if this engine has
    /// one. When present it replaces the day-range predicate.
    fn fact_partition_predicate(
        &self,
        fact: &FactTable,
        window: &TimeWindow,
    ) -> Option<PartitionPredicate> {
        let _ = (fact, window);
        None
    }

    /// Partition predicate for a partitioned dimension, if any.
    fn dimension_partition_predicate(
        &self,
        dim: &DimensionTable,
        window: &TimeWindow,
    ) -> Option<PartitionPredicate> {
        let _ = (dim, window);
        None
    }

    // =========================================================================
    // Row Limiting
    // =========================================================================

    /// Emit the limiting clause. Only called for a strictly positive
    /// maximum.
    fn emit_row_limit(&self, max_rows: u64) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.push(Token::Limit)
            .space()
            .push(Token::LitInt(max_rows as i64));
        ts
    }
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    BigQuery,
    Hive,
    #[default]
    Presto,
}

impl Dialect {
    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::BigQuery => &BigQuery,
            Dialect::Hive => &Hive,
            Dialect::Presto => &Presto,
        }
    }
}

// Implement SqlDialect for Dialect enum by delegating to concrete types
impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn quote_identifier(&self, ident: &str) -> String {
        self.dialect().quote_identifier(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        self.dialect().quote_string(s)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        self.dialect().format_bool(b)
    }

    fn format_date_literal(&self, date: &str) -> String {
        self.dialect().format_date_literal(date)
    }

    fn render_rollup(&self, rollup: RollupType, column: &str) -> TokenStream {
        self.dialect().render_rollup(rollup, column)
    }

    fn render_static_mapping(
        &self,
        column: &str,
        mapping: &BTreeMap<String, String>,
    ) -> TokenStream {
        self.dialect().render_static_mapping(column, mapping)
    }

    fn render_outer_column(&self, source: &str, alias: &str) -> TokenStream {
        self.dialect().render_outer_column(source, alias)
    }

    fn day_range_predicate(&self, time_column: &str, window: &TimeWindow) -> TokenStream {
        self.dialect().day_range_predicate(time_column, window)
    }

    fn fact_partition_predicate(
        &self,
        fact: &FactTable,
        window: &TimeWindow,
    ) -> Option<PartitionPredicate> {
        self.dialect().fact_partition_predicate(fact, window)
    }

    fn dimension_partition_predicate(
        &self,
        dim: &DimensionTable,
        window: &TimeWindow,
    ) -> Option<PartitionPredicate> {
        self.dialect().dimension_partition_predicate(dim, window)
    }

    fn emit_row_limit(&self, max_rows: u64) -> TokenStream {
        self.dialect().emit_row_limit(max_rows)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dialect().name())
    }
}
