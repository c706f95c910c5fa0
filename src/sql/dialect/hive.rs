//! Hive-like SQL dialect.
//!
//! - Backtick identifier quoting
//! - Dates stored and compared as plain `YYYY-MM-DD` strings
//! - Day-partitioned tables carry a `dt` partition column; dimension
//!   snapshots are selected as of the window's end date

use super::{helpers, PartitionPredicate, SqlDialect};
use crate::model::request::TimeWindow;
use crate::model::table::{DimensionTable, FactTable};
use crate::sql::token::{Token, TokenStream};

/// Partition column used by day-partitioned Hive tables.
const PARTITION_COLUMN: &str = "dt";

/// Hive-like SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Hive;

impl SqlDialect for Hive {
    fn name(&self) -> &'static str {
        "hive"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_backtick(ident)
    }

    fn format_date_literal(&self, date: &str) -> String {
        helpers::quote_string_single(date)
    }

    fn fact_partition_predicate(
        &self,
        fact: &FactTable,
        window: &TimeWindow,
    ) -> Option<PartitionPredicate> {
        if !fact.is_partitioned() {
            return None;
        }
        let mut ts = TokenStream::new();
        ts.push(Token::Ident(PARTITION_COLUMN.into()))
            .space()
            .push(Token::Gte)
            .space()
            .push(Token::LitString(window.start.clone()))
            .space()
            .push(Token::And)
            .space()
            .push(Token::Ident(PARTITION_COLUMN.into()))
            .space()
            .push(Token::Lte)
            .space()
            .push(Token::LitString(window.end.clone()));
        Some(PartitionPredicate {
            column: PARTITION_COLUMN.into(),
            predicate: ts,
        })
    }

    fn dimension_partition_predicate(
        &self,
        dim: &DimensionTable,
        window: &TimeWindow,
    ) -> Option<PartitionPredicate> {
        if !dim.is_partitioned() {
            return None;
        }
        // Snapshot as of the window's end date.
        let mut ts = TokenStream::new();
        ts.push(Token::Ident(PARTITION_COLUMN.into()))
            .space()
            .push(Token::Eq)
            .space()
            .push(Token::LitString(window.end.clone()));
        Some(PartitionPredicate {
            column: PARTITION_COLUMN.into(),
            predicate: ts,
        })
    }
}
