//! BigQuery-like SQL dialect.
//!
//! - Backtick identifier quoting
//! - Partition pruning through the `_PARTITIONDATE` pseudo-column
//! - Approximate distinct counts for cardinality rollups

use super::{helpers, PartitionPredicate, SqlDialect};
use crate::model::request::TimeWindow;
use crate::model::table::FactTable;
use crate::model::types::RollupType;
use crate::sql::token::{Token, TokenStream};

/// BigQuery-like SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct BigQuery;

impl SqlDialect for BigQuery {
    fn name(&self) -> &'static str {
        "bigquery"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_backtick(ident)
    }

    fn render_rollup(&self, rollup: RollupType, column: &str) -> TokenStream {
        if rollup == RollupType::CountDistinct {
            let mut ts = TokenStream::new();
            ts.push(Token::FunctionName("APPROX_COUNT_DISTINCT".into()));
            ts.lparen();
            ts.push(Token::Ident(column.into()));
            ts.rparen();
            return ts;
        }
        // ANSI rendering for everything else
        super::Presto.render_rollup(rollup, column)
    }

    fn fact_partition_predicate(
        &self,
        fact: &FactTable,
        window: &TimeWindow,
    ) -> Option<PartitionPredicate> {
        if !fact.is_partitioned() {
            return None;
        }
        // Pseudo-column; never identifier-quoted.
        let mut ts = TokenStream::new();
        ts.push(Token::Raw("_PARTITIONDATE".into()))
            .space()
            .push(Token::Between)
            .space()
            .push(Token::LitDate(window.start.clone()))
            .space()
            .push(Token::And)
            .space()
            .push(Token::LitDate(window.end.clone()));
        Some(PartitionPredicate {
            column: "_PARTITIONDATE".into(),
            predicate: ts,
        })
    }
}
