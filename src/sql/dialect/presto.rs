//! Presto-like SQL dialect.
//!
//! Closest to ANSI of the supported engines: double-quoted identifiers,
//! `DATE '...'` literals, no partition pruning predicates (the connector
//! prunes from the day-range predicate itself).

use super::{helpers, SqlDialect};

/// Presto-like SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Presto;

impl SqlDialect for Presto {
    fn name(&self) -> &'static str {
        "presto"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }
}
