//! The shared compilation algorithm.
//!
//! One call compiles one planned request into one dialect-specific SQL
//! statement:
//!
//! 1. The alias registry is created empty; the fact's table alias is
//!    assigned first.
//! 2. The dimension join compiler registers aliases for every bundle,
//!    then emits one derived-table join per bundle in canonical order.
//! 3. The fact fragment compiler emits the fact SELECT / WHERE /
//!    GROUP BY / HAVING using the registry.
//! 4. The outer projection compiler emits the final column list in
//!    request order.
//! 5. The statement accumulator concatenates everything; a row-limit
//!    clause is appended only for a strictly positive maximum.
//!
//! Compilation is pure and synchronous. Every error is a
//! non-recoverable schema/configuration mismatch: the planner already
//! validated the request, so a failure here signals an internal
//! inconsistency, and no partial SQL is returned.

pub mod context;
pub mod dimension;
pub mod fact;
mod filters;
pub mod projection;
pub mod statement;

pub use context::{AliasRegistry, DimensionAliasEntry};
pub use statement::StatementAccumulator;

use thiserror::Error;
use tracing::debug;

use crate::model::filter::FilterOp;
use crate::model::request::RequestModel;
use crate::planner::{DimensionBundle, FactBestCandidate};
use crate::sql::dialect::{Dialect, SqlDialect};

/// Errors raised during compilation.
///
/// All of these indicate a bug in schema configuration or planner
/// output, not a user-facing condition; retrying cannot succeed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("unknown field alias '{alias}' on '{table}'")]
    UnknownAlias { alias: String, table: String },

    #[error("unknown physical column '{column}' on table '{table}'")]
    UnknownColumn { column: String, table: String },

    #[error("filter field '{field}' resolves to neither a grouping column nor a measure on fact '{fact}'")]
    FilterTargetMismatch { field: String, fact: String },

    #[error("fact '{fact}' has no foreign key for dimension '{dimension}'")]
    MissingForeignKey { fact: String, dimension: String },

    #[error("alias '{0}' is already registered")]
    DuplicateAlias(String),

    #[error("alias '{0}' was referenced before being registered")]
    UnregisteredAlias(String),

    #[error("column '{column}' on '{table}' cannot be used as {position}")]
    UnexpectedColumnKind {
        column: String,
        table: String,
        position: &'static str,
    },

    #[error("filter on '{field}' pairs operator {op:?} with an incompatible operand")]
    FilterOperandMismatch { field: String, op: FilterOp },
}

pub type CompileResult<T> = Result<T, CompileError>;

/// A compiled statement plus the registry downstream layers read.
#[derive(Debug, Clone)]
pub struct CompiledQuery {
    /// The dialect-specific SQL text.
    pub sql: String,

    /// Final alias bookkeeping; read-only from here on.
    pub registry: AliasRegistry,
}

/// Compile one planned request into SQL text.
pub fn compile(
    request: &RequestModel,
    candidate: &FactBestCandidate,
    bundles: &[DimensionBundle],
    dialect: Dialect,
) -> CompileResult<CompiledQuery> {
    debug!(
        fact = %candidate.table.name,
        dimensions = bundles.len(),
        dialect = %dialect,
        "compiling planned query"
    );

    let mut registry = AliasRegistry::new();
    let mut acc = StatementAccumulator::new();

    // The fact owns t0 regardless of how many bundles follow.
    let fact_alias = registry.table_alias_for(&candidate.public.name);

    // Canonical bundle order; join emission order is part of the
    // deterministic-output contract.
    let mut sorted: Vec<&DimensionBundle> = bundles.iter().collect();
    sorted.sort_by(|a, b| a.sort_key().cmp(b.sort_key()));

    // Every bundle's foreign key must be exposed by the fact fragment.
    let mut join_keys: Vec<String> = Vec::new();
    for bundle in &sorted {
        let foreign_key = candidate
            .table
            .foreign_keys
            .get(&bundle.public.name)
            .ok_or_else(|| CompileError::MissingForeignKey {
                fact: candidate.table.name.clone(),
                dimension: bundle.public.name.clone(),
            })?;
        if !join_keys.contains(foreign_key) {
            join_keys.push(foreign_key.clone());
        }
    }

    let inner_join = dimension::requires_inner_join(&sorted)?;

    dimension::compile_dimension_joins(
        request,
        candidate,
        &sorted,
        inner_join,
        &mut registry,
        &mut acc,
        dialect,
    )?;
    fact::compile_fact_fragment(request, candidate, &join_keys, &mut registry, &mut acc, dialect)?;
    projection::compile_outer_projection(request, candidate, &registry, &mut acc, dialect)?;

    let mut statement = acc.assemble(&candidate.table.name, &fact_alias);
    if request.max_rows > 0 {
        statement.space();
        statement.append(&dialect.emit_row_limit(request.max_rows));
    }

    let sql = statement.serialize(dialect);
    debug!(bytes = sql.len(), "compiled statement");

    Ok(CompiledQuery { sql, registry })
}

/// Rendered `<tableAlias>.<columnAlias>` reference for the outer scope.
pub(crate) fn qualified_ref(table_alias: &str, alias: &str, dialect: Dialect) -> String {
    format!(
        "{}.{}",
        dialect.quote_identifier(table_alias),
        dialect.quote_identifier(alias)
    )
}
