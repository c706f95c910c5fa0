//! Outer projection compiler - the final top-level column list.

use super::context::AliasRegistry;
use super::statement::StatementAccumulator;
use super::CompileResult;
use crate::model::request::RequestModel;
use crate::planner::FactBestCandidate;
use crate::sql::dialect::{Dialect, SqlDialect};

/// Emit one outer column per requested alias, in request order.
///
/// Order is load-bearing: downstream row assembly and pagination assume
/// projection order equals request order. A duplicate alias resolves to
/// its canonical alias' source, so the value is computed once and copied
/// under the second name.
pub(crate) fn compile_outer_projection(
    request: &RequestModel,
    candidate: &FactBestCandidate,
    registry: &AliasRegistry,
    acc: &mut StatementAccumulator,
    dialect: Dialect,
) -> CompileResult<()> {
    for alias in &request.fields {
        let target = candidate
            .duplicate_aliases
            .get(alias)
            .map(String::as_str)
            .unwrap_or(alias);

        let source = registry.outer_source(target, dialect)?;
        acc.push_outer_column(dialect.render_outer_column(&source, alias));
    }

    Ok(())
}
