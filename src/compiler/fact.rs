//! Fact fragment compiler - derives the fact table's SELECT, WHERE,
//! GROUP BY, and HAVING.

use std::collections::{BTreeMap, BTreeSet};

use super::context::AliasRegistry;
use super::filters::render_filter;
use super::statement::StatementAccumulator;
use super::{qualified_ref, CompileError, CompileResult};
use crate::model::column::Column;
use crate::model::expr::ColumnExpr;
use crate::model::filter::Filter;
use crate::model::request::RequestModel;
use crate::planner::FactBestCandidate;
use crate::sql::dialect::{Dialect, SqlDialect};
use crate::sql::token::{Token, TokenStream};

/// Compile the fact fragment into the accumulator, registering every
/// fact-served output alias on the way.
pub(crate) fn compile_fact_fragment(
    request: &RequestModel,
    candidate: &FactBestCandidate,
    join_keys: &[String],
    registry: &mut AliasRegistry,
    acc: &mut StatementAccumulator,
    dialect: Dialect,
) -> CompileResult<()> {
    let fact_alias = registry.table_alias_for(&candidate.public.name);

    compile_grouping_fields(candidate, &fact_alias, registry, acc, dialect)?;
    compile_measure_fields(candidate, &fact_alias, registry, acc, dialect)?;

    // The outer statement joins against this fragment, so every join key
    // must be selected and grouped here.
    for key in join_keys {
        if !candidate.table.columns.contains_key(key) {
            return Err(CompileError::UnknownColumn {
                column: key.clone(),
                table: candidate.table.name.clone(),
            });
        }
        let mut ts = TokenStream::new();
        ts.push(Token::Ident(key.clone()));
        acc.push_select(ts.clone());
        acc.push_group_by(ts);
    }

    compile_time_predicate(request, candidate, registry, acc, dialect);
    compile_filters(candidate, acc, dialect)?;

    Ok(())
}

/// Requested dimension columns stored on the fact table. Non-aggregated
/// ones contribute exactly one GROUP BY entry each.
fn compile_grouping_fields(
    candidate: &FactBestCandidate,
    fact_alias: &str,
    registry: &mut AliasRegistry,
    acc: &mut StatementAccumulator,
    dialect: Dialect,
) -> CompileResult<()> {
    for field in &candidate.dimension_fields {
        let column = lookup_column(candidate, &field.column)?;

        let (rendered, group_entry) = match column {
            Column::PhysicalDim {
                name,
                static_mapping,
                ..
            } => {
                let ts = match static_mapping {
                    Some(mapping) => dialect.render_static_mapping(name, mapping),
                    None => {
                        let mut ts = TokenStream::new();
                        ts.push(Token::Ident(name.clone()));
                        ts
                    }
                };
                (ts.clone(), Some(ts))
            }

            Column::DerivedDim {
                expr, aggregate, ..
            } => {
                let ts = expr.substitute(&BTreeMap::new()).to_tokens();
                let group_entry = if *aggregate { None } else { Some(ts.clone()) };
                (ts, group_entry)
            }

            Column::PhysicalFact { .. } | Column::DerivedFact { .. } => {
                return Err(CompileError::UnexpectedColumnKind {
                    column: field.column.clone(),
                    table: candidate.table.name.clone(),
                    position: "a grouping column",
                });
            }
        };

        let mut item = rendered;
        item.space()
            .push(Token::As)
            .space()
            .push(Token::Ident(field.alias.clone()));
        acc.push_select(item);

        if let Some(entry) = group_entry {
            acc.push_group_by(entry);
        }

        registry.register_outer_alias(
            &field.alias,
            qualified_ref(fact_alias, &field.alias, dialect),
        )?;
    }

    Ok(())
}

/// Requested measure columns. Non-derived ones render directly; derived
/// ones render as one batch, with bindings accumulating in field order
/// so an expression can reference an earlier derived measure.
fn compile_measure_fields(
    candidate: &FactBestCandidate,
    fact_alias: &str,
    registry: &mut AliasRegistry,
    acc: &mut StatementAccumulator,
    dialect: Dialect,
) -> CompileResult<()> {
    let mut derived: Vec<(&str, &str, &ColumnExpr)> = Vec::new();

    for field in &candidate.measure_fields {
        let column = lookup_column(candidate, &field.column)?;

        match column {
            Column::PhysicalFact { name, rollup, .. } => {
                let mut item = dialect.render_rollup(*rollup, name);
                item.space()
                    .push(Token::As)
                    .space()
                    .push(Token::Ident(field.alias.clone()));
                acc.push_select(item);
                registry.register_outer_alias(
                    &field.alias,
                    qualified_ref(fact_alias, &field.alias, dialect),
                )?;
            }

            Column::DerivedFact { name, expr, .. } => {
                derived.push((field.alias.as_str(), name.as_str(), expr));
            }

            Column::PhysicalDim { .. } | Column::DerivedDim { .. } => {
                return Err(CompileError::UnexpectedColumnKind {
                    column: field.column.clone(),
                    table: candidate.table.name.clone(),
                    position: "a measure",
                });
            }
        }
    }

    let mut bindings: BTreeMap<String, ColumnExpr> = BTreeMap::new();
    for (alias, name, expr) in derived {
        let expanded = expr.substitute(&bindings);
        let mut item = expanded.to_tokens();
        bindings.insert(name.to_string(), expanded);

        item.space()
            .push(Token::As)
            .space()
            .push(Token::Ident(alias.to_string()));
        acc.push_select(item);
        registry.register_outer_alias(alias, qualified_ref(fact_alias, alias, dialect))?;
    }

    Ok(())
}

/// Exactly one time predicate: the partition predicate when the fact is
/// partitioned and the dialect produces one, the day-range predicate
/// otherwise. Never both.
fn compile_time_predicate(
    request: &RequestModel,
    candidate: &FactBestCandidate,
    registry: &mut AliasRegistry,
    acc: &mut StatementAccumulator,
    dialect: Dialect,
) {
    if candidate.table.is_partitioned() && request.flags.allow_partition_pruning {
        if let Some(partition) = dialect.fact_partition_predicate(&candidate.table, &request.window)
        {
            registry.record_partition_column(partition.column);
            acc.push_where(partition.predicate);
            return;
        }
    }
    acc.push_where(dialect.day_range_predicate(&candidate.table.time_column, &request.window));
}

/// Candidate filters plus forced filters, deduplicated and classified.
///
/// An explicit filter on a physical field drops the forced filter for
/// that field: explicit intent wins, forced filters only fill gaps. The
/// surviving set sorts lexicographically by field before rendering.
fn compile_filters(
    candidate: &FactBestCandidate,
    acc: &mut StatementAccumulator,
    dialect: Dialect,
) -> CompileResult<()> {
    let explicit: BTreeSet<&str> = candidate.filters.iter().map(|f| f.field.as_str()).collect();

    let mut merged: Vec<Filter> = candidate.filters.clone();
    for forced in &candidate.public.forced_filters {
        let physical = candidate.public.physical_name(&forced.field).ok_or_else(|| {
            CompileError::UnknownAlias {
                alias: forced.field.clone(),
                table: candidate.public.name.clone(),
            }
        })?;
        if explicit.contains(physical) {
            continue;
        }
        let mut filter = forced.clone();
        filter.field = physical.to_string();
        merged.push(filter);
    }

    merged.sort_by(|a, b| a.field.cmp(&b.field));

    for filter in &merged {
        let column = candidate.table.columns.get(&filter.field).ok_or_else(|| {
            CompileError::FilterTargetMismatch {
                field: filter.field.clone(),
                fact: candidate.table.name.clone(),
            }
        })?;

        match column {
            // Dimension columns on the fact restrict rows before
            // aggregation.
            Column::PhysicalDim { name, .. } => {
                let mut lhs = TokenStream::new();
                lhs.push(Token::Ident(name.clone()));
                acc.push_where(render_filter(lhs, filter)?);
            }
            Column::DerivedDim { expr, .. } => {
                let lhs = expr.substitute(&BTreeMap::new()).to_tokens();
                acc.push_where(render_filter(lhs, filter)?);
            }

            // Measure columns restrict aggregated rows.
            Column::PhysicalFact { name, rollup, .. } => {
                let lhs = dialect.render_rollup(*rollup, name);
                acc.push_having(render_filter(lhs, filter)?);
            }
            Column::DerivedFact { expr, .. } => {
                let lhs = expr.substitute(&BTreeMap::new()).to_tokens();
                acc.push_having(render_filter(lhs, filter)?);
            }
        }
    }

    Ok(())
}

fn lookup_column<'a>(
    candidate: &'a FactBestCandidate,
    name: &str,
) -> CompileResult<&'a Column> {
    candidate
        .table
        .columns
        .get(name)
        .ok_or_else(|| CompileError::UnknownColumn {
            column: name.to_string(),
            table: candidate.table.name.clone(),
        })
}
