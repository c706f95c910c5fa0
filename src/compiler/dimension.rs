//! Dimension join compiler - one correlated derived-table join per
//! requested dimension.

use std::collections::{BTreeMap, BTreeSet};

use super::context::AliasRegistry;
use super::filters::render_filter;
use super::statement::StatementAccumulator;
use super::{CompileError, CompileResult};
use crate::model::column::Column;
use crate::model::request::RequestModel;
use crate::planner::{DimensionBundle, FactBestCandidate};
use crate::sql::dialect::{Dialect, SqlDialect};
use crate::sql::token::{Token, TokenStream};

/// Whether the query joins dimensions with INNER instead of LEFT OUTER.
///
/// INNER when any bundle carries a filter that neither targets the
/// dimension's primary-key field nor matches one of its forced filters:
/// such a filter means rows without a dimension match must be excluded.
/// The decision is global to the query, not per bundle.
pub(crate) fn requires_inner_join(bundles: &[&DimensionBundle]) -> CompileResult<bool> {
    for bundle in bundles {
        let mut forced: BTreeSet<&str> = BTreeSet::new();
        for filter in &bundle.public.forced_filters {
            let physical = resolve_field(bundle, &filter.field)?;
            forced.insert(physical);
        }

        for filter in &bundle.filters {
            let physical = resolve_field(bundle, &filter.field)?;
            if physical != bundle.table.primary_key && !forced.contains(physical) {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

/// Compile every bundle, in the given (canonical) order.
///
/// Registration of all column aliases happens before any join text is
/// emitted, because later fragments may reference them.
pub(crate) fn compile_dimension_joins(
    request: &RequestModel,
    candidate: &FactBestCandidate,
    bundles: &[&DimensionBundle],
    inner_join: bool,
    registry: &mut AliasRegistry,
    acc: &mut StatementAccumulator,
    dialect: Dialect,
) -> CompileResult<()> {
    let fact_alias = registry.table_alias_for(&candidate.public.name);

    // Pass 1: aliases.
    for bundle in bundles {
        let table_alias = registry.table_alias_for(&bundle.public.name);
        let pk_alias = registry.primary_key_alias_for(bundle);

        for alias in &bundle.fields {
            let physical = resolve_field(bundle, alias)?;
            let rendered = if physical == bundle.table.primary_key {
                dialect.quote_identifier(&pk_alias)
            } else {
                dialect.quote_identifier(alias)
            };
            registry.set_dimension_column_alias(
                alias,
                rendered,
                &table_alias,
                &bundle.public.name,
            )?;
        }
    }

    // Pass 2: join fragments.
    for bundle in bundles {
        let table_alias = registry.table_alias_for(&bundle.public.name);
        let pk_alias = registry.primary_key_alias_for(bundle);
        let foreign_key = candidate
            .table
            .foreign_keys
            .get(&bundle.public.name)
            .ok_or_else(|| CompileError::MissingForeignKey {
                fact: candidate.table.name.clone(),
                dimension: bundle.public.name.clone(),
            })?;

        let select_items = derived_table_select(bundle, &pk_alias, registry)?;
        let predicates = derived_table_predicates(request, bundle, registry, dialect)?;

        let mut join = TokenStream::new();
        if inner_join {
            join.push(Token::Inner);
        } else {
            join.push(Token::Left).space().push(Token::Outer);
        }
        join.space().push(Token::Join).space();

        join.lparen();
        join.push(Token::Select).space();
        for (i, item) in select_items.iter().enumerate() {
            if i > 0 {
                join.comma().space();
            }
            join.append(item);
        }
        join.space()
            .push(Token::From)
            .space()
            .push(Token::Ident(bundle.table.name.clone()));
        if !predicates.is_empty() {
            join.space().push(Token::Where).space();
            for (i, predicate) in predicates.iter().enumerate() {
                if i > 0 {
                    join.space().push(Token::And).space();
                }
                join.append(predicate);
            }
        }
        join.rparen();

        join.space()
            .push(Token::As)
            .space()
            .push(Token::Ident(table_alias.clone()));

        join.space()
            .push(Token::On)
            .space()
            .push(Token::Ident(fact_alias.clone()))
            .push(Token::Dot)
            .push(Token::Ident(foreign_key.clone()))
            .space()
            .push(Token::Eq)
            .space()
            .push(Token::Ident(table_alias.clone()))
            .push(Token::Dot)
            .push(Token::Ident(pk_alias.clone()));

        acc.push_join(join);
    }

    Ok(())
}

/// The derived table's select list. The primary key always comes first
/// under its deterministic alias, so the join predicate can resolve;
/// requested fields follow in bundle order.
fn derived_table_select(
    bundle: &DimensionBundle,
    pk_alias: &str,
    registry: &AliasRegistry,
) -> CompileResult<Vec<TokenStream>> {
    let mut items = Vec::new();

    let mut pk_item = TokenStream::new();
    pk_item
        .push(Token::Ident(bundle.table.primary_key.clone()))
        .space()
        .push(Token::As)
        .space()
        .push(Token::Ident(pk_alias.to_string()));
    items.push(pk_item);

    for alias in &bundle.fields {
        let physical = resolve_field(bundle, alias)?;
        if physical == bundle.table.primary_key {
            // already served by the primary-key item
            continue;
        }

        let column = lookup_column(bundle, physical)?;
        let mut item = attribute_tokens(bundle, column, physical)?;

        let rendered_alias = registry.dimension_column_rendered_name(alias)?.to_string();
        item.space()
            .push(Token::As)
            .space()
            .push(Token::Raw(rendered_alias));
        items.push(item);
    }

    Ok(items)
}

/// Bundle filters in caller order, then the dialect's partition snapshot
/// predicate. Empty filter sets yield no WHERE clause.
fn derived_table_predicates(
    request: &RequestModel,
    bundle: &DimensionBundle,
    registry: &mut AliasRegistry,
    dialect: Dialect,
) -> CompileResult<Vec<TokenStream>> {
    let mut predicates = Vec::new();

    for filter in &bundle.filters {
        let physical = resolve_field(bundle, &filter.field)?;
        let column = lookup_column(bundle, physical)?;
        let lhs = attribute_tokens(bundle, column, physical)?;
        predicates.push(render_filter(lhs, filter)?);
    }

    if let Some(partition) = dialect.dimension_partition_predicate(&bundle.table, &request.window)
    {
        registry.record_partition_column(partition.column);
        predicates.push(partition.predicate);
    }

    Ok(predicates)
}

/// Render a dimension attribute column: physical columns by name,
/// derived columns by expanding their expression.
fn attribute_tokens(
    bundle: &DimensionBundle,
    column: &Column,
    physical: &str,
) -> CompileResult<TokenStream> {
    match column {
        Column::PhysicalDim { name, .. } => {
            let mut ts = TokenStream::new();
            ts.push(Token::Ident(name.clone()));
            Ok(ts)
        }
        Column::DerivedDim { expr, .. } => Ok(expr.substitute(&BTreeMap::new()).to_tokens()),
        Column::PhysicalFact { .. } | Column::DerivedFact { .. } => {
            Err(CompileError::UnexpectedColumnKind {
                column: physical.to_string(),
                table: bundle.table.name.clone(),
                position: "a dimension attribute",
            })
        }
    }
}

fn resolve_field<'a>(bundle: &'a DimensionBundle, alias: &str) -> CompileResult<&'a str> {
    bundle
        .public
        .physical_name(alias)
        .ok_or_else(|| CompileError::UnknownAlias {
            alias: alias.to_string(),
            table: bundle.public.name.clone(),
        })
}

fn lookup_column<'a>(bundle: &'a DimensionBundle, name: &str) -> CompileResult<&'a Column> {
    bundle
        .table
        .columns
        .get(name)
        .ok_or_else(|| CompileError::UnknownColumn {
            column: name.to_string(),
            table: bundle.table.name.clone(),
        })
}
