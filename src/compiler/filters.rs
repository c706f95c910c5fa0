//! Shared filter-predicate rendering.

use super::{CompileError, CompileResult};
use crate::model::filter::{Filter, FilterOp, FilterValue};
use crate::sql::token::{Token, TokenStream};

/// Render a filter as `<lhs> <op> <operands>`.
///
/// The left-hand side arrives already rendered for the column the field
/// resolved to (plain name, rollup, or expanded expression). Operator
/// and operand shape must agree; a mismatch is a configuration error.
pub(crate) fn render_filter(lhs: TokenStream, filter: &Filter) -> CompileResult<TokenStream> {
    let mut ts = lhs;

    match (filter.op, &filter.value) {
        (FilterOp::Eq, FilterValue::Scalar(lit)) => {
            ts.space().push(Token::Eq).space().push(lit.to_token());
        }
        (FilterOp::Ne, FilterValue::Scalar(lit)) => {
            ts.space().push(Token::Ne).space().push(lit.to_token());
        }
        (FilterOp::Lt, FilterValue::Scalar(lit)) => {
            ts.space().push(Token::Lt).space().push(lit.to_token());
        }
        (FilterOp::Lte, FilterValue::Scalar(lit)) => {
            ts.space().push(Token::Lte).space().push(lit.to_token());
        }
        (FilterOp::Gt, FilterValue::Scalar(lit)) => {
            ts.space().push(Token::Gt).space().push(lit.to_token());
        }
        (FilterOp::Gte, FilterValue::Scalar(lit)) => {
            ts.space().push(Token::Gte).space().push(lit.to_token());
        }

        (FilterOp::In, FilterValue::List(lits)) | (FilterOp::NotIn, FilterValue::List(lits)) => {
            if lits.is_empty() {
                return Err(CompileError::FilterOperandMismatch {
                    field: filter.field.clone(),
                    op: filter.op,
                });
            }
            ts.space();
            if filter.op == FilterOp::NotIn {
                ts.push(Token::Not).space();
            }
            ts.push(Token::In).space().lparen();
            for (i, lit) in lits.iter().enumerate() {
                if i > 0 {
                    ts.comma().space();
                }
                ts.push(lit.to_token());
            }
            ts.rparen();
        }

        (FilterOp::Between, FilterValue::Range(low, high)) => {
            ts.space()
                .push(Token::Between)
                .space()
                .push(low.to_token())
                .space()
                .push(Token::And)
                .space()
                .push(high.to_token());
        }

        (FilterOp::Like, FilterValue::Scalar(lit)) => {
            ts.space().push(Token::Like).space().push(lit.to_token());
        }

        _ => {
            return Err(CompileError::FilterOperandMismatch {
                field: filter.field.clone(),
                op: filter.op,
            });
        }
    }

    Ok(ts)
}
