use std::collections::BTreeMap;

use quarry::model::{BinaryOp, ColumnExpr};
use quarry::sql::dialect::Dialect;

fn bindings(pairs: Vec<(&str, ColumnExpr)>) -> BTreeMap<String, ColumnExpr> {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

#[test]
fn test_substitution_is_structural() {
    let net = ColumnExpr::binary(
        ColumnExpr::column("gross"),
        BinaryOp::Sub,
        ColumnExpr::column("tax"),
    );
    let margin = ColumnExpr::binary(
        ColumnExpr::column("net"),
        BinaryOp::Div,
        ColumnExpr::column("gross"),
    );

    let expanded = margin.substitute(&bindings(vec![("net", net.clone())]));

    assert_eq!(
        expanded,
        ColumnExpr::binary(net, BinaryOp::Div, ColumnExpr::column("gross"))
    );
}

#[test]
fn test_unbound_refs_stay_as_plain_columns() {
    let expr = ColumnExpr::func("year", vec![ColumnExpr::column("day")]);
    let expanded = expr.substitute(&BTreeMap::new());

    assert_eq!(expanded, expr);
    assert_eq!(expanded.to_tokens().serialize(Dialect::Presto), "YEAR(\"day\")");
}

#[test]
fn test_substitution_reaches_function_args() {
    let expr = ColumnExpr::func("coalesce", vec![ColumnExpr::column("score"), ColumnExpr::int(0)]);
    let expanded = expr.substitute(&bindings(vec![(
        "score",
        ColumnExpr::func("sum", vec![ColumnExpr::column("raw_score")]),
    )]));

    assert_eq!(
        expanded.to_tokens().serialize(Dialect::Presto),
        "COALESCE(SUM(\"raw_score\"), 0)"
    );
}

#[test]
fn test_nested_binary_ops_are_fully_parenthesized() {
    let expr = ColumnExpr::binary(
        ColumnExpr::binary(
            ColumnExpr::column("a"),
            BinaryOp::Add,
            ColumnExpr::column("b"),
        ),
        BinaryOp::Mul,
        ColumnExpr::column("c"),
    );

    assert_eq!(
        expr.to_tokens().serialize(Dialect::Presto),
        "((\"a\" + \"b\") * \"c\")"
    );
}

#[test]
fn test_float_literal_rendering() {
    let expr = ColumnExpr::binary(
        ColumnExpr::column("marks"),
        BinaryOp::Mul,
        ColumnExpr::float(0.5),
    );

    assert_eq!(
        expr.to_tokens().serialize(Dialect::Presto),
        "(\"marks\" * 0.5)"
    );
}

#[test]
fn test_identifier_quoting_follows_dialect() {
    let expr = ColumnExpr::column("day");
    assert_eq!(expr.to_tokens().serialize(Dialect::Presto), "\"day\"");
    assert_eq!(expr.to_tokens().serialize(Dialect::Hive), "`day`");
    assert_eq!(expr.to_tokens().serialize(Dialect::BigQuery), "`day`");
}
