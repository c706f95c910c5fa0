use std::collections::BTreeMap;

use quarry::compiler::{compile, CompileError};
use quarry::model::{
    Annotation, BinaryOp, Column, ColumnExpr, DataType, FactTable, Filter, FilterOp, FilterValue,
    Literal, PublicFact, RequestModel, TimeWindow,
};
use quarry::model::RollupType;
use quarry::planner::{CostEstimate, FactBestCandidate, ResolvedField};
use quarry::sql::dialect::Dialect;

fn status_mapping() -> BTreeMap<String, String> {
    let mut mapping = BTreeMap::new();
    mapping.insert("0".to_string(), "inactive".to_string());
    mapping.insert("1".to_string(), "active".to_string());
    mapping
}

fn fact_table() -> FactTable {
    FactTable::new("student_performance", "day")
        .with_column(Column::PhysicalDim {
            name: "student_id".into(),
            data_type: DataType::Int,
            static_mapping: None,
        })
        .with_column(Column::PhysicalDim {
            name: "day".into(),
            data_type: DataType::Date,
            static_mapping: None,
        })
        .with_column(Column::PhysicalDim {
            name: "region".into(),
            data_type: DataType::String,
            static_mapping: None,
        })
        .with_column(Column::PhysicalDim {
            name: "status".into(),
            data_type: DataType::String,
            static_mapping: Some(status_mapping()),
        })
        .with_column(Column::PhysicalFact {
            name: "total_marks".into(),
            data_type: DataType::Int,
            rollup: RollupType::Sum,
        })
        .with_column(Column::DerivedFact {
            name: "avg_marks".into(),
            expr: ColumnExpr::binary(
                ColumnExpr::func("sum", vec![ColumnExpr::column("total_marks")]),
                BinaryOp::Div,
                ColumnExpr::func("count", vec![ColumnExpr::column("student_id")]),
            ),
            aggregate: true,
        })
        .with_column(Column::DerivedFact {
            name: "double_avg".into(),
            expr: ColumnExpr::binary(
                ColumnExpr::column("avg_marks"),
                BinaryOp::Mul,
                ColumnExpr::int(2),
            ),
            aggregate: true,
        })
        .with_column(Column::DerivedDim {
            name: "exam_year".into(),
            expr: ColumnExpr::func("year", vec![ColumnExpr::column("day")]),
            aggregate: false,
        })
        .with_column(Column::DerivedDim {
            name: "latest_day".into(),
            expr: ColumnExpr::func("max", vec![ColumnExpr::column("day")]),
            aggregate: true,
        })
}

fn public_fact() -> PublicFact {
    PublicFact::new("student_performance", 1)
        .with_alias("Student ID", "student_id")
        .with_alias("Day", "day")
        .with_alias("Region", "region")
        .with_alias("Status", "status")
        .with_alias("Total Marks", "total_marks")
        .with_alias("Avg Marks", "avg_marks")
        .with_alias("Double Avg", "double_avg")
        .with_alias("Exam Year", "exam_year")
        .with_alias("Latest Day", "latest_day")
}

fn candidate(
    public: PublicFact,
    table: FactTable,
    dimension_fields: Vec<ResolvedField>,
    measure_fields: Vec<ResolvedField>,
    filters: Vec<Filter>,
) -> FactBestCandidate {
    FactBestCandidate {
        public,
        table,
        filters,
        dimension_fields,
        measure_fields,
        duplicate_aliases: BTreeMap::new(),
        cost: CostEstimate {
            estimated_rows: 50_000,
            estimated_bytes: 4 << 20,
        },
    }
}

fn request(fields: Vec<&str>) -> RequestModel {
    RequestModel::new(
        fields.into_iter().map(String::from).collect(),
        TimeWindow::new("2024-01-01", "2024-01-31"),
    )
}

#[test]
fn test_group_by_derivation() {
    let c = candidate(
        public_fact(),
        fact_table(),
        vec![
            ResolvedField::new("Status", "status"),
            ResolvedField::new("Exam Year", "exam_year"),
        ],
        vec![ResolvedField::new("Total Marks", "total_marks")],
        vec![],
    );
    let out = compile(
        &request(vec!["Status", "Exam Year", "Total Marks"]),
        &c,
        &[],
        Dialect::Presto,
    )
    .unwrap();

    // static-mapped grouping column groups by the mapped rendering;
    // derived grouping column groups by its expanded expression
    assert!(out.sql.contains(
        "GROUP BY CASE \"status\" WHEN '0' THEN 'inactive' WHEN '1' THEN 'active' \
         ELSE \"status\" END, YEAR(\"day\")) AS \"t0\""
    ));
    assert!(out
        .sql
        .contains("SUM(\"total_marks\") AS \"Total Marks\""));
}

#[test]
fn test_aggregated_derived_column_contributes_no_group_entry() {
    let c = candidate(
        public_fact(),
        fact_table(),
        vec![
            ResolvedField::new("Status", "status"),
            ResolvedField::new("Latest Day", "latest_day"),
        ],
        vec![],
        vec![],
    );
    let out = compile(&request(vec!["Status", "Latest Day"]), &c, &[], Dialect::Presto).unwrap();

    assert!(out.sql.contains("MAX(\"day\") AS \"Latest Day\""));
    assert!(out.sql.contains(
        "GROUP BY CASE \"status\" WHEN '0' THEN 'inactive' WHEN '1' THEN 'active' \
         ELSE \"status\" END) AS \"t0\""
    ));
}

#[test]
fn test_explicit_filter_drops_forced_duplicate() {
    // forced filter targets the same physical field with a different
    // operator; explicit intent wins
    let public = public_fact().with_forced_filter(Filter::new(
        "Student ID",
        FilterOp::Gte,
        FilterValue::Scalar(Literal::Int(100)),
    ));
    let c = candidate(
        public,
        fact_table(),
        vec![ResolvedField::new("Student ID", "student_id")],
        vec![ResolvedField::new("Total Marks", "total_marks")],
        vec![Filter::eq("student_id", Literal::Int(213))],
    );
    let out = compile(
        &request(vec!["Student ID", "Total Marks"]),
        &c,
        &[],
        Dialect::Presto,
    )
    .unwrap();

    assert!(out.sql.contains("\"student_id\" = 213"));
    assert!(!out.sql.contains(">= 100"));
    assert_eq!(out.sql.matches("\"student_id\" =").count(), 1);
}

#[test]
fn test_forced_filter_fills_gap_and_ordering_is_lexicographic() {
    let public = public_fact().with_forced_filter(Filter::eq("Region", Literal::String("US".into())));
    let c = candidate(
        public,
        fact_table(),
        vec![ResolvedField::new("Student ID", "student_id")],
        vec![ResolvedField::new("Total Marks", "total_marks")],
        vec![Filter::eq("student_id", Literal::Int(213))],
    );
    let out = compile(
        &request(vec!["Student ID", "Total Marks"]),
        &c,
        &[],
        Dialect::Presto,
    )
    .unwrap();

    // day-range first, then filters sorted by field: region < student_id
    assert!(out.sql.contains(
        "WHERE \"day\" BETWEEN DATE '2024-01-01' AND DATE '2024-01-31' \
         AND \"region\" = 'US' AND \"student_id\" = 213"
    ));
}

#[test]
fn test_having_absent_without_measure_filter() {
    let c = candidate(
        public_fact(),
        fact_table(),
        vec![ResolvedField::new("Student ID", "student_id")],
        vec![ResolvedField::new("Total Marks", "total_marks")],
        vec![Filter::eq("student_id", Literal::Int(213))],
    );
    let out = compile(
        &request(vec!["Student ID", "Total Marks"]),
        &c,
        &[],
        Dialect::Presto,
    )
    .unwrap();

    assert!(!out.sql.contains("HAVING"));
}

#[test]
fn test_measure_filter_lands_in_having() {
    let c = candidate(
        public_fact(),
        fact_table(),
        vec![ResolvedField::new("Student ID", "student_id")],
        vec![ResolvedField::new("Total Marks", "total_marks")],
        vec![
            Filter::eq("student_id", Literal::Int(213)),
            Filter::new(
                "total_marks",
                FilterOp::Gt,
                FilterValue::Scalar(Literal::Int(50)),
            ),
        ],
    );
    let out = compile(
        &request(vec!["Student ID", "Total Marks"]),
        &c,
        &[],
        Dialect::Presto,
    )
    .unwrap();

    assert!(out
        .sql
        .contains("HAVING SUM(\"total_marks\") > 50) AS \"t0\""));
    // the grouping filter stays in WHERE
    assert!(out.sql.contains("AND \"student_id\" = 213 GROUP BY"));
}

#[test]
fn test_forced_measure_filter_also_lands_in_having() {
    let public = public_fact().with_forced_filter(Filter::new(
        "Total Marks",
        FilterOp::Gt,
        FilterValue::Scalar(Literal::Int(0)),
    ));
    let c = candidate(
        public,
        fact_table(),
        vec![ResolvedField::new("Student ID", "student_id")],
        vec![ResolvedField::new("Total Marks", "total_marks")],
        vec![],
    );
    let out = compile(
        &request(vec!["Student ID", "Total Marks"]),
        &c,
        &[],
        Dialect::Presto,
    )
    .unwrap();

    assert!(out.sql.contains("HAVING SUM(\"total_marks\") > 0"));
}

#[test]
fn test_like_filter() {
    let c = candidate(
        public_fact(),
        fact_table(),
        vec![ResolvedField::new("Region", "region")],
        vec![ResolvedField::new("Total Marks", "total_marks")],
        vec![Filter::new(
            "region",
            FilterOp::Like,
            FilterValue::Scalar(Literal::String("U%".into())),
        )],
    );
    let out = compile(
        &request(vec!["Region", "Total Marks"]),
        &c,
        &[],
        Dialect::Presto,
    )
    .unwrap();

    assert!(out.sql.contains("\"region\" LIKE 'U%'"));
}

#[test]
fn test_partition_predicate_replaces_day_range() {
    let c = candidate(
        public_fact(),
        fact_table().with_annotation(Annotation::Partitioned),
        vec![ResolvedField::new("Student ID", "student_id")],
        vec![ResolvedField::new("Total Marks", "total_marks")],
        vec![],
    );
    let out = compile(
        &request(vec!["Student ID", "Total Marks"]),
        &c,
        &[],
        Dialect::BigQuery,
    )
    .unwrap();

    assert!(out
        .sql
        .contains("_PARTITIONDATE BETWEEN DATE '2024-01-01' AND DATE '2024-01-31'"));
    assert!(!out.sql.contains("`day` BETWEEN"));
    assert_eq!(out.registry.partition_columns(), ["_PARTITIONDATE".to_string()]);
}

#[test]
fn test_day_range_when_dialect_has_no_partition_scheme() {
    // the fact is partitioned but the Presto-like engine prunes from the
    // day-range predicate itself
    let c = candidate(
        public_fact(),
        fact_table().with_annotation(Annotation::Partitioned),
        vec![ResolvedField::new("Student ID", "student_id")],
        vec![ResolvedField::new("Total Marks", "total_marks")],
        vec![],
    );
    let out = compile(
        &request(vec!["Student ID", "Total Marks"]),
        &c,
        &[],
        Dialect::Presto,
    )
    .unwrap();

    assert!(out
        .sql
        .contains("WHERE \"day\" BETWEEN DATE '2024-01-01' AND DATE '2024-01-31'"));
    assert!(out.registry.partition_columns().is_empty());
}

#[test]
fn test_partition_pruning_flag_falls_back_to_day_range() {
    let c = candidate(
        public_fact(),
        fact_table().with_annotation(Annotation::Partitioned),
        vec![ResolvedField::new("Student ID", "student_id")],
        vec![ResolvedField::new("Total Marks", "total_marks")],
        vec![],
    );
    let mut req = request(vec!["Student ID", "Total Marks"]);
    req.flags.allow_partition_pruning = false;

    let out = compile(&req, &c, &[], Dialect::BigQuery).unwrap();

    assert!(out
        .sql
        .contains("WHERE `day` BETWEEN DATE '2024-01-01' AND DATE '2024-01-31'"));
    assert!(!out.sql.contains("_PARTITIONDATE"));
}

#[test]
fn test_derived_measures_render_as_one_batch() {
    let c = candidate(
        public_fact(),
        fact_table(),
        vec![],
        vec![
            ResolvedField::new("Avg Marks", "avg_marks"),
            ResolvedField::new("Double Avg", "double_avg"),
        ],
        vec![],
    );
    let out = compile(
        &request(vec!["Avg Marks", "Double Avg"]),
        &c,
        &[],
        Dialect::Presto,
    )
    .unwrap();

    assert!(out.sql.contains(
        "(SUM(\"total_marks\") / COUNT(\"student_id\")) AS \"Avg Marks\""
    ));
    // the second derived measure expands through the first
    assert!(out.sql.contains(
        "((SUM(\"total_marks\") / COUNT(\"student_id\")) * 2) AS \"Double Avg\""
    ));
}

#[test]
fn test_filter_on_unknown_field_is_schema_mismatch() {
    let c = candidate(
        public_fact(),
        fact_table(),
        vec![ResolvedField::new("Student ID", "student_id")],
        vec![],
        vec![Filter::eq("mystery", Literal::Int(1))],
    );
    let err = compile(&request(vec!["Student ID"]), &c, &[], Dialect::Presto).unwrap_err();

    assert!(matches!(err, CompileError::FilterTargetMismatch { .. }));
}

#[test]
fn test_measure_in_grouping_position_is_rejected() {
    let c = candidate(
        public_fact(),
        fact_table(),
        vec![ResolvedField::new("Total Marks", "total_marks")],
        vec![],
        vec![],
    );
    let err = compile(&request(vec!["Total Marks"]), &c, &[], Dialect::Presto).unwrap_err();

    assert!(matches!(
        err,
        CompileError::UnexpectedColumnKind {
            position: "a grouping column",
            ..
        }
    ));
}

#[test]
fn test_grouping_column_in_measure_position_is_rejected() {
    let c = candidate(
        public_fact(),
        fact_table(),
        vec![],
        vec![ResolvedField::new("Region", "region")],
        vec![],
    );
    let err = compile(&request(vec!["Region"]), &c, &[], Dialect::Presto).unwrap_err();

    assert!(matches!(
        err,
        CompileError::UnexpectedColumnKind {
            position: "a measure",
            ..
        }
    ));
}
