//! Integration tests for table construction and transforms.

use indexmap::IndexMap;
use rowboat::{CellValue, Table, TableError};

/// Helper to build a small people table used across tests.
fn people_table() -> Table {
    Table::new(
        vec!["name".to_string(), "age".to_string(), "score".to_string()],
        vec![
            vec!["Alice".into(), 30.into(), 90.5.into()],
            vec!["Bob".into(), 25.into(), 85.0.into()],
            vec!["Carol".into(), 28.into(), 92.25.into()],
        ],
    )
    .expect("table construction failed")
}

// =============================================================================
// Construction and Access
// =============================================================================

#[test]
fn test_construction_and_access() {
    let table = people_table();

    assert_eq!(table.column_count(), 3);
    assert_eq!(table.row_count(), 3);
    assert_eq!(table.get::<String>(0, "name").unwrap(), "Alice");
    assert_eq!(table.get::<i64>(1, "age").unwrap(), 25);
    assert_eq!(table.get::<f64>(2, "score").unwrap(), 92.25);
}

#[test]
fn test_unknown_column_is_rejected() {
    let table = people_table();
    assert!(matches!(
        table.value(0, "height"),
        Err(TableError::UnknownColumn { .. })
    ));
}

#[test]
fn test_duplicate_column_is_rejected() {
    let result = Table::new(
        vec!["a".to_string(), "a".to_string()],
        vec![vec![1.into(), 2.into()]],
    );
    assert!(matches!(result, Err(TableError::DuplicateColumn { .. })));
}

#[test]
fn test_set_replaces_cell() {
    let mut table = people_table();
    table.set(0, "age", 31).unwrap();
    assert_eq!(table.get::<i64>(0, "age").unwrap(), 31);
}

#[test]
fn test_row_view() {
    let table = people_table();
    let row = table.row(1).unwrap();
    assert_eq!(row.get::<String>("name").unwrap(), "Bob");
    assert_eq!(row.to_string(), "Bob,25,85");
}

// =============================================================================
// Structural Mutation
// =============================================================================

#[test]
fn test_add_and_delete_column() {
    let mut table = people_table();

    table.add_column("active", true).unwrap();
    assert_eq!(table.column_count(), 4);
    assert_eq!(table.get::<bool>(2, "active").unwrap(), true);
    assert!(matches!(
        table.add_column("active", false),
        Err(TableError::DuplicateColumn { .. })
    ));

    table.delete_column("active").unwrap();
    assert_eq!(table.column_count(), 3);
    assert!(!table.has_column("active"));
}

#[test]
fn test_delete_columns_is_atomic() {
    let mut table = people_table();
    let err = table.delete_columns(&["age", "missing"]).unwrap_err();
    assert!(matches!(err, TableError::UnknownColumn { .. }));
    // The valid half of the batch must not have been applied.
    assert!(table.has_column("age"));
}

#[test]
fn test_rename_columns_allows_swap() {
    let mut table = people_table();
    let mut renames = IndexMap::new();
    renames.insert("age".to_string(), "score".to_string());
    renames.insert("score".to_string(), "age".to_string());

    table.rename_columns(&renames).unwrap();
    assert_eq!(table.get::<f64>(0, "age").unwrap(), 90.5);
    assert_eq!(table.get::<i64>(0, "score").unwrap(), 30);
}

#[test]
fn test_append_row_pads_and_truncates() {
    let mut table = people_table();

    table.append_row(vec!["Dave".into()]);
    assert_eq!(table.row_count(), 4);
    assert_eq!(table.value(3, "age").unwrap(), &CellValue::Text(String::new()));

    table.append_row(vec!["Eve".into(), 40.into(), 88.0.into(), "extra".into()]);
    assert_eq!(table.rows()[4].len(), 3);
}

#[test]
fn test_append_table_requires_matching_columns() {
    let mut table = people_table();
    let other = Table::new(
        vec!["name".to_string(), "age".to_string()],
        vec![vec!["Dave".into(), 40.into()]],
    )
    .unwrap();

    assert!(matches!(
        table.append_table(&other),
        Err(TableError::ColumnMismatch(_))
    ));

    // An empty table adopts the incoming shape instead.
    let mut empty = Table::empty();
    empty.append_table(&other).unwrap();
    assert_eq!(empty.column_names(), ["name", "age"]);
    assert_eq!(empty.row_count(), 1);
}

#[test]
fn test_sub_table_selects_rows() {
    let table = people_table();
    let sub = table.sub_table(&[2, 0]).unwrap();

    assert_eq!(sub.row_count(), 2);
    assert_eq!(sub.get::<String>(0, "name").unwrap(), "Carol");
    assert_eq!(sub.get::<String>(1, "name").unwrap(), "Alice");

    assert!(matches!(
        table.sub_table(&[0, 99]),
        Err(TableError::IndexOutOfRange { .. })
    ));
}

// =============================================================================
// Transforms
// =============================================================================

#[test]
fn test_filter_table_by_predicate() {
    let table = people_table();
    let adults = table.filter_table(|row, t| t.get::<i64>(row, "age").map_or(false, |a| a >= 28));

    assert_eq!(adults.row_count(), 2);
    assert_eq!(adults.get::<String>(0, "name").unwrap(), "Alice");
    assert_eq!(adults.get::<String>(1, "name").unwrap(), "Carol");
}

#[test]
fn test_sort_by_column_ascending_and_descending() {
    let mut table = people_table();

    table.sort_by_column::<i64>("age", true).unwrap();
    assert_eq!(table.column_as::<i64>("age").unwrap(), vec![25, 28, 30]);

    table.sort_by_column::<i64>("age", false).unwrap();
    assert_eq!(table.column_as::<i64>("age").unwrap(), vec![30, 28, 25]);
}

#[test]
fn test_sort_is_atomic_on_bad_cell() {
    let mut table = people_table();
    table.set(1, "age", "not a number").unwrap();

    let before: Vec<String> = table.column_as("name").unwrap();
    assert!(table.sort_by_column::<i64>("age", true).is_err());
    assert_eq!(table.column_as::<String>("name").unwrap(), before);
}

#[test]
fn test_drop_duplicates_keeps_first_occurrence() {
    let mut table = Table::new(
        vec!["city".to_string(), "n".to_string()],
        vec![
            vec!["Oslo".into(), 1.into()],
            vec!["Bergen".into(), 2.into()],
            vec!["Oslo".into(), 3.into()],
        ],
    )
    .unwrap();

    table.drop_duplicates(&["city"]).unwrap();
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.get::<i64>(0, "n").unwrap(), 1);
}

#[test]
fn test_set_column_type_is_atomic() {
    let mut table = Table::new(
        vec!["v".to_string()],
        vec![vec!["1".into()], vec!["oops".into()], vec!["3".into()]],
    )
    .unwrap();

    assert!(table.set_column_type::<i64>("v").is_err());
    // First row must still be text, not half-converted.
    assert_eq!(table.value(0, "v").unwrap(), &CellValue::Text("1".to_string()));

    table.set_column_type_or::<i64>("v", 0).unwrap();
    assert_eq!(table.column_as::<i64>("v").unwrap(), vec![1, 0, 3]);
}

#[test]
fn test_apply_to_column_sees_missing_as_none() {
    let mut table = Table::new(
        vec!["v".to_string()],
        vec![vec![10.into()], vec!["NA".into()], vec![20.into()]],
    )
    .unwrap();

    table
        .apply_to_column("v", |v: Option<i64>| match v {
            Some(x) => CellValue::Int(x * 2),
            None => CellValue::Int(-1),
        })
        .unwrap();

    assert_eq!(table.column_as::<i64>("v").unwrap(), vec![20, -1, 40]);
}

#[test]
fn test_dropna_and_fillna() {
    let base = Table::new(
        vec!["v".to_string()],
        vec![vec![1.into()], vec!["NA".into()], vec![3.into()]],
    )
    .unwrap();

    let mut dropped = base.clone();
    dropped.dropna(&["v"]).unwrap();
    assert_eq!(dropped.row_count(), 2);

    let mut filled = base;
    filled.fillna(&["v"], 0).unwrap();
    assert_eq!(filled.column_as::<i64>("v").unwrap(), vec![1, 0, 3]);
}

#[test]
fn test_keep_every_nth_row() {
    let mut table = Table::new(
        vec!["i".to_string()],
        (0..10).map(|i| vec![CellValue::Int(i)]).collect(),
    )
    .unwrap();

    table.keep_every_nth_row(3);
    assert_eq!(table.column_as::<i64>("i").unwrap(), vec![0, 3, 6, 9]);
}

#[test]
fn test_find_sorted_on_sorted_column() {
    let mut table = Table::new(
        vec!["v".to_string()],
        vec![vec![4.into()], vec![1.into()], vec![9.into()], vec![4.into()]],
    )
    .unwrap();
    table.sort_by_column::<i64>("v", true).unwrap();

    assert_eq!(table.find_sorted("v", &4i64).unwrap(), Some(1));
    assert_eq!(table.find_sorted("v", &5i64).unwrap(), None);
    assert_eq!(table.lower_bound("v", &5i64).unwrap(), 3);
}

// =============================================================================
// Statistics
// =============================================================================

#[test]
fn test_column_statistics() {
    let table = Table::new(
        vec!["x".to_string(), "y".to_string()],
        vec![
            vec![1.into(), 2.0.into()],
            vec![2.into(), 4.0.into()],
            vec![3.into(), 6.0.into()],
            vec![4.into(), 8.0.into()],
        ],
    )
    .unwrap();

    assert_eq!(table.mean("x").unwrap(), 2.5);
    assert_eq!(table.median("x").unwrap(), 2.5);
    assert_eq!(table.percentile("x", 0.0).unwrap(), 1.0);
    assert_eq!(table.percentile("x", 1.0).unwrap(), 4.0);
    assert!((table.correlation("x", "y").unwrap() - 1.0).abs() < 1e-12);
    assert!(table.rmse("x", "x").unwrap().abs() < 1e-12);
}

#[test]
fn test_stats_reject_empty_column() {
    let table = Table::new(vec!["x".to_string()], vec![]).unwrap();
    assert!(matches!(table.mean("x"), Err(TableError::EmptyData(_))));
}
