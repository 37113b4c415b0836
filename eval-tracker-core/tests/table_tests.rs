use eval_tracker_core::domain::*;
use eval_tracker_core::CoreError;
use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};
use serde_json::json;

#[fixture]
fn leaderboard_table() -> ResultTable {
    ResultTable::from_parts(
        vec![
            "model_name".to_string(),
            "Average".to_string(),
            "arc-challenge".to_string(),
            "Elapsed Time".to_string(),
        ],
        vec![vec![
            Cell::from("m"),
            Cell::Number(0.5),
            Cell::Number(0.5),
            Cell::Integer(120),
        ]],
    )
    .unwrap()
}

// ===== Construction Tests =====

#[test]
fn test_fresh_table_row() {
    let mut scores = IndexMap::new();
    scores.insert("arc-challenge".to_string(), 0.5);
    scores.insert("hellaswag".to_string(), 0.7);

    let table = ResultTable::fresh("m", &scores, 120);

    assert_eq!(
        table.columns(),
        &["model_name", "Average", "arc-challenge", "hellaswag", "Elapsed Time"]
    );
    assert_eq!(
        table.row().unwrap(),
        &[
            Cell::from("m"),
            Cell::Missing,
            Cell::Number(0.5),
            Cell::Number(0.7),
            Cell::Integer(120),
        ]
    );
}

#[test]
fn test_fresh_table_nan_score_is_missing() {
    let mut scores = IndexMap::new();
    scores.insert("drop".to_string(), f64::NAN);

    let table = ResultTable::fresh("m", &scores, 1);
    assert!(table.cell("drop").unwrap().is_missing());
}

#[test]
fn test_from_parts_rejects_ragged_rows() {
    let result = ResultTable::from_parts(
        vec!["model_name".to_string(), "Average".to_string()],
        vec![vec![Cell::from("m")]],
    );
    assert!(matches!(result, Err(CoreError::MalformedTable(_))));
}

#[test]
fn test_from_parts_rejects_duplicate_columns() {
    let result = ResultTable::from_parts(
        vec!["mmlu".to_string(), "mmlu".to_string()],
        vec![vec![Cell::Number(0.1), Cell::Number(0.2)]],
    );
    assert!(matches!(result, Err(CoreError::MalformedTable(_))));
}

#[test]
fn test_row_requires_exactly_one_row() {
    let empty = ResultTable::from_parts(vec!["model_name".to_string()], vec![]).unwrap();
    assert!(matches!(empty.row(), Err(CoreError::MalformedTable(_))));

    let two = ResultTable::from_parts(
        vec!["model_name".to_string()],
        vec![vec![Cell::from("a")], vec![Cell::from("b")]],
    )
    .unwrap();
    assert!(matches!(two.row(), Err(CoreError::MalformedTable(_))));
}

// ===== Mutation Tests =====

#[rstest]
fn test_add_score_column_keeps_elapsed_time_last(mut leaderboard_table: ResultTable) {
    leaderboard_table.add_elapsed_time(30).unwrap();
    leaderboard_table.add_score_column("drop", 0.3).unwrap();

    assert_eq!(
        leaderboard_table.columns(),
        &["model_name", "Average", "arc-challenge", "drop", "Elapsed Time"]
    );
    assert_eq!(
        leaderboard_table.row().unwrap(),
        &[
            Cell::from("m"),
            Cell::Number(0.5),
            Cell::Number(0.5),
            Cell::Number(0.3),
            Cell::Integer(150),
        ]
    );
}

#[test]
fn test_add_score_column_without_elapsed_time_appends() {
    let mut table = ResultTable::from_parts(
        vec!["model_name".to_string(), "Average".to_string()],
        vec![vec![Cell::from("m"), Cell::Missing]],
    )
    .unwrap();
    table.add_score_column("drop", 0.3).unwrap();

    assert_eq!(table.columns().last().map(String::as_str), Some("drop"));
    assert_eq!(table.cell("drop"), Some(&Cell::Number(0.3)));
}

#[test]
fn test_add_existing_column_is_rejected() {
    let mut table = leaderboard_table();
    let before = table.clone();

    let result = table.add_score_column("arc-challenge", 0.9);

    assert!(matches!(result, Err(CoreError::DuplicateColumn(c)) if c == "arc-challenge"));
    assert_eq!(table, before);
}

#[test]
fn test_elapsed_time_is_cumulative() {
    let mut table = leaderboard_table();
    table.add_elapsed_time(100).unwrap();
    table.add_elapsed_time(50).unwrap();

    assert_eq!(table.cell(ELAPSED_TIME_COLUMN), Some(&Cell::Integer(270)));
}

#[test]
fn test_elapsed_time_on_float_cell() {
    let mut table = ResultTable::from_parts(
        vec!["Average".to_string(), "Elapsed Time".to_string()],
        vec![vec![Cell::Missing, Cell::Number(10.5)]],
    )
    .unwrap();
    table.add_elapsed_time(30).unwrap();

    assert_eq!(table.cell(ELAPSED_TIME_COLUMN), Some(&Cell::Number(40.5)));
}

#[rstest]
#[case::past_max(i64::MAX, 1)]
#[case::past_min(i64::MIN, -1)]
fn test_elapsed_time_overflow_leaves_cell_untouched(#[case] stored: i64, #[case] delta: i64) {
    let mut table = ResultTable::from_parts(
        vec!["Elapsed Time".to_string()],
        vec![vec![Cell::Integer(stored)]],
    )
    .unwrap();

    assert!(matches!(
        table.add_elapsed_time(delta),
        Err(CoreError::MalformedTable(_))
    ));
    assert_eq!(table.cell(ELAPSED_TIME_COLUMN), Some(&Cell::Integer(stored)));
}

#[test]
fn test_elapsed_time_missing_cell_is_malformed() {
    let mut table = ResultTable::from_parts(
        vec!["Elapsed Time".to_string()],
        vec![vec![Cell::Missing]],
    )
    .unwrap();
    assert!(matches!(
        table.add_elapsed_time(30),
        Err(CoreError::MalformedTable(_))
    ));
}

#[test]
fn test_set_average_requires_column() {
    let mut table =
        ResultTable::from_parts(vec!["model_name".to_string()], vec![vec![Cell::from("m")]])
            .unwrap();
    assert!(matches!(
        table.set_average(0.5),
        Err(CoreError::MissingColumn(c)) if c == "Average"
    ));
}

#[test]
fn test_score_cells_skip_reserved_columns() {
    let mut table = leaderboard_table();
    table.add_score_column("drop", 0.3).unwrap();

    let names: Vec<&str> = table
        .score_cells()
        .unwrap()
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(names, vec!["arc-challenge", "drop"]);
}

#[test]
fn test_ensure_leaderboard_shape() {
    assert!(leaderboard_table().ensure_leaderboard_shape().is_ok());

    let table = ResultTable::from_parts(
        vec!["model_name".to_string(), "Average".to_string()],
        vec![vec![Cell::from("m"), Cell::Missing]],
    )
    .unwrap();
    assert!(matches!(
        table.ensure_leaderboard_shape(),
        Err(CoreError::MissingColumn(c)) if c == "Elapsed Time"
    ));
}

// ===== Serialization Tests =====

#[test]
fn test_cells_round_trip_through_store_json() {
    let cells = vec![
        Cell::from("org/model"),
        Cell::Number(0.25),
        Cell::Number(f64::NAN),
        Cell::Integer(120),
    ];

    let wire = serde_json::to_value(&cells).unwrap();
    assert_eq!(wire, json!(["org/model", 0.25, null, 120]));

    let back: Vec<Cell> = serde_json::from_value(wire).unwrap();
    assert_eq!(back[0], Cell::from("org/model"));
    assert_eq!(back[1], Cell::Number(0.25));
    assert_eq!(back[2], Cell::Missing);
    assert_eq!(back[3], Cell::Integer(120));
}

#[test]
fn test_float_with_zero_fraction_stays_number() {
    let cell: Cell = serde_json::from_value(json!(150.0)).unwrap();
    assert_eq!(cell.as_number(), Some(150.0));
}
