//! Result normalization integration tests.
//!
//! Exercises column attribution and numeric normalization through the
//! public API, against a mock schema.

use askdb::db::{MockDatabaseClient, RawQueryResult, Value};
use askdb::normalize::normalize_result;
use pretty_assertions::assert_eq;

fn inventory_db() -> MockDatabaseClient {
    MockDatabaseClient::new().with_table(
        "t_shirts",
        ["t_shirt_id", "brand", "color", "size", "price", "stock_quantity"],
    )
}

fn decimal(s: &str) -> Value {
    Value::Decimal(s.parse().unwrap())
}

#[tokio::test]
async fn column_list_labels_follow_the_projection() {
    let db = inventory_db();
    let raw = RawQueryResult::with_rows(vec![
        vec![Value::String("S".into()), decimal("12.00")],
        vec![Value::String("M".into()), decimal("12.50")],
        vec![Value::String("L".into()), decimal("13.00")],
    ]);

    let table = normalize_result(
        "SELECT size, price FROM t_shirts WHERE brand = 'Nike' AND color = 'white'",
        raw,
        &db,
    )
    .await;

    assert_eq!(table.labels, vec!["size", "price"]);
    assert_eq!(
        table.rows,
        vec![
            vec![Value::String("S".into()), Value::Int(12)],
            vec![Value::String("M".into()), Value::Float(12.5)],
            vec![Value::String("L".into()), Value::Int(13)],
        ]
    );
}

#[tokio::test]
async fn wildcard_labels_come_from_the_schema() {
    let db = inventory_db();
    let raw = RawQueryResult::with_rows(vec![vec![
        Value::Int(7),
        Value::String("Puma".into()),
        Value::String("red".into()),
        Value::String("M".into()),
        decimal("12.75"),
        Value::Int(8),
    ]]);

    let table = normalize_result("SELECT * FROM t_shirts WHERE size = 'M'", raw, &db).await;

    assert_eq!(
        table.labels,
        vec!["t_shirt_id", "brand", "color", "size", "price", "stock_quantity"]
    );
}

#[tokio::test]
async fn aggregate_labels_are_synthesized() {
    let db = inventory_db();

    let count = normalize_result(
        "SELECT COUNT(*) FROM t_shirts",
        RawQueryResult::with_rows(vec![vec![Value::Int(57)]]),
        &db,
    )
    .await;
    assert_eq!(count.labels, vec!["COUNT"]);

    let sum = normalize_result(
        "SELECT SUM(price) FROM t_shirts",
        RawQueryResult::with_rows(vec![vec![decimal("714.25")]]),
        &db,
    )
    .await;
    assert_eq!(sum.labels, vec!["SUM_price"]);
    assert_eq!(sum.rows, vec![vec![Value::Float(714.25)]]);
}

#[tokio::test]
async fn empty_result_produces_empty_table() {
    let db = inventory_db();

    let table = normalize_result(
        "SELECT size FROM t_shirts WHERE brand = 'NoSuchBrand'",
        RawQueryResult::new(),
        &db,
    )
    .await;

    assert!(table.is_empty());
    assert!(table.labels.is_empty());
}

#[tokio::test]
async fn placeholders_are_the_terminal_fallback() {
    // Unknown table: projection parse gives one label, schema gives none.
    let db = inventory_db();
    let raw = RawQueryResult::with_rows(vec![vec![Value::Int(1), Value::Int(2), Value::Int(3)]]);

    let table = normalize_result("SELECT x FROM mystery_table", raw, &db).await;

    assert_eq!(table.labels, vec!["column_1", "column_2", "column_3"]);
}

#[tokio::test]
async fn whole_decimals_become_integers() {
    let db = inventory_db();
    let raw = RawQueryResult::with_rows(vec![vec![decimal("10.00"), decimal("10.50")]]);

    let table = normalize_result("SELECT price, price FROM t_shirts", raw, &db).await;

    assert_eq!(table.rows, vec![vec![Value::Int(10), Value::Float(10.5)]]);
}
