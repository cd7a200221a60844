//! End-to-end pipeline tests with mock clients.
//!
//! Question -> mock LLM -> generated SQL -> mock database -> normalized
//! table -> rendering and CSV export.

use askdb::app;
use askdb::db::{FailingDatabaseClient, MockDatabaseClient, Value};
use askdb::error::AskdbError;
use askdb::llm::MockLlmClient;
use askdb::output;
use pretty_assertions::assert_eq;

fn inventory_db() -> MockDatabaseClient {
    MockDatabaseClient::new().with_table(
        "t_shirts",
        ["t_shirt_id", "brand", "color", "size", "price", "stock_quantity"],
    )
}

#[tokio::test]
async fn count_question_yields_single_count_column() {
    let llm = MockLlmClient::new();
    let db = inventory_db().with_rows(vec![vec![Value::Int(3)]]);

    let interaction = app::ask(
        "How many t-shirts do we have left for Nike in extra small size and white color?",
        &llm,
        &db,
    )
    .await
    .unwrap();

    assert_eq!(interaction.sql, "SELECT COUNT(*) FROM t_shirts;");
    assert_eq!(interaction.table.labels, vec!["COUNT"]);
    assert_eq!(interaction.table.rows, vec![vec![Value::Int(3)]]);
}

#[tokio::test]
async fn wildcard_question_gets_schema_labels() {
    let llm = MockLlmClient::new();
    let db = inventory_db().with_rows(vec![vec![
        Value::Int(1),
        Value::String("Nike".into()),
        Value::String("white".into()),
        Value::String("L".into()),
        Value::Decimal("19.00".parse().unwrap()),
        Value::Int(12),
    ]]);

    let interaction = app::ask("Show me all data for large size", &llm, &db)
        .await
        .unwrap();

    assert_eq!(interaction.sql, "SELECT * FROM t_shirts;");
    assert_eq!(
        interaction.table.labels,
        vec!["t_shirt_id", "brand", "color", "size", "price", "stock_quantity"]
    );
    // The NUMERIC price was coerced on the way through
    assert_eq!(interaction.table.rows[0][4], Value::Int(19));
}

#[tokio::test]
async fn rendered_output_contains_labels_and_summary() {
    let llm = MockLlmClient::new();
    let db = inventory_db().with_rows(vec![
        vec![Value::String("M".into()), Value::Decimal("12.50".parse().unwrap())],
        vec![Value::String("L".into()), Value::Decimal("13.00".parse().unwrap())],
    ]);

    let interaction = app::ask("List the price of all the white t-shirts", &llm, &db)
        .await
        .unwrap();

    let rendered = output::render_table(&interaction.table);
    assert!(rendered.contains("size"));
    assert!(rendered.contains("price"));
    assert!(rendered.contains("12.5"));

    assert_eq!(
        output::summary_line(&interaction.table),
        "Found 2 records in 2 columns"
    );
}

#[tokio::test]
async fn csv_export_round_trip() {
    let llm = MockLlmClient::new();
    let db = inventory_db().with_rows(vec![
        vec![Value::String("M".into()), Value::Decimal("20.00".parse().unwrap())],
        vec![Value::String("L".into()), Value::Decimal("25.50".parse().unwrap())],
    ]);

    let interaction = app::ask("List the price of all the black t-shirts", &llm, &db)
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t_shirt_data.csv");
    output::write_csv(&interaction.table, &path).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let mut lines = contents.lines();
    assert_eq!(lines.next(), Some("size,price"));
    assert_eq!(lines.next(), Some("M,20"));
    assert_eq!(lines.next(), Some("L,25.5"));
}

#[tokio::test]
async fn database_failure_surfaces_as_query_error() {
    let llm = MockLlmClient::new();
    let db = FailingDatabaseClient::new();

    let result = app::ask("How many t-shirts are left?", &llm, &db).await;

    match result {
        Err(AskdbError::Query(_)) => {}
        other => panic!("Expected a query error, got {:?}", other),
    }
}

#[tokio::test]
async fn custom_llm_response_flows_through() {
    let llm = MockLlmClient::new().with_response(
        "cheapest",
        "```sql\nSELECT brand, price FROM t_shirts ORDER BY price LIMIT 1;\n```",
    );
    let db = inventory_db().with_rows(vec![vec![
        Value::String("Puma".into()),
        Value::Decimal("9.99".parse().unwrap()),
    ]]);

    let interaction = app::ask("What is the cheapest t-shirt?", &llm, &db)
        .await
        .unwrap();

    assert_eq!(interaction.table.labels, vec!["brand", "price"]);
    assert_eq!(
        interaction.table.rows,
        vec![vec![Value::String("Puma".into()), Value::Float(9.99)]]
    );
}
