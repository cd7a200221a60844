//! PostgreSQL-backed integration tests.
//!
//! These tests require a running PostgreSQL database.
//! Set the DATABASE_URL environment variable to run them.

use askdb::config::ConnectionConfig;
use askdb::db::{DatabaseClient, PostgresClient, Value};
use askdb::normalize::normalize_result;

/// Helper to get the test database URL from the environment.
fn get_test_database_url() -> Option<String> {
    std::env::var("DATABASE_URL").ok()
}

/// Helper to create a test client.
async fn get_test_client() -> Option<PostgresClient> {
    let url = get_test_database_url()?;
    let config = ConnectionConfig::from_connection_string(&url).ok()?;
    PostgresClient::connect(&config).await.ok()
}

#[tokio::test]
async fn test_execute_simple_select() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let result = client.execute_query("SELECT 1, 'hello'").await.unwrap();

    assert_eq!(result.row_count, 1);
    assert_eq!(result.arity(), 2);
    assert_eq!(result.rows[0][0], Value::Int(1));
    assert_eq!(result.rows[0][1], Value::String("hello".to_string()));

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_numeric_normalization_through_real_driver() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let sql = "SELECT 10.00::numeric AS whole, 10.50::numeric AS fractional";
    let raw = client.execute_query(sql).await.unwrap();
    let table = normalize_result(sql, raw, &client).await;

    assert_eq!(table.labels, vec!["whole", "fractional"]);
    assert_eq!(table.rows, vec![vec![Value::Int(10), Value::Float(10.5)]]);

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_empty_result_normalizes_to_empty_table() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let sql = "SELECT 1 WHERE false";
    let raw = client.execute_query(sql).await.unwrap();
    let table = normalize_result(sql, raw, &client).await;

    assert!(table.is_empty());
    assert!(table.labels.is_empty());

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_table_names_are_sorted() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let names = client.table_names().await.unwrap();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_unknown_table_has_no_columns() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let columns = client.columns_for_table("definitely_not_a_table").await.unwrap();
    assert!(columns.is_empty());

    client.close().await.unwrap();
}
