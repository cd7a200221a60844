//! Database abstraction layer for askdb.
//!
//! Provides a trait-based interface that unifies query execution and schema
//! introspection behind one client, so generated queries and column-name
//! lookups share a single connection setup.

mod mock;
mod postgres;
mod types;

pub use mock::{FailingDatabaseClient, MockDatabaseClient};
pub use postgres::PostgresClient;
pub use types::{RawQueryResult, Row, Value};

use crate::config::ConnectionConfig;
use crate::error::Result;
use async_trait::async_trait;

/// Creates a database client for the given configuration.
///
/// This is the central factory function for database connections.
pub async fn connect(config: &ConnectionConfig) -> Result<Box<dyn DatabaseClient>> {
    let client = PostgresClient::connect(config).await?;
    Ok(Box::new(client))
}

/// Trait defining the interface for database clients.
///
/// One client serves both generated-query execution and the read-only schema
/// metadata lookups the result normalizer relies on. All operations are async
/// and return Results with AskdbError.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Executes a SQL query and returns the raw rows.
    async fn execute_query(&self, sql: &str) -> Result<RawQueryResult>;

    /// Returns the names of all user tables, in name order.
    async fn table_names(&self) -> Result<Vec<String>>;

    /// Returns the ordered column names for a table, or an empty list if the
    /// table is unknown.
    async fn columns_for_table(&self, table: &str) -> Result<Vec<String>>;

    /// Returns the approximate database size in megabytes, if the backend
    /// can report it.
    async fn database_size_mb(&self) -> Result<Option<f64>>;

    /// Closes the database connection.
    async fn close(&self) -> Result<()>;
}
