//! Mock database clients for testing.
//!
//! Provides in-memory implementations so the pipeline can be exercised
//! without a running database.

use super::{DatabaseClient, RawQueryResult, Row};
use crate::error::{AskdbError, Result};
use async_trait::async_trait;
use std::time::Duration;

/// A mock database client that returns a predefined result for every query.
#[derive(Debug, Clone, Default)]
pub struct MockDatabaseClient {
    /// Table name -> ordered column names.
    tables: Vec<(String, Vec<String>)>,
    /// Result returned by `execute_query`.
    result: RawQueryResult,
}

impl MockDatabaseClient {
    /// Creates a new mock client with no tables and an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a table with its ordered column names.
    pub fn with_table(
        mut self,
        name: impl Into<String>,
        columns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.tables.push((
            name.into(),
            columns.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Sets the rows returned by every query.
    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.result = RawQueryResult::with_rows(rows)
            .with_execution_time(Duration::from_millis(1));
        self
    }
}

#[async_trait]
impl DatabaseClient for MockDatabaseClient {
    async fn execute_query(&self, _sql: &str) -> Result<RawQueryResult> {
        Ok(self.result.clone())
    }

    async fn table_names(&self) -> Result<Vec<String>> {
        Ok(self.tables.iter().map(|(name, _)| name.clone()).collect())
    }

    async fn columns_for_table(&self, table: &str) -> Result<Vec<String>> {
        Ok(self
            .tables
            .iter()
            .find(|(name, _)| name == table)
            .map(|(_, columns)| columns.clone())
            .unwrap_or_default())
    }

    async fn database_size_mb(&self) -> Result<Option<f64>> {
        Ok(Some(42.0))
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// A mock database client where every operation fails.
#[derive(Debug, Clone, Default)]
pub struct FailingDatabaseClient;

impl FailingDatabaseClient {
    /// Creates a new failing client.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DatabaseClient for FailingDatabaseClient {
    async fn execute_query(&self, _sql: &str) -> Result<RawQueryResult> {
        Err(AskdbError::query("mock query failure"))
    }

    async fn table_names(&self) -> Result<Vec<String>> {
        Err(AskdbError::query("mock introspection failure"))
    }

    async fn columns_for_table(&self, _table: &str) -> Result<Vec<String>> {
        Err(AskdbError::query("mock introspection failure"))
    }

    async fn database_size_mb(&self) -> Result<Option<f64>> {
        Err(AskdbError::query("mock metrics failure"))
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
