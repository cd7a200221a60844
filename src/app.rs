//! Interaction orchestration for askdb.
//!
//! Wires the pipeline together: question -> LLM -> SQL -> execution ->
//! normalized table. One call per user interaction.

use std::time::Duration;

use crate::db::DatabaseClient;
use crate::error::{AskdbError, Result};
use crate::llm::{extract_sql, prompt, LlmClient};
use crate::normalize::{normalize_result, NormalizedTable};
use tracing::{debug, info};

/// The outcome of one question-to-table interaction.
#[derive(Debug)]
pub struct Interaction {
    /// The SQL the model generated (after fence stripping).
    pub sql: String,
    /// The labeled result table.
    pub table: NormalizedTable,
    /// How long the query took to execute.
    pub execution_time: Duration,
    /// Warning text if the result was truncated.
    pub truncation_warning: Option<String>,
}

/// Runs one interaction: translates the question to SQL, executes it, and
/// normalizes the result.
///
/// LLM and database failures abort the interaction (the caller surfaces
/// them); normalization itself never fails.
pub async fn ask(
    question: &str,
    llm: &dyn LlmClient,
    db: &dyn DatabaseClient,
) -> Result<Interaction> {
    debug!("Requesting SQL for question: {}", question);

    let messages = prompt::build_messages(question);
    let response = llm.complete(&messages).await?;

    let sql = extract_sql(&response);
    if sql.is_empty() {
        return Err(AskdbError::llm("The model returned no SQL"));
    }
    info!("Generated SQL: {}", sql);

    let raw = db.execute_query(&sql).await?;
    let execution_time = raw.execution_time;
    let truncation_warning = raw.truncation_warning();

    let table = normalize_result(&sql, raw, db).await;

    Ok(Interaction {
        sql,
        table,
        execution_time,
        truncation_warning,
    })
}

/// Dashboard-style database status metrics.
#[derive(Debug, Clone)]
pub struct DatabaseStatus {
    /// Number of user tables in the database.
    pub table_count: usize,
    /// Approximate database size in megabytes, if reported.
    pub size_mb: Option<f64>,
    /// Measured round-trip time of a trivial query.
    pub round_trip: Duration,
}

/// Gathers status metrics from the database.
pub async fn database_status(db: &dyn DatabaseClient) -> Result<DatabaseStatus> {
    let tables = db.table_names().await?;
    let ping = db.execute_query("SELECT 1").await?;
    let size_mb = db.database_size_mb().await?;

    Ok(DatabaseStatus {
        table_count: tables.len(),
        size_mb,
        round_trip: ping.execution_time,
    })
}
