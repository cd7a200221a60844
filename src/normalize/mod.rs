//! Result normalization and column attribution.
//!
//! Takes the raw SQL text and the raw result set and reconstructs a labeled
//! table for display: exact-decimal cells are coerced to integers or floats,
//! and column labels are inferred from the SQL projection clause with schema
//! metadata and positional placeholders as fallbacks.
//!
//! Normalization is infallible: every parse or introspection failure degrades
//! to the next fallback, and a best-effort table always comes back.

mod projection;

pub use projection::{parse_select, ParsedSelect, Projection};

use crate::db::{DatabaseClient, RawQueryResult, Row, Value};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, warn};

/// A query result with display labels assigned to every column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedTable {
    /// Column labels, one per value in each row.
    pub labels: Vec<String>,

    /// Decoded rows; no `Value::Decimal` cells remain.
    pub rows: Vec<Row>,
}

impl NormalizedTable {
    /// Creates an empty table with no labels.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns the number of columns.
    pub fn column_count(&self) -> usize {
        self.labels.len()
    }
}

/// Normalizes a raw query result into a labeled table.
///
/// `sql` is the query the rows came from; `db` is used only for read-only
/// schema metadata lookups (wildcard projections and label reconciliation).
pub async fn normalize_result(
    sql: &str,
    raw: RawQueryResult,
    db: &dyn DatabaseClient,
) -> NormalizedTable {
    // An empty result set produces an empty table with no labels.
    if raw.rows.is_empty() {
        return NormalizedTable::empty();
    }

    let rows: Vec<Row> = raw
        .rows
        .into_iter()
        .map(|row| row.into_iter().map(decode_value).collect())
        .collect();

    let arity = rows.first().map(Vec::len).unwrap_or(0);

    let parsed = parse_select(sql);
    let inferred = infer_labels(&parsed, db).await;
    let labels = reconcile_labels(inferred, arity, parsed.from_table.as_deref(), db).await;

    NormalizedTable { labels, rows }
}

/// Decodes a single raw value, applying the numeric normalization rule to
/// exact decimals. All other values pass through unchanged.
pub fn decode_value(value: Value) -> Value {
    match value {
        Value::Decimal(d) => coerce_decimal(d),
        other => other,
    }
}

/// Converts an exact decimal to `Int` when it has no fractional part and
/// `Float` otherwise. A value whose integral part does not fit in i64 falls
/// back to `Float`.
fn coerce_decimal(d: Decimal) -> Value {
    if d.fract() == Decimal::ZERO {
        if let Some(i) = d.to_i64() {
            return Value::Int(i);
        }
    }
    match d.to_f64() {
        Some(f) => Value::Float(f),
        None => Value::String(d.to_string()),
    }
}

/// Infers labels from the parsed projection, before reconciliation.
async fn infer_labels(parsed: &ParsedSelect, db: &dyn DatabaseClient) -> Vec<String> {
    match &parsed.projection {
        Projection::Wildcard => schema_columns(parsed.from_table.as_deref(), db).await,
        Projection::Aggregate { function, column } => {
            let label = match column {
                Some(column) => format!("{function}_{column}"),
                None => function.clone(),
            };
            vec![label]
        }
        Projection::Columns(columns) => columns.clone(),
        Projection::Unknown => {
            debug!("Could not parse projection clause; deferring to fallbacks");
            Vec::new()
        }
    }
}

/// Guarantees every result column a display name.
///
/// Inferred labels are truncated to the row arity when there are enough of
/// them. Otherwise the detected table's schema columns are tried, and finally
/// positional placeholders.
async fn reconcile_labels(
    inferred: Vec<String>,
    arity: usize,
    from_table: Option<&str>,
    db: &dyn DatabaseClient,
) -> Vec<String> {
    if inferred.len() >= arity {
        return truncated(inferred, arity);
    }

    debug!(
        "Inferred {} labels for {} columns; falling back to schema metadata",
        inferred.len(),
        arity
    );

    let fallback = schema_columns(from_table, db).await;
    if fallback.len() >= arity {
        return truncated(fallback, arity);
    }

    placeholder_labels(arity)
}

/// Fetches the ordered column names for a table, or an empty list when the
/// table is unknown or introspection fails.
async fn schema_columns(table: Option<&str>, db: &dyn DatabaseClient) -> Vec<String> {
    let Some(table) = table else {
        return Vec::new();
    };

    match db.columns_for_table(table).await {
        Ok(columns) => columns,
        Err(e) => {
            warn!("Schema lookup for '{}' failed: {}", table, e);
            Vec::new()
        }
    }
}

fn truncated(mut labels: Vec<String>, arity: usize) -> Vec<String> {
    labels.truncate(arity);
    labels
}

/// Synthesizes positional labels: `column_1`, `column_2`, ...
fn placeholder_labels(arity: usize) -> Vec<String> {
    (1..=arity).map(|i| format!("column_{i}")).collect()
}
