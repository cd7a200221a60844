//! Output rendering for askdb.
//!
//! Renders normalized tables for the terminal and exports them as CSV.

use comfy_table::{presets::UTF8_BORDERS_ONLY, Cell, ContentArrangement, Row, Table};
use std::path::Path;

use crate::db::Value;
use crate::error::{AskdbError, Result};
use crate::normalize::NormalizedTable;

/// Renders a normalized table for terminal display.
pub fn render_table(result: &NormalizedTable) -> String {
    if result.is_empty() {
        return "(no rows)".to_string();
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_BORDERS_ONLY)
        .set_content_arrangement(ContentArrangement::Dynamic);

    if !result.labels.is_empty() {
        let header = Row::from(result.labels.iter().map(Cell::new).collect::<Vec<_>>());
        table.set_header(header);
    }

    for row in &result.rows {
        let rendered = Row::from(
            row.iter()
                .map(|value| Cell::new(value_to_text(value)))
                .collect::<Vec<_>>(),
        );
        table.add_row(rendered);
    }

    table.to_string()
}

/// Returns the record/column summary line shown under the table.
pub fn summary_line(result: &NormalizedTable) -> String {
    format!(
        "Found {} records in {} columns",
        result.row_count(),
        result.column_count()
    )
}

/// Writes a normalized table to a CSV file at `path`.
pub fn write_csv(result: &NormalizedTable, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AskdbError::internal(format!("Failed to create CSV file: {e}")))?;

    if !result.labels.is_empty() {
        writer
            .write_record(&result.labels)
            .map_err(|e| AskdbError::internal(format!("Failed to write CSV header: {e}")))?;
    }

    for row in &result.rows {
        let record: Vec<String> = row.iter().map(csv_field).collect();
        writer
            .write_record(&record)
            .map_err(|e| AskdbError::internal(format!("Failed to write CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AskdbError::internal(format!("Failed to flush CSV file: {e}")))?;

    Ok(())
}

/// Converts a value to its terminal representation.
fn value_to_text(value: &Value) -> String {
    value.to_display_string()
}

/// Converts a value to its CSV representation. NULL becomes an empty field.
fn csv_field(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => other.to_display_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> NormalizedTable {
        NormalizedTable {
            labels: vec!["size".to_string(), "price".to_string()],
            rows: vec![
                vec![Value::String("M".to_string()), Value::Int(20)],
                vec![Value::String("L".to_string()), Value::Float(25.5)],
            ],
        }
    }

    #[test]
    fn test_render_table_contains_headers_and_values() {
        let rendered = render_table(&sample_table());

        assert!(rendered.contains("size"));
        assert!(rendered.contains("price"));
        assert!(rendered.contains("M"));
        assert!(rendered.contains("25.5"));
    }

    #[test]
    fn test_render_empty_table() {
        let rendered = render_table(&NormalizedTable::empty());
        assert_eq!(rendered, "(no rows)");
    }

    #[test]
    fn test_summary_line() {
        assert_eq!(summary_line(&sample_table()), "Found 2 records in 2 columns");
    }

    #[test]
    fn test_write_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t_shirt_data.csv");

        write_csv(&sample_table(), &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some("size,price"));
        assert_eq!(lines.next(), Some("M,20"));
        assert_eq!(lines.next(), Some("L,25.5"));
    }

    #[test]
    fn test_write_csv_null_is_empty_field() {
        let table = NormalizedTable {
            labels: vec!["brand".to_string(), "color".to_string()],
            rows: vec![vec![Value::String("Nike".to_string()), Value::Null]],
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nulls.csv");

        write_csv(&table, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("Nike,"));
    }

    #[test]
    fn test_write_csv_quotes_embedded_commas() {
        let table = NormalizedTable {
            labels: vec!["note".to_string()],
            rows: vec![vec![Value::String("red, not crimson".to_string())]],
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quoted.csv");

        write_csv(&table, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("\"red, not crimson\""));
    }
}
