use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use thiserror::Error;

use scry_core::debug_log::unix_timestamp_millis;
use scry_core::schema_model::DataRow;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write export file at {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize JSON export: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

#[must_use]
pub fn export_file_name(database: &str, table: &str, format: ExportFormat) -> String {
    format!(
        "{database}.{table}-{}.{}",
        unix_timestamp_millis(),
        format.extension()
    )
}

pub fn export_page_to_csv(
    path: &Path,
    columns: &[String],
    rows: &[DataRow],
) -> Result<usize, ExportError> {
    let mut content = String::new();
    content.push_str(
        &columns
            .iter()
            .map(|column| csv_escape(column))
            .collect::<Vec<_>>()
            .join(","),
    );
    content.push('\n');

    for row in rows {
        let mut values = Vec::with_capacity(columns.len());
        for column in columns {
            values.push(csv_escape(&render_cell(row.get(column))));
        }
        content.push_str(&values.join(","));
        content.push('\n');
    }

    fs::write(path, content).map_err(|source| ExportError::Write {
        path: path.display().to_string(),
        source,
    })?;
    Ok(rows.len())
}

pub fn export_page_to_json(
    path: &Path,
    columns: &[String],
    rows: &[DataRow],
) -> Result<usize, ExportError> {
    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let mut object = Map::with_capacity(columns.len());
        for column in columns {
            let value = row.get(column).cloned().unwrap_or(Value::Null);
            object.insert(column.clone(), value);
        }
        records.push(Value::Object(object));
    }

    let payload = serde_json::to_string_pretty(&records)?;
    fs::write(path, payload).map_err(|source| ExportError::Write {
        path: path.display().to_string(),
        source,
    })?;
    Ok(rows.len())
}

fn render_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

fn csv_escape(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::json;
    use tempfile::TempDir;

    use scry_core::schema_model::DataRow;

    use super::{export_file_name, export_page_to_csv, export_page_to_json, ExportFormat};

    fn row(value: serde_json::Value) -> DataRow {
        match value {
            serde_json::Value::Object(map) => map,
            other => panic!("expected object row, got {other}"),
        }
    }

    #[test]
    fn exports_page_to_csv_with_column_order_and_escaping() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let path = temp_dir.path().join("result.csv");
        let columns = vec!["id".to_string(), "name".to_string(), "tags".to_string()];
        let rows = vec![
            row(json!({ "name": "alpha", "id": 1, "tags": ["a", "b"] })),
            row(json!({ "name": "quote \"name\"", "id": 2 })),
        ];

        let written = export_page_to_csv(&path, &columns, &rows).expect("csv export failed");
        assert_eq!(written, 2);

        let output = fs::read_to_string(path).expect("failed to read csv output");
        let mut lines = output.lines();
        assert_eq!(lines.next(), Some("id,name,tags"));
        assert_eq!(lines.next(), Some("1,alpha,\"[\"\"a\"\",\"\"b\"\"]\""));
        assert_eq!(lines.next(), Some("2,\"quote \"\"name\"\"\","));
    }

    #[test]
    fn exports_page_to_json_preserving_raw_values() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let path = temp_dir.path().join("result.json");
        let columns = vec!["id".to_string(), "price".to_string(), "missing".to_string()];
        let rows = vec![row(json!({ "id": "a1", "price": 9.5, "ignored": true }))];

        let written = export_page_to_json(&path, &columns, &rows).expect("json export failed");
        assert_eq!(written, 1);

        let output = fs::read_to_string(path).expect("failed to read json output");
        let parsed: serde_json::Value = serde_json::from_str(&output).expect("invalid json");
        assert_eq!(parsed[0]["id"], "a1");
        assert_eq!(parsed[0]["price"], 9.5);
        assert_eq!(parsed[0]["missing"], serde_json::Value::Null);
        assert!(parsed[0].get("ignored").is_none());
    }

    #[test]
    fn export_file_name_carries_table_and_extension() {
        let name = export_file_name("retail", "orders", ExportFormat::Csv);
        assert!(name.starts_with("retail.orders-"));
        assert!(name.ends_with(".csv"));

        let name = export_file_name("retail", "orders", ExportFormat::Json);
        assert!(name.ends_with(".json"));
    }
}
