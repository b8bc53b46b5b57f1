use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

const MAX_REPORTED_VIOLATIONS: usize = 3;

pub type DataRow = Map<String, Value>;
pub type TableMap = BTreeMap<String, TableSchema>;
pub type DatabaseMap = BTreeMap<String, TableMap>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeRelationship {
    pub table: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub name: String,
    pub indexed: bool,
    pub is_primary_key: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<AttributeRelationship>,
}

impl Attribute {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            indexed: false,
            is_primary_key: false,
            relationship: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    pub schema: String,
    pub name: String,
    pub hash_attribute: String,
    pub audit: bool,
    pub schema_defined: bool,
    pub record_count: u64,
    pub attributes: Vec<Attribute>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TableSchema {
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|attribute| attribute.name == name)
    }

    #[must_use]
    pub fn attribute_names(&self) -> Vec<String> {
        self.attributes
            .iter()
            .map(|attribute| attribute.name.clone())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeViolation {
    pub path: String,
    pub message: String,
}

impl ShapeViolation {
    #[must_use]
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ShapeViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ShapeError {
    violations: Vec<ShapeViolation>,
}

impl ShapeError {
    #[must_use]
    pub fn new(violations: Vec<ShapeViolation>) -> Self {
        Self { violations }
    }

    #[must_use]
    pub fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violations: vec![ShapeViolation::new(path, message)],
        }
    }

    #[must_use]
    pub fn violations(&self) -> &[ShapeViolation] {
        &self.violations
    }
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reported = self
            .violations
            .iter()
            .take(MAX_REPORTED_VIOLATIONS)
            .map(ShapeViolation::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{reported}")?;

        let hidden = self.violations.len().saturating_sub(MAX_REPORTED_VIOLATIONS);
        if hidden > 0 {
            write!(f, " ...and {hidden} more")?;
        }
        Ok(())
    }
}

#[must_use]
pub fn literal_true(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::Bool(true)))
}

pub fn parse_database_map(value: &Value) -> Result<DatabaseMap, ShapeError> {
    let mut violations = Vec::new();
    let mut databases = DatabaseMap::new();

    let Some(root) = value.as_object() else {
        return Err(ShapeError::single(
            "response",
            format!("expected an object of databases, found {}", value_kind(value)),
        ));
    };

    for (database_name, database_value) in root {
        let Some(tables_value) = database_value.as_object() else {
            violations.push(ShapeViolation::new(
                database_name.clone(),
                format!(
                    "expected an object of tables, found {}",
                    value_kind(database_value)
                ),
            ));
            continue;
        };

        let mut tables = TableMap::new();
        for (table_name, table_value) in tables_value {
            let path = format!("{database_name}.{table_name}");
            if let Some(schema) =
                collect_table_schema(database_name, &path, table_value, &mut violations)
            {
                tables.insert(table_name.clone(), schema);
            }
        }
        databases.insert(database_name.clone(), tables);
    }

    if violations.is_empty() {
        Ok(databases)
    } else {
        Err(ShapeError::new(violations))
    }
}

pub fn parse_table_schema(
    database_name: &str,
    table_name: &str,
    value: &Value,
) -> Result<TableSchema, ShapeError> {
    let mut violations = Vec::new();
    let path = format!("{database_name}.{table_name}");
    let schema = collect_table_schema(database_name, &path, value, &mut violations);

    match schema {
        Some(schema) if violations.is_empty() => Ok(schema),
        _ => Err(ShapeError::new(violations)),
    }
}

pub fn parse_data_rows(value: &Value) -> Result<Vec<DataRow>, ShapeError> {
    let Some(entries) = value.as_array() else {
        return Err(ShapeError::single(
            "response",
            format!("expected an array of rows, found {}", value_kind(value)),
        ));
    };

    let mut violations = Vec::new();
    let mut rows = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        match entry.as_object() {
            Some(row) => rows.push(row.clone()),
            None => violations.push(ShapeViolation::new(
                format!("response[{index}]"),
                format!("expected a row object, found {}", value_kind(entry)),
            )),
        }
    }

    if violations.is_empty() {
        Ok(rows)
    } else {
        Err(ShapeError::new(violations))
    }
}

pub fn parse_json_object(value: &Value) -> Result<Map<String, Value>, ShapeError> {
    value.as_object().cloned().ok_or_else(|| {
        ShapeError::single(
            "response",
            format!("expected an object, found {}", value_kind(value)),
        )
    })
}

fn collect_table_schema(
    database_name: &str,
    path: &str,
    value: &Value,
    violations: &mut Vec<ShapeViolation>,
) -> Option<TableSchema> {
    let Some(fields) = value.as_object() else {
        violations.push(ShapeViolation::new(
            path.to_string(),
            format!("expected a schema object, found {}", value_kind(value)),
        ));
        return None;
    };

    let before = violations.len();
    let name = required_string(fields, "name", path, violations);
    let hash_attribute = required_string(fields, "hash_attribute", path, violations);
    let schema = match fields.get("schema") {
        None => Some(database_name.to_string()),
        Some(Value::String(schema)) => Some(schema.clone()),
        Some(other) => {
            violations.push(ShapeViolation::new(
                format!("{path}.schema"),
                format!("expected a string, found {}", value_kind(other)),
            ));
            None
        }
    };
    let record_count = match fields.get("record_count") {
        None => Some(0),
        Some(value) => match value.as_u64() {
            Some(count) => Some(count),
            None => {
                violations.push(ShapeViolation::new(
                    format!("{path}.record_count"),
                    format!(
                        "expected a non-negative integer, found {}",
                        value_kind(value)
                    ),
                ));
                None
            }
        },
    };
    let attributes = collect_attributes(fields.get("attributes"), path, violations);

    if violations.len() > before {
        return None;
    }

    let mut extra = Map::new();
    for (key, value) in fields {
        if !matches!(
            key.as_str(),
            "schema"
                | "name"
                | "hash_attribute"
                | "audit"
                | "schema_defined"
                | "record_count"
                | "attributes"
        ) {
            extra.insert(key.clone(), value.clone());
        }
    }

    Some(TableSchema {
        schema: schema?,
        name: name?,
        hash_attribute: hash_attribute?,
        audit: literal_true(fields.get("audit")),
        schema_defined: literal_true(fields.get("schema_defined")),
        record_count: record_count?,
        attributes: attributes?,
        extra,
    })
}

fn collect_attributes(
    value: Option<&Value>,
    path: &str,
    violations: &mut Vec<ShapeViolation>,
) -> Option<Vec<Attribute>> {
    let Some(value) = value else {
        violations.push(ShapeViolation::new(
            format!("{path}.attributes"),
            "missing required field".to_string(),
        ));
        return None;
    };
    let Some(entries) = value.as_array() else {
        violations.push(ShapeViolation::new(
            format!("{path}.attributes"),
            format!("expected an array, found {}", value_kind(value)),
        ));
        return None;
    };

    let before = violations.len();
    let mut attributes = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let entry_path = format!("{path}.attributes[{index}]");
        let Some(fields) = entry.as_object() else {
            violations.push(ShapeViolation::new(
                entry_path,
                format!("expected an attribute object, found {}", value_kind(entry)),
            ));
            continue;
        };

        let Some(Value::String(name)) = fields.get("name") else {
            violations.push(ShapeViolation::new(
                format!("{entry_path}.name"),
                "expected a string".to_string(),
            ));
            continue;
        };

        let relationship = match fields.get("relationship") {
            None | Some(Value::Null) => None,
            Some(Value::Object(relationship)) => match relationship.get("table") {
                Some(Value::String(table)) => Some(AttributeRelationship {
                    table: table.clone(),
                }),
                _ => {
                    violations.push(ShapeViolation::new(
                        format!("{entry_path}.relationship.table"),
                        "expected a string".to_string(),
                    ));
                    continue;
                }
            },
            Some(other) => {
                violations.push(ShapeViolation::new(
                    format!("{entry_path}.relationship"),
                    format!("expected an object, found {}", value_kind(other)),
                ));
                continue;
            }
        };

        attributes.push(Attribute {
            name: name.clone(),
            indexed: literal_true(fields.get("indexed")),
            is_primary_key: literal_true(fields.get("is_primary_key")),
            relationship,
        });
    }

    (violations.len() == before).then_some(attributes)
}

fn required_string(
    fields: &Map<String, Value>,
    key: &str,
    path: &str,
    violations: &mut Vec<ShapeViolation>,
) -> Option<String> {
    match fields.get(key) {
        Some(Value::String(value)) => Some(value.clone()),
        Some(other) => {
            violations.push(ShapeViolation::new(
                format!("{path}.{key}"),
                format!("expected a string, found {}", value_kind(other)),
            ));
            None
        }
        None => {
            violations.push(ShapeViolation::new(
                format!("{path}.{key}"),
                "missing required field".to_string(),
            ));
            None
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
