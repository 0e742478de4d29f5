//! Result schema types
//!
//! A [`Schema`] is the ordered list of field descriptors the service reports
//! for a query result. Only the names are surfaced to structured-row
//! callers; the type and mode drive cell decoding.

use serde::{Deserialize, Serialize};

/// BigQuery column type as reported in a result schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldType {
    String,
    Bytes,
    Integer,
    Float,
    Numeric,
    BigNumeric,
    Boolean,
    Timestamp,
    Date,
    Time,
    DateTime,
    Geography,
    Json,
    Interval,
    Range,
    Record,

    /// Type name this adapter does not recognise; cells decode as strings
    Unknown,
}

impl FieldType {
    /// Map a type name from the REST schema to a [`FieldType`]
    ///
    /// Accepts both the legacy names (`INTEGER`, `RECORD`) and the GoogleSQL
    /// aliases (`INT64`, `STRUCT`), case-insensitively.
    pub fn from_type_name(name: &str) -> Self {
        match name.trim().to_uppercase().as_str() {
            "STRING" => Self::String,
            "BYTES" => Self::Bytes,
            "INTEGER" | "INT64" => Self::Integer,
            "FLOAT" | "FLOAT64" => Self::Float,
            "NUMERIC" | "DECIMAL" => Self::Numeric,
            "BIGNUMERIC" | "BIGDECIMAL" => Self::BigNumeric,
            "BOOLEAN" | "BOOL" => Self::Boolean,
            "TIMESTAMP" => Self::Timestamp,
            "DATE" => Self::Date,
            "TIME" => Self::Time,
            "DATETIME" => Self::DateTime,
            "GEOGRAPHY" => Self::Geography,
            "JSON" => Self::Json,
            "INTERVAL" => Self::Interval,
            "RANGE" => Self::Range,
            "RECORD" | "STRUCT" => Self::Record,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::String => "STRING",
            Self::Bytes => "BYTES",
            Self::Integer => "INTEGER",
            Self::Float => "FLOAT",
            Self::Numeric => "NUMERIC",
            Self::BigNumeric => "BIGNUMERIC",
            Self::Boolean => "BOOLEAN",
            Self::Timestamp => "TIMESTAMP",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::DateTime => "DATETIME",
            Self::Geography => "GEOGRAPHY",
            Self::Json => "JSON",
            Self::Interval => "INTERVAL",
            Self::Range => "RANGE",
            Self::Record => "RECORD",
            Self::Unknown => "UNKNOWN",
        };
        write!(f, "{}", name)
    }
}

/// Field mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldMode {
    #[default]
    Nullable,
    Required,
    Repeated,
}

impl FieldMode {
    /// Parse a REST mode string; a missing mode means NULLABLE
    pub fn from_mode_name(mode: Option<&str>) -> Self {
        match mode.map(|m| m.trim().to_uppercase()) {
            Some(m) if m == "REQUIRED" => Self::Required,
            Some(m) if m == "REPEATED" => Self::Repeated,
            _ => Self::Nullable,
        }
    }
}

/// A single field descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    /// Column name
    pub name: String,

    /// Column type
    pub field_type: FieldType,

    /// Nullable, required or repeated
    #[serde(default)]
    pub mode: FieldMode,

    /// Member fields of a RECORD column, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,
}

impl Field {
    /// Create a nullable field with no nested members
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            mode: FieldMode::Nullable,
            fields: Vec::new(),
        }
    }

    /// Create a RECORD field from its members
    pub fn record(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Record,
            mode: FieldMode::Nullable,
            fields,
        }
    }

    /// Builder: set mode
    pub fn with_mode(mut self, mode: FieldMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn is_repeated(&self) -> bool {
        self.mode == FieldMode::Repeated
    }
}

/// Ordered field descriptors describing a result's columns
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn from_fields(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Column names in schema order
    pub fn column_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    /// Find a field by name (case-sensitive)
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

impl std::fmt::Display for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|field| format!("{}:{}", field.name, field.field_type))
            .collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_name_mapping() {
        assert_eq!(FieldType::from_type_name("INT64"), FieldType::Integer);
        assert_eq!(FieldType::from_type_name("integer"), FieldType::Integer);
        assert_eq!(FieldType::from_type_name("FLOAT64"), FieldType::Float);
        assert_eq!(FieldType::from_type_name("BOOL"), FieldType::Boolean);
        assert_eq!(FieldType::from_type_name("STRUCT"), FieldType::Record);
        assert_eq!(FieldType::from_type_name("BIGNUMERIC"), FieldType::BigNumeric);
        assert_eq!(FieldType::from_type_name("GEOGRAPHY"), FieldType::Geography);
        assert_eq!(FieldType::from_type_name("SOMETHING_NEW"), FieldType::Unknown);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!(FieldMode::from_mode_name(None), FieldMode::Nullable);
        assert_eq!(FieldMode::from_mode_name(Some("REPEATED")), FieldMode::Repeated);
        assert_eq!(FieldMode::from_mode_name(Some("required")), FieldMode::Required);
        assert_eq!(FieldMode::from_mode_name(Some("NULLABLE")), FieldMode::Nullable);
    }

    #[test]
    fn test_column_names_keep_order() {
        let schema = Schema::from_fields(vec![
            Field::new("name", FieldType::String),
            Field::new("age", FieldType::Integer),
            Field::record("address", vec![Field::new("city", FieldType::String)]),
        ]);

        assert_eq!(schema.len(), 3);
        assert_eq!(schema.column_names(), vec!["name", "age", "address"]);
        assert_eq!(schema.field("address").map(|f| f.fields.len()), Some(1));
        assert_eq!(schema.to_string(), "[name:STRING, age:INTEGER, address:RECORD]");
    }
}
