//! Row values and REST cell decoding
//!
//! The REST API encodes every scalar as a JSON string wrapped in a
//! `{"v": ...}` cell, records as `{"f": [cells]}` and repeated fields as a
//! list of cells. Decoding is driven by the result [`Schema`] so callers get
//! a closed [`Value`] instead of raw JSON.

use crate::error::WarehouseError;
use crate::schema::{Field, FieldType, Schema};
use base64::Engine;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use serde_json::Value as JsonValue;
use std::borrow::Cow;
use std::collections::HashMap;

/// A raw result row, positionally aligned with its schema
pub type Row = Vec<Value>;

/// A result row keyed by column name
pub type StructuredRow = HashMap<String, Value>;

/// A single value produced by the warehouse's type system
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),

    /// NUMERIC / BIGNUMERIC kept as exact decimal text
    Numeric(String),

    String(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Timestamp(DateTime<Utc>),
    Json(JsonValue),

    /// RECORD members in schema order
    Record(Vec<(String, Value)>),

    /// Elements of a REPEATED field
    Array(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Numeric(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Look up a member of a RECORD value by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Record(members) => members.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Render as JSON for display or re-serialization
    ///
    /// Temporal values use ISO-8601 text, bytes use standard base64 and
    /// non-finite floats become `null`.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Bool(b) => JsonValue::Bool(*b),
            Self::Int(i) => JsonValue::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Self::Numeric(s) | Self::String(s) => JsonValue::String(s.clone()),
            Self::Bytes(b) => JsonValue::String(base64::engine::general_purpose::STANDARD.encode(b)),
            Self::Date(d) => JsonValue::String(d.to_string()),
            Self::Time(t) => JsonValue::String(t.to_string()),
            Self::DateTime(dt) => JsonValue::String(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
            Self::Timestamp(ts) => JsonValue::String(ts.to_rfc3339_opts(SecondsFormat::Micros, true)),
            Self::Json(j) => j.clone(),
            Self::Record(members) => JsonValue::Object(
                members
                    .iter()
                    .map(|(name, value)| (name.clone(), value.to_json()))
                    .collect(),
            ),
            Self::Array(items) => JsonValue::Array(items.iter().map(Value::to_json).collect()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Self::Null)
    }
}

/// Decode one REST row (the `v` payload of each cell) against a schema
///
/// A missing cell payload decodes as [`Value::Null`].
pub fn decode_row(schema: &Schema, cells: &[Option<JsonValue>]) -> Result<Row, WarehouseError> {
    if cells.len() != schema.len() {
        return Err(WarehouseError::query(format!(
            "row has {} cells but schema {} has {} fields",
            cells.len(),
            schema,
            schema.len()
        )));
    }

    schema
        .fields
        .iter()
        .zip(cells)
        .map(|(field, cell)| match cell {
            Some(v) => decode_cell(field, v),
            None => Ok(Value::Null),
        })
        .collect()
}

/// Decode a single cell payload for the given field
pub fn decode_cell(field: &Field, v: &JsonValue) -> Result<Value, WarehouseError> {
    if v.is_null() {
        return Ok(Value::Null);
    }

    if field.is_repeated() {
        let items = v.as_array().ok_or_else(|| {
            WarehouseError::query(format!("repeated field '{}' is not a list: {}", field.name, v))
        })?;
        return items
            .iter()
            .map(|item| decode_single(field, unwrap_cell(item)))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array);
    }

    decode_single(field, v)
}

/// `{"v": x}` -> `x`; anything else is returned unchanged
fn unwrap_cell(item: &JsonValue) -> &JsonValue {
    match item.as_object().and_then(|o| o.get("v")) {
        Some(inner) => inner,
        None => item,
    }
}

fn decode_single(field: &Field, v: &JsonValue) -> Result<Value, WarehouseError> {
    if v.is_null() {
        return Ok(Value::Null);
    }

    match field.field_type {
        FieldType::Record => decode_record(field, v),
        FieldType::Json => match v {
            JsonValue::String(s) => serde_json::from_str(s)
                .map(Value::Json)
                .map_err(|e| mismatch(field, v, e)),
            other => Ok(Value::Json(other.clone())),
        },
        _ => {
            let text = scalar_text(field, v)?;
            decode_scalar(field, &text).map_err(|e| mismatch(field, v, e))
        }
    }
}

fn decode_record(field: &Field, v: &JsonValue) -> Result<Value, WarehouseError> {
    let cells = v
        .get("f")
        .and_then(JsonValue::as_array)
        .ok_or_else(|| mismatch(field, v, "expected an object with an 'f' list"))?;

    if cells.len() != field.fields.len() {
        return Err(mismatch(
            field,
            v,
            format!("record has {} members, schema declares {}", cells.len(), field.fields.len()),
        ));
    }

    field
        .fields
        .iter()
        .zip(cells)
        .map(|(member, cell)| {
            decode_cell(member, unwrap_cell(cell)).map(|value| (member.name.clone(), value))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Record)
}

fn scalar_text<'a>(field: &Field, v: &'a JsonValue) -> Result<Cow<'a, str>, WarehouseError> {
    match v {
        JsonValue::String(s) => Ok(Cow::Borrowed(s.as_str())),
        JsonValue::Number(n) => Ok(Cow::Owned(n.to_string())),
        JsonValue::Bool(b) => Ok(Cow::Owned(b.to_string())),
        _ => Err(mismatch(field, v, "expected a scalar")),
    }
}

fn decode_scalar(field: &Field, text: &str) -> Result<Value, String> {
    match field.field_type {
        FieldType::Integer => text.parse::<i64>().map(Value::Int).map_err(|e| e.to_string()),
        FieldType::Float => parse_float(text).map(Value::Float),
        FieldType::Numeric | FieldType::BigNumeric => Ok(Value::Numeric(text.to_string())),
        FieldType::Boolean => match text.to_ascii_lowercase().as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            other => Err(format!("invalid boolean '{}'", other)),
        },
        FieldType::Bytes => base64::engine::general_purpose::STANDARD
            .decode(text)
            .map(Value::Bytes)
            .map_err(|e| e.to_string()),
        FieldType::Date => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map(Value::Date)
            .map_err(|e| e.to_string()),
        FieldType::Time => NaiveTime::parse_from_str(text, "%H:%M:%S%.f")
            .map(Value::Time)
            .map_err(|e| e.to_string()),
        FieldType::DateTime => NaiveDateTime::parse_from_str(&text.replacen(' ', "T", 1), "%Y-%m-%dT%H:%M:%S%.f")
            .map(Value::DateTime)
            .map_err(|e| e.to_string()),
        FieldType::Timestamp => parse_timestamp(text).map(Value::Timestamp),
        FieldType::String
        | FieldType::Geography
        | FieldType::Interval
        | FieldType::Range
        | FieldType::Unknown => Ok(Value::String(text.to_string())),
        FieldType::Record | FieldType::Json => unreachable!("handled in decode_single"),
    }
}

fn parse_float(text: &str) -> Result<f64, String> {
    match text {
        "NaN" => Ok(f64::NAN),
        "Infinity" => Ok(f64::INFINITY),
        "-Infinity" => Ok(f64::NEG_INFINITY),
        other => other.parse::<f64>().map_err(|e| e.to_string()),
    }
}

/// TIMESTAMP cells are epoch seconds as decimal text (`1.7E9`,
/// `1700000000.123456`); RFC 3339 text is accepted as well.
fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, String> {
    if let Some(micros) = epoch_micros(text) {
        let micros = i64::try_from(micros)
            .map_err(|_| format!("timestamp '{}' out of range", text))?;
        let nanos = (micros.rem_euclid(1_000_000) * 1_000) as u32;
        return DateTime::from_timestamp(micros.div_euclid(1_000_000), nanos)
            .ok_or_else(|| format!("timestamp '{}' out of range", text));
    }

    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| e.to_string())
}

/// Exact decimal seconds to microseconds, rounding half away from zero
///
/// A float loses microseconds past 2^53 of them (around 2255), so the digits
/// are scaled as integers instead. Returns `None` for anything that is not a
/// plain or exponent-form decimal.
fn epoch_micros(text: &str) -> Option<i128> {
    let (negative, unsigned) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };

    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(at) => (&unsigned[..at], unsigned[at + 1..].parse::<i32>().ok()?),
        None => (unsigned, 0),
    };

    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let digits = format!("{}{}", whole, fraction);
    let digits = digits.trim_start_matches('0');
    if digits.len() > 30 {
        return None;
    }
    let value: i128 = if digits.is_empty() { 0 } else { digits.parse().ok()? };

    // value * 10^shift microseconds
    let shift = 6 + exponent - fraction.len() as i32;
    let micros = if shift >= 0 {
        value.checked_mul(10i128.checked_pow(u32::try_from(shift).ok()?)?)?
    } else {
        let divisor = 10i128.checked_pow(u32::try_from(-shift).ok()?).unwrap_or(i128::MAX);
        let quotient = value / divisor;
        if (value % divisor) * 2 >= divisor {
            quotient + 1
        } else {
            quotient
        }
    };

    Some(if negative { -micros } else { micros })
}

fn mismatch(field: &Field, v: &JsonValue, reason: impl std::fmt::Display) -> WarehouseError {
    WarehouseError::query(format!(
        "cannot decode {} value {} for column '{}': {}",
        field.field_type, v, field.name, reason
    ))
}

/// Project a raw row onto column names by position
///
/// Column `i` maps to `row[i]`. A row whose length differs from the column
/// count is rejected rather than silently truncated.
pub fn structure_row(columns: &[String], row: Row) -> Result<StructuredRow, WarehouseError> {
    if row.len() != columns.len() {
        return Err(WarehouseError::query(format!(
            "row has {} values but the schema has {} columns",
            row.len(),
            columns.len()
        )));
    }

    Ok(columns.iter().cloned().zip(row).collect())
}
