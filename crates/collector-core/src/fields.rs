//! Field-value coercion and rendering.
//!
//! Stored record values are plain JSON. This module converts user input into
//! stored values according to the declared [`FieldType`] (write path), reads
//! stored values back as a typed [`FieldValue`], and renders display strings
//! (read path).

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::defaults;
use crate::error::{Error, Result};
use crate::models::{FieldDefinition, FieldType};

/// A stored value interpreted against its field definition.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Boolean(bool),
}

impl FieldValue {
    /// Interpret a stored value as `field_type`, best effort.
    ///
    /// Returns `None` for missing or null values and for values that cannot be
    /// read as the declared type (for example text left behind after a field
    /// changed to `number`).
    pub fn read(field_type: FieldType, stored: Option<&JsonValue>) -> Option<Self> {
        let stored = stored?;
        match field_type {
            FieldType::Text => match stored {
                JsonValue::Null => None,
                JsonValue::String(s) => Some(FieldValue::Text(s.clone())),
                other => Some(FieldValue::Text(natural_string(other))),
            },
            FieldType::Number => match stored {
                JsonValue::Number(n) => n.as_f64().map(FieldValue::Number),
                JsonValue::String(s) => s
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|n| n.is_finite())
                    .map(FieldValue::Number),
                JsonValue::Bool(b) => Some(FieldValue::Number(if *b { 1.0 } else { 0.0 })),
                _ => None,
            },
            FieldType::Boolean => match stored {
                JsonValue::Bool(b) => Some(FieldValue::Boolean(*b)),
                JsonValue::String(s) => parse_flag(s).map(FieldValue::Boolean),
                JsonValue::Number(n) => n.as_f64().map(|n| FieldValue::Boolean(n != 0.0)),
                _ => None,
            },
        }
    }

    /// Infer a typed value from the stored JSON alone.
    pub fn infer(stored: &JsonValue) -> Option<Self> {
        match stored {
            JsonValue::Bool(b) => Some(FieldValue::Boolean(*b)),
            JsonValue::Number(n) => n.as_f64().map(FieldValue::Number),
            JsonValue::String(s) => Some(FieldValue::Text(s.clone())),
            JsonValue::Null => None,
            other => Some(FieldValue::Text(other.to_string())),
        }
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::Text(_) => FieldType::Text,
            FieldValue::Number(_) => FieldType::Number,
            FieldValue::Boolean(_) => FieldType::Boolean,
        }
    }

    /// Convert to the stored representation.
    pub fn to_json(&self) -> JsonValue {
        match self {
            FieldValue::Text(s) => JsonValue::String(s.clone()),
            FieldValue::Number(n) => number_to_json(*n),
            FieldValue::Boolean(b) => JsonValue::Bool(*b),
        }
    }
}

/// Raw value submitted from a form or API client.
///
/// A checkbox arrives as a JSON boolean, inputs as strings; API clients may
/// also send plain JSON numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldInput {
    Checked(bool),
    Number(f64),
    Text(String),
}

/// Coerce one submitted value into its stored form.
///
/// Booleans are stored as JSON booleans, never as strings. Numbers must parse
/// to a finite value; blank number input stores `null`. Text is stored as-is.
pub fn coerce_input(field: &FieldDefinition, input: &FieldInput) -> Result<JsonValue> {
    match (field.field_type, input) {
        (FieldType::Boolean, FieldInput::Checked(b)) => Ok(JsonValue::Bool(*b)),
        (FieldType::Boolean, FieldInput::Text(s)) => parse_flag(s)
            .map(JsonValue::Bool)
            .ok_or_else(|| Error::invalid_field(&field.name, format!("'{}' is not a yes/no value", s))),
        (FieldType::Boolean, FieldInput::Number(n)) => Err(Error::invalid_field(
            &field.name,
            format!("{} is not a yes/no value", n),
        )),

        (FieldType::Number, FieldInput::Number(n)) if n.is_finite() => Ok(number_to_json(*n)),
        (FieldType::Number, FieldInput::Number(_)) => {
            Err(Error::invalid_field(&field.name, "number must be finite"))
        }
        (FieldType::Number, FieldInput::Text(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(JsonValue::Null);
            }
            match trimmed.parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(number_to_json(n)),
                _ => Err(Error::invalid_field(
                    &field.name,
                    format!("'{}' is not a number", s),
                )),
            }
        }
        (FieldType::Number, FieldInput::Checked(_)) => Err(Error::invalid_field(
            &field.name,
            "expected a number, got a checkbox value",
        )),

        (FieldType::Text, FieldInput::Text(s)) => Ok(JsonValue::String(s.clone())),
        (FieldType::Text, FieldInput::Number(n)) => Ok(JsonValue::String(format_number(*n))),
        (FieldType::Text, FieldInput::Checked(_)) => Err(Error::invalid_field(
            &field.name,
            "expected text, got a checkbox value",
        )),
    }
}

/// Render a stored value for display.
///
/// Booleans render as Yes/No, missing/null/empty-string as N/A, everything
/// else in its natural string form.
pub fn display_value(stored: Option<&JsonValue>) -> String {
    match stored {
        None | Some(JsonValue::Null) => defaults::NOT_SET.to_string(),
        Some(JsonValue::String(s)) if s.is_empty() => defaults::NOT_SET.to_string(),
        Some(JsonValue::Bool(true)) => defaults::YES.to_string(),
        Some(JsonValue::Bool(false)) => defaults::NO.to_string(),
        Some(other) => natural_string(other),
    }
}

/// Render a stored value read against its declared type.
///
/// Stored booleans always render as Yes/No and stored integers keep their
/// exact digits. Falls back to [`display_value`] when the value does not fit
/// the type.
pub fn display_typed(field_type: FieldType, stored: Option<&JsonValue>) -> String {
    match stored {
        Some(JsonValue::Bool(_)) => return display_value(stored),
        Some(JsonValue::Number(n)) if is_integer(n) && field_type != FieldType::Boolean => {
            return n.to_string();
        }
        _ => {}
    }
    match FieldValue::read(field_type, stored) {
        Some(FieldValue::Text(s)) if s.is_empty() => defaults::NOT_SET.to_string(),
        Some(FieldValue::Text(s)) => s,
        Some(FieldValue::Number(n)) => format_number(n),
        Some(FieldValue::Boolean(true)) => defaults::YES.to_string(),
        Some(FieldValue::Boolean(false)) => defaults::NO.to_string(),
        None => display_value(stored),
    }
}

fn natural_string(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) if is_integer(n) => n.to_string(),
        JsonValue::Number(n) => match n.as_f64() {
            Some(f) => format_number(f),
            None => n.to_string(),
        },
        other => other.to_string(),
    }
}

fn is_integer(n: &serde_json::Number) -> bool {
    n.is_i64() || n.is_u64()
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Integral values are stored as JSON integers so `0` stays `0`, not `0.0`.
fn number_to_json(n: f64) -> JsonValue {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        JsonValue::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null)
    }
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Some(true),
        "false" | "off" | "no" | "0" | "" => Some(false),
        _ => None,
    }
}
