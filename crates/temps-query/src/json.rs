//! JSON mapping shared by document-shaped backends

use crate::coercion::NativeValue;
use crate::value::AttributeValue;
use chrono::SecondsFormat;
use serde_json::{Number, Value};

pub fn native_to_json(native: NativeValue) -> Value {
    match native {
        NativeValue::Null => Value::Null,
        NativeValue::Bool(b) => Value::Bool(b),
        NativeValue::Int(i) => Value::from(i),
        NativeValue::Float(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        NativeValue::Text(s) => Value::String(s),
        NativeValue::Blob(b) => Value::from(b),
        NativeValue::Date(d) => Value::String(d.to_string()),
        NativeValue::Timestamp(t) => Value::String(t.to_rfc3339_opts(SecondsFormat::Millis, true)),
        NativeValue::Uuid(u) => Value::String(u.to_string()),
        NativeValue::List(items) => Value::Array(items.into_iter().map(native_to_json).collect()),
        NativeValue::Udt { fields, .. } => Value::Object(
            fields
                .into_iter()
                .map(|(name, value)| (name, native_to_json(value)))
                .collect(),
        ),
    }
}

/// Integral numbers become `Int`, other numbers `Float`
pub fn json_to_value(json: Value) -> AttributeValue {
    match json {
        Value::Null => AttributeValue::null(),
        Value::Bool(b) => AttributeValue::from(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => AttributeValue::from(i),
            None => AttributeValue::from(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => AttributeValue::from(s),
        Value::Array(items) => AttributeValue::List(items.into_iter().map(json_to_value).collect()),
        Value::Object(fields) => AttributeValue::Structural(
            fields
                .into_iter()
                .map(|(name, value)| (name, json_to_value(value)))
                .collect(),
        ),
    }
}
