//! Value coercion from [`AttributeValue`] into a backend's wire form
//!
//! Each backend owns a [`Coercion`] built around its own [`CodecRegistry`].
//! Scalars go through three stages, in order:
//!
//! 1. pass-through when the registry accepts the scalar kind natively
//! 2. generic conversion to a canonical wire type (date -> epoch days,
//!    timestamp -> epoch millis, enum/uuid -> text, bytes -> base64 text)
//! 3. `UnsupportedValue`
//!
//! Structural values are not handled here; backends resolve or reject them.

use crate::error::{DataError, Result};
use crate::value::{AttributeValue, Scalar, ScalarKind};
use base64::Engine;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashSet;
use uuid::Uuid;

/// Backend-neutral wire value produced by coercion
#[derive(Debug, Clone, PartialEq)]
pub enum NativeValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Blob(Vec<u8>),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
    List(Vec<NativeValue>),
    /// Value of a backend-registered user-defined type
    Udt {
        type_name: String,
        fields: Vec<(String, NativeValue)>,
    },
}

impl NativeValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            NativeValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Answers whether a backend codec accepts a scalar kind without conversion
pub trait CodecRegistry: Send + Sync {
    fn accepts(&self, kind: ScalarKind) -> bool;
}

/// Fixed set of natively accepted kinds
#[derive(Debug, Clone, Default)]
pub struct StaticCodecs {
    kinds: HashSet<ScalarKind>,
}

impl StaticCodecs {
    pub fn new<I: IntoIterator<Item = ScalarKind>>(kinds: I) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
        }
    }

    /// Kinds every JSON-speaking backend accepts as-is
    pub fn json() -> Self {
        Self::new([
            ScalarKind::Null,
            ScalarKind::Bool,
            ScalarKind::Int,
            ScalarKind::Float,
            ScalarKind::Text,
        ])
    }
}

impl CodecRegistry for StaticCodecs {
    fn accepts(&self, kind: ScalarKind) -> bool {
        self.kinds.contains(&kind)
    }
}

/// Per-backend coercion strategy
#[derive(Debug, Clone)]
pub struct Coercion<R> {
    codecs: R,
}

impl<R: CodecRegistry> Coercion<R> {
    pub fn new(codecs: R) -> Self {
        Self { codecs }
    }

    pub fn codecs(&self) -> &R {
        &self.codecs
    }

    /// Coerce a scalar or a list of scalars
    pub fn coerce(&self, value: &AttributeValue) -> Result<NativeValue> {
        match value {
            AttributeValue::Scalar(scalar) => self.coerce_scalar(scalar),
            AttributeValue::List(items) => items
                .iter()
                .map(|item| self.coerce(item))
                .collect::<Result<Vec<_>>>()
                .map(NativeValue::List),
            AttributeValue::Structural(_) => Err(DataError::unsupported_value(
                "structural values require backend type resolution",
            )),
        }
    }

    pub fn coerce_scalar(&self, scalar: &Scalar) -> Result<NativeValue> {
        if self.codecs.accepts(scalar.kind()) {
            if let Some(native) = pass_through(scalar) {
                return Ok(native);
            }
        }
        generic_conversion(scalar).ok_or_else(|| {
            DataError::unsupported_value(format!(
                "no representation for {} values on this backend",
                scalar.kind()
            ))
        })
    }
}

fn pass_through(scalar: &Scalar) -> Option<NativeValue> {
    let native = match scalar {
        Scalar::Null => NativeValue::Null,
        Scalar::Bool(b) => NativeValue::Bool(*b),
        Scalar::Int(i) => NativeValue::Int(*i),
        Scalar::Float(f) => NativeValue::Float(*f),
        Scalar::Text(s) => NativeValue::Text(s.clone()),
        Scalar::Bytes(b) => NativeValue::Blob(b.clone()),
        Scalar::Date(d) => NativeValue::Date(*d),
        Scalar::Timestamp(t) => NativeValue::Timestamp(*t),
        Scalar::Uuid(u) => NativeValue::Uuid(*u),
        // Enums never have a native codec
        Scalar::Enum(_) => return None,
    };
    Some(native)
}

fn generic_conversion(scalar: &Scalar) -> Option<NativeValue> {
    let native = match scalar {
        Scalar::Null => NativeValue::Null,
        Scalar::Bool(b) => NativeValue::Bool(*b),
        Scalar::Int(i) => NativeValue::Int(*i),
        Scalar::Float(f) => NativeValue::Float(*f),
        Scalar::Text(s) | Scalar::Enum(s) => NativeValue::Text(s.clone()),
        Scalar::Bytes(b) => {
            NativeValue::Text(base64::engine::general_purpose::STANDARD.encode(b))
        }
        Scalar::Date(d) => NativeValue::Int(epoch_days(d)?),
        Scalar::Timestamp(t) => NativeValue::Int(t.timestamp_millis()),
        Scalar::Uuid(u) => NativeValue::Text(u.to_string()),
    };
    Some(native)
}

fn epoch_days(date: &NaiveDate) -> Option<i64> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
    Some(date.signed_duration_since(epoch).num_days())
}

/// Convert a wire value back into an attribute value
pub fn to_attribute_value(native: NativeValue) -> AttributeValue {
    match native {
        NativeValue::Null => AttributeValue::Scalar(Scalar::Null),
        NativeValue::Bool(b) => AttributeValue::Scalar(Scalar::Bool(b)),
        NativeValue::Int(i) => AttributeValue::Scalar(Scalar::Int(i)),
        NativeValue::Float(f) => AttributeValue::Scalar(Scalar::Float(f)),
        NativeValue::Text(s) => AttributeValue::Scalar(Scalar::Text(s)),
        NativeValue::Blob(b) => AttributeValue::Scalar(Scalar::Bytes(b)),
        NativeValue::Date(d) => AttributeValue::Scalar(Scalar::Date(d)),
        NativeValue::Timestamp(t) => AttributeValue::Scalar(Scalar::Timestamp(t)),
        NativeValue::Uuid(u) => AttributeValue::Scalar(Scalar::Uuid(u)),
        NativeValue::List(items) => {
            AttributeValue::List(items.into_iter().map(to_attribute_value).collect())
        }
        NativeValue::Udt { fields, .. } => AttributeValue::Structural(
            fields
                .into_iter()
                .map(|(name, value)| (name, to_attribute_value(value)))
                .collect(),
        ),
    }
}
