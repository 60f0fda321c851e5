//! Backend-neutral attribute values and the attribute-list form of an entity

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// A single typed scalar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
    /// Symbolic enum constant, carried by name
    Enum(String),
}

impl Scalar {
    /// Kind tag, used by codec registries to decide pass-through
    pub fn kind(&self) -> ScalarKind {
        match self {
            Scalar::Null => ScalarKind::Null,
            Scalar::Bool(_) => ScalarKind::Bool,
            Scalar::Int(_) => ScalarKind::Int,
            Scalar::Float(_) => ScalarKind::Float,
            Scalar::Text(_) => ScalarKind::Text,
            Scalar::Bytes(_) => ScalarKind::Bytes,
            Scalar::Date(_) => ScalarKind::Date,
            Scalar::Timestamp(_) => ScalarKind::Timestamp,
            Scalar::Uuid(_) => ScalarKind::Uuid,
            Scalar::Enum(_) => ScalarKind::Enum,
        }
    }
}

/// Kind of a scalar, without its payload
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    Null,
    Bool,
    Int,
    Float,
    Text,
    Bytes,
    Date,
    Timestamp,
    Uuid,
    Enum,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarKind::Null => write!(f, "null"),
            ScalarKind::Bool => write!(f, "bool"),
            ScalarKind::Int => write!(f, "int"),
            ScalarKind::Float => write!(f, "float"),
            ScalarKind::Text => write!(f, "text"),
            ScalarKind::Bytes => write!(f, "bytes"),
            ScalarKind::Date => write!(f, "date"),
            ScalarKind::Timestamp => write!(f, "timestamp"),
            ScalarKind::Uuid => write!(f, "uuid"),
            ScalarKind::Enum => write!(f, "enum"),
        }
    }
}

/// Value of an attribute: a scalar, an ordered list, or a nested structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeValue {
    Scalar(Scalar),
    List(Vec<AttributeValue>),
    Structural(BTreeMap<String, AttributeValue>),
}

impl AttributeValue {
    pub fn null() -> Self {
        AttributeValue::Scalar(Scalar::Null)
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            AttributeValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[AttributeValue]> {
        match self {
            AttributeValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// True for structural values and lists that contain one at any depth
    pub fn is_composite(&self) -> bool {
        match self {
            AttributeValue::Scalar(_) => false,
            AttributeValue::List(items) => items.iter().any(AttributeValue::is_composite),
            AttributeValue::Structural(_) => true,
        }
    }

    /// Build a structural value from name/value pairs
    pub fn structural<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<AttributeValue>,
    {
        AttributeValue::Structural(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

macro_rules! scalar_from {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for AttributeValue {
            fn from(value: $ty) -> Self {
                AttributeValue::Scalar(Scalar::$variant(value.into()))
            }
        }
    };
}

scalar_from!(bool, Bool);
scalar_from!(i32, Int);
scalar_from!(i64, Int);
scalar_from!(f64, Float);
scalar_from!(String, Text);
scalar_from!(&str, Text);
scalar_from!(NaiveDate, Date);
scalar_from!(DateTime<Utc>, Timestamp);
scalar_from!(Uuid, Uuid);

impl From<Scalar> for AttributeValue {
    fn from(value: Scalar) -> Self {
        AttributeValue::Scalar(value)
    }
}

impl<T: Into<AttributeValue>> From<Vec<T>> for AttributeValue {
    fn from(values: Vec<T>) -> Self {
        AttributeValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// A named value on an entity (a column or a document field)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: AttributeValue,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An entity as an ordered list of attributes, owned by a collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub collection: String,
    pub attributes: Vec<Attribute>,
}

impl Entity {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            attributes: Vec::new(),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.add(Attribute::new(name, value));
        self
    }

    /// Add an attribute, replacing any attribute with the same name
    pub fn add(&mut self, attribute: Attribute) {
        match self.attributes.iter_mut().find(|a| a.name == attribute.name) {
            Some(existing) => existing.value = attribute.value,
            None => self.attributes.push(attribute),
        }
    }

    pub fn find(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| &a.value)
    }

    pub fn remove(&mut self, name: &str) -> Option<AttributeValue> {
        let index = self.attributes.iter().position(|a| a.name == name)?;
        Some(self.attributes.remove(index).value)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}
