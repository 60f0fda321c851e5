//! Keyspace metadata consulted when writing user-defined type values

use std::collections::HashMap;

/// Declared CQL type of a column or UDT field
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum CqlType {
    Text,
    Int,
    Bigint,
    Double,
    Boolean,
    Timestamp,
    Date,
    Uuid,
    Blob,
    List(Box<CqlType>),
    /// User-defined type, by name
    Udt(String),
}

/// A user-defined type with its fields in declaration order
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct UserType {
    pub name: String,
    pub fields: Vec<(String, CqlType)>,
}

impl UserType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, cql_type: CqlType) -> Self {
        self.fields.push((name.into(), cql_type));
        self
    }

    pub fn field_type(&self, name: &str) -> Option<&CqlType> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }
}

/// Schema lookups the translator needs; read fresh on every write
pub trait SchemaMetadata: Send + Sync {
    fn column_type(&self, keyspace: &str, table: &str, column: &str) -> Option<CqlType>;

    fn user_type(&self, keyspace: &str, name: &str) -> Option<UserType>;
}

/// Fixed schema, for deployments that declare their types up front
#[derive(Debug, Clone, Default)]
pub struct StaticSchema {
    columns: HashMap<(String, String, String), CqlType>,
    user_types: HashMap<(String, String), UserType>,
}

impl StaticSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column(
        mut self,
        keyspace: impl Into<String>,
        table: impl Into<String>,
        column: impl Into<String>,
        cql_type: CqlType,
    ) -> Self {
        self.columns
            .insert((keyspace.into(), table.into(), column.into()), cql_type);
        self
    }

    pub fn with_user_type(mut self, keyspace: impl Into<String>, user_type: UserType) -> Self {
        self.user_types
            .insert((keyspace.into(), user_type.name.clone()), user_type);
        self
    }
}

impl SchemaMetadata for StaticSchema {
    fn column_type(&self, keyspace: &str, table: &str, column: &str) -> Option<CqlType> {
        self.columns
            .get(&(keyspace.to_string(), table.to_string(), column.to_string()))
            .cloned()
    }

    fn user_type(&self, keyspace: &str, name: &str) -> Option<UserType> {
        self.user_types
            .get(&(keyspace.to_string(), name.to_string()))
            .cloned()
    }
}
