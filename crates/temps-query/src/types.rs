use crate::value::Entity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Static, backend-level capability flags
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// Per-record expiry on insert/update
    Ttl,
    /// Native OR across clauses
    Disjunction,
    /// Native NOT
    Negation,
    /// Nested structural values
    NestedValues,
    /// Backend-specific query passthrough
    NativeQuery,
    /// Server-side paging with fetch size and paging state
    Paging,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Ttl => write!(f, "ttl"),
            Capability::Disjunction => write!(f, "disjunction"),
            Capability::Negation => write!(f, "negation"),
            Capability::NestedValues => write!(f, "nested-values"),
            Capability::NativeQuery => write!(f, "native-query"),
            Capability::Paging => write!(f, "paging"),
        }
    }
}

/// One-shot, lazily consumed sequence of selected entities
#[derive(Debug)]
pub struct ResultSet {
    entities: std::vec::IntoIter<Entity>,
}

impl ResultSet {
    pub fn new(entities: Vec<Entity>) -> Self {
        Self {
            entities: entities.into_iter(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

impl Iterator for ResultSet {
    type Item = Entity;

    fn next(&mut self) -> Option<Entity> {
        self.entities.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entities.size_hint()
    }
}

impl ExactSizeIterator for ResultSet {}

impl From<Vec<Entity>> for ResultSet {
    fn from(entities: Vec<Entity>) -> Self {
        Self::new(entities)
    }
}
