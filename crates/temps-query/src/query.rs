//! Immutable select and delete descriptors

use crate::condition::Condition;
use crate::error::{DataError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sort direction
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "asc"),
            SortDirection::Desc => write!(f, "desc"),
        }
    }
}

/// Ordering on one attribute
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Sort {
    pub name: String,
    pub direction: SortDirection,
}

impl Sort {
    pub fn asc(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Select descriptor: collection, projection, filter, sorts and pagination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectQuery {
    collection: String,
    projection: Vec<String>,
    condition: Option<Condition>,
    sorts: Vec<Sort>,
    limit: u64,
    skip: u64,
}

impl SelectQuery {
    pub fn builder(collection: impl Into<String>) -> SelectQueryBuilder {
        SelectQueryBuilder {
            collection: collection.into(),
            projection: Vec::new(),
            condition: None,
            sorts: Vec::new(),
            limit: 0,
            skip: 0,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Projected attribute names; empty means all attributes
    pub fn projection(&self) -> &[String] {
        &self.projection
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    pub fn sorts(&self) -> &[Sort] {
        &self.sorts
    }

    /// Maximum rows to return; 0 means unbounded
    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn skip(&self) -> u64 {
        self.skip
    }
}

/// Builder for [`SelectQuery`]
#[derive(Debug, Clone)]
pub struct SelectQueryBuilder {
    collection: String,
    projection: Vec<String>,
    condition: Option<Condition>,
    sorts: Vec<Sort>,
    limit: u64,
    skip: u64,
}

impl SelectQueryBuilder {
    pub fn project<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection.extend(names.into_iter().map(Into::into));
        self
    }

    /// Set the filter, combining with an existing one by conjunction
    pub fn filter(mut self, condition: Condition) -> Self {
        self.condition = Some(match self.condition.take() {
            Some(existing) => existing.and(condition),
            None => condition,
        });
        self
    }

    pub fn order_by(mut self, sort: Sort) -> Self {
        self.sorts.push(sort);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = skip;
        self
    }

    pub fn build(self) -> Result<SelectQuery> {
        validate_collection(&self.collection)?;
        if let Some(condition) = &self.condition {
            condition.validate()?;
        }

        Ok(SelectQuery {
            collection: self.collection,
            projection: self.projection,
            condition: self.condition,
            sorts: self.sorts,
            limit: self.limit,
            skip: self.skip,
        })
    }
}

/// Delete descriptor; no condition means every record in the collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteQuery {
    collection: String,
    condition: Option<Condition>,
}

impl DeleteQuery {
    pub fn builder(collection: impl Into<String>) -> DeleteQueryBuilder {
        DeleteQueryBuilder {
            collection: collection.into(),
            condition: None,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }
}

/// Builder for [`DeleteQuery`]
#[derive(Debug, Clone)]
pub struct DeleteQueryBuilder {
    collection: String,
    condition: Option<Condition>,
}

impl DeleteQueryBuilder {
    pub fn filter(mut self, condition: Condition) -> Self {
        self.condition = Some(match self.condition.take() {
            Some(existing) => existing.and(condition),
            None => condition,
        });
        self
    }

    pub fn build(self) -> Result<DeleteQuery> {
        validate_collection(&self.collection)?;
        if let Some(condition) = &self.condition {
            condition.validate()?;
        }

        Ok(DeleteQuery {
            collection: self.collection,
            condition: self.condition,
        })
    }
}

fn validate_collection(collection: &str) -> Result<()> {
    if collection.trim().is_empty() {
        return Err(DataError::InvalidQuery(
            "collection name is required".to_string(),
        ));
    }
    Ok(())
}

/// Start a select descriptor for a collection
pub fn select(collection: impl Into<String>) -> SelectQueryBuilder {
    SelectQuery::builder(collection)
}

/// Start a delete descriptor for a collection
pub fn delete(collection: impl Into<String>) -> DeleteQueryBuilder {
    DeleteQuery::builder(collection)
}
