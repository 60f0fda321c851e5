//! Backend-neutral filter expressions
//!
//! A [`Condition`] is a strict tree built bottom-up: comparison leaves carry an
//! attribute, `Not` wraps exactly one child, `And`/`Or` carry one or more.

use crate::error::{DataError, Result};
use crate::value::{Attribute, AttributeValue};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operator tag of a condition node
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    Equals,
    GreaterThan,
    GreaterEquals,
    LesserThan,
    LesserEquals,
    Like,
    In,
    Not,
    And,
    Or,
}

impl Operator {
    /// Leaf operators compare one attribute against a value
    pub fn is_comparison(&self) -> bool {
        !matches!(self, Operator::Not | Operator::And | Operator::Or)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::Equals => write!(f, "EQUALS"),
            Operator::GreaterThan => write!(f, "GREATER_THAN"),
            Operator::GreaterEquals => write!(f, "GREATER_EQUALS_THAN"),
            Operator::LesserThan => write!(f, "LESSER_THAN"),
            Operator::LesserEquals => write!(f, "LESSER_EQUALS_THAN"),
            Operator::Like => write!(f, "LIKE"),
            Operator::In => write!(f, "IN"),
            Operator::Not => write!(f, "NOT"),
            Operator::And => write!(f, "AND"),
            Operator::Or => write!(f, "OR"),
        }
    }
}

/// Node of a filter expression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "node", rename_all = "lowercase")]
pub enum Condition {
    Compare {
        operator: Operator,
        attribute: Attribute,
    },
    Not(Box<Condition>),
    And(Vec<Condition>),
    Or(Vec<Condition>),
}

impl Condition {
    fn compare(
        operator: Operator,
        name: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        Condition::Compare {
            operator,
            attribute: Attribute::new(name, value),
        }
    }

    pub fn eq(name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self::compare(Operator::Equals, name, value)
    }

    pub fn gt(name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self::compare(Operator::GreaterThan, name, value)
    }

    pub fn gte(name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self::compare(Operator::GreaterEquals, name, value)
    }

    pub fn lt(name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self::compare(Operator::LesserThan, name, value)
    }

    pub fn lte(name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self::compare(Operator::LesserEquals, name, value)
    }

    pub fn like(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::compare(Operator::Like, name, pattern.into())
    }

    pub fn in_<V: Into<AttributeValue>>(name: impl Into<String>, values: Vec<V>) -> Self {
        Self::compare(Operator::In, name, values)
    }

    pub fn negate(self) -> Self {
        Condition::Not(Box::new(self))
    }

    /// Conjunction with another condition, extending an existing `And` in place
    pub fn and(self, other: Condition) -> Self {
        match self {
            Condition::And(mut children) => {
                children.push(other);
                Condition::And(children)
            }
            first => Condition::And(vec![first, other]),
        }
    }

    /// Disjunction with another condition, extending an existing `Or` in place
    pub fn or(self, other: Condition) -> Self {
        match self {
            Condition::Or(mut children) => {
                children.push(other);
                Condition::Or(children)
            }
            first => Condition::Or(vec![first, other]),
        }
    }

    pub fn all(children: Vec<Condition>) -> Self {
        Condition::And(children)
    }

    pub fn any(children: Vec<Condition>) -> Self {
        Condition::Or(children)
    }

    pub fn operator(&self) -> Operator {
        match self {
            Condition::Compare { operator, .. } => *operator,
            Condition::Not(_) => Operator::Not,
            Condition::And(_) => Operator::And,
            Condition::Or(_) => Operator::Or,
        }
    }

    /// Check structural invariants over the whole tree
    pub fn validate(&self) -> Result<()> {
        match self {
            Condition::Compare {
                operator,
                attribute,
            } => {
                if !operator.is_comparison() {
                    return Err(DataError::InvalidQuery(format!(
                        "{} cannot be used as a comparison on '{}'",
                        operator, attribute.name
                    )));
                }
                if attribute.name.is_empty() {
                    return Err(DataError::InvalidQuery(format!(
                        "{} requires an attribute name",
                        operator
                    )));
                }
                if *operator == Operator::In && attribute.value.as_list().is_none() {
                    return Err(DataError::InvalidQuery(format!(
                        "IN on '{}' requires a list value",
                        attribute.name
                    )));
                }
                Ok(())
            }
            Condition::Not(child) => child.validate(),
            Condition::And(children) | Condition::Or(children) => {
                if children.is_empty() {
                    return Err(DataError::InvalidQuery(format!(
                        "{} requires at least one condition",
                        self.operator()
                    )));
                }
                children.iter().try_for_each(Condition::validate)
            }
        }
    }
}
