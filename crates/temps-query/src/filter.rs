//! In-memory reference semantics for conditions, sorts and pagination.
//!
//! Backends never use this to answer queries. It defines what a translated
//! query must select, and test doubles evaluate against it.

use crate::condition::{Condition, Operator};
use crate::query::{SelectQuery, Sort, SortDirection};
use crate::value::{AttributeValue, Entity, Scalar};
use std::cmp::Ordering;

/// Whether an entity satisfies a condition
pub fn matches(condition: &Condition, entity: &Entity) -> bool {
    match condition {
        Condition::Compare {
            operator,
            attribute,
        } => match entity.find(&attribute.name) {
            Some(actual) => compare_matches(*operator, actual, &attribute.value),
            None => false,
        },
        Condition::Not(child) => !matches(child, entity),
        Condition::And(children) => children.iter().all(|c| matches(c, entity)),
        Condition::Or(children) => children.iter().any(|c| matches(c, entity)),
    }
}

fn compare_matches(operator: Operator, actual: &AttributeValue, expected: &AttributeValue) -> bool {
    let ordering = compare_values(actual, expected);
    match operator {
        Operator::Equals => ordering == Some(Ordering::Equal) || actual == expected,
        Operator::GreaterThan => ordering == Some(Ordering::Greater),
        Operator::GreaterEquals => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        Operator::LesserThan => ordering == Some(Ordering::Less),
        Operator::LesserEquals => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        Operator::Like => match (actual, expected) {
            (
                AttributeValue::Scalar(Scalar::Text(text)),
                AttributeValue::Scalar(Scalar::Text(pattern)),
            ) => like(pattern, text),
            _ => false,
        },
        Operator::In => expected.as_list().is_some_and(|candidates| {
            candidates
                .iter()
                .any(|c| compare_values(actual, c) == Some(Ordering::Equal))
        }),
        Operator::Not | Operator::And | Operator::Or => false,
    }
}

/// Order two values of compatible kinds; `None` when they are not comparable
pub fn compare_values(left: &AttributeValue, right: &AttributeValue) -> Option<Ordering> {
    match (left, right) {
        (AttributeValue::Scalar(l), AttributeValue::Scalar(r)) => compare_scalars(l, r),
        _ => None,
    }
}

fn compare_scalars(left: &Scalar, right: &Scalar) -> Option<Ordering> {
    use Scalar::*;
    match (left, right) {
        (Null, Null) => Some(Ordering::Equal),
        (Bool(l), Bool(r)) => Some(l.cmp(r)),
        (Int(l), Int(r)) => Some(l.cmp(r)),
        (Float(l), Float(r)) => l.partial_cmp(r),
        (Int(l), Float(r)) => (*l as f64).partial_cmp(r),
        (Float(l), Int(r)) => l.partial_cmp(&(*r as f64)),
        (Text(l) | Enum(l), Text(r) | Enum(r)) => Some(l.cmp(r)),
        (Bytes(l), Bytes(r)) => Some(l.cmp(r)),
        (Date(l), Date(r)) => Some(l.cmp(r)),
        (Timestamp(l), Timestamp(r)) => Some(l.cmp(r)),
        (Uuid(l), Uuid(r)) => Some(l.cmp(r)),
        _ => None,
    }
}

/// Wildcard match: `%`/`*` match any run, `_`/`?` match one character
pub fn like(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    // matched[j]: pattern prefix consumed so far matches text[..j]
    let mut matched = vec![false; text.len() + 1];
    matched[0] = true;

    for p in &pattern {
        let mut next = vec![false; text.len() + 1];
        match p {
            '%' | '*' => {
                let mut any = false;
                for j in 0..=text.len() {
                    any |= matched[j];
                    next[j] = any;
                }
            }
            '_' | '?' => {
                for j in 1..=text.len() {
                    next[j] = matched[j - 1];
                }
            }
            c => {
                for j in 1..=text.len() {
                    next[j] = matched[j - 1] && text[j - 1] == *c;
                }
            }
        }
        matched = next;
    }

    matched[text.len()]
}

/// Stable sort; earlier sorts take precedence, missing attributes sort first
pub fn sort_entities(entities: &mut [Entity], sorts: &[Sort]) {
    entities.sort_by(|a, b| {
        for sort in sorts {
            let ordering = match (a.find(&sort.name), b.find(&sort.name)) {
                (Some(l), Some(r)) => compare_values(l, r).unwrap_or(Ordering::Equal),
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            let ordering = match sort.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

/// Window `[skip, skip + limit)`; limit 0 means unbounded
pub fn paginate(entities: Vec<Entity>, skip: u64, limit: u64) -> Vec<Entity> {
    let skipped = entities.into_iter().skip(to_usize(skip));
    if limit == 0 {
        skipped.collect()
    } else {
        skipped.take(to_usize(limit)).collect()
    }
}

fn to_usize(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

/// Evaluate a full select descriptor: filter, sort, paginate, project
pub fn apply<I>(query: &SelectQuery, entities: I) -> Vec<Entity>
where
    I: IntoIterator<Item = Entity>,
{
    let mut selected: Vec<Entity> = entities
        .into_iter()
        .filter(|e| e.collection == query.collection())
        .filter(|e| query.condition().map_or(true, |c| matches(c, e)))
        .collect();

    sort_entities(&mut selected, query.sorts());
    let mut page = paginate(selected, query.skip(), query.limit());

    if !query.projection().is_empty() {
        for entity in &mut page {
            entity
                .attributes
                .retain(|a| query.projection().contains(&a.name));
        }
    }
    page
}
