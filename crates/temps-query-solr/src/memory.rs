//! In-memory core evaluating [`SolrExpr`] trees.
//!
//! Raw `q` strings are only understood as `field:value` terms joined by `AND`.

use crate::client::SolrClient;
use crate::document::{SolrDocument, ID_FIELD};
use crate::expr::{Bound, SolrExpr};
use crate::translate::SolrQuery;
use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::Mutex;
use temps_query::coercion::to_attribute_value;
use temps_query::filter::{compare_values, like};
use temps_query::json::json_to_value;
use temps_query::{AttributeValue, NativeValue, Result, Scalar, SortDirection};

#[derive(Default)]
pub struct MemoryClient {
    documents: Mutex<Vec<SolrDocument>>,
    writes: Mutex<usize>,
}

impl MemoryClient {
    pub fn writes(&self) -> usize {
        *self.writes.lock().unwrap()
    }
}

// Multi-valued fields match when any value does
fn values(document: &SolrDocument, field: &str) -> Vec<AttributeValue> {
    match document.get(field) {
        Some(Value::Array(items)) => items.iter().cloned().map(json_to_value).collect(),
        Some(value) => vec![json_to_value(value.clone())],
        None => Vec::new(),
    }
}

fn compare(actual: &AttributeValue, expected: &NativeValue) -> Option<Ordering> {
    compare_values(actual, &to_attribute_value(expected.clone()))
}

fn within(actual: &AttributeValue, bound: &Option<Bound>, lower: bool) -> bool {
    let Some(bound) = bound else {
        return true;
    };
    match (compare(actual, &bound.value), lower) {
        (Some(Ordering::Equal), _) => bound.inclusive,
        (Some(Ordering::Greater), true) | (Some(Ordering::Less), false) => true,
        _ => false,
    }
}

fn evaluate(expr: &SolrExpr, document: &SolrDocument) -> bool {
    match expr {
        SolrExpr::MatchAll => true,
        SolrExpr::Term { field, value } => values(document, field)
            .iter()
            .any(|v| compare(v, value) == Some(Ordering::Equal)),
        SolrExpr::Range {
            field,
            lower,
            upper,
        } => values(document, field)
            .iter()
            .any(|v| within(v, lower, true) && within(v, upper, false)),
        SolrExpr::Wildcard { field, pattern } => {
            values(document, field).iter().any(|v| match v {
                AttributeValue::Scalar(Scalar::Text(text)) => like(pattern, text),
                _ => false,
            })
        }
        SolrExpr::In { field, values: candidates } => values(document, field).iter().any(|v| {
            candidates
                .iter()
                .any(|c| compare(v, c) == Some(Ordering::Equal))
        }),
        SolrExpr::And(children) => children.iter().all(|c| evaluate(c, document)),
        SolrExpr::Or(children) => children.iter().any(|c| evaluate(c, document)),
        SolrExpr::Not(child) => !evaluate(child, document),
    }
}

fn unescape(raw: &str) -> String {
    let mut out = String::new();
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            out.extend(chars.next());
        } else {
            out.push(c);
        }
    }
    out
}

fn raw_matches(q: &str, document: &SolrDocument) -> bool {
    q.split(" AND ").all(|term| {
        let Some((field, expected)) = term.split_once(':') else {
            return false;
        };
        let expected = unescape(expected);
        document.get(field).is_some_and(|actual| match actual {
            Value::String(s) => *s == expected,
            other => other.to_string() == expected,
        })
    })
}

#[async_trait]
impl SolrClient for MemoryClient {
    async fn add(&self, documents: Vec<SolrDocument>) -> Result<()> {
        *self.writes.lock().unwrap() += 1;
        let mut stored = self.documents.lock().unwrap();
        for document in documents {
            stored.retain(|d| d.get(ID_FIELD) != document.get(ID_FIELD));
            stored.push(document);
        }
        Ok(())
    }

    async fn select(&self, query: &SolrQuery) -> Result<Vec<SolrDocument>> {
        let mut found: Vec<SolrDocument> = self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|d| evaluate(&query.filter, d))
            .cloned()
            .collect();

        found.sort_by(|a, b| {
            for sort in &query.sorts {
                let ordering = match (values(a, &sort.name).first(), values(b, &sort.name).first()) {
                    (Some(l), Some(r)) => compare_values(l, r).unwrap_or(Ordering::Equal),
                    _ => Ordering::Equal,
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

        Ok(found
            .into_iter()
            .skip(query.start as usize)
            .take(query.rows as usize)
            .map(|mut d| {
                if !query.fields.is_empty() {
                    d.retain(|name, _| query.fields.contains(name));
                }
                d
            })
            .collect())
    }

    async fn select_raw(&self, q: &str) -> Result<Vec<SolrDocument>> {
        let documents = self.documents.lock().unwrap();
        Ok(documents
            .iter()
            .filter(|d| raw_matches(q, d))
            .cloned()
            .collect())
    }

    async fn delete_by_query(&self, filter: &SolrExpr) -> Result<()> {
        *self.writes.lock().unwrap() += 1;
        self.documents
            .lock()
            .unwrap()
            .retain(|d| !evaluate(filter, d));
        Ok(())
    }

    async fn count(&self, filter: &SolrExpr) -> Result<u64> {
        let documents = self.documents.lock().unwrap();
        Ok(documents.iter().filter(|d| evaluate(filter, d)).count() as u64)
    }
}
