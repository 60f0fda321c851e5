//! In-memory client evaluating the query DSL the translator emits.

use crate::client::{Hit, SearchClient};
use crate::translate::{DeleteByQuery, SearchRequest};
use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;
use temps_query::filter::{compare_values, like};
use temps_query::json::json_to_value;
use temps_query::Result;

#[derive(Default)]
pub struct MemoryClient {
    indices: Mutex<HashMap<String, Vec<(String, Value)>>>,
    requests: Mutex<usize>,
}

impl MemoryClient {
    pub fn requests(&self) -> usize {
        *self.requests.lock().unwrap()
    }

    fn record(&self) {
        *self.requests.lock().unwrap() += 1;
    }
}

fn field<'a>(document: &'a Value, name: &str) -> Option<&'a Value> {
    document.get(name)
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    compare_values(&json_to_value(left.clone()), &json_to_value(right.clone()))
}

fn single(object: &Value) -> Option<(&String, &Value)> {
    object.as_object().and_then(|o| o.iter().next())
}

fn evaluate(query: &Value, document: &Value) -> bool {
    let Some((kind, spec)) = single(query) else {
        return false;
    };
    match kind.as_str() {
        "match_all" => true,
        "term" => single(spec).is_some_and(|(name, expected)| {
            field(document, name).is_some_and(|v| compare(v, expected) == Some(Ordering::Equal))
        }),
        "terms" => single(spec).is_some_and(|(name, expected)| {
            let actual = field(document, name);
            expected.as_array().is_some_and(|candidates| {
                candidates.iter().any(|c| {
                    actual.is_some_and(|v| compare(v, c) == Some(Ordering::Equal))
                })
            })
        }),
        "range" => single(spec).is_some_and(|(name, bounds)| {
            let Some(actual) = field(document, name) else {
                return false;
            };
            bounds.as_object().is_some_and(|bounds| {
                bounds.iter().all(|(bound, limit)| {
                    let ordering = compare(actual, limit);
                    match bound.as_str() {
                        "gt" => ordering == Some(Ordering::Greater),
                        "gte" => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
                        "lt" => ordering == Some(Ordering::Less),
                        "lte" => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
                        _ => false,
                    }
                })
            })
        }),
        "wildcard" => single(spec).is_some_and(|(name, pattern)| {
            match (field(document, name).and_then(Value::as_str), pattern["value"].as_str()) {
                (Some(text), Some(pattern)) => like(pattern, text),
                _ => false,
            }
        }),
        "bool" => {
            let clauses = |key: &str| spec[key].as_array().cloned().unwrap_or_default();
            let filter = clauses("filter").iter().all(|q| evaluate(q, document));
            let must_not = clauses("must_not").iter().all(|q| !evaluate(q, document));
            let should = clauses("should");
            let minimum = spec["minimum_should_match"].as_u64().unwrap_or(0) as usize;
            let matched = should.iter().filter(|q| evaluate(q, document)).count();
            filter && must_not && matched >= minimum
        }
        _ => false,
    }
}

fn sort(documents: &mut [(String, Value)], sorts: &[Value]) {
    documents.sort_by(|(_, a), (_, b)| {
        for spec in sorts {
            let Some((name, order)) = single(spec) else {
                continue;
            };
            let ordering = match (field(a, name), field(b, name)) {
                (Some(l), Some(r)) => compare(l, r).unwrap_or(Ordering::Equal),
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            let ordering = if order["order"] == "desc" {
                ordering.reverse()
            } else {
                ordering
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

#[async_trait]
impl SearchClient for MemoryClient {
    async fn index(&self, index: &str, id: &str, document: Value) -> Result<()> {
        self.record();
        let mut indices = self.indices.lock().unwrap();
        let documents = indices.entry(index.to_string()).or_default();
        documents.retain(|(existing, _)| existing != id);
        documents.push((id.to_string(), document));
        Ok(())
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<Hit>> {
        self.record();
        let indices = self.indices.lock().unwrap();
        let body = &request.body;
        let mut hits = Vec::new();

        for index in &request.indices {
            let mut documents: Vec<(String, Value)> = indices
                .get(index)
                .map(|docs| {
                    docs.iter()
                        .filter(|(_, doc)| evaluate(&body["query"], doc))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();

            if let Some(sorts) = body["sort"].as_array() {
                sort(&mut documents, sorts);
            }

            let from = body["from"].as_u64().unwrap_or(0) as usize;
            let size = body["size"].as_u64().unwrap_or(10) as usize;
            let projection: Option<Vec<&str>> = body["_source"]
                .as_array()
                .map(|names| names.iter().filter_map(Value::as_str).collect());

            for (id, mut source) in documents.into_iter().skip(from).take(size) {
                if let (Some(names), Some(object)) = (&projection, source.as_object_mut()) {
                    object.retain(|name, _| names.contains(&name.as_str()));
                }
                hits.push(Hit {
                    index: index.clone(),
                    id,
                    source,
                });
            }
        }
        Ok(hits)
    }

    async fn delete_by_query(&self, request: &DeleteByQuery) -> Result<u64> {
        self.record();
        let mut indices = self.indices.lock().unwrap();
        let Some(documents) = indices.get_mut(&request.index) else {
            return Ok(0);
        };
        let before = documents.len();
        documents.retain(|(_, doc)| !evaluate(&request.body["query"], doc));
        Ok((before - documents.len()) as u64)
    }

    async fn count(&self, index: &str) -> Result<u64> {
        self.record();
        let indices = self.indices.lock().unwrap();
        Ok(indices.get(index).map_or(0, Vec::len) as u64)
    }
}
