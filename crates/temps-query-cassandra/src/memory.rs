//! In-memory session evaluating translated statements.
//!
//! Rows are keyed by their first column, so inserts behave as upserts.

use crate::session::{CqlSession, ResultPage, Row};
use crate::statement::{Clause, CqlStatement, Relation, Select};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;
use temps_query::coercion::to_attribute_value;
use temps_query::filter::{compare_values, like};
use temps_query::{NativeValue, Result, SortDirection};

#[derive(Default)]
pub struct MemorySession {
    tables: Mutex<HashMap<String, Vec<Row>>>,
    executed: Mutex<Vec<String>>,
    native_params: Mutex<Vec<(String, NativeValue)>>,
}

impl MemorySession {
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    pub fn native_params(&self) -> Vec<(String, NativeValue)> {
        self.native_params.lock().unwrap().clone()
    }

    fn select(&self, select: &Select) -> ResultPage {
        let tables = self.tables.lock().unwrap();
        let mut rows: Vec<Row> = tables
            .get(&select.table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| select.clauses.iter().all(|c| satisfies(row, c)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        rows.sort_by(|a, b| {
            for sort in &select.orderings {
                let ordering = match (column(a, &sort.name), column(b, &sort.name)) {
                    (Some(l), Some(r)) => compare(l, r).unwrap_or(Ordering::Equal),
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

        let mut paging_state = None;
        if let Some(limit) = select.limit {
            rows.truncate(limit as usize);
        } else if let Some(fetch_size) = select.fetch_size {
            let offset: usize = select
                .paging_state
                .as_deref()
                .map(|s| s.parse().unwrap())
                .unwrap_or(0);
            let end = (offset + fetch_size as usize).min(rows.len());
            if end < rows.len() {
                paging_state = Some(end.to_string());
            }
            rows = rows[offset.min(end)..end].to_vec();
        }

        if !select.columns.is_empty() {
            for row in &mut rows {
                row.retain(|(name, _)| select.columns.contains(name));
            }
        }

        ResultPage {
            rows,
            table: Some(select.table.clone()),
            paging_state,
        }
    }
}

fn column<'a>(row: &'a Row, name: &str) -> Option<&'a NativeValue> {
    row.iter().find(|(n, _)| n == name).map(|(_, v)| v)
}

fn compare(left: &NativeValue, right: &NativeValue) -> Option<Ordering> {
    compare_values(
        &to_attribute_value(left.clone()),
        &to_attribute_value(right.clone()),
    )
}

fn satisfies(row: &Row, clause: &Clause) -> bool {
    let Some(actual) = column(row, &clause.column) else {
        return false;
    };
    let expected = &clause.values[0];
    let ordering = compare(actual, expected);
    match clause.relation {
        Relation::Eq => ordering == Some(Ordering::Equal),
        Relation::Gt => ordering == Some(Ordering::Greater),
        Relation::Gte => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        Relation::Lt => ordering == Some(Ordering::Less),
        Relation::Lte => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        Relation::Like => match (actual, expected) {
            (NativeValue::Text(text), NativeValue::Text(pattern)) => like(pattern, text),
            _ => false,
        },
        Relation::In => clause
            .values
            .iter()
            .any(|v| compare(actual, v) == Some(Ordering::Equal)),
    }
}

#[async_trait]
impl CqlSession for MemorySession {
    async fn execute(&self, statement: &CqlStatement) -> Result<ResultPage> {
        self.executed.lock().unwrap().push(statement.cql());

        match statement {
            CqlStatement::Select(select) => Ok(self.select(select)),
            CqlStatement::Insert(insert) => {
                let mut tables = self.tables.lock().unwrap();
                let rows = tables.entry(insert.table.clone()).or_default();
                let key = &insert.columns[0];
                rows.retain(|row| row.first() != Some(key));
                rows.push(insert.columns.clone());
                Ok(ResultPage::default())
            }
            CqlStatement::Delete(delete) => {
                let mut tables = self.tables.lock().unwrap();
                if let Some(rows) = tables.get_mut(&delete.table) {
                    rows.retain(|row| !delete.clauses.iter().all(|c| satisfies(row, c)));
                }
                Ok(ResultPage::default())
            }
            CqlStatement::Count(count) => {
                let tables = self.tables.lock().unwrap();
                let n = tables.get(&count.table).map_or(0, Vec::len);
                Ok(ResultPage {
                    rows: vec![vec![("count".to_string(), NativeValue::Int(n as i64))]],
                    table: Some(count.table.clone()),
                    paging_state: None,
                })
            }
        }
    }

    async fn execute_native(&self, cql: &str, params: &[(String, NativeValue)]) -> Result<ResultPage> {
        self.executed.lock().unwrap().push(cql.to_string());
        self.native_params
            .lock()
            .unwrap()
            .extend(params.iter().cloned());
        Ok(ResultPage::default())
    }
}
