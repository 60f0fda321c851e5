//! Structured CQL statements with positional `?` bind markers

use std::fmt::Write;
use std::time::Duration;
use temps_query::{NativeValue, Sort, SortDirection};

/// Quote an identifier when it would otherwise be misread.
///
/// Names starting with `_` are double-quoted; embedded quotes are doubled.
pub fn quote_identifier(name: &str) -> String {
    if name.starts_with('_') {
        format!("\"{}\"", name.replace('"', "\"\""))
    } else {
        name.to_string()
    }
}

fn qualified(keyspace: &str, table: &str) -> String {
    format!("{}.{}", quote_identifier(keyspace), quote_identifier(table))
}

/// CQL comparison relation
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Relation {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    In,
}

impl Relation {
    pub fn symbol(&self) -> &'static str {
        match self {
            Relation::Eq => "=",
            Relation::Gt => ">",
            Relation::Gte => ">=",
            Relation::Lt => "<",
            Relation::Lte => "<=",
            Relation::Like => "LIKE",
            Relation::In => "IN",
        }
    }
}

/// One `column <relation> ?` restriction; clauses are always conjunctive
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub column: String,
    pub relation: Relation,
    pub values: Vec<NativeValue>,
}

impl Clause {
    fn render(&self, out: &mut String) {
        let column = quote_identifier(&self.column);
        if self.relation == Relation::In {
            let markers = vec!["?"; self.values.len()].join(", ");
            let _ = write!(out, "{} IN ({})", column, markers);
        } else {
            let _ = write!(out, "{} {} ?", column, self.relation.symbol());
        }
    }
}

fn render_where(clauses: &[Clause], out: &mut String) {
    for (i, clause) in clauses.iter().enumerate() {
        out.push_str(if i == 0 { " WHERE " } else { " AND " });
        clause.render(out);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub keyspace: String,
    pub table: String,
    /// Empty selects every column
    pub columns: Vec<String>,
    pub clauses: Vec<Clause>,
    pub orderings: Vec<Sort>,
    pub limit: Option<u64>,
    /// Rows to discard client-side; CQL has no OFFSET
    pub skip: u64,
    /// Server-side page size, used instead of LIMIT by paged queries
    pub fetch_size: Option<u32>,
    pub paging_state: Option<String>,
}

impl Select {
    pub fn cql(&self) -> String {
        let columns = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns
                .iter()
                .map(|c| quote_identifier(c))
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut out = format!(
            "SELECT {} FROM {}",
            columns,
            qualified(&self.keyspace, &self.table)
        );
        render_where(&self.clauses, &mut out);

        if !self.orderings.is_empty() {
            let orderings = self
                .orderings
                .iter()
                .map(|s| {
                    let direction = match s.direction {
                        SortDirection::Asc => "ASC",
                        SortDirection::Desc => "DESC",
                    };
                    format!("{} {}", quote_identifier(&s.name), direction)
                })
                .collect::<Vec<_>>()
                .join(", ");
            let _ = write!(out, " ORDER BY {}", orderings);
        }

        if let Some(limit) = self.limit {
            let _ = write!(out, " LIMIT {}", limit);
        }
        out
    }
}

/// Delete statement; no clauses truncates the table
#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    pub keyspace: String,
    pub table: String,
    pub clauses: Vec<Clause>,
}

impl Delete {
    pub fn cql(&self) -> String {
        let table = qualified(&self.keyspace, &self.table);
        if self.clauses.is_empty() {
            return format!("TRUNCATE {}", table);
        }
        let mut out = format!("DELETE FROM {}", table);
        render_where(&self.clauses, &mut out);
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub keyspace: String,
    pub table: String,
    pub columns: Vec<(String, NativeValue)>,
    pub ttl: Option<Duration>,
}

impl Insert {
    pub fn cql(&self) -> String {
        let names = self
            .columns
            .iter()
            .map(|(name, _)| quote_identifier(name))
            .collect::<Vec<_>>()
            .join(", ");
        let markers = vec!["?"; self.columns.len()].join(", ");

        let mut out = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            qualified(&self.keyspace, &self.table),
            names,
            markers
        );
        if let Some(ttl) = self.ttl {
            let _ = write!(out, " USING TTL {}", ttl.as_secs());
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Count {
    pub keyspace: String,
    pub table: String,
}

/// Statement handed to the CQL session
#[derive(Debug, Clone, PartialEq)]
pub enum CqlStatement {
    Select(Select),
    Delete(Delete),
    Insert(Insert),
    Count(Count),
}

impl CqlStatement {
    pub fn cql(&self) -> String {
        match self {
            CqlStatement::Select(s) => s.cql(),
            CqlStatement::Delete(d) => d.cql(),
            CqlStatement::Insert(i) => i.cql(),
            CqlStatement::Count(c) => {
                format!("SELECT COUNT(*) FROM {}", qualified(&c.keyspace, &c.table))
            }
        }
    }

    /// Bind values in marker order
    pub fn values(&self) -> Vec<NativeValue> {
        let from_clauses =
            |clauses: &[Clause]| clauses.iter().flat_map(|c| c.values.clone()).collect();
        match self {
            CqlStatement::Select(s) => from_clauses(&s.clauses),
            CqlStatement::Delete(d) => from_clauses(&d.clauses),
            CqlStatement::Insert(i) => i.columns.iter().map(|(_, v)| v.clone()).collect(),
            CqlStatement::Count(_) => Vec::new(),
        }
    }

    pub fn table(&self) -> &str {
        match self {
            CqlStatement::Select(s) => &s.table,
            CqlStatement::Delete(d) => &d.table,
            CqlStatement::Insert(i) => &i.table,
            CqlStatement::Count(c) => &c.table,
        }
    }
}
