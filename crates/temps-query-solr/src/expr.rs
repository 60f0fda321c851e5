//! Lucene query expressions and their string rendering

use chrono::SecondsFormat;
use temps_query::{DataError, NativeValue, Result};

const SPECIAL: &[char] = &[
    '\\', '+', '-', '!', '(', ')', ':', '^', '[', ']', '"', '{', '}', '~', '*', '?', '|', '&', ';',
    '/', ' ',
];

/// Field name usable in the `sort` and `fl` parameters, which take no
/// escapes; names holding a special character or a comma are rejected
pub fn plain_field(name: &str) -> Result<&str> {
    let breaks = |c: char| c == ',' || c.is_whitespace() || SPECIAL.contains(&c);
    if name.is_empty() || name.chars().any(breaks) {
        return Err(DataError::unsupported_value(format!(
            "field '{}' cannot be used in sort or fl",
            name
        )));
    }
    Ok(name)
}

/// Backslash-escape every Lucene special character
pub fn escape(raw: &str) -> String {
    escape_except(raw, &[])
}

fn escape_except(raw: &str, keep: &[char]) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if SPECIAL.contains(&c) && !keep.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Render a scalar as a query term
pub fn literal(value: &NativeValue) -> Result<String> {
    match value {
        NativeValue::Bool(b) => Ok(b.to_string()),
        NativeValue::Int(i) => Ok(escape(&i.to_string())),
        NativeValue::Float(f) => Ok(escape(&f.to_string())),
        NativeValue::Text(s) => Ok(escape(s)),
        NativeValue::Date(d) => Ok(escape(&format!("{}T00:00:00Z", d))),
        NativeValue::Timestamp(t) => Ok(escape(&t.to_rfc3339_opts(SecondsFormat::Millis, true))),
        NativeValue::Uuid(u) => Ok(escape(&u.to_string())),
        other => Err(DataError::unsupported_value(format!(
            "{:?} cannot be rendered as a Solr term",
            other
        ))),
    }
}

/// One side of a range
#[derive(Debug, Clone, PartialEq)]
pub struct Bound {
    pub value: NativeValue,
    pub inclusive: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SolrExpr {
    /// `*:*`
    MatchAll,
    Term {
        field: String,
        value: NativeValue,
    },
    Range {
        field: String,
        lower: Option<Bound>,
        upper: Option<Bound>,
    },
    /// Pattern with `*` and `?` wildcards
    Wildcard {
        field: String,
        pattern: String,
    },
    In {
        field: String,
        values: Vec<NativeValue>,
    },
    And(Vec<SolrExpr>),
    Or(Vec<SolrExpr>),
    Not(Box<SolrExpr>),
}

impl SolrExpr {
    pub fn term(field: impl Into<String>, value: NativeValue) -> Self {
        SolrExpr::Term {
            field: field.into(),
            value,
        }
    }

    /// Conjunction, absorbing nested conjunctions
    pub fn and(children: Vec<SolrExpr>) -> Self {
        let mut flat = Vec::with_capacity(children.len());
        for child in children {
            match child {
                SolrExpr::And(nested) => flat.extend(nested),
                other => flat.push(other),
            }
        }
        SolrExpr::And(flat)
    }

    /// Render as the top-level `q` parameter
    pub fn render(&self) -> Result<String> {
        match self {
            SolrExpr::And(children) => join(children, " AND "),
            other => other.render_nested(),
        }
    }

    fn render_nested(&self) -> Result<String> {
        match self {
            SolrExpr::MatchAll => Ok("*:*".to_string()),
            SolrExpr::Term { field, value } => Ok(format!("{}:{}", escape(field), literal(value)?)),
            SolrExpr::Range {
                field,
                lower,
                upper,
            } => {
                let (open, low) = match lower {
                    Some(b) => (if b.inclusive { '[' } else { '{' }, literal(&b.value)?),
                    None => ('[', "*".to_string()),
                };
                let (high, close) = match upper {
                    Some(b) => (literal(&b.value)?, if b.inclusive { ']' } else { '}' }),
                    None => ("*".to_string(), ']'),
                };
                Ok(format!("{}:{}{} TO {}{}", escape(field), open, low, high, close))
            }
            SolrExpr::Wildcard { field, pattern } => Ok(format!(
                "{}:{}",
                escape(field),
                escape_except(pattern, &['*', '?'])
            )),
            // Lucene has no empty group; match nothing instead
            SolrExpr::In { values, .. } if values.is_empty() => Ok("(*:* -*:*)".to_string()),
            SolrExpr::In { field, values } => {
                let values = values.iter().map(literal).collect::<Result<Vec<_>>>()?;
                Ok(format!("{}:({})", escape(field), values.join(" OR ")))
            }
            SolrExpr::And(children) => Ok(format!("({})", join(children, " AND ")?)),
            SolrExpr::Or(children) => Ok(format!("({})", join(children, " OR ")?)),
            SolrExpr::Not(child) => Ok(format!("(*:* -{})", child.render_nested()?)),
        }
    }
}

fn join(children: &[SolrExpr], separator: &str) -> Result<String> {
    Ok(children
        .iter()
        .map(SolrExpr::render_nested)
        .collect::<Result<Vec<_>>>()?
        .join(separator))
}
