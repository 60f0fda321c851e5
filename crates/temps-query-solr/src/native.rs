//! Raw Lucene queries with `@name` parameters

use crate::expr::literal;
use crate::translate::SolrTranslator;
use temps_query::{AttributeValue, Result};

/// A caller-written `q` string, e.g. `age:@age AND type:@type`
#[derive(Debug, Clone, PartialEq)]
pub struct SolrNativeQuery {
    pub q: String,
    pub params: Vec<(String, AttributeValue)>,
}

impl SolrNativeQuery {
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            params: Vec::new(),
        }
    }

    pub fn bind(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// Replace every `@name` with the escaped parameter value.
    ///
    /// One left-to-right pass: a name runs to the end of its identifier, so
    /// `@age` never matches inside `@agent`, and substituted values are never
    /// scanned again. Unbound names are left as written.
    pub fn substitute(&self, translator: &SolrTranslator) -> Result<String> {
        let mut out = String::with_capacity(self.q.len());
        let mut rest = self.q.as_str();

        while let Some(at) = rest.find('@') {
            out.push_str(&rest[..at]);
            let tail = &rest[at + 1..];
            let end = tail
                .find(|c: char| !(c.is_alphanumeric() || c == '_'))
                .unwrap_or(tail.len());
            let name = &tail[..end];

            match self.params.iter().find(|(bound, _)| bound == name) {
                Some((_, value)) if !name.is_empty() => {
                    out.push_str(&literal(&translator.scalar(value)?)?);
                }
                _ => {
                    out.push('@');
                    out.push_str(name);
                }
            }
            rest = &tail[end..];
        }
        out.push_str(rest);
        Ok(out)
    }
}
