//! Condition tree to Lucene translation

use crate::codec::SolrCodecs;
use crate::expr::{plain_field, Bound, SolrExpr};
use temps_query::{
    AttributeValue, Coercion, Condition, ConnectionConfig, DataError, DeleteQuery, NativeValue,
    Operator, Result, SelectQuery, Sort, SortDirection, Translator,
};

pub const DEFAULT_ENTITY_FIELD: &str = "_entity";

/// Parameters of a `/select` request
#[derive(Debug, Clone, PartialEq)]
pub struct SolrQuery {
    pub filter: SolrExpr,
    pub sorts: Vec<Sort>,
    pub start: u64,
    pub rows: u64,
    /// Empty returns every stored field
    pub fields: Vec<String>,
}

impl SolrQuery {
    pub fn q(&self) -> Result<String> {
        self.filter.render()
    }

    /// Request parameters as sent to `/select`
    pub fn params(&self) -> Result<Vec<(&'static str, String)>> {
        let mut params = vec![
            ("q", self.q()?),
            ("start", self.start.to_string()),
            ("rows", self.rows.to_string()),
        ];
        if !self.sorts.is_empty() {
            let sort = self
                .sorts
                .iter()
                .map(|s| {
                    let direction = match s.direction {
                        SortDirection::Asc => "asc",
                        SortDirection::Desc => "desc",
                    };
                    Ok(format!("{} {}", plain_field(&s.name)?, direction))
                })
                .collect::<Result<Vec<_>>>()?
                .join(",");
            params.push(("sort", sort));
        }
        if !self.fields.is_empty() {
            let fields = self
                .fields
                .iter()
                .map(|f| plain_field(f))
                .collect::<Result<Vec<_>>>()?;
            params.push(("fl", fields.join(",")));
        }
        Ok(params)
    }
}

/// Translates queries for collections sharing one core, told apart by an
/// entity field on every document
#[derive(Debug, Clone)]
pub struct SolrTranslator {
    entity_field: String,
    max_rows: u64,
    coercion: Coercion<SolrCodecs>,
}

impl SolrTranslator {
    pub fn new(entity_field: impl Into<String>, max_rows: u64) -> Self {
        Self {
            entity_field: entity_field.into(),
            max_rows,
            coercion: Coercion::new(SolrCodecs),
        }
    }

    /// Read `entity_field` and `max_rows` from connection options
    pub fn from_config(config: &ConnectionConfig) -> Result<Self> {
        let entity_field: Option<String> = config.option("entity_field")?;
        let max_rows = config.option("max_rows")?.unwrap_or(i32::MAX as u64);
        let entity_field = entity_field.unwrap_or_else(|| DEFAULT_ENTITY_FIELD.to_string());
        if entity_field.is_empty() {
            return Err(DataError::invalid_configuration(
                "entity_field must not be empty",
            ));
        }
        Ok(Self::new(entity_field, max_rows))
    }

    pub fn entity_field(&self) -> &str {
        &self.entity_field
    }

    pub fn coercion(&self) -> &Coercion<SolrCodecs> {
        &self.coercion
    }

    /// Every document of a collection
    pub fn scope(&self, collection: &str) -> SolrExpr {
        SolrExpr::term(&self.entity_field, NativeValue::Text(collection.to_string()))
    }

    fn filter(&self, collection: &str, condition: Option<&Condition>) -> Result<SolrExpr> {
        let scope = self.scope(collection);
        match condition {
            Some(condition) => Ok(SolrExpr::and(vec![scope, self.expr(condition)?])),
            None => Ok(scope),
        }
    }

    fn expr(&self, condition: &Condition) -> Result<SolrExpr> {
        match condition {
            Condition::Compare {
                operator,
                attribute,
            } => {
                let field = attribute.name.clone();
                let value = &attribute.value;
                match operator {
                    Operator::Equals => Ok(SolrExpr::Term {
                        field,
                        value: self.scalar(value)?,
                    }),
                    Operator::GreaterThan => self.range(field, value, true, false),
                    Operator::GreaterEquals => self.range(field, value, true, true),
                    Operator::LesserThan => self.range(field, value, false, false),
                    Operator::LesserEquals => self.range(field, value, false, true),
                    Operator::Like => match self.scalar(value)? {
                        NativeValue::Text(pattern) => Ok(SolrExpr::Wildcard {
                            field,
                            pattern: wildcard(&pattern),
                        }),
                        other => Err(DataError::unsupported_value(format!(
                            "LIKE needs a text pattern, got {:?}",
                            other
                        ))),
                    },
                    Operator::In => {
                        let values = match value {
                            AttributeValue::List(items) => items
                                .iter()
                                .map(|item| self.scalar(item))
                                .collect::<Result<Vec<_>>>()?,
                            value => vec![self.scalar(value)?],
                        };
                        Ok(SolrExpr::In { field, values })
                    }
                    Operator::Not | Operator::And | Operator::Or => Err(
                        DataError::unsupported_operator(format!("{} is not a comparison", operator)),
                    ),
                }
            }
            Condition::And(children) => children
                .iter()
                .map(|c| self.expr(c))
                .collect::<Result<Vec<_>>>()
                .map(SolrExpr::and),
            Condition::Or(children) => children
                .iter()
                .map(|c| self.expr(c))
                .collect::<Result<Vec<_>>>()
                .map(SolrExpr::Or),
            Condition::Not(child) => Ok(SolrExpr::Not(Box::new(self.expr(child)?))),
        }
    }

    fn range(
        &self,
        field: String,
        value: &AttributeValue,
        lower: bool,
        inclusive: bool,
    ) -> Result<SolrExpr> {
        let bound = Some(Bound {
            value: self.scalar(value)?,
            inclusive,
        });
        let (lower, upper) = if lower { (bound, None) } else { (None, bound) };
        Ok(SolrExpr::Range {
            field,
            lower,
            upper,
        })
    }

    /// Documents are flat: only scalars can be compared
    pub fn scalar(&self, value: &AttributeValue) -> Result<NativeValue> {
        match value {
            AttributeValue::Scalar(scalar) => self.coercion.coerce_scalar(scalar),
            AttributeValue::List(_) => Err(DataError::unsupported_value(
                "a list cannot be compared as a single Solr term",
            )),
            AttributeValue::Structural(_) => Err(DataError::unsupported_value(
                "Solr documents are flat; structural values are not supported",
            )),
        }
    }
}

impl Translator for SolrTranslator {
    type Select = SolrQuery;
    type Delete = SolrExpr;

    fn select(&self, query: &SelectQuery) -> Result<SolrQuery> {
        let mut fields = query.projection().to_vec();
        if !fields.is_empty() && !fields.contains(&self.entity_field) {
            fields.push(self.entity_field.clone());
        }

        Ok(SolrQuery {
            filter: self.filter(query.collection(), query.condition())?,
            sorts: query.sorts().to_vec(),
            start: query.skip(),
            rows: match query.limit() {
                0 => self.max_rows,
                limit => limit,
            },
            fields,
        })
    }

    fn delete(&self, query: &DeleteQuery) -> Result<SolrExpr> {
        self.filter(query.collection(), query.condition())
    }
}

/// Map SQL-style wildcards onto Lucene ones
fn wildcard(pattern: &str) -> String {
    pattern
        .chars()
        .map(|c| match c {
            '%' => '*',
            '_' => '?',
            other => other,
        })
        .collect()
}
