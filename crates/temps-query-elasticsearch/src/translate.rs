//! Condition tree to query DSL translation

use serde::Serialize;
use serde_json::{json, Map, Value};
use temps_query::json::native_to_json;
use temps_query::{
    AttributeValue, Coercion, Condition, ConnectionConfig, DataError, DeleteQuery, NativeValue,
    Operator, Result, SelectQuery, SortDirection, StaticCodecs, Translator,
};

const DEFAULT_MAX_RESULT_WINDOW: u64 = 10_000;

/// Check a field name against the `_` prefix ES keeps for metadata fields
/// (`_id`, `_source`, `_index`, ...)
pub fn field_name(name: &str) -> Result<&str> {
    if name.starts_with('_') {
        return Err(DataError::unsupported_value(format!(
            "field '{}' uses the reserved '_' prefix of Elasticsearch metadata fields",
            name
        )));
    }
    Ok(name)
}

/// Search against one or more indices
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    pub indices: Vec<String>,
    pub body: Value,
}

/// `_delete_by_query` request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteByQuery {
    pub index: String,
    pub body: Value,
}

#[derive(Debug, Clone)]
pub struct EsTranslator {
    index_prefix: String,
    max_result_window: u64,
    coercion: Coercion<StaticCodecs>,
}

impl EsTranslator {
    pub fn new(index_prefix: impl Into<String>, max_result_window: u64) -> Self {
        Self {
            index_prefix: index_prefix.into(),
            max_result_window,
            coercion: Coercion::new(StaticCodecs::json()),
        }
    }

    /// Read `index_prefix` and `max_result_window` from connection options
    pub fn from_config(config: &ConnectionConfig) -> Result<Self> {
        let prefix: Option<String> = config.option("index_prefix")?;
        let window = config
            .option("max_result_window")?
            .unwrap_or(DEFAULT_MAX_RESULT_WINDOW);
        if window == 0 {
            return Err(DataError::invalid_configuration(
                "max_result_window must be positive",
            ));
        }
        Ok(Self::new(prefix.unwrap_or_default(), window))
    }

    pub fn max_result_window(&self) -> u64 {
        self.max_result_window
    }

    pub fn coercion(&self) -> &Coercion<StaticCodecs> {
        &self.coercion
    }

    pub fn index(&self, collection: &str) -> String {
        format!("{}{}", self.index_prefix, collection)
    }

    /// Collection name for an index, `None` when it lies outside the prefix
    pub fn collection<'a>(&self, index: &'a str) -> Option<&'a str> {
        index.strip_prefix(self.index_prefix.as_str())
    }

    pub fn query(&self, condition: Option<&Condition>) -> Result<Value> {
        match condition {
            Some(condition) => self.clause(condition),
            None => Ok(json!({ "match_all": {} })),
        }
    }

    fn clause(&self, condition: &Condition) -> Result<Value> {
        match condition {
            Condition::Compare {
                operator,
                attribute,
            } => {
                let name = field_name(&attribute.name)?;
                match operator {
                    Operator::Equals => Ok(json!({ "term": { name: self.json(&attribute.value)? } })),
                    Operator::GreaterThan => self.range(name, "gt", &attribute.value),
                    Operator::GreaterEquals => self.range(name, "gte", &attribute.value),
                    Operator::LesserThan => self.range(name, "lt", &attribute.value),
                    Operator::LesserEquals => self.range(name, "lte", &attribute.value),
                    Operator::Like => {
                        let pattern = match self.coercion.coerce(&attribute.value)? {
                            NativeValue::Text(pattern) => wildcard(&pattern),
                            other => {
                                return Err(DataError::unsupported_value(format!(
                                    "LIKE needs a text pattern, got {:?}",
                                    other
                                )))
                            }
                        };
                        Ok(json!({ "wildcard": { name: { "value": pattern } } }))
                    }
                    Operator::In => {
                        let values = match &attribute.value {
                            AttributeValue::List(items) => items
                                .iter()
                                .map(|item| self.json(item))
                                .collect::<Result<Vec<_>>>()?,
                            value => vec![self.json(value)?],
                        };
                        Ok(json!({ "terms": { name: values } }))
                    }
                    Operator::Not | Operator::And | Operator::Or => Err(
                        DataError::unsupported_operator(format!("{} is not a comparison", operator)),
                    ),
                }
            }
            Condition::And(children) => {
                let mut filters = Vec::with_capacity(children.len());
                self.flatten_and(children, &mut filters)?;
                Ok(json!({ "bool": { "filter": filters } }))
            }
            Condition::Or(children) => {
                let should = children
                    .iter()
                    .map(|c| self.clause(c))
                    .collect::<Result<Vec<_>>>()?;
                Ok(json!({ "bool": { "should": should, "minimum_should_match": 1 } }))
            }
            Condition::Not(child) => Ok(json!({ "bool": { "must_not": [self.clause(child)?] } })),
        }
    }

    fn flatten_and(&self, children: &[Condition], out: &mut Vec<Value>) -> Result<()> {
        for child in children {
            match child {
                Condition::And(nested) => self.flatten_and(nested, out)?,
                other => out.push(self.clause(other)?),
            }
        }
        Ok(())
    }

    fn range(&self, name: &str, bound: &str, value: &AttributeValue) -> Result<Value> {
        Ok(json!({ "range": { name: { bound: self.json(value)? } } }))
    }

    // Conditions compare scalars; nested objects are only valid in documents
    fn json(&self, value: &AttributeValue) -> Result<Value> {
        if let AttributeValue::Structural(_) = value {
            return Err(DataError::unsupported_value(
                "structural values cannot be used in a condition",
            ));
        }
        self.coercion.coerce(value).map(native_to_json)
    }
}

impl Translator for EsTranslator {
    type Select = SearchRequest;
    type Delete = DeleteByQuery;

    /// A limit of 0 sends `size = max_result_window`: unbounded selects are
    /// capped by the index's result window, not truly unlimited
    fn select(&self, query: &SelectQuery) -> Result<SearchRequest> {
        let mut body = Map::new();
        body.insert("query".into(), self.query(query.condition())?);

        if query.skip() > 0 {
            body.insert("from".into(), json!(query.skip()));
        }
        let size = match query.limit() {
            0 => self.max_result_window,
            limit => limit,
        };
        body.insert("size".into(), json!(size));

        if !query.sorts().is_empty() {
            let sort = query
                .sorts()
                .iter()
                .map(|s| {
                    let order = match s.direction {
                        SortDirection::Asc => "asc",
                        SortDirection::Desc => "desc",
                    };
                    let name = field_name(&s.name)?;
                    Ok(json!({ name: { "order": order } }))
                })
                .collect::<Result<Vec<Value>>>()?;
            body.insert("sort".into(), Value::Array(sort));
        }

        if !query.projection().is_empty() {
            for name in query.projection() {
                field_name(name)?;
            }
            body.insert("_source".into(), json!(query.projection()));
        }

        Ok(SearchRequest {
            indices: vec![self.index(query.collection())],
            body: Value::Object(body),
        })
    }

    fn delete(&self, query: &DeleteQuery) -> Result<DeleteByQuery> {
        Ok(DeleteByQuery {
            index: self.index(query.collection()),
            body: json!({ "query": self.query(query.condition())? }),
        })
    }
}

/// Map SQL-style wildcards onto ES ones
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
