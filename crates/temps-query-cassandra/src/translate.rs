//! Condition tree to CQL translation
//!
//! CQL restrictions are a flat conjunction, so `OR` and `NOT` are rejected
//! rather than approximated. CQL has no OFFSET either: a skip is folded into
//! the LIMIT and the extra rows are dropped after the fetch.

use crate::codec::CqlCodecs;
use crate::metadata::{CqlType, SchemaMetadata};
use crate::statement::{Clause, Count, Delete, Insert, Relation, Select};
use std::time::Duration;
use temps_query::{
    Attribute, AttributeValue, Coercion, Condition, DataError, DeleteQuery, Entity, NativeValue,
    Operator, Result, SelectQuery, Translator,
};

/// Select descriptor accepted by the Cassandra manager
#[derive(Debug, Clone)]
pub enum CassandraQuery {
    /// LIMIT-bounded select
    Standard(SelectQuery),
    /// Server-paged select; the query's limit and skip are ignored
    Paged {
        query: SelectQuery,
        fetch_size: u32,
        paging_state: Option<String>,
    },
}

impl CassandraQuery {
    pub fn paged(query: SelectQuery, fetch_size: u32) -> Self {
        CassandraQuery::Paged {
            query,
            fetch_size,
            paging_state: None,
        }
    }

    /// Continue a paged select from the state returned by the previous page
    pub fn resume(self, state: String) -> Self {
        match self {
            CassandraQuery::Standard(query) => CassandraQuery::Standard(query),
            CassandraQuery::Paged {
                query, fetch_size, ..
            } => CassandraQuery::Paged {
                query,
                fetch_size,
                paging_state: Some(state),
            },
        }
    }
}

/// Translates queries against one keyspace
#[derive(Debug, Clone)]
pub struct CqlTranslator {
    keyspace: String,
    coercion: Coercion<CqlCodecs>,
}

impl CqlTranslator {
    pub fn new(keyspace: impl Into<String>) -> Self {
        Self {
            keyspace: keyspace.into(),
            coercion: Coercion::new(CqlCodecs),
        }
    }

    pub fn keyspace(&self) -> &str {
        &self.keyspace
    }

    /// Coerce a non-composite value into its bind form
    pub fn coerce(&self, value: &AttributeValue) -> Result<NativeValue> {
        self.coercion.coerce(value)
    }

    pub fn select_statement(&self, query: &CassandraQuery) -> Result<Select> {
        match query {
            CassandraQuery::Standard(query) => self.select(query),
            CassandraQuery::Paged {
                query,
                fetch_size,
                paging_state,
            } => {
                let mut select = self.select(query)?;
                select.limit = None;
                select.skip = 0;
                select.fetch_size = Some(*fetch_size);
                select.paging_state = paging_state.clone();
                Ok(select)
            }
        }
    }

    /// Build an upsert; composite attributes are resolved against `schema`
    pub fn insert(
        &self,
        entity: &Entity,
        ttl: Option<Duration>,
        schema: &dyn SchemaMetadata,
    ) -> Result<Insert> {
        if entity.is_empty() {
            return Err(DataError::InvalidQuery(format!(
                "entity for {} has no attributes",
                entity.collection
            )));
        }

        let ttl = ttl.map(whole_seconds).transpose()?;

        let columns = entity
            .attributes
            .iter()
            .map(|attribute| {
                let value = self.column_value(&entity.collection, attribute, schema)?;
                Ok((attribute.name.clone(), value))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Insert {
            keyspace: self.keyspace.clone(),
            table: entity.collection.clone(),
            columns,
            ttl,
        })
    }

    pub fn count(&self, table: &str) -> Count {
        Count {
            keyspace: self.keyspace.clone(),
            table: table.to_string(),
        }
    }

    fn clauses(&self, condition: Option<&Condition>) -> Result<Vec<Clause>> {
        let mut clauses = Vec::new();
        if let Some(condition) = condition {
            self.collect(condition, &mut clauses)?;
        }
        Ok(clauses)
    }

    fn collect(&self, condition: &Condition, out: &mut Vec<Clause>) -> Result<()> {
        match condition {
            Condition::Compare {
                operator,
                attribute,
            } => {
                let relation = relation(*operator)?;
                let values = match (&relation, &attribute.value) {
                    (Relation::In, AttributeValue::List(items)) => items
                        .iter()
                        .map(|item| self.coercion.coerce(item))
                        .collect::<Result<Vec<_>>>()?,
                    (_, value) => vec![self.coercion.coerce(value)?],
                };
                out.push(Clause {
                    column: attribute.name.clone(),
                    relation,
                    values,
                });
                Ok(())
            }
            Condition::And(children) => {
                for child in children {
                    self.collect(child, out)?;
                }
                Ok(())
            }
            Condition::Or(_) => Err(DataError::unsupported_operator(
                "OR is not supported by Cassandra; restrictions are conjunctive only",
            )),
            Condition::Not(_) => Err(DataError::unsupported_operator(
                "NOT is not supported by Cassandra",
            )),
        }
    }

    fn column_value(
        &self,
        table: &str,
        attribute: &Attribute,
        schema: &dyn SchemaMetadata,
    ) -> Result<NativeValue> {
        if !attribute.value.is_composite() {
            return self.coercion.coerce(&attribute.value);
        }
        let cql_type = schema
            .column_type(&self.keyspace, table, &attribute.name)
            .ok_or_else(|| {
                DataError::unknown_structural_type(format!(
                    "no user type declared for {}.{}.{}",
                    self.keyspace, table, attribute.name
                ))
            })?;
        self.build(&cql_type, &attribute.value, schema)
    }

    fn build(
        &self,
        cql_type: &CqlType,
        value: &AttributeValue,
        schema: &dyn SchemaMetadata,
    ) -> Result<NativeValue> {
        match (cql_type, value) {
            (CqlType::Udt(name), AttributeValue::Structural(fields)) => {
                let user_type = schema.user_type(&self.keyspace, name).ok_or_else(|| {
                    DataError::unknown_structural_type(format!(
                        "user type {}.{} not found",
                        self.keyspace, name
                    ))
                })?;

                if let Some(unknown) = fields.keys().find(|f| user_type.field_type(f).is_none()) {
                    return Err(DataError::unsupported_value(format!(
                        "user type {} has no field {}",
                        name, unknown
                    )));
                }

                let fields = user_type
                    .fields
                    .iter()
                    .filter_map(|(field, field_type)| {
                        fields.get(field).map(|value| (field, field_type, value))
                    })
                    .map(|(field, field_type, value)| {
                        Ok((field.clone(), self.build(field_type, value, schema)?))
                    })
                    .collect::<Result<Vec<_>>>()?;

                Ok(NativeValue::Udt {
                    type_name: name.clone(),
                    fields,
                })
            }
            (CqlType::List(inner), AttributeValue::List(items)) => items
                .iter()
                .map(|item| self.build(inner, item, schema))
                .collect::<Result<Vec<_>>>()
                .map(NativeValue::List),
            (_, AttributeValue::Structural(_)) => Err(DataError::unsupported_value(format!(
                "structural value cannot be written to a {:?} column",
                cql_type
            ))),
            _ => self.coercion.coerce(value),
        }
    }
}

impl Translator for CqlTranslator {
    type Select = Select;
    type Delete = Delete;

    fn select(&self, query: &SelectQuery) -> Result<Select> {
        let limit = match query.limit() {
            0 => None,
            limit => Some(limit.saturating_add(query.skip())),
        };

        Ok(Select {
            keyspace: self.keyspace.clone(),
            table: query.collection().to_string(),
            columns: query.projection().to_vec(),
            clauses: self.clauses(query.condition())?,
            orderings: query.sorts().to_vec(),
            limit,
            skip: query.skip(),
            fetch_size: None,
            paging_state: None,
        })
    }

    fn delete(&self, query: &DeleteQuery) -> Result<Delete> {
        Ok(Delete {
            keyspace: self.keyspace.clone(),
            table: query.collection().to_string(),
            clauses: self.clauses(query.condition())?,
        })
    }
}

// TTL 0 means no expiry in CQL, so partial seconds round up
fn whole_seconds(ttl: Duration) -> Result<Duration> {
    if ttl.is_zero() {
        return Err(DataError::InvalidQuery("TTL must be positive".to_string()));
    }
    let mut seconds = ttl.as_secs();
    if ttl.subsec_nanos() > 0 {
        seconds = seconds.saturating_add(1);
    }
    Ok(Duration::from_secs(seconds))
}

fn relation(operator: Operator) -> Result<Relation> {
    match operator {
        Operator::Equals => Ok(Relation::Eq),
        Operator::GreaterThan => Ok(Relation::Gt),
        Operator::GreaterEquals => Ok(Relation::Gte),
        Operator::LesserThan => Ok(Relation::Lt),
        Operator::LesserEquals => Ok(Relation::Lte),
        Operator::Like => Ok(Relation::Like),
        Operator::In => Ok(Relation::In),
        Operator::Not | Operator::And | Operator::Or => Err(DataError::unsupported_operator(
            format!("{} is not a comparison", operator),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{StaticSchema, UserType};
    use crate::statement::CqlStatement;
    use temps_query::{delete, select, Sort};

    fn translator() -> CqlTranslator {
        CqlTranslator::new("diana")
    }

    fn contacts() -> StaticSchema {
        StaticSchema::new()
            .with_column("diana", "contact", "phone", CqlType::Udt("phone".into()))
            .with_column(
                "diana",
                "contact",
                "history",
                CqlType::List(Box::new(CqlType::Udt("phone".into()))),
            )
            .with_user_type(
                "diana",
                UserType::new("phone")
                    .field("mobile", CqlType::Text)
                    .field("home", CqlType::Text),
            )
    }

    #[test]
    fn test_select_with_conjunction_sort_and_limit() {
        let query = select("person")
            .filter(Condition::gt("age", 22).and(Condition::eq("type", "V")))
            .order_by(Sort::asc("age"))
            .limit(1)
            .build()
            .unwrap();

        let statement = CqlStatement::Select(translator().select(&query).unwrap());
        assert_eq!(
            statement.cql(),
            "SELECT * FROM diana.person WHERE age > ? AND type = ? ORDER BY age ASC LIMIT 1"
        );
        assert_eq!(
            statement.values(),
            vec![NativeValue::Int(22), NativeValue::Text("V".into())]
        );
    }

    #[test]
    fn test_skip_is_folded_into_limit() {
        let query = select("person").limit(2).skip(3).build().unwrap();
        let statement = translator().select(&query).unwrap();

        assert_eq!(statement.limit, Some(5));
        assert_eq!(statement.skip, 3);
        assert!(statement.cql().ends_with("LIMIT 5"));
    }

    #[test]
    fn test_limit_plus_skip_saturates() {
        let query = select("person").limit(u64::MAX).skip(1).build().unwrap();
        let statement = translator().select(&query).unwrap();

        assert_eq!(statement.limit, Some(u64::MAX));
        assert_eq!(statement.skip, 1);
    }

    #[test]
    fn test_sub_second_ttl_rounds_up() {
        let entity = Entity::new("person").with("_id", 1);
        let insert = translator()
            .insert(&entity, Some(Duration::from_millis(500)), &contacts())
            .unwrap();
        assert_eq!(
            insert.cql(),
            "INSERT INTO diana.person (\"_id\") VALUES (?) USING TTL 1"
        );

        let insert = translator()
            .insert(&entity, Some(Duration::from_millis(2_100)), &contacts())
            .unwrap();
        assert_eq!(insert.ttl, Some(Duration::from_secs(3)));

        assert!(matches!(
            translator().insert(&entity, Some(Duration::ZERO), &contacts()),
            Err(DataError::InvalidQuery(_))
        ));
    }

    #[test]
    fn test_underscore_names_are_quoted() {
        let query = select("person")
            .project(["_id", "name"])
            .filter(Condition::eq("_id", 10))
            .build()
            .unwrap();

        assert_eq!(
            translator().select(&query).unwrap().cql(),
            "SELECT \"_id\", name FROM diana.person WHERE \"_id\" = ?"
        );
    }

    #[test]
    fn test_in_binds_each_value() {
        let query = delete("person")
            .filter(Condition::in_("location", vec!["BR", "US"]))
            .build()
            .unwrap();
        let statement = CqlStatement::Delete(translator().delete(&query).unwrap());

        assert_eq!(
            statement.cql(),
            "DELETE FROM diana.person WHERE location IN (?, ?)"
        );
        assert_eq!(statement.values().len(), 2);
    }

    #[test]
    fn test_delete_everything_truncates() {
        let query = delete("person").build().unwrap();
        assert_eq!(
            translator().delete(&query).unwrap().cql(),
            "TRUNCATE diana.person"
        );
    }

    #[test]
    fn test_disjunction_and_negation_are_rejected() {
        let or = select("person")
            .filter(Condition::eq("a", 1).or(Condition::eq("b", 2)))
            .build()
            .unwrap();
        assert!(matches!(
            translator().select(&or),
            Err(DataError::UnsupportedOperator(_))
        ));

        let not = delete("person")
            .filter(Condition::eq("a", 1).negate())
            .build()
            .unwrap();
        assert!(matches!(
            translator().delete(&not),
            Err(DataError::UnsupportedOperator(_))
        ));
    }

    #[test]
    fn test_paged_select_uses_fetch_size() {
        let query = select("person").limit(10).skip(4).build().unwrap();
        let paged = CassandraQuery::paged(query, 3).resume("6".into());
        let statement = translator().select_statement(&paged).unwrap();

        assert_eq!(statement.limit, None);
        assert_eq!(statement.skip, 0);
        assert_eq!(statement.fetch_size, Some(3));
        assert_eq!(statement.paging_state.as_deref(), Some("6"));
    }

    #[test]
    fn test_insert_resolves_user_types() {
        let entity = Entity::new("contact")
            .with("name", "Ada")
            .with(
                "phone",
                AttributeValue::structural([("home", "222"), ("mobile", "111")]),
            )
            .with(
                "history",
                AttributeValue::List(vec![AttributeValue::structural([("home", "333")])]),
            );

        let insert = translator().insert(&entity, None, &contacts()).unwrap();
        let phone = NativeValue::Udt {
            type_name: "phone".into(),
            fields: vec![
                ("mobile".into(), NativeValue::Text("111".into())),
                ("home".into(), NativeValue::Text("222".into())),
            ],
        };
        assert_eq!(insert.columns[1], ("phone".to_string(), phone));
        assert_eq!(
            insert.columns[2].1,
            NativeValue::List(vec![NativeValue::Udt {
                type_name: "phone".into(),
                fields: vec![("home".into(), NativeValue::Text("333".into()))],
            }])
        );
    }

    #[test]
    fn test_insert_with_unregistered_type_fails() {
        let entity = Entity::new("contact").with("address", AttributeValue::structural([("city", "Salvador")]));
        assert!(matches!(
            translator().insert(&entity, None, &contacts()),
            Err(DataError::UnknownStructuralType(_))
        ));

        let missing_type = StaticSchema::new().with_column(
            "diana",
            "contact",
            "phone",
            CqlType::Udt("phone".into()),
        );
        let entity = Entity::new("contact").with("phone", AttributeValue::structural([("home", "1")]));
        assert!(matches!(
            translator().insert(&entity, None, &missing_type),
            Err(DataError::UnknownStructuralType(_))
        ));
    }

    #[test]
    fn test_insert_with_unknown_field_fails() {
        let entity = Entity::new("contact").with("phone", AttributeValue::structural([("work", "1")]));
        assert!(matches!(
            translator().insert(&entity, None, &contacts()),
            Err(DataError::UnsupportedValue(_))
        ));
    }

    #[test]
    fn test_structural_condition_value_is_rejected() {
        let query = select("contact")
            .filter(Condition::eq("phone", AttributeValue::structural([("home", "1")])))
            .build()
            .unwrap();
        assert!(matches!(
            translator().select(&query),
            Err(DataError::UnsupportedValue(_))
        ));
    }
}
