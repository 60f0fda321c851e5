use crate::metadata::SchemaMetadata;
use crate::session::{CqlSession, ResultPage};
use crate::statement::CqlStatement;
use crate::translate::{CassandraQuery, CqlTranslator};
use async_trait::async_trait;
use std::time::Duration;
use temps_query::coercion::to_attribute_value;
use temps_query::{
    Attribute, AttributeValue, Capability, CollectionManager, ConnectionConfig, DataError,
    DeleteQuery, Entity, NativeValue, Result, SelectQuery, Translator,
};
use tracing::{debug, info};

/// Caller-written CQL with named parameters
#[derive(Debug, Clone, PartialEq)]
pub struct CqlQuery {
    pub cql: String,
    pub params: Vec<(String, AttributeValue)>,
}

impl CqlQuery {
    pub fn new(cql: impl Into<String>) -> Self {
        Self {
            cql: cql.into(),
            params: Vec::new(),
        }
    }

    pub fn bind(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }
}

/// One page of a server-paged select
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub entities: Vec<Entity>,
    pub paging_state: Option<String>,
}

/// Cassandra collection manager
pub struct CassandraManager<S, M> {
    session: S,
    schema: M,
    translator: CqlTranslator,
}

impl<S: CqlSession, M: SchemaMetadata + 'static> CassandraManager<S, M> {
    /// Create a manager over `session`, using the configured database as keyspace
    pub fn new(session: S, schema: M, config: &ConnectionConfig) -> Result<Self> {
        let keyspace = config.require_database()?;
        info!(
            "Cassandra manager ready for {} (keyspace {})",
            config.connection_string(),
            keyspace
        );
        Ok(Self {
            session,
            schema,
            translator: CqlTranslator::new(keyspace),
        })
    }

    pub fn translator(&self) -> &CqlTranslator {
        &self.translator
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    /// Run a standard or paged select, returning the next paging state
    pub async fn select_page(&self, query: &CassandraQuery) -> Result<Page> {
        let select = self.translator.select_statement(query)?;
        let skip = usize::try_from(select.skip).unwrap_or(usize::MAX);
        let table = select.table.clone();

        let page = self.execute(CqlStatement::Select(select)).await?;
        let paging_state = page.paging_state.clone();
        let entities = to_entities(page, &table).into_iter().skip(skip).collect();

        Ok(Page {
            entities,
            paging_state,
        })
    }

    async fn write(&self, entity: Entity, ttl: Option<Duration>) -> Result<Entity> {
        let insert = self.translator.insert(&entity, ttl, &self.schema)?;
        self.execute(CqlStatement::Insert(insert)).await?;
        Ok(entity)
    }

    async fn execute(&self, statement: CqlStatement) -> Result<ResultPage> {
        debug!("Executing CQL: {}", statement.cql());
        self.session.execute(&statement).await
    }
}

#[async_trait]
impl<S: CqlSession, M: SchemaMetadata + 'static> CollectionManager for CassandraManager<S, M> {
    type NativeQuery = CqlQuery;

    fn source_type(&self) -> &'static str {
        "cassandra"
    }

    fn capabilities(&self) -> Vec<Capability> {
        vec![
            Capability::Ttl,
            Capability::NestedValues,
            Capability::NativeQuery,
            Capability::Paging,
        ]
    }

    async fn insert(&self, entity: Entity) -> Result<Entity> {
        self.write(entity, None).await
    }

    async fn insert_with_ttl(&self, entity: Entity, ttl: Duration) -> Result<Entity> {
        self.write(entity, Some(ttl)).await
    }

    // CQL inserts are upserts
    async fn update(&self, entity: Entity) -> Result<Entity> {
        self.write(entity, None).await
    }

    async fn update_with_ttl(&self, entity: Entity, ttl: Duration) -> Result<Entity> {
        self.write(entity, Some(ttl)).await
    }

    async fn delete(&self, query: &DeleteQuery) -> Result<()> {
        let delete = self.translator.delete(query)?;
        self.execute(CqlStatement::Delete(delete)).await?;
        Ok(())
    }

    async fn select(&self, query: &SelectQuery) -> Result<Vec<Entity>> {
        let page = self
            .select_page(&CassandraQuery::Standard(query.clone()))
            .await?;
        Ok(page.entities)
    }

    async fn count(&self, collection: &str) -> Result<u64> {
        let page = self
            .execute(CqlStatement::Count(self.translator.count(collection)))
            .await?;

        page.rows
            .first()
            .and_then(|row| row.iter().find(|(name, _)| name == "count"))
            .and_then(|(_, value)| match value {
                NativeValue::Int(n) => u64::try_from(*n).ok(),
                _ => None,
            })
            .ok_or_else(|| DataError::QueryFailed(format!("count of {} returned no count", collection)))
    }

    async fn native(&self, query: CqlQuery) -> Result<Vec<Entity>> {
        let params = query
            .params
            .iter()
            .map(|(name, value)| Ok((name.clone(), self.translator.coerce(value)?)))
            .collect::<Result<Vec<_>>>()?;

        debug!("Executing native CQL: {}", query.cql);
        let page = self.session.execute_native(&query.cql, &params).await?;
        Ok(to_entities(page, ""))
    }

    async fn close(&self) -> Result<()> {
        self.session.close().await
    }
}

fn to_entities(page: ResultPage, fallback_table: &str) -> Vec<Entity> {
    let table = page.table.unwrap_or_else(|| fallback_table.to_string());
    page.rows
        .into_iter()
        .map(|row| {
            let mut entity = Entity::new(table.clone());
            for (name, value) in row {
                if value != NativeValue::Null {
                    entity.add(Attribute::new(name, to_attribute_value(value)));
                }
            }
            entity
        })
        .collect()
}
