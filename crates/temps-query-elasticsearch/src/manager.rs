use crate::client::{Hit, SearchClient};
use crate::document::{to_entity, to_source};
use crate::translate::{EsTranslator, SearchRequest};
use async_trait::async_trait;
use serde_json::Value;
use temps_query::{
    Capability, CollectionManager, ConnectionConfig, DeleteQuery, Entity, Result, SelectQuery,
    Translator,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Caller-written query DSL against one or more collections
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub collections: Vec<String>,
    pub query: Value,
}

impl SearchQuery {
    pub fn new<I, S>(collections: I, query: Value) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            collections: collections.into_iter().map(Into::into).collect(),
            query,
        }
    }
}

/// Elasticsearch collection manager; one index per collection
pub struct ElasticsearchManager<C> {
    client: C,
    translator: EsTranslator,
}

impl<C: SearchClient> ElasticsearchManager<C> {
    pub fn new(client: C, config: &ConnectionConfig) -> Result<Self> {
        let translator = EsTranslator::from_config(config)?;
        info!(
            "Elasticsearch manager ready for {}",
            config.connection_string()
        );
        Ok(Self { client, translator })
    }

    pub fn translator(&self) -> &EsTranslator {
        &self.translator
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    async fn save(&self, entity: Entity) -> Result<Entity> {
        let (id, source) = to_source(self.translator.coercion(), &entity)?;
        let id = id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let index = self.translator.index(&entity.collection);

        debug!("Indexing document {} into {}", id, index);
        self.client.index(&index, &id, source).await?;
        Ok(entity)
    }

    async fn search(&self, request: SearchRequest) -> Result<Vec<Entity>> {
        debug!("Searching {:?}: {}", request.indices, request.body);
        let hits = self.client.search(&request).await?;
        Ok(hits.into_iter().map(|hit| self.to_entity(hit)).collect())
    }

    fn to_entity(&self, hit: Hit) -> Entity {
        let collection = self
            .translator
            .collection(&hit.index)
            .unwrap_or(&hit.index)
            .to_string();
        to_entity(collection, hit.source)
    }
}

#[async_trait]
impl<C: SearchClient> CollectionManager for ElasticsearchManager<C> {
    type NativeQuery = SearchQuery;

    fn source_type(&self) -> &'static str {
        "elasticsearch"
    }

    fn capabilities(&self) -> Vec<Capability> {
        vec![
            Capability::Disjunction,
            Capability::Negation,
            Capability::NestedValues,
            Capability::NativeQuery,
        ]
    }

    async fn insert(&self, entity: Entity) -> Result<Entity> {
        self.save(entity).await
    }

    async fn update(&self, entity: Entity) -> Result<Entity> {
        self.save(entity).await
    }

    async fn delete(&self, query: &DeleteQuery) -> Result<()> {
        let request = self.translator.delete(query)?;
        debug!("Deleting from {}: {}", request.index, request.body);
        let deleted = self.client.delete_by_query(&request).await?;
        debug!("Deleted {} documents from {}", deleted, request.index);
        Ok(())
    }

    async fn select(&self, query: &SelectQuery) -> Result<Vec<Entity>> {
        let request = self.translator.select(query)?;
        let entities = self.search(request).await?;

        let window = self.translator.max_result_window();
        if query.limit() == 0 && entities.len() as u64 >= window {
            warn!(
                "Unbounded select on {} stopped at max_result_window ({}); more documents may match",
                query.collection(),
                window
            );
        }
        Ok(entities)
    }

    async fn count(&self, collection: &str) -> Result<u64> {
        self.client.count(&self.translator.index(collection)).await
    }

    async fn native(&self, query: SearchQuery) -> Result<Vec<Entity>> {
        let request = SearchRequest {
            indices: query
                .collections
                .iter()
                .map(|c| self.translator.index(c))
                .collect(),
            body: serde_json::json!({ "query": query.query }),
        };
        self.search(request).await
    }

    async fn close(&self) -> Result<()> {
        self.client.close().await
    }
}
