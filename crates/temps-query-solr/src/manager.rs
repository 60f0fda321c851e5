use crate::client::SolrClient;
use crate::document::{to_document, to_entity, SolrDocument};
use crate::native::SolrNativeQuery;
use crate::translate::SolrTranslator;
use async_trait::async_trait;
use temps_query::{
    Capability, CollectionManager, ConnectionConfig, DeleteQuery, Entity, Result, SelectQuery,
    Translator,
};
use tracing::{debug, info};

/// Solr collection manager; every collection lives in one core
pub struct SolrManager<C> {
    client: C,
    translator: SolrTranslator,
}

impl<C: SolrClient> SolrManager<C> {
    pub fn new(client: C, config: &ConnectionConfig) -> Result<Self> {
        let translator = SolrTranslator::from_config(config)?;
        info!(
            "Solr manager ready for {} (entity field {})",
            config.connection_string(),
            translator.entity_field()
        );
        Ok(Self { client, translator })
    }

    pub fn translator(&self) -> &SolrTranslator {
        &self.translator
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    async fn save(&self, entity: Entity) -> Result<Entity> {
        let document = to_document(&self.translator, &entity)?;
        self.client.add(vec![document]).await?;
        Ok(entity)
    }

    fn to_entities(&self, documents: Vec<SolrDocument>) -> Vec<Entity> {
        documents
            .into_iter()
            .map(|d| to_entity(&self.translator, d))
            .collect()
    }
}

#[async_trait]
impl<C: SolrClient> CollectionManager for SolrManager<C> {
    type NativeQuery = SolrNativeQuery;

    fn source_type(&self) -> &'static str {
        "solr"
    }

    fn capabilities(&self) -> Vec<Capability> {
        vec![
            Capability::Disjunction,
            Capability::Negation,
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
        let filter = self.translator.delete(query)?;
        debug!("Deleting by query: {}", filter.render()?);
        self.client.delete_by_query(&filter).await
    }

    async fn select(&self, query: &SelectQuery) -> Result<Vec<Entity>> {
        let solr = self.translator.select(query)?;
        debug!("Selecting: {:?}", solr.params()?);
        let documents = self.client.select(&solr).await?;
        Ok(self.to_entities(documents))
    }

    async fn count(&self, collection: &str) -> Result<u64> {
        self.client.count(&self.translator.scope(collection)).await
    }

    async fn native(&self, query: SolrNativeQuery) -> Result<Vec<Entity>> {
        let q = query.substitute(&self.translator)?;
        debug!("Native query: {}", q);
        let documents = self.client.select_raw(&q).await?;
        Ok(self.to_entities(documents))
    }

    async fn close(&self) -> Result<()> {
        self.client.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryClient;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use temps_query::{
        delete, select, AsyncManager, AttributeValue, Condition, DataError, Scalar, Sort,
    };

    fn manager() -> SolrManager<MemoryClient> {
        let config = ConnectionConfig::new("solr").with_host("localhost").with_port(8983);
        SolrManager::new(MemoryClient::default(), &config).unwrap()
    }

    // Ages 22, 23 and 25, all of type V
    async fn seeded() -> SolrManager<MemoryClient> {
        let manager = manager();
        let people = [
            ("1", "Poliana", 22, "BR"),
            ("2", "Lucas", 23, "US"),
            ("3", "Luna", 25, "FR"),
        ];
        for (id, name, age, location) in people {
            let person = Entity::new("person")
                .with("id", id)
                .with("name", name)
                .with("age", age)
                .with("location", location)
                .with("type", "V");
            manager.insert(person).await.unwrap();
        }
        manager
            .insert(Entity::new("car").with("id", "4").with("age", 30).with("type", "V"))
            .await
            .unwrap();
        manager
    }

    fn ages(entities: &[Entity]) -> Vec<i64> {
        entities
            .iter()
            .filter_map(|e| match e.find("age") {
                Some(AttributeValue::Scalar(Scalar::Int(age))) => Some(*age),
                _ => None,
            })
            .collect()
    }

    fn voters() -> temps_query::query::SelectQueryBuilder {
        select("person").filter(Condition::gt("age", 22).and(Condition::eq("type", "V")))
    }

    #[tokio::test]
    async fn test_select_sorted_both_ways() {
        let manager = seeded().await;
        let asc = manager
            .select(&voters().order_by(Sort::asc("age")).build().unwrap())
            .await
            .unwrap();
        assert_eq!(ages(&asc), vec![23, 25]);

        let desc = manager
            .select(&voters().order_by(Sort::desc("age")).build().unwrap())
            .await
            .unwrap();
        assert_eq!(ages(&desc), vec![25, 23]);
        assert!(desc.iter().all(|e| e.collection == "person"));
    }

    #[tokio::test]
    async fn test_limit_and_skip() {
        let manager = seeded().await;
        let sorted = voters().order_by(Sort::asc("age"));

        let first = manager.select(&sorted.clone().limit(1).build().unwrap()).await.unwrap();
        assert_eq!(ages(&first), vec![23]);

        let rest = manager.select(&sorted.clone().skip(1).build().unwrap()).await.unwrap();
        assert_eq!(ages(&rest), vec![25]);

        let none = manager.select(&sorted.skip(3).build().unwrap()).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_not_like_and_in() {
        let manager = seeded().await;

        let not = select("person")
            .filter(Condition::eq("name", "Lucas").negate())
            .build()
            .unwrap();
        assert_eq!(manager.select(&not).await.unwrap().len(), 2);

        let like = select("person")
            .filter(Condition::like("name", "Lu*").and(Condition::eq("type", "V")))
            .build()
            .unwrap();
        assert_eq!(manager.select(&like).await.unwrap().len(), 2);

        let within = select("person")
            .filter(Condition::in_("location", vec!["BR", "US"]))
            .build()
            .unwrap();
        assert_eq!(manager.select(&within).await.unwrap().len(), 2);

        let nowhere = select("person")
            .filter(Condition::in_::<&str>("location", vec![]))
            .build()
            .unwrap();
        assert_eq!(
            manager.translator().select(&nowhere).unwrap().q().unwrap(),
            "_entity:person AND (*:* -*:*)"
        );
        assert!(manager.select(&nowhere).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_projection() {
        let manager = seeded().await;
        let query = select("person")
            .project(["name"])
            .filter(Condition::eq("id", "1"))
            .build()
            .unwrap();

        let found = manager.select(&query).await.unwrap();
        assert_eq!(found, vec![Entity::new("person").with("name", "Poliana")]);
    }

    #[tokio::test]
    async fn test_native_query_with_params() {
        let manager = seeded().await;
        let query = SolrNativeQuery::new("age:@age AND type:@type AND _entity:@entity")
            .bind("age", 22)
            .bind("type", "V")
            .bind("entity", "person");

        let found = manager.native(query).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].collection, "person");
    }

    #[tokio::test]
    async fn test_delete_is_scoped_to_collection() {
        let manager = seeded().await;
        manager.delete(&delete("person").build().unwrap()).await.unwrap();

        assert_eq!(manager.count("person").await.unwrap(), 0);
        assert_eq!(manager.count("car").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_structural_insert_is_rejected() {
        let manager = manager();
        let entity = Entity::new("person")
            .with("id", "1")
            .with("phones", AttributeValue::structural([("mobile", "1231231")]));

        assert!(matches!(
            manager.insert(entity).await,
            Err(DataError::UnsupportedValue(_))
        ));
        assert_eq!(manager.count("person").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_ttl_is_rejected() {
        let manager = Arc::new(manager());
        let entity = Entity::new("person").with("id", "1");
        assert!(matches!(
            manager.insert_with_ttl(entity.clone(), Duration::from_secs(10)).await,
            Err(DataError::UnsupportedCapability(_))
        ));

        let facade = AsyncManager::new(manager.clone());
        assert!(matches!(
            facade.update_with_ttl(entity, Duration::from_secs(10), |_| {}),
            Err(DataError::UnsupportedCapability(_))
        ));
        assert_eq!(manager.client().writes(), 0);
    }

    #[tokio::test]
    async fn test_async_insert_then_select() {
        let facade = AsyncManager::new(Arc::new(manager()));
        let inserted = Arc::new(AtomicUsize::new(0));

        let counter = inserted.clone();
        let person = Entity::new("person").with("id", "7").with("age", 40);
        facade
            .insert(person, move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap()
            .wait(Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(inserted.load(Ordering::SeqCst), 1);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        facade
            .select(select("person").build().unwrap(), move |results| {
                sink.lock().unwrap().extend(results);
            })
            .unwrap()
            .wait(Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(ages(&seen.lock().unwrap()), vec![40]);
    }
}
