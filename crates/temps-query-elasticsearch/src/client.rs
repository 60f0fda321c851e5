use crate::translate::{DeleteByQuery, SearchRequest};
use async_trait::async_trait;
use serde_json::Value;
use temps_query::Result;

/// One search hit
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub index: String,
    pub id: String,
    pub source: Value,
}

/// Subset of the Elasticsearch REST API the manager drives.
///
/// Implementations wrap a vendor client; transport errors come back as
/// [`temps_query::DataError::BackendError`].
#[async_trait]
pub trait SearchClient: Send + Sync + 'static {
    /// Index (create or replace) a document
    async fn index(&self, index: &str, id: &str, document: Value) -> Result<()>;

    async fn search(&self, request: &SearchRequest) -> Result<Vec<Hit>>;

    /// Returns the number of deleted documents
    async fn delete_by_query(&self, request: &DeleteByQuery) -> Result<u64>;

    async fn count(&self, index: &str) -> Result<u64>;

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
