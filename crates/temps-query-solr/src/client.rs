use crate::document::SolrDocument;
use crate::expr::SolrExpr;
use crate::translate::SolrQuery;
use async_trait::async_trait;
use temps_query::Result;

/// Requests the manager issues against one Solr core.
///
/// Implementations wrap a vendor client and commit after every write;
/// transport errors come back as [`temps_query::DataError::BackendError`].
#[async_trait]
pub trait SolrClient: Send + Sync + 'static {
    /// Add or replace documents by unique key
    async fn add(&self, documents: Vec<SolrDocument>) -> Result<()>;

    async fn select(&self, query: &SolrQuery) -> Result<Vec<SolrDocument>>;

    /// Run an already rendered `q` string
    async fn select_raw(&self, q: &str) -> Result<Vec<SolrDocument>>;

    async fn delete_by_query(&self, filter: &SolrExpr) -> Result<()>;

    /// `numFound` for a filter
    async fn count(&self, filter: &SolrExpr) -> Result<u64>;

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
