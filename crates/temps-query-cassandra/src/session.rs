use crate::statement::CqlStatement;
use async_trait::async_trait;
use temps_query::{NativeValue, Result};

/// One result row, columns in result-metadata order
pub type Row = Vec<(String, NativeValue)>;

/// Rows fetched by a single execution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultPage {
    pub rows: Vec<Row>,
    /// Table named by the result metadata, when the driver reports one
    pub table: Option<String>,
    /// Opaque token for the next page; `None` once exhausted
    pub paging_state: Option<String>,
}

/// Driver session executing CQL against a cluster.
///
/// Implementations own connection pooling and retries; driver errors surface
/// as [`temps_query::DataError::BackendError`].
#[async_trait]
pub trait CqlSession: Send + Sync + 'static {
    async fn execute(&self, statement: &CqlStatement) -> Result<ResultPage>;

    /// Execute caller-written CQL with named bind values
    async fn execute_native(&self, cql: &str, params: &[(String, NativeValue)]) -> Result<ResultPage>;

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
