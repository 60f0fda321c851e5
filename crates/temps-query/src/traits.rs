use crate::error::{DataError, Result};
use crate::query::{DeleteQuery, SelectQuery};
use crate::types::Capability;
use crate::value::Entity;
use async_trait::async_trait;
use std::time::Duration;

/// Translates backend-neutral descriptors into a backend's native statements.
///
/// Implementations are stateless: backend metadata is passed in, never cached,
/// so one translator may be shared across threads.
pub trait Translator: Send + Sync {
    /// Native select statement or request
    type Select;
    /// Native delete statement or request
    type Delete;

    fn select(&self, query: &SelectQuery) -> Result<Self::Select>;

    fn delete(&self, query: &DeleteQuery) -> Result<Self::Delete>;
}

/// Synchronous-style (awaited) operations on one backend's collections
#[async_trait]
pub trait CollectionManager: Send + Sync + 'static {
    /// Backend-specific query accepted by [`CollectionManager::native`]
    type NativeQuery: Send + 'static;

    /// Get the type name of this backend
    fn source_type(&self) -> &'static str;

    /// Get all capabilities supported by this backend
    fn capabilities(&self) -> Vec<Capability>;

    /// Check if a specific capability is supported
    fn supports(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    /// Fail fast when the backend cannot expire records
    fn ensure_ttl_supported(&self) -> Result<()> {
        if self.supports(Capability::Ttl) {
            Ok(())
        } else {
            Err(DataError::unsupported_capability(format!(
                "{} does not support TTL",
                self.source_type()
            )))
        }
    }

    async fn insert(&self, entity: Entity) -> Result<Entity>;

    /// Insert with expiry; backends supporting TTL override this
    async fn insert_with_ttl(&self, _entity: Entity, _ttl: Duration) -> Result<Entity> {
        self.ensure_ttl_supported()?;
        Err(DataError::Internal(format!(
            "{} declares TTL but does not implement insert_with_ttl",
            self.source_type()
        )))
    }

    async fn update(&self, entity: Entity) -> Result<Entity>;

    /// Update with expiry; backends supporting TTL override this
    async fn update_with_ttl(&self, _entity: Entity, _ttl: Duration) -> Result<Entity> {
        self.ensure_ttl_supported()?;
        Err(DataError::Internal(format!(
            "{} declares TTL but does not implement update_with_ttl",
            self.source_type()
        )))
    }

    async fn delete(&self, query: &DeleteQuery) -> Result<()>;

    async fn select(&self, query: &SelectQuery) -> Result<Vec<Entity>>;

    /// Count every record in a collection
    async fn count(&self, collection: &str) -> Result<u64>;

    /// Execute a backend-specific query, bypassing the condition model
    async fn native(&self, query: Self::NativeQuery) -> Result<Vec<Entity>>;

    /// Close the backend client gracefully
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
