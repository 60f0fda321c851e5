//! Elasticsearch backend for temps-query
//!
//! Conditions become query DSL: comparisons map to `term`, `range`,
//! `wildcard` and `terms`, while `AND`/`OR`/`NOT` become `bool` queries.
//! Each collection is stored in its own index, optionally prefixed.
//! Expiring documents (TTL) is not supported.
//!
//! ## Example
//!
//! ```rust
//! use serde_json::json;
//! use temps_query::{select, Condition, Translator};
//! use temps_query_elasticsearch::EsTranslator;
//!
//! # fn example() -> temps_query::Result<()> {
//! let query = select("person")
//!     .filter(Condition::eq("name", "Poliana").or(Condition::eq("name", "Lucas")))
//!     .limit(10)
//!     .build()?;
//!
//! let request = EsTranslator::new("", 10_000).select(&query)?;
//! assert_eq!(request.body["size"], json!(10));
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod document;
pub mod manager;
pub mod translate;

#[cfg(test)]
mod memory;

pub use client::{Hit, SearchClient};
pub use manager::{ElasticsearchManager, SearchQuery};
pub use translate::{DeleteByQuery, EsTranslator, SearchRequest};
