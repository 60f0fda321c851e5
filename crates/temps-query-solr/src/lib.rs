//! Solr backend for temps-query
//!
//! All collections share one core; each document carries its collection in
//! an entity field (`_entity` by default) and every query is scoped by it.
//! Conditions render to Lucene syntax with special characters escaped.
//! Documents are flat, so structural values are rejected, and TTL is not
//! supported.
//!
//! ## Example
//!
//! ```rust
//! use temps_query::{select, Condition, Translator};
//! use temps_query_solr::SolrTranslator;
//!
//! # fn example() -> temps_query::Result<()> {
//! let query = select("person")
//!     .filter(Condition::gt("age", 22).and(Condition::eq("type", "V")))
//!     .build()?;
//!
//! let solr = SolrTranslator::new("_entity", 100).select(&query)?;
//! assert_eq!(solr.q()?, "_entity:person AND age:{22 TO *] AND type:V");
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod codec;
pub mod document;
pub mod expr;
pub mod manager;
pub mod native;
pub mod translate;

#[cfg(test)]
mod memory;

pub use client::SolrClient;
pub use codec::SolrCodecs;
pub use document::SolrDocument;
pub use expr::{escape, Bound, SolrExpr};
pub use manager::SolrManager;
pub use native::SolrNativeQuery;
pub use translate::{SolrQuery, SolrTranslator};
