//! # temps-query
//!
//! Backend-agnostic query model for the NoSQL stores Temps talks to, and the
//! contract every backend translator and manager implements.
//!
//! A caller builds a [`SelectQuery`] or [`DeleteQuery`] around a [`Condition`]
//! tree, hands it to a backend's [`CollectionManager`], and the backend's
//! [`Translator`] turns it into the native statement:
//!
//! - `temps-query-cassandra` - CQL (column family, conjunctive only)
//! - `temps-query-elasticsearch` - query DSL (document/search index)
//! - `temps-query-solr` - Lucene syntax (inverted index)
//!
//! Operators a backend cannot express fail with
//! [`DataError::UnsupportedOperator`] instead of being approximated.
//!
//! ## Example
//!
//! ```rust
//! use temps_query::{select, Condition, Sort};
//!
//! # fn example() -> temps_query::Result<()> {
//! let query = select("person")
//!     .filter(Condition::gt("age", 22).and(Condition::eq("type", "V")))
//!     .order_by(Sort::asc("age"))
//!     .limit(1)
//!     .build()?;
//!
//! assert_eq!(query.limit(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Asynchronous execution
//!
//! [`AsyncManager`] wraps any manager and runs operations on the ambient
//! tokio runtime, invoking a callback once on success. TTL-bearing writes
//! against a backend without [`Capability::Ttl`] are rejected before
//! anything is spawned.

pub mod asynchronous;
pub mod coercion;
pub mod condition;
pub mod config;
pub mod error;
pub mod filter;
pub mod json;
pub mod query;
pub mod traits;
pub mod types;
pub mod value;

// Re-export commonly used items
pub use asynchronous::{AsyncManager, ErrorReporter, Operation, Outcome, Submission, SubmissionState};
pub use coercion::{CodecRegistry, Coercion, NativeValue, StaticCodecs};
pub use condition::{Condition, Operator};
pub use config::ConnectionConfig;
pub use error::{DataError, Result};
pub use query::{delete, select, DeleteQuery, SelectQuery, Sort, SortDirection};
pub use traits::{CollectionManager, Translator};
pub use types::{Capability, ResultSet};
pub use value::{Attribute, AttributeValue, Entity, Scalar, ScalarKind};
