//! Cassandra backend for temps-query
//!
//! Translates select/delete descriptors into CQL and runs them through a
//! [`CqlSession`]. Only conjunctive restrictions are expressible; `OR` and
//! `NOT` fail with `UnsupportedOperator`. Composite values are written as
//! user-defined types resolved through [`SchemaMetadata`].
//!
//! ## Example
//!
//! ```rust
//! use temps_query::{select, Condition, Sort, Translator};
//! use temps_query_cassandra::CqlTranslator;
//!
//! # fn example() -> temps_query::Result<()> {
//! let query = select("person")
//!     .filter(Condition::gt("age", 22).and(Condition::eq("type", "V")))
//!     .order_by(Sort::asc("age"))
//!     .limit(1)
//!     .build()?;
//!
//! let statement = CqlTranslator::new("diana").select(&query)?;
//! assert_eq!(
//!     statement.cql(),
//!     "SELECT * FROM diana.person WHERE age > ? AND type = ? ORDER BY age ASC LIMIT 1"
//! );
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod manager;
pub mod metadata;
pub mod session;
pub mod statement;
pub mod translate;

#[cfg(test)]
mod memory;

pub use codec::CqlCodecs;
pub use manager::{CassandraManager, CqlQuery, Page};
pub use metadata::{CqlType, SchemaMetadata, StaticSchema, UserType};
pub use session::{CqlSession, ResultPage, Row};
pub use statement::{quote_identifier, CqlStatement};
pub use translate::{CassandraQuery, CqlTranslator};
