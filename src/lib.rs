#![allow(clippy::doc_markdown)] // Allow technical terms like DQL in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Entity Query Core
//!
//! Declarative condition compiler and CRUD facades over an entity persistence
//! boundary.
//!
//! ## Overview
//!
//! Searches are described as nested condition specifications (built through
//! constructors or parsed from JSON) and compiled into query expression trees
//! whose literal values are bound as named parameters. Repositories assemble
//! the full find query (selects, joins, group-bys, WHERE, HAVING, ordering and
//! the result window), administrators hand it to the persistence engine and
//! check the returned entities.
//!
//! ## Module Organization
//!
//! - [`query_builder`] - Condition language, compiler and query assembly
//! - [`metadata`] - Entity mapping information and its registry
//! - [`repository`] - Per-entity query construction
//! - [`administrator`] - Typed CRUD facade and the persistence boundary trait
//! - [`config`] - Query configuration (alias, parameter prefix, default ordering)
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging setup and helpers
//!
//! ## Quick Start
//!
//! ```rust
//! use entity_query::config::QueryConfig;
//! use entity_query::metadata::{Entity, EntityMetadata, IdentifierValue, MetadataRegistry};
//! use entity_query::query_builder::Conditions;
//! use entity_query::repository::EntityRepository;
//! use serde_json::json;
//!
//! struct Product {
//!     id: i64,
//! }
//!
//! impl Entity for Product {
//!     fn metadata() -> EntityMetadata {
//!         EntityMetadata::new("Product", "product")
//!             .identifier("id")
//!             .fields(&["name", "price"])
//!     }
//!
//!     fn identifier_value(&self, field: &str) -> Option<IdentifierValue> {
//!         (field == "id").then(|| self.id.into())
//!     }
//! }
//!
//! # fn main() -> entity_query::Result<()> {
//! let config = QueryConfig::default();
//! let registry = MetadataRegistry::new();
//! let repository: EntityRepository<Product> =
//!     EntityRepository::from_registry(&registry, &config, config.parameter_sequence())?;
//!
//! let conditions = Conditions::from_value(&json!({ "name": "bike", "__WHERE_LESS__": { "price": 100 } }))?;
//! let count = repository.count_query_builder(&conditions)?;
//! assert_eq!(
//!     count.build_dql(),
//!     "SELECT COUNT(entity) FROM Product entity WHERE entity.name = :param_1 AND entity.price < :param_2"
//! );
//! # Ok(())
//! # }
//! ```

pub mod administrator;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod metadata;
pub mod query_builder;
pub mod repository;

pub use administrator::{EntityAdministrator, EntityManager, EntityRecord, KeyedEntities};
pub use config::QueryConfig;
pub use error::{QueryError, Result};
pub use metadata::{Entity, EntityMetadata, IdentifierValue, MetadataRegistry};
pub use query_builder::{
    Condition, ConditionCompiler, Conditions, Expression, Extras, FindQuery, OrderBy,
    ParameterSequence, ParameterTable, PropertyResolver, QueryAssembler, QueryBuilder,
};
pub use repository::EntityRepository;
