//! # Query Builder System
//!
//! Declarative search conditions compiled into entity queries with bound parameters.
//!
//! ## Overview
//!
//! Callers describe a search as a nested condition specification (property
//! equalities, AND/OR grouping, LIKE/IN/NULL predicates, comparisons and their
//! HAVING counterparts). The compiler turns it into expression trees whose
//! literal values live in a parameter table, never in the query text.
//!
//! ## Key Components
//!
//! - [`parameters`] - Unique parameter names from a shared atomic sequence
//! - [`resolver`] - Qualifies bare entity properties with the root alias
//! - [`conditions`] - Condition AST, operator sentinels and the JSON front-end
//! - [`compiler`] - Recursive WHERE/HAVING translation
//! - [`find`] - Find-query assembly (extras, conditions, ordering, window)
//! - [`builder`] - Query under construction and its DQL rendering
//! - [`joins`] / [`pagination`] / [`ordering`] / [`extras`] - Query parts
//!
//! ## Example Usage
//!
//! ```rust
//! use entity_query::metadata::EntityMetadata;
//! use entity_query::query_builder::{
//!     Conditions, OrderBy, ParameterSequence, PropertyResolver, QueryAssembler, FindQuery,
//! };
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let metadata = EntityMetadata::new("Product", "product")
//!     .identifier("id")
//!     .fields(&["name", "price"]);
//! let resolver = PropertyResolver::new("entity", Arc::new(metadata));
//! let sequence = ParameterSequence::new("param");
//!
//! let conditions = Conditions::from_value(&json!({
//!     "__OR_WHERE__": { "name": "bike", "price": 10 }
//! }))
//! .unwrap();
//! let query = FindQuery::new(conditions).order_by(OrderBy::new().desc("price"));
//!
//! let query_builder = QueryAssembler::new(&resolver, &sequence).assemble(&query).unwrap();
//! assert_eq!(
//!     query_builder.build_dql(),
//!     "SELECT entity FROM Product entity \
//!      WHERE entity.name = :param_1 OR entity.price = :param_2 \
//!      ORDER BY entity.price DESC"
//! );
//! ```

pub mod builder;
pub mod compiler;
pub mod conditions;
pub mod expression;
pub mod extras;
pub mod find;
pub mod joins;
pub mod ordering;
pub mod pagination;
pub mod parameters;
pub mod resolver;

pub use builder::QueryBuilder;
pub use compiler::{CompiledClause, ConditionCompiler};
pub use conditions::{Clause, Condition, Conditions, Sentinel};
pub use expression::{
    ComparisonOperator, Expression, LogicalOperator, Operand, Predicate, PredicateOperator,
    PropertyRef,
};
pub use extras::{Extras, SelectItem};
pub use find::{FindQuery, QueryAssembler};
pub use joins::{Join, JoinType};
pub use ordering::{OrderBy, OrderEntry, SortDirection};
pub use pagination::Pagination;
pub use parameters::{ParameterBinder, ParameterSequence, ParameterTable};
pub use resolver::PropertyResolver;
