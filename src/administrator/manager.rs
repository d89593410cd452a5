use crate::error::Result;
use crate::metadata::{Entity, EntityMetadata, IdentifierValue};
use crate::query_builder::QueryBuilder;
use async_trait::async_trait;
use serde_json::Value;
use std::any::Any;
use std::sync::Arc;

/// Type-erased entity as exchanged with the persistence engine
pub trait AnyEntity: Any + Send + Sync {
    fn entity_type_name(&self) -> &'static str;

    /// See [`Entity::identifier_value`]
    fn identifier(&self, field: &str) -> Option<IdentifierValue>;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Entity> AnyEntity for T {
    fn entity_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn identifier(&self, field: &str) -> Option<IdentifierValue> {
        self.identifier_value(field)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Entity handle returned by queries; may hold any registered entity type
pub type EntityRecord = Arc<dyn AnyEntity>;

/// Wrap a typed entity for the persistence engine
pub fn into_record<E: Entity>(entity: Arc<E>) -> EntityRecord {
    entity
}

/// The persistence engine the administrators delegate to.
///
/// Implementations execute assembled queries, track entities for the next
/// flush and run raw maintenance statements against the entity tables.
#[async_trait]
pub trait EntityManager: Send + Sync {
    /// Execute a query and return every matching entity
    async fn get_result(&self, query: &QueryBuilder) -> Result<Vec<EntityRecord>>;

    /// Execute a query expected to match at most one entity
    async fn get_one_or_null_result(&self, query: &QueryBuilder) -> Result<Option<EntityRecord>>;

    /// Execute a query selecting one scalar (e.g. a count)
    async fn single_scalar_result(&self, query: &QueryBuilder) -> Result<Value>;

    /// Identity lookup
    async fn find(
        &self,
        metadata: &EntityMetadata,
        id: &IdentifierValue,
    ) -> Result<Option<EntityRecord>>;

    /// Schedule an entity for insertion or update at the next flush
    async fn persist(&self, entity: EntityRecord) -> Result<()>;

    /// Schedule an entity for deletion at the next flush
    async fn remove(&self, entity: EntityRecord) -> Result<()>;

    /// Stop tracking an entity
    async fn detach(&self, entity: EntityRecord) -> Result<()>;

    /// Write every pending change
    async fn flush(&self) -> Result<()>;

    /// Stop tracking every entity of one type
    async fn clear(&self, metadata: &EntityMetadata) -> Result<()>;

    /// Run a raw statement, returning the affected row count
    async fn execute_statement(&self, statement: &str) -> Result<u64>;
}
