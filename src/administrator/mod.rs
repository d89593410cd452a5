//! # Entity Administration
//!
//! Typed CRUD facades over the persistence engine. Queries are assembled by
//! the [`EntityRepository`] and executed by an [`EntityManager`]
//! implementation; results come back as type-erased records and are
//! checked against the administered entity type before they reach callers.

pub mod keyed;
pub mod manager;

pub use keyed::{downcast_record, key_by_id, KeyedEntities};
pub use manager::{into_record, AnyEntity, EntityManager, EntityRecord};

use crate::config::QueryConfig;
use crate::error::{QueryError, Result};
use crate::logging::{log_entity_operation, log_query_operation};
use crate::metadata::{Entity, IdentifierValue, MetadataRegistry};
use crate::query_builder::{Condition, Conditions, Extras, OrderBy, ParameterSequence};
use crate::repository::EntityRepository;
use std::sync::Arc;
use tracing::debug;

/// CRUD facade for one entity type
pub struct EntityAdministrator<E: Entity> {
    manager: Arc<dyn EntityManager>,
    repository: EntityRepository<E>,
    default_order_by: OrderBy,
}

impl<E: Entity> EntityAdministrator<E> {
    pub fn new(manager: Arc<dyn EntityManager>, repository: EntityRepository<E>) -> Self {
        Self {
            manager,
            repository,
            default_order_by: OrderBy::new(),
        }
    }

    /// Administrator for `E` using the configured alias and default ordering
    pub fn from_registry(
        manager: Arc<dyn EntityManager>,
        registry: &MetadataRegistry,
        config: &QueryConfig,
        sequence: ParameterSequence,
    ) -> Result<Self> {
        let repository = EntityRepository::from_registry(registry, config, sequence)?;
        Ok(Self::new(manager, repository).with_default_order_by(config.default_order_by.clone()))
    }

    /// Ordering used when a find is given none
    pub fn with_default_order_by(mut self, order_by: OrderBy) -> Self {
        self.default_order_by = order_by;
        self
    }

    pub fn repository(&self) -> &EntityRepository<E> {
        &self.repository
    }

    pub fn manager(&self) -> &Arc<dyn EntityManager> {
        &self.manager
    }

    pub fn default_order_by(&self) -> &OrderBy {
        &self.default_order_by
    }

    fn order_or_default<'a>(&'a self, order_by: Option<&'a OrderBy>) -> &'a OrderBy {
        order_by.unwrap_or(&self.default_order_by)
    }

    fn entity_name(&self) -> &str {
        self.repository.entity_name()
    }

    pub async fn find_by(
        &self,
        conditions: &Conditions,
        order_by: Option<&OrderBy>,
        limit: Option<u64>,
        offset: Option<u64>,
        extras: &Extras,
    ) -> Result<Vec<Arc<E>>> {
        let records = self
            .find_records(conditions, order_by, limit, offset, extras)
            .await?;
        records.into_iter().map(downcast_record::<E>).collect()
    }

    /// Every pattern becomes a LIKE, all of them ANDed
    pub async fn find_like_by(
        &self,
        patterns: &[(&str, &str)],
        order_by: Option<&OrderBy>,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<Vec<Arc<E>>> {
        let conditions = Self::like_conditions(patterns);
        self.find_by(&conditions, order_by, limit, offset, &Extras::new())
            .await
    }

    pub async fn find_one_by(
        &self,
        conditions: &Conditions,
        order_by: Option<&OrderBy>,
        extras: &Extras,
    ) -> Result<Option<Arc<E>>> {
        let query_builder = self.repository.query_builder_find_by(
            conditions,
            self.order_or_default(order_by),
            Some(1),
            None,
            extras,
        )?;
        log_query_operation(
            "find_one_by",
            self.entity_name(),
            query_builder.parameters().len(),
            "assembled",
            None,
        );

        self.manager
            .get_one_or_null_result(&query_builder)
            .await?
            .map(downcast_record::<E>)
            .transpose()
    }

    /// Identity lookup; with extras the lookup runs as a query instead
    pub async fn find_one_by_id<I>(&self, id: I, extras: &Extras) -> Result<Option<Arc<E>>>
    where
        I: Into<IdentifierValue> + Send,
    {
        let id = id.into();

        if !extras.is_empty() {
            let field = self.repository.single_identifier_field_name()?;
            let conditions = Conditions::new().with(Condition::property(field, id.to_json()));
            let query_builder = self.repository.query_builder_find_by(
                &conditions,
                &OrderBy::new(),
                None,
                None,
                extras,
            )?;
            return self
                .manager
                .get_one_or_null_result(&query_builder)
                .await?
                .map(downcast_record::<E>)
                .transpose();
        }

        self.manager
            .find(self.repository.metadata(), &id)
            .await?
            .map(downcast_record::<E>)
            .transpose()
    }

    pub async fn find_all(&self, order_by: Option<&OrderBy>) -> Result<Vec<Arc<E>>> {
        self.find_by(&Conditions::new(), order_by, None, None, &Extras::new())
            .await
    }

    pub async fn find_by_keyed_by_id(
        &self,
        conditions: &Conditions,
        order_by: Option<&OrderBy>,
        limit: Option<u64>,
        offset: Option<u64>,
        extras: &Extras,
    ) -> Result<KeyedEntities<E>> {
        let records = self
            .find_records(conditions, order_by, limit, offset, extras)
            .await?;
        self.key_by_id(records)
    }

    pub async fn find_like_by_keyed_by_id(
        &self,
        patterns: &[(&str, &str)],
        order_by: Option<&OrderBy>,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<KeyedEntities<E>> {
        let conditions = Self::like_conditions(patterns);
        self.find_by_keyed_by_id(&conditions, order_by, limit, offset, &Extras::new())
            .await
    }

    pub async fn find_all_keyed_by_id(&self, order_by: Option<&OrderBy>) -> Result<KeyedEntities<E>> {
        self.find_by_keyed_by_id(&Conditions::new(), order_by, None, None, &Extras::new())
            .await
    }

    /// Index records by identifier; a record of another type fails the call
    pub fn key_by_id(&self, records: Vec<EntityRecord>) -> Result<KeyedEntities<E>> {
        key_by_id::<E>(self.repository.metadata(), records)
    }

    pub async fn count(&self, conditions: &Conditions) -> Result<u64> {
        let query_builder = self.repository.count_query_builder(conditions)?;
        let value = self.manager.single_scalar_result(&query_builder).await?;

        value.as_u64().ok_or_else(|| {
            QueryError::persistence(format!(
                "The count of \"{}\" returned a non-integer value: {value}",
                self.entity_name()
            ))
        })
    }

    /// New, unmanaged entity
    pub fn create(&self) -> E
    where
        E: Default,
    {
        E::default()
    }

    /// New, unmanaged entity initialized by `init`
    pub fn create_with<F>(&self, init: F) -> E
    where
        E: Default,
        F: FnOnce(&mut E),
    {
        let mut entity = E::default();
        init(&mut entity);
        entity
    }

    pub async fn persist(&self, entity: Arc<E>) -> Result<()> {
        self.persist_many(vec![entity]).await
    }

    pub async fn persist_many(&self, entities: Vec<Arc<E>>) -> Result<()> {
        let count = entities.len();
        for entity in entities {
            self.manager.persist(into_record(entity)).await?;
        }
        log_entity_operation("persist", self.entity_name(), count, "scheduled", None);
        Ok(())
    }

    /// Persist then flush
    pub async fn save(&self, entity: Arc<E>) -> Result<()> {
        self.save_many(vec![entity]).await
    }

    pub async fn save_many(&self, entities: Vec<Arc<E>>) -> Result<()> {
        self.persist_many(entities).await?;
        self.flush().await
    }

    pub async fn flush(&self) -> Result<()> {
        self.manager.flush().await
    }

    /// Detach every managed entity of this type
    pub async fn clear(&self) -> Result<()> {
        self.manager.clear(self.repository.metadata()).await
    }

    pub async fn detach(&self, entity: Arc<E>) -> Result<()> {
        self.manager.detach(into_record(entity)).await
    }

    pub async fn remove(&self, entity: Arc<E>) -> Result<()> {
        self.remove_many(vec![entity]).await
    }

    pub async fn remove_many(&self, entities: Vec<Arc<E>>) -> Result<()> {
        let count = entities.len();
        for entity in entities {
            self.manager.remove(into_record(entity)).await?;
        }
        log_entity_operation("remove", self.entity_name(), count, "scheduled", None);
        Ok(())
    }

    /// Remove then flush
    pub async fn delete(&self, entity: Arc<E>) -> Result<()> {
        self.delete_many(vec![entity]).await
    }

    pub async fn delete_many(&self, entities: Vec<Arc<E>>) -> Result<()> {
        self.remove_many(entities).await?;
        self.flush().await
    }

    /// Schedule every entity of this type for removal
    pub async fn remove_all(&self, init_auto_increment: bool) -> Result<()> {
        let entities = self.find_all(None).await?;
        self.remove_many(entities).await?;
        if init_auto_increment {
            self.init_auto_increment().await?;
        }
        Ok(())
    }

    pub async fn delete_all(&self, init_auto_increment: bool) -> Result<()> {
        self.remove_all(init_auto_increment).await?;
        self.flush().await
    }

    /// Whether `entity` carries a value for every identifier field
    pub fn exists(&self, entity: &dyn AnyEntity) -> Result<bool> {
        let typed = entity.as_any().downcast_ref::<E>().ok_or_else(|| {
            QueryError::type_mismatch(std::any::type_name::<E>(), entity.entity_type_name())
        })?;

        for field in self.repository.identifier_field_names() {
            if keyed::identifier_of(self.repository.metadata(), typed, field)?.is_null() {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub async fn truncate(&self, init_auto_increment: bool) -> Result<()> {
        let statement = format!("TRUNCATE TABLE {}", self.table_name());
        self.manager.execute_statement(&statement).await?;
        log_entity_operation("truncate", self.entity_name(), 0, "executed", None);

        if init_auto_increment {
            self.init_auto_increment().await?;
        }
        Ok(())
    }

    pub async fn init_auto_increment(&self) -> Result<()> {
        self.set_auto_increment(1).await
    }

    pub async fn set_auto_increment(&self, value: u64) -> Result<()> {
        let statement = format!("ALTER TABLE {} AUTO_INCREMENT = {value}", self.table_name());
        self.manager.execute_statement(&statement).await?;
        debug!(entity = self.entity_name(), value, "Reset auto increment");
        Ok(())
    }

    pub fn table_name(&self) -> &str {
        self.repository.table_name()
    }

    pub fn identifier_field_names(&self) -> &[String] {
        self.repository.identifier_field_names()
    }

    pub fn single_identifier_field_name(&self) -> Result<&str> {
        self.repository.single_identifier_field_name()
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.repository.has_field(name)
    }

    pub fn has_association(&self, name: &str) -> bool {
        self.repository.has_association(name)
    }

    fn like_conditions(patterns: &[(&str, &str)]) -> Conditions {
        if patterns.is_empty() {
            return Conditions::new();
        }
        Conditions::new().with(Condition::and_where(
            patterns
                .iter()
                .map(|(property, pattern)| Condition::like(property, *pattern))
                .collect(),
        ))
    }

    async fn find_records(
        &self,
        conditions: &Conditions,
        order_by: Option<&OrderBy>,
        limit: Option<u64>,
        offset: Option<u64>,
        extras: &Extras,
    ) -> Result<Vec<EntityRecord>> {
        let query_builder = self.repository.query_builder_find_by(
            conditions,
            self.order_or_default(order_by),
            limit,
            offset,
            extras,
        )?;
        log_query_operation(
            "find_by",
            self.entity_name(),
            query_builder.parameters().len(),
            "assembled",
            None,
        );

        self.manager.get_result(&query_builder).await
    }
}
