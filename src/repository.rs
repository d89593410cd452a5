//! # Entity Repository
//!
//! Query construction for one entity type: binds the entity's metadata, the
//! root alias and the shared parameter sequence, and hands out assembled
//! [`QueryBuilder`]s for the administrator to execute.

use crate::config::QueryConfig;
use crate::error::Result;
use crate::metadata::{Entity, EntityMetadata, MetadataRegistry};
use crate::query_builder::{
    Conditions, Extras, FindQuery, OrderBy, ParameterSequence, PropertyRef, PropertyResolver,
    QueryAssembler, QueryBuilder,
};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

pub struct EntityRepository<E: Entity> {
    metadata: Arc<EntityMetadata>,
    resolver: PropertyResolver,
    sequence: ParameterSequence,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> EntityRepository<E> {
    pub fn new(metadata: Arc<EntityMetadata>, root_alias: &str, sequence: ParameterSequence) -> Self {
        Self {
            resolver: PropertyResolver::new(root_alias, Arc::clone(&metadata)),
            metadata,
            sequence,
            _entity: PhantomData,
        }
    }

    /// Repository for `E`, registering its metadata if needed
    pub fn from_registry(
        registry: &MetadataRegistry,
        config: &QueryConfig,
        sequence: ParameterSequence,
    ) -> Result<Self> {
        let metadata = registry.register::<E>()?;
        Ok(Self::new(metadata, &config.root_alias, sequence))
    }

    pub fn metadata(&self) -> &EntityMetadata {
        &self.metadata
    }

    pub fn resolver(&self) -> &PropertyResolver {
        &self.resolver
    }

    pub fn sequence(&self) -> &ParameterSequence {
        &self.sequence
    }

    pub fn root_alias(&self) -> &str {
        self.resolver.root_alias()
    }

    pub fn entity_name(&self) -> &str {
        self.metadata.name()
    }

    pub fn resolve_property(&self, name: &str) -> PropertyRef {
        self.resolver.resolve(name)
    }

    pub fn assembler(&self) -> QueryAssembler<'_> {
        QueryAssembler::new(&self.resolver, &self.sequence)
    }

    pub fn create_query_builder(&self) -> QueryBuilder {
        self.assembler().create_query_builder()
    }

    /// Query builder for a find: extras, conditions, ordering then the window
    pub fn query_builder_find_by(
        &self,
        conditions: &Conditions,
        order_by: &OrderBy,
        limit: Option<u64>,
        offset: Option<u64>,
        extras: &Extras,
    ) -> Result<QueryBuilder> {
        self.assembler()
            .build_find_query(conditions, order_by, limit, offset, extras)
    }

    pub fn query_builder_find(&self, query: &FindQuery) -> Result<QueryBuilder> {
        self.assembler().assemble(query)
    }

    /// `SELECT COUNT(<alias>)` restricted by the WHERE and HAVING conditions
    pub fn count_query_builder(&self, conditions: &Conditions) -> Result<QueryBuilder> {
        let query_builder = self
            .create_query_builder()
            .select(vec![format!("COUNT({})", self.root_alias())]);
        self.assembler().apply_conditions(query_builder, conditions)
    }

    pub fn table_name(&self) -> &str {
        self.metadata.table_name()
    }

    pub fn identifier_field_names(&self) -> &[String] {
        self.metadata.identifier_field_names()
    }

    pub fn single_identifier_field_name(&self) -> Result<&str> {
        self.metadata.single_identifier_field_name()
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.metadata.has_field(name)
    }

    pub fn has_association(&self, name: &str) -> bool {
        self.metadata.has_association(name)
    }
}

impl<E: Entity> Clone for EntityRepository<E> {
    fn clone(&self) -> Self {
        Self {
            metadata: Arc::clone(&self.metadata),
            resolver: self.resolver.clone(),
            sequence: self.sequence.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> fmt::Debug for EntityRepository<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRepository")
            .field("entity", &self.metadata.name())
            .field("root_alias", &self.root_alias())
            .field("parameter_prefix", &self.sequence.prefix())
            .finish()
    }
}
