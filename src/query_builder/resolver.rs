use super::expression::PropertyRef;
use crate::metadata::EntityMetadata;
use std::sync::Arc;

/// Qualifies bare property names of the root entity with the root alias.
///
/// A name is qualified when it has no `.` and the entity declares it as a
/// field or association; anything else (joined aliases, aggregates, select
/// aliases) is passed through untouched.
#[derive(Debug, Clone)]
pub struct PropertyResolver {
    root_alias: String,
    metadata: Arc<EntityMetadata>,
}

impl PropertyResolver {
    pub fn new(root_alias: &str, metadata: Arc<EntityMetadata>) -> Self {
        Self {
            root_alias: root_alias.to_string(),
            metadata,
        }
    }

    pub fn resolve(&self, name: &str) -> PropertyRef {
        if self.is_entity_property(name) {
            PropertyRef::qualified(&self.root_alias, name)
        } else {
            PropertyRef::raw(name)
        }
    }

    pub fn is_entity_property(&self, name: &str) -> bool {
        !name.contains('.') && self.metadata.has_property(name)
    }

    pub fn root_alias(&self) -> &str {
        &self.root_alias
    }

    pub fn metadata(&self) -> &EntityMetadata {
        &self.metadata
    }
}
