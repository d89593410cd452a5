use super::manager::EntityRecord;
use crate::error::{QueryError, Result};
use crate::metadata::{Entity, EntityMetadata, IdentifierValue};
use std::collections::HashMap;
use std::sync::Arc;

/// Entities indexed by identifier, iterated in insertion order
#[derive(Debug)]
pub struct KeyedEntities<E> {
    entries: Vec<(IdentifierValue, Arc<E>)>,
    index: HashMap<IdentifierValue, usize>,
}

impl<E> KeyedEntities<E> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Insert under `id`. A repeated identifier replaces the earlier entity
    /// but keeps its position.
    pub fn insert(&mut self, id: IdentifierValue, entity: Arc<E>) {
        match self.index.get(&id) {
            Some(&position) => self.entries[position].1 = entity,
            None => {
                self.index.insert(id.clone(), self.entries.len());
                self.entries.push((id, entity));
            }
        }
    }

    pub fn get(&self, id: &IdentifierValue) -> Option<&Arc<E>> {
        self.index.get(id).map(|&position| &self.entries[position].1)
    }

    pub fn contains_key(&self, id: &IdentifierValue) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &IdentifierValue> {
        self.entries.iter().map(|(id, _)| id)
    }

    pub fn values(&self) -> impl Iterator<Item = &Arc<E>> {
        self.entries.iter().map(|(_, entity)| entity)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&IdentifierValue, &Arc<E>)> {
        self.entries.iter().map(|(id, entity)| (id, entity))
    }

    pub fn into_vec(self) -> Vec<(IdentifierValue, Arc<E>)> {
        self.entries
    }
}

impl<E> Default for KeyedEntities<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> IntoIterator for KeyedEntities<E> {
    type Item = (IdentifierValue, Arc<E>);
    type IntoIter = std::vec::IntoIter<(IdentifierValue, Arc<E>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Recover the typed entity behind a record
pub fn downcast_record<E: Entity>(record: EntityRecord) -> Result<Arc<E>> {
    let found = record.entity_type_name();
    record
        .into_any()
        .downcast::<E>()
        .map_err(|_| QueryError::type_mismatch(std::any::type_name::<E>(), found))
}

/// Identifier of `entity`, failing when the type exposes no accessor for `field`
pub fn identifier_of<E: Entity>(
    metadata: &EntityMetadata,
    entity: &E,
    field: &str,
) -> Result<IdentifierValue> {
    entity.identifier_value(field).ok_or_else(|| {
        QueryError::metadata(format!(
            "The entity \"{}\" does not expose its \"{field}\" identifier.",
            metadata.name()
        ))
    })
}

/// Index `records` by their single identifier.
///
/// Every record must hold an `E`; the first foreign record fails the whole
/// call. Output keeps the input order.
pub fn key_by_id<E: Entity>(
    metadata: &EntityMetadata,
    records: Vec<EntityRecord>,
) -> Result<KeyedEntities<E>> {
    let field = metadata.single_identifier_field_name()?;

    let entities = records
        .into_iter()
        .map(downcast_record::<E>)
        .collect::<Result<Vec<_>>>()?;

    let mut keyed = KeyedEntities::new();
    for entity in entities {
        let id = identifier_of(metadata, entity.as_ref(), field)?;
        keyed.insert(id, entity);
    }
    Ok(keyed)
}
