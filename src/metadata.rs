//! # Entity Metadata
//!
//! The capability an entity type exposes to the query layer: its declared
//! fields and associations, its table and its identifier fields. Metadata is
//! validated once, when the type is registered, instead of being probed by
//! name at query time.

use crate::error::{QueryError, Result};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::any::TypeId;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Value of an identifier field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdentifierValue {
    Null,
    Integer(i64),
    Uuid(Uuid),
    Text(String),
}

impl IdentifierValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// JSON form used when the identifier is bound as a query parameter
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Integer(value) => serde_json::Value::from(*value),
            Self::Uuid(value) => serde_json::Value::String(value.to_string()),
            Self::Text(value) => serde_json::Value::String(value.clone()),
        }
    }
}

impl fmt::Display for IdentifierValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Uuid(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value}"),
        }
    }
}

impl From<i64> for IdentifierValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for IdentifierValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<Uuid> for IdentifierValue {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

impl From<&str> for IdentifierValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for IdentifierValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<IdentifierValue>> From<Option<T>> for IdentifierValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Mapping information of one entity type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMetadata {
    name: String,
    table_name: String,
    fields: Vec<String>,
    associations: Vec<String>,
    identifier: Vec<String>,
}

impl EntityMetadata {
    pub fn new(name: &str, table_name: &str) -> Self {
        Self {
            name: name.to_string(),
            table_name: table_name.to_string(),
            fields: Vec::new(),
            associations: Vec::new(),
            identifier: Vec::new(),
        }
    }

    /// Declare a mapped field
    pub fn field(mut self, name: &str) -> Self {
        if !self.fields.iter().any(|f| f == name) {
            self.fields.push(name.to_string());
        }
        self
    }

    /// Declare several mapped fields
    pub fn fields(self, names: &[&str]) -> Self {
        names.iter().fold(self, |metadata, name| metadata.field(name))
    }

    /// Declare an association (a property holding related entities)
    pub fn association(mut self, name: &str) -> Self {
        if !self.associations.iter().any(|a| a == name) {
            self.associations.push(name.to_string());
        }
        self
    }

    /// Declare an identifier field; it is also declared as a mapped field
    pub fn identifier(mut self, name: &str) -> Self {
        if !self.identifier.iter().any(|i| i == name) {
            self.identifier.push(name.to_string());
        }
        self.field(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn field_names(&self) -> &[String] {
        &self.fields
    }

    pub fn association_names(&self) -> &[String] {
        &self.associations
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f == name)
    }

    pub fn has_association(&self, name: &str) -> bool {
        self.associations.iter().any(|a| a == name)
    }

    /// Whether `name` is a declared property (field or association)
    pub fn has_property(&self, name: &str) -> bool {
        self.has_field(name) || self.has_association(name)
    }

    pub fn identifier_field_names(&self) -> &[String] {
        &self.identifier
    }

    /// The identifier field, failing for composite identifiers
    pub fn single_identifier_field_name(&self) -> Result<&str> {
        match self.identifier.as_slice() {
            [single] => Ok(single.as_str()),
            [] => Err(QueryError::metadata(format!(
                "The entity \"{}\" has no identifier field.",
                self.name
            ))),
            _ => Err(QueryError::metadata(format!(
                "The entity \"{}\" has a composite identifier ({}); a single identifier is required.",
                self.name,
                self.identifier.join(", ")
            ))),
        }
    }

    /// Check the metadata is usable by the query layer
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(QueryError::metadata("The entity name cannot be empty."));
        }
        if self.identifier.is_empty() {
            return Err(QueryError::metadata(format!(
                "The entity \"{}\" does not declare any identifier field.",
                self.name
            )));
        }
        if let Some(clash) = self.fields.iter().find(|f| self.has_association(f)) {
            return Err(QueryError::metadata(format!(
                "The property \"{clash}\" of \"{}\" is declared both as a field and as an association.",
                self.name
            )));
        }

        Ok(())
    }
}

/// An entity type managed through the query layer
pub trait Entity: Send + Sync + 'static {
    /// Mapping information, read once at registration
    fn metadata() -> EntityMetadata;

    /// Current value of an identifier field, `None` when the entity exposes
    /// no accessor for `field`
    fn identifier_value(&self, field: &str) -> Option<IdentifierValue>;
}

/// Registered entity metadata, keyed by entity type
#[derive(Debug, Default)]
pub struct MetadataRegistry {
    entries: DashMap<TypeId, Arc<EntityMetadata>>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `E`, validating its metadata. Registering twice returns the
    /// metadata stored the first time.
    pub fn register<E: Entity>(&self) -> Result<Arc<EntityMetadata>> {
        let type_id = TypeId::of::<E>();
        if let Some(existing) = self.entries.get(&type_id) {
            return Ok(Arc::clone(existing.value()));
        }

        let metadata = E::metadata();
        metadata.validate()?;

        debug!(
            entity = metadata.name(),
            table = metadata.table_name(),
            fields = metadata.field_names().len(),
            "Registered entity metadata"
        );

        let entry = self
            .entries
            .entry(type_id)
            .or_insert_with(|| Arc::new(metadata));
        Ok(Arc::clone(entry.value()))
    }

    /// Metadata of a registered entity type
    pub fn get<E: Entity>(&self) -> Result<Arc<EntityMetadata>> {
        self.entries
            .get(&TypeId::of::<E>())
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| {
                QueryError::metadata(format!(
                    "The entity type \"{}\" has not been registered.",
                    std::any::type_name::<E>()
                ))
            })
    }

    pub fn is_registered<E: Entity>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<E>())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
