use crate::error::{QueryError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Parse a direction string, ignoring case
    pub fn parse(direction: &str) -> Result<Self> {
        match direction.trim().to_ascii_uppercase().as_str() {
            "ASC" => Ok(Self::Asc),
            "DESC" => Ok(Self::Desc),
            _ => Err(QueryError::specification(format!(
                "The order direction \"{direction}\" is not valid (expected ASC or DESC)."
            ))),
        }
    }

    pub fn to_dql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_dql())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEntry {
    pub property: String,
    #[serde(default)]
    pub direction: SortDirection,
}

/// Ordered list of sort entries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderBy(Vec<OrderEntry>);

impl OrderBy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by(mut self, property: &str, direction: SortDirection) -> Self {
        self.0.push(OrderEntry {
            property: property.to_string(),
            direction,
        });
        self
    }

    pub fn asc(self, property: &str) -> Self {
        self.by(property, SortDirection::Asc)
    }

    pub fn desc(self, property: &str) -> Self {
        self.by(property, SortDirection::Desc)
    }

    pub fn entries(&self) -> &[OrderEntry] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse the JSON form: positional entries sort ascending, keyed entries
    /// carry their direction string. `null` means no ordering.
    pub fn from_value(value: &Value) -> Result<Self> {
        let mut order_by = Self::new();
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    order_by = order_by.asc(positional_property(item)?);
                }
            }
            Value::Object(map) => {
                for (key, item) in map {
                    if key.bytes().all(|b| b.is_ascii_digit()) && !key.is_empty() {
                        order_by = order_by.asc(positional_property(item)?);
                    } else {
                        let direction = item.as_str().ok_or_else(|| {
                            QueryError::specification(format!(
                                "The order direction of \"{key}\" must be a string."
                            ))
                        })?;
                        order_by = order_by.by(key, SortDirection::parse(direction)?);
                    }
                }
            }
            _ => {
                return Err(QueryError::specification(
                    "The order by parameter must be a mapping or an array.",
                ))
            }
        }
        Ok(order_by)
    }
}

impl From<Vec<OrderEntry>> for OrderBy {
    fn from(entries: Vec<OrderEntry>) -> Self {
        Self(entries)
    }
}

fn positional_property(item: &Value) -> Result<&str> {
    item.as_str()
        .ok_or_else(|| QueryError::specification("A positional order entry must be a property name."))
}
