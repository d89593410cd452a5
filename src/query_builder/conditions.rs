//! Declarative search conditions.
//!
//! Conditions are built either through the [`Condition`] constructors or from
//! the JSON condition language with [`Conditions::from_value`]:
//!
//! ```rust
//! use entity_query::query_builder::Conditions;
//! use serde_json::json;
//!
//! let conditions = Conditions::from_value(&json!({
//!     "online": true,
//!     "__OR_WHERE__": {
//!         "__LIKE__": { "name": "%bike%" },
//!         "__WHERE_LESS__": { "price": 100 }
//!     },
//!     "__AND_HAVING__": [
//!         { "__HAVING_GREATER__": { "COUNT(entity.id)": 2 } }
//!     ]
//! }))
//! .unwrap();
//! assert_eq!(conditions.len(), 3);
//! ```
//!
//! A property key compares by equality, switches to membership when its value
//! is an array and to a null check when its value is `null`. The array
//! heuristic also applies to columns holding collections: such a column cannot
//! be tested for literal equality against an array, and `__WHERE_EQUAL__` does
//! not help since comparison operands must be scalars.

use super::expression::{ComparisonOperator, LogicalOperator};
use crate::constants::sentinels;
use crate::error::{QueryError, Result};
use serde_json::Value;

/// Clause a condition is evaluated in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Clause {
    Where,
    Having,
}

impl Clause {
    pub fn to_dql(self) -> &'static str {
        match self {
            Self::Where => "WHERE",
            Self::Having => "HAVING",
        }
    }
}

/// Reserved operator keys of the JSON condition language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentinel {
    AndWhere,
    OrWhere,
    Like,
    In,
    NotIn,
    IsNull,
    IsNotNull,
    WhereCompare(ComparisonOperator),
    AndHaving,
    OrHaving,
    HavingCompare(ComparisonOperator),
}

impl Sentinel {
    pub fn from_key(key: &str) -> Option<Self> {
        use ComparisonOperator::*;

        let sentinel = match key {
            sentinels::AND_WHERE => Self::AndWhere,
            sentinels::OR_WHERE => Self::OrWhere,
            sentinels::WHERE_LIKE => Self::Like,
            sentinels::WHERE_IN => Self::In,
            sentinels::WHERE_NOT_IN => Self::NotIn,
            sentinels::WHERE_NULL => Self::IsNull,
            sentinels::WHERE_NOT_NULL => Self::IsNotNull,
            sentinels::WHERE_EQUAL => Self::WhereCompare(Equal),
            sentinels::WHERE_NOT_EQUAL => Self::WhereCompare(NotEqual),
            sentinels::WHERE_LESS => Self::WhereCompare(Less),
            sentinels::WHERE_LESS_OR_EQUAL => Self::WhereCompare(LessOrEqual),
            sentinels::WHERE_GREATER => Self::WhereCompare(Greater),
            sentinels::WHERE_GREATER_OR_EQUAL => Self::WhereCompare(GreaterOrEqual),
            sentinels::AND_HAVING => Self::AndHaving,
            sentinels::OR_HAVING => Self::OrHaving,
            sentinels::HAVING_EQUAL => Self::HavingCompare(Equal),
            sentinels::HAVING_NOT_EQUAL => Self::HavingCompare(NotEqual),
            sentinels::HAVING_LESS => Self::HavingCompare(Less),
            sentinels::HAVING_LESS_OR_EQUAL => Self::HavingCompare(LessOrEqual),
            sentinels::HAVING_GREATER => Self::HavingCompare(Greater),
            sentinels::HAVING_GREATER_OR_EQUAL => Self::HavingCompare(GreaterOrEqual),
            _ => return None,
        };
        Some(sentinel)
    }

    pub fn key(self) -> &'static str {
        use ComparisonOperator::*;

        match self {
            Self::AndWhere => sentinels::AND_WHERE,
            Self::OrWhere => sentinels::OR_WHERE,
            Self::Like => sentinels::WHERE_LIKE,
            Self::In => sentinels::WHERE_IN,
            Self::NotIn => sentinels::WHERE_NOT_IN,
            Self::IsNull => sentinels::WHERE_NULL,
            Self::IsNotNull => sentinels::WHERE_NOT_NULL,
            Self::WhereCompare(Equal) => sentinels::WHERE_EQUAL,
            Self::WhereCompare(NotEqual) => sentinels::WHERE_NOT_EQUAL,
            Self::WhereCompare(Less) => sentinels::WHERE_LESS,
            Self::WhereCompare(LessOrEqual) => sentinels::WHERE_LESS_OR_EQUAL,
            Self::WhereCompare(Greater) => sentinels::WHERE_GREATER,
            Self::WhereCompare(GreaterOrEqual) => sentinels::WHERE_GREATER_OR_EQUAL,
            Self::AndHaving => sentinels::AND_HAVING,
            Self::OrHaving => sentinels::OR_HAVING,
            Self::HavingCompare(Equal) => sentinels::HAVING_EQUAL,
            Self::HavingCompare(NotEqual) => sentinels::HAVING_NOT_EQUAL,
            Self::HavingCompare(Less) => sentinels::HAVING_LESS,
            Self::HavingCompare(LessOrEqual) => sentinels::HAVING_LESS_OR_EQUAL,
            Self::HavingCompare(Greater) => sentinels::HAVING_GREATER,
            Self::HavingCompare(GreaterOrEqual) => sentinels::HAVING_GREATER_OR_EQUAL,
        }
    }

    pub fn clause(self) -> Clause {
        match self {
            Self::AndHaving | Self::OrHaving | Self::HavingCompare(_) => Clause::Having,
            _ => Clause::Where,
        }
    }
}

/// One node of a search specification
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Bare property: `=` for scalars, `IN` for arrays, `IS NULL` for null
    Property { name: String, value: Value },
    Group {
        clause: Clause,
        operator: LogicalOperator,
        children: Vec<Condition>,
    },
    Like { property: String, pattern: Value },
    In { property: String, values: Vec<Value> },
    NotIn { property: String, values: Vec<Value> },
    IsNull { property: String },
    IsNotNull { property: String },
    Compare {
        clause: Clause,
        operator: ComparisonOperator,
        property: String,
        value: Value,
    },
}

impl Condition {
    pub fn property<V: Into<Value>>(name: &str, value: V) -> Self {
        Self::Property {
            name: name.to_string(),
            value: value.into(),
        }
    }

    pub fn and_where(children: Vec<Condition>) -> Self {
        Self::group(Clause::Where, LogicalOperator::And, children)
    }

    pub fn or_where(children: Vec<Condition>) -> Self {
        Self::group(Clause::Where, LogicalOperator::Or, children)
    }

    pub fn and_having(children: Vec<Condition>) -> Self {
        Self::group(Clause::Having, LogicalOperator::And, children)
    }

    pub fn or_having(children: Vec<Condition>) -> Self {
        Self::group(Clause::Having, LogicalOperator::Or, children)
    }

    pub fn group(clause: Clause, operator: LogicalOperator, children: Vec<Condition>) -> Self {
        Self::Group {
            clause,
            operator,
            children,
        }
    }

    /// `property LIKE pattern`; wildcards are not added
    pub fn like<V: Into<Value>>(property: &str, pattern: V) -> Self {
        Self::Like {
            property: property.to_string(),
            pattern: pattern.into(),
        }
    }

    pub fn in_list<I, V>(property: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::In {
            property: property.to_string(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn not_in<I, V>(property: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::NotIn {
            property: property.to_string(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_null(property: &str) -> Self {
        Self::IsNull {
            property: property.to_string(),
        }
    }

    pub fn is_not_null(property: &str) -> Self {
        Self::IsNotNull {
            property: property.to_string(),
        }
    }

    /// WHERE comparison
    pub fn compare<V: Into<Value>>(operator: ComparisonOperator, property: &str, value: V) -> Self {
        Self::Compare {
            clause: Clause::Where,
            operator,
            property: property.to_string(),
            value: value.into(),
        }
    }

    /// HAVING comparison
    pub fn having<V: Into<Value>>(operator: ComparisonOperator, property: &str, value: V) -> Self {
        Self::Compare {
            clause: Clause::Having,
            operator,
            property: property.to_string(),
            value: value.into(),
        }
    }

    pub fn equal<V: Into<Value>>(property: &str, value: V) -> Self {
        Self::compare(ComparisonOperator::Equal, property, value)
    }

    pub fn not_equal<V: Into<Value>>(property: &str, value: V) -> Self {
        Self::compare(ComparisonOperator::NotEqual, property, value)
    }

    pub fn less<V: Into<Value>>(property: &str, value: V) -> Self {
        Self::compare(ComparisonOperator::Less, property, value)
    }

    pub fn less_or_equal<V: Into<Value>>(property: &str, value: V) -> Self {
        Self::compare(ComparisonOperator::LessOrEqual, property, value)
    }

    pub fn greater<V: Into<Value>>(property: &str, value: V) -> Self {
        Self::compare(ComparisonOperator::Greater, property, value)
    }

    pub fn greater_or_equal<V: Into<Value>>(property: &str, value: V) -> Self {
        Self::compare(ComparisonOperator::GreaterOrEqual, property, value)
    }

    /// Clause this node belongs to; `None` for bare properties, which are
    /// legal in both
    pub fn clause(&self) -> Option<Clause> {
        match self {
            Self::Property { .. } => None,
            Self::Group { clause, .. } | Self::Compare { clause, .. } => Some(*clause),
            Self::Like { .. }
            | Self::In { .. }
            | Self::NotIn { .. }
            | Self::IsNull { .. }
            | Self::IsNotNull { .. } => Some(Clause::Where),
        }
    }

    /// Top-level routing: HAVING nodes go to the HAVING clause, everything
    /// else to WHERE
    pub fn routes_to(&self) -> Clause {
        self.clause().unwrap_or(Clause::Where)
    }

    /// Check that the node and its descendants only use operators of `clause`
    pub fn validate(&self, clause: Clause) -> Result<()> {
        if let Some(own) = self.clause() {
            if own != clause {
                return Err(QueryError::specification(format!(
                    "The {} condition cannot be used inside a {} clause.",
                    self.describe(),
                    clause.to_dql()
                )));
            }
        }

        match self {
            Self::Group { children, .. } => children.iter().try_for_each(|c| c.validate(clause)),
            Self::Property { name, value } if value.is_object() => Err(QueryError::specification(
                format!("The value of the property \"{name}\" cannot be a mapping."),
            )),
            Self::Compare {
                property, value, ..
            } if value.is_array() || value.is_object() => Err(QueryError::specification(format!(
                "The {} operand of \"{property}\" must be a scalar.",
                self.describe()
            ))),
            Self::Like { property, pattern } if pattern.is_array() || pattern.is_object() => {
                Err(QueryError::specification(format!(
                    "The {} pattern of \"{property}\" must be a scalar.",
                    self.describe()
                )))
            }
            Self::In { property, values } | Self::NotIn { property, values } if values.is_empty() => {
                Err(QueryError::specification(format!(
                    "The {} list of \"{property}\" cannot be empty.",
                    self.describe()
                )))
            }
            _ => Ok(()),
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Self::Property { .. } => "property",
            Self::Group {
                clause, operator, ..
            } => Sentinel::key(match (clause, operator) {
                (Clause::Where, LogicalOperator::And) => Sentinel::AndWhere,
                (Clause::Where, LogicalOperator::Or) => Sentinel::OrWhere,
                (Clause::Having, LogicalOperator::And) => Sentinel::AndHaving,
                (Clause::Having, LogicalOperator::Or) => Sentinel::OrHaving,
            }),
            Self::Like { .. } => Sentinel::Like.key(),
            Self::In { .. } => Sentinel::In.key(),
            Self::NotIn { .. } => Sentinel::NotIn.key(),
            Self::IsNull { .. } => Sentinel::IsNull.key(),
            Self::IsNotNull { .. } => Sentinel::IsNotNull.key(),
            Self::Compare {
                clause: Clause::Where,
                operator,
                ..
            } => Sentinel::WhereCompare(*operator).key(),
            Self::Compare {
                clause: Clause::Having,
                operator,
                ..
            } => Sentinel::HavingCompare(*operator).key(),
        }
    }
}

/// Ordered top-level conditions of a search; entries are ANDed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conditions(Vec<Condition>);

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, condition: Condition) -> Self {
        self.0.push(condition);
        self
    }

    pub fn push(&mut self, condition: Condition) {
        self.0.push(condition);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Condition> {
        self.0.iter()
    }

    /// Entries routed to `clause`, in input order
    pub fn for_clause(&self, clause: Clause) -> impl Iterator<Item = &Condition> {
        self.0.iter().filter(move |c| c.routes_to() == clause)
    }

    /// Parse the JSON condition language. Every shape check happens here,
    /// before anything is compiled.
    pub fn from_value(value: &Value) -> Result<Self> {
        let entries = entries_of(value).ok_or_else(|| {
            QueryError::specification(format!(
                "The conditions must be a mapping, {} given.",
                kind_of(value)
            ))
        })?;

        entries
            .into_iter()
            .map(|(key, value)| parse_entry(key, value))
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }
}

impl From<Vec<Condition>> for Conditions {
    fn from(conditions: Vec<Condition>) -> Self {
        Self(conditions)
    }
}

impl FromIterator<Condition> for Conditions {
    fn from_iter<I: IntoIterator<Item = Condition>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Conditions {
    type Item = &'a Condition;
    type IntoIter = std::slice::Iter<'a, Condition>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Debug, Clone, Copy)]
enum Key<'a> {
    Index,
    Name(&'a str),
}

/// Entries of a mapping. Arrays and numeric keys yield indexed entries.
fn entries_of(value: &Value) -> Option<Vec<(Key<'_>, &Value)>> {
    match value {
        Value::Object(map) => Some(
            map.iter()
                .map(|(key, value)| {
                    let key = if is_index(key) {
                        Key::Index
                    } else {
                        Key::Name(key.as_str())
                    };
                    (key, value)
                })
                .collect(),
        ),
        Value::Array(items) => Some(items.iter().map(|item| (Key::Index, item)).collect()),
        _ => None,
    }
}

fn is_index(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit())
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a mapping",
    }
}

fn single_entry<'a>(value: &'a Value, context: &str) -> Result<(Key<'a>, &'a Value)> {
    let entries = entries_of(value).ok_or_else(|| {
        QueryError::specification(format!(
            "The value of {context} must be a mapping with exactly one entry, {} given.",
            kind_of(value)
        ))
    })?;

    match entries.as_slice() {
        [entry] => Ok(*entry),
        _ => Err(QueryError::specification(format!(
            "The value of {context} must be a mapping with exactly one entry ({} given).",
            entries.len()
        ))),
    }
}

/// Single `{property: operand}` entry of an operator
fn property_operand<'a>(value: &'a Value, sentinel: Sentinel) -> Result<(&'a str, &'a Value)> {
    match single_entry(value, sentinel.key())? {
        (Key::Name(property), operand) => Ok((property, operand)),
        (Key::Index, _) => Err(QueryError::specification(format!(
            "The value of {} must be keyed by a property name.",
            sentinel.key()
        ))),
    }
}

fn parse_entry(key: Key<'_>, value: &Value) -> Result<Condition> {
    match key {
        Key::Index => {
            let (inner_key, inner_value) = single_entry(value, "an indexed condition")?;
            parse_entry(inner_key, inner_value)
        }
        Key::Name(name) => match Sentinel::from_key(name) {
            Some(sentinel) => parse_sentinel(sentinel, value),
            None => parse_property(name, value),
        },
    }
}

fn parse_property(name: &str, value: &Value) -> Result<Condition> {
    match value {
        Value::Object(_) => Err(QueryError::specification(format!(
            "The value of the property \"{name}\" cannot be a mapping."
        ))),
        _ => Ok(Condition::property(name, value.clone())),
    }
}

fn parse_sentinel(sentinel: Sentinel, value: &Value) -> Result<Condition> {
    match sentinel {
        Sentinel::AndWhere | Sentinel::OrWhere | Sentinel::AndHaving | Sentinel::OrHaving => {
            let entries = entries_of(value).ok_or_else(|| {
                QueryError::specification(format!(
                    "The value of {} must be a mapping, {} given.",
                    sentinel.key(),
                    kind_of(value)
                ))
            })?;
            let children = entries
                .into_iter()
                .map(|(key, value)| parse_entry(key, value))
                .collect::<Result<Vec<_>>>()?;
            let operator = match sentinel {
                Sentinel::AndWhere | Sentinel::AndHaving => LogicalOperator::And,
                _ => LogicalOperator::Or,
            };
            Ok(Condition::group(sentinel.clause(), operator, children))
        }
        Sentinel::Like => {
            let (property, pattern) = property_operand(value, sentinel)?;
            if pattern.is_array() || pattern.is_object() {
                return Err(QueryError::specification(format!(
                    "The {} pattern of \"{property}\" must be a scalar.",
                    sentinel.key()
                )));
            }
            Ok(Condition::like(property, pattern.clone()))
        }
        Sentinel::In | Sentinel::NotIn => {
            let (property, operand) = property_operand(value, sentinel)?;
            let values = match operand {
                Value::Array(items) => items.clone(),
                Value::Object(map) => map.values().cloned().collect(),
                scalar => vec![scalar.clone()],
            };
            Ok(match sentinel {
                Sentinel::In => Condition::in_list(property, values),
                _ => Condition::not_in(property, values),
            })
        }
        Sentinel::IsNull | Sentinel::IsNotNull => {
            let property = value.as_str().ok_or_else(|| {
                QueryError::specification(format!(
                    "The value of {} must be a property name, {} given.",
                    sentinel.key(),
                    kind_of(value)
                ))
            })?;
            Ok(match sentinel {
                Sentinel::IsNull => Condition::is_null(property),
                _ => Condition::is_not_null(property),
            })
        }
        Sentinel::WhereCompare(operator) | Sentinel::HavingCompare(operator) => {
            let (property, operand) = property_operand(value, sentinel)?;
            if operand.is_array() || operand.is_object() {
                return Err(QueryError::specification(format!(
                    "The {} operand of \"{property}\" must be a scalar.",
                    sentinel.key()
                )));
            }
            Ok(match sentinel.clause() {
                Clause::Where => Condition::compare(operator, property, operand.clone()),
                Clause::Having => Condition::having(operator, property, operand.clone()),
            })
        }
    }
}
