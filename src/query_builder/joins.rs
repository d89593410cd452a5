use super::expression::PropertyRef;

/// Join kinds available to entity queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
}

impl JoinType {
    pub fn to_dql(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
        }
    }
}

/// Join of an association path under an alias
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub join_type: JoinType,
    pub association: PropertyRef,
    pub alias: String,
}

impl Join {
    /// Create an INNER JOIN
    pub fn inner(association: PropertyRef, alias: &str) -> Self {
        Self {
            join_type: JoinType::Inner,
            association,
            alias: alias.to_string(),
        }
    }

    /// Create a LEFT JOIN
    pub fn left(association: PropertyRef, alias: &str) -> Self {
        Self {
            join_type: JoinType::Left,
            association,
            alias: alias.to_string(),
        }
    }

    pub fn to_dql(&self) -> String {
        format!("{} {} {}", self.join_type.to_dql(), self.association, self.alias)
    }
}
