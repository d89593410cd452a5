//! # Condition Language Constants
//!
//! Reserved keys of the JSON condition language and the defaults used when
//! no configuration overrides them.

/// Reserved condition keys. A key listed here denotes an operator, any other
/// string key is a property name.
pub mod sentinels {
    /// `(x OR y OR ...)`
    pub const OR_WHERE: &str = "__OR_WHERE__";
    /// `(x AND y AND ...)`
    pub const AND_WHERE: &str = "__AND_WHERE__";
    /// `x LIKE :p`
    pub const WHERE_LIKE: &str = "__LIKE__";
    /// `x IN (...)`
    pub const WHERE_IN: &str = "__IN__";
    /// `x NOT IN (...)`
    pub const WHERE_NOT_IN: &str = "__NOT_IN__";
    /// `x IS NULL`
    pub const WHERE_NULL: &str = "__IS_NULL__";
    /// `x IS NOT NULL`
    pub const WHERE_NOT_NULL: &str = "__IS_NOT_NULL__";
    pub const WHERE_EQUAL: &str = "__WHERE_EQUAL__";
    pub const WHERE_NOT_EQUAL: &str = "__WHERE_NOT_EQUAL__";
    pub const WHERE_LESS: &str = "__WHERE_LESS__";
    pub const WHERE_LESS_OR_EQUAL: &str = "__WHERE_LESS_OR_EQUAL__";
    pub const WHERE_GREATER: &str = "__WHERE_GREATER__";
    pub const WHERE_GREATER_OR_EQUAL: &str = "__WHERE_GREATER_OR_EQUAL__";

    /// `HAVING (x OR y OR ...)`
    pub const OR_HAVING: &str = "__OR_HAVING__";
    /// `HAVING (x AND y AND ...)`
    pub const AND_HAVING: &str = "__AND_HAVING__";
    pub const HAVING_EQUAL: &str = "__HAVING_EQUAL__";
    pub const HAVING_NOT_EQUAL: &str = "__HAVING_NOT_EQUAL__";
    pub const HAVING_LESS: &str = "__HAVING_LESS__";
    pub const HAVING_LESS_OR_EQUAL: &str = "__HAVING_LESS_OR_EQUAL__";
    pub const HAVING_GREATER: &str = "__HAVING_GREATER__";
    pub const HAVING_GREATER_OR_EQUAL: &str = "__HAVING_GREATER_OR_EQUAL__";
}

/// Keys of the JSON extras mapping
pub mod extras {
    pub const SELECTS: &str = "selects";
    pub const LEFT_JOINS: &str = "leftJoins";
    pub const INNER_JOINS: &str = "innerJoins";
    pub const GROUP_BYS: &str = "groupBys";
    /// Inside `selects`: join aliases whose entities are hydrated with the root entity
    pub const SELECT_JOIN: &str = "__SELECT_JOIN__";
}

pub mod defaults {
    pub const ROOT_ALIAS: &str = "entity";
    pub const PARAMETER_PREFIX: &str = "param";
    /// First value handed out by a fresh parameter sequence
    pub const FIRST_PARAMETER_INDEX: u64 = 1;
}

/// Environment variables read by [`crate::config::QueryConfig::from_env`]
pub mod env {
    pub const PREFIX: &str = "ENTITY_QUERY";
    pub const ROOT_ALIAS: &str = "ENTITY_QUERY_ROOT_ALIAS";
    pub const PARAMETER_PREFIX: &str = "ENTITY_QUERY_PARAMETER_PREFIX";
    pub const ENVIRONMENT: &str = "ENTITY_QUERY_ENV";
}
