use crate::constants::{defaults, env};
use crate::error::{QueryError, Result};
use crate::query_builder::{OrderBy, ParameterSequence};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Alias of the root entity in generated queries
    pub root_alias: String,
    /// Prefix of generated parameter names (`<prefix>_<n>`)
    pub parameter_prefix: String,
    /// Ordering applied by administrators when the caller passes none
    pub default_order_by: OrderBy,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            root_alias: defaults::ROOT_ALIAS.to_string(),
            parameter_prefix: defaults::PARAMETER_PREFIX.to_string(),
            default_order_by: OrderBy::new(),
        }
    }
}

impl QueryConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(root_alias) = lookup(env::ROOT_ALIAS) {
            config.root_alias = root_alias;
        }

        if let Some(prefix) = lookup(env::PARAMETER_PREFIX) {
            config.parameter_prefix = prefix;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load a TOML, YAML or JSON file, overridden by `ENTITY_QUERY_*` variables
    pub fn load(path: &Path) -> Result<Self> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from(path).required(true))
            .add_source(config::Environment::with_prefix(env::PREFIX))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        tracing::debug!(
            path = %path.display(),
            root_alias = %config.root_alias,
            parameter_prefix = %config.parameter_prefix,
            "Loaded query configuration"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !is_identifier(&self.root_alias) {
            return Err(QueryError::configuration(format!(
                "Invalid root_alias: \"{}\" is not an identifier",
                self.root_alias
            )));
        }

        if !is_identifier(&self.parameter_prefix) {
            return Err(QueryError::configuration(format!(
                "Invalid parameter_prefix: \"{}\" is not an identifier",
                self.parameter_prefix
            )));
        }

        Ok(())
    }

    /// Fresh parameter sequence using the configured prefix
    pub fn parameter_sequence(&self) -> ParameterSequence {
        ParameterSequence::new(&self.parameter_prefix)
    }
}

fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
