use crate::constants::extras;
use crate::error::{QueryError, Result};
use serde_json::Value;

/// One item of an explicit select list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectItem {
    /// Expression used verbatim
    Raw(String),
    /// `<resolved expression> AS <alias>`
    Aliased { expression: String, alias: String },
    /// Join alias whose entities are hydrated together with the root entity
    Join(String),
}

/// Selects, joins and group-bys applied before the conditions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extras {
    pub selects: Option<Vec<SelectItem>>,
    pub left_joins: Vec<(String, String)>,
    pub inner_joins: Vec<(String, String)>,
    pub group_bys: Vec<String>,
}

impl Extras {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(self, expression: &str) -> Self {
        self.push_select(SelectItem::Raw(expression.to_string()))
    }

    pub fn select_as(self, expression: &str, alias: &str) -> Self {
        self.push_select(SelectItem::Aliased {
            expression: expression.to_string(),
            alias: alias.to_string(),
        })
    }

    pub fn select_join(self, join_alias: &str) -> Self {
        self.push_select(SelectItem::Join(join_alias.to_string()))
    }

    fn push_select(mut self, item: SelectItem) -> Self {
        self.selects.get_or_insert_with(Vec::new).push(item);
        self
    }

    pub fn left_join(mut self, association: &str, alias: &str) -> Self {
        self.left_joins.push((association.to_string(), alias.to_string()));
        self
    }

    pub fn inner_join(mut self, association: &str, alias: &str) -> Self {
        self.inner_joins.push((association.to_string(), alias.to_string()));
        self
    }

    pub fn group_by(mut self, expression: &str) -> Self {
        self.group_bys.push(expression.to_string());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.selects.is_none()
            && self.left_joins.is_empty()
            && self.inner_joins.is_empty()
            && self.group_bys.is_empty()
    }

    /// Whether `name` appears verbatim in the select list (a select alias,
    /// a raw item or a joined alias); such group-bys are not resolved
    pub fn is_selected(&self, name: &str) -> bool {
        self.selects.iter().flatten().any(|item| match item {
            SelectItem::Aliased { alias, .. } => alias == name,
            SelectItem::Raw(expression) => expression == name,
            SelectItem::Join(alias) => alias == name,
        })
    }

    /// Parse the JSON form
    /// (`{"selects": ..., "leftJoins": ..., "innerJoins": ..., "groupBys": ...}`)
    pub fn from_value(value: &Value) -> Result<Self> {
        let map = match value {
            Value::Null => return Ok(Self::new()),
            Value::Object(map) => map,
            _ => return Err(QueryError::specification("The extras must be a mapping.")),
        };

        let mut parsed = Self::new();
        for (key, section) in map {
            match key.as_str() {
                extras::SELECTS => parsed.selects = Some(parse_selects(section)?),
                extras::LEFT_JOINS => parsed.left_joins = parse_joins(section, "LEFT_JOINS")?,
                extras::INNER_JOINS => parsed.inner_joins = parse_joins(section, "INNER_JOINS")?,
                extras::GROUP_BYS => parsed.group_bys = parse_group_bys(section)?,
                other => {
                    return Err(QueryError::specification(format!(
                        "The extra \"{other}\" is not supported."
                    )))
                }
            }
        }
        Ok(parsed)
    }
}

fn expect_str<'a>(value: &'a Value, what: &str) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| QueryError::specification(format!("{what} must be a string.")))
}

fn is_index(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit())
}

fn parse_selects(section: &Value) -> Result<Vec<SelectItem>> {
    match section {
        Value::Array(items) => items
            .iter()
            .map(|item| expect_str(item, "A select item").map(|s| SelectItem::Raw(s.to_string())))
            .collect(),
        Value::Object(map) => {
            let mut items = Vec::with_capacity(map.len());
            for (key, item) in map {
                if key == extras::SELECT_JOIN {
                    let aliases = match item {
                        Value::Array(aliases) => aliases.iter().collect::<Vec<_>>(),
                        single => vec![single],
                    };
                    for alias in aliases {
                        items.push(SelectItem::Join(
                            expect_str(alias, "A joined select alias")?.to_string(),
                        ));
                    }
                } else if is_index(key) {
                    items.push(SelectItem::Raw(expect_str(item, "A select item")?.to_string()));
                } else {
                    items.push(SelectItem::Aliased {
                        expression: key.clone(),
                        alias: expect_str(item, "A select alias")?.to_string(),
                    });
                }
            }
            Ok(items)
        }
        _ => Err(QueryError::specification("The SELECTS parameter must be an array.")),
    }
}

fn parse_joins(section: &Value, name: &str) -> Result<Vec<(String, String)>> {
    let map = section.as_object().ok_or_else(|| {
        QueryError::specification(format!(
            "The {name} parameter must be a mapping of association to alias."
        ))
    })?;

    map.iter()
        .map(|(association, alias)| {
            Ok((
                association.clone(),
                expect_str(alias, "A join alias")?.to_string(),
            ))
        })
        .collect()
}

fn parse_group_bys(section: &Value) -> Result<Vec<String>> {
    let items: Vec<&Value> = match section {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => map.values().collect(),
        _ => return Err(QueryError::specification("The GROUP_BYS parameter must be an array.")),
    };

    items
        .into_iter()
        .map(|item| expect_str(item, "A group by expression").map(str::to_string))
        .collect()
}
