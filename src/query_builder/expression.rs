use serde_json::Value;
use std::fmt;

/// Reference to a property inside a query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyRef {
    /// A declared property of the root entity, prefixed with the root alias
    Qualified { alias: String, field: String },
    /// An expression used verbatim (already qualified, aggregate, select alias...)
    Raw(String),
}

impl PropertyRef {
    pub fn qualified(alias: &str, field: &str) -> Self {
        Self::Qualified {
            alias: alias.to_string(),
            field: field.to_string(),
        }
    }

    pub fn raw(expression: &str) -> Self {
        Self::Raw(expression.to_string())
    }

    pub fn is_qualified(&self) -> bool {
        matches!(self, Self::Qualified { .. })
    }

    pub fn to_dql(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PropertyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Qualified { alias, field } => write!(f, "{alias}.{field}"),
            Self::Raw(expression) => write!(f, "{expression}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    pub fn to_dql(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// Binary comparison operators of the condition language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl ComparisonOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessOrEqual => "<=",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
        }
    }
}

/// Operator of a compiled leaf predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PredicateOperator {
    Compare(ComparisonOperator),
    Like,
    In,
    NotIn,
    IsNull,
    IsNotNull,
}

impl From<ComparisonOperator> for PredicateOperator {
    fn from(operator: ComparisonOperator) -> Self {
        Self::Compare(operator)
    }
}

/// Right-hand side of a leaf predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Placeholder of a bound parameter
    Parameter(String),
    /// Literal set rendered inline
    Literals(Vec<Value>),
    None,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub property: PropertyRef,
    pub operator: PredicateOperator,
    pub operand: Operand,
}

impl Predicate {
    pub fn to_dql(&self) -> String {
        let property = &self.property;
        match (&self.operator, &self.operand) {
            (PredicateOperator::IsNull, _) => format!("{property} IS NULL"),
            (PredicateOperator::IsNotNull, _) => format!("{property} IS NOT NULL"),
            (PredicateOperator::In, operand) => format!("{property} IN ({})", operand_list(operand)),
            (PredicateOperator::NotIn, operand) => {
                format!("{property} NOT IN ({})", operand_list(operand))
            }
            (PredicateOperator::Like, operand) => {
                format!("{property} LIKE {}", operand_scalar(operand))
            }
            (PredicateOperator::Compare(operator), operand) => {
                format!("{property} {} {}", operator.symbol(), operand_scalar(operand))
            }
        }
    }
}

/// Compiled boolean expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Leaf(Predicate),
    Group {
        operator: LogicalOperator,
        children: Vec<Expression>,
    },
}

impl Expression {
    pub fn leaf(property: PropertyRef, operator: PredicateOperator, operand: Operand) -> Self {
        Self::Leaf(Predicate {
            property,
            operator,
            operand,
        })
    }

    pub fn and(children: Vec<Expression>) -> Self {
        Self::Group {
            operator: LogicalOperator::And,
            children,
        }
    }

    pub fn or(children: Vec<Expression>) -> Self {
        Self::Group {
            operator: LogicalOperator::Or,
            children,
        }
    }

    /// Parameter placeholders referenced by the tree, in rendering order
    pub fn parameter_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_parameter_names(&mut names);
        names
    }

    fn collect_parameter_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Self::Leaf(Predicate {
                operand: Operand::Parameter(name),
                ..
            }) => names.push(name),
            Self::Leaf(_) => {}
            Self::Group { children, .. } => {
                for child in children {
                    child.collect_parameter_names(names);
                }
            }
        }
    }

    /// Number of leaf predicates in the tree
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Group { children, .. } => children.iter().map(Self::leaf_count).sum(),
        }
    }

    /// Whether this is a group without children
    pub fn is_empty_group(&self) -> bool {
        matches!(self, Self::Group { children, .. } if children.is_empty())
    }

    /// Flatten nested groups sharing their parent's operator, drop empty
    /// groups and unwrap single-child groups. AND and OR are associative, so
    /// the result is logically equivalent.
    pub fn normalize(self) -> Self {
        match self {
            Self::Leaf(_) => self,
            Self::Group { operator, children } => {
                let mut flattened = Vec::with_capacity(children.len());
                for child in children {
                    match child.normalize() {
                        empty if empty.is_empty_group() => {}
                        Self::Group {
                            operator: inner,
                            children: grandchildren,
                        } if inner == operator => flattened.extend(grandchildren),
                        other => flattened.push(other),
                    }
                }
                if flattened.len() == 1 {
                    flattened.remove(0)
                } else {
                    Self::Group {
                        operator,
                        children: flattened,
                    }
                }
            }
        }
    }

    /// Render as a nested expression; composite groups are parenthesized.
    ///
    /// An empty group places no restriction, whatever its operator: the
    /// builders drop it after [`Expression::normalize`], and rendered on its
    /// own it is `1=1`.
    pub fn to_dql(&self) -> String {
        match self {
            Self::Leaf(predicate) => predicate.to_dql(),
            Self::Group { children, .. } if children.is_empty() => "1=1".to_string(),
            Self::Group { children, .. } if children.len() == 1 => children[0].to_dql(),
            Self::Group { .. } => format!("({})", self.render_clause()),
        }
    }

    /// Render as a whole clause body, without outer parentheses
    pub fn render_clause(&self) -> String {
        match self {
            Self::Group { operator, children } if children.len() > 1 => children
                .iter()
                .map(Self::to_dql)
                .collect::<Vec<_>>()
                .join(&format!(" {} ", operator.to_dql())),
            _ => self.to_dql(),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_dql())
    }
}

fn operand_scalar(operand: &Operand) -> String {
    match operand {
        Operand::Parameter(name) => format!(":{name}"),
        Operand::Literals(values) => values.first().map(format_value).unwrap_or_default(),
        Operand::None => "NULL".to_string(),
    }
}

fn operand_list(operand: &Operand) -> String {
    match operand {
        Operand::Parameter(name) => format!(":{name}"),
        Operand::Literals(values) => values.iter().map(format_value).collect::<Vec<_>>().join(", "),
        Operand::None => String::new(),
    }
}

/// Format a JSON literal for inline rendering
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("'{}'", s.replace('\'', "''")),
        _ => format!("'{}'", value.to_string().replace('\'', "''")),
    }
}
