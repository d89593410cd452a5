use super::expression::{Expression, PropertyRef};
use super::joins::Join;
use super::ordering::SortDirection;
use super::pagination::Pagination;
use super::parameters::ParameterTable;
use serde_json::Value;

/// Entity query under construction.
///
/// Collects the select list, joins, WHERE/HAVING expression trees, ordering,
/// the result window and the bound parameters. The finished builder is handed
/// to the persistence engine, which executes it; [`QueryBuilder::build_dql`]
/// renders it for inspection and logging.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryBuilder {
    entity_name: String,
    root_alias: String,
    select_fields: Vec<String>,
    joins: Vec<Join>,
    where_clauses: Vec<Expression>,
    group_by: Vec<String>,
    having: Vec<Expression>,
    order_by: Vec<(String, SortDirection)>,
    pagination: Pagination,
    parameters: ParameterTable,
}

impl QueryBuilder {
    /// Create a query selecting `entity_name` under `root_alias`
    pub fn new(entity_name: &str, root_alias: &str) -> Self {
        Self {
            entity_name: entity_name.to_string(),
            root_alias: root_alias.to_string(),
            select_fields: vec![root_alias.to_string()],
            joins: Vec::new(),
            where_clauses: Vec::new(),
            group_by: Vec::new(),
            having: Vec::new(),
            order_by: Vec::new(),
            pagination: Pagination::default(),
            parameters: ParameterTable::new(),
        }
    }

    /// Replace the select list
    pub fn select(mut self, fields: Vec<String>) -> Self {
        self.select_fields = fields;
        self
    }

    pub fn add_select(mut self, field: &str) -> Self {
        self.select_fields.push(field.to_string());
        self
    }

    /// Add a JOIN clause
    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    pub fn inner_join(self, association: PropertyRef, alias: &str) -> Self {
        self.join(Join::inner(association, alias))
    }

    pub fn left_join(self, association: PropertyRef, alias: &str) -> Self {
        self.join(Join::left(association, alias))
    }

    /// AND an expression into the WHERE clause
    pub fn and_where(mut self, expression: Expression) -> Self {
        self.where_clauses.push(expression);
        self
    }

    /// AND an expression into the HAVING clause
    pub fn and_having(mut self, expression: Expression) -> Self {
        self.having.push(expression);
        self
    }

    pub fn add_group_by(mut self, expression: &str) -> Self {
        self.group_by.push(expression.to_string());
        self
    }

    pub fn add_order_by(mut self, property: &str, direction: SortDirection) -> Self {
        self.order_by.push((property.to_string(), direction));
        self
    }

    pub fn set_max_results(mut self, limit: u64) -> Self {
        self.pagination.limit = Some(limit);
        self
    }

    pub fn set_first_result(mut self, offset: u64) -> Self {
        self.pagination.offset = Some(offset);
        self
    }

    pub fn set_parameter(mut self, name: &str, value: Value) -> Self {
        self.parameters.set(name, value);
        self
    }

    /// Bind every entry of `parameters`
    pub fn set_parameters(mut self, parameters: ParameterTable) -> Self {
        self.parameters.extend(parameters);
        self
    }

    pub fn entity_name(&self) -> &str {
        &self.entity_name
    }

    pub fn root_alias(&self) -> &str {
        &self.root_alias
    }

    pub fn select_fields(&self) -> &[String] {
        &self.select_fields
    }

    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    pub fn where_clauses(&self) -> &[Expression] {
        &self.where_clauses
    }

    pub fn having_clauses(&self) -> &[Expression] {
        &self.having
    }

    pub fn group_by(&self) -> &[String] {
        &self.group_by
    }

    pub fn order_by(&self) -> &[(String, SortDirection)] {
        &self.order_by
    }

    pub fn max_results(&self) -> Option<u64> {
        self.pagination.limit
    }

    pub fn first_result(&self) -> Option<u64> {
        self.pagination.offset
    }

    pub fn parameters(&self) -> &ParameterTable {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name)
    }

    /// WHERE clause as a single normalized tree
    pub fn where_expression(&self) -> Option<Expression> {
        combine(&self.where_clauses)
    }

    /// HAVING clause as a single normalized tree
    pub fn having_expression(&self) -> Option<Expression> {
        combine(&self.having)
    }

    /// Render the query as DQL text with `:name` placeholders
    pub fn build_dql(&self) -> String {
        let mut dql = format!(
            "SELECT {} FROM {} {}",
            self.select_fields.join(", "),
            self.entity_name,
            self.root_alias
        );

        for join in &self.joins {
            dql.push(' ');
            dql.push_str(&join.to_dql());
        }

        if let Some(expression) = self.where_expression() {
            dql.push_str(" WHERE ");
            dql.push_str(&expression.render_clause());
        }

        if !self.group_by.is_empty() {
            dql.push_str(&format!(" GROUP BY {}", self.group_by.join(", ")));
        }

        if let Some(expression) = self.having_expression() {
            dql.push_str(" HAVING ");
            dql.push_str(&expression.render_clause());
        }

        if !self.order_by.is_empty() {
            let order_parts: Vec<String> = self
                .order_by
                .iter()
                .map(|(property, direction)| format!("{property} {direction}"))
                .collect();
            dql.push_str(&format!(" ORDER BY {}", order_parts.join(", ")));
        }

        dql.push_str(&self.pagination.to_dql());

        dql
    }
}

fn combine(expressions: &[Expression]) -> Option<Expression> {
    let combined = Expression::and(expressions.to_vec()).normalize();
    (!combined.is_empty_group()).then_some(combined)
}
