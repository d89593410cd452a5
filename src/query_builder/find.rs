use super::builder::QueryBuilder;
use super::compiler::ConditionCompiler;
use super::conditions::{Clause, Conditions};
use super::extras::{Extras, SelectItem};
use super::ordering::OrderBy;
use super::parameters::ParameterSequence;
use super::resolver::PropertyResolver;
use crate::error::Result;
use tracing::debug;

/// Search criteria of a find query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindQuery {
    pub conditions: Conditions,
    pub order_by: OrderBy,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub extras: Extras,
}

impl FindQuery {
    pub fn new(conditions: Conditions) -> Self {
        Self {
            conditions,
            ..Self::default()
        }
    }

    pub fn order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = order_by;
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn extras(mut self, extras: Extras) -> Self {
        self.extras = extras;
        self
    }
}

/// Assembles find queries for one entity.
///
/// Steps run in a fixed order: extras, WHERE, HAVING, ordering, limit, offset.
/// Any malformed part aborts the assembly before a builder is returned.
#[derive(Debug, Clone, Copy)]
pub struct QueryAssembler<'a> {
    resolver: &'a PropertyResolver,
    sequence: &'a ParameterSequence,
}

impl<'a> QueryAssembler<'a> {
    pub fn new(resolver: &'a PropertyResolver, sequence: &'a ParameterSequence) -> Self {
        Self { resolver, sequence }
    }

    /// Empty query over the root entity
    pub fn create_query_builder(&self) -> QueryBuilder {
        QueryBuilder::new(self.resolver.metadata().name(), self.resolver.root_alias())
    }

    pub fn assemble(&self, query: &FindQuery) -> Result<QueryBuilder> {
        self.build_find_query(
            &query.conditions,
            &query.order_by,
            query.limit,
            query.offset,
            &query.extras,
        )
    }

    pub fn build_find_query(
        &self,
        conditions: &Conditions,
        order_by: &OrderBy,
        limit: Option<u64>,
        offset: Option<u64>,
        extras: &Extras,
    ) -> Result<QueryBuilder> {
        let query_builder = self.apply_extras(self.create_query_builder(), extras);
        let query_builder = self.apply_conditions(query_builder, conditions)?;
        let query_builder = self.apply_order_by(query_builder, order_by);

        let query_builder = match limit {
            Some(limit) => query_builder.set_max_results(limit),
            None => query_builder,
        };
        let query_builder = match offset {
            Some(offset) => query_builder.set_first_result(offset),
            None => query_builder,
        };

        debug!(
            entity = self.resolver.metadata().name(),
            conditions = conditions.len(),
            parameters = query_builder.parameters().len(),
            limit = ?limit,
            offset = ?offset,
            "Assembled find query"
        );

        Ok(query_builder)
    }

    /// Apply the select list, joins and group-bys
    pub fn apply_extras(&self, query_builder: QueryBuilder, extras: &Extras) -> QueryBuilder {
        let mut query_builder = query_builder;

        if let Some(selects) = &extras.selects {
            let fields = selects
                .iter()
                .map(|item| match item {
                    SelectItem::Raw(expression) => expression.clone(),
                    SelectItem::Aliased { expression, alias } => {
                        format!("{} AS {}", self.resolver.resolve(expression), alias)
                    }
                    SelectItem::Join(alias) => alias.clone(),
                })
                .collect();
            query_builder = query_builder.select(fields);
        }

        for (association, alias) in &extras.left_joins {
            query_builder = query_builder.left_join(self.resolver.resolve(association), alias);
        }
        for (association, alias) in &extras.inner_joins {
            query_builder = query_builder.inner_join(self.resolver.resolve(association), alias);
        }

        for group_by in &extras.group_bys {
            query_builder = if extras.is_selected(group_by) {
                query_builder.add_group_by(group_by)
            } else {
                query_builder.add_group_by(&self.resolver.resolve(group_by).to_dql())
            };
        }

        query_builder
    }

    /// Compile the WHERE and HAVING buckets onto `query_builder`.
    ///
    /// Both buckets are validated before the first parameter is bound and
    /// compiled before the builder is touched.
    pub fn apply_conditions(
        &self,
        query_builder: QueryBuilder,
        conditions: &Conditions,
    ) -> Result<QueryBuilder> {
        let compiler = ConditionCompiler::new(self.resolver, self.sequence);
        compiler.validate_clause(conditions, Clause::Where)?;
        compiler.validate_clause(conditions, Clause::Having)?;

        let where_clause = compiler.compile_where(conditions)?;
        let having_clause = compiler.compile_having(conditions)?;

        let mut query_builder = query_builder;
        for expression in where_clause.expressions {
            query_builder = query_builder.and_where(expression);
        }
        for expression in having_clause.expressions {
            query_builder = query_builder.and_having(expression);
        }

        Ok(query_builder
            .set_parameters(where_clause.parameters)
            .set_parameters(having_clause.parameters))
    }

    pub fn apply_order_by(&self, query_builder: QueryBuilder, order_by: &OrderBy) -> QueryBuilder {
        order_by
            .entries()
            .iter()
            .fold(query_builder, |query_builder, entry| {
                query_builder.add_order_by(
                    &self.resolver.resolve(&entry.property).to_dql(),
                    entry.direction,
                )
            })
    }
}
