use super::conditions::{Clause, Condition, Conditions};
use super::expression::{ComparisonOperator, Expression, Operand, PredicateOperator};
use super::parameters::{ParameterBinder, ParameterSequence, ParameterTable};
use super::resolver::PropertyResolver;
use crate::error::Result;
use serde_json::Value;
use tracing::debug;

/// Result of compiling the conditions routed to one clause
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledClause {
    pub clause: Clause,
    /// One expression per top-level condition, to be ANDed together
    pub expressions: Vec<Expression>,
    pub parameters: ParameterTable,
}

impl CompiledClause {
    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }

    /// All top-level expressions ANDed into one normalized tree
    pub fn combined(&self) -> Option<Expression> {
        let combined = Expression::and(self.expressions.clone()).normalize();
        (!combined.is_empty_group()).then_some(combined)
    }
}

/// Translates search conditions into expression trees with bound parameters
#[derive(Debug, Clone, Copy)]
pub struct ConditionCompiler<'a> {
    resolver: &'a PropertyResolver,
    sequence: &'a ParameterSequence,
}

impl<'a> ConditionCompiler<'a> {
    pub fn new(resolver: &'a PropertyResolver, sequence: &'a ParameterSequence) -> Self {
        Self { resolver, sequence }
    }

    /// Compile every condition that is not a HAVING operator
    pub fn compile_where(&self, conditions: &Conditions) -> Result<CompiledClause> {
        self.compile_clause(conditions, Clause::Where)
    }

    /// Compile the HAVING operators (and indexed entries wrapping them)
    pub fn compile_having(&self, conditions: &Conditions) -> Result<CompiledClause> {
        self.compile_clause(conditions, Clause::Having)
    }

    /// Compile the top-level conditions routed to `clause`.
    ///
    /// The whole selection is validated before the first parameter is bound,
    /// so a malformed specification never yields a partial parameter table.
    pub fn compile_clause(&self, conditions: &Conditions, clause: Clause) -> Result<CompiledClause> {
        self.validate_clause(conditions, clause)?;

        let mut binder = ParameterBinder::new(self.sequence);
        let expressions: Vec<Expression> = conditions
            .for_clause(clause)
            .map(|condition| self.compile_node(condition, &mut binder))
            .collect();
        let parameters = binder.into_table();

        debug!(
            clause = clause.to_dql(),
            expressions = expressions.len(),
            parameters = parameters.len(),
            "Compiled conditions"
        );

        Ok(CompiledClause {
            clause,
            expressions,
            parameters,
        })
    }

    /// Check the top-level conditions routed to `clause` without binding anything
    pub fn validate_clause(&self, conditions: &Conditions, clause: Clause) -> Result<()> {
        conditions
            .for_clause(clause)
            .try_for_each(|condition| condition.validate(clause))
    }

    /// Compile a single condition evaluated in `clause`
    pub fn compile_condition(
        &self,
        condition: &Condition,
        clause: Clause,
    ) -> Result<(Expression, ParameterTable)> {
        condition.validate(clause)?;

        let mut binder = ParameterBinder::new(self.sequence);
        let expression = self.compile_node(condition, &mut binder);
        Ok((expression, binder.into_table()))
    }

    fn compile_node(&self, condition: &Condition, binder: &mut ParameterBinder<'_>) -> Expression {
        match condition {
            Condition::Group {
                operator, children, ..
            } => Expression::Group {
                operator: *operator,
                children: children
                    .iter()
                    .map(|child| self.compile_node(child, binder))
                    .collect(),
            },
            Condition::Like { property, pattern } => self.bound(
                property,
                PredicateOperator::Like,
                binder.bind(pattern.clone()),
            ),
            Condition::In { property, values } => Expression::leaf(
                self.resolver.resolve(property),
                PredicateOperator::In,
                Operand::Literals(values.clone()),
            ),
            Condition::NotIn { property, values } => Expression::leaf(
                self.resolver.resolve(property),
                PredicateOperator::NotIn,
                Operand::Literals(values.clone()),
            ),
            Condition::Compare {
                operator,
                property,
                value,
                ..
            } => self.bound(property, (*operator).into(), binder.bind(value.clone())),
            Condition::IsNull { property }
            | Condition::Property {
                name: property,
                value: Value::Null,
            } => Expression::leaf(
                self.resolver.resolve(property),
                PredicateOperator::IsNull,
                Operand::None,
            ),
            Condition::IsNotNull { property } => Expression::leaf(
                self.resolver.resolve(property),
                PredicateOperator::IsNotNull,
                Operand::None,
            ),
            Condition::Property { name, value } => {
                let operator = if value.is_array() {
                    PredicateOperator::In
                } else {
                    ComparisonOperator::Equal.into()
                };
                self.bound(name, operator, binder.bind(value.clone()))
            }
        }
    }

    fn bound(&self, property: &str, operator: PredicateOperator, parameter: String) -> Expression {
        Expression::leaf(
            self.resolver.resolve(property),
            operator,
            Operand::Parameter(parameter),
        )
    }
}
