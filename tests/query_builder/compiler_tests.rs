//! Condition compiler behavior on the JSON condition language.

use crate::common::product_resolver;
use entity_query::query_builder::{
    Clause, ComparisonOperator, CompiledClause, Condition, ConditionCompiler, Conditions,
    Expression, LogicalOperator, Operand, ParameterSequence, PredicateOperator, PropertyRef,
};
use entity_query::QueryError;
use serde_json::{json, Value};
use std::collections::HashSet;

fn compile_where(spec: Value, sequence: &ParameterSequence) -> CompiledClause {
    let resolver = product_resolver();
    let conditions = Conditions::from_value(&spec).unwrap();
    ConditionCompiler::new(&resolver, sequence)
        .compile_where(&conditions)
        .unwrap()
}

fn where_tree(spec: Value) -> Expression {
    compile_where(spec, &ParameterSequence::new("p"))
        .combined()
        .unwrap()
}

fn entity(field: &str) -> PropertyRef {
    PropertyRef::qualified("entity", field)
}

#[test]
fn bare_equalities_are_anded_with_distinct_parameters() {
    let sequence = ParameterSequence::new("p");
    let compiled = compile_where(json!({ "name": "bike", "price": 10, "online": true }), &sequence);

    assert_eq!(compiled.expressions.len(), 3);
    assert!(compiled.expressions.iter().all(|expression| matches!(
        expression,
        Expression::Leaf(predicate)
            if predicate.operator == PredicateOperator::Compare(ComparisonOperator::Equal)
    )));

    let names: HashSet<&str> = compiled.parameters.names().collect();
    assert_eq!(names.len(), 3);
    assert_eq!(
        compiled.combined().unwrap().render_clause(),
        "entity.name = :p_1 AND entity.price = :p_2 AND entity.online = :p_3"
    );
}

#[test]
fn and_group_is_equivalent_to_top_level_entries() {
    let grouped = where_tree(json!({ "__AND_WHERE__": { "name": "a", "price": 2 } }));
    let flat = where_tree(json!({ "name": "a", "price": 2 }));
    assert_eq!(grouped, flat);
}

#[test]
fn or_group_compiles_to_or_node() {
    let compiled = compile_where(
        json!({ "__OR_WHERE__": { "name": "a", "price": 2 } }),
        &ParameterSequence::new("p"),
    );

    let expected = Expression::or(vec![
        Expression::leaf(
            entity("name"),
            ComparisonOperator::Equal.into(),
            Operand::Parameter("p_1".to_string()),
        ),
        Expression::leaf(
            entity("price"),
            ComparisonOperator::Equal.into(),
            Operand::Parameter("p_2".to_string()),
        ),
    ]);
    assert_eq!(compiled.expressions, vec![expected]);
    assert_eq!(compiled.parameters.get("p_1"), Some(&json!("a")));
    assert_eq!(compiled.parameters.get("p_2"), Some(&json!(2)));
}

#[test]
fn nested_groups_keep_precedence() {
    let tree = where_tree(json!({
        "online": true,
        "__OR_WHERE__": [
            { "__AND_WHERE__": { "price": 1, "name": "a" } },
            { "__WHERE_GREATER__": { "price": 100 } }
        ]
    }));

    assert_eq!(
        tree.render_clause(),
        "entity.online = :p_1 AND ((entity.price = :p_2 AND entity.name = :p_3) OR entity.price > :p_4)"
    );
    assert_eq!(tree.leaf_count(), 4);
}

#[test]
fn like_binds_pattern_verbatim() {
    let compiled = compile_where(
        json!({ "__LIKE__": { "name": "%o'clock_%" } }),
        &ParameterSequence::new("p"),
    );

    assert_eq!(compiled.expressions[0].to_dql(), "entity.name LIKE :p_1");
    assert_eq!(compiled.parameters.get("p_1"), Some(&json!("%o'clock_%")));
}

#[test]
fn in_list_uses_literal_operand() {
    let compiled = compile_where(
        json!({ "__IN__": { "position": [1, 2, 3] } }),
        &ParameterSequence::new("p"),
    );

    assert_eq!(
        compiled.expressions[0],
        Expression::leaf(
            entity("position"),
            PredicateOperator::In,
            Operand::Literals(vec![json!(1), json!(2), json!(3)]),
        )
    );
    assert!(compiled.parameters.is_empty());
    assert_eq!(compiled.expressions[0].to_dql(), "entity.position IN (1, 2, 3)");
}

#[test]
fn not_in_quotes_string_literals() {
    let compiled = compile_where(
        json!({ "__NOT_IN__": { "name": ["a", "b'c"] } }),
        &ParameterSequence::new("p"),
    );
    assert_eq!(compiled.expressions[0].to_dql(), "entity.name NOT IN ('a', 'b''c')");
}

#[test]
fn bare_null_is_equivalent_to_null_operator() {
    let bare = where_tree(json!({ "deletedAt": null }));
    let sentinel = where_tree(json!({ "__IS_NULL__": "deletedAt" }));

    assert_eq!(bare, sentinel);
    assert_eq!(bare.to_dql(), "entity.deletedAt IS NULL");
}

#[test]
fn not_null_operator() {
    let tree = where_tree(json!({ "__IS_NOT_NULL__": "category.parent" }));
    assert_eq!(tree.to_dql(), "category.parent IS NOT NULL");
}

#[test]
fn where_equal_matches_bare_equality() {
    let sentinel = where_tree(json!({ "__WHERE_EQUAL__": { "price": 5 } }));
    let bare = where_tree(json!({ "price": 5 }));
    assert_eq!(sentinel, bare);
}

#[test]
fn comparison_operators_render_their_symbols() {
    let tree = where_tree(json!([
        { "__WHERE_NOT_EQUAL__": { "price": 1 } },
        { "__WHERE_LESS__": { "price": 2 } },
        { "__WHERE_LESS_OR_EQUAL__": { "price": 3 } },
        { "__WHERE_GREATER_OR_EQUAL__": { "price": 4 } }
    ]));

    assert_eq!(
        tree.render_clause(),
        "entity.price != :p_1 AND entity.price < :p_2 AND entity.price <= :p_3 AND entity.price >= :p_4"
    );
}

#[test]
fn bare_collection_binds_one_parameter() {
    let compiled = compile_where(json!({ "tags": [4, 5] }), &ParameterSequence::new("p"));

    assert_eq!(compiled.expressions[0].to_dql(), "entity.tags IN (:p_1)");
    assert_eq!(compiled.parameters.len(), 1);
    assert_eq!(compiled.parameters.get("p_1"), Some(&json!([4, 5])));
}

#[test]
fn qualified_and_unknown_names_pass_through() {
    let tree = where_tree(json!({ "category.name": "tools", "unknownColumn": 1 }));
    assert_eq!(
        tree.render_clause(),
        "category.name = :p_1 AND unknownColumn = :p_2"
    );
}

#[test]
fn compilations_sharing_a_sequence_never_collide() {
    let sequence = ParameterSequence::new("p");
    let first = compile_where(json!({ "name": "a", "price": 1 }), &sequence);
    let second = compile_where(json!({ "name": "a", "price": 1 }), &sequence);

    let first_names: HashSet<&str> = first.parameters.names().collect();
    assert!(second
        .parameters
        .names()
        .all(|name| !first_names.contains(name)));
}

#[test]
fn having_entries_are_split_from_where() {
    let resolver = product_resolver();
    let sequence = ParameterSequence::new("p");
    let compiler = ConditionCompiler::new(&resolver, &sequence);

    let conditions = Conditions::from_value(&json!({
        "online": true,
        "__HAVING_GREATER__": { "COUNT(tags.id)": 2 },
        "0": { "__OR_HAVING__": { "total": 1, "__HAVING_LESS__": { "total": 10 } } }
    }))
    .unwrap();

    let where_clause = compiler.compile_where(&conditions).unwrap();
    let having_clause = compiler.compile_having(&conditions).unwrap();

    assert_eq!(where_clause.clause, Clause::Where);
    assert_eq!(where_clause.expressions.len(), 1);
    assert_eq!(
        having_clause.combined().unwrap().render_clause(),
        "COUNT(tags.id) > :p_2 AND (total = :p_3 OR total < :p_4)"
    );
}

#[test]
fn arity_violation_fails_before_binding() {
    let sequence = ParameterSequence::new("p");
    let error = Conditions::from_value(&json!({ "__LIKE__": { "name": "a", "price": "b" } }))
        .unwrap_err();

    assert!(matches!(error, QueryError::Specification(_)));
    assert_eq!(sequence.peek(), 1);
}

#[test]
fn non_mapping_operand_is_a_specification_error() {
    for spec in [
        json!({ "__WHERE_GREATER__": 3 }),
        json!({ "__IN__": [1, 2] }),
        json!({ "__OR_WHERE__": "name" }),
        json!({ "name": { "nested": 1 } }),
    ] {
        let error = Conditions::from_value(&spec).unwrap_err();
        assert!(error.is_usage_error(), "{spec} should be rejected");
    }
}

#[test]
fn having_operator_inside_where_group_binds_nothing() {
    let resolver = product_resolver();
    let sequence = ParameterSequence::new("p");
    let compiler = ConditionCompiler::new(&resolver, &sequence);

    let conditions = Conditions::new()
        .with(Condition::equal("name", "bike"))
        .with(Condition::group(
            Clause::Where,
            LogicalOperator::Or,
            vec![Condition::having(ComparisonOperator::Equal, "total", 3)],
        ));

    assert!(compiler.compile_where(&conditions).is_err());
    assert_eq!(sequence.peek(), 1);
}
