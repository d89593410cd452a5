//! Find-query assembly through the repository.

use crate::common::product_repository;
use entity_query::query_builder::{
    Condition, Conditions, Extras, FindQuery, JoinType, OrderBy, SortDirection,
};
use entity_query::QueryError;
use serde_json::json;

#[test]
fn find_query_renders_every_part_in_order() {
    let repository = product_repository();

    let conditions = Conditions::from_value(&json!({
        "online": true,
        "__LIKE__": { "category.name": "%tool%" },
        "__HAVING_GREATER_OR_EQUAL__": { "tagCount": 2 }
    }))
    .unwrap();
    let extras = Extras::from_value(&json!({
        "selects": { "0": "entity", "COUNT(tags.id)": "tagCount" },
        "leftJoins": { "tags": "tags" },
        "innerJoins": { "category": "category" },
        "groupBys": ["id", "tagCount"]
    }))
    .unwrap();
    let order_by = OrderBy::from_value(&json!({ "0": "position", "name": "desc" })).unwrap();

    let query_builder = repository
        .query_builder_find_by(&conditions, &order_by, Some(20), Some(40), &extras)
        .unwrap();

    assert_eq!(
        query_builder.build_dql(),
        "SELECT entity, COUNT(tags.id) AS tagCount FROM Product entity \
         LEFT JOIN entity.tags tags INNER JOIN entity.category category \
         WHERE entity.online = :param_1 AND category.name LIKE :param_2 \
         GROUP BY entity.id, tagCount \
         HAVING tagCount >= :param_3 \
         ORDER BY entity.position ASC, entity.name DESC LIMIT 20 OFFSET 40"
    );
    assert_eq!(query_builder.parameters().len(), 3);
    assert_eq!(query_builder.joins()[0].join_type, JoinType::Left);
    assert_eq!(query_builder.joins()[1].join_type, JoinType::Inner);
}

#[test]
fn select_join_adds_joined_alias() {
    let repository = product_repository();
    let extras = Extras::new()
        .select("entity")
        .select_join("category")
        .left_join("category", "category");

    let query_builder = repository
        .query_builder_find(&FindQuery::new(Conditions::new()).extras(extras))
        .unwrap();

    assert_eq!(
        query_builder.build_dql(),
        "SELECT entity, category FROM Product entity LEFT JOIN entity.category category"
    );
}

#[test]
fn ordering_defaults_to_ascending() {
    let repository = product_repository();
    let order_by = OrderBy::from_value(&json!(["position", "category.name"])).unwrap();

    let query_builder = repository
        .query_builder_find(&FindQuery::default().order_by(order_by))
        .unwrap();

    assert_eq!(
        query_builder.order_by(),
        [
            ("entity.position".to_string(), SortDirection::Asc),
            ("category.name".to_string(), SortDirection::Asc),
        ]
    );
}

#[test]
fn zero_limit_is_applied() {
    let repository = product_repository();
    let query_builder = repository
        .query_builder_find(&FindQuery::default().limit(0))
        .unwrap();

    assert_eq!(query_builder.max_results(), Some(0));
    assert_eq!(query_builder.first_result(), None);
}

#[test]
fn count_query_keeps_conditions_and_drops_window() {
    let repository = product_repository();
    let conditions = Conditions::from_value(&json!({ "__IN__": { "price": [1, 2] } })).unwrap();

    let query_builder = repository.count_query_builder(&conditions).unwrap();
    assert_eq!(
        query_builder.build_dql(),
        "SELECT COUNT(entity) FROM Product entity WHERE entity.price IN (1, 2)"
    );
}

#[test]
fn malformed_extras_and_ordering_are_rejected() {
    assert!(matches!(
        Extras::from_value(&json!({ "selects": 1 })),
        Err(QueryError::Specification(_))
    ));
    assert!(matches!(
        OrderBy::from_value(&json!({ "name": "upward" })),
        Err(QueryError::Specification(_))
    ));
}

#[test]
fn failed_assembly_consumes_no_parameter_names() {
    let repository = product_repository();
    let before = repository.sequence().peek();

    let conditions = Conditions::from_value(&json!({
        "name": "bike",
        "__AND_HAVING__": [{ "__LIKE__": { "name": "%a%" } }]
    }))
    .unwrap();
    let error = repository
        .query_builder_find(&FindQuery::new(conditions))
        .unwrap_err();

    assert!(matches!(error, QueryError::Specification(_)));
    assert_eq!(repository.sequence().peek(), before);
}

#[test]
fn malformed_builder_operands_are_rejected() {
    let repository = product_repository();
    let before = repository.sequence().peek();

    let like_array = Conditions::new()
        .with(Condition::equal("online", true))
        .with(Condition::like("name", json!([1, 2])));
    assert!(matches!(
        repository.count_query_builder(&like_array),
        Err(QueryError::Specification(_))
    ));

    let empty: Vec<i64> = Vec::new();
    let empty_in = Conditions::new().with(Condition::in_list("position", empty));
    assert!(repository.count_query_builder(&empty_in).is_err());

    let empty_not_in = Conditions::from_value(&json!({ "__NOT_IN__": { "position": [] } })).unwrap();
    assert!(repository.count_query_builder(&empty_not_in).is_err());

    assert_eq!(repository.sequence().peek(), before);
}

#[test]
fn empty_groups_place_no_restriction() {
    let repository = product_repository();

    let conditions =
        Conditions::from_value(&json!({ "online": true, "__OR_WHERE__": [] })).unwrap();
    assert_eq!(
        repository.count_query_builder(&conditions).unwrap().build_dql(),
        "SELECT COUNT(entity) FROM Product entity WHERE entity.online = :param_1"
    );

    let conditions = Conditions::from_value(&json!({ "__OR_WHERE__": {} })).unwrap();
    assert_eq!(
        repository.count_query_builder(&conditions).unwrap().build_dql(),
        "SELECT COUNT(entity) FROM Product entity"
    );
}
