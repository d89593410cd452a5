//! CRUD facade delegation to the persistence engine.

use crate::common::{product_administrator, Category, InMemoryEntityManager, OrderLine, Product};
use entity_query::administrator::{into_record, EntityAdministrator};
use entity_query::metadata::MetadataRegistry;
use entity_query::query_builder::{Conditions, Extras, OrderBy, ParameterSequence};
use entity_query::{QueryConfig, QueryError};
use serde_json::json;
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};

#[tokio::test]
async fn find_by_delegates_assembled_query() {
    let manager = InMemoryEntityManager::new();
    manager.seed(vec![
        into_record(Product::shared(1, "bike", 100)),
        into_record(Product::shared(2, "helmet", 40)),
    ]);
    let administrator = product_administrator(Arc::clone(&manager));

    let conditions = Conditions::from_value(&json!({ "online": true })).unwrap();
    let products = administrator
        .find_by(&conditions, None, Some(10), None, &Extras::new())
        .await
        .unwrap();

    assert_eq!(products.len(), 2);
    assert_eq!(products[0].name, "bike");

    let query = manager.last_query().unwrap();
    assert_eq!(
        query.dql,
        "SELECT entity FROM Product entity WHERE entity.online = :param_1 LIMIT 10"
    );
    assert_eq!(query.parameters.get("param_1"), Some(&json!(true)));
}

#[tokio::test]
async fn default_order_applies_only_without_explicit_order() {
    let manager = InMemoryEntityManager::new();
    let administrator =
        product_administrator(Arc::clone(&manager)).with_default_order_by(OrderBy::new().desc("price"));

    administrator.find_all(None).await.unwrap();
    assert_eq!(
        manager.last_query().unwrap().dql,
        "SELECT entity FROM Product entity ORDER BY entity.price DESC"
    );

    administrator
        .find_all(Some(&OrderBy::new().asc("name")))
        .await
        .unwrap();
    assert_eq!(
        manager.last_query().unwrap().dql,
        "SELECT entity FROM Product entity ORDER BY entity.name ASC"
    );
}

#[tokio::test]
async fn find_like_by_ands_like_predicates() {
    let manager = InMemoryEntityManager::new();
    let administrator = product_administrator(Arc::clone(&manager));

    administrator
        .find_like_by(&[("name", "%bi%"), ("category.name", "tool%")], None, None, None)
        .await
        .unwrap();

    let query = manager.last_query().unwrap();
    assert_eq!(
        query.dql,
        "SELECT entity FROM Product entity WHERE entity.name LIKE :param_1 AND category.name LIKE :param_2"
    );
    assert_eq!(query.parameters.get("param_2"), Some(&json!("tool%")));
}

#[tokio::test]
async fn find_one_by_limits_to_one_row() {
    let manager = InMemoryEntityManager::new();
    manager.seed(vec![
        into_record(Product::shared(1, "bike", 100)),
        into_record(Product::shared(2, "helmet", 40)),
    ]);
    let administrator = product_administrator(Arc::clone(&manager));

    let product = administrator
        .find_one_by(&Conditions::new(), None, &Extras::new())
        .await
        .unwrap();

    assert_eq!(product.unwrap().id, Some(1));
    assert!(manager.last_query().unwrap().dql.ends_with("LIMIT 1"));
}

#[tokio::test]
async fn find_one_by_id_uses_identity_lookup_without_extras() {
    let manager = InMemoryEntityManager::new();
    manager.seed(vec![into_record(Product::shared(7, "bike", 100))]);
    let administrator = product_administrator(Arc::clone(&manager));

    let product = administrator.find_one_by_id(7, &Extras::new()).await.unwrap();
    assert_eq!(product.unwrap().name, "bike");
    assert!(manager.queries().is_empty());

    let missing = administrator.find_one_by_id(8, &Extras::new()).await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn find_one_by_id_with_extras_runs_a_query() {
    let manager = InMemoryEntityManager::new();
    let administrator = product_administrator(Arc::clone(&manager));

    let extras = Extras::new().select("entity").select_join("category").left_join("category", "category");
    administrator.find_one_by_id(7, &extras).await.unwrap();

    let query = manager.last_query().unwrap();
    assert_eq!(
        query.dql,
        "SELECT entity, category FROM Product entity LEFT JOIN entity.category category \
         WHERE entity.id = :param_1"
    );
    assert_eq!(query.parameters.get("param_1"), Some(&json!(7)));
}

#[tokio::test]
async fn foreign_rows_are_a_type_mismatch() {
    let manager = InMemoryEntityManager::new();
    manager.seed(vec![
        into_record(Product::shared(1, "bike", 100)),
        into_record(Arc::new(Category::new("tools"))),
    ]);
    let administrator = product_administrator(Arc::clone(&manager));

    let error = administrator.find_all(None).await.unwrap_err();
    assert!(matches!(error, QueryError::TypeMismatch { .. }));
}

#[tokio::test]
async fn count_returns_engine_scalar() {
    let manager = InMemoryEntityManager::new();
    manager.set_scalar(json!(42));
    let administrator = product_administrator(Arc::clone(&manager));

    let conditions = Conditions::from_value(&json!({ "__IS_NOT_NULL__": "deletedAt" })).unwrap();
    assert_eq!(administrator.count(&conditions).await.unwrap(), 42);
    assert_eq!(
        manager.last_query().unwrap().dql,
        "SELECT COUNT(entity) FROM Product entity WHERE entity.deletedAt IS NOT NULL"
    );

    manager.set_scalar(json!("many"));
    let error = administrator.count(&Conditions::new()).await.unwrap_err();
    assert!(matches!(error, QueryError::Persistence(_)));
}

#[tokio::test]
async fn save_and_delete_flush() {
    let manager = InMemoryEntityManager::new();
    let administrator = product_administrator(Arc::clone(&manager));

    let bike = Product::shared(1, "bike", 100);
    administrator.persist(Arc::clone(&bike)).await.unwrap();
    assert_eq!(manager.pending_persist_count(), 1);
    assert_eq!(manager.row_count(), 0);

    administrator.flush().await.unwrap();
    assert_eq!(manager.row_count(), 1);

    administrator
        .save_many(vec![Product::shared(2, "helmet", 40), Product::shared(3, "lamp", 15)])
        .await
        .unwrap();
    assert_eq!(manager.row_count(), 3);

    administrator.delete(bike).await.unwrap();
    assert_eq!(manager.row_count(), 2);
    assert_eq!(manager.flush_count(), 3);
}

#[test]
fn remove_waits_for_flush() {
    let manager = InMemoryEntityManager::new();
    let helmet = Product::shared(2, "helmet", 40);
    manager.seed(vec![into_record(Arc::clone(&helmet))]);
    let administrator = product_administrator(Arc::clone(&manager));

    assert_ok!(tokio_test::block_on(administrator.remove(helmet)));
    assert_eq!(manager.pending_removal_count(), 1);
    assert_eq!(manager.row_count(), 1);
}

#[tokio::test]
async fn delete_all_resets_auto_increment() {
    let manager = InMemoryEntityManager::new();
    manager.seed(vec![
        into_record(Product::shared(1, "bike", 100)),
        into_record(Product::shared(2, "helmet", 40)),
    ]);
    let administrator = product_administrator(Arc::clone(&manager));

    administrator.delete_all(true).await.unwrap();

    assert_eq!(manager.row_count(), 0);
    assert_eq!(
        manager.statements(),
        vec!["ALTER TABLE product AUTO_INCREMENT = 1".to_string()]
    );
}

#[tokio::test]
async fn truncate_runs_statements() {
    let manager = InMemoryEntityManager::new();
    manager.seed(vec![into_record(Product::shared(1, "bike", 100))]);
    let administrator = product_administrator(Arc::clone(&manager));

    administrator.truncate(false).await.unwrap();
    assert_eq!(manager.statements(), vec!["TRUNCATE TABLE product".to_string()]);
    assert_eq!(manager.row_count(), 0);

    administrator.set_auto_increment(50).await.unwrap();
    assert_eq!(
        manager.statements().last().map(String::as_str),
        Some("ALTER TABLE product AUTO_INCREMENT = 50")
    );
}

#[tokio::test]
async fn flush_failures_pass_through() {
    let manager = InMemoryEntityManager::new();
    manager.fail_next_flush();
    let administrator = product_administrator(Arc::clone(&manager));

    let error = assert_err!(administrator.save(Product::shared(1, "bike", 100)).await);
    assert!(matches!(error, QueryError::Persistence(_)));
    assert!(!error.is_usage_error());
}

#[tokio::test]
async fn clear_and_detach_are_delegated() {
    let manager = InMemoryEntityManager::new();
    let administrator = product_administrator(Arc::clone(&manager));

    assert_ok!(administrator.clear().await);
    assert_ok!(administrator.detach(Product::shared(1, "bike", 1)).await);

    assert_eq!(manager.cleared(), vec!["Product".to_string()]);
    assert_eq!(manager.detached_count(), 1);
}

#[test]
fn exists_requires_every_identifier() {
    let manager = InMemoryEntityManager::new();
    let administrator = product_administrator(manager);

    assert!(administrator.exists(&Product::new(1, "bike", 1)).unwrap());
    assert!(!administrator.exists(&Product::default()).unwrap());

    let error = administrator.exists(&Category::new("tools")).unwrap_err();
    assert!(matches!(error, QueryError::TypeMismatch { .. }));
}

#[test]
fn exists_with_composite_identifier() {
    let config = QueryConfig::default();
    let administrator: EntityAdministrator<OrderLine> = EntityAdministrator::from_registry(
        InMemoryEntityManager::new(),
        &MetadataRegistry::new(),
        &config,
        ParameterSequence::default(),
    )
    .unwrap();

    let complete = OrderLine {
        order_id: Some(1),
        product_id: Some(2),
        quantity: 3,
    };
    let partial = OrderLine {
        order_id: Some(1),
        ..OrderLine::default()
    };

    assert!(administrator.exists(&complete).unwrap());
    assert!(!administrator.exists(&partial).unwrap());
    assert!(matches!(
        administrator.single_identifier_field_name(),
        Err(QueryError::Metadata(_))
    ));
    assert_eq!(administrator.identifier_field_names(), ["orderId", "productId"]);
}

#[test]
fn create_uses_default_then_initializer() {
    let administrator = product_administrator(InMemoryEntityManager::new());

    let product = administrator.create_with(|product| {
        product.name = "lamp".to_string();
        product.price = 15;
    });

    assert_eq!(product.id, None);
    assert_eq!(product.name, "lamp");
    assert_eq!(administrator.create(), Product::default());
}

#[test]
fn metadata_helpers_delegate_to_repository() {
    let administrator = product_administrator(InMemoryEntityManager::new());

    assert_eq!(administrator.table_name(), "product");
    assert_eq!(administrator.single_identifier_field_name().unwrap(), "id");
    assert!(administrator.has_field("price"));
    assert!(administrator.has_association("category"));
    assert!(!administrator.has_association("price"));
}
