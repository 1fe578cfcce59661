use super::*;
use crate::types::{GsiDef, KeySchema};
use lc_core::AttributeValue;

fn item(pairs: &[(&str, AttributeValue)]) -> Item {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

fn orders_store() -> DocumentStore {
    let store = DocumentStore::new("default", None);
    store.create_table(TableDef::new("Orders", KeySchema::with_sort("customer", "order_id")), None).unwrap();
    store
}

#[test]
fn put_then_get_roundtrips() {
    let store = orders_store();
    let it = item(&[
        ("customer", AttributeValue::s("alice")),
        ("order_id", AttributeValue::n("1")),
        ("total", AttributeValue::n("42")),
    ]);
    store.put_item("Orders", it.clone(), None, &ExprContext::default()).unwrap();

    let key = item(&[("customer", AttributeValue::s("alice")), ("order_id", AttributeValue::n("1"))]);
    let fetched = store.get_item("Orders", &key).unwrap();
    assert_eq!(fetched, Some(it));
}

#[test]
fn get_on_missing_table_errors() {
    let store = DocumentStore::new("default", None);
    let err = store.get_item("Missing", &Item::new()).unwrap_err();
    assert!(matches!(err, StoreError::TableNotFound(name) if name == "Missing"));
}

#[test]
fn put_condition_failure_does_not_write() {
    let store = orders_store();
    let it = item(&[("customer", AttributeValue::s("alice")), ("order_id", AttributeValue::n("1"))]);
    let err = store.put_item("Orders", it, Some("attribute_exists(total)"), &ExprContext::default()).unwrap_err();
    assert!(matches!(err, StoreError::ConditionalCheckFailed));

    let key = item(&[("customer", AttributeValue::s("alice")), ("order_id", AttributeValue::n("1"))]);
    assert!(store.get_item("Orders", &key).unwrap().is_none());
}

#[test]
fn update_item_creates_item_when_absent_and_applies_set() {
    let store = orders_store();
    let key = item(&[("customer", AttributeValue::s("alice")), ("order_id", AttributeValue::n("1"))]);
    let mut values = IndexMap::new();
    values.insert(":t".to_string(), AttributeValue::n("10"));
    let ctx = ExprContext { names: IndexMap::new(), values };

    let updated = store.update_item("Orders", &key, "SET total = :t", None, &ctx).unwrap();
    assert_eq!(updated.get("total"), Some(&AttributeValue::n("10")));
    assert_eq!(updated.get("customer"), Some(&AttributeValue::s("alice")));
}

#[test]
fn delete_item_removes_and_is_idempotent() {
    let store = orders_store();
    let it = item(&[("customer", AttributeValue::s("alice")), ("order_id", AttributeValue::n("1"))]);
    store.put_item("Orders", it.clone(), None, &ExprContext::default()).unwrap();

    let key = item(&[("customer", AttributeValue::s("alice")), ("order_id", AttributeValue::n("1"))]);
    let removed = store.delete_item("Orders", &key, None, &ExprContext::default()).unwrap();
    assert_eq!(removed, Some(it));
    assert_eq!(store.delete_item("Orders", &key, None, &ExprContext::default()).unwrap(), None);
}

#[test]
fn query_returns_sorted_rows_within_bounds() {
    let store = orders_store();
    for n in [3, 1, 2] {
        let it = item(&[("customer", AttributeValue::s("alice")), ("order_id", AttributeValue::n(n.to_string()))]);
        store.put_item("Orders", it, None, &ExprContext::default()).unwrap();
    }
    let mut values = IndexMap::new();
    values.insert(":c".to_string(), AttributeValue::s("alice"));
    values.insert(":lo".to_string(), AttributeValue::n("1"));
    values.insert(":hi".to_string(), AttributeValue::n("2"));
    let ctx = ExprContext { names: IndexMap::new(), values };

    let rows = store.query("Orders", "customer = :c AND order_id BETWEEN :lo AND :hi", None, None, &ctx).unwrap();
    let order_ids: Vec<_> = rows.iter().map(|r| r.get("order_id").unwrap().as_number().unwrap()).collect();
    assert_eq!(order_ids, vec![1.0, 2.0]);
}

#[test]
fn query_applies_filter_after_key_condition() {
    let store = orders_store();
    let it1 = item(&[
        ("customer", AttributeValue::s("alice")),
        ("order_id", AttributeValue::n("1")),
        ("status", AttributeValue::s("open")),
    ]);
    let it2 = item(&[
        ("customer", AttributeValue::s("alice")),
        ("order_id", AttributeValue::n("2")),
        ("status", AttributeValue::s("closed")),
    ]);
    store.put_item("Orders", it1, None, &ExprContext::default()).unwrap();
    store.put_item("Orders", it2, None, &ExprContext::default()).unwrap();

    let mut values = IndexMap::new();
    values.insert(":c".to_string(), AttributeValue::s("alice"));
    values.insert(":s".to_string(), AttributeValue::s("open"));
    let ctx = ExprContext { names: IndexMap::new(), values };

    let rows = store.query("Orders", "customer = :c", Some("status = :s"), None, &ctx).unwrap();
    assert_eq!(rows.len(), 1);
}

#[test]
fn scan_returns_every_item() {
    let store = orders_store();
    for n in 0..3 {
        let it = item(&[("customer", AttributeValue::s("alice")), ("order_id", AttributeValue::n(n.to_string()))]);
        store.put_item("Orders", it, None, &ExprContext::default()).unwrap();
    }
    assert_eq!(store.scan("Orders", None, &ExprContext::default()).unwrap().len(), 3);
}

#[test]
fn batch_get_skips_misses() {
    let store = orders_store();
    let it = item(&[("customer", AttributeValue::s("alice")), ("order_id", AttributeValue::n("1"))]);
    store.put_item("Orders", it.clone(), None, &ExprContext::default()).unwrap();

    let present = item(&[("customer", AttributeValue::s("alice")), ("order_id", AttributeValue::n("1"))]);
    let missing = item(&[("customer", AttributeValue::s("bob")), ("order_id", AttributeValue::n("9"))]);
    let found = store.batch_get(&[("Orders".to_string(), present), ("Orders".to_string(), missing)]).unwrap();
    assert_eq!(found, vec![it]);
}

#[test]
fn batch_write_applies_puts_and_deletes_sequentially() {
    let store = orders_store();
    let it = item(&[("customer", AttributeValue::s("alice")), ("order_id", AttributeValue::n("1"))]);
    store.put_item("Orders", it.clone(), None, &ExprContext::default()).unwrap();

    let new_item = item(&[("customer", AttributeValue::s("bob")), ("order_id", AttributeValue::n("2"))]);
    let delete_key = item(&[("customer", AttributeValue::s("alice")), ("order_id", AttributeValue::n("1"))]);
    store
        .batch_write(vec![
            BatchWriteOp::Put { table: "Orders".to_string(), item: new_item },
            BatchWriteOp::Delete { table: "Orders".to_string(), key: delete_key },
        ])
        .unwrap();

    assert_eq!(store.scan("Orders", None, &ExprContext::default()).unwrap().len(), 1);
}

#[test]
fn transact_get_fails_if_any_item_missing() {
    let store = orders_store();
    let present = item(&[("customer", AttributeValue::s("alice")), ("order_id", AttributeValue::n("1"))]);
    store.put_item("Orders", present.clone(), None, &ExprContext::default()).unwrap();

    let missing = item(&[("customer", AttributeValue::s("bob")), ("order_id", AttributeValue::n("9"))]);
    let err = store.transact_get(&[("Orders".to_string(), present), ("Orders".to_string(), missing)]).unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
}

#[test]
fn transact_write_cancels_all_if_any_condition_fails() {
    let store = orders_store();
    let it = item(&[("customer", AttributeValue::s("alice")), ("order_id", AttributeValue::n("1"))]);
    store.put_item("Orders", it.clone(), None, &ExprContext::default()).unwrap();

    let new_item = item(&[("customer", AttributeValue::s("bob")), ("order_id", AttributeValue::n("2"))]);
    let check_key = item(&[("customer", AttributeValue::s("alice")), ("order_id", AttributeValue::n("1"))]);

    let err = store
        .transact_write(vec![
            TransactWriteOp::Put { table: "Orders".to_string(), item: new_item, condition: None, ctx: ExprContext::default() },
            TransactWriteOp::ConditionCheck {
                table: "Orders".to_string(),
                key: check_key,
                condition: "attribute_not_exists(customer)".to_string(),
                ctx: ExprContext::default(),
            },
        ])
        .unwrap_err();
    assert!(matches!(err, StoreError::TransactionCancelled(_)));
    // the put must not have been applied either, since both ops are one transaction
    assert_eq!(store.scan("Orders", None, &ExprContext::default()).unwrap().len(), 1);
}

#[test]
fn transact_write_commits_all_when_conditions_pass() {
    let store = orders_store();
    let it = item(&[("customer", AttributeValue::s("alice")), ("order_id", AttributeValue::n("1"))]);
    store.put_item("Orders", it, None, &ExprContext::default()).unwrap();

    let new_item = item(&[("customer", AttributeValue::s("bob")), ("order_id", AttributeValue::n("2"))]);
    let delete_key = item(&[("customer", AttributeValue::s("alice")), ("order_id", AttributeValue::n("1"))]);

    store
        .transact_write(vec![
            TransactWriteOp::Put { table: "Orders".to_string(), item: new_item, condition: None, ctx: ExprContext::default() },
            TransactWriteOp::Delete { table: "Orders".to_string(), key: delete_key, condition: None, ctx: ExprContext::default() },
        ])
        .unwrap();

    let rows = store.scan("Orders", None, &ExprContext::default()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("customer"), Some(&AttributeValue::s("bob")));
}

#[test]
fn gsi_query_finds_items_by_secondary_key() {
    let mut def = TableDef::new("Orders", KeySchema::with_sort("customer", "order_id"));
    def.gsis.push(GsiDef { name: "byStatus".to_string(), key_schema: KeySchema::new("status") });
    let store = DocumentStore::new("default", None);
    store.create_table(def, None).unwrap();

    let it = item(&[
        ("customer", AttributeValue::s("alice")),
        ("order_id", AttributeValue::n("1")),
        ("status", AttributeValue::s("open")),
    ]);
    store.put_item("Orders", it, None, &ExprContext::default()).unwrap();

    let mut values = IndexMap::new();
    values.insert(":s".to_string(), AttributeValue::s("open"));
    let ctx = ExprContext { names: IndexMap::new(), values };
    let rows = store.query("Orders", "status = :s", None, Some("byStatus"), &ctx).unwrap();
    assert_eq!(rows.len(), 1);
}

#[test]
fn create_table_twice_fails() {
    let store = orders_store();
    let err = store.create_table(TableDef::new("Orders", KeySchema::new("customer")), None).unwrap_err();
    assert!(matches!(err, StoreError::TableAlreadyExists(_)));
}

#[tokio::test]
async fn delete_table_removes_it() {
    let store = orders_store();
    store.delete_table("Orders").await.unwrap();
    assert!(store.describe_table("Orders").is_none());
    assert!(store.delete_table("Orders").await.is_err());
}
