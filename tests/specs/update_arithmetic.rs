//! spec.md §8 scenario 3: update expression arithmetic, driven through
//! `lc-store`'s `update_item` so the expression engine and the storage
//! engine are exercised together the way a real request would.

use indexmap::IndexMap;
use lc_core::AttributeValue;
use lc_store::{DocumentStore, ExprContext, KeySchema, TableDef};

#[test]
fn set_count_plus_value_increments_the_stored_number() {
    let store = DocumentStore::new("counters-test", None);
    store.create_table(TableDef::new("Counters", KeySchema::new("pk")), None).unwrap();

    let ctx = ExprContext::default();
    let initial: IndexMap<String, AttributeValue> =
        [("pk".to_string(), AttributeValue::s("1")), ("count".to_string(), AttributeValue::n("10"))].into_iter().collect();
    store.put_item("Counters", initial, None, &ctx).unwrap();

    let mut ctx = ExprContext::default();
    ctx.values.insert(":v".to_string(), AttributeValue::n("5"));
    let key: IndexMap<String, AttributeValue> = [("pk".to_string(), AttributeValue::s("1"))].into_iter().collect();
    let updated = store.update_item("Counters", &key, "SET count = count + :v", None, &ctx).unwrap();

    assert_eq!(updated.get("count"), Some(&AttributeValue::n("15")));
}

#[test]
fn add_to_absent_attribute_creates_it_with_the_operand() {
    let store = DocumentStore::new("counters-test-2", None);
    store.create_table(TableDef::new("Counters", KeySchema::new("pk")), None).unwrap();

    let ctx = ExprContext::default();
    let initial: IndexMap<String, AttributeValue> = [("pk".to_string(), AttributeValue::s("1"))].into_iter().collect();
    store.put_item("Counters", initial, None, &ctx).unwrap();

    let mut ctx = ExprContext::default();
    ctx.values.insert(":v".to_string(), AttributeValue::n("3"));
    let key: IndexMap<String, AttributeValue> = [("pk".to_string(), AttributeValue::s("1"))].into_iter().collect();
    let updated = store.update_item("Counters", &key, "ADD hits :v", None, &ctx).unwrap();

    assert_eq!(updated.get("hits"), Some(&AttributeValue::n("3")));
}
