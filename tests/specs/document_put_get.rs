//! spec.md §8 scenario 1: document put/get round-trip, and the
//! "document round-trip" quantified invariant.

use indexmap::IndexMap;
use lc_core::AttributeValue;
use lc_store::{DocumentStore, ExprContext, KeySchema, TableDef};

fn item(pairs: &[(&str, AttributeValue)]) -> IndexMap<String, AttributeValue> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

#[test]
fn put_then_get_returns_the_same_item() {
    let store = DocumentStore::new("orders-test", None);
    store
        .create_table(TableDef::new("Orders", KeySchema::with_sort("orderId", "itemId")), None)
        .unwrap();

    let ctx = ExprContext::default();
    let put = item(&[
        ("orderId", AttributeValue::s("o1")),
        ("itemId", AttributeValue::s("i1")),
        ("qty", AttributeValue::n("5")),
    ]);
    store.put_item("Orders", put.clone(), None, &ctx).unwrap();

    let key = item(&[("orderId", AttributeValue::s("o1")), ("itemId", AttributeValue::s("i1"))]);
    let got = store.get_item("Orders", &key).unwrap();
    assert_eq!(got, Some(put));
}

#[test]
fn get_on_a_key_never_written_is_absent_not_an_error() {
    let store = DocumentStore::new("orders-test-2", None);
    store.create_table(TableDef::new("Orders", KeySchema::with_sort("orderId", "itemId")), None).unwrap();

    let key = item(&[("orderId", AttributeValue::s("missing")), ("itemId", AttributeValue::s("missing"))]);
    assert_eq!(store.get_item("Orders", &key).unwrap(), None);
}
