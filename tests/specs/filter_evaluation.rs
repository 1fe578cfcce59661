//! spec.md §8 scenario 2: filter expression evaluation across three
//! items.

use indexmap::IndexMap;
use lc_core::AttributeValue;
use lc_expr::{eval_bool, parse_filter, Context};

fn item(pairs: &[(&str, AttributeValue)]) -> IndexMap<String, AttributeValue> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

#[test]
fn status_active_and_age_gt_28_matches_only_the_first_item() {
    let a = item(&[("age", AttributeValue::n("30")), ("status", AttributeValue::s("active"))]);
    let b = item(&[("age", AttributeValue::n("25")), ("status", AttributeValue::s("inactive"))]);
    let c = item(&[("age", AttributeValue::n("35"))]);

    let expr = parse_filter("status = :s AND age > :n").unwrap();
    let names = IndexMap::new();
    let mut values = IndexMap::new();
    values.insert(":s".to_string(), AttributeValue::s("active"));
    values.insert(":n".to_string(), AttributeValue::n("28"));
    let ctx = Context::empty(&names, &values);

    assert!(eval_bool(&expr, &a, &ctx));
    assert!(!eval_bool(&expr, &b, &ctx));
    // C has no `status` attribute at all: the comparison is false, never
    // an error (spec.md §4.4.2, "Comparison on a missing attribute is
    // false").
    assert!(!eval_bool(&expr, &c, &ctx));
}

#[test]
fn size_of_a_missing_attribute_is_zero() {
    let item = item(&[("present", AttributeValue::s("x"))]);
    let expr = parse_filter("size(absent) = :z").unwrap();
    let names = IndexMap::new();
    let mut values = IndexMap::new();
    values.insert(":z".to_string(), AttributeValue::n("0"));
    let ctx = Context::empty(&names, &values);
    assert!(eval_bool(&expr, &item, &ctx));
}

#[test]
fn between_is_inclusive_at_both_endpoints() {
    let item = item(&[("age", AttributeValue::n("30"))]);
    let expr = parse_filter("age BETWEEN :lo AND :hi").unwrap();
    let names = IndexMap::new();
    let mut values = IndexMap::new();
    values.insert(":lo".to_string(), AttributeValue::n("30"));
    values.insert(":hi".to_string(), AttributeValue::n("40"));
    let ctx = Context::empty(&names, &values);
    assert!(eval_bool(&expr, &item, &ctx));
}

#[test]
fn in_where_every_candidate_resolves_to_nothing_is_false() {
    let item = item(&[("status", AttributeValue::s("active"))]);
    let expr = parse_filter("status IN (:only)").unwrap();
    let names = IndexMap::new();
    let mut values = IndexMap::new();
    // Deliberately never bind `:only` so the candidate resolves to
    // nothing, matching spec.md §8's "IN with an empty value list" rule:
    // with no resolvable candidate, `any()` over them is false too.
    values.insert(":unused".to_string(), AttributeValue::s("x"));
    let ctx = Context::empty(&names, &values);
    assert!(!eval_bool(&expr, &item, &ctx));
}
