use super::*;
use serde_json::json;

#[test]
fn input_path_dollar_returns_whole_document() {
    let data = json!({"a": 1});
    assert_eq!(input_path(&data, Some("$")).unwrap(), data);
}

#[test]
fn input_path_none_yields_empty_map() {
    let data = json!({"a": 1});
    assert_eq!(input_path(&data, None).unwrap(), json!({}));
}

#[test]
fn input_path_selects_nested_key() {
    let data = json!({"a": {"b": 5}});
    assert_eq!(input_path(&data, Some("$.a.b")).unwrap(), json!(5));
}

#[test]
fn input_path_selects_array_index() {
    let data = json!({"arr": [10, 20, 30]});
    assert_eq!(input_path(&data, Some("$.arr[1]")).unwrap(), json!(20));
}

#[test]
fn input_path_missing_key_errors() {
    let data = json!({"a": 1});
    assert!(input_path(&data, Some("$.missing")).is_err());
}

#[test]
fn result_path_none_passes_input_through() {
    let input = json!({"a": 1});
    let result = json!({"b": 2});
    assert_eq!(result_path(&input, result, None).unwrap(), input);
}

#[test]
fn result_path_dollar_replaces_input() {
    let input = json!({"a": 1});
    let result = json!({"b": 2});
    assert_eq!(result_path(&input, result.clone(), Some("$")).unwrap(), result);
}

#[test]
fn result_path_nested_preserves_rest_of_input() {
    let input = json!({"a": 1});
    let result = json!(42);
    let merged = result_path(&input, result, Some("$.b.c")).unwrap();
    assert_eq!(merged, json!({"a": 1, "b": {"c": 42}}));
}

#[test]
fn parameters_substitutes_dollar_sign_keys() {
    let template = json!({"x.$": "$.input.value", "y": "literal"});
    let data = json!({"input": {"value": 7}});
    let resolved = parameters(&template, &data).unwrap();
    assert_eq!(resolved, json!({"x": 7, "y": "literal"}));
}

#[test]
fn context_parameters_resolves_double_dollar_against_context() {
    let template = json!({"index.$": "$$.Map.Item.Index"});
    let data = json!({});
    let ctx = json!({"Map": {"Item": {"Index": 3}}});
    let resolved = context_parameters(&template, &data, &ctx).unwrap();
    assert_eq!(resolved, json!({"index": 3}));
}
