// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn parses_simple_equality() {
    let expr = parse_filter("#s = :v").unwrap();
    assert!(matches!(expr, Expr::Compare { op: CmpOp::Eq, .. }));
}

#[test]
fn parses_and_or_precedence() {
    // AND binds tighter than OR: `a OR b AND c` is `a OR (b AND c)`.
    let expr = parse_filter("#a = :a OR #b = :b AND #c = :c").unwrap();
    match expr {
        Expr::Or(_, rhs) => assert!(matches!(*rhs, Expr::And(_, _))),
        other => panic!("expected Or at top level, got {other:?}"),
    }
}

#[test]
fn parses_not() {
    let expr = parse_filter("NOT #a = :a").unwrap();
    assert!(matches!(expr, Expr::Not(_)));
}

#[test]
fn parses_between() {
    let expr = parse_filter("#age BETWEEN :lo AND :hi").unwrap();
    assert!(matches!(expr, Expr::Between { .. }));
}

#[test]
fn parses_in_list() {
    let expr = parse_filter("#status IN (:a, :b, :c)").unwrap();
    match expr {
        Expr::In { list, .. } => assert_eq!(list.len(), 3),
        other => panic!("expected In, got {other:?}"),
    }
}

#[test]
fn parses_function_predicate() {
    let expr = parse_filter("attribute_exists(#p)").unwrap();
    assert!(matches!(expr, Expr::Predicate(FunctionCall { name: FunctionName::AttributeExists, .. })));
}

#[test]
fn parses_begins_with_predicate() {
    let expr = parse_filter("begins_with(#p, :v)").unwrap();
    assert!(matches!(expr, Expr::Predicate(FunctionCall { name: FunctionName::BeginsWith, .. })));
}

#[test]
fn parses_size_inside_comparison() {
    let expr = parse_filter("size(#list) > :n").unwrap();
    match expr {
        Expr::Compare { l: Operand::Function(call), op: CmpOp::Gt, .. } => {
            assert_eq!(call.name, FunctionName::Size);
        }
        other => panic!("expected Compare with size() on lhs, got {other:?}"),
    }
}

#[test]
fn parses_parenthesized_grouping() {
    let expr = parse_filter("(#a = :a OR #b = :b) AND #c = :c").unwrap();
    match expr {
        Expr::And(lhs, _) => assert!(matches!(*lhs, Expr::Or(_, _))),
        other => panic!("expected And at top level, got {other:?}"),
    }
}

#[test]
fn parses_dotted_and_indexed_path() {
    let expr = parse_filter("#p.nested[0] = :v").unwrap();
    match expr {
        Expr::Compare { l: Operand::Path(path), .. } => {
            assert_eq!(path.len(), 2);
            assert!(matches!(path[1], PathSegment::Index(0)));
        }
        other => panic!("expected Compare with path lhs, got {other:?}"),
    }
}

#[test]
fn rejects_trailing_input() {
    assert!(parse_filter("#a = :a garbage").is_err());
}

#[test]
fn rejects_unbalanced_parens() {
    assert!(parse_filter("(#a = :a").is_err());
}
