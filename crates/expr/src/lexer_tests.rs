// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn kinds(src: &str) -> Vec<TokenKind> {
    lex(src).into_iter().map(|t| t.kind).collect()
}

#[test]
fn lexes_name_and_value_refs() {
    assert_eq!(
        kinds("#name = :val"),
        vec![
            TokenKind::NameRef("name".into()),
            TokenKind::Eq,
            TokenKind::ValueRef("val".into()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn lexes_comparison_operators() {
    assert_eq!(
        kinds("< <= > >= <> ="),
        vec![
            TokenKind::Lt,
            TokenKind::Le,
            TokenKind::Gt,
            TokenKind::Ge,
            TokenKind::Ne,
            TokenKind::Eq,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn lexes_dotted_path_with_index() {
    assert_eq!(
        kinds("a.b[0]"),
        vec![
            TokenKind::Ident("a".into()),
            TokenKind::Dot,
            TokenKind::Ident("b".into()),
            TokenKind::LBracket,
            TokenKind::Number("0".into()),
            TokenKind::RBracket,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn lexes_function_call() {
    assert_eq!(
        kinds("begins_with(#p, :v)"),
        vec![
            TokenKind::Ident("begins_with".into()),
            TokenKind::LParen,
            TokenKind::NameRef("p".into()),
            TokenKind::Comma,
            TokenKind::ValueRef("v".into()),
            TokenKind::RParen,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn whitespace_is_skipped() {
    assert_eq!(kinds("  a   b "), vec![
        TokenKind::Ident("a".into()),
        TokenKind::Ident("b".into()),
        TokenKind::Eof
    ]);
}
