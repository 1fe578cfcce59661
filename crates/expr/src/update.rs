// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recursive-descent parser for the update-expression grammar (spec.md
//! §4.4.3): `SET`/`REMOVE`/`ADD`/`DELETE` clauses, each built from its own
//! action grammar. All four clause types may appear in one expression and
//! are later applied in clause order (spec.md §4.4.3) by
//! [`crate::update_eval`].
//!
//! Per the supplemented grammar (SPEC_FULL.md), a function call
//! (`if_not_exists`/`list_append`) may appear on either side of an
//! arithmetic `value_expr`, not only as the entire right-hand side.

use lc_core::AttributeValue;

use crate::ast::{Path, PathSegment};
use crate::error::ExprError;
use crate::lexer::{lex, Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValueAtom {
    Path(Path),
    ValueRef(String),
    Literal(AttributeValue),
    IfNotExists(Path, Box<ValueExpr>),
    ListAppend(Box<ValueExpr>, Box<ValueExpr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueExpr {
    pub head: ValueAtom,
    pub tail: Option<(ArithOp, ValueAtom)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetAction {
    pub path: Path,
    pub value: ValueExpr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoveAction {
    pub path: Path,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddAction {
    pub path: Path,
    pub value: ValueAtom,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteAction {
    pub path: Path,
    pub value: ValueAtom,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateExpr {
    pub sets: Vec<SetAction>,
    pub removes: Vec<RemoveAction>,
    pub adds: Vec<AddAction>,
    pub deletes: Vec<DeleteAction>,
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

pub fn parse_update(src: &str) -> Result<UpdateExpr, ExprError> {
    let mut parser = Parser { tokens: lex(src), pos: 0 };
    let mut out = UpdateExpr::default();
    loop {
        if matches!(parser.peek().kind, TokenKind::Eof) {
            break;
        }
        if parser.ident_is("SET") {
            parser.advance();
            out.sets.extend(parser.parse_set_list()?);
        } else if parser.ident_is("REMOVE") {
            parser.advance();
            out.removes.extend(parser.parse_path_list()?.into_iter().map(|path| RemoveAction { path }));
        } else if parser.ident_is("ADD") {
            parser.advance();
            out.adds.extend(parser.parse_add_list()?);
        } else if parser.ident_is("DELETE") {
            parser.advance();
            out.deletes.extend(parser.parse_add_list()?.into_iter().map(|a| DeleteAction { path: a.path, value: a.value }));
        } else {
            return Err(ExprError::UnexpectedToken {
                pos: parser.peek().pos,
                found: format!("{:?}", parser.peek().kind),
                expected: "SET, REMOVE, ADD, or DELETE",
            });
        }
    }
    if out.sets.is_empty() && out.removes.is_empty() && out.adds.is_empty() && out.deletes.is_empty() {
        return Err(ExprError::UnexpectedEof { expected: "at least one SET/REMOVE/ADD/DELETE clause" });
    }
    Ok(out)
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn ident_is(&self, word: &str) -> bool {
        matches!(&self.peek().kind, TokenKind::Ident(s) if s.eq_ignore_ascii_case(word))
    }

    fn expect(&mut self, kind: &TokenKind, expected: &'static str) -> Result<(), ExprError> {
        if std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(kind) {
            self.advance();
            Ok(())
        } else if matches!(self.peek().kind, TokenKind::Eof) {
            Err(ExprError::UnexpectedEof { expected })
        } else {
            Err(ExprError::UnexpectedToken {
                pos: self.peek().pos,
                found: format!("{:?}", self.peek().kind),
                expected,
            })
        }
    }

    fn parse_set_list(&mut self) -> Result<Vec<SetAction>, ExprError> {
        let mut out = vec![self.parse_set_action()?];
        while matches!(self.peek().kind, TokenKind::Comma) {
            self.advance();
            out.push(self.parse_set_action()?);
        }
        Ok(out)
    }

    fn parse_set_action(&mut self) -> Result<SetAction, ExprError> {
        let path = self.parse_path()?;
        self.expect(&TokenKind::Eq, "=")?;
        let value = self.parse_value_expr()?;
        Ok(SetAction { path, value })
    }

    fn parse_path_list(&mut self) -> Result<Vec<Path>, ExprError> {
        let mut out = vec![self.parse_path()?];
        while matches!(self.peek().kind, TokenKind::Comma) {
            self.advance();
            out.push(self.parse_path()?);
        }
        Ok(out)
    }

    fn parse_add_list(&mut self) -> Result<Vec<AddAction>, ExprError> {
        let mut out = vec![self.parse_add_action()?];
        while matches!(self.peek().kind, TokenKind::Comma) {
            self.advance();
            out.push(self.parse_add_action()?);
        }
        Ok(out)
    }

    fn parse_add_action(&mut self) -> Result<AddAction, ExprError> {
        let path = self.parse_path()?;
        let value = self.parse_value_atom()?;
        Ok(AddAction { path, value })
    }

    fn parse_value_expr(&mut self) -> Result<ValueExpr, ExprError> {
        let head = self.parse_value_atom()?;
        let tail = match self.peek().kind {
            TokenKind::Plus => {
                self.advance();
                Some((ArithOp::Add, self.parse_value_atom()?))
            }
            TokenKind::Minus => {
                self.advance();
                Some((ArithOp::Sub, self.parse_value_atom()?))
            }
            _ => None,
        };
        Ok(ValueExpr { head, tail })
    }

    fn parse_value_atom(&mut self) -> Result<ValueAtom, ExprError> {
        match self.peek().kind.clone() {
            TokenKind::ValueRef(name) => {
                self.advance();
                Ok(ValueAtom::ValueRef(name))
            }
            TokenKind::Number(n) => {
                self.advance();
                Ok(ValueAtom::Literal(AttributeValue::N(n)))
            }
            TokenKind::Ident(word) if word.eq_ignore_ascii_case("if_not_exists") => {
                self.advance();
                self.expect(&TokenKind::LParen, "(")?;
                let path = self.parse_path()?;
                self.expect(&TokenKind::Comma, ",")?;
                let default = self.parse_value_expr()?;
                self.expect(&TokenKind::RParen, ")")?;
                Ok(ValueAtom::IfNotExists(path, Box::new(default)))
            }
            TokenKind::Ident(word) if word.eq_ignore_ascii_case("list_append") => {
                self.advance();
                self.expect(&TokenKind::LParen, "(")?;
                let a = self.parse_value_expr()?;
                self.expect(&TokenKind::Comma, ",")?;
                let b = self.parse_value_expr()?;
                self.expect(&TokenKind::RParen, ")")?;
                Ok(ValueAtom::ListAppend(Box::new(a), Box::new(b)))
            }
            TokenKind::NameRef(_) | TokenKind::Ident(_) => Ok(ValueAtom::Path(self.parse_path()?)),
            TokenKind::Eof => Err(ExprError::UnexpectedEof { expected: "value" }),
            other => Err(ExprError::UnexpectedToken {
                pos: self.peek().pos,
                found: format!("{other:?}"),
                expected: "value",
            }),
        }
    }

    fn parse_path(&mut self) -> Result<Path, ExprError> {
        let mut path = vec![self.parse_path_key()?];
        loop {
            match self.peek().kind {
                TokenKind::Dot => {
                    self.advance();
                    path.push(self.parse_path_key()?);
                }
                TokenKind::LBracket => {
                    self.advance();
                    let idx = match self.advance().kind {
                        TokenKind::Number(n) => n.parse::<usize>().map_err(|_| ExprError::UnexpectedToken {
                            pos: self.peek().pos,
                            found: n,
                            expected: "array index",
                        })?,
                        other => {
                            return Err(ExprError::UnexpectedToken {
                                pos: self.peek().pos,
                                found: format!("{other:?}"),
                                expected: "array index",
                            })
                        }
                    };
                    self.expect(&TokenKind::RBracket, "]")?;
                    path.push(PathSegment::Index(idx));
                }
                _ => break,
            }
        }
        Ok(path)
    }

    fn parse_path_key(&mut self) -> Result<PathSegment, ExprError> {
        match self.advance().kind {
            TokenKind::Ident(s) => Ok(PathSegment::Key(s)),
            TokenKind::NameRef(s) => Ok(PathSegment::Key(format!("#{s}"))),
            other => Err(ExprError::UnexpectedToken {
                pos: self.peek().pos,
                found: format!("{other:?}"),
                expected: "attribute name",
            }),
        }
    }
}

#[cfg(test)]
#[path = "update_tests.rs"]
mod tests;
