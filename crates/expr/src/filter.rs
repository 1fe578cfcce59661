// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recursive-descent parser for the filter/key-condition grammar
//! (spec.md §4.4.2). Both dialects share this parser; [`crate::keycond`]
//! additionally validates the restricted shape a key condition must have.

use lc_core::AttributeValue;

use crate::ast::{CmpOp, Expr, FunctionCall, FunctionName, Operand, Path, PathSegment};
use crate::error::ExprError;
use crate::lexer::{lex, Token, TokenKind};

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

/// Parse a full filter (or key-condition) expression. Fails if trailing
/// tokens remain after a complete expression was parsed.
pub fn parse_filter(src: &str) -> Result<Expr, ExprError> {
    let mut parser = Parser { tokens: lex(src), pos: 0 };
    let expr = parser.parse_expr()?;
    match parser.peek().kind.clone() {
        TokenKind::Eof => Ok(expr),
        other => Err(ExprError::TrailingInput(format!("{other:?}"))),
    }
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

    fn parse_expr(&mut self) -> Result<Expr, ExprError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_and()?;
        while self.ident_is("OR") {
            self.advance();
            let rhs = self.parse_and()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_not()?;
        while self.ident_is("AND") {
            self.advance();
            let rhs = self.parse_not()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_not(&mut self) -> Result<Expr, ExprError> {
        if self.ident_is("NOT") {
            self.advance();
            let inner = self.parse_not()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, ExprError> {
        if matches!(self.peek().kind, TokenKind::LParen) {
            self.advance();
            let inner = self.parse_expr()?;
            self.expect(&TokenKind::RParen, ")")?;
            return Ok(inner);
        }

        let operand = self.parse_operand()?;

        if self.ident_is("BETWEEN") {
            self.advance();
            let low = self.parse_operand()?;
            if !self.ident_is("AND") {
                return Err(ExprError::UnexpectedToken {
                    pos: self.peek().pos,
                    found: format!("{:?}", self.peek().kind),
                    expected: "AND",
                });
            }
            self.advance();
            let high = self.parse_operand()?;
            return Ok(Expr::Between { operand, low, high });
        }

        if self.ident_is("IN") {
            self.advance();
            self.expect(&TokenKind::LParen, "(")?;
            let mut list = vec![self.parse_operand()?];
            while matches!(self.peek().kind, TokenKind::Comma) {
                self.advance();
                list.push(self.parse_operand()?);
            }
            self.expect(&TokenKind::RParen, ")")?;
            return Ok(Expr::In { operand, list });
        }

        if let Some(op) = cmp_op_at(&self.peek().kind) {
            self.advance();
            let rhs = self.parse_operand()?;
            return Ok(Expr::Compare { op, l: operand, r: rhs });
        }

        match operand {
            Operand::Function(call) => Ok(Expr::Predicate(call)),
            _ => Err(ExprError::UnexpectedToken {
                pos: self.peek().pos,
                found: format!("{:?}", self.peek().kind),
                expected: "comparison operator, BETWEEN, or IN (a bare non-function operand is not a valid predicate)",
            }),
        }
    }

    fn parse_operand(&mut self) -> Result<Operand, ExprError> {
        match self.peek().kind.clone() {
            TokenKind::ValueRef(name) => {
                self.advance();
                Ok(Operand::ValueRef(name))
            }
            TokenKind::Number(n) => {
                self.advance();
                Ok(Operand::Literal(AttributeValue::N(n)))
            }
            TokenKind::NameRef(_) => Ok(Operand::Path(self.parse_path()?)),
            TokenKind::Ident(word) => {
                if let Some(name) = function_name(&word) {
                    if matches!(self.tokens.get(self.pos + 1).map(|t| &t.kind), Some(TokenKind::LParen)) {
                        self.advance();
                        return Ok(Operand::Function(self.parse_call(name)?));
                    }
                }
                Ok(Operand::Path(self.parse_path()?))
            }
            TokenKind::Eof => Err(ExprError::UnexpectedEof { expected: "operand" }),
            other => Err(ExprError::UnexpectedToken {
                pos: self.peek().pos,
                found: format!("{other:?}"),
                expected: "operand",
            }),
        }
    }

    fn parse_call(&mut self, name: FunctionName) -> Result<FunctionCall, ExprError> {
        self.expect(&TokenKind::LParen, "(")?;
        let mut args = vec![self.parse_operand()?];
        while matches!(self.peek().kind, TokenKind::Comma) {
            self.advance();
            args.push(self.parse_operand()?);
        }
        self.expect(&TokenKind::RParen, ")")?;
        Ok(FunctionCall { name, args })
    }

    /// Parses a dotted path with optional bracket indices:
    /// `#name.nested[0].leaf` or `plainAttr[2]`.
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

fn cmp_op_at(kind: &TokenKind) -> Option<CmpOp> {
    match kind {
        TokenKind::Eq => Some(CmpOp::Eq),
        TokenKind::Ne => Some(CmpOp::Ne),
        TokenKind::Lt => Some(CmpOp::Lt),
        TokenKind::Gt => Some(CmpOp::Gt),
        TokenKind::Le => Some(CmpOp::Le),
        TokenKind::Ge => Some(CmpOp::Ge),
        _ => None,
    }
}

fn function_name(word: &str) -> Option<FunctionName> {
    match word.to_ascii_lowercase().as_str() {
        "attribute_exists" => Some(FunctionName::AttributeExists),
        "attribute_not_exists" => Some(FunctionName::AttributeNotExists),
        "begins_with" => Some(FunctionName::BeginsWith),
        "contains" => Some(FunctionName::Contains),
        "size" => Some(FunctionName::Size),
        _ => None,
    }
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;
