//! Pratt expression parser.
//!
//! Precedence (lowest → highest):
//! 1. `==`, `!=`
//! 2. `<`, `>`
//! 3. `+`, `-`
//! 4. `*`, `/`
//! 5. `[` (index)
//!
//! All binary operators are left-associative. There are no prefix
//! operators: `-5` is not an expression, `0 - 5` is.

use crate::parser::{describe, Parser};
use kidcode_lexer::TokenKind;
use kidcode_stack::ensure_sufficient_stack;
use kidcode_types::ast::*;
use kidcode_types::ErrorCode;

/// Binding power of an infix token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Precedence {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
    Index,
}

impl Precedence {
    fn of(kind: TokenKind) -> Precedence {
        match kind {
            TokenKind::EqEq | TokenKind::BangEq => Precedence::Equals,
            TokenKind::Less | TokenKind::Greater => Precedence::LessGreater,
            TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
            TokenKind::Star | TokenKind::Slash => Precedence::Product,
            TokenKind::LBracket => Precedence::Index,
            _ => Precedence::Lowest,
        }
    }
}

fn infix_op(kind: TokenKind) -> Option<InfixOp> {
    Some(match kind {
        TokenKind::Plus => InfixOp::Add,
        TokenKind::Minus => InfixOp::Sub,
        TokenKind::Star => InfixOp::Mul,
        TokenKind::Slash => InfixOp::Div,
        TokenKind::EqEq => InfixOp::Eq,
        TokenKind::BangEq => InfixOp::NotEq,
        TokenKind::Less => InfixOp::Less,
        TokenKind::Greater => InfixOp::Greater,
        _ => return None,
    })
}

impl<'src> Parser<'src> {
    /// Parse an expression whose operators bind tighter than `precedence`.
    pub(crate) fn parse_expression(&mut self, precedence: Precedence) -> Option<Expr> {
        ensure_sufficient_stack(|| {
            let mut left = self.parse_prefix()?;
            while Precedence::of(self.peek_kind()) > precedence {
                left = if self.check(TokenKind::LBracket) {
                    self.parse_index(left)?
                } else {
                    self.parse_infix(left)?
                };
            }
            Some(left)
        })
    }

    // ── Prefix parselets ─────────────────────────────────────────────────

    fn parse_prefix(&mut self) -> Option<Expr> {
        let span = self.current_span();
        match self.peek_kind() {
            TokenKind::Identifier => {
                let token = self.advance();
                Some(Expr::new(ExprKind::Identifier(token.literal), span))
            }
            TokenKind::Number => {
                let token = self.advance();
                match token.literal.parse::<i64>() {
                    Ok(n) => Some(Expr::new(ExprKind::IntegerLit(n), span)),
                    Err(_) => {
                        self.error_at(
                            ErrorCode::INVALID_INTEGER,
                            format!("Could not parse '{}' as an integer", token.literal),
                            span,
                        );
                        None
                    }
                }
            }
            TokenKind::String => {
                let token = self.advance();
                Some(Expr::new(ExprKind::StringLit(token.literal), span))
            }
            TokenKind::LParen => self.parse_grouped(),
            TokenKind::LBracket => self.parse_list(),
            TokenKind::Illegal => {
                let literal = self.peek().literal.clone();
                self.error_at_current(
                    ErrorCode::ILLEGAL_CHARACTER,
                    format!("Illegal character '{literal}'"),
                );
                None
            }
            _ => {
                let after = self
                    .previous()
                    .map(describe)
                    .unwrap_or_else(|| "start of input".to_string());
                self.error_missing(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("Expected an expression after {after}"),
                );
                None
            }
        }
    }

    /// `( expr )`
    fn parse_grouped(&mut self) -> Option<Expr> {
        self.advance(); // eat `(`
        let expr = self.parse_expression(Precedence::Lowest)?;
        if !self.eat(TokenKind::RParen) {
            self.error_missing(ErrorCode::UNEXPECTED_TOKEN, "Expected ')' to close expression");
            return None;
        }
        Some(expr)
    }

    /// `[ expr, ... ]`, possibly empty.
    fn parse_list(&mut self) -> Option<Expr> {
        let span = self.advance().span; // eat `[`
        let mut elements = Vec::new();
        if self.eat(TokenKind::RBracket) {
            return Some(Expr::new(ExprKind::ListLit(elements), span));
        }
        loop {
            elements.push(self.parse_expression(Precedence::Lowest)?);
            if self.eat(TokenKind::Comma) {
                continue;
            }
            if self.eat(TokenKind::RBracket) {
                break;
            }
            self.error_missing(ErrorCode::UNEXPECTED_TOKEN, "Expected ',' or ']' in list");
            return None;
        }
        Some(Expr::new(ExprKind::ListLit(elements), span))
    }

    // ── Infix parselets ──────────────────────────────────────────────────

    fn parse_infix(&mut self, left: Expr) -> Option<Expr> {
        let token = self.advance();
        let Some(op) = infix_op(token.kind) else {
            self.error_at(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("Unexpected {} in expression", describe(&token)),
                token.span,
            );
            return None;
        };
        let right = self.parse_expression(Precedence::of(token.kind))?;
        let span = left.span;
        Some(Expr::new(
            ExprKind::Infix {
                left: Box::new(left),
                op,
                right: Box::new(right),
            },
            span,
        ))
    }

    /// `collection [ index ]`
    fn parse_index(&mut self, collection: Expr) -> Option<Expr> {
        self.advance(); // eat `[`
        let index = self.parse_expression(Precedence::Lowest)?;
        if !self.eat(TokenKind::RBracket) {
            self.error_missing(ErrorCode::UNEXPECTED_TOKEN, "Expected ']' after index");
            return None;
        }
        let span = collection.span;
        Some(Expr::new(
            ExprKind::Index {
                collection: Box::new(collection),
                index: Box::new(index),
            },
            span,
        ))
    }
}
