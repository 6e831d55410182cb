//! Statement parsing.
//!
//! Dispatch is on the first token of each statement. Blocks run until
//! `end`, `else` or end of input and close with `end [keyword]`.

use crate::parse_expr::Precedence;
use crate::parser::{describe, Parser};
use kidcode_lexer::TokenKind;
use kidcode_stack::ensure_sufficient_stack;
use kidcode_types::ast::*;
use kidcode_types::ErrorCode;

impl<'src> Parser<'src> {
    /// Parse statements until end of input.
    pub(crate) fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();
        while !self.at_end() {
            if matches!(self.peek_kind(), TokenKind::End | TokenKind::Else) {
                let token = self.advance();
                self.error_at(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("Unexpected '{}' without a matching block", token.literal),
                    token.span,
                );
                self.synchronize();
                continue;
            }
            match self.parse_statement() {
                Some(stmt) => statements.push(stmt),
                None => self.synchronize(),
            }
        }
        Program { statements }
    }

    /// Parse statements until `end`, `else` or end of input. The terminator
    /// is left for the caller.
    pub(crate) fn parse_block(&mut self) -> Vec<Stmt> {
        let mut stmts = Vec::new();
        while !self.at_end() && !matches!(self.peek_kind(), TokenKind::End | TokenKind::Else) {
            match self.parse_statement() {
                Some(stmt) => stmts.push(stmt),
                None => self.synchronize(),
            }
        }
        stmts
    }

    /// Parse a single statement. On failure the error is recorded, at least
    /// one token has been consumed, and `None` is returned.
    pub(crate) fn parse_statement(&mut self) -> Option<Stmt> {
        ensure_sufficient_stack(|| match self.peek_kind() {
            TokenKind::Move => self.parse_move(),
            TokenKind::Turn => self.parse_turn(),
            TokenKind::Say => self.parse_say(),
            TokenKind::Repeat => self.parse_repeat(),
            TokenKind::Set => self.parse_set(),
            TokenKind::If => self.parse_if(),
            TokenKind::Pen => self.parse_pen(),
            TokenKind::Color => self.parse_color(),
            TokenKind::Define => self.parse_define(),
            TokenKind::Identifier => self.parse_call(),
            TokenKind::Illegal => {
                let token = self.advance();
                self.error_at(
                    ErrorCode::ILLEGAL_CHARACTER,
                    format!("Illegal character '{}'", token.literal),
                    token.span,
                );
                None
            }
            _ => {
                let token = self.advance();
                self.error_at(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("Unexpected {} at start of a statement", describe(&token)),
                    token.span,
                );
                None
            }
        })
    }

    /// `move forward <steps>`
    fn parse_move(&mut self) -> Option<Stmt> {
        let span = self.advance().span; // eat `move`
        if !self.eat(TokenKind::Forward) {
            self.error_missing(ErrorCode::INVALID_KEYWORD, "Expected 'forward' after 'move'");
            return None;
        }
        let steps = self.parse_expression(Precedence::Lowest)?;
        Some(Stmt::Move(MoveStmt { steps, span }))
    }

    /// `turn left|right <degrees>`
    fn parse_turn(&mut self) -> Option<Stmt> {
        let span = self.advance().span; // eat `turn`
        let direction = match self.peek_kind() {
            TokenKind::Left => TurnDirection::Left,
            TokenKind::Right => TurnDirection::Right,
            _ => {
                self.error_missing(
                    ErrorCode::INVALID_KEYWORD,
                    "Expected 'left' or 'right' after 'turn'",
                );
                return None;
            }
        };
        self.advance();
        let degrees = self.parse_expression(Precedence::Lowest)?;
        Some(Stmt::Turn(TurnStmt {
            direction,
            degrees,
            span,
        }))
    }

    /// `say <message>`
    fn parse_say(&mut self) -> Option<Stmt> {
        let span = self.advance().span; // eat `say`
        let message = self.parse_expression(Precedence::Lowest)?;
        Some(Stmt::Say(SayStmt { message, span }))
    }

    /// `repeat <times> ... end [repeat]`
    fn parse_repeat(&mut self) -> Option<Stmt> {
        let span = self.advance().span; // eat `repeat`
        // A bad count still owns its block, so the body and `end` are
        // consumed here rather than reported again as stray statements.
        let times = self.parse_expression(Precedence::Lowest);
        if times.is_none() {
            self.synchronize();
        }
        let body = self.parse_block();
        self.expect_block_end(TokenKind::Repeat)?;
        Some(Stmt::Repeat(RepeatStmt {
            times: times?,
            body,
            span,
        }))
    }

    /// `set <name> = <value>`
    fn parse_set(&mut self) -> Option<Stmt> {
        let span = self.advance().span; // eat `set`
        if !self.check(TokenKind::Identifier) {
            self.error_missing(ErrorCode::UNEXPECTED_TOKEN, "Expected variable name after 'set'");
            return None;
        }
        let token = self.advance();
        let name = Ident::new(token.literal, token.span);
        if !self.eat(TokenKind::Assign) {
            self.error_missing(ErrorCode::UNEXPECTED_TOKEN, "Expected '=' after variable name");
            return None;
        }
        let value = self.parse_expression(Precedence::Lowest)?;
        Some(Stmt::Set(SetStmt { name, value, span }))
    }

    /// `if <condition> ... [else ...] end [if]`
    fn parse_if(&mut self) -> Option<Stmt> {
        let span = self.advance().span; // eat `if`
        let condition = self.parse_expression(Precedence::Lowest);
        if condition.is_none() {
            self.synchronize();
        }
        let consequence = self.parse_block();
        let alternative = if self.eat(TokenKind::Else) {
            Some(self.parse_block())
        } else {
            None
        };
        self.expect_block_end(TokenKind::If)?;
        Some(Stmt::If(IfStmt {
            condition: condition?,
            consequence,
            alternative,
            span,
        }))
    }

    /// `pen up|down`
    fn parse_pen(&mut self) -> Option<Stmt> {
        let span = self.advance().span; // eat `pen`
        let state = match self.peek_kind() {
            TokenKind::Up => PenState::Up,
            TokenKind::Down => PenState::Down,
            _ => {
                self.error_missing(ErrorCode::INVALID_KEYWORD, "Expected 'up' or 'down' after 'pen'");
                return None;
            }
        };
        self.advance();
        Some(Stmt::Pen(PenStmt { state, span }))
    }

    /// `color <name>`
    fn parse_color(&mut self) -> Option<Stmt> {
        let span = self.advance().span; // eat `color`
        let color = self.parse_expression(Precedence::Lowest)?;
        Some(Stmt::SetColor(SetColorStmt { color, span }))
    }

    /// `define <name> <param>... ... end [define]`
    ///
    /// Parameters are the bare identifiers on the same line as the name.
    fn parse_define(&mut self) -> Option<Stmt> {
        let span = self.advance().span; // eat `define`
        let name = if self.check(TokenKind::Identifier) {
            let token = self.advance();
            Some(Ident::new(token.literal, token.span))
        } else {
            self.error_missing(
                ErrorCode::UNEXPECTED_TOKEN,
                "Expected function name after 'define'",
            );
            self.synchronize();
            None
        };
        let mut params: Vec<Ident> = Vec::new();
        if let Some(name) = &name {
            while self.check(TokenKind::Identifier) && self.on_line_of(name.span) {
                let token = self.advance();
                if params.iter().any(|p| p.name == token.literal) {
                    self.error_at(
                        ErrorCode::UNEXPECTED_TOKEN,
                        format!(
                            "Duplicate parameter '{}' in function '{}'",
                            token.literal, name.name
                        ),
                        token.span,
                    );
                }
                params.push(Ident::new(token.literal, token.span));
            }
        }
        let body = self.parse_block();
        self.expect_block_end(TokenKind::Define)?;
        Some(Stmt::FunctionDef(FunctionDef {
            name: name?,
            params,
            body,
            span,
        }))
    }

    /// `<name> <arg>...`
    ///
    /// Every argument has to begin on the same line as the function name.
    fn parse_call(&mut self) -> Option<Stmt> {
        let token = self.advance();
        let name = Ident::new(token.literal, token.span);
        let mut args = Vec::new();
        while self.peek_kind().starts_expression() && self.on_line_of(name.span) {
            args.push(self.parse_expression(Precedence::Lowest)?);
        }
        Some(Stmt::FunctionCall(FunctionCall {
            span: name.span,
            name,
            args,
        }))
    }

    /// Consume `end`, plus the reopening keyword if it follows on the same line.
    fn expect_block_end(&mut self, opener: TokenKind) -> Option<()> {
        if !self.check(TokenKind::End) {
            let message = format!("Expected 'end' to close '{opener}' block");
            if self.at_end() {
                self.error_missing(ErrorCode::MISSING_END, message);
            } else {
                let found = describe(self.peek());
                self.error_at_current(ErrorCode::MISSING_END, format!("{message}, found {found}"));
            }
            return None;
        }
        let end = self.advance();
        let closer = self.peek_kind();
        if matches!(closer, TokenKind::If | TokenKind::Repeat | TokenKind::Define)
            && self.on_line_of(end.span)
        {
            let token = self.advance();
            if closer != opener {
                self.error_at(
                    ErrorCode::MISMATCHED_END,
                    format!("Expected 'end {opener}' but found 'end {}'", token.literal),
                    token.span,
                );
            }
        }
        Some(())
    }
}
