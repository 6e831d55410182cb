//! Core parser infrastructure: token cursor, error reporting, recovery.

use kidcode_lexer::{Token, TokenKind};
use kidcode_types::ast::Program;
use kidcode_types::{Diagnostics, ErrorCode, SourceFile, Span, SyntaxError};

/// The KidCode parser.
///
/// Consumes the lexer's token stream and builds a [`Program`]. Errors are
/// accumulated: after each one the parser skips to the next plausible
/// statement boundary and keeps going, so one pass reports every mistake.
pub struct Parser<'src> {
    /// The token stream, guaranteed to end with `Eof`.
    tokens: Vec<Token>,
    /// Current index into `tokens`.
    pos: usize,
    /// Source text, for the context line of each error.
    source_file: &'src SourceFile,
    errors: Diagnostics,
}

/// Result of parsing.
///
/// `program` holds whatever could be built; it must not be evaluated when
/// `errors` is non-empty.
#[derive(Debug)]
pub struct ParseResult {
    pub program: Program,
    pub errors: Diagnostics,
}

impl ParseResult {
    pub fn is_ok(&self) -> bool {
        !self.errors.has_errors()
    }

    /// The program, or every syntax error if there was at least one.
    pub fn into_result(self) -> Result<Program, Diagnostics> {
        if self.errors.has_errors() {
            Err(self.errors)
        } else {
            Ok(self.program)
        }
    }
}

/// Lex and parse `source` in one call.
pub fn parse(source: &str) -> ParseResult {
    let source_file = SourceFile::new(source);
    let tokens = kidcode_lexer::tokenize(source);
    Parser::new(tokens, &source_file).parse()
}

impl<'src> Parser<'src> {
    pub fn new(mut tokens: Vec<Token>, source_file: &'src SourceFile) -> Self {
        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            let span = tokens.last().map(|t| t.span).unwrap_or(Span::new(1, 1));
            tokens.push(Token::new(TokenKind::Eof, "", span));
        }
        Self {
            tokens,
            pos: 0,
            source_file,
            errors: Diagnostics::empty(),
        }
    }

    /// Parse the whole token stream.
    pub fn parse(mut self) -> ParseResult {
        let program = self.parse_program();
        if self.errors.has_errors() {
            tracing::debug!(errors = self.errors.total_errors, "parse finished with errors");
        }
        ParseResult {
            program,
            errors: self.errors,
        }
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    pub(crate) fn peek(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    pub(crate) fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    /// Advance the cursor by one and return the consumed token.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn previous(&self) -> Option<&Token> {
        self.pos.checked_sub(1).and_then(|i| self.tokens.get(i))
    }

    pub(crate) fn previous_span(&self) -> Span {
        self.previous()
            .map(|t| t.span)
            .unwrap_or_else(|| self.current_span())
    }

    pub(crate) fn current_span(&self) -> Span {
        self.peek().span
    }

    pub(crate) fn at_end(&self) -> bool {
        self.peek_kind() == TokenKind::Eof
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// If the current token matches, advance and return `true`.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Returns `true` if the current token is on the same line as `span`.
    pub(crate) fn on_line_of(&self, span: Span) -> bool {
        !self.at_end() && self.current_span().line == span.line
    }

    // ── Error Reporting ───────────────────────────────────────────────────────

    pub(crate) fn error_at(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let source_line = self
            .source_file
            .line(span.line)
            .unwrap_or("")
            .to_string();
        self.errors
            .push(SyntaxError::new(code, message, span, source_line));
    }

    pub(crate) fn error_at_current(&mut self, code: ErrorCode, message: impl Into<String>) {
        let span = self.current_span();
        self.error_at(code, message, span);
    }

    /// Report something missing after the previous token.
    ///
    /// When the line ends before the missing piece, the error belongs to the
    /// statement's line, not to whatever starts the next line.
    pub(crate) fn error_missing(&mut self, code: ErrorCode, message: impl Into<String>) {
        let current = self.current_span();
        let previous = self.previous_span();
        let span = if self.at_end() || previous.is_before_line_of(current) {
            previous
        } else {
            current
        };
        let mut message = message.into();
        if span == current {
            message = format!("{message}, found {}", describe(self.peek()));
        }
        self.error_at(code, message, span);
    }

    // ── Synchronization ───────────────────────────────────────────────────────

    /// Skip tokens until a plausible statement boundary: a statement keyword,
    /// `end`, `else`, end of input, or an identifier starting a later line.
    pub(crate) fn synchronize(&mut self) {
        let error_line = self.previous_span().line;
        while !self.at_end() {
            let token = self.peek();
            if token.kind.starts_statement()
                || matches!(token.kind, TokenKind::End | TokenKind::Else)
                || (token.kind == TokenKind::Identifier && token.line() > error_line)
            {
                return;
            }
            self.advance();
        }
    }
}

/// Human-readable description of a token for error messages.
pub(crate) fn describe(token: &Token) -> String {
    match token.kind {
        TokenKind::Eof => "end of input".to_string(),
        TokenKind::String => format!("\"{}\"", token.literal),
        _ => format!("'{}'", token.literal),
    }
}
