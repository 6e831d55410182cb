//! Core KidCode lexer: converts source text to a token stream.
//!
//! - Keywords are matched case-insensitively against [`KEYWORDS`](crate::KEYWORDS)
//! - `#` comments run to end of line
//! - Newlines only advance the line counter; statements are not newline-terminated
//! - No escape sequences in strings; an unterminated string reads to end of input
//! - Unknown characters become [`TokenKind::Illegal`]: the lexer itself never fails

use kidcode_types::Span;

use crate::token::{Token, TokenKind};

/// The KidCode lexer.
pub struct Lexer<'src> {
    source: &'src str,
    /// Current byte offset into `source`.
    pos: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based, in characters).
    col: u32,
}

/// Tokenize `source` in one call. The result always ends with one `Eof` token.
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize()
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    /// Lex the entire source into a token stream ending with `Eof`.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                return tokens;
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn current_span(&self) -> Span {
        Span::new(self.line, self.col)
    }

    /// Consume characters while `pred` holds and return the consumed slice.
    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'src str {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.advance();
        }
        &self.source[start..self.pos]
    }

    // ─────────────────────────────────────────────────────────────
    // Whitespace & comments
    // ─────────────────────────────────────────────────────────────

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(' ' | '\t' | '\r' | '\n') => {
                    self.advance();
                }
                Some('#') => {
                    self.take_while(|c| c != '\n');
                }
                _ => return,
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Scanning
    // ─────────────────────────────────────────────────────────────

    /// Scan the next token.
    pub fn next_token(&mut self) -> Token {
        self.skip_trivia();
        let span = self.current_span();
        let Some(ch) = self.advance() else {
            return Token::new(TokenKind::Eof, "", span);
        };

        let single = |kind: TokenKind| Token::new(kind, ch.to_string(), span);
        match ch {
            '=' if self.peek() == Some('=') => {
                self.advance();
                Token::new(TokenKind::EqEq, "==", span)
            }
            '!' if self.peek() == Some('=') => {
                self.advance();
                Token::new(TokenKind::BangEq, "!=", span)
            }
            '=' => single(TokenKind::Assign),
            '+' => single(TokenKind::Plus),
            '-' => single(TokenKind::Minus),
            '*' => single(TokenKind::Star),
            '/' => single(TokenKind::Slash),
            '(' => single(TokenKind::LParen),
            ')' => single(TokenKind::RParen),
            '[' => single(TokenKind::LBracket),
            ']' => single(TokenKind::RBracket),
            ',' => single(TokenKind::Comma),
            '<' => single(TokenKind::Less),
            '>' => single(TokenKind::Greater),
            '"' => self.scan_string(span),
            c if c.is_ascii_alphabetic() || c == '_' => self.scan_word(span),
            c if c.is_ascii_digit() => self.scan_number(span),
            _ => single(TokenKind::Illegal),
        }
    }

    /// The opening quote is already consumed.
    fn scan_string(&mut self, span: Span) -> Token {
        let text = self.take_while(|c| c != '"');
        // Closing quote, if the string was terminated at all.
        self.advance();
        Token::new(TokenKind::String, text, span)
    }

    /// The first character is already consumed.
    fn scan_word(&mut self, span: Span) -> Token {
        let start = self.pos - 1;
        self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
        let word = &self.source[start..self.pos];
        let kind = TokenKind::from_keyword(&word.to_ascii_lowercase())
            .unwrap_or(TokenKind::Identifier);
        Token::new(kind, word, span)
    }

    /// The first digit is already consumed.
    fn scan_number(&mut self, span: Span) -> Token {
        let start = self.pos - 1;
        self.take_while(|c| c.is_ascii_digit());
        Token::new(TokenKind::Number, &self.source[start..self.pos], span)
    }
}
