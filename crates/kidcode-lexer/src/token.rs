//! Token types for the KidCode lexer.
//!
//! A [`Token`] pairs a [`TokenKind`] with the literal text it was read from
//! and the source [`Span`] of its first character.

use kidcode_types::Span;
use std::fmt;

/// Every reserved word. Matching is case-insensitive: `MOVE`, `Move` and
/// `move` are all the same keyword.
pub const KEYWORDS: &[&str] = &[
    "move", "forward", "turn", "left", "right", "say", "repeat", "end", "set", "if", "else",
    "pen", "up", "down", "color", "define",
];

// ─────────────────────────────────────────────────────────────────────
// Token
// ─────────────────────────────────────────────────────────────────────

/// A single token produced by the lexer. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// The exact source text. String literals hold their contents without quotes.
    pub literal: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            literal: literal.into(),
            span,
        }
    }

    pub fn line(&self) -> u32 {
        self.span.line
    }
}

// ─────────────────────────────────────────────────────────────────────
// TokenKind
// ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // ── Keywords ─────────────────────────────────────────────
    Move,
    Forward,
    Turn,
    Left,
    Right,
    Say,
    Repeat,
    End,
    Set,
    If,
    Else,
    Pen,
    Up,
    Down,
    Color,
    Define,

    // ── Literals ─────────────────────────────────────────────
    Number,
    String,
    Identifier,

    // ── Operators & punctuation ──────────────────────────────
    /// `=`
    Assign,
    /// `==`
    EqEq,
    /// `!=`
    BangEq,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `,`
    Comma,
    /// `<`
    Less,
    /// `>`
    Greater,

    // ── Special ──────────────────────────────────────────────
    /// A character the language does not know.
    Illegal,
    Eof,
}

impl TokenKind {
    /// Look up a reserved word. The caller lowercases first.
    pub fn from_keyword(s: &str) -> Option<TokenKind> {
        Some(match s {
            "move" => TokenKind::Move,
            "forward" => TokenKind::Forward,
            "turn" => TokenKind::Turn,
            "left" => TokenKind::Left,
            "right" => TokenKind::Right,
            "say" => TokenKind::Say,
            "repeat" => TokenKind::Repeat,
            "end" => TokenKind::End,
            "set" => TokenKind::Set,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "pen" => TokenKind::Pen,
            "up" => TokenKind::Up,
            "down" => TokenKind::Down,
            "color" => TokenKind::Color,
            "define" => TokenKind::Define,
            _ => return None,
        })
    }

    /// Tokens that open a statement of their own.
    pub fn starts_statement(self) -> bool {
        matches!(
            self,
            TokenKind::Move
                | TokenKind::Turn
                | TokenKind::Say
                | TokenKind::Repeat
                | TokenKind::Set
                | TokenKind::If
                | TokenKind::Pen
                | TokenKind::Color
                | TokenKind::Define
        )
    }

    /// Tokens with a prefix parselet.
    pub fn starts_expression(self) -> bool {
        matches!(
            self,
            TokenKind::Number
                | TokenKind::Identifier
                | TokenKind::String
                | TokenKind::LParen
                | TokenKind::LBracket
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Move => "move",
            TokenKind::Forward => "forward",
            TokenKind::Turn => "turn",
            TokenKind::Left => "left",
            TokenKind::Right => "right",
            TokenKind::Say => "say",
            TokenKind::Repeat => "repeat",
            TokenKind::End => "end",
            TokenKind::Set => "set",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::Pen => "pen",
            TokenKind::Up => "up",
            TokenKind::Down => "down",
            TokenKind::Color => "color",
            TokenKind::Define => "define",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Identifier => "identifier",
            TokenKind::Assign => "=",
            TokenKind::EqEq => "==",
            TokenKind::BangEq => "!=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Comma => ",",
            TokenKind::Less => "<",
            TokenKind::Greater => ">",
            TokenKind::Illegal => "illegal character",
            TokenKind::Eof => "end of input",
        };
        f.write_str(s)
    }
}
