//! AST node types for KidCode.
//!
//! The tree is built once by the parser and only read afterwards. Every
//! statement and expression carries the [`Span`] of its first token.

use crate::Span;
use std::fmt;

// ══════════════════════════════════════════════════════════════════════════════
// Top Level
// ══════════════════════════════════════════════════════════════════════════════

/// A parsed script: statements in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

/// A spanned identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Statements
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expression(ExpressionStmt),
    Set(SetStmt),
    Move(MoveStmt),
    Turn(TurnStmt),
    Say(SayStmt),
    Repeat(RepeatStmt),
    If(IfStmt),
    Pen(PenStmt),
    SetColor(SetColorStmt),
    FunctionDef(FunctionDef),
    FunctionCall(FunctionCall),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Expression(s) => s.span,
            Stmt::Set(s) => s.span,
            Stmt::Move(s) => s.span,
            Stmt::Turn(s) => s.span,
            Stmt::Say(s) => s.span,
            Stmt::Repeat(s) => s.span,
            Stmt::If(s) => s.span,
            Stmt::Pen(s) => s.span,
            Stmt::SetColor(s) => s.span,
            Stmt::FunctionDef(s) => s.span,
            Stmt::FunctionCall(s) => s.span,
        }
    }
}

/// A bare expression evaluated for its error side effect only.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStmt {
    pub expr: Expr,
    pub span: Span,
}

/// `set name = value`
#[derive(Debug, Clone, PartialEq)]
pub struct SetStmt {
    pub name: Ident,
    pub value: Expr,
    pub span: Span,
}

/// `move forward steps`
#[derive(Debug, Clone, PartialEq)]
pub struct MoveStmt {
    pub steps: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnDirection {
    Left,
    Right,
}

/// `turn left|right degrees`
#[derive(Debug, Clone, PartialEq)]
pub struct TurnStmt {
    pub direction: TurnDirection,
    pub degrees: Expr,
    pub span: Span,
}

/// `say message`
#[derive(Debug, Clone, PartialEq)]
pub struct SayStmt {
    pub message: Expr,
    pub span: Span,
}

/// `repeat times ... end [repeat]`
#[derive(Debug, Clone, PartialEq)]
pub struct RepeatStmt {
    pub times: Expr,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// `if condition ... [else ...] end [if]`
#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub consequence: Vec<Stmt>,
    pub alternative: Option<Vec<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PenState {
    Up,
    Down,
}

/// `pen up|down`
#[derive(Debug, Clone, PartialEq)]
pub struct PenStmt {
    pub state: PenState,
    pub span: Span,
}

/// `color name`
#[derive(Debug, Clone, PartialEq)]
pub struct SetColorStmt {
    pub color: Expr,
    pub span: Span,
}

/// `define name param... body end [define]`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: Ident,
    pub params: Vec<Ident>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// `name arg...`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: Ident,
    pub args: Vec<Expr>,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Left-leaning operator chains can be hundreds of thousands of nodes deep,
/// so children are detached onto a worklist instead of dropped recursively.
impl Drop for Expr {
    fn drop(&mut self) {
        let mut pending: Vec<Expr> = Vec::new();
        let mut kind = std::mem::replace(&mut self.kind, ExprKind::IntegerLit(0));
        loop {
            match kind {
                ExprKind::Infix { left, right, .. } => {
                    pending.push(*left);
                    pending.push(*right);
                }
                ExprKind::Index { collection, index } => {
                    pending.push(*collection);
                    pending.push(*index);
                }
                ExprKind::ListLit(items) => pending.extend(items),
                ExprKind::Identifier(_) | ExprKind::IntegerLit(_) | ExprKind::StringLit(_) => {}
            }
            match pending.pop() {
                Some(mut next) => {
                    kind = std::mem::replace(&mut next.kind, ExprKind::IntegerLit(0));
                }
                None => break,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Identifier(String),
    IntegerLit(i64),
    StringLit(String),
    Infix {
        left: Box<Expr>,
        op: InfixOp,
        right: Box<Expr>,
    },
    ListLit(Vec<Expr>),
    Index {
        collection: Box<Expr>,
        index: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    NotEq,
    Less,
    Greater,
}

impl InfixOp {
    pub fn symbol(self) -> &'static str {
        match self {
            InfixOp::Add => "+",
            InfixOp::Sub => "-",
            InfixOp::Mul => "*",
            InfixOp::Div => "/",
            InfixOp::Eq => "==",
            InfixOp::NotEq => "!=",
            InfixOp::Less => "<",
            InfixOp::Greater => ">",
        }
    }
}

impl fmt::Display for InfixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
