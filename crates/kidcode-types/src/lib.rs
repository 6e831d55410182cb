//! Shared types for KidCode.
//!
//! This crate defines the source spans, syntax diagnostics, AST node types
//! and the event union used across every pipeline stage.

mod error;
mod span;
pub mod ast;
pub mod event;

pub use error::{Diagnostics, ErrorCode, SyntaxError, MAX_ERRORS};
pub use event::Event;
pub use span::{SourceFile, Span};
