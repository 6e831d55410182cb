//! KidCode tree-walking evaluator.
//!
//! Walks a parsed [`Program`](kidcode_types::ast::Program) and writes the
//! resulting [`Event`](kidcode_types::Event)s into an [`EventSink`]. Runtime
//! errors become `Error` events and execution continues with the next
//! statement; only the instruction ceiling and cancellation end a run early.

pub mod config;
pub mod env;
pub mod error;
pub mod evaluator;
pub mod sink;
pub mod value;

pub use config::EvalConfig;
pub use env::{Environment, World, PALETTE};
pub use error::{EvalResult, Halt, RuntimeError};
pub use evaluator::{evaluate, Evaluator};
pub use sink::{from_fn, EventSink, FnSink};
pub use value::Value;
