//! KidCode engine.
//!
//! The entry point front ends talk to: [`Engine::execute`] runs a script and
//! returns its events, [`Engine::request_stop`] cancels a running script,
//! and [`Engine::validate`] reports syntax errors without running anything.

mod engine;

pub use engine::{Engine, StopHandle, ValidationError};
pub use kidcode_eval::{from_fn, EvalConfig, EventSink};
pub use kidcode_types::Event;
