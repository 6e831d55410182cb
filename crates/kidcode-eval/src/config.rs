//! Evaluator settings.

use serde::{Deserialize, Serialize};

/// Limits and starting state for one run.
///
/// Every field has a default, so a partial JSON/TOML document is enough to
/// override one setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Statements allowed before the run times out. An empty `repeat` body
    /// counts one per iteration.
    pub instruction_limit: u64,
    /// Nested function calls allowed before a call fails.
    pub max_call_depth: usize,
    pub start_x: i64,
    pub start_y: i64,
    /// Starting heading in degrees; normalized into `[0, 360)`.
    pub start_direction: i64,
    pub pen_down: bool,
    pub default_color: String,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            instruction_limit: 1_000_000,
            max_call_depth: 10_000,
            start_x: 250,
            start_y: 250,
            start_direction: 0,
            pen_down: true,
            default_color: "blue".to_string(),
        }
    }
}
