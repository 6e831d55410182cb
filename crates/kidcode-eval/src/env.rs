//! Runtime state: the actor's world and the variable scope stack.

use crate::config::EvalConfig;
use crate::error::RuntimeError;
use crate::value::Value;
use kidcode_types::Event;
use std::collections::BTreeMap;

/// Named colors accepted by `color`, lowercase.
pub const PALETTE: [&str; 12] = [
    "red", "green", "blue", "yellow", "orange", "purple", "black", "white", "cyan", "magenta",
    "pink", "brown",
];

/// Pose and pen of the actor. Shared by every scope of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct World {
    pub x: i64,
    pub y: i64,
    /// Heading in degrees, always in `[0, 360)`. 0 points up the canvas.
    pub direction: i64,
    pub pen_down: bool,
    pub color: String,
}

impl World {
    pub fn new(config: &EvalConfig) -> Self {
        Self {
            x: config.start_x,
            y: config.start_y,
            direction: config.start_direction.rem_euclid(360),
            pen_down: config.pen_down,
            color: config.default_color.to_lowercase(),
        }
    }

    /// Move `steps` along the current heading, truncating to whole pixels.
    pub fn advance(&mut self, steps: i64) {
        let radians = (self.direction as f64).to_radians();
        let dx = (steps as f64 * radians.sin()) as i64;
        let dy = (steps as f64 * radians.cos()) as i64;
        self.x = self.x.saturating_add(dx);
        self.y = self.y.saturating_sub(dy);
    }

    /// Rotate clockwise by `degrees` (negative turns anticlockwise).
    pub fn turn(&mut self, degrees: i64) {
        self.direction = (self.direction + degrees.rem_euclid(360)).rem_euclid(360);
    }

    /// Switch the pen color. Names are matched case-insensitively.
    pub fn set_color(&mut self, name: &str) -> Result<(), RuntimeError> {
        let lower = name.to_lowercase();
        if PALETTE.contains(&lower.as_str()) {
            self.color = lower;
            Ok(())
        } else {
            Err(RuntimeError::UnknownColor(name.to_string()))
        }
    }

    /// A `Move` event from `(from_x, from_y)` to the current pose.
    pub fn move_event(&self, from_x: i64, from_y: i64) -> Event {
        Event::Move {
            from_x,
            from_y,
            to_x: self.x,
            to_y: self.y,
            direction: self.direction,
            pen_down: self.pen_down,
            color: self.color.clone(),
        }
    }

    /// A `Move` event that stays in place, reporting heading and pen.
    pub fn snapshot(&self) -> Event {
        self.move_event(self.x, self.y)
    }
}

/// A single scope level.
#[derive(Debug, Clone, Default)]
struct Scope {
    bindings: BTreeMap<String, Value>,
}

/// World state plus a stack of variable frames.
///
/// The bottom frame is the global scope; each function call pushes one
/// frame. Variables are looked up from innermost frame outward and `set`
/// always writes the innermost frame.
#[derive(Debug, Clone)]
pub struct Environment {
    pub world: World,
    scopes: Vec<Scope>,
}

impl Environment {
    /// Fresh state with one global scope.
    pub fn new(config: &EvalConfig) -> Self {
        Self {
            world: World::new(config),
            scopes: vec![Scope::default()],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Pop the innermost scope. The global scope is never popped.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Number of frames above the global scope.
    pub fn call_depth(&self) -> usize {
        self.scopes.len() - 1
    }

    /// Bind `name` in the innermost scope.
    pub fn define(&mut self, name: &str, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.bindings.insert(name.to_string(), value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.bindings.get(name))
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(&EvalConfig::default())
    }
}
