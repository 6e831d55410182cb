//! Observable effects of a run.
//!
//! The evaluator is the only producer. Renderers consume the events in
//! order: `Move` draws a segment when `pen_down` is set and always updates
//! the actor icon, `Say`/`Error` go to the console.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum Event {
    #[serde(rename = "ClearEvent")]
    Clear,
    #[serde(rename = "MoveEvent")]
    Move {
        from_x: i64,
        from_y: i64,
        to_x: i64,
        to_y: i64,
        /// Heading in degrees, always in `[0, 360)`.
        #[serde(rename = "newDirection")]
        direction: i64,
        #[serde(rename = "isPenDown")]
        pen_down: bool,
        color: String,
    },
    #[serde(rename = "SayEvent")]
    Say { message: String },
    #[serde(rename = "ErrorEvent")]
    Error {
        #[serde(rename = "errorMessage")]
        message: String,
    },
}

impl Event {
    pub fn say(message: impl Into<String>) -> Self {
        Event::Say {
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Event::Error {
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Event::Error { .. })
    }
}
