use kidcode_eval::{EvalConfig, Environment, EventSink, Evaluator};
use kidcode_parser::parse;
use kidcode_types::{Event, SyntaxError};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One syntax error as reported by [`Engine::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub message: String,
    pub line_number: u32,
}

impl From<&SyntaxError> for ValidationError {
    fn from(err: &SyntaxError) -> Self {
        Self {
            message: err.message.clone(),
            line_number: err.line(),
        }
    }
}

/// Requests cancellation of whatever run the owning [`Engine`] is doing.
///
/// Cheap to clone and safe to move to another thread.
#[derive(Debug, Clone)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn request_stop(&self) {
        self.0.store(true, Ordering::Release);
    }
}

/// Lexes, parses and evaluates KidCode scripts.
///
/// Each run gets a fresh [`Environment`]; only the stop flag is shared, and
/// it is cleared at the start of every run.
#[derive(Debug, Default)]
pub struct Engine {
    config: EvalConfig,
    stop: Arc<AtomicBool>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EvalConfig) -> Self {
        Self {
            config,
            stop: Arc::default(),
        }
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Run `source` and collect its events.
    ///
    /// A script with syntax errors is not run: the result is one `Error`
    /// event per syntax error.
    pub fn execute(&self, source: &str) -> Vec<Event> {
        let mut events = Vec::new();
        self.execute_streaming(source, &mut events);
        events
    }

    /// Run `source`, handing each event to `sink` as soon as it exists.
    pub fn execute_streaming<S: EventSink>(&self, source: &str, mut sink: S) {
        self.stop.store(false, Ordering::Release);

        let result = parse(source);
        if result.errors.has_errors() {
            tracing::debug!(errors = result.errors.total_errors, "script rejected");
            for err in result.errors.iter() {
                sink.emit(Event::error(err.to_string()));
            }
            return;
        }

        let env = Environment::new(&self.config);
        Evaluator::new(env, self.config.clone(), &self.stop, sink).run(&result.program);
    }

    /// Ask the current (or next) run to stop at its next statement.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(Arc::clone(&self.stop))
    }

    /// Syntax errors in `source`, in source order. Never runs the script.
    pub fn validate(&self, source: &str) -> Vec<ValidationError> {
        parse(source)
            .errors
            .iter()
            .map(ValidationError::from)
            .collect()
    }
}
