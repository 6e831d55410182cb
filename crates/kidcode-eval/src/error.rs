//! Runtime error types for the KidCode evaluator.

use kidcode_types::ast::InfixOp;
use thiserror::Error;

/// A recoverable runtime error.
///
/// The statement that raised it is abandoned, its `Display` text becomes
/// one `Error` event, and execution continues with the next statement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("variable '{0}' not found")]
    UndefinedVariable(String),

    #[error("function '{0}' not defined")]
    UndefinedFunction(String),

    #[error("function '{name}' expects {expected} arguments, got {got}")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Cannot use '{0}' with a string")]
    StringOperator(InfixOp),

    #[error("Cannot use '{op}' with {left} and {right}")]
    TypeMismatch {
        op: InfixOp,
        left: &'static str,
        right: &'static str,
    },

    #[error("Number too large: {left} {op} {right}")]
    Overflow { op: InfixOp, left: i64, right: i64 },

    #[error("Cannot index into a {0}")]
    NotAList(&'static str),

    #[error("List index must be a number, got a {0}")]
    IndexNotInteger(&'static str),

    #[error("index {index} out of bounds for list of size {len}")]
    IndexOutOfBounds { index: i64, len: usize },

    #[error("'{command}' requires a number, got a {found}")]
    NotANumber {
        command: &'static str,
        found: &'static str,
    },

    #[error("Unknown color '{0}'")]
    UnknownColor(String),

    #[error("maximum call depth of {0} exceeded")]
    CallDepthExceeded(usize),
}

/// A condition that ends the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Halt {
    /// The instruction ceiling was exceeded. Reported as one `Error` event.
    #[error("Execution timed out! Possible infinite loop.")]
    Timeout,
    /// The stop flag was observed. Nothing more is emitted.
    #[error("execution stopped")]
    Cancelled,
}

/// Result alias for expression evaluation.
pub type EvalResult<T> = Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            RuntimeError::UndefinedVariable("y".into()).to_string(),
            "variable 'y' not found"
        );
        assert_eq!(
            RuntimeError::IndexOutOfBounds { index: 5, len: 2 }.to_string(),
            "index 5 out of bounds for list of size 2"
        );
        assert_eq!(
            RuntimeError::StringOperator(InfixOp::Mul).to_string(),
            "Cannot use '*' with a string"
        );
        assert_eq!(
            Halt::Timeout.to_string(),
            "Execution timed out! Possible infinite loop."
        );
    }
}
