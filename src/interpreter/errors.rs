//! Error types for the snippet interpreter
//!
//! Inside the evaluator every abrupt completion is an [`Abrupt`]:
//! - [`Abrupt::Throw`] carries a script value and can be caught by `try/catch`
//! - [`Abrupt::Halt`] is a resource interrupt that nothing in the script can catch
//!
//! At the interpreter boundary these collapse into a [`RunError`], together
//! with syntax errors from the parser.

use std::fmt;

use thiserror::Error;

use crate::memory::value::Value;
use crate::parser::ast::SourceLocation;
use crate::parser::ParseError;

/// Built-in error constructors, in the order their prototypes are created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Error,
    TypeError,
    RangeError,
    ReferenceError,
    SyntaxError,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 5] = [
        ErrorKind::Error,
        ErrorKind::TypeError,
        ErrorKind::RangeError,
        ErrorKind::ReferenceError,
        ErrorKind::SyntaxError,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Error => "Error",
            ErrorKind::TypeError => "TypeError",
            ErrorKind::RangeError => "RangeError",
            ErrorKind::ReferenceError => "ReferenceError",
            ErrorKind::SyntaxError => "SyntaxError",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

/// Resource interrupts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Halt {
    StepLimit,
}

impl fmt::Display for Halt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Halt::StepLimit => write!(f, "execution step limit exceeded"),
        }
    }
}

/// Abrupt completion of an evaluation step
#[derive(Debug, Clone, PartialEq)]
pub enum Abrupt {
    Throw(Value),
    Halt(Halt),
}

/// Result of evaluating anything that may throw
pub type Eval<T> = Result<T, Abrupt>;

/// Why a run did not complete
#[derive(Debug, Clone, Error)]
pub enum RunError {
    #[error("SyntaxError: {0}")]
    Syntax(#[from] ParseError),

    /// A value was thrown and never caught
    #[error("Uncaught {summary} (line {}, column {})", location.line, location.column)]
    Uncaught {
        /// `message` of a thrown error object, `String(value)` otherwise
        message: String,
        /// `Name: message` form used for logs
        summary: String,
        location: SourceLocation,
    },

    #[error("{0}")]
    Halted(Halt),
}

impl RunError {
    /// Message text shown to the user
    pub fn message(&self) -> String {
        match self {
            RunError::Syntax(err) => err.to_string(),
            RunError::Uncaught { message, .. } => message.clone(),
            RunError::Halted(halt) => halt.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_error_messages() {
        let err = RunError::Uncaught {
            message: "boom".to_string(),
            summary: "Error: boom".to_string(),
            location: SourceLocation::new(1, 1),
        };
        assert_eq!(err.message(), "boom");
        assert_eq!(err.to_string(), "Uncaught Error: boom (line 1, column 1)");

        let halted = RunError::Halted(Halt::StepLimit);
        assert_eq!(halted.message(), "execution step limit exceeded");
    }

    #[test]
    fn test_error_kind_names() {
        for kind in ErrorKind::ALL {
            assert_eq!(ErrorKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(ErrorKind::ALL[ErrorKind::RangeError.index()], ErrorKind::RangeError);
    }
}
