//! Snippet execution engine
//!
//! This module provides the core execution logic:
//! - [`engine`]: Interpreter state, function calls, scopes and limits
//! - [`errors`]: Abrupt completions and the [`RunError`] reported to callers
//! - `statements` / `loops` / `jumps` / `expressions` / `ops`: evaluation, as
//!   `impl Interpreter` blocks
//! - `builtins` / `methods` / `json`: the global objects and prototype methods
//!
//! # Execution Model
//!
//! The interpreter walks the AST directly. Every statement and loop iteration
//! counts as one step; the value of the last expression statement executed at
//! program level becomes the run's trailing result.
//!
//! Each run starts from a fresh heap, scope arena and set of globals. The only
//! thing shared with the host is the [`Console`] handle used by `console.*`.

mod builtins;
mod coerce;
pub mod constants;
pub mod engine;
pub mod errors;
mod expressions;
mod json;
mod jumps;
mod loops;
mod methods;
mod ops;
mod statements;

pub use engine::{ExecutionLimits, Interpreter, Outcome};
pub use errors::{ErrorKind, Halt, RunError};

use crate::console::Console;
use crate::parser::parse_program;

/// Parse and run `source` in a fresh interpreter
pub fn run_source(source: &str, console: Console, limits: ExecutionLimits) -> Result<Outcome, RunError> {
    let program = parse_program(source)?;
    tracing::debug!(statements = program.body.len(), "parsed snippet");

    let mut interpreter = Interpreter::new(console, limits);
    interpreter.run(&program)
}
