//! # Introduction
//!
//! jsplay runs small JavaScript snippets in an embedded interpreter and shows
//! what they printed. Every `console.log` call made during a run is captured
//! line by line; a snippet that logs nothing shows the value of its last
//! expression instead, and a failing snippet shows its error message.
//!
//! ## Execution pipeline
//!
//! ```text
//! Source → Lexer → Parser → AST → Interpreter (console captured) → Outcome → Display
//! ```
//!
//! 1. [`parser`] — tokenises the source and builds an AST.
//! 2. [`interpreter`] — walks the AST with a fresh heap and set of globals
//!    per run, enforcing the call-depth and step limits.
//! 3. [`memory`] — the runtime model: [`memory::value::Value`]s, the object
//!    [`memory::heap::Heap`] and the lexical environment arena.
//! 4. [`console`] — the logging channel, its sinks, the capture guard and the
//!    argument formatter.
//! 5. [`session`] — [`session::SnippetSession`]: editable source, run, reset
//!    and the display state.
//! 6. [`ui`] — ratatui-based editor shell; not part of the stable library API.
//!
//! ## Supported JavaScript subset
//!
//! Declarations: `let`, `const`, `var`, function declarations and
//! expressions, arrow functions. Control flow: `if/else`, `while`,
//! `do-while`, `for`, `for-of`, `for-in`, `switch`,
//! `break`/`continue`, `return`, `throw`, `try/catch/finally`.
//! Expressions: template literals, spread, optional chaining, `??`,
//! compound assignment, `typeof`, `instanceof`, `in`, `new`.
//! Built-ins: `console`, `Math`, `JSON`, `Object`, `Array`, `String`,
//! `Number`, `Boolean`, the `Error` family, and the usual prototype methods.

pub mod cli;
pub mod console;
pub mod interpreter;
pub mod logging;
pub mod memory;
pub mod parser;
pub mod session;
pub mod ui;
