//! Snippet source parser
//!
//! This module transforms snippet source text into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: Parser state, helpers and entry points (tokens → AST)
//! - `statements` / `expressions`: the grammar, as `impl Parser` blocks
//! - [`ast`]: AST node definitions
//!
//! # Supported Language Subset
//!
//! The parser accepts the everyday scripting subset of JavaScript:
//! - Declarations: `var`, `let`, `const`, function declarations
//! - Functions: expressions, arrows, default and rest parameters
//! - Literals: numbers, strings, template literals, arrays, objects (with spread)
//! - Statements: `if`, loops (`for`, `for-of`, `for-in`, `while`, `do-while`),
//!   `switch`, `try/catch/finally`, `throw`
//! - Automatic semicolon insertion at line breaks, `}` and end of input
//! - No classes, destructuring, regular expressions, generators or modules
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with precedence climbing for binary operators.
//! No external parser generator dependencies.

pub mod ast;
mod expressions;
pub mod lexer;
pub mod parse;
mod statements;

pub use parse::{ParseError, Parser};

/// Lex and parse a complete program
pub fn parse_program(source: &str) -> Result<ast::Program, ParseError> {
    Parser::new(source)?.parse_program()
}
