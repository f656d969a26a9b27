// Constants for the snippet interpreter

/// Default nesting limit for script function calls
pub const DEFAULT_MAX_CALL_DEPTH: usize = 200;

/// Largest array the interpreter will materialize (`new Array(n)`, `arr.length = n`, `a[i] = v`)
pub const MAX_ARRAY_LENGTH: usize = 1 << 22;

/// Largest string `repeat` / `padStart` / `padEnd` will build, in characters
pub const MAX_STRING_LENGTH: usize = 1 << 24;

/// Maximum indentation width accepted by `JSON.stringify`
pub const MAX_JSON_INDENT: usize = 10;

/// Largest integer that is exactly representable as a double (`Number.MAX_SAFE_INTEGER`)
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Deepest syntactic nesting the lexer and parser accept (brackets, blocks,
/// operator chains, template substitutions)
pub const MAX_NESTING_DEPTH: usize = 64;

/// Deepest recursion of the evaluator across statements, expressions and calls
pub const MAX_EVAL_DEPTH: usize = 4096;

/// Deepest object graph walked by `JSON.stringify`, `JSON.parse`, the log
/// formatter, array `join` and `flat`
pub const MAX_VALUE_DEPTH: usize = 256;
