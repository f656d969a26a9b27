pub mod access;
pub mod assign;
pub mod binary;
pub mod unary;

// Operators are `impl Interpreter` blocks; only the helpers below are shared
pub(crate) use binary::js_pow;
