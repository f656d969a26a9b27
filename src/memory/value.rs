//! Runtime value representation
//!
//! This module defines the [`Value`] enum, which represents all possible runtime values
//! in the snippet interpreter. Primitives are stored inline; everything with identity
//! (objects, arrays, functions, errors) lives in the [`Heap`](super::heap::Heap) and is
//! referenced by [`ObjectId`].
//!
//! # Value Types
//!
//! - [`Value::Undefined`]: the value of missing things
//! - [`Value::Null`]: the explicit empty value
//! - [`Value::Bool`]: `true` / `false`
//! - [`Value::Number`]: IEEE-754 double, the only numeric type
//! - [`Value::String`]: immutable, cheaply cloned string
//! - [`Value::Object`]: handle into the heap arena

use std::rc::Rc;

/// Index of an object in the heap arena
pub type ObjectId = usize;

/// Runtime values in the interpreter
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Object(ObjectId),
}

impl Value {
    /// Build a string value
    pub fn str(s: &str) -> Self {
        Value::String(Rc::from(s))
    }

    /// `undefined` or `null`
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Get the object handle, returns None for primitives
    pub fn as_object(&self) -> Option<ObjectId> {
        match self {
            Value::Object(id) => Some(*id),
            _ => None,
        }
    }

    /// Get the number, returns None if not a Number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Truthiness for primitives; every object is truthy
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Object(_) => true,
        }
    }

    /// `===` semantics (NaN is never equal, objects compare by identity)
    pub fn strict_equals(&self, other: &Value) -> bool {
        self == other
    }

    /// SameValueZero, used by `includes` (NaN equals NaN)
    pub fn same_value_zero(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) if a.is_nan() && b.is_nan() => true,
            _ => self == other,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::str(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Rc::from(s))
    }
}

/// Render a number the way `String(n)` does: `NaN`, `Infinity`, `-0` as `0`,
/// integers without a fraction, and exponent form outside `[1e-7, 1e21)`.
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }

    let abs = n.abs();
    if (1e-7..1e21).contains(&abs) {
        return format!("{}", n);
    }

    let formatted = format!("{:e}", n);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if exponent.starts_with('-') => {
            format!("{}e{}", mantissa, exponent)
        }
        Some((mantissa, exponent)) => format!("{}e+{}", mantissa, exponent),
        None => formatted,
    }
}

/// Parse a string the way `Number(s)` does; empty or blank input is 0
pub fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    let radix_body = |prefix_len: usize, radix: u32| {
        let digits = &trimmed[prefix_len..];
        if digits.is_empty() {
            return f64::NAN;
        }
        u64::from_str_radix(digits, radix)
            .map(|v| v as f64)
            .unwrap_or(f64::NAN)
    };

    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("0x") {
        return radix_body(2, 16);
    }
    if lower.starts_with("0b") {
        return radix_body(2, 2);
    }
    if lower.starts_with("0o") {
        return radix_body(2, 8);
    }

    match trimmed {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ => {
            // Rust accepts "inf"/"nan" spellings that JS rejects
            if trimmed
                .chars()
                .any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E')
            {
                return f64::NAN;
            }
            trimmed.parse::<f64>().unwrap_or(f64::NAN)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_to_string() {
        assert_eq!(number_to_string(4.0), "4");
        assert_eq!(number_to_string(-0.0), "0");
        assert_eq!(number_to_string(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(number_to_string(1e21), "1e+21");
        assert_eq!(number_to_string(1.5e-7), "1.5e-7");
        assert_eq!(number_to_string(123456789.0), "123456789");
        assert_eq!(number_to_string(f64::NAN), "NaN");
        assert_eq!(number_to_string(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn test_string_to_number() {
        assert_eq!(string_to_number("  42 "), 42.0);
        assert_eq!(string_to_number(""), 0.0);
        assert_eq!(string_to_number("0x1f"), 31.0);
        assert_eq!(string_to_number("1e3"), 1000.0);
        assert!(string_to_number("12px").is_nan());
        assert!(string_to_number("inf").is_nan());
        assert_eq!(string_to_number("-Infinity"), f64::NEG_INFINITY);
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Number(f64::NAN).is_truthy());
        assert!(!Value::str("").is_truthy());
        assert!(Value::str("0").is_truthy());
        assert!(Value::Object(0).is_truthy());
        assert!(!Value::Null.is_truthy());
    }
}
