//! Type conversions (`ToPrimitive`, `ToNumber`, `ToString`, `typeof`)
//!
//! Objects convert through their `valueOf` / `toString` methods, so a
//! script can customise how its objects print or compare by defining them.

use std::rc::Rc;

use crate::console::format::primitive_to_string;
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::Eval;
use crate::memory::value::{number_to_string, string_to_number, Value};

/// Preferred result type of a primitive conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Hint {
    Default,
    Number,
    String,
}

impl Interpreter {
    /// Convert objects to primitives by calling `valueOf`/`toString`
    pub(crate) fn to_primitive(&mut self, value: &Value, hint: Hint) -> Eval<Value> {
        let Value::Object(id) = value else {
            return Ok(value.clone());
        };

        let order = match hint {
            Hint::String => ["toString", "valueOf"],
            Hint::Default | Hint::Number => ["valueOf", "toString"],
        };

        for method_name in order {
            let Some(method) = self.heap.lookup(*id, method_name) else {
                continue;
            };
            if !self.is_callable(&method) {
                continue;
            }
            let result = self.call_function(&method, value.clone(), Vec::new())?;
            if !matches!(result, Value::Object(_)) {
                return Ok(result);
            }
        }

        Err(self.type_error("Cannot convert object to primitive value"))
    }

    pub(crate) fn to_number(&mut self, value: &Value) -> Eval<f64> {
        Ok(match value {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Number(n) => *n,
            Value::String(s) => string_to_number(s),
            Value::Object(_) => {
                let primitive = self.to_primitive(value, Hint::Number)?;
                return self.to_number(&primitive);
            }
        })
    }

    /// `String(value)`
    pub(crate) fn to_js_string(&mut self, value: &Value) -> Eval<Rc<str>> {
        match value {
            Value::String(s) => Ok(Rc::clone(s)),
            Value::Object(_) => {
                let primitive = self.to_primitive(value, Hint::String)?;
                self.to_js_string(&primitive)
            }
            other => Ok(Rc::from(primitive_to_string(other))),
        }
    }

    /// Property key for a computed member access
    pub(crate) fn to_property_key(&mut self, value: &Value) -> Eval<Rc<str>> {
        match value {
            Value::Number(n) => Ok(Rc::from(number_to_string(*n))),
            other => self.to_js_string(other),
        }
    }

    pub(crate) fn to_int32(&mut self, value: &Value) -> Eval<i32> {
        Ok(f64_to_int32(self.to_number(value)?))
    }

    pub(crate) fn to_uint32(&mut self, value: &Value) -> Eval<u32> {
        Ok(f64_to_int32(self.to_number(value)?) as u32)
    }

    /// `typeof value`
    pub(crate) fn type_of(&self, value: &Value) -> &'static str {
        match value {
            Value::Undefined => "undefined",
            Value::Null => "object",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Object(id) => {
                if self.heap.get(*id).is_callable() {
                    "function"
                } else {
                    "object"
                }
            }
        }
    }

    /// Integer argument with `undefined` mapped to `default` (ToIntegerOrInfinity)
    pub(crate) fn to_integer_arg(&mut self, value: Option<&Value>, default: f64) -> Eval<f64> {
        match value {
            None | Some(Value::Undefined) => Ok(default),
            Some(value) => {
                let n = self.to_number(value)?;
                Ok(if n.is_nan() { 0.0 } else { n.trunc() })
            }
        }
    }
}

/// Wrap a double into the 32-bit signed range like the bitwise operators do
pub(crate) fn f64_to_int32(n: f64) -> i32 {
    if !n.is_finite() {
        return 0;
    }
    let wrapped = n.trunc().rem_euclid(4_294_967_296.0);
    wrapped as u32 as i32
}

/// Resolve a relative index (negative counts from the end) into `0..=len`
pub(crate) fn relative_index(index: f64, len: usize) -> usize {
    let len_f = len as f64;
    if index < 0.0 {
        (len_f + index).max(0.0) as usize
    } else {
        index.min(len_f) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int32_wrapping() {
        assert_eq!(f64_to_int32(1.9), 1);
        assert_eq!(f64_to_int32(-1.9), -1);
        assert_eq!(f64_to_int32(4_294_967_296.0), 0);
        assert_eq!(f64_to_int32(2_147_483_648.0), i32::MIN);
        assert_eq!(f64_to_int32(f64::NAN), 0);
        assert_eq!(f64_to_int32(f64::INFINITY), 0);
    }

    #[test]
    fn test_relative_index() {
        assert_eq!(relative_index(-1.0, 5), 4);
        assert_eq!(relative_index(-10.0, 5), 0);
        assert_eq!(relative_index(2.0, 5), 2);
        assert_eq!(relative_index(f64::INFINITY, 5), 5);
    }
}
