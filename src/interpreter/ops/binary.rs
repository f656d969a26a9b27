//! Binary operators
//!
//! `+` concatenates when either side is (or converts to) a string and adds
//! numbers otherwise. Relational operators compare strings by code point and
//! everything else numerically; any comparison involving `NaN` is false.

use std::cmp::Ordering;

use crate::interpreter::coerce::Hint;
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::Eval;
use crate::memory::value::{string_to_number, Value};
use crate::parser::ast::BinOp;

impl Interpreter {
    /// Apply a binary operator to two evaluated operands
    pub(crate) fn apply_binary(&mut self, op: BinOp, left: &Value, right: &Value) -> Eval<Value> {
        // Number fast path
        if let (Value::Number(a), Value::Number(b)) = (left, right) {
            if let Some(result) = numeric_binary(op, *a, *b) {
                return Ok(result);
            }
        }

        match op {
            BinOp::Add => self.add(left, right),
            BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod | BinOp::Pow => {
                let a = self.to_number(left)?;
                let b = self.to_number(right)?;
                Ok(numeric_binary(op, a, b).unwrap_or(Value::Number(f64::NAN)))
            }

            BinOp::StrictEq => Ok(Value::Bool(left.strict_equals(right))),
            BinOp::StrictNe => Ok(Value::Bool(!left.strict_equals(right))),
            BinOp::Eq => Ok(Value::Bool(self.loose_equals(left, right)?)),
            BinOp::Ne => Ok(Value::Bool(!self.loose_equals(left, right)?)),

            BinOp::Lt => Ok(Value::Bool(matches!(
                self.compare(left, right)?,
                Some(Ordering::Less)
            ))),
            BinOp::Gt => Ok(Value::Bool(matches!(
                self.compare(left, right)?,
                Some(Ordering::Greater)
            ))),
            BinOp::Le => Ok(Value::Bool(matches!(
                self.compare(left, right)?,
                Some(Ordering::Less | Ordering::Equal)
            ))),
            BinOp::Ge => Ok(Value::Bool(matches!(
                self.compare(left, right)?,
                Some(Ordering::Greater | Ordering::Equal)
            ))),

            BinOp::InstanceOf => self.instance_of(left, right),
            BinOp::In => {
                let Value::Object(id) = right else {
                    let key = self.to_js_string(left)?;
                    let shown = self.describe_value(right);
                    return Err(self.type_error(format!(
                        "Cannot use 'in' operator to search for '{}' in {}",
                        key, shown
                    )));
                };
                let key = self.to_property_key(left)?;
                Ok(Value::Bool(self.has_property(*id, &key)))
            }

            BinOp::BitAnd | BinOp::BitOr | BinOp::BitXor | BinOp::Shl | BinOp::Shr => {
                let a = self.to_int32(left)?;
                let b = self.to_int32(right)?;
                Ok(Value::Number(int32_binary(op, a, b)))
            }
            BinOp::UShr => {
                let a = self.to_uint32(left)?;
                let b = self.to_uint32(right)?;
                Ok(Value::Number(f64::from(a >> (b & 31))))
            }
        }
    }

    fn add(&mut self, left: &Value, right: &Value) -> Eval<Value> {
        let left = self.to_primitive(left, Hint::Default)?;
        let right = self.to_primitive(right, Hint::Default)?;

        if matches!(left, Value::String(_)) || matches!(right, Value::String(_)) {
            let mut text = self.to_js_string(&left)?.to_string();
            text.push_str(&self.to_js_string(&right)?);
            return Ok(Value::from(text));
        }

        let a = self.to_number(&left)?;
        let b = self.to_number(&right)?;
        Ok(Value::Number(a + b))
    }

    /// Abstract relational comparison; `None` when either side is `NaN`
    pub(crate) fn compare(&mut self, left: &Value, right: &Value) -> Eval<Option<Ordering>> {
        let left = self.to_primitive(left, Hint::Number)?;
        let right = self.to_primitive(right, Hint::Number)?;

        if let (Value::String(a), Value::String(b)) = (&left, &right) {
            return Ok(Some(a.cmp(b)));
        }

        let a = self.to_number(&left)?;
        let b = self.to_number(&right)?;
        Ok(a.partial_cmp(&b))
    }

    /// `==`
    pub(crate) fn loose_equals(&mut self, left: &Value, right: &Value) -> Eval<bool> {
        Ok(match (left, right) {
            (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => true,
            (Value::Undefined | Value::Null, _) | (_, Value::Undefined | Value::Null) => false,
            (Value::Number(a), Value::String(b)) => *a == string_to_number(b),
            (Value::String(a), Value::Number(b)) => string_to_number(a) == *b,
            (Value::Bool(b), other) => {
                let n = Value::Number(f64::from(u8::from(*b)));
                return self.loose_equals(&n, other);
            }
            (other, Value::Bool(b)) => {
                let n = Value::Number(f64::from(u8::from(*b)));
                return self.loose_equals(other, &n);
            }
            (Value::Object(_), Value::Number(_) | Value::String(_)) => {
                let primitive = self.to_primitive(left, Hint::Default)?;
                return self.loose_equals(&primitive, right);
            }
            (Value::Number(_) | Value::String(_), Value::Object(_)) => {
                let primitive = self.to_primitive(right, Hint::Default)?;
                return self.loose_equals(left, &primitive);
            }
            _ => left.strict_equals(right),
        })
    }

    /// `value instanceof constructor`
    fn instance_of(&mut self, value: &Value, constructor: &Value) -> Eval<Value> {
        if !self.is_callable(constructor) {
            return Err(self.type_error("Right-hand side of 'instanceof' is not callable"));
        }
        let Value::Object(id) = value else {
            return Ok(Value::Bool(false));
        };

        match self.get_property(constructor, "prototype")? {
            Value::Object(proto) => Ok(Value::Bool(self.heap.inherits_from(*id, proto))),
            _ => Err(self.type_error(
                "Function has non-object prototype in instanceof check",
            )),
        }
    }
}

/// Arithmetic on two numbers; `None` for operators that are not purely numeric
fn numeric_binary(op: BinOp, a: f64, b: f64) -> Option<Value> {
    Some(match op {
        BinOp::Add => Value::Number(a + b),
        BinOp::Sub => Value::Number(a - b),
        BinOp::Mul => Value::Number(a * b),
        BinOp::Div => Value::Number(a / b),
        BinOp::Mod => Value::Number(a % b),
        BinOp::Pow => Value::Number(js_pow(a, b)),
        BinOp::Lt => Value::Bool(a < b),
        BinOp::Le => Value::Bool(a <= b),
        BinOp::Gt => Value::Bool(a > b),
        BinOp::Ge => Value::Bool(a >= b),
        BinOp::Eq | BinOp::StrictEq => Value::Bool(a == b),
        BinOp::Ne | BinOp::StrictNe => Value::Bool(a != b),
        _ => return None,
    })
}

/// `**`, where `(±1) ** ±Infinity` and `x ** NaN` are NaN
pub(crate) fn js_pow(base: f64, exponent: f64) -> f64 {
    if exponent.is_nan() || (base.abs() == 1.0 && exponent.is_infinite()) {
        return f64::NAN;
    }
    base.powf(exponent)
}

fn int32_binary(op: BinOp, a: i32, b: i32) -> f64 {
    let shift = (b as u32) & 31;
    let result = match op {
        BinOp::BitAnd => a & b,
        BinOp::BitOr => a | b,
        BinOp::BitXor => a ^ b,
        BinOp::Shl => a.wrapping_shl(shift),
        BinOp::Shr => a.wrapping_shr(shift),
        _ => 0,
    };
    f64::from(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pow_edge_cases() {
        assert_eq!(js_pow(2.0, 10.0), 1024.0);
        assert!(js_pow(1.0, f64::INFINITY).is_nan());
        assert!(js_pow(2.0, f64::NAN).is_nan());
        assert_eq!(js_pow(f64::NAN, 0.0), 1.0);
    }

    #[test]
    fn test_int32_ops() {
        assert_eq!(int32_binary(BinOp::Shl, 1, 33), 2.0);
        assert_eq!(int32_binary(BinOp::Shr, -8, 1), -4.0);
        assert_eq!(int32_binary(BinOp::BitXor, 5, 3), 6.0);
    }

    #[test]
    fn test_numeric_fast_path() {
        assert_eq!(numeric_binary(BinOp::Mod, -7.0, 3.0), Some(Value::Number(-1.0)));
        assert_eq!(numeric_binary(BinOp::Eq, f64::NAN, f64::NAN), Some(Value::Bool(false)));
        assert_eq!(numeric_binary(BinOp::In, 1.0, 2.0), None);
    }
}
