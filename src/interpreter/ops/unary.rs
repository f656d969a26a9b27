//! Unary operator evaluation

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::Eval;
use crate::memory::value::Value;
use crate::parser::ast::{Expr, UnOp};

impl Interpreter {
    pub(crate) fn evaluate_unary(&mut self, op: UnOp, operand: &Expr) -> Eval<Value> {
        // `typeof undeclared` is "undefined" rather than a ReferenceError
        if op == UnOp::TypeOf {
            if let Expr::Ident(name, _) = operand {
                if !self.envs.is_declared(self.current_env, name) && !self.is_global_property(name) {
                    return Ok(Value::str("undefined"));
                }
            }
        }

        let value = self.evaluate_expr(operand)?;
        match op {
            UnOp::Neg => Ok(Value::Number(-self.to_number(&value)?)),
            UnOp::Plus => Ok(Value::Number(self.to_number(&value)?)),
            UnOp::Not => Ok(Value::Bool(!value.is_truthy())),
            UnOp::BitNot => Ok(Value::Number(f64::from(!self.to_int32(&value)?))),
            UnOp::TypeOf => Ok(Value::str(self.type_of(&value))),
            UnOp::Void => Ok(Value::Undefined),
        }
    }
}
