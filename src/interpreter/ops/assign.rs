//! Assignment and update targets
//!
//! An assignment target resolves to a [`Reference`] first (object and key
//! evaluated exactly once), which is then read and/or written. `a.b += 1`
//! therefore evaluates `a` a single time.

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::{ErrorKind, Eval};
use crate::memory::value::Value;
use crate::parser::ast::{BinOp, Expr, UpdateOp};

/// A resolved assignment target
pub(crate) enum Reference {
    Binding(String),
    Property { base: Value, key: Value },
}

impl Interpreter {
    pub(crate) fn resolve_reference(&mut self, target: &Expr) -> Eval<Reference> {
        match target {
            Expr::Ident(name, _) => Ok(Reference::Binding(name.clone())),
            Expr::Member {
                object,
                property,
                optional: false,
                ..
            } => {
                let base = self.evaluate_expr(object)?;
                Ok(Reference::Property {
                    base,
                    key: Value::from(property.as_str()),
                })
            }
            Expr::Index {
                object,
                index,
                optional: false,
                ..
            } => {
                let base = self.evaluate_expr(object)?;
                let key = self.evaluate_expr(index)?;
                Ok(Reference::Property { base, key })
            }
            _ => Err(self.error(
                ErrorKind::SyntaxError,
                "Invalid left-hand side in assignment",
            )),
        }
    }

    pub(crate) fn get_reference(&mut self, reference: &Reference) -> Eval<Value> {
        match reference {
            Reference::Binding(name) => self.lookup_identifier(name),
            Reference::Property { base, key } => self.get_indexed(base, key),
        }
    }

    pub(crate) fn put_reference(&mut self, reference: &Reference, value: Value) -> Eval<()> {
        match reference {
            Reference::Binding(name) => {
                if !self.envs.is_declared(self.current_env, name) && self.is_global_property(name) {
                    let global = self.realm.global_object;
                    self.heap.get_mut(global).properties.set(name, value);
                    return Ok(());
                }
                self.envs
                    .assign(self.current_env, name, value)
                    .map_err(|err| self.env_error(err))
            }
            Reference::Property { base, key } => self.set_indexed(base, key, value),
        }
    }

    /// `target = value` and `target op= value`
    pub(crate) fn evaluate_assign(
        &mut self,
        op: Option<BinOp>,
        target: &Expr,
        value: &Expr,
    ) -> Eval<Value> {
        let reference = self.resolve_reference(target)?;

        let result = match op {
            None => match &reference {
                Reference::Binding(name) => self.evaluate_named(value, name)?,
                Reference::Property { .. } => self.evaluate_expr(value)?,
            },
            Some(op) => {
                let current = self.get_reference(&reference)?;
                let rhs = self.evaluate_expr(value)?;
                self.apply_binary(op, &current, &rhs)?
            }
        };

        self.put_reference(&reference, result.clone())?;
        Ok(result)
    }

    /// `++x`, `x--`, ...
    pub(crate) fn evaluate_update(&mut self, op: UpdateOp, prefix: bool, target: &Expr) -> Eval<Value> {
        let reference = self.resolve_reference(target)?;
        let old_value = self.get_reference(&reference)?;
        let old = self.to_number(&old_value)?;
        let new = match op {
            UpdateOp::Inc => old + 1.0,
            UpdateOp::Dec => old - 1.0,
        };

        self.put_reference(&reference, Value::Number(new))?;
        Ok(Value::Number(if prefix { new } else { old }))
    }
}
