//! Expression evaluation
//!
//! Operators live in `ops`; this module covers literals, identifiers,
//! member access, calls and the short-circuiting forms.
//!
//! # Optional chaining
//!
//! `a?.b.c()` stops at the first `?.` whose left side is `null` or
//! `undefined`, and the whole chain evaluates to `undefined`. Chains are
//! evaluated through [`Interpreter::evaluate_chain`], which reports the
//! short circuit as `None` so outer links can skip their own work.

use std::rc::Rc;

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::Eval;
use crate::memory::env::EnvError;
use crate::memory::value::Value;
use crate::parser::ast::*;

impl Interpreter {
    /// Evaluate an expression and return its value
    pub(crate) fn evaluate_expr(&mut self, expr: &Expr) -> Eval<Value> {
        self.descend(|interp| interp.evaluate_expr_kind(expr))
    }

    fn evaluate_expr_kind(&mut self, expr: &Expr) -> Eval<Value> {
        match expr {
            Expr::Number(n, _) => Ok(Value::Number(*n)),
            Expr::Str(s, _) => Ok(Value::String(Rc::clone(s))),
            Expr::Bool(b, _) => Ok(Value::Bool(*b)),
            Expr::Null(_) => Ok(Value::Null),
            Expr::Undefined(_) => Ok(Value::Undefined),
            Expr::This(_) => Ok(self.this_value.clone()),

            Expr::Template { quasis, exprs, .. } => {
                let mut text = String::new();
                for (i, quasi) in quasis.iter().enumerate() {
                    text.push_str(quasi);
                    if let Some(expr) = exprs.get(i) {
                        let value = self.evaluate_expr(expr)?;
                        text.push_str(&self.to_js_string(&value)?);
                    }
                }
                Ok(Value::from(text))
            }

            Expr::Ident(name, _) => self.lookup_identifier(name),

            Expr::Array { elements, .. } => {
                let values = self.evaluate_elements(elements)?;
                Ok(self.create_array(values))
            }

            Expr::Object { members, .. } => self.evaluate_object_literal(members),

            Expr::Function(def) => {
                if def.name.is_some() {
                    self.create_named_function_expression(Rc::clone(def))
                } else {
                    Ok(self.create_closure(Rc::clone(def), None))
                }
            }

            Expr::Unary { op, operand, .. } => self.evaluate_unary(*op, operand),

            Expr::Update {
                op, prefix, target, ..
            } => self.evaluate_update(*op, *prefix, target),

            Expr::Binary {
                op, left, right, ..
            } => {
                let left = self.evaluate_expr(left)?;
                let right = self.evaluate_expr(right)?;
                self.apply_binary(*op, &left, &right)
            }

            Expr::Logical {
                op, left, right, ..
            } => {
                let left = self.evaluate_expr(left)?;
                let short_circuit = match op {
                    LogicalOp::And => !left.is_truthy(),
                    LogicalOp::Or => left.is_truthy(),
                    LogicalOp::Nullish => !left.is_nullish(),
                };
                if short_circuit {
                    Ok(left)
                } else {
                    self.evaluate_expr(right)
                }
            }

            Expr::Conditional {
                condition,
                then_expr,
                else_expr,
                ..
            } => {
                if self.evaluate_expr(condition)?.is_truthy() {
                    self.evaluate_expr(then_expr)
                } else {
                    self.evaluate_expr(else_expr)
                }
            }

            Expr::Assign {
                op, target, value, ..
            } => self.evaluate_assign(*op, target, value),

            Expr::Member { .. } | Expr::Index { .. } | Expr::Call { .. } => {
                Ok(self.evaluate_chain(expr)?.unwrap_or_default())
            }

            Expr::New {
                callee,
                args,
                location,
            } => {
                let constructor = self.evaluate_expr(callee)?;
                let args = self.evaluate_elements(args)?;
                self.current_location = *location;
                self.construct(&constructor, args, &callee.describe())
            }

            Expr::Sequence(exprs, _) => {
                let mut last = Value::Undefined;
                for expr in exprs {
                    last = self.evaluate_expr(expr)?;
                }
                Ok(last)
            }
        }
    }

    /// Read a variable, falling back to properties of `globalThis`
    pub(crate) fn lookup_identifier(&mut self, name: &str) -> Eval<Value> {
        match self.envs.get(self.current_env, name) {
            Ok(value) => Ok(value),
            Err(EnvError::NotDefined(name)) => {
                let global = self.realm.global_object;
                match self.heap.get(global).properties.get(&name) {
                    Some(value) => Ok(value.clone()),
                    None => Err(self.env_error(EnvError::NotDefined(name))),
                }
            }
            Err(err) => Err(self.env_error(err)),
        }
    }

    /// Builtins and anything a script stores on `globalThis` are resolved
    /// through the global object rather than the global scope
    pub(crate) fn is_global_property(&self, name: &str) -> bool {
        self.heap
            .get(self.realm.global_object)
            .properties
            .contains(name)
    }

    /// Array literal elements and call arguments, with spreads expanded
    pub(crate) fn evaluate_elements(&mut self, elements: &[Element]) -> Eval<Vec<Value>> {
        let mut values = Vec::with_capacity(elements.len());
        for element in elements {
            match element {
                Element::Item(expr) => values.push(self.evaluate_expr(expr)?),
                Element::Spread(expr) => {
                    let spread = self.evaluate_expr(expr)?;
                    values.extend(self.iterate_values(&spread)?);
                }
                Element::Hole => values.push(Value::Undefined),
            }
        }
        Ok(values)
    }

    fn evaluate_object_literal(&mut self, members: &[ObjectMember]) -> Eval<Value> {
        let id = self.create_object();

        for member in members {
            match member {
                ObjectMember::Property { key, value } => {
                    let key: Rc<str> = match key {
                        PropertyKey::Named(name) => Rc::from(name.as_str()),
                        PropertyKey::Computed(expr) => {
                            let key = self.evaluate_expr(expr)?;
                            self.to_property_key(&key)?
                        }
                    };
                    let value = self.evaluate_named(value, &key)?;
                    self.heap.get_mut(id).properties.set(&key, value);
                }
                ObjectMember::Spread(expr) => {
                    let source = self.evaluate_expr(expr)?;
                    for (key, value) in self.own_entries(&source)? {
                        self.heap.get_mut(id).properties.set(&key, value);
                    }
                }
            }
        }

        Ok(Value::Object(id))
    }

    /// Evaluate a member/call chain; `None` when an optional link
    /// short-circuited
    pub(crate) fn evaluate_chain(&mut self, expr: &Expr) -> Eval<Option<Value>> {
        match expr {
            Expr::Member {
                object,
                property,
                optional,
                ..
            } => {
                let Some(base) = self.evaluate_chain(object)? else {
                    return Ok(None);
                };
                if *optional && base.is_nullish() {
                    return Ok(None);
                }
                self.get_property(&base, property).map(Some)
            }

            Expr::Index {
                object,
                index,
                optional,
                ..
            } => {
                let Some(base) = self.evaluate_chain(object)? else {
                    return Ok(None);
                };
                if *optional && base.is_nullish() {
                    return Ok(None);
                }
                let key = self.evaluate_expr(index)?;
                self.get_indexed(&base, &key).map(Some)
            }

            Expr::Call {
                callee,
                args,
                optional,
                location,
            } => {
                let Some((this, function)) = self.evaluate_callee(callee)? else {
                    return Ok(None);
                };
                if *optional && function.is_nullish() {
                    return Ok(None);
                }
                let args = self.evaluate_elements(args)?;

                self.current_location = *location;
                if !self.is_callable(&function) {
                    return Err(
                        self.type_error(format!("{} is not a function", callee.describe()))
                    );
                }
                self.call_function(&function, this, args).map(Some)
            }

            other => self.evaluate_expr(other).map(Some),
        }
    }

    /// Resolve the function of a call together with its `this`
    fn evaluate_callee(&mut self, callee: &Expr) -> Eval<Option<(Value, Value)>> {
        match callee {
            Expr::Member {
                object,
                property,
                optional,
                ..
            } => {
                let Some(base) = self.evaluate_chain(object)? else {
                    return Ok(None);
                };
                if *optional && base.is_nullish() {
                    return Ok(None);
                }
                let function = self.get_property(&base, property)?;
                Ok(Some((base, function)))
            }

            Expr::Index {
                object,
                index,
                optional,
                ..
            } => {
                let Some(base) = self.evaluate_chain(object)? else {
                    return Ok(None);
                };
                if *optional && base.is_nullish() {
                    return Ok(None);
                }
                let key = self.evaluate_expr(index)?;
                let function = self.get_indexed(&base, &key)?;
                Ok(Some((base, function)))
            }

            other => Ok(self
                .evaluate_chain(other)?
                .map(|function| (Value::Undefined, function))),
        }
    }
}
