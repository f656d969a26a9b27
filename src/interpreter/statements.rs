//! Statement execution
//!
//! Adds `impl Interpreter` methods that execute declarations, blocks, `if`,
//! `throw` and `try/catch/finally`. Loops live in `loops`, `return` and
//! `switch` in `jumps`.
//!
//! Every statement counts one step against the step budget. After each
//! statement the caller checks `control_flow` and stops executing the
//! current statement list when a `break`, `continue` or `return` is pending.

use std::rc::Rc;

use crate::interpreter::engine::{has_lexical_declarations, ControlFlow, Interpreter};
use crate::interpreter::errors::{Abrupt, Eval};
use crate::memory::env::BindingKind;
use crate::memory::value::Value;
use crate::parser::ast::*;

impl Interpreter {
    /// Execute statements in order until one transfers control
    pub(crate) fn execute_statements(&mut self, body: &[Stmt]) -> Eval<()> {
        for stmt in body {
            self.execute_statement(stmt)?;
            if self.control_flow != ControlFlow::Normal {
                break;
            }
        }
        Ok(())
    }

    /// Execute a single statement
    pub(crate) fn execute_statement(&mut self, stmt: &Stmt) -> Eval<()> {
        self.descend(|interp| interp.execute_statement_kind(stmt))
    }

    fn execute_statement_kind(&mut self, stmt: &Stmt) -> Eval<()> {
        self.current_location = stmt.location();
        self.tick()?;

        match stmt {
            Stmt::VarDecl {
                kind, declarations, ..
            } => self.execute_var_decl(*kind, declarations),

            // Hoisted when the enclosing scope was entered
            Stmt::FunctionDecl(_) | Stmt::Empty { .. } => Ok(()),

            Stmt::Expression { expr, .. } => {
                let value = self.evaluate_expr(expr)?;
                self.completion = Some(value);
                Ok(())
            }

            Stmt::Block { body, .. } => self.execute_block(body),

            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                if self.evaluate_expr(condition)?.is_truthy() {
                    self.execute_statement(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute_statement(else_branch)
                } else {
                    Ok(())
                }
            }

            Stmt::While {
                condition, body, ..
            } => self.execute_while(condition, body),

            Stmt::DoWhile {
                body, condition, ..
            } => self.execute_do_while(body, condition),

            Stmt::For {
                init,
                condition,
                update,
                body,
                ..
            } => self.execute_for(init.as_deref(), condition.as_ref(), update.as_ref(), body),

            Stmt::ForOf {
                binding,
                iterable,
                body,
                ..
            } => self.execute_for_of(binding, iterable, body),

            Stmt::ForIn {
                binding,
                object,
                body,
                ..
            } => self.execute_for_in(binding, object, body),

            Stmt::Break { .. } => {
                self.control_flow = ControlFlow::Break;
                Ok(())
            }

            Stmt::Continue { .. } => {
                self.control_flow = ControlFlow::Continue;
                Ok(())
            }

            Stmt::Return { expr, .. } => self.execute_return(expr.as_ref()),

            Stmt::Throw { expr, .. } => {
                let value = self.evaluate_expr(expr)?;
                Err(Abrupt::Throw(value))
            }

            Stmt::Try {
                block,
                catch_param,
                handler,
                finalizer,
                ..
            } => self.execute_try(
                block,
                catch_param.as_deref(),
                handler.as_deref(),
                finalizer.as_deref(),
            ),

            Stmt::Switch {
                discriminant,
                cases,
                ..
            } => self.execute_switch(discriminant, cases),
        }
    }

    /// Execute a `{ ... }` body, in its own scope when it declares anything
    /// block-scoped
    pub(crate) fn execute_block(&mut self, body: &[Stmt]) -> Eval<()> {
        if !has_lexical_declarations(body) {
            return self.execute_statements(body);
        }

        self.with_scope(|interp| {
            interp.declare_lexical(body)?;
            interp.execute_statements(body)
        })
    }

    /// `var|let|const a = x, b = y`
    fn execute_var_decl(&mut self, kind: VarKind, declarations: &[(String, Option<Expr>)]) -> Eval<()> {
        for (name, init) in declarations {
            let value = match init {
                Some(expr) => Some(self.evaluate_named(expr, name)?),
                None => None,
            };

            match kind {
                VarKind::Var => {
                    // `var x;` leaves an existing value alone
                    if let Some(value) = value {
                        self.envs
                            .assign(self.current_env, name, value)
                            .map_err(|err| self.env_error(err))?;
                    }
                }
                VarKind::Let | VarKind::Const => {
                    let value = value.unwrap_or_default();
                    let env = self.current_env;
                    if self.envs.has_own(env, name) {
                        self.envs.initialize(env, name, value);
                    } else {
                        let binding = if kind == VarKind::Const {
                            BindingKind::Const
                        } else {
                            BindingKind::Let
                        };
                        self.envs
                            .declare(env, name, binding, Some(value))
                            .map_err(|err| self.env_error(err))?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Evaluate an initializer, naming anonymous functions after their target
    pub(crate) fn evaluate_named(&mut self, expr: &Expr, name: &str) -> Eval<Value> {
        match expr {
            Expr::Function(def) if def.name.is_none() => {
                Ok(self.create_closure(Rc::clone(def), Some(name)))
            }
            _ => self.evaluate_expr(expr),
        }
    }

    /// `try { } catch (e) { } finally { }`
    ///
    /// Only thrown values are caught; halts pass straight through, skipping
    /// `finally`. A `finally` block that itself completes abruptly (throw,
    /// return, break) overrides the outcome of the `try`/`catch` part.
    fn execute_try(
        &mut self,
        block: &[Stmt],
        catch_param: Option<&str>,
        handler: Option<&[Stmt]>,
        finalizer: Option<&[Stmt]>,
    ) -> Eval<()> {
        let mut result = self.execute_block(block);

        let caught = match (&result, handler) {
            (Err(Abrupt::Throw(thrown)), Some(handler)) => Some((thrown.clone(), handler)),
            _ => None,
        };
        if let Some((thrown, handler)) = caught {
            result = self.with_scope(|interp| {
                if let Some(param) = catch_param {
                    let env = interp.current_env;
                    interp
                        .envs
                        .declare(env, param, BindingKind::Let, Some(thrown))
                        .map_err(|err| interp.env_error(err))?;
                }
                interp.execute_block(handler)
            });
        }

        let Some(finalizer) = finalizer else {
            return result;
        };
        if matches!(result, Err(Abrupt::Halt(_))) {
            return result;
        }

        let saved_flow = std::mem::replace(&mut self.control_flow, ControlFlow::Normal);
        let saved_return = self.return_value.clone();

        self.execute_block(finalizer)?;

        if self.control_flow == ControlFlow::Normal {
            self.control_flow = saved_flow;
            self.return_value = saved_return;
            result
        } else {
            Ok(())
        }
    }
}
