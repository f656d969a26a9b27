//! Loop statement execution (`while`, `do-while`, `for`, `for-of`, `for-in`).
//!
//! Adds `impl Interpreter` methods for the loop forms. `break` and `continue`
//! are propagated via `LoopBodyResult` so the loop driver can react without
//! inspecting `control_flow` directly.
//!
//! `return` inside a loop body is handled by returning `LoopBodyResult::Exit`,
//! which causes the loop to unwind immediately and let the enclosing function
//! see the pending control flow.

use crate::interpreter::engine::{ControlFlow, Interpreter};
use crate::interpreter::errors::Eval;
use crate::memory::env::BindingKind;
use crate::memory::value::Value;
use crate::parser::ast::{Expr, ForBinding, Stmt, VarKind};

/// Result returned by [`Interpreter::execute_loop_body`] to signal how the body ended.
pub(crate) enum LoopBodyResult {
    /// Body completed normally or via `continue`: the loop should iterate again.
    Continue,
    /// `break` was encountered: the loop should exit cleanly.
    Break,
    /// `return` was triggered: the loop driver should unwind and leave
    /// `self.control_flow` for the caller.
    Exit,
}

impl Interpreter {
    /// Executes one iteration of `body`.
    ///
    /// Counts the iteration against the step budget, then maps the control
    /// flow the body left behind onto a [`LoopBodyResult`].
    pub(crate) fn execute_loop_body(&mut self, body: &Stmt) -> Eval<LoopBodyResult> {
        self.tick()?;
        self.execute_statement(body)?;

        Ok(match self.control_flow {
            ControlFlow::Normal => LoopBodyResult::Continue,
            ControlFlow::Continue => {
                self.control_flow = ControlFlow::Normal;
                LoopBodyResult::Continue
            }
            ControlFlow::Break => {
                self.control_flow = ControlFlow::Normal;
                LoopBodyResult::Break
            }
            ControlFlow::Return => LoopBodyResult::Exit,
        })
    }

    /// Executes a `while (condition) body` loop.
    pub(crate) fn execute_while(&mut self, condition: &Expr, body: &Stmt) -> Eval<()> {
        while self.evaluate_expr(condition)?.is_truthy() {
            match self.execute_loop_body(body)? {
                LoopBodyResult::Continue => {}
                LoopBodyResult::Break | LoopBodyResult::Exit => break,
            }
        }
        Ok(())
    }

    /// Executes a `do body while (condition)` loop.
    ///
    /// The body always runs at least once; the condition is checked after each
    /// iteration.
    pub(crate) fn execute_do_while(&mut self, body: &Stmt, condition: &Expr) -> Eval<()> {
        loop {
            match self.execute_loop_body(body)? {
                LoopBodyResult::Continue => {}
                LoopBodyResult::Break | LoopBodyResult::Exit => break,
            }
            if !self.evaluate_expr(condition)?.is_truthy() {
                break;
            }
        }
        Ok(())
    }

    /// Executes a `for (init; condition; update) body` loop.
    ///
    /// `let`/`const` declared in the initializer live in a loop scope. When a
    /// closure captured that scope during an iteration, the next iteration
    /// continues in a fresh copy so each closure keeps its own binding.
    pub(crate) fn execute_for(
        &mut self,
        init: Option<&Stmt>,
        condition: Option<&Expr>,
        update: Option<&Expr>,
        body: &Stmt,
    ) -> Eval<()> {
        let lexical_init = matches!(init, Some(Stmt::VarDecl { kind, .. }) if kind.is_lexical());
        if !lexical_init {
            if let Some(init) = init {
                self.execute_statement(init)?;
            }
            return self.run_for_iterations(condition, update, body, false);
        }

        self.with_scope(|interp| {
            if let Some(init) = init {
                interp.declare_lexical(std::slice::from_ref(init))?;
                interp.execute_statement(init)?;
            }
            interp.run_for_iterations(condition, update, body, true)
        })
    }

    fn run_for_iterations(
        &mut self,
        condition: Option<&Expr>,
        update: Option<&Expr>,
        body: &Stmt,
        per_iteration_scope: bool,
    ) -> Eval<()> {
        loop {
            if let Some(condition) = condition {
                if !self.evaluate_expr(condition)?.is_truthy() {
                    break;
                }
            }

            match self.execute_loop_body(body)? {
                LoopBodyResult::Continue => {}
                LoopBodyResult::Break | LoopBodyResult::Exit => break,
            }

            if per_iteration_scope && self.envs.scope(self.current_env).captured {
                self.current_env = self.envs.clone_scope(self.current_env);
            }

            if let Some(update) = update {
                self.evaluate_expr(update)?;
            }
        }
        Ok(())
    }

    /// Executes a `for (x of iterable) body` loop over array elements or
    /// string characters.
    pub(crate) fn execute_for_of(&mut self, binding: &ForBinding, iterable: &Expr, body: &Stmt) -> Eval<()> {
        let subject = self.evaluate_expr(iterable)?;

        // Strings are iterated from a snapshot; arrays are re-read every step
        let chars: Option<Vec<char>> = match &subject {
            Value::String(s) => Some(s.chars().collect()),
            _ => None,
        };
        let array = match &subject {
            Value::Object(id) if self.heap.get(*id).is_array() => Some(*id),
            _ => None,
        };
        if chars.is_none() && array.is_none() {
            let shown = self.describe_value(&subject);
            return Err(self.type_error(format!("{} is not iterable", shown)));
        }

        let mut index = 0;
        loop {
            let item = match (&chars, array) {
                (Some(chars), _) => match chars.get(index) {
                    Some(c) => Value::from(c.to_string()),
                    None => break,
                },
                (None, Some(id)) => match self.heap.array_elements(id).and_then(|e| e.get(index)) {
                    Some(value) => value.clone(),
                    None => break,
                },
                (None, None) => break,
            };
            index += 1;

            match self.execute_for_each_body(binding, item, body)? {
                LoopBodyResult::Continue => {}
                LoopBodyResult::Break | LoopBodyResult::Exit => break,
            }
        }
        Ok(())
    }

    /// Executes a `for (key in object) body` loop over enumerable keys,
    /// including inherited ones.
    pub(crate) fn execute_for_in(&mut self, binding: &ForBinding, object: &Expr, body: &Stmt) -> Eval<()> {
        let subject = self.evaluate_expr(object)?;
        let keys = self.enumerable_keys(&subject, true);

        for key in keys {
            match self.execute_for_each_body(binding, Value::from(key), body)? {
                LoopBodyResult::Continue => {}
                LoopBodyResult::Break | LoopBodyResult::Exit => break,
            }
        }
        Ok(())
    }

    /// Bind the loop variable for one iteration and run the body
    fn execute_for_each_body(
        &mut self,
        binding: &ForBinding,
        item: Value,
        body: &Stmt,
    ) -> Eval<LoopBodyResult> {
        match binding.kind {
            Some(kind @ (VarKind::Let | VarKind::Const)) => self.with_scope(|interp| {
                let binding_kind = if kind == VarKind::Const {
                    BindingKind::Const
                } else {
                    BindingKind::Let
                };
                let env = interp.current_env;
                interp
                    .envs
                    .declare(env, &binding.name, binding_kind, Some(item))
                    .map_err(|err| interp.env_error(err))?;
                interp.execute_loop_body(body)
            }),
            Some(VarKind::Var) | None => {
                self.envs
                    .assign(self.current_env, &binding.name, item)
                    .map_err(|err| self.env_error(err))?;
                self.execute_loop_body(body)
            }
        }
    }
}
