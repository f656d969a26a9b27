use crate::interpreter::engine::{has_lexical_declarations, ControlFlow, Interpreter};
use crate::interpreter::errors::Eval;
use crate::memory::value::Value;
use crate::parser::ast::{Expr, SwitchCase};

impl Interpreter {
    pub(crate) fn execute_return(&mut self, expr: Option<&Expr>) -> Eval<()> {
        self.return_value = match expr {
            Some(expr) => self.evaluate_expr(expr)?,
            None => Value::Undefined,
        };
        self.control_flow = ControlFlow::Return;
        Ok(())
    }

    /// `switch` compares with `===`, falls through from the first matching
    /// case (or `default`) until a `break`
    pub(crate) fn execute_switch(&mut self, discriminant: &Expr, cases: &[SwitchCase]) -> Eval<()> {
        let switch_val = self.evaluate_expr(discriminant)?;

        // All case bodies share one block scope
        let needs_scope = cases.iter().any(|case| has_lexical_declarations(&case.body));
        if !needs_scope {
            return self.execute_switch_cases(&switch_val, cases);
        }

        self.with_scope(|interp| {
            for case in cases {
                interp.declare_lexical(&case.body)?;
            }
            interp.execute_switch_cases(&switch_val, cases)
        })
    }

    fn execute_switch_cases(&mut self, switch_val: &Value, cases: &[SwitchCase]) -> Eval<()> {
        let mut start_index = None;
        for (i, case) in cases.iter().enumerate() {
            if let Some(test) = &case.test {
                let case_val = self.evaluate_expr(test)?;
                if switch_val.strict_equals(&case_val) {
                    start_index = Some(i);
                    break;
                }
            }
        }

        let start_index =
            start_index.or_else(|| cases.iter().position(|case| case.test.is_none()));
        let Some(start) = start_index else {
            return Ok(());
        };

        for case in &cases[start..] {
            self.execute_statements(&case.body)?;

            match self.control_flow {
                ControlFlow::Normal => {}
                ControlFlow::Break => {
                    self.control_flow = ControlFlow::Normal;
                    return Ok(());
                }
                // continue/return belong to an enclosing loop or function
                ControlFlow::Continue | ControlFlow::Return => return Ok(()),
            }
        }

        Ok(())
    }
}
