//! if / elif / else and switch.

use crate::ast::{Expr, IfCase, Stmt, SwitchCase};
use crate::interpreter::environment::ContextId;
use crate::interpreter::executor::{Evaluated, Interpreter, RuntimeResult, Signal};
use crate::interpreter::operators::equals;
use crate::interpreter::value::Value;

impl Interpreter {
    /// The value of the first branch whose condition holds.
    pub(crate) fn evaluate_if(
        &mut self,
        cases: &[IfCase],
        else_branch: Option<&Stmt>,
        propagate: bool,
        ctx: ContextId,
    ) -> RuntimeResult<Evaluated> {
        for case in cases {
            let condition = propagate!(self.evaluate(&case.condition, ctx)?);
            if condition.is_true() {
                return self.execute(&case.body, ctx);
            }
        }
        match else_branch {
            Some(body) => self.execute(body, ctx),
            None if propagate => Ok(Evaluated::with_signal(Value::None, Signal::Return)),
            None => Ok(Evaluated::none()),
        }
    }

    /// Cases are tested left to right with `==`; the first match runs and
    /// there is no fallthrough. A case's value is its last statement's value.
    pub(crate) fn evaluate_switch(
        &mut self,
        subject: &Expr,
        cases: &[SwitchCase],
        default: Option<&[Stmt]>,
        ctx: ContextId,
    ) -> RuntimeResult<Evaluated> {
        let subject = propagate!(self.evaluate(subject, ctx)?);
        for case in cases {
            for candidate in &case.values {
                let candidate = propagate!(self.evaluate(candidate, ctx)?);
                if equals(&subject, &candidate) {
                    return self.execute_case(&case.body, ctx);
                }
            }
        }
        match default {
            Some(body) => self.execute_case(body, ctx),
            None => Ok(Evaluated::none()),
        }
    }

    fn execute_case(&mut self, body: &[Stmt], ctx: ContextId) -> RuntimeResult<Evaluated> {
        let mut last = Value::None;
        for stmt in body {
            last = propagate!(self.execute(stmt, ctx)?);
        }
        Ok(Evaluated::normal(last))
    }
}
