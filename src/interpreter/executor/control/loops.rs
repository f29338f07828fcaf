//! for, foreach and while. Every loop evaluates to the list of its
//! iteration values; `continue` skips the current value and `break` stops.

use crate::ast::{Expr, Stmt};
use crate::error::{RuntimeError, TypeError};
use crate::interpreter::environment::ContextId;
use crate::interpreter::executor::{Evaluated, Interpreter, RuntimeResult, Signal};
use crate::interpreter::value::Value;
use crate::span::Span;

/// Outcome of one loop iteration.
enum Iteration {
    Value(Value),
    Continue,
    Break,
    /// `return` or `exit` leaving the loop.
    Leave(Evaluated),
}

impl Interpreter {
    fn run_iteration(&mut self, body: &Stmt, ctx: ContextId) -> RuntimeResult<Iteration> {
        let evaluated = self.execute(body, ctx)?;
        Ok(match evaluated.signal {
            Signal::None => Iteration::Value(evaluated.value),
            Signal::Continue => Iteration::Continue,
            Signal::Break => Iteration::Break,
            Signal::Return | Signal::Exit(_) => Iteration::Leave(evaluated),
        })
    }

    fn loop_number(
        &mut self,
        expr: &Expr,
        what: &str,
        ctx: ContextId,
    ) -> RuntimeResult<Result<f64, Evaluated>> {
        let evaluated = self.evaluate(expr, ctx)?;
        if evaluated.is_interrupted() {
            return Ok(Err(evaluated));
        }
        match evaluated.value {
            Value::Number(n) => Ok(Ok(n)),
            other => Err(TypeError::mismatch(what, "number", other.type_name(), expr.span).into()),
        }
    }

    /// `for i[= start] to end [step s]` over `[start, end)`.
    pub(crate) fn evaluate_for(
        &mut self,
        variable: &str,
        start: Option<&Expr>,
        end: &Expr,
        step: Option<&Expr>,
        body: &Stmt,
        ctx: ContextId,
        span: Span,
    ) -> RuntimeResult<Evaluated> {
        let start = match start {
            Some(expr) => match self.loop_number(expr, "for start", ctx)? {
                Ok(n) => n,
                Err(interrupted) => return Ok(interrupted),
            },
            None => 0.0,
        };
        let end = match self.loop_number(end, "for end", ctx)? {
            Ok(n) => n,
            Err(interrupted) => return Ok(interrupted),
        };
        let step = match step {
            Some(expr) => match self.loop_number(expr, "for step", ctx)? {
                Ok(n) => n,
                Err(interrupted) => return Ok(interrupted),
            },
            None if start <= end => 1.0,
            None => -1.0,
        };
        if step == 0.0 {
            return Err(RuntimeError::new("for loop step cannot be zero", span).into());
        }

        let mut values = Vec::new();
        let mut current = start;
        while (step > 0.0 && current < end) || (step < 0.0 && current > end) {
            self.env
                .declare(ctx, variable, Value::Number(current), None, span)?;
            match self.run_iteration(body, ctx)? {
                Iteration::Value(value) => values.push(value),
                Iteration::Continue => {}
                Iteration::Break => break,
                Iteration::Leave(evaluated) => return Ok(evaluated),
            }
            current += step;
        }
        Ok(Evaluated::normal(Value::list(values)))
    }

    /// `foreach v in xs`, `foreach i, v in xs`, `foreach k in d`,
    /// `foreach k, v in d`. Strings iterate their characters.
    pub(crate) fn evaluate_foreach(
        &mut self,
        first: &str,
        second: Option<&str>,
        iterable: &Expr,
        body: &Stmt,
        ctx: ContextId,
        span: Span,
    ) -> RuntimeResult<Evaluated> {
        let iterable = propagate!(self.evaluate(iterable, ctx)?);
        let pairs: Vec<(Value, Value)> = match &iterable {
            Value::List(items) => items
                .borrow()
                .iter()
                .enumerate()
                .map(|(i, v)| (Value::Number(i as f64), v.clone()))
                .collect(),
            Value::String(s) => s
                .chars()
                .enumerate()
                .map(|(i, c)| (Value::Number(i as f64), Value::String(c.to_string())))
                .collect(),
            Value::Dictionary(map) => map
                .borrow()
                .iter()
                .map(|(k, v)| (Value::String(k.clone()), v.clone()))
                .collect(),
            other => {
                return Err(TypeError::new(
                    format!("'{}' is not iterable", other.type_name()),
                    span,
                )
                .into())
            }
        };
        let keyed = matches!(iterable, Value::Dictionary(_));

        let mut values = Vec::with_capacity(pairs.len());
        for (key, value) in pairs {
            match second {
                Some(second) => {
                    self.env.declare(ctx, first, key, None, span)?;
                    self.env.declare(ctx, second, value, None, span)?;
                }
                None if keyed => self.env.declare(ctx, first, key, None, span)?,
                None => self.env.declare(ctx, first, value, None, span)?,
            }
            match self.run_iteration(body, ctx)? {
                Iteration::Value(value) => values.push(value),
                Iteration::Continue => {}
                Iteration::Break => break,
                Iteration::Leave(evaluated) => return Ok(evaluated),
            }
        }
        Ok(Evaluated::normal(Value::list(values)))
    }

    pub(crate) fn evaluate_while(
        &mut self,
        condition: &Expr,
        body: &Stmt,
        ctx: ContextId,
    ) -> RuntimeResult<Evaluated> {
        let mut values = Vec::new();
        loop {
            let keep_going = propagate!(self.evaluate(condition, ctx)?);
            if !keep_going.is_true() {
                break;
            }
            match self.run_iteration(body, ctx)? {
                Iteration::Value(value) => values.push(value),
                Iteration::Continue => {}
                Iteration::Break => break,
                Iteration::Leave(evaluated) => return Ok(evaluated),
            }
        }
        Ok(Evaluated::normal(Value::list(values)))
    }
}
