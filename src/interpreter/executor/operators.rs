//! Binary, unary and logical operator evaluation.

use crate::ast::*;
use crate::interpreter::environment::ContextId;
use crate::interpreter::operators as ops;
use crate::interpreter::value::Value;
use crate::span::Span;

use super::{Evaluated, Interpreter, RuntimeResult};

impl Interpreter {
    pub(crate) fn evaluate_binary(
        &mut self,
        left: &Expr,
        op: BinaryOp,
        right: &Expr,
        ctx: ContextId,
        span: Span,
    ) -> RuntimeResult<Evaluated> {
        let left_val = propagate!(self.evaluate(left, ctx)?);
        let right_val = propagate!(self.evaluate(right, ctx)?);
        Ok(Evaluated::normal(apply_binary(op, &left_val, &right_val, span)?))
    }

    pub(crate) fn evaluate_unary(
        &mut self,
        op: UnaryOp,
        operand: &Expr,
        ctx: ContextId,
        span: Span,
    ) -> RuntimeResult<Evaluated> {
        let value = propagate!(self.evaluate(operand, ctx)?);
        let result = match op {
            UnaryOp::Negate => ops::negate(&value),
            UnaryOp::BitNot => ops::bit_not(&value),
            UnaryOp::Not => Ok(ops::not(&value)),
        };
        Ok(Evaluated::normal(result.map_err(|e| e.at(span))?))
    }

    /// `a and b`: `a` when it is false, otherwise `b`.
    pub(crate) fn evaluate_logical_and(
        &mut self,
        left: &Expr,
        right: &Expr,
        ctx: ContextId,
    ) -> RuntimeResult<Evaluated> {
        let left_val = propagate!(self.evaluate(left, ctx)?);
        if !left_val.is_true() {
            return Ok(Evaluated::normal(left_val));
        }
        self.evaluate(right, ctx)
    }

    /// `a or b`: `a` when it is true, otherwise `b`.
    pub(crate) fn evaluate_logical_or(
        &mut self,
        left: &Expr,
        right: &Expr,
        ctx: ContextId,
    ) -> RuntimeResult<Evaluated> {
        let left_val = propagate!(self.evaluate(left, ctx)?);
        if left_val.is_true() {
            return Ok(Evaluated::normal(left_val));
        }
        self.evaluate(right, ctx)
    }
}

/// Apply a binary operator, attaching `span` to any failure.
pub(crate) fn apply_binary(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    span: Span,
) -> RuntimeResult<Value> {
    let result = match op {
        BinaryOp::Add => ops::add(left, right),
        BinaryOp::Subtract => ops::subtract(left, right),
        BinaryOp::Multiply => ops::multiply(left, right),
        BinaryOp::Divide => ops::divide(left, right),
        BinaryOp::Modulo => ops::modulo(left, right),
        BinaryOp::Power => ops::power(left, right),
        BinaryOp::Equal => Ok(Value::Boolean(ops::equals(left, right))),
        BinaryOp::NotEqual => Ok(Value::Boolean(!ops::equals(left, right))),
        BinaryOp::Less => ops::less(left, right),
        BinaryOp::LessEqual => ops::less_equal(left, right),
        BinaryOp::Greater => ops::greater(left, right),
        BinaryOp::GreaterEqual => ops::greater_equal(left, right),
        BinaryOp::BitAnd => ops::bit_and(left, right),
        BinaryOp::BitOr => ops::bit_or(left, right),
        BinaryOp::BitXor => ops::bit_xor(left, right),
        BinaryOp::ShiftLeft => ops::shift_left(left, right),
        BinaryOp::ShiftRight => ops::shift_right(left, right),
    };
    result.map_err(|e| e.at(span))
}
