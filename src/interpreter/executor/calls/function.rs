//! Function invocation.
//!
//! User functions, natives, bound native methods, classes and tags share
//! one protocol: a fresh child context of the callee's defining context,
//! argument validation and binding, then the body or host callback.

use std::rc::Rc;

use crate::ast::{Expr, Parameter, TypeAnnotation};
use crate::error::{RuntimeError, ScriptError, TypeError};
use crate::interpreter::environment::{ContextId, MethodFrame};
use crate::interpreter::executor::{Interpreter, RuntimeResult, Signal};
use crate::interpreter::value::{
    value_matches_type, HtmlNode, NativeFunction, NativeParam, TagDef, UserFunction, Value,
};
use crate::span::Span;

/// Default of an unsupplied optional parameter.
pub(crate) enum DefaultValue<'a> {
    Expr(&'a Expr),
    Value(&'a Value),
    Unset,
}

/// What the binder needs to know about a parameter.
pub(crate) trait ParamSpec {
    fn name(&self) -> &str;
    fn declared_type(&self) -> Option<&TypeAnnotation>;
    fn is_optional(&self) -> bool;
    fn is_rest(&self) -> bool;
    fn default_value(&self) -> DefaultValue<'_>;
}

impl ParamSpec for Parameter {
    fn name(&self) -> &str {
        &self.name
    }

    fn declared_type(&self) -> Option<&TypeAnnotation> {
        self.declared_type.as_ref()
    }

    fn is_optional(&self) -> bool {
        self.optional
    }

    fn is_rest(&self) -> bool {
        self.rest
    }

    fn default_value(&self) -> DefaultValue<'_> {
        match &self.default_value {
            Some(expr) => DefaultValue::Expr(expr),
            None => DefaultValue::Unset,
        }
    }
}

impl ParamSpec for NativeParam {
    fn name(&self) -> &str {
        &self.name
    }

    fn declared_type(&self) -> Option<&TypeAnnotation> {
        None
    }

    fn is_optional(&self) -> bool {
        self.optional
    }

    fn is_rest(&self) -> bool {
        self.rest
    }

    fn default_value(&self) -> DefaultValue<'_> {
        match &self.default {
            Some(value) => DefaultValue::Value(value),
            None => DefaultValue::Unset,
        }
    }
}

impl Interpreter {
    /// Call a value with already evaluated arguments.
    pub(crate) fn call_value(
        &mut self,
        callee: Value,
        args: Vec<Value>,
        span: Span,
    ) -> RuntimeResult<Value> {
        match callee {
            Value::Function(func) => self.call_function(&func, args, span),
            Value::NativeFunction(native) => self.call_native(&native, None, args, span),
            Value::NativeMethod(method) => {
                self.call_native(&method.function, Some(method.receiver.clone()), args, span)
            }
            Value::Class(class) => self.instantiate(&class, args, span),
            Value::Tag(tag) => Ok(render_tag(&tag, args)),
            other => Err(RuntimeError::not_callable(other.type_name(), span).into()),
        }
    }

    /// Invoke a user function or bound method.
    pub(crate) fn call_function(
        &mut self,
        func: &Rc<UserFunction>,
        args: Vec<Value>,
        span: Span,
    ) -> RuntimeResult<Value> {
        let label = match &func.owner {
            Some(owner) => format!("{}.{}", owner.name, func.name),
            None => func.name.clone(),
        };
        tracing::trace!(function = %label, args = args.len(), "call");

        self.push_frame(&label, span)?;
        let call_ctx = self.env.push_child(label, func.closure);
        if let Some(owner) = &func.owner {
            self.env.set_frame(
                call_ctx,
                MethodFrame {
                    owner: owner.clone(),
                    member: func.name.clone(),
                },
            );
        }

        let result = self.run_function_body(func, call_ctx, args, span);
        let result = result.map_err(|e| {
            let line = e.span().line;
            e.with_trace(|| self.trace_snapshot(line))
        });
        self.pop_frame();
        self.env.release(call_ctx);
        result
    }

    fn run_function_body(
        &mut self,
        func: &UserFunction,
        call_ctx: ContextId,
        args: Vec<Value>,
        span: Span,
    ) -> RuntimeResult<Value> {
        self.bind_arguments(&func.decl.params, &func.name, call_ctx, args, span)?;

        let evaluated = self.execute(&func.decl.body, call_ctx)?;
        match evaluated.signal {
            Signal::Return => Ok(evaluated.value),
            Signal::None if func.decl.auto_return => Ok(evaluated.value),
            Signal::None | Signal::Exit(_) => Ok(Value::None),
            Signal::Break | Signal::Continue => {
                let keyword = if evaluated.signal == Signal::Break {
                    "break"
                } else {
                    "continue"
                };
                Err(RuntimeError::LoopControlOutsideLoop(keyword.to_string(), func.span()).into())
            }
        }
    }

    /// Invoke a native function, binding `self` for native methods.
    pub(crate) fn call_native(
        &mut self,
        native: &Rc<NativeFunction>,
        receiver: Option<Value>,
        args: Vec<Value>,
        span: Span,
    ) -> RuntimeResult<Value> {
        tracing::trace!(function = %native.name, args = args.len(), "native call");
        let root = self.env.root();
        let call_ctx = self.env.push_child(native.name.clone(), root);
        if let Some(receiver) = receiver {
            self.env.define(call_ctx, "self", receiver);
        }

        let result = self
            .bind_arguments(&native.params, &native.name, call_ctx, args, span)
            .and_then(|()| (native.callback)(self, call_ctx, span));
        self.env.release(call_ctx);
        result
    }

    /// Validate `args` against `params` and bind them in `call_ctx`.
    pub(crate) fn bind_arguments<P: ParamSpec>(
        &mut self,
        params: &[P],
        function_name: &str,
        call_ctx: ContextId,
        args: Vec<Value>,
        span: Span,
    ) -> RuntimeResult<()> {
        let rest_count = params.iter().filter(|p| p.is_rest()).count();
        if rest_count > 1 || params.iter().rev().skip(1).any(|p| p.is_rest()) {
            return Err(RuntimeError::new(
                format!(
                    "'{}' may only have one rest parameter, in last position",
                    function_name
                ),
                span,
            )
            .into());
        }
        let positional = params.len() - rest_count;
        if rest_count == 0 && args.len() > positional {
            return Err(RuntimeError::too_many_arguments(
                function_name,
                positional,
                args.len(),
                span,
            )
            .into());
        }

        let supplied = Value::list(args.clone());
        let mut remaining = args.into_iter();

        for param in params {
            if param.is_rest() {
                let rest: Vec<Value> = remaining.by_ref().collect();
                self.env.define(call_ctx, param.name(), Value::list(rest));
                continue;
            }

            match remaining.next() {
                Some(value) => {
                    self.check_argument(param, &value, span)?;
                    self.env.define(call_ctx, param.name(), value);
                }
                None if param.is_optional() => {
                    let value = match param.default_value() {
                        DefaultValue::Expr(expr) => self.evaluate(expr, call_ctx)?.value,
                        DefaultValue::Value(value) => value.clone(),
                        DefaultValue::Unset => Value::None,
                    };
                    if value.is_none() && param.declared_type().is_some_and(|t| t.is_dynamic()) {
                        return Err(
                            TypeError::DynamicDefaultsToNone(param.name().to_string(), span).into(),
                        );
                    }
                    self.env.define(call_ctx, param.name(), value);
                }
                None => {
                    return Err(
                        RuntimeError::too_few_arguments(function_name, param.name(), span).into(),
                    )
                }
            }
        }

        self.env.define(call_ctx, "arguments", supplied);
        Ok(())
    }

    fn check_argument<P: ParamSpec>(
        &self,
        param: &P,
        value: &Value,
        span: Span,
    ) -> RuntimeResult<()> {
        if !self.options.type_checks {
            return Ok(());
        }
        let Some(declared) = param.declared_type() else {
            return Ok(());
        };
        if declared.is_unchecked() || (param.is_optional() && value.is_none()) {
            return Ok(());
        }
        if value_matches_type(value, declared) {
            Ok(())
        } else {
            Err(ScriptError::from(TypeError::mismatch(
                param.name(),
                declared.to_string(),
                value.type_name(),
                span,
            )))
        }
    }
}

/// Calling a tag renders it with the arguments as children. List arguments
/// are spliced in.
pub(crate) fn render_tag(tag: &TagDef, args: Vec<Value>) -> Value {
    let mut children = Vec::with_capacity(args.len());
    for arg in args {
        match arg {
            Value::List(items) => children.extend(items.borrow().iter().cloned()),
            other => children.push(other),
        }
    }
    Value::Html(Rc::new(HtmlNode {
        name: tag.name.clone(),
        classes: tag.classes.clone(),
        id: tag.id.clone(),
        attributes: tag.attributes.clone(),
        children,
    }))
}
