//! Tree-walking interpreter for Lumen.

/// Unwrap the value of an [`Evaluated`], returning early when it carries a
/// control signal.
macro_rules! propagate {
    ($evaluated:expr) => {{
        let evaluated: $crate::interpreter::executor::Evaluated = $evaluated;
        if evaluated.is_interrupted() {
            return Ok(evaluated);
        }
        evaluated.value
    }};
    ($evaluated:expr, $wrap:path) => {{
        let evaluated: $crate::interpreter::executor::Evaluated = $evaluated;
        if evaluated.is_interrupted() {
            return Ok($wrap(evaluated));
        }
        evaluated.value
    }};
}

mod expressions;
mod literals;
mod operators;
mod statements;
mod variables;

pub mod access;
pub mod calls;
pub mod control;
pub mod objects;

#[cfg(test)]
mod tests;

use std::cell::RefCell;
use std::rc::Rc;

use crate::ast::Program;
use crate::error::{RuntimeError, ScriptError, TraceFrame};
use crate::interpreter::builtins::{register_builtins, NativeMethods};
use crate::interpreter::environment::{ContextId, Environment};
use crate::interpreter::value::{NativeFunction, Value};
use crate::lexer::Scanner;
use crate::parser::Parser;
use crate::span::Span;

pub type RuntimeResult<T> = Result<T, ScriptError>;

/// Represents a single frame in the call stack.
#[derive(Debug, Clone)]
pub struct StackFrame {
    pub function_name: String,
    pub file_path: String,
    /// Line of the call expression that entered this frame.
    pub call_line: usize,
}

/// Control signal travelling alongside an evaluated value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    None,
    /// `return`; the payload is the accompanying value.
    Return,
    Break,
    Continue,
    /// `exit(code)` was called.
    Exit(i32),
}

/// Result of evaluating any node.
#[derive(Debug, Clone)]
pub struct Evaluated {
    pub value: Value,
    pub signal: Signal,
}

impl Evaluated {
    pub fn normal(value: Value) -> Self {
        Self {
            value,
            signal: Signal::None,
        }
    }

    pub fn with_signal(value: Value, signal: Signal) -> Self {
        Self { value, signal }
    }

    pub fn none() -> Self {
        Self::normal(Value::None)
    }

    pub fn is_interrupted(&self) -> bool {
        self.signal != Signal::None
    }
}

/// Interpreter settings.
#[derive(Debug, Clone)]
pub struct Options {
    /// Enforce declared types on variables, parameters and properties.
    pub type_checks: bool,
    /// Nested calls allowed before failing with a recursion error.
    pub max_call_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            type_checks: true,
            max_call_depth: 1000,
        }
    }
}

/// Values produced by the top-level statements of a run.
#[derive(Debug, Clone, Default)]
pub struct ProgramResult {
    values: Vec<Value>,
    exit_code: Option<i32>,
}

impl ProgramResult {
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn last(&self) -> Option<&Value> {
        self.values.last()
    }

    /// Code passed to `exit()`, if the program called it.
    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }
}

/// The Lumen interpreter.
pub struct Interpreter {
    pub(crate) env: Environment,
    pub(crate) options: Options,
    pub(crate) call_stack: Vec<StackFrame>,
    pub(crate) current_file: String,
    pub(crate) exit_requested: Option<i32>,
    pub(crate) methods: NativeMethods,
    output: Option<Rc<RefCell<Vec<String>>>>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    pub fn with_options(options: Options) -> Self {
        let mut env = Environment::new();
        env.set_type_checks(options.type_checks);
        register_builtins(&mut env);

        Self {
            env,
            options,
            call_stack: Vec::new(),
            current_file: "<input>".to_string(),
            exit_requested: None,
            methods: NativeMethods::new(),
            output: None,
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn root(&self) -> ContextId {
        self.env.root()
    }

    /// Add a native function to the root context.
    pub fn register_native(&mut self, native: NativeFunction) {
        let root = self.env.root();
        let name = native.name.clone();
        self.env
            .define(root, &name, Value::NativeFunction(Rc::new(native)));
    }

    /// Value of a top-level binding.
    pub fn global(&self, name: &str) -> Option<Value> {
        self.env.get(self.env.root(), name)
    }

    /// File name reported in traces for programs run with [`interpret`](Self::interpret).
    pub fn set_current_file(&mut self, filename: &str) {
        self.current_file = filename.to_string();
    }

    /// Top-level bindings defined by programs, in definition order.
    pub fn globals(&self) -> Vec<(String, Value)> {
        let root = self.env.root();
        self.env
            .names(root)
            .into_iter()
            .filter_map(|name| {
                let value = self.env.get(root, &name)?;
                (!matches!(value, Value::NativeFunction(_))).then_some((name, value))
            })
            .collect()
    }

    /// Send `print` output to a buffer instead of stdout.
    pub fn capture_output(&mut self) -> Rc<RefCell<Vec<String>>> {
        let buffer = Rc::new(RefCell::new(Vec::new()));
        self.output = Some(buffer.clone());
        buffer
    }

    pub(crate) fn write_line(&self, line: String) {
        match &self.output {
            Some(buffer) => buffer.borrow_mut().push(line),
            None => println!("{}", line),
        }
    }

    /// Read a bound argument inside a native callback.
    pub fn arg(&self, ctx: ContextId, name: &str) -> Value {
        self.env.get(ctx, name).unwrap_or(Value::None)
    }

    /// Push a frame onto the call stack.
    pub(crate) fn push_frame(&mut self, function_name: &str, span: Span) -> RuntimeResult<()> {
        if self.call_stack.len() >= self.options.max_call_depth {
            return Err(RuntimeError::new(
                format!(
                    "Maximum call depth of {} exceeded in '{}'",
                    self.options.max_call_depth, function_name
                ),
                span,
            )
            .into());
        }
        self.call_stack.push(StackFrame {
            function_name: function_name.to_string(),
            file_path: self.current_file.clone(),
            call_line: span.line,
        });
        Ok(())
    }

    /// Pop a frame from the call stack.
    pub(crate) fn pop_frame(&mut self) {
        self.call_stack.pop();
    }

    /// Context trace from the program down to the innermost frame, with
    /// `error_line` as the innermost position.
    pub(crate) fn trace_snapshot(&self, error_line: usize) -> Vec<TraceFrame> {
        let mut frames = Vec::with_capacity(self.call_stack.len() + 1);
        let mut context = "<program>".to_string();
        let mut file = self.current_file.clone();
        for frame in &self.call_stack {
            frames.push(TraceFrame {
                context,
                file,
                line: frame.call_line,
            });
            context = frame.function_name.clone();
            file = frame.file_path.clone();
        }
        frames.push(TraceFrame {
            context,
            file,
            line: error_line,
        });
        frames
    }

    /// Scan, parse and evaluate `source`.
    pub fn run(&mut self, source: &str, filename: &str) -> RuntimeResult<ProgramResult> {
        let tokens = Scanner::new(source).scan_tokens().map_err(ScriptError::from)?;
        let program = Parser::new(tokens).parse().map_err(ScriptError::from)?;
        self.current_file = filename.to_string();
        self.interpret(&program)
    }

    /// Evaluate a parsed program in the root context.
    pub fn interpret(&mut self, program: &Program) -> RuntimeResult<ProgramResult> {
        let root = self.env.root();
        self.call_stack.clear();
        self.exit_requested = None;

        let mut result = ProgramResult::default();
        for stmt in &program.statements {
            let evaluated = self.execute(stmt, root).map_err(|e| {
                let line = e.span().line;
                e.with_trace(|| self.trace_snapshot(line))
            })?;
            let signal = match (evaluated.signal, self.exit_requested) {
                (Signal::None, Some(code)) => Signal::Exit(code),
                (signal, _) => signal,
            };
            match signal {
                Signal::None => result.values.push(evaluated.value),
                Signal::Return => {
                    result.values.push(evaluated.value);
                    break;
                }
                Signal::Break | Signal::Continue => {
                    let keyword = if signal == Signal::Break {
                        "break"
                    } else {
                        "continue"
                    };
                    let error = ScriptError::from(RuntimeError::LoopControlOutsideLoop(
                        keyword.to_string(),
                        stmt.span,
                    ));
                    return Err(error.with_trace(|| self.trace_snapshot(stmt.span.line)));
                }
                Signal::Exit(code) => {
                    result.exit_code = Some(code);
                    break;
                }
            }
        }
        Ok(result)
    }
}
