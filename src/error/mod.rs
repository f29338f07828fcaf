//! Error types for every phase: scanning, parsing and evaluation.

pub mod report;

use crate::span::Span;
use thiserror::Error;

pub use report::render;

/// Lexer errors.
#[derive(Debug, Error)]
pub enum LexerError {
    #[error("Unexpected character '{0}' at {1}")]
    UnexpectedChar(char, Span),

    #[error("Unterminated string at {0}")]
    UnterminatedString(Span),

    #[error("Unterminated block comment at {0}")]
    UnterminatedComment(Span),

    #[error("Invalid escape sequence '\\{0}' at {1}")]
    InvalidEscape(char, Span),

    #[error("Invalid number '{0}' at {1}")]
    InvalidNumber(String, Span),
}

impl LexerError {
    pub fn unexpected_char(c: char, span: Span) -> Self {
        Self::UnexpectedChar(c, span)
    }

    pub fn unterminated_string(span: Span) -> Self {
        Self::UnterminatedString(span)
    }

    pub fn invalid_escape(c: char, span: Span) -> Self {
        Self::InvalidEscape(c, span)
    }

    pub fn invalid_number(s: String, span: Span) -> Self {
        Self::InvalidNumber(s, span)
    }

    pub fn span(&self) -> Span {
        match self {
            Self::UnexpectedChar(_, span) => *span,
            Self::UnterminatedString(span) => *span,
            Self::UnterminatedComment(span) => *span,
            Self::InvalidEscape(_, span) => *span,
            Self::InvalidNumber(_, span) => *span,
        }
    }
}

/// Parser errors.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("Unexpected token '{found}', expected {expected} at {span}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("Unexpected end of file at {0}")]
    UnexpectedEof(Span),

    #[error("Invalid assignment target at {0}")]
    InvalidAssignmentTarget(Span),

    #[error("{message} at {span}")]
    General { message: String, span: Span },
}

impl ParserError {
    pub fn unexpected_token(
        expected: impl Into<String>,
        found: impl Into<String>,
        span: Span,
    ) -> Self {
        Self::UnexpectedToken {
            expected: expected.into(),
            found: found.into(),
            span,
        }
    }

    pub fn unexpected_eof(span: Span) -> Self {
        Self::UnexpectedEof(span)
    }

    pub fn invalid_assignment_target(span: Span) -> Self {
        Self::InvalidAssignmentTarget(span)
    }

    pub fn general(message: impl Into<String>, span: Span) -> Self {
        Self::General {
            message: message.into(),
            span,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::UnexpectedToken { span, .. } => *span,
            Self::UnexpectedEof(span) => *span,
            Self::InvalidAssignmentTarget(span) => *span,
            Self::General { span, .. } => *span,
        }
    }
}

impl From<LexerError> for ParserError {
    fn from(err: LexerError) -> Self {
        Self::General {
            message: err.to_string(),
            span: err.span(),
        }
    }
}

/// Declared-type and operand-kind errors raised while evaluating.
#[derive(Debug, Error)]
pub enum TypeError {
    #[error("Expected {expected} for '{name}', found {found} at {span}")]
    Mismatch {
        name: String,
        expected: String,
        found: String,
        span: Span,
    },

    #[error("Unsupported operand types for {operator}: {left} and {right} at {span}")]
    UnsupportedOperand {
        operator: String,
        left: String,
        right: String,
        span: Span,
    },

    #[error("Optional parameter '{0}' of type dynamic cannot default to none at {1}")]
    DynamicDefaultsToNone(String, Span),

    #[error("{message} at {span}")]
    General { message: String, span: Span },
}

impl TypeError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self::General {
            message: message.into(),
            span,
        }
    }

    pub fn mismatch(
        name: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
        span: Span,
    ) -> Self {
        Self::Mismatch {
            name: name.into(),
            expected: expected.into(),
            found: found.into(),
            span,
        }
    }

    pub fn unsupported_operand(
        operator: impl Into<String>,
        left: impl Into<String>,
        right: impl Into<String>,
        span: Span,
    ) -> Self {
        Self::UnsupportedOperand {
            operator: operator.into(),
            left: left.into(),
            right: right.into(),
            span,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::Mismatch { span, .. } => *span,
            Self::UnsupportedOperand { span, .. } => *span,
            Self::DynamicDefaultsToNone(_, span) => *span,
            Self::General { span, .. } => *span,
        }
    }
}

/// Runtime errors.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Division by zero at {0}")]
    DivisionByZero(Span),

    #[error("Modulo by zero at {0}")]
    ModuloByZero(Span),

    #[error("Undefined identifier '{0}' at {1}")]
    UndefinedVariable(String, Span),

    #[error("'{0}' is not callable at {1}")]
    NotCallable(String, Span),

    #[error("Too many arguments for '{name}': expected at most {expected}, got {got} at {span}")]
    TooManyArguments {
        name: String,
        expected: usize,
        got: usize,
        span: Span,
    },

    #[error("Too few arguments for '{name}': missing '{missing}' at {span}")]
    TooFewArguments {
        name: String,
        missing: String,
        span: Span,
    },

    #[error("Illegal access to {visibility} member '{member}' of '{class}' at {span}")]
    IllegalAccess {
        visibility: String,
        class: String,
        member: String,
        span: Span,
    },

    #[error("'{value_type}' has no member '{member}' at {span}")]
    NoSuchMember {
        value_type: String,
        member: String,
        span: Span,
    },

    #[error("Index out of bounds: {index} (length {length}) at {span}")]
    IndexOutOfBounds {
        index: i64,
        length: usize,
        span: Span,
    },

    #[error("Cannot reassign constant '{0}' at {1}")]
    ConstantReassignment(String, Span),

    #[error("'{0}' outside of a loop at {1}")]
    LoopControlOutsideLoop(String, Span),

    #[error("{message} at {span}")]
    General { message: String, span: Span },
}

impl RuntimeError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self::General {
            message: message.into(),
            span,
        }
    }

    pub fn division_by_zero(span: Span) -> Self {
        Self::DivisionByZero(span)
    }

    pub fn undefined_variable(name: impl Into<String>, span: Span) -> Self {
        Self::UndefinedVariable(name.into(), span)
    }

    pub fn not_callable(type_name: impl Into<String>, span: Span) -> Self {
        Self::NotCallable(type_name.into(), span)
    }

    pub fn too_many_arguments(
        name: impl Into<String>,
        expected: usize,
        got: usize,
        span: Span,
    ) -> Self {
        Self::TooManyArguments {
            name: name.into(),
            expected,
            got,
            span,
        }
    }

    pub fn too_few_arguments(
        name: impl Into<String>,
        missing: impl Into<String>,
        span: Span,
    ) -> Self {
        Self::TooFewArguments {
            name: name.into(),
            missing: missing.into(),
            span,
        }
    }

    pub fn no_such_member(
        value_type: impl Into<String>,
        member: impl Into<String>,
        span: Span,
    ) -> Self {
        Self::NoSuchMember {
            value_type: value_type.into(),
            member: member.into(),
            span,
        }
    }

    pub fn index_out_of_bounds(index: i64, length: usize, span: Span) -> Self {
        Self::IndexOutOfBounds {
            index,
            length,
            span,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::DivisionByZero(span) => *span,
            Self::ModuloByZero(span) => *span,
            Self::UndefinedVariable(_, span) => *span,
            Self::NotCallable(_, span) => *span,
            Self::TooManyArguments { span, .. } => *span,
            Self::TooFewArguments { span, .. } => *span,
            Self::IllegalAccess { span, .. } => *span,
            Self::NoSuchMember { span, .. } => *span,
            Self::IndexOutOfBounds { span, .. } => *span,
            Self::ConstantReassignment(_, span) => *span,
            Self::LoopControlOutsideLoop(_, span) => *span,
            Self::General { span, .. } => *span,
        }
    }
}

/// The three error families a script can surface.
#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("{0}")]
    Syntax(#[from] ParserError),

    #[error("{0}")]
    Type(#[from] TypeError),

    #[error("{0}")]
    Runtime(#[from] RuntimeError),
}

impl ErrorKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Syntax(_) => "SyntaxError",
            Self::Type(_) => "TypeError",
            Self::Runtime(_) => "RuntimeError",
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::Syntax(e) => e.span(),
            Self::Type(e) => e.span(),
            Self::Runtime(e) => e.span(),
        }
    }
}

/// One entry of the context trace: which context was executing, where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceFrame {
    pub context: String,
    pub file: String,
    pub line: usize,
}

/// An error surfaced by a script, together with the context trace at the
/// point it was raised.
#[derive(Debug, Error)]
#[error("{}: {kind}", kind.label())]
pub struct ScriptError {
    pub kind: ErrorKind,
    pub trace: Vec<TraceFrame>,
}

impl ScriptError {
    pub fn new(kind: impl Into<ErrorKind>) -> Self {
        Self {
            kind: kind.into(),
            trace: Vec::new(),
        }
    }

    pub fn span(&self) -> Span {
        self.kind.span()
    }

    pub fn has_trace(&self) -> bool {
        !self.trace.is_empty()
    }

    /// Attach a trace unless one was already recorded closer to the fault.
    pub fn with_trace(mut self, trace: impl FnOnce() -> Vec<TraceFrame>) -> Self {
        if self.trace.is_empty() {
            self.trace = trace();
        }
        self
    }

    pub fn is_runtime(&self) -> bool {
        matches!(self.kind, ErrorKind::Runtime(_))
    }

    pub fn is_type(&self) -> bool {
        matches!(self.kind, ErrorKind::Type(_))
    }
}

impl From<LexerError> for ScriptError {
    fn from(err: LexerError) -> Self {
        Self::new(ParserError::from(err))
    }
}

impl From<ParserError> for ScriptError {
    fn from(err: ParserError) -> Self {
        Self::new(err)
    }
}

impl From<TypeError> for ScriptError {
    fn from(err: TypeError) -> Self {
        Self::new(err)
    }
}

impl From<RuntimeError> for ScriptError {
    fn from(err: RuntimeError) -> Self {
        Self::new(err)
    }
}
