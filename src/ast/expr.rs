//! Expression AST nodes.

use std::rc::Rc;

use crate::ast::stmt::{FunctionDecl, IfCase, Stmt, SwitchCase};
use crate::span::Span;

/// An expression in the AST.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// All expression variants.
///
/// Control flow (`if`, loops, `switch`) lives here as well: every construct
/// produces a value and may appear in expression position.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Number literal: 42, 3.5
    Number(f64),
    /// String literal: "hello"
    String(String),
    /// Boolean literal: true, false
    Bool(bool),
    /// none
    None,

    /// Variable reference: foo
    Variable(String),

    /// self
    SelfRef,

    /// super(args) callee or super.name
    Super(Option<String>),

    /// Binary operation: a + b
    Binary {
        left: Box<Expr>,
        operator: BinaryOp,
        right: Box<Expr>,
    },

    /// Unary operation: -x, not x, ~x
    Unary {
        operator: UnaryOp,
        operand: Box<Expr>,
    },

    /// Logical and: a and b, a && b
    LogicalAnd { left: Box<Expr>, right: Box<Expr> },

    /// Logical or: a or b, a || b
    LogicalOr { left: Box<Expr>, right: Box<Expr> },

    /// Grouping expression: (expr). Stops optional-chain short-circuiting.
    Grouping(Box<Expr>),

    /// Function call: foo(a, b), foo?.(a)
    Call {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
        optional: bool,
    },

    /// Member access: obj.field, obj?.field
    Member {
        object: Box<Expr>,
        name: String,
        optional: bool,
    },

    /// Static access: Class::member
    QualifiedName { qualifier: Box<Expr>, name: String },

    /// Index: xs[i], xs?.[i]
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
        optional: bool,
    },

    /// Slice: xs[a:b]
    Slice {
        object: Box<Expr>,
        start: Option<Box<Expr>>,
        end: Option<Box<Expr>>,
        optional: bool,
    },

    /// Object instantiation: new ClassName(args)
    New {
        class_expr: Box<Expr>,
        arguments: Vec<Expr>,
    },

    /// List literal: [1, 2, 3]
    List(Vec<Expr>),

    /// Dictionary literal: {"key": value}
    Dict(Vec<(Expr, Expr)>),

    /// `x = 5` declares `x` in the current scope; `x += 5` modifies the
    /// nearest existing binding; member and index targets store in place.
    Assign {
        target: Box<Expr>,
        operator: Option<BinaryOp>,
        value: Box<Expr>,
    },

    /// Anonymous function: fun (x) -> x * 2
    Function(Rc<FunctionDecl>),

    /// if / elif / else
    If {
        cases: Vec<IfCase>,
        else_branch: Option<Box<Stmt>>,
        /// Set when the `if` is the whole body of an expression-bodied
        /// function: falling through every branch returns none.
        propagate: bool,
    },

    /// for i = start to end step s
    For {
        variable: String,
        start: Option<Box<Expr>>,
        end: Box<Expr>,
        step: Option<Box<Expr>>,
        body: Box<Stmt>,
    },

    /// foreach v in xs / foreach k, v in xs
    Foreach {
        first: String,
        second: Option<String>,
        iterable: Box<Expr>,
        body: Box<Stmt>,
    },

    /// while cond body
    While { condition: Box<Expr>, body: Box<Stmt> },

    /// switch subject { case a, b: ... default: ... }
    Switch {
        subject: Box<Expr>,
        cases: Vec<SwitchCase>,
        default: Option<Vec<Stmt>>,
    },
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    BitAnd,
    BitOr,
    BitXor,
    ShiftLeft,
    ShiftRight,
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinaryOp::Add => write!(f, "+"),
            BinaryOp::Subtract => write!(f, "-"),
            BinaryOp::Multiply => write!(f, "*"),
            BinaryOp::Divide => write!(f, "/"),
            BinaryOp::Modulo => write!(f, "%"),
            BinaryOp::Power => write!(f, "**"),
            BinaryOp::Equal => write!(f, "=="),
            BinaryOp::NotEqual => write!(f, "!="),
            BinaryOp::Less => write!(f, "<"),
            BinaryOp::LessEqual => write!(f, "<="),
            BinaryOp::Greater => write!(f, ">"),
            BinaryOp::GreaterEqual => write!(f, ">="),
            BinaryOp::BitAnd => write!(f, "&"),
            BinaryOp::BitOr => write!(f, "|"),
            BinaryOp::BitXor => write!(f, "^"),
            BinaryOp::ShiftLeft => write!(f, "<<"),
            BinaryOp::ShiftRight => write!(f, ">>"),
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Not,
    BitNot,
}

impl std::fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnaryOp::Negate => write!(f, "-"),
            UnaryOp::Not => write!(f, "not"),
            UnaryOp::BitNot => write!(f, "~"),
        }
    }
}
