//! Statement and declaration AST nodes.

use std::rc::Rc;

use crate::ast::expr::Expr;
use crate::ast::types::TypeAnnotation;
use crate::span::Span;

/// A statement in the AST.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Statement variants.
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// Expression statement
    Expression(Expr),

    /// Variable declaration: var x: type = expr
    Var {
        name: String,
        declared_type: Option<TypeAnnotation>,
        initializer: Option<Expr>,
    },

    /// Constant declaration: const X = expr
    Const { name: String, value: Expr },

    /// Block: { statements }
    Block(Vec<Stmt>),

    /// return expr
    Return(Option<Expr>),

    Break,

    Continue,

    /// del x, del xs[i], del xs[a:b], del d["k"]
    Delete(Expr),

    /// Function declaration
    Function(Rc<FunctionDecl>),

    /// Class declaration
    Class(Rc<ClassDecl>),

    /// Enum declaration
    Enum(EnumDecl),
}

/// A function parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub declared_type: Option<TypeAnnotation>,
    pub default_value: Option<Expr>,
    /// `name?` or a parameter with a default
    pub optional: bool,
    /// `...name`
    pub rest: bool,
    pub span: Span,
}

/// Function declaration, shared by named functions, lambdas, methods and
/// accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<Parameter>,
    pub body: Box<Stmt>,
    /// `fun f(x) -> expr`: the body's value is the result.
    pub auto_return: bool,
    pub span: Span,
}

/// Member visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Private,
    Protected,
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Private => write!(f, "private"),
            Visibility::Protected => write!(f, "protected"),
        }
    }
}

/// Class declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: String,
    pub superclass: Option<Expr>,
    pub members: Vec<MemberDecl>,
    pub span: Span,
}

/// One member of a class body.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberDecl {
    pub name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub kind: MemberDeclKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemberDeclKind {
    Property {
        declared_type: Option<TypeAnnotation>,
        initializer: Option<Expr>,
    },
    Method(Rc<FunctionDecl>),
    Getter(Rc<FunctionDecl>),
    Setter(Rc<FunctionDecl>),
}

/// enum Color { RED, GREEN }
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub name: String,
    pub variants: Vec<String>,
    pub span: Span,
}

/// One `if`/`elif` arm.
#[derive(Debug, Clone, PartialEq)]
pub struct IfCase {
    pub condition: Expr,
    pub body: Box<Stmt>,
}

/// One `case a, b:` arm of a switch.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    pub values: Vec<Expr>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// A complete program.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

impl Program {
    pub fn new(statements: Vec<Stmt>) -> Self {
        Self { statements }
    }
}
