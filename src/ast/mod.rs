//! Abstract Syntax Tree for Lumen.

pub mod expr;
pub mod stmt;
pub mod types;

pub use expr::{BinaryOp, Expr, ExprKind, UnaryOp};
pub use stmt::{
    ClassDecl, EnumDecl, FunctionDecl, IfCase, MemberDecl, MemberDeclKind, Parameter, Program,
    Stmt, StmtKind, SwitchCase, Visibility,
};
pub use types::{TypeAnnotation, TypeKind};
