//! Type annotation AST nodes.

use crate::span::Span;

/// A declared type on a variable, parameter or property.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAnnotation {
    pub kind: TypeKind,
    pub span: Span,
}

impl TypeAnnotation {
    pub fn new(kind: TypeKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn from_name(name: &str, span: Span) -> Self {
        let kind = match name {
            "any" => TypeKind::Any,
            "dynamic" => TypeKind::Dynamic,
            _ => TypeKind::Named(name.to_string()),
        };
        Self { kind, span }
    }

    /// `any` and `dynamic` accept every value.
    pub fn is_unchecked(&self) -> bool {
        matches!(self.kind, TypeKind::Any | TypeKind::Dynamic)
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self.kind, TypeKind::Dynamic)
    }
}

/// The kinds of types that can be expressed in source.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// A builtin kind (`number`, `string`, `bool`, `list`, `dict`, `function`)
    /// or a class name.
    Named(String),
    Any,
    Dynamic,
}

impl std::fmt::Display for TypeAnnotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            TypeKind::Named(name) => write!(f, "{}", name),
            TypeKind::Any => write!(f, "any"),
            TypeKind::Dynamic => write!(f, "dynamic"),
        }
    }
}
