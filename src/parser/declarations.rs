//! Declaration parsing: functions, parameters, classes, enums.

use std::rc::Rc;

use crate::ast::*;
use crate::error::ParserError;
use crate::lexer::TokenKind;
use crate::span::Span;

use super::core::{ParseResult, Parser};

impl Parser {
    /// Parse a function declaration.
    /// Syntax:
    ///   fun name(params) { body }
    ///   fun name(params) -> expr
    pub(crate) fn function_declaration(&mut self) -> ParseResult<Stmt> {
        let start_span = self.current_span();
        self.expect(&TokenKind::Fun)?;
        let name = self.expect_identifier()?;
        let decl = self.function_rest(name, start_span)?;
        let span = decl.span;
        Ok(Stmt::new(StmtKind::Function(Rc::new(decl)), span))
    }

    /// Parameter list and body, shared by functions, lambdas and methods.
    pub(crate) fn function_rest(
        &mut self,
        name: String,
        start_span: Span,
    ) -> ParseResult<FunctionDecl> {
        self.expect(&TokenKind::LeftParen)?;
        let params = self.parameters()?;
        self.expect(&TokenKind::RightParen)?;

        let (body, auto_return) = if self.match_token(&TokenKind::Arrow) {
            let mut expr = self.expression()?;
            // An inline `if` forming the whole body returns none when no branch matches
            if let ExprKind::If { propagate, .. } = &mut expr.kind {
                *propagate = true;
            }
            let span = expr.span;
            (Box::new(Stmt::new(StmtKind::Expression(expr), span)), true)
        } else if self.check(&TokenKind::LeftBrace) {
            (Box::new(self.block_statement()?), false)
        } else {
            return Err(ParserError::unexpected_token(
                "'{' or '->'",
                format!("{}", self.peek().kind),
                self.current_span(),
            ));
        };

        let span = start_span.merge(&self.previous_span());
        Ok(FunctionDecl {
            name,
            params,
            body,
            auto_return,
            span,
        })
    }

    /// Parse `name`, `name: type`, `name = default`, `name?`, `...rest`.
    fn parameters(&mut self) -> ParseResult<Vec<Parameter>> {
        let mut params = Vec::new();

        if self.check(&TokenKind::RightParen) {
            return Ok(params);
        }

        loop {
            let start_span = self.current_span();
            let rest = self.match_token(&TokenKind::Spread);
            let name = self.expect_identifier()?;
            let mut optional = !rest && self.match_token(&TokenKind::Question);

            let declared_type = if self.match_token(&TokenKind::Colon) {
                Some(self.parse_type()?)
            } else {
                None
            };

            let default_value = if !rest && self.match_token(&TokenKind::Equal) {
                optional = true;
                Some(self.expression()?)
            } else {
                None
            };

            params.push(Parameter {
                name,
                declared_type,
                default_value,
                optional,
                rest,
                span: start_span.merge(&self.previous_span()),
            });

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        Ok(params)
    }

    /// Parse a class declaration.
    /// Syntax:
    ///   class Name extends Parent {
    ///       private static property count: number = 0
    ///       fun __init(x) { ... }
    ///       get size() -> ...
    ///       set size(v) { ... }
    ///   }
    pub(crate) fn class_declaration(&mut self) -> ParseResult<Stmt> {
        let start_span = self.current_span();
        self.expect(&TokenKind::Class)?;
        let name = self.expect_identifier()?;

        let superclass = if self.match_token(&TokenKind::Extends) {
            let span = self.current_span();
            let parent = self.expect_identifier()?;
            let mut expr = Expr::new(ExprKind::Variable(parent), span);
            while self.match_token(&TokenKind::Dot) {
                let member = self.expect_identifier()?;
                let span = expr.span.merge(&self.previous_span());
                expr = Expr::new(
                    ExprKind::Member {
                        object: Box::new(expr),
                        name: member,
                        optional: false,
                    },
                    span,
                );
            }
            Some(expr)
        } else {
            None
        };

        self.expect(&TokenKind::LeftBrace)?;
        let mut members = Vec::new();
        loop {
            self.skip_separators();
            if self.check(&TokenKind::RightBrace) || self.is_at_end() {
                break;
            }
            members.push(self.member_declaration()?);
        }
        self.expect(&TokenKind::RightBrace)?;

        let span = start_span.merge(&self.previous_span());
        Ok(Stmt::new(
            StmtKind::Class(Rc::new(ClassDecl {
                name,
                superclass,
                members,
                span,
            })),
            span,
        ))
    }

    fn member_declaration(&mut self) -> ParseResult<MemberDecl> {
        let start_span = self.current_span();
        let mut visibility = Visibility::Public;
        let mut is_static = false;

        loop {
            if self.match_token(&TokenKind::Public) {
                visibility = Visibility::Public;
            } else if self.match_token(&TokenKind::Private) {
                visibility = Visibility::Private;
            } else if self.match_token(&TokenKind::Protected) {
                visibility = Visibility::Protected;
            } else if self.match_token(&TokenKind::Static) {
                is_static = true;
            } else {
                break;
            }
        }

        if self.match_token(&TokenKind::Property) {
            let name = self.expect_identifier()?;
            let declared_type = if self.match_token(&TokenKind::Colon) {
                Some(self.parse_type()?)
            } else {
                None
            };
            let initializer = if self.match_token(&TokenKind::Equal) {
                Some(self.expression()?)
            } else {
                None
            };
            return Ok(MemberDecl {
                name,
                visibility,
                is_static,
                kind: MemberDeclKind::Property {
                    declared_type,
                    initializer,
                },
                span: start_span.merge(&self.previous_span()),
            });
        }

        if self.match_token(&TokenKind::Fun) {
            let name = self.expect_identifier()?;
            let decl = self.function_rest(name.clone(), start_span)?;
            return Ok(MemberDecl {
                name,
                visibility,
                is_static,
                span: decl.span,
                kind: MemberDeclKind::Method(Rc::new(decl)),
            });
        }

        // `get` and `set` are only keywords when followed by a member name
        let accessor = if self.check_word("get") || self.check_word("set") {
            matches!(self.peek_nth(1).kind, TokenKind::Identifier(_))
        } else {
            false
        };
        if accessor {
            let is_getter = self.check_word("get");
            self.advance();
            let name = self.expect_identifier()?;
            let decl = Rc::new(self.function_rest(name.clone(), start_span)?);
            let expected_params = if is_getter { 0 } else { 1 };
            if decl.params.len() != expected_params {
                return Err(ParserError::general(
                    format!(
                        "{} '{}' must take {} parameter(s)",
                        if is_getter { "Getter" } else { "Setter" },
                        name,
                        expected_params
                    ),
                    decl.span,
                ));
            }
            return Ok(MemberDecl {
                name,
                visibility,
                is_static,
                span: decl.span,
                kind: if is_getter {
                    MemberDeclKind::Getter(decl)
                } else {
                    MemberDeclKind::Setter(decl)
                },
            });
        }

        Err(ParserError::unexpected_token(
            "'property', 'fun', 'get' or 'set'",
            format!("{}", self.peek().kind),
            self.current_span(),
        ))
    }

    /// Parse an enum declaration: `enum Color { RED, GREEN, BLUE }`.
    pub(crate) fn enum_declaration(&mut self) -> ParseResult<Stmt> {
        let start_span = self.current_span();
        self.expect(&TokenKind::Enum)?;
        let name = self.expect_identifier()?;
        self.expect(&TokenKind::LeftBrace)?;

        let mut variants: Vec<String> = Vec::new();
        loop {
            self.skip_separators();
            if self.check(&TokenKind::RightBrace) {
                break;
            }
            let span = self.current_span();
            let variant = self.expect_identifier()?;
            if variants.contains(&variant) {
                return Err(ParserError::general(
                    format!("Duplicate enum variant '{}'", variant),
                    span,
                ));
            }
            variants.push(variant);
            self.skip_separators();
            if !self.match_token(&TokenKind::Comma) {
                self.skip_separators();
                break;
            }
        }
        self.expect(&TokenKind::RightBrace)?;

        let span = start_span.merge(&self.previous_span());
        Ok(Stmt::new(
            StmtKind::Enum(EnumDecl {
                name,
                variants,
                span,
            }),
            span,
        ))
    }
}
