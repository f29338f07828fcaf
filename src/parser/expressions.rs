//! Expression parsing using Pratt precedence.

use std::rc::Rc;

use crate::ast::*;
use crate::error::ParserError;
use crate::lexer::TokenKind;
use crate::span::Span;

use super::core::{ParseResult, Parser};
use super::precedence::{get_precedence, Precedence};

impl Parser {
    pub(crate) fn expression(&mut self) -> ParseResult<Expr> {
        self.parse_precedence(Precedence::Assignment)
    }

    pub(crate) fn parse_precedence(&mut self, min_precedence: Precedence) -> ParseResult<Expr> {
        let mut left = self.parse_prefix()?;

        while !self.is_at_end() {
            let precedence = get_precedence(&self.peek().kind);
            if precedence == Precedence::None || precedence < min_precedence {
                break;
            }

            left = self.parse_infix(left, precedence)?;
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> ParseResult<Expr> {
        if self.is_at_end() {
            return Err(ParserError::unexpected_eof(self.current_span()));
        }
        let token = self.advance();
        let start_span = token.span;

        match &token.kind {
            TokenKind::NumberLiteral(n) => Ok(Expr::new(ExprKind::Number(*n), start_span)),
            TokenKind::StringLiteral(s) => Ok(Expr::new(ExprKind::String(s.clone()), start_span)),
            TokenKind::BoolLiteral(b) => Ok(Expr::new(ExprKind::Bool(*b), start_span)),
            TokenKind::None => Ok(Expr::new(ExprKind::None, start_span)),

            TokenKind::Identifier(name) => {
                Ok(Expr::new(ExprKind::Variable(name.clone()), start_span))
            }

            TokenKind::SelfKw => Ok(Expr::new(ExprKind::SelfRef, start_span)),
            TokenKind::Super => {
                let name = if self.match_token(&TokenKind::Dot) {
                    Some(self.expect_identifier()?)
                } else {
                    None
                };
                let span = start_span.merge(&self.previous_span());
                Ok(Expr::new(ExprKind::Super(name), span))
            }

            TokenKind::LeftParen => {
                let expr = self.expression()?;
                self.expect(&TokenKind::RightParen)?;
                let span = start_span.merge(&self.previous_span());
                Ok(Expr::new(ExprKind::Grouping(Box::new(expr)), span))
            }

            TokenKind::LeftBracket => self.parse_list(start_span),
            TokenKind::LeftBrace => self.parse_dict(start_span),

            TokenKind::Minus => self.unary_expr(UnaryOp::Negate, Precedence::Unary, start_span),
            TokenKind::Tilde => self.unary_expr(UnaryOp::BitNot, Precedence::Unary, start_span),
            TokenKind::Bang | TokenKind::Not => {
                self.unary_expr(UnaryOp::Not, Precedence::Not, start_span)
            }

            TokenKind::New => self.parse_new(start_span),

            TokenKind::Fun => {
                let decl = self.function_rest("<lambda>".to_string(), start_span)?;
                let span = decl.span;
                Ok(Expr::new(ExprKind::Function(Rc::new(decl)), span))
            }

            TokenKind::If => self.parse_if(start_span),
            TokenKind::For => self.parse_for(start_span),
            TokenKind::Foreach => self.parse_foreach(start_span),
            TokenKind::While => self.parse_while(start_span),
            TokenKind::Switch => self.parse_switch(start_span),

            TokenKind::Eof => Err(ParserError::unexpected_eof(token.span)),
            _ => Err(ParserError::unexpected_token(
                "expression",
                format!("{}", token.kind),
                token.span,
            )),
        }
    }

    fn unary_expr(
        &mut self,
        operator: UnaryOp,
        precedence: Precedence,
        start_span: Span,
    ) -> ParseResult<Expr> {
        let operand = self.parse_precedence(precedence)?;
        let span = start_span.merge(&operand.span);
        Ok(Expr::new(
            ExprKind::Unary {
                operator,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    fn parse_list(&mut self, start_span: Span) -> ParseResult<Expr> {
        let mut elements = Vec::new();
        if !self.check(&TokenKind::RightBracket) {
            loop {
                elements.push(self.expression()?);

                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
                // Trailing comma
                if self.check(&TokenKind::RightBracket) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RightBracket)?;
        let span = start_span.merge(&self.previous_span());
        Ok(Expr::new(ExprKind::List(elements), span))
    }

    fn parse_dict(&mut self, start_span: Span) -> ParseResult<Expr> {
        let mut pairs = Vec::new();
        self.skip_newlines();
        if !self.check(&TokenKind::RightBrace) {
            loop {
                let key = self.expression()?;
                self.expect(&TokenKind::Colon)?;
                self.skip_newlines();
                let value = self.expression()?;
                pairs.push((key, value));
                self.skip_newlines();

                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
                self.skip_newlines();
                if self.check(&TokenKind::RightBrace) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RightBrace)?;
        let span = start_span.merge(&self.previous_span());
        Ok(Expr::new(ExprKind::Dict(pairs), span))
    }

    fn parse_new(&mut self, start_span: Span) -> ParseResult<Expr> {
        let name_span = self.current_span();
        let mut class_expr = Expr::new(ExprKind::Variable(self.expect_identifier()?), name_span);

        // new module.Class(...) / new Outer::Inner(...)
        loop {
            if self.match_token(&TokenKind::Dot) {
                let name = self.expect_identifier()?;
                let span = class_expr.span.merge(&self.previous_span());
                class_expr = Expr::new(
                    ExprKind::Member {
                        object: Box::new(class_expr),
                        name,
                        optional: false,
                    },
                    span,
                );
            } else if self.match_token(&TokenKind::DoubleColon) {
                let name = self.expect_identifier()?;
                let span = class_expr.span.merge(&self.previous_span());
                class_expr = Expr::new(
                    ExprKind::QualifiedName {
                        qualifier: Box::new(class_expr),
                        name,
                    },
                    span,
                );
            } else {
                break;
            }
        }

        let arguments = if self.match_token(&TokenKind::LeftParen) {
            self.finish_arguments()?
        } else {
            Vec::new()
        };
        let span = start_span.merge(&self.previous_span());
        Ok(Expr::new(
            ExprKind::New {
                class_expr: Box::new(class_expr),
                arguments,
            },
            span,
        ))
    }

    /// Parse call arguments after the opening paren, consuming the closing one.
    pub(crate) fn finish_arguments(&mut self) -> ParseResult<Vec<Expr>> {
        let mut arguments = Vec::new();
        if !self.check(&TokenKind::RightParen) {
            loop {
                arguments.push(self.expression()?);
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
                if self.check(&TokenKind::RightParen) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RightParen)?;
        Ok(arguments)
    }

    fn parse_infix(&mut self, left: Expr, precedence: Precedence) -> ParseResult<Expr> {
        let token = self.advance();
        let start_span = left.span;

        match &token.kind {
            // Binary operators
            TokenKind::Plus => self.binary_expr(left, BinaryOp::Add, precedence),
            TokenKind::Minus => self.binary_expr(left, BinaryOp::Subtract, precedence),
            TokenKind::Star => self.binary_expr(left, BinaryOp::Multiply, precedence),
            TokenKind::Slash => self.binary_expr(left, BinaryOp::Divide, precedence),
            TokenKind::Percent => self.binary_expr(left, BinaryOp::Modulo, precedence),
            TokenKind::EqualEqual => self.binary_expr(left, BinaryOp::Equal, precedence),
            TokenKind::BangEqual => self.binary_expr(left, BinaryOp::NotEqual, precedence),
            TokenKind::Less => self.binary_expr(left, BinaryOp::Less, precedence),
            TokenKind::LessEqual => self.binary_expr(left, BinaryOp::LessEqual, precedence),
            TokenKind::Greater => self.binary_expr(left, BinaryOp::Greater, precedence),
            TokenKind::GreaterEqual => self.binary_expr(left, BinaryOp::GreaterEqual, precedence),
            TokenKind::Amp => self.binary_expr(left, BinaryOp::BitAnd, precedence),
            TokenKind::Pipe => self.binary_expr(left, BinaryOp::BitOr, precedence),
            TokenKind::Caret => self.binary_expr(left, BinaryOp::BitXor, precedence),
            TokenKind::LessLess => self.binary_expr(left, BinaryOp::ShiftLeft, precedence),
            TokenKind::GreaterGreater => {
                self.binary_expr(left, BinaryOp::ShiftRight, precedence)
            }

            // Right-associative
            TokenKind::StarStar => {
                let right = self.parse_precedence(Precedence::Power)?;
                let span = start_span.merge(&right.span);
                Ok(Expr::new(
                    ExprKind::Binary {
                        left: Box::new(left),
                        operator: BinaryOp::Power,
                        right: Box::new(right),
                    },
                    span,
                ))
            }

            // Logical operators
            TokenKind::And | TokenKind::AmpAmp => {
                let right = self.parse_precedence(precedence.next())?;
                let span = start_span.merge(&right.span);
                Ok(Expr::new(
                    ExprKind::LogicalAnd {
                        left: Box::new(left),
                        right: Box::new(right),
                    },
                    span,
                ))
            }
            TokenKind::Or | TokenKind::PipePipe => {
                let right = self.parse_precedence(precedence.next())?;
                let span = start_span.merge(&right.span);
                Ok(Expr::new(
                    ExprKind::LogicalOr {
                        left: Box::new(left),
                        right: Box::new(right),
                    },
                    span,
                ))
            }

            // Assignment
            TokenKind::Equal => self.assignment(left, None),
            kind if kind.compound_operator().is_some() => {
                let operator = match kind.compound_operator() {
                    Some(TokenKind::Plus) => BinaryOp::Add,
                    Some(TokenKind::Minus) => BinaryOp::Subtract,
                    Some(TokenKind::Star) => BinaryOp::Multiply,
                    Some(TokenKind::StarStar) => BinaryOp::Power,
                    Some(TokenKind::Slash) => BinaryOp::Divide,
                    _ => BinaryOp::Modulo,
                };
                self.assignment(left, Some(operator))
            }

            // Postfix
            TokenKind::LeftParen => {
                let arguments = self.finish_arguments()?;
                let span = start_span.merge(&self.previous_span());
                Ok(Expr::new(
                    ExprKind::Call {
                        callee: Box::new(left),
                        arguments,
                        optional: false,
                    },
                    span,
                ))
            }
            TokenKind::Dot => {
                let name = self.expect_identifier()?;
                let span = start_span.merge(&self.previous_span());
                Ok(Expr::new(
                    ExprKind::Member {
                        object: Box::new(left),
                        name,
                        optional: false,
                    },
                    span,
                ))
            }
            TokenKind::DoubleColon => {
                let name = self.expect_identifier()?;
                let span = start_span.merge(&self.previous_span());
                Ok(Expr::new(
                    ExprKind::QualifiedName {
                        qualifier: Box::new(left),
                        name,
                    },
                    span,
                ))
            }
            TokenKind::LeftBracket => self.finish_index(left, false),
            TokenKind::QuestionDot => {
                if self.match_token(&TokenKind::LeftParen) {
                    let arguments = self.finish_arguments()?;
                    let span = start_span.merge(&self.previous_span());
                    Ok(Expr::new(
                        ExprKind::Call {
                            callee: Box::new(left),
                            arguments,
                            optional: true,
                        },
                        span,
                    ))
                } else if self.match_token(&TokenKind::LeftBracket) {
                    self.finish_index(left, true)
                } else {
                    let name = self.expect_identifier()?;
                    let span = start_span.merge(&self.previous_span());
                    Ok(Expr::new(
                        ExprKind::Member {
                            object: Box::new(left),
                            name,
                            optional: true,
                        },
                        span,
                    ))
                }
            }

            _ => Err(ParserError::unexpected_token(
                "operator",
                format!("{}", token.kind),
                token.span,
            )),
        }
    }

    fn binary_expr(
        &mut self,
        left: Expr,
        operator: BinaryOp,
        precedence: Precedence,
    ) -> ParseResult<Expr> {
        let right = self.parse_precedence(precedence.next())?;
        let span = left.span.merge(&right.span);
        Ok(Expr::new(
            ExprKind::Binary {
                left: Box::new(left),
                operator,
                right: Box::new(right),
            },
            span,
        ))
    }

    fn assignment(&mut self, target: Expr, operator: Option<BinaryOp>) -> ParseResult<Expr> {
        match &target.kind {
            ExprKind::Variable(_)
            | ExprKind::Member {
                optional: false, ..
            }
            | ExprKind::Index {
                optional: false, ..
            }
            | ExprKind::QualifiedName { .. } => {}
            _ => return Err(ParserError::invalid_assignment_target(target.span)),
        }

        let value = self.parse_precedence(Precedence::Assignment)?;
        let span = target.span.merge(&value.span);
        Ok(Expr::new(
            ExprKind::Assign {
                target: Box::new(target),
                operator,
                value: Box::new(value),
            },
            span,
        ))
    }

    /// `xs[i]` or `xs[a:b]`, after the opening bracket.
    fn finish_index(&mut self, object: Expr, optional: bool) -> ParseResult<Expr> {
        let start = if self.check(&TokenKind::Colon) {
            None
        } else {
            Some(Box::new(self.expression()?))
        };

        if self.match_token(&TokenKind::Colon) {
            let end = if self.check(&TokenKind::RightBracket) {
                None
            } else {
                Some(Box::new(self.expression()?))
            };
            self.expect(&TokenKind::RightBracket)?;
            let span = object.span.merge(&self.previous_span());
            return Ok(Expr::new(
                ExprKind::Slice {
                    object: Box::new(object),
                    start,
                    end,
                    optional,
                },
                span,
            ));
        }

        self.expect(&TokenKind::RightBracket)?;
        let span = object.span.merge(&self.previous_span());
        match start {
            Some(index) => Ok(Expr::new(
                ExprKind::Index {
                    object: Box::new(object),
                    index,
                    optional,
                },
                span,
            )),
            None => Err(ParserError::general("Expected index expression", span)),
        }
    }

    // ===== Control flow in expression position =====

    /// A body is `{ block }` or `: statement`.
    pub(crate) fn parse_body(&mut self) -> ParseResult<Box<Stmt>> {
        if self.check(&TokenKind::LeftBrace) {
            Ok(Box::new(self.block_statement()?))
        } else if self.match_token(&TokenKind::Colon) {
            Ok(Box::new(self.statement()?))
        } else if self.is_at_end() {
            Err(ParserError::unexpected_eof(self.current_span()))
        } else {
            Err(ParserError::unexpected_token(
                "'{' or ':'",
                format!("{}", self.peek().kind),
                self.current_span(),
            ))
        }
    }

    fn parse_if(&mut self, start_span: Span) -> ParseResult<Expr> {
        let mut cases = Vec::new();
        let condition = self.expression()?;
        let body = self.parse_body()?;
        cases.push(IfCase { condition, body });

        while self.check_after_newlines(&TokenKind::Elif) {
            self.advance();
            let condition = self.expression()?;
            let body = self.parse_body()?;
            cases.push(IfCase { condition, body });
        }

        let else_branch = if self.check_after_newlines(&TokenKind::Else) {
            self.advance();
            Some(self.parse_body()?)
        } else {
            None
        };

        let span = start_span.merge(&self.previous_span());
        Ok(Expr::new(
            ExprKind::If {
                cases,
                else_branch,
                propagate: false,
            },
            span,
        ))
    }

    fn parse_for(&mut self, start_span: Span) -> ParseResult<Expr> {
        let variable = self.expect_identifier()?;
        let start = if self.match_token(&TokenKind::Equal) {
            Some(Box::new(self.expression()?))
        } else {
            None
        };
        self.expect(&TokenKind::To)?;
        let end = Box::new(self.expression()?);
        let step = if self.match_token(&TokenKind::Step) {
            Some(Box::new(self.expression()?))
        } else {
            None
        };
        let body = self.parse_body()?;

        let span = start_span.merge(&self.previous_span());
        Ok(Expr::new(
            ExprKind::For {
                variable,
                start,
                end,
                step,
                body,
            },
            span,
        ))
    }

    fn parse_foreach(&mut self, start_span: Span) -> ParseResult<Expr> {
        let first = self.expect_identifier()?;
        let second = if self.match_token(&TokenKind::Comma) {
            Some(self.expect_identifier()?)
        } else {
            None
        };
        self.expect(&TokenKind::In)?;
        let iterable = Box::new(self.expression()?);
        let body = self.parse_body()?;

        let span = start_span.merge(&self.previous_span());
        Ok(Expr::new(
            ExprKind::Foreach {
                first,
                second,
                iterable,
                body,
            },
            span,
        ))
    }

    fn parse_while(&mut self, start_span: Span) -> ParseResult<Expr> {
        let condition = Box::new(self.expression()?);
        let body = self.parse_body()?;
        let span = start_span.merge(&self.previous_span());
        Ok(Expr::new(ExprKind::While { condition, body }, span))
    }

    fn parse_switch(&mut self, start_span: Span) -> ParseResult<Expr> {
        let subject = Box::new(self.expression()?);
        self.expect(&TokenKind::LeftBrace)?;
        self.skip_separators();

        let arm_end = [TokenKind::Case, TokenKind::Default, TokenKind::RightBrace];
        let mut cases = Vec::new();
        let mut default = None;

        loop {
            self.skip_separators();
            if self.match_token(&TokenKind::Case) {
                let case_span = self.previous_span();
                let mut values = vec![self.expression()?];
                while self.match_token(&TokenKind::Comma) {
                    values.push(self.expression()?);
                }
                self.expect(&TokenKind::Colon)?;
                let body = self.statement_list(&arm_end)?;
                let span = case_span.merge(&self.previous_span());
                cases.push(SwitchCase { values, body, span });
            } else if self.match_token(&TokenKind::Default) {
                if default.is_some() {
                    return Err(ParserError::general(
                        "Duplicate default case in switch",
                        self.previous_span(),
                    ));
                }
                self.expect(&TokenKind::Colon)?;
                default = Some(self.statement_list(&arm_end)?);
            } else {
                break;
            }
        }

        self.expect(&TokenKind::RightBrace)?;
        let span = start_span.merge(&self.previous_span());
        Ok(Expr::new(
            ExprKind::Switch {
                subject,
                cases,
                default,
            },
            span,
        ))
    }
}
