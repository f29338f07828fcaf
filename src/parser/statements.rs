//! Statement parsing: blocks, variables, return/break/continue, del.

use crate::ast::*;
use crate::error::ParserError;
use crate::lexer::TokenKind;

use super::core::{ParseResult, Parser};

impl Parser {
    pub(crate) fn statement(&mut self) -> ParseResult<Stmt> {
        match &self.peek().kind {
            TokenKind::Var => self.var_declaration(),
            TokenKind::Const => self.const_declaration(),
            TokenKind::Fun if matches!(self.peek_nth(1).kind, TokenKind::Identifier(_)) => {
                self.function_declaration()
            }
            TokenKind::Class => self.class_declaration(),
            TokenKind::Enum => self.enum_declaration(),
            TokenKind::Return => self.return_statement(),
            TokenKind::Break => {
                let span = self.advance().span;
                Ok(Stmt::new(StmtKind::Break, span))
            }
            TokenKind::Continue => {
                let span = self.advance().span;
                Ok(Stmt::new(StmtKind::Continue, span))
            }
            TokenKind::Del => self.delete_statement(),
            TokenKind::LeftBrace if !self.looks_like_dict_literal() => self.block_statement(),
            _ => self.expression_statement(),
        }
    }

    /// `{}` and `{key: ...` at statement start are dictionaries, not blocks.
    fn looks_like_dict_literal(&self) -> bool {
        let mut offset = 1;
        while self.peek_nth(offset).kind == TokenKind::Newline {
            offset += 1;
        }
        match &self.peek_nth(offset).kind {
            TokenKind::RightBrace => offset == 1,
            TokenKind::StringLiteral(_) | TokenKind::NumberLiteral(_) => {
                self.peek_nth(offset + 1).kind == TokenKind::Colon
            }
            _ => false,
        }
    }

    pub(crate) fn block_statement(&mut self) -> ParseResult<Stmt> {
        let start_span = self.current_span();
        self.expect(&TokenKind::LeftBrace)?;
        let statements = self.statement_list(&[TokenKind::RightBrace])?;
        self.expect(&TokenKind::RightBrace)?;
        let span = start_span.merge(&self.previous_span());
        Ok(Stmt::new(StmtKind::Block(statements), span))
    }

    fn var_declaration(&mut self) -> ParseResult<Stmt> {
        let start_span = self.current_span();
        self.expect(&TokenKind::Var)?;
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

        let span = start_span.merge(&self.previous_span());
        Ok(Stmt::new(
            StmtKind::Var {
                name,
                declared_type,
                initializer,
            },
            span,
        ))
    }

    fn const_declaration(&mut self) -> ParseResult<Stmt> {
        let start_span = self.current_span();
        self.expect(&TokenKind::Const)?;
        let name = self.expect_identifier()?;
        self.expect(&TokenKind::Equal)?;
        let value = self.expression()?;

        let span = start_span.merge(&self.previous_span());
        Ok(Stmt::new(StmtKind::Const { name, value }, span))
    }

    fn return_statement(&mut self) -> ParseResult<Stmt> {
        let start_span = self.current_span();
        self.expect(&TokenKind::Return)?;

        let ends_here = self.is_at_end()
            || matches!(
                self.peek().kind,
                TokenKind::Newline
                    | TokenKind::Semicolon
                    | TokenKind::RightBrace
                    | TokenKind::Case
                    | TokenKind::Default
                    | TokenKind::Elif
                    | TokenKind::Else
            );
        let value = if ends_here {
            None
        } else {
            Some(self.expression()?)
        };

        let span = start_span.merge(&self.previous_span());
        Ok(Stmt::new(StmtKind::Return(value), span))
    }

    fn delete_statement(&mut self) -> ParseResult<Stmt> {
        let start_span = self.current_span();
        self.expect(&TokenKind::Del)?;
        let target = self.expression()?;

        match &target.kind {
            ExprKind::Variable(_)
            | ExprKind::Index {
                optional: false, ..
            }
            | ExprKind::Slice {
                optional: false, ..
            } => {}
            _ => {
                return Err(ParserError::general(
                    "Can only delete a name, an index or a slice",
                    target.span,
                ))
            }
        }

        let span = start_span.merge(&target.span);
        Ok(Stmt::new(StmtKind::Delete(target), span))
    }

    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        let span = expr.span;
        Ok(Stmt::new(StmtKind::Expression(expr), span))
    }
}
