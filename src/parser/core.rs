//! Core parser struct and helper methods.

use crate::ast::*;
use crate::error::ParserError;
use crate::lexer::{Token, TokenKind};
use crate::span::Span;

pub type ParseResult<T> = Result<T, ParserError>;

/// The parser for Lumen.
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) current: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0 }
    }

    /// Parse a complete program.
    pub fn parse(&mut self) -> ParseResult<Program> {
        let statements = self.statement_list(&[])?;
        if !self.is_at_end() {
            return Err(ParserError::unexpected_token(
                "statement",
                format!("{}", self.peek().kind),
                self.current_span(),
            ));
        }
        Ok(Program::new(statements))
    }

    /// Parse statements until EOF or one of `terminators` (left unconsumed).
    /// Statements must be separated by a newline or `;`.
    pub(crate) fn statement_list(&mut self, terminators: &[TokenKind]) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();

        loop {
            self.skip_separators();
            if self.is_at_end() || terminators.iter().any(|t| self.check(t)) {
                break;
            }

            statements.push(self.statement()?);

            if self.is_at_end() || terminators.iter().any(|t| self.check(t)) {
                break;
            }
            if !self.check(&TokenKind::Newline) && !self.check(&TokenKind::Semicolon) {
                return Err(ParserError::unexpected_token(
                    "newline or ';'",
                    format!("{}", self.peek().kind),
                    self.current_span(),
                ));
            }
        }

        Ok(statements)
    }

    // ===== Token manipulation =====

    pub(crate) fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.tokens[self.current - 1].clone()
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    pub(crate) fn peek_nth(&self, n: usize) -> &Token {
        let index = if self.current + n < self.tokens.len() {
            self.current + n
        } else {
            self.tokens.len() - 1
        };
        &self.tokens[index]
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        if self.is_at_end() {
            false
        } else {
            std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(kind)
        }
    }

    pub(crate) fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: &TokenKind) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else if self.is_at_end() {
            Err(ParserError::unexpected_eof(self.current_span()))
        } else {
            Err(ParserError::unexpected_token(
                format!("{}", kind),
                format!("{}", self.peek().kind),
                self.current_span(),
            ))
        }
    }

    pub(crate) fn expect_identifier(&mut self) -> ParseResult<String> {
        match &self.peek().kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            TokenKind::Eof => Err(ParserError::unexpected_eof(self.current_span())),
            _ => Err(ParserError::unexpected_token(
                "identifier",
                format!("{}", self.peek().kind),
                self.current_span(),
            )),
        }
    }

    /// True when the next token is the contextual keyword `word`.
    pub(crate) fn check_word(&self, word: &str) -> bool {
        matches!(&self.peek().kind, TokenKind::Identifier(name) if name == word)
    }

    pub(crate) fn skip_newlines(&mut self) {
        while self.match_token(&TokenKind::Newline) {}
    }

    pub(crate) fn skip_separators(&mut self) {
        while self.match_token(&TokenKind::Newline) || self.match_token(&TokenKind::Semicolon) {}
    }

    /// Look past newlines for `kind`; consume the newlines only on a match.
    pub(crate) fn check_after_newlines(&mut self, kind: &TokenKind) -> bool {
        let mut offset = 0;
        while self.peek_nth(offset).kind == TokenKind::Newline {
            offset += 1;
        }
        let found = std::mem::discriminant(&self.peek_nth(offset).kind)
            == std::mem::discriminant(kind);
        if found {
            self.current += offset;
        }
        found
    }

    pub(crate) fn current_span(&self) -> Span {
        self.peek().span
    }

    pub(crate) fn previous_span(&self) -> Span {
        self.previous().span
    }
}
