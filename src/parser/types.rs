//! Type annotation parsing.

use crate::ast::*;
use crate::error::ParserError;
use crate::lexer::TokenKind;

use super::core::{ParseResult, Parser};

impl Parser {
    /// Parse a type name after `:`. Type names are plain identifiers; `none`
    /// is accepted as the type of the none value.
    pub(crate) fn parse_type(&mut self) -> ParseResult<TypeAnnotation> {
        let span = self.current_span();
        match &self.peek().kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok(TypeAnnotation::from_name(&name, span))
            }
            TokenKind::None => {
                self.advance();
                Ok(TypeAnnotation::from_name("none", span))
            }
            _ => Err(ParserError::unexpected_token(
                "type",
                format!("{}", self.peek().kind),
                span,
            )),
        }
    }
}
