//! Lexer/Scanner for Lumen source code.

use crate::error::LexerError;
use crate::lexer::token::{Token, TokenKind};
use crate::span::Span;

/// The lexer transforms source code into a stream of tokens.
///
/// Newlines are significant: outside of `(...)` and `[...]` they separate
/// statements and are emitted as [`TokenKind::Newline`].
pub struct Scanner<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    current_pos: usize,
    line: usize,
    column: usize,
    start_pos: usize,
    start_line: usize,
    start_column: usize,
    delimiters: Vec<char>,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            current_pos: 0,
            line: 1,
            column: 1,
            start_pos: 0,
            start_line: 1,
            start_column: 1,
            delimiters: Vec::new(),
        }
    }

    /// Scan all tokens from the source.
    pub fn scan_tokens(&mut self) -> Result<Vec<Token>, LexerError> {
        let mut tokens: Vec<Token> = Vec::new();

        loop {
            let token = self.scan_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            // Collapse runs of blank lines into one separator
            let redundant_newline = token.kind == TokenKind::Newline
                && tokens
                    .last()
                    .map_or(true, |last| last.kind == TokenKind::Newline);
            if !redundant_newline {
                tokens.push(token);
            }
            if is_eof {
                break;
            }
        }

        Ok(tokens)
    }

    /// Scan the next token.
    pub fn scan_token(&mut self) -> Result<Token, LexerError> {
        self.skip_whitespace_and_comments()?;
        self.mark_start();

        let Some((_, c)) = self.advance() else {
            return Ok(Token::eof(self.current_pos, self.line, self.column));
        };

        match c {
            '\n' => {
                let token = self.make_token(TokenKind::Newline);
                self.line += 1;
                self.column = 1;
                Ok(token)
            }

            // Grouping delimiters
            '(' => {
                self.delimiters.push('(');
                Ok(self.make_token(TokenKind::LeftParen))
            }
            ')' => {
                self.delimiters.pop();
                Ok(self.make_token(TokenKind::RightParen))
            }
            '[' => {
                self.delimiters.push('[');
                Ok(self.make_token(TokenKind::LeftBracket))
            }
            ']' => {
                self.delimiters.pop();
                Ok(self.make_token(TokenKind::RightBracket))
            }
            '{' => {
                self.delimiters.push('{');
                Ok(self.make_token(TokenKind::LeftBrace))
            }
            '}' => {
                self.delimiters.pop();
                Ok(self.make_token(TokenKind::RightBrace))
            }

            // Single-character tokens
            ',' => Ok(self.make_token(TokenKind::Comma)),
            ';' => Ok(self.make_token(TokenKind::Semicolon)),
            '~' => Ok(self.make_token(TokenKind::Tilde)),
            '^' => Ok(self.make_token(TokenKind::Caret)),
            '.' => {
                if self.peek() == Some('.') && self.peek_next() == Some('.') {
                    self.advance();
                    self.advance();
                    Ok(self.make_token(TokenKind::Spread))
                } else if self.peek().is_some_and(|n| n.is_ascii_digit()) {
                    self.scan_number(c)
                } else {
                    Ok(self.make_token(TokenKind::Dot))
                }
            }
            ':' => {
                if self.match_char(':') {
                    Ok(self.make_token(TokenKind::DoubleColon))
                } else {
                    Ok(self.make_token(TokenKind::Colon))
                }
            }
            '?' => {
                if self.match_char('.') {
                    Ok(self.make_token(TokenKind::QuestionDot))
                } else {
                    Ok(self.make_token(TokenKind::Question))
                }
            }

            // One- or two-character operators
            '+' => {
                if self.match_char('=') {
                    Ok(self.make_token(TokenKind::PlusEqual))
                } else {
                    Ok(self.make_token(TokenKind::Plus))
                }
            }
            '-' => {
                if self.match_char('>') {
                    Ok(self.make_token(TokenKind::Arrow))
                } else if self.match_char('=') {
                    Ok(self.make_token(TokenKind::MinusEqual))
                } else {
                    Ok(self.make_token(TokenKind::Minus))
                }
            }
            '*' => {
                if self.match_char('*') {
                    if self.match_char('=') {
                        Ok(self.make_token(TokenKind::StarStarEqual))
                    } else {
                        Ok(self.make_token(TokenKind::StarStar))
                    }
                } else if self.match_char('=') {
                    Ok(self.make_token(TokenKind::StarEqual))
                } else {
                    Ok(self.make_token(TokenKind::Star))
                }
            }
            '/' => {
                if self.match_char('=') {
                    Ok(self.make_token(TokenKind::SlashEqual))
                } else {
                    Ok(self.make_token(TokenKind::Slash))
                }
            }
            '%' => {
                if self.match_char('=') {
                    Ok(self.make_token(TokenKind::PercentEqual))
                } else {
                    Ok(self.make_token(TokenKind::Percent))
                }
            }
            '=' => {
                if self.match_char('=') {
                    Ok(self.make_token(TokenKind::EqualEqual))
                } else {
                    Ok(self.make_token(TokenKind::Equal))
                }
            }
            '!' => {
                if self.match_char('=') {
                    Ok(self.make_token(TokenKind::BangEqual))
                } else {
                    Ok(self.make_token(TokenKind::Bang))
                }
            }
            '<' => {
                if self.match_char('=') {
                    Ok(self.make_token(TokenKind::LessEqual))
                } else if self.match_char('<') {
                    Ok(self.make_token(TokenKind::LessLess))
                } else {
                    Ok(self.make_token(TokenKind::Less))
                }
            }
            '>' => {
                if self.match_char('=') {
                    Ok(self.make_token(TokenKind::GreaterEqual))
                } else if self.match_char('>') {
                    Ok(self.make_token(TokenKind::GreaterGreater))
                } else {
                    Ok(self.make_token(TokenKind::Greater))
                }
            }
            '&' => {
                if self.match_char('&') {
                    Ok(self.make_token(TokenKind::AmpAmp))
                } else {
                    Ok(self.make_token(TokenKind::Amp))
                }
            }
            '|' => {
                if self.match_char('|') {
                    Ok(self.make_token(TokenKind::PipePipe))
                } else {
                    Ok(self.make_token(TokenKind::Pipe))
                }
            }

            '"' | '\'' => self.scan_string(c),

            c if c.is_ascii_digit() => self.scan_number(c),
            c if c.is_alphabetic() || c == '_' => self.scan_identifier(c),

            _ => Err(LexerError::unexpected_char(c, self.current_span())),
        }
    }

    fn newlines_suppressed(&self) -> bool {
        matches!(self.delimiters.last(), Some('(') | Some('['))
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexerError> {
        loop {
            match self.peek() {
                Some(' ' | '\t' | '\r') => {
                    self.advance();
                }
                Some('\n') if self.newlines_suppressed() => {
                    self.advance();
                    self.line += 1;
                    self.column = 1;
                }
                // Line continuation
                Some('\\') if self.peek_next() == Some('\n') => {
                    self.advance();
                    self.advance();
                    self.line += 1;
                    self.column = 1;
                }
                Some('/') => {
                    if self.peek_next() == Some('/') {
                        // Line comment
                        while self.peek().is_some() && self.peek() != Some('\n') {
                            self.advance();
                        }
                    } else if self.peek_next() == Some('*') {
                        self.skip_block_comment()?;
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn skip_block_comment(&mut self) -> Result<(), LexerError> {
        self.mark_start();
        self.advance(); // consume /
        self.advance(); // consume *
        loop {
            match self.peek() {
                None => return Err(LexerError::UnterminatedComment(self.current_span())),
                Some('*') if self.peek_next() == Some('/') => {
                    self.advance();
                    self.advance();
                    return Ok(());
                }
                Some('\n') => {
                    self.advance();
                    self.line += 1;
                    self.column = 1;
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn scan_string(&mut self, quote: char) -> Result<Token, LexerError> {
        let mut value = String::new();

        loop {
            match self.peek() {
                None | Some('\n') => {
                    return Err(LexerError::unterminated_string(self.current_span()));
                }
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    let escaped = match self.peek() {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some('0') => '\0',
                        Some('\\') => '\\',
                        Some('"') => '"',
                        Some('\'') => '\'',
                        Some(c) => {
                            return Err(LexerError::invalid_escape(c, self.current_span()));
                        }
                        None => {
                            return Err(LexerError::unterminated_string(self.current_span()));
                        }
                    };
                    self.advance();
                    value.push(escaped);
                }
                Some(c) => {
                    self.advance();
                    value.push(c);
                }
            }
        }

        Ok(self.make_token(TokenKind::StringLiteral(value)))
    }

    fn scan_number(&mut self, first: char) -> Result<Token, LexerError> {
        let mut value = String::from(first);
        let mut is_float = first == '.';

        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                value.push(c);
                self.advance();
            } else if c == '.' && !is_float {
                // A dot followed by a non-digit is member access, not a fraction
                if self.peek_next().is_some_and(|next| next.is_ascii_digit()) {
                    is_float = true;
                    value.push(c);
                    self.advance();
                } else {
                    break;
                }
            } else if c == '_' {
                // Allow underscores in numbers for readability
                self.advance();
            } else {
                break;
            }
        }

        let n: f64 = value
            .parse()
            .map_err(|_| LexerError::invalid_number(value.clone(), self.current_span()))?;
        Ok(self.make_token(TokenKind::NumberLiteral(n)))
    }

    fn scan_identifier(&mut self, first: char) -> Result<Token, LexerError> {
        let mut value = String::from(first);

        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                value.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let kind = TokenKind::keyword(&value).unwrap_or(TokenKind::Identifier(value));
        Ok(self.make_token(kind))
    }

    fn advance(&mut self) -> Option<(usize, char)> {
        if let Some((pos, c)) = self.chars.next() {
            self.current_pos = pos + c.len_utf8();
            self.column += 1;
            Some((pos, c))
        } else {
            None
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn peek_next(&self) -> Option<char> {
        let mut iter = self.source[self.current_pos..].chars();
        iter.next();
        iter.next()
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn mark_start(&mut self) {
        self.start_pos = self.current_pos;
        self.start_line = self.line;
        self.start_column = self.column;
    }

    fn current_span(&self) -> Span {
        Span::new(
            self.start_pos,
            self.current_pos,
            self.start_line,
            self.start_column,
        )
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.current_span())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scan(source: &str) -> Vec<TokenKind> {
        Scanner::new(source)
            .scan_tokens()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_basic_tokens() {
        assert_eq!(
            scan("(){}"),
            vec![
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::LeftBrace,
                TokenKind::RightBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            scan("42 3.14 1_000 .5"),
            vec![
                TokenKind::NumberLiteral(42.0),
                TokenKind::NumberLiteral(3.14),
                TokenKind::NumberLiteral(1000.0),
                TokenKind::NumberLiteral(0.5),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_strings_with_either_quote() {
        assert_eq!(
            scan(r#""it's" 'say "hi"\n'"#),
            vec![
                TokenKind::StringLiteral("it's".to_string()),
                TokenKind::StringLiteral("say \"hi\"\n".to_string()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            scan("var fun if elif else foreach none self"),
            vec![
                TokenKind::Var,
                TokenKind::Fun,
                TokenKind::If,
                TokenKind::Elif,
                TokenKind::Else,
                TokenKind::Foreach,
                TokenKind::None,
                TokenKind::SelfKw,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            scan("+= ** **= ?. :: ... << >= !="),
            vec![
                TokenKind::PlusEqual,
                TokenKind::StarStar,
                TokenKind::StarStarEqual,
                TokenKind::QuestionDot,
                TokenKind::DoubleColon,
                TokenKind::Spread,
                TokenKind::LessLess,
                TokenKind::GreaterEqual,
                TokenKind::BangEqual,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            scan("1 // comment\n/* block\n comment */2"),
            vec![
                TokenKind::NumberLiteral(1.0),
                TokenKind::Newline,
                TokenKind::NumberLiteral(2.0),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_newlines_collapse_and_hide_inside_parens() {
        assert_eq!(
            scan("\n\na\n\n\nf(1,\n2)\n"),
            vec![
                TokenKind::Identifier("a".to_string()),
                TokenKind::Newline,
                TokenKind::Identifier("f".to_string()),
                TokenKind::LeftParen,
                TokenKind::NumberLiteral(1.0),
                TokenKind::Comma,
                TokenKind::NumberLiteral(2.0),
                TokenKind::RightParen,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_newlines_kept_in_braces_inside_parens() {
        let kinds = scan("f(fun () {\na\n})");
        assert!(kinds.contains(&TokenKind::Newline));
    }

    #[test]
    fn test_member_access_on_number() {
        assert_eq!(
            scan("1.foo"),
            vec![
                TokenKind::NumberLiteral(1.0),
                TokenKind::Dot,
                TokenKind::Identifier("foo".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let err = Scanner::new("\"abc").scan_tokens().unwrap_err();
        assert!(matches!(err, LexerError::UnterminatedString(_)));
    }

    #[test]
    fn test_spans_track_lines() {
        let tokens = Scanner::new("a\n  b").scan_tokens().unwrap();
        assert_eq!(tokens[2].span, Span::new(4, 5, 2, 3));
    }
}
