//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including error types, helper methods, and the main parse entry point.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, token helpers, semicolon insertion
//! - `statements`: Parsing statements and declarations
//! - `expressions`: Parsing expressions with precedence climbing
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state.

use std::rc::Rc;

use crate::interpreter::constants::MAX_NESTING_DEPTH;
use crate::parser::ast::*;
use crate::parser::lexer::{LexError, Lexer, Token, TokenKind};
use thiserror::Error;

/// Parser error type
#[derive(Debug, Clone, Error)]
#[error("{message} (line {}, column {})", location.line, location.column)]
pub struct ParseError {
    pub message: String,
    pub location: SourceLocation,
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError {
            message: err.message,
            location: err.location,
        }
    }
}

/// Recursive descent parser for the snippet language
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    /// Nesting levels currently open, bounded by [`MAX_NESTING_DEPTH`]
    pub(crate) depth: usize,
    /// Source lines, for recovering the text of function literals
    pub(crate) lines: Rc<[String]>,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize()?;
        let mut parser = Self::from_tokens(tokens);
        parser.lines = source.split('\n').map(str::to_string).collect();
        Ok(parser)
    }

    /// Build a parser over an already-lexed token run (ends with `Eof`)
    pub(crate) fn from_tokens(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
            depth: 0,
            lines: Rc::from(Vec::<String>::new()),
        }
    }

    /// Parse the entire program (a list of top-level statements)
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut program = Program::new();

        while !self.is_at_end() {
            program.body.push(self.parse_statement()?);
        }

        Ok(program)
    }

    /// Parse a standalone expression that must consume the whole token run.
    /// Used for template literal substitutions.
    pub(crate) fn parse_standalone_expression(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_expression()?;
        if !self.is_at_end() {
            return Err(self.unexpected());
        }
        Ok(expr)
    }

    /// Open one nesting level; fails once [`MAX_NESTING_DEPTH`] levels are open
    pub(crate) fn enter(&mut self) -> Result<(), ParseError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ParseError {
                message: "Maximum nesting depth exceeded".to_string(),
                location: self.current_location(),
            });
        }
        self.depth += 1;
        Ok(())
    }

    /// Run `parse` one nesting level deeper
    pub(crate) fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        self.enter()?;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    pub(crate) fn peek(&self) -> &TokenKind {
        &self.current().kind
    }

    pub(crate) fn peek_ahead(&self, n: usize) -> &TokenKind {
        let index = (self.position + n).min(self.tokens.len() - 1);
        &self.tokens[index].kind
    }

    pub(crate) fn current(&self) -> &Token {
        let index = self.position.min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    pub(crate) fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !self.is_at_end() {
            self.position += 1;
        }
        token
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek(), TokenKind::Eof)
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.peek() == kind
    }

    pub(crate) fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect_token(
        &mut self,
        kind: &TokenKind,
        message: &str,
    ) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(ParseError {
                message: format!("{}, found {}", message, self.peek()),
                location: self.current_location(),
            })
        }
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.current().location
    }

    pub(crate) fn previous_location(&self) -> SourceLocation {
        if self.position == 0 {
            self.current_location()
        } else {
            self.tokens[self.position - 1].location
        }
    }

    /// End of the most recently consumed token
    pub(crate) fn previous_end(&self) -> SourceLocation {
        if self.position == 0 {
            self.current_location()
        } else {
            self.tokens[self.position - 1].end
        }
    }

    /// Source text from `start` up to (not including) `end`
    pub(crate) fn source_text(&self, start: SourceLocation, end: SourceLocation) -> String {
        let mut text = String::new();
        for line_number in start.line..=end.line {
            let Some(line) = line_number
                .checked_sub(1)
                .and_then(|index| self.lines.get(index))
            else {
                break;
            };
            let from = if line_number == start.line {
                start.column.saturating_sub(1)
            } else {
                0
            };
            let to = if line_number == end.line {
                end.column.saturating_sub(1)
            } else {
                usize::MAX
            };
            if line_number > start.line {
                text.push('\n');
            }
            text.extend(line.chars().skip(from).take(to.saturating_sub(from)));
        }
        text
    }

    /// Error for the current token in the style of `Unexpected token ')'`
    pub(crate) fn unexpected(&self) -> ParseError {
        let message = match self.peek() {
            TokenKind::Eof => "Unexpected end of input".to_string(),
            other => format!("Unexpected token {}", other),
        };
        ParseError {
            message,
            location: self.current_location(),
        }
    }

    /// Accept an explicit `;`, or insert one before `}`, end of input, or a
    /// token on a new line.
    pub(crate) fn consume_semicolon(&mut self) -> Result<(), ParseError> {
        if self.match_token(&TokenKind::Semicolon) {
            return Ok(());
        }
        if matches!(self.peek(), TokenKind::RBrace | TokenKind::Eof)
            || self.current().newline_before
        {
            return Ok(());
        }
        Err(self.unexpected())
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<String, ParseError> {
        if let TokenKind::Ident(name) = self.peek() {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            Err(ParseError {
                message: format!("Expected identifier, found {}", self.peek()),
                location: self.current_location(),
            })
        }
    }

    /// Property names after `.` may be any identifier-like word, keywords included
    pub(crate) fn expect_property_name(&mut self) -> Result<String, ParseError> {
        let name = match self.peek() {
            TokenKind::Ident(name) => name.clone(),
            other => match keyword_text(other) {
                Some(text) => text.to_string(),
                None => {
                    return Err(ParseError {
                        message: format!("Expected property name, found {}", other),
                        location: self.current_location(),
                    })
                }
            },
        };
        self.advance();
        Ok(name)
    }
}

/// Source spelling of keyword tokens that may double as property names
pub(crate) fn keyword_text(kind: &TokenKind) -> Option<&'static str> {
    Some(match kind {
        TokenKind::Var => "var",
        TokenKind::Let => "let",
        TokenKind::Const => "const",
        TokenKind::Function => "function",
        TokenKind::Return => "return",
        TokenKind::If => "if",
        TokenKind::Else => "else",
        TokenKind::While => "while",
        TokenKind::Do => "do",
        TokenKind::For => "for",
        TokenKind::In => "in",
        TokenKind::Break => "break",
        TokenKind::Continue => "continue",
        TokenKind::Throw => "throw",
        TokenKind::Try => "try",
        TokenKind::Catch => "catch",
        TokenKind::Finally => "finally",
        TokenKind::Switch => "switch",
        TokenKind::Case => "case",
        TokenKind::Default => "default",
        TokenKind::New => "new",
        TokenKind::Typeof => "typeof",
        TokenKind::Void => "void",
        TokenKind::Instanceof => "instanceof",
        TokenKind::This => "this",
        TokenKind::True => "true",
        TokenKind::False => "false",
        TokenKind::Null => "null",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Program {
        Parser::new(source).unwrap().parse_program().unwrap()
    }

    #[test]
    fn test_parse_declaration_and_trailing_expression() {
        let program = parse("let a=5; a+1");

        assert_eq!(program.body.len(), 2);
        match &program.body[0] {
            Stmt::VarDecl {
                kind, declarations, ..
            } => {
                assert_eq!(*kind, VarKind::Let);
                assert_eq!(declarations[0].0, "a");
            }
            other => panic!("Expected declaration, got {:?}", other),
        }
        assert!(matches!(
            &program.body[1],
            Stmt::Expression {
                expr: Expr::Binary { op: BinOp::Add, .. },
                ..
            }
        ));
    }

    #[test]
    fn test_semicolon_insertion_on_newline() {
        let program = parse("let x = 1\nlet y = 2\nx + y");
        assert_eq!(program.body.len(), 3);
    }

    #[test]
    fn test_missing_semicolon_on_same_line_is_an_error() {
        let err = Parser::new("let x = 1 let y = 2")
            .unwrap()
            .parse_program()
            .unwrap_err();
        assert_eq!(err.message, "Unexpected token 'let'");
    }

    #[test]
    fn test_keyword_property_names() {
        let program = parse("promise.catch(handler); obj.default");
        assert_eq!(program.body.len(), 2);
    }

    #[test]
    fn test_nesting_depth_is_bounded() {
        let source = format!("{}1{}", "(".repeat(200), ")".repeat(200));
        let err = Parser::new(&source).unwrap().parse_program().unwrap_err();
        assert_eq!(err.message, "Maximum nesting depth exceeded");

        let source = format!("{}1{}", "(".repeat(20), ")".repeat(20));
        assert_eq!(parse(&source).body.len(), 1);
    }

    #[test]
    fn test_unexpected_end_of_input() {
        let err = Parser::new("function f() {")
            .unwrap()
            .parse_program()
            .unwrap_err();
        assert!(err.message.contains("end of input"), "{}", err.message);
    }
}
