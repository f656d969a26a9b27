//! Statement parsing implementation
//!
//! This module handles parsing of all statement types:
//!
//! - Declarations: `var`, `let`, `const`, `function name() {}`
//! - Control flow: `if`, `while`, `do-while`, `for`, `for-of`, `for-in`, `switch`
//! - Jump statements: `return`, `break`, `continue`, `throw`
//! - Exception handling: `try` / `catch` / `finally`
//! - Blocks and expression statements
//!
//! # Grammar
//!
//! ```text
//! statement ::= var_decl | function_decl | if_stmt | while_stmt | for_stmt
//!             | do_while_stmt | switch_stmt | try_stmt | return_stmt
//!             | break_stmt | continue_stmt | throw_stmt | block | expr_stmt
//! ```
//!
//! Statement terminators follow automatic semicolon insertion, see
//! [`Parser::consume_semicolon`].

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse block statements (inside braces, excluding the braces themselves)
    pub(crate) fn parse_block_statements(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut statements = Vec::new();

        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }

        Ok(statements)
    }

    /// Parse a statement
    pub(crate) fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        self.nested(Self::parse_statement_level)
    }

    fn parse_statement_level(&mut self) -> Result<Stmt, ParseError> {
        let loc = self.current_location();

        match self.peek() {
            TokenKind::Var | TokenKind::Let | TokenKind::Const => {
                let stmt = self.parse_variable_declaration()?;
                self.consume_semicolon()?;
                Ok(stmt)
            }
            TokenKind::Function => {
                self.advance();
                let name = self.expect_identifier()?;
                let def = self.parse_function_rest(Some(name), loc)?;
                Ok(Stmt::FunctionDecl(def))
            }
            TokenKind::Return => {
                self.advance();
                self.parse_return_statement(loc)
            }
            TokenKind::If => {
                self.advance();
                self.parse_if_statement(loc)
            }
            TokenKind::While => {
                self.advance();
                self.parse_while_statement(loc)
            }
            TokenKind::Do => {
                self.advance();
                self.parse_do_while_statement(loc)
            }
            TokenKind::For => {
                self.advance();
                self.parse_for_statement(loc)
            }
            TokenKind::Switch => {
                self.advance();
                self.parse_switch_statement(loc)
            }
            TokenKind::Try => {
                self.advance();
                self.parse_try_statement(loc)
            }
            TokenKind::Throw => {
                self.advance();
                if self.current().newline_before {
                    return Err(ParseError {
                        message: "Illegal newline after throw".to_string(),
                        location: self.current_location(),
                    });
                }
                let expr = self.parse_expression()?;
                self.consume_semicolon()?;
                Ok(Stmt::Throw { expr, location: loc })
            }
            TokenKind::Break => {
                self.advance();
                self.consume_semicolon()?;
                Ok(Stmt::Break { location: loc })
            }
            TokenKind::Continue => {
                self.advance();
                self.consume_semicolon()?;
                Ok(Stmt::Continue { location: loc })
            }
            TokenKind::LBrace => {
                self.advance();
                let body = self.parse_block_statements()?;
                self.expect_token(&TokenKind::RBrace, "Expected '}' after block")?;
                Ok(Stmt::Block {
                    body,
                    location: loc,
                })
            }
            TokenKind::Semicolon => {
                self.advance();
                Ok(Stmt::Empty { location: loc })
            }
            _ => {
                let expr = self.parse_expression()?;
                self.consume_semicolon()?;
                Ok(Stmt::Expression {
                    expr,
                    location: loc,
                })
            }
        }
    }

    /// Parse `var|let|const name [= init], ...` without the terminator
    pub(crate) fn parse_variable_declaration(&mut self) -> Result<Stmt, ParseError> {
        let loc = self.current_location();
        let kind = self.parse_var_kind()?;

        let mut declarations = Vec::new();
        loop {
            let name = self.expect_identifier()?;
            let init = if self.match_token(&TokenKind::Eq) {
                Some(self.parse_assignment()?)
            } else {
                None
            };

            if kind == VarKind::Const && init.is_none() {
                return Err(ParseError {
                    message: "Missing initializer in const declaration".to_string(),
                    location: self.previous_location(),
                });
            }

            declarations.push((name, init));
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        Ok(Stmt::VarDecl {
            kind,
            declarations,
            location: loc,
        })
    }

    fn parse_var_kind(&mut self) -> Result<VarKind, ParseError> {
        let kind = match self.peek() {
            TokenKind::Var => VarKind::Var,
            TokenKind::Let => VarKind::Let,
            TokenKind::Const => VarKind::Const,
            _ => return Err(self.unexpected()),
        };
        self.advance();
        Ok(kind)
    }

    /// Parse return statement; a line break ends a bare `return`
    fn parse_return_statement(&mut self, loc: SourceLocation) -> Result<Stmt, ParseError> {
        let bare = matches!(
            self.peek(),
            TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof
        ) || self.current().newline_before;

        let expr = if bare {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume_semicolon()?;

        Ok(Stmt::Return {
            expr,
            location: loc,
        })
    }

    /// Parse `( condition )` as used by if/while/switch heads
    fn parse_paren_condition(&mut self, keyword: &str) -> Result<Expr, ParseError> {
        self.expect_token(
            &TokenKind::LParen,
            &format!("Expected '(' after '{}'", keyword),
        )?;
        let condition = self.parse_expression()?;
        self.expect_token(
            &TokenKind::RParen,
            &format!("Expected ')' after {} condition", keyword),
        )?;
        Ok(condition)
    }

    /// Parse if statement
    fn parse_if_statement(&mut self, loc: SourceLocation) -> Result<Stmt, ParseError> {
        let condition = self.parse_paren_condition("if")?;
        let then_branch = Box::new(self.parse_statement()?);

        let else_branch = if self.match_token(&TokenKind::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
            location: loc,
        })
    }

    /// Parse while statement
    fn parse_while_statement(&mut self, loc: SourceLocation) -> Result<Stmt, ParseError> {
        let condition = self.parse_paren_condition("while")?;
        let body = Box::new(self.parse_statement()?);

        Ok(Stmt::While {
            condition,
            body,
            location: loc,
        })
    }

    /// Parse do-while statement
    fn parse_do_while_statement(&mut self, loc: SourceLocation) -> Result<Stmt, ParseError> {
        let body = Box::new(self.parse_statement()?);

        self.expect_token(&TokenKind::While, "Expected 'while' after do body")?;
        let condition = self.parse_paren_condition("do-while")?;
        // The semicolon after `do ... while (c)` is always optional
        self.match_token(&TokenKind::Semicolon);

        Ok(Stmt::DoWhile {
            body,
            condition,
            location: loc,
        })
    }

    /// Parse `for (init; cond; update)`, `for (x of xs)` or `for (k in obj)`
    fn parse_for_statement(&mut self, loc: SourceLocation) -> Result<Stmt, ParseError> {
        self.expect_token(&TokenKind::LParen, "Expected '(' after 'for'")?;

        // for (let x of ...) / for (const k in ...)
        if matches!(
            self.peek(),
            TokenKind::Var | TokenKind::Let | TokenKind::Const
        ) && matches!(self.peek_ahead(1), TokenKind::Ident(_))
            && is_for_each_keyword(self.peek_ahead(2))
        {
            let kind = self.parse_var_kind()?;
            let name = self.expect_identifier()?;
            return self.parse_for_each_rest(
                ForBinding {
                    kind: Some(kind),
                    name,
                },
                loc,
            );
        }

        // for (x of ...) with an existing binding
        if matches!(self.peek(), TokenKind::Ident(_)) && is_for_each_keyword(self.peek_ahead(1)) {
            let name = self.expect_identifier()?;
            return self.parse_for_each_rest(ForBinding { kind: None, name }, loc);
        }

        let init = if self.check(&TokenKind::Semicolon) {
            None
        } else if matches!(
            self.peek(),
            TokenKind::Var | TokenKind::Let | TokenKind::Const
        ) {
            Some(Box::new(self.parse_variable_declaration()?))
        } else {
            let init_loc = self.current_location();
            let expr = self.parse_expression()?;
            Some(Box::new(Stmt::Expression {
                expr,
                location: init_loc,
            }))
        };
        self.expect_token(&TokenKind::Semicolon, "Expected ';' after for init")?;

        let condition = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_token(&TokenKind::Semicolon, "Expected ';' after for condition")?;

        let update = if self.check(&TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_token(&TokenKind::RParen, "Expected ')' after for clauses")?;

        let body = Box::new(self.parse_statement()?);

        Ok(Stmt::For {
            init,
            condition,
            update,
            body,
            location: loc,
        })
    }

    /// Parse the `of xs) body` / `in obj) body` tail of a for-each loop
    fn parse_for_each_rest(
        &mut self,
        binding: ForBinding,
        loc: SourceLocation,
    ) -> Result<Stmt, ParseError> {
        let is_of = !matches!(self.advance().kind, TokenKind::In);
        let subject = if is_of {
            self.parse_assignment()?
        } else {
            self.parse_expression()?
        };
        self.expect_token(&TokenKind::RParen, "Expected ')' after for-each head")?;
        let body = Box::new(self.parse_statement()?);

        if is_of {
            Ok(Stmt::ForOf {
                binding,
                iterable: subject,
                body,
                location: loc,
            })
        } else {
            Ok(Stmt::ForIn {
                binding,
                object: subject,
                body,
                location: loc,
            })
        }
    }

    /// Parse switch statement
    fn parse_switch_statement(&mut self, loc: SourceLocation) -> Result<Stmt, ParseError> {
        let discriminant = self.parse_paren_condition("switch")?;
        self.expect_token(&TokenKind::LBrace, "Expected '{' before switch body")?;

        let mut cases = Vec::new();
        let mut seen_default = false;

        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            let case_loc = self.current_location();
            let test = if self.match_token(&TokenKind::Case) {
                let value = self.parse_expression()?;
                self.expect_token(&TokenKind::Colon, "Expected ':' after case value")?;
                Some(value)
            } else if self.match_token(&TokenKind::Default) {
                if seen_default {
                    return Err(ParseError {
                        message: "More than one default clause in switch statement".to_string(),
                        location: case_loc,
                    });
                }
                seen_default = true;
                self.expect_token(&TokenKind::Colon, "Expected ':' after 'default'")?;
                None
            } else {
                return Err(ParseError {
                    message: "Expected 'case' or 'default' in switch body".to_string(),
                    location: case_loc,
                });
            };

            let mut body = Vec::new();
            while !matches!(
                self.peek(),
                TokenKind::Case | TokenKind::Default | TokenKind::RBrace | TokenKind::Eof
            ) {
                body.push(self.parse_statement()?);
            }

            cases.push(SwitchCase {
                test,
                body,
                location: case_loc,
            });
        }

        self.expect_token(&TokenKind::RBrace, "Expected '}' after switch body")?;

        Ok(Stmt::Switch {
            discriminant,
            cases,
            location: loc,
        })
    }

    /// Parse `try { } catch (e) { } finally { }`
    fn parse_try_statement(&mut self, loc: SourceLocation) -> Result<Stmt, ParseError> {
        let block = self.parse_braced_block("try")?;

        let mut catch_param = None;
        let handler = if self.match_token(&TokenKind::Catch) {
            if self.match_token(&TokenKind::LParen) {
                catch_param = Some(self.expect_identifier()?);
                self.expect_token(&TokenKind::RParen, "Expected ')' after catch parameter")?;
            }
            Some(self.parse_braced_block("catch")?)
        } else {
            None
        };

        let finalizer = if self.match_token(&TokenKind::Finally) {
            Some(self.parse_braced_block("finally")?)
        } else {
            None
        };

        if handler.is_none() && finalizer.is_none() {
            return Err(ParseError {
                message: "Missing catch or finally after try".to_string(),
                location: self.current_location(),
            });
        }

        Ok(Stmt::Try {
            block,
            catch_param,
            handler,
            finalizer,
            location: loc,
        })
    }

    fn parse_braced_block(&mut self, keyword: &str) -> Result<Vec<Stmt>, ParseError> {
        self.expect_token(
            &TokenKind::LBrace,
            &format!("Expected '{{' after '{}'", keyword),
        )?;
        let body = self.parse_block_statements()?;
        self.expect_token(
            &TokenKind::RBrace,
            &format!("Expected '}}' after {} block", keyword),
        )?;
        Ok(body)
    }
}

/// `of` is contextual, `in` is a keyword
fn is_for_each_keyword(kind: &TokenKind) -> bool {
    match kind {
        TokenKind::In => true,
        TokenKind::Ident(word) => word == "of",
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Vec<Stmt> {
        Parser::new(source).unwrap().parse_program().unwrap().body
    }

    fn parse_err(source: &str) -> String {
        Parser::new(source)
            .unwrap()
            .parse_program()
            .unwrap_err()
            .message
    }

    #[test]
    fn test_for_loop_forms() {
        assert!(matches!(
            &parse("for (let i = 0; i < 3; i++) {}")[0],
            Stmt::For { init: Some(_), condition: Some(_), update: Some(_), .. }
        ));
        assert!(matches!(
            &parse("for (;;) break")[0],
            Stmt::For { init: None, condition: None, update: None, .. }
        ));
        assert!(matches!(
            &parse("for (const x of [1, 2]) console.log(x)")[0],
            Stmt::ForOf { binding: ForBinding { kind: Some(VarKind::Const), .. }, .. }
        ));
        assert!(matches!(
            &parse("for (k in obj) {}")[0],
            Stmt::ForIn { binding: ForBinding { kind: None, .. }, .. }
        ));
    }

    #[test]
    fn test_try_catch_finally() {
        match &parse("try { f() } catch (e) { g(e) } finally { h() }")[0] {
            Stmt::Try {
                catch_param,
                handler,
                finalizer,
                ..
            } => {
                assert_eq!(catch_param.as_deref(), Some("e"));
                assert!(handler.is_some());
                assert!(finalizer.is_some());
            }
            other => panic!("Expected try statement, got {:?}", other),
        }

        assert_eq!(parse_err("try { }"), "Missing catch or finally after try");
    }

    #[test]
    fn test_switch_cases() {
        match &parse("switch (x) { case 1: a(); case 2: b(); break; default: c() }")[0] {
            Stmt::Switch { cases, .. } => {
                assert_eq!(cases.len(), 3);
                assert_eq!(cases[1].body.len(), 2);
                assert!(cases[2].test.is_none());
            }
            other => panic!("Expected switch, got {:?}", other),
        }
    }

    #[test]
    fn test_return_before_newline_is_bare() {
        match &parse("function f() {\n  return\n  42\n}")[0] {
            Stmt::FunctionDecl(def) => match &def.body {
                FunctionBody::Block(body) => {
                    assert!(matches!(body[0], Stmt::Return { expr: None, .. }));
                    assert_eq!(body.len(), 2);
                }
                other => panic!("Expected block body, got {:?}", other),
            },
            other => panic!("Expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_const_requires_initializer() {
        assert_eq!(parse_err("const x;"), "Missing initializer in const declaration");
    }

    #[test]
    fn test_multiple_declarators() {
        match &parse("let a = 1, b, c = a")[0] {
            Stmt::VarDecl { declarations, .. } => {
                assert_eq!(declarations.len(), 3);
                assert!(declarations[1].1.is_none());
            }
            other => panic!("Expected declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_deeply_nested_blocks_are_rejected() {
        let source = format!("{}{}", "{".repeat(300), "}".repeat(300));
        assert_eq!(parse_err(&source), "Maximum nesting depth exceeded");

        let source = format!("{}x = 1;{}", "if (x) { ".repeat(10), "}".repeat(10));
        assert_eq!(parse(&source).len(), 1);
    }
}
