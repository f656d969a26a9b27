//! Expression parsing implementation
//!
//! This module handles parsing of expressions using one method per precedence
//! level (precedence climbing) and recursive descent for primary forms.
//!
//! # Supported Expressions
//!
//! - Literals: numbers, strings, template literals, booleans, `null`
//! - Array and object literals, including spread and shorthand members
//! - Function expressions and arrow functions
//! - Binary operators: arithmetic, comparison, logical, bitwise, `??`
//! - Unary operators: `-`, `+`, `!`, `~`, `typeof`, `void`, `++`, `--`
//! - Postfix: `.`, `?.`, `[]`, `()`, `++`, `--`
//! - `new` expressions, ternary, assignment and compound assignment
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use std::rc::Rc;

use crate::parser::ast::*;
use crate::parser::lexer::{TemplateChunk, TokenKind};
use crate::parser::parse::{keyword_text, ParseError, Parser};

impl Parser {
    /// Parse expression (top-level entry point, includes the comma operator)
    pub(crate) fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        let first = self.parse_assignment()?;
        if !self.check(&TokenKind::Comma) {
            return Ok(first);
        }

        let loc = first.location();
        let mut exprs = vec![first];
        while self.match_token(&TokenKind::Comma) {
            exprs.push(self.parse_assignment()?);
        }
        Ok(Expr::Sequence(exprs, loc))
    }

    /// Parse assignment, arrow function, or ternary (right-associative).
    /// Every nested expression passes through here, so each call opens a
    /// nesting level.
    pub(crate) fn parse_assignment(&mut self) -> Result<Expr, ParseError> {
        self.nested(Self::parse_assignment_level)
    }

    fn parse_assignment_level(&mut self) -> Result<Expr, ParseError> {
        if self.is_arrow_function_ahead() {
            return self.parse_arrow_function();
        }

        let expr = self.parse_ternary()?;

        let loc = self.current_location();
        let op = match self.peek() {
            TokenKind::Eq => None,
            TokenKind::PlusEq => Some(BinOp::Add),
            TokenKind::MinusEq => Some(BinOp::Sub),
            TokenKind::StarEq => Some(BinOp::Mul),
            TokenKind::StarStarEq => Some(BinOp::Pow),
            TokenKind::SlashEq => Some(BinOp::Div),
            TokenKind::PercentEq => Some(BinOp::Mod),
            _ => return Ok(expr),
        };
        self.advance();

        if !matches!(
            expr,
            Expr::Ident(..) | Expr::Member { .. } | Expr::Index { .. }
        ) {
            return Err(ParseError {
                message: "Invalid left-hand side in assignment".to_string(),
                location: expr.location(),
            });
        }

        let value = self.parse_assignment()?;
        Ok(Expr::Assign {
            op,
            target: Box::new(expr),
            value: Box::new(value),
            location: loc,
        })
    }

    /// Look ahead for `x =>` or `( ... ) =>`
    fn is_arrow_function_ahead(&self) -> bool {
        match self.peek() {
            TokenKind::Ident(_) => matches!(self.peek_ahead(1), TokenKind::Arrow),
            TokenKind::LParen => {
                let mut depth = 0usize;
                let mut offset = 0;
                loop {
                    match self.peek_ahead(offset) {
                        TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                        TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                            depth -= 1;
                            if depth == 0 {
                                return matches!(self.peek_ahead(offset + 1), TokenKind::Arrow);
                            }
                        }
                        TokenKind::Eof => return false,
                        _ => {}
                    }
                    offset += 1;
                }
            }
            _ => false,
        }
    }

    /// Parse `x => body` or `(a, b) => body`
    fn parse_arrow_function(&mut self) -> Result<Expr, ParseError> {
        let loc = self.current_location();

        let params = if self.check(&TokenKind::LParen) {
            self.advance();
            let params = self.parse_parameter_list()?;
            self.expect_token(&TokenKind::RParen, "Expected ')' after parameters")?;
            params
        } else {
            vec![Param {
                name: self.expect_identifier()?,
                default: None,
                rest: false,
            }]
        };

        self.expect_token(&TokenKind::Arrow, "Expected '=>'")?;

        let body = if self.match_token(&TokenKind::LBrace) {
            let statements = self.parse_block_statements()?;
            self.expect_token(&TokenKind::RBrace, "Expected '}' after arrow function body")?;
            FunctionBody::Block(statements)
        } else {
            FunctionBody::Expr(Box::new(self.parse_assignment()?))
        };

        Ok(Expr::Function(Rc::new(FunctionDef {
            name: None,
            params,
            body,
            is_arrow: true,
            location: loc,
            source: self.source_text(loc, self.previous_end()),
        })))
    }

    /// Parse parameter list contents (without the parentheses)
    pub(crate) fn parse_parameter_list(&mut self) -> Result<Vec<Param>, ParseError> {
        let mut params = Vec::new();

        while !self.check(&TokenKind::RParen) {
            let rest = self.match_token(&TokenKind::Ellipsis);
            let name = self.expect_identifier()?;
            let default = if !rest && self.match_token(&TokenKind::Eq) {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            params.push(Param {
                name,
                default,
                rest,
            });

            if rest || !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        Ok(params)
    }

    /// Parse `function name?(params) { body }`; the `function` keyword is
    /// already consumed
    pub(crate) fn parse_function_rest(
        &mut self,
        name: Option<String>,
        loc: SourceLocation,
    ) -> Result<Rc<FunctionDef>, ParseError> {
        self.expect_token(&TokenKind::LParen, "Expected '(' before parameters")?;
        let params = self.parse_parameter_list()?;
        self.expect_token(&TokenKind::RParen, "Expected ')' after parameters")?;
        self.expect_token(&TokenKind::LBrace, "Expected '{' before function body")?;
        let body = self.parse_block_statements()?;
        self.expect_token(&TokenKind::RBrace, "Expected '}' after function body")?;

        Ok(Rc::new(FunctionDef {
            name,
            params,
            body: FunctionBody::Block(body),
            is_arrow: false,
            location: loc,
            source: self.source_text(loc, self.previous_end()),
        }))
    }

    /// Parse ternary: condition ? then_expr : else_expr
    fn parse_ternary(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_nullish()?;

        if self.match_token(&TokenKind::Question) {
            let loc = self.previous_location();
            let then_expr = self.parse_assignment()?;
            self.expect_token(&TokenKind::Colon, "Expected ':' in conditional expression")?;
            let else_expr = self.parse_assignment()?;

            return Ok(Expr::Conditional {
                condition: Box::new(expr),
                then_expr: Box::new(then_expr),
                else_expr: Box::new(else_expr),
                location: loc,
            });
        }

        Ok(expr)
    }

    /// Parse nullish coalescing (??)
    fn parse_nullish(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_logical_or()?;
        let mut links = 0;

        while self.match_token(&TokenKind::Nullish) {
            self.enter()?;
            links += 1;
            let loc = self.previous_location();
            let right = self.parse_logical_or()?;
            left = Expr::Logical {
                op: LogicalOp::Nullish,
                left: Box::new(left),
                right: Box::new(right),
                location: loc,
            };
        }

        self.depth -= links;
        Ok(left)
    }

    /// Parse logical OR (||)
    fn parse_logical_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_logical_and()?;
        let mut links = 0;

        while self.match_token(&TokenKind::OrOr) {
            self.enter()?;
            links += 1;
            let loc = self.previous_location();
            let right = self.parse_logical_and()?;
            left = Expr::Logical {
                op: LogicalOp::Or,
                left: Box::new(left),
                right: Box::new(right),
                location: loc,
            };
        }

        self.depth -= links;
        Ok(left)
    }

    /// Parse logical AND (&&)
    fn parse_logical_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_binary(0)?;
        let mut links = 0;

        while self.match_token(&TokenKind::AndAnd) {
            self.enter()?;
            links += 1;
            let loc = self.previous_location();
            let right = self.parse_binary(0)?;
            left = Expr::Logical {
                op: LogicalOp::And,
                left: Box::new(left),
                right: Box::new(right),
                location: loc,
            };
        }

        self.depth -= links;
        Ok(left)
    }

    /// Precedence climbing over the left-associative binary operators, from
    /// bitwise OR (level 0) up to multiplicative (level 7)
    fn parse_binary(&mut self, min_level: u8) -> Result<Expr, ParseError> {
        let mut left = self.parse_exponent()?;
        let mut links = 0;

        loop {
            let Some((op, level)) = binary_operator(self.peek()) else {
                break;
            };
            if level < min_level {
                break;
            }
            let loc = self.current_location();
            self.advance();
            self.enter()?;
            links += 1;

            let right = self.parse_binary(level + 1)?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                location: loc,
            };
        }

        self.depth -= links;
        Ok(left)
    }

    /// Parse exponentiation (** is right-associative)
    fn parse_exponent(&mut self) -> Result<Expr, ParseError> {
        let base = self.parse_unary()?;

        if self.match_token(&TokenKind::StarStar) {
            let loc = self.previous_location();
            let exponent = self.nested(Self::parse_exponent)?;
            return Ok(Expr::Binary {
                op: BinOp::Pow,
                left: Box::new(base),
                right: Box::new(exponent),
                location: loc,
            });
        }

        Ok(base)
    }

    /// Parse unary (! ~ - + typeof void ++ --)
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let loc = self.current_location();

        let op = match self.peek() {
            TokenKind::Bang => Some(UnOp::Not),
            TokenKind::Tilde => Some(UnOp::BitNot),
            TokenKind::Minus => Some(UnOp::Neg),
            TokenKind::Plus => Some(UnOp::Plus),
            TokenKind::Typeof => Some(UnOp::TypeOf),
            TokenKind::Void => Some(UnOp::Void),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.nested(Self::parse_unary)?;
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
                location: loc,
            });
        }

        let update = match self.peek() {
            TokenKind::PlusPlus => Some(UpdateOp::Inc),
            TokenKind::MinusMinus => Some(UpdateOp::Dec),
            _ => None,
        };
        if let Some(op) = update {
            self.advance();
            let target = self.nested(Self::parse_unary)?;
            Self::check_update_target(&target)?;
            return Ok(Expr::Update {
                op,
                prefix: true,
                target: Box::new(target),
                location: loc,
            });
        }

        self.parse_postfix()
    }

    /// Parse postfix ++ / -- (not allowed after a line break)
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_call_member()?;

        if self.current().newline_before {
            return Ok(expr);
        }

        let loc = self.current_location();
        let update = match self.peek() {
            TokenKind::PlusPlus => UpdateOp::Inc,
            TokenKind::MinusMinus => UpdateOp::Dec,
            _ => return Ok(expr),
        };
        self.advance();
        Self::check_update_target(&expr)?;

        Ok(Expr::Update {
            op: update,
            prefix: false,
            target: Box::new(expr),
            location: loc,
        })
    }

    fn check_update_target(target: &Expr) -> Result<(), ParseError> {
        if matches!(
            target,
            Expr::Ident(..) | Expr::Member { .. } | Expr::Index { .. }
        ) {
            Ok(())
        } else {
            Err(ParseError {
                message: "Invalid left-hand side expression in update operation".to_string(),
                location: target.location(),
            })
        }
    }

    /// Parse member access and calls: `a.b`, `a?.b`, `a[i]`, `f(x)`, `new F(x)`
    fn parse_call_member(&mut self) -> Result<Expr, ParseError> {
        let mut expr = if self.check(&TokenKind::New) {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };
        let mut links = 0;

        loop {
            let loc = self.current_location();
            if matches!(
                self.peek(),
                TokenKind::Dot | TokenKind::QuestionDot | TokenKind::LBracket | TokenKind::LParen
            ) {
                self.enter()?;
                links += 1;
            }

            if self.match_token(&TokenKind::Dot) {
                let property = self.expect_property_name()?;
                expr = Expr::Member {
                    object: Box::new(expr),
                    property,
                    optional: false,
                    location: loc,
                };
            } else if self.match_token(&TokenKind::QuestionDot) {
                if self.match_token(&TokenKind::LParen) {
                    let args = self.parse_argument_list()?;
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                        optional: true,
                        location: loc,
                    };
                } else if self.match_token(&TokenKind::LBracket) {
                    let index = self.parse_expression()?;
                    self.expect_token(&TokenKind::RBracket, "Expected ']' after index")?;
                    expr = Expr::Index {
                        object: Box::new(expr),
                        index: Box::new(index),
                        optional: true,
                        location: loc,
                    };
                } else {
                    let property = self.expect_property_name()?;
                    expr = Expr::Member {
                        object: Box::new(expr),
                        property,
                        optional: true,
                        location: loc,
                    };
                }
            } else if self.match_token(&TokenKind::LBracket) {
                let index = self.parse_expression()?;
                self.expect_token(&TokenKind::RBracket, "Expected ']' after index")?;
                expr = Expr::Index {
                    object: Box::new(expr),
                    index: Box::new(index),
                    optional: false,
                    location: loc,
                };
            } else if self.check(&TokenKind::LParen) {
                self.advance();
                let args = self.parse_argument_list()?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                    optional: false,
                    location: loc,
                };
            } else if let TokenKind::Template(_) = self.peek() {
                return Err(ParseError {
                    message: "Tagged templates are not supported".to_string(),
                    location: loc,
                });
            } else {
                break;
            }
        }

        self.depth -= links;
        Ok(expr)
    }

    /// Parse `new Callee(args)`; arguments are optional
    fn parse_new(&mut self) -> Result<Expr, ParseError> {
        let loc = self.current_location();
        self.advance(); // consume 'new'

        let mut callee = if self.check(&TokenKind::New) {
            self.nested(Self::parse_new)?
        } else {
            self.parse_primary()?
        };
        let mut links = 0;

        loop {
            let member_loc = self.current_location();
            if matches!(self.peek(), TokenKind::Dot | TokenKind::LBracket) {
                self.enter()?;
                links += 1;
            }
            if self.match_token(&TokenKind::Dot) {
                let property = self.expect_property_name()?;
                callee = Expr::Member {
                    object: Box::new(callee),
                    property,
                    optional: false,
                    location: member_loc,
                };
            } else if self.match_token(&TokenKind::LBracket) {
                let index = self.parse_expression()?;
                self.expect_token(&TokenKind::RBracket, "Expected ']' after index")?;
                callee = Expr::Index {
                    object: Box::new(callee),
                    index: Box::new(index),
                    optional: false,
                    location: member_loc,
                };
            } else {
                break;
            }
        }

        let args = if self.match_token(&TokenKind::LParen) {
            self.parse_argument_list()?
        } else {
            Vec::new()
        };
        self.depth -= links;

        Ok(Expr::New {
            callee: Box::new(callee),
            args,
            location: loc,
        })
    }

    /// Parse argument list contents and the closing parenthesis
    fn parse_argument_list(&mut self) -> Result<Vec<Element>, ParseError> {
        let mut args = Vec::new();

        while !self.check(&TokenKind::RParen) {
            if self.match_token(&TokenKind::Ellipsis) {
                args.push(Element::Spread(self.parse_assignment()?));
            } else {
                args.push(Element::Item(self.parse_assignment()?));
            }

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.expect_token(&TokenKind::RParen, "Expected ')' after arguments")?;
        Ok(args)
    }

    /// Parse primary (literals, identifiers, literals, parenthesized expressions)
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let loc = self.current_location();

        let expr = match self.peek().clone() {
            TokenKind::Number(n) => Expr::Number(n, loc),
            TokenKind::Str(s) => Expr::Str(Rc::from(s.as_str()), loc),
            TokenKind::True => Expr::Bool(true, loc),
            TokenKind::False => Expr::Bool(false, loc),
            TokenKind::Null => Expr::Null(loc),
            TokenKind::This => Expr::This(loc),
            TokenKind::Ident(name) => {
                if name == "undefined" {
                    Expr::Undefined(loc)
                } else {
                    Expr::Ident(name, loc)
                }
            }
            TokenKind::Template(chunks) => {
                self.advance();
                return self.parse_template(chunks, loc);
            }
            TokenKind::Function => {
                self.advance();
                let name = match self.peek() {
                    TokenKind::Ident(_) => Some(self.expect_identifier()?),
                    _ => None,
                };
                return Ok(Expr::Function(self.parse_function_rest(name, loc)?));
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect_token(&TokenKind::RParen, "Expected ')' after expression")?;
                return Ok(expr);
            }
            TokenKind::LBracket => {
                self.advance();
                return self.parse_array_literal(loc);
            }
            TokenKind::LBrace => {
                self.advance();
                return self.parse_object_literal(loc);
            }
            _ => return Err(self.unexpected()),
        };

        self.advance();
        Ok(expr)
    }

    /// Build a template expression; each substitution is parsed by a nested parser
    fn parse_template(
        &mut self,
        chunks: Vec<TemplateChunk>,
        loc: SourceLocation,
    ) -> Result<Expr, ParseError> {
        let mut quasis = Vec::new();
        let mut exprs = Vec::new();
        let mut text = String::new();

        for chunk in chunks {
            match chunk {
                TemplateChunk::Text(t) => text.push_str(&t),
                TemplateChunk::Substitution(tokens) => {
                    quasis.push(std::mem::take(&mut text));
                    let mut inner = Parser::from_tokens(tokens);
                    inner.depth = self.depth;
                    inner.lines = Rc::clone(&self.lines);
                    exprs.push(inner.parse_standalone_expression()?);
                }
            }
        }
        quasis.push(text);

        Ok(Expr::Template {
            quasis,
            exprs,
            location: loc,
        })
    }

    /// Parse array literal contents; the '[' is already consumed
    fn parse_array_literal(&mut self, loc: SourceLocation) -> Result<Expr, ParseError> {
        let mut elements = Vec::new();

        while !self.check(&TokenKind::RBracket) {
            if self.check(&TokenKind::Comma) {
                self.advance();
                elements.push(Element::Hole);
                continue;
            }

            if self.match_token(&TokenKind::Ellipsis) {
                elements.push(Element::Spread(self.parse_assignment()?));
            } else {
                elements.push(Element::Item(self.parse_assignment()?));
            }

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.expect_token(&TokenKind::RBracket, "Expected ']' after array elements")?;
        Ok(Expr::Array {
            elements,
            location: loc,
        })
    }

    /// Parse object literal contents; the '{' is already consumed
    fn parse_object_literal(&mut self, loc: SourceLocation) -> Result<Expr, ParseError> {
        let mut members = Vec::new();

        while !self.check(&TokenKind::RBrace) {
            if self.match_token(&TokenKind::Ellipsis) {
                members.push(ObjectMember::Spread(self.parse_assignment()?));
            } else {
                members.push(self.parse_object_property()?);
            }

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.expect_token(&TokenKind::RBrace, "Expected '}' after object properties")?;
        Ok(Expr::Object {
            members,
            location: loc,
        })
    }

    /// Parse `key: value`, `key(params) { ... }`, or shorthand `key`
    fn parse_object_property(&mut self) -> Result<ObjectMember, ParseError> {
        let key_loc = self.current_location();
        let (key, shorthand_ok) = match self.peek().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                (PropertyKey::Named(name), true)
            }
            TokenKind::Str(s) => {
                self.advance();
                (PropertyKey::Named(s), false)
            }
            TokenKind::Number(n) => {
                self.advance();
                (PropertyKey::Named(number_key(n)), false)
            }
            TokenKind::LBracket => {
                self.advance();
                let expr = self.parse_assignment()?;
                self.expect_token(&TokenKind::RBracket, "Expected ']' after computed key")?;
                (PropertyKey::Computed(Box::new(expr)), false)
            }
            other => match keyword_text(&other) {
                Some(text) => {
                    self.advance();
                    (PropertyKey::Named(text.to_string()), false)
                }
                None => return Err(self.unexpected()),
            },
        };

        if self.match_token(&TokenKind::Colon) {
            let value = self.parse_assignment()?;
            return Ok(ObjectMember::Property { key, value });
        }

        // Methods do not bind their own name; the object literal names them
        if self.check(&TokenKind::LParen) {
            let def = self.parse_function_rest(None, key_loc)?;
            return Ok(ObjectMember::Property {
                key,
                value: Expr::Function(def),
            });
        }

        match key {
            PropertyKey::Named(name) if shorthand_ok => Ok(ObjectMember::Property {
                key: PropertyKey::Named(name.clone()),
                value: Expr::Ident(name, key_loc),
            }),
            _ => Err(self.unexpected()),
        }
    }
}

/// Binary operator and precedence level for a token
fn binary_operator(kind: &TokenKind) -> Option<(BinOp, u8)> {
    Some(match kind {
        TokenKind::Pipe => (BinOp::BitOr, 0),
        TokenKind::Caret => (BinOp::BitXor, 1),
        TokenKind::Amp => (BinOp::BitAnd, 2),
        TokenKind::EqEq => (BinOp::Eq, 3),
        TokenKind::NotEq => (BinOp::Ne, 3),
        TokenKind::EqEqEq => (BinOp::StrictEq, 3),
        TokenKind::NotEqEq => (BinOp::StrictNe, 3),
        TokenKind::Lt => (BinOp::Lt, 4),
        TokenKind::Le => (BinOp::Le, 4),
        TokenKind::Gt => (BinOp::Gt, 4),
        TokenKind::Ge => (BinOp::Ge, 4),
        TokenKind::Instanceof => (BinOp::InstanceOf, 4),
        TokenKind::In => (BinOp::In, 4),
        TokenKind::LtLt => (BinOp::Shl, 5),
        TokenKind::GtGt => (BinOp::Shr, 5),
        TokenKind::GtGtGt => (BinOp::UShr, 5),
        TokenKind::Plus => (BinOp::Add, 6),
        TokenKind::Minus => (BinOp::Sub, 6),
        TokenKind::Star => (BinOp::Mul, 7),
        TokenKind::Slash => (BinOp::Div, 7),
        TokenKind::Percent => (BinOp::Mod, 7),
        _ => return None,
    })
}

/// Property key spelling of a numeric literal (`1` rather than `1.0`)
fn number_key(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(source: &str) -> Expr {
        Parser::new(source)
            .unwrap()
            .parse_standalone_expression()
            .unwrap()
    }

    #[test]
    fn test_precedence() {
        match expr("1 + 2 * 3") {
            Expr::Binary {
                op: BinOp::Add,
                right,
                ..
            } => assert!(matches!(*right, Expr::Binary { op: BinOp::Mul, .. })),
            other => panic!("unexpected tree {:?}", other),
        }
    }

    #[test]
    fn test_exponent_is_right_associative() {
        match expr("2 ** 3 ** 2") {
            Expr::Binary {
                op: BinOp::Pow,
                left,
                right,
                ..
            } => {
                assert!(matches!(*left, Expr::Number(n, _) if n == 2.0));
                assert!(matches!(*right, Expr::Binary { op: BinOp::Pow, .. }));
            }
            other => panic!("unexpected tree {:?}", other),
        }
    }

    #[test]
    fn test_arrow_functions() {
        match expr("(a, b = 2) => a + b") {
            Expr::Function(def) => {
                assert!(def.is_arrow);
                assert_eq!(def.params.len(), 2);
                assert_eq!(def.arity(), 1);
                assert!(matches!(def.body, FunctionBody::Expr(_)));
            }
            other => panic!("unexpected tree {:?}", other),
        }

        match expr("x => { return x }") {
            Expr::Function(def) => assert!(matches!(def.body, FunctionBody::Block(_))),
            other => panic!("unexpected tree {:?}", other),
        }
    }

    #[test]
    fn test_parenthesized_expression_is_not_arrow() {
        assert!(matches!(expr("(1 + 2) * 3"), Expr::Binary { op: BinOp::Mul, .. }));
    }

    #[test]
    fn test_object_literal_forms() {
        match expr("({ a: 1, b, 'c d': 2, [k]: 3, m() { return 1 }, ...rest })") {
            Expr::Object { members, .. } => {
                assert_eq!(members.len(), 6);
                assert!(matches!(
                    &members[1],
                    ObjectMember::Property { value: Expr::Ident(name, _), .. } if name == "b"
                ));
                assert!(matches!(&members[5], ObjectMember::Spread(_)));
            }
            other => panic!("unexpected tree {:?}", other),
        }
    }

    #[test]
    fn test_member_call_chain() {
        match expr("console.log(a?.b, ...xs)") {
            Expr::Call { callee, args, .. } => {
                assert_eq!(callee.describe(), "console.log");
                assert!(matches!(&args[0], Element::Item(Expr::Member { optional: true, .. })));
                assert!(matches!(&args[1], Element::Spread(_)));
            }
            other => panic!("unexpected tree {:?}", other),
        }
    }

    #[test]
    fn test_new_expression() {
        match expr("new Error('boom')") {
            Expr::New { callee, args, .. } => {
                assert!(matches!(*callee, Expr::Ident(ref n, _) if n == "Error"));
                assert_eq!(args.len(), 1);
            }
            other => panic!("unexpected tree {:?}", other),
        }
    }

    #[test]
    fn test_template_literal() {
        match expr("`a${1}b${2}`") {
            Expr::Template { quasis, exprs, .. } => {
                assert_eq!(quasis, vec!["a", "b", ""]);
                assert_eq!(exprs.len(), 2);
            }
            other => panic!("unexpected tree {:?}", other),
        }
    }

    fn nesting_error(source: &str) -> String {
        Parser::new(source)
            .unwrap()
            .parse_standalone_expression()
            .unwrap_err()
            .message
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let depth_error = "Maximum nesting depth exceeded";
        assert_eq!(nesting_error(&format!("{}0{}", "[".repeat(500), "]".repeat(500))), depth_error);
        assert_eq!(nesting_error(&format!("{}x", "!".repeat(500))), depth_error);
        assert_eq!(nesting_error(&format!("x{}", ".y".repeat(500))), depth_error);
        assert_eq!(nesting_error(&["1"; 500].join(" + ")), depth_error);
        assert_eq!(nesting_error(&["2"; 500].join(" ** ")), depth_error);
        assert_eq!(nesting_error(&format!("{}X", "new ".repeat(500))), depth_error);
    }

    #[test]
    fn test_moderate_nesting_is_accepted() {
        expr(&format!("{}0{}", "[".repeat(30), "]".repeat(30)));
        expr(&["1"; 30].join(" + "));
        expr("xs.filter(x => x > 1).map(x => [x, { v: x * 2 }]).join(',')");
    }

    #[test]
    fn test_invalid_assignment_target() {
        let err = Parser::new("1 = 2")
            .unwrap()
            .parse_standalone_expression()
            .unwrap_err();
        assert_eq!(err.message, "Invalid left-hand side in assignment");
    }
}
