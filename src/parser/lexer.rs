//! Lexer (tokenizer) for snippet source code
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the parser.
//! Every token remembers whether a line break preceded it, which the parser uses
//! to approximate automatic semicolon insertion.
//!
//! Template literals are lexed eagerly: each `${ ... }` substitution is
//! tokenized by a nested lexer so the parser receives ready-made token runs.

use super::ast::SourceLocation;
use crate::interpreter::constants::MAX_NESTING_DEPTH;
use std::fmt;
use thiserror::Error;

/// Piece of a template literal
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateChunk {
    Text(String),
    Substitution(Vec<Token>),
}

/// All token kinds produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Number(f64),
    Str(String),
    Template(Vec<TemplateChunk>),

    // Identifiers
    Ident(String),

    // Keywords
    Var,
    Let,
    Const,
    Function,
    Return,
    If,
    Else,
    While,
    Do,
    For,
    In,
    Break,
    Continue,
    Throw,
    Try,
    Catch,
    Finally,
    Switch,
    Case,
    Default,
    New,
    Typeof,
    Void,
    Instanceof,
    This,
    True,
    False,
    Null,

    // Arithmetic
    Plus,       // +
    Minus,      // -
    Star,       // *
    StarStar,   // **
    Slash,      // /
    Percent,    // %
    PlusPlus,   // ++
    MinusMinus, // --

    // Comparison
    EqEq,      // ==
    EqEqEq,    // ===
    NotEq,     // !=
    NotEqEq,   // !==
    Lt,        // <
    Le,        // <=
    Gt,        // >
    Ge,        // >=

    // Logical
    AndAnd,   // &&
    OrOr,     // ||
    Nullish,  // ??
    Bang,     // !

    // Bitwise
    Amp,    // &
    Pipe,   // |
    Caret,  // ^
    Tilde,  // ~
    LtLt,   // <<
    GtGt,   // >>
    GtGtGt, // >>>

    // Assignment
    Eq,          // =
    PlusEq,      // +=
    MinusEq,     // -=
    StarEq,      // *=
    StarStarEq,  // **=
    SlashEq,     // /=
    PercentEq,   // %=

    // Punctuation
    Arrow,         // =>
    Dot,           // .
    QuestionDot,   // ?.
    Ellipsis,      // ...
    Question,      // ?
    Colon,         // :
    LParen,        // (
    RParen,        // )
    LBrace,        // {
    RBrace,        // }
    LBracket,      // [
    RBracket,      // ]
    Semicolon,     // ;
    Comma,         // ,

    // End of input
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Number(n) => return write!(f, "number {}", n),
            TokenKind::Str(s) => return write!(f, "string \"{}\"", s),
            TokenKind::Template(_) => "template literal",
            TokenKind::Ident(s) => return write!(f, "identifier '{}'", s),
            TokenKind::Var => "'var'",
            TokenKind::Let => "'let'",
            TokenKind::Const => "'const'",
            TokenKind::Function => "'function'",
            TokenKind::Return => "'return'",
            TokenKind::If => "'if'",
            TokenKind::Else => "'else'",
            TokenKind::While => "'while'",
            TokenKind::Do => "'do'",
            TokenKind::For => "'for'",
            TokenKind::In => "'in'",
            TokenKind::Break => "'break'",
            TokenKind::Continue => "'continue'",
            TokenKind::Throw => "'throw'",
            TokenKind::Try => "'try'",
            TokenKind::Catch => "'catch'",
            TokenKind::Finally => "'finally'",
            TokenKind::Switch => "'switch'",
            TokenKind::Case => "'case'",
            TokenKind::Default => "'default'",
            TokenKind::New => "'new'",
            TokenKind::Typeof => "'typeof'",
            TokenKind::Void => "'void'",
            TokenKind::Instanceof => "'instanceof'",
            TokenKind::This => "'this'",
            TokenKind::True => "'true'",
            TokenKind::False => "'false'",
            TokenKind::Null => "'null'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::StarStar => "'**'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::PlusPlus => "'++'",
            TokenKind::MinusMinus => "'--'",
            TokenKind::EqEq => "'=='",
            TokenKind::EqEqEq => "'==='",
            TokenKind::NotEq => "'!='",
            TokenKind::NotEqEq => "'!=='",
            TokenKind::Lt => "'<'",
            TokenKind::Le => "'<='",
            TokenKind::Gt => "'>'",
            TokenKind::Ge => "'>='",
            TokenKind::AndAnd => "'&&'",
            TokenKind::OrOr => "'||'",
            TokenKind::Nullish => "'??'",
            TokenKind::Bang => "'!'",
            TokenKind::Amp => "'&'",
            TokenKind::Pipe => "'|'",
            TokenKind::Caret => "'^'",
            TokenKind::Tilde => "'~'",
            TokenKind::LtLt => "'<<'",
            TokenKind::GtGt => "'>>'",
            TokenKind::GtGtGt => "'>>>'",
            TokenKind::Eq => "'='",
            TokenKind::PlusEq => "'+='",
            TokenKind::MinusEq => "'-='",
            TokenKind::StarEq => "'*='",
            TokenKind::StarStarEq => "'**='",
            TokenKind::SlashEq => "'/='",
            TokenKind::PercentEq => "'%='",
            TokenKind::Arrow => "'=>'",
            TokenKind::Dot => "'.'",
            TokenKind::QuestionDot => "'?.'",
            TokenKind::Ellipsis => "'...'",
            TokenKind::Question => "'?'",
            TokenKind::Colon => "':'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Semicolon => "';'",
            TokenKind::Comma => "','",
            TokenKind::Eof => "end of input",
        };
        f.write_str(text)
    }
}

/// A token with its position and line-break flag
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub location: SourceLocation,
    /// Position just past the token's last character
    pub end: SourceLocation,
    /// Whether at least one line terminator appeared between the previous
    /// token and this one
    pub newline_before: bool,
}

/// Lexer error type
#[derive(Debug, Clone, Error)]
#[error("{message} (line {}, column {})", location.line, location.column)]
pub struct LexError {
    pub message: String,
    pub location: SourceLocation,
}

/// Lexer for snippet source code
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    saw_newline: bool,
    /// Template substitutions enclosing this lexer
    depth: usize,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self::starting_at(input, SourceLocation::new(1, 1))
    }

    /// Create a lexer whose locations are offset to `start`; used for the
    /// substitutions inside template literals.
    fn starting_at(input: &str, start: SourceLocation) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: start.line,
            column: start.column,
            saw_newline: false,
            depth: 0,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments()?;

            let location = self.current_location();
            let newline_before = std::mem::take(&mut self.saw_newline);

            if self.is_at_end() {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    location,
                    end: location,
                    newline_before,
                });
                break;
            }

            let kind = self.next_token()?;
            tokens.push(Token {
                kind,
                location,
                end: self.current_location(),
                newline_before,
            });
        }

        Ok(tokens)
    }

    /// Get next token
    fn next_token(&mut self) -> Result<TokenKind, LexError> {
        let loc = self.current_location();
        let ch = self.advance().ok_or_else(|| LexError {
            message: "Unexpected end of input".to_string(),
            location: loc,
        })?;

        match ch {
            '"' | '\'' => self.string_literal(ch, loc),
            '`' => self.template_literal(loc),
            '0'..='9' => self.number_literal(ch, loc),
            '.' if self.peek().is_some_and(|c| c.is_ascii_digit()) => self.number_literal(ch, loc),
            c if is_ident_start(c) => Ok(self.identifier_or_keyword(ch)),

            '+' => Ok(if self.eat('+') {
                TokenKind::PlusPlus
            } else if self.eat('=') {
                TokenKind::PlusEq
            } else {
                TokenKind::Plus
            }),
            '-' => Ok(if self.eat('-') {
                TokenKind::MinusMinus
            } else if self.eat('=') {
                TokenKind::MinusEq
            } else {
                TokenKind::Minus
            }),
            '*' => Ok(if self.eat('*') {
                if self.eat('=') {
                    TokenKind::StarStarEq
                } else {
                    TokenKind::StarStar
                }
            } else if self.eat('=') {
                TokenKind::StarEq
            } else {
                TokenKind::Star
            }),
            '/' => Ok(if self.eat('=') {
                TokenKind::SlashEq
            } else {
                TokenKind::Slash
            }),
            '%' => Ok(if self.eat('=') {
                TokenKind::PercentEq
            } else {
                TokenKind::Percent
            }),
            '=' => Ok(if self.eat('=') {
                if self.eat('=') {
                    TokenKind::EqEqEq
                } else {
                    TokenKind::EqEq
                }
            } else if self.eat('>') {
                TokenKind::Arrow
            } else {
                TokenKind::Eq
            }),
            '!' => Ok(if self.eat('=') {
                if self.eat('=') {
                    TokenKind::NotEqEq
                } else {
                    TokenKind::NotEq
                }
            } else {
                TokenKind::Bang
            }),
            '<' => Ok(if self.eat('=') {
                TokenKind::Le
            } else if self.eat('<') {
                TokenKind::LtLt
            } else {
                TokenKind::Lt
            }),
            '>' => Ok(if self.eat('=') {
                TokenKind::Ge
            } else if self.eat('>') {
                if self.eat('>') {
                    TokenKind::GtGtGt
                } else {
                    TokenKind::GtGt
                }
            } else {
                TokenKind::Gt
            }),
            '&' => Ok(if self.eat('&') {
                TokenKind::AndAnd
            } else {
                TokenKind::Amp
            }),
            '|' => Ok(if self.eat('|') {
                TokenKind::OrOr
            } else {
                TokenKind::Pipe
            }),
            '?' => {
                if self.eat('?') {
                    Ok(TokenKind::Nullish)
                } else if self.peek() == Some('.')
                    && !self.peek_ahead(1).is_some_and(|c| c.is_ascii_digit())
                {
                    self.advance();
                    Ok(TokenKind::QuestionDot)
                } else {
                    Ok(TokenKind::Question)
                }
            }
            '.' => {
                if self.peek() == Some('.') && self.peek_ahead(1) == Some('.') {
                    self.advance();
                    self.advance();
                    Ok(TokenKind::Ellipsis)
                } else {
                    Ok(TokenKind::Dot)
                }
            }
            '^' => Ok(TokenKind::Caret),
            '~' => Ok(TokenKind::Tilde),
            ':' => Ok(TokenKind::Colon),
            '(' => Ok(TokenKind::LParen),
            ')' => Ok(TokenKind::RParen),
            '{' => Ok(TokenKind::LBrace),
            '}' => Ok(TokenKind::RBrace),
            '[' => Ok(TokenKind::LBracket),
            ']' => Ok(TokenKind::RBracket),
            ';' => Ok(TokenKind::Semicolon),
            ',' => Ok(TokenKind::Comma),

            _ => Err(LexError {
                message: format!("Invalid or unexpected token '{}'", ch),
                location: loc,
            }),
        }
    }

    /// Parse a quoted string literal; the opening quote is already consumed
    fn string_literal(&mut self, quote: char, loc: SourceLocation) -> Result<TokenKind, LexError> {
        let mut string = String::new();

        while let Some(ch) = self.peek() {
            if ch == quote {
                self.advance();
                return Ok(TokenKind::Str(string));
            }
            if ch == '\n' {
                break;
            }

            self.advance();
            if ch == '\\' {
                if let Some(c) = self.escape_sequence()? {
                    string.push(c);
                }
            } else {
                string.push(ch);
            }
        }

        Err(LexError {
            message: "Invalid or unexpected token: unterminated string literal".to_string(),
            location: loc,
        })
    }

    /// Decode the character after a backslash. Returns `None` for a line
    /// continuation.
    fn escape_sequence(&mut self) -> Result<Option<char>, LexError> {
        let loc = self.current_location();
        let escaped = self.advance().ok_or_else(|| LexError {
            message: "Unexpected end of input in escape sequence".to_string(),
            location: loc,
        })?;

        let c = match escaped {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'v' => '\u{b}',
            '0' => '\0',
            '\n' => return Ok(None),
            'x' => self.hex_escape(2, loc)?,
            'u' => {
                if self.eat('{') {
                    let mut digits = String::new();
                    while let Some(c) = self.advance() {
                        if c == '}' {
                            break;
                        }
                        digits.push(c);
                    }
                    let code = parse_hex(&digits, loc)?;
                    match char::from_u32(code) {
                        Some(c) => c,
                        None if (0xD800..0xE000).contains(&code) => char::REPLACEMENT_CHARACTER,
                        None => return Err(invalid_escape(&digits, loc)),
                    }
                } else {
                    self.code_unit_escape(loc)?
                }
            }
            other => other,
        };
        Ok(Some(c))
    }

    fn hex_escape(&mut self, len: usize, loc: SourceLocation) -> Result<char, LexError> {
        let digits = self.hex_digits(len);
        let code = parse_hex(&digits, loc)?;
        char::from_u32(code).ok_or_else(|| invalid_escape(&digits, loc))
    }

    fn hex_digits(&mut self, len: usize) -> String {
        let mut digits = String::with_capacity(len);
        for _ in 0..len {
            match self.advance() {
                Some(c) => digits.push(c),
                None => break,
            }
        }
        digits
    }

    /// Decode `\uXXXX`; a high surrogate directly followed by a `\uXXXX` low
    /// surrogate forms one character, an unpaired surrogate becomes U+FFFD
    fn code_unit_escape(&mut self, loc: SourceLocation) -> Result<char, LexError> {
        let digits = self.hex_digits(4);
        let unit = parse_hex(&digits, loc)?;
        let Ok(unit) = u16::try_from(unit) else {
            return Err(invalid_escape(&digits, loc));
        };

        let mut units = vec![unit];
        if (0xD800..0xDC00).contains(&unit) {
            if let Some(low) = self.low_surrogate_ahead() {
                for _ in 0..6 {
                    self.advance();
                }
                units.push(low);
            }
        }

        Ok(char::decode_utf16(units)
            .next()
            .map(|decoded| decoded.unwrap_or(char::REPLACEMENT_CHARACTER))
            .unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    /// A `\uDC00`..`\uDFFF` escape starting at the current position
    fn low_surrogate_ahead(&self) -> Option<u16> {
        let rest = self.input.get(self.position..self.position + 6)?;
        if rest[0] != '\\' || rest[1] != 'u' {
            return None;
        }
        let digits: String = rest[2..].iter().collect();
        u16::from_str_radix(&digits, 16)
            .ok()
            .filter(|unit| (0xDC00..0xE000).contains(unit))
    }

    /// Parse a template literal; the opening backtick is already consumed
    fn template_literal(&mut self, loc: SourceLocation) -> Result<TokenKind, LexError> {
        let mut chunks = Vec::new();
        let mut text = String::new();

        loop {
            let ch = self.advance().ok_or_else(|| LexError {
                message: "Unterminated template literal".to_string(),
                location: loc,
            })?;

            match ch {
                '`' => break,
                '\\' => {
                    if let Some(c) = self.escape_sequence()? {
                        text.push(c);
                    }
                }
                '$' if self.peek() == Some('{') => {
                    self.advance();
                    if !text.is_empty() {
                        chunks.push(TemplateChunk::Text(std::mem::take(&mut text)));
                    }
                    let start = self.current_location();
                    if self.depth >= MAX_NESTING_DEPTH {
                        return Err(LexError {
                            message: "Maximum nesting depth exceeded".to_string(),
                            location: start,
                        });
                    }
                    let source = self.substitution_source(loc)?;
                    let mut inner = Lexer::starting_at(&source, start);
                    inner.depth = self.depth + 1;
                    chunks.push(TemplateChunk::Substitution(inner.tokenize()?));
                }
                _ => text.push(ch),
            }
        }

        if !text.is_empty() || chunks.is_empty() {
            chunks.push(TemplateChunk::Text(text));
        }
        Ok(TokenKind::Template(chunks))
    }

    /// Collect the raw source of a `${ ... }` substitution up to its matching
    /// closing brace, skipping braces that appear inside nested strings
    fn substitution_source(&mut self, loc: SourceLocation) -> Result<String, LexError> {
        let mut source = String::new();
        let mut depth = 0usize;
        let mut quote: Option<char> = None;

        while let Some(ch) = self.advance() {
            if let Some(q) = quote {
                source.push(ch);
                if ch == '\\' {
                    if let Some(next) = self.advance() {
                        source.push(next);
                    }
                } else if ch == q {
                    quote = None;
                }
                continue;
            }

            match ch {
                '"' | '\'' | '`' => quote = Some(ch),
                '{' => depth += 1,
                '}' if depth == 0 => return Ok(source),
                '}' => depth -= 1,
                _ => {}
            }
            source.push(ch);
        }

        Err(LexError {
            message: "Unterminated template substitution".to_string(),
            location: loc,
        })
    }

    /// Parse numeric literal
    fn number_literal(&mut self, first: char, loc: SourceLocation) -> Result<TokenKind, LexError> {
        if first == '0' {
            let radix = match self.peek() {
                Some('x') | Some('X') => Some(16),
                Some('b') | Some('B') => Some(2),
                Some('o') | Some('O') => Some(8),
                _ => None,
            };
            if let Some(radix) = radix {
                self.advance();
                let mut digits = String::new();
                while let Some(c) = self.peek() {
                    if c.is_digit(radix) {
                        digits.push(c);
                        self.advance();
                    } else if c == '_' {
                        self.advance();
                    } else {
                        break;
                    }
                }
                return u64::from_str_radix(&digits, radix)
                    .map(|n| TokenKind::Number(n as f64))
                    .map_err(|_| LexError {
                        message: "Invalid or unexpected token: malformed number".to_string(),
                        location: loc,
                    });
            }
        }

        let mut num_str = String::new();
        num_str.push(first);
        let mut seen_dot = first == '.';
        let mut seen_exp = false;

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                num_str.push(ch);
            } else if ch == '_' {
                // numeric separator
            } else if ch == '.' && !seen_dot && !seen_exp {
                seen_dot = true;
                num_str.push(ch);
            } else if (ch == 'e' || ch == 'E') && !seen_exp {
                seen_exp = true;
                num_str.push(ch);
                if let Some(sign @ ('+' | '-')) = self.peek_ahead(1) {
                    self.advance();
                    num_str.push(sign);
                }
            } else {
                break;
            }
            self.advance();
        }

        if self.peek().is_some_and(is_ident_start) {
            return Err(LexError {
                message: "Invalid or unexpected token: identifier directly after number"
                    .to_string(),
                location: loc,
            });
        }

        num_str
            .parse::<f64>()
            .map(TokenKind::Number)
            .map_err(|_| LexError {
                message: format!("Invalid number literal: {}", num_str),
                location: loc,
            })
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self, first_char: char) -> TokenKind {
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(ch) = self.peek() {
            if is_ident_part(ch) {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match ident.as_str() {
            "var" => TokenKind::Var,
            "let" => TokenKind::Let,
            "const" => TokenKind::Const,
            "function" => TokenKind::Function,
            "return" => TokenKind::Return,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "do" => TokenKind::Do,
            "for" => TokenKind::For,
            "in" => TokenKind::In,
            "break" => TokenKind::Break,
            "continue" => TokenKind::Continue,
            "throw" => TokenKind::Throw,
            "try" => TokenKind::Try,
            "catch" => TokenKind::Catch,
            "finally" => TokenKind::Finally,
            "switch" => TokenKind::Switch,
            "case" => TokenKind::Case,
            "default" => TokenKind::Default,
            "new" => TokenKind::New,
            "typeof" => TokenKind::Typeof,
            "void" => TokenKind::Void,
            "instanceof" => TokenKind::Instanceof,
            "this" => TokenKind::This,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            _ => TokenKind::Ident(ident),
        }
    }

    /// Skip whitespace and comments
    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some('\n') => {
                    self.saw_newline = true;
                    self.advance();
                }
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek_ahead(1) == Some('/') => self.skip_line_comment(),
                Some('/') if self.peek_ahead(1) == Some('*') => self.skip_block_comment()?,
                _ => break,
            }
        }
        Ok(())
    }

    /// Skip single-line comment (// ...), leaving the newline in place
    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    /// Skip multi-line comment (/* ... */)
    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start_loc = self.current_location();
        self.advance(); // skip '/'
        self.advance(); // skip '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance();
                self.advance();
                return Ok(());
            }
            if self.advance() == Some('\n') {
                self.saw_newline = true;
            }
        }

        Err(LexError {
            message: "Unterminated block comment".to_string(),
            location: start_loc,
        })
    }

    /// Consume the next character if it equals `expected`
    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = *self.input.get(self.position)?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn parse_hex(digits: &str, loc: SourceLocation) -> Result<u32, LexError> {
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid_escape(digits, loc));
    }
    u32::from_str_radix(digits, 16).map_err(|_| invalid_escape(digits, loc))
}

fn invalid_escape(digits: &str, loc: SourceLocation) -> LexError {
    LexError {
        message: format!("Invalid escape sequence: {}", digits),
        location: loc,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_simple_tokens() {
        let tokens = kinds("let a = 5; a + 1");

        assert_eq!(tokens[0], TokenKind::Let);
        assert_eq!(tokens[1], TokenKind::Ident("a".to_string()));
        assert_eq!(tokens[2], TokenKind::Eq);
        assert_eq!(tokens[3], TokenKind::Number(5.0));
        assert_eq!(tokens[4], TokenKind::Semicolon);
        assert_eq!(tokens[5], TokenKind::Ident("a".to_string()));
        assert_eq!(tokens[6], TokenKind::Plus);
        assert_eq!(tokens[7], TokenKind::Number(1.0));
        assert_eq!(tokens[8], TokenKind::Eof);
    }

    #[test]
    fn test_operators() {
        let tokens = kinds("=== !== ** => ?. ?? ... >>> **=");

        assert_eq!(
            tokens,
            vec![
                TokenKind::EqEqEq,
                TokenKind::NotEqEq,
                TokenKind::StarStar,
                TokenKind::Arrow,
                TokenKind::QuestionDot,
                TokenKind::Nullish,
                TokenKind::Ellipsis,
                TokenKind::GtGtGt,
                TokenKind::StarStarEq,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_conditional_before_fraction_is_not_optional_chain() {
        let tokens = kinds("a?.5:1");
        assert_eq!(tokens[1], TokenKind::Question);
        assert_eq!(tokens[2], TokenKind::Number(0.5));
    }

    #[test]
    fn test_comments_and_newlines() {
        let tokens = Lexer::new("a // comment\nb /* block\ncomment */ c")
            .tokenize()
            .unwrap();

        assert_eq!(tokens[0].kind, TokenKind::Ident("a".to_string()));
        assert!(!tokens[0].newline_before);
        assert_eq!(tokens[1].kind, TokenKind::Ident("b".to_string()));
        assert!(tokens[1].newline_before);
        assert_eq!(tokens[2].kind, TokenKind::Ident("c".to_string()));
        assert!(tokens[2].newline_before);
        assert_eq!(tokens[2].location.line, 3);
    }

    #[test]
    fn test_string_literals() {
        let tokens = kinds(r#""hello\nworld" 'it\'s' "A\x42""#);
        assert_eq!(tokens[0], TokenKind::Str("hello\nworld".to_string()));
        assert_eq!(tokens[1], TokenKind::Str("it's".to_string()));
        assert_eq!(tokens[2], TokenKind::Str("AB".to_string()));
    }

    #[test]
    fn test_numbers() {
        let tokens = kinds("42 3.25 .5 1e3 2E-2 0xff 0b101 1_000");
        assert_eq!(
            tokens[..8],
            [
                TokenKind::Number(42.0),
                TokenKind::Number(3.25),
                TokenKind::Number(0.5),
                TokenKind::Number(1000.0),
                TokenKind::Number(0.02),
                TokenKind::Number(255.0),
                TokenKind::Number(5.0),
                TokenKind::Number(1000.0),
            ]
        );
    }

    #[test]
    fn test_template_literal_with_substitution() {
        let tokens = kinds("`sum: ${a + {x: 1}.x}!`");

        match &tokens[0] {
            TokenKind::Template(chunks) => {
                assert_eq!(chunks.len(), 3);
                assert_eq!(chunks[0], TemplateChunk::Text("sum: ".to_string()));
                match &chunks[1] {
                    TemplateChunk::Substitution(inner) => {
                        assert_eq!(inner[0].kind, TokenKind::Ident("a".to_string()));
                        assert_eq!(inner.last().map(|t| &t.kind), Some(&TokenKind::Eof));
                    }
                    other => panic!("expected substitution, got {:?}", other),
                }
                assert_eq!(chunks[2], TemplateChunk::Text("!".to_string()));
            }
            other => panic!("expected template, got {:?}", other),
        }
    }

    #[test]
    fn test_unterminated_string_is_an_error() {
        let err = Lexer::new("'abc").tokenize().unwrap_err();
        assert!(err.message.contains("unterminated"));
        assert_eq!(err.location, SourceLocation::new(1, 1));
    }

    #[test]
    fn test_surrogate_pair_escapes() {
        let tokens = kinds(r"'\ud83d\ude00' '\u{1F600}' 'a\ud83db' '\ude00'");
        assert_eq!(tokens[0], TokenKind::Str("\u{1F600}".to_string()));
        assert_eq!(tokens[1], TokenKind::Str("\u{1F600}".to_string()));
        assert_eq!(tokens[2], TokenKind::Str("a\u{FFFD}b".to_string()));
        assert_eq!(tokens[3], TokenKind::Str("\u{FFFD}".to_string()));
    }

    #[test]
    fn test_malformed_unicode_escape_is_an_error() {
        let err = Lexer::new(r"'\uzz12'").tokenize().unwrap_err();
        assert_eq!(err.message, "Invalid escape sequence: zz12");
    }

    #[test]
    fn test_nested_templates_are_bounded() {
        let depth = MAX_NESTING_DEPTH + 5;
        let source = format!("{}x{}", "`${".repeat(depth), "}`".repeat(depth));
        let err = Lexer::new(&source).tokenize().unwrap_err();
        assert_eq!(err.message, "Maximum nesting depth exceeded");

        assert!(Lexer::new("`a${`b${c}`}`").tokenize().is_ok());
    }
}
