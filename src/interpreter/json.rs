//! `JSON.stringify` and `JSON.parse`
//!
//! Serialization reuses the console's JSON writer with cycle detection set
//! to fail. Parsing is done in two steps: text to a [`JsonNode`] tree with
//! no heap access, then the tree is materialized as script values.

use std::iter::Peekable;
use std::str::CharIndices;

use crate::console::format::{to_json, CyclePolicy, JsonError};
use crate::interpreter::builtins::arg;
use crate::interpreter::constants::{MAX_JSON_INDENT, MAX_VALUE_DEPTH};
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::{ErrorKind, Eval};
use crate::memory::value::Value;

/// Parsed JSON document
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum JsonNode {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<JsonNode>),
    Object(Vec<(String, JsonNode)>),
}

impl Interpreter {
    /// `JSON.stringify(value, replacer, space)`; the replacer is ignored
    pub(crate) fn json_stringify(&mut self, args: &[Value]) -> Eval<Value> {
        let value = arg(args, 0);
        let indent = match arg(args, 2) {
            Value::Number(n) if n >= 1.0 => " ".repeat((n as usize).min(MAX_JSON_INDENT)),
            Value::String(s) => s.chars().take(MAX_JSON_INDENT).collect(),
            _ => String::new(),
        };

        match to_json(&self.heap, &value, &indent, CyclePolicy::Fail) {
            Ok(Some(json)) => Ok(Value::from(json)),
            Ok(None) => Ok(Value::Undefined),
            Err(JsonError::CircularStructure) => {
                Err(self.type_error("Converting circular structure to JSON"))
            }
            Err(JsonError::TooDeep) => Err(self.range_error("Maximum call stack size exceeded")),
        }
    }

    /// `JSON.parse(text)`
    pub(crate) fn json_parse(&mut self, args: &[Value]) -> Eval<Value> {
        let text = self.to_js_string(&arg(args, 0))?;
        match parse_json(&text) {
            Ok(node) => Ok(self.materialize(node)),
            Err(message) => Err(self.error(ErrorKind::SyntaxError, message)),
        }
    }

    fn materialize(&mut self, node: JsonNode) -> Value {
        match node {
            JsonNode::Null => Value::Null,
            JsonNode::Bool(b) => Value::Bool(b),
            JsonNode::Number(n) => Value::Number(n),
            JsonNode::String(s) => Value::from(s),
            JsonNode::Array(items) => {
                let values = items
                    .into_iter()
                    .map(|item| self.materialize(item))
                    .collect();
                self.create_array(values)
            }
            JsonNode::Object(members) => {
                let id = self.create_object();
                for (key, member) in members {
                    let value = self.materialize(member);
                    self.heap.get_mut(id).properties.set(&key, value);
                }
                Value::Object(id)
            }
        }
    }
}

/// Parse a complete JSON document
pub(crate) fn parse_json(text: &str) -> Result<JsonNode, String> {
    let mut parser = JsonParser {
        text,
        chars: text.char_indices().peekable(),
        depth: 0,
    };
    parser.skip_whitespace();
    let node = parser.parse_value()?;
    parser.skip_whitespace();
    match parser.chars.peek() {
        None => Ok(node),
        Some(&(pos, c)) => Err(unexpected_token(c, pos)),
    }
}

/// Consume `\uDC00`..`\uDFFF` from `chars`, or return `None`
fn low_surrogate_escape(chars: &mut Peekable<CharIndices<'_>>) -> Option<u16> {
    if chars.next()?.1 != '\\' || chars.next()?.1 != 'u' {
        return None;
    }
    let mut unit = 0u16;
    for _ in 0..4 {
        unit = unit * 16 + chars.next()?.1.to_digit(16)? as u16;
    }
    (0xDC00..0xE000).contains(&unit).then_some(unit)
}

fn unexpected_token(c: char, pos: usize) -> String {
    format!("Unexpected token {} in JSON at position {}", c, pos)
}

const UNEXPECTED_END: &str = "Unexpected end of JSON input";

struct JsonParser<'a> {
    text: &'a str,
    chars: Peekable<CharIndices<'a>>,
    /// Arrays and objects currently open
    depth: usize,
}

impl JsonParser<'_> {
    fn skip_whitespace(&mut self) {
        while let Some(&(_, ' ' | '\t' | '\n' | '\r')) = self.chars.peek() {
            self.chars.next();
        }
    }

    fn next_char(&mut self) -> Result<(usize, char), String> {
        self.chars.next().ok_or_else(|| UNEXPECTED_END.to_string())
    }

    fn expect(&mut self, expected: char) -> Result<(), String> {
        match self.next_char()? {
            (_, c) if c == expected => Ok(()),
            (pos, c) => Err(unexpected_token(c, pos)),
        }
    }

    fn parse_value(&mut self) -> Result<JsonNode, String> {
        let &(pos, c) = self.chars.peek().ok_or_else(|| UNEXPECTED_END.to_string())?;
        match c {
            '{' | '[' => {
                if self.depth >= MAX_VALUE_DEPTH {
                    return Err(format!("Maximum nesting depth exceeded in JSON at position {}", pos));
                }
                self.depth += 1;
                let node = if c == '{' {
                    self.parse_object()
                } else {
                    self.parse_array()
                };
                self.depth -= 1;
                node
            }
            '"' => self.parse_string().map(JsonNode::String),
            't' => self.parse_literal("true", JsonNode::Bool(true)),
            'f' => self.parse_literal("false", JsonNode::Bool(false)),
            'n' => self.parse_literal("null", JsonNode::Null),
            '-' | '0'..='9' => self.parse_number(),
            _ => Err(unexpected_token(c, pos)),
        }
    }

    fn parse_literal(&mut self, word: &str, node: JsonNode) -> Result<JsonNode, String> {
        for expected in word.chars() {
            self.expect(expected)?;
        }
        Ok(node)
    }

    fn parse_number(&mut self) -> Result<JsonNode, String> {
        let Some(&(start, _)) = self.chars.peek() else {
            return Err(UNEXPECTED_END.to_string());
        };
        let mut end = start;
        while let Some(&(pos, c)) = self.chars.peek() {
            if !matches!(c, '0'..='9' | '-' | '+' | '.' | 'e' | 'E') {
                break;
            }
            end = pos + c.len_utf8();
            self.chars.next();
        }

        let literal = &self.text[start..end];
        let valid_shape = {
            let digits = literal.strip_prefix('-').unwrap_or(literal);
            let leading_zero = digits.len() > 1
                && digits.starts_with('0')
                && digits.as_bytes()[1].is_ascii_digit();
            digits.starts_with(|c: char| c.is_ascii_digit())
                && !digits.ends_with('.')
                && !leading_zero
        };
        match literal.parse::<f64>() {
            Ok(n) if valid_shape => Ok(JsonNode::Number(n)),
            _ => {
                let c = literal.chars().last().unwrap_or('-');
                Err(unexpected_token(c, end.saturating_sub(c.len_utf8())))
            }
        }
    }

    fn parse_string(&mut self) -> Result<String, String> {
        self.expect('"')?;
        let mut out = String::new();
        loop {
            let (pos, c) = self.next_char().map_err(|_| "Unterminated string in JSON".to_string())?;
            match c {
                '"' => return Ok(out),
                '\\' => {
                    let (pos, escape) = self.next_char()?;
                    match escape {
                        '"' => out.push('"'),
                        '\\' => out.push('\\'),
                        '/' => out.push('/'),
                        'b' => out.push('\u{08}'),
                        'f' => out.push('\u{0C}'),
                        'n' => out.push('\n'),
                        'r' => out.push('\r'),
                        't' => out.push('\t'),
                        'u' => out.push(self.parse_unicode_escape()?),
                        other => return Err(unexpected_token(other, pos)),
                    }
                }
                c if (c as u32) < 0x20 => {
                    return Err(format!("Bad control character in string literal in JSON at position {}", pos));
                }
                c => out.push(c),
            }
        }
    }

    /// Decode the four hex digits after `\u`. A high surrogate followed by a
    /// `\u` low surrogate forms one character; an unpaired surrogate becomes
    /// U+FFFD.
    fn parse_unicode_escape(&mut self) -> Result<char, String> {
        let mut code = 0u16;
        for _ in 0..4 {
            let (pos, c) = self.next_char()?;
            let digit = c.to_digit(16).ok_or_else(|| unexpected_token(c, pos))?;
            code = code * 16 + digit as u16;
        }

        let mut units = vec![code];
        if (0xD800..0xDC00).contains(&code) {
            let mut ahead = self.chars.clone();
            if let Some(low) = low_surrogate_escape(&mut ahead) {
                self.chars = ahead;
                units.push(low);
            }
        }

        Ok(char::decode_utf16(units)
            .next()
            .map(|decoded| decoded.unwrap_or(char::REPLACEMENT_CHARACTER))
            .unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    fn parse_array(&mut self) -> Result<JsonNode, String> {
        self.expect('[')?;
        let mut items = Vec::new();
        self.skip_whitespace();
        if let Some(&(_, ']')) = self.chars.peek() {
            self.chars.next();
            return Ok(JsonNode::Array(items));
        }

        loop {
            self.skip_whitespace();
            items.push(self.parse_value()?);
            self.skip_whitespace();
            match self.next_char()? {
                (_, ',') => continue,
                (_, ']') => return Ok(JsonNode::Array(items)),
                (pos, c) => return Err(unexpected_token(c, pos)),
            }
        }
    }

    fn parse_object(&mut self) -> Result<JsonNode, String> {
        self.expect('{')?;
        let mut members: Vec<(String, JsonNode)> = Vec::new();
        self.skip_whitespace();
        if let Some(&(_, '}')) = self.chars.peek() {
            self.chars.next();
            return Ok(JsonNode::Object(members));
        }

        loop {
            self.skip_whitespace();
            match self.chars.peek() {
                Some(&(_, '"')) => {}
                Some(&(pos, c)) => return Err(unexpected_token(c, pos)),
                None => return Err(UNEXPECTED_END.to_string()),
            }
            let key = self.parse_string()?;
            self.skip_whitespace();
            self.expect(':')?;
            self.skip_whitespace();
            let value = self.parse_value()?;

            // Later duplicates win
            match members.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = value,
                None => members.push((key, value)),
            }

            self.skip_whitespace();
            match self.next_char()? {
                (_, ',') => continue,
                (_, '}') => return Ok(JsonNode::Object(members)),
                (pos, c) => return Err(unexpected_token(c, pos)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested() {
        let node = parse_json(r#" {"a": [1, 2.5, -3e2], "b": {"c": null}, "d": "x\ny"} "#).unwrap();
        assert_eq!(
            node,
            JsonNode::Object(vec![
                (
                    "a".to_string(),
                    JsonNode::Array(vec![
                        JsonNode::Number(1.0),
                        JsonNode::Number(2.5),
                        JsonNode::Number(-300.0),
                    ])
                ),
                (
                    "b".to_string(),
                    JsonNode::Object(vec![("c".to_string(), JsonNode::Null)])
                ),
                ("d".to_string(), JsonNode::String("x\ny".to_string())),
            ])
        );
    }

    #[test]
    fn test_parse_escapes() {
        assert_eq!(
            parse_json(r#""A\t\"""#),
            Ok(JsonNode::String("A\t\"".to_string()))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_json(""), Err(UNEXPECTED_END.to_string()));
        assert_eq!(parse_json("[1,"), Err(UNEXPECTED_END.to_string()));
        assert_eq!(
            parse_json("{'a': 1}"),
            Err("Unexpected token ' in JSON at position 1".to_string())
        );
        assert_eq!(
            parse_json("[1] x"),
            Err("Unexpected token x in JSON at position 4".to_string())
        );
        assert!(parse_json("01").is_err());
        assert!(parse_json("1.").is_err());
        assert!(parse_json("[1,]").is_err());
    }

    #[test]
    fn test_duplicate_keys_keep_last() {
        assert_eq!(
            parse_json(r#"{"a": 1, "a": 2}"#),
            Ok(JsonNode::Object(vec![("a".to_string(), JsonNode::Number(2.0))]))
        );
    }

    #[test]
    fn test_surrogate_pairs() {
        assert_eq!(
            parse_json(r#""\ud83d\ude00""#),
            Ok(JsonNode::String("\u{1F600}".to_string()))
        );
        assert_eq!(
            parse_json(r#""\ud83dx\ude00""#),
            Ok(JsonNode::String("\u{FFFD}x\u{FFFD}".to_string()))
        );
        assert_eq!(
            parse_json(r#""\ud83dA""#),
            Ok(JsonNode::String("\u{FFFD}A".to_string()))
        );
    }

    #[test]
    fn test_nesting_depth_is_bounded() {
        let deep = format!("{}{}", "[".repeat(100_000), "]".repeat(100_000));
        assert_eq!(
            parse_json(&deep),
            Err(format!(
                "Maximum nesting depth exceeded in JSON at position {}",
                MAX_VALUE_DEPTH
            ))
        );

        let shallow = format!("{}{}", "[".repeat(50), "]".repeat(50));
        assert!(parse_json(&shallow).is_ok());
    }
}
