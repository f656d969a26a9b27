//! Value formatting for console output and JSON serialization
//!
//! Log arguments are rendered as follows:
//! - strings as-is
//! - other primitives the way `String(value)` renders them
//! - error objects as `Name: message`
//! - functions as their source text
//! - objects and arrays as pretty-printed JSON (2-space indent), with
//!   cycles replaced by `"[Circular]"` and containers nested deeper than
//!   [`MAX_VALUE_DEPTH`] replaced by `"[Object]"` / `"[Array]"`
//!
//! The JSON writer is shared with `JSON.stringify`, which uses
//! [`CyclePolicy::Fail`] instead.

use crate::interpreter::constants::MAX_VALUE_DEPTH;
use crate::memory::heap::{Heap, ObjectKind};
use crate::memory::value::{number_to_string, ObjectId, Value};
use crate::parser::ast::FunctionBody;

/// What the JSON writer does when it reaches an object it is already inside,
/// or one nested too deeply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePolicy {
    /// Write a placeholder string in place of the object
    Mark,
    /// Abort serialization
    Fail,
}

/// Why serialization was aborted under [`CyclePolicy::Fail`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonError {
    CircularStructure,
    /// Containers nested deeper than [`MAX_VALUE_DEPTH`]
    TooDeep,
}

/// Join log arguments with single spaces
pub fn format_log_args(heap: &Heap, args: &[Value]) -> String {
    args.iter()
        .map(|arg| format_value(heap, arg))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render one value for display
pub fn format_value(heap: &Heap, value: &Value) -> String {
    match value {
        Value::String(s) => s.to_string(),
        Value::Object(id) => {
            let object = heap.get(*id);
            if object.is_error() {
                return error_summary(heap, *id);
            }
            if object.is_callable() {
                return function_source(heap, *id);
            }
            match to_json(heap, value, "  ", CyclePolicy::Mark) {
                Ok(Some(json)) => json,
                _ => "undefined".to_string(),
            }
        }
        other => primitive_to_string(other),
    }
}

/// `String(value)` for primitives
pub fn primitive_to_string(value: &Value) -> String {
    match value {
        Value::Undefined => "undefined".to_string(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_to_string(*n),
        Value::String(s) => s.to_string(),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// `Name: message` for error objects (just `Name` when the message is empty)
pub fn error_summary(heap: &Heap, id: ObjectId) -> String {
    let name = match heap.lookup(id, "name") {
        Some(Value::String(s)) => s.to_string(),
        Some(other) if !other.is_undefined() => primitive_to_string(&other),
        _ => "Error".to_string(),
    };
    let message = match heap.lookup(id, "message") {
        Some(Value::String(s)) => s.to_string(),
        Some(Value::Undefined) | None => String::new(),
        Some(other) => primitive_to_string(&other),
    };

    if message.is_empty() {
        name
    } else if name.is_empty() {
        message
    } else {
        format!("{}: {}", name, message)
    }
}

/// Source text of a function value; closures whose text was not kept fall
/// back to their signature
pub fn function_source(heap: &Heap, id: ObjectId) -> String {
    match &heap.get(id).kind {
        ObjectKind::Closure { def, .. } if !def.source.is_empty() => def.source.clone(),
        ObjectKind::Closure { def, .. } => {
            let params = def
                .params
                .iter()
                .map(|p| {
                    if p.rest {
                        format!("...{}", p.name)
                    } else {
                        p.name.clone()
                    }
                })
                .collect::<Vec<_>>()
                .join(", ");
            if def.is_arrow {
                match def.body {
                    FunctionBody::Expr(_) => format!("({}) => ...", params),
                    FunctionBody::Block(_) => format!("({}) => {{ ... }}", params),
                }
            } else {
                format!(
                    "function {}({}) {{ ... }}",
                    def.name.as_deref().unwrap_or(""),
                    params
                )
            }
        }
        ObjectKind::Native(native) => {
            format!("function {}() {{ [native code] }}", native.short_name())
        }
        ObjectKind::Bound { target, .. } => function_source(heap, *target),
        _ => "[object Object]".to_string(),
    }
}

/// Serialize `value` as JSON. `Ok(None)` means the value has no JSON form
/// (`undefined`, functions).
pub fn to_json(
    heap: &Heap,
    value: &Value,
    indent: &str,
    policy: CyclePolicy,
) -> Result<Option<String>, JsonError> {
    let mut writer = JsonWriter {
        heap,
        indent,
        policy,
        path: Vec::new(),
        out: String::new(),
    };
    if writer.write_value(value, 0)? {
        Ok(Some(writer.out))
    } else {
        Ok(None)
    }
}

struct JsonWriter<'a> {
    heap: &'a Heap,
    indent: &'a str,
    policy: CyclePolicy,
    /// Objects currently being written, outermost first
    path: Vec<ObjectId>,
    out: String,
}

impl JsonWriter<'_> {
    /// Returns false if the value was skipped (no JSON representation)
    fn write_value(&mut self, value: &Value, depth: usize) -> Result<bool, JsonError> {
        match value {
            Value::Undefined => return Ok(false),
            Value::Null => self.out.push_str("null"),
            Value::Bool(b) => self.out.push_str(if *b { "true" } else { "false" }),
            Value::Number(n) => {
                if n.is_finite() {
                    self.out.push_str(&number_to_string(*n));
                } else {
                    self.out.push_str("null");
                }
            }
            Value::String(s) => write_json_string(&mut self.out, s),
            Value::Object(id) => return self.write_object(*id, depth),
        }
        Ok(true)
    }

    fn write_object(&mut self, id: ObjectId, depth: usize) -> Result<bool, JsonError> {
        if self.heap.get(id).is_callable() {
            return Ok(false);
        }

        if self.path.contains(&id) {
            return self.placeholder("\"[Circular]\"", JsonError::CircularStructure);
        }

        let heap = self.heap;
        if depth >= MAX_VALUE_DEPTH {
            let marker = if heap.get(id).is_array() {
                "\"[Array]\""
            } else {
                "\"[Object]\""
            };
            return self.placeholder(marker, JsonError::TooDeep);
        }

        self.path.push(id);
        let result = match heap.array_elements(id) {
            Some(elements) => self.write_array(elements, depth),
            None => self.write_properties(id, depth),
        };
        self.path.pop();
        result.map(|_| true)
    }

    fn write_array(&mut self, elements: &[Value], depth: usize) -> Result<(), JsonError> {
        if elements.is_empty() {
            self.out.push_str("[]");
            return Ok(());
        }

        self.out.push('[');
        for (i, element) in elements.iter().enumerate() {
            if i > 0 {
                self.out.push(',');
            }
            self.newline(depth + 1);
            if !self.write_value(element, depth + 1)? {
                self.out.push_str("null");
            }
        }
        self.newline(depth);
        self.out.push(']');
        Ok(())
    }

    fn write_properties(&mut self, id: ObjectId, depth: usize) -> Result<(), JsonError> {
        let heap = self.heap;
        let properties = &heap.get(id).properties;
        let mut written = 0;

        self.out.push('{');
        for key in properties.keys() {
            let Some(value) = properties.get(&key) else {
                continue;
            };
            // Members without a JSON form are dropped entirely
            if value.is_undefined()
                || value
                    .as_object()
                    .is_some_and(|obj| heap.get(obj).is_callable())
            {
                continue;
            }

            if written > 0 {
                self.out.push(',');
            }
            self.newline(depth + 1);
            write_json_string(&mut self.out, &key);
            self.out.push(':');
            if !self.indent.is_empty() {
                self.out.push(' ');
            }
            self.write_value(value, depth + 1)?;
            written += 1;
        }

        if written > 0 {
            self.newline(depth);
        }
        self.out.push('}');
        Ok(())
    }

    fn placeholder(&mut self, marker: &str, error: JsonError) -> Result<bool, JsonError> {
        match self.policy {
            CyclePolicy::Mark => {
                self.out.push_str(marker);
                Ok(true)
            }
            CyclePolicy::Fail => Err(error),
        }
    }

    fn newline(&mut self, depth: usize) {
        if self.indent.is_empty() {
            return;
        }
        self.out.push('\n');
        for _ in 0..depth {
            self.out.push_str(self.indent);
        }
    }
}

/// Append `s` as a quoted JSON string
pub fn write_json_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::heap::ObjectKind;

    fn object(heap: &mut Heap, props: &[(&str, Value)]) -> Value {
        let id = heap.allocate(ObjectKind::Ordinary, None);
        for (key, value) in props {
            heap.get_mut(id).properties.set(key, value.clone());
        }
        Value::Object(id)
    }

    #[test]
    fn test_primitives() {
        let heap = Heap::new();
        assert_eq!(
            format_log_args(
                &heap,
                &[
                    Value::str("a b"),
                    Value::Number(4.0),
                    Value::Bool(true),
                    Value::Null,
                    Value::Undefined
                ]
            ),
            "a b 4 true null undefined"
        );
    }

    #[test]
    fn test_pretty_object() {
        let mut heap = Heap::new();
        let list = heap.allocate(
            ObjectKind::Array(vec![Value::Number(1.0), Value::str("x")]),
            None,
        );
        let value = object(
            &mut heap,
            &[
                ("a", Value::Number(1.0)),
                ("skip", Value::Undefined),
                ("list", Value::Object(list)),
            ],
        );

        assert_eq!(
            format_value(&heap, &value),
            "{\n  \"a\": 1,\n  \"list\": [\n    1,\n    \"x\"\n  ]\n}"
        );
    }

    #[test]
    fn test_compact_json_and_empty_containers() {
        let mut heap = Heap::new();
        let empty_list = heap.allocate(ObjectKind::Array(Vec::new()), None);
        let empty = object(&mut heap, &[]);
        let value = object(
            &mut heap,
            &[("e", empty), ("l", Value::Object(empty_list))],
        );

        assert_eq!(
            to_json(&heap, &value, "", CyclePolicy::Fail),
            Ok(Some("{\"e\":{},\"l\":[]}".to_string()))
        );
    }

    #[test]
    fn test_cycles() {
        let mut heap = Heap::new();
        let value = object(&mut heap, &[("name", Value::str("loop"))]);
        let id = value.as_object().unwrap();
        heap.get_mut(id).properties.set("self", value.clone());

        assert_eq!(
            format_value(&heap, &value),
            "{\n  \"name\": \"loop\",\n  \"self\": \"[Circular]\"\n}"
        );
        assert_eq!(
            to_json(&heap, &value, "", CyclePolicy::Fail),
            Err(JsonError::CircularStructure)
        );
    }

    #[test]
    fn test_repeated_reference_is_not_a_cycle() {
        let mut heap = Heap::new();
        let shared = object(&mut heap, &[("v", Value::Number(1.0))]);
        let value = object(&mut heap, &[("a", shared.clone()), ("b", shared)]);

        assert_eq!(
            to_json(&heap, &value, "", CyclePolicy::Fail),
            Ok(Some("{\"a\":{\"v\":1},\"b\":{\"v\":1}}".to_string()))
        );
    }

    #[test]
    fn test_deep_nesting_is_cut_off() {
        let mut heap = Heap::new();
        let mut value = Value::Number(1.0);
        for _ in 0..MAX_VALUE_DEPTH + 10 {
            value = Value::Object(heap.allocate(ObjectKind::Array(vec![value]), None));
        }

        let logged = format_value(&heap, &value);
        assert!(logged.contains("\"[Array]\""));
        assert!(!logged.contains('1'));
        assert_eq!(
            to_json(&heap, &value, "", CyclePolicy::Fail),
            Err(JsonError::TooDeep)
        );
    }

    #[test]
    fn test_functions_without_source_show_their_signature() {
        use crate::parser::ast::{FunctionBody, FunctionDef, Param, SourceLocation};
        use std::rc::Rc;

        let param = |name: &str, rest| Param {
            name: name.to_string(),
            default: None,
            rest,
        };
        let def = FunctionDef {
            name: Some("add".to_string()),
            params: vec![param("a", false), param("more", true)],
            body: FunctionBody::Block(Vec::new()),
            is_arrow: false,
            location: SourceLocation::default(),
            source: String::new(),
        };
        let mut heap = Heap::new();
        let id = heap.allocate(
            ObjectKind::Closure {
                def: Rc::new(def),
                env: 0,
                this_value: None,
            },
            None,
        );

        assert_eq!(function_source(&heap, id), "function add(a, ...more) { ... }");
    }

    #[test]
    fn test_string_escapes() {
        let mut out = String::new();
        write_json_string(&mut out, "a\"b\\c\nd\u{1}");
        assert_eq!(out, "\"a\\\"b\\\\c\\nd\\u0001\"");
    }
}
