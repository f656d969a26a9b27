//! Prototype methods of the builtin types
//!
//! String positions and lengths count characters, not UTF-16 units.
//! Array callbacks (`map`, `filter`, ...) see the array as it is when they
//! run: the length is fixed when the method starts, elements are re-read on
//! every step.

use std::cmp::Ordering;
use std::rc::Rc;

use crate::console::format::{error_summary, function_source};
use crate::interpreter::builtins::arg;
use crate::interpreter::coerce::relative_index;
use crate::interpreter::constants::{MAX_ARRAY_LENGTH, MAX_STRING_LENGTH, MAX_VALUE_DEPTH};
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::Eval;
use crate::memory::heap::ObjectKind;
use crate::memory::value::{number_to_string, ObjectId, Value};

impl Interpreter {
    // ------------------------------------------------------------------
    // String.prototype
    // ------------------------------------------------------------------

    pub(crate) fn call_string_method(&mut self, method: &str, this: Value, args: &[Value]) -> Eval<Value> {
        if this.is_nullish() {
            return Err(self.type_error(format!(
                "String.prototype.{} called on null or undefined",
                method
            )));
        }
        let text = self.to_js_string(&this)?;
        let chars: Vec<char> = text.chars().collect();
        let len = chars.len();

        match method {
            "toString" | "valueOf" => Ok(Value::String(text)),
            "toUpperCase" => Ok(Value::from(text.to_uppercase())),
            "toLowerCase" => Ok(Value::from(text.to_lowercase())),
            "trim" => Ok(Value::str(text.trim())),
            "trimStart" => Ok(Value::str(text.trim_start())),
            "trimEnd" => Ok(Value::str(text.trim_end())),

            "includes" | "indexOf" | "startsWith" => {
                let needle: Vec<char> = self.to_js_string(&arg(args, 0))?.chars().collect();
                let from = self.to_integer_arg(args.get(1), 0.0)?.clamp(0.0, len as f64) as usize;
                Ok(match method {
                    "includes" => Value::Bool(find_chars(&chars, &needle, from).is_some()),
                    "indexOf" => Value::Number(
                        find_chars(&chars, &needle, from).map_or(-1.0, |i| i as f64),
                    ),
                    _ => Value::Bool(chars[from..].starts_with(&needle)),
                })
            }
            "lastIndexOf" => {
                let needle: Vec<char> = self.to_js_string(&arg(args, 0))?.chars().collect();
                let from = match self.to_number(&arg(args, 1))? {
                    n if n.is_nan() => len as f64,
                    n => n.trunc().clamp(0.0, len as f64),
                } as usize;
                Ok(Value::Number(
                    rfind_chars(&chars, &needle, from).map_or(-1.0, |i| i as f64),
                ))
            }
            "endsWith" => {
                let needle: Vec<char> = self.to_js_string(&arg(args, 0))?.chars().collect();
                let end = self
                    .to_integer_arg(args.get(1), len as f64)?
                    .clamp(0.0, len as f64) as usize;
                Ok(Value::Bool(chars[..end].ends_with(&needle)))
            }

            "slice" => {
                let start = relative_index(self.to_integer_arg(args.get(0), 0.0)?, len);
                let end = relative_index(self.to_integer_arg(args.get(1), len as f64)?, len);
                Ok(char_range(&chars, start, end))
            }
            "substring" => {
                let start = self.to_integer_arg(args.get(0), 0.0)?.clamp(0.0, len as f64) as usize;
                let end = self
                    .to_integer_arg(args.get(1), len as f64)?
                    .clamp(0.0, len as f64) as usize;
                Ok(char_range(&chars, start.min(end), start.max(end)))
            }
            "charAt" => {
                let index = self.to_integer_arg(args.get(0), 0.0)?;
                Ok(char_at(&chars, index).map_or(Value::str(""), |c| Value::from(c.to_string())))
            }
            "charCodeAt" => {
                let index = self.to_integer_arg(args.get(0), 0.0)?;
                Ok(Value::Number(
                    char_at(&chars, index).map_or(f64::NAN, |c| f64::from(u32::from(c))),
                ))
            }
            "at" => {
                let index = self.to_integer_arg(args.get(0), 0.0)?;
                let index = if index < 0.0 { index + len as f64 } else { index };
                Ok(char_at(&chars, index).map_or(Value::Undefined, |c| Value::from(c.to_string())))
            }

            "split" => {
                let limit = match arg(args, 1) {
                    Value::Undefined => usize::MAX,
                    value => self.to_uint32(&value)? as usize,
                };
                let separator = arg(args, 0);
                let parts: Vec<String> = if separator.is_undefined() {
                    vec![text.to_string()]
                } else {
                    let separator = self.to_js_string(&separator)?;
                    if separator.is_empty() {
                        chars.iter().map(|c| c.to_string()).collect()
                    } else {
                        text.split(&*separator).map(str::to_string).collect()
                    }
                };
                let parts = parts.into_iter().take(limit).map(Value::from).collect();
                Ok(self.create_array(parts))
            }

            "repeat" => {
                let count = self.to_integer_arg(args.get(0), 0.0)?;
                if count < 0.0 || count.is_infinite() {
                    return Err(self.range_error(format!(
                        "Invalid count value: {}",
                        number_to_string(count)
                    )));
                }
                if count * len as f64 > MAX_STRING_LENGTH as f64 {
                    return Err(self.range_error("Invalid string length"));
                }
                Ok(Value::from(text.repeat(count as usize)))
            }

            "padStart" | "padEnd" => {
                let target = self.to_integer_arg(args.get(0), 0.0)?;
                if target > MAX_STRING_LENGTH as f64 {
                    return Err(self.range_error("Invalid string length"));
                }
                let filler: Vec<char> = match arg(args, 1) {
                    Value::Undefined => vec![' '],
                    value => self.to_js_string(&value)?.chars().collect(),
                };
                let target = target.max(0.0) as usize;
                if target <= len || filler.is_empty() {
                    return Ok(Value::String(text));
                }
                let padding: String = filler.iter().cycle().take(target - len).collect();
                Ok(Value::from(if method == "padStart" {
                    padding + &*text
                } else {
                    text.to_string() + &padding
                }))
            }

            "replace" | "replaceAll" => self.string_replace(&text, args, method == "replaceAll"),

            "concat" => {
                let mut result = text.to_string();
                for value in args {
                    result.push_str(&self.to_js_string(value)?);
                }
                Ok(Value::from(result))
            }

            _ => Err(self.type_error(format!("String.prototype.{} is not a function", method))),
        }
    }

    /// `replace`/`replaceAll` with a string pattern. The replacement is a
    /// string or a function called with `(match, offset, string)`.
    fn string_replace(&mut self, text: &Rc<str>, args: &[Value], all: bool) -> Eval<Value> {
        let pattern = self.to_js_string(&arg(args, 0))?;
        let replacement = arg(args, 1);
        let replacer = self.is_callable(&replacement).then(|| replacement.clone());
        let replacement_text = match &replacer {
            Some(_) => Rc::from(""),
            None => self.to_js_string(&replacement)?,
        };

        let mut positions: Vec<usize> = Vec::new();
        if pattern.is_empty() {
            positions.push(0);
            if all {
                positions.extend(text.char_indices().skip(1).map(|(i, _)| i));
                positions.push(text.len());
            }
        } else if all {
            positions.extend(text.match_indices(&*pattern).map(|(i, _)| i));
        } else if let Some(i) = text.find(&*pattern) {
            positions.push(i);
        }

        let mut result = String::with_capacity(text.len());
        let mut last = 0;
        for byte_offset in positions {
            result.push_str(&text[last..byte_offset]);
            match &replacer {
                Some(function) => {
                    let offset = text[..byte_offset].chars().count();
                    let args = vec![
                        Value::String(Rc::clone(&pattern)),
                        Value::Number(offset as f64),
                        Value::String(Rc::clone(text)),
                    ];
                    let value = self.call_function(function, Value::Undefined, args)?;
                    result.push_str(&self.to_js_string(&value)?);
                }
                None => result.push_str(&expand_replacement(&replacement_text, &pattern)),
            }
            last = byte_offset + pattern.len();
        }
        result.push_str(&text[last..]);

        Ok(Value::from(result))
    }

    // ------------------------------------------------------------------
    // Array.prototype
    // ------------------------------------------------------------------

    fn this_array(&mut self, method: &str, this: &Value) -> Eval<ObjectId> {
        match this {
            Value::Object(id) if self.heap.get(*id).is_array() => Ok(*id),
            _ => Err(self.type_error(format!(
                "Array.prototype.{} called on a non-array value",
                method
            ))),
        }
    }

    fn array_len(&self, id: ObjectId) -> usize {
        self.heap.array_elements(id).map_or(0, Vec::len)
    }

    fn array_get(&self, id: ObjectId, index: usize) -> Value {
        self.heap
            .array_elements(id)
            .and_then(|elements| elements.get(index))
            .cloned()
            .unwrap_or_default()
    }

    fn array_snapshot(&self, id: ObjectId) -> Vec<Value> {
        self.heap.array_elements(id).cloned().unwrap_or_default()
    }

    fn require_callback(&mut self, method: &str, value: &Value) -> Eval<()> {
        if self.is_callable(value) {
            return Ok(());
        }
        let shown = self.describe_value(value);
        Err(self.type_error(format!(
            "{} is not a function (in Array.prototype.{})",
            shown, method
        )))
    }

    pub(crate) fn call_array_method(&mut self, method: &str, this: Value, args: &[Value]) -> Eval<Value> {
        let id = self.this_array(method, &this)?;

        match method {
            "push" => {
                let len = self.array_len(id);
                if len + args.len() >= MAX_ARRAY_LENGTH {
                    return Err(self.range_error("Invalid array length"));
                }
                if let Some(elements) = self.heap.array_elements_mut(id) {
                    elements.extend(args.iter().cloned());
                }
                Ok(Value::Number(self.array_len(id) as f64))
            }
            "pop" => Ok(self
                .heap
                .array_elements_mut(id)
                .and_then(Vec::pop)
                .unwrap_or_default()),
            "shift" => Ok(match self.heap.array_elements_mut(id) {
                Some(elements) if !elements.is_empty() => elements.remove(0),
                _ => Value::Undefined,
            }),
            "unshift" => {
                let len = self.array_len(id);
                if len + args.len() >= MAX_ARRAY_LENGTH {
                    return Err(self.range_error("Invalid array length"));
                }
                if let Some(elements) = self.heap.array_elements_mut(id) {
                    elements.splice(0..0, args.iter().cloned());
                }
                Ok(Value::Number(self.array_len(id) as f64))
            }

            "join" | "toString" => {
                let separator: Rc<str> = match arg(args, 0) {
                    Value::Undefined => Rc::from(","),
                    _ if method == "toString" => Rc::from(","),
                    value => self.to_js_string(&value)?,
                };
                self.array_join(id, &separator).map(Value::from)
            }

            "forEach" | "map" | "filter" | "find" | "findIndex" | "some" | "every" => {
                self.iterate_with_callback(method, id, this.clone(), args)
            }

            "reduce" => {
                let callback = arg(args, 0);
                self.require_callback(method, &callback)?;
                let len = self.array_len(id);
                let mut index = 0;
                let mut accumulator = match args.get(1) {
                    Some(initial) => initial.clone(),
                    None => {
                        if len == 0 {
                            return Err(self.type_error("Reduce of empty array with no initial value"));
                        }
                        index = 1;
                        self.array_get(id, 0)
                    }
                };
                while index < len && index < self.array_len(id) {
                    let element = self.array_get(id, index);
                    accumulator = self.call_function(
                        &callback,
                        Value::Undefined,
                        vec![accumulator, element, Value::Number(index as f64), this.clone()],
                    )?;
                    index += 1;
                }
                Ok(accumulator)
            }

            "includes" => {
                let needle = arg(args, 0);
                let elements = self.array_snapshot(id);
                let from = relative_index(self.to_integer_arg(args.get(1), 0.0)?, elements.len());
                Ok(Value::Bool(
                    elements[from..].iter().any(|e| e.same_value_zero(&needle)),
                ))
            }
            "indexOf" => {
                let needle = arg(args, 0);
                let elements = self.array_snapshot(id);
                let from = relative_index(self.to_integer_arg(args.get(1), 0.0)?, elements.len());
                Ok(Value::Number(
                    elements[from..]
                        .iter()
                        .position(|e| e.strict_equals(&needle))
                        .map_or(-1.0, |i| (i + from) as f64),
                ))
            }
            "lastIndexOf" => {
                let needle = arg(args, 0);
                let elements = self.array_snapshot(id);
                let last = elements.len() as f64 - 1.0;
                let from = self.to_integer_arg(args.get(1), last)?;
                let from = if from < 0.0 { from + elements.len() as f64 } else { from.min(last) };
                if from < 0.0 {
                    return Ok(Value::Number(-1.0));
                }
                Ok(Value::Number(
                    elements[..=from as usize]
                        .iter()
                        .rposition(|e| e.strict_equals(&needle))
                        .map_or(-1.0, |i| i as f64),
                ))
            }

            "slice" => {
                let elements = self.array_snapshot(id);
                let len = elements.len();
                let start = relative_index(self.to_integer_arg(args.get(0), 0.0)?, len);
                let end = relative_index(self.to_integer_arg(args.get(1), len as f64)?, len);
                let slice = if start < end {
                    elements[start..end].to_vec()
                } else {
                    Vec::new()
                };
                Ok(self.create_array(slice))
            }
            "splice" => {
                let len = self.array_len(id);
                let start = relative_index(self.to_integer_arg(args.get(0), 0.0)?, len);
                let delete_count = match args.len() {
                    0 => 0,
                    1 => len - start,
                    _ => self
                        .to_integer_arg(args.get(1), 0.0)?
                        .clamp(0.0, (len - start) as f64) as usize,
                };
                let items: Vec<Value> = args.iter().skip(2).cloned().collect();
                if len - delete_count + items.len() >= MAX_ARRAY_LENGTH {
                    return Err(self.range_error("Invalid array length"));
                }
                let removed = match self.heap.array_elements_mut(id) {
                    Some(elements) => elements
                        .splice(start..start + delete_count, items)
                        .collect(),
                    None => Vec::new(),
                };
                Ok(self.create_array(removed))
            }
            "concat" => {
                let mut result = self.array_snapshot(id);
                for value in args {
                    match value {
                        Value::Object(other) if self.heap.get(*other).is_array() => {
                            result.extend(self.array_snapshot(*other));
                        }
                        other => result.push(other.clone()),
                    }
                }
                if result.len() >= MAX_ARRAY_LENGTH {
                    return Err(self.range_error("Invalid array length"));
                }
                Ok(self.create_array(result))
            }
            "reverse" => {
                if let Some(elements) = self.heap.array_elements_mut(id) {
                    elements.reverse();
                }
                Ok(this)
            }
            "sort" => {
                let comparator = arg(args, 0);
                if !comparator.is_undefined() {
                    self.require_callback(method, &comparator)?;
                }
                let elements = self.array_snapshot(id);
                let sorted = self.merge_sort(elements, &comparator)?;
                if let Some(elements) = self.heap.array_elements_mut(id) {
                    *elements = sorted;
                }
                Ok(this)
            }

            "flat" => {
                let depth = self.to_integer_arg(args.get(0), 1.0)?;
                let elements = self.array_snapshot(id);
                let mut result = Vec::new();
                self.flatten_into(&mut result, &elements, depth, 0)?;
                Ok(self.create_array(result))
            }
            "flatMap" => {
                let callback = arg(args, 0);
                self.require_callback(method, &callback)?;
                let this_arg = arg(args, 1);
                let len = self.array_len(id);
                let mut mapped = Vec::with_capacity(len);
                for index in 0..len {
                    if index >= self.array_len(id) {
                        break;
                    }
                    let element = self.array_get(id, index);
                    mapped.push(self.call_function(
                        &callback,
                        this_arg.clone(),
                        vec![element, Value::Number(index as f64), this.clone()],
                    )?);
                }
                let mut result = Vec::new();
                self.flatten_into(&mut result, &mapped, 1.0, 0)?;
                Ok(self.create_array(result))
            }
            "fill" => {
                let value = arg(args, 0);
                let len = self.array_len(id);
                let start = relative_index(self.to_integer_arg(args.get(1), 0.0)?, len);
                let end = relative_index(self.to_integer_arg(args.get(2), len as f64)?, len);
                if let Some(elements) = self.heap.array_elements_mut(id) {
                    for slot in elements.iter_mut().take(end).skip(start) {
                        *slot = value.clone();
                    }
                }
                Ok(this)
            }
            "at" => {
                let len = self.array_len(id) as f64;
                let index = self.to_integer_arg(args.get(0), 0.0)?;
                let index = if index < 0.0 { index + len } else { index };
                if index < 0.0 || index >= len {
                    return Ok(Value::Undefined);
                }
                Ok(self.array_get(id, index as usize))
            }

            _ => Err(self.type_error(format!("Array.prototype.{} is not a function", method))),
        }
    }

    /// The callback-driven iteration methods, which share their loop
    fn iterate_with_callback(&mut self, method: &str, id: ObjectId, this: Value, args: &[Value]) -> Eval<Value> {
        let callback = arg(args, 0);
        self.require_callback(method, &callback)?;
        let this_arg = arg(args, 1);
        let len = self.array_len(id);
        let mut mapped = Vec::new();

        for index in 0..len {
            // Elements removed during the loop are not visited
            if index >= self.array_len(id) {
                if method == "map" {
                    mapped.push(Value::Undefined);
                    continue;
                }
                break;
            }
            let element = self.array_get(id, index);
            let result = self.call_function(
                &callback,
                this_arg.clone(),
                vec![element.clone(), Value::Number(index as f64), this.clone()],
            )?;

            match method {
                "map" => mapped.push(result),
                "filter" if result.is_truthy() => mapped.push(element),
                "find" if result.is_truthy() => return Ok(element),
                "findIndex" if result.is_truthy() => return Ok(Value::Number(index as f64)),
                "some" if result.is_truthy() => return Ok(Value::Bool(true)),
                "every" if !result.is_truthy() => return Ok(Value::Bool(false)),
                _ => {}
            }
        }

        Ok(match method {
            "map" | "filter" => self.create_array(mapped),
            "findIndex" => Value::Number(-1.0),
            "some" => Value::Bool(false),
            "every" => Value::Bool(true),
            _ => Value::Undefined,
        })
    }

    /// `join`, printing nested occurrences of an array that is already being
    /// joined as empty strings
    fn array_join(&mut self, id: ObjectId, separator: &str) -> Eval<String> {
        if self.join_stack.contains(&id) {
            return Ok(String::new());
        }
        if self.join_stack.len() >= MAX_VALUE_DEPTH {
            return Err(self.range_error("Maximum call stack size exceeded"));
        }

        self.join_stack.push(id);
        let result = self.join_elements(id, separator);
        self.join_stack.pop();
        result
    }

    fn join_elements(&mut self, id: ObjectId, separator: &str) -> Eval<String> {
        let mut result = String::new();
        for (i, element) in self.array_snapshot(id).iter().enumerate() {
            if i > 0 {
                result.push_str(separator);
            }
            if !element.is_nullish() {
                result.push_str(&self.to_js_string(element)?);
            }
            if result.len() > MAX_STRING_LENGTH {
                return Err(self.range_error("Invalid string length"));
            }
        }
        Ok(result)
    }

    fn flatten_into(
        &mut self,
        out: &mut Vec<Value>,
        elements: &[Value],
        depth: f64,
        level: usize,
    ) -> Eval<()> {
        for element in elements {
            match element {
                Value::Object(id) if depth >= 1.0 && self.heap.get(*id).is_array() => {
                    if level >= MAX_VALUE_DEPTH {
                        return Err(self.range_error("Maximum call stack size exceeded"));
                    }
                    let nested = self.array_snapshot(*id);
                    self.flatten_into(out, &nested, depth - 1.0, level + 1)?;
                }
                other => out.push(other.clone()),
            }
            if out.len() >= MAX_ARRAY_LENGTH {
                return Err(self.range_error("Invalid array length"));
            }
        }
        Ok(())
    }

    /// Stable merge sort with a comparator that may throw
    fn merge_sort(&mut self, mut items: Vec<Value>, comparator: &Value) -> Eval<Vec<Value>> {
        if items.len() <= 1 {
            return Ok(items);
        }
        let right = items.split_off(items.len() / 2);
        let left = self.merge_sort(items, comparator)?;
        let right = self.merge_sort(right, comparator)?;

        let mut merged = Vec::with_capacity(left.len() + right.len());
        let mut left = left.into_iter().peekable();
        let mut right = right.into_iter().peekable();
        while let (Some(a), Some(b)) = (left.peek(), right.peek()) {
            // Take from the right only when strictly smaller, keeping ties in order
            if self.sort_compare(a, b, comparator)? == Ordering::Greater {
                merged.extend(right.next());
            } else {
                merged.extend(left.next());
            }
        }
        merged.extend(left);
        merged.extend(right);
        Ok(merged)
    }

    fn sort_compare(&mut self, a: &Value, b: &Value, comparator: &Value) -> Eval<Ordering> {
        // undefined always sorts last and never reaches the comparator
        match (a.is_undefined(), b.is_undefined()) {
            (true, true) => return Ok(Ordering::Equal),
            (true, false) => return Ok(Ordering::Greater),
            (false, true) => return Ok(Ordering::Less),
            (false, false) => {}
        }

        if comparator.is_undefined() {
            let a = self.to_js_string(a)?;
            let b = self.to_js_string(b)?;
            return Ok(a.cmp(&b));
        }

        let result = self.call_function(comparator, Value::Undefined, vec![a.clone(), b.clone()])?;
        let n = self.to_number(&result)?;
        Ok(if n > 0.0 {
            Ordering::Greater
        } else if n < 0.0 {
            Ordering::Less
        } else {
            Ordering::Equal
        })
    }

    // ------------------------------------------------------------------
    // Number.prototype / Boolean.prototype
    // ------------------------------------------------------------------

    pub(crate) fn call_number_method(&mut self, method: &str, this: Value, args: &[Value]) -> Eval<Value> {
        let Value::Number(n) = this else {
            return Err(self.type_error(format!(
                "Number.prototype.{} requires that 'this' be a Number",
                method
            )));
        };

        match method {
            "valueOf" => Ok(Value::Number(n)),
            "toFixed" => {
                let digits = self.to_integer_arg(args.first(), 0.0)?;
                if !(0.0..=100.0).contains(&digits) {
                    return Err(self.range_error("toFixed() digits argument must be between 0 and 100"));
                }
                Ok(Value::from(to_fixed(n, digits as usize)))
            }
            "toString" => {
                let radix = self.to_integer_arg(args.first(), 10.0)?;
                if !(2.0..=36.0).contains(&radix) {
                    return Err(self.range_error("toString() radix must be between 2 and 36"));
                }
                Ok(Value::from(number_to_radix(n, radix as u32)))
            }
            _ => Err(self.type_error(format!("Number.prototype.{} is not a function", method))),
        }
    }

    pub(crate) fn call_boolean_method(&mut self, method: &str, this: Value) -> Eval<Value> {
        let Value::Bool(b) = this else {
            return Err(self.type_error(format!(
                "Boolean.prototype.{} requires that 'this' be a Boolean",
                method
            )));
        };
        match method {
            "toString" => Ok(Value::str(if b { "true" } else { "false" })),
            _ => Ok(Value::Bool(b)),
        }
    }

    // ------------------------------------------------------------------
    // Function.prototype / Object.prototype / Error.prototype
    // ------------------------------------------------------------------

    pub(crate) fn call_function_method(&mut self, method: &str, this: Value, args: Vec<Value>) -> Eval<Value> {
        if !self.is_callable(&this) {
            let shown = self.describe_value(&this);
            return Err(self.type_error(format!(
                "Function.prototype.{} called on {}, which is not a function",
                method, shown
            )));
        }

        let mut args = args.into_iter();
        let this_arg = args.next().unwrap_or_default();

        match method {
            "call" => self.call_function(&this, this_arg, args.collect()),
            "apply" => {
                let list = args.next().unwrap_or_default();
                let call_args = match &list {
                    Value::Undefined | Value::Null => Vec::new(),
                    Value::Object(id) if self.heap.get(*id).is_array() => self.array_snapshot(*id),
                    _ => {
                        return Err(self.type_error("CreateListFromArrayLike called on non-object"));
                    }
                };
                self.call_function(&this, this_arg, call_args)
            }
            "bind" => {
                let Value::Object(target) = this else {
                    return Ok(Value::Undefined);
                };
                let mut bound_args: Vec<Value> = args.collect();
                let name = match self.heap.get(target).properties.get("name") {
                    Some(Value::String(name)) => format!("bound {}", name),
                    _ => "bound ".to_string(),
                };
                // Rebinding keeps the innermost `this`; collapse the chain
                let (target, this_arg) = match &self.heap.get(target).kind {
                    ObjectKind::Bound {
                        target: inner,
                        this_value,
                        args: inner_args,
                    } => {
                        bound_args.splice(0..0, inner_args.iter().cloned());
                        (*inner, this_value.clone())
                    }
                    _ => (target, this_arg),
                };
                let id = self.heap.allocate(
                    ObjectKind::Bound {
                        target,
                        this_value: this_arg,
                        args: bound_args,
                    },
                    Some(self.realm.function_proto),
                );
                self.heap
                    .get_mut(id)
                    .properties
                    .define("name", Value::from(name), false);
                Ok(Value::Object(id))
            }
            "toString" => match this {
                Value::Object(id) => Ok(Value::from(function_source(&self.heap, id))),
                _ => Ok(Value::Undefined),
            },
            _ => Err(self.type_error(format!("Function.prototype.{} is not a function", method))),
        }
    }

    pub(crate) fn call_object_method(&mut self, method: &str, this: Value, args: &[Value]) -> Eval<Value> {
        match method {
            "hasOwnProperty" => {
                let key = self.to_property_key(&arg(args, 0))?;
                Ok(Value::Bool(self.has_own_property(&this, &key)))
            }
            "toString" => Ok(Value::str(match this {
                Value::Undefined => "[object Undefined]",
                Value::Null => "[object Null]",
                Value::Object(id) if self.heap.get(id).is_array() => "[object Array]",
                Value::Object(id) if self.heap.get(id).is_callable() => "[object Function]",
                Value::Object(id) if self.is_error_object(id) => "[object Error]",
                _ => "[object Object]",
            })),
            "valueOf" => Ok(this),
            _ => Err(self.type_error(format!("Object.prototype.{} is not a function", method))),
        }
    }

    /// `Error.prototype.toString`
    pub(crate) fn error_to_string(&mut self, this: &Value) -> Eval<Value> {
        match this {
            Value::Object(id) => Ok(Value::from(error_summary(&self.heap, *id))),
            _ => Err(self.type_error("Error.prototype.toString called on non-object")),
        }
    }
}

fn find_chars(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.is_empty() {
        return Some(from.min(haystack.len()));
    }
    (from..haystack.len())
        .find(|&i| haystack[i..].starts_with(needle))
}

/// Last match starting at or before `from`
fn rfind_chars(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    let last_start = from.min(haystack.len() - needle.len());
    (0..=last_start)
        .rev()
        .find(|&i| haystack[i..].starts_with(needle))
}

fn char_range(chars: &[char], start: usize, end: usize) -> Value {
    if start >= end {
        return Value::str("");
    }
    Value::from(chars[start..end].iter().collect::<String>())
}

fn char_at(chars: &[char], index: f64) -> Option<char> {
    if index < 0.0 || index >= chars.len() as f64 {
        return None;
    }
    chars.get(index as usize).copied()
}

/// Expand `$$` and `$&` in a replacement string
fn expand_replacement(replacement: &str, matched: &str) -> String {
    if !replacement.contains('$') {
        return replacement.to_string();
    }
    let mut out = String::with_capacity(replacement.len());
    let mut chars = replacement.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('$', Some('$')) => {
                chars.next();
                out.push('$');
            }
            ('$', Some('&')) => {
                chars.next();
                out.push_str(matched);
            }
            _ => out.push(c),
        }
    }
    out
}

/// `Number.prototype.toFixed`; exact ties round away from zero
pub(crate) fn to_fixed(n: f64, digits: usize) -> String {
    if !n.is_finite() || n.abs() >= 1e21 {
        return number_to_string(n);
    }

    let scale = 10f64.powi(digits as i32);
    let scaled = n.abs() * scale;
    if scaled < 9e15 && scaled.fract() == 0.5 && scaled / scale == n.abs() {
        let rounded = scaled.ceil() / scale;
        let rounded = if n < 0.0 { -rounded } else { rounded };
        return format!("{:.*}", digits, rounded);
    }
    format!("{:.*}", digits, n)
}

/// `Number.prototype.toString(radix)`
pub(crate) fn number_to_radix(n: f64, radix: u32) -> String {
    if radix == 10 || !n.is_finite() {
        return number_to_string(n);
    }

    let digit = |d: u32| char::from_digit(d, radix).unwrap_or('0');
    let negative = n < 0.0;
    let n = n.abs();
    let mut integer = n.trunc();
    let mut fraction = n - integer;

    let mut int_digits = Vec::new();
    if integer == 0.0 {
        int_digits.push('0');
    }
    while integer >= 1.0 {
        let d = (integer % f64::from(radix)) as u32;
        int_digits.push(digit(d));
        integer = (integer / f64::from(radix)).trunc();
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.extend(int_digits.iter().rev());

    if fraction > 0.0 {
        out.push('.');
        let mut count = 0;
        while fraction > 0.0 && count < 52 {
            fraction *= f64::from(radix);
            let d = fraction.trunc();
            out.push(digit(d as u32));
            fraction -= d;
            count += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_find_chars() {
        let hay = chars("hello world");
        assert_eq!(find_chars(&hay, &chars("o"), 0), Some(4));
        assert_eq!(find_chars(&hay, &chars("o"), 5), Some(7));
        assert_eq!(find_chars(&hay, &chars("z"), 0), None);
        assert_eq!(find_chars(&hay, &chars(""), 3), Some(3));
        assert_eq!(rfind_chars(&hay, &chars("o"), 11), Some(7));
        assert_eq!(rfind_chars(&hay, &chars("o"), 6), Some(4));
    }

    #[test]
    fn test_to_fixed() {
        assert_eq!(to_fixed(3.14159, 2), "3.14");
        assert_eq!(to_fixed(2.5, 0), "3");
        assert_eq!(to_fixed(-2.5, 0), "-3");
        assert_eq!(to_fixed(0.125, 2), "0.13");
        assert_eq!(to_fixed(1.005, 2), "1.00");
        assert_eq!(to_fixed(42.0, 1), "42.0");
        assert_eq!(to_fixed(1e21, 2), "1e+21");
    }

    #[test]
    fn test_number_to_radix() {
        assert_eq!(number_to_radix(255.0, 16), "ff");
        assert_eq!(number_to_radix(5.0, 2), "101");
        assert_eq!(number_to_radix(-8.0, 8), "-10");
        assert_eq!(number_to_radix(0.5, 2), "0.1");
        assert_eq!(number_to_radix(0.0, 36), "0");
    }

    #[test]
    fn test_expand_replacement() {
        assert_eq!(expand_replacement("[$&]", "x"), "[x]");
        assert_eq!(expand_replacement("$$", "x"), "$");
        assert_eq!(expand_replacement("plain", "x"), "plain");
    }
}
