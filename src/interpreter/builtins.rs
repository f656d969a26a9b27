//! Built-in objects and native functions
//!
//! Every native function is a heap object of kind [`ObjectKind::Native`]
//! carrying its qualified name (`"Math.floor"`, `"Array.prototype.map"`).
//! Calls are dispatched on that name: prototype methods go to `methods`,
//! `JSON` to `json`, everything else is handled here.
//!
//! Globals are properties of the global object (`globalThis`). Identifier
//! lookup falls back to it when no scope declares the name, so a script may
//! shadow any builtin with its own `let`/`const`.

use crate::console::format::format_log_args;
use crate::console::LogLevel;
use crate::interpreter::constants::{MAX_ARRAY_LENGTH, MAX_SAFE_INTEGER};
use crate::interpreter::engine::{Interpreter, Realm};
use crate::interpreter::errors::{ErrorKind, Eval};
use crate::interpreter::ops::js_pow;
use crate::memory::heap::{Heap, NativeFunction, ObjectKind};
use crate::memory::value::{ObjectId, Value};

const CONSOLE_METHODS: [(&str, LogLevel); 5] = [
    ("console.log", LogLevel::Log),
    ("console.info", LogLevel::Info),
    ("console.warn", LogLevel::Warn),
    ("console.error", LogLevel::Error),
    ("console.debug", LogLevel::Debug),
];

const MATH_CONSTANTS: [(&str, f64); 8] = [
    ("PI", std::f64::consts::PI),
    ("E", std::f64::consts::E),
    ("LN2", std::f64::consts::LN_2),
    ("LN10", std::f64::consts::LN_10),
    ("LOG2E", std::f64::consts::LOG2_E),
    ("LOG10E", std::f64::consts::LOG10_E),
    ("SQRT2", std::f64::consts::SQRT_2),
    ("SQRT1_2", std::f64::consts::FRAC_1_SQRT_2),
];

const MATH_FUNCTIONS: &[&str] = &[
    "Math.floor",
    "Math.ceil",
    "Math.round",
    "Math.trunc",
    "Math.abs",
    "Math.sign",
    "Math.sqrt",
    "Math.cbrt",
    "Math.pow",
    "Math.min",
    "Math.max",
    "Math.random",
    "Math.hypot",
    "Math.log",
    "Math.log2",
    "Math.log10",
    "Math.exp",
    "Math.sin",
    "Math.cos",
    "Math.tan",
    "Math.asin",
    "Math.acos",
    "Math.atan",
    "Math.atan2",
];

const OBJECT_STATICS: &[&str] = &[
    "Object.keys",
    "Object.values",
    "Object.entries",
    "Object.assign",
    "Object.create",
];

const ARRAY_STATICS: &[&str] = &["Array.isArray", "Array.from", "Array.of"];

const NUMBER_STATICS: &[&str] = &[
    "Number.isInteger",
    "Number.isSafeInteger",
    "Number.isFinite",
    "Number.isNaN",
    "Number.parseFloat",
    "Number.parseInt",
];

const GLOBAL_FUNCTIONS: &[&str] = &["parseInt", "parseFloat", "isNaN", "isFinite"];

const OBJECT_METHODS: &[&str] = &[
    "Object.prototype.hasOwnProperty",
    "Object.prototype.toString",
    "Object.prototype.valueOf",
];

const FUNCTION_METHODS: &[&str] = &[
    "Function.prototype.call",
    "Function.prototype.apply",
    "Function.prototype.bind",
    "Function.prototype.toString",
];

const STRING_METHODS: &[&str] = &[
    "String.prototype.toUpperCase",
    "String.prototype.toLowerCase",
    "String.prototype.trim",
    "String.prototype.trimStart",
    "String.prototype.trimEnd",
    "String.prototype.includes",
    "String.prototype.indexOf",
    "String.prototype.lastIndexOf",
    "String.prototype.startsWith",
    "String.prototype.endsWith",
    "String.prototype.slice",
    "String.prototype.substring",
    "String.prototype.split",
    "String.prototype.repeat",
    "String.prototype.charAt",
    "String.prototype.charCodeAt",
    "String.prototype.at",
    "String.prototype.padStart",
    "String.prototype.padEnd",
    "String.prototype.replace",
    "String.prototype.replaceAll",
    "String.prototype.concat",
    "String.prototype.toString",
    "String.prototype.valueOf",
];

const ARRAY_METHODS: &[&str] = &[
    "Array.prototype.push",
    "Array.prototype.pop",
    "Array.prototype.shift",
    "Array.prototype.unshift",
    "Array.prototype.join",
    "Array.prototype.map",
    "Array.prototype.filter",
    "Array.prototype.reduce",
    "Array.prototype.forEach",
    "Array.prototype.find",
    "Array.prototype.findIndex",
    "Array.prototype.some",
    "Array.prototype.every",
    "Array.prototype.includes",
    "Array.prototype.indexOf",
    "Array.prototype.lastIndexOf",
    "Array.prototype.slice",
    "Array.prototype.splice",
    "Array.prototype.concat",
    "Array.prototype.reverse",
    "Array.prototype.sort",
    "Array.prototype.flat",
    "Array.prototype.flatMap",
    "Array.prototype.fill",
    "Array.prototype.at",
    "Array.prototype.toString",
];

const NUMBER_METHODS: &[&str] = &[
    "Number.prototype.toFixed",
    "Number.prototype.toString",
    "Number.prototype.valueOf",
];

const BOOLEAN_METHODS: &[&str] = &["Boolean.prototype.toString", "Boolean.prototype.valueOf"];

/// `args[i]`, or `undefined` when the caller passed fewer arguments
pub(crate) fn arg(args: &[Value], i: usize) -> Value {
    args.get(i).cloned().unwrap_or_default()
}

impl Interpreter {
    /// Allocate the prototypes every other builtin hangs off
    pub(crate) fn create_realm(heap: &mut Heap) -> Realm {
        let object_proto = heap.allocate(ObjectKind::Ordinary, None);
        let function_proto = heap.allocate(ObjectKind::Ordinary, Some(object_proto));
        let array_proto = heap.allocate(ObjectKind::Ordinary, Some(object_proto));
        let string_proto = heap.allocate(ObjectKind::Ordinary, Some(object_proto));
        let number_proto = heap.allocate(ObjectKind::Ordinary, Some(object_proto));
        let boolean_proto = heap.allocate(ObjectKind::Ordinary, Some(object_proto));

        // TypeError.prototype and friends inherit from Error.prototype
        let base_error = heap.allocate(ObjectKind::Ordinary, Some(object_proto));
        let mut error_protos = [base_error; 5];
        for kind in ErrorKind::ALL.into_iter().skip(1) {
            error_protos[kind.index()] = heap.allocate(ObjectKind::Ordinary, Some(base_error));
        }
        for kind in ErrorKind::ALL {
            let props = &mut heap.get_mut(error_protos[kind.index()]).properties;
            props.define("name", Value::str(kind.name()), false);
            props.define("message", Value::str(""), false);
        }

        let global_object = heap.allocate(ObjectKind::Ordinary, Some(object_proto));

        Realm {
            object_proto,
            function_proto,
            array_proto,
            string_proto,
            number_proto,
            boolean_proto,
            error_protos,
            global_object,
        }
    }

    /// Populate the global object
    pub(crate) fn install_globals(&mut self) {
        let realm = self.realm.clone();

        let console = self.create_object();
        for (name, _) in CONSOLE_METHODS {
            self.define_native(console, name);
        }
        self.define_global("console", Value::Object(console));

        let math = self.create_object();
        for (key, value) in MATH_CONSTANTS {
            self.heap
                .get_mut(math)
                .properties
                .define(key, Value::Number(value), false);
        }
        for &name in MATH_FUNCTIONS {
            self.define_native(math, name);
        }
        self.define_global("Math", Value::Object(math));

        let json = self.create_object();
        self.define_native(json, "JSON.stringify");
        self.define_native(json, "JSON.parse");
        self.define_global("JSON", Value::Object(json));

        let object = self.define_constructor("Object", realm.object_proto);
        for &name in OBJECT_STATICS {
            self.define_native(object, name);
        }
        for &name in OBJECT_METHODS {
            self.define_native(realm.object_proto, name);
        }

        self.define_constructor("Function", realm.function_proto);
        for &name in FUNCTION_METHODS {
            self.define_native(realm.function_proto, name);
        }

        let array = self.define_constructor("Array", realm.array_proto);
        for &name in ARRAY_STATICS {
            self.define_native(array, name);
        }
        for &name in ARRAY_METHODS {
            self.define_native(realm.array_proto, name);
        }

        let string = self.define_constructor("String", realm.string_proto);
        self.define_native(string, "String.fromCharCode");
        for &name in STRING_METHODS {
            self.define_native(realm.string_proto, name);
        }

        let number = self.define_constructor("Number", realm.number_proto);
        for &name in NUMBER_STATICS {
            self.define_native(number, name);
        }
        let number_constants = [
            ("MAX_SAFE_INTEGER", MAX_SAFE_INTEGER),
            ("MIN_SAFE_INTEGER", -MAX_SAFE_INTEGER),
            ("EPSILON", f64::EPSILON),
            ("MAX_VALUE", f64::MAX),
            ("MIN_VALUE", 5e-324),
            ("POSITIVE_INFINITY", f64::INFINITY),
            ("NEGATIVE_INFINITY", f64::NEG_INFINITY),
            ("NaN", f64::NAN),
        ];
        for (key, value) in number_constants {
            self.heap
                .get_mut(number)
                .properties
                .define(key, Value::Number(value), false);
        }
        for &name in NUMBER_METHODS {
            self.define_native(realm.number_proto, name);
        }

        self.define_constructor("Boolean", realm.boolean_proto);
        for &name in BOOLEAN_METHODS {
            self.define_native(realm.boolean_proto, name);
        }

        for kind in ErrorKind::ALL {
            self.define_constructor(kind.name(), realm.error_protos[kind.index()]);
        }
        self.define_native(
            realm.error_protos[ErrorKind::Error.index()],
            "Error.prototype.toString",
        );

        let global = realm.global_object;
        for &name in GLOBAL_FUNCTIONS {
            self.define_native(global, name);
        }
        self.define_global("NaN", Value::Number(f64::NAN));
        self.define_global("Infinity", Value::Number(f64::INFINITY));
        self.define_global("undefined", Value::Undefined);
        self.define_global("globalThis", Value::Object(global));
    }

    fn define_global(&mut self, name: &str, value: Value) {
        let global = self.realm.global_object;
        self.heap.get_mut(global).properties.define(name, value, false);
    }

    fn create_native(&mut self, name: &'static str) -> ObjectId {
        let native = NativeFunction { name };
        let id = self.heap.allocate(
            ObjectKind::Native(native),
            Some(self.realm.function_proto),
        );
        self.heap
            .get_mut(id)
            .properties
            .define("name", Value::str(native.short_name()), false);
        id
    }

    /// Attach a native function to `target` under its short name
    fn define_native(&mut self, target: ObjectId, name: &'static str) -> ObjectId {
        let id = self.create_native(name);
        let key = NativeFunction { name }.short_name();
        self.heap
            .get_mut(target)
            .properties
            .define(key, Value::Object(id), false);
        id
    }

    /// Create a global constructor linked with its prototype object
    fn define_constructor(&mut self, name: &'static str, proto: ObjectId) -> ObjectId {
        let id = self.create_native(name);
        self.heap
            .get_mut(id)
            .properties
            .define("prototype", Value::Object(proto), false);
        self.heap
            .get_mut(proto)
            .properties
            .define("constructor", Value::Object(id), false);
        self.define_global(name, Value::Object(id));
        id
    }

    /// Invoke a native function
    pub(crate) fn call_native(&mut self, native: NativeFunction, this: Value, args: Vec<Value>) -> Eval<Value> {
        let name = native.name;

        if let Some(method) = name.strip_prefix("String.prototype.") {
            return self.call_string_method(method, this, &args);
        }
        if let Some(method) = name.strip_prefix("Array.prototype.") {
            return self.call_array_method(method, this, &args);
        }
        if let Some(method) = name.strip_prefix("Number.prototype.") {
            return self.call_number_method(method, this, &args);
        }
        if let Some(method) = name.strip_prefix("Boolean.prototype.") {
            return self.call_boolean_method(method, this);
        }
        if let Some(method) = name.strip_prefix("Function.prototype.") {
            return self.call_function_method(method, this, args);
        }
        if let Some(method) = name.strip_prefix("Object.prototype.") {
            return self.call_object_method(method, this, &args);
        }
        if name == "Error.prototype.toString" {
            return self.error_to_string(&this);
        }
        if let Some(function) = name.strip_prefix("Math.") {
            return self.call_math(function, &args);
        }
        if let Some((_, level)) = CONSOLE_METHODS.iter().find(|(n, _)| *n == name) {
            let line = format_log_args(&self.heap, &args);
            self.console.write(*level, &line);
            return Ok(Value::Undefined);
        }

        match name {
            "JSON.stringify" => self.json_stringify(&args),
            "JSON.parse" => self.json_parse(&args),

            "Object.keys" => {
                let target = self.require_object_coercible(&arg(&args, 0))?;
                let keys = self
                    .enumerable_keys(&target, false)
                    .into_iter()
                    .map(Value::from)
                    .collect();
                Ok(self.create_array(keys))
            }
            "Object.values" => {
                let target = self.require_object_coercible(&arg(&args, 0))?;
                let values = self
                    .own_entries(&target)?
                    .into_iter()
                    .map(|(_, value)| value)
                    .collect();
                Ok(self.create_array(values))
            }
            "Object.entries" => {
                let target = self.require_object_coercible(&arg(&args, 0))?;
                let mut entries = Vec::new();
                for (key, value) in self.own_entries(&target)? {
                    entries.push(self.create_array(vec![Value::from(key), value]));
                }
                Ok(self.create_array(entries))
            }
            "Object.assign" => {
                let target = self.require_object_coercible(&arg(&args, 0))?;
                for source in args.iter().skip(1) {
                    for (key, value) in self.own_entries(source)? {
                        self.set_property(&target, &key, value)?;
                    }
                }
                Ok(target)
            }
            "Object.create" => {
                let proto = match arg(&args, 0) {
                    Value::Object(id) => Some(id),
                    Value::Null => None,
                    other => {
                        let shown = self.describe_value(&other);
                        return Err(self.type_error(format!(
                            "Object prototype may only be an Object or null: {}",
                            shown
                        )));
                    }
                };
                Ok(Value::Object(self.heap.allocate(ObjectKind::Ordinary, proto)))
            }

            "Array.isArray" => Ok(Value::Bool(
                arg(&args, 0)
                    .as_object()
                    .is_some_and(|id| self.heap.get(id).is_array()),
            )),
            "Array.of" => Ok(self.create_array(args)),
            "Array.from" => self.array_from(&args),

            "String.fromCharCode" => {
                let mut text = String::with_capacity(args.len());
                for code in &args {
                    let code = self.to_uint32(code)? & 0xFFFF;
                    text.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
                }
                Ok(Value::from(text))
            }

            "Number.isInteger" => Ok(Value::Bool(
                matches!(arg(&args, 0), Value::Number(n) if n.is_finite() && n.fract() == 0.0),
            )),
            "Number.isSafeInteger" => Ok(Value::Bool(matches!(
                arg(&args, 0),
                Value::Number(n) if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER
            ))),
            "Number.isFinite" => Ok(Value::Bool(
                matches!(arg(&args, 0), Value::Number(n) if n.is_finite()),
            )),
            "Number.isNaN" => Ok(Value::Bool(
                matches!(arg(&args, 0), Value::Number(n) if n.is_nan()),
            )),
            "isNaN" => Ok(Value::Bool(self.to_number(&arg(&args, 0))?.is_nan())),
            "isFinite" => Ok(Value::Bool(self.to_number(&arg(&args, 0))?.is_finite())),
            "parseInt" | "Number.parseInt" => {
                let text = self.to_js_string(&arg(&args, 0))?;
                let radix = self.to_int32(&arg(&args, 1))?;
                Ok(Value::Number(parse_int(&text, radix)))
            }
            "parseFloat" | "Number.parseFloat" => {
                let text = self.to_js_string(&arg(&args, 0))?;
                Ok(Value::Number(parse_float(&text)))
            }

            // Constructors called as plain functions
            "Number" => match args.first() {
                Some(value) => Ok(Value::Number(self.to_number(value)?)),
                None => Ok(Value::Number(0.0)),
            },
            "String" => match args.first() {
                Some(value) => Ok(Value::String(self.to_js_string(value)?)),
                None => Ok(Value::str("")),
            },
            "Boolean" => Ok(Value::Bool(arg(&args, 0).is_truthy())),
            "Object" | "Array" => self.construct_native(native, args, name),
            _ if ErrorKind::from_name(name).is_some() => self.construct_native(native, args, name),

            _ => Err(self.type_error(format!("{} is not a function", name))),
        }
    }

    /// `new` on a native constructor
    pub(crate) fn construct_native(&mut self, native: NativeFunction, args: Vec<Value>, shown: &str) -> Eval<Value> {
        match native.name {
            "Object" => match args.into_iter().next() {
                Some(value @ Value::Object(_)) => Ok(value),
                _ => Ok(Value::Object(self.create_object())),
            },
            "Array" => match args.as_slice() {
                [Value::Number(length)] => {
                    let length = *length;
                    if length < 0.0 || length.fract() != 0.0 || length >= MAX_ARRAY_LENGTH as f64 {
                        return Err(self.range_error("Invalid array length"));
                    }
                    Ok(self.create_array(vec![Value::Undefined; length as usize]))
                }
                _ => Ok(self.create_array(args)),
            },
            name => match ErrorKind::from_name(name) {
                Some(kind) => {
                    let message = match args.first() {
                        None | Some(Value::Undefined) => String::new(),
                        Some(value) => self.to_js_string(value)?.to_string(),
                    };
                    Ok(self.create_error(kind, &message))
                }
                None => Err(self.type_error(format!("{} is not a constructor", shown))),
            },
        }
    }

    fn require_object_coercible(&mut self, value: &Value) -> Eval<Value> {
        if value.is_nullish() {
            return Err(self.type_error("Cannot convert undefined or null to object"));
        }
        Ok(value.clone())
    }

    /// `Array.from(source, mapFn)`
    fn array_from(&mut self, args: &[Value]) -> Eval<Value> {
        let source = arg(args, 0);
        let mut items = match &source {
            Value::String(_) => self.iterate_values(&source)?,
            Value::Object(id) if self.heap.get(*id).is_array() => self.iterate_values(&source)?,
            Value::Object(_) => {
                // Array-like: anything with a `length`
                let length = self.get_property(&source, "length")?;
                let length = self.to_integer_arg(Some(&length), 0.0)?.max(0.0);
                if length >= MAX_ARRAY_LENGTH as f64 {
                    return Err(self.range_error("Invalid array length"));
                }
                let mut items = Vec::with_capacity(length as usize);
                for i in 0..length as usize {
                    items.push(self.get_indexed(&source, &Value::Number(i as f64))?);
                }
                items
            }
            Value::Undefined | Value::Null => {
                let shown = self.describe_value(&source);
                return Err(self.type_error(format!("{} is not iterable", shown)));
            }
            _ => Vec::new(),
        };

        let map_fn = arg(args, 1);
        if !map_fn.is_undefined() {
            if !self.is_callable(&map_fn) {
                let shown = self.describe_value(&map_fn);
                return Err(self.type_error(format!("{} is not a function", shown)));
            }
            for (i, item) in items.iter_mut().enumerate() {
                let value = std::mem::take(item);
                *item = self.call_function(&map_fn, Value::Undefined, vec![value, Value::Number(i as f64)])?;
            }
        }

        Ok(self.create_array(items))
    }

    fn call_math(&mut self, function: &str, args: &[Value]) -> Eval<Value> {
        // Variadic functions first; the rest take one or two numbers
        match function {
            "random" => return Ok(Value::Number(self.next_random())),
            "min" | "max" => {
                let is_max = function == "max";
                let mut result = if is_max { f64::NEG_INFINITY } else { f64::INFINITY };
                for value in args {
                    let n = self.to_number(value)?;
                    if n.is_nan() {
                        result = f64::NAN;
                    } else if !result.is_nan() {
                        result = if is_max { result.max(n) } else { result.min(n) };
                    }
                }
                return Ok(Value::Number(result));
            }
            "hypot" => {
                let mut sum = 0.0;
                for value in args {
                    let n = self.to_number(value)?;
                    if n.is_infinite() {
                        return Ok(Value::Number(f64::INFINITY));
                    }
                    sum += n * n;
                }
                return Ok(Value::Number(sum.sqrt()));
            }
            _ => {}
        }

        let x = self.to_number(&arg(args, 0))?;
        let result = match function {
            "floor" => x.floor(),
            "ceil" => x.ceil(),
            "round" => js_round(x),
            "trunc" => x.trunc(),
            "abs" => x.abs(),
            "sign" => {
                if x.is_nan() || x == 0.0 {
                    x
                } else {
                    x.signum()
                }
            }
            "sqrt" => x.sqrt(),
            "cbrt" => x.cbrt(),
            "log" => x.ln(),
            "log2" => x.log2(),
            "log10" => x.log10(),
            "exp" => x.exp(),
            "sin" => x.sin(),
            "cos" => x.cos(),
            "tan" => x.tan(),
            "asin" => x.asin(),
            "acos" => x.acos(),
            "atan" => x.atan(),
            "pow" => js_pow(x, self.to_number(&arg(args, 1))?),
            "atan2" => x.atan2(self.to_number(&arg(args, 1))?),
            _ => return Err(self.type_error(format!("Math.{} is not a function", function))),
        };
        Ok(Value::Number(result))
    }

    /// xorshift64* in [0, 1)
    fn next_random(&mut self) -> f64 {
        let mut x = self.rng_state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.rng_state = x;
        let bits = x.wrapping_mul(0x2545_f491_4f6c_dd1d) >> 11;
        bits as f64 / (1u64 << 53) as f64
    }
}

/// `Math.round`: halves round towards +Infinity
fn js_round(x: f64) -> f64 {
    if !x.is_finite() {
        return x;
    }
    let floor = x.floor();
    if x - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

/// `parseInt(text, radix)`; a radix of 0 means "10, or 16 for a `0x` prefix"
pub(crate) fn parse_int(text: &str, radix: i32) -> f64 {
    let mut rest = text.trim_start();
    let mut sign = 1.0;
    if let Some(stripped) = rest.strip_prefix('-') {
        sign = -1.0;
        rest = stripped;
    } else if let Some(stripped) = rest.strip_prefix('+') {
        rest = stripped;
    }

    let mut radix = radix;
    let has_hex_prefix = rest.starts_with("0x") || rest.starts_with("0X");
    if radix == 0 {
        radix = if has_hex_prefix { 16 } else { 10 };
    }
    if !(2..=36).contains(&radix) {
        return f64::NAN;
    }
    if radix == 16 && has_hex_prefix {
        rest = &rest[2..];
    }

    let mut result = 0.0;
    let mut any_digit = false;
    for c in rest.chars() {
        let Some(digit) = c.to_digit(radix as u32) else {
            break;
        };
        result = result * f64::from(radix) + f64::from(digit);
        any_digit = true;
    }

    if any_digit {
        sign * result
    } else {
        f64::NAN
    }
}

/// `parseFloat(text)`: the longest numeric prefix
pub(crate) fn parse_float(text: &str) -> f64 {
    let rest = text.trim_start();
    let bytes = rest.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    if rest[end..].starts_with("Infinity") {
        return if rest.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    let mantissa = &rest[digits_start..end];
    if mantissa.is_empty() || mantissa == "." {
        return f64::NAN;
    }

    // Exponent only counts when at least one digit follows
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }

    rest[..end].parse::<f64>().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("42px", 0), 42.0);
        assert_eq!(parse_int("  -17", 10), -17.0);
        assert_eq!(parse_int("0x1F", 0), 31.0);
        assert_eq!(parse_int("ff", 16), 255.0);
        assert_eq!(parse_int("101", 2), 5.0);
        assert!(parse_int("px", 0).is_nan());
        assert!(parse_int("10", 1).is_nan());
    }

    #[test]
    fn test_parse_float() {
        assert_eq!(parse_float("3.14abc"), 3.14);
        assert_eq!(parse_float("  -2.5e3"), -2500.0);
        assert_eq!(parse_float("1e"), 1.0);
        assert_eq!(parse_float(".5"), 0.5);
        assert_eq!(parse_float("-Infinity"), f64::NEG_INFINITY);
        assert!(parse_float("abc").is_nan());
        assert!(parse_float(".").is_nan());
    }

    #[test]
    fn test_round_halves_up() {
        assert_eq!(js_round(2.5), 3.0);
        assert_eq!(js_round(-2.5), -2.0);
        assert_eq!(js_round(-2.6), -3.0);
        assert_eq!(js_round(0.49999999999999994), 0.0);
    }
}
