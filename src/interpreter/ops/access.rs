//! Property access on values
//!
//! Primitives read their properties through the matching prototype
//! (`String.prototype`, `Number.prototype`, ...). Arrays keep their elements
//! in a vector, so `length` and index keys are served from it directly.

use crate::interpreter::constants::MAX_ARRAY_LENGTH;
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::Eval;
use crate::memory::heap::array_index;
use crate::memory::value::{ObjectId, Value};

impl Interpreter {
    /// `target[key]`
    pub(crate) fn get_property(&mut self, target: &Value, key: &str) -> Eval<Value> {
        let proto = match target {
            Value::Undefined | Value::Null => {
                let shown = if target.is_undefined() { "undefined" } else { "null" };
                return Err(self.type_error(format!(
                    "Cannot read properties of {} (reading '{}')",
                    shown, key
                )));
            }
            Value::String(s) => {
                if key == "length" {
                    return Ok(Value::Number(s.chars().count() as f64));
                }
                if let Some(index) = array_index(key) {
                    return Ok(s
                        .chars()
                        .nth(index as usize)
                        .map(|c| Value::from(c.to_string()))
                        .unwrap_or_default());
                }
                self.realm.string_proto
            }
            Value::Number(_) => self.realm.number_proto,
            Value::Bool(_) => self.realm.boolean_proto,
            Value::Object(id) => {
                if let Some(elements) = self.heap.array_elements(*id) {
                    if key == "length" {
                        return Ok(Value::Number(elements.len() as f64));
                    }
                    if let Some(index) = array_index(key) {
                        return Ok(elements.get(index as usize).cloned().unwrap_or_default());
                    }
                }
                *id
            }
        };

        Ok(self.heap.lookup(proto, key).unwrap_or_default())
    }

    /// `target[index]` with a numeric key, skipping the string conversion
    /// for array elements and string characters
    pub(crate) fn get_indexed(&mut self, target: &Value, key: &Value) -> Eval<Value> {
        if let Value::Number(n) = key {
            let index = *n as usize;
            if *n >= 0.0 && n.fract() == 0.0 {
                match target {
                    Value::Object(id) => {
                        if let Some(elements) = self.heap.array_elements(*id) {
                            return Ok(elements.get(index).cloned().unwrap_or_default());
                        }
                    }
                    Value::String(s) => {
                        return Ok(s
                            .chars()
                            .nth(index)
                            .map(|c| Value::from(c.to_string()))
                            .unwrap_or_default());
                    }
                    _ => {}
                }
            }
        }

        let key = self.to_property_key(key)?;
        self.get_property(target, &key)
    }

    /// `target[key] = value`
    pub(crate) fn set_property(&mut self, target: &Value, key: &str, value: Value) -> Eval<()> {
        let id = match target {
            Value::Undefined | Value::Null => {
                let shown = if target.is_undefined() { "undefined" } else { "null" };
                return Err(self.type_error(format!(
                    "Cannot set properties of {} (setting '{}')",
                    shown, key
                )));
            }
            Value::Object(id) => *id,
            // Writes to primitives are dropped
            _ => return Ok(()),
        };

        if self.heap.get(id).is_array() {
            if key == "length" {
                let length = self.to_number(&value)?;
                return self.set_array_length(id, length);
            }
            if let Some(index) = array_index(key) {
                return self.set_element(id, index as usize, value);
            }
        }

        self.heap.get_mut(id).properties.set(key, value);
        Ok(())
    }

    /// `target[index] = value` with a numeric key
    pub(crate) fn set_indexed(&mut self, target: &Value, key: &Value, value: Value) -> Eval<()> {
        if let (Value::Object(id), Value::Number(n)) = (target, key) {
            if *n >= 0.0 && n.fract() == 0.0 && self.heap.get(*id).is_array() {
                return self.set_element(*id, *n as usize, value);
            }
        }

        let key = self.to_property_key(key)?;
        self.set_property(target, &key, value)
    }

    fn set_element(&mut self, id: ObjectId, index: usize, value: Value) -> Eval<()> {
        if index >= MAX_ARRAY_LENGTH {
            return Err(self.range_error("Invalid array length"));
        }
        if let Some(elements) = self.heap.array_elements_mut(id) {
            if index >= elements.len() {
                elements.resize(index + 1, Value::Undefined);
            }
            elements[index] = value;
        }
        Ok(())
    }

    pub(crate) fn set_array_length(&mut self, id: ObjectId, length: f64) -> Eval<()> {
        if length < 0.0 || length.fract() != 0.0 || length >= MAX_ARRAY_LENGTH as f64 {
            return Err(self.range_error("Invalid array length"));
        }
        if let Some(elements) = self.heap.array_elements_mut(id) {
            elements.resize(length as usize, Value::Undefined);
        }
        Ok(())
    }

    /// `key in target`
    pub(crate) fn has_property(&self, id: ObjectId, key: &str) -> bool {
        if let Some(elements) = self.heap.array_elements(id) {
            if key == "length" {
                return true;
            }
            if let Some(index) = array_index(key) {
                return (index as usize) < elements.len();
            }
        }
        self.heap.lookup(id, key).is_some()
    }

    /// `Object.prototype.hasOwnProperty`
    pub(crate) fn has_own_property(&self, target: &Value, key: &str) -> bool {
        match target {
            Value::String(s) => {
                key == "length"
                    || array_index(key).is_some_and(|i| (i as usize) < s.chars().count())
            }
            Value::Object(id) => {
                if let Some(elements) = self.heap.array_elements(*id) {
                    if key == "length" {
                        return true;
                    }
                    if let Some(index) = array_index(key) {
                        return (index as usize) < elements.len();
                    }
                }
                self.heap.get(*id).properties.contains(key)
            }
            _ => false,
        }
    }

    /// Enumerable string keys: indices first, then named properties.
    /// With `inherited`, enumerable keys of the prototype chain follow
    /// (as `for-in` sees them).
    pub(crate) fn enumerable_keys(&self, target: &Value, inherited: bool) -> Vec<String> {
        match target {
            Value::String(s) => (0..s.chars().count()).map(|i| i.to_string()).collect(),
            Value::Object(id) => {
                let mut keys: Vec<String> = match self.heap.array_elements(*id) {
                    Some(elements) => (0..elements.len()).map(|i| i.to_string()).collect(),
                    None => Vec::new(),
                };
                keys.extend(self.heap.get(*id).properties.keys());

                if inherited {
                    let mut proto = self.heap.get(*id).proto;
                    while let Some(proto_id) = proto {
                        for key in self.heap.get(proto_id).properties.keys() {
                            if !keys.contains(&key) {
                                keys.push(key);
                            }
                        }
                        proto = self.heap.get(proto_id).proto;
                    }
                }
                keys
            }
            _ => Vec::new(),
        }
    }

    /// Own enumerable `(key, value)` pairs
    pub(crate) fn own_entries(&mut self, target: &Value) -> Eval<Vec<(String, Value)>> {
        let keys = self.enumerable_keys(target, false);
        let mut entries = Vec::with_capacity(keys.len());
        for key in keys {
            let value = self.get_property(target, &key)?;
            entries.push((key, value));
        }
        Ok(entries)
    }

    /// Values produced by spreading or iterating `value`
    pub(crate) fn iterate_values(&mut self, value: &Value) -> Eval<Vec<Value>> {
        let elements = match value {
            Value::String(s) => Some(s.chars().map(|c| Value::from(c.to_string())).collect()),
            Value::Object(id) => self.heap.array_elements(*id).cloned(),
            _ => None,
        };

        match elements {
            Some(elements) => Ok(elements),
            None => {
                let shown = self.describe_value(value);
                Err(self.type_error(format!("{} is not iterable", shown)))
            }
        }
    }
}
