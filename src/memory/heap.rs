//! Object heap for the interpreter
//!
//! Every value with identity lives in a single arena owned by the [`Heap`] and is
//! addressed by [`ObjectId`]. A run is short-lived and the whole heap is dropped
//! with the interpreter, so objects are never collected individually.
//!
//! # Object Layout
//!
//! Each [`HeapObject`] carries:
//! - a [`ObjectKind`] for the internal slots (array elements, closure data, ...)
//! - an insertion-ordered [`PropertyMap`] of named properties
//! - an optional prototype link used for property lookup and `instanceof`

use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::env::EnvId;
use super::value::{ObjectId, Value};
use crate::parser::ast::FunctionDef;

/// A named property slot
#[derive(Debug, Clone)]
pub struct Property {
    pub value: Value,
    /// Non-enumerable properties are skipped by `for-in`, `Object.keys` and the formatters
    pub enumerable: bool,
}

/// Property storage that remembers insertion order
#[derive(Debug, Clone, Default)]
pub struct PropertyMap {
    slots: FxHashMap<String, Property>,
    order: Vec<String>,
}

impl PropertyMap {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.slots.get(key).map(|p| &p.value)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }

    /// Set an enumerable property, keeping the flag of an existing one
    pub fn set(&mut self, key: &str, value: Value) {
        match self.slots.get_mut(key) {
            Some(slot) => slot.value = value,
            None => self.define(key, value, true),
        }
    }

    /// Create or overwrite a property with an explicit enumerable flag
    pub fn define(&mut self, key: &str, value: Value, enumerable: bool) {
        if self
            .slots
            .insert(key.to_string(), Property { value, enumerable })
            .is_none()
        {
            self.order.push(key.to_string());
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let removed = self.slots.remove(key)?;
        self.order.retain(|k| k != key);
        Some(removed.value)
    }

    /// Enumerable keys in property order: integer-like keys ascending, then
    /// the rest in insertion order
    pub fn keys(&self) -> Vec<String> {
        let mut integer_keys: Vec<(u32, &String)> = Vec::new();
        let mut named_keys: Vec<&String> = Vec::new();

        for key in &self.order {
            let enumerable = self.slots.get(key).is_some_and(|p| p.enumerable);
            if !enumerable {
                continue;
            }
            match array_index(key) {
                Some(index) => integer_keys.push((index, key)),
                None => named_keys.push(key),
            }
        }

        integer_keys.sort_by_key(|(index, _)| *index);
        integer_keys
            .into_iter()
            .map(|(_, key)| key.clone())
            .chain(named_keys.into_iter().cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Canonical array index spelling (`"0"`, `"17"`, not `"01"` or `"-1"`)
pub fn array_index(key: &str) -> Option<u32> {
    if key.is_empty() || (key.len() > 1 && key.starts_with('0')) {
        return None;
    }
    if !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse::<u32>().ok().filter(|&i| i != u32::MAX)
}

/// Natively implemented function, identified by its qualified name
/// (`"Math.floor"`, `"Array.prototype.map"`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeFunction {
    pub name: &'static str,
}

impl NativeFunction {
    /// Short name as seen by scripts (`fn.name`)
    pub fn short_name(&self) -> &'static str {
        self.name.rsplit('.').next().unwrap_or(self.name)
    }
}

/// Internal slots of a heap object
#[derive(Debug, Clone)]
pub enum ObjectKind {
    Ordinary,
    Array(Vec<Value>),
    /// User-defined function with its captured scope
    Closure {
        def: Rc<FunctionDef>,
        env: EnvId,
        /// Lexical `this` captured by arrow functions
        this_value: Option<Value>,
    },
    Native(NativeFunction),
    /// Result of `fn.bind(thisArg, ...args)`
    Bound {
        target: ObjectId,
        this_value: Value,
        args: Vec<Value>,
    },
    /// Instances created by the `Error` constructors
    Error,
}

/// An object in the heap arena
#[derive(Debug, Clone)]
pub struct HeapObject {
    pub kind: ObjectKind,
    pub properties: PropertyMap,
    pub proto: Option<ObjectId>,
}

impl HeapObject {
    pub fn is_callable(&self) -> bool {
        matches!(
            self.kind,
            ObjectKind::Closure { .. } | ObjectKind::Native(_) | ObjectKind::Bound { .. }
        )
    }

    pub fn is_array(&self) -> bool {
        matches!(self.kind, ObjectKind::Array(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, ObjectKind::Error)
    }
}

/// The heap
#[derive(Debug, Default)]
pub struct Heap {
    objects: Vec<HeapObject>,
}

impl Heap {
    pub fn new() -> Self {
        Heap::default()
    }

    /// Allocate an object and return its handle
    pub fn allocate(&mut self, kind: ObjectKind, proto: Option<ObjectId>) -> ObjectId {
        self.objects.push(HeapObject {
            kind,
            properties: PropertyMap::default(),
            proto,
        });
        self.objects.len() - 1
    }

    pub fn get(&self, id: ObjectId) -> &HeapObject {
        &self.objects[id]
    }

    pub fn get_mut(&mut self, id: ObjectId) -> &mut HeapObject {
        &mut self.objects[id]
    }

    /// Look a property up along the prototype chain
    pub fn lookup(&self, id: ObjectId, key: &str) -> Option<Value> {
        let mut current = Some(id);
        while let Some(object_id) = current {
            let object = self.get(object_id);
            if let Some(value) = object.properties.get(key) {
                return Some(value.clone());
            }
            current = object.proto;
        }
        None
    }

    /// Whether `proto` appears on the prototype chain of `id`
    pub fn inherits_from(&self, id: ObjectId, proto: ObjectId) -> bool {
        let mut current = self.get(id).proto;
        while let Some(object_id) = current {
            if object_id == proto {
                return true;
            }
            current = self.get(object_id).proto;
        }
        false
    }

    /// Elements of an array object, None for other kinds
    pub fn array_elements(&self, id: ObjectId) -> Option<&Vec<Value>> {
        match &self.get(id).kind {
            ObjectKind::Array(elements) => Some(elements),
            _ => None,
        }
    }

    pub fn array_elements_mut(&mut self, id: ObjectId) -> Option<&mut Vec<Value>> {
        match &mut self.get_mut(id).kind {
            ObjectKind::Array(elements) => Some(elements),
            _ => None,
        }
    }

    /// Total number of objects allocated during the run
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_order() {
        let mut props = PropertyMap::default();
        props.set("b", Value::Number(1.0));
        props.set("2", Value::Number(2.0));
        props.set("a", Value::Number(3.0));
        props.set("1", Value::Number(4.0));
        props.define("hidden", Value::Null, false);

        assert_eq!(props.keys(), vec!["1", "2", "b", "a"]);
        assert_eq!(props.len(), 5);
    }

    #[test]
    fn test_set_keeps_enumerability() {
        let mut props = PropertyMap::default();
        props.define("constructor", Value::Null, false);
        props.set("constructor", Value::Bool(true));

        assert!(props.keys().is_empty());
        assert_eq!(props.get("constructor"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_array_index() {
        assert_eq!(array_index("0"), Some(0));
        assert_eq!(array_index("42"), Some(42));
        assert_eq!(array_index("01"), None);
        assert_eq!(array_index("-1"), None);
        assert_eq!(array_index("1.5"), None);
    }

    #[test]
    fn test_prototype_lookup() {
        let mut heap = Heap::new();
        let proto = heap.allocate(ObjectKind::Ordinary, None);
        heap.get_mut(proto)
            .properties
            .set("greet", Value::str("hi"));
        let child = heap.allocate(ObjectKind::Ordinary, Some(proto));

        assert_eq!(heap.lookup(child, "greet"), Some(Value::str("hi")));
        assert!(heap.inherits_from(child, proto));
        assert!(!heap.inherits_from(proto, child));
        assert_eq!(heap.lookup(child, "missing"), None);
    }
}
