//! Memory model for the snippet interpreter
//!
//! This module provides the core memory abstractions:
//! - [`value`]: Runtime value representation (primitives and object handles)
//! - [`heap`]: Object arena with insertion-ordered properties and prototype links
//! - [`env`]: Lexical scope arena with `var`/`let`/`const` binding rules
//!
//! # Ownership
//!
//! Objects and scopes reference each other by index rather than by pointer, so
//! closures and cyclic object graphs need no reference counting. Both arenas
//! belong to a single interpreter and are dropped together at the end of a run.

pub mod env;
pub mod heap;
pub mod value;

pub use env::{BindingKind, EnvError, EnvId, Environments};
pub use heap::{Heap, HeapObject, NativeFunction, ObjectKind, PropertyMap};
pub use value::{number_to_string, ObjectId, Value};
