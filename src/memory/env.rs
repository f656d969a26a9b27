//! Lexical environments
//!
//! Scopes live in an arena ([`Environments`]) and point at their parent by
//! [`EnvId`], so a closure can keep its defining scope alive after the call
//! that created it returns.
//!
//! # Binding Rules
//!
//! - `var` and function declarations belong to the nearest function scope
//! - `let` and `const` belong to the innermost block scope and stay in the
//!   temporal dead zone until their declaration runs
//! - Assigning to a `const` binding fails

use rustc_hash::FxHashMap;

use super::value::Value;

/// Index of a scope in the environment arena
pub type EnvId = usize;

/// How a binding was introduced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Var,
    Let,
    Const,
    Function,
    Param,
}

impl BindingKind {
    fn is_lexical(self) -> bool {
        matches!(self, BindingKind::Let | BindingKind::Const)
    }
}

#[derive(Debug, Clone)]
pub struct Binding {
    pub value: Value,
    pub kind: BindingKind,
    /// False while a `let`/`const` is in its temporal dead zone
    pub initialized: bool,
}

/// Reasons a binding operation can fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvError {
    NotDefined(String),
    Uninitialized(String),
    ConstAssignment(String),
    AlreadyDeclared(String),
}

impl EnvError {
    /// Message text used for the thrown error object
    pub fn message(&self) -> String {
        match self {
            EnvError::NotDefined(name) => format!("{} is not defined", name),
            EnvError::Uninitialized(name) => {
                format!("Cannot access '{}' before initialization", name)
            }
            EnvError::ConstAssignment(_) => "Assignment to constant variable.".to_string(),
            EnvError::AlreadyDeclared(name) => {
                format!("Identifier '{}' has already been declared", name)
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scope {
    pub parent: Option<EnvId>,
    pub bindings: FxHashMap<String, Binding>,
    /// Function (or program) scope: target of `var` hoisting
    pub is_function: bool,
    /// Referenced by a closure, so it must outlive its block
    pub captured: bool,
}

/// Arena of all scopes created during a run
#[derive(Debug, Default)]
pub struct Environments {
    scopes: Vec<Scope>,
}

impl Environments {
    pub fn new() -> Self {
        Environments::default()
    }

    /// Create a scope; the first function scope is the global scope
    pub fn push_scope(&mut self, parent: Option<EnvId>, is_function: bool) -> EnvId {
        self.scopes.push(Scope {
            parent,
            is_function,
            ..Scope::default()
        });
        self.scopes.len() - 1
    }

    /// Drop a scope that nothing references any more. Only the most recently
    /// created, uncaptured scope can be reclaimed.
    pub fn release(&mut self, env: EnvId) {
        if env + 1 == self.scopes.len() && env > 0 && !self.scopes[env].captured {
            self.scopes.pop();
        }
    }

    /// Mark `env` and its ancestors as referenced by a closure
    pub fn capture(&mut self, env: EnvId) {
        let mut current = Some(env);
        while let Some(id) = current {
            if self.scopes[id].captured {
                break;
            }
            self.scopes[id].captured = true;
            current = self.scopes[id].parent;
        }
    }

    /// Copy of `env` with the same parent and bindings, for per-iteration
    /// loop scopes
    pub fn clone_scope(&mut self, env: EnvId) -> EnvId {
        let scope = &self.scopes[env];
        let copy = Scope {
            parent: scope.parent,
            bindings: scope.bindings.clone(),
            is_function: scope.is_function,
            captured: false,
        };
        self.scopes.push(copy);
        self.scopes.len() - 1
    }

    /// Whether `name` is bound directly in `env`
    pub fn has_own(&self, env: EnvId, name: &str) -> bool {
        self.scopes[env].bindings.contains_key(name)
    }

    pub fn scope(&self, env: EnvId) -> &Scope {
        &self.scopes[env]
    }

    /// Nearest enclosing function scope (the `var` target)
    pub fn function_scope(&self, env: EnvId) -> EnvId {
        let mut current = env;
        loop {
            let scope = &self.scopes[current];
            match scope.parent {
                Some(parent) if !scope.is_function => current = parent,
                _ => return current,
            }
        }
    }

    /// Declare a binding in `env`.
    ///
    /// Lexical bindings start uninitialized unless a value is supplied.
    /// Re-declaring `var`/function bindings is allowed; anything involving a
    /// lexical binding is an error.
    pub fn declare(
        &mut self,
        env: EnvId,
        name: &str,
        kind: BindingKind,
        value: Option<Value>,
    ) -> Result<(), EnvError> {
        let scope = &mut self.scopes[env];

        if let Some(existing) = scope.bindings.get_mut(name) {
            if existing.kind.is_lexical() || kind.is_lexical() {
                return Err(EnvError::AlreadyDeclared(name.to_string()));
            }
            // var re-declaration keeps the old value unless a new one is given
            if let Some(value) = value {
                existing.value = value;
            }
            existing.initialized = true;
            if kind == BindingKind::Function {
                existing.kind = kind;
            }
            return Ok(());
        }

        let initialized = value.is_some() || !kind.is_lexical();
        scope.bindings.insert(
            name.to_string(),
            Binding {
                value: value.unwrap_or_default(),
                kind,
                initialized,
            },
        );
        Ok(())
    }

    /// Finish a `let`/`const` declaration (leaves the temporal dead zone)
    pub fn initialize(&mut self, env: EnvId, name: &str, value: Value) {
        if let Some(binding) = self.scopes[env].bindings.get_mut(name) {
            binding.value = value;
            binding.initialized = true;
        }
    }

    /// Scope that holds `name`, searching outward from `env`
    pub fn resolve(&self, env: EnvId, name: &str) -> Option<EnvId> {
        let mut current = Some(env);
        while let Some(id) = current {
            let scope = &self.scopes[id];
            if scope.bindings.contains_key(name) {
                return Some(id);
            }
            current = scope.parent;
        }
        None
    }

    /// Read a binding
    pub fn get(&self, env: EnvId, name: &str) -> Result<Value, EnvError> {
        let scope_id = self
            .resolve(env, name)
            .ok_or_else(|| EnvError::NotDefined(name.to_string()))?;

        match self.scopes[scope_id].bindings.get(name) {
            Some(binding) if binding.initialized => Ok(binding.value.clone()),
            Some(_) => Err(EnvError::Uninitialized(name.to_string())),
            None => Err(EnvError::NotDefined(name.to_string())),
        }
    }

    /// Assign to an existing binding
    pub fn assign(&mut self, env: EnvId, name: &str, value: Value) -> Result<(), EnvError> {
        let scope_id = self
            .resolve(env, name)
            .ok_or_else(|| EnvError::NotDefined(name.to_string()))?;

        match self.scopes[scope_id].bindings.get_mut(name) {
            Some(binding) if !binding.initialized => {
                Err(EnvError::Uninitialized(name.to_string()))
            }
            Some(binding) if binding.kind == BindingKind::Const => {
                Err(EnvError::ConstAssignment(name.to_string()))
            }
            Some(binding) => {
                binding.value = value;
                Ok(())
            }
            None => Err(EnvError::NotDefined(name.to_string())),
        }
    }

    /// Whether `name` is visible from `env` (used by `typeof`)
    pub fn is_declared(&self, env: EnvId, name: &str) -> bool {
        self.resolve(env, name).is_some()
    }

    /// Names bound directly in `env`, with their current values
    pub fn bindings(&self, env: EnvId) -> impl Iterator<Item = (&String, &Binding)> {
        self.scopes[env].bindings.iter()
    }

    /// Number of live scopes
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Environments, EnvId) {
        let mut envs = Environments::new();
        let global = envs.push_scope(None, true);
        (envs, global)
    }

    #[test]
    fn test_shadowing_and_lookup() {
        let (mut envs, global) = setup();
        envs.declare(global, "x", BindingKind::Let, Some(Value::Number(1.0)))
            .unwrap();
        let block = envs.push_scope(Some(global), false);
        envs.declare(block, "x", BindingKind::Let, Some(Value::Number(2.0)))
            .unwrap();

        assert_eq!(envs.get(block, "x"), Ok(Value::Number(2.0)));
        assert_eq!(envs.get(global, "x"), Ok(Value::Number(1.0)));
    }

    #[test]
    fn test_temporal_dead_zone() {
        let (mut envs, global) = setup();
        envs.declare(global, "x", BindingKind::Let, None).unwrap();

        assert_eq!(
            envs.get(global, "x"),
            Err(EnvError::Uninitialized("x".to_string()))
        );
        envs.initialize(global, "x", Value::Number(5.0));
        assert_eq!(envs.get(global, "x"), Ok(Value::Number(5.0)));
    }

    #[test]
    fn test_const_assignment() {
        let (mut envs, global) = setup();
        envs.declare(global, "c", BindingKind::Const, Some(Value::Null))
            .unwrap();

        let err = envs.assign(global, "c", Value::Bool(true)).unwrap_err();
        assert_eq!(err.message(), "Assignment to constant variable.");
    }

    #[test]
    fn test_redeclaration() {
        let (mut envs, global) = setup();
        envs.declare(global, "v", BindingKind::Var, Some(Value::Number(1.0)))
            .unwrap();
        envs.declare(global, "v", BindingKind::Var, None).unwrap();
        assert_eq!(envs.get(global, "v"), Ok(Value::Number(1.0)));

        envs.declare(global, "l", BindingKind::Let, None).unwrap();
        let err = envs.declare(global, "l", BindingKind::Var, None).unwrap_err();
        assert_eq!(err.message(), "Identifier 'l' has already been declared");
    }

    #[test]
    fn test_function_scope_and_release() {
        let (mut envs, global) = setup();
        let block = envs.push_scope(Some(global), false);
        assert_eq!(envs.function_scope(block), global);

        envs.release(block);
        assert_eq!(envs.len(), 1);

        let captured = envs.push_scope(Some(global), false);
        envs.capture(captured);
        envs.release(captured);
        assert_eq!(envs.len(), 2);
    }

    #[test]
    fn test_undeclared_name() {
        let (mut envs, global) = setup();
        assert_eq!(
            envs.assign(global, "nope", Value::Null).unwrap_err().message(),
            "nope is not defined"
        );
    }
}
