// Execution engine for the snippet interpreter

use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::console::format::{error_summary, format_value, primitive_to_string};
use crate::console::Console;
use crate::interpreter::constants::{DEFAULT_MAX_CALL_DEPTH, MAX_EVAL_DEPTH};
use crate::interpreter::errors::{Abrupt, ErrorKind, Eval, Halt, RunError};
use crate::memory::env::{BindingKind, EnvError, EnvId, Environments};
use crate::memory::heap::{Heap, ObjectKind};
use crate::memory::value::{ObjectId, Value};
use crate::parser::ast::*;

/// Pending non-local control transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ControlFlow {
    Normal,
    Break,
    Continue,
    Return,
}

/// Resource limits for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionLimits {
    /// Deepest allowed nesting of script function calls
    pub max_call_depth: usize,
    /// Statement/iteration budget; `None` runs to completion
    pub max_steps: Option<u64>,
}

impl Default for ExecutionLimits {
    fn default() -> Self {
        ExecutionLimits {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            max_steps: None,
        }
    }
}

/// Successful run
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// Display form of the trailing expression value, when it is not `undefined`
    pub result: Option<String>,
    /// Statements and loop iterations executed
    pub steps: u64,
}

/// Intrinsic objects every run starts with
#[derive(Debug, Clone)]
pub(crate) struct Realm {
    pub object_proto: ObjectId,
    pub function_proto: ObjectId,
    pub array_proto: ObjectId,
    pub string_proto: ObjectId,
    pub number_proto: ObjectId,
    pub boolean_proto: ObjectId,
    /// Indexed by [`ErrorKind::index`]
    pub error_protos: [ObjectId; 5],
    pub global_object: ObjectId,
}

/// The tree-walking interpreter for one snippet run
pub struct Interpreter {
    /// Object arena
    pub(crate) heap: Heap,

    /// Scope arena
    pub(crate) envs: Environments,

    /// Innermost scope of the code being executed
    pub(crate) current_env: EnvId,

    pub(crate) realm: Realm,

    /// Logging channel used by the `console` builtins
    pub(crate) console: Console,

    pub(crate) control_flow: ControlFlow,

    /// Value of the last `return`
    pub(crate) return_value: Value,

    /// Value of the last expression statement (saved and restored around calls)
    pub(crate) completion: Option<Value>,

    /// `this` of the executing function
    pub(crate) this_value: Value,

    pub(crate) call_depth: usize,

    /// Open `evaluate_expr` / `execute_statement` frames
    pub(crate) eval_depth: usize,

    pub(crate) steps: u64,

    pub(crate) limits: ExecutionLimits,

    /// Location of the statement being executed
    pub(crate) current_location: SourceLocation,

    /// Arrays currently being joined, to cut cycles in `toString`
    pub(crate) join_stack: Vec<ObjectId>,

    /// `Math.random` state (xorshift64*)
    pub(crate) rng_state: u64,
}

impl Interpreter {
    /// Create an interpreter with a fresh global environment
    pub fn new(console: Console, limits: ExecutionLimits) -> Self {
        let mut heap = Heap::new();
        let mut envs = Environments::new();
        let global_env = envs.push_scope(None, true);
        let realm = Self::create_realm(&mut heap);

        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0x2545_f491_4f6c_dd1d);

        let mut interpreter = Interpreter {
            heap,
            envs,
            current_env: global_env,
            realm,
            console,
            control_flow: ControlFlow::Normal,
            return_value: Value::Undefined,
            completion: None,
            this_value: Value::Undefined,
            call_depth: 0,
            eval_depth: 0,
            steps: 0,
            limits,
            current_location: SourceLocation::new(1, 1),
            join_stack: Vec::new(),
            rng_state: seed | 1,
        };
        interpreter.install_globals();
        interpreter
    }

    /// Run a parsed program to completion
    pub fn run(&mut self, program: &Program) -> Result<Outcome, RunError> {
        let result = self
            .declare_function_scope(&program.body)
            .and_then(|_| self.execute_statements(&program.body));

        match result {
            Ok(()) => {
                let result = match self.completion.take() {
                    Some(Value::Undefined) | None => None,
                    Some(value) => Some(format_value(&self.heap, &value)),
                };
                Ok(Outcome {
                    result,
                    steps: self.steps,
                })
            }
            Err(Abrupt::Throw(value)) => Err(self.uncaught(value)),
            Err(Abrupt::Halt(halt)) => Err(RunError::Halted(halt)),
        }
    }

    /// Describe a value that escaped the program. The message is never empty:
    /// errors without one fall back to their name, other values to their
    /// `message` property, then to their string form.
    fn uncaught(&mut self, value: Value) -> RunError {
        let location = self.current_location;

        let (message, summary) = match &value {
            Value::Object(id) if self.is_error_object(*id) => {
                let message = match self.heap.lookup(*id, "message") {
                    Some(Value::Undefined) | None => String::new(),
                    Some(message) => primitive_to_string(&message),
                };
                (message, error_summary(&self.heap, *id))
            }
            Value::Object(id) => match self.heap.lookup(*id, "message") {
                Some(Value::String(message)) if !message.is_empty() => {
                    (message.to_string(), message.to_string())
                }
                _ => {
                    let text = self.thrown_text(&value);
                    (text.clone(), text)
                }
            },
            _ => {
                let text = self.thrown_text(&value);
                (text.clone(), text)
            }
        };

        let (message, summary) = match (message.is_empty(), summary.is_empty()) {
            (false, false) => (message, summary),
            (true, false) => (summary.clone(), summary),
            (false, true) => (message.clone(), message),
            (true, true) => {
                let literal = match value {
                    Value::String(_) => "''",
                    _ => "exception",
                };
                (format!("Uncaught {}", literal), literal.to_string())
            }
        };
        RunError::Uncaught {
            message,
            summary,
            location,
        }
    }

    fn thrown_text(&mut self, value: &Value) -> String {
        match self.to_js_string(value) {
            Ok(text) => text.to_string(),
            Err(_) => primitive_to_string(value),
        }
    }

    /// Run `step` one evaluator frame deeper; past [`MAX_EVAL_DEPTH`] frames it
    /// throws a `RangeError` instead
    pub(crate) fn descend<T>(&mut self, step: impl FnOnce(&mut Self) -> Eval<T>) -> Eval<T> {
        if self.eval_depth >= MAX_EVAL_DEPTH {
            return Err(self.range_error("Maximum call stack size exceeded"));
        }
        self.eval_depth += 1;
        let result = step(self);
        self.eval_depth -= 1;
        result
    }

    /// Error instances and objects inheriting from `Error.prototype`
    pub(crate) fn is_error_object(&self, id: ObjectId) -> bool {
        self.heap.get(id).is_error()
            || self
                .heap
                .inherits_from(id, self.realm.error_protos[ErrorKind::Error.index()])
    }

    /// Count one unit of work against the step budget
    pub(crate) fn tick(&mut self) -> Eval<()> {
        self.steps += 1;
        match self.limits.max_steps {
            Some(max) if self.steps > max => Err(Abrupt::Halt(Halt::StepLimit)),
            _ => Ok(()),
        }
    }

    // ------------------------------------------------------------------
    // Errors
    // ------------------------------------------------------------------

    /// Build an error object of the given kind
    pub(crate) fn create_error(&mut self, kind: ErrorKind, message: &str) -> Value {
        let id = self.heap.allocate(
            ObjectKind::Error,
            Some(self.realm.error_protos[kind.index()]),
        );
        self.heap
            .get_mut(id)
            .properties
            .define("message", Value::str(message), false);
        Value::Object(id)
    }

    /// Abrupt completion throwing a new error object
    pub(crate) fn error(&mut self, kind: ErrorKind, message: impl AsRef<str>) -> Abrupt {
        Abrupt::Throw(self.create_error(kind, message.as_ref()))
    }

    pub(crate) fn type_error(&mut self, message: impl AsRef<str>) -> Abrupt {
        self.error(ErrorKind::TypeError, message)
    }

    pub(crate) fn range_error(&mut self, message: impl AsRef<str>) -> Abrupt {
        self.error(ErrorKind::RangeError, message)
    }

    /// Convert a binding failure into the matching thrown error
    pub(crate) fn env_error(&mut self, err: EnvError) -> Abrupt {
        let kind = match err {
            EnvError::NotDefined(_) | EnvError::Uninitialized(_) => ErrorKind::ReferenceError,
            EnvError::ConstAssignment(_) => ErrorKind::TypeError,
            EnvError::AlreadyDeclared(_) => ErrorKind::SyntaxError,
        };
        self.error(kind, err.message())
    }

    // ------------------------------------------------------------------
    // Scopes and declarations
    // ------------------------------------------------------------------

    /// Run `f` inside a new child scope of the current one
    pub(crate) fn with_scope<T>(&mut self, f: impl FnOnce(&mut Self) -> Eval<T>) -> Eval<T> {
        let scope = self.envs.push_scope(Some(self.current_env), false);
        let saved = std::mem::replace(&mut self.current_env, scope);
        let result = f(self);
        self.current_env = saved;
        self.envs.release(scope);
        result
    }

    /// Hoist `var` names into the current function scope and declare the
    /// top-level lexical bindings of `body`
    pub(crate) fn declare_function_scope(&mut self, body: &[Stmt]) -> Eval<()> {
        let mut names = Vec::new();
        collect_var_names(body, &mut names);

        let target = self.envs.function_scope(self.current_env);
        for name in names {
            self.envs
                .declare(target, &name, BindingKind::Var, None)
                .map_err(|err| self.env_error(err))?;
        }

        self.declare_lexical(body)
    }

    /// Declare `let`/`const` (in their dead zone) and function declarations
    /// that appear directly in `body`
    pub(crate) fn declare_lexical(&mut self, body: &[Stmt]) -> Eval<()> {
        let env = self.current_env;
        for stmt in body {
            match stmt {
                Stmt::VarDecl {
                    kind, declarations, ..
                } if kind.is_lexical() => {
                    let binding_kind = binding_kind(*kind);
                    for (name, _) in declarations {
                        self.envs
                            .declare(env, name, binding_kind, None)
                            .map_err(|err| self.env_error(err))?;
                    }
                }
                Stmt::FunctionDecl(def) => {
                    let closure = self.create_closure(Rc::clone(def), None);
                    let name = def.name.as_deref().unwrap_or_default();
                    self.envs
                        .declare(env, name, BindingKind::Function, Some(closure))
                        .map_err(|err| self.env_error(err))?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Functions
    // ------------------------------------------------------------------

    /// Create a closure over the current scope. `name` overrides the
    /// function's own name (anonymous functions take the name of what they
    /// are assigned to).
    pub(crate) fn create_closure(&mut self, def: Rc<FunctionDef>, name: Option<&str>) -> Value {
        let env = self.current_env;
        self.envs.capture(env);

        let this_value = def.is_arrow.then(|| self.this_value.clone());
        let display_name = name
            .map(str::to_string)
            .or_else(|| def.name.clone())
            .unwrap_or_default();
        let arity = def.arity();
        let is_arrow = def.is_arrow;

        let id = self.heap.allocate(
            ObjectKind::Closure {
                def,
                env,
                this_value,
            },
            Some(self.realm.function_proto),
        );
        let props = &mut self.heap.get_mut(id).properties;
        props.define("name", Value::from(display_name), false);
        props.define("length", Value::Number(arity as f64), false);

        if !is_arrow {
            let proto = self
                .heap
                .allocate(ObjectKind::Ordinary, Some(self.realm.object_proto));
            self.heap
                .get_mut(proto)
                .properties
                .define("constructor", Value::Object(id), false);
            self.heap
                .get_mut(id)
                .properties
                .define("prototype", Value::Object(proto), false);
        }

        Value::Object(id)
    }

    /// Create a closure for a named function expression: its name is bound
    /// in a scope of its own, visible only inside the function
    pub(crate) fn create_named_function_expression(&mut self, def: Rc<FunctionDef>) -> Eval<Value> {
        let Some(name) = def.name.clone() else {
            return Ok(self.create_closure(def, None));
        };

        let scope = self.envs.push_scope(Some(self.current_env), false);
        let saved = std::mem::replace(&mut self.current_env, scope);
        let closure = self.create_closure(def, None);
        self.current_env = saved;

        self.envs
            .declare(scope, &name, BindingKind::Function, Some(closure.clone()))
            .map_err(|err| self.env_error(err))?;
        Ok(closure)
    }

    pub(crate) fn is_callable(&self, value: &Value) -> bool {
        value
            .as_object()
            .is_some_and(|id| self.heap.get(id).is_callable())
    }

    /// Call any callable value
    pub(crate) fn call_function(&mut self, callee: &Value, this: Value, args: Vec<Value>) -> Eval<Value> {
        let Some(id) = callee.as_object().filter(|id| self.heap.get(*id).is_callable()) else {
            let shown = self.describe_value(callee);
            return Err(self.type_error(format!("{} is not a function", shown)));
        };

        match self.heap.get(id).kind.clone() {
            ObjectKind::Closure {
                def,
                env,
                this_value,
            } => self.call_closure(def, env, this_value.unwrap_or(this), args),
            ObjectKind::Native(native) => self.call_native(native, this, args),
            ObjectKind::Bound {
                target,
                this_value,
                args: bound_args,
            } => {
                let mut all_args = bound_args;
                all_args.extend(args);
                self.call_function(&Value::Object(target), this_value, all_args)
            }
            _ => Err(self.type_error("value is not a function")),
        }
    }

    /// Enter a script function: new function scope, parameters bound, body run
    fn call_closure(
        &mut self,
        def: Rc<FunctionDef>,
        env: EnvId,
        this: Value,
        args: Vec<Value>,
    ) -> Eval<Value> {
        if self.call_depth >= self.limits.max_call_depth {
            return Err(self.range_error("Maximum call stack size exceeded"));
        }
        self.tick()?;

        self.call_depth += 1;
        let scope = self.envs.push_scope(Some(env), true);
        let saved_env = std::mem::replace(&mut self.current_env, scope);
        let saved_this = std::mem::replace(&mut self.this_value, this);
        let saved_completion = self.completion.take();
        let saved_location = self.current_location;

        let result = self.run_function_body(&def, args);

        self.current_env = saved_env;
        self.this_value = saved_this;
        self.completion = saved_completion;
        self.call_depth -= 1;
        if result.is_ok() {
            self.current_location = saved_location;
        }
        self.envs.release(scope);

        result
    }

    fn run_function_body(&mut self, def: &FunctionDef, mut args: Vec<Value>) -> Eval<Value> {
        let scope = self.current_env;

        for (i, param) in def.params.iter().enumerate() {
            let value = if param.rest {
                let rest = if i < args.len() {
                    args.split_off(i)
                } else {
                    Vec::new()
                };
                self.create_array(rest)
            } else {
                let value = args.get(i).cloned().unwrap_or_default();
                match (&value, &param.default) {
                    (Value::Undefined, Some(default)) => self.evaluate_expr(default)?,
                    _ => value,
                }
            };
            self.envs
                .declare(scope, &param.name, BindingKind::Param, Some(value))
                .map_err(|err| self.env_error(err))?;
        }

        match &def.body {
            FunctionBody::Expr(expr) => self.evaluate_expr(expr),
            FunctionBody::Block(body) => {
                self.declare_function_scope(body)?;
                self.execute_statements(body)?;

                if self.control_flow == ControlFlow::Return {
                    self.control_flow = ControlFlow::Normal;
                    Ok(std::mem::take(&mut self.return_value))
                } else {
                    // break/continue cannot cross a function boundary
                    self.control_flow = ControlFlow::Normal;
                    Ok(Value::Undefined)
                }
            }
        }
    }

    /// `new callee(...args)`
    pub(crate) fn construct(&mut self, callee: &Value, args: Vec<Value>, shown: &str) -> Eval<Value> {
        let Some(id) = callee.as_object() else {
            return Err(self.type_error(format!("{} is not a constructor", shown)));
        };

        match self.heap.get(id).kind.clone() {
            ObjectKind::Closure { def, .. } if !def.is_arrow => {
                let proto = match self.heap.get(id).properties.get("prototype") {
                    Some(Value::Object(proto)) => *proto,
                    _ => self.realm.object_proto,
                };
                let instance = Value::Object(self.heap.allocate(ObjectKind::Ordinary, Some(proto)));
                let result = self.call_function(callee, instance.clone(), args)?;
                Ok(match result {
                    Value::Object(_) => result,
                    _ => instance,
                })
            }
            ObjectKind::Native(native) => self.construct_native(native, args, shown),
            ObjectKind::Bound { target, args: bound_args, .. } => {
                let mut all_args = bound_args;
                all_args.extend(args);
                self.construct(&Value::Object(target), all_args, shown)
            }
            _ => Err(self.type_error(format!("{} is not a constructor", shown))),
        }
    }

    // ------------------------------------------------------------------
    // Allocation helpers
    // ------------------------------------------------------------------

    pub(crate) fn create_array(&mut self, elements: Vec<Value>) -> Value {
        Value::Object(
            self.heap
                .allocate(ObjectKind::Array(elements), Some(self.realm.array_proto)),
        )
    }

    pub(crate) fn create_object(&mut self) -> ObjectId {
        self.heap
            .allocate(ObjectKind::Ordinary, Some(self.realm.object_proto))
    }

    /// Short rendering of a value for error messages
    pub(crate) fn describe_value(&self, value: &Value) -> String {
        match value {
            Value::String(s) => format!("\"{}\"", s),
            Value::Object(id) => {
                let object = self.heap.get(*id);
                if object.is_array() {
                    "object".to_string()
                } else if object.is_callable() {
                    match object.properties.get("name") {
                        Some(Value::String(name)) if !name.is_empty() => name.to_string(),
                        _ => "function".to_string(),
                    }
                } else {
                    "#<Object>".to_string()
                }
            }
            other => primitive_to_string(other),
        }
    }
}

fn binding_kind(kind: VarKind) -> BindingKind {
    match kind {
        VarKind::Var => BindingKind::Var,
        VarKind::Let => BindingKind::Let,
        VarKind::Const => BindingKind::Const,
    }
}

/// Collect `var` names declared anywhere in `body`, not descending into functions
fn collect_var_names(body: &[Stmt], names: &mut Vec<String>) {
    for stmt in body {
        collect_var_names_in(stmt, names);
    }
}

fn collect_var_names_in(stmt: &Stmt, names: &mut Vec<String>) {
    let for_each_binding = |binding: &ForBinding, names: &mut Vec<String>| {
        if binding.kind == Some(VarKind::Var) {
            names.push(binding.name.clone());
        }
    };

    match stmt {
        Stmt::VarDecl {
            kind: VarKind::Var,
            declarations,
            ..
        } => names.extend(declarations.iter().map(|(name, _)| name.clone())),
        Stmt::Block { body, .. } => collect_var_names(body, names),
        Stmt::If {
            then_branch,
            else_branch,
            ..
        } => {
            collect_var_names_in(then_branch, names);
            if let Some(else_branch) = else_branch {
                collect_var_names_in(else_branch, names);
            }
        }
        Stmt::While { body, .. } | Stmt::DoWhile { body, .. } => {
            collect_var_names_in(body, names)
        }
        Stmt::For { init, body, .. } => {
            if let Some(init) = init {
                collect_var_names_in(init, names);
            }
            collect_var_names_in(body, names);
        }
        Stmt::ForOf { binding, body, .. } | Stmt::ForIn { binding, body, .. } => {
            for_each_binding(binding, names);
            collect_var_names_in(body, names);
        }
        Stmt::Try {
            block,
            handler,
            finalizer,
            ..
        } => {
            collect_var_names(block, names);
            if let Some(handler) = handler {
                collect_var_names(handler, names);
            }
            if let Some(finalizer) = finalizer {
                collect_var_names(finalizer, names);
            }
        }
        Stmt::Switch { cases, .. } => {
            for case in cases {
                collect_var_names(&case.body, names);
            }
        }
        _ => {}
    }
}

/// Whether `body` declares anything block-scoped, so it needs its own scope
pub(crate) fn has_lexical_declarations(body: &[Stmt]) -> bool {
    body.iter().any(|stmt| match stmt {
        Stmt::VarDecl { kind, .. } => kind.is_lexical(),
        Stmt::FunctionDecl(_) => true,
        _ => false,
    })
}
