// AST (Abstract Syntax Tree) definitions for the snippet interpreter

use std::rc::Rc;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Declaration keyword of a binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Var,
    Let,
    Const,
}

impl VarKind {
    pub fn is_lexical(self) -> bool {
        !matches!(self, VarKind::Var)
    }
}

/// Binary operators (everything except the short-circuiting ones)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    // Equality
    Eq,
    Ne,
    StrictEq,
    StrictNe,
    // Relational
    Lt,
    Le,
    Gt,
    Ge,
    InstanceOf,
    In,
    // Bitwise
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    UShr,
}

/// Short-circuiting operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
    Nullish,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,    // -x
    Plus,   // +x
    Not,    // !x
    BitNot, // ~x
    TypeOf, // typeof x
    Void,   // void x
}

/// `++` / `--`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOp {
    Inc,
    Dec,
}

/// Function parameter
#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub default: Option<Expr>,
    pub rest: bool,
}

/// Body of a function: a statement block, or a single expression for
/// concise arrow functions
#[derive(Debug, Clone)]
pub enum FunctionBody {
    Block(Vec<Stmt>),
    Expr(Box<Expr>),
}

/// Function literal shared between the AST and every closure created from it
#[derive(Debug, Clone)]
pub struct FunctionDef {
    pub name: Option<String>,
    pub params: Vec<Param>,
    pub body: FunctionBody,
    pub is_arrow: bool,
    pub location: SourceLocation,
    /// Text of the literal as written, empty when the source is unavailable
    pub source: String,
}

impl FunctionDef {
    /// Number of declared parameters before the first default or rest parameter
    pub fn arity(&self) -> usize {
        self.params
            .iter()
            .take_while(|p| p.default.is_none() && !p.rest)
            .count()
    }
}

/// Object literal property key
#[derive(Debug, Clone)]
pub enum PropertyKey {
    Named(String),
    Computed(Box<Expr>),
}

/// Object literal member
#[derive(Debug, Clone)]
pub enum ObjectMember {
    Property { key: PropertyKey, value: Expr },
    Spread(Expr),
}

/// Array literal element or call argument
#[derive(Debug, Clone)]
pub enum Element {
    Item(Expr),
    Spread(Expr),
    Hole,
}

/// Expressions
#[derive(Debug, Clone)]
pub enum Expr {
    Number(f64, SourceLocation),
    Str(Rc<str>, SourceLocation),
    Template {
        quasis: Vec<String>,
        exprs: Vec<Expr>,
        location: SourceLocation,
    },
    Bool(bool, SourceLocation),
    Null(SourceLocation),
    Undefined(SourceLocation),
    Ident(String, SourceLocation),
    This(SourceLocation),
    Array {
        elements: Vec<Element>,
        location: SourceLocation,
    },
    Object {
        members: Vec<ObjectMember>,
        location: SourceLocation,
    },
    Function(Rc<FunctionDef>),
    Unary {
        op: UnOp,
        operand: Box<Expr>,
        location: SourceLocation,
    },
    Update {
        op: UpdateOp,
        prefix: bool,
        target: Box<Expr>,
        location: SourceLocation,
    },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
        location: SourceLocation,
    },
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
        location: SourceLocation,
    },
    Conditional {
        condition: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
        location: SourceLocation,
    },
    /// `op` is `None` for plain `=`, otherwise the compound operator
    Assign {
        op: Option<BinOp>,
        target: Box<Expr>,
        value: Box<Expr>,
        location: SourceLocation,
    },
    Member {
        object: Box<Expr>,
        property: String,
        optional: bool,
        location: SourceLocation,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
        optional: bool,
        location: SourceLocation,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Element>,
        optional: bool,
        location: SourceLocation,
    },
    New {
        callee: Box<Expr>,
        args: Vec<Element>,
        location: SourceLocation,
    },
    Sequence(Vec<Expr>, SourceLocation),
}

impl Expr {
    /// Get the source location of this expression
    pub fn location(&self) -> SourceLocation {
        match self {
            Expr::Number(_, loc)
            | Expr::Str(_, loc)
            | Expr::Bool(_, loc)
            | Expr::Null(loc)
            | Expr::Undefined(loc)
            | Expr::Ident(_, loc)
            | Expr::This(loc)
            | Expr::Sequence(_, loc) => *loc,
            Expr::Function(def) => def.location,
            Expr::Template { location, .. }
            | Expr::Array { location, .. }
            | Expr::Object { location, .. }
            | Expr::Unary { location, .. }
            | Expr::Update { location, .. }
            | Expr::Binary { location, .. }
            | Expr::Logical { location, .. }
            | Expr::Conditional { location, .. }
            | Expr::Assign { location, .. }
            | Expr::Member { location, .. }
            | Expr::Index { location, .. }
            | Expr::Call { location, .. }
            | Expr::New { location, .. } => *location,
        }
    }

    /// Short source-like rendering used in error messages such as
    /// `obj.run is not a function`
    pub fn describe(&self) -> String {
        match self {
            Expr::Ident(name, _) => name.clone(),
            Expr::This(_) => "this".to_string(),
            Expr::Member {
                object, property, ..
            } => format!("{}.{}", object.describe(), property),
            Expr::Index { object, index, .. } => match index.as_ref() {
                Expr::Number(n, _) => format!("{}[{}]", object.describe(), n),
                Expr::Str(s, _) => format!("{}[\"{}\"]", object.describe(), s),
                _ => format!("{}[...]", object.describe()),
            },
            Expr::Call { callee, .. } => format!("{}(...)", callee.describe()),
            _ => "expression".to_string(),
        }
    }
}

/// One `case`/`default` arm of a switch
#[derive(Debug, Clone)]
pub struct SwitchCase {
    /// `None` for `default:`
    pub test: Option<Expr>,
    pub body: Vec<Stmt>,
    pub location: SourceLocation,
}

/// Loop head binding of `for…of` / `for…in`
#[derive(Debug, Clone)]
pub struct ForBinding {
    /// `None` when the loop assigns to an existing variable
    pub kind: Option<VarKind>,
    pub name: String,
}

/// Statements
#[derive(Debug, Clone)]
pub enum Stmt {
    VarDecl {
        kind: VarKind,
        declarations: Vec<(String, Option<Expr>)>,
        location: SourceLocation,
    },
    FunctionDecl(Rc<FunctionDef>),
    Expression {
        expr: Expr,
        location: SourceLocation,
    },
    Block {
        body: Vec<Stmt>,
        location: SourceLocation,
    },
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
        location: SourceLocation,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
        location: SourceLocation,
    },
    DoWhile {
        body: Box<Stmt>,
        condition: Expr,
        location: SourceLocation,
    },
    For {
        init: Option<Box<Stmt>>,
        condition: Option<Expr>,
        update: Option<Expr>,
        body: Box<Stmt>,
        location: SourceLocation,
    },
    ForOf {
        binding: ForBinding,
        iterable: Expr,
        body: Box<Stmt>,
        location: SourceLocation,
    },
    ForIn {
        binding: ForBinding,
        object: Expr,
        body: Box<Stmt>,
        location: SourceLocation,
    },
    Break {
        location: SourceLocation,
    },
    Continue {
        location: SourceLocation,
    },
    Return {
        expr: Option<Expr>,
        location: SourceLocation,
    },
    Throw {
        expr: Expr,
        location: SourceLocation,
    },
    Try {
        block: Vec<Stmt>,
        catch_param: Option<String>,
        handler: Option<Vec<Stmt>>,
        finalizer: Option<Vec<Stmt>>,
        location: SourceLocation,
    },
    Switch {
        discriminant: Expr,
        cases: Vec<SwitchCase>,
        location: SourceLocation,
    },
    Empty {
        location: SourceLocation,
    },
}

impl Stmt {
    /// Get the source location of this statement
    pub fn location(&self) -> SourceLocation {
        match self {
            Stmt::FunctionDecl(def) => def.location,
            Stmt::VarDecl { location, .. }
            | Stmt::Expression { location, .. }
            | Stmt::Block { location, .. }
            | Stmt::If { location, .. }
            | Stmt::While { location, .. }
            | Stmt::DoWhile { location, .. }
            | Stmt::For { location, .. }
            | Stmt::ForOf { location, .. }
            | Stmt::ForIn { location, .. }
            | Stmt::Break { location }
            | Stmt::Continue { location }
            | Stmt::Return { location, .. }
            | Stmt::Throw { location, .. }
            | Stmt::Try { location, .. }
            | Stmt::Switch { location, .. }
            | Stmt::Empty { location } => *location,
        }
    }
}

/// Top-level program structure
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub body: Vec<Stmt>,
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }
}
