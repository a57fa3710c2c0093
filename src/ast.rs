//! Expression and statement trees produced by the [`Parser`](crate::parser::Parser).
//!
//! Nodes the resolver annotates (variable reads, assignments, increments,
//! `this`, `super`) carry an [`ExprId`]. The resolver's distance table is keyed
//! by that id, so two textually identical references are still distinct
//! entries.

use std::rc::Rc;

use crate::token::Token;

/// Identity of a resolvable expression node, unique within one [`Session`](crate::session::Session).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(pub usize);

/// A **literal constant** that appears directly in the source code.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// Numeric literal ‑ stored as IEEE‑754 `f64`.
    Number(f64),

    /// String literal without surrounding quotes.
    Str(String),

    True,

    False,

    Nil,
}

/// **Abstract‑Syntax‑Tree node** for every kind of *expression*.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(LiteralValue),

    /// Parenthesised sub‑expression: `"(" expression ")"`.
    Grouping(Box<Expr>),

    /// Prefix operator `!`, `-` or `~`.
    Unary {
        operator: Token,
        right: Box<Expr>,
    },

    /// Infix operator. `and`/`or` short‑circuit and `,` yields its right
    /// operand; everything else evaluates both sides first.
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// `condition ? then_branch : else_branch`
    Ternary {
        condition: Box<Expr>,
        operator: Token,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },

    Variable {
        id: ExprId,
        name: Token,
    },

    Assign {
        id: ExprId,
        name: Token,
        value: Box<Expr>,
    },

    /// `++name` / `--name`, yields the updated value.
    Prefix {
        id: ExprId,
        operator: Token,
        name: Token,
    },

    /// `name++` / `name--`, yields the value before the update.
    Postfix {
        id: ExprId,
        name: Token,
        operator: Token,
    },

    /// `object[start]` or `object[start:end]`.
    Index {
        bracket: Token,
        object: Box<Expr>,
        start: Box<Expr>,
        end: Option<Box<Expr>>,
    },

    Call {
        callee: Box<Expr>,
        /// The closing `)` token ‑ retained for error reporting.
        paren: Token,
        arguments: Vec<Expr>,
    },

    /// Anonymous function literal `fun (params) { body }`.
    Lambda(Rc<FunctionDecl>),

    /// object.property
    Get {
        object: Box<Expr>,
        name: Token,
    },

    /// object.property = value
    Set {
        object: Box<Expr>,
        name: Token,
        value: Box<Expr>,
    },

    This {
        id: ExprId,
        keyword: Token,
    },

    /// `super.method`
    Super {
        id: ExprId,
        keyword: Token,
        method: Token,
    },

    /// `[a, b, c]`
    List {
        bracket: Token,
        elements: Vec<Expr>,
    },

    /// `{ key: value, ... }`
    Map {
        brace: Token,
        entries: Vec<(Expr, Expr)>,
    },
}

impl Expr {
    /// Best-effort source line of the expression, for diagnostics.
    pub fn line(&self) -> usize {
        match self {
            Expr::Literal(_) => 0,
            Expr::Grouping(inner) => inner.line(),
            Expr::Unary { operator, .. } => operator.line,
            Expr::Binary { operator, .. } => operator.line,
            Expr::Ternary { operator, .. } => operator.line,
            Expr::Variable { name, .. } => name.line,
            Expr::Assign { name, .. } => name.line,
            Expr::Prefix { name, .. } => name.line,
            Expr::Postfix { name, .. } => name.line,
            Expr::Index { bracket, .. } => bracket.line,
            Expr::Call { paren, .. } => paren.line,
            Expr::Lambda(decl) => decl.name.line,
            Expr::Get { name, .. } => name.line,
            Expr::Set { name, .. } => name.line,
            Expr::This { keyword, .. } => keyword.line,
            Expr::Super { keyword, .. } => keyword.line,
            Expr::List { bracket, .. } => bracket.line,
            Expr::Map { brace, .. } => brace.line,
        }
    }
}

/// Where a function body was written; decides what `return` and `this` mean
/// inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    /// `fun name(...) { ... }`
    Function,

    /// `fun (...) { ... }` in expression position.
    Lambda,

    /// Any member of a class body.
    Method,
}

/// Shared, immutable description of a function body. Closures hold it by
/// `Rc` so creating a function value never copies the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    /// Function name, or the `fun` keyword for lambdas.
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
    pub kind: FunctionKind,

    /// Declared with a leading `class` inside a class body.
    pub is_static: bool,

    /// Declared without a parameter list inside a class body.
    pub is_getter: bool,
}

impl FunctionDecl {
    pub fn is_initializer(&self) -> bool {
        self.kind == FunctionKind::Method && self.name.lexeme == "init"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: Token,

    /// `Expr::Variable` nodes, in declaration order.
    pub ancestors: Vec<Expr>,

    pub methods: Vec<Rc<FunctionDecl>>,
}

/// **Abstract‑Syntax‑Tree node** for *statements*.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Stand‑alone expression terminated by a semicolon.
    Expression(Expr),

    /// `print` statement used for output.
    Print(Expr),

    /// Variable declaration: `"var" IDENT ("=" initializer)? ";"`.
    Var {
        name: Token,
        initializer: Option<Expr>,
    },

    /// Braced scope containing zero or more declarations/statements.
    Block(Vec<Stmt>),

    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    While {
        condition: Expr,
        body: Box<Stmt>,
    },

    /// Kept apart from `While` so `continue` still runs the increment.
    For {
        initializer: Option<Box<Stmt>>,
        condition: Option<Expr>,
        increment: Option<Expr>,
        body: Box<Stmt>,
    },

    Break(Token),

    Continue(Token),

    Function(Rc<FunctionDecl>),

    Return {
        keyword: Token,
        value: Option<Expr>,
    },

    Class(ClassDecl),
}
