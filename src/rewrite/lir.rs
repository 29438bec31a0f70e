//! The lowered tree the emitter consumes.
//!
//! Every node is fully resolved: names are final HLSL identifiers, type
//! spellings are target spellings, calls are HLSL built-ins or constructors.
//! The emitter does no further lookup or validation.

#[derive(Clone, Debug)]
pub enum Lit {
    Int(i64),
    Uint(u64),
    Float(f64),
    /// Printed with the `L` suffix so the literal itself is double-width.
    Double(f64),
    Bool(bool),
}

#[derive(Clone, Debug)]
pub enum Expr {
    Lit(Lit),
    Var(String),
    Unary {
        op: &'static str,
        expr: Box<Expr>,
    },
    Binary {
        op: &'static str,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// Built-in call or vector/matrix constructor (`abs(x)`, `float4(...)`).
    Call {
        name: String,
        args: Vec<Expr>,
    },
    Member {
        base: Box<Expr>,
        member: String,
    },
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    Cast {
        spelling: String,
        expr: Box<Expr>,
    },
}

#[derive(Clone, Debug)]
pub enum Stmt {
    Local {
        spelling: String,
        name: String,
        init: Option<Expr>,
    },
    Assign {
        place: Expr,
        value: Expr,
    },
    If {
        cond: Expr,
        then_block: Vec<Stmt>,
        else_block: Option<Vec<Stmt>>,
    },
    While {
        cond: Expr,
        body: Vec<Stmt>,
    },
    DoWhile {
        body: Vec<Stmt>,
        cond: Expr,
    },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        step: Option<Box<Stmt>>,
        body: Vec<Stmt>,
    },
    Break,
    Continue,
    Return,
    /// Statement-position call, including multi-output intrinsics whose
    /// `out` arguments are already-resolved variable names.
    Call {
        name: String,
        args: Vec<Expr>,
    },
    Expr(Expr),
}
