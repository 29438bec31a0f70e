//! The host-agnostic semantic tree a frontend hands to the translator.
//!
//! Each expression node carries the type symbol the host's own checker
//! assigned to it, so no type inference happens here. Host constructs that
//! can never translate (object construction, throw, lambdas) appear as
//! explicit node kinds so the rewriter can reject them with a precise span
//! instead of the frontend silently dropping them.

use crate::span::Span;

/// One compute kernel: body, captured state, and dispatch shape.
#[derive(Clone, Debug)]
pub struct KernelSource {
    pub name: String,
    /// Declared thread-group dimensions, e.g. `(8, 8, 1)`.
    pub thread_group: (u32, u32, u32),
    /// Name of the kernel's `uint3` dispatch-thread-index parameter.
    pub thread_id_param: String,
    /// Captured fields in declaration order. Order is the sole input to
    /// binding-slot assignment.
    pub captures: Vec<Capture>,
    /// Kernel-local helper functions, inlined at each call site.
    pub local_fns: Vec<LocalFn>,
    pub body: Block,
    pub span: Span,
}

/// A captured field of the kernel's enclosing type.
#[derive(Clone, Debug)]
pub struct Capture {
    pub name: String,
    /// Host type symbol as declared, e.g. `"RwBuffer<Float4>"` or `"Float"`.
    pub host_type: String,
    pub span: Span,
}

/// A kernel-local helper function. No closures: parameters are the only
/// way data enters, by value.
#[derive(Clone, Debug)]
pub struct LocalFn {
    pub name: String,
    /// (name, host type symbol) pairs.
    pub params: Vec<(String, String)>,
    /// Host type symbol of the return value, if any.
    pub return_type: Option<String>,
    pub body: Block,
    pub span: Span,
}

#[derive(Clone, Debug, Default)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

#[derive(Clone, Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum StmtKind {
    Let {
        name: String,
        /// Host type symbol of the declared local.
        ty: String,
        init: Expr,
    },
    Assign {
        place: Place,
        value: Expr,
    },
    If {
        cond: Expr,
        then_block: Block,
        else_block: Option<Block>,
    },
    While {
        cond: Expr,
        body: Block,
    },
    DoWhile {
        body: Block,
        cond: Expr,
    },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        step: Option<Box<Stmt>>,
        body: Block,
    },
    /// Lowered to an `if`/`else if` chain; case labels are integer literals.
    Switch {
        scrutinee: Expr,
        cases: Vec<SwitchCase>,
        default: Option<Block>,
    },
    Break,
    Continue,
    Return(Option<Expr>),
    /// A call in statement position. The only form that may carry `out`
    /// arguments (multi-output intrinsics such as `sincos`).
    Call {
        target: CallTarget,
        args: Vec<CallArg>,
        span: Span,
    },
    Expr(Expr),
    /// `throw` in the host — always rejected.
    Throw,
}

/// One switch case. Bodies carry no terminating `break`; the frontend strips
/// it, and fallthrough between cases is not representable.
#[derive(Clone, Debug)]
pub struct SwitchCase {
    pub label: i64,
    pub body: Block,
}

/// An argument at a statement-position call site.
#[derive(Clone, Debug)]
pub enum CallArg {
    In(Expr),
    /// A by-reference-passed local receiving one output of a multi-output
    /// intrinsic: (local name, host type symbol).
    Out(String, String, Span),
}

/// An assignable place.
#[derive(Clone, Debug)]
pub enum Place {
    Var(String, Span),
    Member(Box<Place>, String, Span),
    Index(Box<Place>, Box<Expr>, Span),
}

impl Place {
    pub fn span(&self) -> Span {
        match self {
            Place::Var(_, s) | Place::Member(_, _, s) | Place::Index(_, _, s) => *s,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    /// Host type symbol the frontend's checker assigned to this node.
    pub ty: String,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum ExprKind {
    IntLit(i64),
    FloatLit(f64),
    BoolLit(bool),
    Var(String),
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// A method call. The frontend tags the target: library stubs become
    /// `Intrinsic` (they are never executed host-side), kernel-local helpers
    /// become `Local`, anything else is `Ordinary` and is rejected.
    Call {
        target: CallTarget,
        args: Vec<Expr>,
    },
    /// Swizzle-style member access (`v.xyz`).
    Member {
        base: Box<Expr>,
        member: String,
    },
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    /// Vector/matrix constructor, e.g. `Float4(x, y, z, w)`; the result
    /// shape comes from the node's type symbol.
    Construct {
        args: Vec<Expr>,
    },
    /// Scalar kind conversion; the target kind comes from the node's type
    /// symbol.
    Cast {
        expr: Box<Expr>,
    },
    /// Reference-type instantiation — always rejected.
    NewObject {
        type_name: String,
    },
    /// Lambda/delegate creation — always rejected.
    Lambda,
}

/// How a call site resolves, decided by the frontend from the declaring type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallTarget {
    /// A stub from the predeclared kernel math library. Stubs exist only for
    /// host type-checking; the translator maps them through the registry.
    Intrinsic { name: String },
    /// A local function defined inside the kernel body.
    Local { name: String },
    /// Any other host method (instance, virtual, interface) — untranslatable.
    Ordinary { type_name: String, method: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
    BitNot,
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
        }
    }
}

/// Host operators. `Mul` is always component-wise; linear-algebra multiply
/// is only ever the `mul` intrinsic. `Rem` on floating shapes follows the
/// registry's `fmod` entry, not the host operator's native semantics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl BinOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinOp::And | BinOp::Or)
    }

    pub fn is_bitwise(&self) -> bool {
        matches!(
            self,
            BinOp::BitAnd | BinOp::BitOr | BinOp::BitXor | BinOp::Shl | BinOp::Shr
        )
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Rem
        )
    }
}
