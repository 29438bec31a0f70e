//! Expression rewriting: the typed kernel body becomes a fully resolved
//! HLSL-shaped tree.
//!
//! Every operator, call, member access, and index is resolved against the
//! operand shapes here; the emitter downstream does plain printing. An
//! unresolvable subtree reports exactly one diagnostic and is dropped, and
//! rewriting continues so a single attempt surfaces as many independent
//! problems as possible. Identifiers that collide with HLSL keywords or
//! builtin type names are renamed, and every rename is recorded so resource
//! declarations and the binding manifest stay in agreement.

mod inline;
pub(crate) mod lir;

pub(crate) use inline::{expand, InlineResult};

use std::collections::{BTreeMap, BTreeSet};

use crate::api::TargetProfile;
use crate::diagnostic::{DiagCode, Diagnostic, Diagnostics};
use crate::hir::*;
use crate::mapper;
use crate::registry::IntrinsicRegistry;
use crate::shape::{Access, ResourceKind, ScalarKind, ShapeType};
use crate::span::Span;

/// HLSL keywords and builtin function names a kernel identifier must not
/// shadow. Sorted for binary search; numeric type spellings (`float4`,
/// `uint2x2`, ...) are covered separately by the spelling parser.
const RESERVED: &[&str] = &[
    "bool", "break", "buffer", "case", "cbuffer", "const", "continue", "default", "discard",
    "do", "double", "else", "extern", "false", "float", "for", "groupshared", "half", "if",
    "in", "inline", "inout", "int", "matrix", "mul", "out", "register", "return", "sample",
    "sampler", "shared", "static", "struct", "switch", "technique", "texture", "true",
    "typedef", "uint", "uniform", "vector", "void", "volatile", "while",
];

fn is_reserved(name: &str) -> bool {
    RESERVED.binary_search(&name).is_ok() || mapper::shape_of_spelling(name).is_some()
}

/// Rewriting output: the lowered body plus the final identifier chosen for
/// each capture (identical to the host name unless a rename was forced).
pub(crate) struct RewriteOutput {
    pub body: Vec<lir::Stmt>,
    pub emitted_names: BTreeMap<String, String>,
    pub thread_id_name: String,
}

#[derive(Clone)]
struct VarBinding {
    shape: ShapeType,
    emitted: String,
}

pub(crate) fn rewrite_kernel(
    kernel: &KernelSource,
    inlined: InlineResult,
    capture_shapes: &BTreeMap<String, ShapeType>,
    profile: &TargetProfile,
    diags: &mut Diagnostics,
) -> RewriteOutput {
    let mut rw = Rewriter {
        registry: IntrinsicRegistry::global(),
        profile,
        poisoned: inlined.poisoned,
        local_fns: kernel.local_fns.iter().map(|f| f.name.clone()).collect(),
        scopes: vec![BTreeMap::new()],
        taken: BTreeSet::new(),
        temp_counter: 0,
        diags,
    };

    let mut emitted_names = BTreeMap::new();
    for capture in &kernel.captures {
        // Captures without a shape were already diagnosed during binding
        // analysis; body references to them fail as unknown variables.
        let Some(shape) = capture_shapes.get(&capture.name) else {
            continue;
        };
        let emitted = rw.unique_name(&capture.name);
        emitted_names.insert(capture.name.clone(), emitted.clone());
        rw.bind(&capture.name, shape.clone(), emitted);
    }
    let thread_id_name = rw.unique_name(&kernel.thread_id_param);
    rw.bind(
        &kernel.thread_id_param,
        ShapeType::Vector(ScalarKind::Uint, 3),
        thread_id_name.clone(),
    );

    let mut body = Vec::new();
    for stmt in &inlined.body.stmts {
        rw.rewrite_stmt(stmt, &mut body);
    }

    RewriteOutput {
        body,
        emitted_names,
        thread_id_name,
    }
}

struct Rewriter<'a> {
    registry: &'static IntrinsicRegistry,
    profile: &'a TargetProfile,
    poisoned: BTreeSet<String>,
    local_fns: BTreeSet<String>,
    scopes: Vec<BTreeMap<String, VarBinding>>,
    /// Every identifier handed out so far; renames never collide with it.
    taken: BTreeSet<String>,
    temp_counter: u32,
    diags: &'a mut Diagnostics,
}

impl<'a> Rewriter<'a> {
    fn lookup(&self, name: &str) -> Option<VarBinding> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .cloned()
    }

    fn bind(&mut self, name: &str, shape: ShapeType, emitted: String) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), VarBinding { shape, emitted });
        }
    }

    fn define(&mut self, name: &str, shape: ShapeType) -> String {
        let emitted = self.unique_name(name);
        self.bind(name, shape, emitted.clone());
        emitted
    }

    /// The final spelling for `name`: unchanged when possible, suffixed when
    /// it collides with a keyword, a type spelling, or an earlier rename.
    fn unique_name(&mut self, name: &str) -> String {
        let mut candidate = if is_reserved(name) {
            format!("{}_", name)
        } else {
            name.to_string()
        };
        let mut i = 1u32;
        while self.taken.contains(&candidate) || is_reserved(&candidate) {
            candidate = format!("{}_{}", name, i);
            i += 1;
        }
        self.taken.insert(candidate.clone());
        candidate
    }

    fn fresh_temp(&mut self) -> String {
        let name = format!("__t{}", self.temp_counter);
        self.temp_counter += 1;
        self.unique_name(&name)
    }

    fn shape_of_ty(&mut self, ty: &str, span: Span) -> Option<ShapeType> {
        let shape = mapper::shape_of_symbol(ty);
        if shape.is_none() {
            self.diags.push(
                Diagnostic::error(
                    DiagCode::UnrepresentableType,
                    format!("type '{}' has no GPU representation", ty),
                    span,
                )
                .with_help(
                    "only scalar, vector, matrix, and buffer/texture view types translate"
                        .to_string(),
                ),
            );
        }
        shape
    }

    fn check_precision(&mut self, needs_double: bool, name: &str, span: Span) {
        if needs_double && !self.profile.full_double_precision {
            self.diags.warning(
                DiagCode::PrecisionWarning,
                format!(
                    "'{}' uses double precision, which profile {} only supports with reduced guarantees",
                    name, self.profile.name
                ),
                span,
            );
        }
    }

    // ---- statements ----

    fn rewrite_block(&mut self, block: &Block) -> Vec<lir::Stmt> {
        self.scopes.push(BTreeMap::new());
        let mut out = Vec::new();
        for stmt in &block.stmts {
            self.rewrite_stmt(stmt, &mut out);
        }
        self.scopes.pop();
        out
    }

    fn rewrite_stmt(&mut self, stmt: &Stmt, out: &mut Vec<lir::Stmt>) {
        match &stmt.kind {
            StmtKind::Let { name, ty, init } => {
                let declared = self.shape_of_ty(ty, stmt.span);
                let init_r = self.rewrite_expr(init);
                let Some(shape) = declared else {
                    // Bind to the initializer's shape so later uses of the
                    // local do not cascade into extra diagnostics.
                    if let Some((_, s)) = init_r {
                        self.define(name, s);
                    }
                    return;
                };
                if shape.is_resource() {
                    self.diags.error(
                        DiagCode::UnsupportedConstruct,
                        format!("resource view '{}' cannot be stored in a local", name),
                        stmt.span,
                    );
                    return;
                }
                if let Some((_, ref s)) = init_r {
                    if *s != shape {
                        self.diags.error(
                            DiagCode::UnsupportedConstruct,
                            format!(
                                "initializer of '{}' has type {}, expected {}",
                                name,
                                s.display(),
                                shape.display()
                            ),
                            stmt.span,
                        );
                    }
                }
                let emitted = self.define(name, shape.clone());
                out.push(lir::Stmt::Local {
                    spelling: mapper::hlsl_spelling(&shape),
                    name: emitted,
                    init: init_r.map(|(e, _)| e),
                });
            }
            StmtKind::Assign { place, value } => {
                let p = self.rewrite_place(place);
                let v = self.rewrite_expr(value);
                let (Some((pe, ps)), Some((ve, vs))) = (p, v) else {
                    return;
                };
                if ps.is_resource() {
                    self.diags.error(
                        DiagCode::UnsupportedConstruct,
                        "a resource view itself cannot be assigned; write through an index"
                            .to_string(),
                        place.span(),
                    );
                    return;
                }
                if ps != vs {
                    self.diags.error(
                        DiagCode::UnsupportedConstruct,
                        format!("cannot assign {} to {}", vs.display(), ps.display()),
                        place.span(),
                    );
                    return;
                }
                out.push(lir::Stmt::Assign {
                    place: pe,
                    value: ve,
                });
            }
            StmtKind::If {
                cond,
                then_block,
                else_block,
            } => {
                let c = self.rewrite_expr(cond);
                let then_block = self.rewrite_block(then_block);
                let else_block = else_block.as_ref().map(|b| self.rewrite_block(b));
                let Some((ce, cs)) = c else {
                    return;
                };
                self.require_bool_cond(&cs, cond.span);
                out.push(lir::Stmt::If {
                    cond: ce,
                    then_block,
                    else_block,
                });
            }
            StmtKind::While { cond, body } => {
                let c = self.rewrite_expr(cond);
                let body = self.rewrite_block(body);
                let Some((ce, cs)) = c else {
                    return;
                };
                self.require_bool_cond(&cs, cond.span);
                out.push(lir::Stmt::While { cond: ce, body });
            }
            StmtKind::DoWhile { body, cond } => {
                let body = self.rewrite_block(body);
                let c = self.rewrite_expr(cond);
                let Some((ce, cs)) = c else {
                    return;
                };
                self.require_bool_cond(&cs, cond.span);
                out.push(lir::Stmt::DoWhile { body, cond: ce });
            }
            StmtKind::For {
                init,
                cond,
                step,
                body,
            } => {
                // The init declaration scopes over cond, step, and body.
                self.scopes.push(BTreeMap::new());
                let init = init.as_ref().and_then(|s| self.rewrite_simple_stmt(s));
                let cond = cond.as_ref().and_then(|c| {
                    let r = self.rewrite_expr(c);
                    if let Some((_, ref cs)) = r {
                        self.require_bool_cond(cs, c.span);
                    }
                    r.map(|(e, _)| e)
                });
                let step = step.as_ref().and_then(|s| self.rewrite_simple_stmt(s));
                let body = self.rewrite_block(body);
                self.scopes.pop();
                out.push(lir::Stmt::For {
                    init: init.map(Box::new),
                    cond,
                    step: step.map(Box::new),
                    body,
                });
            }
            StmtKind::Switch {
                scrutinee,
                cases,
                default,
            } => self.rewrite_switch(scrutinee, cases, default.as_ref(), out),
            StmtKind::Break => out.push(lir::Stmt::Break),
            StmtKind::Continue => out.push(lir::Stmt::Continue),
            StmtKind::Return(None) => out.push(lir::Stmt::Return),
            StmtKind::Return(Some(value)) => {
                self.rewrite_expr(value);
                self.diags.error(
                    DiagCode::UnsupportedConstruct,
                    "a compute kernel returns no value; write results through a captured view"
                        .to_string(),
                    stmt.span,
                );
            }
            StmtKind::Call { target, args, span } => {
                self.rewrite_call_stmt(target, args, *span, out)
            }
            StmtKind::Expr(e) => {
                if let Some((le, _)) = self.rewrite_expr(e) {
                    out.push(lir::Stmt::Expr(le));
                }
            }
            StmtKind::Throw => {
                self.diags.push(
                    Diagnostic::error(
                        DiagCode::UnsupportedConstruct,
                        "exceptions cannot run on the GPU".to_string(),
                        stmt.span,
                    )
                    .with_help("validate inputs host-side before dispatching".to_string()),
                );
            }
        }
    }

    fn require_bool_cond(&mut self, shape: &ShapeType, span: Span) {
        if !shape.is_scalar_of(ScalarKind::Bool) {
            self.diags.error(
                DiagCode::UnsupportedConstruct,
                format!("condition must be Bool, found {}", shape.display()),
                span,
            );
        }
    }

    /// A for-loop clause must lower to a single declaration, assignment, or
    /// expression; anything else (a multi-output call needing hoisted
    /// temporaries, nested control flow, a jump) is rejected rather than
    /// silently dropped.
    fn rewrite_simple_stmt(&mut self, stmt: &Stmt) -> Option<lir::Stmt> {
        let mut buf = Vec::new();
        self.rewrite_stmt(stmt, &mut buf);
        if buf.len() > 1 {
            self.diags.error(
                DiagCode::UnsupportedConstruct,
                "this call cannot appear in a loop header; move it into the body".to_string(),
                stmt.span,
            );
            return None;
        }
        let lowered = buf.pop()?;
        match lowered {
            lir::Stmt::Local { .. } | lir::Stmt::Assign { .. } | lir::Stmt::Expr(_) => {
                Some(lowered)
            }
            _ => {
                self.diags.error(
                    DiagCode::UnsupportedConstruct,
                    "only a declaration, assignment, or expression may appear in a loop header"
                        .to_string(),
                    stmt.span,
                );
                None
            }
        }
    }

    /// Switch lowering: the scrutinee is hoisted into a temporary (evaluated
    /// once), then each case becomes an equality test in an if/else-if
    /// chain with the default as the final else.
    fn rewrite_switch(
        &mut self,
        scrutinee: &Expr,
        cases: &[SwitchCase],
        default: Option<&Block>,
        out: &mut Vec<lir::Stmt>,
    ) {
        let s = self.rewrite_expr(scrutinee);

        let mut lowered_cases = Vec::with_capacity(cases.len());
        for case in cases {
            lowered_cases.push((case.label, self.rewrite_block(&case.body)));
        }
        let default_block = default.map(|b| self.rewrite_block(b));

        let Some((se, ss)) = s else {
            return;
        };
        let is_uint = match &ss {
            ShapeType::Scalar(k) if k.is_integer() => *k == ScalarKind::Uint,
            _ => {
                self.diags.error(
                    DiagCode::UnsupportedConstruct,
                    format!("switch value must be Int or Uint, found {}", ss.display()),
                    scrutinee.span,
                );
                return;
            }
        };

        let tmp = self.fresh_temp();
        out.push(lir::Stmt::Local {
            spelling: mapper::hlsl_spelling(&ss),
            name: tmp.clone(),
            init: Some(se),
        });

        let mut chain: Option<Vec<lir::Stmt>> = default_block;
        for (label, body) in lowered_cases.into_iter().rev() {
            let lit = if is_uint {
                lir::Lit::Uint(label as u64)
            } else {
                lir::Lit::Int(label)
            };
            let cond = lir::Expr::Binary {
                op: "==",
                lhs: Box::new(lir::Expr::Var(tmp.clone())),
                rhs: Box::new(lir::Expr::Lit(lit)),
            };
            chain = Some(vec![lir::Stmt::If {
                cond,
                then_block: body,
                else_block: chain,
            }]);
        }
        if let Some(mut stmts) = chain {
            out.append(&mut stmts);
        }
    }

    /// Statement-position call: the only place multi-output intrinsics are
    /// legal. Value arguments are hoisted into temporaries in source order so
    /// their evaluation strictly precedes every write to an out argument.
    fn rewrite_call_stmt(
        &mut self,
        target: &CallTarget,
        args: &[CallArg],
        span: Span,
        out: &mut Vec<lir::Stmt>,
    ) {
        let name = match target {
            CallTarget::Intrinsic { name } => name,
            CallTarget::Local { name } => {
                // Inlining already replaced every resolvable local call.
                if !self.poisoned.contains(name) {
                    self.diags.error(
                        DiagCode::UnsupportedConstruct,
                        format!("unknown local function '{}'", name),
                        span,
                    );
                }
                return;
            }
            CallTarget::Ordinary { type_name, method } => {
                self.reject_ordinary_call(type_name, method, span);
                return;
            }
        };

        let mut lowered = Vec::with_capacity(args.len());
        let mut shapes = Vec::with_capacity(args.len());
        let mut outs = Vec::new();
        let mut failed = false;
        for (i, arg) in args.iter().enumerate() {
            match arg {
                CallArg::In(e) => match self.rewrite_expr(e) {
                    Some((le, s)) => {
                        lowered.push(le);
                        shapes.push(s);
                    }
                    None => failed = true,
                },
                CallArg::Out(var, _ty, ospan) => match self.lookup(var) {
                    Some(b) => {
                        outs.push(i);
                        lowered.push(lir::Expr::Var(b.emitted));
                        shapes.push(b.shape);
                    }
                    None => {
                        self.diags.error(
                            DiagCode::UnsupportedConstruct,
                            format!("out argument '{}' must be a declared local", var),
                            *ospan,
                        );
                        failed = true;
                    }
                },
            }
        }
        if failed {
            return;
        }

        let key = name.to_ascii_lowercase();
        let registry = self.registry;
        let Some(sig) = registry.lookup(&key, &shapes) else {
            self.report_unresolved(name, &shapes, span);
            return;
        };
        if sig.out_params != outs {
            self.diags.error(
                DiagCode::UnresolvedIntrinsic,
                format!(
                    "out arguments of '{}' are in the wrong positions for this overload",
                    name
                ),
                span,
            );
            return;
        }
        self.check_precision(sig.needs_double, &key, span);

        if !sig.has_outputs() {
            // Result discarded; the call is still emitted for its evaluation.
            out.push(lir::Stmt::Expr(lir::Expr::Call {
                name: sig.hlsl_name.to_string(),
                args: lowered,
            }));
            return;
        }

        let mut final_args = Vec::with_capacity(lowered.len());
        for (i, (le, s)) in lowered.into_iter().zip(&shapes).enumerate() {
            if outs.contains(&i) {
                final_args.push(le);
            } else {
                let t = self.fresh_temp();
                out.push(lir::Stmt::Local {
                    spelling: mapper::hlsl_spelling(s),
                    name: t.clone(),
                    init: Some(le),
                });
                final_args.push(lir::Expr::Var(t));
            }
        }
        out.push(lir::Stmt::Call {
            name: sig.hlsl_name.to_string(),
            args: final_args,
        });
    }

    // ---- places ----

    fn rewrite_place(&mut self, place: &Place) -> Option<(lir::Expr, ShapeType)> {
        match place {
            Place::Var(name, span) => match self.lookup(name) {
                Some(b) => Some((lir::Expr::Var(b.emitted), b.shape)),
                None => {
                    self.diags.error(
                        DiagCode::UnsupportedConstruct,
                        format!("unknown variable '{}'", name),
                        *span,
                    );
                    None
                }
            },
            Place::Member(inner, member, span) => {
                let (be, bs) = self.rewrite_place(inner)?;
                if let ShapeType::Vector(..) = bs {
                    let mut seen = BTreeSet::new();
                    for ch in member.chars() {
                        if !seen.insert(ch) {
                            self.diags.error(
                                DiagCode::UnsupportedConstruct,
                                format!("swizzle store '{}' repeats a component", member),
                                *span,
                            );
                            return None;
                        }
                    }
                }
                let shape = self.swizzle_shape(&bs, member, *span)?;
                Some((
                    lir::Expr::Member {
                        base: Box::new(be),
                        member: member.clone(),
                    },
                    shape,
                ))
            }
            Place::Index(inner, index, span) => {
                let (be, bs) = self.rewrite_place(inner)?;
                let (xe, xs) = self.rewrite_expr(index)?;
                if let ShapeType::Resource(_, _, Access::Read) = bs {
                    self.diags.error(
                        DiagCode::UnsupportedConstruct,
                        "cannot write through a read-only resource view".to_string(),
                        *span,
                    );
                    return None;
                }
                let elem = self.element_shape(&bs, &xs, *span)?;
                Some((
                    lir::Expr::Index {
                        base: Box::new(be),
                        index: Box::new(xe),
                    },
                    elem,
                ))
            }
        }
    }

    // ---- expressions ----

    fn rewrite_expr(&mut self, expr: &Expr) -> Option<(lir::Expr, ShapeType)> {
        match &expr.kind {
            ExprKind::IntLit(v) => {
                let shape = self.shape_of_ty(&expr.ty, expr.span)?;
                let lit = match &shape {
                    ShapeType::Scalar(ScalarKind::Uint) => lir::Lit::Uint(*v as u64),
                    ShapeType::Scalar(ScalarKind::Float) => lir::Lit::Float(*v as f64),
                    ShapeType::Scalar(ScalarKind::Double) => lir::Lit::Double(*v as f64),
                    _ => lir::Lit::Int(*v),
                };
                Some((lir::Expr::Lit(lit), shape))
            }
            ExprKind::FloatLit(v) => {
                let shape = self.shape_of_ty(&expr.ty, expr.span)?;
                let lit = if shape.is_scalar_of(ScalarKind::Double) {
                    lir::Lit::Double(*v)
                } else {
                    lir::Lit::Float(*v)
                };
                Some((lir::Expr::Lit(lit), shape))
            }
            ExprKind::BoolLit(v) => Some((
                lir::Expr::Lit(lir::Lit::Bool(*v)),
                ShapeType::Scalar(ScalarKind::Bool),
            )),
            ExprKind::Var(name) => match self.lookup(name) {
                Some(b) => Some((lir::Expr::Var(b.emitted), b.shape)),
                None => {
                    self.diags.error(
                        DiagCode::UnsupportedConstruct,
                        format!("unknown variable '{}'", name),
                        expr.span,
                    );
                    None
                }
            },
            ExprKind::Unary { op, expr: inner } => {
                let (ie, is_) = self.rewrite_expr(inner)?;
                let kind = is_.component_kind();
                let ok = is_.is_plain_value()
                    && match op {
                        UnaryOp::Neg => kind.is_numeric(),
                        UnaryOp::Not => kind == ScalarKind::Bool,
                        UnaryOp::BitNot => kind.is_integer(),
                    };
                if !ok {
                    self.diags.error(
                        DiagCode::UnresolvedIntrinsic,
                        format!(
                            "operator '{}' is not defined for {}",
                            op.as_str(),
                            is_.display()
                        ),
                        expr.span,
                    );
                    return None;
                }
                Some((
                    lir::Expr::Unary {
                        op: op.as_str(),
                        expr: Box::new(ie),
                    },
                    is_,
                ))
            }
            ExprKind::Binary { op, lhs, rhs } => self.rewrite_binary(*op, lhs, rhs, expr.span),
            ExprKind::Call { target, args } => self.rewrite_call_expr(target, args, expr.span),
            ExprKind::Member { base, member } => {
                let (be, bs) = self.rewrite_expr(base)?;
                let shape = self.swizzle_shape(&bs, member, expr.span)?;
                Some((
                    lir::Expr::Member {
                        base: Box::new(be),
                        member: member.clone(),
                    },
                    shape,
                ))
            }
            ExprKind::Index { base, index } => {
                let (be, bs) = self.rewrite_expr(base)?;
                let (xe, xs) = self.rewrite_expr(index)?;
                let elem = self.element_shape(&bs, &xs, expr.span)?;
                Some((
                    lir::Expr::Index {
                        base: Box::new(be),
                        index: Box::new(xe),
                    },
                    elem,
                ))
            }
            ExprKind::Construct { args } => self.rewrite_construct(args, &expr.ty, expr.span),
            ExprKind::Cast { expr: inner } => {
                let target = self.shape_of_ty(&expr.ty, expr.span)?;
                let (ie, is_) = self.rewrite_expr(inner)?;
                if is_ == target {
                    return Some((ie, target));
                }
                if target.is_resource()
                    || is_.is_resource()
                    || target.component_count() != is_.component_count()
                {
                    self.diags.error(
                        DiagCode::UnsupportedConstruct,
                        format!("cannot convert {} to {}", is_.display(), target.display()),
                        expr.span,
                    );
                    return None;
                }
                Some((
                    lir::Expr::Cast {
                        spelling: mapper::hlsl_spelling(&target),
                        expr: Box::new(ie),
                    },
                    target,
                ))
            }
            ExprKind::NewObject { type_name } => {
                self.diags.push(
                    Diagnostic::error(
                        DiagCode::UnsupportedConstruct,
                        format!("cannot allocate '{}' in a kernel", type_name),
                        expr.span,
                    )
                    .with_help("kernels may not create reference objects".to_string()),
                );
                None
            }
            ExprKind::Lambda => {
                self.diags.error(
                    DiagCode::UnsupportedConstruct,
                    "lambdas cannot be translated".to_string(),
                    expr.span,
                );
                None
            }
        }
    }

    fn rewrite_binary(
        &mut self,
        op: BinOp,
        lhs: &Expr,
        rhs: &Expr,
        span: Span,
    ) -> Option<(lir::Expr, ShapeType)> {
        let (le, ls) = self.rewrite_expr(lhs)?;
        let (re, rs) = self.rewrite_expr(rhs)?;

        // Float remainder follows the registry's fmod semantics, not the
        // host operator's sign convention.
        if op == BinOp::Rem && ls.component_kind().is_floating() {
            let registry = self.registry;
            let Some(sig) = registry.lookup("fmod", &[ls.clone(), rs.clone()]) else {
                self.report_unresolved("%", &[ls, rs], span);
                return None;
            };
            self.check_precision(sig.needs_double, "fmod", span);
            let result = sig.result.clone()?;
            return Some((
                lir::Expr::Call {
                    name: sig.hlsl_name.to_string(),
                    args: vec![le, re],
                },
                result,
            ));
        }

        let result = self.binary_result(op, &ls, &rs);
        let Some(result) = result else {
            self.diags.error(
                DiagCode::UnresolvedIntrinsic,
                format!(
                    "operator '{}' is not defined for ({}, {})",
                    op.as_str(),
                    ls.display(),
                    rs.display()
                ),
                span,
            );
            return None;
        };
        Some((
            lir::Expr::Binary {
                op: op.as_str(),
                lhs: Box::new(le),
                rhs: Box::new(re),
            },
            result,
        ))
    }

    /// Operator shape dispatch. `*` and `/` on matching shapes are always
    /// component-wise; linear-algebra products only exist as the `mul`
    /// intrinsic. The sole mixed-shape forms are scalar scaling.
    fn binary_result(&self, op: BinOp, l: &ShapeType, r: &ShapeType) -> Option<ShapeType> {
        if l.is_resource() || r.is_resource() {
            return None;
        }
        let lk = l.component_kind();
        let rk = r.component_kind();

        if op.is_arithmetic() {
            if !lk.is_numeric() || lk != rk {
                return None;
            }
            if l == r {
                return Some(l.clone());
            }
            return match (op, l, r) {
                (BinOp::Mul, ShapeType::Scalar(_), other)
                | (BinOp::Mul, other, ShapeType::Scalar(_))
                | (BinOp::Div, other, ShapeType::Scalar(_)) => Some(other.clone()),
                _ => None,
            };
        }

        if op.is_comparison() {
            if l != r {
                return None;
            }
            let ordered = matches!(op, BinOp::Eq | BinOp::Ne) || lk.is_numeric();
            if !ordered {
                return None;
            }
            return match l {
                ShapeType::Scalar(_) => Some(ShapeType::Scalar(ScalarKind::Bool)),
                ShapeType::Vector(_, w) => Some(ShapeType::Vector(ScalarKind::Bool, *w)),
                _ => None,
            };
        }

        if op.is_logical() {
            if l.is_scalar_of(ScalarKind::Bool) && r.is_scalar_of(ScalarKind::Bool) {
                return Some(ShapeType::Scalar(ScalarKind::Bool));
            }
            return None;
        }

        // Bitwise and shifts: integer kinds only; shifts also accept a
        // scalar count against a vector value.
        if !lk.is_integer() || lk != rk {
            return None;
        }
        if l == r {
            return Some(l.clone());
        }
        if matches!(op, BinOp::Shl | BinOp::Shr)
            && matches!(l, ShapeType::Vector(..))
            && matches!(r, ShapeType::Scalar(_))
        {
            return Some(l.clone());
        }
        None
    }

    fn rewrite_call_expr(
        &mut self,
        target: &CallTarget,
        args: &[Expr],
        span: Span,
    ) -> Option<(lir::Expr, ShapeType)> {
        let name = match target {
            CallTarget::Intrinsic { name } => name,
            CallTarget::Local { name } => {
                if self.poisoned.contains(name) {
                    // Already diagnosed at the definition or cycle; the call
                    // just vanishes.
                    return None;
                }
                let message = if self.local_fns.contains(name) {
                    format!(
                        "local function '{}' cannot be called in a loop condition; compute it in the loop body",
                        name
                    )
                } else {
                    format!("unknown local function '{}'", name)
                };
                self.diags
                    .error(DiagCode::UnsupportedConstruct, message, span);
                return None;
            }
            CallTarget::Ordinary { type_name, method } => {
                self.reject_ordinary_call(type_name, method, span);
                return None;
            }
        };

        let mut lowered = Vec::with_capacity(args.len());
        let mut shapes = Vec::with_capacity(args.len());
        let mut failed = false;
        for arg in args {
            match self.rewrite_expr(arg) {
                Some((le, s)) => {
                    lowered.push(le);
                    shapes.push(s);
                }
                None => failed = true,
            }
        }
        if failed {
            return None;
        }

        let key = name.to_ascii_lowercase();
        let registry = self.registry;
        let Some(sig) = registry.lookup(&key, &shapes) else {
            self.report_unresolved(name, &shapes, span);
            return None;
        };
        if sig.has_outputs() {
            self.diags.push(
                Diagnostic::error(
                    DiagCode::UnsupportedConstruct,
                    format!(
                        "'{}' writes through out parameters and can only be a statement",
                        name
                    ),
                    span,
                )
                .with_help("call it on its own line with out arguments".to_string()),
            );
            return None;
        }
        self.check_precision(sig.needs_double, &key, span);
        let result = sig.result.clone()?;
        Some((
            lir::Expr::Call {
                name: sig.hlsl_name.to_string(),
                args: lowered,
            },
            result,
        ))
    }

    fn rewrite_construct(
        &mut self,
        args: &[Expr],
        ty: &str,
        span: Span,
    ) -> Option<(lir::Expr, ShapeType)> {
        let target = self.shape_of_ty(ty, span)?;
        let (kind, count) = match &target {
            ShapeType::Vector(k, w) => (*k, *w as u32),
            ShapeType::Matrix(k, r, c) => (*k, *r as u32 * *c as u32),
            _ => {
                self.diags.error(
                    DiagCode::UnsupportedConstruct,
                    format!("'{}' has no constructor", target.display()),
                    span,
                );
                return None;
            }
        };

        let mut lowered = Vec::with_capacity(args.len());
        let mut total = 0u32;
        let mut failed = false;
        for arg in args {
            match self.rewrite_expr(arg) {
                Some((le, s)) => {
                    let components = match &s {
                        ShapeType::Scalar(k) | ShapeType::Vector(k, _) if *k == kind => {
                            s.component_count()
                        }
                        _ => None,
                    };
                    match components {
                        Some(n) => total += n,
                        None => {
                            self.diags.error(
                                DiagCode::UnresolvedIntrinsic,
                                format!(
                                    "constructor for {} cannot take a {} argument",
                                    target.display(),
                                    s.display()
                                ),
                                arg.span,
                            );
                            failed = true;
                        }
                    }
                    lowered.push(le);
                }
                None => failed = true,
            }
        }
        if failed {
            return None;
        }
        if total != count {
            self.diags.error(
                DiagCode::UnresolvedIntrinsic,
                format!(
                    "constructor for {} needs {} components, got {}",
                    target.display(),
                    count,
                    total
                ),
                span,
            );
            return None;
        }
        Some((
            lir::Expr::Call {
                name: mapper::hlsl_spelling(&target),
                args: lowered,
            },
            target,
        ))
    }

    /// Shape of a swizzle or matrix element access.
    fn swizzle_shape(&mut self, base: &ShapeType, member: &str, span: Span) -> Option<ShapeType> {
        match base {
            ShapeType::Vector(k, w) => {
                let valid = !member.is_empty()
                    && member.len() <= 4
                    && member.chars().all(|ch| {
                        "xyzw".find(ch).is_some_and(|lane| (lane as u8) < *w)
                    });
                if !valid {
                    self.diags.error(
                        DiagCode::UnresolvedIntrinsic,
                        format!("no member '{}' on {}", member, base.display()),
                        span,
                    );
                    return None;
                }
                if member.len() == 1 {
                    Some(ShapeType::Scalar(*k))
                } else {
                    ShapeType::vector(*k, member.len() as u8)
                }
            }
            ShapeType::Matrix(k, r, c) => {
                // Zero-based element access, `_m<row><col>`.
                let digits = member.strip_prefix("_m").map(str::as_bytes);
                match digits {
                    Some([row, col])
                        if row.is_ascii_digit()
                            && col.is_ascii_digit()
                            && row - b'0' < *r
                            && col - b'0' < *c =>
                    {
                        Some(ShapeType::Scalar(*k))
                    }
                    _ => {
                        self.diags.error(
                            DiagCode::UnresolvedIntrinsic,
                            format!("no member '{}' on {}", member, base.display()),
                            span,
                        );
                        None
                    }
                }
            }
            _ => {
                self.diags.error(
                    DiagCode::UnresolvedIntrinsic,
                    format!("no member '{}' on {}", member, base.display()),
                    span,
                );
                None
            }
        }
    }

    /// Element shape of an index operation, validating the index shape the
    /// base requires (scalar for buffers and vectors, `int2`/`uint2` for 2D
    /// textures, width 3 for 3D).
    fn element_shape(
        &mut self,
        base: &ShapeType,
        idx: &ShapeType,
        span: Span,
    ) -> Option<ShapeType> {
        let idx_ok = |width: Option<u8>| match (width, idx) {
            (None, ShapeType::Scalar(k)) => k.is_integer(),
            (Some(w), ShapeType::Vector(k, iw)) => k.is_integer() && *iw == w,
            _ => false,
        };
        let elem = match base {
            ShapeType::Resource(ResourceKind::Buffer, element, _) if idx_ok(None) => {
                (**element).clone()
            }
            ShapeType::Resource(ResourceKind::Texture2D, element, _) if idx_ok(Some(2)) => {
                (**element).clone()
            }
            ShapeType::Resource(ResourceKind::Texture3D, element, _) if idx_ok(Some(3)) => {
                (**element).clone()
            }
            ShapeType::Vector(k, _) if idx_ok(None) => ShapeType::Scalar(*k),
            ShapeType::Matrix(k, _, c) if idx_ok(None) => ShapeType::Vector(*k, *c),
            _ => {
                self.diags.error(
                    DiagCode::UnresolvedIntrinsic,
                    format!(
                        "cannot index {} with {}",
                        base.display(),
                        idx.display()
                    ),
                    span,
                );
                return None;
            }
        };
        Some(elem)
    }

    fn report_unresolved(&mut self, name: &str, shapes: &[ShapeType], span: Span) {
        let rendered = shapes
            .iter()
            .map(|s| s.display())
            .collect::<Vec<_>>()
            .join(", ");
        self.diags.push(
            Diagnostic::error(
                DiagCode::UnresolvedIntrinsic,
                format!("no overload of '{}' matches ({})", name, rendered),
                span,
            )
            .with_note(format!("argument shapes: ({})", rendered)),
        );
    }

    fn reject_ordinary_call(&mut self, type_name: &str, method: &str, span: Span) {
        self.diags.push(
            Diagnostic::error(
                DiagCode::UnsupportedConstruct,
                format!("'{}.{}' cannot be translated", type_name, method),
                span,
            )
            .with_help(
                "only kernel math operations and kernel-local functions are callable".to_string(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding;
    use crate::diagnostic::Severity;

    fn e(kind: ExprKind, ty: &str) -> Expr {
        Expr {
            kind,
            ty: ty.to_string(),
            span: Span::dummy(),
        }
    }

    fn var(name: &str, ty: &str) -> Expr {
        e(ExprKind::Var(name.to_string()), ty)
    }

    fn stmt(kind: StmtKind) -> Stmt {
        Stmt {
            kind,
            span: Span::dummy(),
        }
    }

    fn let_stmt(name: &str, ty: &str, init: Expr) -> Stmt {
        stmt(StmtKind::Let {
            name: name.to_string(),
            ty: ty.to_string(),
            init,
        })
    }

    fn kernel(captures: Vec<(&str, &str)>, stmts: Vec<Stmt>) -> KernelSource {
        KernelSource {
            name: "test".to_string(),
            thread_group: (64, 1, 1),
            thread_id_param: "tid".to_string(),
            captures: captures
                .into_iter()
                .map(|(name, ty)| Capture {
                    name: name.to_string(),
                    host_type: ty.to_string(),
                    span: Span::dummy(),
                })
                .collect(),
            local_fns: Vec::new(),
            body: Block { stmts },
            span: Span::dummy(),
        }
    }

    fn run(kernel: &KernelSource) -> (RewriteOutput, Diagnostics) {
        run_with(kernel, &TargetProfile::cs_6_0())
    }

    fn run_with(kernel: &KernelSource, profile: &TargetProfile) -> (RewriteOutput, Diagnostics) {
        let mut diags = Diagnostics::new();
        let analysis = binding::analyze(kernel, &mut diags);
        let inlined = expand(kernel, &mut diags);
        let out = rewrite_kernel(kernel, inlined, &analysis.capture_shapes, profile, &mut diags);
        (out, diags)
    }

    #[test]
    fn test_reserved_identifier_is_renamed() {
        let k = kernel(
            vec![],
            vec![let_stmt("float", "Float", e(ExprKind::FloatLit(1.0), "Float"))],
        );
        let (out, diags) = run(&k);
        assert!(!diags.has_errors());
        match &out.body[0] {
            lir::Stmt::Local { name, .. } => assert_eq!(name, "float_"),
            other => panic!("expected local, got {:?}", other),
        }
    }

    #[test]
    fn test_renames_never_collide() {
        let k = kernel(
            vec![],
            vec![
                let_stmt("float", "Float", e(ExprKind::FloatLit(1.0), "Float")),
                let_stmt("float_", "Float", e(ExprKind::FloatLit(2.0), "Float")),
            ],
        );
        let (out, diags) = run(&k);
        assert!(!diags.has_errors());
        let names: Vec<&str> = out
            .body
            .iter()
            .map(|s| match s {
                lir::Stmt::Local { name, .. } => name.as_str(),
                _ => panic!("expected locals"),
            })
            .collect();
        assert_eq!(names[0], "float_");
        assert_ne!(names[0], names[1]);
    }

    #[test]
    fn test_capture_rename_is_recorded() {
        let k = kernel(vec![("texture", "ReadBuffer<Float>")], vec![]);
        let (out, _) = run(&k);
        assert_eq!(out.emitted_names["texture"], "texture_");
    }

    #[test]
    fn test_float_remainder_becomes_fmod() {
        let rem = e(
            ExprKind::Binary {
                op: BinOp::Rem,
                lhs: Box::new(e(ExprKind::FloatLit(5.0), "Float")),
                rhs: Box::new(e(ExprKind::FloatLit(2.0), "Float")),
            },
            "Float",
        );
        let k = kernel(vec![], vec![let_stmt("x", "Float", rem)]);
        let (out, diags) = run(&k);
        assert!(!diags.has_errors());
        match &out.body[0] {
            lir::Stmt::Local {
                init: Some(lir::Expr::Call { name, args }),
                ..
            } => {
                assert_eq!(name, "fmod");
                assert_eq!(args.len(), 2);
            }
            other => panic!("expected fmod call, got {:?}", other),
        }
    }

    #[test]
    fn test_int_remainder_stays_an_operator() {
        let rem = e(
            ExprKind::Binary {
                op: BinOp::Rem,
                lhs: Box::new(e(ExprKind::IntLit(5), "Int")),
                rhs: Box::new(e(ExprKind::IntLit(2), "Int")),
            },
            "Int",
        );
        let k = kernel(vec![], vec![let_stmt("x", "Int", rem)]);
        let (out, diags) = run(&k);
        assert!(!diags.has_errors());
        match &out.body[0] {
            lir::Stmt::Local {
                init: Some(lir::Expr::Binary { op, .. }),
                ..
            } => assert_eq!(*op, "%"),
            other => panic!("expected binary, got {:?}", other),
        }
    }

    #[test]
    fn test_componentwise_mul_is_not_linear_algebra() {
        // Float4 * Float4 stays `*`; matrix-vector products must go through
        // the `mul` intrinsic, and the operator form does not resolve.
        let mul = e(
            ExprKind::Binary {
                op: BinOp::Mul,
                lhs: Box::new(var("m", "Float4x4")),
                rhs: Box::new(var("v", "Float4")),
            },
            "Float4",
        );
        let k = kernel(
            vec![("m", "Float4x4"), ("v", "Float4")],
            vec![let_stmt("x", "Float4", mul)],
        );
        let (_, diags) = run(&k);
        assert!(diags.has_errors());
        assert_eq!(
            diags.iter().next().unwrap().code,
            DiagCode::UnresolvedIntrinsic
        );
    }

    #[test]
    fn test_scalar_scaling_is_allowed() {
        let mul = e(
            ExprKind::Binary {
                op: BinOp::Mul,
                lhs: Box::new(var("s", "Float")),
                rhs: Box::new(var("v", "Float4")),
            },
            "Float4",
        );
        let k = kernel(
            vec![("s", "Float"), ("v", "Float4")],
            vec![let_stmt("x", "Float4", mul)],
        );
        let (_, diags) = run(&k);
        assert!(!diags.has_errors());
    }

    #[test]
    fn test_switch_lowers_to_if_chain() {
        let case = |label: i64| SwitchCase {
            label,
            body: Block {
                stmts: vec![let_stmt("a", "Int", e(ExprKind::IntLit(label), "Int"))],
            },
        };
        let k = kernel(
            vec![("mode", "Int")],
            vec![stmt(StmtKind::Switch {
                scrutinee: var("mode", "Int"),
                cases: vec![case(0), case(1)],
                default: Some(Block {
                    stmts: vec![let_stmt("a", "Int", e(ExprKind::IntLit(9), "Int"))],
                }),
            })],
        );
        let (out, diags) = run(&k);
        assert!(!diags.has_errors());
        // scrutinee temp, then the chain head
        assert_eq!(out.body.len(), 2);
        assert!(matches!(out.body[0], lir::Stmt::Local { .. }));
        let lir::Stmt::If { else_block, .. } = &out.body[1] else {
            panic!("expected if chain");
        };
        let inner = else_block.as_ref().unwrap();
        let lir::Stmt::If { else_block, .. } = &inner[0] else {
            panic!("expected else-if");
        };
        assert!(else_block.is_some(), "default missing from the chain tail");
    }

    #[test]
    fn test_unresolved_intrinsic_reports_shapes() {
        let call = e(
            ExprKind::Call {
                target: CallTarget::Intrinsic {
                    name: "Dot".to_string(),
                },
                args: vec![var("a", "Float"), var("b", "Float")],
            },
            "Float",
        );
        let k = kernel(
            vec![("a", "Float"), ("b", "Float")],
            vec![let_stmt("x", "Float", call)],
        );
        let (_, diags) = run(&k);
        let diag = diags.iter().next().unwrap();
        assert_eq!(diag.code, DiagCode::UnresolvedIntrinsic);
        assert!(diag.message.contains("Float, Float"), "{}", diag.message);
    }

    #[test]
    fn test_poisoned_local_call_is_dropped_silently() {
        let k = kernel(
            vec![],
            vec![stmt(StmtKind::Expr(e(
                ExprKind::Call {
                    target: CallTarget::Local {
                        name: "helper".to_string(),
                    },
                    args: vec![],
                },
                "Float",
            )))],
        );
        let mut diags = Diagnostics::new();
        let analysis = binding::analyze(&k, &mut diags);
        let mut poisoned = BTreeSet::new();
        poisoned.insert("helper".to_string());
        let inlined = InlineResult {
            body: k.body.clone(),
            poisoned,
        };
        let out = rewrite_kernel(
            &k,
            inlined,
            &analysis.capture_shapes,
            &TargetProfile::cs_6_0(),
            &mut diags,
        );
        assert!(diags.is_empty(), "drop must not add a second diagnostic");
        assert!(out.body.is_empty());
    }

    #[test]
    fn test_sincos_statement_hoists_value_arguments() {
        let k = kernel(
            vec![("angle", "Float")],
            vec![
                let_stmt("s", "Float", e(ExprKind::FloatLit(0.0), "Float")),
                let_stmt("c", "Float", e(ExprKind::FloatLit(0.0), "Float")),
                stmt(StmtKind::Call {
                    target: CallTarget::Intrinsic {
                        name: "SinCos".to_string(),
                    },
                    args: vec![
                        CallArg::In(var("angle", "Float")),
                        CallArg::Out("s".to_string(), "Float".to_string(), Span::dummy()),
                        CallArg::Out("c".to_string(), "Float".to_string(), Span::dummy()),
                    ],
                    span: Span::dummy(),
                }),
            ],
        );
        let (out, diags) = run(&k);
        assert!(!diags.has_errors());
        // s, c, the hoisted input, then the call
        assert_eq!(out.body.len(), 4);
        let lir::Stmt::Local { name: temp, .. } = &out.body[2] else {
            panic!("expected hoisted input");
        };
        assert_eq!(temp, "__t0");
        let lir::Stmt::Call { name, args } = &out.body[3] else {
            panic!("expected sincos statement");
        };
        assert_eq!(name, "sincos");
        assert!(matches!(&args[0], lir::Expr::Var(v) if v == "__t0"));
        assert!(matches!(&args[1], lir::Expr::Var(v) if v == "s"));
    }

    #[test]
    fn test_multi_output_in_expression_position_rejected() {
        let call = e(
            ExprKind::Call {
                target: CallTarget::Intrinsic {
                    name: "sincos".to_string(),
                },
                args: vec![var("a", "Float"), var("a", "Float"), var("a", "Float")],
            },
            "Float",
        );
        let k = kernel(vec![("a", "Float")], vec![let_stmt("x", "Float", call)]);
        let (_, diags) = run(&k);
        assert!(diags.has_errors());
        assert_eq!(
            diags.iter().next().unwrap().code,
            DiagCode::UnsupportedConstruct
        );
    }

    #[test]
    fn test_precision_warning_on_reduced_profile() {
        let call = e(
            ExprKind::Call {
                target: CallTarget::Intrinsic {
                    name: "abs".to_string(),
                },
                args: vec![var("d", "Double")],
            },
            "Double",
        );
        let k = kernel(
            vec![("d", "Double")],
            vec![let_stmt("x", "Double", call)],
        );
        let (_, diags) = run_with(&k, &TargetProfile::cs_5_0());
        assert!(!diags.has_errors());
        assert_eq!(diags.warnings().len(), 1);
        assert_eq!(
            diags.warnings()[0].code,
            DiagCode::PrecisionWarning
        );

        let (_, diags) = run_with(&k, &TargetProfile::cs_6_0());
        assert!(diags.warnings().is_empty());
    }

    #[test]
    fn test_write_through_readonly_view_rejected() {
        let k = kernel(
            vec![("input", "ReadBuffer<Float>")],
            vec![stmt(StmtKind::Assign {
                place: Place::Index(
                    Box::new(Place::Var("input".to_string(), Span::dummy())),
                    Box::new(e(ExprKind::IntLit(0), "Int")),
                    Span::dummy(),
                ),
                value: e(ExprKind::FloatLit(1.0), "Float"),
            })],
        );
        let (_, diags) = run(&k);
        assert!(diags.has_errors());
        assert_eq!(
            diags.iter().next().unwrap().code,
            DiagCode::UnsupportedConstruct
        );
    }

    #[test]
    fn test_swizzle_validation() {
        // .w on a Float3 is out of range
        let sw = e(
            ExprKind::Member {
                base: Box::new(var("v", "Float3")),
                member: "w".to_string(),
            },
            "Float",
        );
        let k = kernel(vec![("v", "Float3")], vec![let_stmt("x", "Float", sw)]);
        let (_, diags) = run(&k);
        assert!(diags.has_errors());
        assert_eq!(
            diags.iter().next().unwrap().code,
            DiagCode::UnresolvedIntrinsic
        );
    }

    #[test]
    fn test_swizzle_store_may_not_repeat_lanes() {
        let k = kernel(
            vec![],
            vec![
                let_stmt(
                    "v",
                    "Float2",
                    e(
                        ExprKind::Construct {
                            args: vec![
                                e(ExprKind::FloatLit(0.0), "Float"),
                                e(ExprKind::FloatLit(0.0), "Float"),
                            ],
                        },
                        "Float2",
                    ),
                ),
                stmt(StmtKind::Assign {
                    place: Place::Member(
                        Box::new(Place::Var("v".to_string(), Span::dummy())),
                        "xx".to_string(),
                        Span::new(0, 1, 2),
                    ),
                    value: e(
                        ExprKind::Construct {
                            args: vec![
                                e(ExprKind::FloatLit(1.0), "Float"),
                                e(ExprKind::FloatLit(1.0), "Float"),
                            ],
                        },
                        "Float2",
                    ),
                }),
            ],
        );
        let (_, diags) = run(&k);
        assert!(diags.has_errors());
    }

    #[test]
    fn test_thread_id_is_in_scope() {
        let idx = e(
            ExprKind::Member {
                base: Box::new(var("tid", "Uint3")),
                member: "x".to_string(),
            },
            "Uint",
        );
        let k = kernel(vec![], vec![let_stmt("i", "Uint", idx)]);
        let (out, diags) = run(&k);
        assert!(!diags.has_errors());
        assert_eq!(out.thread_id_name, "tid");
    }

    #[test]
    fn test_ordinary_method_call_rejected() {
        let call = e(
            ExprKind::Call {
                target: CallTarget::Ordinary {
                    type_name: "Console".to_string(),
                    method: "WriteLine".to_string(),
                },
                args: vec![],
            },
            "Void",
        );
        let k = kernel(vec![], vec![stmt(StmtKind::Expr(call))]);
        let (_, diags) = run(&k);
        let diag = diags.iter().next().unwrap();
        assert_eq!(diag.code, DiagCode::UnsupportedConstruct);
        assert!(diag.message.contains("Console.WriteLine"));
    }

    #[test]
    fn test_failed_subtree_reports_once() {
        // A bad variable inside a call must not also report the call.
        let call = e(
            ExprKind::Call {
                target: CallTarget::Intrinsic {
                    name: "abs".to_string(),
                },
                args: vec![var("nope", "Float")],
            },
            "Float",
        );
        let k = kernel(vec![], vec![let_stmt("x", "Float", call)]);
        let (_, diags) = run(&k);
        assert_eq!(
            diags
                .iter()
                .filter(|d| d.severity == Severity::Error)
                .count(),
            1
        );
    }
}
