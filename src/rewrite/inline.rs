//! Local-function inlining.
//!
//! Kernel-local helpers are expanded at each call site before rewriting:
//! arguments bind to fresh locals in evaluation order (by-value), the body
//! is spliced in with suffix-renamed locals, and the tail `return` value
//! becomes a fresh result local. Recursion is detected first over the
//! local-function call graph; a cycle is reported once, at the function that
//! starts it, and calls into the cycle are dropped without further noise.

use std::collections::{BTreeMap, BTreeSet};

use crate::diagnostic::{DiagCode, Diagnostics};
use crate::hir::*;
use crate::span::Span;

/// Inlining output: the expanded body plus the names of local functions
/// that could not be inlined (already diagnosed; calls to them are dropped
/// silently downstream).
pub(crate) struct InlineResult {
    pub body: Block,
    pub poisoned: BTreeSet<String>,
}

pub(crate) fn expand(kernel: &KernelSource, diags: &mut Diagnostics) -> InlineResult {
    let fns: BTreeMap<&str, &LocalFn> = kernel
        .local_fns
        .iter()
        .map(|f| (f.name.as_str(), f))
        .collect();

    let mut poisoned = detect_recursion(&fns, diags);

    // A helper whose body contains a non-tail return cannot be spliced in.
    for f in kernel.local_fns.iter() {
        if poisoned.contains(&f.name) {
            continue;
        }
        if !has_tail_return_only(&f.body) {
            diags.error(
                DiagCode::UnsupportedConstruct,
                format!(
                    "local function '{}' has an early return; only a single tail return can be inlined",
                    f.name
                ),
                f.span,
            );
            poisoned.insert(f.name.clone());
        }
    }

    let capture_names: BTreeSet<&str> = kernel
        .captures
        .iter()
        .map(|c| c.name.as_str())
        .collect();

    let mut inliner = Inliner {
        fns,
        poisoned,
        capture_names,
        thread_id: kernel.thread_id_param.as_str(),
        counter: 0,
        diags,
    };
    let body = inliner.expand_block(&kernel.body);
    InlineResult {
        body,
        poisoned: inliner.poisoned,
    }
}

/// Build the call graph among local functions and report each cycle once.
/// Same DFS coloring as any call-graph cycle check: 0 unvisited, 1 on the
/// current path, 2 done.
fn detect_recursion(
    fns: &BTreeMap<&str, &LocalFn>,
    diags: &mut Diagnostics,
) -> BTreeSet<String> {
    let mut graph: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for (name, f) in fns {
        let mut callees = Vec::new();
        collect_calls_block(&f.body, &mut callees);
        graph.insert(name, callees);
    }

    let mut state: BTreeMap<&str, u8> = fns.keys().map(|n| (*n, 0u8)).collect();
    let mut poisoned = BTreeSet::new();

    let names: Vec<&str> = fns.keys().copied().collect();
    for name in names {
        if state[name] == 0 {
            let mut path = Vec::new();
            if dfs_cycle(name, &graph, &mut state, &mut path) {
                let span = fns
                    .get(path[0].as_str())
                    .map(|f| f.span)
                    .unwrap_or_else(Span::dummy);
                diags.push(
                    crate::diagnostic::Diagnostic::error(
                        DiagCode::UnsupportedConstruct,
                        format!("recursive local-function cycle: {}", path.join(" -> ")),
                        span,
                    )
                    .with_help(
                        "GPU kernels cannot recurse; restructure as a bounded loop".to_string(),
                    ),
                );
                for n in &path {
                    poisoned.insert(n.clone());
                }
            }
        }
    }
    poisoned
}

fn dfs_cycle(
    node: &str,
    graph: &BTreeMap<&str, Vec<String>>,
    state: &mut BTreeMap<&str, u8>,
    path: &mut Vec<String>,
) -> bool {
    if let Some(s) = state.get_mut(node) {
        *s = 1;
    }
    path.push(node.to_string());

    if let Some(callees) = graph.get(node) {
        for callee in callees {
            let s = state.get(callee.as_str()).copied().unwrap_or(2);
            if s == 1 {
                path.push(callee.clone());
                return true;
            }
            if s == 0 && dfs_cycle(callee.as_str(), graph, state, path) {
                return true;
            }
        }
    }

    path.pop();
    if let Some(s) = state.get_mut(node) {
        *s = 2;
    }
    false
}

fn collect_calls_block(block: &Block, calls: &mut Vec<String>) {
    for stmt in &block.stmts {
        collect_calls_stmt(&stmt.kind, calls);
    }
}

fn collect_calls_stmt(stmt: &StmtKind, calls: &mut Vec<String>) {
    match stmt {
        StmtKind::Let { init, .. } => collect_calls_expr(init, calls),
        StmtKind::Assign { place, value } => {
            collect_calls_place(place, calls);
            collect_calls_expr(value, calls);
        }
        StmtKind::If {
            cond,
            then_block,
            else_block,
        } => {
            collect_calls_expr(cond, calls);
            collect_calls_block(then_block, calls);
            if let Some(b) = else_block {
                collect_calls_block(b, calls);
            }
        }
        StmtKind::While { cond, body } | StmtKind::DoWhile { body, cond } => {
            collect_calls_expr(cond, calls);
            collect_calls_block(body, calls);
        }
        StmtKind::For {
            init,
            cond,
            step,
            body,
        } => {
            if let Some(s) = init {
                collect_calls_stmt(&s.kind, calls);
            }
            if let Some(e) = cond {
                collect_calls_expr(e, calls);
            }
            if let Some(s) = step {
                collect_calls_stmt(&s.kind, calls);
            }
            collect_calls_block(body, calls);
        }
        StmtKind::Switch {
            scrutinee,
            cases,
            default,
        } => {
            collect_calls_expr(scrutinee, calls);
            for case in cases {
                collect_calls_block(&case.body, calls);
            }
            if let Some(b) = default {
                collect_calls_block(b, calls);
            }
        }
        StmtKind::Call { target, args, .. } => {
            if let CallTarget::Local { name } = target {
                calls.push(name.clone());
            }
            for arg in args {
                if let CallArg::In(e) = arg {
                    collect_calls_expr(e, calls);
                }
            }
        }
        StmtKind::Return(Some(e)) | StmtKind::Expr(e) => collect_calls_expr(e, calls),
        StmtKind::Return(None) | StmtKind::Break | StmtKind::Continue | StmtKind::Throw => {}
    }
}

fn collect_calls_place(place: &Place, calls: &mut Vec<String>) {
    match place {
        Place::Var(..) => {}
        Place::Member(inner, ..) => collect_calls_place(inner, calls),
        Place::Index(inner, index, _) => {
            collect_calls_place(inner, calls);
            collect_calls_expr(index, calls);
        }
    }
}

fn collect_calls_expr(expr: &Expr, calls: &mut Vec<String>) {
    match &expr.kind {
        ExprKind::Call { target, args } => {
            if let CallTarget::Local { name } = target {
                calls.push(name.clone());
            }
            for arg in args {
                collect_calls_expr(arg, calls);
            }
        }
        ExprKind::Unary { expr, .. } | ExprKind::Cast { expr } => collect_calls_expr(expr, calls),
        ExprKind::Binary { lhs, rhs, .. } => {
            collect_calls_expr(lhs, calls);
            collect_calls_expr(rhs, calls);
        }
        ExprKind::Member { base, .. } => collect_calls_expr(base, calls),
        ExprKind::Index { base, index } => {
            collect_calls_expr(base, calls);
            collect_calls_expr(index, calls);
        }
        ExprKind::Construct { args } => {
            for a in args {
                collect_calls_expr(a, calls);
            }
        }
        ExprKind::IntLit(_)
        | ExprKind::FloatLit(_)
        | ExprKind::BoolLit(_)
        | ExprKind::Var(_)
        | ExprKind::NewObject { .. }
        | ExprKind::Lambda => {}
    }
}

/// True if the only `return` in the body is the final top-level statement
/// (or the body has no return at all, for void helpers).
fn has_tail_return_only(body: &Block) -> bool {
    let n = body.stmts.len();
    for (i, stmt) in body.stmts.iter().enumerate() {
        let is_last = i + 1 == n;
        if contains_return(&stmt.kind, is_last) {
            return false;
        }
    }
    true
}

fn contains_return(stmt: &StmtKind, tail_allowed: bool) -> bool {
    match stmt {
        StmtKind::Return(_) => !tail_allowed,
        StmtKind::If {
            then_block,
            else_block,
            ..
        } => {
            block_contains_return(then_block)
                || else_block.as_ref().is_some_and(block_contains_return)
        }
        StmtKind::While { body, .. }
        | StmtKind::DoWhile { body, .. }
        | StmtKind::For { body, .. } => block_contains_return(body),
        StmtKind::Switch { cases, default, .. } => {
            cases.iter().any(|c| block_contains_return(&c.body))
                || default.as_ref().is_some_and(block_contains_return)
        }
        _ => false,
    }
}

fn block_contains_return(block: &Block) -> bool {
    block
        .stmts
        .iter()
        .any(|s| contains_return(&s.kind, false))
}

struct Inliner<'a> {
    fns: BTreeMap<&'a str, &'a LocalFn>,
    poisoned: BTreeSet<String>,
    capture_names: BTreeSet<&'a str>,
    thread_id: &'a str,
    counter: u32,
    diags: &'a mut Diagnostics,
}

/// Outcome of splicing one call site.
enum Splice {
    /// The fresh local holding the inlined return value.
    Value(String),
    Void,
    /// Already diagnosed; the call site must vanish without further noise.
    Failed,
}

impl<'a> Inliner<'a> {
    fn expand_block(&mut self, block: &Block) -> Block {
        let mut out = Block::default();
        for stmt in &block.stmts {
            self.expand_stmt(stmt, &mut out.stmts);
        }
        out
    }

    fn expand_stmt(&mut self, stmt: &Stmt, out: &mut Vec<Stmt>) {
        let mut prelude = Vec::new();
        let kind = match &stmt.kind {
            StmtKind::Let { name, ty, init } => StmtKind::Let {
                name: name.clone(),
                ty: ty.clone(),
                init: self.expand_expr(init, &mut prelude),
            },
            StmtKind::Assign { place, value } => StmtKind::Assign {
                place: place.clone(),
                value: self.expand_expr(value, &mut prelude),
            },
            StmtKind::If {
                cond,
                then_block,
                else_block,
            } => StmtKind::If {
                cond: self.expand_expr(cond, &mut prelude),
                then_block: self.expand_block(then_block),
                else_block: else_block.as_ref().map(|b| self.expand_block(b)),
            },
            // A local call in a loop condition would need re-evaluation per
            // iteration; hoisting breaks that, so conditions stay untouched
            // and the rewriter rejects any local call left inside one.
            StmtKind::While { cond, body } => StmtKind::While {
                cond: cond.clone(),
                body: self.expand_block(body),
            },
            StmtKind::DoWhile { body, cond } => StmtKind::DoWhile {
                body: self.expand_block(body),
                cond: cond.clone(),
            },
            StmtKind::For {
                init,
                cond,
                step,
                body,
            } => StmtKind::For {
                init: init.clone(),
                cond: cond.clone(),
                step: step.clone(),
                body: self.expand_block(body),
            },
            StmtKind::Switch {
                scrutinee,
                cases,
                default,
            } => StmtKind::Switch {
                scrutinee: self.expand_expr(scrutinee, &mut prelude),
                cases: cases
                    .iter()
                    .map(|c| SwitchCase {
                        label: c.label,
                        body: self.expand_block(&c.body),
                    })
                    .collect(),
                default: default.as_ref().map(|b| self.expand_block(b)),
            },
            StmtKind::Call { target, args, span } => {
                if let CallTarget::Local { name } = target {
                    if let Some(f) = self.inlinable(name) {
                        let in_args: Vec<Expr> = args
                            .iter()
                            .filter_map(|a| match a {
                                CallArg::In(e) => Some(e.clone()),
                                CallArg::Out(..) => None,
                            })
                            .collect();
                        if in_args.len() != args.len() {
                            self.diags.error(
                                DiagCode::UnsupportedConstruct,
                                format!(
                                    "local function '{}' cannot take out arguments",
                                    name
                                ),
                                *span,
                            );
                            return;
                        }
                        self.splice_call(f, &in_args, *span, &mut prelude);
                        out.append(&mut prelude);
                        return;
                    }
                }
                StmtKind::Call {
                    target: target.clone(),
                    args: args
                        .iter()
                        .map(|a| match a {
                            CallArg::In(e) => CallArg::In(self.expand_expr(e, &mut prelude)),
                            CallArg::Out(n, t, s) => CallArg::Out(n.clone(), t.clone(), *s),
                        })
                        .collect(),
                    span: *span,
                }
            }
            StmtKind::Return(e) => StmtKind::Return(
                e.as_ref().map(|e| self.expand_expr(e, &mut prelude)),
            ),
            StmtKind::Expr(e) => StmtKind::Expr(self.expand_expr(e, &mut prelude)),
            StmtKind::Break => StmtKind::Break,
            StmtKind::Continue => StmtKind::Continue,
            StmtKind::Throw => StmtKind::Throw,
        };
        out.append(&mut prelude);
        out.push(Stmt {
            kind,
            span: stmt.span,
        });
    }

    fn expand_expr(&mut self, expr: &Expr, prelude: &mut Vec<Stmt>) -> Expr {
        let kind = match &expr.kind {
            ExprKind::Call { target, args } => {
                let args: Vec<Expr> = args
                    .iter()
                    .map(|a| self.expand_expr(a, prelude))
                    .collect();
                if let CallTarget::Local { name } = target {
                    if let Some(f) = self.inlinable(name) {
                        match self.splice_call(f, &args, expr.span, prelude) {
                            Splice::Value(ret_var) => ExprKind::Var(ret_var),
                            Splice::Void => {
                                self.diags.error(
                                    DiagCode::UnsupportedConstruct,
                                    format!(
                                        "local function '{}' returns no value but is used as one",
                                        name
                                    ),
                                    expr.span,
                                );
                                self.dropped_call(name)
                            }
                            Splice::Failed => self.dropped_call(name),
                        }
                    } else {
                        // poisoned or unknown; the rewriter handles it
                        ExprKind::Call {
                            target: target.clone(),
                            args,
                        }
                    }
                } else {
                    ExprKind::Call {
                        target: target.clone(),
                        args,
                    }
                }
            }
            ExprKind::Unary { op, expr: e } => ExprKind::Unary {
                op: *op,
                expr: Box::new(self.expand_expr(e, prelude)),
            },
            ExprKind::Binary { op, lhs, rhs } => ExprKind::Binary {
                op: *op,
                lhs: Box::new(self.expand_expr(lhs, prelude)),
                rhs: Box::new(self.expand_expr(rhs, prelude)),
            },
            ExprKind::Member { base, member } => ExprKind::Member {
                base: Box::new(self.expand_expr(base, prelude)),
                member: member.clone(),
            },
            ExprKind::Index { base, index } => ExprKind::Index {
                base: Box::new(self.expand_expr(base, prelude)),
                index: Box::new(self.expand_expr(index, prelude)),
            },
            ExprKind::Construct { args } => ExprKind::Construct {
                args: args
                    .iter()
                    .map(|a| self.expand_expr(a, prelude))
                    .collect(),
            },
            ExprKind::Cast { expr: e } => ExprKind::Cast {
                expr: Box::new(self.expand_expr(e, prelude)),
            },
            other => other.clone(),
        };
        Expr {
            kind,
            ty: expr.ty.clone(),
            span: expr.span,
        }
    }

    fn inlinable(&self, name: &str) -> Option<&'a LocalFn> {
        if self.poisoned.contains(name) {
            return None;
        }
        self.fns.get(name).copied()
    }

    /// A failed call site in expression position: lower it to a uniquely
    /// named poisoned call so the rewriter drops the subtree without a
    /// second diagnostic.
    fn dropped_call(&mut self, name: &str) -> ExprKind {
        let sentinel = format!("__{}_{}_dropped", name, self.counter);
        self.counter += 1;
        self.poisoned.insert(sentinel.clone());
        ExprKind::Call {
            target: CallTarget::Local { name: sentinel },
            args: Vec::new(),
        }
    }

    /// Splice one call: bind arguments to fresh locals in evaluation order,
    /// append the renamed body, and name the result local.
    fn splice_call(
        &mut self,
        f: &'a LocalFn,
        args: &[Expr],
        call_span: Span,
        prelude: &mut Vec<Stmt>,
    ) -> Splice {
        let n = self.counter;
        self.counter += 1;

        if args.len() != f.params.len() {
            self.diags.error(
                DiagCode::UnsupportedConstruct,
                format!(
                    "local function '{}' takes {} arguments, {} given",
                    f.name,
                    f.params.len(),
                    args.len()
                ),
                call_span,
            );
            return Splice::Failed;
        }

        let mut rename: BTreeMap<String, String> = BTreeMap::new();
        for ((param, param_ty), arg) in f.params.iter().zip(args) {
            let bound = format!("__{}_{}_{}", f.name, n, param);
            prelude.push(Stmt {
                kind: StmtKind::Let {
                    name: bound.clone(),
                    ty: param_ty.clone(),
                    init: arg.clone(),
                },
                span: call_span,
            });
            rename.insert(param.clone(), bound);
        }

        let prefix = format!("__{}_{}_", f.name, n);
        let mut ret_var = None;
        let body_len = f.body.stmts.len();
        for (i, stmt) in f.body.stmts.iter().enumerate() {
            let is_tail = i + 1 == body_len;
            if is_tail {
                if let StmtKind::Return(Some(value)) = &stmt.kind {
                    let value = self.rename_expr(value, &mut rename, &prefix);
                    let name = format!("__{}_{}_ret", f.name, n);
                    let ty = f.return_type.clone().unwrap_or_default();
                    prelude.push(Stmt {
                        kind: StmtKind::Let {
                            name: name.clone(),
                            ty,
                            init: value,
                        },
                        span: stmt.span,
                    });
                    ret_var = Some(name);
                    continue;
                }
                if let StmtKind::Return(None) = &stmt.kind {
                    continue;
                }
            }
            let renamed = self.rename_stmt(stmt, &mut rename, &prefix);
            prelude.push(renamed);
        }

        // Bodies may themselves call other local functions.
        let spliced = std::mem::take(prelude);
        let block = self.expand_block(&Block { stmts: spliced });
        *prelude = block.stmts;

        match ret_var {
            Some(name) => Splice::Value(name),
            // Declared a return type but the tail was not a return.
            None if f.return_type.is_some() => {
                self.diags.error(
                    DiagCode::UnsupportedConstruct,
                    format!(
                        "local function '{}' must end in a return of its value",
                        f.name
                    ),
                    f.span,
                );
                Splice::Failed
            }
            None => Splice::Void,
        }
    }

    fn rename_stmt(
        &mut self,
        stmt: &Stmt,
        rename: &mut BTreeMap<String, String>,
        prefix: &str,
    ) -> Stmt {
        let kind = match &stmt.kind {
            StmtKind::Let { name, ty, init } => {
                let init = self.rename_expr(init, rename, prefix);
                let fresh = format!("{}{}", prefix, name);
                rename.insert(name.clone(), fresh.clone());
                StmtKind::Let {
                    name: fresh,
                    ty: ty.clone(),
                    init,
                }
            }
            StmtKind::Assign { place, value } => StmtKind::Assign {
                place: self.rename_place(place, rename, prefix),
                value: self.rename_expr(value, rename, prefix),
            },
            StmtKind::If {
                cond,
                then_block,
                else_block,
            } => StmtKind::If {
                cond: self.rename_expr(cond, rename, prefix),
                then_block: self.rename_block(then_block, rename, prefix),
                else_block: else_block
                    .as_ref()
                    .map(|b| self.rename_block(b, rename, prefix)),
            },
            StmtKind::While { cond, body } => StmtKind::While {
                cond: self.rename_expr(cond, rename, prefix),
                body: self.rename_block(body, rename, prefix),
            },
            StmtKind::DoWhile { body, cond } => StmtKind::DoWhile {
                body: self.rename_block(body, rename, prefix),
                cond: self.rename_expr(cond, rename, prefix),
            },
            StmtKind::For {
                init,
                cond,
                step,
                body,
            } => StmtKind::For {
                init: init
                    .as_ref()
                    .map(|s| Box::new(self.rename_stmt(s, rename, prefix))),
                cond: cond.as_ref().map(|e| self.rename_expr(e, rename, prefix)),
                step: step
                    .as_ref()
                    .map(|s| Box::new(self.rename_stmt(s, rename, prefix))),
                body: self.rename_block(body, rename, prefix),
            },
            StmtKind::Switch {
                scrutinee,
                cases,
                default,
            } => StmtKind::Switch {
                scrutinee: self.rename_expr(scrutinee, rename, prefix),
                cases: cases
                    .iter()
                    .map(|c| SwitchCase {
                        label: c.label,
                        body: self.rename_block(&c.body, rename, prefix),
                    })
                    .collect(),
                default: default
                    .as_ref()
                    .map(|b| self.rename_block(b, rename, prefix)),
            },
            StmtKind::Call { target, args, span } => StmtKind::Call {
                target: target.clone(),
                args: args
                    .iter()
                    .map(|a| match a {
                        CallArg::In(e) => CallArg::In(self.rename_expr(e, rename, prefix)),
                        CallArg::Out(name, ty, s) => {
                            let renamed =
                                rename.get(name).cloned().unwrap_or_else(|| name.clone());
                            CallArg::Out(renamed, ty.clone(), *s)
                        }
                    })
                    .collect(),
                span: *span,
            },
            StmtKind::Return(e) => StmtKind::Return(
                e.as_ref().map(|e| self.rename_expr(e, rename, prefix)),
            ),
            StmtKind::Expr(e) => StmtKind::Expr(self.rename_expr(e, rename, prefix)),
            StmtKind::Break => StmtKind::Break,
            StmtKind::Continue => StmtKind::Continue,
            StmtKind::Throw => StmtKind::Throw,
        };
        Stmt {
            kind,
            span: stmt.span,
        }
    }

    fn rename_block(
        &mut self,
        block: &Block,
        rename: &mut BTreeMap<String, String>,
        prefix: &str,
    ) -> Block {
        Block {
            stmts: block
                .stmts
                .iter()
                .map(|s| self.rename_stmt(s, rename, prefix))
                .collect(),
        }
    }

    fn rename_place(
        &mut self,
        place: &Place,
        rename: &mut BTreeMap<String, String>,
        prefix: &str,
    ) -> Place {
        match place {
            Place::Var(name, span) => {
                let renamed = rename.get(name).cloned().unwrap_or_else(|| name.clone());
                Place::Var(renamed, *span)
            }
            Place::Member(inner, member, span) => Place::Member(
                Box::new(self.rename_place(inner, rename, prefix)),
                member.clone(),
                *span,
            ),
            Place::Index(inner, index, span) => Place::Index(
                Box::new(self.rename_place(inner, rename, prefix)),
                Box::new(self.rename_expr(index, rename, prefix)),
                *span,
            ),
        }
    }

    fn rename_expr(
        &mut self,
        expr: &Expr,
        rename: &mut BTreeMap<String, String>,
        prefix: &str,
    ) -> Expr {
        let kind = match &expr.kind {
            ExprKind::Var(name) => match rename.get(name) {
                Some(fresh) => ExprKind::Var(fresh.clone()),
                None => {
                    // Only parameters, own locals, captured kernel state, and
                    // the thread index are visible; anything else is a
                    // closure over an outer local.
                    if self.capture_names.contains(name.as_str()) || name == self.thread_id {
                        ExprKind::Var(name.clone())
                    } else {
                        self.diags.error(
                            DiagCode::UnsupportedConstruct,
                            format!(
                                "local function closes over outer variable '{}'; only by-value parameters are allowed",
                                name
                            ),
                            expr.span,
                        );
                        ExprKind::Var(name.clone())
                    }
                }
            },
            ExprKind::Unary { op, expr: e } => ExprKind::Unary {
                op: *op,
                expr: Box::new(self.rename_expr(e, rename, prefix)),
            },
            ExprKind::Binary { op, lhs, rhs } => ExprKind::Binary {
                op: *op,
                lhs: Box::new(self.rename_expr(lhs, rename, prefix)),
                rhs: Box::new(self.rename_expr(rhs, rename, prefix)),
            },
            ExprKind::Call { target, args } => ExprKind::Call {
                target: target.clone(),
                args: args
                    .iter()
                    .map(|a| self.rename_expr(a, rename, prefix))
                    .collect(),
            },
            ExprKind::Member { base, member } => ExprKind::Member {
                base: Box::new(self.rename_expr(base, rename, prefix)),
                member: member.clone(),
            },
            ExprKind::Index { base, index } => ExprKind::Index {
                base: Box::new(self.rename_expr(base, rename, prefix)),
                index: Box::new(self.rename_expr(index, rename, prefix)),
            },
            ExprKind::Construct { args } => ExprKind::Construct {
                args: args
                    .iter()
                    .map(|a| self.rename_expr(a, rename, prefix))
                    .collect(),
            },
            ExprKind::Cast { expr: e } => ExprKind::Cast {
                expr: Box::new(self.rename_expr(e, rename, prefix)),
            },
            other => other.clone(),
        };
        Expr {
            kind,
            ty: expr.ty.clone(),
            span: expr.span,
        }
    }
}
