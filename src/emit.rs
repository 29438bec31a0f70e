//! HLSL source emission.
//!
//! Printing is a single deterministic pass over the resolved tree: fixed
//! 4-space indentation, every binary and unary expression parenthesized so
//! no precedence table is needed, and float tokens formatted the same way on
//! every run. Identical descriptors always yield byte-identical source.

use crate::rewrite::lir;

/// A resource declaration, final name and register already decided.
#[derive(Clone, Debug)]
pub(crate) struct ResourceDecl {
    /// Full HLSL type, e.g. `RWStructuredBuffer<float4>`.
    pub spelling: String,
    pub name: String,
    /// Register reference, e.g. `t0` or `u1`.
    pub register: String,
}

/// A field of the implicit constant block.
#[derive(Clone, Debug)]
pub(crate) struct ConstantDecl {
    pub spelling: String,
    pub name: String,
}

/// Everything the printer needs for one kernel.
#[derive(Clone, Debug)]
pub(crate) struct KernelDescriptor {
    pub entry_point: String,
    pub thread_group: (u32, u32, u32),
    pub thread_id_name: String,
    pub constants: Vec<ConstantDecl>,
    pub resources: Vec<ResourceDecl>,
    pub body: Vec<lir::Stmt>,
}

pub(crate) fn emit(desc: &KernelDescriptor) -> String {
    let mut p = Printer {
        out: String::new(),
        indent: 0,
    };

    if !desc.constants.is_empty() {
        p.line("cbuffer Params : register(b0)");
        p.line("{");
        p.indent += 1;
        for field in &desc.constants {
            p.line(&format!("{} {};", field.spelling, field.name));
        }
        p.indent -= 1;
        p.line("};");
        p.blank();
    }

    for res in &desc.resources {
        p.line(&format!(
            "{} {} : register({});",
            res.spelling, res.name, res.register
        ));
    }
    if !desc.resources.is_empty() {
        p.blank();
    }

    let (x, y, z) = desc.thread_group;
    p.line(&format!("[numthreads({}, {}, {})]", x, y, z));
    p.line(&format!(
        "void {}(uint3 {} : SV_DispatchThreadID)",
        desc.entry_point, desc.thread_id_name
    ));
    p.line("{");
    p.indent += 1;
    for stmt in &desc.body {
        p.stmt(stmt);
    }
    p.indent -= 1;
    p.line("}");

    p.out
}

struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    fn line(&mut self, s: &str) {
        for _ in 0..self.indent {
            self.out.push_str("    ");
        }
        self.out.push_str(s);
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn stmt(&mut self, stmt: &lir::Stmt) {
        match stmt {
            lir::Stmt::Local { .. } | lir::Stmt::Assign { .. } | lir::Stmt::Expr(_) => {
                let rendered = inline_stmt(stmt);
                self.line(&format!("{};", rendered));
            }
            lir::Stmt::If {
                cond,
                then_block,
                else_block,
            } => {
                self.line(&format!("if ({})", expr(cond)));
                self.block(then_block);
                if let Some(else_block) = else_block {
                    // `else if` collapses back onto one line
                    if let [lir::Stmt::If { .. }] = else_block.as_slice() {
                        self.else_if(&else_block[0]);
                    } else {
                        self.line("else");
                        self.block(else_block);
                    }
                }
            }
            lir::Stmt::While { cond, body } => {
                self.line(&format!("while ({})", expr(cond)));
                self.block(body);
            }
            lir::Stmt::DoWhile { body, cond } => {
                self.line("do");
                self.block(body);
                self.line(&format!("while ({});", expr(cond)));
            }
            lir::Stmt::For {
                init,
                cond,
                step,
                body,
            } => {
                let init = init.as_deref().map(inline_stmt).unwrap_or_default();
                let cond = cond.as_ref().map(expr).unwrap_or_default();
                let step = step.as_deref().map(inline_stmt).unwrap_or_default();
                self.line(&format!("for ({}; {}; {})", init, cond, step));
                self.block(body);
            }
            lir::Stmt::Break => self.line("break;"),
            lir::Stmt::Continue => self.line("continue;"),
            lir::Stmt::Return => self.line("return;"),
            lir::Stmt::Call { name, args } => {
                let args: Vec<String> = args.iter().map(expr).collect();
                self.line(&format!("{}({});", name, args.join(", ")));
            }
        }
    }

    fn block(&mut self, stmts: &[lir::Stmt]) {
        self.line("{");
        self.indent += 1;
        for stmt in stmts {
            self.stmt(stmt);
        }
        self.indent -= 1;
        self.line("}");
    }

    fn else_if(&mut self, stmt: &lir::Stmt) {
        let lir::Stmt::If {
            cond,
            then_block,
            else_block,
        } = stmt
        else {
            return;
        };
        self.line(&format!("else if ({})", expr(cond)));
        self.block(then_block);
        if let Some(else_block) = else_block {
            if let [lir::Stmt::If { .. }] = else_block.as_slice() {
                self.else_if(&else_block[0]);
            } else {
                self.line("else");
                self.block(else_block);
            }
        }
    }
}

/// Single-line statement rendering, no terminator (shared by plain
/// statements and for-loop headers).
fn inline_stmt(stmt: &lir::Stmt) -> String {
    match stmt {
        lir::Stmt::Local {
            spelling,
            name,
            init,
        } => match init {
            Some(init) => format!("{} {} = {}", spelling, name, expr(init)),
            None => format!("{} {}", spelling, name),
        },
        lir::Stmt::Assign { place, value } => format!("{} = {}", expr(place), expr(value)),
        lir::Stmt::Expr(e) => expr(e),
        _ => String::new(),
    }
}

fn expr(e: &lir::Expr) -> String {
    match e {
        lir::Expr::Lit(lit) => lit_token(lit),
        lir::Expr::Var(name) => name.clone(),
        lir::Expr::Unary { op, expr: inner } => format!("({}{})", op, expr(inner)),
        lir::Expr::Binary { op, lhs, rhs } => {
            format!("({} {} {})", expr(lhs), op, expr(rhs))
        }
        lir::Expr::Call { name, args } => {
            let args: Vec<String> = args.iter().map(expr).collect();
            format!("{}({})", name, args.join(", "))
        }
        lir::Expr::Member { base, member } => format!("{}.{}", postfix_base(base), member),
        lir::Expr::Index { base, index } => {
            format!("{}[{}]", postfix_base(base), expr(index))
        }
        lir::Expr::Cast { spelling, expr: inner } => {
            format!("({})({})", spelling, expr(inner))
        }
    }
}

/// The base of a member/index access; casts need an extra wrap so the
/// postfix operator binds to the converted value.
fn postfix_base(base: &lir::Expr) -> String {
    match base {
        lir::Expr::Cast { .. } => format!("({})", expr(base)),
        _ => expr(base),
    }
}

fn lit_token(lit: &lir::Lit) -> String {
    match lit {
        lir::Lit::Int(v) => format!("{}", v),
        lir::Lit::Uint(v) => format!("{}u", v),
        lir::Lit::Float(v) => float_token(*v),
        lir::Lit::Double(v) => format!("{}L", float_token(*v)),
        lir::Lit::Bool(v) => format!("{}", v),
    }
}

/// Stable float spelling: integral values keep one fractional digit so the
/// token always reads as floating point; everything else uses the shortest
/// round-trip form.
fn float_token(v: f64) -> String {
    if v.is_finite() && v == v.trunc() && v.abs() < 1e16 {
        format!("{:.1}", v)
    } else {
        format!("{}", v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewrite::lir::{Expr, Lit, Stmt};

    fn descriptor(body: Vec<Stmt>) -> KernelDescriptor {
        KernelDescriptor {
            entry_point: "main".to_string(),
            thread_group: (64, 1, 1),
            thread_id_name: "tid".to_string(),
            constants: Vec::new(),
            resources: Vec::new(),
            body,
        }
    }

    #[test]
    fn test_empty_kernel_shape() {
        let source = emit(&descriptor(vec![]));
        assert_eq!(
            source,
            "[numthreads(64, 1, 1)]\n\
             void main(uint3 tid : SV_DispatchThreadID)\n\
             {\n\
             }\n"
        );
    }

    #[test]
    fn test_declarations_precede_entry_point() {
        let mut desc = descriptor(vec![]);
        desc.constants.push(ConstantDecl {
            spelling: "float".to_string(),
            name: "scale".to_string(),
        });
        desc.resources.push(ResourceDecl {
            spelling: "StructuredBuffer<float4>".to_string(),
            name: "input".to_string(),
            register: "t0".to_string(),
        });
        desc.resources.push(ResourceDecl {
            spelling: "RWStructuredBuffer<float4>".to_string(),
            name: "output".to_string(),
            register: "u0".to_string(),
        });
        let source = emit(&desc);
        let cbuffer = source.find("cbuffer Params : register(b0)").unwrap();
        let srv = source
            .find("StructuredBuffer<float4> input : register(t0);")
            .unwrap();
        let uav = source
            .find("RWStructuredBuffer<float4> output : register(u0);")
            .unwrap();
        let entry = source.find("[numthreads").unwrap();
        assert!(cbuffer < srv && srv < uav && uav < entry);
        assert!(source.contains("    float scale;"));
    }

    #[test]
    fn test_expressions_fully_parenthesized() {
        let e = Expr::Binary {
            op: "+",
            lhs: Box::new(Expr::Var("a".to_string())),
            rhs: Box::new(Expr::Binary {
                op: "*",
                lhs: Box::new(Expr::Var("b".to_string())),
                rhs: Box::new(Expr::Unary {
                    op: "-",
                    expr: Box::new(Expr::Var("c".to_string())),
                }),
            }),
        };
        insta::assert_snapshot!(expr(&e), @"(a + (b * (-c)))");
    }

    #[test]
    fn test_literal_tokens() {
        assert_eq!(lit_token(&Lit::Int(-3)), "-3");
        assert_eq!(lit_token(&Lit::Uint(7)), "7u");
        assert_eq!(lit_token(&Lit::Float(5.0)), "5.0");
        assert_eq!(lit_token(&Lit::Float(0.25)), "0.25");
        assert_eq!(lit_token(&Lit::Double(1.0)), "1.0L");
        assert_eq!(lit_token(&Lit::Bool(true)), "true");
    }

    #[test]
    fn test_cast_binds_before_postfix() {
        let e = Expr::Member {
            base: Box::new(Expr::Cast {
                spelling: "float4".to_string(),
                expr: Box::new(Expr::Var("v".to_string())),
            }),
            member: "x".to_string(),
        };
        insta::assert_snapshot!(expr(&e), @"((float4)(v)).x");
    }

    #[test]
    fn test_if_else_chain_stays_flat() {
        let leaf = |n: i64| {
            vec![Stmt::Assign {
                place: Expr::Var("x".to_string()),
                value: Expr::Lit(Lit::Int(n)),
            }]
        };
        let chain = Stmt::If {
            cond: Expr::Var("a".to_string()),
            then_block: leaf(0),
            else_block: Some(vec![Stmt::If {
                cond: Expr::Var("b".to_string()),
                then_block: leaf(1),
                else_block: Some(leaf(2)),
            }]),
        };
        let source = emit(&descriptor(vec![chain]));
        assert!(source.contains("    if (a)\n"));
        assert!(source.contains("    else if (b)\n"));
        assert!(source.contains("    else\n"));
        // no double-nested indentation for the second branch
        assert!(!source.contains("        if (b)"));
    }

    #[test]
    fn test_for_header_inlines_clauses() {
        let body = Stmt::For {
            init: Some(Box::new(Stmt::Local {
                spelling: "int".to_string(),
                name: "i".to_string(),
                init: Some(Expr::Lit(Lit::Int(0))),
            })),
            cond: Some(Expr::Binary {
                op: "<",
                lhs: Box::new(Expr::Var("i".to_string())),
                rhs: Box::new(Expr::Lit(Lit::Int(4))),
            }),
            step: Some(Box::new(Stmt::Assign {
                place: Expr::Var("i".to_string()),
                value: Expr::Binary {
                    op: "+",
                    lhs: Box::new(Expr::Var("i".to_string())),
                    rhs: Box::new(Expr::Lit(Lit::Int(1))),
                },
            })),
            body: vec![],
        };
        let source = emit(&descriptor(vec![body]));
        assert!(source.contains("for (int i = 0; (i < 4); i = (i + 1))"));
    }

    #[test]
    fn test_do_while_terminator() {
        let body = Stmt::DoWhile {
            body: vec![Stmt::Break],
            cond: Expr::Lit(Lit::Bool(true)),
        };
        let source = emit(&descriptor(vec![body]));
        assert!(source.contains("do\n"));
        assert!(source.contains("while (true);"));
    }

    #[test]
    fn test_emission_is_byte_stable() {
        let mut desc = descriptor(vec![Stmt::Local {
            spelling: "float".to_string(),
            name: "x".to_string(),
            init: Some(Expr::Lit(Lit::Float(0.1))),
        }]);
        desc.constants.push(ConstantDecl {
            spelling: "uint".to_string(),
            name: "count".to_string(),
        });
        assert_eq!(emit(&desc), emit(&desc));
    }
}
