//! The translation pipeline: dispatch validation, binding analysis,
//! inlining, rewriting, then emission, with one diagnostics accumulator
//! threaded through the passes. Any error blocks emission; warnings ride
//! along with the successful result.

use rayon::prelude::*;

use crate::api::{TranslateOptions, Translation};
use crate::binding::{self, BindingAnalysis};
use crate::diagnostic::{DiagCode, Diagnostic, Diagnostics};
use crate::emit::{self, ConstantDecl, KernelDescriptor, ResourceDecl};
use crate::hir::KernelSource;
use crate::mapper;
use crate::rewrite::{self, RewriteOutput};
use crate::shape::ShapeType;

/// Translate one kernel with default options (`cs_6_0`, entry `main`).
pub fn translate(kernel: &KernelSource) -> Result<Translation, Vec<Diagnostic>> {
    translate_with_options(kernel, &TranslateOptions::default())
}

pub fn translate_with_options(
    kernel: &KernelSource,
    options: &TranslateOptions,
) -> Result<Translation, Vec<Diagnostic>> {
    let mut diags = Diagnostics::new();

    // A malformed dispatch shape invalidates everything downstream, so it
    // short-circuits before binding analysis runs.
    validate_thread_group(kernel, &mut diags);
    if diags.has_errors() {
        return Err(diags.into_sorted());
    }

    let analysis = binding::analyze(kernel, &mut diags);
    let inlined = rewrite::expand(kernel, &mut diags);
    let rewritten = rewrite::rewrite_kernel(
        kernel,
        inlined,
        &analysis.capture_shapes,
        &options.profile,
        &mut diags,
    );

    if diags.has_errors() {
        return Err(diags.into_sorted());
    }

    let descriptor = build_descriptor(&analysis, &rewritten, &options.entry_point);
    let source = emit::emit(&descriptor);

    Ok(Translation {
        source,
        manifest: analysis.manifest,
        warnings: diags.warnings(),
    })
}

/// Translate a batch of kernels in parallel. Results keep input order; each
/// kernel succeeds or fails independently.
pub fn translate_all(
    kernels: &[KernelSource],
    options: &TranslateOptions,
) -> Vec<Result<Translation, Vec<Diagnostic>>> {
    kernels
        .par_iter()
        .map(|k| translate_with_options(k, options))
        .collect()
}

/// Direct3D compute limits: each dimension at least 1, x and y at most
/// 1024, z at most 64, and the product at most 1024 threads per group.
fn validate_thread_group(kernel: &KernelSource, diags: &mut Diagnostics) {
    let (x, y, z) = kernel.thread_group;
    if x == 0 || y == 0 || z == 0 {
        diags.error(
            DiagCode::UnsupportedConstruct,
            format!("thread group ({}, {}, {}) has a zero dimension", x, y, z),
            kernel.span,
        );
        return;
    }
    if x > 1024 || y > 1024 || z > 64 {
        diags.push(
            Diagnostic::error(
                DiagCode::UnsupportedConstruct,
                format!(
                    "thread group ({}, {}, {}) exceeds a dimension limit",
                    x, y, z
                ),
                kernel.span,
            )
            .with_note("x and y may be at most 1024, z at most 64".to_string()),
        );
        return;
    }
    if x as u64 * y as u64 * z as u64 > 1024 {
        diags.error(
            DiagCode::UnsupportedConstruct,
            format!(
                "thread group ({}, {}, {}) has {} threads; the limit is 1024",
                x,
                y,
                z,
                x as u64 * y as u64 * z as u64
            ),
            kernel.span,
        );
    }
}

fn build_descriptor(
    analysis: &BindingAnalysis,
    rewritten: &RewriteOutput,
    entry_point: &str,
) -> KernelDescriptor {
    let emitted = |name: &str| {
        rewritten
            .emitted_names
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string())
    };

    let constants = analysis
        .manifest
        .constants
        .fields
        .iter()
        .map(|f| ConstantDecl {
            spelling: mapper::hlsl_spelling(&f.shape),
            name: emitted(&f.name),
        })
        .collect();

    let resources = analysis
        .manifest
        .slots
        .iter()
        .map(|slot| {
            let shape = ShapeType::resource(slot.kind, slot.element.clone(), slot.access);
            ResourceDecl {
                spelling: mapper::hlsl_spelling(&shape),
                name: emitted(&slot.name),
                register: format!("{}{}", slot.register_class.prefix(), slot.index),
            }
        })
        .collect();

    KernelDescriptor {
        entry_point: entry_point.to_string(),
        thread_group: analysis.manifest.thread_group,
        thread_id_name: rewritten.thread_id_name.clone(),
        constants,
        resources,
        body: rewritten.body.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TargetProfile;
    use crate::diagnostic::Severity;
    use crate::hir::{Block, CallTarget, Capture, Expr, ExprKind, KernelSource, Stmt, StmtKind};
    use crate::span::Span;

    fn empty_kernel(thread_group: (u32, u32, u32)) -> KernelSource {
        KernelSource {
            name: "test".to_string(),
            thread_group,
            thread_id_param: "tid".to_string(),
            captures: Vec::new(),
            local_fns: Vec::new(),
            body: Block::default(),
            span: Span::dummy(),
        }
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let err = translate(&empty_kernel((0, 1, 1))).unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err[0].code, DiagCode::UnsupportedConstruct);
    }

    #[test]
    fn test_z_limit_is_64() {
        assert!(translate(&empty_kernel((1, 1, 64))).is_ok());
        assert!(translate(&empty_kernel((1, 1, 65))).is_err());
    }

    #[test]
    fn test_group_product_limit() {
        assert!(translate(&empty_kernel((32, 32, 1))).is_ok());
        assert!(translate(&empty_kernel((64, 32, 1))).is_err());
    }

    #[test]
    fn test_malformed_dispatch_short_circuits_binding() {
        // The bad capture would also error, but the dispatch shape reports
        // alone: later passes never ran.
        let mut kernel = empty_kernel((0, 1, 1));
        kernel.captures.push(Capture {
            name: "widget".to_string(),
            host_type: "Widget".to_string(),
            span: Span::dummy(),
        });
        let err = translate(&kernel).unwrap_err();
        assert_eq!(err.len(), 1);
    }

    #[test]
    fn test_errors_sort_before_warnings() {
        // An unrepresentable capture plus a double-precision warning.
        let mut kernel = empty_kernel((64, 1, 1));
        kernel.captures.push(Capture {
            name: "widget".to_string(),
            host_type: "Widget".to_string(),
            span: Span::new(0, 0, 5),
        });
        kernel.captures.push(Capture {
            name: "d".to_string(),
            host_type: "Double".to_string(),
            span: Span::new(0, 6, 7),
        });
        kernel.body.stmts.push(Stmt {
            kind: StmtKind::Let {
                name: "x".to_string(),
                ty: "Double".to_string(),
                init: Expr {
                    kind: ExprKind::Call {
                        target: CallTarget::Intrinsic {
                            name: "abs".to_string(),
                        },
                        args: vec![Expr {
                            kind: ExprKind::Var("d".to_string()),
                            ty: "Double".to_string(),
                            span: Span::new(0, 8, 9),
                        }],
                    },
                    ty: "Double".to_string(),
                    span: Span::new(0, 8, 12),
                },
            },
            span: Span::new(0, 8, 12),
        });
        let options = TranslateOptions {
            profile: TargetProfile::cs_5_0(),
            entry_point: "main".to_string(),
        };
        let err = translate_with_options(&kernel, &options).unwrap_err();
        assert_eq!(err.len(), 2);
        assert_eq!(err[0].severity, Severity::Error);
        assert_eq!(err[1].code, DiagCode::PrecisionWarning);
    }

    #[test]
    fn test_custom_entry_point() {
        let options = TranslateOptions {
            profile: TargetProfile::cs_6_0(),
            entry_point: "scale_kernel".to_string(),
        };
        let t = translate_with_options(&empty_kernel((64, 1, 1)), &options).unwrap();
        assert!(t.source.contains("void scale_kernel(uint3 tid"));
    }

    #[test]
    fn test_source_hash_is_stable() {
        let a = translate(&empty_kernel((64, 1, 1))).unwrap();
        let b = translate(&empty_kernel((64, 1, 1))).unwrap();
        assert_eq!(a.source_hash(), b.source_hash());
        assert_eq!(a.source_hash().len(), 64);
    }

    #[test]
    fn test_translate_all_keeps_order() {
        let kernels = vec![
            empty_kernel((64, 1, 1)),
            empty_kernel((0, 1, 1)),
            empty_kernel((8, 8, 1)),
        ];
        let results = translate_all(&kernels, &TranslateOptions::default());
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }
}
