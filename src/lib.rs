//! kernelc translates a constrained host compute-kernel representation into
//! HLSL compute-shader source at host-compile time.
//!
//! A frontend hands over a typed kernel tree ([`hir::KernelSource`]); the
//! pipeline assigns binding slots from capture declaration order, inlines
//! kernel-local helpers, resolves every operator and math call against the
//! intrinsic registry, and prints deterministic HLSL. Translation either
//! yields a [`Translation`] (source, binding manifest, warnings) or the full
//! list of diagnostics; it never panics on malformed input and never emits
//! partial source.
//!
//! Determinism is load-bearing: the same kernel always produces
//! byte-identical source and an identical manifest, so the runtime can key
//! its pipeline cache on [`Translation::source_hash`].

pub mod api;
pub mod binding;
pub mod diagnostic;
pub mod hir;
pub mod mapper;
pub mod registry;
pub mod shape;
pub mod span;

mod emit;
mod rewrite;

pub use api::{
    translate, translate_all, translate_with_options, TargetProfile, TranslateOptions,
    Translation,
};
pub use diagnostic::{render_diagnostics, DiagCode, Diagnostic, Diagnostics, Severity};
pub use shape::{Access, ResourceKind, ScalarKind, ShapeType};
pub use span::Span;
