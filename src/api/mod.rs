//! Public entry points: target profiles, translation options, and the
//! translation result handed back to the host runtime.

mod pipeline;

pub use pipeline::{translate, translate_all, translate_with_options};

use serde::Serialize;

use crate::binding::BindingManifest;
use crate::diagnostic::Diagnostic;

/// The compute target the generated source is compiled for.
#[derive(Clone, Debug)]
pub struct TargetProfile {
    pub name: &'static str,
    pub shader_model: (u8, u8),
    /// False on profiles where double-precision operations carry reduced
    /// guarantees; double intrinsics then raise a `PrecisionWarning`.
    pub full_double_precision: bool,
}

impl TargetProfile {
    /// Shader model 5.0 compute. Doubles are optional hardware there.
    pub fn cs_5_0() -> Self {
        Self {
            name: "cs_5_0",
            shader_model: (5, 0),
            full_double_precision: false,
        }
    }

    /// Shader model 6.0 compute.
    pub fn cs_6_0() -> Self {
        Self {
            name: "cs_6_0",
            shader_model: (6, 0),
            full_double_precision: true,
        }
    }
}

/// Per-call translation settings.
#[derive(Clone, Debug)]
pub struct TranslateOptions {
    pub profile: TargetProfile,
    /// Name of the generated entry function.
    pub entry_point: String,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            profile: TargetProfile::cs_6_0(),
            entry_point: "main".to_string(),
        }
    }
}

/// A successful translation: the HLSL source, the binding manifest the
/// runtime dispatches with, and any non-blocking warnings.
#[derive(Clone, Debug, Serialize)]
pub struct Translation {
    pub source: String,
    pub manifest: BindingManifest,
    pub warnings: Vec<Diagnostic>,
}

impl Translation {
    /// Content hash of the generated source, suitable as a pipeline-cache
    /// key. Stable across processes and platforms.
    pub fn source_hash(&self) -> String {
        blake3::hash(self.source.as_bytes()).to_hex().to_string()
    }
}
