//! Resource binding analysis: assigns stable, declaration-ordered slots to a
//! kernel's captured buffers, textures, and constants.
//!
//! Slot assignment is a pure function of declaration order — the body is
//! never consulted — so re-translating an unchanged kernel signature always
//! produces the same slots. The external runtime relies on this for its
//! pipeline-state cache.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::diagnostic::{DiagCode, Diagnostics};
use crate::hir::KernelSource;
use crate::mapper;
use crate::shape::{Access, ResourceKind, ShapeType};

/// HLSL register class a slot binds into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RegisterClass {
    /// `t` registers (read-only views).
    ShaderResource,
    /// `u` registers (read-write views).
    UnorderedAccess,
    /// `b` registers (the implicit constant block).
    ConstantBuffer,
}

impl RegisterClass {
    pub fn prefix(&self) -> char {
        match self {
            RegisterClass::ShaderResource => 't',
            RegisterClass::UnorderedAccess => 'u',
            RegisterClass::ConstantBuffer => 'b',
        }
    }
}

/// A numbered resource location the GPU pipeline uses at dispatch time.
#[derive(Clone, Debug, Serialize)]
pub struct BindingSlot {
    pub index: u32,
    pub register_class: RegisterClass,
    pub kind: ResourceKind,
    pub element: ShapeType,
    pub access: Access,
    pub name: String,
}

/// One scalar/vector/matrix constant packed into the implicit cbuffer.
#[derive(Clone, Debug, Serialize)]
pub struct ConstantField {
    pub name: String,
    pub shape: ShapeType,
    pub byte_offset: u32,
}

/// The implicit constant block: declaration order preserved, 16-byte
/// register packing, no reordering for packing efficiency.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ConstantBlock {
    pub fields: Vec<ConstantField>,
    pub byte_size: u32,
}

impl ConstantBlock {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Everything the external runtime needs to bind a dispatch: ordered slots,
/// constant layout, and the declared thread-group dimensions.
#[derive(Clone, Debug, Serialize)]
pub struct BindingManifest {
    pub thread_group: (u32, u32, u32),
    pub slots: Vec<BindingSlot>,
    pub constants: ConstantBlock,
}

/// Analysis output: the manifest plus the capture shapes the rewriter seeds
/// its scope with.
pub struct BindingAnalysis {
    pub manifest: BindingManifest,
    pub capture_shapes: BTreeMap<String, ShapeType>,
}

/// Walk captures in declaration order and assign slots. Unrepresentable
/// captures and conflicting access modes produce diagnostics; analysis
/// continues so one attempt reports as many issues as possible.
pub fn analyze(kernel: &KernelSource, diags: &mut Diagnostics) -> BindingAnalysis {
    let mut slots = Vec::new();
    let mut constants = ConstantBlock::default();
    let mut capture_shapes = BTreeMap::new();
    let mut seen: BTreeMap<&str, Access> = BTreeMap::new();
    let mut next_srv = 0u32;
    let mut next_uav = 0u32;
    let mut cursor = 0u32;

    for capture in &kernel.captures {
        let Some(shape) = mapper::shape_of_symbol(&capture.host_type) else {
            diags.push(
                crate::diagnostic::Diagnostic::error(
                    DiagCode::UnrepresentableType,
                    format!(
                        "captured field '{}' has type '{}', which has no GPU representation",
                        capture.name, capture.host_type
                    ),
                    capture.span,
                )
                .with_help(
                    "capture scalar/vector/matrix values or ReadBuffer/RwBuffer/texture views"
                        .to_string(),
                ),
            );
            continue;
        };

        match &shape {
            ShapeType::Resource(kind, element, access) => {
                if let Some(prev_access) = seen.get(capture.name.as_str()) {
                    let message = if *prev_access != *access {
                        format!(
                            "resource '{}' is captured under two conflicting access modes",
                            capture.name
                        )
                    } else {
                        format!("resource '{}' is captured twice", capture.name)
                    };
                    diags.error(DiagCode::BindingConflict, message, capture.span);
                    continue;
                }
                seen.insert(capture.name.as_str(), *access);

                let (register_class, index) = match access {
                    Access::Read => {
                        let i = next_srv;
                        next_srv += 1;
                        (RegisterClass::ShaderResource, i)
                    }
                    Access::ReadWrite => {
                        let i = next_uav;
                        next_uav += 1;
                        (RegisterClass::UnorderedAccess, i)
                    }
                };
                slots.push(BindingSlot {
                    index,
                    register_class,
                    kind: *kind,
                    element: (**element).clone(),
                    access: *access,
                    name: capture.name.clone(),
                });
                capture_shapes.insert(capture.name.clone(), shape);
            }
            _ => {
                // Plain value: packed into the implicit constant block.
                let size = shape
                    .byte_size()
                    .unwrap_or(0);
                let offset = pack_offset(cursor, size);
                cursor = offset + size;
                constants.fields.push(ConstantField {
                    name: capture.name.clone(),
                    shape: shape.clone(),
                    byte_offset: offset,
                });
                capture_shapes.insert(capture.name.clone(), shape);
            }
        }
    }

    constants.byte_size = round_up_16(cursor);

    BindingAnalysis {
        manifest: BindingManifest {
            thread_group: kernel.thread_group,
            slots,
            constants,
        },
        capture_shapes,
    }
}

/// cbuffer placement: a field never straddles a 16-byte register boundary,
/// and anything wider than a register starts on one.
fn pack_offset(cursor: u32, size: u32) -> u32 {
    if size > 16 {
        return round_up_16(cursor);
    }
    let within = cursor % 16;
    if within != 0 && within + size > 16 {
        round_up_16(cursor)
    } else {
        cursor
    }
}

fn round_up_16(n: u32) -> u32 {
    (n + 15) & !15
}
