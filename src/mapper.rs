//! Bidirectional mapping between host value shapes and HLSL type spellings.
//!
//! `hlsl_spelling` is total and deterministic over every representable
//! `ShapeType`. `shape_of_symbol` resolves the host library's type names;
//! any symbol outside that vocabulary (custom classes, interfaces,
//! collections) is unrepresentable and surfaces as a diagnostic upstream.
//! Row/column orientation passes through verbatim in both directions; a
//! `Float1x4` stays a matrix and never becomes a `Float4`.

use crate::shape::{Access, ResourceKind, ScalarKind, ShapeType};

/// HLSL spelling for a shape, e.g. `float4`, `float2x3`,
/// `RWStructuredBuffer<float4>`.
pub fn hlsl_spelling(shape: &ShapeType) -> String {
    match shape {
        ShapeType::Scalar(k) => k.hlsl_name().to_string(),
        ShapeType::Vector(k, w) => format!("{}{}", k.hlsl_name(), w),
        ShapeType::Matrix(k, r, c) => format!("{}{}x{}", k.hlsl_name(), r, c),
        ShapeType::Resource(kind, element, access) => {
            let template = match (kind, access) {
                (ResourceKind::Buffer, Access::Read) => "StructuredBuffer",
                (ResourceKind::Buffer, Access::ReadWrite) => "RWStructuredBuffer",
                (ResourceKind::Texture2D, Access::Read) => "Texture2D",
                (ResourceKind::Texture2D, Access::ReadWrite) => "RWTexture2D",
                (ResourceKind::Texture3D, Access::Read) => "Texture3D",
                (ResourceKind::Texture3D, Access::ReadWrite) => "RWTexture3D",
            };
            format!("{}<{}>", template, hlsl_spelling(element))
        }
    }
}

/// Inverse of [`hlsl_spelling`] on the representable domain.
pub fn shape_of_spelling(spelling: &str) -> Option<ShapeType> {
    if let Some((template, element)) = split_generic(spelling) {
        let (kind, access) = match template {
            "StructuredBuffer" => (ResourceKind::Buffer, Access::Read),
            "RWStructuredBuffer" => (ResourceKind::Buffer, Access::ReadWrite),
            "Texture2D" => (ResourceKind::Texture2D, Access::Read),
            "RWTexture2D" => (ResourceKind::Texture2D, Access::ReadWrite),
            "Texture3D" => (ResourceKind::Texture3D, Access::Read),
            "RWTexture3D" => (ResourceKind::Texture3D, Access::ReadWrite),
            _ => return None,
        };
        let element = shape_of_spelling(element)?;
        if element.is_resource() {
            return None;
        }
        return Some(ShapeType::resource(kind, element, access));
    }
    parse_numeric(spelling, |k| k.hlsl_name())
}

/// Resolve a host library type symbol (`Float4`, `Int`, `RwBuffer<Float4>`,
/// ...) to its shape. `None` means unrepresentable.
pub fn shape_of_symbol(symbol: &str) -> Option<ShapeType> {
    if let Some((template, element)) = split_generic(symbol) {
        let (kind, access) = match template {
            "ReadBuffer" => (ResourceKind::Buffer, Access::Read),
            "RwBuffer" => (ResourceKind::Buffer, Access::ReadWrite),
            "ReadTexture2D" => (ResourceKind::Texture2D, Access::Read),
            "RwTexture2D" => (ResourceKind::Texture2D, Access::ReadWrite),
            "ReadTexture3D" => (ResourceKind::Texture3D, Access::Read),
            "RwTexture3D" => (ResourceKind::Texture3D, Access::ReadWrite),
            _ => return None,
        };
        let element = shape_of_symbol(element)?;
        if element.is_resource() {
            return None;
        }
        return Some(ShapeType::resource(kind, element, access));
    }
    parse_numeric(symbol, |k| k.host_name())
}

/// `"Prefix<inner>"` -> `("Prefix", "inner")`.
fn split_generic(s: &str) -> Option<(&str, &str)> {
    let open = s.find('<')?;
    if !s.ends_with('>') {
        return None;
    }
    Some((&s[..open], &s[open + 1..s.len() - 1]))
}

/// Parse `kind`, `kindN`, or `kindRxC` where `kind` is named by `name_of`.
fn parse_numeric(s: &str, name_of: fn(&ScalarKind) -> &'static str) -> Option<ShapeType> {
    const KINDS: [ScalarKind; 5] = [
        ScalarKind::Int,
        ScalarKind::Uint,
        ScalarKind::Float,
        ScalarKind::Double,
        ScalarKind::Bool,
    ];
    for kind in KINDS {
        let name = name_of(&kind);
        let Some(rest) = s.strip_prefix(name) else {
            continue;
        };
        if rest.is_empty() {
            return Some(ShapeType::Scalar(kind));
        }
        let dims: Vec<&str> = rest.split('x').collect();
        match dims.as_slice() {
            [w] => {
                let w = parse_dim(w)?;
                return ShapeType::vector(kind, w);
            }
            [r, c] => {
                let r = parse_dim(r)?;
                let c = parse_dim(c)?;
                return ShapeType::matrix(kind, r, c);
            }
            _ => return None,
        }
    }
    None
}

fn parse_dim(s: &str) -> Option<u8> {
    if s.len() != 1 {
        return None;
    }
    match s.as_bytes()[0] {
        b'1' => Some(1),
        b'2' => Some(2),
        b'3' => Some(3),
        b'4' => Some(4),
        _ => None,
    }
}
