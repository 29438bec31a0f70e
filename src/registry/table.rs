//! Registration loops that build the intrinsic table.
//!
//! The host library spells every overload out as its own stub declaration;
//! here each family is one loop over kind × width × dims. Adding an
//! intrinsic means adding one registration call, not a grid of stubs.

use crate::shape::{ScalarKind, ShapeType};

use super::{Domain, IntrinsicRegistry, IntrinsicSig};

fn sig(hlsl_name: &'static str, result: ShapeType) -> IntrinsicSig {
    IntrinsicSig {
        hlsl_name,
        result: Some(result),
        domain: None,
        out_params: Vec::new(),
        needs_double: false,
    }
}

/// Scalar plus vector widths 1..=4 for one kind.
fn scalar_and_vectors(kind: ScalarKind) -> Vec<ShapeType> {
    let mut shapes = vec![ShapeType::Scalar(kind)];
    for w in 1..=4 {
        shapes.push(ShapeType::Vector(kind, w));
    }
    shapes
}

/// Vector widths 2..=4 (operations that need a real direction/extent).
fn wide_vectors(kind: ScalarKind) -> Vec<ShapeType> {
    (2..=4).map(|w| ShapeType::Vector(kind, w)).collect()
}

pub(super) fn populate(reg: &mut IntrinsicRegistry) {
    register_float_componentwise(reg);
    register_float_domains(reg);
    register_vector_geometry(reg);
    register_matrix_algebra(reg);
    register_integer_math(reg);
    register_bit_ops(reg);
    register_reinterpret(reg);
    register_double_subset(reg);
    register_multi_output(reg);
}

/// Component-wise float math, same result shape as the input.
fn register_float_componentwise(reg: &mut IntrinsicRegistry) {
    const UNARY: &[&str] = &[
        "abs", "floor", "ceil", "round", "trunc", "frac", "saturate", "exp", "exp2", "sin", "cos",
        "tan", "atan", "sinh", "cosh", "tanh",
    ];
    const BINARY: &[&str] = &["min", "max", "pow", "atan2", "fmod", "step"];
    const TERNARY: &[&str] = &["clamp", "lerp", "smoothstep", "mad"];

    for shape in scalar_and_vectors(ScalarKind::Float) {
        for name in UNARY {
            reg.insert(name, vec![shape.clone()], sig(name, shape.clone()));
        }
        for name in BINARY {
            reg.insert(
                name,
                vec![shape.clone(), shape.clone()],
                sig(name, shape.clone()),
            );
        }
        for name in TERNARY {
            reg.insert(
                name,
                vec![shape.clone(), shape.clone(), shape.clone()],
                sig(name, shape.clone()),
            );
        }
        // sign returns int of the same dimensions
        let int_result = match &shape {
            ShapeType::Scalar(_) => ShapeType::Scalar(ScalarKind::Int),
            ShapeType::Vector(_, w) => ShapeType::Vector(ScalarKind::Int, *w),
            _ => unreachable!(),
        };
        reg.insert("sign", vec![shape.clone()], sig("sign", int_result));
    }
}

/// Float operations carrying restricted-domain metadata.
fn register_float_domains(reg: &mut IntrinsicRegistry) {
    for shape in scalar_and_vectors(ScalarKind::Float) {
        let entries: [(&'static str, Domain); 7] = [
            ("sqrt", Domain::NonNegative),
            ("rsqrt", Domain::Positive),
            ("rcp", Domain::NonZero),
            ("log", Domain::Positive),
            ("log2", Domain::Positive),
            ("asin", Domain::ClosedInterval(-1.0, 1.0)),
            ("acos", Domain::ClosedInterval(-1.0, 1.0)),
        ];
        for (name, domain) in entries {
            let mut s = sig(name, shape.clone());
            s.domain = Some(domain);
            reg.insert(name, vec![shape.clone()], s);
        }
    }
}

/// Geometry over float vectors of width >= 2. Narrower shapes are
/// out-of-domain and must miss, never widen.
fn register_vector_geometry(reg: &mut IntrinsicRegistry) {
    let scalar = ShapeType::Scalar(ScalarKind::Float);
    for v in wide_vectors(ScalarKind::Float) {
        reg.insert("length", vec![v.clone()], sig("length", scalar.clone()));
        reg.insert(
            "distance",
            vec![v.clone(), v.clone()],
            sig("distance", scalar.clone()),
        );
        reg.insert("dot", vec![v.clone(), v.clone()], sig("dot", scalar.clone()));
        let mut normalize = sig("normalize", v.clone());
        normalize.domain = Some(Domain::NonZero);
        reg.insert("normalize", vec![v.clone()], normalize);
        reg.insert(
            "reflect",
            vec![v.clone(), v.clone()],
            sig("reflect", v.clone()),
        );
        reg.insert(
            "refract",
            vec![v.clone(), v.clone(), scalar.clone()],
            sig("refract", v.clone()),
        );
    }
    let v3 = ShapeType::Vector(ScalarKind::Float, 3);
    reg.insert("cross", vec![v3.clone(), v3.clone()], sig("cross", v3));
}

/// Linear-algebra multiply and matrix shape operations. `mul` lookup is
/// parameter-order-sensitive; there is no auto-transpose.
fn register_matrix_algebra(reg: &mut IntrinsicRegistry) {
    let k = ScalarKind::Float;

    // mat(r×i) * mat(i×c) -> mat(r×c)
    for r in 1..=4u8 {
        for i in 1..=4u8 {
            for c in 1..=4u8 {
                reg.insert(
                    "mul",
                    vec![ShapeType::Matrix(k, r, i), ShapeType::Matrix(k, i, c)],
                    sig("mul", ShapeType::Matrix(k, r, c)),
                );
            }
        }
    }

    // mat(r×c) * vec(c) -> vec(r), and vec(r) * mat(r×c) -> vec(c)
    for r in 1..=4u8 {
        for c in 1..=4u8 {
            reg.insert(
                "mul",
                vec![ShapeType::Matrix(k, r, c), ShapeType::Vector(k, c)],
                sig("mul", ShapeType::Vector(k, r)),
            );
            reg.insert(
                "mul",
                vec![ShapeType::Vector(k, r), ShapeType::Matrix(k, r, c)],
                sig("mul", ShapeType::Vector(k, c)),
            );
        }
    }

    for r in 1..=4u8 {
        for c in 1..=4u8 {
            reg.insert(
                "transpose",
                vec![ShapeType::Matrix(k, r, c)],
                sig("transpose", ShapeType::Matrix(k, c, r)),
            );
        }
    }

    for n in 1..=4u8 {
        reg.insert(
            "determinant",
            vec![ShapeType::Matrix(k, n, n)],
            sig("determinant", ShapeType::Scalar(k)),
        );
    }
}

fn register_integer_math(reg: &mut IntrinsicRegistry) {
    // abs is signed-only; an unsigned abs would be the identity and the
    // host library does not declare one.
    for shape in scalar_and_vectors(ScalarKind::Int) {
        reg.insert("abs", vec![shape.clone()], sig("abs", shape.clone()));
    }
    for kind in [ScalarKind::Int, ScalarKind::Uint] {
        for shape in scalar_and_vectors(kind) {
            for name in ["min", "max"] {
                reg.insert(
                    name,
                    vec![shape.clone(), shape.clone()],
                    sig(name, shape.clone()),
                );
            }
            reg.insert(
                "clamp",
                vec![shape.clone(), shape.clone(), shape.clone()],
                sig("clamp", shape.clone()),
            );
        }
    }
}

fn register_bit_ops(reg: &mut IntrinsicRegistry) {
    const OPS: &[&str] = &["countbits", "reversebits", "firstbithigh", "firstbitlow"];
    for shape in scalar_and_vectors(ScalarKind::Uint) {
        for name in OPS {
            reg.insert(name, vec![shape.clone()], sig(name, shape.clone()));
        }
    }
}

/// Bit-pattern reinterpretation between 32-bit kinds.
fn register_reinterpret(reg: &mut IntrinsicRegistry) {
    let families: [(&'static str, ScalarKind, [ScalarKind; 2]); 3] = [
        ("asfloat", ScalarKind::Float, [ScalarKind::Int, ScalarKind::Uint]),
        ("asint", ScalarKind::Int, [ScalarKind::Float, ScalarKind::Uint]),
        ("asuint", ScalarKind::Uint, [ScalarKind::Float, ScalarKind::Int]),
    ];
    for (name, to, froms) in families {
        for from in froms {
            reg.insert(
                name,
                vec![ShapeType::Scalar(from)],
                sig(name, ShapeType::Scalar(to)),
            );
            for w in 1..=4 {
                reg.insert(
                    name,
                    vec![ShapeType::Vector(from, w)],
                    sig(name, ShapeType::Vector(to, w)),
                );
            }
        }
    }
}

/// The double-precision subset guaranteed across profiles. Flagged so a
/// reduced-precision profile can warn.
fn register_double_subset(reg: &mut IntrinsicRegistry) {
    for shape in scalar_and_vectors(ScalarKind::Double) {
        let mut abs = sig("abs", shape.clone());
        abs.needs_double = true;
        reg.insert("abs", vec![shape.clone()], abs);

        for name in ["min", "max"] {
            let mut s = sig(name, shape.clone());
            s.needs_double = true;
            reg.insert(name, vec![shape.clone(), shape.clone()], s);
        }
        let mut clamp = sig("clamp", shape.clone());
        clamp.needs_double = true;
        reg.insert(
            "clamp",
            vec![shape.clone(), shape.clone(), shape.clone()],
            clamp,
        );
    }
}

/// Intrinsics with explicit output parameters. The rewriter lowers call
/// sites into sequential statements with HLSL `out` arguments.
fn register_multi_output(reg: &mut IntrinsicRegistry) {
    for shape in scalar_and_vectors(ScalarKind::Float) {
        // sincos(x, out s, out c)
        reg.insert(
            "sincos",
            vec![shape.clone(), shape.clone(), shape.clone()],
            IntrinsicSig {
                hlsl_name: "sincos",
                result: None,
                domain: None,
                out_params: vec![1, 2],
                needs_double: false,
            },
        );
        // frexp(x, out exponent) -> mantissa
        reg.insert(
            "frexp",
            vec![shape.clone(), shape.clone()],
            IntrinsicSig {
                hlsl_name: "frexp",
                result: Some(shape.clone()),
                domain: None,
                out_params: vec![1],
                needs_double: false,
            },
        );
        // modf(x, out integer_part) -> fractional part
        reg.insert(
            "modf",
            vec![shape.clone(), shape.clone()],
            IntrinsicSig {
                hlsl_name: "modf",
                result: Some(shape.clone()),
                domain: None,
                out_params: vec![1],
                needs_double: false,
            },
        );
    }
}
