//! The intrinsic registry: one table mapping (operation name, exact argument
//! shapes) to an HLSL spelling and result shape.
//!
//! The host library declares these operations as one stub method per
//! overload; here the whole enumeration collapses into a data table built by
//! the registration loops in [`table`]. Matching is exact-shape: no coercion
//! between numeric kinds and no scalar→vector broadening. Operations whose
//! HLSL semantics only accept a subset of host shapes (`length` needs width
//! ≥ 2, `cross` needs width 3) simply have no entry for the others.

mod table;

use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::shape::ShapeType;

/// Input-domain metadata an intrinsic exposes, independent of whether the
/// target hardware enforces it at runtime.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Domain {
    /// Inputs limited to `[lo, hi]`, component-wise.
    ClosedInterval(f64, f64),
    NonNegative,
    Positive,
    NonZero,
}

/// One resolved intrinsic overload.
#[derive(Clone, Debug)]
pub struct IntrinsicSig {
    /// HLSL spelling of the call.
    pub hlsl_name: &'static str,
    /// Result shape; `None` for void (multi-output intrinsics return through
    /// their out parameters).
    pub result: Option<ShapeType>,
    /// Restricted input domain, if the operation has one.
    pub domain: Option<Domain>,
    /// Positions within the argument list that are `out` parameters.
    pub out_params: Vec<usize>,
    /// True for double-precision entries; triggers a `PrecisionWarning` on
    /// profiles with reduced double guarantees.
    pub needs_double: bool,
}

impl IntrinsicSig {
    pub fn has_outputs(&self) -> bool {
        !self.out_params.is_empty()
    }
}

type Key = (String, Vec<ShapeType>);

/// The process-wide intrinsic table. Read-only after initialization; safe
/// for unsynchronized concurrent reads.
pub struct IntrinsicRegistry {
    entries: BTreeMap<Key, IntrinsicSig>,
}

impl IntrinsicRegistry {
    /// The shared registry, built once per process.
    pub fn global() -> &'static IntrinsicRegistry {
        static REGISTRY: OnceLock<IntrinsicRegistry> = OnceLock::new();
        REGISTRY.get_or_init(|| {
            let mut reg = IntrinsicRegistry {
                entries: BTreeMap::new(),
            };
            table::populate(&mut reg);
            reg
        })
    }

    /// Exact-match overload resolution. Never panics; a miss is reported by
    /// the caller as a diagnostic tied to the call site.
    pub fn lookup(&self, name: &str, args: &[ShapeType]) -> Option<&IntrinsicSig> {
        self.entries.get(&(name.to_string(), args.to_vec()))
    }

    /// Number of registered overloads.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn insert(&mut self, name: &str, args: Vec<ShapeType>, sig: IntrinsicSig) {
        let prev = self.entries.insert((name.to_string(), args), sig);
        debug_assert!(prev.is_none(), "duplicate intrinsic entry for '{}'", name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::ScalarKind;

    fn fvec(w: u8) -> ShapeType {
        ShapeType::vector(ScalarKind::Float, w).unwrap()
    }

    fn fmat(r: u8, c: u8) -> ShapeType {
        ShapeType::matrix(ScalarKind::Float, r, c).unwrap()
    }

    #[test]
    fn test_lookup_is_deterministic() {
        let reg = IntrinsicRegistry::global();
        let args = [fvec(4)];
        let a = reg.lookup("abs", &args).unwrap();
        let b = reg.lookup("abs", &args).unwrap();
        assert_eq!(a.hlsl_name, b.hlsl_name);
        assert_eq!(a.result, b.result);
    }

    #[test]
    fn test_abs_float4_resolves_to_float4() {
        let reg = IntrinsicRegistry::global();
        let sig = reg.lookup("abs", &[fvec(4)]).unwrap();
        assert_eq!(sig.hlsl_name, "abs");
        assert_eq!(sig.result, Some(fvec(4)));
    }

    #[test]
    fn test_no_kind_coercion() {
        let reg = IntrinsicRegistry::global();
        // sqrt exists for float but has no int overload to widen into
        assert!(reg
            .lookup("sqrt", &[ShapeType::Scalar(ScalarKind::Float)])
            .is_some());
        assert!(reg
            .lookup("sqrt", &[ShapeType::Scalar(ScalarKind::Int)])
            .is_none());
    }

    #[test]
    fn test_no_scalar_to_vector_broadening() {
        let reg = IntrinsicRegistry::global();
        let scalar = ShapeType::Scalar(ScalarKind::Float);
        // dot is vector-only; a scalar argument must not widen
        assert!(reg.lookup("dot", &[scalar.clone(), scalar]).is_none());
        assert!(reg.lookup("dot", &[fvec(3), fvec(3)]).is_some());
    }

    #[test]
    fn test_length_rejects_width_one() {
        let reg = IntrinsicRegistry::global();
        assert!(reg.lookup("length", &[fvec(1)]).is_none());
        assert!(reg.lookup("length", &[fvec(2)]).is_some());
        assert!(reg
            .lookup("length", &[ShapeType::Scalar(ScalarKind::Float)])
            .is_none());
    }

    #[test]
    fn test_cross_is_width_three_only() {
        let reg = IntrinsicRegistry::global();
        assert!(reg.lookup("cross", &[fvec(3), fvec(3)]).is_some());
        assert!(reg.lookup("cross", &[fvec(2), fvec(2)]).is_none());
        assert!(reg.lookup("cross", &[fvec(4), fvec(4)]).is_none());
    }

    #[test]
    fn test_mul_is_parameter_order_sensitive() {
        let reg = IntrinsicRegistry::global();
        let mv = reg.lookup("mul", &[fmat(4, 4), fvec(4)]).unwrap();
        let vm = reg.lookup("mul", &[fvec(4), fmat(4, 4)]).unwrap();
        assert_eq!(mv.result, Some(fvec(4)));
        assert_eq!(vm.result, Some(fvec(4)));
        // A non-square case proves neither direction auto-transposes.
        let mv2 = reg.lookup("mul", &[fmat(2, 3), fvec(3)]).unwrap();
        assert_eq!(mv2.result, Some(fvec(2)));
        assert!(reg.lookup("mul", &[fmat(2, 3), fvec(2)]).is_none());
        assert!(reg.lookup("mul", &[fvec(3), fmat(2, 3)]).is_none());
        let vm2 = reg.lookup("mul", &[fvec(2), fmat(2, 3)]).unwrap();
        assert_eq!(vm2.result, Some(fvec(3)));
    }

    #[test]
    fn test_mul_matrix_matrix_inner_dims() {
        let reg = IntrinsicRegistry::global();
        let mm = reg.lookup("mul", &[fmat(2, 3), fmat(3, 4)]).unwrap();
        assert_eq!(mm.result, Some(fmat(2, 4)));
        assert!(reg.lookup("mul", &[fmat(2, 3), fmat(2, 3)]).is_none());
    }

    #[test]
    fn test_transpose_swaps_dims() {
        let reg = IntrinsicRegistry::global();
        let sig = reg.lookup("transpose", &[fmat(2, 3)]).unwrap();
        assert_eq!(sig.result, Some(fmat(3, 2)));
    }

    #[test]
    fn test_determinant_square_only() {
        let reg = IntrinsicRegistry::global();
        let sig = reg.lookup("determinant", &[fmat(3, 3)]).unwrap();
        assert_eq!(sig.result, Some(ShapeType::Scalar(ScalarKind::Float)));
        assert!(reg.lookup("determinant", &[fmat(2, 3)]).is_none());
    }

    #[test]
    fn test_acos_exposes_domain_metadata() {
        let reg = IntrinsicRegistry::global();
        let sig = reg
            .lookup("acos", &[ShapeType::Scalar(ScalarKind::Float)])
            .unwrap();
        assert_eq!(sig.domain, Some(Domain::ClosedInterval(-1.0, 1.0)));
    }

    #[test]
    fn test_sqrt_domain_nonnegative() {
        let reg = IntrinsicRegistry::global();
        let sig = reg.lookup("sqrt", &[fvec(2)]).unwrap();
        assert_eq!(sig.domain, Some(Domain::NonNegative));
    }

    #[test]
    fn test_sincos_declares_output_positions() {
        let reg = IntrinsicRegistry::global();
        let f = ShapeType::Scalar(ScalarKind::Float);
        let sig = reg
            .lookup("sincos", &[f.clone(), f.clone(), f.clone()])
            .unwrap();
        assert_eq!(sig.out_params, vec![1, 2]);
        assert_eq!(sig.result, None);
        assert!(sig.has_outputs());
    }

    #[test]
    fn test_frexp_mixes_result_and_output() {
        let reg = IntrinsicRegistry::global();
        let f = fvec(3);
        let sig = reg.lookup("frexp", &[f.clone(), f.clone()]).unwrap();
        assert_eq!(sig.out_params, vec![1]);
        assert_eq!(sig.result, Some(f));
    }

    #[test]
    fn test_double_entries_flagged() {
        let reg = IntrinsicRegistry::global();
        let d = ShapeType::Scalar(ScalarKind::Double);
        let sig = reg.lookup("abs", &[d]).unwrap();
        assert!(sig.needs_double);
        let f = ShapeType::Scalar(ScalarKind::Float);
        assert!(!reg.lookup("abs", &[f]).unwrap().needs_double);
    }

    #[test]
    fn test_int_abs_exists_uint_abs_does_not() {
        let reg = IntrinsicRegistry::global();
        assert!(reg
            .lookup("abs", &[ShapeType::Scalar(ScalarKind::Int)])
            .is_some());
        assert!(reg
            .lookup("abs", &[ShapeType::Scalar(ScalarKind::Uint)])
            .is_none());
    }

    #[test]
    fn test_bit_ops_uint_only() {
        let reg = IntrinsicRegistry::global();
        assert!(reg
            .lookup("countbits", &[ShapeType::Scalar(ScalarKind::Uint)])
            .is_some());
        assert!(reg
            .lookup("countbits", &[ShapeType::Scalar(ScalarKind::Int)])
            .is_none());
    }

    #[test]
    fn test_registry_is_populated() {
        // Guards against a registration loop silently dropping out.
        assert!(IntrinsicRegistry::global().len() > 400);
    }
}
