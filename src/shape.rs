use serde::Serialize;

/// Numeric kind of a scalar component.
///
/// Kinds never coerce into one another: an `Int` overload and a `Float`
/// overload of the same operation are distinct registry entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ScalarKind {
    Int,
    Uint,
    Float,
    Double,
    Bool,
}

impl ScalarKind {
    /// HLSL component type name.
    pub fn hlsl_name(&self) -> &'static str {
        match self {
            ScalarKind::Int => "int",
            ScalarKind::Uint => "uint",
            ScalarKind::Float => "float",
            ScalarKind::Double => "double",
            ScalarKind::Bool => "bool",
        }
    }

    /// Host library type name (`Float`, `Int`, ...).
    pub fn host_name(&self) -> &'static str {
        match self {
            ScalarKind::Int => "Int",
            ScalarKind::Uint => "Uint",
            ScalarKind::Float => "Float",
            ScalarKind::Double => "Double",
            ScalarKind::Bool => "Bool",
        }
    }

    /// Component size in bytes, as laid out in a constant buffer.
    pub fn byte_size(&self) -> u32 {
        match self {
            ScalarKind::Double => 8,
            _ => 4,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, ScalarKind::Int | ScalarKind::Uint)
    }

    pub fn is_floating(&self) -> bool {
        matches!(self, ScalarKind::Float | ScalarKind::Double)
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, ScalarKind::Bool)
    }
}

/// Access mode of a captured resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Access {
    Read,
    ReadWrite,
}

/// Kind of GPU resource a kernel can capture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ResourceKind {
    Buffer,
    Texture2D,
    Texture3D,
}

impl ResourceKind {
    pub fn display(&self) -> &'static str {
        match self {
            ResourceKind::Buffer => "buffer",
            ResourceKind::Texture2D => "texture2d",
            ResourceKind::Texture3D => "texture3d",
        }
    }
}

/// Canonical descriptor of a value's numeric kind and dimensionality.
///
/// Vector widths and matrix dimensions are always in 1..=4. Matrices are
/// named row×col and the orientation is never silently transposed; a 1×N
/// matrix is a different type from a vector of length N.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ShapeType {
    Scalar(ScalarKind),
    Vector(ScalarKind, u8),
    Matrix(ScalarKind, u8, u8),
    Resource(ResourceKind, Box<ShapeType>, Access),
}

impl ShapeType {
    pub fn scalar(kind: ScalarKind) -> Self {
        ShapeType::Scalar(kind)
    }

    /// A vector shape; width must be in 1..=4.
    pub fn vector(kind: ScalarKind, width: u8) -> Option<Self> {
        if (1..=4).contains(&width) {
            Some(ShapeType::Vector(kind, width))
        } else {
            None
        }
    }

    /// A matrix shape; rows and cols must each be in 1..=4.
    pub fn matrix(kind: ScalarKind, rows: u8, cols: u8) -> Option<Self> {
        if (1..=4).contains(&rows) && (1..=4).contains(&cols) {
            Some(ShapeType::Matrix(kind, rows, cols))
        } else {
            None
        }
    }

    pub fn resource(kind: ResourceKind, element: ShapeType, access: Access) -> Self {
        ShapeType::Resource(kind, Box::new(element), access)
    }

    /// Component kind, or the element's component kind for resources.
    pub fn component_kind(&self) -> ScalarKind {
        match self {
            ShapeType::Scalar(k) | ShapeType::Vector(k, _) | ShapeType::Matrix(k, _, _) => *k,
            ShapeType::Resource(_, element, _) => element.component_kind(),
        }
    }

    /// Number of scalar components (resources have no component count).
    pub fn component_count(&self) -> Option<u32> {
        match self {
            ShapeType::Scalar(_) => Some(1),
            ShapeType::Vector(_, w) => Some(*w as u32),
            ShapeType::Matrix(_, r, c) => Some(*r as u32 * *c as u32),
            ShapeType::Resource(..) => None,
        }
    }

    pub fn is_resource(&self) -> bool {
        matches!(self, ShapeType::Resource(..))
    }

    /// True for scalar/vector/matrix values (anything bindable into a cbuffer).
    pub fn is_plain_value(&self) -> bool {
        !self.is_resource()
    }

    pub fn is_scalar_of(&self, kind: ScalarKind) -> bool {
        matches!(self, ShapeType::Scalar(k) if *k == kind)
    }

    /// Byte size in constant-buffer layout. A matrix occupies one 16-byte
    /// register per row except the last, which is trimmed to its columns.
    pub fn byte_size(&self) -> Option<u32> {
        let elem = self.component_kind().byte_size();
        match self {
            ShapeType::Scalar(_) => Some(elem),
            ShapeType::Vector(_, w) => Some(*w as u32 * elem),
            ShapeType::Matrix(_, r, c) => Some((*r as u32 - 1) * 16 + *c as u32 * elem),
            ShapeType::Resource(..) => None,
        }
    }

    /// Host-facing display name, e.g. `Float4`, `Float4x3`, `RwBuffer<Float4>`.
    pub fn display(&self) -> String {
        match self {
            ShapeType::Scalar(k) => k.host_name().to_string(),
            ShapeType::Vector(k, w) => format!("{}{}", k.host_name(), w),
            ShapeType::Matrix(k, r, c) => format!("{}{}x{}", k.host_name(), r, c),
            ShapeType::Resource(rk, element, access) => {
                let prefix = match (rk, access) {
                    (ResourceKind::Buffer, Access::Read) => "ReadBuffer",
                    (ResourceKind::Buffer, Access::ReadWrite) => "RwBuffer",
                    (ResourceKind::Texture2D, Access::Read) => "ReadTexture2D",
                    (ResourceKind::Texture2D, Access::ReadWrite) => "RwTexture2D",
                    (ResourceKind::Texture3D, Access::Read) => "ReadTexture3D",
                    (ResourceKind::Texture3D, Access::ReadWrite) => "RwTexture3D",
                };
                format!("{}<{}>", prefix, element.display())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_width_bounds() {
        assert!(ShapeType::vector(ScalarKind::Float, 0).is_none());
        assert!(ShapeType::vector(ScalarKind::Float, 5).is_none());
        for w in 1..=4 {
            assert!(ShapeType::vector(ScalarKind::Float, w).is_some());
        }
    }

    #[test]
    fn test_matrix_dim_bounds() {
        assert!(ShapeType::matrix(ScalarKind::Float, 0, 2).is_none());
        assert!(ShapeType::matrix(ScalarKind::Float, 2, 5).is_none());
        assert!(ShapeType::matrix(ScalarKind::Float, 4, 4).is_some());
    }

    #[test]
    fn test_matrix_not_a_vector() {
        let row = ShapeType::matrix(ScalarKind::Float, 1, 4).unwrap();
        let vec = ShapeType::vector(ScalarKind::Float, 4).unwrap();
        assert_ne!(row, vec);
        let col = ShapeType::matrix(ScalarKind::Float, 4, 1).unwrap();
        assert_ne!(col, vec);
        assert_ne!(col, row);
    }

    #[test]
    fn test_cbuffer_byte_sizes() {
        assert_eq!(ShapeType::Scalar(ScalarKind::Float).byte_size(), Some(4));
        assert_eq!(ShapeType::Scalar(ScalarKind::Double).byte_size(), Some(8));
        assert_eq!(
            ShapeType::vector(ScalarKind::Float, 3).unwrap().byte_size(),
            Some(12)
        );
        // 4x4: three padded rows + one trimmed row
        assert_eq!(
            ShapeType::matrix(ScalarKind::Float, 4, 4)
                .unwrap()
                .byte_size(),
            Some(64)
        );
        assert_eq!(
            ShapeType::matrix(ScalarKind::Float, 3, 3)
                .unwrap()
                .byte_size(),
            Some(44)
        );
    }

    #[test]
    fn test_display_names() {
        assert_eq!(ShapeType::Scalar(ScalarKind::Float).display(), "Float");
        assert_eq!(
            ShapeType::vector(ScalarKind::Int, 2).unwrap().display(),
            "Int2"
        );
        assert_eq!(
            ShapeType::matrix(ScalarKind::Float, 2, 3).unwrap().display(),
            "Float2x3"
        );
        let buf = ShapeType::resource(
            ResourceKind::Buffer,
            ShapeType::vector(ScalarKind::Float, 4).unwrap(),
            Access::ReadWrite,
        );
        assert_eq!(buf.display(), "RwBuffer<Float4>");
    }
}
