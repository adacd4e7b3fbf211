//! Reflected uniform types
//!
//! Raw values use the OpenGL type enumeration reported by program interface
//! queries (`GL_TYPE` property).

/// GPU-side type of a reflected uniform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformType {
    Float,
    UInt,
    Int,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat2x3,
    Mat3x2,
    Mat3,
    Mat4,
    Sampler1D,
    Sampler2D,
    Sampler2DArray,
    SamplerCube,
}

impl UniformType {
    /// Every supported type
    pub const ALL: [UniformType; 15] = [
        UniformType::Float,
        UniformType::UInt,
        UniformType::Int,
        UniformType::Vec2,
        UniformType::Vec3,
        UniformType::Vec4,
        UniformType::Mat2,
        UniformType::Mat2x3,
        UniformType::Mat3x2,
        UniformType::Mat3,
        UniformType::Mat4,
        UniformType::Sampler1D,
        UniformType::Sampler2D,
        UniformType::Sampler2DArray,
        UniformType::SamplerCube,
    ];

    /// Map a raw API type enum, `None` when the type is not in the table
    pub fn from_raw(raw: u32) -> Option<UniformType> {
        let ty = match raw {
            0x1406 => UniformType::Float,
            0x1405 => UniformType::UInt,
            0x1404 => UniformType::Int,
            0x8B50 => UniformType::Vec2,
            0x8B51 => UniformType::Vec3,
            0x8B52 => UniformType::Vec4,
            0x8B5A => UniformType::Mat2,
            0x8B65 => UniformType::Mat2x3,
            0x8B67 => UniformType::Mat3x2,
            0x8B5B => UniformType::Mat3,
            0x8B5C => UniformType::Mat4,
            0x8B5D => UniformType::Sampler1D,
            0x8B5E => UniformType::Sampler2D,
            0x8DC1 => UniformType::Sampler2DArray,
            0x8B60 => UniformType::SamplerCube,
            _ => return None,
        };
        Some(ty)
    }

    /// Raw API type enum
    pub fn raw(self) -> u32 {
        match self {
            UniformType::Float => 0x1406,
            UniformType::UInt => 0x1405,
            UniformType::Int => 0x1404,
            UniformType::Vec2 => 0x8B50,
            UniformType::Vec3 => 0x8B51,
            UniformType::Vec4 => 0x8B52,
            UniformType::Mat2 => 0x8B5A,
            UniformType::Mat2x3 => 0x8B65,
            UniformType::Mat3x2 => 0x8B67,
            UniformType::Mat3 => 0x8B5B,
            UniformType::Mat4 => 0x8B5C,
            UniformType::Sampler1D => 0x8B5D,
            UniformType::Sampler2D => 0x8B5E,
            UniformType::Sampler2DArray => 0x8DC1,
            UniformType::SamplerCube => 0x8B60,
        }
    }

    /// Byte size of one tightly packed matrix column, `None` for non-matrix types
    ///
    /// GLSL `matCxR` has C columns of R floats.
    pub fn packed_column_size(self) -> Option<u32> {
        match self {
            UniformType::Mat2 | UniformType::Mat3x2 => Some(8),
            UniformType::Mat3 | UniformType::Mat2x3 => Some(12),
            UniformType::Mat4 => Some(16),
            _ => None,
        }
    }

    /// Size in bytes of a single element
    pub fn size_bytes(self) -> u32 {
        match self {
            UniformType::Float
            | UniformType::UInt
            | UniformType::Int
            | UniformType::Sampler1D
            | UniformType::Sampler2D
            | UniformType::Sampler2DArray
            | UniformType::SamplerCube => 4,
            UniformType::Vec2 => 8,
            UniformType::Vec3 => 12,
            UniformType::Vec4 | UniformType::Mat2 => 16,
            UniformType::Mat2x3 | UniformType::Mat3x2 => 24,
            UniformType::Mat3 => 36,
            UniformType::Mat4 => 64,
        }
    }

    pub fn is_matrix(self) -> bool {
        matches!(
            self,
            UniformType::Mat2
                | UniformType::Mat2x3
                | UniformType::Mat3x2
                | UniformType::Mat3
                | UniformType::Mat4
        )
    }

    pub fn is_sampler(self) -> bool {
        matches!(
            self,
            UniformType::Sampler1D
                | UniformType::Sampler2D
                | UniformType::Sampler2DArray
                | UniformType::SamplerCube
        )
    }
}

#[cfg(test)]
#[path = "uniform_type_tests.rs"]
mod tests;
