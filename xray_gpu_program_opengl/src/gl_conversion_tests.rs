//! Unit tests for OpenGL enum conversion functions
//!
//! Tests pure conversion functions without requiring a GL context.
//! Validates the mapping between Xray enums and OpenGL enums.

use super::*;

// ============================================================================
// STAGE CONVERSION TESTS
// ============================================================================

#[test]
fn test_stage_to_gl_shader_types() {
    assert_eq!(stage_to_gl(PipelineStage::Vertex), gl::VERTEX_SHADER);
    assert_eq!(stage_to_gl(PipelineStage::TessControl), gl::TESS_CONTROL_SHADER);
    assert_eq!(stage_to_gl(PipelineStage::TessEval), gl::TESS_EVALUATION_SHADER);
    assert_eq!(stage_to_gl(PipelineStage::Geometry), gl::GEOMETRY_SHADER);
    assert_eq!(stage_to_gl(PipelineStage::Fragment), gl::FRAGMENT_SHADER);
    assert_eq!(stage_to_gl(PipelineStage::Compute), gl::COMPUTE_SHADER);
}

#[test]
fn test_stage_flags_to_gl_bits() {
    assert_eq!(stage_flags_to_gl(StageFlags::empty()), 0);
    assert_eq!(stage_flags_to_gl(StageFlags::VERTEX), gl::VERTEX_SHADER_BIT);
    assert_eq!(
        stage_flags_to_gl(StageFlags::VERTEX | StageFlags::FRAGMENT),
        gl::VERTEX_SHADER_BIT | gl::FRAGMENT_SHADER_BIT
    );
    assert_eq!(
        stage_flags_to_gl(StageFlags::TESS_CONTROL | StageFlags::TESS_EVAL | StageFlags::GEOMETRY),
        gl::TESS_CONTROL_SHADER_BIT | gl::TESS_EVALUATION_SHADER_BIT | gl::GEOMETRY_SHADER_BIT
    );
    assert_eq!(stage_flags_to_gl(StageFlags::COMPUTE), gl::COMPUTE_SHADER_BIT);
}

// ============================================================================
// INTERFACE CONVERSION TESTS
// ============================================================================

#[test]
fn test_interface_to_gl_uniform_interfaces() {
    assert_eq!(interface_to_gl(InterfaceKind::UniformBlock), gl::UNIFORM_BLOCK);
    assert_eq!(interface_to_gl(InterfaceKind::Uniform), gl::UNIFORM);
}

#[test]
fn test_interface_to_gl_subroutine_interfaces() {
    assert_eq!(
        interface_to_gl(InterfaceKind::SubroutineUniform(PipelineStage::Vertex)),
        gl::VERTEX_SUBROUTINE_UNIFORM
    );
    assert_eq!(
        interface_to_gl(InterfaceKind::SubroutineUniform(PipelineStage::Fragment)),
        gl::FRAGMENT_SUBROUTINE_UNIFORM
    );
    assert_eq!(
        interface_to_gl(InterfaceKind::Subroutine(PipelineStage::Geometry)),
        gl::GEOMETRY_SUBROUTINE
    );
    assert_eq!(
        interface_to_gl(InterfaceKind::Subroutine(PipelineStage::Compute)),
        gl::COMPUTE_SUBROUTINE
    );
}

#[test]
fn test_interface_to_gl_distinct_per_stage() {
    let mut seen = Vec::new();
    for stage in PipelineStage::ALL {
        seen.push(interface_to_gl(InterfaceKind::SubroutineUniform(stage)));
        seen.push(interface_to_gl(InterfaceKind::Subroutine(stage)));
    }
    let count = seen.len();
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), count);
}

// ============================================================================
// PROPERTY CONVERSION TESTS
// ============================================================================

#[test]
fn test_property_to_gl() {
    assert_eq!(property_to_gl(ResourceProperty::BufferBinding), gl::BUFFER_BINDING);
    assert_eq!(property_to_gl(ResourceProperty::BufferDataSize), gl::BUFFER_DATA_SIZE);
    assert_eq!(property_to_gl(ResourceProperty::BlockIndex), gl::BLOCK_INDEX);
    assert_eq!(property_to_gl(ResourceProperty::Offset), gl::OFFSET);
    assert_eq!(property_to_gl(ResourceProperty::Type), gl::TYPE);
    assert_eq!(property_to_gl(ResourceProperty::ArraySize), gl::ARRAY_SIZE);
    assert_eq!(property_to_gl(ResourceProperty::Location), gl::LOCATION);
    assert_eq!(property_to_gl(ResourceProperty::MatrixStride), gl::MATRIX_STRIDE);
}

// ============================================================================
// UNIFORM TYPE TESTS
// ============================================================================

#[test]
fn test_uniform_type_raw_matches_gl_enums() {
    let expected = [
        (UniformType::Float, gl::FLOAT),
        (UniformType::UInt, gl::UNSIGNED_INT),
        (UniformType::Int, gl::INT),
        (UniformType::Vec2, gl::FLOAT_VEC2),
        (UniformType::Vec3, gl::FLOAT_VEC3),
        (UniformType::Vec4, gl::FLOAT_VEC4),
        (UniformType::Mat2, gl::FLOAT_MAT2),
        (UniformType::Mat2x3, gl::FLOAT_MAT2x3),
        (UniformType::Mat3x2, gl::FLOAT_MAT3x2),
        (UniformType::Mat3, gl::FLOAT_MAT3),
        (UniformType::Mat4, gl::FLOAT_MAT4),
        (UniformType::Sampler1D, gl::SAMPLER_1D),
        (UniformType::Sampler2D, gl::SAMPLER_2D),
        (UniformType::Sampler2DArray, gl::SAMPLER_2D_ARRAY),
        (UniformType::SamplerCube, gl::SAMPLER_CUBE),
    ];
    assert_eq!(expected.len(), UniformType::ALL.len());
    for (ty, raw) in expected {
        assert_eq!(ty.raw(), raw, "{:?}", ty);
        assert_eq!(UniformType::from_raw(raw), Some(ty));
    }
}

#[test]
fn test_unsupported_gl_types_rejected() {
    assert_eq!(UniformType::from_raw(gl::DOUBLE), None);
    assert_eq!(UniformType::from_raw(gl::BOOL), None);
    assert_eq!(UniformType::from_raw(gl::IMAGE_2D), None);
}

// ============================================================================
// BUFFER STORAGE TESTS
// ============================================================================

#[test]
fn test_check_storage_accepts_requested_size() {
    assert!(check_storage(64, 64).is_ok());
}

#[test]
fn test_check_storage_rejects_missing_storage() {
    assert!(matches!(check_storage(64, 0), Err(Error::BufferCreationFailed(_))));
    assert!(matches!(check_storage(64, -1), Err(Error::BufferCreationFailed(_))));
    assert!(matches!(check_storage(64, 32), Err(Error::BufferCreationFailed(_))));
}
