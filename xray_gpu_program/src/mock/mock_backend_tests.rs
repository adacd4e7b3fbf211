//! Unit tests for mock_backend.rs
//!
//! Tests query answers, call recording and failure injection.

use crate::backend::{InterfaceKind, PipelineBackend, ProgramBackend, ProgramInterface, ResourceProperty};
use crate::error::Error;
use crate::mock::{MockBackend, MockCall, MockProgramDesc};
use crate::stage::{PipelineStage, StageFlags};
use crate::uniform_type::UniformType;

fn sample_program() -> crate::mock::MockProgram {
    MockProgramDesc::new(7)
        .block("Transforms", 0, 64)
        .block("Lights", 1, 32)
        .block_member("world_view_proj", UniformType::Mat4, "Transforms", 0)
        .standalone("DiffuseMap", UniformType::Sampler2D, 3)
        .subroutine_uniform(PipelineStage::Fragment, "shading_model", 2)
        .subroutine(PipelineStage::Fragment, "phong", 5)
        .build()
}

// ============================================================================
// QUERY TESTS
// ============================================================================

#[test]
fn test_resource_counts_and_names() {
    let backend = MockBackend::new();
    let program = sample_program();

    assert_eq!(backend.program_id(&program), 7);
    assert_eq!(backend.active_resource_count(&program, InterfaceKind::UniformBlock), 2);
    assert_eq!(backend.active_resource_count(&program, InterfaceKind::Uniform), 2);
    assert_eq!(
        backend.active_resource_count(&program, InterfaceKind::SubroutineUniform(PipelineStage::Fragment)),
        1
    );
    assert_eq!(
        backend.active_resource_count(&program, InterfaceKind::Subroutine(PipelineStage::Vertex)),
        0
    );
    assert_eq!(
        backend.resource_name(&program, InterfaceKind::UniformBlock, 1),
        Some("Lights".to_string())
    );
    assert_eq!(backend.resource_name(&program, InterfaceKind::UniformBlock, 2), None);
    // "Transforms" + terminator
    assert_eq!(backend.max_name_length(&program, InterfaceKind::UniformBlock), 11);
}

#[test]
fn test_uniform_properties() {
    let backend = MockBackend::new();
    let program = sample_program();
    let props = [
        ResourceProperty::BlockIndex,
        ResourceProperty::Offset,
        ResourceProperty::Type,
        ResourceProperty::Location,
    ];

    let member = backend.resource_properties(&program, InterfaceKind::Uniform, 0, &props);
    assert_eq!(member, vec![0, 0, UniformType::Mat4.raw() as i32, -1]);

    let standalone = backend.resource_properties(&program, InterfaceKind::Uniform, 1, &props);
    assert_eq!(standalone, vec![-1, -1, UniformType::Sampler2D.raw() as i32, 3]);
}

#[test]
fn test_truncated_properties() {
    let backend = MockBackend::new();
    let program = sample_program();
    let props = [ResourceProperty::BufferBinding, ResourceProperty::BufferDataSize];

    backend.truncate_properties(Some(InterfaceKind::UniformBlock));
    assert_eq!(backend.resource_properties(&program, InterfaceKind::UniformBlock, 0, &props).len(), 1);

    backend.truncate_properties(None);
    assert_eq!(
        backend.resource_properties(&program, InterfaceKind::UniformBlock, 0, &props),
        vec![0, 64]
    );
}

#[test]
fn test_subroutine_location_and_index() {
    let backend = MockBackend::new();
    let program = sample_program();
    let stage = PipelineStage::Fragment;

    assert_eq!(
        backend.resource_location(&program, InterfaceKind::SubroutineUniform(stage), "shading_model"),
        Some(2)
    );
    assert_eq!(
        backend.resource_index(&program, InterfaceKind::Subroutine(stage), "phong"),
        Some(5)
    );
    assert_eq!(
        backend.resource_index(&program, InterfaceKind::Subroutine(PipelineStage::Vertex), "phong"),
        None
    );
    assert_eq!(backend.active_subroutine_uniform_locations(&program, stage), 1);
}

// ============================================================================
// RECORDING TESTS
// ============================================================================

#[test]
fn test_buffer_write_and_drop_are_recorded() {
    let backend = MockBackend::new();
    let buffer = backend.create_uniform_buffer(8).unwrap();
    let id = buffer.id;

    backend.write_buffer(&buffer, &[1, 2, 3, 4]).unwrap();
    assert_eq!(backend.buffer_contents(id), Some(vec![1, 2, 3, 4, 0, 0, 0, 0]));

    drop(buffer);
    assert_eq!(backend.buffer_contents(id), None);
    assert_eq!(
        backend.calls(),
        vec![
            MockCall::CreateBuffer { buffer: id, size: 8 },
            MockCall::WriteBuffer { buffer: id, data: vec![1, 2, 3, 4] },
            MockCall::DeleteBuffer { buffer: id },
        ]
    );
}

#[test]
fn test_clones_share_recorder() {
    let backend = MockBackend::new();
    let clone = backend.clone();
    let program = sample_program();

    clone.use_program(&program);
    assert_eq!(backend.calls(), vec![MockCall::UseProgram { program: 7 }]);

    backend.clear_calls();
    assert!(clone.calls().is_empty());
}

#[test]
fn test_pipeline_calls() {
    let backend = MockBackend::new();
    let program = sample_program();
    let pipeline = backend.create_program_pipeline().unwrap();

    backend.use_program_stages(&pipeline, StageFlags::VERTEX, Some(&program));
    backend.use_program_stages(&pipeline, StageFlags::FRAGMENT, None);
    backend.bind_program_pipeline(&pipeline);

    let calls = backend.calls();
    assert_eq!(calls[1], MockCall::UseProgramStages { pipeline: pipeline.id, stages: StageFlags::VERTEX, program: Some(7) });
    assert_eq!(calls[2], MockCall::UseProgramStages { pipeline: pipeline.id, stages: StageFlags::FRAGMENT, program: None });
    assert_eq!(calls[3], MockCall::BindPipeline { pipeline: pipeline.id });
}

// ============================================================================
// FAILURE INJECTION TESTS
// ============================================================================

#[test]
fn test_buffer_creation_failure_at_ordinal() {
    let backend = MockBackend::new();
    backend.fail_buffer_creation_at(1);

    assert!(backend.create_uniform_buffer(16).is_ok());
    let err = backend.create_uniform_buffer(16).unwrap_err();
    assert!(matches!(err, Error::BufferCreationFailed(_)));
    assert!(backend.create_uniform_buffer(16).is_ok());
}

#[test]
fn test_map_failure_leaves_contents() {
    let backend = MockBackend::new();
    let buffer = backend.create_uniform_buffer(4).unwrap();

    backend.set_map_failure(buffer.id, true);
    let err = backend.write_buffer(&buffer, &[9, 9, 9, 9]).unwrap_err();
    assert!(matches!(err, Error::BufferMapFailed(_)));
    assert_eq!(backend.buffer_contents(buffer.id), Some(vec![0; 4]));

    backend.set_map_failure(buffer.id, false);
    backend.write_buffer(&buffer, &[9, 9, 9, 9]).unwrap();
    assert_eq!(backend.buffer_contents(buffer.id), Some(vec![9; 4]));
}

#[test]
fn test_oversized_write_is_rejected() {
    let backend = MockBackend::new();
    let buffer = backend.create_uniform_buffer(2).unwrap();
    assert!(backend.write_buffer(&buffer, &[1, 2, 3]).is_err());
}
