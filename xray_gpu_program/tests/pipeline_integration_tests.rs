//! Integration tests for ProgramPipeline
//!
//! Separable vertex and fragment programs combined in one pipeline object.
//! No GPU required.
//!
//! Run with: cargo test --test pipeline_integration_tests

mod test_utils;

use xray_gpu_program::glam::{Mat4, Vec4};
use xray_gpu_program::xray::ProgramConfig;
use xray_gpu_program::xray::backend::{PipelineStage, StageFlags, UniformType};
use xray_gpu_program::xray::mock::{MockBackend, MockCall, MockProgramDesc};
use xray_gpu_program::xray::program::{GpuProgram, ProgramPipeline};
use test_utils::count_uploads;

fn vertex_program(backend: &MockBackend) -> GpuProgram<MockBackend> {
    let desc = MockProgramDesc::new(100)
        .with_stages(StageFlags::VERTEX)
        .block("Transforms", 0, 64)
        .block_member("world_view_proj", UniformType::Mat4, "Transforms", 0);
    GpuProgram::new(backend.clone(), desc.build(), ProgramConfig::default().with_label("vs")).unwrap()
}

fn fragment_program(backend: &MockBackend) -> GpuProgram<MockBackend> {
    let desc = MockProgramDesc::new(200)
        .with_stages(StageFlags::FRAGMENT)
        .block("Material", 1, 16)
        .block_member("base_color", UniformType::Vec4, "Material", 0)
        .standalone("DiffuseMap", UniformType::Sampler2D, 0)
        .subroutine_uniform(PipelineStage::Fragment, "shading_model", 0)
        .subroutine(PipelineStage::Fragment, "flat", 0)
        .subroutine(PipelineStage::Fragment, "phong", 1);
    GpuProgram::new(backend.clone(), desc.build(), ProgramConfig::default().with_label("fs")).unwrap()
}

fn assembled(backend: &MockBackend) -> ProgramPipeline<MockBackend> {
    let mut pipeline = ProgramPipeline::new(backend.clone()).unwrap();
    pipeline.use_stage(PipelineStage::Vertex, vertex_program(backend)).unwrap();
    pipeline.use_stage(PipelineStage::Fragment, fragment_program(backend)).unwrap();
    pipeline
}

#[test]
fn test_integration_pipeline_frame() {
    let backend = MockBackend::new();
    let mut pipeline = assembled(&backend);
    assert_eq!(pipeline.attached_stages(), StageFlags::VERTEX | StageFlags::FRAGMENT);

    {
        let vs = pipeline.stage_program_mut(PipelineStage::Vertex).unwrap();
        vs.set_uniform_block_value("Transforms", &Mat4::IDENTITY).unwrap();
    }
    {
        let fs = pipeline.stage_program_mut(PipelineStage::Fragment).unwrap();
        fs.set_uniform_value("base_color", &Vec4::new(1.0, 0.5, 0.25, 1.0)).unwrap();
        fs.set_subroutine_uniform(PipelineStage::Fragment, "shading_model", "phong").unwrap();
    }
    backend.clear_calls();

    let stats = pipeline.bind();

    assert_eq!(stats.blocks_uploaded, 2);
    assert_eq!(stats.buffers_bound, 2);
    assert_eq!(stats.subroutine_stages_submitted, 1);
    let calls = backend.calls();
    assert_eq!(calls.last(), Some(&MockCall::SubmitSubroutines {
        stage: PipelineStage::Fragment,
        indices: vec![1],
    }));
    assert_eq!(backend.count_calls(|c| matches!(c, MockCall::BindPipeline { .. })), 1);

    // Second frame with no writes only rebinds
    backend.clear_calls();
    let stats = pipeline.bind();
    assert_eq!(stats.blocks_uploaded, 0);
    assert_eq!(stats.buffers_bound, 2);
    assert_eq!(count_uploads(&backend), 0);
}

#[test]
fn test_integration_swap_fragment_program() {
    let backend = MockBackend::new();
    let mut pipeline = assembled(&backend);

    let replacement = {
        let desc = MockProgramDesc::new(300)
            .with_stages(StageFlags::FRAGMENT)
            .standalone("tint", UniformType::Vec4, 0);
        GpuProgram::new(backend.clone(), desc.build(), ProgramConfig::default()).unwrap()
    };
    let old = pipeline.use_stage(PipelineStage::Fragment, replacement).unwrap().unwrap();
    assert_eq!(old.label(), "fs");

    drop(old);
    // The Material buffer of the detached program is released
    assert!(backend.calls().iter().any(|c| matches!(c, MockCall::DeleteBuffer { .. })));

    backend.clear_calls();
    let stats = pipeline.bind();
    assert_eq!(stats.buffers_bound, 1);
    assert_eq!(stats.subroutine_stages_submitted, 0);
}

#[test]
fn test_integration_pipeline_drop_releases_objects() {
    let backend = MockBackend::new();
    let pipeline = assembled(&backend);
    backend.clear_calls();

    drop(pipeline);

    let calls = backend.calls();
    assert!(calls.contains(&MockCall::DeletePipeline { pipeline: 1 }));
    assert_eq!(calls.iter().filter(|c| matches!(c, MockCall::DeleteBuffer { .. })).count(), 2);
}

#[test]
fn test_integration_slot_program_only_submits_its_stage() {
    let backend = MockBackend::new();
    let mut pipeline = ProgramPipeline::new(backend.clone()).unwrap();

    let mut vs = {
        let desc = MockProgramDesc::new(400)
            .with_stages(StageFlags::VERTEX)
            .subroutine_uniform(PipelineStage::Vertex, "deform", 0)
            .subroutine(PipelineStage::Vertex, "wave", 7);
        GpuProgram::new(backend.clone(), desc.build(), ProgramConfig::default().with_label("vs")).unwrap()
    };
    vs.set_subroutine_uniform(PipelineStage::Vertex, "deform", "wave").unwrap();

    // Linked with both stages but attached to the fragment slot only
    let mut combined = {
        let desc = MockProgramDesc::new(500)
            .with_stages(StageFlags::VERTEX | StageFlags::FRAGMENT)
            .subroutine_uniform(PipelineStage::Vertex, "deform", 0)
            .subroutine(PipelineStage::Vertex, "ripple", 3)
            .subroutine_uniform(PipelineStage::Fragment, "shading_model", 0)
            .subroutine(PipelineStage::Fragment, "phong", 1);
        GpuProgram::new(backend.clone(), desc.build(), ProgramConfig::default().with_label("vs_fs")).unwrap()
    };
    combined.set_subroutine_uniform(PipelineStage::Vertex, "deform", "ripple").unwrap();
    combined.set_subroutine_uniform(PipelineStage::Fragment, "shading_model", "phong").unwrap();

    pipeline.use_stage(PipelineStage::Vertex, vs).unwrap();
    pipeline.use_stage(PipelineStage::Fragment, combined).unwrap();
    backend.clear_calls();

    let stats = pipeline.bind();

    let submitted: Vec<MockCall> = backend
        .calls()
        .into_iter()
        .filter(|c| matches!(c, MockCall::SubmitSubroutines { .. }))
        .collect();
    assert_eq!(
        submitted,
        vec![
            MockCall::SubmitSubroutines { stage: PipelineStage::Vertex, indices: vec![7] },
            MockCall::SubmitSubroutines { stage: PipelineStage::Fragment, indices: vec![1] },
        ]
    );
    assert_eq!(stats.subroutine_stages_submitted, 2);
}
