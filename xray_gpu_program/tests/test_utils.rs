#![allow(dead_code)]
//! Shared fixtures for the integration tests
//!
//! Programs are described with `MockProgramDesc` and built against a
//! `MockBackend`, so none of these tests need a GPU.

use xray_gpu_program::xray::mock::{MockBackend, MockCall, MockProgramDesc};
use xray_gpu_program::xray::program::GpuProgram;
use xray_gpu_program::xray::backend::{PipelineStage, UniformType};
use xray_gpu_program::xray::ProgramConfig;
use xray_gpu_program::xray::log::{Logger, LogEntry};
use std::sync::{Arc, Mutex};

/// Program with `Transforms { mat4 world_view_proj }` and a standalone `sampler2D DiffuseMap`
pub fn scenario_desc() -> MockProgramDesc {
    MockProgramDesc::new(1)
        .block("Transforms", 0, 64)
        .block_member("world_view_proj", UniformType::Mat4, "Transforms", 0)
        .standalone("DiffuseMap", UniformType::Sampler2D, 3)
}

/// Program with one block holding members at offsets 0, 16 and 32
pub fn layout_desc() -> MockProgramDesc {
    MockProgramDesc::new(2)
        .block("Padding", 3, 16)
        .block("Layout", 1, 48)
        .block_member("a", UniformType::Vec4, "Layout", 0)
        .block_member("b", UniformType::Vec4, "Layout", 16)
        .block_member("c", UniformType::Vec4, "Layout", 32)
        .block_member("pad", UniformType::Vec4, "Padding", 0)
}

/// Program with vertex subroutine uniforms at locations 0 and 2 (3 active locations)
pub fn subroutine_desc() -> MockProgramDesc {
    MockProgramDesc::new(3)
        .block("Frame", 0, 16)
        .block_member("time", UniformType::Float, "Frame", 0)
        .subroutine_uniform(PipelineStage::Vertex, "shading_model", 2)
        .subroutine_uniform(PipelineStage::Vertex, "deform", 0)
        .subroutine_locations(PipelineStage::Vertex, 3)
        .subroutine(PipelineStage::Vertex, "lambert", 4)
        .subroutine(PipelineStage::Vertex, "phong", 6)
        .subroutine(PipelineStage::Vertex, "ripple", 1)
}

/// Build a program and drop the construction calls from the recorder
pub fn build(desc: MockProgramDesc) -> (MockBackend, GpuProgram<MockBackend>) {
    let backend = MockBackend::new();
    let program = GpuProgram::new(backend.clone(), desc.build(), ProgramConfig::default())
        .expect("mock program should reflect");
    backend.clear_calls();
    (backend, program)
}

pub fn count_uploads(backend: &MockBackend) -> usize {
    backend.count_calls(|c| matches!(c, MockCall::WriteBuffer { .. }))
}

pub fn count_binds(backend: &MockBackend) -> usize {
    backend.count_calls(|c| matches!(c, MockCall::BindUniformBuffer { .. }))
}

/// Test logger that captures log entries for verification
pub struct TestLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl TestLogger {
    pub fn new() -> (Self, Arc<Mutex<Vec<LogEntry>>>) {
        let entries = Arc::new(Mutex::new(Vec::new()));
        (Self { entries: entries.clone() }, entries)
    }
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}
