/// Mock backend for tests (no GPU required)
///
/// Answers reflection queries from a `MockProgramDesc` and records every GPU
/// call as a `MockCall`. Buffer contents are kept so tests can check what
/// the GPU would see. Clones share the same recorder.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::backend::{
    InterfaceKind, PipelineBackend, ProgramBackend, ProgramInterface, ResourceProperty,
};
use crate::error::{Error, Result};
use crate::mock::mock_program_desc::MockProgram;
use crate::stage::{PipelineStage, StageFlags};
use crate::uniform_type::UniformType;

// ============================================================================
// Recorded calls
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    CreateBuffer { buffer: u32, size: u32 },
    WriteBuffer { buffer: u32, data: Vec<u8> },
    BindUniformBuffer { binding_point: u32, buffer: u32 },
    UseProgram { program: u32 },
    SetProgramUniform {
        program: u32,
        location: i32,
        ty: UniformType,
        count: u32,
        transpose: bool,
        data: Vec<u8>,
    },
    SubmitSubroutines { stage: PipelineStage, indices: Vec<u32> },
    CreatePipeline { pipeline: u32 },
    UseProgramStages { pipeline: u32, stages: StageFlags, program: Option<u32> },
    BindPipeline { pipeline: u32 },
    DeleteBuffer { buffer: u32 },
    DeletePipeline { pipeline: u32 },
}

#[derive(Debug, Default)]
struct MockState {
    calls: Vec<MockCall>,
    buffers: FxHashMap<u32, Vec<u8>>,
    next_buffer_id: u32,
    next_pipeline_id: u32,
    buffers_created: usize,
    fail_buffer_creation_at: Option<usize>,
    failing_maps: FxHashSet<u32>,
    fail_all_maps: bool,
    truncated_properties: Option<InterfaceKind>,
}

impl MockState {
    fn record(&mut self, call: MockCall) {
        self.calls.push(call);
    }
}

// ============================================================================
// Mock GPU objects
// ============================================================================

#[derive(Debug)]
pub struct MockBuffer {
    pub id: u32,
    pub size: u32,
    state: Rc<RefCell<MockState>>,
}

impl Drop for MockBuffer {
    fn drop(&mut self) {
        let mut state = self.state.borrow_mut();
        state.buffers.remove(&self.id);
        state.record(MockCall::DeleteBuffer { buffer: self.id });
    }
}

#[derive(Debug)]
pub struct MockPipeline {
    pub id: u32,
    state: Rc<RefCell<MockState>>,
}

impl Drop for MockPipeline {
    fn drop(&mut self) {
        self.state
            .borrow_mut()
            .record(MockCall::DeletePipeline { pipeline: self.id });
    }
}

// ============================================================================
// Mock backend
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    state: Rc<RefCell<MockState>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// All calls recorded so far
    pub fn calls(&self) -> Vec<MockCall> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// Number of recorded calls matching `pred`
    pub fn count_calls(&self, pred: impl Fn(&MockCall) -> bool) -> usize {
        self.state.borrow().calls.iter().filter(|c| pred(c)).count()
    }

    /// Contents of a live buffer as last uploaded
    pub fn buffer_contents(&self, buffer: u32) -> Option<Vec<u8>> {
        self.state.borrow().buffers.get(&buffer).cloned()
    }

    /// Ids of buffers created so far, in creation order
    pub fn created_buffers(&self) -> Vec<u32> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter_map(|c| match c {
                MockCall::CreateBuffer { buffer, .. } => Some(*buffer),
                _ => None,
            })
            .collect()
    }

    /// Make the `ordinal`-th buffer creation (0-based, counted from backend creation) fail
    pub fn fail_buffer_creation_at(&self, ordinal: usize) {
        self.state.borrow_mut().fail_buffer_creation_at = Some(ordinal);
    }

    /// Make mapping of one buffer fail (or succeed again)
    pub fn set_map_failure(&self, buffer: u32, failing: bool) {
        let mut state = self.state.borrow_mut();
        if failing {
            state.failing_maps.insert(buffer);
        } else {
            state.failing_maps.remove(&buffer);
        }
    }

    /// Make mapping of every buffer fail (or succeed again)
    pub fn set_all_maps_failing(&self, failing: bool) {
        self.state.borrow_mut().fail_all_maps = failing;
    }

    /// Return one value fewer than requested for property queries on `kind`
    pub fn truncate_properties(&self, kind: Option<InterfaceKind>) {
        self.state.borrow_mut().truncated_properties = kind;
    }
}

fn resource_names(program: &MockProgram, kind: InterfaceKind) -> Vec<&str> {
    let desc = &program.desc;
    match kind {
        InterfaceKind::UniformBlock => desc.blocks.iter().map(|b| b.name.as_str()).collect(),
        InterfaceKind::Uniform => desc.uniforms.iter().map(|u| u.name.as_str()).collect(),
        InterfaceKind::SubroutineUniform(stage) => desc
            .subroutine_uniforms
            .iter()
            .filter(|s| s.stage == stage)
            .map(|s| s.name.as_str())
            .collect(),
        InterfaceKind::Subroutine(stage) => desc
            .subroutines
            .iter()
            .filter(|s| s.stage == stage)
            .map(|s| s.name.as_str())
            .collect(),
    }
}

impl ProgramInterface for MockBackend {
    type Program = MockProgram;

    fn program_id(&self, program: &MockProgram) -> u32 {
        program.desc.id
    }

    fn program_stages(&self, program: &MockProgram) -> StageFlags {
        program.desc.stages
    }

    fn active_resource_count(&self, program: &MockProgram, kind: InterfaceKind) -> u32 {
        resource_names(program, kind).len() as u32
    }

    fn max_name_length(&self, program: &MockProgram, kind: InterfaceKind) -> u32 {
        resource_names(program, kind)
            .iter()
            .map(|n| n.len() as u32 + 1)
            .max()
            .unwrap_or(0)
    }

    fn resource_name(&self, program: &MockProgram, kind: InterfaceKind, index: u32) -> Option<String> {
        resource_names(program, kind)
            .get(index as usize)
            .map(|n| n.to_string())
    }

    fn resource_properties(
        &self,
        program: &MockProgram,
        kind: InterfaceKind,
        index: u32,
        properties: &[ResourceProperty],
    ) -> Vec<i32> {
        let desc = &program.desc;
        let mut values: Vec<i32> = match kind {
            InterfaceKind::UniformBlock => match desc.blocks.get(index as usize) {
                Some(block) => properties
                    .iter()
                    .filter_map(|p| match p {
                        ResourceProperty::BufferBinding => Some(block.binding),
                        ResourceProperty::BufferDataSize => Some(block.size),
                        _ => None,
                    })
                    .collect(),
                None => Vec::new(),
            },
            InterfaceKind::Uniform => match desc.uniforms.get(index as usize) {
                Some(uniform) => properties
                    .iter()
                    .filter_map(|p| match p {
                        ResourceProperty::BlockIndex => Some(uniform.block_index),
                        ResourceProperty::Offset => Some(uniform.offset),
                        ResourceProperty::Type => Some(uniform.raw_type as i32),
                        ResourceProperty::ArraySize => Some(uniform.array_size),
                        ResourceProperty::Location => Some(uniform.location),
                        ResourceProperty::MatrixStride => Some(uniform.matrix_stride),
                        _ => None,
                    })
                    .collect(),
                None => Vec::new(),
            },
            InterfaceKind::SubroutineUniform(_) | InterfaceKind::Subroutine(_) => Vec::new(),
        };

        if self.state.borrow().truncated_properties == Some(kind) {
            values.pop();
        }
        values
    }

    fn resource_location(&self, program: &MockProgram, kind: InterfaceKind, name: &str) -> Option<i32> {
        let desc = &program.desc;
        match kind {
            InterfaceKind::Uniform => desc
                .uniforms
                .iter()
                .find(|u| u.name == name)
                .map(|u| u.location),
            InterfaceKind::SubroutineUniform(stage) => desc
                .subroutine_uniforms
                .iter()
                .find(|s| s.stage == stage && s.name == name)
                .map(|s| s.location),
            _ => None,
        }
    }

    fn resource_index(&self, program: &MockProgram, kind: InterfaceKind, name: &str) -> Option<u32> {
        let desc = &program.desc;
        match kind {
            InterfaceKind::UniformBlock => desc
                .blocks
                .iter()
                .position(|b| b.name == name)
                .map(|i| i as u32),
            InterfaceKind::Uniform => desc
                .uniforms
                .iter()
                .position(|u| u.name == name)
                .map(|i| i as u32),
            InterfaceKind::Subroutine(stage) => desc
                .subroutines
                .iter()
                .find(|s| s.stage == stage && s.name == name)
                .map(|s| s.index),
            InterfaceKind::SubroutineUniform(_) => {
                let names = resource_names(program, kind);
                names.iter().position(|n| *n == name).map(|i| i as u32)
            }
        }
    }

    fn active_subroutine_uniform_locations(&self, program: &MockProgram, stage: PipelineStage) -> u32 {
        match program.desc.subroutine_locations.get(&stage) {
            Some(&count) => count,
            None => resource_names(program, InterfaceKind::SubroutineUniform(stage)).len() as u32,
        }
    }
}

impl ProgramBackend for MockBackend {
    type Buffer = MockBuffer;

    fn create_uniform_buffer(&self, size: u32) -> Result<MockBuffer> {
        let mut state = self.state.borrow_mut();
        let ordinal = state.buffers_created;
        state.buffers_created += 1;

        if state.fail_buffer_creation_at == Some(ordinal) {
            return Err(Error::BufferCreationFailed(format!(
                "mock buffer creation {} of {} bytes rejected",
                ordinal, size
            )));
        }

        state.next_buffer_id += 1;
        let id = state.next_buffer_id;
        state.buffers.insert(id, vec![0u8; size as usize]);
        state.record(MockCall::CreateBuffer { buffer: id, size });

        Ok(MockBuffer {
            id,
            size,
            state: self.state.clone(),
        })
    }

    fn write_buffer(&self, buffer: &MockBuffer, data: &[u8]) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_all_maps || state.failing_maps.contains(&buffer.id) {
            return Err(Error::BufferMapFailed(format!("mock buffer {} cannot be mapped", buffer.id)));
        }

        let contents = match state.buffers.get_mut(&buffer.id) {
            Some(contents) => contents,
            None => return Err(Error::BufferMapFailed(format!("mock buffer {} is gone", buffer.id))),
        };
        if data.len() > contents.len() {
            return Err(Error::BufferMapFailed(format!(
                "write of {} bytes into mock buffer {} of {} bytes",
                data.len(),
                buffer.id,
                contents.len()
            )));
        }
        contents[..data.len()].copy_from_slice(data);
        state.record(MockCall::WriteBuffer { buffer: buffer.id, data: data.to_vec() });
        Ok(())
    }

    fn bind_uniform_buffer(&self, binding_point: u32, buffer: &MockBuffer) {
        self.state
            .borrow_mut()
            .record(MockCall::BindUniformBuffer { binding_point, buffer: buffer.id });
    }

    fn use_program(&self, program: &MockProgram) {
        self.state
            .borrow_mut()
            .record(MockCall::UseProgram { program: program.desc.id });
    }

    fn set_program_uniform(
        &self,
        program: &MockProgram,
        location: i32,
        ty: UniformType,
        data: &[u8],
        count: u32,
        transpose: bool,
    ) {
        self.state.borrow_mut().record(MockCall::SetProgramUniform {
            program: program.desc.id,
            location,
            ty,
            count,
            transpose,
            data: data.to_vec(),
        });
    }

    fn submit_subroutine_indices(&self, stage: PipelineStage, indices: &[u32]) {
        self.state.borrow_mut().record(MockCall::SubmitSubroutines {
            stage,
            indices: indices.to_vec(),
        });
    }
}

impl PipelineBackend for MockBackend {
    type Pipeline = MockPipeline;

    fn create_program_pipeline(&self) -> Result<MockPipeline> {
        let mut state = self.state.borrow_mut();
        state.next_pipeline_id += 1;
        let id = state.next_pipeline_id;
        state.record(MockCall::CreatePipeline { pipeline: id });
        Ok(MockPipeline {
            id,
            state: self.state.clone(),
        })
    }

    fn use_program_stages(&self, pipeline: &MockPipeline, stages: StageFlags, program: Option<&MockProgram>) {
        self.state.borrow_mut().record(MockCall::UseProgramStages {
            pipeline: pipeline.id,
            stages,
            program: program.map(|p| p.desc.id),
        });
    }

    fn bind_program_pipeline(&self, pipeline: &MockPipeline) {
        self.state
            .borrow_mut()
            .record(MockCall::BindPipeline { pipeline: pipeline.id });
    }
}

#[cfg(test)]
#[path = "mock_backend_tests.rs"]
mod tests;
