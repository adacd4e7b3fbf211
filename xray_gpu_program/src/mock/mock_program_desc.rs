/// Mock program description
///
/// Describes the interface a linked program would report to reflection
/// queries: uniform blocks, uniforms and per-stage subroutines. Built with
/// chained calls and turned into a `MockProgram` for `MockBackend`.

use rustc_hash::FxHashMap;

use crate::stage::{PipelineStage, StageFlags};
use crate::uniform_type::UniformType;

// ============================================================================
// Resource descriptions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockBlockDesc {
    pub name: String,
    pub binding: i32,
    pub size: i32,
}

/// Uniform as reported by the program interface
///
/// Raw values are kept as reported (`block_index` and `offset` are -1 for
/// standalone uniforms, `location` is -1 for block members).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockUniformDesc {
    pub name: String,
    pub raw_type: u32,
    pub array_size: i32,
    pub block_index: i32,
    pub offset: i32,
    pub location: i32,
    pub matrix_stride: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockSubroutineUniformDesc {
    pub stage: PipelineStage,
    pub name: String,
    pub location: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockSubroutineDesc {
    pub stage: PipelineStage,
    pub name: String,
    pub index: u32,
}

// ============================================================================
// Program description
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockProgramDesc {
    pub id: u32,
    pub stages: StageFlags,
    /// In enumeration order, the position is the block index
    pub blocks: Vec<MockBlockDesc>,
    pub uniforms: Vec<MockUniformDesc>,
    pub subroutine_uniforms: Vec<MockSubroutineUniformDesc>,
    pub subroutines: Vec<MockSubroutineDesc>,
    /// Active subroutine uniform locations override per stage
    pub subroutine_locations: FxHashMap<PipelineStage, u32>,
}

impl MockProgramDesc {
    /// Empty vertex + fragment program
    pub fn new(id: u32) -> Self {
        Self {
            id,
            stages: StageFlags::VERTEX | StageFlags::FRAGMENT,
            blocks: Vec::new(),
            uniforms: Vec::new(),
            subroutine_uniforms: Vec::new(),
            subroutines: Vec::new(),
            subroutine_locations: FxHashMap::default(),
        }
    }

    pub fn with_stages(mut self, stages: StageFlags) -> Self {
        self.stages = stages;
        self
    }

    /// Add a uniform block with the next block index
    pub fn block(mut self, name: &str, binding: u32, size: u32) -> Self {
        self.blocks.push(MockBlockDesc {
            name: name.to_string(),
            binding: binding as i32,
            size: size as i32,
        });
        self
    }

    /// Add a member of a previously added block
    ///
    /// An unknown block name yields block index -1 (standalone uniform).
    pub fn block_member(self, name: &str, ty: UniformType, block: &str, offset: u32) -> Self {
        self.block_member_array(name, ty, block, offset, 1)
    }

    pub fn block_member_array(
        mut self,
        name: &str,
        ty: UniformType,
        block: &str,
        offset: u32,
        array_size: u32,
    ) -> Self {
        let block_index = self
            .blocks
            .iter()
            .position(|b| b.name == block)
            .map(|i| i as i32)
            .unwrap_or(-1);
        let matrix_stride = if ty.is_matrix() { 16 } else { 0 };
        self.uniforms.push(MockUniformDesc {
            name: name.to_string(),
            raw_type: ty.raw(),
            array_size: array_size as i32,
            block_index,
            offset: offset as i32,
            location: -1,
            matrix_stride,
        });
        self
    }

    pub fn standalone(self, name: &str, ty: UniformType, location: i32) -> Self {
        self.standalone_array(name, ty, location, 1)
    }

    pub fn standalone_array(mut self, name: &str, ty: UniformType, location: i32, array_size: u32) -> Self {
        self.uniforms.push(MockUniformDesc {
            name: name.to_string(),
            raw_type: ty.raw(),
            array_size: array_size as i32,
            block_index: -1,
            offset: -1,
            location,
            matrix_stride: 0,
        });
        self
    }

    /// Add a uniform exactly as described
    pub fn raw_uniform(mut self, uniform: MockUniformDesc) -> Self {
        self.uniforms.push(uniform);
        self
    }

    pub fn subroutine_uniform(mut self, stage: PipelineStage, name: &str, location: i32) -> Self {
        self.subroutine_uniforms.push(MockSubroutineUniformDesc {
            stage,
            name: name.to_string(),
            location,
        });
        self
    }

    pub fn subroutine(mut self, stage: PipelineStage, name: &str, index: u32) -> Self {
        self.subroutines.push(MockSubroutineDesc {
            stage,
            name: name.to_string(),
            index,
        });
        self
    }

    /// Override the active subroutine uniform location count of a stage
    pub fn subroutine_locations(mut self, stage: PipelineStage, count: u32) -> Self {
        self.subroutine_locations.insert(stage, count);
        self
    }

    pub fn build(self) -> MockProgram {
        MockProgram { desc: self }
    }
}

/// Program handle understood by `MockBackend`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockProgram {
    pub desc: MockProgramDesc,
}

impl MockProgram {
    pub fn id(&self) -> u32 {
        self.desc.id
    }
}
