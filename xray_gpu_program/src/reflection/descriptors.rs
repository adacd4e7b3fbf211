/// Reflected resource descriptors
///
/// All descriptors are produced once by `ReflectionIndex::reflect` and never
/// change afterwards.

use crate::stage::PipelineStage;
use crate::uniform_type::UniformType;

/// A uniform block and its region in the block data store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformBlockDescriptor {
    /// Block name as declared in the shader
    pub name: String,
    /// Buffer size required by the block, in bytes
    pub byte_size: u32,
    /// Offset of the block's mirror region in the block data store
    pub store_offset: u32,
    /// Uniform buffer binding point
    pub binding_point: u32,
    /// Block index assigned by the shader compiler
    pub block_index: u32,
}

impl UniformBlockDescriptor {
    /// Byte range of this block in the block data store
    pub fn store_range(&self) -> std::ops::Range<usize> {
        let start = self.store_offset as usize;
        start..start + self.byte_size as usize
    }
}

/// A standalone uniform or a uniform block member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformDescriptor {
    pub name: String,
    /// `size_bytes(uniform_type) * array_length`
    pub byte_size: u32,
    /// Position of the owning block in the sorted block table
    pub parent_block: Option<usize>,
    pub uniform_type: UniformType,
    pub array_length: u32,
    /// Location for standalone uniforms, -1 for block members
    pub location: i32,
    /// Offset inside the owning block, 0 for standalone uniforms
    pub block_offset: u32,
    /// Matrix stride inside the owning block, 0 when not applicable
    pub matrix_stride: u32,
}

impl UniformDescriptor {
    pub fn is_block_member(&self) -> bool {
        self.parent_block.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubroutineUniformDescriptor {
    pub name: String,
    pub stage: PipelineStage,
    /// Slot in the stage's subroutine index array
    pub location: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubroutineDescriptor {
    pub name: String,
    pub stage: PipelineStage,
    /// Value to store in a subroutine uniform slot to select this subroutine
    pub index: u32,
}

/// Subroutine uniform summary for one stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageSubroutineTable {
    pub stage: PipelineStage,
    /// Number of subroutine uniforms reflected for the stage
    pub uniform_count: u32,
    /// Length of the index array submitted for the stage
    pub max_active_locations: u32,
}
