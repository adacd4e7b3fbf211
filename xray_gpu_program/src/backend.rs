//! Backend traits between the program layer and a graphics API
//!
//! `ProgramInterface` answers reflection queries about a linked program,
//! `ProgramBackend` performs the GPU writes issued at bind time and
//! `PipelineBackend` combines separable programs. Implementations are
//! expected to be cheap to clone (a loaded function table, a shared recorder).

use crate::error::Result;
use crate::stage::{PipelineStage, StageFlags};
use crate::uniform_type::UniformType;

/// Program interface category queried during reflection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterfaceKind {
    /// Uniform blocks (GL_UNIFORM_BLOCK)
    UniformBlock,
    /// Standalone uniforms and block members (GL_UNIFORM)
    Uniform,
    /// Subroutine uniforms of one stage
    SubroutineUniform(PipelineStage),
    /// Subroutines of one stage
    Subroutine(PipelineStage),
}

/// Per-resource property queried during reflection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceProperty {
    /// Binding point of a uniform block
    BufferBinding,
    /// Minimum buffer size of a uniform block
    BufferDataSize,
    /// Index of the block containing a uniform, -1 for standalone uniforms
    BlockIndex,
    /// Byte offset of a uniform inside its block
    Offset,
    /// Raw API type of a uniform
    Type,
    /// Element count (1 for non-arrays)
    ArraySize,
    /// Location of a standalone uniform, -1 for block members
    Location,
    /// Stride between matrix columns or rows inside a block
    MatrixStride,
}

/// Reflection queries over a linked program
pub trait ProgramInterface {
    /// Linked program handle
    type Program;

    /// API object id, used in diagnostics
    fn program_id(&self, program: &Self::Program) -> u32;

    /// Stages linked into the program
    fn program_stages(&self, program: &Self::Program) -> StageFlags;

    fn active_resource_count(&self, program: &Self::Program, kind: InterfaceKind) -> u32;

    /// Longest resource name including the terminator
    fn max_name_length(&self, program: &Self::Program, kind: InterfaceKind) -> u32;

    fn resource_name(&self, program: &Self::Program, kind: InterfaceKind, index: u32) -> Option<String>;

    /// Query several properties of one resource
    ///
    /// Returns one value per requested property. A shorter result means the
    /// query failed and is treated as a reflection failure by the caller.
    fn resource_properties(
        &self,
        program: &Self::Program,
        kind: InterfaceKind,
        index: u32,
        properties: &[ResourceProperty],
    ) -> Vec<i32>;

    /// Location assigned to a named resource, `None` when it has none
    fn resource_location(&self, program: &Self::Program, kind: InterfaceKind, name: &str) -> Option<i32>;

    /// Index assigned to a named resource, `None` when it does not exist
    fn resource_index(&self, program: &Self::Program, kind: InterfaceKind, name: &str) -> Option<u32>;

    /// Number of subroutine uniform locations the compiler assigned for a stage
    fn active_subroutine_uniform_locations(&self, program: &Self::Program, stage: PipelineStage) -> u32;
}

/// GPU writes issued by a program
pub trait ProgramBackend: ProgramInterface {
    /// Uniform buffer object, destroyed on drop
    type Buffer;

    /// Create a buffer of `size` bytes with write-only client access
    fn create_uniform_buffer(&self, size: u32) -> Result<Self::Buffer>;

    /// Map `buffer` for writing, copy `data` to its start and unmap
    ///
    /// Failure to map is reported as `Error::BufferMapFailed`.
    fn write_buffer(&self, buffer: &Self::Buffer, data: &[u8]) -> Result<()>;

    /// Bind `buffer` to a uniform buffer binding point
    fn bind_uniform_buffer(&self, binding_point: u32, buffer: &Self::Buffer);

    /// Make `program` the active program
    fn use_program(&self, program: &Self::Program);

    /// Set a standalone uniform on `program`
    ///
    /// # Arguments
    ///
    /// * `location` - Reflected uniform location
    /// * `ty` - Reflected uniform type, selects the API entry point
    /// * `data` - `count * ty.size_bytes()` bytes of element data
    /// * `count` - Number of array elements
    /// * `transpose` - Transpose matrix data on upload (matrix types only)
    fn set_program_uniform(
        &self,
        program: &Self::Program,
        location: i32,
        ty: UniformType,
        data: &[u8],
        count: u32,
        transpose: bool,
    );

    /// Submit the full subroutine index array of one stage
    fn submit_subroutine_indices(&self, stage: PipelineStage, indices: &[u32]);
}

/// Program pipeline objects combining separable programs
pub trait PipelineBackend: ProgramBackend {
    /// Program pipeline object, destroyed on drop
    type Pipeline;

    fn create_program_pipeline(&self) -> Result<Self::Pipeline>;

    /// Use `program` for `stages` of `pipeline`, `None` clears those stages
    fn use_program_stages(
        &self,
        pipeline: &Self::Pipeline,
        stages: StageFlags,
        program: Option<&Self::Program>,
    );

    fn bind_program_pipeline(&self, pipeline: &Self::Pipeline);
}
