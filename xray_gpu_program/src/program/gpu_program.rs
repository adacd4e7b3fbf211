/// GpuProgram - reflected program with lazily uploaded uniform blocks
///
/// Uniform writes never reach the GPU directly, except for standalone
/// uniforms. Block data is written into the `BlockDataStore`, the owning block
/// is marked dirty, and dirty blocks are uploaded once by the next bind.

use bytemuck::Pod;

use crate::backend::ProgramBackend;
use crate::config::ProgramConfig;
use crate::error::{Error, Result};
use crate::program::block_store::BlockDataStore;
use crate::reflection::{ReflectionIndex, SubroutineDescriptor};
use crate::stage::{PipelineStage, StageFlags};
use crate::{xray_critical, xray_debug, xray_error, xray_warn};

const LOG_SOURCE: &str = "xray::GpuProgram";

/// Work performed by one flush or bind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BindStats {
    /// Dirty blocks uploaded to their GPU buffer
    pub blocks_uploaded: u32,
    /// Dirty blocks whose upload failed (still dirty, retried next time)
    pub blocks_failed: u32,
    /// Buffer-to-binding-point bindings issued
    pub buffers_bound: u32,
    /// Stages whose subroutine index array was submitted
    pub subroutine_stages_submitted: u32,
}

impl BindStats {
    /// Sum of two stats (used when binding several programs)
    pub fn merged(self, other: BindStats) -> BindStats {
        BindStats {
            blocks_uploaded: self.blocks_uploaded + other.blocks_uploaded,
            blocks_failed: self.blocks_failed + other.blocks_failed,
            buffers_bound: self.buffers_bound + other.buffers_bound,
            subroutine_stages_submitted: self.subroutine_stages_submitted
                + other.subroutine_stages_submitted,
        }
    }
}

/// GPU buffer and dirty flag of one block, parallel to the reflected block table
struct BlockState<Buf> {
    buffer: Buf,
    dirty: bool,
}

/// Linked program with reflected uniform state
pub struct GpuProgram<B: ProgramBackend> {
    backend: B,
    program: B::Program,
    config: ProgramConfig,
    stages: StageFlags,
    reflection: ReflectionIndex,
    store: BlockDataStore,
    blocks: Vec<BlockState<B::Buffer>>,
    /// Index array submitted per stage, sized to the stage's active locations
    subroutine_indices: [Vec<u32>; PipelineStage::COUNT],
    /// Assigned subroutine (position in the subroutine table) per subroutine uniform
    assigned: Vec<Option<usize>>,
    unassigned_reported: bool,
}

fn call_failed(label: &str, err: Error) -> Error {
    xray_error!(LOG_SOURCE, "[{}] {}", label, err);
    err
}

impl<B: ProgramBackend> GpuProgram<B> {
    /// Reflect `program` and allocate its block store and GPU buffers
    ///
    /// # Errors
    ///
    /// Returns a fatal error (see `Error::is_fatal`) when reflection or
    /// buffer creation fails. No program is produced in that case.
    pub fn new(backend: B, program: B::Program, config: ProgramConfig) -> Result<Self> {
        let reflection = ReflectionIndex::reflect(&backend, &program, &config)?;
        let store = BlockDataStore::new(reflection.store_size() as usize);

        let mut blocks = Vec::with_capacity(reflection.blocks().len());
        for desc in reflection.blocks() {
            match backend.create_uniform_buffer(desc.byte_size) {
                Ok(buffer) => blocks.push(BlockState { buffer, dirty: false }),
                Err(err) => {
                    let err = match err {
                        Error::BufferCreationFailed(_) => err,
                        other => Error::BufferCreationFailed(other.to_string()),
                    };
                    xray_critical!(
                        LOG_SOURCE,
                        "[{}] buffer for uniform block '{}' ({} bytes): {}",
                        config.label,
                        desc.name,
                        desc.byte_size,
                        err
                    );
                    return Err(err);
                }
            }
        }

        let mut subroutine_indices: [Vec<u32>; PipelineStage::COUNT] = Default::default();
        for table in reflection.stage_tables() {
            subroutine_indices[table.stage.index()] = vec![0; table.max_active_locations as usize];
        }
        let assigned = vec![None; reflection.subroutine_uniforms().len()];
        let stages = backend.program_stages(&program);

        xray_debug!(
            LOG_SOURCE,
            "[{}] program {} ready: {} block(s), {} uniform(s), {} subroutine uniform(s)",
            config.label,
            backend.program_id(&program),
            reflection.blocks().len(),
            reflection.uniforms().len(),
            reflection.subroutine_uniforms().len()
        );

        Ok(Self {
            backend,
            program,
            config,
            stages,
            reflection,
            store,
            blocks,
            subroutine_indices,
            assigned,
            unassigned_reported: false,
        })
    }

    // ===== UNIFORM WRITES =====

    /// Copy `data` to the start of a uniform block and mark it dirty
    ///
    /// `data` may be shorter than the block; the remaining bytes keep their
    /// previous values.
    pub fn set_uniform_block(&mut self, name: &str, data: &[u8]) -> Result<()> {
        let label = self.config.label.as_str();
        let (pos, block) = match self.reflection.find_block(name) {
            Some(found) => found,
            None => return Err(call_failed(label, Error::UnknownUniformBlock(name.to_string()))),
        };

        if data.len() > block.byte_size as usize {
            return Err(call_failed(
                label,
                Error::SizeMismatch {
                    name: name.to_string(),
                    expected: block.byte_size,
                    actual: data.len(),
                },
            ));
        }

        self.store
            .write(block.store_offset as usize, data)
            .map_err(|err| call_failed(label, err))?;
        self.blocks[pos].dirty = true;
        Ok(())
    }

    /// Typed variant of `set_uniform_block`
    pub fn set_uniform_block_value<T: Pod>(&mut self, name: &str, value: &T) -> Result<()> {
        self.set_uniform_block(name, bytemuck::bytes_of(value))
    }

    /// Set a uniform by name
    ///
    /// Standalone uniforms are sent to the GPU immediately; `data` must hold
    /// between one and `array_length` whole elements. Block members must be
    /// written with exactly their reflected size and only dirty their block.
    ///
    /// Member data is copied verbatim. The reflected size assumes tightly
    /// packed elements, so std140 members with padded strides (`mat3`, scalar
    /// arrays) are written through `set_uniform_block` in the block layout.
    /// Reflection warns about matrix members whose stride is padded.
    pub fn set_uniform(&mut self, name: &str, data: &[u8]) -> Result<()> {
        let label = self.config.label.as_str();
        let uniform = match self.reflection.find_uniform(name) {
            Some(uniform) => uniform,
            None => return Err(call_failed(label, Error::UnknownUniform(name.to_string()))),
        };

        let size_mismatch = || Error::SizeMismatch {
            name: name.to_string(),
            expected: uniform.byte_size,
            actual: data.len(),
        };

        match uniform.parent_block {
            Some(parent) => {
                if data.len() != uniform.byte_size as usize {
                    return Err(call_failed(label, size_mismatch()));
                }
                let block = &self.reflection.blocks()[parent];
                let offset = block.store_offset as usize + uniform.block_offset as usize;
                self.store
                    .write(offset, data)
                    .map_err(|err| call_failed(label, err))?;
                self.blocks[parent].dirty = true;
            }
            None => {
                let element_size = uniform.uniform_type.size_bytes() as usize;
                let count = data.len() / element_size;
                if data.is_empty()
                    || data.len() % element_size != 0
                    || count > uniform.array_length as usize
                {
                    return Err(call_failed(label, size_mismatch()));
                }
                let transpose = self.config.transpose_matrices && uniform.uniform_type.is_matrix();
                self.backend.set_program_uniform(
                    &self.program,
                    uniform.location,
                    uniform.uniform_type,
                    data,
                    count as u32,
                    transpose,
                );
            }
        }
        Ok(())
    }

    /// Typed variant of `set_uniform` for a single value
    pub fn set_uniform_value<T: Pod>(&mut self, name: &str, value: &T) -> Result<()> {
        self.set_uniform(name, bytemuck::bytes_of(value))
    }

    /// Typed variant of `set_uniform` for arrays
    pub fn set_uniform_slice<T: Pod>(&mut self, name: &str, values: &[T]) -> Result<()> {
        self.set_uniform(name, bytemuck::cast_slice(values))
    }

    /// Select `subroutine` for the subroutine uniform `uniform` of `stage`
    ///
    /// The assignment is submitted by the next bind.
    pub fn set_subroutine_uniform(&mut self, stage: PipelineStage, uniform: &str, subroutine: &str) -> Result<()> {
        let label = self.config.label.as_str();
        let (uniform_pos, uniform_desc) = match self.reflection.find_subroutine_uniform(stage, uniform) {
            Some(found) => found,
            None => {
                return Err(call_failed(
                    label,
                    Error::UnknownSubroutineUniform { stage, name: uniform.to_string() },
                ))
            }
        };

        let (routine_pos, routine_desc) = match self.reflection.find_subroutine(stage, subroutine) {
            Some(found) => found,
            None => {
                let err = match self.reflection.find_subroutine_in_any_stage(subroutine) {
                    Some(other) => Error::SubroutineStageMismatch {
                        uniform: uniform.to_string(),
                        uniform_stage: uniform_desc.stage,
                        subroutine: subroutine.to_string(),
                        subroutine_stage: other.stage,
                    },
                    None => Error::UnknownSubroutine { stage, name: subroutine.to_string() },
                };
                return Err(call_failed(label, err));
            }
        };

        let slot = uniform_desc.location as usize;
        let indices = &mut self.subroutine_indices[stage.index()];
        let capacity = indices.len();
        match indices.get_mut(slot) {
            Some(entry) => *entry = routine_desc.index,
            None => {
                return Err(call_failed(
                    label,
                    Error::OutOfBounds { offset: slot, len: 1, capacity },
                ))
            }
        }
        self.assigned[uniform_pos] = Some(routine_pos);
        Ok(())
    }

    // ===== BINDING =====

    /// Upload dirty blocks, bind every block buffer and submit subroutine indices
    ///
    /// Does not activate the program; used when activation is done by a
    /// program pipeline.
    pub fn flush_uniforms(&mut self) -> BindStats {
        let mut stats = self.flush_blocks();
        stats.subroutine_stages_submitted = self.submit_subroutines(self.stages);
        stats
    }

    /// Prepare the program for a draw call
    ///
    /// Uploads dirty blocks, binds every block buffer to its binding point,
    /// activates the program and submits the subroutine index array of every
    /// stage with subroutine uniforms, in that order.
    pub fn bind_to_pipeline(&mut self) -> BindStats {
        let mut stats = self.flush_blocks();
        self.backend.use_program(&self.program);
        stats.subroutine_stages_submitted = self.submit_subroutines(self.stages);
        stats
    }

    /// Upload dirty blocks, then bind every block buffer
    pub(crate) fn flush_blocks(&mut self) -> BindStats {
        let mut stats = BindStats::default();

        for (desc, state) in self.reflection.blocks().iter().zip(self.blocks.iter_mut()) {
            if !state.dirty {
                continue;
            }
            let result = match self.store.region(desc.store_offset as usize, desc.byte_size as usize) {
                Some(bytes) => self.backend.write_buffer(&state.buffer, bytes),
                None => Err(Error::OutOfBounds {
                    offset: desc.store_offset as usize,
                    len: desc.byte_size as usize,
                    capacity: self.store.len(),
                }),
            };
            match result {
                Ok(()) => {
                    state.dirty = false;
                    stats.blocks_uploaded += 1;
                }
                Err(err) => {
                    xray_error!(
                        LOG_SOURCE,
                        "[{}] upload of uniform block '{}' failed, retrying on next bind: {}",
                        self.config.label,
                        desc.name,
                        err
                    );
                    stats.blocks_failed += 1;
                }
            }
        }

        for (desc, state) in self.reflection.blocks().iter().zip(self.blocks.iter()) {
            self.backend.bind_uniform_buffer(desc.binding_point, &state.buffer);
            stats.buffers_bound += 1;
        }

        stats
    }

    /// Submit the index array of every stage in `stages` with subroutine uniforms
    ///
    /// A program attached to one slot of a pipeline only submits for that stage;
    /// its other stages belong to the programs of the other slots.
    pub(crate) fn submit_subroutines(&mut self, stages: StageFlags) -> u32 {
        if !self.unassigned_reported {
            let unassigned: Vec<&str> = self
                .reflection
                .subroutine_uniforms()
                .iter()
                .zip(self.assigned.iter())
                .filter(|(_, assigned)| assigned.is_none())
                .map(|(desc, _)| desc.name.as_str())
                .collect();
            if !unassigned.is_empty() {
                xray_warn!(
                    LOG_SOURCE,
                    "[{}] subroutine uniform(s) without assignment, slot defaults to 0: {}",
                    self.config.label,
                    unassigned.join(", ")
                );
                self.unassigned_reported = true;
            }
        }

        let mut submitted = 0;
        for table in self.reflection.stage_tables() {
            if !stages.has_stage(table.stage) {
                continue;
            }
            self.backend
                .submit_subroutine_indices(table.stage, &self.subroutine_indices[table.stage.index()]);
            submitted += 1;
        }
        submitted
    }

    // ===== INTROSPECTION =====

    /// Backend program handle
    pub fn handle(&self) -> &B::Program {
        &self.program
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn reflection(&self) -> &ReflectionIndex {
        &self.reflection
    }

    pub fn config(&self) -> &ProgramConfig {
        &self.config
    }

    pub fn stages(&self) -> StageFlags {
        self.stages
    }

    pub fn label(&self) -> &str {
        &self.config.label
    }

    /// CPU-side contents of a uniform block
    pub fn block_data(&self, name: &str) -> Option<&[u8]> {
        let (_, block) = self.reflection.find_block(name)?;
        self.store.region(block.store_offset as usize, block.byte_size as usize)
    }

    /// `None` when no block has this name
    pub fn is_block_dirty(&self, name: &str) -> Option<bool> {
        let (pos, _) = self.reflection.find_block(name)?;
        Some(self.blocks[pos].dirty)
    }

    /// Subroutine currently selected for a subroutine uniform
    pub fn assigned_subroutine(&self, stage: PipelineStage, uniform: &str) -> Option<&SubroutineDescriptor> {
        let (pos, _) = self.reflection.find_subroutine_uniform(stage, uniform)?;
        self.assigned[pos].map(|routine| &self.reflection.subroutines()[routine])
    }

    /// Index array that the next bind submits for `stage`
    pub fn subroutine_indices(&self, stage: PipelineStage) -> &[u32] {
        &self.subroutine_indices[stage.index()]
    }
}

impl<B: ProgramBackend> std::fmt::Debug for GpuProgram<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuProgram")
            .field("label", &self.config.label)
            .field("id", &self.backend.program_id(&self.program))
            .field("stages", &self.stages)
            .field("blocks", &self.reflection.blocks().len())
            .field("uniforms", &self.reflection.uniforms().len())
            .finish()
    }
}

#[cfg(test)]
#[path = "gpu_program_tests.rs"]
mod tests;
