/// ReflectionIndex - name-sorted lookup tables built from a linked program
///
/// Reflection runs three passes in a fixed order: uniform blocks, uniforms
/// (which refer back to the blocks) and per-stage subroutines. Any failed or
/// incomplete query aborts the whole pass and no index is produced.

use rustc_hash::FxHashMap;

use crate::backend::{InterfaceKind, ProgramInterface, ResourceProperty};
use crate::config::ProgramConfig;
use crate::error::{Error, Result};
use crate::reflection::descriptors::{
    UniformBlockDescriptor, UniformDescriptor,
    SubroutineUniformDescriptor, SubroutineDescriptor,
    StageSubroutineTable,
};
use crate::stage::PipelineStage;
use crate::uniform_type::UniformType;
use crate::{xray_critical, xray_debug, xray_warn};

const LOG_SOURCE: &str = "xray::Reflection";

const BLOCK_PROPERTIES: [ResourceProperty; 2] = [
    ResourceProperty::BufferBinding,
    ResourceProperty::BufferDataSize,
];

const UNIFORM_PROPERTIES: [ResourceProperty; 6] = [
    ResourceProperty::BlockIndex,
    ResourceProperty::Offset,
    ResourceProperty::Type,
    ResourceProperty::ArraySize,
    ResourceProperty::Location,
    ResourceProperty::MatrixStride,
];

/// Immutable reflection tables of one linked program
#[derive(Debug, Clone, Default)]
pub struct ReflectionIndex {
    /// Sorted by name
    blocks: Vec<UniformBlockDescriptor>,
    /// Sorted by name
    uniforms: Vec<UniformDescriptor>,
    /// Sorted by (stage, name)
    subroutine_uniforms: Vec<SubroutineUniformDescriptor>,
    /// Sorted by (stage, name)
    subroutines: Vec<SubroutineDescriptor>,
    /// One entry per stage with subroutine uniforms, in pipeline order
    stage_tables: Vec<StageSubroutineTable>,
    /// Sum of all block sizes
    store_size: u32,
}

impl ReflectionIndex {
    /// Reflect a linked program
    ///
    /// # Errors
    ///
    /// * `Error::ReflectionFailed` - a query returned incomplete or invalid data
    /// * `Error::UnsupportedUniformType` - a uniform has a type outside the type table
    ///
    /// Both are logged at critical severity.
    pub fn reflect<I: ProgramInterface + ?Sized>(
        iface: &I,
        program: &I::Program,
        config: &ProgramConfig,
    ) -> Result<Self> {
        let (blocks, store_size) = collect_uniform_blocks(iface, program, &config.label)?;
        let uniforms = collect_uniforms(iface, program, &blocks, &config.label)?;
        let (subroutine_uniforms, subroutines, stage_tables) =
            collect_subroutines_and_uniforms(iface, program, &config.label)?;

        let index = Self {
            blocks,
            uniforms,
            subroutine_uniforms,
            subroutines,
            stage_tables,
            store_size,
        };

        if config.log_reflection {
            index.log_tables(&config.label);
        }

        Ok(index)
    }

    // ===== LOOKUPS =====

    /// Position and descriptor of a uniform block
    pub fn find_block(&self, name: &str) -> Option<(usize, &UniformBlockDescriptor)> {
        self.blocks
            .binary_search_by(|b| b.name.as_str().cmp(name))
            .ok()
            .map(|pos| (pos, &self.blocks[pos]))
    }

    pub fn find_uniform(&self, name: &str) -> Option<&UniformDescriptor> {
        self.uniforms
            .binary_search_by(|u| u.name.as_str().cmp(name))
            .ok()
            .map(|pos| &self.uniforms[pos])
    }

    /// Position and descriptor of a subroutine uniform of `stage`
    pub fn find_subroutine_uniform(
        &self,
        stage: PipelineStage,
        name: &str,
    ) -> Option<(usize, &SubroutineUniformDescriptor)> {
        self.subroutine_uniforms
            .binary_search_by(|s| (s.stage, s.name.as_str()).cmp(&(stage, name)))
            .ok()
            .map(|pos| (pos, &self.subroutine_uniforms[pos]))
    }

    /// Position and descriptor of a subroutine of `stage`
    pub fn find_subroutine(&self, stage: PipelineStage, name: &str) -> Option<(usize, &SubroutineDescriptor)> {
        self.subroutines
            .binary_search_by(|s| (s.stage, s.name.as_str()).cmp(&(stage, name)))
            .ok()
            .map(|pos| (pos, &self.subroutines[pos]))
    }

    /// First subroutine with this name in any stage
    pub fn find_subroutine_in_any_stage(&self, name: &str) -> Option<&SubroutineDescriptor> {
        self.subroutines.iter().find(|s| s.name == name)
    }

    /// Subroutine summary of a stage, `None` if the stage has no subroutine uniforms
    pub fn stage_table(&self, stage: PipelineStage) -> Option<&StageSubroutineTable> {
        self.stage_tables.iter().find(|t| t.stage == stage)
    }

    // ===== TABLES =====

    pub fn blocks(&self) -> &[UniformBlockDescriptor] {
        &self.blocks
    }

    pub fn uniforms(&self) -> &[UniformDescriptor] {
        &self.uniforms
    }

    pub fn subroutine_uniforms(&self) -> &[SubroutineUniformDescriptor] {
        &self.subroutine_uniforms
    }

    pub fn subroutines(&self) -> &[SubroutineDescriptor] {
        &self.subroutines
    }

    pub fn stage_tables(&self) -> &[StageSubroutineTable] {
        &self.stage_tables
    }

    /// Size of the block data store needed by all blocks
    pub fn store_size(&self) -> u32 {
        self.store_size
    }

    /// Subroutine uniforms of one stage, in name order
    pub fn stage_subroutine_uniforms(
        &self,
        stage: PipelineStage,
    ) -> impl Iterator<Item = &SubroutineUniformDescriptor> {
        self.subroutine_uniforms.iter().filter(move |s| s.stage == stage)
    }

    fn log_tables(&self, label: &str) {
        xray_debug!(
            LOG_SOURCE,
            "[{}] {} uniform block(s), {} bytes of block data",
            label,
            self.blocks.len(),
            self.store_size
        );
        for block in &self.blocks {
            xray_debug!(
                LOG_SOURCE,
                "[{}] block '{}' index {} binding {} size {} store offset {}",
                label,
                block.name,
                block.block_index,
                block.binding_point,
                block.byte_size,
                block.store_offset
            );
        }
        for uniform in &self.uniforms {
            match uniform.parent_block {
                Some(parent) => xray_debug!(
                    LOG_SOURCE,
                    "[{}] uniform '{}' {:?}[{}] in block '{}' offset {} stride {}",
                    label,
                    uniform.name,
                    uniform.uniform_type,
                    uniform.array_length,
                    self.blocks[parent].name,
                    uniform.block_offset,
                    uniform.matrix_stride
                ),
                None => xray_debug!(
                    LOG_SOURCE,
                    "[{}] uniform '{}' {:?}[{}] location {}",
                    label,
                    uniform.name,
                    uniform.uniform_type,
                    uniform.array_length,
                    uniform.location
                ),
            }
        }
        for sub_uniform in &self.subroutine_uniforms {
            xray_debug!(
                LOG_SOURCE,
                "[{}] subroutine uniform '{}' ({}) location {}",
                label,
                sub_uniform.name,
                sub_uniform.stage,
                sub_uniform.location
            );
        }
        for sub in &self.subroutines {
            xray_debug!(
                LOG_SOURCE,
                "[{}] subroutine '{}' ({}) index {}",
                label,
                sub.name,
                sub.stage,
                sub.index
            );
        }
    }
}

// ===== REFLECTION PASSES =====

fn reflection_failed(label: &str, message: String) -> Error {
    xray_critical!(LOG_SOURCE, "[{}] {}", label, message);
    Error::ReflectionFailed(message)
}

fn resource_name<I: ProgramInterface + ?Sized>(
    iface: &I,
    program: &I::Program,
    kind: InterfaceKind,
    index: u32,
    label: &str,
) -> Result<String> {
    iface
        .resource_name(program, kind, index)
        .ok_or_else(|| reflection_failed(label, format!("no name for {:?} resource {}", kind, index)))
}

fn collect_uniform_blocks<I: ProgramInterface + ?Sized>(
    iface: &I,
    program: &I::Program,
    label: &str,
) -> Result<(Vec<UniformBlockDescriptor>, u32)> {
    let kind = InterfaceKind::UniformBlock;
    let count = iface.active_resource_count(program, kind);
    if count == 0 {
        return Ok((Vec::new(), 0));
    }

    if iface.max_name_length(program, kind) == 0 {
        return Err(reflection_failed(label, "uniform blocks reported without names".to_string()));
    }

    let mut blocks = Vec::with_capacity(count as usize);
    let mut store_size: u32 = 0;

    for block_index in 0..count {
        let name = resource_name(iface, program, kind, block_index, label)?;
        let props = iface.resource_properties(program, kind, block_index, &BLOCK_PROPERTIES);
        if props.len() != BLOCK_PROPERTIES.len() {
            return Err(reflection_failed(
                label,
                format!(
                    "uniform block '{}': got {} of {} properties",
                    name,
                    props.len(),
                    BLOCK_PROPERTIES.len()
                ),
            ));
        }

        let (binding_point, byte_size) = match (u32::try_from(props[0]), u32::try_from(props[1])) {
            (Ok(binding), Ok(size)) if size > 0 => (binding, size),
            _ => {
                return Err(reflection_failed(
                    label,
                    format!("uniform block '{}': invalid binding {} or size {}", name, props[0], props[1]),
                ))
            }
        };

        // Offsets follow enumeration order, lookups use the sorted table
        let store_offset = store_size;
        store_size = store_size.checked_add(byte_size).ok_or_else(|| {
            reflection_failed(label, format!("uniform block '{}': block data size overflow", name))
        })?;

        blocks.push(UniformBlockDescriptor {
            name,
            byte_size,
            store_offset,
            binding_point,
            block_index,
        });
    }

    blocks.sort_by(|a, b| a.name.cmp(&b.name));
    Ok((blocks, store_size))
}

fn collect_uniforms<I: ProgramInterface + ?Sized>(
    iface: &I,
    program: &I::Program,
    blocks: &[UniformBlockDescriptor],
    label: &str,
) -> Result<Vec<UniformDescriptor>> {
    let kind = InterfaceKind::Uniform;
    let count = iface.active_resource_count(program, kind);
    if count == 0 {
        return Ok(Vec::new());
    }

    if iface.max_name_length(program, kind) == 0 {
        return Err(reflection_failed(label, "uniforms reported without names".to_string()));
    }

    let block_positions: FxHashMap<u32, usize> = blocks
        .iter()
        .enumerate()
        .map(|(pos, block)| (block.block_index, pos))
        .collect();

    let mut uniforms = Vec::with_capacity(count as usize);

    for index in 0..count {
        let name = resource_name(iface, program, kind, index, label)?;
        let props = iface.resource_properties(program, kind, index, &UNIFORM_PROPERTIES);
        if props.len() != UNIFORM_PROPERTIES.len() {
            return Err(reflection_failed(
                label,
                format!(
                    "uniform '{}': got {} of {} properties",
                    name,
                    props.len(),
                    UNIFORM_PROPERTIES.len()
                ),
            ));
        }

        let [block_index, offset, raw_type, array_size, location, matrix_stride] =
            [props[0], props[1], props[2], props[3], props[4], props[5]];

        let raw_type = raw_type as u32;
        let uniform_type = match UniformType::from_raw(raw_type) {
            Some(ty) => ty,
            None => {
                xray_critical!(
                    LOG_SOURCE,
                    "[{}] uniform '{}' has unsupported type {:#x}",
                    label,
                    name,
                    raw_type
                );
                return Err(Error::UnsupportedUniformType { name, raw_type });
            }
        };

        let array_length = array_size.max(1) as u32;
        let byte_size = uniform_type.size_bytes() * array_length;

        let (parent_block, block_offset) = if block_index >= 0 {
            let pos = match block_positions.get(&(block_index as u32)) {
                Some(&pos) => pos,
                None => {
                    return Err(reflection_failed(
                        label,
                        format!("uniform '{}' refers to unknown block index {}", name, block_index),
                    ))
                }
            };
            let block_offset = offset.max(0) as u32;
            let parent = &blocks[pos];
            if block_offset as u64 + byte_size as u64 > parent.byte_size as u64 {
                return Err(reflection_failed(
                    label,
                    format!(
                        "uniform '{}' ({} bytes at offset {}) exceeds block '{}' ({} bytes)",
                        name, byte_size, block_offset, parent.name, parent.byte_size
                    ),
                ));
            }
            if let Some(column_size) = uniform_type.packed_column_size() {
                if matrix_stride > 0 && matrix_stride as u32 != column_size {
                    xray_warn!(
                        LOG_SOURCE,
                        "[{}] uniform '{}': matrix stride {} in block '{}' differs from packed column size {}, data must be written in the block layout",
                        label,
                        name,
                        matrix_stride,
                        parent.name,
                        column_size
                    );
                }
            }
            (Some(pos), block_offset)
        } else {
            (None, 0)
        };

        uniforms.push(UniformDescriptor {
            name,
            byte_size,
            parent_block,
            uniform_type,
            array_length,
            location,
            block_offset,
            matrix_stride: matrix_stride.max(0) as u32,
        });
    }

    uniforms.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(uniforms)
}

type SubroutineTables = (
    Vec<SubroutineUniformDescriptor>,
    Vec<SubroutineDescriptor>,
    Vec<StageSubroutineTable>,
);

fn collect_subroutines_and_uniforms<I: ProgramInterface + ?Sized>(
    iface: &I,
    program: &I::Program,
    label: &str,
) -> Result<SubroutineTables> {
    let mut subroutine_uniforms = Vec::new();
    let mut subroutines = Vec::new();
    let mut stage_tables = Vec::new();

    for stage in iface.program_stages(program).iter_stages() {
        let uniform_kind = InterfaceKind::SubroutineUniform(stage);
        let uniform_count = iface.active_resource_count(program, uniform_kind);

        let mut max_location = 0;
        for index in 0..uniform_count {
            let name = resource_name(iface, program, uniform_kind, index, label)?;
            let location = match iface.resource_location(program, uniform_kind, &name) {
                Some(location) if location >= 0 => location as u32,
                _ => {
                    return Err(reflection_failed(
                        label,
                        format!("subroutine uniform '{}' ({}) has no location", name, stage),
                    ))
                }
            };
            max_location = max_location.max(location + 1);
            subroutine_uniforms.push(SubroutineUniformDescriptor { name, stage, location });
        }

        let routine_kind = InterfaceKind::Subroutine(stage);
        let routine_count = iface.active_resource_count(program, routine_kind);
        for index in 0..routine_count {
            let name = resource_name(iface, program, routine_kind, index, label)?;
            let routine_index = match iface.resource_index(program, routine_kind, &name) {
                Some(routine_index) => routine_index,
                None => {
                    return Err(reflection_failed(
                        label,
                        format!("subroutine '{}' ({}) has no index", name, stage),
                    ))
                }
            };
            subroutines.push(SubroutineDescriptor { name, stage, index: routine_index });
        }

        if uniform_count > 0 {
            let api_locations = iface.active_subroutine_uniform_locations(program, stage);
            stage_tables.push(StageSubroutineTable {
                stage,
                uniform_count,
                max_active_locations: api_locations.max(max_location),
            });
        }
    }

    subroutine_uniforms.sort_by(|a, b| (a.stage, &a.name).cmp(&(b.stage, &b.name)));
    subroutines.sort_by(|a, b| (a.stage, &a.name).cmp(&(b.stage, &b.name)));

    Ok((subroutine_uniforms, subroutines, stage_tables))
}

#[cfg(test)]
#[path = "reflection_index_tests.rs"]
mod tests;
