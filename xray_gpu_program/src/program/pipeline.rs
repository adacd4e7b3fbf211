/// ProgramPipeline - combines separable single-stage programs
///
/// Each pipeline stage owns at most one `GpuProgram`. Binding the pipeline
/// flushes every attached program's uniform blocks, binds the pipeline object
/// and then submits each program's subroutine indices.

use crate::backend::PipelineBackend;
use crate::error::{Error, Result};
use crate::program::gpu_program::{BindStats, GpuProgram};
use crate::stage::{PipelineStage, StageFlags};
use crate::{xray_debug, xray_error};

const LOG_SOURCE: &str = "xray::ProgramPipeline";

pub struct ProgramPipeline<B: PipelineBackend> {
    backend: B,
    pipeline: B::Pipeline,
    programs: [Option<GpuProgram<B>>; PipelineStage::COUNT],
}

impl<B: PipelineBackend> ProgramPipeline<B> {
    /// Create an empty pipeline object
    pub fn new(backend: B) -> Result<Self> {
        let pipeline = backend.create_program_pipeline().map_err(|err| {
            xray_error!(LOG_SOURCE, "Failed to create program pipeline: {}", err);
            err
        })?;

        Ok(Self {
            backend,
            pipeline,
            programs: Default::default(),
        })
    }

    /// Attach `program` to `stage`, returning the previously attached program
    ///
    /// # Errors
    ///
    /// `Error::StageNotInProgram` when `program` was not linked with `stage`.
    /// The rejected program is dropped.
    pub fn use_stage(&mut self, stage: PipelineStage, program: GpuProgram<B>) -> Result<Option<GpuProgram<B>>> {
        if !program.stages().has_stage(stage) {
            let err = Error::StageNotInProgram(stage);
            xray_error!(LOG_SOURCE, "[{}] {}", program.label(), err);
            return Err(err);
        }

        self.backend
            .use_program_stages(&self.pipeline, stage.flag(), Some(program.handle()));
        xray_debug!(LOG_SOURCE, "[{}] attached to {} stage", program.label(), stage);

        Ok(self.programs[stage.index()].replace(program))
    }

    /// Detach the program of `stage`
    pub fn disable_stage(&mut self, stage: PipelineStage) -> Option<GpuProgram<B>> {
        self.backend.use_program_stages(&self.pipeline, stage.flag(), None);
        self.programs[stage.index()].take()
    }

    pub fn stage_program(&self, stage: PipelineStage) -> Option<&GpuProgram<B>> {
        self.programs[stage.index()].as_ref()
    }

    pub fn stage_program_mut(&mut self, stage: PipelineStage) -> Option<&mut GpuProgram<B>> {
        self.programs[stage.index()].as_mut()
    }

    /// Stages with an attached program
    pub fn attached_stages(&self) -> StageFlags {
        PipelineStage::ALL
            .into_iter()
            .filter(|stage| self.programs[stage.index()].is_some())
            .fold(StageFlags::empty(), |flags, stage| flags | stage.flag())
    }

    pub fn handle(&self) -> &B::Pipeline {
        &self.pipeline
    }

    /// Prepare the pipeline for a draw call
    pub fn bind(&mut self) -> BindStats {
        let mut stats = BindStats::default();

        for program in self.programs.iter_mut().flatten() {
            stats = stats.merged(program.flush_blocks());
        }

        self.backend.bind_program_pipeline(&self.pipeline);

        for (stage, slot) in PipelineStage::ALL.into_iter().zip(self.programs.iter_mut()) {
            if let Some(program) = slot {
                stats.subroutine_stages_submitted += program.submit_subroutines(stage.flag());
            }
        }

        stats
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
