//! Programmable pipeline stages
//!
//! `PipelineStage` names a single stage. `StageFlags` is the bit set used to
//! describe which stages a linked program contains.

use bitflags::bitflags;

/// A single programmable pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PipelineStage {
    Vertex,
    TessControl,
    TessEval,
    Geometry,
    Fragment,
    Compute,
}

impl PipelineStage {
    /// All stages, in pipeline order
    pub const ALL: [PipelineStage; 6] = [
        PipelineStage::Vertex,
        PipelineStage::TessControl,
        PipelineStage::TessEval,
        PipelineStage::Geometry,
        PipelineStage::Fragment,
        PipelineStage::Compute,
    ];

    /// Number of stages
    pub const COUNT: usize = Self::ALL.len();

    /// Dense index in `0..COUNT`, usable for per-stage arrays
    pub fn index(self) -> usize {
        match self {
            PipelineStage::Vertex => 0,
            PipelineStage::TessControl => 1,
            PipelineStage::TessEval => 2,
            PipelineStage::Geometry => 3,
            PipelineStage::Fragment => 4,
            PipelineStage::Compute => 5,
        }
    }

    /// Lowercase stage name used in log and error messages
    pub fn name(self) -> &'static str {
        match self {
            PipelineStage::Vertex => "vertex",
            PipelineStage::TessControl => "tessellation control",
            PipelineStage::TessEval => "tessellation evaluation",
            PipelineStage::Geometry => "geometry",
            PipelineStage::Fragment => "fragment",
            PipelineStage::Compute => "compute",
        }
    }

    /// Single-bit flag for this stage
    pub fn flag(self) -> StageFlags {
        match self {
            PipelineStage::Vertex => StageFlags::VERTEX,
            PipelineStage::TessControl => StageFlags::TESS_CONTROL,
            PipelineStage::TessEval => StageFlags::TESS_EVAL,
            PipelineStage::Geometry => StageFlags::GEOMETRY,
            PipelineStage::Fragment => StageFlags::FRAGMENT,
            PipelineStage::Compute => StageFlags::COMPUTE,
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// Set of pipeline stages
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StageFlags: u32 {
        const VERTEX = 1 << 0;
        const TESS_CONTROL = 1 << 1;
        const TESS_EVAL = 1 << 2;
        const GEOMETRY = 1 << 3;
        const FRAGMENT = 1 << 4;
        const COMPUTE = 1 << 5;
        const GRAPHICS = Self::VERTEX.bits()
            | Self::TESS_CONTROL.bits()
            | Self::TESS_EVAL.bits()
            | Self::GEOMETRY.bits()
            | Self::FRAGMENT.bits();
    }
}

impl StageFlags {
    /// Stages contained in this set, in pipeline order
    pub fn iter_stages(self) -> impl Iterator<Item = PipelineStage> {
        PipelineStage::ALL
            .into_iter()
            .filter(move |stage| self.contains(stage.flag()))
    }

    pub fn has_stage(self, stage: PipelineStage) -> bool {
        self.contains(stage.flag())
    }
}

impl From<PipelineStage> for StageFlags {
    fn from(stage: PipelineStage) -> Self {
        stage.flag()
    }
}

#[cfg(test)]
#[path = "stage_tests.rs"]
mod tests;
