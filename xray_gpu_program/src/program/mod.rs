/// GpuProgram façade, its block data store and separable-program pipelines

pub mod block_store;
pub mod gpu_program;
pub mod pipeline;

pub use block_store::BlockDataStore;
pub use gpu_program::{BindStats, GpuProgram};
pub use pipeline::ProgramPipeline;
