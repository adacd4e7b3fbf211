/*!
# Xray GPU Program - OpenGL Backend

OpenGL 4.5 implementation of the Xray GPU program backend traits.

This crate implements `ProgramInterface`, `ProgramBackend` and `PipelineBackend`
using the `gl` bindings crate: program interface queries for reflection,
direct state access buffers mapped for each upload, the `glProgramUniform*`
family for standalone uniforms, and program pipeline objects for separable
programs.

Function pointers are loaded once with `GlBackend::load_with`, using the
loader of whatever windowing library owns the GL context.
*/

mod gl_backend;
mod gl_handles;
mod gl_mapping;
mod gl_uniform;
mod program_builder;

pub mod xray {
    pub mod opengl {
        pub use crate::gl_backend::GlBackend;
        pub use crate::gl_handles::{GlBuffer, GlProgram, GlProgramPipeline};
        pub use crate::gl_mapping::ScopedBufferMapping;
        pub use crate::program_builder::{ProgramBuilder, ShaderSource};
    }
}

/// Program façade over the OpenGL backend
pub type GlGpuProgram = xray_gpu_program::xray::program::GpuProgram<gl_backend::GlBackend>;

/// Program pipeline over the OpenGL backend
pub type GlPipeline = xray_gpu_program::xray::program::ProgramPipeline<gl_backend::GlBackend>;
