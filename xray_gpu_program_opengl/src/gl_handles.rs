/// RAII wrappers for OpenGL objects
///
/// Each handle deletes its GL object when dropped. Handles must be dropped
/// while the context that created them is current.

use gl::types::GLuint;
use xray_gpu_program::xray::backend::StageFlags;

/// Linked program object
#[derive(Debug)]
pub struct GlProgram {
    pub(crate) id: GLuint,
    pub(crate) stages: StageFlags,
}

impl GlProgram {
    /// Take ownership of a program linked outside of `ProgramBuilder`
    ///
    /// # Safety
    ///
    /// `id` must name a successfully linked program of the current context
    /// containing exactly `stages`, and must not be deleted elsewhere.
    pub unsafe fn from_raw(id: GLuint, stages: StageFlags) -> Self {
        Self { id, stages }
    }

    pub fn id(&self) -> GLuint {
        self.id
    }

    pub fn stages(&self) -> StageFlags {
        self.stages
    }
}

impl Drop for GlProgram {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteProgram(self.id);
        }
    }
}

/// Immutable-storage buffer backing one uniform block
#[derive(Debug)]
pub struct GlBuffer {
    pub(crate) id: GLuint,
    pub(crate) size: u32,
}

impl GlBuffer {
    pub fn id(&self) -> GLuint {
        self.id
    }

    /// Storage size in bytes
    pub fn size(&self) -> u32 {
        self.size
    }
}

impl Drop for GlBuffer {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteBuffers(1, &self.id);
        }
    }
}

/// Program pipeline object
#[derive(Debug)]
pub struct GlProgramPipeline {
    pub(crate) id: GLuint,
}

impl GlProgramPipeline {
    pub fn id(&self) -> GLuint {
        self.id
    }
}

impl Drop for GlProgramPipeline {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteProgramPipelines(1, &self.id);
        }
    }
}

/// Shader object, only alive while a program is being linked
#[derive(Debug)]
pub(crate) struct GlShader {
    pub(crate) id: GLuint,
}

impl Drop for GlShader {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteShader(self.id);
        }
    }
}
