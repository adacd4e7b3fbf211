/// GlBackend - OpenGL implementation of the program backend traits

use std::ffi::{c_void, CString};
use std::marker::PhantomData;
use std::ptr;

use gl::types::{GLbitfield, GLchar, GLenum, GLint, GLsizei, GLsizeiptr, GLuint};
use xray_gpu_program::xray::backend::{
    InterfaceKind, PipelineBackend, PipelineStage, ProgramBackend, ProgramInterface,
    ResourceProperty, StageFlags, UniformType,
};
use xray_gpu_program::xray::program::GpuProgram;
use xray_gpu_program::xray::{Error, ProgramConfig, Result};
use xray_gpu_program::{xray_bail, xray_info};

use crate::gl_handles::{GlBuffer, GlProgram, GlProgramPipeline};
use crate::gl_mapping::ScopedBufferMapping;
use crate::gl_uniform;

const LOG_SOURCE: &str = "xray::opengl";

/// Entry points beyond GL 3.3 that the backend relies on
const REQUIRED_ENTRY_POINTS: &[(&str, fn() -> bool)] = &[
    ("glGetProgramInterfaceiv", gl::GetProgramInterfaceiv::is_loaded),
    ("glGetProgramResourceName", gl::GetProgramResourceName::is_loaded),
    ("glGetProgramResourceiv", gl::GetProgramResourceiv::is_loaded),
    ("glGetProgramResourceIndex", gl::GetProgramResourceIndex::is_loaded),
    ("glGetProgramResourceLocation", gl::GetProgramResourceLocation::is_loaded),
    ("glGetProgramStageiv", gl::GetProgramStageiv::is_loaded),
    ("glCreateBuffers", gl::CreateBuffers::is_loaded),
    ("glNamedBufferStorage", gl::NamedBufferStorage::is_loaded),
    ("glGetNamedBufferParameteriv", gl::GetNamedBufferParameteriv::is_loaded),
    ("glMapNamedBufferRange", gl::MapNamedBufferRange::is_loaded),
    ("glUnmapNamedBuffer", gl::UnmapNamedBuffer::is_loaded),
    ("glProgramUniform1fv", gl::ProgramUniform1fv::is_loaded),
    ("glProgramUniformMatrix4fv", gl::ProgramUniformMatrix4fv::is_loaded),
    ("glUniformSubroutinesuiv", gl::UniformSubroutinesuiv::is_loaded),
    ("glCreateProgramPipelines", gl::CreateProgramPipelines::is_loaded),
    ("glUseProgramStages", gl::UseProgramStages::is_loaded),
    ("glCreateShaderProgramv", gl::CreateShaderProgramv::is_loaded),
];

/// OpenGL program backend
///
/// Holds no state of its own: GL function pointers are process-wide once
/// loaded. The backend is tied to the thread owning the GL context and is
/// therefore neither `Send` nor `Sync`.
#[derive(Debug, Clone, Copy)]
pub struct GlBackend {
    _context: PhantomData<*const ()>,
}

impl GlBackend {
    /// Load GL function pointers through `loader`
    ///
    /// A context must be current on the calling thread.
    ///
    /// # Errors
    ///
    /// `Error::BackendError` when an entry point of OpenGL 4.5 is missing.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use xray_gpu_program_opengl::xray::opengl::GlBackend;
    /// # fn get_proc_address(_: &str) -> *const std::ffi::c_void { std::ptr::null() }
    ///
    /// let backend = GlBackend::load_with(|symbol| get_proc_address(symbol))?;
    /// # Ok::<(), xray_gpu_program::xray::Error>(())
    /// ```
    pub fn load_with<F>(loader: F) -> Result<Self>
    where
        F: FnMut(&'static str) -> *const c_void,
    {
        gl::load_with(loader);

        let missing: Vec<&str> = REQUIRED_ENTRY_POINTS
            .iter()
            .filter(|(_, is_loaded)| !is_loaded())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            xray_bail!(LOG_SOURCE, "OpenGL 4.5 entry points not available: {}", missing.join(", "));
        }

        xray_info!(LOG_SOURCE, "OpenGL function pointers loaded");
        Ok(Self { _context: PhantomData })
    }

    /// Reflect `program` and wrap it in a `GpuProgram`
    pub fn create_program(&self, program: GlProgram, config: ProgramConfig) -> Result<GpuProgram<GlBackend>> {
        GpuProgram::new(*self, program, config)
    }
}

// ===== CONVERSIONS =====

pub(crate) fn stage_to_gl(stage: PipelineStage) -> GLenum {
    match stage {
        PipelineStage::Vertex => gl::VERTEX_SHADER,
        PipelineStage::TessControl => gl::TESS_CONTROL_SHADER,
        PipelineStage::TessEval => gl::TESS_EVALUATION_SHADER,
        PipelineStage::Geometry => gl::GEOMETRY_SHADER,
        PipelineStage::Fragment => gl::FRAGMENT_SHADER,
        PipelineStage::Compute => gl::COMPUTE_SHADER,
    }
}

pub(crate) fn stage_flags_to_gl(flags: StageFlags) -> GLbitfield {
    flags.iter_stages().fold(0, |bits, stage| {
        bits | match stage {
            PipelineStage::Vertex => gl::VERTEX_SHADER_BIT,
            PipelineStage::TessControl => gl::TESS_CONTROL_SHADER_BIT,
            PipelineStage::TessEval => gl::TESS_EVALUATION_SHADER_BIT,
            PipelineStage::Geometry => gl::GEOMETRY_SHADER_BIT,
            PipelineStage::Fragment => gl::FRAGMENT_SHADER_BIT,
            PipelineStage::Compute => gl::COMPUTE_SHADER_BIT,
        }
    })
}

pub(crate) fn interface_to_gl(kind: InterfaceKind) -> GLenum {
    match kind {
        InterfaceKind::UniformBlock => gl::UNIFORM_BLOCK,
        InterfaceKind::Uniform => gl::UNIFORM,
        InterfaceKind::SubroutineUniform(stage) => match stage {
            PipelineStage::Vertex => gl::VERTEX_SUBROUTINE_UNIFORM,
            PipelineStage::TessControl => gl::TESS_CONTROL_SUBROUTINE_UNIFORM,
            PipelineStage::TessEval => gl::TESS_EVALUATION_SUBROUTINE_UNIFORM,
            PipelineStage::Geometry => gl::GEOMETRY_SUBROUTINE_UNIFORM,
            PipelineStage::Fragment => gl::FRAGMENT_SUBROUTINE_UNIFORM,
            PipelineStage::Compute => gl::COMPUTE_SUBROUTINE_UNIFORM,
        },
        InterfaceKind::Subroutine(stage) => match stage {
            PipelineStage::Vertex => gl::VERTEX_SUBROUTINE,
            PipelineStage::TessControl => gl::TESS_CONTROL_SUBROUTINE,
            PipelineStage::TessEval => gl::TESS_EVALUATION_SUBROUTINE,
            PipelineStage::Geometry => gl::GEOMETRY_SUBROUTINE,
            PipelineStage::Fragment => gl::FRAGMENT_SUBROUTINE,
            PipelineStage::Compute => gl::COMPUTE_SUBROUTINE,
        },
    }
}

pub(crate) fn property_to_gl(property: ResourceProperty) -> GLenum {
    match property {
        ResourceProperty::BufferBinding => gl::BUFFER_BINDING,
        ResourceProperty::BufferDataSize => gl::BUFFER_DATA_SIZE,
        ResourceProperty::BlockIndex => gl::BLOCK_INDEX,
        ResourceProperty::Offset => gl::OFFSET,
        ResourceProperty::Type => gl::TYPE,
        ResourceProperty::ArraySize => gl::ARRAY_SIZE,
        ResourceProperty::Location => gl::LOCATION,
        ResourceProperty::MatrixStride => gl::MATRIX_STRIDE,
    }
}

/// Compare the storage size a buffer reports with the requested size
pub(crate) fn check_storage(requested: u32, reported: GLint) -> Result<()> {
    if reported < 0 || reported as u32 != requested {
        return Err(Error::BufferCreationFailed(format!(
            "glNamedBufferStorage of {} bytes left a buffer of {} bytes",
            requested, reported
        )));
    }
    Ok(())
}

fn interface_value(program: &GlProgram, kind: InterfaceKind, pname: GLenum) -> u32 {
    let mut value: GLint = 0;
    unsafe {
        gl::GetProgramInterfaceiv(program.id, interface_to_gl(kind), pname, &mut value);
    }
    value.max(0) as u32
}

// ===== REFLECTION =====

impl ProgramInterface for GlBackend {
    type Program = GlProgram;

    fn program_id(&self, program: &GlProgram) -> u32 {
        program.id
    }

    fn program_stages(&self, program: &GlProgram) -> StageFlags {
        program.stages
    }

    fn active_resource_count(&self, program: &GlProgram, kind: InterfaceKind) -> u32 {
        interface_value(program, kind, gl::ACTIVE_RESOURCES)
    }

    fn max_name_length(&self, program: &GlProgram, kind: InterfaceKind) -> u32 {
        interface_value(program, kind, gl::MAX_NAME_LENGTH)
    }

    fn resource_name(&self, program: &GlProgram, kind: InterfaceKind, index: u32) -> Option<String> {
        let capacity = self.max_name_length(program, kind).max(1) as usize;
        let mut name = vec![0u8; capacity];
        let mut length: GLsizei = 0;
        unsafe {
            gl::GetProgramResourceName(
                program.id,
                interface_to_gl(kind),
                index,
                capacity as GLsizei,
                &mut length,
                name.as_mut_ptr() as *mut GLchar,
            );
        }
        if length <= 0 {
            return None;
        }
        name.truncate(length as usize);
        String::from_utf8(name).ok()
    }

    fn resource_properties(
        &self,
        program: &GlProgram,
        kind: InterfaceKind,
        index: u32,
        properties: &[ResourceProperty],
    ) -> Vec<i32> {
        let props: Vec<GLenum> = properties.iter().map(|p| property_to_gl(*p)).collect();
        let mut values: Vec<GLint> = vec![0; props.len()];
        let mut written: GLsizei = 0;
        unsafe {
            gl::GetProgramResourceiv(
                program.id,
                interface_to_gl(kind),
                index,
                props.len() as GLsizei,
                props.as_ptr(),
                values.len() as GLsizei,
                &mut written,
                values.as_mut_ptr(),
            );
        }
        values.truncate(written.max(0) as usize);
        values
    }

    fn resource_location(&self, program: &GlProgram, kind: InterfaceKind, name: &str) -> Option<i32> {
        let name = CString::new(name).ok()?;
        let location = unsafe {
            gl::GetProgramResourceLocation(program.id, interface_to_gl(kind), name.as_ptr())
        };
        (location >= 0).then_some(location)
    }

    fn resource_index(&self, program: &GlProgram, kind: InterfaceKind, name: &str) -> Option<u32> {
        let name = CString::new(name).ok()?;
        let index = unsafe {
            gl::GetProgramResourceIndex(program.id, interface_to_gl(kind), name.as_ptr())
        };
        (index != gl::INVALID_INDEX).then_some(index)
    }

    fn active_subroutine_uniform_locations(&self, program: &GlProgram, stage: PipelineStage) -> u32 {
        let mut value: GLint = 0;
        unsafe {
            gl::GetProgramStageiv(
                program.id,
                stage_to_gl(stage),
                gl::ACTIVE_SUBROUTINE_UNIFORM_LOCATIONS,
                &mut value,
            );
        }
        value.max(0) as u32
    }
}

// ===== GPU WRITES =====

impl ProgramBackend for GlBackend {
    type Buffer = GlBuffer;

    fn create_uniform_buffer(&self, size: u32) -> Result<GlBuffer> {
        let mut id: GLuint = 0;
        unsafe {
            gl::CreateBuffers(1, &mut id);
        }
        if id == 0 {
            return Err(Error::BufferCreationFailed("glCreateBuffers returned no buffer".to_string()));
        }
        // Owned from here so the buffer is deleted on the error path too
        let buffer = GlBuffer { id, size };

        // The reported size is checked instead of glGetError, which can hold errors of earlier calls
        let mut reported: GLint = 0;
        unsafe {
            gl::NamedBufferStorage(id, size as GLsizeiptr, ptr::null(), gl::MAP_WRITE_BIT);
            gl::GetNamedBufferParameteriv(id, gl::BUFFER_SIZE, &mut reported);
        }
        check_storage(size, reported)?;

        Ok(buffer)
    }

    fn write_buffer(&self, buffer: &GlBuffer, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }
        let mut mapping = ScopedBufferMapping::new(buffer, data.len())?;
        mapping.write(data)
    }

    fn bind_uniform_buffer(&self, binding_point: u32, buffer: &GlBuffer) {
        unsafe {
            gl::BindBufferBase(gl::UNIFORM_BUFFER, binding_point, buffer.id);
        }
    }

    fn use_program(&self, program: &GlProgram) {
        unsafe {
            gl::UseProgram(program.id);
        }
    }

    fn set_program_uniform(
        &self,
        program: &GlProgram,
        location: i32,
        ty: UniformType,
        data: &[u8],
        count: u32,
        transpose: bool,
    ) {
        gl_uniform::program_uniform(program.id, location, ty, data, count, transpose);
    }

    fn submit_subroutine_indices(&self, stage: PipelineStage, indices: &[u32]) {
        if indices.is_empty() {
            return;
        }
        unsafe {
            gl::UniformSubroutinesuiv(stage_to_gl(stage), indices.len() as GLsizei, indices.as_ptr());
        }
    }
}

// ===== PROGRAM PIPELINES =====

impl PipelineBackend for GlBackend {
    type Pipeline = GlProgramPipeline;

    fn create_program_pipeline(&self) -> Result<GlProgramPipeline> {
        let mut id: GLuint = 0;
        unsafe {
            gl::CreateProgramPipelines(1, &mut id);
        }
        if id == 0 {
            return Err(Error::BackendError("glCreateProgramPipelines returned no pipeline".to_string()));
        }
        Ok(GlProgramPipeline { id })
    }

    fn use_program_stages(&self, pipeline: &GlProgramPipeline, stages: StageFlags, program: Option<&GlProgram>) {
        unsafe {
            gl::UseProgramStages(pipeline.id, stage_flags_to_gl(stages), program.map_or(0, |p| p.id));
        }
    }

    fn bind_program_pipeline(&self, pipeline: &GlProgramPipeline) {
        // A program made current with glUseProgram takes precedence over the pipeline
        unsafe {
            gl::UseProgram(0);
            gl::BindProgramPipeline(pipeline.id);
        }
    }
}

#[cfg(test)]
#[path = "gl_conversion_tests.rs"]
mod tests;
