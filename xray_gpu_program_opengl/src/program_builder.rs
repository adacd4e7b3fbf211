/// ProgramBuilder - compiles and links GLSL programs
///
/// Sources are assembled from blocks (inline strings or files) in the order
/// they were added. A separable build uses the blocks as the whole source of
/// one stage; a multi-stage link prepends them to each stage source.

use std::ffi::CString;
use std::path::{Path, PathBuf};
use std::ptr;

use gl::types::{GLchar, GLint, GLsizei, GLuint};
use xray_gpu_program::xray::backend::{PipelineStage, StageFlags};
use xray_gpu_program::xray::{Error, Result};
use xray_gpu_program::{xray_critical, xray_debug};

use crate::gl_backend::{stage_to_gl, GlBackend};
use crate::gl_handles::{GlProgram, GlShader};

const LOG_SOURCE: &str = "xray::opengl::ProgramBuilder";

/// One block of GLSL source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderSource {
    Inline(String),
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct ProgramBuilder {
    label: String,
    blocks: Vec<ShaderSource>,
    separable: bool,
}

impl ProgramBuilder {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            blocks: Vec::new(),
            separable: false,
        }
    }

    /// Append an inline source block
    pub fn source(mut self, text: impl Into<String>) -> Self {
        self.blocks.push(ShaderSource::Inline(text.into()));
        self
    }

    /// Append a source block read from `path` at build time
    pub fn source_file(mut self, path: impl AsRef<Path>) -> Self {
        self.blocks.push(ShaderSource::File(path.as_ref().to_path_buf()));
        self
    }

    /// Mark programs produced by `link` as separable
    pub fn separable(mut self, separable: bool) -> Self {
        self.separable = separable;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn blocks(&self) -> &[ShaderSource] {
        &self.blocks
    }

    /// Concatenate every block followed by `stage_source`
    ///
    /// Blocks are joined strictly in the order they were added, so inline and
    /// file blocks can be interleaved; a file block added before an inline
    /// `#version` line ends up before it.
    ///
    /// # Errors
    ///
    /// `Error::CompilationFailed` when a file block cannot be read or the
    /// result contains a NUL byte.
    pub fn assemble(&self, stage_source: Option<&str>) -> Result<CString> {
        let mut text = String::new();
        for block in &self.blocks {
            match block {
                ShaderSource::Inline(source) => text.push_str(source),
                ShaderSource::File(path) => {
                    let source = std::fs::read_to_string(path).map_err(|err| {
                        self.fail(Error::CompilationFailed(format!(
                            "cannot read shader source {}: {}",
                            path.display(),
                            err
                        )))
                    })?;
                    text.push_str(&source);
                }
            }
            if !text.ends_with('\n') {
                text.push('\n');
            }
        }
        if let Some(source) = stage_source {
            text.push_str(source);
        }

        CString::new(text).map_err(|_| {
            self.fail(Error::CompilationFailed("shader source contains a NUL byte".to_string()))
        })
    }

    /// Build a single-stage separable program with `glCreateShaderProgramv`
    pub fn build_separable(&self, _backend: &GlBackend, stage: PipelineStage) -> Result<GlProgram> {
        let source = self.assemble(None)?;
        let sources = [source.as_ptr()];

        let id = unsafe { gl::CreateShaderProgramv(stage_to_gl(stage), 1, sources.as_ptr()) };
        if id == 0 {
            return Err(self.fail(Error::CompilationFailed(format!(
                "glCreateShaderProgramv failed for {} stage",
                stage
            ))));
        }
        let program = GlProgram { id, stages: stage.flag() };

        if !link_status(id) {
            return Err(self.fail(Error::LinkFailed(program_info_log(id))));
        }

        xray_debug!(LOG_SOURCE, "[{}] separable {} program {} built", self.label, stage, id);
        Ok(program)
    }

    /// Compile each `(stage, source)` pair and link them into one program
    pub fn link(&self, _backend: &GlBackend, stages: &[(PipelineStage, &str)]) -> Result<GlProgram> {
        let mut shaders = Vec::with_capacity(stages.len());
        let mut flags = StageFlags::empty();
        for (stage, source) in stages {
            shaders.push(self.compile(*stage, source)?);
            flags |= stage.flag();
        }

        let id = unsafe { gl::CreateProgram() };
        if id == 0 {
            return Err(self.fail(Error::LinkFailed("glCreateProgram returned no program".to_string())));
        }
        let program = GlProgram { id, stages: flags };

        unsafe {
            if self.separable {
                gl::ProgramParameteri(id, gl::PROGRAM_SEPARABLE, gl::TRUE as GLint);
            }
            for shader in &shaders {
                gl::AttachShader(id, shader.id);
            }
            gl::LinkProgram(id);
            for shader in &shaders {
                gl::DetachShader(id, shader.id);
            }
        }

        if !link_status(id) {
            return Err(self.fail(Error::LinkFailed(program_info_log(id))));
        }

        xray_debug!(LOG_SOURCE, "[{}] program {} linked ({:?})", self.label, id, flags);
        Ok(program)
    }

    fn compile(&self, stage: PipelineStage, source: &str) -> Result<GlShader> {
        let source = self.assemble(Some(source))?;

        let id = unsafe { gl::CreateShader(stage_to_gl(stage)) };
        if id == 0 {
            return Err(self.fail(Error::CompilationFailed(format!(
                "glCreateShader failed for {} stage",
                stage
            ))));
        }
        let shader = GlShader { id };

        let mut status: GLint = 0;
        unsafe {
            gl::ShaderSource(id, 1, &source.as_ptr(), ptr::null());
            gl::CompileShader(id);
            gl::GetShaderiv(id, gl::COMPILE_STATUS, &mut status);
        }
        if status != gl::TRUE as GLint {
            return Err(self.fail(Error::CompilationFailed(format!(
                "{} stage: {}",
                stage,
                shader_info_log(id)
            ))));
        }

        Ok(shader)
    }

    fn fail(&self, err: Error) -> Error {
        xray_critical!(LOG_SOURCE, "[{}] {}", self.label, err);
        err
    }
}

fn link_status(program: GLuint) -> bool {
    let mut status: GLint = 0;
    unsafe {
        gl::GetProgramiv(program, gl::LINK_STATUS, &mut status);
    }
    status == gl::TRUE as GLint
}

fn program_info_log(program: GLuint) -> String {
    let mut length: GLint = 0;
    unsafe {
        gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut length);
    }
    read_info_log(length, |capacity, written, buffer| unsafe {
        gl::GetProgramInfoLog(program, capacity, written, buffer)
    })
}

fn shader_info_log(shader: GLuint) -> String {
    let mut length: GLint = 0;
    unsafe {
        gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut length);
    }
    read_info_log(length, |capacity, written, buffer| unsafe {
        gl::GetShaderInfoLog(shader, capacity, written, buffer)
    })
}

fn read_info_log<F>(length: GLint, fetch: F) -> String
where
    F: FnOnce(GLsizei, *mut GLsizei, *mut GLchar),
{
    if length <= 0 {
        return "no info log".to_string();
    }
    let mut buffer = vec![0u8; length as usize];
    let mut written: GLsizei = 0;
    fetch(length, &mut written, buffer.as_mut_ptr() as *mut GLchar);
    buffer.truncate(written.max(0) as usize);
    String::from_utf8_lossy(&buffer).trim_end().to_string()
}

#[cfg(test)]
#[path = "program_builder_tests.rs"]
mod tests;
