//! Error types for the Xray GPU program layer
//!
//! Errors fall in two classes. Fatal errors happen while a program is being
//! reflected or built and leave no usable program behind. Recoverable errors are
//! returned by per-call operations (unknown names, size mismatches, failed buffer
//! mappings) and leave the program fully usable.

use std::fmt;
use crate::stage::PipelineStage;

/// Result type for Xray GPU program operations
pub type Result<T> = std::result::Result<T, Error>;

/// Xray GPU program errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A program interface query returned incomplete or invalid data
    ReflectionFailed(String),

    /// A GPU buffer backing a uniform block could not be created
    BufferCreationFailed(String),

    /// Reflection reported a uniform type missing from the type table
    UnsupportedUniformType {
        name: String,
        raw_type: u32,
    },

    /// No uniform block with this name exists in the program
    UnknownUniformBlock(String),

    /// No uniform with this name exists in the program
    UnknownUniform(String),

    /// No subroutine uniform with this name exists in the given stage
    UnknownSubroutineUniform {
        stage: PipelineStage,
        name: String,
    },

    /// No subroutine with this name exists in the given stage
    UnknownSubroutine {
        stage: PipelineStage,
        name: String,
    },

    /// Subroutine and subroutine uniform belong to different stages
    SubroutineStageMismatch {
        uniform: String,
        uniform_stage: PipelineStage,
        subroutine: String,
        subroutine_stage: PipelineStage,
    },

    /// Byte count does not match the reflected size
    SizeMismatch {
        name: String,
        expected: u32,
        actual: usize,
    },

    /// Write outside the block data store
    OutOfBounds {
        offset: usize,
        len: usize,
        capacity: usize,
    },

    /// GPU buffer could not be mapped for writing
    BufferMapFailed(String),

    /// Program does not contain the requested pipeline stage
    StageNotInProgram(PipelineStage),

    /// Shader compilation failed (message holds the driver log)
    CompilationFailed(String),

    /// Program linking failed (message holds the driver log)
    LinkFailed(String),

    /// Backend-specific error (OpenGL, etc.)
    BackendError(String),
}

impl Error {
    /// True for errors that make the program instance unusable.
    ///
    /// Fatal errors are only produced while reflecting or building a program;
    /// the caller has to discard the program and recreate it.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::ReflectionFailed(_)
                | Error::BufferCreationFailed(_)
                | Error::UnsupportedUniformType { .. }
                | Error::CompilationFailed(_)
                | Error::LinkFailed(_)
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ReflectionFailed(msg) => write!(f, "Reflection failed: {}", msg),
            Error::BufferCreationFailed(msg) => write!(f, "Buffer creation failed: {}", msg),
            Error::UnsupportedUniformType { name, raw_type } => {
                write!(f, "Unsupported uniform type {:#x} for uniform '{}'", raw_type, name)
            }
            Error::UnknownUniformBlock(name) => write!(f, "Uniform block '{}' does not exist", name),
            Error::UnknownUniform(name) => write!(f, "Uniform '{}' does not exist", name),
            Error::UnknownSubroutineUniform { stage, name } => {
                write!(f, "Subroutine uniform '{}' does not exist in {} stage", name, stage.name())
            }
            Error::UnknownSubroutine { stage, name } => {
                write!(f, "Subroutine '{}' does not exist in {} stage", name, stage.name())
            }
            Error::SubroutineStageMismatch { uniform, uniform_stage, subroutine, subroutine_stage } => {
                write!(
                    f,
                    "Subroutine '{}' ({} stage) cannot be assigned to subroutine uniform '{}' ({} stage)",
                    subroutine,
                    subroutine_stage.name(),
                    uniform,
                    uniform_stage.name()
                )
            }
            Error::SizeMismatch { name, expected, actual } => {
                write!(f, "Size mismatch for '{}': expected {} bytes, got {}", name, expected, actual)
            }
            Error::OutOfBounds { offset, len, capacity } => {
                write!(f, "Write of {} bytes at offset {} exceeds store size {}", len, offset, capacity)
            }
            Error::BufferMapFailed(msg) => write!(f, "Buffer map failed: {}", msg),
            Error::StageNotInProgram(stage) => write!(f, "Program has no {} stage", stage.name()),
            Error::CompilationFailed(msg) => write!(f, "Shader compilation failed: {}", msg),
            Error::LinkFailed(msg) => write!(f, "Program link failed: {}", msg),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
