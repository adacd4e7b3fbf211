/*!
# Xray GPU Program

Reflection-driven GPU program abstraction for the Xray rendering framework.

A linked GPU program is introspected once at construction time. The reflection
pass builds name-sorted lookup tables for uniform blocks, standalone uniforms and
subroutine uniforms, and lays out a single CPU-side mirror buffer holding the
contents of every uniform block. Uniform writes only touch that mirror and mark the
owning block dirty; dirty blocks are uploaded lazily when the program is bound for
the next draw call.

## Architecture

- **ProgramInterface / ProgramBackend**: Traits describing the graphics API call
  surface (reflection queries, buffer uploads, bindings, uniform dispatch)
- **ReflectionIndex**: Immutable name → descriptor tables built at link time
- **BlockDataStore**: Contiguous byte arena mirroring all uniform blocks
- **GpuProgram**: Façade composing reflection, block store and GPU buffers
- **ProgramPipeline**: Combines separable single-stage programs
- **MockBackend**: Call-recording backend for tests (no GPU required)

Backend implementations (OpenGL) live in their own crates and implement the
backend traits.
*/

// Internal modules
mod error;
pub mod log;
pub mod config;
pub mod stage;
pub mod uniform_type;
pub mod backend;
pub mod reflection;
pub mod program;
pub mod mock;

// Main xray namespace module
pub mod xray {
    // Error types
    pub use crate::error::{Error, Result};

    // Configuration
    pub use crate::config::ProgramConfig;

    // Logging sub-module (types and functions, macros are exported at crate root)
    pub mod log {
        pub use crate::log::{
            Logger, LogEntry, LogSeverity, DefaultLogger,
            set_logger, reset_logger, log, log_detailed,
        };
    }

    // Backend traits and shared enums
    pub mod backend {
        pub use crate::backend::*;
        pub use crate::stage::{PipelineStage, StageFlags};
        pub use crate::uniform_type::UniformType;
    }

    // Reflection tables
    pub mod reflection {
        pub use crate::reflection::*;
    }

    // Program façade and pipeline
    pub mod program {
        pub use crate::program::*;
    }

    // Mock backend
    pub mod mock {
        pub use crate::mock::*;
    }
}

// Re-export math library at crate root
pub use glam;
pub use bytemuck;
