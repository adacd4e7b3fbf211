/// Configuration for GpuProgram construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramConfig {
    /// Name used as the log source suffix and in diagnostics
    pub label: String,

    /// Upload standalone matrix uniforms with transpose=true
    ///
    /// Block members are always stored as written, so this stays `false` for
    /// column-major data such as `glam` matrices.
    pub transpose_matrices: bool,

    /// Dump the reflected tables at debug severity after construction
    pub log_reflection: bool,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            label: "gpu_program".to_string(),
            transpose_matrices: false,
            log_reflection: false,
        }
    }
}

impl ProgramConfig {
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_transpose_matrices(mut self, transpose: bool) -> Self {
        self.transpose_matrices = transpose;
        self
    }

    pub fn with_log_reflection(mut self, enabled: bool) -> Self {
        self.log_reflection = enabled;
        self
    }
}
