//! Unit tests for program_builder.rs
//!
//! Only source assembly is tested here, compiling needs a GL context.

use super::*;

#[test]
fn test_builder_defaults() {
    let builder = ProgramBuilder::new("forward");

    assert_eq!(builder.label(), "forward");
    assert!(builder.blocks().is_empty());
    assert!(!builder.separable);
}

#[test]
fn test_blocks_kept_in_order() {
    let builder = ProgramBuilder::new("forward")
        .source("#version 450")
        .source_file("shaders/common.glsl")
        .source("void main() {}");

    assert_eq!(
        builder.blocks(),
        &[
            ShaderSource::Inline("#version 450".to_string()),
            ShaderSource::File(PathBuf::from("shaders/common.glsl")),
            ShaderSource::Inline("void main() {}".to_string()),
        ]
    );
}

#[test]
fn test_assemble_joins_blocks_with_newlines() {
    let builder = ProgramBuilder::new("forward")
        .source("#version 450 core")
        .source("layout(std140) uniform Transforms { mat4 world_view_proj; };\n");

    let source = builder.assemble(Some("void main() {}")).unwrap();

    assert_eq!(
        source.to_str().unwrap(),
        "#version 450 core\nlayout(std140) uniform Transforms { mat4 world_view_proj; };\nvoid main() {}"
    );
}

#[test]
fn test_assemble_reads_file_blocks() {
    let path = std::env::temp_dir().join(format!("xray_builder_{}.glsl", std::process::id()));
    std::fs::write(&path, "const float PI = 3.14159;").unwrap();

    let builder = ProgramBuilder::new("forward")
        .source("#version 450 core")
        .source_file(&path);
    let source = builder.assemble(None);
    std::fs::remove_file(&path).unwrap();

    assert_eq!(
        source.unwrap().to_str().unwrap(),
        "#version 450 core\nconst float PI = 3.14159;\n"
    );
}

#[test]
fn test_assemble_keeps_file_and_inline_blocks_interleaved() {
    let path = std::env::temp_dir().join(format!("xray_builder_order_{}.glsl", std::process::id()));
    std::fs::write(&path, "#version 450 core\n").unwrap();

    let builder = ProgramBuilder::new("forward")
        .source_file(&path)
        .source("#define LIGHT_COUNT 4");
    let source = builder.assemble(Some("void main() {}"));
    std::fs::remove_file(&path).unwrap();

    assert_eq!(
        source.unwrap().to_str().unwrap(),
        "#version 450 core\n#define LIGHT_COUNT 4\nvoid main() {}"
    );
}

#[test]
fn test_assemble_missing_file_fails() {
    let builder = ProgramBuilder::new("forward").source_file("/nonexistent/xray/shader.glsl");

    let result = builder.assemble(None);

    assert!(matches!(result, Err(Error::CompilationFailed(msg)) if msg.contains("shader.glsl")));
}

#[test]
fn test_assemble_rejects_nul_byte() {
    let builder = ProgramBuilder::new("forward").source("void main() {}\0");

    assert!(matches!(builder.assemble(None), Err(Error::CompilationFailed(_))));
}

#[test]
fn test_separable_flag() {
    let builder = ProgramBuilder::new("forward").separable(true);

    assert!(builder.separable);
}
