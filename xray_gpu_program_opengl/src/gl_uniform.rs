/// Standalone uniform uploads through the glProgramUniform* family

use gl::types::{GLboolean, GLfloat, GLint, GLsizei, GLuint};
use xray_gpu_program::xray::backend::UniformType;

fn floats(data: &[u8]) -> Vec<GLfloat> {
    bytemuck::pod_collect_to_vec(data)
}

fn ints(data: &[u8]) -> Vec<GLint> {
    bytemuck::pod_collect_to_vec(data)
}

fn uints(data: &[u8]) -> Vec<GLuint> {
    bytemuck::pod_collect_to_vec(data)
}

/// Upload `count` elements of `ty` to `location` of `program`
///
/// Matrix data is transposed by the driver when `transpose` is set.
pub(crate) fn program_uniform(
    program: GLuint,
    location: GLint,
    ty: UniformType,
    data: &[u8],
    count: u32,
    transpose: bool,
) {
    let count = count as GLsizei;
    let transpose: GLboolean = if transpose { gl::TRUE } else { gl::FALSE };

    unsafe {
        match ty {
            UniformType::Float => {
                let values = floats(data);
                gl::ProgramUniform1fv(program, location, count, values.as_ptr());
            }
            UniformType::Vec2 => {
                let values = floats(data);
                gl::ProgramUniform2fv(program, location, count, values.as_ptr());
            }
            UniformType::Vec3 => {
                let values = floats(data);
                gl::ProgramUniform3fv(program, location, count, values.as_ptr());
            }
            UniformType::Vec4 => {
                let values = floats(data);
                gl::ProgramUniform4fv(program, location, count, values.as_ptr());
            }
            UniformType::UInt => {
                let values = uints(data);
                gl::ProgramUniform1uiv(program, location, count, values.as_ptr());
            }
            // Samplers take the texture unit as a signed integer
            UniformType::Int
            | UniformType::Sampler1D
            | UniformType::Sampler2D
            | UniformType::Sampler2DArray
            | UniformType::SamplerCube => {
                let values = ints(data);
                gl::ProgramUniform1iv(program, location, count, values.as_ptr());
            }
            UniformType::Mat2 => {
                let values = floats(data);
                gl::ProgramUniformMatrix2fv(program, location, count, transpose, values.as_ptr());
            }
            UniformType::Mat2x3 => {
                let values = floats(data);
                gl::ProgramUniformMatrix2x3fv(program, location, count, transpose, values.as_ptr());
            }
            UniformType::Mat3x2 => {
                let values = floats(data);
                gl::ProgramUniformMatrix3x2fv(program, location, count, transpose, values.as_ptr());
            }
            UniformType::Mat3 => {
                let values = floats(data);
                gl::ProgramUniformMatrix3fv(program, location, count, transpose, values.as_ptr());
            }
            UniformType::Mat4 => {
                let values = floats(data);
                gl::ProgramUniformMatrix4fv(program, location, count, transpose, values.as_ptr());
            }
        }
    }
}
