/// ScopedBufferMapping - write access to a buffer's data store
///
/// The buffer is mapped with `glMapNamedBufferRange` on creation and unmapped
/// with `glUnmapNamedBuffer` when the mapping is dropped.

use gl::types::{GLintptr, GLsizeiptr};
use xray_gpu_program::xray::{Error, Result};
use xray_gpu_program::xray_error;

use crate::gl_handles::GlBuffer;

const LOG_SOURCE: &str = "xray::opengl";

pub struct ScopedBufferMapping<'a> {
    buffer: &'a GlBuffer,
    ptr: *mut u8,
    len: usize,
}

impl<'a> ScopedBufferMapping<'a> {
    /// Map the first `len` bytes of `buffer` for writing
    ///
    /// The previous contents of the range are invalidated.
    pub fn new(buffer: &'a GlBuffer, len: usize) -> Result<Self> {
        if len == 0 || len > buffer.size as usize {
            return Err(Error::BufferMapFailed(format!(
                "cannot map {} bytes of buffer {} ({} bytes)",
                len, buffer.id, buffer.size
            )));
        }

        let ptr = unsafe {
            gl::MapNamedBufferRange(
                buffer.id,
                0 as GLintptr,
                len as GLsizeiptr,
                gl::MAP_WRITE_BIT | gl::MAP_INVALIDATE_RANGE_BIT,
            )
        };
        if ptr.is_null() {
            let code = unsafe { gl::GetError() };
            return Err(Error::BufferMapFailed(format!(
                "glMapNamedBufferRange on buffer {} failed (error {:#x})",
                buffer.id, code
            )));
        }

        Ok(Self {
            buffer,
            ptr: ptr as *mut u8,
            len,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Copy `data` to the start of the mapped range
    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        if data.len() > self.len {
            return Err(Error::OutOfBounds {
                offset: 0,
                len: data.len(),
                capacity: self.len,
            });
        }
        unsafe {
            std::ptr::copy_nonoverlapping(data.as_ptr(), self.ptr, data.len());
        }
        Ok(())
    }
}

impl Drop for ScopedBufferMapping<'_> {
    fn drop(&mut self) {
        let unmapped = unsafe { gl::UnmapNamedBuffer(self.buffer.id) };
        if unmapped == gl::FALSE {
            xray_error!(
                LOG_SOURCE,
                "glUnmapNamedBuffer on buffer {} failed, its data store is undefined",
                self.buffer.id
            );
        }
    }
}
