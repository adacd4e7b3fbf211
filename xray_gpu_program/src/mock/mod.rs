/// Call-recording mock backend and program descriptions

pub mod mock_backend;
pub mod mock_program_desc;

pub use mock_backend::{MockBackend, MockBuffer, MockCall, MockPipeline};
pub use mock_program_desc::{
    MockProgramDesc, MockProgram,
    MockBlockDesc, MockUniformDesc, MockSubroutineUniformDesc, MockSubroutineDesc,
};
