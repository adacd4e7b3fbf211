/// Program reflection: descriptor types and the immutable lookup index

pub mod descriptors;
pub mod reflection_index;

pub use descriptors::{
    UniformBlockDescriptor, UniformDescriptor,
    SubroutineUniformDescriptor, SubroutineDescriptor,
    StageSubroutineTable,
};
pub use reflection_index::ReflectionIndex;
