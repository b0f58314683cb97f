mod compiler;
mod context;

pub use compiler::{compile_to_react, CompileError};
pub use context::{CompileOptions, CompilerContext};
