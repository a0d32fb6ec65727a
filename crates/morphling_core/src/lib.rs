mod namespace;
mod options;
mod program;
mod structs;

pub use namespace::*;
pub use options::CompileOptions;
pub use program::*;
pub use structs::*;
