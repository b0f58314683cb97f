pub mod id_generator;
pub mod naming;

pub use id_generator::*;
pub use naming::*;
