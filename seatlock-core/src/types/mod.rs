mod hold;
mod primitives;

pub use hold::*;
pub use primitives::*;
