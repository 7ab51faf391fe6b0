//! Core primitives for diffpage (no rendering dependencies).

mod exec;
mod input;

pub use exec::*;
pub use input::*;
