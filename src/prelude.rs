//! Common re-exports for convenient importing.
//!
//! # Example
//!
//! ```rust,ignore
//! use diffpage::prelude::*;
//! ```

pub use crate::core::{resolve, DiffInput, InputError, RawDiff};
pub use crate::output::{preview, publish, Delivery, PublishError};
pub use crate::render::{render, DiffModel, RenderError, RenderOptions};
