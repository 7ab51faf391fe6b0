//! diffpage - unified diffs as self-contained HTML pages.
//!
//! A three-stage pipeline: resolve where the raw diff comes from (a file,
//! standard input, or a live `git diff`), render it as a JSON model or a
//! styled HTML document, and dispatch the result to a temp-file preview,
//! standard output, a file, or the diffy.org paste service.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use diffpage::prelude::*;
//!
//! let raw = resolve(&DiffInput::File("changes.diff".into()))?;
//! let page = render(&RenderOptions::default(), &raw)?;
//! ```

#![deny(missing_docs)]

pub mod core;
pub mod output;
pub mod prelude;
pub mod render;
