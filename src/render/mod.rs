//! Rendering: DOT emission and the external layout backend.

mod backend;
mod dot;
mod format;

pub use backend::{Backend, RenderError};
pub use dot::{quote, to_dot, ElementStyles, Scene};
pub use format::{Layout, OutputFormat, UnsupportedFormatError, UnsupportedLayoutError};
