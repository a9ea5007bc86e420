//! Helper functions for rendering
//!
//! Small pure utilities shared by the generator and the templates: localized
//! date formatting, URL assembly, and HTML scrubbing.

mod date;
mod html;
mod url;

pub use date::*;
pub use html::*;
pub use url::*;
