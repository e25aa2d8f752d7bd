//! Prompt Template System
//!
//! Loads prompt text and fills its `{name}` placeholders.
//!
//! Named prompt loading chain:
//! 1. `{override_dir}/{name}.md` for each configured override directory
//! 2. Embedded fallback compiled into the binary
//!
//! Explicit file paths are read as-is.

pub mod embedded;
mod loader;
mod placeholder;

pub use loader::{PromptLoader, PromptSource};
pub use placeholder::{extract_placeholders, fill, render_value};
