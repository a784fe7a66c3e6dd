//! LSP protocol feature implementations.
//!
//! This module converts the continuation engine's buffer operations into the
//! text edits sent back through `workspace/applyEdit`.

mod edits;

pub use edits::to_text_edits;
