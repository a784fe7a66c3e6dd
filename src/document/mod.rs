//! Document state management and text utilities.
//!
//! This module provides:
//! - `LineIndex` for efficient byte offset <-> LSP position conversion and line lookup
//! - `DocumentState`, `DocumentSession` and `DocumentStore` for document
//!   lifecycle and tracking of the server's own edits

mod state;
mod text;

pub use state::{DocumentSession, DocumentState, DocumentStore};
pub use text::LineIndex;
