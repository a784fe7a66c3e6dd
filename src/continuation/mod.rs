//! The continuation engine.
//!
//! This module provides:
//! - `classify` for deciding whether a newline insertion landed inside a doc comment
//! - `synthesize` for computing the comment-prefix edits to apply on the new line

mod classify;
mod synthesize;

pub use classify::{classify, ChangeEvent, Classification};
pub use synthesize::{synthesize, EditOp};
