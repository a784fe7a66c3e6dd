//! Conversion from buffer operations to LSP text edits.

use tower_lsp::lsp_types::TextEdit;

use crate::continuation::EditOp;
use crate::document::LineIndex;

/// Convert buffer operations into LSP text edits.
///
/// Operation offsets refer to the snapshot `line_index` was built from; the
/// resulting edits are only meaningful applied together against that same
/// snapshot, which is what a single `WorkspaceEdit` guarantees.
pub fn to_text_edits(ops: &[EditOp], line_index: &LineIndex) -> Vec<TextEdit> {
    ops.iter()
        .map(|op| match op {
            EditOp::Insert { at, text } => TextEdit {
                range: line_index.span_to_range(&(*at..*at)),
                new_text: text.clone(),
            },
            EditOp::Delete { at, len } => TextEdit {
                range: line_index.span_to_range(&(*at..*at + *len)),
                new_text: String::new(),
            },
        })
        .collect()
}
