//! Synthesis of the continuation edits for a classified newline insertion.

use super::classify::{ChangeEvent, Classification};
use crate::document::LineIndex;

/// One buffer operation. Offsets refer to the post-change snapshot, and a
/// batch of operations is meant to be applied as a single atomic edit
/// against that snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    /// Insert `text` at byte offset `at`.
    Insert { at: usize, text: String },
    /// Delete `len` bytes starting at byte offset `at`.
    Delete { at: usize, len: usize },
}

/// Compute the edits for a classified newline insertion.
///
/// `line_index` must be the pre-change snapshot the classification was made
/// against; the produced offsets are valid in the post-change snapshot.
pub fn synthesize(
    line_index: &LineIndex,
    event: &ChangeEvent,
    classification: &Classification,
) -> Vec<EditOp> {
    // Cursor within the leading whitespace: the plain newline stands as-is.
    if !classification.after_indent {
        return Vec::new();
    }

    // The inserted text already carries a marker (paste or auto-pair
    // interactions); adding another would double it up.
    if event.new_text.contains('*') {
        return Vec::new();
    }

    let line_text = match line_index
        .line_at_offset(event.old_position)
        .and_then(|line| line_index.line_text(line))
    {
        Some(text) => text,
        None => return Vec::new(),
    };

    let cursor = classification.cursor_offset_in_line;
    let after_cursor = &line_text[cursor..];
    let after_cursor_trim = after_cursor.trim_start();

    let mut append = if classification.is_comment_start {
        " * "
    } else {
        "* "
    };

    let mut ops = Vec::new();

    if after_cursor_trim.starts_with('*') {
        // A marker already sits after the cursor: reuse it instead of adding
        // another, and pull it up against the fresh indentation.
        append = &append[..append.len() - 2];
        let gap = after_cursor.len() - after_cursor_trim.len();
        ops.push(EditOp::Delete {
            at: event.new_end,
            len: gap,
        });

        // Keep "* text" spacing intact unless the marker closes the comment
        // or is already followed by whitespace.
        let next_char = line_text[cursor + gap + 1..].chars().next();
        let already_spaced = matches!(next_char, Some('/')) // "*/" closer
            || next_char.map_or(false, char::is_whitespace);
        if !already_spaced {
            ops.push(EditOp::Insert {
                at: event.new_end + gap + 1,
                text: " ".to_string(),
            });
        }
    }

    ops.push(EditOp::Insert {
        at: event.new_end,
        text: format!("{}{}", &line_text[..classification.indent_index], append),
    });

    ops
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::continuation::classify;

    /// Press Enter at `offset` in `source` and return the resulting text, or
    /// the plain split when no continuation applies.
    fn press_enter(source: &str, offset: usize) -> String {
        let index = LineIndex::new(source.to_string());
        let event = ChangeEvent {
            old_position: offset,
            new_text: "\n".to_string(),
            new_end: offset + 1,
        };
        let ops = classify(&index, &event)
            .map(|cls| synthesize(&index, &event, &cls))
            .unwrap_or_default();

        let mut text = source.to_string();
        text.insert(offset, '\n');
        apply_ops(&mut text, ops);
        text
    }

    /// Apply a batch atomically: highest offset first, deletes before inserts
    /// at the same offset.
    fn apply_ops(text: &mut String, mut ops: Vec<EditOp>) {
        ops.sort_by_key(|op| {
            let (at, is_delete) = match op {
                EditOp::Insert { at, .. } => (*at, 0),
                EditOp::Delete { at, .. } => (*at, 1),
            };
            std::cmp::Reverse((at, is_delete))
        });
        for op in ops {
            match op {
                EditOp::Insert { at, text: t } => text.insert_str(at, &t),
                EditOp::Delete { at, len } => {
                    text.replace_range(at..at + len, "");
                }
            }
        }
    }

    #[test]
    fn continues_opener_line() {
        assert_eq!(press_enter("  /** foo", 9), "  /** foo\n   * ");
    }

    #[test]
    fn continues_body_line() {
        let source = "  /**\n  * bar";
        assert_eq!(press_enter(source, source.len()), "  /**\n  * bar\n  * ");
    }

    #[test]
    fn splits_body_line_mid_text() {
        let source = "/**\n * foo bar";
        // Enter right after "foo".
        assert_eq!(press_enter(source, 10), "/**\n * foo\n *  bar");
    }

    #[test]
    fn reuses_marker_after_cursor() {
        // "  * |  * note" -> "  * " / "  * note", no doubled marker.
        let source = "/**\n  *   * note";
        assert_eq!(press_enter(source, 8), "/**\n  * \n  * note");
    }

    #[test]
    fn reuses_marker_and_restores_spacing() {
        // The reused marker is glued to its text: a space is re-inserted.
        let source = "/**\n *  *note";
        assert_eq!(press_enter(source, 7), "/**\n * \n * note");
    }

    #[test]
    fn reuses_bare_marker_at_line_end() {
        // Nothing follows the reused marker: spacing is still added.
        let source = "/**\n *  *";
        assert_eq!(press_enter(source, 7), "/**\n * \n * ");
    }

    #[test]
    fn no_space_added_before_closer() {
        // Enter at the end of the body text with "*/" right after the cursor.
        let source = "/** foo */";
        assert_eq!(press_enter(source, 7), "/** foo\n */");
    }

    #[test]
    fn before_indent_is_a_no_op() {
        // Cursor inside the indentation of a body line: plain newline only.
        let source = "/**\n   * bar";
        assert_eq!(press_enter(source, 5), "/**\n \n  * bar");
    }

    #[test]
    fn inserted_marker_suppresses_synthesis() {
        let index = LineIndex::new("/** foo".to_string());
        let event = ChangeEvent {
            old_position: 7,
            new_text: "\n * ".to_string(),
            new_end: 11,
        };
        let cls = classify(&index, &event).unwrap();
        assert_eq!(synthesize(&index, &event, &cls), Vec::new());
    }

    #[test]
    fn outside_comment_leaves_plain_newline() {
        assert_eq!(press_enter("let x = 1;", 10), "let x = 1;\n");
    }
}
