//! Classification of newline insertions against the surrounding doc comment.

use crate::document::LineIndex;

/// A single buffer change as delivered by the host, in byte offsets.
///
/// `old_position` addresses the pre-change snapshot; `new_end` is where the
/// inserted text ends in the post-change snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Offset at which the change starts, valid in the pre-change snapshot.
    pub old_position: usize,
    /// The inserted text. Its first character is the trigger.
    pub new_text: String,
    /// Offset just past the inserted text, valid in the post-change snapshot.
    pub new_end: usize,
}

/// Where a newline insertion sits relative to a doc comment.
///
/// Only produced when the insertion point is inside a comment; callers that
/// get `None` from [`classify`] leave the buffer alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// The insertion point lies inside a doc comment.
    pub in_doc_comment: bool,
    /// The changed line opens the comment (`/**` or `/*!`).
    pub is_comment_start: bool,
    /// The changed line closes the comment (`*/` after the indentation).
    pub is_comment_end: bool,
    /// Length of the changed line's leading-whitespace run, in bytes.
    pub indent_index: usize,
    /// Cursor offset within the changed line, in bytes.
    pub cursor_offset_in_line: usize,
    /// The cursor sat strictly past the leading whitespace.
    pub after_indent: bool,
}

/// Characters that count as a newline trigger.
fn is_newline(c: char) -> bool {
    c == '\u{000A}' // LF
        || c == '\u{000D}' // CR
        || c == '\u{000B}' // VT
        || c == '\u{000C}' // FF
        || c == '\u{0085}' // NEL
        || c == '\u{2028}' // LS
        || c == '\u{2029}' // PS
}

fn is_doc_comment_start(line: &str) -> bool {
    line.starts_with("/**") // JavaDoc style
        || line.starts_with("/*!") // Qt style
}

fn is_doc_comment_end(line: &str) -> bool {
    line.starts_with("*/")
}

/// Outcome of looking at one prior line during the backward scan.
enum ScanStep {
    /// An opener line: the scan origin is inside a comment.
    Inside,
    /// Neither a marker nor an opener: the scan origin is outside.
    Outside,
    /// A `*`-prefixed continuation line: keep scanning upward.
    KeepScanning,
}

fn scan_step(trimmed: &str) -> ScanStep {
    if trimmed.starts_with('*') {
        // Close markers (`*/`) fall in here too: they never stop the scan.
        ScanStep::KeepScanning
    } else if is_doc_comment_start(trimmed) {
        ScanStep::Inside
    } else {
        ScanStep::Outside
    }
}

/// Walk upward from the line above `line` through the contiguous run of
/// `*`-prefixed lines. The first line outside the run settles the answer;
/// reaching the top of the document means we were never in a comment.
fn in_doc_comment(line_index: &LineIndex, line: usize) -> bool {
    let mut cur = line;
    while cur > 0 {
        cur -= 1;
        let trimmed = match line_index.line_text(cur) {
            Some(text) => text.trim_start(),
            None => return false,
        };
        match scan_step(trimmed) {
            ScanStep::Inside => return true,
            ScanStep::Outside => return false,
            ScanStep::KeepScanning => {}
        }
    }
    false
}

/// Classify a newline insertion.
///
/// Returns `None` when the event is not a newline trigger, the change
/// position cannot be resolved to a line, or the insertion point is not
/// inside a doc comment. The snapshot `line_index` was built from must be the
/// pre-change one.
pub fn classify(line_index: &LineIndex, event: &ChangeEvent) -> Option<Classification> {
    let first = event.new_text.chars().next()?;
    if !is_newline(first) {
        return None;
    }

    let line = line_index.line_at_offset(event.old_position)?;
    let line_start = line_index.line_start(line)?;
    let line_text = line_index.line_text(line)?;

    let cursor_offset = event.old_position - line_start;
    if cursor_offset > line_text.len() || !line_text.is_char_boundary(cursor_offset) {
        return None;
    }

    let trimmed = line_text.trim_start();
    let indent_index = line_text.len() - trimmed.len();
    let after_indent = cursor_offset > indent_index;

    let is_comment_start = is_doc_comment_start(trimmed);
    let is_comment_end = is_doc_comment_end(trimmed);

    let in_comment = if is_comment_start {
        // Typing before the opener itself does not count as being inside.
        after_indent
    } else {
        let mut in_comment = in_doc_comment(line_index, line);
        if in_comment && is_comment_end {
            // On the closing line the comment has already ended past the
            // indentation; before it, placement still belongs to the comment.
            in_comment = !after_indent;
        }
        in_comment
    };

    if !in_comment {
        return None;
    }

    Some(Classification {
        in_doc_comment: true,
        is_comment_start,
        is_comment_end,
        indent_index,
        cursor_offset_in_line: cursor_offset,
        after_indent,
    })
}
