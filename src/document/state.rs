//! Document state management for the continuation server.

use dashmap::DashMap;
use tower_lsp::lsp_types::{TextDocumentContentChangeEvent, TextEdit, Url};

use crate::continuation::{classify, synthesize, ChangeEvent};
use crate::lsp::to_text_edits;

use super::text::LineIndex;

/// State for a single document, rebuilt on every change.
#[derive(Debug, Clone)]
pub struct DocumentState {
    /// Pre-computed line index over the current source.
    pub line_index: LineIndex,
    /// Document version from the client.
    pub version: i32,
}

impl DocumentState {
    /// Create a new document state from full source text.
    pub fn new(source: String, version: i32) -> Self {
        Self {
            line_index: LineIndex::new(source),
            version,
        }
    }

    /// The current source text.
    pub fn source(&self) -> &str {
        self.line_index.source()
    }
}

/// A document plus the marker for the server's own in-flight edit.
///
/// Applying a synthesized edit makes the client send it back as a change
/// notification; that notification must update the document but never feed
/// the synthesizer again.
#[derive(Debug, Clone)]
pub struct DocumentSession {
    state: DocumentState,
    edit_in_flight: bool,
}

impl DocumentSession {
    /// Create a session from full source text.
    pub fn new(source: String, version: i32) -> Self {
        Self {
            state: DocumentState::new(source, version),
            edit_in_flight: false,
        }
    }

    /// The tracked document state.
    pub fn state(&self) -> &DocumentState {
        &self.state
    }

    /// Whether a synthesized edit is waiting for its change notification.
    pub fn edit_in_flight(&self) -> bool {
        self.edit_in_flight
    }

    /// Apply a notification's change ranges without synthesizing anything.
    ///
    /// This is also the settling path for the server's own edit: the guard is
    /// cleared once the notification has been folded in.
    pub fn update(&mut self, changes: &[TextDocumentContentChangeEvent], version: i32) {
        for change in changes {
            self.apply_change(change);
        }
        self.state.version = version;
        self.edit_in_flight = false;
    }

    /// Apply a notification's change ranges in host order and collect the
    /// continuation edits to send back.
    ///
    /// Each range is classified against the snapshot current at that range,
    /// then folded in; the synthesized operations are converted against the
    /// post-change snapshot, batched over the whole notification. A non-empty
    /// result raises the in-flight guard; the caller must send the batch as
    /// one `workspace/applyEdit`.
    pub fn process(
        &mut self,
        changes: &[TextDocumentContentChangeEvent],
        version: i32,
    ) -> Vec<TextEdit> {
        if self.edit_in_flight {
            self.update(changes, version);
            return Vec::new();
        }

        let mut edits = Vec::new();
        for change in changes {
            let ops = self.event_for(change).and_then(|event| {
                let cls = classify(&self.state.line_index, &event)?;
                Some(synthesize(&self.state.line_index, &event, &cls))
            });
            self.apply_change(change);
            if let Some(ops) = ops {
                edits.extend(to_text_edits(&ops, &self.state.line_index));
            }
        }
        self.state.version = version;

        if !edits.is_empty() {
            self.edit_in_flight = true;
        }
        edits
    }

    /// Drop the in-flight guard early (the client rejected the edit, so no
    /// settling notification will come).
    pub fn cancel_in_flight(&mut self) {
        self.edit_in_flight = false;
    }

    /// Translate an incremental change range into a byte-offset change event.
    /// Full-text changes (no range) carry no insertion point and are skipped.
    fn event_for(&self, change: &TextDocumentContentChangeEvent) -> Option<ChangeEvent> {
        let range = change.range?;
        let index = &self.state.line_index;
        let old_position = index.position_to_offset(range.start)?;
        index.position_to_offset(range.end)?;
        Some(ChangeEvent {
            old_position,
            new_text: change.text.clone(),
            new_end: old_position + change.text.len(),
        })
    }

    /// Fold one change range into the document.
    fn apply_change(&mut self, change: &TextDocumentContentChangeEvent) {
        let next = match change.range {
            None => change.text.clone(),
            Some(range) => {
                let index = &self.state.line_index;
                let (Some(start), Some(end)) = (
                    index.position_to_offset(range.start),
                    index.position_to_offset(range.end),
                ) else {
                    return;
                };
                let mut source = index.source().to_string();
                source.replace_range(start..end, &change.text);
                source
            }
        };
        self.state.line_index = LineIndex::new(next);
    }
}

/// Thread-safe storage for open documents.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: DashMap<Url, DocumentSession>,
}

impl DocumentStore {
    /// Create a new empty document store.
    pub fn new() -> Self {
        Self {
            documents: DashMap::new(),
        }
    }

    /// Open or replace a document with full source text.
    pub fn open(&self, uri: Url, source: String, version: i32) {
        self.documents
            .insert(uri, DocumentSession::new(source, version));
    }

    /// Close a document.
    pub fn close(&self, uri: &Url) {
        self.documents.remove(uri);
    }

    /// Current source text of a document, if open.
    pub fn text(&self, uri: &Url) -> Option<String> {
        self.documents
            .get(uri)
            .map(|session| session.state().source().to_string())
    }

    /// Run a change notification through the document's session and return
    /// the continuation edits to send back.
    pub fn process(
        &self,
        uri: &Url,
        changes: &[TextDocumentContentChangeEvent],
        version: i32,
    ) -> Vec<TextEdit> {
        match self.documents.get_mut(uri) {
            Some(mut session) => session.process(changes, version),
            None => Vec::new(),
        }
    }

    /// Fold in a change notification without synthesizing anything.
    pub fn update(&self, uri: &Url, changes: &[TextDocumentContentChangeEvent], version: i32) {
        if let Some(mut session) = self.documents.get_mut(uri) {
            session.update(changes, version);
        }
    }

    /// Drop a document's in-flight guard after a rejected applyEdit.
    pub fn cancel_in_flight(&self, uri: &Url) {
        if let Some(mut session) = self.documents.get_mut(uri) {
            session.cancel_in_flight();
        }
    }
}
