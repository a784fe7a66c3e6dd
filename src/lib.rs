//! Doc comment continuation language server.
//!
//! Auto-continues multi-line doc comments (`/** ... */` and `/*! ... */`):
//! when the client reports a newline typed inside such a comment, the server
//! answers with a `workspace/applyEdit` that puts the matching indentation
//! and `* ` marker on the new line.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;

use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService};

mod continuation;
mod document;
mod lsp;
pub(crate) mod settings;

pub use continuation::{classify, synthesize, ChangeEvent, Classification, EditOp};
pub use document::{DocumentSession, DocumentState, LineIndex};
pub use lsp::to_text_edits;
pub use settings::{discover_settings, load_settings, Settings};

use document::DocumentStore;

pub struct Backend {
    client: Client,
    documents: DocumentStore,
    workspace_root: OnceLock<PathBuf>,
    settings: OnceLock<Settings>,
}

impl Backend {
    pub(crate) fn new(client: Client) -> Self {
        Self {
            client,
            documents: DocumentStore::new(),
            workspace_root: OnceLock::new(),
            settings: OnceLock::new(),
        }
    }

    fn settings(&self) -> &Settings {
        self.settings.get_or_init(Settings::default)
    }

    /// Send the synthesized edits as one atomic workspace edit. A rejection
    /// means no settling notification will arrive, so the document's
    /// in-flight guard is dropped right away.
    async fn apply_continuation(&self, uri: Url, edits: Vec<TextEdit>) {
        let mut changes = HashMap::new();
        changes.insert(uri.clone(), edits);
        let edit = WorkspaceEdit {
            changes: Some(changes),
            ..Default::default()
        };

        match self.client.apply_edit(edit).await {
            Ok(response) if response.applied => {}
            _ => self.documents.cancel_in_flight(&uri),
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        // Extract workspace root from params
        let workspace_root = params
            .workspace_folders
            .as_ref()
            .and_then(|folders| folders.first())
            .and_then(|f| f.uri.to_file_path().ok())
            .or_else(|| {
                #[allow(deprecated)]
                params.root_uri.as_ref()?.to_file_path().ok()
            });

        if let Some(root) = workspace_root {
            let _ = self.workspace_root.set(root.clone());

            // Discover settings by walking up the directory tree
            let (settings, _settings_dir) = settings::discover_settings(&root);
            let _ = self.settings.set(settings);
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                // Incremental sync: continuation needs per-change ranges.
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::INCREMENTAL,
                )),
                ..Default::default()
            },
            ..Default::default()
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "doc comment continuation server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        self.documents.open(
            params.text_document.uri,
            params.text_document.text,
            params.text_document.version,
        );
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;

        if !self.settings().applies_to(&uri) {
            self.documents
                .update(&uri, &params.content_changes, version);
            return;
        }

        let edits = self
            .documents
            .process(&uri, &params.content_changes, version);
        if edits.is_empty() {
            return;
        }

        self.apply_continuation(uri, edits).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.documents.close(&params.text_document.uri);
    }
}

pub fn create_service() -> (LspService<Backend>, tower_lsp::ClientSocket) {
    LspService::new(Backend::new)
}
