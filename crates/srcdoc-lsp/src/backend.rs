//! The tower-lsp backend

use std::sync::mpsc::channel;
use std::sync::Arc;

use tokio::sync::RwLock;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::{
    Diagnostic, DiagnosticSeverity, DidChangeTextDocumentParams, DidCloseTextDocumentParams,
    DidOpenTextDocumentParams, Hover, HoverContents, HoverParams, HoverProviderCapability,
    InitializeParams, InitializeResult, InitializedParams, MarkedString, MessageType, Position,
    Range, ServerCapabilities, ServerInfo, TextDocumentSyncCapability, TextDocumentSyncKind, Url,
    WorkspaceFolder,
};
use tower_lsp::{Client, LanguageServer, LspService, Server};
use tracing::{debug, info};

use srcdoc_core::{Message, MessageHandler, Severity, Uri};

use crate::folder::Folder;

/// LSP backend state
pub struct Backend {
    client: Client,
    folders: Arc<RwLock<Vec<Folder>>>,
}

fn to_lsp_range(r: srcdoc_core::Range) -> Range {
    Range {
        start: Position {
            line: r.start.line as u32,
            character: r.start.character as u32,
        },
        end: Position {
            line: r.end.line as u32,
            character: r.end.character as u32,
        },
    }
}

fn to_lsp_severity(s: Severity) -> DiagnosticSeverity {
    match s {
        Severity::Erro => DiagnosticSeverity::ERROR,
        Severity::Warn => DiagnosticSeverity::WARNING,
        Severity::Info | Severity::Succ => DiagnosticSeverity::INFORMATION,
    }
}

fn to_lsp_diagnostic(m: &Message) -> Diagnostic {
    let message = if m.field.is_empty() {
        m.key.clone()
    } else {
        format!("{} ({})", m.key, m.field)
    };
    Diagnostic {
        range: to_lsp_range(m.location.range),
        severity: Some(to_lsp_severity(m.severity)),
        source: Some("srcdoc".to_string()),
        message,
        ..Diagnostic::default()
    }
}

impl Backend {
    /// Create a backend for a client connection
    pub fn new(client: Client) -> Self {
        Self {
            client,
            folders: Arc::new(RwLock::new(Vec::new())),
        }
    }

    async fn add_folders(&self, folders: Vec<WorkspaceFolder>) {
        let mut guard = self.folders.write().await;
        for f in folders {
            info!(folder = %f.uri, "adding workspace folder");
            guard.push(Folder::new(Uri::new(f.uri.as_str())));
        }
    }

    /// Re-scan one document and publish its diagnostics
    async fn update_document(&self, url: Url, text: String) {
        let uri = Uri::new(url.as_str());

        let (tx, rx) = channel();
        let h = MessageHandler::new(move |m| {
            let _ = tx.send(m);
        });
        {
            let mut folders = self.folders.write().await;
            if let Some(folder) = folders.iter_mut().find(|f| f.matches(&uri)) {
                folder.change(&h, &uri, text.as_bytes());
            }
        }
        h.stop();

        let diagnostics: Vec<Diagnostic> = rx
            .iter()
            .filter(|m| m.location.uri == uri && m.severity <= Severity::Warn)
            .map(|m| to_lsp_diagnostic(&m))
            .collect();
        debug!(document = %uri, count = diagnostics.len(), "publishing diagnostics");
        self.client.publish_diagnostics(url, diagnostics, None).await;
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        if let Some(folders) = params.workspace_folders {
            self.add_folders(folders).await;
        } else if let Some(root) = params.root_uri {
            self.add_folders(vec![WorkspaceFolder {
                uri: root,
                name: String::new(),
            }])
            .await;
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                ..ServerCapabilities::default()
            },
            server_info: Some(ServerInfo {
                name: "srcdoc-lsp".to_string(),
                version: Some(srcdoc_core::VERSION.to_string()),
            }),
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "srcdoc language server ready")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        self.update_document(params.text_document.uri, params.text_document.text)
            .await;
    }

    async fn did_change(&self, mut params: DidChangeTextDocumentParams) {
        // Full sync: the last change carries the whole text.
        if let Some(change) = params.content_changes.pop() {
            self.update_document(params.text_document.uri, change.text)
                .await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = Uri::new(params.text_document.uri.as_str());
        let mut folders = self.folders.write().await;
        if let Some(folder) = folders.iter_mut().find(|f| f.matches(&uri)) {
            folder.close(&uri);
        }
        drop(folders);
        self.client
            .publish_diagnostics(params.text_document.uri, Vec::new(), None)
            .await;
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let url = params.text_document_position_params.text_document.uri;
        let uri = Uri::new(url.as_str());
        let pos = params.text_document_position_params.position;
        let pos = srcdoc_core::Position::new(pos.line as usize, pos.character as usize, 0);

        let folders = self.folders.read().await;
        let tip = folders
            .iter()
            .find(|f| f.matches(&uri))
            .and_then(|f| f.lookup(&uri, pos));

        Ok(tip.map(|t| Hover {
            contents: HoverContents::Scalar(MarkedString::String(t.usage.to_string())),
            range: Some(to_lsp_range(t.range)),
        }))
    }
}

/// Serve LSP over stdin/stdout until the client disconnects
pub async fn run_stdio() {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();
    let (service, socket) = LspService::new(Backend::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}
