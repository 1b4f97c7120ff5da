//! StreamQL Language Server Core

use std::collections::HashMap;
use std::sync::RwLock;

use serde::Deserialize;
use streamql_core::ast::{Span, offset_to_line_column};
use streamql_core::callbacks::{
    FieldDescriptor, PolicyDescriptor, SourceDescriptor, StaticCallbacks,
};
use streamql_core::registry::Registry;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

/// Workspace schema file consumed at startup.
#[derive(Debug, Default, Deserialize)]
struct SchemaFile {
    #[serde(default)]
    fields: Vec<FieldDescriptor>,
    #[serde(default)]
    sources: Vec<SourceDescriptor>,
    #[serde(default)]
    policies: Vec<PolicyDescriptor>,
}

#[derive(Debug)]
pub struct StreamqlLanguageServer {
    pub client: Client,
    pub documents: RwLock<HashMap<String, String>>,
    pub registry: Registry,
    pub callbacks: RwLock<StaticCallbacks>,
}

impl StreamqlLanguageServer {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            documents: RwLock::new(HashMap::new()),
            registry: Registry::new(),
            callbacks: RwLock::new(StaticCallbacks::default()),
        }
    }

    /// Load the field/source/policy universe from the workspace schema.
    pub fn load_schema(&self, workspace_root: &str) {
        let path = format!("{workspace_root}/streamql.schema.json");
        if let Ok(content) = std::fs::read_to_string(&path)
            && let Ok(schema) = serde_json::from_str::<SchemaFile>(&content)
            && let Ok(mut callbacks) = self.callbacks.write()
        {
            *callbacks = StaticCallbacks {
                fields: schema.fields,
                sources: schema.sources,
                policies: schema.policies,
            };
        }
    }

    pub fn snapshot_callbacks(&self) -> StaticCallbacks {
        self.callbacks
            .read()
            .map(|callbacks| callbacks.clone())
            .unwrap_or_default()
    }

    pub fn document_text(&self, uri: &str) -> Option<String> {
        self.documents.read().ok()?.get(uri).cloned()
    }
}

/// LSP positions are zero-based; core offsets are byte offsets into the text.
pub fn position_to_offset(text: &str, position: Position) -> usize {
    let mut remaining_lines = position.line as usize;
    let mut offset = 0;
    for (i, ch) in text.char_indices() {
        if remaining_lines == 0 {
            return (i + position.character as usize).min(text.len());
        }
        if ch == '\n' {
            remaining_lines -= 1;
            offset = i + 1;
        }
    }
    (offset + position.character as usize).min(text.len())
}

pub fn span_to_range(text: &str, span: Span) -> Range {
    let start = offset_to_line_column(text, span.min);
    let end = offset_to_line_column(text, span.max);
    Range {
        start: Position {
            line: (start.line - 1) as u32,
            character: (start.column - 1) as u32,
        },
        end: Position {
            line: (end.line - 1) as u32,
            character: (end.column - 1) as u32,
        },
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for StreamqlLanguageServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        #[allow(deprecated)]
        if let Some(root) = params.root_uri.as_ref().and_then(|uri| uri.to_file_path().ok()) {
            self.load_schema(&root.to_string_lossy());
        }
        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(
                        [",", "(", "=", " ", "|"].map(String::from).to_vec(),
                    ),
                    ..Default::default()
                }),
                code_action_provider: Some(CodeActionProviderCapability::Simple(true)),
                ..Default::default()
            },
            ..Default::default()
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "StreamQL LSP initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        self.handle_did_open(params).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        self.handle_did_change(params).await;
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        self.handle_hover(params).await
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        self.handle_completion(params).await
    }

    async fn code_action(
        &self,
        params: CodeActionParams,
    ) -> Result<Option<Vec<CodeActionOrCommand>>> {
        self.handle_code_action(params).await
    }
}
