//! Document lifecycle handlers

use streamql_core::prelude::*;
use tower_lsp::lsp_types::{
    Diagnostic as LspDiagnostic, DiagnosticSeverity, DidChangeTextDocumentParams,
    DidOpenTextDocumentParams, MessageType, NumberOrString,
};

use crate::server::{StreamqlLanguageServer, span_to_range};

impl StreamqlLanguageServer {
    /// Handle document open - cache content and publish diagnostics
    pub async fn handle_did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri.to_string();
        let text = params.text_document.text.clone();

        if let Ok(mut docs) = self.documents.write() {
            docs.insert(uri, text.clone());
        }

        let diagnostics = self.compute_diagnostics(&text).await;
        self.client
            .publish_diagnostics(params.text_document.uri, diagnostics, None)
            .await;
    }

    /// Handle document change - update cache and republish diagnostics
    pub async fn handle_did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri.to_string();

        if let Some(change) = params.content_changes.first() {
            let text = change.text.clone();

            if let Ok(mut docs) = self.documents.write() {
                docs.insert(uri, text.clone());
            }

            let diagnostics = self.compute_diagnostics(&text).await;
            self.client
                .publish_diagnostics(params.text_document.uri, diagnostics, None)
                .await;
        }
    }

    pub async fn compute_diagnostics(&self, text: &str) -> Vec<LspDiagnostic> {
        let ast = build_ast(&parse(text));
        let callbacks = self.snapshot_callbacks();
        match validate(&ast, &self.registry, &callbacks).await {
            Ok(diagnostics) => diagnostics
                .into_iter()
                .map(|diagnostic| LspDiagnostic {
                    range: span_to_range(text, diagnostic.location),
                    severity: Some(match diagnostic.severity {
                        Severity::Error => DiagnosticSeverity::ERROR,
                        Severity::Warning => DiagnosticSeverity::WARNING,
                    }),
                    code: Some(NumberOrString::String(diagnostic.code.to_string())),
                    source: Some("streamql".to_string()),
                    message: diagnostic.message,
                    ..Default::default()
                })
                .collect(),
            Err(error) => {
                // schema could not be loaded; report once instead of marking
                // the whole document
                self.client
                    .log_message(MessageType::WARNING, error.to_string())
                    .await;
                Vec::new()
            }
        }
    }
}
