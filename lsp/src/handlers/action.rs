//! Code Action Handler - quick fixes for semantic diagnostics

use std::collections::HashMap;

use streamql_core::prelude::*;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;

use crate::server::{StreamqlLanguageServer, span_to_range};

fn ranges_overlap(a: &Range, b: &Range) -> bool {
    a.start <= b.end && b.start <= a.end
}

impl StreamqlLanguageServer {
    /// Handle code action request
    pub async fn handle_code_action(
        &self,
        params: CodeActionParams,
    ) -> Result<Option<Vec<CodeActionOrCommand>>> {
        let uri = params.text_document.uri.clone();
        let Some(text) = self.document_text(uri.as_str()) else {
            return Ok(Some(Vec::new()));
        };

        let ast = build_ast(&parse(&text));
        let callbacks = self.snapshot_callbacks();
        let diagnostics = match validate(&ast, &self.registry, &callbacks).await {
            Ok(diagnostics) => diagnostics,
            Err(_) => return Ok(Some(Vec::new())),
        };

        let mut actions = Vec::new();
        for diagnostic in &diagnostics {
            let range = span_to_range(&text, diagnostic.location);
            if !ranges_overlap(&range, &params.range) {
                continue;
            }
            let fixes = quick_fixes(&text, &ast, diagnostic, &self.registry, &callbacks)
                .await
                .unwrap_or_default();
            for fix in fixes {
                let mut changes = HashMap::new();
                changes.insert(
                    uri.clone(),
                    vec![TextEdit {
                        range: span_to_range(&text, fix.span),
                        new_text: fix.replacement,
                    }],
                );
                actions.push(CodeActionOrCommand::CodeAction(CodeAction {
                    title: fix.title,
                    kind: Some(CodeActionKind::QUICKFIX),
                    edit: Some(WorkspaceEdit {
                        changes: Some(changes),
                        ..Default::default()
                    }),
                    is_preferred: Some(true),
                    ..Default::default()
                }));
            }
        }

        Ok(Some(actions))
    }
}
