//! Completion Handler - context-sensitive StreamQL suggestions

use streamql_core::autocomplete::{SuggestionKind, suggest};
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;

use crate::server::{StreamqlLanguageServer, position_to_offset};

fn completion_kind(kind: SuggestionKind) -> CompletionItemKind {
    match kind {
        SuggestionKind::Command | SuggestionKind::Keyword => CompletionItemKind::KEYWORD,
        SuggestionKind::Source | SuggestionKind::Policy => CompletionItemKind::STRUCT,
        SuggestionKind::Field => CompletionItemKind::FIELD,
        SuggestionKind::Variable => CompletionItemKind::VARIABLE,
        SuggestionKind::Function => CompletionItemKind::FUNCTION,
        SuggestionKind::Operator => CompletionItemKind::OPERATOR,
        SuggestionKind::Constant => CompletionItemKind::CONSTANT,
    }
}

impl StreamqlLanguageServer {
    /// Handle completion request
    pub async fn handle_completion(
        &self,
        params: CompletionParams,
    ) -> Result<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri.to_string();
        let Some(text) = self.document_text(&uri) else {
            return Ok(None);
        };
        let offset = position_to_offset(&text, params.text_document_position.position);
        let callbacks = self.snapshot_callbacks();

        let suggestions = match suggest(&text, offset, &self.registry, &callbacks).await {
            Ok(suggestions) => suggestions,
            Err(error) => {
                self.client
                    .log_message(MessageType::WARNING, error.to_string())
                    .await;
                return Ok(Some(CompletionResponse::Array(Vec::new())));
            }
        };

        let items = suggestions
            .into_iter()
            .map(|suggestion| CompletionItem {
                label: suggestion.label,
                kind: Some(completion_kind(suggestion.kind)),
                detail: (!suggestion.detail.is_empty()).then_some(suggestion.detail),
                sort_text: Some(suggestion.sort_text),
                insert_text: Some(suggestion.text),
                insert_text_format: suggestion
                    .as_snippet
                    .then_some(InsertTextFormat::SNIPPET),
                ..Default::default()
            })
            .collect();

        Ok(Some(CompletionResponse::Array(items)))
    }
}
