//! Hover Handler - show signatures for StreamQL functions and commands

use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;

use crate::server::{StreamqlLanguageServer, position_to_offset};

fn word_at(text: &str, offset: usize) -> Option<&str> {
    let is_word = |c: char| c.is_ascii_alphanumeric() || c == '_';
    let bytes = text.as_bytes();
    if offset > text.len() {
        return None;
    }
    let mut start = offset.min(text.len());
    while start > 0 && is_word(bytes[start - 1] as char) {
        start -= 1;
    }
    let mut end = offset;
    while end < text.len() && is_word(bytes[end] as char) {
        end += 1;
    }
    (start < end).then(|| &text[start..end])
}

impl StreamqlLanguageServer {
    /// Handle hover request - show documentation for the symbol under the
    /// cursor
    pub async fn handle_hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = params
            .text_document_position_params
            .text_document
            .uri
            .to_string();
        let Some(text) = self.document_text(&uri) else {
            return Ok(None);
        };
        let offset = position_to_offset(&text, params.text_document_position_params.position);
        let Some(word) = word_at(&text, offset) else {
            return Ok(None);
        };

        if let Some(def) = self.registry.resolve_function(word) {
            return Ok(Some(Hover {
                contents: HoverContents::Markup(MarkupContent {
                    kind: MarkupKind::Markdown,
                    value: format!("**{}**\n\n{}", def.signature_string(), def.description),
                }),
                range: None,
            }));
        }
        if let Some(def) = self.registry.resolve_command(word) {
            return Ok(Some(Hover {
                contents: HoverContents::Markup(MarkupContent {
                    kind: MarkupKind::Markdown,
                    value: format!("**{}**\n\n{}", def.name, def.description),
                }),
                range: None,
            }));
        }
        Ok(None)
    }
}
