//! Quick fixes: edit-distance spelling corrections and column quoting.
//!
//! Strategies are keyed off the diagnostic code produced by validation.
//! Spelling candidates come from the symbol universe matching the code;
//! anything within a small edit distance survives, duplicates removed. For
//! unknown columns whose text carries characters illegal in a bare
//! identifier, back-quoting wins over spelling changes.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use strsim::levenshtein;

use crate::ast::{AstItem, Span};
use crate::callbacks::ResourceCallbacks;
use crate::definitions::FunctionCategory;
use crate::error::CoreResult;
use crate::registry::Registry;
use crate::validation::{Diagnostic, build_query_for_fields, codes};

/// A proposed textual edit resolving one diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuickFix {
    pub title: String,
    #[serde(rename = "replacementText")]
    pub replacement: String,
    #[serde(rename = "targetSpan")]
    pub span: Span,
}

impl QuickFix {
    fn spelling(solution: &str, span: Span) -> Self {
        Self {
            title: format!("Did you mean {solution} ?"),
            replacement: solution.to_string(),
            span,
        }
    }
}

static ILLEGAL_BARE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z\d_.@]").expect("valid regex"));

/// Does this text need back-quoting to be a legal column reference?
pub fn should_be_quoted(text: &str) -> bool {
    ILLEGAL_BARE_CHARS.is_match(text)
}

/// Edit-distance candidates from a universe of names, duplicates removed.
fn spelling_candidates(universe: &[String], error_text: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    universe
        .iter()
        .filter(|name| levenshtein(name, error_text) < 3)
        .filter(|name| seen.insert(name.as_str()))
        .cloned()
        .collect()
}

pub async fn quick_fixes<C: ResourceCallbacks>(
    text: &str,
    ast: &[AstItem],
    diagnostic: &Diagnostic,
    registry: &Registry,
    callbacks: &C,
) -> CoreResult<Vec<QuickFix>> {
    let span = diagnostic.location;
    let error_text = slice(text, span);
    match diagnostic.code {
        codes::UNKNOWN_COLUMN => {
            let quoted = quoting_fixes(text, ast, span);
            if !quoted.is_empty() {
                return Ok(quoted);
            }
            let prefix = build_query_for_fields(ast);
            let fields: Vec<String> = callbacks
                .get_fields_for(&prefix)
                .await?
                .into_iter()
                .map(|f| f.name)
                .collect();
            Ok(spelling_candidates(&fields, error_text)
                .iter()
                .map(|s| QuickFix::spelling(s, span))
                .collect())
        }
        codes::UNKNOWN_INDEX => {
            let sources: Vec<String> = callbacks
                .get_sources()
                .await?
                .into_iter()
                .map(|s| s.name)
                .collect();
            // fuzzy names: truncate the universe to the wildcard prefix
            // length before measuring distance
            let universe: Vec<String> = if error_text.ends_with('*') {
                sources
                    .into_iter()
                    .map(|source| {
                        if source.len() > error_text.len() {
                            format!("{}*", &source[..error_text.len() - 1])
                        } else {
                            source
                        }
                    })
                    .collect()
            } else {
                sources
            };
            Ok(spelling_candidates(&universe, error_text)
                .iter()
                .map(|s| QuickFix::spelling(s, span))
                .collect())
        }
        codes::UNKNOWN_POLICY => {
            let policies: Vec<String> = callbacks
                .get_policies()
                .await?
                .into_iter()
                .map(|p| p.name)
                .collect();
            Ok(spelling_candidates(&policies, error_text)
                .iter()
                .map(|s| QuickFix::spelling(s, span))
                .collect())
        }
        codes::UNKNOWN_FUNCTION => {
            let command = enclosing_command_name(ast, span);
            let universe: Vec<String> = registry
                .compatible_functions(
                    &command,
                    None,
                    &[FunctionCategory::Scalar, FunctionCategory::Aggregation],
                    None,
                    &[],
                )
                .iter()
                .map(|def| def.name.to_string())
                .collect();
            // compare the bare name, re-attach the call suffix
            let (bare, suffix) = match error_text.find('(') {
                Some(paren) => error_text.split_at(paren),
                None => (error_text, ""),
            };
            Ok(spelling_candidates(&universe, bare)
                .iter()
                .map(|s| QuickFix::spelling(&format!("{s}{suffix}"), span))
                .collect())
        }
        _ => Ok(Vec::new()),
    }
}

/// The unknown-column text may extend past the reported span when illegal
/// characters broke the grammar; scan up to the next separator inside the
/// enclosing command and propose back-quoting the whole reference.
fn quoting_fixes(text: &str, ast: &[AstItem], span: Span) -> Vec<QuickFix> {
    let command_end = ast
        .iter()
        .filter_map(AstItem::as_command)
        .find(|command| command.location.max > span.max)
        .map(|command| command.location.max)
        .unwrap_or(text.len());
    let remaining = slice(text, Span::new(span.max, command_end.max(span.max)));
    let stop = remaining
        .find(',')
        .filter(|&p| p > 1)
        .or_else(|| remaining.find(' '))
        .unwrap_or(remaining.len());
    let extended_span = Span::new(span.min, span.max + stop);
    let error_text = slice(text, extended_span);
    if should_be_quoted(error_text) {
        vec![QuickFix {
            title: format!("Did you mean `{error_text}` ?"),
            replacement: format!("`{error_text}`"),
            span: extended_span,
        }]
    } else {
        Vec::new()
    }
}

fn enclosing_command_name(ast: &[AstItem], span: Span) -> String {
    ast.iter()
        .filter_map(AstItem::as_command)
        .find(|command| command.location.max > span.max)
        .or_else(|| ast.iter().rev().find_map(AstItem::as_command))
        .map(|command| command.name.clone())
        .unwrap_or_default()
}

fn slice(text: &str, span: Span) -> &str {
    let min = span.min.min(text.len());
    let max = span.max.clamp(min, text.len());
    &text[min..max]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoting_detects_illegal_characters() {
        assert!(should_be_quoted("foo-bar"));
        assert!(should_be_quoted("any#Char$ field"));
        assert!(!should_be_quoted("kubernetes.pod.name"));
        assert!(!should_be_quoted("plain_field@v2"));
    }

    #[test]
    fn spelling_respects_distance_threshold() {
        let universe = vec!["numberField".to_string(), "stringField".to_string()];
        let hits = spelling_candidates(&universe, "numbrField");
        assert_eq!(hits, vec!["numberField"]);
    }

    #[test]
    fn spelling_dedupes_candidates() {
        let universe = vec!["index".to_string(), "index".to_string()];
        assert_eq!(spelling_candidates(&universe, "indx").len(), 1);
    }
}
