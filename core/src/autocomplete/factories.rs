//! Suggestion constructors.
//!
//! Each candidate family gets a fixed category rank (the `sort_text`
//! letter); the engine sorts stably on it, so same-letter candidates keep
//! the order their context produced them in. Ranks, low to high: commands /
//! sources / policies / new variables "A", clause keywords "B", fields /
//! functions / operators "C", literal constants "D", the pipe "F", the comma
//! "G".

use serde::Serialize;

use crate::callbacks::PolicyDescriptor;
use crate::definitions::{CommandDefinition, FunctionDefinition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Command,
    Source,
    Policy,
    Field,
    Variable,
    Function,
    Operator,
    Keyword,
    Constant,
}

/// One completion candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub label: String,
    #[serde(rename = "insertText")]
    pub text: String,
    pub kind: SuggestionKind,
    pub detail: String,
    #[serde(rename = "sortText")]
    pub sort_text: String,
    /// Insert as a snippet; `$0` marks the final cursor position.
    #[serde(rename = "asSnippet")]
    pub as_snippet: bool,
}

impl Suggestion {
    fn plain(
        label: impl Into<String>,
        kind: SuggestionKind,
        detail: impl Into<String>,
        sort_text: &str,
    ) -> Self {
        let label = label.into();
        Self {
            text: label.clone(),
            label,
            kind,
            detail: detail.into(),
            sort_text: sort_text.to_string(),
            as_snippet: false,
        }
    }
}

pub fn command_suggestion(def: &CommandDefinition) -> Suggestion {
    Suggestion::plain(def.name, SuggestionKind::Command, def.description, "A")
}

pub fn source_suggestions(names: impl IntoIterator<Item = String>) -> Vec<Suggestion> {
    names
        .into_iter()
        .map(|name| Suggestion::plain(name, SuggestionKind::Source, "Input table", "A"))
        .collect()
}

pub fn policy_suggestions(policies: &[PolicyDescriptor]) -> Vec<Suggestion> {
    policies
        .iter()
        .map(|policy| {
            Suggestion::plain(
                policy.name.clone(),
                SuggestionKind::Policy,
                format!("Policy defined on: {}", policy.source_indices.join(", ")),
                "A",
            )
        })
        .collect()
}

pub fn field_suggestions(names: impl IntoIterator<Item = String>) -> Vec<Suggestion> {
    names
        .into_iter()
        .map(|name| {
            Suggestion::plain(
                name,
                SuggestionKind::Field,
                "Field specified by the input table",
                "C",
            )
        })
        .collect()
}

pub fn variable_suggestions(names: impl IntoIterator<Item = String>) -> Vec<Suggestion> {
    names
        .into_iter()
        .map(|name| Suggestion::plain(name, SuggestionKind::Variable, "User defined variable", "C"))
        .collect()
}

/// Propose declaring a fresh variable (`var0 =`).
pub fn new_variable_suggestion(name: &str) -> Suggestion {
    Suggestion::plain(
        format!("{name} ="),
        SuggestionKind::Variable,
        "Define a new variable",
        "A",
    )
}

pub fn function_suggestion(def: &FunctionDefinition) -> Suggestion {
    Suggestion {
        label: def.signature_string(),
        text: format!("{}($0)", def.name),
        kind: SuggestionKind::Function,
        detail: def.description.to_string(),
        sort_text: "C".to_string(),
        as_snippet: true,
    }
}

/// Infix operators insert with a trailing slot instead of call parens.
pub fn operator_suggestion(def: &FunctionDefinition) -> Suggestion {
    Suggestion {
        label: def.name.to_string(),
        text: format!("{} $0", def.name),
        kind: SuggestionKind::Operator,
        detail: def.description.to_string(),
        sort_text: "C".to_string(),
        as_snippet: true,
    }
}

/// The bare assignment snippet proposed after a fresh column name.
pub fn assignment_suggestion() -> Suggestion {
    Suggestion {
        label: "=".to_string(),
        text: "= $0".to_string(),
        kind: SuggestionKind::Operator,
        detail: "Assign (=)".to_string(),
        sort_text: "C".to_string(),
        as_snippet: true,
    }
}

pub fn keyword_suggestion(word: &str) -> Suggestion {
    Suggestion::plain(word, SuggestionKind::Keyword, "", "B")
}

pub fn constant_suggestions(
    values: impl IntoIterator<Item = String>,
    detail: &str,
) -> Vec<Suggestion> {
    values
        .into_iter()
        .map(|value| Suggestion::plain(value, SuggestionKind::Constant, detail, "D"))
        .collect()
}

pub fn pipe_suggestion() -> Suggestion {
    Suggestion::plain("|", SuggestionKind::Keyword, "Pipe (|)", "F")
}

pub fn comma_suggestion() -> Suggestion {
    Suggestion::plain(",", SuggestionKind::Keyword, "Comma (,)", "G")
}

/// `[metadata $0 ]` snippet offered after the sources of a `from`.
pub fn metadata_suggestion() -> Suggestion {
    Suggestion {
        label: "metadata".to_string(),
        text: "[metadata $0 ]".to_string(),
        kind: SuggestionKind::Keyword,
        detail: "Metadata fields".to_string(),
        sort_text: "B".to_string(),
        as_snippet: true,
    }
}

/// Stable category sort plus dedup by inserted text, first occurrence wins.
pub fn sort_and_dedupe(suggestions: Vec<Suggestion>) -> Vec<Suggestion> {
    let mut seen = std::collections::HashSet::new();
    let mut unique: Vec<Suggestion> = suggestions
        .into_iter()
        .filter(|s| seen.insert(s.text.clone()))
        .collect();
    unique.sort_by(|a, b| a.sort_text.cmp(&b.sort_text));
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let out = sort_and_dedupe(vec![
            keyword_suggestion("asc"),
            keyword_suggestion("asc"),
            pipe_suggestion(),
        ]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn category_sort_is_stable_within_rank() {
        let out = sort_and_dedupe(vec![
            pipe_suggestion(),
            comma_suggestion(),
            keyword_suggestion("desc"),
            keyword_suggestion("asc"),
        ]);
        let texts: Vec<_> = out.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["desc", "asc", "|", ","]);
    }
}
