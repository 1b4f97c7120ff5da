//! Quick-fix proposals for semantic diagnostics.

use streamql_core::ast::{Span, build_ast};
use streamql_core::callbacks::{
    FieldDescriptor, PolicyDescriptor, SourceDescriptor, StaticCallbacks,
};
use streamql_core::quickfix::quick_fixes;
use streamql_core::registry::Registry;
use streamql_core::syntax::parse;
use streamql_core::validation::{Diagnostic, Severity, codes};

fn callbacks() -> StaticCallbacks {
    StaticCallbacks {
        fields: vec![
            FieldDescriptor {
                name: "numberField".to_string(),
                field_type: "number".to_string(),
            },
            FieldDescriptor {
                name: "stringField".to_string(),
                field_type: "string".to_string(),
            },
        ],
        sources: vec![
            SourceDescriptor {
                name: "index".to_string(),
                hidden: false,
            },
            SourceDescriptor {
                name: "my-long-index-name".to_string(),
                hidden: false,
            },
        ],
        policies: vec![PolicyDescriptor {
            name: "policy".to_string(),
            source_indices: vec![],
            match_field: "k".to_string(),
            enrich_fields: vec![],
        }],
    }
}

fn diagnostic(code: &'static str, span: Span) -> Diagnostic {
    Diagnostic {
        message: String::new(),
        location: span,
        severity: Severity::Error,
        code,
    }
}

async fn fixes_for(src: &str, code: &'static str, span: Span) -> Vec<String> {
    let registry = Registry::new();
    let ast = build_ast(&parse(src));
    quick_fixes(src, &ast, &diagnostic(code, span), &registry, &callbacks())
        .await
        .unwrap()
        .into_iter()
        .map(|fix| fix.replacement)
        .collect()
}

fn span_of(src: &str, needle: &str) -> Span {
    let start = src.find(needle).unwrap();
    Span::new(start, start + needle.len())
}

#[tokio::test]
async fn misspelled_column_proposes_close_names_only() {
    let src = "from index | keep numbrField";
    let fixes = fixes_for(src, codes::UNKNOWN_COLUMN, span_of(src, "numbrField")).await;
    // distance 1 survives, distance > 2 does not
    assert_eq!(fixes, vec!["numberField"]);
}

#[tokio::test]
async fn illegal_characters_prefer_quoting_over_spelling() {
    let src = "from index | keep foo-bar";
    let fixes = fixes_for(src, codes::UNKNOWN_COLUMN, span_of(src, "foo-bar")).await;
    assert_eq!(fixes, vec!["`foo-bar`"]);
}

#[tokio::test]
async fn quoting_extends_past_the_reported_span() {
    // the grammar stops the column at the dash, so the diagnostic only
    // covers the first word
    let src = "from index | keep foo-bar";
    let fixes = fixes_for(src, codes::UNKNOWN_COLUMN, span_of(src, "foo")).await;
    assert_eq!(fixes, vec!["`foo-bar`"]);
}

#[tokio::test]
async fn misspelled_source_proposes_spelling_fix() {
    let src = "from indx";
    let fixes = fixes_for(src, codes::UNKNOWN_INDEX, span_of(src, "indx")).await;
    assert_eq!(fixes, vec!["index"]);
}

#[tokio::test]
async fn wildcard_source_compares_against_truncated_names() {
    let src = "from my-long-idnex-*";
    let fixes = fixes_for(src, codes::UNKNOWN_INDEX, span_of(src, "my-long-idnex-*")).await;
    assert_eq!(fixes, vec!["my-long-index-*"]);
}

#[tokio::test]
async fn misspelled_policy_proposes_spelling_fix() {
    let src = "from index | enrich polcy";
    let fixes = fixes_for(src, codes::UNKNOWN_POLICY, span_of(src, "polcy")).await;
    assert_eq!(fixes, vec!["policy"]);
}

#[tokio::test]
async fn misspelled_function_keeps_call_suffix() {
    let src = "from index | eval a = rnod(numberField)";
    let fixes = fixes_for(
        src,
        codes::UNKNOWN_FUNCTION,
        span_of(src, "rnod(numberField)"),
    )
    .await;
    assert_eq!(fixes, vec!["round(numberField)"]);
}

#[tokio::test]
async fn unrelated_codes_produce_no_fixes() {
    let src = "from index | eval a = numberField / 0";
    let fixes = fixes_for(src, codes::DIVIDE_BY_ZERO, span_of(src, "0")).await;
    assert!(fixes.is_empty());
}
