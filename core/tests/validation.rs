//! End-to-end semantic validation through the async provider boundary.

use streamql_core::ast::build_ast;
use streamql_core::callbacks::{
    FieldDescriptor, PolicyDescriptor, SourceDescriptor, StaticCallbacks,
};
use streamql_core::registry::Registry;
use streamql_core::syntax::parse;
use streamql_core::validation::{Diagnostic, Severity, codes, validate};

fn callbacks() -> StaticCallbacks {
    StaticCallbacks {
        fields: vec![
            FieldDescriptor {
                name: "stringField".to_string(),
                field_type: "string".to_string(),
            },
            FieldDescriptor {
                name: "numberField".to_string(),
                field_type: "number".to_string(),
            },
        ],
        sources: vec![SourceDescriptor {
            name: "index".to_string(),
            hidden: false,
        }],
        policies: vec![PolicyDescriptor {
            name: "policy".to_string(),
            source_indices: vec!["enrichIndex1".to_string()],
            match_field: "otherStringField".to_string(),
            enrich_fields: vec!["otherField".to_string()],
        }],
    }
}

async fn diagnostics_for(src: &str) -> Vec<Diagnostic> {
    let registry = Registry::new();
    let ast = build_ast(&parse(src));
    validate(&ast, &registry, &callbacks()).await.unwrap()
}

#[tokio::test]
async fn well_formed_pipeline_is_clean() {
    let diags = diagnostics_for(
        "from index | where numberField > 1 and stringField like \"a*\" | stats m = max(numberField) by stringField | sort m desc | limit 10",
    )
    .await;
    assert!(diags.is_empty(), "unexpected: {diags:?}");
}

#[tokio::test]
async fn unknown_symbols_carry_codes_and_spans() {
    let src = "from index | keep numbrField";
    let diags = diagnostics_for(src).await;
    assert_eq!(diags.len(), 1);
    let diagnostic = &diags[0];
    assert_eq!(diagnostic.code, codes::UNKNOWN_COLUMN);
    assert_eq!(diagnostic.severity, Severity::Error);
    assert_eq!(
        &src[diagnostic.location.min..diagnostic.location.max],
        "numbrField"
    );
}

#[tokio::test]
async fn unknown_source_and_policy_are_flagged() {
    let diags = diagnostics_for("from nowhere | enrich missing-policy on stringField").await;
    let found: Vec<_> = diags.iter().map(|d| d.code).collect();
    assert!(found.contains(&codes::UNKNOWN_INDEX));
    assert!(found.contains(&codes::UNKNOWN_POLICY));
}

#[tokio::test]
async fn variables_flow_into_later_stages() {
    let diags =
        diagnostics_for("from index | stats total = sum(numberField) | where total > 100").await;
    assert!(diags.is_empty(), "unexpected: {diags:?}");
}

#[tokio::test]
async fn renamed_column_is_known_downstream() {
    let diags = diagnostics_for("from index | rename stringField as str | keep str").await;
    assert!(diags.is_empty(), "unexpected: {diags:?}");
}

#[tokio::test]
async fn type_mismatch_is_reported_once_symbol_resolves() {
    let diags = diagnostics_for("from index | eval v = round(stringField)").await;
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, codes::WRONG_ARGUMENT_TYPE);
}

#[tokio::test]
async fn incomplete_stages_produce_no_semantic_errors() {
    let diags = diagnostics_for("from index | where ").await;
    assert!(diags.is_empty(), "unexpected: {diags:?}");
}
