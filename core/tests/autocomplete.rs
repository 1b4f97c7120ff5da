//! Autocomplete behavior over partial statements.
//!
//! Expected candidate lists are rebuilt from the same catalog the engine
//! uses, so the assertions track the definitions instead of hard-coding
//! function inventories.

use streamql_core::autocomplete::suggest;
use streamql_core::callbacks::{
    FieldDescriptor, PolicyDescriptor, SourceDescriptor, StaticCallbacks,
};
use streamql_core::definitions::FunctionCategory;
use streamql_core::registry::Registry;

fn callbacks() -> StaticCallbacks {
    let fields = [
        ("stringField", "string"),
        ("numberField", "number"),
        ("dateField", "date"),
        ("booleanField", "boolean"),
        ("ipField", "ip"),
        ("listField", "list"),
    ]
    .map(|(name, field_type)| FieldDescriptor {
        name: name.to_string(),
        field_type: field_type.to_string(),
    });
    StaticCallbacks {
        fields: fields.to_vec(),
        sources: vec![
            SourceDescriptor {
                name: "index".to_string(),
                hidden: false,
            },
            SourceDescriptor {
                name: "otherIndex".to_string(),
                hidden: false,
            },
            SourceDescriptor {
                name: ".hiddenIndex".to_string(),
                hidden: true,
            },
        ],
        policies: vec![PolicyDescriptor {
            name: "policy".to_string(),
            source_indices: vec!["enrichIndex1".to_string()],
            match_field: "otherStringField".to_string(),
            enrich_fields: vec!["otherField".to_string(), "yetAnotherField".to_string()],
        }],
    }
}

async fn texts_for(statement: &str) -> Vec<String> {
    let registry = Registry::new();
    let suggestions = suggest(statement, statement.len(), &registry, &callbacks())
        .await
        .unwrap();
    suggestions.into_iter().map(|s| s.text).collect()
}

/// Insert texts of scalar functions usable in `command`, optionally narrowed
/// by return type.
fn scalar_function_texts(registry: &Registry, command: &str, return_types: Option<&[&str]>) -> Vec<String> {
    registry
        .compatible_functions(command, None, &[FunctionCategory::Scalar], return_types, &[])
        .iter()
        .map(|def| format!("{}($0)", def.name))
        .collect()
}

fn aggregation_texts(registry: &Registry) -> Vec<String> {
    registry
        .compatible_functions("stats", None, &[FunctionCategory::Aggregation], None, &[])
        .iter()
        .map(|def| format!("{}($0)", def.name))
        .collect()
}

#[tokio::test]
async fn empty_input_proposes_source_commands() {
    assert_eq!(texts_for(" ").await, vec!["row", "from", "show"]);
}

#[tokio::test]
async fn pipe_proposes_processing_commands() {
    let registry = Registry::new();
    let expected: Vec<String> = registry
        .commands()
        .iter()
        .filter(|def| !def.source_command)
        .map(|def| def.name.to_string())
        .collect();
    assert_eq!(texts_for("from index | ").await, expected);
}

#[tokio::test]
async fn half_typed_command_word_still_proposes_commands() {
    assert_eq!(texts_for("f").await, vec!["row", "from", "show"]);
    let after_pipe = texts_for("from index | s").await;
    assert!(after_pipe.contains(&"stats".to_string()));
    assert!(!after_pipe.contains(&"from".to_string()));
}

#[tokio::test]
async fn from_proposes_visible_sources_only() {
    let texts = texts_for("from ").await;
    assert_eq!(texts, vec!["index", "otherIndex"]);
    // restarting after a comma proposes sources again
    assert_eq!(texts_for("from index,").await, vec!["index", "otherIndex"]);
}

#[tokio::test]
async fn from_after_sources_proposes_metadata_and_continuations() {
    assert_eq!(
        texts_for("from index, otherIndex ").await,
        vec!["[metadata $0 ]", "|", ","]
    );
}

#[tokio::test]
async fn where_empty_proposes_fields_and_expression_functions() {
    let registry = Registry::new();
    let texts = texts_for("from index | where ").await;

    let mut expected: Vec<String> = callbacks().fields.iter().map(|f| f.name.clone()).collect();
    expected.extend(scalar_function_texts(&registry, "where", None));
    assert_eq!(texts, expected);

    assert!(texts.contains(&"stringField".to_string()));
    assert!(texts.contains(&"numberField".to_string()));
    // aggregation-only functions must not leak into a boolean test position
    assert!(!texts.iter().any(|t| t.starts_with("avg(")));
}

#[tokio::test]
async fn where_proposes_upstream_variables() {
    let texts = texts_for("from index | eval var0 = 1 | where ").await;
    assert!(texts.contains(&"var0".to_string()));
}

#[tokio::test]
async fn where_after_operand_proposes_compatible_operators() {
    let texts = texts_for("from index | where stringField ").await;
    assert!(texts.contains(&">= $0".to_string()));
    assert!(texts.contains(&"like $0".to_string()));
    // no continuation until the expression produces a boolean
    assert!(!texts.contains(&"|".to_string()));
    // boolean-complete comparison allows continuing the pipeline
    let done = texts_for("from index | where stringField >= stringField ").await;
    assert!(done.contains(&"and $0".to_string()));
    assert!(done.contains(&"|".to_string()));
    assert!(done.contains(&",".to_string()));
}

#[tokio::test]
async fn comparison_right_side_is_typed_by_left_operand() {
    let registry = Registry::new();
    let texts = texts_for("from index | where stringField >= ").await;
    assert!(texts.contains(&"stringField".to_string()));
    assert!(!texts.contains(&"numberField".to_string()));
    for expected in scalar_function_texts(&registry, "where", Some(&["string"])) {
        assert!(texts.contains(&expected), "missing {expected}");
    }
    assert!(!texts.contains(&"round($0)".to_string()));
}

#[tokio::test]
async fn function_argument_slot_is_typed_by_signature() {
    let texts = texts_for("from index | where log10(").await;
    assert!(texts.contains(&"numberField".to_string()));
    assert!(!texts.contains(&"stringField".to_string()));
    // the enclosing function is not proposed for its own argument
    assert!(!texts.iter().any(|t| t.starts_with("log10(")));
}

#[tokio::test]
async fn second_argument_slot_respects_leading_arguments() {
    let texts = texts_for("from index | where pow(numberField, ").await;
    assert!(texts.contains(&"numberField".to_string()));
    assert!(!texts.contains(&"stringField".to_string()));
}

#[tokio::test]
async fn variadic_argument_slots_append_commas_when_more_args_required() {
    let texts = texts_for("from index | eval date_trunc(").await;
    assert!(texts.contains(&"1 year,".to_string()));
    assert!(!texts.contains(&"1 years,".to_string()));
}

#[tokio::test]
async fn limit_proposes_exactly_the_example_numbers() {
    assert_eq!(texts_for("from index | limit ").await, vec!["10", "100", "1000"]);
    assert_eq!(texts_for("from index | limit 4 ").await, vec!["|"]);
}

#[tokio::test]
async fn sort_walks_through_ordering_keywords() {
    let fields: Vec<String> = callbacks().fields.iter().map(|f| f.name.clone()).collect();
    assert_eq!(texts_for("from index | sort ").await, fields);
    assert_eq!(
        texts_for("from index | sort stringField ").await,
        vec!["asc", "desc", "|", ","]
    );
    assert_eq!(
        texts_for("from index | sort stringField desc ").await,
        vec!["nulls first", "nulls last", "|", ","]
    );
}

#[tokio::test]
async fn mv_expand_proposes_list_fields() {
    assert_eq!(texts_for("from index | mv_expand ").await, vec!["listField"]);
    assert_eq!(texts_for("from index | mv_expand listField ").await, vec!["|"]);
}

#[tokio::test]
async fn rename_walks_through_as_clause() {
    let texts = texts_for("from index | rename ").await;
    assert!(texts.contains(&"stringField".to_string()));
    assert_eq!(
        texts_for("from index | rename stringField ").await,
        vec!["as"]
    );
    assert_eq!(
        texts_for("from index | rename stringField as ").await,
        vec!["var0"]
    );
}

#[tokio::test]
async fn stats_proposes_new_variable_and_aggregations() {
    let registry = Registry::new();
    let mut expected = vec!["var0 =".to_string()];
    expected.extend(aggregation_texts(&registry));
    assert_eq!(texts_for("from index | stats ").await, expected);

    // the variable counter skips names taken earlier in the pipeline
    let restarted = texts_for("from index | stats var0 = max(numberField), ").await;
    assert_eq!(restarted[0], "var1 =");
}

#[tokio::test]
async fn stats_bare_column_proposes_assignment() {
    assert_eq!(texts_for("from index | stats a ").await, vec!["= $0"]);
}

#[tokio::test]
async fn stats_aggregation_argument_proposes_typed_fields_only() {
    let texts = texts_for("from index | stats a = min(").await;
    assert_eq!(texts, vec!["numberField"]);
}

#[tokio::test]
async fn stats_after_assignment_proposes_by_and_continuations() {
    assert_eq!(
        texts_for("from index | stats a = min(numberField) ").await,
        vec!["by", "|", ","]
    );
    let by_fields = texts_for("from index | stats a = min(numberField) by ").await;
    assert!(by_fields.contains(&"stringField".to_string()));
    assert_eq!(
        texts_for("from index | stats a = min(numberField) by stringField ").await,
        vec!["|", ","]
    );
}

#[tokio::test]
async fn eval_empty_proposes_variable_fields_and_functions() {
    let registry = Registry::new();
    let texts = texts_for("from index | eval ").await;
    let mut expected = vec!["var0 =".to_string()];
    expected.extend(callbacks().fields.iter().map(|f| f.name.clone()));
    expected.extend(scalar_function_texts(&registry, "eval", None));
    assert_eq!(texts, expected);
}

#[tokio::test]
async fn eval_after_assign_proposes_functions_only() {
    let registry = Registry::new();
    let texts = texts_for("from index | eval a = ").await;
    assert_eq!(texts, scalar_function_texts(&registry, "eval", None));
}

#[tokio::test]
async fn eval_number_literal_proposes_time_units() {
    let texts = texts_for("from index | eval a = 1 ").await;
    assert!(texts.contains(&"year".to_string()));
    assert!(texts.contains(&"+ $0".to_string()));
    assert!(texts.contains(&"|".to_string()));
    // a completed interval no longer proposes units
    let after_unit = texts_for("from index | eval a = 1 year ").await;
    assert!(!after_unit.contains(&"year".to_string()));
    assert!(after_unit.contains(&"+ $0".to_string()));
}

#[tokio::test]
async fn enrich_walks_through_policy_on_with() {
    assert_eq!(texts_for("from index | enrich ").await, vec!["policy"]);
    assert_eq!(
        texts_for("from index | enrich policy ").await,
        vec!["on", "with", "|"]
    );
    let on_fields = texts_for("from index | enrich policy on ").await;
    assert!(on_fields.contains(&"stringField".to_string()));
    assert_eq!(
        texts_for("from index | enrich policy on stringField ").await,
        vec!["with", "|", ","]
    );
    assert_eq!(
        texts_for("from index | enrich policy on b with ").await,
        vec!["var0 =", "otherField", "yetAnotherField"]
    );
    assert_eq!(
        texts_for("from index | enrich policy on b with var0 = ").await,
        vec!["otherField", "yetAnotherField"]
    );
}

#[tokio::test]
async fn provider_order_is_preserved_within_a_category() {
    // fields arrive in provider order and stay that way inside their rank
    let texts = texts_for("from index | keep ").await;
    let fields: Vec<String> = callbacks().fields.iter().map(|f| f.name.clone()).collect();
    assert_eq!(texts, fields);
}
