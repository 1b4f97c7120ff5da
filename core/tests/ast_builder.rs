//! AST construction properties over full statements.

use streamql_core::ast::{AstItem, AstNode, Span, build_ast};
use streamql_core::syntax::parse;

fn ast_of(src: &str) -> Vec<AstItem> {
    build_ast(&parse(src))
}

fn command_names(ast: &[AstItem]) -> Vec<String> {
    ast.iter()
        .filter_map(|item| item.as_command().map(|c| c.name.clone()))
        .collect()
}

/// Every leaf reachable through a function's args must fall inside the
/// function's span.
fn assert_extent_invariant(item: &AstItem, outer: Option<Span>) {
    match item {
        AstItem::Group(items) => {
            for inner in items {
                assert_extent_invariant(inner, outer);
            }
        }
        AstItem::Node(node) => {
            if let Some(span) = outer {
                let location = node.location();
                assert!(
                    span.min <= location.min && location.max <= span.max,
                    "{} at {:?} escapes enclosing span {:?}",
                    node.name(),
                    location,
                    span
                );
            }
            match node {
                AstNode::Function(function) => {
                    for arg in &function.args {
                        assert_extent_invariant(arg, Some(function.location));
                    }
                }
                AstNode::Command(command) => {
                    for arg in &command.args {
                        assert_extent_invariant(arg, None);
                    }
                }
                AstNode::Option(option) => {
                    for arg in &option.args {
                        assert_extent_invariant(arg, None);
                    }
                }
                _ => {}
            }
        }
    }
}

#[test]
fn pipeline_stage_order_is_preserved() {
    let src = "from logs | where bytes > 0 | stats total = sum(bytes) by host | sort total desc | limit 10";
    assert_eq!(
        command_names(&ast_of(src)),
        vec!["from", "where", "stats", "sort", "limit"]
    );
}

#[test]
fn function_spans_cover_all_reachable_leaves() {
    let sources = [
        "from a | where xs + round(y, 2) > 1 and name like \"a*\"",
        "from a | eval v = -pow(x, 2) + 1",
        "from a | where x in (1, 2, 3) or not (y >= 2)",
        "row a = 1 year, b = [true, false]",
    ];
    for src in sources {
        for item in &ast_of(src) {
            assert_extent_invariant(item, None);
        }
    }
}

#[test]
fn serialization_is_stable_json() {
    let ast = ast_of("from logs | stats c = count(bytes) by host");
    let json = serde_json::to_value(&ast).unwrap();
    assert_eq!(json[0]["type"], "command");
    assert_eq!(json[0]["name"], "from");
    assert_eq!(json[1]["args"][0]["type"], "function");
    assert_eq!(json[1]["args"][0]["name"], "=");
}

#[test]
fn bare_identifier_sanitizes_to_itself() {
    let ast = ast_of("from a | keep plain_name");
    let column = ast[1].as_command().unwrap().args[0].as_column().unwrap();
    assert_eq!(column.name, "plain_name");
    assert!(!column.quoted);
}

#[test]
fn quoted_identifier_loses_exactly_surrounding_quotes() {
    let ast = ast_of("from a | keep `weird-name here`");
    let column = ast[1].as_command().unwrap().args[0].as_column().unwrap();
    assert_eq!(column.name, "weird-name here");
    assert!(column.quoted);
}

#[test]
fn syntax_error_marks_nodes_incomplete_without_aborting() {
    let ast = ast_of("from a | where x > | limit 5");
    // the broken stage is flagged, the rest of the pipeline survives
    assert_eq!(command_names(&ast), vec!["from", "where", "limit"]);
    let where_cmd = ast[1].as_command().unwrap();
    assert!(
        where_cmd.incomplete
            || where_cmd.args.iter().any(AstItem::is_incomplete)
    );
    let limit = ast[2].as_command().unwrap();
    assert!(!limit.incomplete);
}

#[test]
fn time_interval_literal_builds_quantity_and_unit() {
    let ast = ast_of("from a | eval window = 2 hours");
    let assignment = ast[1].as_command().unwrap().args[0].as_function().unwrap();
    let rhs = assignment.args[1].as_group().unwrap();
    let interval = rhs[0].as_time_interval().unwrap();
    assert_eq!(interval.quantity, 2.0);
    assert_eq!(interval.unit, "hours");
    assert_eq!(interval.name, "2 hours");
}

#[test]
fn rebuilding_resets_previous_output() {
    let first = ast_of("from a | limit 1");
    let second = ast_of("from b");
    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 1);
    assert_eq!(command_names(&second), vec!["from"]);
}

#[test]
fn dissect_survives_malformed_option_list() {
    let ast = ast_of("from a | dissect message \"%{date}\" append_separator = ");
    let dissect = ast[1].as_command().unwrap();
    assert_eq!(dissect.name, "dissect");
    // target column and pattern made it through
    assert!(dissect.args[0].as_column().is_some());
    assert!(dissect.args[1].as_literal().is_some());
    let option = dissect.args[2].as_option().unwrap();
    assert_eq!(option.name, "append_separator");
    assert!(option.incomplete);
}
