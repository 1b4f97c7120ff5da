//! Parse-tree to AST conversion.
//!
//! A pure recursive-descent function set: each production handler takes the
//! parse node and returns the constructed item(s); the top-level driver
//! collects one `Command` per pipeline stage. Handlers never fail on
//! malformed subtrees, they mark the affected nodes `incomplete` and move
//! on so the rest of the statement still materializes.

use super::position::compute_location_extends;
use super::{
    AstItem, AstNode, Column, Command, CommandOption, Function, List, Literal, LiteralKind,
    LiteralValue, Source, SourceKind, TimeInterval,
};
use crate::syntax::{SyntaxKind, SyntaxNode};

/// Build the command list for a parsed statement. The output is rebuilt from
/// scratch on every call; nothing persists across re-parses.
pub fn build_ast(statement: &SyntaxNode) -> Vec<AstItem> {
    statement.children.iter().map(build_command).collect()
}

fn build_command(node: &SyntaxNode) -> AstItem {
    use SyntaxKind::*;
    match node.kind {
        FromCommand => build_from(node),
        RowCommand => build_fields_command("row", node),
        EvalCommand => build_fields_command("eval", node),
        ShowCommand => build_show(node),
        WhereCommand => build_where(node),
        StatsCommand => build_stats(node),
        LimitCommand => build_limit(node),
        SortCommand => build_sort(node),
        KeepCommand => build_column_list("keep", node),
        DropCommand => build_column_list("drop", node),
        MvExpandCommand => build_column_list("mv_expand", node),
        RenameCommand => build_rename(node),
        DissectCommand => build_dissect(node),
        GrokCommand => build_grok(node),
        EnrichCommand => build_enrich(node),
        _ => build_unknown(node),
    }
}

// ---- command assembly ----------------------------------------------------

fn build_from(node: &SyntaxNode) -> AstItem {
    let mut command = create_command("from", node);
    for source in node.children_of(SyntaxKind::SourceIdentifier) {
        command.args.push(create_source(source, SourceKind::Index));
    }
    if let Some(metadata) = node.child(SyntaxKind::Metadata) {
        let mut option = create_option("metadata", metadata);
        for name in metadata.children_of(SyntaxKind::QualifiedName) {
            option.args.push(create_column(name));
        }
        command.args.push(AstItem::Node(AstNode::Option(option)));
    }
    AstItem::Node(AstNode::Command(command))
}

fn build_fields_command(name: &str, node: &SyntaxNode) -> AstItem {
    let mut command = create_command(name, node);
    if let Some(fields) = node.child(SyntaxKind::Fields) {
        command.args.extend(collect_all_fields(fields));
    }
    AstItem::Node(AstNode::Command(command))
}

fn build_show(node: &SyntaxNode) -> AstItem {
    let mut command = create_command("show", node);
    if let Some(kw) = node.child(SyntaxKind::Keyword) {
        let function = Function {
            name: kw.text.to_ascii_lowercase(),
            text: kw.text.clone(),
            location: kw.span,
            incomplete: kw.error,
            args: Vec::new(),
        };
        command.args.push(AstItem::Node(AstNode::Function(function)));
    }
    AstItem::Node(AstNode::Command(command))
}

fn build_where(node: &SyntaxNode) -> AstItem {
    let mut command = create_command("where", node);
    for child in &node.children {
        command.args.extend(collect_boolean_expression(child));
    }
    AstItem::Node(AstNode::Command(command))
}

fn build_stats(node: &SyntaxNode) -> AstItem {
    let mut command = create_command("stats", node);
    if let Some(fields) = node.child(SyntaxKind::Fields) {
        command.args.extend(collect_all_fields(fields));
    }
    if let Some(grouping) = node.child(SyntaxKind::Grouping) {
        let mut option = create_option("by", grouping);
        for name in grouping.children_of(SyntaxKind::QualifiedName) {
            option.args.push(create_column(name));
        }
        command.args.push(AstItem::Node(AstNode::Option(option)));
    }
    AstItem::Node(AstNode::Command(command))
}

fn build_limit(node: &SyntaxNode) -> AstItem {
    let mut command = create_command("limit", node);
    if let Some(value) = node.child(SyntaxKind::IntegerLiteral) {
        command
            .args
            .push(AstItem::Node(AstNode::Literal(create_literal(
                LiteralKind::Number,
                value,
            ))));
    }
    AstItem::Node(AstNode::Command(command))
}

fn build_sort(node: &SyntaxNode) -> AstItem {
    let mut command = create_command("sort", node);
    for order in node.children_of(SyntaxKind::OrderExpression) {
        for child in &order.children {
            if child.kind == SyntaxKind::Keyword {
                command
                    .args
                    .push(AstItem::Node(AstNode::Literal(keyword_literal(child))));
            } else {
                command.args.extend(collect_boolean_expression(child));
            }
        }
    }
    AstItem::Node(AstNode::Command(command))
}

fn build_column_list(name: &str, node: &SyntaxNode) -> AstItem {
    let mut command = create_command(name, node);
    for qualified in node.children_of(SyntaxKind::QualifiedName) {
        command.args.push(create_column(qualified));
    }
    AstItem::Node(AstNode::Command(command))
}

fn build_rename(node: &SyntaxNode) -> AstItem {
    let mut command = create_command("rename", node);
    for clause in node.children_of(SyntaxKind::RenameClause) {
        let mut names = clause.children_of(SyntaxKind::QualifiedName);
        let Some(old_name) = names.next() else {
            continue;
        };
        let mut option = create_option("as", clause);
        option.incomplete |= clause.keyword("as").is_none();
        option.args.push(create_column(old_name));
        if let Some(new_name) = names.next() {
            option.args.push(create_column(new_name));
        } else {
            option.incomplete = true;
        }
        command.args.push(AstItem::Node(AstNode::Option(option)));
    }
    AstItem::Node(AstNode::Command(command))
}

fn build_dissect(node: &SyntaxNode) -> AstItem {
    let mut command = create_command("dissect", node);
    for child in &node.children {
        match child.kind {
            SyntaxKind::StringLiteral => {
                command
                    .args
                    .push(AstItem::Node(AstNode::Literal(create_literal(
                        LiteralKind::String,
                        child,
                    ))));
            }
            // a structurally broken option list must not abort the command
            SyntaxKind::CommandOption => {
                let name = child
                    .child(SyntaxKind::Identifier)
                    .map(|id| id.text.to_ascii_lowercase())
                    .unwrap_or_default();
                let mut option = create_option(&name, child);
                if let Some(value) = constant_child(child) {
                    option.args.push(value);
                }
                command.args.push(AstItem::Node(AstNode::Option(option)));
            }
            _ => {
                if let Some(item) = visit_primary(child) {
                    command.args.push(item);
                }
            }
        }
    }
    AstItem::Node(AstNode::Command(command))
}

fn build_grok(node: &SyntaxNode) -> AstItem {
    let mut command = create_command("grok", node);
    for child in &node.children {
        if child.kind == SyntaxKind::StringLiteral {
            command
                .args
                .push(AstItem::Node(AstNode::Literal(create_literal(
                    LiteralKind::String,
                    child,
                ))));
        } else if let Some(item) = visit_primary(child) {
            command.args.push(item);
        }
    }
    AstItem::Node(AstNode::Command(command))
}

fn build_enrich(node: &SyntaxNode) -> AstItem {
    let mut command = create_command("enrich", node);
    if let Some(policy) = node.child(SyntaxKind::SourceIdentifier) {
        command.args.push(create_source(policy, SourceKind::Policy));
    }
    if let Some(on_clause) = node.child(SyntaxKind::EnrichOn) {
        let mut option = create_option("on", on_clause);
        if let Some(name) = on_clause.child(SyntaxKind::QualifiedName) {
            option.args.push(create_column(name));
        }
        command.args.push(AstItem::Node(AstNode::Option(option)));
    }
    if let Some(with_clause) = node.child(SyntaxKind::EnrichWith) {
        let mut option = create_option("with", with_clause);
        for clause in with_clause.children_of(SyntaxKind::EnrichWithClause) {
            let mut names = clause.children_of(SyntaxKind::QualifiedName);
            let Some(first) = names.next() else { continue };
            // without an explicit assign, both sides reference the same
            // enrich field
            let (target, value) = match names.next() {
                Some(second) => (first, second),
                None => (first, first),
            };
            let mut function = create_function("=", clause);
            function.args.push(create_column(target));
            function
                .args
                .push(AstItem::Group(vec![create_column(value)]));
            function.location = compute_location_extends(&function);
            option.args.push(AstItem::Node(AstNode::Function(function)));
        }
        command.args.push(AstItem::Node(AstNode::Option(option)));
    }
    AstItem::Node(AstNode::Command(command))
}

fn build_unknown(node: &SyntaxNode) -> AstItem {
    let name = node
        .child(SyntaxKind::Identifier)
        .map(|id| id.text.to_ascii_lowercase())
        .unwrap_or_default();
    let mut command = create_command(&name, node);
    command.incomplete = true;
    AstItem::Node(AstNode::Command(command))
}

// ---- fields and expressions ----------------------------------------------

fn collect_all_fields(fields: &SyntaxNode) -> Vec<AstItem> {
    let mut items = Vec::new();
    for field in fields.children_of(SyntaxKind::Field) {
        items.extend(visit_field(field));
    }
    items
}

/// `name = expr` becomes an assignment function whose second argument is the
/// grouped right-hand side; a bare expression passes through unchanged.
fn visit_field(field: &SyntaxNode) -> Vec<AstItem> {
    let assigned = field.has(SyntaxKind::Operator);
    if assigned && let Some(name) = field.child(SyntaxKind::QualifiedName) {
        let mut function = create_function("=", field);
        function.args.push(create_column(name));
        let rhs: Vec<AstItem> = field
            .children
            .iter()
            .skip_while(|c| c.kind != SyntaxKind::Operator)
            .skip(1)
            .flat_map(collect_boolean_expression)
            .collect();
        function.incomplete |= rhs.is_empty();
        function.args.push(AstItem::Group(rhs));
        function.location = compute_location_extends(&function);
        return vec![AstItem::Node(AstNode::Function(function))];
    }
    field.children.iter().flat_map(collect_boolean_expression).collect()
}

/// Flatten one boolean-expression subtree into AST items.
pub(crate) fn collect_boolean_expression(node: &SyntaxNode) -> Vec<AstItem> {
    use SyntaxKind::*;
    match node.kind {
        LogicalNot => {
            let mut function = create_function("not", node);
            for child in &node.children {
                if child.kind != Keyword {
                    function.args.extend(collect_boolean_expression(child));
                }
            }
            finish_function(function)
        }
        LogicalBinary => {
            let name = node.operator_text().unwrap_or_default().to_ascii_lowercase();
            let mut function = create_function(&name, node);
            for child in &node.children {
                if child.kind != Operator {
                    function.args.extend(collect_boolean_expression(child));
                }
            }
            finish_function(function)
        }
        LogicalIn => {
            let negated = node.keyword("not").is_some();
            let name = if negated { "not_in" } else { "in" };
            let mut function = create_function(name, node);
            let operands: Vec<&SyntaxNode> = node
                .children
                .iter()
                .filter(|c| c.kind != Keyword)
                .collect();
            if let Some((left, values)) = operands.split_first() {
                let left_items: Vec<AstItem> =
                    visit_value_expression(left).into_iter().collect();
                function.args.push(AstItem::Group(left_items));
                let value_items: Vec<AstItem> = values
                    .iter()
                    .filter_map(|v| visit_value_expression(v))
                    .collect();
                function.args.push(AstItem::Group(value_items));
            }
            finish_function(function)
        }
        RegexExpression => {
            let negated = node.keyword("not").is_some();
            let base = node
                .keyword("like")
                .or_else(|| node.keyword("rlike"))
                .map(|kw| kw.text.to_ascii_lowercase())
                .unwrap_or_default();
            let name = format!("{}{base}", if negated { "not_" } else { "" });
            let mut function = create_function(&name, node);
            if let Some(value) = node.children.first()
                && let Some(item) = visit_value_expression(value)
            {
                function.args.push(item);
                if let Some(pattern) = node.child(StringLiteral) {
                    function
                        .args
                        .push(AstItem::Node(AstNode::Literal(create_literal(
                            LiteralKind::String,
                            pattern,
                        ))));
                }
            }
            finish_function(function)
        }
        IsNull => {
            let negated = node.keyword("not").is_some();
            let name = if negated { "not_is_null" } else { "is_null" };
            let mut function = create_function(name, node);
            if let Some(value) = node.children.first()
                && let Some(item) = visit_value_expression(value)
            {
                function.args.push(item);
            }
            finish_function(function)
        }
        _ => visit_value_expression(node).into_iter().collect(),
    }
}

fn visit_value_expression(node: &SyntaxNode) -> Option<AstItem> {
    if node.kind == SyntaxKind::Comparison {
        let name = node.operator_text().unwrap_or_default();
        let mut function = create_function(name, node);
        function.incomplete |= node.error;
        for child in &node.children {
            if child.kind != SyntaxKind::Operator
                && let Some(item) = visit_operator_expression(child)
            {
                function.args.push(item);
            }
        }
        function.location = compute_location_extends(&function);
        return Some(AstItem::Node(AstNode::Function(function)));
    }
    visit_operator_expression(node)
}

fn visit_operator_expression(node: &SyntaxNode) -> Option<AstItem> {
    use SyntaxKind::*;
    match node.kind {
        ArithmeticUnary => {
            // a sign is just a multiplication in disguise
            let mut function = create_function("multiply", node);
            function
                .args
                .push(AstItem::Node(AstNode::Literal(fake_multiply_literal(node))));
            if let Some(operand) = node.children.iter().find(|c| c.kind != Operator)
                && let Some(item) = visit_operator_expression(operand)
            {
                function.args.push(item);
            }
            function.location = compute_location_extends(&function);
            Some(AstItem::Node(AstNode::Function(function)))
        }
        ArithmeticBinary => {
            let name = node.operator_text().unwrap_or_default();
            let mut function = create_function(name, node);
            function.incomplete |= node.error;
            for child in &node.children {
                if child.kind != Operator
                    && let Some(item) = visit_operator_expression(child)
                {
                    function.args.push(item);
                }
            }
            function.location = compute_location_extends(&function);
            Some(AstItem::Node(AstNode::Function(function)))
        }
        _ => visit_primary(node),
    }
}

fn visit_primary(node: &SyntaxNode) -> Option<AstItem> {
    use SyntaxKind::*;
    match node.kind {
        QualifiedName => Some(create_column(node)),
        Parenthesized => {
            let items: Vec<AstItem> = node
                .children
                .iter()
                .flat_map(collect_boolean_expression)
                .collect();
            Some(AstItem::Group(items))
        }
        FunctionExpression => {
            // lower-cased at construction time so lookups stay
            // case-insensitive
            let name = node
                .child(Identifier)
                .map(|id| id.text.to_ascii_lowercase())
                .unwrap_or_default();
            let mut function = create_function(&name, node);
            function.incomplete |= node.error;
            for arg in &node.children {
                if arg.kind != Identifier {
                    function.args.extend(collect_boolean_expression(arg));
                }
            }
            Some(AstItem::Node(AstNode::Function(function)))
        }
        StringLiteral => Some(AstItem::Node(AstNode::Literal(create_literal(
            LiteralKind::String,
            node,
        )))),
        NullLiteral => Some(AstItem::Node(AstNode::Literal(create_literal(
            LiteralKind::String,
            node,
        )))),
        IntegerLiteral | DecimalLiteral => Some(AstItem::Node(AstNode::Literal(create_literal(
            LiteralKind::Number,
            node,
        )))),
        BooleanLiteral => Some(AstItem::Node(AstNode::Literal(create_literal(
            LiteralKind::Boolean,
            node,
        )))),
        TimeIntervalLiteral => Some(AstItem::Node(AstNode::TimeInterval(create_time_interval(
            node,
        )))),
        NumericArrayLiteral | BooleanArrayLiteral | StringArrayLiteral => {
            let values: Vec<Literal> = node
                .children
                .iter()
                .map(|child| {
                    let kind = match child.kind {
                        StringLiteral | NullLiteral => LiteralKind::String,
                        BooleanLiteral => LiteralKind::Boolean,
                        _ => LiteralKind::Number,
                    };
                    create_literal(kind, child)
                })
                .collect();
            Some(AstItem::Node(AstNode::List(List {
                name: node.text.clone(),
                text: node.text.clone(),
                location: node.span,
                incomplete: node.error,
                values,
            })))
        }
        _ => None,
    }
}

// ---- node constructors ---------------------------------------------------

fn create_command(name: &str, node: &SyntaxNode) -> Command {
    Command {
        name: name.to_string(),
        text: node.text.clone(),
        location: node.span,
        incomplete: node.error,
        args: Vec::new(),
    }
}

fn create_option(name: &str, node: &SyntaxNode) -> CommandOption {
    CommandOption {
        name: name.to_string(),
        text: node.text.clone(),
        location: node.span,
        incomplete: node.error,
        args: Vec::new(),
    }
}

fn create_function(name: &str, node: &SyntaxNode) -> Function {
    Function {
        name: name.to_string(),
        text: node.text.clone(),
        location: node.span,
        incomplete: node.error,
        args: Vec::new(),
    }
}

fn finish_function(mut function: Function) -> Vec<AstItem> {
    function.location = compute_location_extends(&function);
    vec![AstItem::Node(AstNode::Function(function))]
}

fn create_literal(kind: LiteralKind, node: &SyntaxNode) -> Literal {
    let text = node.text.clone();
    let value = match kind {
        LiteralKind::Number => LiteralValue::Number(text.parse().unwrap_or(0.0)),
        LiteralKind::Boolean => LiteralValue::Boolean(text.eq_ignore_ascii_case("true")),
        LiteralKind::String => LiteralValue::String(text.clone()),
    };
    Literal {
        literal_type: kind,
        name: text.clone(),
        text,
        location: node.span,
        incomplete: node.error,
        value,
    }
}

fn keyword_literal(node: &SyntaxNode) -> Literal {
    let text = node.text.to_ascii_lowercase();
    Literal {
        literal_type: LiteralKind::String,
        name: text.clone(),
        text: node.text.clone(),
        location: node.span,
        incomplete: node.error,
        value: LiteralValue::String(text),
    }
}

/// The ±1 factor fabricated for a unary sign.
fn fake_multiply_literal(node: &SyntaxNode) -> Literal {
    let positive = node.operator_text() == Some("+");
    Literal {
        literal_type: LiteralKind::Number,
        name: node.text.clone(),
        text: node.text.clone(),
        location: node.span,
        incomplete: node.error,
        value: LiteralValue::Number(if positive { 1.0 } else { -1.0 }),
    }
}

fn create_time_interval(node: &SyntaxNode) -> TimeInterval {
    let quantity = node
        .child(SyntaxKind::IntegerLiteral)
        .and_then(|n| n.text.parse().ok())
        .unwrap_or(0.0);
    let unit = node
        .child(SyntaxKind::Identifier)
        .map(|n| n.text.clone())
        .unwrap_or_default();
    TimeInterval {
        name: format!("{} {unit}", quantity as i64),
        text: node.text.clone(),
        location: node.span,
        incomplete: node.error,
        quantity,
        unit,
    }
}

/// Resolution order: bare text if present, else quoted text with the
/// surrounding quotes stripped, else the raw text with quote characters
/// stripped as a fallback for malformed input.
pub(crate) fn sanitize_identifier(node: &SyntaxNode) -> String {
    if let Some(bare) = node.child(SyntaxKind::Identifier) {
        return bare.text.clone();
    }
    if let Some(quoted) = node.child(SyntaxKind::QuotedIdentifier) {
        return strip_backquotes(&quoted.text);
    }
    strip_backquotes(&node.text)
}

fn strip_backquotes(text: &str) -> String {
    let text = text.strip_prefix('`').unwrap_or(text);
    let text = text.strip_suffix('`').unwrap_or(text);
    text.to_string()
}

fn create_column(node: &SyntaxNode) -> AstItem {
    let name = sanitize_identifier(node);
    let quoted = node.has(SyntaxKind::QuotedIdentifier) || node.text.starts_with('`');
    AstItem::Node(AstNode::Column(Column {
        incomplete: node.error || name.is_empty(),
        text: name.clone(),
        name,
        location: node.span,
        quoted,
    }))
}

fn create_source(node: &SyntaxNode, source_type: SourceKind) -> AstItem {
    let name = sanitize_identifier(node);
    AstItem::Node(AstNode::Source(Source {
        incomplete: node.error || name.is_empty(),
        text: name.clone(),
        name,
        location: node.span,
        source_type,
    }))
}

fn constant_child(node: &SyntaxNode) -> Option<AstItem> {
    node.children
        .iter()
        .find(|c| {
            matches!(
                c.kind,
                SyntaxKind::StringLiteral
                    | SyntaxKind::IntegerLiteral
                    | SyntaxKind::DecimalLiteral
                    | SyntaxKind::BooleanLiteral
                    | SyntaxKind::NullLiteral
            )
        })
        .and_then(visit_primary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax;

    fn ast_of(src: &str) -> Vec<AstItem> {
        build_ast(&syntax::parse(src))
    }

    #[test]
    fn commands_keep_pipeline_order() {
        let ast = ast_of("from a | where x > 1 | stats c = avg(y) | limit 10");
        let names: Vec<_> = ast
            .iter()
            .filter_map(|item| item.as_command().map(|c| c.name.clone()))
            .collect();
        assert_eq!(names, vec!["from", "where", "stats", "limit"]);
    }

    #[test]
    fn unary_sign_desugars_to_multiply() {
        let ast = ast_of("row a = -x");
        let assignment = ast[0].as_command().unwrap().args[0].as_function().unwrap();
        let rhs = assignment.args[1].as_group().unwrap();
        let multiply = rhs[0].as_function().unwrap();
        assert_eq!(multiply.name, "multiply");
        let factor = multiply.args[0].as_literal().unwrap();
        assert_eq!(factor.value, LiteralValue::Number(-1.0));
    }

    #[test]
    fn negated_regex_composes_function_name() {
        let ast = ast_of("from a | where name not like \"foo*\"");
        let where_cmd = ast[1].as_command().unwrap();
        let function = where_cmd.args[0].as_function().unwrap();
        assert_eq!(function.name, "not_like");
        assert_eq!(function.args.len(), 2);
    }

    #[test]
    fn in_test_groups_both_sides() {
        let ast = ast_of("from a | where x in (1, 2, 3)");
        let function = ast[1].as_command().unwrap().args[0].as_function().unwrap();
        assert_eq!(function.name, "in");
        assert_eq!(function.args[0].as_group().unwrap().len(), 1);
        assert_eq!(function.args[1].as_group().unwrap().len(), 3);
    }

    #[test]
    fn sanitize_strips_only_surrounding_backquotes() {
        let ast = ast_of("from a | keep `any#Char$ field`");
        let column = ast[1].as_command().unwrap().args[0].as_column().unwrap();
        assert_eq!(column.name, "any#Char$ field");
        assert!(column.quoted);
    }

    #[test]
    fn empty_column_is_incomplete() {
        let ast = ast_of("from a | keep ``");
        let column = ast[1].as_command().unwrap().args[0].as_column().unwrap();
        assert!(column.incomplete);
        assert!(column.name.is_empty());
    }

    #[test]
    fn enrich_with_builds_assignments() {
        let ast = ast_of("from a | enrich policy on b with var0 = other");
        let enrich = ast[1].as_command().unwrap();
        let policy = enrich.args[0].as_source().unwrap();
        assert_eq!(policy.source_type, SourceKind::Policy);
        let with = enrich.args[2].as_option().unwrap();
        let assign = with.args[0].as_function().unwrap();
        assert_eq!(assign.name, "=");
        assert_eq!(assign.args[0].as_column().unwrap().name, "var0");
    }

    #[test]
    fn binary_function_span_covers_both_operands() {
        let ast = ast_of("from a | where xs + round(y, 2) > 1");
        let cmp = ast[1].as_command().unwrap().args[0].as_function().unwrap();
        // `>` spans from `xs` to the closing literal
        let src = "from a | where xs + round(y, 2) > 1";
        assert_eq!(&src[cmp.location.min..cmp.location.max], "xs + round(y, 2) > 1");
        let plus = cmp.args[0].as_function().unwrap();
        assert_eq!(&src[plus.location.min..plus.location.max], "xs + round(y, 2)");
    }
}
