//! Semantic validation.
//!
//! Walks the AST with a snapshot of the effective symbol universe and emits
//! diagnostics with stable codes; the quick-fix engine keys its strategies
//! off those codes. Syntax incompleteness never produces diagnostics here,
//! incomplete nodes are skipped and re-checked on the next parse.

use std::collections::HashMap;

use serde::Serialize;

use crate::ast::{AstItem, AstNode, Function, Span};
use crate::callbacks::ResourceCallbacks;
use crate::definitions::FunctionCategory;
use crate::error::CoreResult;
use crate::registry::{ReferenceMaps, Registry, UnsupportedReason, column_exists, source_exists};

/// Stable diagnostic codes, used to select quick-fix strategies.
pub mod codes {
    pub const UNKNOWN_COLUMN: &str = "unknownColumn";
    pub const UNKNOWN_INDEX: &str = "unknownIndex";
    pub const UNKNOWN_POLICY: &str = "unknownPolicy";
    pub const UNKNOWN_FUNCTION: &str = "unknownFunction";
    pub const UNKNOWN_OPTION: &str = "unknownOption";
    pub const UNSUPPORTED_FUNCTION: &str = "unsupportedFunction";
    pub const WRONG_ARGUMENT_COUNT: &str = "wrongArgumentCount";
    pub const WRONG_ARGUMENT_TYPE: &str = "wrongArgumentType";
    pub const DIVIDE_BY_ZERO: &str = "divideByZero";
    pub const MODULO_BY_ZERO: &str = "moduloByZero";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub message: String,
    pub location: Span,
    pub severity: Severity,
    pub code: &'static str,
}

impl Diagnostic {
    fn error(code: &'static str, location: Span, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location,
            severity: Severity::Error,
            code,
        }
    }

    fn warning(code: &'static str, location: Span, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location,
            severity: Severity::Warning,
            code,
        }
    }
}

/// Fetch the reference maps from the providers and validate. Provider
/// failures surface as an error so the host can report them; the AST itself
/// never makes this fail.
pub async fn validate<C: ResourceCallbacks>(
    ast: &[AstItem],
    registry: &Registry,
    callbacks: &C,
) -> CoreResult<Vec<Diagnostic>> {
    let mut references = ReferenceMaps::default();
    let prefix = build_query_for_fields(ast);
    for field in callbacks.get_fields_for(&prefix).await? {
        references
            .fields
            .entry(field.name)
            .or_default()
            .push(field.field_type);
    }
    for source in callbacks.get_sources().await? {
        references.sources.insert(source.name);
    }
    for policy in callbacks.get_policies().await? {
        references.policies.insert(policy.name.clone(), policy);
    }
    Ok(validate_ast(ast, registry, &mut references))
}

/// The pipeline prefix handed to the fields provider: the source-introducing
/// stage restricted to its own text.
pub fn build_query_for_fields(ast: &[AstItem]) -> String {
    ast.first()
        .and_then(AstItem::as_command)
        .map(|command| command.text.trim().to_string())
        .unwrap_or_default()
}

/// Validate against an already-assembled universe. Variables declared by
/// assignments become visible to the stages that follow them.
pub fn validate_ast(
    ast: &[AstItem],
    registry: &Registry,
    references: &mut ReferenceMaps,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for item in ast {
        let Some(command) = item.as_command() else {
            continue;
        };
        if command.incomplete {
            continue;
        }
        let walker = Walker {
            registry,
            command: command.name.clone(),
        };
        for arg in &command.args {
            walker.walk(arg, references, &mut diagnostics);
        }
        declare_variables(&command.args, registry, references);
    }
    diagnostics
}

/// Names and types declared by assignments and renames in the given
/// commands; used by both validation and autocomplete.
pub fn collect_variables(
    commands: &[AstItem],
    registry: &Registry,
    references: &ReferenceMaps,
) -> HashMap<String, Vec<String>> {
    let mut scope = references.clone();
    for item in commands {
        if let Some(command) = item.as_command() {
            declare_variables(&command.args, registry, &mut scope);
        }
    }
    scope.variables
}

fn declare_variables(args: &[AstItem], registry: &Registry, references: &mut ReferenceMaps) {
    for arg in args {
        match arg {
            AstItem::Group(items) => declare_variables(items, registry, references),
            AstItem::Node(AstNode::Option(option)) => {
                if option.name == "as" {
                    // rename: the new name inherits the old column's types
                    let mut columns = option.args.iter().filter_map(AstItem::as_column);
                    if let (Some(old), Some(new)) = (columns.next(), columns.next()) {
                        let types = references
                            .fields
                            .get(&old.name)
                            .or_else(|| references.variables.get(&old.name))
                            .cloned()
                            .unwrap_or_default();
                        references.variables.insert(new.name.clone(), types);
                    }
                } else {
                    declare_variables(&option.args, registry, references);
                }
            }
            AstItem::Node(AstNode::Function(function)) if function.name == "=" => {
                if let Some(column) = function.args.first().and_then(AstItem::as_column) {
                    let inferred = function
                        .args
                        .get(1)
                        .map(|rhs| infer_item_type(rhs, registry, references))
                        .unwrap_or_else(|| "unsupported".to_string());
                    references
                        .variables
                        .insert(column.name.clone(), vec![inferred]);
                }
            }
            _ => {}
        }
    }
}

/// Best-effort static type of an argument, for variable declarations.
pub fn infer_item_type(item: &AstItem, registry: &Registry, references: &ReferenceMaps) -> String {
    match item {
        AstItem::Group(items) => items
            .first()
            .map(|inner| infer_item_type(inner, registry, references))
            .unwrap_or_else(|| "unsupported".to_string()),
        AstItem::Node(node) => match node {
            AstNode::Literal(literal) => match literal.literal_type {
                crate::ast::LiteralKind::Number => "number".to_string(),
                crate::ast::LiteralKind::String => "string".to_string(),
                crate::ast::LiteralKind::Boolean => "boolean".to_string(),
            },
            AstNode::Function(function) => registry
                .resolve_function(&function.name)
                .and_then(|def| def.signatures.first())
                .map(|signature| signature.return_type.to_string())
                .unwrap_or_else(|| "unsupported".to_string()),
            AstNode::Column(column) => references
                .fields
                .get(&column.name)
                .or_else(|| references.variables.get(&column.name))
                .and_then(|types| types.first())
                .cloned()
                .unwrap_or_else(|| "unsupported".to_string()),
            AstNode::TimeInterval(_) => "time_literal".to_string(),
            AstNode::List(list) => list
                .values
                .first()
                .map(|first| {
                    let kind = match first.literal_type {
                        crate::ast::LiteralKind::Number => "number",
                        crate::ast::LiteralKind::String => "string",
                        crate::ast::LiteralKind::Boolean => "boolean",
                    };
                    format!("{kind}[]")
                })
                .unwrap_or_else(|| "list".to_string()),
            _ => "unsupported".to_string(),
        },
    }
}

struct Walker<'a> {
    registry: &'a Registry,
    command: String,
}

impl Walker<'_> {
    fn walk(&self, item: &AstItem, references: &ReferenceMaps, out: &mut Vec<Diagnostic>) {
        match item {
            AstItem::Group(items) => {
                for inner in items {
                    self.walk(inner, references, out);
                }
            }
            AstItem::Node(node) => self.walk_node(node, references, out),
        }
    }

    fn walk_node(&self, node: &AstNode, references: &ReferenceMaps, out: &mut Vec<Diagnostic>) {
        match node {
            AstNode::Column(column) => {
                if column.incomplete || column.name == "*" {
                    return;
                }
                if column_exists(column, references).is_none() {
                    out.push(Diagnostic::error(
                        codes::UNKNOWN_COLUMN,
                        column.location,
                        format!("Unknown column [{}]", column.name),
                    ));
                }
            }
            AstNode::Source(source) => {
                if source.incomplete {
                    return;
                }
                match source.source_type {
                    crate::ast::SourceKind::Index => {
                        if !source_exists(&source.name, &references.sources) {
                            out.push(Diagnostic::error(
                                codes::UNKNOWN_INDEX,
                                source.location,
                                format!("Unknown index [{}]", source.name),
                            ));
                        }
                    }
                    crate::ast::SourceKind::Policy => {
                        if !references.policies.contains_key(&source.name) {
                            out.push(Diagnostic::error(
                                codes::UNKNOWN_POLICY,
                                source.location,
                                format!("Unknown policy [{}]", source.name),
                            ));
                        }
                    }
                }
            }
            AstNode::Option(option) => {
                if !option.incomplete
                    && let Some(def) = self.registry.resolve_command(&self.command)
                    && !def.options.contains(&option.name.as_str())
                {
                    out.push(Diagnostic::error(
                        codes::UNKNOWN_OPTION,
                        option.location,
                        format!(
                            "Option [{}] is not supported in [{}]",
                            option.name, self.command
                        ),
                    ));
                }
                // `as` declares its second column; `with` references policy
                // enrich fields, which live outside the field universe
                if option.name == "with" && self.command == "enrich" {
                    return;
                }
                let args: &[AstItem] = if option.name == "as" {
                    &option.args[..option.args.len().min(1)]
                } else {
                    &option.args
                };
                for arg in args {
                    self.walk(arg, references, out);
                }
            }
            AstNode::Function(function) => self.walk_function(function, references, out),
            _ => {}
        }
    }

    fn walk_function(
        &self,
        function: &Function,
        references: &ReferenceMaps,
        out: &mut Vec<Diagnostic>,
    ) {
        let Some(def) = self.registry.resolve_function(&function.name) else {
            if !function.incomplete {
                out.push(Diagnostic::error(
                    codes::UNKNOWN_FUNCTION,
                    function.location,
                    format!("Unknown function [{}]", function.name),
                ));
            }
            return;
        };
        let check = self
            .registry
            .is_supported_function(&function.name, Some(&self.command));
        if !check.supported && check.reason == Some(UnsupportedReason::UnsupportedFunction) {
            let kind = if def.category == FunctionCategory::Aggregation {
                "agg function"
            } else {
                "function"
            };
            out.push(Diagnostic::error(
                codes::UNSUPPORTED_FUNCTION,
                function.location,
                format!(
                    "{} [{}] not allowed in [{}]",
                    kind, function.name, self.command
                ),
            ));
        }
        if !function.incomplete {
            self.check_signatures(function, def, references, out);
        }
        self.check_zero_divisor(function, out);
        // the left side of an assignment is a declaration, not a reference
        let args = if function.name == "=" {
            &function.args[function.args.len().min(1)..]
        } else {
            &function.args[..]
        };
        for arg in args {
            self.walk(arg, references, out);
        }
    }

    fn check_signatures(
        &self,
        function: &Function,
        def: &crate::definitions::FunctionDefinition,
        references: &ReferenceMaps,
        out: &mut Vec<Diagnostic>,
    ) {
        let supplied = function.args.len();
        let arity_ok = def.signatures.iter().any(|signature| {
            let min = signature
                .min_params
                .unwrap_or_else(|| signature.params.iter().filter(|p| !p.optional).count());
            supplied >= min && (signature.infinite_params || supplied <= signature.params.len())
        });
        if !arity_ok {
            let expected = def
                .signatures
                .first()
                .map(|s| s.params.len())
                .unwrap_or_default();
            out.push(Diagnostic::error(
                codes::WRONG_ARGUMENT_COUNT,
                function.location,
                format!(
                    "Wrong number of arguments for [{}]: expected {expected}, got {supplied}",
                    function.name
                ),
            ));
            return;
        }
        // a call is well-typed if any signature accepts every argument
        let matches_some_signature = def.signatures.iter().any(|signature| {
            function.args.iter().enumerate().all(|(i, arg)| {
                let param = signature
                    .params
                    .get(i)
                    .or_else(|| signature.params.last().filter(|_| signature.infinite_params));
                match param {
                    Some(param) => {
                        arg.is_incomplete()
                            || self.unresolved_column(arg, references)
                            || self.registry.matches_type(
                                arg,
                                param.param_type,
                                references,
                                Some(&self.command),
                            )
                    }
                    None => false,
                }
            })
        });
        if !matches_some_signature && !function.args.is_empty() {
            let expected = def
                .signatures
                .first()
                .and_then(|s| s.params.first())
                .map(|p| p.param_type)
                .unwrap_or("any");
            out.push(Diagnostic::error(
                codes::WRONG_ARGUMENT_TYPE,
                function.location,
                format!(
                    "Argument of [{}] must be [{expected}], found [{}]",
                    function.name,
                    function.text.trim()
                ),
            ));
        }
    }

    /// Columns that failed resolution already produce their own diagnostic;
    /// skip type complaints about them.
    fn unresolved_column(&self, item: &AstItem, references: &ReferenceMaps) -> bool {
        item.as_column()
            .is_some_and(|column| column.name != "*" && column_exists(column, references).is_none())
    }

    fn check_zero_divisor(&self, function: &Function, out: &mut Vec<Diagnostic>) {
        let code = match function.name.as_str() {
            "/" => codes::DIVIDE_BY_ZERO,
            "%" => codes::MODULO_BY_ZERO,
            _ => return,
        };
        if let Some(divisor) = function.args.get(1).and_then(AstItem::as_literal)
            && divisor.value == crate::ast::LiteralValue::Number(0.0)
        {
            let message = if code == codes::DIVIDE_BY_ZERO {
                "Cannot divide by zero"
            } else {
                "Module by zero can return null value"
            };
            out.push(Diagnostic::warning(code, function.location, message));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build_ast;
    use crate::syntax;

    fn references() -> ReferenceMaps {
        let mut refs = ReferenceMaps::default();
        refs.fields
            .insert("stringField".into(), vec!["string".into()]);
        refs.fields
            .insert("numberField".into(), vec!["number".into()]);
        refs.sources.insert("index".into());
        refs.policies.insert(
            "policy".into(),
            crate::callbacks::PolicyDescriptor {
                name: "policy".into(),
                source_indices: vec!["enrichIndex1".into()],
                match_field: "otherStringField".into(),
                enrich_fields: vec!["otherField".into()],
            },
        );
        refs
    }

    fn diagnostics_for(src: &str) -> Vec<Diagnostic> {
        let registry = Registry::new();
        let ast = build_ast(&syntax::parse(src));
        validate_ast(&ast, &registry, &mut references())
    }

    #[test]
    fn valid_query_has_no_diagnostics() {
        let diags = diagnostics_for("from index | where numberField > 1 | limit 10");
        assert!(diags.is_empty(), "unexpected: {diags:?}");
    }

    #[test]
    fn unknown_column_is_reported_with_code() {
        let diags = diagnostics_for("from index | keep numbrField");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, codes::UNKNOWN_COLUMN);
        assert_eq!(diags[0].message, "Unknown column [numbrField]");
    }

    #[test]
    fn unknown_index_and_policy_are_reported() {
        let diags = diagnostics_for("from missing | enrich nope");
        let codes_found: Vec<_> = diags.iter().map(|d| d.code).collect();
        assert!(codes_found.contains(&codes::UNKNOWN_INDEX));
        assert!(codes_found.contains(&codes::UNKNOWN_POLICY));
    }

    #[test]
    fn aggregation_outside_stats_is_unsupported() {
        let diags = diagnostics_for("from index | where avg(numberField) > 1");
        assert!(diags.iter().any(|d| d.code == codes::UNSUPPORTED_FUNCTION));
    }

    #[test]
    fn unknown_function_is_reported() {
        let diags = diagnostics_for("from index | eval a = rnod(numberField)");
        assert!(diags.iter().any(|d| d.code == codes::UNKNOWN_FUNCTION));
    }

    #[test]
    fn assignment_declares_variable_for_later_stages() {
        let diags = diagnostics_for("from index | eval a = numberField + 1 | keep a");
        assert!(diags.is_empty(), "unexpected: {diags:?}");
    }

    #[test]
    fn wrong_argument_type_is_reported() {
        let diags = diagnostics_for("from index | eval a = round(stringField)");
        assert!(diags.iter().any(|d| d.code == codes::WRONG_ARGUMENT_TYPE));
    }

    #[test]
    fn division_by_zero_literal_warns() {
        let diags = diagnostics_for("from index | eval a = numberField / 0");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, Severity::Warning);
        assert_eq!(diags[0].code, codes::DIVIDE_BY_ZERO);
    }

    #[test]
    fn wildcard_columns_are_not_flagged() {
        let diags = diagnostics_for("from index | keep string*");
        assert!(diags.is_empty(), "unexpected: {diags:?}");
    }
}
