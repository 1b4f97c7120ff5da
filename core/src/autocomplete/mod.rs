//! Context-sensitive autocomplete.
//!
//! `suggest` re-parses the text up to the cursor, inserting a synthetic
//! marker identifier when the cursor follows a character that would leave a
//! dangling production (`,`, `(`, `=`, an operator). The marker's position
//! in the rebuilt AST identifies the active argument slot; the per-command
//! logic below turns that slot into a candidate space, then everything is
//! deduplicated and rank-sorted.
//!
//! The engine is a pure function of (text, cursor, provider snapshot); it
//! holds no state across requests.

mod factories;

pub use factories::{Suggestion, SuggestionKind};

use std::collections::HashMap;

use crate::ast::{AstItem, AstNode, Command, Function, build_ast};
use crate::callbacks::{FieldDescriptor, ResourceCallbacks};
use crate::definitions::{FunctionCategory, TIME_UNITS};
use crate::error::CoreResult;
use crate::registry::{ReferenceMaps, Registry};
use crate::syntax;
use crate::validation::{collect_variables, infer_item_type};

use factories::*;

/// Synthetic identifier inserted at the cursor before re-parsing.
pub const MARKER: &str = "__streamql_marker__";

/// Characters after which the statement only parses with a marker appended.
const MARKER_TRIGGERS: &[char] = &[',', '(', '=', '+', '-', '*', '/', '%', '<', '>'];

pub async fn suggest<C: ResourceCallbacks>(
    text: &str,
    offset: usize,
    registry: &Registry,
    callbacks: &C,
) -> CoreResult<Vec<Suggestion>> {
    let inner = &text[..offset.min(text.len())];
    let trimmed = inner.trim_end();

    if trimmed.is_empty() {
        return Ok(command_list(registry, true));
    }
    if trimmed.ends_with('|') {
        return Ok(command_list(registry, false));
    }

    let parse_text = if trimmed.ends_with(MARKER_TRIGGERS) {
        format!("{inner}{MARKER}")
    } else {
        inner.to_string()
    };
    let ast = build_ast(&syntax::parse(&parse_text));

    let engine = Engine {
        registry,
        callbacks,
        inner,
    };
    let Some((index, command)) = last_command(&ast) else {
        return Ok(command_list(registry, true));
    };
    if registry.resolve_command(&command.name).is_none() {
        // half-typed command word
        return Ok(command_list(registry, index == 0));
    }

    let suggestions = match command.name.as_str() {
        "from" => engine.suggest_from(command).await?,
        "show" => engine.suggest_show(command),
        "limit" => engine.suggest_limit(command),
        "keep" | "drop" => engine.suggest_column_list(&ast, index, command).await?,
        "mv_expand" => engine.suggest_mv_expand(command).await?,
        "sort" => engine.suggest_sort(&ast, index, command).await?,
        "rename" => engine.suggest_rename(&ast, index, command).await?,
        "dissect" | "grok" => engine.suggest_pattern_command(command).await?,
        "enrich" => engine.suggest_enrich(&ast, index, command).await?,
        "stats" => engine.suggest_stats(&ast, index, command).await?,
        "row" => engine.suggest_expression(&ast, index, command, false, true).await?,
        "eval" => engine.suggest_expression(&ast, index, command, true, true).await?,
        _ => engine.suggest_expression(&ast, index, command, true, false).await?,
    };
    Ok(sort_and_dedupe(suggestions))
}

fn command_list(registry: &Registry, at_start: bool) -> Vec<Suggestion> {
    registry
        .commands()
        .iter()
        .filter(|def| def.source_command == at_start)
        .map(command_suggestion)
        .collect()
}

fn last_command(ast: &[AstItem]) -> Option<(usize, &Command)> {
    ast.iter()
        .enumerate()
        .rev()
        .find_map(|(i, item)| item.as_command().map(|c| (i, c)))
}

/// Where the marker ended up in the rebuilt AST.
enum MarkerSlot<'a> {
    /// Directly among the command arguments (a restart after a comma).
    TopLevel,
    /// Argument `index` of a call or operator.
    FunctionArg {
        function: &'a Function,
        index: usize,
    },
    /// Right-hand side of an assignment, still empty.
    AssignmentRhs,
    /// Inside a named option clause (`by`, `on`, `with`, `metadata`).
    OptionArg { option: &'a str },
}

fn is_marker(item: &AstItem) -> bool {
    match item.as_node() {
        Some(AstNode::Column(column)) => column.name == MARKER,
        Some(AstNode::Source(source)) => source.name == MARKER,
        _ => false,
    }
}

fn find_marker<'a>(args: &'a [AstItem]) -> Option<MarkerSlot<'a>> {
    find_marker_in(args, None, None)
}

fn find_marker_in<'a>(
    args: &'a [AstItem],
    owner: Option<(&'a Function, usize)>,
    option: Option<&'a str>,
) -> Option<MarkerSlot<'a>> {
    for (i, item) in args.iter().enumerate() {
        match item {
            _ if is_marker(item) => {
                return Some(match (owner, option) {
                    (Some((function, index)), _) => {
                        if function.name == "=" {
                            MarkerSlot::AssignmentRhs
                        } else {
                            MarkerSlot::FunctionArg { function, index }
                        }
                    }
                    (None, Some(name)) => MarkerSlot::OptionArg { option: name },
                    (None, None) => MarkerSlot::TopLevel,
                });
            }
            AstItem::Group(items) => {
                // a group keeps its owner's argument index
                let slot = find_marker_in(items, owner.map(|(f, _)| (f, i)), option);
                if slot.is_some() {
                    return slot;
                }
            }
            AstItem::Node(AstNode::Function(function)) => {
                let slot = function
                    .args
                    .iter()
                    .enumerate()
                    .find_map(|(j, arg)| match arg {
                        _ if is_marker(arg) => Some(match (function.name.as_str(), j) {
                            // a marker standing in for an assignment target
                            // is a fresh clause, not a right-hand side
                            ("=", 0) => match option {
                                Some(name) => MarkerSlot::OptionArg { option: name },
                                None => MarkerSlot::TopLevel,
                            },
                            ("=", _) => MarkerSlot::AssignmentRhs,
                            _ => MarkerSlot::FunctionArg { function, index: j },
                        }),
                        AstItem::Group(items) => find_marker_in(items, Some((function, j)), option),
                        AstItem::Node(AstNode::Function(_)) => {
                            find_marker_in(std::slice::from_ref(arg), None, option)
                        }
                        _ => None,
                    });
                if slot.is_some() {
                    return slot;
                }
            }
            AstItem::Node(AstNode::Option(opt)) => {
                let slot = find_marker_in(&opt.args, None, Some(&opt.name));
                if slot.is_some() {
                    return slot;
                }
            }
            _ => {}
        }
    }
    None
}

fn without_marker(args: &[AstItem]) -> Vec<&AstItem> {
    args.iter().filter(|item| !is_marker(item)).collect()
}

struct Engine<'a, C> {
    registry: &'a Registry,
    callbacks: &'a C,
    /// Text up to the cursor, without the marker.
    inner: &'a str,
}

impl<C: ResourceCallbacks> Engine<'_, C> {
    /// The pipeline restricted to the stages before the current command,
    /// handed to the fields provider so stage shadowing applies.
    fn command_prefix(&self, command: &Command) -> &str {
        let end = command.location.min.min(self.inner.len());
        self.inner[..end].trim_end().trim_end_matches('|').trim_end()
    }

    async fn field_descriptors(&self, command: &Command) -> CoreResult<Vec<FieldDescriptor>> {
        self.callbacks
            .get_fields_for(self.command_prefix(command))
            .await
    }

    async fn references(&self, command: &Command) -> CoreResult<ReferenceMaps> {
        let mut references = ReferenceMaps::default();
        for field in self.field_descriptors(command).await? {
            references
                .fields
                .entry(field.name)
                .or_default()
                .push(field.field_type);
        }
        Ok(references)
    }

    fn field_names_by_type(fields: &[FieldDescriptor], types: &[&str]) -> Vec<String> {
        fields
            .iter()
            .filter(|f| types.contains(&"any") || types.iter().any(|t| *t == f.field_type))
            .map(|f| f.name.clone())
            .collect()
    }

    /// Variables declared by the stages before `index`.
    fn prior_variables(
        &self,
        ast: &[AstItem],
        index: usize,
        references: &ReferenceMaps,
    ) -> HashMap<String, Vec<String>> {
        collect_variables(&ast[..index], self.registry, references)
    }

    /// First `varN` name not already taken.
    fn new_variable_name(
        &self,
        ast: &[AstItem],
        index: usize,
        references: &ReferenceMaps,
    ) -> String {
        let taken = collect_variables(
            &ast[..(index + 1).min(ast.len())],
            self.registry,
            references,
        );
        let mut n = 0;
        loop {
            let name = format!("var{n}");
            if !taken.contains_key(&name) && !references.fields.contains_key(&name) {
                return name;
            }
            n += 1;
        }
    }

    fn scalar_functions_for(
        &self,
        command: &str,
        return_types: Option<&[&str]>,
        ignored: &[&str],
    ) -> Vec<Suggestion> {
        self.registry
            .compatible_functions(command, None, &[FunctionCategory::Scalar], return_types, ignored)
            .into_iter()
            .map(function_suggestion)
            .collect()
    }

    fn aggregation_functions_for(&self, command: &str) -> Vec<Suggestion> {
        self.registry
            .compatible_functions(command, None, &[FunctionCategory::Aggregation], None, &[])
            .into_iter()
            .map(function_suggestion)
            .collect()
    }

    /// Operators whose left operand can be of the given type.
    fn operators_for(&self, command: &str, operand_type: &str) -> Vec<Suggestion> {
        self.registry
            .compatible_functions(command, None, &[FunctionCategory::Operator], None, &[])
            .into_iter()
            .filter(|def| {
                def.signatures.iter().any(|signature| {
                    signature
                        .params
                        .first()
                        .is_some_and(|p| p.param_type == operand_type || p.param_type == "any")
                })
            })
            .map(operator_suggestion)
            .collect()
    }

    /// Literal proposals for specialized parameter types.
    fn literals_for(&self, types: &[&str]) -> Vec<Suggestion> {
        let mut out = Vec::new();
        if types.contains(&"time_literal") {
            // singular units only, quantified
            let units = TIME_UNITS
                .iter()
                .filter(|unit| !unit.ends_with('s'))
                .map(|unit| format!("1 {unit}"));
            out.extend(constant_suggestions(units, "Time interval"));
        }
        if types.contains(&"chrono_literal") {
            let units = crate::definitions::CALENDAR_UNITS
                .iter()
                .map(|unit| format!("\"{unit}\""));
            out.extend(constant_suggestions(units, "Calendar unit"));
        }
        out
    }

    // ---- per-command spaces ---------------------------------------------

    async fn suggest_from(&self, command: &Command) -> CoreResult<Vec<Suggestion>> {
        let args = without_marker(&command.args);
        let restarting = self.inner.trim_end().ends_with(',');
        if args.is_empty() || restarting {
            let sources = self.callbacks.get_sources().await?;
            return Ok(source_suggestions(
                sources.into_iter().filter(|s| !s.hidden).map(|s| s.name),
            ));
        }
        let mut out = Vec::new();
        let has_metadata = args
            .iter()
            .any(|a| a.as_option().is_some_and(|o| o.name == "metadata"));
        if !has_metadata {
            out.push(metadata_suggestion());
        }
        out.push(pipe_suggestion());
        out.push(comma_suggestion());
        Ok(out)
    }

    fn suggest_show(&self, command: &Command) -> Vec<Suggestion> {
        if command.args.is_empty() {
            vec![keyword_suggestion("info"), keyword_suggestion("functions")]
        } else {
            vec![pipe_suggestion()]
        }
    }

    fn suggest_limit(&self, command: &Command) -> Vec<Suggestion> {
        if without_marker(&command.args).is_empty() {
            constant_suggestions(["10", "100", "1000"].map(String::from), "")
        } else {
            vec![pipe_suggestion()]
        }
    }

    async fn suggest_column_list(
        &self,
        ast: &[AstItem],
        index: usize,
        command: &Command,
    ) -> CoreResult<Vec<Suggestion>> {
        let args = without_marker(&command.args);
        let restarting = self.inner.trim_end().ends_with(',');
        if args.is_empty() || restarting {
            let fields = self.field_descriptors(command).await?;
            let references = self.references(command).await?;
            let variables = self.prior_variables(ast, index, &references);
            let mut out = field_suggestions(Self::field_names_by_type(&fields, &["any"]));
            out.extend(variable_suggestions(variables.into_keys()));
            return Ok(out);
        }
        Ok(vec![pipe_suggestion(), comma_suggestion()])
    }

    async fn suggest_mv_expand(&self, command: &Command) -> CoreResult<Vec<Suggestion>> {
        if without_marker(&command.args).is_empty() {
            let fields = self.field_descriptors(command).await?;
            return Ok(field_suggestions(Self::field_names_by_type(
                &fields,
                &["list"],
            )));
        }
        Ok(vec![pipe_suggestion()])
    }

    async fn suggest_sort(
        &self,
        ast: &[AstItem],
        index: usize,
        command: &Command,
    ) -> CoreResult<Vec<Suggestion>> {
        let args = without_marker(&command.args);
        let restarting = self.inner.trim_end().ends_with(',');
        if args.is_empty() || restarting {
            let fields = self.field_descriptors(command).await?;
            let references = self.references(command).await?;
            let variables = self.prior_variables(ast, index, &references);
            let mut out = field_suggestions(Self::field_names_by_type(&fields, &["any"]));
            out.extend(variable_suggestions(variables.into_keys()));
            return Ok(out);
        }
        let last_keyword = args
            .last()
            .and_then(|item| item.as_literal())
            .map(|literal| literal.name.as_str());
        Ok(match last_keyword {
            Some("asc" | "desc") => vec![
                keyword_suggestion("nulls first"),
                keyword_suggestion("nulls last"),
                pipe_suggestion(),
                comma_suggestion(),
            ],
            Some("nulls") => vec![keyword_suggestion("first"), keyword_suggestion("last")],
            Some("first" | "last") => vec![pipe_suggestion(), comma_suggestion()],
            _ => vec![
                keyword_suggestion("asc"),
                keyword_suggestion("desc"),
                pipe_suggestion(),
                comma_suggestion(),
            ],
        })
    }

    async fn suggest_rename(
        &self,
        ast: &[AstItem],
        index: usize,
        command: &Command,
    ) -> CoreResult<Vec<Suggestion>> {
        let args = without_marker(&command.args);
        let restarting = self.inner.trim_end().ends_with(',');
        if args.is_empty() || restarting {
            let fields = self.field_descriptors(command).await?;
            let references = self.references(command).await?;
            let variables = self.prior_variables(ast, index, &references);
            let mut out = field_suggestions(Self::field_names_by_type(&fields, &["any"]));
            out.extend(variable_suggestions(variables.into_keys()));
            return Ok(out);
        }
        let Some(clause) = args.last().and_then(|item| item.as_option()) else {
            return Ok(vec![pipe_suggestion(), comma_suggestion()]);
        };
        if !clause.incomplete {
            return Ok(vec![pipe_suggestion(), comma_suggestion()]);
        }
        // distinguish a missing `as` from a missing new name
        let has_as_word = clause
            .text
            .to_ascii_lowercase()
            .split_whitespace()
            .any(|word| word == "as");
        if has_as_word {
            let references = self.references(command).await?;
            let name = self.new_variable_name(ast, index, &references);
            Ok(vec![variable_suggestions([name]).remove(0)])
        } else {
            Ok(vec![keyword_suggestion("as")])
        }
    }

    async fn suggest_pattern_command(&self, command: &Command) -> CoreResult<Vec<Suggestion>> {
        let args = without_marker(&command.args);
        if args.is_empty() {
            let fields = self.field_descriptors(command).await?;
            return Ok(field_suggestions(Self::field_names_by_type(
                &fields,
                &["string", "any"],
            )));
        }
        let has_pattern = args.iter().any(|item| item.as_literal().is_some());
        if !has_pattern {
            return Ok(constant_suggestions(
                [String::from("\"a-pattern\"")],
                "A pattern string",
            ));
        }
        if command.name == "dissect"
            && !args.iter().any(|item| item.as_option().is_some())
        {
            return Ok(vec![
                keyword_suggestion("append_separator"),
                pipe_suggestion(),
            ]);
        }
        Ok(vec![pipe_suggestion()])
    }

    async fn suggest_enrich(
        &self,
        ast: &[AstItem],
        index: usize,
        command: &Command,
    ) -> CoreResult<Vec<Suggestion>> {
        let args = without_marker(&command.args);
        let policy_name = args.iter().find_map(|item| {
            item.as_source()
                .filter(|s| s.source_type == crate::ast::SourceKind::Policy)
                .map(|s| s.name.clone())
        });
        let Some(policy_name) = policy_name else {
            let policies = self.callbacks.get_policies().await?;
            return Ok(policy_suggestions(&policies));
        };

        let slot = find_marker(&command.args);
        let on_option = args.iter().find_map(|i| i.as_option().filter(|o| o.name == "on"));
        let with_option = args
            .iter()
            .find_map(|i| i.as_option().filter(|o| o.name == "with"));

        // match-field position
        if matches!(slot, Some(MarkerSlot::OptionArg { option: "on" }))
            || on_option.is_some_and(|o| o.args.is_empty())
        {
            let fields = self.field_descriptors(command).await?;
            return Ok(field_suggestions(Self::field_names_by_type(&fields, &["any"])));
        }

        if let Some(with) = with_option {
            let policies = self.callbacks.get_policies().await?;
            let enrich_fields: Vec<String> = policies
                .iter()
                .filter(|p| p.name == policy_name)
                .flat_map(|p| p.enrich_fields.clone())
                .collect();
            let references = self.references(command).await?;
            let restarting = self.inner.trim_end().ends_with(',');
            let rhs_position = matches!(
                slot,
                Some(MarkerSlot::AssignmentRhs | MarkerSlot::FunctionArg { .. })
            );
            if rhs_position {
                return Ok(field_suggestions(enrich_fields));
            }
            if with.args.is_empty() || restarting {
                let mut out = vec![new_variable_suggestion(
                    &self.new_variable_name(ast, index, &references),
                )];
                out.extend(field_suggestions(enrich_fields));
                return Ok(out);
            }
            // last clause: bare name vs complete assignment
            let assigned = with
                .args
                .last()
                .and_then(|item| item.as_function())
                .is_some_and(|f| f.text.contains('='));
            if assigned {
                return Ok(vec![pipe_suggestion(), comma_suggestion()]);
            }
            return Ok(vec![
                assignment_suggestion(),
                pipe_suggestion(),
                comma_suggestion(),
            ]);
        }

        if on_option.is_some() {
            return Ok(vec![
                keyword_suggestion("with"),
                pipe_suggestion(),
                comma_suggestion(),
            ]);
        }
        Ok(vec![
            keyword_suggestion("on"),
            keyword_suggestion("with"),
            pipe_suggestion(),
        ])
    }

    async fn suggest_stats(
        &self,
        ast: &[AstItem],
        index: usize,
        command: &Command,
    ) -> CoreResult<Vec<Suggestion>> {
        let args = without_marker(&command.args);
        let slot = find_marker(&command.args);
        let by_option = args.iter().find_map(|i| i.as_option().filter(|o| o.name == "by"));

        if let Some(by) = by_option {
            if matches!(slot, Some(MarkerSlot::OptionArg { option: "by" })) || by.args.is_empty() {
                let fields = self.field_descriptors(command).await?;
                return Ok(field_suggestions(Self::field_names_by_type(&fields, &["any"])));
            }
            return Ok(vec![pipe_suggestion(), comma_suggestion()]);
        }

        match slot {
            Some(MarkerSlot::FunctionArg { function, index: arg_index }) => {
                let references = self.references(command).await?;
                let variables = self.prior_variables(ast, index, &references);
                return self
                    .function_argument_suggestions(
                        command,
                        function,
                        arg_index,
                        &references,
                        &variables,
                        true,
                    )
                    .await;
            }
            Some(MarkerSlot::AssignmentRhs) => {
                return Ok(self.aggregation_functions_for("stats"));
            }
            Some(MarkerSlot::TopLevel) => {
                return Ok(self.stats_restart(ast, index, command).await?);
            }
            None if args.is_empty() => {
                return Ok(self.stats_restart(ast, index, command).await?);
            }
            _ => {}
        }

        // bare column: propose assigning it
        if args.last().and_then(|i| i.as_column()).is_some() {
            return Ok(vec![assignment_suggestion()]);
        }
        Ok(vec![
            keyword_suggestion("by"),
            pipe_suggestion(),
            comma_suggestion(),
        ])
    }

    /// Fresh aggregation slot: a new variable plus the aggregation catalog.
    async fn stats_restart(
        &self,
        ast: &[AstItem],
        index: usize,
        command: &Command,
    ) -> CoreResult<Vec<Suggestion>> {
        let references = self.references(command).await?;
        let mut out = vec![new_variable_suggestion(
            &self.new_variable_name(ast, index, &references),
        )];
        out.extend(self.aggregation_functions_for("stats"));
        Ok(out)
    }

    /// Expression-position suggestions for `where`, `eval`, and `row`.
    async fn suggest_expression(
        &self,
        ast: &[AstItem],
        index: usize,
        command: &Command,
        allow_fields: bool,
        allow_new_variable: bool,
    ) -> CoreResult<Vec<Suggestion>> {
        let name = command.name.clone();
        let references = if allow_fields {
            self.references(command).await?
        } else {
            ReferenceMaps::default()
        };
        let variables = self.prior_variables(ast, index, &references);
        let fields = if allow_fields {
            self.field_descriptors(command).await?
        } else {
            Vec::new()
        };

        match find_marker(&command.args) {
            Some(MarkerSlot::FunctionArg { function, index: arg_index }) => {
                return self
                    .function_argument_suggestions(
                        command,
                        function,
                        arg_index,
                        &references,
                        &variables,
                        allow_fields,
                    )
                    .await;
            }
            Some(MarkerSlot::AssignmentRhs) => {
                return Ok(self.scalar_functions_for(&name, None, &[]));
            }
            Some(MarkerSlot::TopLevel) => {
                // restarting after a comma
                let mut out = Vec::new();
                if allow_new_variable {
                    out.push(new_variable_suggestion(
                        &self.new_variable_name(ast, index, &references),
                    ));
                    out.extend(self.scalar_functions_for(&name, None, &[]));
                } else {
                    out.extend(field_suggestions(Self::field_names_by_type(&fields, &["any"])));
                    out.extend(variable_suggestions(variables.keys().cloned()));
                    out.extend(self.scalar_functions_for(&name, None, &[]));
                }
                return Ok(out);
            }
            Some(MarkerSlot::OptionArg { .. }) | None => {}
        }

        let args = without_marker(&command.args);
        if args.is_empty() {
            let mut out = Vec::new();
            if allow_new_variable {
                out.push(new_variable_suggestion(
                    &self.new_variable_name(ast, index, &references),
                ));
            }
            out.extend(field_suggestions(Self::field_names_by_type(&fields, &["any"])));
            out.extend(variable_suggestions(variables.keys().cloned()));
            out.extend(self.scalar_functions_for(&name, None, &[]));
            return Ok(out);
        }

        // analyze the tail of the last expression
        let mut target: &AstItem = args.last().unwrap();
        if let Some(assignment) = target.as_assignment() {
            match assignment.args.get(1) {
                Some(AstItem::Group(items)) if !items.is_empty() => {
                    target = items.last().unwrap();
                }
                _ => return Ok(self.scalar_functions_for(&name, None, &[])),
            }
        }

        // unfinished operator: `a > 1 and `, `not `
        if let Some(function) = target.as_function()
            && function.incomplete
            && self
                .registry
                .resolve_function(&function.name)
                .is_some_and(|def| def.category == FunctionCategory::Operator)
        {
            return self
                .function_argument_suggestions(
                    command,
                    function,
                    function.args.len(),
                    &references,
                    &variables,
                    allow_fields,
                )
                .await;
        }

        let mut scope = references.clone();
        scope.variables = variables.clone();
        // operator candidates follow the type of the expression typed so
        // far when it holds together, else the operand the user last typed
        let well_typed = is_well_typed(target, self.registry, &scope, &name);
        let operand = rightmost_operand(target, self.registry);
        let operand_type = if well_typed {
            infer_item_type(target, self.registry, &scope)
        } else {
            infer_item_type(operand, self.registry, &scope)
        };

        let mut out = self.operators_for(&name, &operand_type);
        if operand.as_literal().is_some() && operand_type == "number" {
            out.extend(constant_suggestions(
                TIME_UNITS.iter().map(|s| s.to_string()),
                "Time unit",
            ));
        }
        let expression_done = match name.as_str() {
            "where" => well_typed && operand_type == "boolean",
            _ => true,
        };
        if expression_done {
            out.push(pipe_suggestion());
            out.push(comma_suggestion());
        }
        Ok(out)
    }

    /// Candidates for one argument slot of a resolved call or operator:
    /// fields and functions whose type matches the slot, plus literal
    /// proposals for specialized types.
    async fn function_argument_suggestions(
        &self,
        command: &Command,
        function: &Function,
        arg_index: usize,
        references: &ReferenceMaps,
        variables: &HashMap<String, Vec<String>>,
        allow_fields: bool,
    ) -> CoreResult<Vec<Suggestion>> {
        let command_name = command.name.as_str();
        let Some(def) = self.registry.resolve_function(&function.name) else {
            let fields = self.field_descriptors(command).await?;
            let mut out = field_suggestions(Self::field_names_by_type(&fields, &["any"]));
            out.extend(self.scalar_functions_for(command_name, None, &[]));
            return Ok(out);
        };

        let mut scope = references.clone();
        scope.variables = variables.clone();

        // keep signatures whose leading params accept the already-typed args
        let mut expected_types: Vec<&str> = Vec::new();
        let mut more_required = false;
        for signature in &def.signatures {
            let leading_ok = function.args.iter().take(arg_index).enumerate().all(
                |(i, arg)| match signature.params.get(i) {
                    Some(param) => {
                        self.registry
                            .matches_type(arg, param.param_type, &scope, Some(command_name))
                    }
                    None => signature.infinite_params,
                },
            );
            if !leading_ok {
                continue;
            }
            let param = signature
                .params
                .get(arg_index)
                .or_else(|| signature.params.last().filter(|_| signature.infinite_params));
            if let Some(param) = param {
                if !expected_types.contains(&param.param_type) {
                    expected_types.push(param.param_type);
                }
                more_required |= signature
                    .params
                    .iter()
                    .skip(arg_index + 1)
                    .any(|p| !p.optional);
            }
        }
        if expected_types.is_empty() {
            expected_types.push("any");
        }

        let mut out = Vec::new();
        if allow_fields {
            let fields = self.field_descriptors(command).await?;
            out.extend(field_suggestions(Self::field_names_by_type(
                &fields,
                &expected_types,
            )));
        }
        if def.category != FunctionCategory::Aggregation {
            out.extend(self.scalar_functions_for(
                command_name,
                Some(&expected_types),
                &[def.name],
            ));
            out.extend(self.literals_for(&expected_types));
        }
        if more_required {
            for suggestion in &mut out {
                suggestion.text.push(',');
                suggestion.label.push(',');
            }
        }
        Ok(out)
    }
}

/// Descend the right edge of operator applications down to the operand the
/// user last typed.
fn rightmost_operand<'a>(item: &'a AstItem, registry: &Registry) -> &'a AstItem {
    let mut current = item;
    while let Some(function) = current.as_function() {
        let is_operator = registry
            .resolve_function(&function.name)
            .is_some_and(|def| def.category == FunctionCategory::Operator);
        if !is_operator {
            break;
        }
        let Some(last) = function.args.last() else {
            break;
        };
        current = match last {
            AstItem::Group(items) => match items.last() {
                Some(inner) => inner,
                None => break,
            },
            node => node,
        };
    }
    current
}

fn is_well_typed(
    item: &AstItem,
    registry: &Registry,
    references: &ReferenceMaps,
    command: &str,
) -> bool {
    let Some(function) = item.as_function() else {
        return true;
    };
    let Some(def) = registry.resolve_function(&function.name) else {
        return false;
    };
    def.signatures.iter().any(|signature| {
        function.args.len() >= signature.params.iter().filter(|p| !p.optional).count()
            && function.args.iter().enumerate().all(|(i, arg)| {
                signature
                    .params
                    .get(i)
                    .or_else(|| signature.params.last().filter(|_| signature.infinite_params))
                    .is_some_and(|param| {
                        registry.matches_type(arg, param.param_type, references, Some(command))
                    })
            })
    })
}
