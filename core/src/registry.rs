//! Name resolution and type compatibility.
//!
//! The [`Registry`] indexes the static catalog once (aliases included, keys
//! lower-cased) and is passed by reference into the validation, autocomplete,
//! and quick-fix engines. Lookups are pure; nothing here mutates after
//! construction.

use std::collections::{HashMap, HashSet};

use crate::ast::{AstItem, AstNode, Column};
use crate::callbacks::PolicyDescriptor;
use crate::definitions::{
    self, CommandDefinition, FunctionCategory, FunctionDefinition, is_calendar_unit, is_time_unit,
};

/// The effective symbol universe at a pipeline position: physical fields,
/// user-declared variables, known sources, and enrichment policies.
#[derive(Debug, Clone, Default)]
pub struct ReferenceMaps {
    /// Field name → declared types.
    pub fields: HashMap<String, Vec<String>>,
    /// Variable name → inferred types.
    pub variables: HashMap<String, Vec<String>>,
    pub sources: HashSet<String>,
    pub policies: HashMap<String, PolicyDescriptor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedReason {
    MissingCommand,
    UnsupportedFunction,
    UnknownFunction,
}

/// Outcome of checking a function against the current pipeline stage.
#[derive(Debug, Clone, Copy)]
pub struct SupportCheck {
    pub supported: bool,
    pub reason: Option<UnsupportedReason>,
}

#[derive(Debug)]
pub struct Registry {
    functions: Vec<FunctionDefinition>,
    commands: Vec<CommandDefinition>,
    function_index: HashMap<String, usize>,
    command_index: HashMap<String, usize>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Build the registry over the full built-in catalog.
    pub fn new() -> Self {
        let mut functions = definitions::builtin_functions();
        functions.extend(definitions::scalar_functions());
        functions.extend(definitions::aggregation_functions());
        let commands = definitions::command_definitions();

        let mut function_index = HashMap::new();
        for (i, def) in functions.iter().enumerate() {
            function_index.insert(def.name.to_ascii_lowercase(), i);
            for alias in def.aliases {
                function_index.insert(alias.to_ascii_lowercase(), i);
            }
        }
        let mut command_index = HashMap::new();
        for (i, def) in commands.iter().enumerate() {
            command_index.insert(def.name.to_ascii_lowercase(), i);
            if let Some(alias) = def.alias {
                command_index.insert(alias.to_ascii_lowercase(), i);
            }
        }
        Self {
            functions,
            commands,
            function_index,
            command_index,
        }
    }

    pub fn resolve_function(&self, name: &str) -> Option<&FunctionDefinition> {
        self.function_index
            .get(&name.to_ascii_lowercase())
            .map(|&i| &self.functions[i])
    }

    pub fn resolve_command(&self, name: &str) -> Option<&CommandDefinition> {
        self.command_index
            .get(&name.to_ascii_lowercase())
            .map(|&i| &self.commands[i])
    }

    pub fn commands(&self) -> &[CommandDefinition] {
        &self.commands
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionDefinition> {
        self.functions.iter()
    }

    /// Is `name` a function that may appear inside the given pipeline stage?
    pub fn is_supported_function(
        &self,
        name: &str,
        parent_command: Option<&str>,
    ) -> SupportCheck {
        let Some(parent) = parent_command else {
            return SupportCheck {
                supported: false,
                reason: Some(UnsupportedReason::MissingCommand),
            };
        };
        match self.resolve_function(name) {
            Some(def) if def.supported_commands.contains(&parent) => SupportCheck {
                supported: true,
                reason: None,
            },
            Some(_) => SupportCheck {
                supported: false,
                reason: Some(UnsupportedReason::UnsupportedFunction),
            },
            None => SupportCheck {
                supported: false,
                reason: Some(UnsupportedReason::UnknownFunction),
            },
        }
    }

    /// Functions of the given categories usable in a command (or option
    /// clause), optionally narrowed by return type.
    pub fn compatible_functions(
        &self,
        command: &str,
        option: Option<&str>,
        categories: &[FunctionCategory],
        return_types: Option<&[&str]>,
        ignored: &[&str],
    ) -> Vec<&FunctionDefinition> {
        self.functions
            .iter()
            .filter(|def| categories.contains(&def.category) && !def.ignore_as_suggestion)
            .filter(|def| match option {
                Some(option) => def.supported_options.contains(&option),
                None => def.supported_commands.contains(&command),
            })
            .filter(|def| !ignored.contains(&def.name))
            .filter(|def| match return_types {
                None => true,
                Some(types) => def.signatures.iter().any(|signature| {
                    types.first() == Some(&"any") || types.contains(&signature.return_type)
                }),
            })
            .collect()
    }

    /// Does `item` satisfy a parameter declared with `expected` type?
    pub fn matches_type(
        &self,
        item: &AstItem,
        expected: &str,
        references: &ReferenceMaps,
        parent_command: Option<&str>,
    ) -> bool {
        if expected == "any" {
            return true;
        }
        match item {
            // grouped sub-expressions are checked transparently; against an
            // array type, each element is held to the element type
            AstItem::Group(items) => {
                let target = expected.strip_suffix("[]").unwrap_or(expected);
                !items.is_empty()
                    && items
                        .iter()
                        .all(|inner| self.matches_type(inner, target, references, parent_command))
            }
            AstItem::Node(node) => match node {
                AstNode::Literal(literal) => {
                    let kind = literal_kind_name(literal.literal_type);
                    if kind == "string" && expected == "chrono_literal" {
                        return is_calendar_unit(&literal.text);
                    }
                    expected == kind
                }
                AstNode::List(list) => {
                    if expected == "list" {
                        return true;
                    }
                    match list.values.first() {
                        Some(first) => {
                            expected == format!("{}[]", literal_kind_name(first.literal_type))
                        }
                        None => false,
                    }
                }
                AstNode::Function(function) => {
                    self.is_supported_function(&function.name, parent_command)
                        .supported
                        && self
                            .resolve_function(&function.name)
                            .is_some_and(|def| {
                                def.signatures
                                    .iter()
                                    .any(|signature| signature.return_type == expected)
                            })
                }
                AstNode::TimeInterval(interval) => {
                    expected == "time_literal" && is_time_unit(&interval.unit)
                }
                AstNode::Column(column) => {
                    if expected == "column" {
                        // anything goes
                        return true;
                    }
                    let hit = references
                        .fields
                        .get(&column.name)
                        .or_else(|| references.variables.get(&column.name));
                    hit.is_some_and(|types| types.iter().any(|t| t == expected))
                }
                AstNode::Source(source) => {
                    let kind = match source.source_type {
                        crate::ast::SourceKind::Index => "index",
                        crate::ast::SourceKind::Policy => "policy",
                    };
                    kind == expected
                }
                AstNode::Command(_) | AstNode::Option(_) => false,
            },
        }
    }
}

fn literal_kind_name(kind: crate::ast::LiteralKind) -> &'static str {
    match kind {
        crate::ast::LiteralKind::Number => "number",
        crate::ast::LiteralKind::String => "string",
        crate::ast::LiteralKind::Boolean => "boolean",
    }
}

// ---- existence checks ----------------------------------------------------

pub fn has_wildcard(name: &str) -> bool {
    name.contains('*')
}

/// Wildcard-aware match of `pattern` against a universe of names.
fn fuzzy_search<'a, I: Iterator<Item = &'a str>>(pattern: &str, mut universe: I) -> bool {
    if !has_wildcard(pattern) {
        return false;
    }
    let matcher: Box<dyn Fn(&str) -> bool> = if let Some(prefix) = pattern.strip_prefix('*') {
        let suffix = prefix.to_string();
        Box::new(move |name: &str| name.ends_with(&suffix))
    } else if let Some(prefix) = pattern.strip_suffix('*') {
        let prefix = prefix.to_string();
        Box::new(move |name: &str| name.starts_with(&prefix))
    } else {
        let (front, back) = pattern.split_once('*').unwrap_or((pattern, ""));
        let (front, back) = (front.to_string(), back.to_string());
        Box::new(move |name: &str| name.starts_with(&front) && name.ends_with(&back))
    };
    universe.any(|name| matcher(name))
}

/// Column existence against the effective reference maps. Returns the name
/// that actually matched (a quoted column may hit its whitespace-trimmed
/// variable form).
pub fn column_exists(column: &Column, references: &ReferenceMaps) -> Option<String> {
    if references.fields.contains_key(&column.name)
        || references.variables.contains_key(&column.name)
    {
        return Some(column.name.clone());
    }
    if column.quoted {
        let trimmed: String = column.name.chars().filter(|c| !c.is_whitespace()).collect();
        if references.variables.contains_key(&trimmed) {
            return Some(trimmed);
        }
    }
    if fuzzy_search(&column.name, references.fields.keys().map(String::as_str))
        || fuzzy_search(&column.name, references.variables.keys().map(String::as_str))
    {
        return Some(column.name.clone());
    }
    None
}

pub fn source_exists(name: &str, sources: &HashSet<String>) -> bool {
    sources.contains(name) || fuzzy_search(name, sources.iter().map(String::as_str))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Literal, LiteralKind, LiteralValue, Span, TimeInterval};

    fn literal(kind: LiteralKind, text: &str) -> AstItem {
        AstItem::Node(AstNode::Literal(Literal {
            literal_type: kind,
            name: text.into(),
            text: text.into(),
            location: Span::default(),
            incomplete: false,
            value: LiteralValue::String(text.into()),
        }))
    }

    #[test]
    fn resolution_is_case_insensitive() {
        let registry = Registry::new();
        assert!(registry.resolve_function("ROUND").is_some());
        assert!(registry.resolve_command("FROM").is_some());
        assert!(registry.resolve_function("no_such_fn").is_none());
    }

    #[test]
    fn any_matches_every_item() {
        let registry = Registry::new();
        let references = ReferenceMaps::default();
        let items = [
            literal(LiteralKind::Number, "1"),
            literal(LiteralKind::String, "\"a\""),
            AstItem::Group(vec![literal(LiteralKind::Boolean, "true")]),
        ];
        for item in &items {
            assert!(registry.matches_type(item, "any", &references, Some("eval")));
        }
    }

    #[test]
    fn chrono_literal_accepts_calendar_unit_strings() {
        let registry = Registry::new();
        let references = ReferenceMaps::default();
        let unit = literal(LiteralKind::String, "\"DAY_OF_WEEK\"");
        assert!(registry.matches_type(&unit, "chrono_literal", &references, Some("eval")));
        let other = literal(LiteralKind::String, "\"tomorrow\"");
        assert!(!registry.matches_type(&other, "chrono_literal", &references, Some("eval")));
    }

    #[test]
    fn time_interval_requires_known_unit() {
        let registry = Registry::new();
        let references = ReferenceMaps::default();
        let make = |unit: &str| {
            AstItem::Node(AstNode::TimeInterval(TimeInterval {
                name: format!("1 {unit}"),
                text: format!("1 {unit}"),
                location: Span::default(),
                incomplete: false,
                quantity: 1.0,
                unit: unit.into(),
            }))
        };
        assert!(registry.matches_type(&make("year"), "time_literal", &references, Some("eval")));
        assert!(!registry.matches_type(&make("lightyear"), "time_literal", &references, Some("eval")));
    }

    #[test]
    fn aggregation_not_supported_outside_stats() {
        let registry = Registry::new();
        let check = registry.is_supported_function("avg", Some("where"));
        assert!(!check.supported);
        assert_eq!(check.reason, Some(UnsupportedReason::UnsupportedFunction));
        assert!(registry.is_supported_function("avg", Some("stats")).supported);
    }

    #[test]
    fn wildcard_column_resolves_fuzzily() {
        let mut references = ReferenceMaps::default();
        references
            .fields
            .insert("kubernetes.pod.name".into(), vec!["string".into()]);
        let column = Column {
            name: "kubernetes.*".into(),
            text: "kubernetes.*".into(),
            location: Span::default(),
            incomplete: false,
            quoted: false,
        };
        assert!(column_exists(&column, &references).is_some());
    }
}
