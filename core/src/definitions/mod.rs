//! Static catalog of commands, functions, and literal tables.
//!
//! The catalog is read-only data: builders below return plain vectors that
//! the [`Registry`](crate::registry::Registry) indexes once at construction.
//! Descriptions are short host-facing strings; localization lives outside
//! the core.

mod aggs;
mod builtin;
mod commands;
mod functions;
mod literals;

pub use aggs::aggregation_functions;
pub use builtin::builtin_functions;
pub use commands::command_definitions;
pub use functions::scalar_functions;
pub use literals::{CALENDAR_UNITS, TIME_UNITS, is_calendar_unit, is_time_unit};

use serde::Serialize;

/// Which family a function belongs to. Operators render infix and rank
/// differently in suggestions; aggregations are only legal in grouping
/// stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionCategory {
    Operator,
    Scalar,
    Aggregation,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParamDef {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub param_type: &'static str,
    pub optional: bool,
}

impl ParamDef {
    pub const fn new(name: &'static str, param_type: &'static str) -> Self {
        Self {
            name,
            param_type,
            optional: false,
        }
    }

    pub const fn optional(name: &'static str, param_type: &'static str) -> Self {
        Self {
            name,
            param_type,
            optional: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Signature {
    pub params: Vec<ParamDef>,
    #[serde(rename = "returnType")]
    pub return_type: &'static str,
    /// Variadic tail: the last parameter may repeat.
    pub infinite_params: bool,
    pub min_params: Option<usize>,
}

impl Signature {
    pub fn new(params: Vec<ParamDef>, return_type: &'static str) -> Self {
        Self {
            params,
            return_type,
            infinite_params: false,
            min_params: None,
        }
    }

    pub fn variadic(params: Vec<ParamDef>, return_type: &'static str, min: usize) -> Self {
        Self {
            params,
            return_type,
            infinite_params: true,
            min_params: Some(min),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionDefinition {
    pub name: &'static str,
    pub category: FunctionCategory,
    pub description: &'static str,
    pub aliases: &'static [&'static str],
    pub signatures: Vec<Signature>,
    /// Pipeline stages where the function is legal.
    pub supported_commands: &'static [&'static str],
    /// Option clauses (e.g. `by`) where the function is also legal.
    pub supported_options: &'static [&'static str],
    /// Resolvable but never proposed (internal operators like assign).
    pub ignore_as_suggestion: bool,
}

impl FunctionDefinition {
    /// `name(arg, ...)` rendering used for labels and hover details.
    pub fn signature_string(&self) -> String {
        let Some(signature) = self.signatures.first() else {
            return format!("{}()", self.name);
        };
        let params: Vec<&str> = signature.params.iter().map(|p| p.name).collect();
        let tail = if signature.infinite_params { ", ..." } else { "" };
        format!("{}({}{tail})", self.name, params.join(", "))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub alias: Option<&'static str>,
    /// Source-introducing stages may only open a pipeline.
    pub source_command: bool,
    /// Option clause names the command accepts.
    pub options: &'static [&'static str],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_functions_are_sorted_by_name() {
        let defs = scalar_functions();
        let mut names: Vec<_> = defs.iter().map(|d| d.name).collect();
        let original = names.clone();
        names.sort_unstable();
        assert_eq!(names, original);
    }

    #[test]
    fn aggregations_are_stats_only() {
        for def in aggregation_functions() {
            assert_eq!(def.supported_commands, ["stats"]);
            assert_eq!(def.category, FunctionCategory::Aggregation);
        }
    }

    #[test]
    fn signature_string_lists_params() {
        let def = &scalar_functions()
            .into_iter()
            .find(|d| d.name == "pow")
            .unwrap();
        assert_eq!(def.signature_string(), "pow(field, exponent)");
    }
}
