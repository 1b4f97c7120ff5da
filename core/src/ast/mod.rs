//! Abstract syntax tree for StreamQL pipelines.
//!
//! The AST is a flat, source-ordered list of pipeline commands, each holding
//! a nested tree of arguments. Every node records the verbatim source text,
//! a character span, and an `incomplete` flag for fragments recovered from
//! malformed input. The whole structure serializes to host-consumable JSON.

mod builder;
mod position;

pub use builder::build_ast;
pub use position::{LineColumn, compute_location_extends, offset_to_line_column};

use serde::{Deserialize, Serialize};

pub use crate::syntax::Span;

/// One argument slot: either a single node or a grouped sub-expression that
/// has not been reduced to a node (parenthesized booleans, `in` lists,
/// assignment right-hand sides). Consumers must handle both arms explicitly;
/// nothing flattens groups implicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AstItem {
    Group(Vec<AstItem>),
    Node(AstNode),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AstNode {
    Command(Command),
    Option(CommandOption),
    Function(Function),
    Literal(Literal),
    Column(Column),
    Source(Source),
    List(List),
    TimeInterval(TimeInterval),
}

/// One pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub name: String,
    pub text: String,
    pub location: Span,
    pub incomplete: bool,
    pub args: Vec<AstItem>,
}

/// Named sub-clause of a command (`by`, `metadata`, `as`, `on`, `with`, …).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandOption {
    pub name: String,
    pub text: String,
    pub location: Span,
    pub incomplete: bool,
    pub args: Vec<AstItem>,
}

/// Function call, operator, or synthetic node (a unary sign is materialized
/// as a multiply against a fabricated ±1 literal).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub text: String,
    pub location: Span,
    pub incomplete: bool,
    pub args: Vec<AstItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiteralKind {
    Number,
    String,
    Boolean,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LiteralValue {
    Number(f64),
    Boolean(bool),
    String(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Literal {
    #[serde(rename = "literalType")]
    pub literal_type: LiteralKind,
    pub name: String,
    pub text: String,
    pub location: Span,
    pub incomplete: bool,
    pub value: LiteralValue,
}

/// Field reference. `name` is the sanitized (unquoted) identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub text: String,
    pub location: Span,
    pub incomplete: bool,
    pub quoted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Index,
    Policy,
}

/// Data-source or enrichment-policy reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub text: String,
    pub location: Span,
    pub incomplete: bool,
    #[serde(rename = "sourceType")]
    pub source_type: SourceKind,
}

/// Homogeneous literal array (`[1, 2, 3]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List {
    pub name: String,
    pub text: String,
    pub location: Span,
    pub incomplete: bool,
    pub values: Vec<Literal>,
}

/// Duration constant (`1 year`, `15 minutes`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeInterval {
    pub name: String,
    pub text: String,
    pub location: Span,
    pub incomplete: bool,
    pub quantity: f64,
    pub unit: String,
}

impl AstNode {
    pub fn name(&self) -> &str {
        match self {
            AstNode::Command(n) => &n.name,
            AstNode::Option(n) => &n.name,
            AstNode::Function(n) => &n.name,
            AstNode::Literal(n) => &n.name,
            AstNode::Column(n) => &n.name,
            AstNode::Source(n) => &n.name,
            AstNode::List(n) => &n.name,
            AstNode::TimeInterval(n) => &n.name,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            AstNode::Command(n) => &n.text,
            AstNode::Option(n) => &n.text,
            AstNode::Function(n) => &n.text,
            AstNode::Literal(n) => &n.text,
            AstNode::Column(n) => &n.text,
            AstNode::Source(n) => &n.text,
            AstNode::List(n) => &n.text,
            AstNode::TimeInterval(n) => &n.text,
        }
    }

    pub fn location(&self) -> Span {
        match self {
            AstNode::Command(n) => n.location,
            AstNode::Option(n) => n.location,
            AstNode::Function(n) => n.location,
            AstNode::Literal(n) => n.location,
            AstNode::Column(n) => n.location,
            AstNode::Source(n) => n.location,
            AstNode::List(n) => n.location,
            AstNode::TimeInterval(n) => n.location,
        }
    }

    pub fn incomplete(&self) -> bool {
        match self {
            AstNode::Command(n) => n.incomplete,
            AstNode::Option(n) => n.incomplete,
            AstNode::Function(n) => n.incomplete,
            AstNode::Literal(n) => n.incomplete,
            AstNode::Column(n) => n.incomplete,
            AstNode::Source(n) => n.incomplete,
            AstNode::List(n) => n.incomplete,
            AstNode::TimeInterval(n) => n.incomplete,
        }
    }
}

impl AstItem {
    pub fn as_node(&self) -> Option<&AstNode> {
        match self {
            AstItem::Node(node) => Some(node),
            AstItem::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&[AstItem]> {
        match self {
            AstItem::Group(items) => Some(items),
            AstItem::Node(_) => None,
        }
    }

    pub fn as_command(&self) -> Option<&Command> {
        match self.as_node() {
            Some(AstNode::Command(n)) => Some(n),
            _ => None,
        }
    }

    pub fn as_option(&self) -> Option<&CommandOption> {
        match self.as_node() {
            Some(AstNode::Option(n)) => Some(n),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self.as_node() {
            Some(AstNode::Function(n)) => Some(n),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self.as_node() {
            Some(AstNode::Literal(n)) => Some(n),
            _ => None,
        }
    }

    pub fn as_column(&self) -> Option<&Column> {
        match self.as_node() {
            Some(AstNode::Column(n)) => Some(n),
            _ => None,
        }
    }

    pub fn as_source(&self) -> Option<&Source> {
        match self.as_node() {
            Some(AstNode::Source(n)) => Some(n),
            _ => None,
        }
    }

    pub fn as_time_interval(&self) -> Option<&TimeInterval> {
        match self.as_node() {
            Some(AstNode::TimeInterval(n)) => Some(n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match self.as_node() {
            Some(AstNode::List(n)) => Some(n),
            _ => None,
        }
    }

    /// Assignment functions (`=`) introduce user variables.
    pub fn as_assignment(&self) -> Option<&Function> {
        self.as_function().filter(|f| f.name == "=")
    }

    pub fn is_incomplete(&self) -> bool {
        match self {
            AstItem::Group(items) => items.iter().any(AstItem::is_incomplete),
            AstItem::Node(node) => node.incomplete(),
        }
    }

    pub fn location(&self) -> Option<Span> {
        self.as_node().map(AstNode::location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ast_serializes_with_type_tags() {
        let column = AstItem::Node(AstNode::Column(Column {
            name: "bytes".into(),
            text: "bytes".into(),
            location: Span::new(10, 15),
            incomplete: false,
            quoted: false,
        }));
        let json = serde_json::to_value(&column).unwrap();
        assert_eq!(json["type"], "column");
        assert_eq!(json["location"]["min"], 10);
        assert_eq!(json["quoted"], false);
    }

    #[test]
    fn groups_serialize_as_arrays() {
        let group = AstItem::Group(vec![]);
        assert_eq!(serde_json::to_string(&group).unwrap(), "[]");
    }
}
