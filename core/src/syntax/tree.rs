//! Concrete parse tree for StreamQL statements.
//!
//! The tree is deliberately uniform: every production is a [`SyntaxNode`]
//! carrying a closed [`SyntaxKind`] tag, a source span, a verbatim text
//! slice, an error flag, and child nodes. Downstream code dispatches on the
//! kind tag with a single `match` and probes children by kind, never by
//! position alone.

use serde::{Deserialize, Serialize};

/// Character-offset range into the source text. `min` is inclusive, `max`
/// is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    pub min: usize,
    pub max: usize,
}

impl Span {
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    /// Empty span anchored at a single offset.
    pub fn at(offset: usize) -> Self {
        Self {
            min: offset,
            max: offset,
        }
    }

    /// Smallest span covering both inputs.
    pub fn cover(self, other: Span) -> Span {
        Span {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.min <= offset && offset < self.max
    }
}

/// Closed tag over every parse-tree production and terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyntaxKind {
    Statement,
    // Pipeline commands
    FromCommand,
    RowCommand,
    ShowCommand,
    WhereCommand,
    EvalCommand,
    StatsCommand,
    LimitCommand,
    SortCommand,
    KeepCommand,
    DropCommand,
    RenameCommand,
    MvExpandCommand,
    DissectCommand,
    GrokCommand,
    EnrichCommand,
    /// Unrecognized or half-typed command word; kept so autocomplete can
    /// still reason about the statement tail.
    UnknownCommand,
    // Clauses
    Metadata,
    Fields,
    Field,
    Grouping,
    RenameClause,
    CommandOption,
    OrderExpression,
    EnrichOn,
    EnrichWith,
    EnrichWithClause,
    // Boolean expression alternatives
    LogicalNot,
    LogicalBinary,
    LogicalIn,
    RegexExpression,
    IsNull,
    // Value/operator expression alternatives
    Comparison,
    ArithmeticUnary,
    ArithmeticBinary,
    FunctionExpression,
    Parenthesized,
    // Names
    QualifiedName,
    SourceIdentifier,
    Identifier,
    QuotedIdentifier,
    // Constants
    NullLiteral,
    IntegerLiteral,
    DecimalLiteral,
    BooleanLiteral,
    StringLiteral,
    TimeIntervalLiteral,
    NumericArrayLiteral,
    BooleanArrayLiteral,
    StringArrayLiteral,
    // Terminal markers
    Operator,
    Keyword,
}

/// One node of the concrete parse tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntaxNode {
    pub kind: SyntaxKind,
    pub span: Span,
    /// Verbatim source slice for the node.
    pub text: String,
    /// True when a syntax error was recovered inside this subtree.
    pub error: bool,
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    pub fn new(kind: SyntaxKind, span: Span, text: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            text: text.into(),
            error: false,
            children: Vec::new(),
        }
    }

    pub fn leaf(kind: SyntaxKind, span: Span, text: impl Into<String>) -> Self {
        Self::new(kind, span, text)
    }

    /// First child with the given kind.
    pub fn child(&self, kind: SyntaxKind) -> Option<&SyntaxNode> {
        self.children.iter().find(|c| c.kind == kind)
    }

    /// All children with the given kind, in source order.
    pub fn children_of(&self, kind: SyntaxKind) -> impl Iterator<Item = &SyntaxNode> {
        self.children.iter().filter(move |c| c.kind == kind)
    }

    pub fn has(&self, kind: SyntaxKind) -> bool {
        self.child(kind).is_some()
    }

    /// Probe for an optional keyword terminal, case-insensitively.
    pub fn keyword(&self, word: &str) -> Option<&SyntaxNode> {
        self.children
            .iter()
            .find(|c| c.kind == SyntaxKind::Keyword && c.text.eq_ignore_ascii_case(word))
    }

    /// Text of the first `Operator` terminal child, if any.
    pub fn operator_text(&self) -> Option<&str> {
        self.child(SyntaxKind::Operator).map(|op| op.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_cover_takes_extremes() {
        let a = Span::new(4, 9);
        let b = Span::new(2, 7);
        assert_eq!(a.cover(b), Span::new(2, 9));
    }

    #[test]
    fn keyword_probe_is_case_insensitive() {
        let mut node = SyntaxNode::new(SyntaxKind::OrderExpression, Span::new(0, 4), "DESC");
        node.children
            .push(SyntaxNode::leaf(SyntaxKind::Keyword, Span::new(0, 4), "DESC"));
        assert!(node.keyword("desc").is_some());
        assert!(node.keyword("asc").is_none());
    }
}
