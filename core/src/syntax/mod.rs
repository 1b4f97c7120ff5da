//! StreamQL concrete parsing.
//!
//! This module is the input boundary of the analysis core: it turns query
//! text into a [`SyntaxNode`] tree with spans and recovered-error flags.
//! Everything downstream (AST builder, validation, autocomplete) consumes
//! only the tree interface, never the grammar internals.

mod grammar;
mod tree;

pub use tree::{Span, SyntaxKind, SyntaxNode};

/// Parse a single statement. Never fails: malformed stretches are consumed
/// and flagged on the enclosing nodes instead.
pub fn parse(src: &str) -> SyntaxNode {
    grammar::parse_statement(src)
}
