//! Location utilities: bottom-up span extents and offset conversion.

use super::{AstItem, AstNode, Function, Span};

/// Minimal span that contains every leaf reachable through a function's
/// arguments, including through nested grouped arrays. Walks the left-most
/// chain for `min` and the right-most chain for `max`; must run after the
/// arguments are fully attached.
pub fn compute_location_extends(function: &Function) -> Span {
    let mut location = function.location;
    location.min = walk_edge(&function.args, location.min, Edge::Left);
    location.max = walk_edge(&function.args, location.max, Edge::Right);
    location
}

#[derive(Clone, Copy, PartialEq)]
enum Edge {
    Left,
    Right,
}

fn walk_edge(args: &[AstItem], initial: usize, edge: Edge) -> usize {
    let pick = |items: &[AstItem]| -> usize {
        match edge {
            Edge::Left => 0,
            Edge::Right => items.len().saturating_sub(1),
        }
    };
    let mut value = initial;
    let mut next: Option<&AstItem> = args.get(pick(args));
    while let Some(item) = next {
        match item {
            AstItem::Group(items) => {
                next = items.get(pick(items));
            }
            AstItem::Node(node) => {
                let location = node.location();
                value = match edge {
                    Edge::Left => value.min(location.min),
                    Edge::Right => value.max(location.max),
                };
                next = match node {
                    AstNode::Function(inner) => inner.args.get(pick(&inner.args)),
                    _ => None,
                };
            }
        }
    }
    value
}

/// One-based line/column pair for host display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineColumn {
    pub line: usize,
    pub column: usize,
}

/// Convert a character offset into a 1-based line/column position. Pure
/// function of the original text; offsets past the end clamp to the last
/// position.
pub fn offset_to_line_column(text: &str, offset: usize) -> LineColumn {
    let mut line = 1;
    let mut column = 1;
    for (i, ch) in text.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    LineColumn { line, column }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Column, Literal, LiteralKind, LiteralValue};

    fn column(name: &str, min: usize, max: usize) -> AstItem {
        AstItem::Node(AstNode::Column(Column {
            name: name.into(),
            text: name.into(),
            location: Span::new(min, max),
            incomplete: false,
            quoted: false,
        }))
    }

    fn number(text: &str, min: usize, max: usize) -> AstItem {
        AstItem::Node(AstNode::Literal(Literal {
            literal_type: LiteralKind::Number,
            name: text.into(),
            text: text.into(),
            location: Span::new(min, max),
            incomplete: false,
            value: LiteralValue::Number(text.parse().unwrap()),
        }))
    }

    #[test]
    fn extent_stretches_over_nested_groups() {
        // synthetic `+` whose own span is just the operator token
        let inner = Function {
            name: "round".into(),
            text: "round(b, 2)".into(),
            location: Span::new(8, 19),
            incomplete: false,
            args: vec![column("b", 14, 15), number("2", 17, 18)],
        };
        let function = Function {
            name: "+".into(),
            text: "+".into(),
            location: Span::new(6, 7),
            incomplete: false,
            args: vec![
                column("a", 4, 5),
                AstItem::Group(vec![AstItem::Node(AstNode::Function(inner))]),
            ],
        };
        let extent = compute_location_extends(&function);
        assert_eq!(extent, Span::new(4, 19));
    }

    #[test]
    fn extent_without_args_keeps_own_span() {
        let function = Function {
            name: "now".into(),
            text: "now()".into(),
            location: Span::new(3, 8),
            incomplete: false,
            args: vec![],
        };
        assert_eq!(compute_location_extends(&function), Span::new(3, 8));
    }

    #[test]
    fn offset_conversion_is_one_based() {
        let text = "from a\n| where b\n| limit 1";
        assert_eq!(offset_to_line_column(text, 0), LineColumn { line: 1, column: 1 });
        assert_eq!(offset_to_line_column(text, 7), LineColumn { line: 2, column: 1 });
        assert_eq!(offset_to_line_column(text, 9), LineColumn { line: 2, column: 3 });
    }
}
