//! Depth-first AST traversal (§3.3 "Walk").

use super::node::Node;

/// A depth-first visitor over a [`Node`] tree. Default method bodies visit
/// every child and return `Ok(())`; override `visit` to intercept specific
/// nodes, or the per-kind hooks below to act on a subtree after its children
/// have already been walked.
pub trait Visitor {
    type Error;

    fn visit(&mut self, node: &Node) -> Result<(), Self::Error> {
        walk_children(self, node)
    }
}

/// Visit every direct child of `node` with `visitor`, in source order.
pub fn walk_children<V: Visitor + ?Sized>(
    visitor: &mut V,
    node: &Node,
) -> Result<(), V::Error> {
    match node {
        Node::Mapping(m) => {
            for entry in &m.values {
                visitor.visit(&entry.key)?;
                visitor.visit(&entry.value)?;
            }
        }
        Node::MappingValue(entry) => {
            visitor.visit(&entry.key)?;
            visitor.visit(&entry.value)?;
        }
        Node::Sequence(s) => {
            for entry in &s.entries {
                visitor.visit(entry)?;
            }
        }
        Node::Anchor(a) => visitor.visit(&a.value)?,
        Node::Tag(t) => visitor.visit(&t.value)?,
        Node::Document(d) => {
            if let Some(body) = &d.body {
                visitor.visit(body)?;
            }
        }
        Node::Null(_)
        | Node::Bool(_)
        | Node::Integer(_)
        | Node::Float(_)
        | Node::Infinity(_)
        | Node::Nan(_)
        | Node::String(_)
        | Node::MergeKey(_)
        | Node::Literal(_)
        | Node::Folded(_)
        | Node::Alias(_)
        | Node::Directive(_) => {}
    }
    Ok(())
}

/// Walk `node` and every descendant, calling `f` on each (node itself first,
/// then children — pre-order).
pub fn for_each<F>(node: &Node, mut f: F)
where
    F: FnMut(&Node),
{
    struct Collector<F>(F);
    impl<F: FnMut(&Node)> Visitor for Collector<F> {
        type Error = std::convert::Infallible;
        fn visit(&mut self, node: &Node) -> Result<(), Self::Error> {
            (self.0)(node);
            walk_children(self, node)
        }
    }
    let mut collector = Collector(&mut f);
    let _ = collector.visit(node);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::node::{IntegerValue, IntegerNode, MappingNode, MappingValueNode, StringNode};
    use crate::token::{CharacterType, Indicator, Position, Token, TokenKind};

    fn tok(kind: TokenKind) -> Token {
        Token::new(kind, CharacterType::Miscellaneous, Indicator::None, "", "", Position::start())
    }

    #[test]
    fn for_each_visits_mapping_entries_depth_first() {
        let mapping = Node::Mapping(MappingNode {
            start_token: tok(TokenKind::MappingStart),
            is_flow_style: false,
            values: smallvec::smallvec![MappingValueNode {
                start_token: tok(TokenKind::MappingValue),
                key: Box::new(Node::String(StringNode {
                    token: tok(TokenKind::String),
                    value: "k".into(),
                })),
                value: Box::new(Node::Integer(IntegerNode {
                    token: tok(TokenKind::Integer),
                    value: IntegerValue::Signed(1),
                })),
            }],
        });
        let mut seen = Vec::new();
        for_each(&mapping, |n| seen.push(n.type_name()));
        assert_eq!(seen, vec!["Mapping", "String", "Integer"]);
    }
}
