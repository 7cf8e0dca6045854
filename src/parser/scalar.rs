//! Scalar leaves and the anchor/alias/tag wrappers (§4.2.1).

use crate::ast::{
    AliasNode, AnchorNode, BoolNode, DirectiveNode, FloatNode, FoldedNode, InfinityNode,
    IntegerNode, IntegerValue, LiteralNode, MergeKeyNode, NanNode, Node, NullNode, StringNode,
    TagNode,
};
use crate::error::SyntaxError;
use crate::scanner::{parse_float, parse_integer, IntLiteral};
use crate::token::TokenKind;

use super::context::ParserContext;
use super::parse_node;

pub(crate) fn parse_anchor(ctx: &mut ParserContext, min_column: usize) -> Result<Node, SyntaxError> {
    let anchor_tok = ctx.bump().expect("caller verified an Anchor token is current");
    let name = anchor_tok.value.clone();
    let anchor_path = ctx.path_for_current_slot();
    let value = ctx.with_child_index(0, |ctx| parse_node(ctx, min_column))?;
    if ctx.anchor_map.insert(name.clone(), anchor_path).is_some() {
        log::warn!("anchor '{name}' redefined, later definition wins");
    } else {
        log::trace!("anchor '{name}' registered");
    }
    Ok(Node::Anchor(AnchorNode {
        start_token: anchor_tok,
        name,
        value: Box::new(value),
    }))
}

pub(crate) fn parse_alias(ctx: &mut ParserContext) -> Result<Node, SyntaxError> {
    let tok = ctx.bump().expect("caller verified an Alias token is current");
    Ok(Node::Alias(AliasNode {
        name: tok.value.clone(),
        token: tok,
    }))
}

pub(crate) fn parse_tag(ctx: &mut ParserContext, min_column: usize) -> Result<Node, SyntaxError> {
    let tag_tok = ctx.bump().expect("caller verified a Tag token is current");
    let value = ctx.with_child_index(0, |ctx| parse_node(ctx, min_column))?;
    Ok(Node::Tag(TagNode {
        token: tag_tok,
        value: Box::new(value),
    }))
}

/// Build a leaf scalar node directly from the current token (no children),
/// per its already-classified [`TokenKind`] (§6.3, §6.4).
pub(crate) fn parse_scalar_leaf(ctx: &mut ParserContext) -> Result<Node, SyntaxError> {
    let tok = ctx.bump().expect("caller verified a scalar token is current");
    let node = match tok.kind {
        TokenKind::Null => Node::Null(NullNode { token: tok }),
        TokenKind::Bool => {
            let value = matches!(tok.value.to_ascii_lowercase().as_str(), "true");
            Node::Bool(BoolNode { token: tok, value })
        }
        TokenKind::Integer => {
            let Some(parsed) = parse_integer(&tok.value) else {
                return Err(SyntaxError::new(
                    format!("malformed integer literal '{}'", tok.value),
                    tok.position,
                ));
            };
            let value = match parsed {
                IntLiteral::Signed(v) => IntegerValue::Signed(v),
                IntLiteral::Unsigned(v) => IntegerValue::Unsigned(v),
            };
            Node::Integer(IntegerNode { token: tok, value })
        }
        TokenKind::Float => {
            let Some(value) = parse_float(&tok.value) else {
                return Err(SyntaxError::new(
                    format!("malformed float literal '{}'", tok.value),
                    tok.position,
                ));
            };
            let precision = fractional_digit_count(&tok.value);
            Node::Float(FloatNode { token: tok, value, precision })
        }
        TokenKind::Infinity => {
            let negative = tok.value.starts_with('-');
            Node::Infinity(InfinityNode { token: tok, negative })
        }
        TokenKind::Nan => Node::Nan(NanNode { token: tok }),
        TokenKind::String => {
            let value = tok.value.clone();
            Node::String(StringNode { token: tok, value })
        }
        TokenKind::MergeKey => Node::MergeKey(MergeKeyNode { token: tok }),
        TokenKind::Literal => {
            let value = tok.value.clone();
            Node::Literal(LiteralNode { token: tok, value })
        }
        TokenKind::Folded => {
            let value = tok.value.clone();
            Node::Folded(FoldedNode { token: tok, value })
        }
        TokenKind::Directive => {
            let value = tok.value.clone();
            Node::Directive(DirectiveNode { token: tok, value })
        }
        other => {
            return Err(SyntaxError::new(
                format!("token {other:?} cannot start a scalar node"),
                tok.position,
            ))
        }
    };
    Ok(node)
}

fn fractional_digit_count(raw: &str) -> usize {
    let mantissa = raw.split(['e', 'E']).next().unwrap_or(raw);
    match mantissa.split_once('.') {
        Some((_, frac)) => frac.chars().filter(|c| c.is_ascii_digit()).count(),
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::scan_strict;

    fn parse_one(src: &str) -> Node {
        let tokens = scan_strict(src).unwrap();
        let mut ctx = ParserContext::new(&tokens);
        parse_scalar_leaf(&mut ctx).unwrap()
    }

    #[test]
    fn parses_integer_leaf() {
        let node = parse_one("42\n");
        match node {
            Node::Integer(n) => assert_eq!(n.value, IntegerValue::Signed(42)),
            other => panic!("expected Integer, got {other:?}"),
        }
    }

    #[test]
    fn parses_float_leaf_with_precision() {
        let node = parse_one("3.140\n");
        match node {
            Node::Float(n) => {
                assert!((n.value - 3.14).abs() < f64::EPSILON);
                assert_eq!(n.precision, 3);
            }
            other => panic!("expected Float, got {other:?}"),
        }
    }

    #[test]
    fn parses_bool_leaf() {
        let node = parse_one("true\n");
        match node {
            Node::Bool(n) => assert!(n.value),
            other => panic!("expected Bool, got {other:?}"),
        }
    }
}
