//! Block mapping and block sequence parsing (§4.2.1, §4.2.2 column discipline).

use crate::ast::{AnchorNode, MappingEntryVec, MappingNode, MappingValueNode, Node, NodeVec, SequenceNode, TagNode};
use crate::error::SyntaxError;
use crate::token::TokenKind;

use super::context::ParserContext;
use super::{parse_node, scalar};

/// True when the tokens starting at the cursor form a mapping key: an
/// optional run of `Anchor`/`Tag` wrappers, then a scalar or alias token,
/// then `MappingValue` (`:`).
fn mapping_key_follows(ctx: &ParserContext) -> bool {
    let mut idx = 0;
    while matches!(
        ctx.peek_at(idx).map(|t| &t.kind),
        Some(TokenKind::Anchor) | Some(TokenKind::Tag)
    ) {
        idx += 1;
    }
    let Some(key_tok) = ctx.peek_at(idx) else { return false };
    if !is_key_capable(&key_tok.kind) {
        return false;
    }
    matches!(
        ctx.peek_at(idx + 1).map(|t| &t.kind),
        Some(TokenKind::MappingValue)
    )
}

fn is_key_capable(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Null
            | TokenKind::Bool
            | TokenKind::Integer
            | TokenKind::Float
            | TokenKind::Infinity
            | TokenKind::Nan
            | TokenKind::String
            | TokenKind::MergeKey
            | TokenKind::Alias
    )
}

/// Parse a key node: like [`parse_node`] but never re-enters mapping
/// detection, since the key itself is always followed by `MappingValue`.
///
/// A `Node::child` coordinate only ever addresses a mapping entry's *value*
/// (§4.2.3's `NodePath` model has no key-side index), so an anchor found on
/// a key is still built as a structurally correct `Node::Anchor`, but is
/// not registered in the anchor map — it cannot be the target of a later
/// `*alias` lookup in this implementation.
pub(super) fn parse_key_node(ctx: &mut ParserContext, min_column: usize) -> Result<Node, SyntaxError> {
    match ctx.peek().map(|t| &t.kind) {
        Some(TokenKind::Anchor) => {
            let anchor_tok = ctx.bump().expect("checked present");
            let name = anchor_tok.value.clone();
            let value = parse_key_node(ctx, min_column)?;
            Ok(Node::Anchor(AnchorNode {
                start_token: anchor_tok,
                name,
                value: Box::new(value),
            }))
        }
        Some(TokenKind::Tag) => {
            let tag_tok = ctx.bump().expect("checked present");
            let value = parse_key_node(ctx, min_column)?;
            Ok(Node::Tag(TagNode {
                token: tag_tok,
                value: Box::new(value),
            }))
        }
        Some(TokenKind::Alias) => scalar::parse_alias(ctx),
        _ => scalar::parse_scalar_leaf(ctx),
    }
}

/// Parse a mapping entry's value, honoring §4.2.2: the value's column must
/// strictly exceed `key_column`, unless it is inline (same source line as
/// the `:`) or it is a block sequence at exactly `key_column` (the
/// documented exception).
fn parse_mapping_value(ctx: &mut ParserContext, colon: &crate::token::Token, key_column: usize) -> Result<Node, SyntaxError> {
    let Some(next) = ctx.peek() else {
        return Ok(Node::Null(crate::ast::NullNode { token: colon.clone() }));
    };
    if next.position.line == colon.position.line {
        return parse_node(ctx, 0);
    }
    if matches!(next.kind, TokenKind::SequenceEntry) && next.position.column == key_column {
        return parse_block_sequence(ctx, key_column.saturating_sub(1));
    }
    if next.position.column <= key_column {
        // No token on a following line is indented past this key: the value
        // is implicit `null` and `next` belongs to an enclosing mapping/the
        // next sibling entry (left for the caller's loop to pick up).
        return Ok(Node::Null(crate::ast::NullNode { token: colon.clone() }));
    }
    parse_node(ctx, key_column)
}

pub(crate) fn parse_block_mapping(ctx: &mut ParserContext, min_column: usize) -> Result<Node, SyntaxError> {
    let first = ctx.peek().cloned().expect("caller verified a key token is current");
    let key_column = first.position.column;
    if key_column <= min_column {
        return Err(SyntaxError::new(
            "mapping key must be indented past its parent",
            first.position,
        ));
    }
    let start_token = first;
    let mut values = MappingEntryVec::new();
    let mut index = 0usize;

    loop {
        let Some(candidate) = ctx.peek() else { break };
        if candidate.position.column != key_column || !mapping_key_follows(ctx) {
            break;
        }
        let entry_start = candidate.clone();
        let key = parse_key_node(ctx, min_column)?;
        let colon = ctx.bump().filter(|t| matches!(t.kind, TokenKind::MappingValue)).ok_or_else(|| {
            SyntaxError::new("expected ':' after mapping key", entry_start.position)
        })?;
        let value = ctx.with_child_index(index, |ctx| {
            parse_mapping_value(ctx, &colon, key_column)
        })?;
        values.push(MappingValueNode {
            start_token: entry_start,
            key: Box::new(key),
            value: Box::new(value),
        });
        index += 1;
    }

    Ok(Node::Mapping(MappingNode {
        start_token,
        values,
        is_flow_style: false,
    }))
}

pub(crate) fn parse_block_sequence(ctx: &mut ParserContext, min_column: usize) -> Result<Node, SyntaxError> {
    let first = ctx.peek().cloned().expect("caller verified a SequenceEntry token is current");
    let entry_column = first.position.column;
    if entry_column <= min_column {
        return Err(SyntaxError::new(
            "sequence entry must be indented past its parent",
            first.position,
        ));
    }
    let start_token = first;
    let mut entries = NodeVec::new();
    let mut index = 0usize;

    loop {
        let Some(dash) = ctx.peek() else { break };
        if dash.position.column != entry_column || !matches!(dash.kind, TokenKind::SequenceEntry) {
            break;
        }
        let dash = dash.clone();
        ctx.bump();
        let value = match ctx.peek() {
            None => crate::ast::Node::Null(crate::ast::NullNode { token: dash.clone() }),
            Some(next) if next.position.line != dash.position.line && next.position.column <= entry_column => {
                crate::ast::Node::Null(crate::ast::NullNode { token: dash.clone() })
            }
            Some(_) => ctx.with_child_index(index, |ctx| parse_node(ctx, entry_column.saturating_sub(1)))?,
        };
        entries.push(value);
        index += 1;
    }

    Ok(Node::Sequence(SequenceNode {
        start_token,
        entries,
        is_flow_style: false,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Node;
    use crate::scanner::scan_strict;

    fn parse(src: &str) -> Node {
        let tokens = scan_strict(src).unwrap();
        let mut ctx = ParserContext::new(&tokens);
        parse_node(&mut ctx, 0).unwrap()
    }

    #[test]
    fn parses_flat_block_mapping() {
        let node = parse("a: 1\nb: 2\n");
        let Node::Mapping(m) = node else { panic!("expected mapping") };
        assert_eq!(m.values.len(), 2);
    }

    #[test]
    fn parses_nested_block_mapping() {
        let node = parse("a:\n  b: 1\n  c: 2\n");
        let Node::Mapping(m) = node else { panic!("expected mapping") };
        assert_eq!(m.values.len(), 1);
        let Node::Mapping(inner) = m.values[0].value.as_ref() else { panic!("expected nested mapping") };
        assert_eq!(inner.values.len(), 2);
    }

    #[test]
    fn parses_block_sequence_of_scalars() {
        let node = parse("- 1\n- 2\n- 3\n");
        let Node::Sequence(s) = node else { panic!("expected sequence") };
        assert_eq!(s.entries.len(), 3);
    }

    #[test]
    fn parses_sequence_under_mapping_at_same_column() {
        let node = parse("items:\n- a\n- b\n");
        let Node::Mapping(m) = node else { panic!("expected mapping") };
        let Node::Sequence(s) = m.values[0].value.as_ref() else { panic!("expected sequence value") };
        assert_eq!(s.entries.len(), 2);
    }

    #[test]
    fn absent_value_before_a_sibling_key_is_null() {
        let node = parse("a:\nb: 1\n");
        let Node::Mapping(m) = node else { panic!("expected mapping") };
        assert_eq!(m.values.len(), 2);
        assert!(matches!(m.values[0].value.as_ref(), Node::Null(_)));
        assert!(matches!(m.values[1].value.as_ref(), Node::Integer(_)));
    }

    #[test]
    fn bare_scalar_at_or_under_key_column_is_not_consumed_as_value() {
        // "b" has no trailing `:`, so it isn't a sibling key either; it's
        // simply left unconsumed for the caller (document-level parsing) to
        // reject as a leftover token, while `a`'s own value is implicit null.
        let node = parse("a:\nb\n");
        let Node::Mapping(m) = node else { panic!("expected mapping") };
        assert_eq!(m.values.len(), 1);
        assert!(matches!(m.values[0].value.as_ref(), Node::Null(_)));
    }
}
