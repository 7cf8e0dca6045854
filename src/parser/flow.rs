//! Flow collection parsing: `[a, b, c]` and `{a: 1, b: 2}` (§4.2.1).

use crate::ast::{MappingEntryVec, MappingNode, MappingValueNode, Node, NodeVec, SequenceNode};
use crate::error::SyntaxError;
use crate::token::TokenKind;

use super::context::ParserContext;
use super::parse_node;

/// Parse `[ ... ]`, splitting entries on `,` (§4.2.1 flow sequence).
pub(crate) fn parse_flow_sequence(ctx: &mut ParserContext) -> Result<Node, SyntaxError> {
    let start_token = ctx
        .bump()
        .filter(|t| matches!(t.kind, TokenKind::SequenceStart))
        .expect("caller verified a SequenceStart token is current");
    let mut entries = NodeVec::new();
    let mut index = 0usize;

    loop {
        let Some(next) = ctx.peek() else {
            return Err(SyntaxError::new("unterminated flow sequence", start_token.position));
        };
        if matches!(next.kind, TokenKind::SequenceEnd) {
            ctx.bump();
            break;
        }
        let entry = ctx.with_child_index(index, |ctx| parse_node(ctx, 0))?;
        entries.push(entry);
        index += 1;
        match ctx.peek() {
            Some(t) if matches!(t.kind, TokenKind::CollectEntry) => {
                ctx.bump();
            }
            Some(t) if matches!(t.kind, TokenKind::SequenceEnd) => {
                ctx.bump();
                break;
            }
            Some(t) => {
                return Err(SyntaxError::new(
                    format!("expected ',' or ']' in flow sequence, found {:?}", t.kind),
                    t.position,
                ))
            }
            None => return Err(SyntaxError::new("unterminated flow sequence", start_token.position)),
        }
    }

    Ok(Node::Sequence(SequenceNode {
        start_token,
        entries,
        is_flow_style: true,
    }))
}

/// Parse `{ ... }`, where each entry may be `key: value` or a bare scalar
/// key whose value is implicit `null` (§4.2.1 flow mapping).
pub(crate) fn parse_flow_mapping(ctx: &mut ParserContext) -> Result<Node, SyntaxError> {
    let start_token = ctx
        .bump()
        .filter(|t| matches!(t.kind, TokenKind::MappingStart))
        .expect("caller verified a MappingStart token is current");
    let mut values = MappingEntryVec::new();
    let mut index = 0usize;

    loop {
        let Some(next) = ctx.peek() else {
            return Err(SyntaxError::new("unterminated flow mapping", start_token.position));
        };
        if matches!(next.kind, TokenKind::MappingEnd) {
            ctx.bump();
            break;
        }
        let entry_start = next.clone();
        let key = super::block::parse_key_node(ctx, 0)?;
        let value = if matches!(ctx.peek().map(|t| &t.kind), Some(TokenKind::MappingValue)) {
            ctx.bump();
            match ctx.peek() {
                Some(t) if matches!(t.kind, TokenKind::CollectEntry | TokenKind::MappingEnd) => {
                    Node::Null(crate::ast::NullNode { token: t.clone() })
                }
                Some(_) => ctx.with_child_index(index, |ctx| parse_node(ctx, 0))?,
                None => {
                    return Err(SyntaxError::new("unterminated flow mapping", start_token.position))
                }
            }
        } else {
            // Implicit-value entry: a bare key with no `:` (rare, but
            // symmetric with the explicit-key grammar at §4.2.1).
            Node::Null(crate::ast::NullNode { token: entry_start.clone() })
        };
        values.push(MappingValueNode {
            start_token: entry_start,
            key: Box::new(key),
            value: Box::new(value),
        });
        index += 1;
        match ctx.peek() {
            Some(t) if matches!(t.kind, TokenKind::CollectEntry) => {
                ctx.bump();
            }
            Some(t) if matches!(t.kind, TokenKind::MappingEnd) => {
                ctx.bump();
                break;
            }
            Some(t) => {
                return Err(SyntaxError::new(
                    format!("expected ',' or '}}' in flow mapping, found {:?}", t.kind),
                    t.position,
                ))
            }
            None => return Err(SyntaxError::new("unterminated flow mapping", start_token.position)),
        }
    }

    Ok(Node::Mapping(MappingNode {
        start_token,
        values,
        is_flow_style: true,
    }))
}
