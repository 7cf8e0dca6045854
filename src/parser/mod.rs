//! The recursive-descent parser (C4): turns a scanned [`Tokens`] stream into
//! a [`File`] of [`Node`] trees plus the [`AnchorMap`] discovered along the
//! way (§4.2).

mod block;
mod context;
mod flow;
mod scalar;

use crate::ast::{AnchorMap, DocumentNode, File, Node};
use crate::error::{Error, SyntaxError};
use crate::scanner::scan_strict;
use crate::token::TokenKind;

use context::ParserContext;

/// Parsing knobs (§4.2's `parse_bytes(source, mode)` contract).
///
/// `parse_comments` is accepted for interface parity with the distilled
/// `PARSE_COMMENTS` contract, but comment attachment as AST sibling nodes is
/// an explicit Non-goal of this core (see SPEC_FULL.md §1): `Comment` tokens
/// are always discarded after scanning (see [`ParserContext::peek`]), in
/// both mode settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParseMode {
    pub parse_comments: bool,
}

impl ParseMode {
    #[must_use]
    pub const fn new() -> Self {
        Self { parse_comments: false }
    }
}

/// Scan and parse `source` into a [`File`], returning the anchor map
/// accumulated while walking the stream (§4.2.3).
pub fn parse_bytes(source: &str, mode: ParseMode) -> Result<(File, AnchorMap), Error> {
    let _ = mode;
    let tokens = scan_strict(source)?;
    let mut ctx = ParserContext::new(&tokens);
    let mut documents = Vec::new();

    loop {
        if ctx.at_end() {
            break;
        }
        let doc = parse_document(&mut ctx)?;
        documents.push(doc);
        ctx.document_index += 1;

        // A document only ever ends at `DocumentHeader` (the next document's
        // `---`) or end of input; anything else left over is a malformed
        // continuation of the document just parsed (e.g. a bare scalar that
        // a block construct legitimately declined to consume), not the
        // start of an implicit second document.
        if let Some(tok) = ctx.peek() {
            if !matches!(tok.kind, TokenKind::DocumentHeader) {
                return Err(Error::Syntax(SyntaxError::new(
                    "unexpected token after document body",
                    tok.position,
                )));
            }
        }
    }

    if documents.is_empty() {
        documents.push(DocumentNode {
            token: crate::token::Token::new(
                TokenKind::DocumentEnd,
                crate::token::CharacterType::Miscellaneous,
                crate::token::Indicator::None,
                "",
                "",
                crate::token::Position::start(),
            ),
            start_token: None,
            end_token: None,
            body: None,
        });
    }

    log::debug!(
        "parse finished: {} document(s), {} anchor(s)",
        documents.len(),
        ctx.anchor_map.len()
    );
    Ok((File::new(documents), ctx.anchor_map))
}

fn parse_document(ctx: &mut ParserContext) -> Result<DocumentNode, SyntaxError> {
    let start_token = ctx
        .peek()
        .filter(|t| matches!(t.kind, TokenKind::DocumentHeader))
        .cloned()
        .map(|t| {
            ctx.bump();
            t
        });

    let body = if matches!(
        ctx.peek().map(|t| &t.kind),
        None | Some(TokenKind::DocumentHeader) | Some(TokenKind::DocumentEnd)
    ) {
        None
    } else {
        Some(Box::new(parse_node(ctx, 0)?))
    };

    let end_token = ctx
        .peek()
        .filter(|t| matches!(t.kind, TokenKind::DocumentEnd))
        .cloned()
        .map(|t| {
            ctx.bump();
            t
        });

    let token = start_token
        .clone()
        .or_else(|| body.as_deref().map(Node::get_token).cloned())
        .or_else(|| end_token.clone())
        .unwrap_or_else(|| {
            crate::token::Token::new(
                TokenKind::DocumentEnd,
                crate::token::CharacterType::Miscellaneous,
                crate::token::Indicator::None,
                "",
                "",
                crate::token::Position::start(),
            )
        });

    Ok(DocumentNode {
        token,
        start_token,
        end_token,
        body,
    })
}

/// Dispatch on the current token to parse one complete node, enforcing that
/// block constructs are indented past `min_column` (§4.2.2).
pub(crate) fn parse_node(ctx: &mut ParserContext, min_column: usize) -> Result<Node, SyntaxError> {
    let Some(tok) = ctx.peek() else {
        return Err(SyntaxError::new("unexpected end of input", crate::token::Position::start()));
    };
    match tok.kind {
        TokenKind::Anchor => scalar::parse_anchor(ctx, min_column),
        TokenKind::Alias => scalar::parse_alias(ctx),
        TokenKind::Tag => scalar::parse_tag(ctx, min_column),
        TokenKind::SequenceStart => flow::parse_flow_sequence(ctx),
        TokenKind::MappingStart => flow::parse_flow_mapping(ctx),
        TokenKind::SequenceEntry => block::parse_block_sequence(ctx, min_column),
        TokenKind::Null
        | TokenKind::Bool
        | TokenKind::Integer
        | TokenKind::Float
        | TokenKind::Infinity
        | TokenKind::Nan
        | TokenKind::String
        | TokenKind::MergeKey
        | TokenKind::Literal
        | TokenKind::Folded
        | TokenKind::Directive => {
            if mapping_follows(ctx) {
                block::parse_block_mapping(ctx, min_column)
            } else {
                scalar::parse_scalar_leaf(ctx)
            }
        }
        other => Err(SyntaxError::new(
            format!("unexpected token {other:?}"),
            tok.position,
        )),
    }
}

/// True when the current token begins a block mapping key (possibly behind
/// `Anchor`/`Tag` wrappers) rather than a bare scalar.
fn mapping_follows(ctx: &ParserContext) -> bool {
    let mut idx = 0;
    while matches!(
        ctx.peek_at(idx).map(|t| &t.kind),
        Some(TokenKind::Anchor) | Some(TokenKind::Tag)
    ) {
        idx += 1;
    }
    matches!(
        ctx.peek_at(idx + 1).map(|t| &t.kind),
        Some(TokenKind::MappingValue)
    )
}
