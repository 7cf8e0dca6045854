//! Parser state: a one-token-lookahead cursor over a scanned [`Tokens`]
//! stream, plus the anchor map being built as the stream is consumed.

use crate::ast::{AnchorMap, NodePath};
use crate::token::{Token, TokenKind, Tokens};

pub(crate) struct ParserContext<'t> {
    tokens: &'t Tokens,
    pos: usize,
    pub(crate) document_index: usize,
    pub(crate) anchor_map: AnchorMap,
    /// Child-index chain from the current document's body to whatever node
    /// is about to be parsed; mirrors [`crate::ast::Node::child`]'s indexing
    /// so an anchor registered mid-parse can be looked up later without
    /// copying the subtree it names (§4.2.3).
    current_path: Vec<usize>,
}

impl<'t> ParserContext<'t> {
    pub(crate) fn new(tokens: &'t Tokens) -> Self {
        Self {
            tokens,
            pos: 0,
            document_index: 0,
            anchor_map: AnchorMap::new(),
            current_path: Vec::new(),
        }
    }

    /// The current token without consuming it, skipping over `Comment`
    /// tokens. Comment attachment is an explicit Non-goal of this core (see
    /// `parser::mod`'s `ParseMode` doc comment), so comments are dropped
    /// here regardless of `ParseMode::parse_comments`.
    pub(crate) fn peek(&self) -> Option<&Token> {
        let mut idx = self.pos;
        loop {
            let tok = self.tokens.get(idx)?;
            if matches!(tok.kind, TokenKind::Comment) {
                idx += 1;
                continue;
            }
            return Some(tok);
        }
    }

    /// Lookahead `n` tokens past the current one, also skipping comments.
    pub(crate) fn peek_at(&self, n: usize) -> Option<&Token> {
        let mut idx = self.pos;
        let mut remaining = n;
        loop {
            let tok = self.tokens.get(idx)?;
            if matches!(tok.kind, TokenKind::Comment) {
                idx += 1;
                continue;
            }
            if remaining == 0 {
                return Some(tok);
            }
            remaining -= 1;
            idx += 1;
        }
    }

    /// Consume and return the current (non-comment) token.
    pub(crate) fn bump(&mut self) -> Option<Token> {
        loop {
            let tok = self.tokens.get(self.pos)?.clone();
            self.pos += 1;
            if !matches!(tok.kind, TokenKind::Comment) {
                return Some(tok);
            }
        }
    }

    pub(crate) fn at_end(&self) -> bool {
        self.peek().is_none()
    }

    pub(crate) fn path_for_current_slot(&self) -> NodePath {
        NodePath::new(self.document_index, self.current_path.clone())
    }

    pub(crate) fn with_child_index<T>(&mut self, idx: usize, f: impl FnOnce(&mut Self) -> T) -> T {
        self.current_path.push(idx);
        let result = f(self);
        self.current_path.pop();
        result
    }
}
