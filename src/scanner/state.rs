//! Scanner state: position counters, indentation state, and flow nesting.

use crate::token::{Position, Token, Tokens};

/// Scanner-wide configuration (§10.5).
#[derive(Clone, Copy, Debug)]
pub struct ScannerConfig {
    /// Reject a tab used for leading indentation outside a flow collection
    /// (§4.1.2 step 2). Always `true` in practice; kept as a field so a
    /// caller can relax it for lenient parsing of hand-edited files.
    pub reject_tabs_as_indent: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            reject_tabs_as_indent: true,
        }
    }
}

/// Direction of an indentation change, computed at the first non-whitespace
/// rune of a line (§4.1.2 step 3).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndentState {
    Up,
    Down,
    Equal,
    Keep,
}

pub(crate) struct ScannerState {
    chars: Vec<char>,
    idx: usize,
    line: usize,
    column: usize,
    offset: usize,

    /// Leading-space count accumulated so far on the line being scanned.
    pub(crate) indent_num: usize,
    pub(crate) prev_line_indent_num: usize,
    pub(crate) indent_level: usize,
    /// Column of the most recently opened `:`/`-` delimiter whose
    /// mapping/sequence is still open; 0 means none.
    pub(crate) last_delim_column: usize,
    pub(crate) indent_state: IndentState,

    pub(crate) is_first_char_at_line: bool,
    pub(crate) flow_seq_depth: u32,
    pub(crate) flow_map_depth: u32,

    /// Verbatim text consumed since the last token was emitted; prepended to
    /// the `origin` of the next token so the round-trip invariant holds even
    /// across whitespace/newlines the grammar itself doesn't name a token for.
    pub(crate) pending_origin: String,

    pub(crate) config: ScannerConfig,
    pub(crate) tokens: Tokens,
}

impl ScannerState {
    pub(crate) fn new(source: &str, config: ScannerConfig) -> Self {
        Self {
            chars: source.chars().collect(),
            idx: 0,
            line: 1,
            column: 1,
            offset: 1,
            indent_num: 0,
            prev_line_indent_num: 0,
            indent_level: 0,
            last_delim_column: 0,
            indent_state: IndentState::Equal,
            is_first_char_at_line: true,
            flow_seq_depth: 0,
            flow_map_depth: 0,
            pending_origin: String::new(),
            config,
            tokens: Tokens::new(),
        }
    }

    #[inline]
    pub(crate) fn in_flow(&self) -> bool {
        self.flow_seq_depth > 0 || self.flow_map_depth > 0
    }

    #[inline]
    pub(crate) fn peek(&self) -> Option<char> {
        self.chars.get(self.idx).copied()
    }

    #[inline]
    pub(crate) fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.idx + offset).copied()
    }

    #[inline]
    pub(crate) fn eof(&self) -> bool {
        self.idx >= self.chars.len()
    }

    /// Current logical position (column of the *next* rune to be consumed).
    #[inline]
    pub(crate) fn pos(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
            offset: self.offset,
            indent_num: self.indent_num,
            indent_level: self.indent_level,
        }
    }

    /// Consume one rune and update position counters only. Token-scanning
    /// routines accumulate their own `origin` string from the chars this
    /// returns; `pending_origin` (inter-token whitespace/newlines with no
    /// token of their own) is tracked separately via [`Self::bump_pending`].
    pub(crate) fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.idx += 1;
        self.offset += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
            self.is_first_char_at_line = true;
            // `prev_line_indent_num` is snapshotted by
            // `indentation::resolve_indent_transition` for lines with real
            // content only, so blank lines don't clobber it; reset
            // `indent_num` here unconditionally since it always restarts at 0.
            self.indent_num = 0;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Consume one rune and fold it into `pending_origin`. Used for
    /// whitespace/newlines between tokens that no token kind names (leading
    /// indentation, blank lines).
    pub(crate) fn bump_pending(&mut self) -> Option<char> {
        let c = self.bump()?;
        self.pending_origin.push(c);
        Some(c)
    }

    /// Rewind the cursor by `n` plain-space columns that were consumed
    /// speculatively (used when a block scalar probes its next line and
    /// finds it belongs to an enclosing node instead).
    pub(crate) fn rewind_spaces(&mut self, n: usize) {
        self.idx -= n;
        self.offset -= n;
        self.column -= n;
    }

    /// Take and clear the accumulated pending origin.
    pub(crate) fn take_pending_origin(&mut self) -> String {
        std::mem::take(&mut self.pending_origin)
    }

    /// Emit a token, prefixing its origin with any pending whitespace/newlines.
    pub(crate) fn emit(&mut self, mut token: Token) -> usize {
        let prefix = self.take_pending_origin();
        if !prefix.is_empty() {
            let mut origin = prefix;
            origin.push_str(&token.origin);
            token.origin = origin;
        }
        self.tokens.push(token)
    }

    /// Flush any remaining pending origin at end-of-scan into the last
    /// token (or a standalone `Space` token if nothing was ever emitted),
    /// preserving the origin round-trip invariant (§8).
    pub(crate) fn finish(mut self) -> Tokens {
        use crate::token::{CharacterType, Indicator, Token, TokenKind};
        let trailing = self.take_pending_origin();
        if !trailing.is_empty() {
            if self.tokens.is_empty() {
                let pos = Position::start();
                self.tokens.push(Token::new(
                    TokenKind::Space,
                    CharacterType::WhiteSpace,
                    Indicator::None,
                    "",
                    trailing,
                    pos,
                ));
            } else {
                // Safe: tokens is non-empty, append to the last token's origin.
                let last_idx = self.tokens.len() - 1;
                // Tokens has no mutable indexing API by design (append-only
                // arena); rebuild is unnecessary since we only ever append
                // to the very last origin here at end of scan.
                self.tokens.append_to_last_origin(last_idx, &trailing);
            }
        }
        self.tokens
    }
}
