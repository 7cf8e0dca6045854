//! The indentation-sensitive YAML scanner (C2).
//!
//! `scan` turns a UTF-8 source string into an ordered [`Tokens`] collection
//! such that concatenating every token's `origin` reproduces the input
//! exactly (§8 origin round-trip invariant), and is recoverable on error:
//! a failure yields every token scanned so far plus the error, rather than
//! discarding partial progress (§4.1.5, §7).

mod anchors;
mod block_scalar;
mod directives;
mod document;
mod indentation;
mod scalars;
mod state;
mod tags;

pub use state::ScannerConfig;
pub(crate) use scalars::{is_integer_literal, parse_float, parse_integer, IntLiteral};

use crate::error::ScanError;
use crate::token::{CharacterType, Indicator, Token, TokenKind, Tokens};

use indentation::consume_line_indentation;
use state::ScannerState;

/// Result of a scan: the tokens produced, plus the first unrecoverable
/// error encountered (if any). Tokens scanned before the error are still
/// returned, matching the recoverable-scanner-error propagation policy
/// (SPEC_FULL §7).
pub struct ScanOutcome {
    pub tokens: Tokens,
    pub error: Option<ScanError>,
}

/// Scan `source` with the default [`ScannerConfig`].
#[must_use]
pub fn scan(source: &str) -> ScanOutcome {
    scan_with_config(source, ScannerConfig::default())
}

/// Scan `source` with an explicit configuration.
#[must_use]
pub fn scan_with_config(source: &str, config: ScannerConfig) -> ScanOutcome {
    let mut state = ScannerState::new(source, config);
    let error = run(&mut state);
    log::debug!(
        "scan finished: {} tokens, error = {:?}",
        state.tokens.len(),
        error.is_some()
    );
    ScanOutcome {
        tokens: state.finish(),
        error,
    }
}

/// Convenience wrapper that turns a scan with an error into `Err`.
pub fn scan_strict(source: &str) -> Result<Tokens, ScanError> {
    let outcome = scan(source);
    match outcome.error {
        Some(e) => Err(e),
        None => Ok(outcome.tokens),
    }
}

fn run(state: &mut ScannerState) -> Option<ScanError> {
    loop {
        if state.is_first_char_at_line {
            if let Err(e) = consume_line_indentation(state) {
                return Some(e);
            }
        }
        match state.peek() {
            None => break,
            Some('\n') => {
                state.bump_pending();
            }
            Some('\r') => {
                state.bump_pending();
            }
            Some('#') => {
                if let Err(e) = scan_comment(state) {
                    return Some(e);
                }
            }
            Some('-') if document::at_document_header(state) => {
                scan_document_marker(state, true);
            }
            Some('.') if document::at_document_end(state) => {
                scan_document_marker(state, false);
            }
            Some('%') if state.pos().column == 1 => match directives::scan_directive(state) {
                Ok(tok) => {
                    log::debug!("directive: {}", tok.value);
                    state.emit(tok);
                }
                Err(e) => return Some(e),
            },
            Some('-') if seq_entry_follows(state) => {
                emit_simple(state, TokenKind::SequenceEntry, Indicator::BlockStructure, "-");
                state.last_delim_column = state.pos().column;
            }
            Some('?') if matches!(state.peek_at(1), None | Some(c) if c.is_whitespace()) => {
                emit_simple(state, TokenKind::MappingKey, Indicator::BlockStructure, "?");
            }
            Some(':') if closes_value(state) => {
                emit_simple(state, TokenKind::MappingValue, Indicator::BlockStructure, ":");
                state.last_delim_column = state.pos().column;
            }
            Some('&') => match anchors::scan_anchor(state) {
                Ok(tok) => {
                    state.emit(tok);
                }
                Err(e) => return Some(e),
            },
            Some('*') => match anchors::scan_alias(state) {
                Ok(tok) => {
                    state.emit(tok);
                }
                Err(e) => return Some(e),
            },
            Some('!') => match tags::scan_tag(state) {
                Ok(tok) => {
                    state.emit(tok);
                }
                Err(e) => return Some(e),
            },
            Some('[') => {
                emit_simple(state, TokenKind::SequenceStart, Indicator::FlowCollection, "[");
                state.flow_seq_depth += 1;
            }
            Some(']') => {
                state.flow_seq_depth = state.flow_seq_depth.saturating_sub(1);
                emit_simple(state, TokenKind::SequenceEnd, Indicator::FlowCollection, "]");
            }
            Some('{') => {
                emit_simple(state, TokenKind::MappingStart, Indicator::FlowCollection, "{");
                state.flow_map_depth += 1;
            }
            Some('}') => {
                state.flow_map_depth = state.flow_map_depth.saturating_sub(1);
                emit_simple(state, TokenKind::MappingEnd, Indicator::FlowCollection, "}");
            }
            Some(',') if state.in_flow() => {
                emit_simple(state, TokenKind::CollectEntry, Indicator::FlowCollection, ",");
            }
            Some('\'') => match scalars::scan_single_quoted(state) {
                Ok(tok) => {
                    state.emit(tok);
                }
                Err(e) => return Some(e),
            },
            Some('"') => match scalars::scan_double_quoted(state) {
                Ok(tok) => {
                    state.emit(tok);
                }
                Err(e) => return Some(e),
            },
            Some('|') => match block_scalar::scan_block_scalar(state, false) {
                Ok(tok) => {
                    state.emit(tok);
                }
                Err(e) => return Some(e),
            },
            Some('>') => match block_scalar::scan_block_scalar(state, true) {
                Ok(tok) => {
                    state.emit(tok);
                }
                Err(e) => return Some(e),
            },
            Some('@') | Some('`') => {
                let pos = state.pos();
                return Some(invalid_reserved_char(state, pos));
            }
            Some(' ') | Some('\t') => {
                state.bump_pending();
            }
            Some(_) => match scalars::scan_plain_scalar(state) {
                Ok(mut tok) => {
                    if tok.value == "<<" {
                        tok.kind = TokenKind::MergeKey;
                    }
                    state.emit(tok);
                }
                Err(e) => return Some(e),
            },
        }
    }
    None
}

fn invalid_reserved_char(state: &mut ScannerState, pos: crate::token::Position) -> ScanError {
    let c = state.bump().unwrap();
    let tok = Token::new(
        TokenKind::Invalid,
        CharacterType::Indicator,
        Indicator::InvalidReserved,
        c.to_string(),
        c.to_string(),
        pos,
    );
    state.emit(tok);
    ScanError::new(format!("reserved character '{c}' at token start"), pos)
}

fn seq_entry_follows(state: &ScannerState) -> bool {
    !state.in_flow()
        && matches!(state.peek_at(1), None | Some(c) if c.is_whitespace())
}

fn closes_value(state: &ScannerState) -> bool {
    match state.peek_at(1) {
        None => true,
        Some(c) => c.is_whitespace() || (state.in_flow() && matches!(c, ',' | ']' | '}')),
    }
}

fn scan_comment(state: &mut ScannerState) -> Result<(), ScanError> {
    let pos = state.pos();
    let mut raw = String::new();
    let mut value = String::new();
    raw.push(state.bump().unwrap()); // '#'
    while let Some(c) = state.peek() {
        if c == '\n' {
            break;
        }
        value.push(c);
        raw.push(state.bump().unwrap());
    }
    let tok = Token::new(
        TokenKind::Comment,
        CharacterType::Miscellaneous,
        Indicator::Comment,
        value,
        raw,
        pos,
    );
    state.emit(tok);
    Ok(())
}

fn scan_document_marker(state: &mut ScannerState, header: bool) {
    let pos = state.pos();
    let raw = document::consume_marker(state);
    let kind = if header {
        TokenKind::DocumentHeader
    } else {
        TokenKind::DocumentEnd
    };
    let tok = Token::new(kind, CharacterType::Indicator, Indicator::BlockStructure, "", raw, pos);
    state.emit(tok);
    state.last_delim_column = 0;
}

fn emit_simple(state: &mut ScannerState, kind: TokenKind, indicator: Indicator, lexeme: &str) {
    let pos = state.pos();
    let mut raw = String::new();
    for _ in 0..lexeme.chars().count() {
        raw.push(state.bump().unwrap());
    }
    let tok = Token::new(kind, CharacterType::Indicator, indicator, "", raw, pos);
    state.emit(tok);
}
