//! Literal (`|`) and folded (`>`) block scalar scanning (§4.1.3).
//!
//! Open Question decision (SPEC_FULL §9/DESIGN.md): when no explicit
//! indentation-indicator digit is given, the block's indentation baseline is
//! fixed by the first non-empty content line, per the YAML 1.2 spec text.

use crate::error::ScanError;
use crate::token::{CharacterType, Indicator, Position, Token, TokenKind};

use super::state::ScannerState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Chomping {
    Strip,
    Clip,
    Keep,
}

/// Scan a block scalar header (`|`/`>` plus optional indentation digit and
/// chomping indicator) and its indented content lines.
pub(crate) fn scan_block_scalar(
    state: &mut ScannerState,
    folded: bool,
) -> Result<Token, ScanError> {
    let start_pos = state.pos();
    let mut raw = String::new();
    raw.push(state.bump().unwrap()); // consume '|' or '>'

    let header_column = start_pos.column;
    let mut explicit_indent: Option<usize> = None;
    let mut chomping = Chomping::Clip;

    loop {
        match state.peek() {
            Some(c) if c.is_ascii_digit() && explicit_indent.is_none() => {
                explicit_indent = Some(c.to_digit(10).unwrap() as usize);
                raw.push(state.bump().unwrap());
            }
            Some('-') => {
                chomping = Chomping::Strip;
                raw.push(state.bump().unwrap());
            }
            Some('+') => {
                chomping = Chomping::Keep;
                raw.push(state.bump().unwrap());
            }
            Some(' ') | Some('\t') => {
                raw.push(state.bump().unwrap());
            }
            Some('#') => {
                while let Some(c) = state.peek() {
                    if c == '\n' {
                        break;
                    }
                    raw.push(state.bump().unwrap());
                }
            }
            Some('\n') | None => break,
            Some(other) => {
                return Err(ScanError::new(
                    format!("invalid block scalar header option '{other}'"),
                    start_pos,
                ));
            }
        }
    }
    if let Some(c) = state.peek() {
        if c == '\n' {
            raw.push(state.bump().unwrap());
        }
    }

    let mut content_lines: Vec<(usize, String)> = Vec::new();
    let mut baseline: Option<usize> = explicit_indent.map(|d| header_column + d - 1);

    loop {
        if state.eof() {
            break;
        }
        let line_start_idx = raw.len();
        let mut indent = 0usize;
        while matches!(state.peek(), Some(' ')) {
            raw.push(state.bump().unwrap());
            indent += 1;
        }
        let blank = matches!(state.peek(), Some('\n') | None);
        if blank {
            content_lines.push((indent, String::new()));
            if let Some(c) = state.peek() {
                if c == '\n' {
                    raw.push(state.bump().unwrap());
                }
            }
            continue;
        }

        let line_indent_ok = match baseline {
            Some(b) => indent >= b,
            None => indent > header_column.saturating_sub(1),
        };
        if !line_indent_ok {
            // Rewind: this line belongs to the next sibling, not this block.
            raw.truncate(line_start_idx);
            state.rewind_spaces(indent);
            break;
        }
        if baseline.is_none() {
            baseline = Some(indent);
        }
        let content_indent = baseline.unwrap();
        let mut line = String::new();
        while let Some(c) = state.peek() {
            if c == '\n' {
                break;
            }
            line.push(c);
            raw.push(state.bump().unwrap());
        }
        if let Some(c) = state.peek() {
            if c == '\n' {
                raw.push(state.bump().unwrap());
            }
        }
        let stripped = if indent > content_indent {
            " ".repeat(indent - content_indent) + &line
        } else {
            line
        };
        content_lines.push((indent, stripped));
    }

    let value = render_block_value(&content_lines, folded, chomping);

    Ok(Token::new(
        if folded {
            TokenKind::Folded
        } else {
            TokenKind::Literal
        },
        CharacterType::Indicator,
        Indicator::BlockScalar,
        value,
        raw,
        start_pos,
    ))
}

fn render_block_value(lines: &[(usize, String)], folded: bool, chomping: Chomping) -> String {
    let mut body_lines: Vec<&str> = Vec::with_capacity(lines.len());
    for (_, l) in lines {
        body_lines.push(l.as_str());
    }
    while matches!(body_lines.last(), Some(l) if l.is_empty()) {
        body_lines.pop();
    }

    let mut out = String::new();
    if folded {
        let mut prev_blank = true;
        for (idx, line) in body_lines.iter().enumerate() {
            if line.is_empty() {
                out.push('\n');
                prev_blank = true;
            } else {
                if idx > 0 && !prev_blank {
                    out.push(' ');
                }
                out.push_str(line);
                prev_blank = false;
            }
        }
    } else {
        for (idx, line) in body_lines.iter().enumerate() {
            if idx > 0 {
                out.push('\n');
            }
            out.push_str(line);
        }
    }

    match chomping {
        Chomping::Strip => {}
        Chomping::Clip => {
            if !body_lines.is_empty() {
                out.push('\n');
            }
        }
        Chomping::Keep => {
            if !body_lines.is_empty() {
                out.push('\n');
            }
            let trailing_blanks = lines
                .iter()
                .rev()
                .take_while(|(_, l)| l.is_empty())
                .count();
            for _ in 0..trailing_blanks {
                out.push('\n');
            }
        }
    }
    out
}
