//! Plain, single-quoted and double-quoted scalar scanning (§4.1.3) and the
//! reserved-keyword / number-literal classification of plain scalars
//! (§6.3, §6.4).

use crate::error::ScanError;
use crate::token::{CharacterType, Indicator, Position, Token, TokenKind};

use super::state::ScannerState;

/// Scan a plain (unquoted) scalar starting at the current position, up to
/// (but not including) the delimiter that closes it: `: ` (colon followed
/// by whitespace/EOF), a flow terminator (`,`/`]`/`}`) when inside a flow
/// collection, a ` #` comment opener, or end of line.
pub(crate) fn scan_plain_scalar(state: &mut ScannerState) -> Result<Token, ScanError> {
    let start_pos = state.pos();
    let mut raw = String::new();
    let mut prev_was_space = true;

    loop {
        let Some(c) = state.peek() else { break };
        match c {
            '\n' => break,
            ':' => {
                let next = state.peek_at(1);
                let closes = match next {
                    None => true,
                    Some(n) => {
                        n.is_whitespace() || (state.in_flow() && matches!(n, ',' | ']' | '}'))
                    }
                };
                if closes {
                    break;
                }
                raw.push(c);
                state.bump();
                prev_was_space = false;
            }
            '#' if prev_was_space => break,
            ',' | ']' | '}' if state.in_flow() => break,
            _ => {
                prev_was_space = c == ' ' || c == '\t';
                raw.push(c);
                state.bump();
            }
        }
    }

    let value = raw.trim_end().to_string();
    let kind = classify_plain_scalar(&value);
    Ok(Token::new(
        kind,
        CharacterType::Miscellaneous,
        Indicator::None,
        value,
        raw,
        start_pos,
    ))
}

/// Classify a plain scalar's textual value into one of the reserved-keyword
/// scalar kinds (§6.3) or a number literal kind (§6.4), falling back to
/// `TokenKind::String`. Quoted scalars never go through this: quoting always
/// forces the string tag regardless of content.
pub(crate) fn classify_plain_scalar(value: &str) -> TokenKind {
    match value {
        "" | "null" | "Null" | "NULL" | "~" => return TokenKind::Null,
        "true" | "True" | "TRUE" | "false" | "False" | "FALSE" => return TokenKind::Bool,
        _ => {}
    }
    if is_infinity_literal(value) {
        return TokenKind::Infinity;
    }
    if matches!(value, ".nan" | ".NaN" | ".NAN") {
        return TokenKind::Nan;
    }
    if is_integer_literal(value) {
        return TokenKind::Integer;
    }
    if is_float_literal(value) {
        return TokenKind::Float;
    }
    TokenKind::String
}

fn is_infinity_literal(value: &str) -> bool {
    matches!(
        value,
        ".inf" | ".Inf" | ".INF" | "+.inf" | "+.Inf" | "+.INF" | "-.inf" | "-.Inf" | "-.INF"
    )
}

fn strip_sign(value: &str) -> (bool, &str) {
    match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value.strip_prefix('+').unwrap_or(value)),
    }
}

/// Decimal (optionally signed), `0b…`, `0o…`/leading `0`, `0x…`, with
/// underscores allowed as visual separators (§6.4).
pub(crate) fn is_integer_literal(value: &str) -> bool {
    let (_, body) = strip_sign(value);
    if body.is_empty() {
        return false;
    }
    if let Some(rest) = body.strip_prefix("0b") {
        return !rest.is_empty() && rest.chars().all(|c| c == '_' || c == '0' || c == '1');
    }
    if let Some(rest) = body.strip_prefix("0o") {
        return !rest.is_empty() && rest.chars().all(|c| c == '_' || ('0'..='7').contains(&c));
    }
    if let Some(rest) = body.strip_prefix("0x") {
        return !rest.is_empty() && rest.chars().all(|c| c == '_' || c.is_ascii_hexdigit());
    }
    body.chars().all(|c| c == '_' || c.is_ascii_digit())
}

/// Parse an integer literal's digits into an `i64`/`u64`, widening to
/// unsigned on signed overflow (§8 boundary behavior).
pub(crate) fn parse_integer(value: &str) -> Option<IntLiteral> {
    let (negative, body) = strip_sign(value);
    let (radix, digits) = if let Some(rest) = body.strip_prefix("0b") {
        (2, rest)
    } else if let Some(rest) = body.strip_prefix("0o") {
        (8, rest)
    } else if let Some(rest) = body.strip_prefix("0x") {
        (16, rest)
    } else {
        (10, body)
    };
    let cleaned: String = digits.chars().filter(|&c| c != '_').collect();
    if cleaned.is_empty() {
        return None;
    }
    if negative {
        let magnitude = i128::from_str_radix(&cleaned, radix).ok()?;
        i64::try_from(-magnitude).ok().map(IntLiteral::Signed)
    } else if let Ok(v) = i64::from_str_radix(&cleaned, radix) {
        Some(IntLiteral::Signed(v))
    } else {
        u64::from_str_radix(&cleaned, radix)
            .ok()
            .map(IntLiteral::Unsigned)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum IntLiteral {
    Signed(i64),
    Unsigned(u64),
}

/// Dot-decimal with an optional signed exponent (§6.4).
pub(crate) fn is_float_literal(value: &str) -> bool {
    let (_, body) = strip_sign(value);
    if !body.contains('.') && !body.to_ascii_lowercase().contains('e') {
        return false;
    }
    body.chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-' | '_'))
        && value.replace('_', "").parse::<f64>().is_ok()
}

pub(crate) fn parse_float(value: &str) -> Option<f64> {
    value.replace('_', "").parse::<f64>().ok()
}

/// Scan a single-quoted scalar. `''` is the escape for a literal `'`; a line
/// break inside folds to a single space, with leading spaces after the
/// break trimmed.
pub(crate) fn scan_single_quoted(state: &mut ScannerState) -> Result<Token, ScanError> {
    let start_pos = state.pos();
    let mut raw = String::new();
    raw.push(state.bump().expect("caller checked opening quote"));
    let mut value = String::new();
    let mut pending_break_lines = 0usize;

    loop {
        match state.peek() {
            None => {
                return Err(ScanError::new(
                    "unterminated single-quoted scalar",
                    start_pos,
                ));
            }
            Some('\'') => {
                raw.push(state.bump().unwrap());
                if state.peek() == Some('\'') {
                    flush_fold(&mut value, &mut pending_break_lines);
                    raw.push(state.bump().unwrap());
                    value.push('\'');
                } else {
                    flush_fold(&mut value, &mut pending_break_lines);
                    break;
                }
            }
            Some('\n') => {
                raw.push(state.bump().unwrap());
                pending_break_lines += 1;
                skip_leading_line_spaces(state, &mut raw);
            }
            Some(c) => {
                flush_fold(&mut value, &mut pending_break_lines);
                raw.push(state.bump().unwrap());
                value.push(c);
            }
        }
    }

    Ok(Token::new(
        TokenKind::String,
        CharacterType::Escaped,
        Indicator::QuotedScalar,
        value,
        raw,
        start_pos,
    ))
}

fn skip_leading_line_spaces(state: &mut ScannerState, raw: &mut String) {
    while matches!(state.peek(), Some(' ') | Some('\t')) {
        raw.push(state.bump().unwrap());
    }
}

fn flush_fold(value: &mut String, pending_break_lines: &mut usize) {
    if *pending_break_lines == 0 {
        return;
    }
    if *pending_break_lines == 1 {
        value.push(' ');
    } else {
        for _ in 0..*pending_break_lines - 1 {
            value.push('\n');
        }
    }
    *pending_break_lines = 0;
}

/// Scan a double-quoted scalar, resolving `\b \e \f \n \r \v \" \\ \xHH
/// \uHHHH \UHHHHHHHH \<newline>` escapes and folding bare line breaks the
/// same way single-quoted scalars do (§4.1.3).
pub(crate) fn scan_double_quoted(state: &mut ScannerState) -> Result<Token, ScanError> {
    let start_pos = state.pos();
    let mut raw = String::new();
    raw.push(state.bump().expect("caller checked opening quote"));
    let mut value = String::new();
    let mut pending_break_lines = 0usize;

    loop {
        match state.peek() {
            None => {
                return Err(ScanError::new(
                    "unterminated double-quoted scalar",
                    start_pos,
                ));
            }
            Some('"') => {
                raw.push(state.bump().unwrap());
                flush_fold(&mut value, &mut pending_break_lines);
                break;
            }
            Some('\n') => {
                raw.push(state.bump().unwrap());
                pending_break_lines += 1;
                skip_leading_line_spaces(state, &mut raw);
            }
            Some('\\') => {
                raw.push(state.bump().unwrap());
                flush_fold(&mut value, &mut pending_break_lines);
                scan_escape(state, &mut raw, &mut value, start_pos)?;
            }
            Some(c) => {
                flush_fold(&mut value, &mut pending_break_lines);
                raw.push(state.bump().unwrap());
                value.push(c);
            }
        }
    }

    Ok(Token::new(
        TokenKind::String,
        CharacterType::Escaped,
        Indicator::QuotedScalar,
        value,
        raw,
        start_pos,
    ))
}

fn scan_escape(
    state: &mut ScannerState,
    raw: &mut String,
    value: &mut String,
    start_pos: Position,
) -> Result<(), ScanError> {
    let Some(c) = state.peek() else {
        return Err(ScanError::new("unterminated escape sequence", start_pos));
    };
    match c {
        '\n' => {
            // `\<newline>` suppresses the fold entirely.
            raw.push(state.bump().unwrap());
        }
        '0' => {
            raw.push(state.bump().unwrap());
            value.push('\0');
        }
        'b' => {
            raw.push(state.bump().unwrap());
            value.push('\u{8}');
        }
        'e' => {
            raw.push(state.bump().unwrap());
            value.push('\u{1B}');
        }
        'f' => {
            raw.push(state.bump().unwrap());
            value.push('\u{C}');
        }
        'n' => {
            raw.push(state.bump().unwrap());
            value.push('\n');
        }
        'r' => {
            raw.push(state.bump().unwrap());
            value.push('\r');
        }
        't' => {
            raw.push(state.bump().unwrap());
            value.push('\t');
        }
        'v' => {
            raw.push(state.bump().unwrap());
            value.push('\u{B}');
        }
        'L' => {
            raw.push(state.bump().unwrap());
            value.push('\u{2028}');
        }
        'N' => {
            raw.push(state.bump().unwrap());
            value.push('\u{85}');
        }
        'P' => {
            raw.push(state.bump().unwrap());
            value.push('\u{2029}');
        }
        '_' => {
            raw.push(state.bump().unwrap());
            value.push('\u{A0}');
        }
        '"' => {
            raw.push(state.bump().unwrap());
            value.push('"');
        }
        '\\' => {
            raw.push(state.bump().unwrap());
            value.push('\\');
        }
        'x' => {
            raw.push(state.bump().unwrap());
            let code = read_hex_digits(state, raw, 2, start_pos)?;
            value.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
        }
        'u' => {
            raw.push(state.bump().unwrap());
            let code = read_hex_digits(state, raw, 4, start_pos)?;
            push_utf16_unit(state, raw, value, code, start_pos)?;
        }
        'U' => {
            raw.push(state.bump().unwrap());
            let code = read_hex_digits(state, raw, 8, start_pos)?;
            value.push(
                char::from_u32(code)
                    .ok_or_else(|| ScanError::new("invalid \\U escape", start_pos))?,
            );
        }
        other => {
            return Err(ScanError::new(
                format!("invalid escape character '\\{other}'"),
                start_pos,
            ));
        }
    }
    Ok(())
}

fn read_hex_digits(
    state: &mut ScannerState,
    raw: &mut String,
    count: usize,
    start_pos: Position,
) -> Result<u32, ScanError> {
    let mut code = 0u32;
    for _ in 0..count {
        let c = state
            .peek()
            .ok_or_else(|| ScanError::new("truncated hex escape", start_pos))?;
        let digit = c
            .to_digit(16)
            .ok_or_else(|| ScanError::new("invalid hex digit in escape", start_pos))?;
        code = code * 16 + digit;
        raw.push(state.bump().unwrap());
    }
    Ok(code)
}

/// Handle a `\uHHHH` escape, including UTF-16 surrogate pairs (a high
/// surrogate must be followed by a `\u` low surrogate).
fn push_utf16_unit(
    state: &mut ScannerState,
    raw: &mut String,
    value: &mut String,
    code: u32,
    start_pos: Position,
) -> Result<(), ScanError> {
    if (0xD800..=0xDBFF).contains(&code) {
        if state.peek() == Some('\\') && state.peek_at(1) == Some('u') {
            raw.push(state.bump().unwrap());
            raw.push(state.bump().unwrap());
            let low = read_hex_digits(state, raw, 4, start_pos)?;
            if !(0xDC00..=0xDFFF).contains(&low) {
                return Err(ScanError::new("invalid UTF-16 surrogate pair", start_pos));
            }
            let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
            value.push(
                char::from_u32(combined)
                    .ok_or_else(|| ScanError::new("invalid surrogate pair", start_pos))?,
            );
        } else {
            return Err(ScanError::new(
                "lone UTF-16 high surrogate in \\u escape",
                start_pos,
            ));
        }
    } else if (0xDC00..=0xDFFF).contains(&code) {
        return Err(ScanError::new(
            "lone UTF-16 low surrogate in \\u escape",
            start_pos,
        ));
    } else {
        value.push(
            char::from_u32(code).ok_or_else(|| ScanError::new("invalid \\u escape", start_pos))?,
        );
    }
    Ok(())
}
