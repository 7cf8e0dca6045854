//! `&name` anchor and `*name` alias scanning.

use crate::error::ScanError;
use crate::token::{CharacterType, Indicator, Token, TokenKind};

use super::state::ScannerState;

fn is_anchor_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, ',' | '[' | ']' | '{' | '}')
}

pub(crate) fn scan_anchor(state: &mut ScannerState) -> Result<Token, ScanError> {
    let start_pos = state.pos();
    let mut raw = String::new();
    raw.push(state.bump().unwrap()); // '&'
    let mut name = String::new();
    while let Some(c) = state.peek() {
        if !is_anchor_char(c) {
            break;
        }
        name.push(c);
        raw.push(state.bump().unwrap());
    }
    if name.is_empty() {
        return Err(ScanError::new("anchor name cannot be empty", start_pos));
    }
    Ok(Token::new(
        TokenKind::Anchor,
        CharacterType::Indicator,
        Indicator::NodeProperty,
        name,
        raw,
        start_pos,
    ))
}

pub(crate) fn scan_alias(state: &mut ScannerState) -> Result<Token, ScanError> {
    let start_pos = state.pos();
    let mut raw = String::new();
    raw.push(state.bump().unwrap()); // '*'
    let mut name = String::new();
    while let Some(c) = state.peek() {
        if !is_anchor_char(c) {
            break;
        }
        name.push(c);
        raw.push(state.bump().unwrap());
    }
    if name.is_empty() {
        return Err(ScanError::new("alias name cannot be empty", start_pos));
    }
    Ok(Token::new(
        TokenKind::Alias,
        CharacterType::Indicator,
        Indicator::NodeProperty,
        name,
        raw,
        start_pos,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::state::ScannerConfig;

    #[test]
    fn scans_anchor_name() {
        let mut state = ScannerState::new("&x rest", ScannerConfig::default());
        let tok = scan_anchor(&mut state).unwrap();
        assert_eq!(tok.value, "x");
        assert_eq!(tok.origin, "&x");
    }

    #[test]
    fn scans_alias_name() {
        let mut state = ScannerState::new("*x\n", ScannerConfig::default());
        let tok = scan_alias(&mut state).unwrap();
        assert_eq!(tok.value, "x");
    }
}
