//! `!tag`, `!!shorthand`, and `!<verbatim>` tag scanning.

use crate::error::ScanError;
use crate::token::{CharacterType, Indicator, Token, TokenKind};

use super::state::ScannerState;

fn is_tag_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, ',' | '[' | ']' | '{' | '}')
}

pub(crate) fn scan_tag(state: &mut ScannerState) -> Result<Token, ScanError> {
    let start_pos = state.pos();
    let mut raw = String::new();
    raw.push(state.bump().unwrap()); // '!'

    if state.peek() == Some('<') {
        raw.push(state.bump().unwrap());
        let mut uri = String::new();
        loop {
            match state.peek() {
                Some('>') => {
                    raw.push(state.bump().unwrap());
                    break;
                }
                Some(c) => {
                    uri.push(c);
                    raw.push(state.bump().unwrap());
                }
                None => return Err(ScanError::new("unterminated verbatim tag", start_pos)),
            }
        }
        return Ok(Token::new(
            TokenKind::Tag,
            CharacterType::Indicator,
            Indicator::NodeProperty,
            format!("!<{uri}>"),
            raw,
            start_pos,
        ));
    }

    let mut value = String::from("!");
    if state.peek() == Some('!') {
        value.push('!');
        raw.push(state.bump().unwrap());
    }
    while let Some(c) = state.peek() {
        if !is_tag_char(c) {
            break;
        }
        value.push(c);
        raw.push(state.bump().unwrap());
    }
    Ok(Token::new(
        TokenKind::Tag,
        CharacterType::Indicator,
        Indicator::NodeProperty,
        value,
        raw,
        start_pos,
    ))
}
