//! `%YAML`/`%TAG`/reserved directive scanning. Directives are only valid at
//! the start of a line, outside any node.

use crate::error::ScanError;
use crate::token::{CharacterType, Indicator, Token, TokenKind};

use super::state::ScannerState;

pub(crate) fn scan_directive(state: &mut ScannerState) -> Result<Token, ScanError> {
    let start_pos = state.pos();
    let mut raw = String::new();
    raw.push(state.bump().unwrap()); // '%'
    let mut value = String::new();
    while let Some(c) = state.peek() {
        if c == '\n' {
            break;
        }
        value.push(c);
        raw.push(state.bump().unwrap());
    }
    let trimmed = value.trim_end();
    if let Some(rest) = trimmed.strip_prefix("YAML ") {
        if !rest.split('.').all(|p| p.chars().all(|c| c.is_ascii_digit())) {
            return Err(ScanError::new(
                "invalid document-header option digit in %YAML directive",
                start_pos,
            ));
        }
    }
    Ok(Token::new(
        TokenKind::Directive,
        CharacterType::Indicator,
        Indicator::Directive,
        trimmed.to_string(),
        raw,
        start_pos,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::state::ScannerConfig;

    #[test]
    fn scans_yaml_directive() {
        let mut state = ScannerState::new("%YAML 1.2\n", ScannerConfig::default());
        let tok = scan_directive(&mut state).unwrap();
        assert_eq!(tok.value, "YAML 1.2");
    }

    #[test]
    fn rejects_malformed_version() {
        let mut state = ScannerState::new("%YAML x.y\n", ScannerConfig::default());
        assert!(scan_directive(&mut state).is_err());
    }
}
