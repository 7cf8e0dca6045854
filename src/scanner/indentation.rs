//! The indentation algorithm (§4.1.2).

use crate::error::ScanError;

use super::state::{IndentState, ScannerState};

/// Consume the leading whitespace of a line (only valid when
/// `state.is_first_char_at_line`), updating `indent_num`, and on the first
/// non-whitespace rune (or blank line / EOF) derive the `IndentState`
/// transition and update `indent_level`.
pub(crate) fn consume_line_indentation(state: &mut ScannerState) -> Result<(), ScanError> {
    loop {
        match state.peek() {
            Some(' ') => {
                state.bump_pending();
                state.indent_num += 1;
            }
            Some('\t') => {
                if state.in_flow() {
                    state.bump_pending();
                    state.indent_num += 1;
                } else {
                    return Err(ScanError::new(
                        "tab where indentation expected",
                        state.pos(),
                    ));
                }
            }
            _ => break,
        }
    }
    // Blank lines (and EOF) carry no structural content, so they must not
    // perturb `indent_level`/`last_delim_column` bookkeeping.
    if !matches!(state.peek(), Some('\n') | None) {
        resolve_indent_transition(state);
    }
    state.is_first_char_at_line = false;
    Ok(())
}

fn resolve_indent_transition(state: &mut ScannerState) {
    let by_column = if state.last_delim_column > 0 {
        let column = state.pos().column;
        Some(if column > state.last_delim_column {
            IndentState::Up
        } else {
            IndentState::Down
        })
    } else {
        None
    };

    let transition = by_column.unwrap_or_else(|| {
        use std::cmp::Ordering;
        match state.indent_num.cmp(&state.prev_line_indent_num) {
            Ordering::Greater => IndentState::Up,
            Ordering::Less => IndentState::Down,
            Ordering::Equal => IndentState::Equal,
        }
    });

    match transition {
        IndentState::Up => state.indent_level += 1,
        IndentState::Down => state.indent_level = state.indent_level.saturating_sub(1),
        IndentState::Equal | IndentState::Keep => {}
    }
    state.prev_line_indent_num = state.indent_num;
    state.indent_state = transition;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::state::ScannerConfig;

    #[test]
    fn increasing_indent_raises_level() {
        let mut state = ScannerState::new("  x", ScannerConfig::default());
        consume_line_indentation(&mut state).unwrap();
        assert_eq!(state.indent_num, 2);
        assert_eq!(state.indent_level, 1);
    }

    #[test]
    fn tab_outside_flow_is_an_error() {
        let mut state = ScannerState::new("\tx", ScannerConfig::default());
        assert!(consume_line_indentation(&mut state).is_err());
    }

    #[test]
    fn tab_inside_flow_is_allowed() {
        let mut state = ScannerState::new("\tx", ScannerConfig::default());
        state.flow_seq_depth = 1;
        assert!(consume_line_indentation(&mut state).is_ok());
    }
}
