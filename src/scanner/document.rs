//! `---` document header and `...` document end detection (§4.2.1).

use super::state::ScannerState;

fn followed_by_delimiter(state: &ScannerState, after: usize) -> bool {
    match state.peek_at(after) {
        None => true,
        Some(c) => c.is_whitespace(),
    }
}

/// True when the cursor is at the start of a line and looking at `---`
/// followed by whitespace or EOF.
pub(crate) fn at_document_header(state: &ScannerState) -> bool {
    state.pos().column == 1
        && state.peek() == Some('-')
        && state.peek_at(1) == Some('-')
        && state.peek_at(2) == Some('-')
        && followed_by_delimiter(state, 3)
}

/// True when the cursor is at the start of a line and looking at `...`
/// followed by whitespace or EOF.
pub(crate) fn at_document_end(state: &ScannerState) -> bool {
    state.pos().column == 1
        && state.peek() == Some('.')
        && state.peek_at(1) == Some('.')
        && state.peek_at(2) == Some('.')
        && followed_by_delimiter(state, 3)
}

pub(crate) fn consume_marker(state: &mut ScannerState) -> String {
    let mut raw = String::new();
    for _ in 0..3 {
        raw.push(state.bump().unwrap());
    }
    raw
}
