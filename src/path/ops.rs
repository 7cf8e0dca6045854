//! Read, replace and merge operations over a parsed [`File`] (§4.4.2).

use crate::ast::{File, Node, NodeVec, SequenceNode};
use crate::error::QueryError;
use crate::token::Position;

use super::{Path, Segment};

fn key_matches(key: &Node, name: &str) -> bool {
    match key.unwrap_meta() {
        Node::String(s) => s.value == name,
        Node::MergeKey(_) => name == "<<",
        _ => false,
    }
}

fn same_key(a: &Node, b: &Node) -> bool {
    match (a.unwrap_meta(), b.unwrap_meta()) {
        (Node::String(x), Node::String(y)) => x.value == y.value,
        (Node::MergeKey(_), Node::MergeKey(_)) => true,
        _ => false,
    }
}

/// Collect every node reachable from `root` along `segments`, in pre-order
/// (§4.4.2, §5 "Path recursive-descent results appear in pre-order"). An
/// index segment that names an in-bounds sequence but an out-of-range slot
/// is a hard `InvalidQuery`-style error (§4.4.3); a segment that simply
/// doesn't apply to `root`'s kind (e.g. a child selector on a scalar) is not
/// an error, it just contributes no matches.
fn collect<'a>(root: &'a Node, segments: &[Segment], out: &mut Vec<&'a Node>) -> Result<(), QueryError> {
    match segments {
        [] => out.push(root),
        [Segment::Child(name), rest @ ..] => {
            if let Node::Mapping(m) = root.unwrap_meta() {
                for entry in &m.values {
                    if key_matches(&entry.key, name) {
                        collect(&entry.value, rest, out)?;
                    }
                }
            }
        }
        [Segment::Index(idx), rest @ ..] => {
            if let Node::Sequence(s) = root.unwrap_meta() {
                match s.entries.get(*idx) {
                    Some(child) => collect(child, rest, out)?,
                    None => {
                        return Err(QueryError::IndexOutOfBounds {
                            index: *idx,
                            len: s.entries.len(),
                        })
                    }
                }
            }
        }
        [Segment::Wildcard, rest @ ..] => match root.unwrap_meta() {
            Node::Sequence(s) => {
                for child in &s.entries {
                    collect(child, rest, out)?;
                }
            }
            Node::Mapping(m) => {
                for entry in &m.values {
                    collect(&entry.value, rest, out)?;
                }
            }
            _ => {}
        },
        [Segment::RecursiveDescent(name), rest @ ..] => collect_recursive(root, name, rest, out)?,
    }
    Ok(())
}

/// At every mapping entry whose key matches `name`, yield its value
/// (applying `rest`); regardless of a match, keep descending so a deeper
/// entry under the same key is also found. A leaf scalar has no children,
/// so it is never itself matched under its own key (§4.4.3).
fn collect_recursive<'a>(
    node: &'a Node,
    name: &str,
    rest: &[Segment],
    out: &mut Vec<&'a Node>,
) -> Result<(), QueryError> {
    match node.unwrap_meta() {
        Node::Mapping(m) => {
            for entry in &m.values {
                if key_matches(&entry.key, name) {
                    collect(&entry.value, rest, out)?;
                }
                collect_recursive(&entry.value, name, rest, out)?;
            }
        }
        Node::Sequence(s) => {
            for child in &s.entries {
                collect_recursive(child, name, rest, out)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// First match of `path` against the first document's body.
pub fn read_node<'a>(file: &'a File, path: &Path) -> Result<&'a Node, QueryError> {
    read_nodes(file, path)?.into_iter().next().ok_or(QueryError::NotFound)
}

/// Every match of `path`, in pre-order.
pub fn read_nodes<'a>(file: &'a File, path: &Path) -> Result<Vec<&'a Node>, QueryError> {
    let Some(body) = file.documents.first().and_then(|d| d.body.as_deref()) else {
        return Ok(Vec::new());
    };
    let mut out = Vec::new();
    collect(body, path.segments(), &mut out)?;
    log::trace!("path read: {} segment(s), {} match(es)", path.segments().len(), out.len());
    Ok(out)
}

/// Decode every match of `path` into `T`. A single match decodes directly;
/// more than one (wildcard/recursive fan-out) is wrapped in a synthetic flow
/// sequence first, then decoded as a whole (§4.4.2, §8 scenario 5).
pub fn read<T: serde::de::DeserializeOwned>(
    file: &File,
    path: &Path,
    options: &crate::decode::DecodeOptions,
) -> Result<T, crate::error::Error> {
    let matches = read_nodes(file, path).map_err(crate::error::Error::from)?;
    let Some(first) = matches.first() else {
        return Err(QueryError::NotFound.into());
    };
    if matches.len() == 1 {
        return crate::decode::from_node(first, options).map_err(Into::into);
    }
    let synthetic = Node::Sequence(SequenceNode {
        start_token: first.get_token().clone(),
        entries: matches.into_iter().cloned().collect::<NodeVec>(),
        is_flow_style: true,
    });
    crate::decode::from_node(&synthetic, options).map_err(Into::into)
}

fn collect_mut<'a>(
    root: &'a mut Node,
    segments: &[Segment],
    out: &mut Vec<&'a mut Node>,
) -> Result<(), QueryError> {
    match segments {
        [] => out.push(root),
        [Segment::Child(name), rest @ ..] => {
            if let Node::Mapping(m) = root.unwrap_meta_mut() {
                for entry in m.values.iter_mut() {
                    if key_matches(&entry.key, name) {
                        collect_mut(&mut entry.value, rest, out)?;
                    }
                }
            }
        }
        [Segment::Index(idx), rest @ ..] => {
            if let Node::Sequence(s) = root.unwrap_meta_mut() {
                let len = s.entries.len();
                match s.entries.get_mut(*idx) {
                    Some(child) => collect_mut(child, rest, out)?,
                    None => return Err(QueryError::IndexOutOfBounds { index: *idx, len }),
                }
            }
        }
        [Segment::Wildcard, rest @ ..] => match root.unwrap_meta_mut() {
            Node::Sequence(s) => {
                for child in s.entries.iter_mut() {
                    collect_mut(child, rest, out)?;
                }
            }
            Node::Mapping(m) => {
                for entry in m.values.iter_mut() {
                    collect_mut(&mut entry.value, rest, out)?;
                }
            }
            _ => {}
        },
        [Segment::RecursiveDescent(name), rest @ ..] => collect_recursive_mut(root, name, rest, out)?,
    }
    Ok(())
}

/// Mutable counterpart of [`collect_recursive`]. `&mut` matches cannot
/// overlap, so once an entry matches `name` its subtree is spliced as a
/// whole and not searched further for nested occurrences of the same key —
/// unlike the read-only traversal, which reports every nested occurrence.
fn collect_recursive_mut<'a>(
    node: &'a mut Node,
    name: &str,
    rest: &[Segment],
    out: &mut Vec<&'a mut Node>,
) -> Result<(), QueryError> {
    match node.unwrap_meta_mut() {
        Node::Mapping(m) => {
            for entry in m.values.iter_mut() {
                if key_matches(&entry.key, name) {
                    collect_mut(&mut entry.value, rest, out)?;
                } else {
                    collect_recursive_mut(&mut entry.value, name, rest, out)?;
                }
            }
        }
        Node::Sequence(s) => {
            for child in s.entries.iter_mut() {
                collect_recursive_mut(child, name, rest, out)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Splice `src` into every non-overlapping match of `path`, shifting its
/// columns to align with each target's column (§4.4.2 `replace_with_node`).
pub fn replace_with_node(file: &mut File, path: &Path, src: &Node) -> Result<(), QueryError> {
    let body = file
        .documents
        .first_mut()
        .and_then(|d| d.body.as_deref_mut())
        .ok_or(QueryError::NotFound)?;
    let mut targets = Vec::new();
    collect_mut(body, path.segments(), &mut targets)?;
    if targets.is_empty() {
        return Err(QueryError::NotFound);
    }
    log::debug!("replacing {} match(es) for path", targets.len());
    for target in targets {
        let delta = target.position().column as isize - src.position().column as isize;
        let mut replacement = src.clone();
        replacement.add_column(delta);
        *target = replacement;
    }
    Ok(())
}

/// Merge `src` into every non-overlapping match of `path`: mapping ⊕
/// mapping appends entries (last write wins on duplicate keys), sequence ⊕
/// sequence concatenates, any other pairing is `InvalidQuery`
/// (§4.4.2 `merge_from_node`).
pub fn merge_from_node(file: &mut File, path: &Path, src: &Node) -> Result<(), QueryError> {
    let body = file
        .documents
        .first_mut()
        .and_then(|d| d.body.as_deref_mut())
        .ok_or(QueryError::NotFound)?;
    let mut targets = Vec::new();
    collect_mut(body, path.segments(), &mut targets)?;
    if targets.is_empty() {
        return Err(QueryError::NotFound);
    }
    for target in targets {
        merge_one(target, src)?;
    }
    Ok(())
}

fn merge_one(target: &mut Node, src: &Node) -> Result<(), QueryError> {
    match (target.unwrap_meta_mut(), src.unwrap_meta()) {
        (Node::Mapping(dst), Node::Mapping(src)) => {
            for entry in &src.values {
                if let Some(existing) = dst.values.iter_mut().find(|e| same_key(&e.key, &entry.key)) {
                    existing.value = entry.value.clone();
                } else {
                    dst.values.push(entry.clone());
                }
            }
            Ok(())
        }
        (Node::Sequence(dst), Node::Sequence(src)) => {
            dst.entries.extend(src.entries.iter().cloned());
            Ok(())
        }
        _ => Err(QueryError::InvalidQuery(
            "merge requires both sides to be the same container kind".into(),
        )),
    }
}

/// Render a plain-text excerpt of `source` around `position`: the line
/// before, the matched line prefixed with `>`, the line after, and a `^`
/// caret under the matched column (§4.4.2). `colored` exists only for
/// interface parity with an external terminal-color formatter (§1
/// Out-of-scope) and has no effect — this core always emits plain text.
#[must_use]
pub fn annotate_source(source: &str, position: Position, colored: bool) -> String {
    let _ = colored;
    let lines: Vec<&str> = source.lines().collect();
    if lines.is_empty() {
        return String::new();
    }
    let target = position.line.saturating_sub(1).min(lines.len() - 1);
    let start = target.saturating_sub(1);
    let end = (target + 1).min(lines.len() - 1);

    let mut out = String::new();
    for (i, line) in lines.iter().enumerate().take(end + 1).skip(start) {
        let marker = if i == target { ">" } else { " " };
        out.push_str(marker);
        out.push(' ');
        out.push_str(line);
        out.push('\n');
        if i == target {
            out.push_str(&" ".repeat(position.column.saturating_sub(1) + 2));
            out.push_str("^\n");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_bytes, ParseMode};

    #[test]
    fn read_node_finds_nested_child() {
        let (file, _) = parse_bytes("store:\n  book:\n    title: dune\n", ParseMode::new()).unwrap();
        let path = Path::parse("$.store.book.title").unwrap();
        let node = read_node(&file, &path).unwrap();
        assert!(matches!(node, Node::String(s) if s.value == "dune"));
    }

    #[test]
    fn read_nodes_wildcard_collects_all_sequence_entries() {
        let (file, _) = parse_bytes("items:\n  - a: 1\n  - a: 2\n", ParseMode::new()).unwrap();
        let path = Path::parse("$.items[*].a").unwrap();
        let nodes = read_nodes(&file, &path).unwrap();
        assert_eq!(nodes.len(), 2);
    }

    #[test]
    fn replace_with_node_splices_match() {
        let (mut file, _) = parse_bytes("a: 1\nb: 2\n", ParseMode::new()).unwrap();
        let path = Path::parse("$.a").unwrap();
        let (replacement_file, _) = parse_bytes("99\n", ParseMode::new()).unwrap();
        let replacement = replacement_file.documents[0].body.clone().unwrap();
        replace_with_node(&mut file, &path, &replacement).unwrap();
        let node = read_node(&file, &path).unwrap();
        assert!(matches!(node, Node::Integer(n) if n.value.as_i64() == Some(99)));
    }

    #[test]
    fn merge_from_node_appends_mapping_entries() {
        let (mut file, _) = parse_bytes("a:\n  x: 1\n", ParseMode::new()).unwrap();
        let path = Path::parse("$.a").unwrap();
        let (src_file, _) = parse_bytes("y: 2\n", ParseMode::new()).unwrap();
        let src = src_file.documents[0].body.clone().unwrap();
        merge_from_node(&mut file, &path, &src).unwrap();
        let Node::Mapping(m) = read_node(&file, &path).unwrap() else {
            panic!("expected mapping")
        };
        assert_eq!(m.values.len(), 2);
    }

    #[test]
    fn index_out_of_bounds_is_invalid_query() {
        let (file, _) = parse_bytes("items:\n  - 1\n  - 2\n", ParseMode::new()).unwrap();
        let path = Path::parse("$.items[5]").unwrap();
        assert_eq!(
            read_node(&file, &path),
            Err(QueryError::IndexOutOfBounds { index: 5, len: 2 })
        );
    }

    #[test]
    fn selector_on_a_scalar_is_not_found() {
        let (file, _) = parse_bytes("a: 1\n", ParseMode::new()).unwrap();
        let path = Path::parse("$.a.b").unwrap();
        assert_eq!(read_node(&file, &path), Err(QueryError::NotFound));
    }

    #[test]
    fn annotate_source_marks_the_matched_line() {
        let text = annotate_source("a: 1\nb: 2\nc: 3\n", Position { line: 2, column: 1, offset: 0, indent_num: 0, indent_level: 0 }, false);
        assert!(text.contains("> b: 2"));
        assert!(text.contains('^'));
    }
}
