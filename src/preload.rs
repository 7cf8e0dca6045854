//! Reference-source anchor preloading (§10.3): extra YAML sources scanned
//! and parsed ahead of a main document so aliases in the main document can
//! resolve against anchors defined elsewhere, the way a multi-file codec
//! loads shared fragments before the document that uses them.

use std::io::Read;
use std::path::PathBuf;

use crate::ast::{AnchorMap, File, NodePath};
use crate::error::{DecodeError, Error};
use crate::parser::{parse_bytes, ParseMode};

/// Where an extra reference document's anchors come from.
///
/// `Path` and `Dir` are declared for interface parity with an external
/// file-discovery layer — this core does no filesystem walking (§1) — so
/// only `Reader` is ever scanned and parsed here.
pub enum ReferenceSource<R> {
    Reader(R),
    Path(PathBuf),
    Dir { path: PathBuf, recursive: bool },
}

/// Scan and parse `main_source` together with every `Reader` source in
/// `references`, in order. Reference documents are prepended to the
/// returned [`File`] so their subtrees stay resolvable through the combined
/// [`AnchorMap`]; anchor names collide last-source-wins, matching §4.2.3's
/// "later definition overwrites earlier" policy — `main_source` is scanned
/// last, so it always wins over every preloaded reference.
pub fn preload_and_parse<R: Read>(
    references: Vec<ReferenceSource<R>>,
    main_source: &str,
    mode: ParseMode,
) -> Result<(File, AnchorMap), Error> {
    let mut documents = Vec::new();
    let mut anchors = AnchorMap::new();

    for source in references {
        let ReferenceSource::Reader(mut reader) = source else {
            log::debug!("reference source skipped: file discovery is out of scope for this core");
            continue;
        };
        let mut buf = String::new();
        reader
            .read_to_string(&mut buf)
            .map_err(|e| Error::Decode(DecodeError::Custom(e.to_string())))?;
        let (ref_file, ref_anchors) = parse_bytes(&buf, mode)?;
        let offset = documents.len();
        for (name, path) in ref_anchors {
            anchors.insert(name, shift(path, offset));
        }
        documents.extend(ref_file.documents);
    }

    let offset = documents.len();
    let (main_file, main_anchors) = parse_bytes(main_source, mode)?;
    for (name, path) in main_anchors {
        anchors.insert(name, shift(path, offset));
    }
    documents.extend(main_file.documents);

    log::debug!(
        "preload merged {} reference document(s), {} anchor(s) total",
        offset,
        anchors.len()
    );
    Ok((File::new(documents), anchors))
}

fn shift(path: NodePath, offset: usize) -> NodePath {
    NodePath::new(path.document_index + offset, path.child_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_anchor_resolves_against_merged_file() {
        let reference = std::io::Cursor::new("shared: &s\n  x: 1\n".as_bytes().to_vec());
        let (file, anchors) = preload_and_parse(
            vec![ReferenceSource::Reader(reference)],
            "copy: *s\n",
            ParseMode::new(),
        )
        .unwrap();
        assert_eq!(file.documents.len(), 2);
        let path = anchors.get("s").expect("anchor 's' preloaded");
        let resolved = path.resolve(&file).expect("anchor resolves in merged file");
        assert!(matches!(resolved, crate::ast::Node::Mapping(_)));
    }

    #[test]
    fn main_source_anchor_wins_on_name_collision() {
        let reference = std::io::Cursor::new("a: &x 1\n".as_bytes().to_vec());
        let (file, anchors) = preload_and_parse(
            vec![ReferenceSource::Reader(reference)],
            "a: &x 2\n",
            ParseMode::new(),
        )
        .unwrap();
        let path = anchors.get("x").unwrap();
        let resolved = path.resolve(&file).unwrap();
        assert!(matches!(resolved, crate::ast::Node::Integer(i) if i.value.as_i64() == Some(2)));
    }

    #[test]
    fn path_variant_is_skipped_without_touching_the_filesystem() {
        let (file, anchors) = preload_and_parse(
            vec![ReferenceSource::<std::io::Cursor<Vec<u8>>>::Path("shared.yaml".into())],
            "a: 1\n",
            ParseMode::new(),
        )
        .unwrap();
        assert_eq!(file.documents.len(), 1);
        assert!(!anchors.contains_key("a"));
    }
}
