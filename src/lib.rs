//! A YAML 1.2 scanner, parser, AST model, and JSONPath-like path selector.
//!
//! # Example
//! ```rust
//! use yamlet::parser::{parse_bytes, ParseMode};
//! use yamlet::path::Path;
//!
//! let (file, _anchors) = parse_bytes("store:\n  book:\n    title: dune\n", ParseMode::new()).unwrap();
//! let path = Path::parse("$.store.book.title").unwrap();
//! let title: String = yamlet::path::ops::read(&file, &path, &yamlet::decode::DecodeOptions::new()).unwrap();
//! assert_eq!(title, "dune");
//! ```

pub mod ast;
pub mod decode;
pub mod error;
pub mod parser;
pub mod path;
pub mod preload;
pub mod scanner;
pub mod token;

pub use ast::{AnchorMap, File, Node, NodePath};
pub use decode::{from_node, from_node_with_anchors, DecodeOptions};
pub use error::{DecodeError, Error, QueryError, ScanError, SyntaxError, TokenScopedError};
pub use parser::{parse_bytes, ParseMode};
pub use path::{Path, PathBuilder};
pub use preload::{preload_and_parse, ReferenceSource};
pub use scanner::{scan, scan_strict, scan_with_config, ScannerConfig};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_reads_and_replaces_end_to_end() {
        let (mut file, _anchors) =
            parse_bytes("store:\n  book:\n    - title: dune\n      price: 12\n    - title: hyperion\n      price: 15\n", ParseMode::new())
                .unwrap();

        let title_path = Path::parse("$.store.book[0].title").unwrap();
        let title: String = path::ops::read(&file, &title_path, &DecodeOptions::new()).unwrap();
        assert_eq!(title, "dune");

        let prices_path = Path::parse("$.store.book[*].price").unwrap();
        let prices: Vec<i64> = path::ops::read(&file, &prices_path, &DecodeOptions::new()).unwrap();
        assert_eq!(prices, vec![12, 15]);

        let (replacement_file, _) = parse_bytes("20\n", ParseMode::new()).unwrap();
        let replacement = replacement_file.documents[0].body.clone().unwrap();
        let first_price = Path::parse("$.store.book[0].price").unwrap();
        path::ops::replace_with_node(&mut file, &first_price, &replacement).unwrap();
        let updated: i64 = path::ops::read(&file, &first_price, &DecodeOptions::new()).unwrap();
        assert_eq!(updated, 20);
    }

    #[test]
    fn anchor_resolves_through_alias_at_decode_time() {
        let (file, anchors) = parse_bytes("base: &b {x: 1, y: 2}\ncopy: *b\n", ParseMode::new()).unwrap();
        let path = Path::parse("$.copy").unwrap();
        let node = path::ops::read_node(&file, &path).unwrap();
        assert!(matches!(node, Node::Alias(_)));

        let resolved: std::collections::BTreeMap<String, i64> =
            from_node_with_anchors(node, &file, &anchors, &DecodeOptions::new()).unwrap();
        assert_eq!(resolved.get("x"), Some(&1));
        assert_eq!(resolved.get("y"), Some(&2));
    }

    #[test]
    fn empty_source_parses_to_a_single_empty_document() {
        let (file, anchors) = parse_bytes("", ParseMode::new()).unwrap();
        assert_eq!(file.documents.len(), 1);
        assert!(file.documents[0].body.is_none());
        assert!(anchors.is_empty());
    }

    #[test]
    fn printed_output_reparses_to_an_equivalent_tree() {
        let (file, _) = parse_bytes("a: 1\nb: 2\n", ParseMode::new()).unwrap();
        let body = file.documents[0].body.as_deref().unwrap();
        let printed = ast::print(body, ast::PrintOptions::default()).unwrap();
        let (reparsed, _) = parse_bytes(&printed, ParseMode::new()).unwrap();
        assert_eq!(reparsed.documents[0].body.as_deref(), Some(body));
    }
}
