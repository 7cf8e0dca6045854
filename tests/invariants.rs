//! Property-style checks for the universal invariants and boundary
//! behaviors a scanner/parser/printer/path engine is expected to hold
//! (SPEC_FULL §8), plus the six concrete end-to-end scenarios listed there.

use indoc::indoc;
use pretty_assertions::assert_eq;
use yamlet::ast::{self, Node, PrintOptions};
use yamlet::parser::{parse_bytes, ParseMode};
use yamlet::path::Path;
use yamlet::scanner::scan;
use yamlet::token::TokenKind;
use yamlet::{from_node, DecodeOptions};

/// Structural equality that ignores token positions (§8 "positions may
/// differ"): two trees are equal here when their node kinds and semantic
/// values line up, regardless of where in the source each token sat.
fn same_shape(a: &Node, b: &Node) -> bool {
    match (a, b) {
        (Node::Null(_), Node::Null(_)) | (Node::Nan(_), Node::Nan(_)) | (Node::MergeKey(_), Node::MergeKey(_)) => true,
        (Node::Bool(x), Node::Bool(y)) => x.value == y.value,
        (Node::Integer(x), Node::Integer(y)) => x.value == y.value,
        (Node::Float(x), Node::Float(y)) => x.value == y.value && x.precision == y.precision,
        (Node::Infinity(x), Node::Infinity(y)) => x.negative == y.negative,
        (Node::String(x), Node::String(y)) => x.value == y.value,
        (Node::Literal(x), Node::Literal(y)) => x.value == y.value,
        (Node::Folded(x), Node::Folded(y)) => x.value == y.value,
        (Node::Directive(x), Node::Directive(y)) => x.value == y.value,
        (Node::Alias(x), Node::Alias(y)) => x.name == y.name,
        (Node::Anchor(x), Node::Anchor(y)) => x.name == y.name && same_shape(&x.value, &y.value),
        (Node::Tag(x), Node::Tag(y)) => x.token.value == y.token.value && same_shape(&x.value, &y.value),
        (Node::Mapping(x), Node::Mapping(y)) => {
            x.is_flow_style == y.is_flow_style
                && x.values.len() == y.values.len()
                && x.values
                    .iter()
                    .zip(y.values.iter())
                    .all(|(ex, ey)| same_shape(&ex.key, &ey.key) && same_shape(&ex.value, &ey.value))
        }
        (Node::Sequence(x), Node::Sequence(y)) => {
            x.is_flow_style == y.is_flow_style
                && x.entries.len() == y.entries.len()
                && x.entries.iter().zip(y.entries.iter()).all(|(ex, ey)| same_shape(ex, ey))
        }
        _ => false,
    }
}

const FIXTURES: &[&str] = &[
    "a: 1\n",
    "a: 1\nb: 2\n",
    "a:\n  b: c\n  d: e\n",
    "items:\n  - 1\n  - 2\n  - 3\n",
    "nested:\n  - x: 1\n    y: 2\n  - x: 3\n    y: 4\n",
    "flow: {a: 1, b: [2, 3]}\n",
    "str: 'single quoted'\n",
    "str: \"double quoted\"\n",
    "multi: |\n  line one\n  line two\n",
    "a: &x 1\nb: *x\n",
    "---\na: 1\n...\n---\nb: 2\n",
    "",
    "# just a comment\n",
];

#[test]
fn origin_round_trip_holds_for_every_fixture() {
    for source in FIXTURES {
        let outcome = scan(source);
        assert!(outcome.error.is_none(), "scan failed for {source:?}: {:?}", outcome.error);
        assert_eq!(&outcome.tokens.origin_concat(), source, "origin round-trip broke for {source:?}");
    }
}

#[test]
fn parse_then_print_reparses_to_a_structurally_equal_tree() {
    for source in FIXTURES {
        let (file, _) = parse_bytes(source, ParseMode::new()).unwrap_or_else(|e| {
            panic!("parse failed for {source:?}: {e:?}")
        });
        let Some(body) = file.documents[0].body.as_deref() else {
            continue;
        };
        let printed = ast::print(body, PrintOptions::default()).unwrap();
        let (reparsed, _) = parse_bytes(&printed, ParseMode::new())
            .unwrap_or_else(|e| panic!("reparse of printed output failed for {source:?}: {e:?}"));
        let reparsed_body = reparsed.documents[0].body.as_deref();
        assert!(
            reparsed_body.is_some_and(|n| same_shape(n, body)),
            "print/reparse diverged for {source:?} (printed as {printed:?})"
        );
    }
}

#[test]
fn path_read_then_replace_with_itself_is_identity() {
    let (mut file, _) = parse_bytes("store:\n  book:\n    title: dune\n    price: 12\n", ParseMode::new()).unwrap();
    let path = Path::parse("$.store.book.title").unwrap();
    let before = yamlet::path::ops::read_node(&file, &path).unwrap().clone();
    yamlet::path::ops::replace_with_node(&mut file, &path, &before).unwrap();
    let after = yamlet::path::ops::read_node(&file, &path).unwrap();
    assert_eq!(&before, after);
}

#[test]
fn alias_decodes_to_the_anchored_value_across_two_anchors() {
    let (file, anchors) = parse_bytes("a: &x 1\nb: &y 2\nc: *x\nd: *y\n", ParseMode::new()).unwrap();
    let yamlet::ast::Node::Mapping(m) = file.documents[0].body.as_deref().unwrap() else {
        panic!("expected mapping");
    };
    let find = |name: &str| {
        m.values
            .iter()
            .find(|e| matches!(e.key.unwrap_meta(), yamlet::ast::Node::String(s) if s.value == name))
            .unwrap()
            .value
            .as_ref()
    };
    let a: i64 = from_node(find("a"), &DecodeOptions::new()).unwrap();
    let b: i64 = from_node(find("b"), &DecodeOptions::new()).unwrap();
    let c: i64 = yamlet::from_node_with_anchors(find("c"), &file, &anchors, &DecodeOptions::new()).unwrap();
    let d: i64 = yamlet::from_node_with_anchors(find("d"), &file, &anchors, &DecodeOptions::new()).unwrap();
    assert_eq!((a, b, c, d), (1, 2, 1, 2));
}

#[test]
fn indent_level_never_decreases_by_more_than_one_step() {
    let source = "a:\n  b:\n    c: 1\n  d: 2\ne: 3\n";
    let outcome = scan(source);
    assert!(outcome.error.is_none());
    let mut prev_level: Option<usize> = None;
    for tok in outcome.tokens.iter() {
        if matches!(tok.kind, TokenKind::Space | TokenKind::Comment) {
            continue;
        }
        if let Some(prev) = prev_level {
            assert!(
                tok.position.indent_level + 1 >= prev,
                "indent level dropped by more than one: {prev} -> {}",
                tok.position.indent_level
            );
        }
        prev_level = Some(tok.position.indent_level);
    }
}

#[test]
fn flow_collection_brackets_balance_in_every_successful_parse() {
    for source in ["flow: {a: 1, b: [2, 3]}\n", "[1, [2, 3], {a: 4}]\n", "{}\n", "[]\n"] {
        let outcome = scan(source);
        assert!(outcome.error.is_none(), "scan failed for {source:?}");
        let mut mapping_balance = 0i32;
        let mut sequence_balance = 0i32;
        for tok in outcome.tokens.iter() {
            match tok.kind {
                TokenKind::MappingStart => mapping_balance += 1,
                TokenKind::MappingEnd => mapping_balance -= 1,
                TokenKind::SequenceStart => sequence_balance += 1,
                TokenKind::SequenceEnd => sequence_balance -= 1,
                _ => {}
            }
        }
        assert_eq!(mapping_balance, 0, "unbalanced mapping brackets in {source:?}");
        assert_eq!(sequence_balance, 0, "unbalanced sequence brackets in {source:?}");
    }
}

#[test]
fn empty_input_parses_to_one_document_with_no_error() {
    let (file, anchors) = parse_bytes("", ParseMode::new()).unwrap();
    assert_eq!(file.documents.len(), 1);
    assert!(file.documents[0].body.is_none());
    assert!(anchors.is_empty());
}

#[test]
fn comment_only_input_yields_one_document_with_null_body() {
    let (file, _) = parse_bytes("# nothing but a comment\n", ParseMode::new()).unwrap();
    assert_eq!(file.documents.len(), 1);
    match file.documents[0].body.as_deref() {
        None => {}
        Some(yamlet::ast::Node::Null(_)) => {}
        other => panic!("expected no body or a Null body for comment-only input, got {other:?}"),
    }
}

#[test]
fn document_end_followed_by_another_header_yields_two_documents() {
    let (file, _) = parse_bytes("a: 1\n...\n---\nb: 2\n", ParseMode::new()).unwrap();
    assert_eq!(file.documents.len(), 2);
}

#[test]
fn overflowing_signed_but_fitting_unsigned_integer_decodes_as_unsigned() {
    let (file, _) = parse_bytes("18446744073709551615\n", ParseMode::new()).unwrap();
    let body = file.documents[0].body.as_deref().unwrap();
    let yamlet::ast::Node::Integer(i) = body else {
        panic!("expected an integer literal");
    };
    assert_eq!(i.value.as_u64(), Some(u64::MAX));
    assert_eq!(i.value.as_i64(), None);
    let decoded: u64 = from_node(body, &DecodeOptions::new()).unwrap();
    assert_eq!(decoded, u64::MAX);
}

#[test]
fn scenario_1_simple_scalar_mapping() {
    let (file, _) = parse_bytes("v: hi\n", ParseMode::new()).unwrap();
    #[derive(serde::Deserialize, PartialEq, Debug)]
    struct V {
        v: String,
    }
    let decoded: V = from_node(file.documents[0].body.as_deref().unwrap(), &DecodeOptions::new()).unwrap();
    assert_eq!(decoded, V { v: "hi".into() });
}

#[test]
fn scenario_3_binary_tag_decodes_to_bytes() {
    let (file, _) = parse_bytes("a: !!binary gIGC\n", ParseMode::new()).unwrap();
    let yamlet::ast::Node::Mapping(m) = file.documents[0].body.as_deref().unwrap() else {
        panic!("expected mapping");
    };
    use serde::de::{Deserializer, Visitor};
    struct BytesVisitor;
    impl<'de> Visitor<'de> for BytesVisitor {
        type Value = Vec<u8>;
        fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("bytes")
        }
        fn visit_byte_buf<E>(self, v: Vec<u8>) -> Result<Self::Value, E> {
            Ok(v)
        }
        fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E> {
            Ok(v.to_vec())
        }
    }
    let value = m.values[0].value.as_ref();
    let bytes = yamlet::decode::NodeDeserializer::new(value, DecodeOptions::new(), None)
        .deserialize_bytes(BytesVisitor)
        .unwrap();
    assert_eq!(bytes, vec![0x80, 0x81, 0x82]);
}

#[test]
fn scenario_4_nested_struct_decode_and_reencode_round_trip() {
    use std::collections::BTreeMap;

    #[derive(serde::Deserialize, Debug, PartialEq)]
    struct Wrapper {
        #[serde(rename = "A")]
        a: BTreeMap<String, String>,
    }

    let (file, _) = parse_bytes("A:\n  b: c\n", ParseMode::new()).unwrap();
    let body = file.documents[0].body.as_deref().unwrap();
    let decoded: Wrapper = from_node(body, &DecodeOptions::new()).unwrap();
    assert_eq!(decoded.a.get("b"), Some(&"c".to_string()));

    let printed = ast::print(body, PrintOptions::default()).unwrap();
    assert_eq!(printed, "A:\n  b: c");
}

#[test]
fn scenario_5_wildcard_path_collects_in_source_order() {
    let source = indoc! {"
        store:
          book:
            - author: john
              title: dune
            - author: ken
              title: hyperion
    "};
    let (file, _) = parse_bytes(source, ParseMode::new()).unwrap();
    let path = Path::parse("$.store.book[*].author").unwrap();
    let authors: Vec<String> = yamlet::path::ops::read(&file, &path, &DecodeOptions::new()).unwrap();
    assert_eq!(authors, vec!["john".to_string(), "ken".to_string()]);
}

#[test]
fn scenario_6_multi_document_stream_reprints_both_headers() {
    let source = "---\na: 1\n...\n---\nb: 2\n";
    let (file, _) = parse_bytes(source, ParseMode::new()).unwrap();
    assert_eq!(file.documents.len(), 2);
    assert!(file.documents[0].has_explicit_start());
    assert!(file.documents[0].has_explicit_end());
    assert!(file.documents[1].has_explicit_start());

    let outcome = scan(source);
    assert!(outcome.error.is_none());
    assert_eq!(outcome.tokens.origin_concat(), source);
}
