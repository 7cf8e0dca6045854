//! The ~17-variant AST (C3, §3.3).
//!
//! Every node owns its `Token`(s) and its children outright (§3.4: "AST
//! nodes are exclusively owned by their parent"); there is no shared/arena
//! ownership here, unlike the scanner's flat `Tokens` collection.

use smallvec::SmallVec;

use crate::token::{Position, Token};

/// Most mappings/sequences in hand-written YAML have only a few entries;
/// `SmallVec` keeps those inline instead of heap-allocating a `Vec` per node.
pub type NodeVec = SmallVec<[Node; 4]>;
pub type MappingEntryVec = SmallVec<[MappingValueNode; 4]>;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum IntegerValue {
    Signed(i64),
    Unsigned(u64),
}

impl IntegerValue {
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            IntegerValue::Signed(v) => Some(*v),
            IntegerValue::Unsigned(v) => i64::try_from(*v).ok(),
        }
    }

    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            IntegerValue::Signed(v) => u64::try_from(*v).ok(),
            IntegerValue::Unsigned(v) => Some(*v),
        }
    }
}

macro_rules! leaf_node {
    ($(#[$doc:meta])* $name:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq)]
        pub struct $name {
            pub token: Token,
            $(pub $field: $ty,)*
        }
    };
}

leaf_node!(
    /// An explicit `null`, `~`, or empty scalar.
    NullNode {}
);
leaf_node!(
    /// `true`/`false` and their capitalized spellings (§6.3).
    BoolNode { value: bool }
);
leaf_node!(
    /// A decimal/binary/octal/hex integer literal (§6.4), widened to
    /// unsigned on signed overflow.
    IntegerNode { value: IntegerValue }
);
leaf_node!(
    /// A dot-decimal float literal, with the number of fractional digits
    /// observed in source kept for round-trip fidelity.
    FloatNode { value: f64, precision: usize }
);
leaf_node!(
    /// `.inf`/`-.inf` and their capitalized spellings.
    InfinityNode { negative: bool }
);
leaf_node!(
    /// `.nan` and its capitalized spellings.
    NanNode {}
);
leaf_node!(
    /// A plain, single-, or double-quoted string scalar.
    StringNode { value: String }
);
leaf_node!(
    /// The special `<<` merge key.
    MergeKeyNode {}
);
leaf_node!(
    /// A literal block scalar (`|`).
    LiteralNode { value: String }
);
leaf_node!(
    /// A folded block scalar (`>`).
    FoldedNode { value: String }
);
leaf_node!(
    /// A `*name` alias reference; resolved by name lookup, never by owning
    /// the referent (§3.4).
    AliasNode { name: String }
);
leaf_node!(
    /// A directive line (`%YAML …`, `%TAG …`).
    DirectiveNode { value: String }
);

/// One `key: value` entry of a [`MappingNode`].
#[derive(Clone, Debug, PartialEq)]
pub struct MappingValueNode {
    pub start_token: Token,
    pub key: Box<Node>,
    pub value: Box<Node>,
}

/// An ordered mapping, preserving source order; duplicate keys are a
/// structural error surfaced by the decode bridge (§10.1), not the parser.
#[derive(Clone, Debug, PartialEq)]
pub struct MappingNode {
    pub start_token: Token,
    pub values: MappingEntryVec,
    pub is_flow_style: bool,
}

/// An ordered sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct SequenceNode {
    pub start_token: Token,
    pub entries: NodeVec,
    pub is_flow_style: bool,
}

/// A `&name value` anchor: owns its value outright.
#[derive(Clone, Debug, PartialEq)]
pub struct AnchorNode {
    pub start_token: Token,
    pub name: String,
    pub value: Box<Node>,
}

/// A `!tag`/`!!shorthand`/`!<verbatim>` wrapper around an inner value.
#[derive(Clone, Debug, PartialEq)]
pub struct TagNode {
    pub token: Token,
    pub value: Box<Node>,
}

/// A single document: an optional `---` header, an optional `...` end, and
/// a body (absent only for an empty document).
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentNode {
    /// The representative token returned by `get_token`: `start_token` when
    /// present, else the body's token, else `end_token`, else a synthesized
    /// marker for a fully empty document.
    pub token: Token,
    pub start_token: Option<Token>,
    pub end_token: Option<Token>,
    pub body: Option<Box<Node>>,
}

impl DocumentNode {
    #[must_use]
    pub fn has_explicit_start(&self) -> bool {
        self.start_token.is_some()
    }

    #[must_use]
    pub fn has_explicit_end(&self) -> bool {
        self.end_token.is_some()
    }
}

/// Any value in the AST (§3.3). ~17 variants: 10 scalar kinds, 3 container
/// kinds (mapping/mapping-entry/sequence), and 4 meta kinds
/// (anchor/alias/tag/directive), plus document.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Null(NullNode),
    Bool(BoolNode),
    Integer(IntegerNode),
    Float(FloatNode),
    Infinity(InfinityNode),
    Nan(NanNode),
    String(StringNode),
    MergeKey(MergeKeyNode),
    Literal(LiteralNode),
    Folded(FoldedNode),
    Mapping(MappingNode),
    MappingValue(MappingValueNode),
    Sequence(SequenceNode),
    Anchor(AnchorNode),
    Alias(AliasNode),
    Tag(TagNode),
    Directive(DirectiveNode),
    Document(DocumentNode),
}

impl Node {
    /// A representative token for this node — SPEC_FULL §3.3's `get_token`.
    #[must_use]
    pub fn get_token(&self) -> &Token {
        match self {
            Node::Null(n) => &n.token,
            Node::Bool(n) => &n.token,
            Node::Integer(n) => &n.token,
            Node::Float(n) => &n.token,
            Node::Infinity(n) => &n.token,
            Node::Nan(n) => &n.token,
            Node::String(n) => &n.token,
            Node::MergeKey(n) => &n.token,
            Node::Literal(n) => &n.token,
            Node::Folded(n) => &n.token,
            Node::Mapping(n) => &n.start_token,
            Node::MappingValue(n) => &n.start_token,
            Node::Sequence(n) => &n.start_token,
            Node::Anchor(n) => &n.start_token,
            Node::Alias(n) => &n.token,
            Node::Tag(n) => &n.token,
            Node::Directive(n) => &n.token,
            Node::Document(n) => &n.token,
        }
    }

    #[must_use]
    pub fn position(&self) -> Position {
        self.get_token().position
    }

    /// The node's kind name — SPEC_FULL §3.3's `type`.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Node::Null(_) => "Null",
            Node::Bool(_) => "Bool",
            Node::Integer(_) => "Integer",
            Node::Float(_) => "Float",
            Node::Infinity(_) => "Infinity",
            Node::Nan(_) => "Nan",
            Node::String(_) => "String",
            Node::MergeKey(_) => "MergeKey",
            Node::Literal(_) => "Literal",
            Node::Folded(_) => "Folded",
            Node::Mapping(_) => "Mapping",
            Node::MappingValue(_) => "MappingValue",
            Node::Sequence(_) => "Sequence",
            Node::Anchor(_) => "Anchor",
            Node::Alias(_) => "Alias",
            Node::Tag(_) => "Tag",
            Node::Directive(_) => "Directive",
            Node::Document(_) => "Document",
        }
    }

    #[must_use]
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Node::Null(_)
                | Node::Bool(_)
                | Node::Integer(_)
                | Node::Float(_)
                | Node::Infinity(_)
                | Node::Nan(_)
                | Node::String(_)
                | Node::MergeKey(_)
                | Node::Literal(_)
                | Node::Folded(_)
        )
    }

    #[must_use]
    pub fn is_mapping(&self) -> bool {
        matches!(self, Node::Mapping(_))
    }

    #[must_use]
    pub fn is_sequence(&self) -> bool {
        matches!(self, Node::Sequence(_))
    }

    /// Unwrap anchor/tag wrappers to the underlying value, without copying
    /// the subtree (§4.2.3: "aliases must be read through without copying").
    #[must_use]
    pub fn unwrap_meta(&self) -> &Node {
        match self {
            Node::Anchor(a) => a.value.unwrap_meta(),
            Node::Tag(t) => t.value.unwrap_meta(),
            other => other,
        }
    }

    /// Mutable counterpart of [`Node::unwrap_meta`], used by the path
    /// engine's in-place replace/merge operations.
    #[must_use]
    pub fn unwrap_meta_mut(&mut self) -> &mut Node {
        match self {
            Node::Anchor(a) => a.value.unwrap_meta_mut(),
            Node::Tag(t) => t.value.unwrap_meta_mut(),
            other => other,
        }
    }

    /// Indexed child access used by [`crate::ast::NodePath`] resolution:
    /// mapping index `i` yields the i-th entry's *value*, sequence index
    /// `i` yields the i-th element, anchor/tag/document index `0` yields
    /// the wrapped value/body.
    #[must_use]
    pub fn child(&self, idx: usize) -> Option<&Node> {
        match self {
            Node::Mapping(m) => m.values.get(idx).map(|v| v.value.as_ref()),
            Node::Sequence(s) => s.entries.get(idx),
            Node::Anchor(a) if idx == 0 => Some(a.value.as_ref()),
            Node::Tag(t) if idx == 0 => Some(t.value.as_ref()),
            Node::Document(d) if idx == 0 => d.body.as_deref(),
            _ => None,
        }
    }

    /// Recursively shift every contained token's `position.column` by `delta`
    /// (SPEC_FULL §3.3 `add_column`), used when a subtree is grafted into a
    /// new column context by the path engine's replace operation.
    pub fn add_column(&mut self, delta: isize) {
        fn shift(token: &mut Token, delta: isize) {
            token.position.column = token
                .position
                .column
                .saturating_add_signed(delta)
                .max(1);
        }
        match self {
            Node::Null(n) => shift(&mut n.token, delta),
            Node::Bool(n) => shift(&mut n.token, delta),
            Node::Integer(n) => shift(&mut n.token, delta),
            Node::Float(n) => shift(&mut n.token, delta),
            Node::Infinity(n) => shift(&mut n.token, delta),
            Node::Nan(n) => shift(&mut n.token, delta),
            Node::String(n) => shift(&mut n.token, delta),
            Node::MergeKey(n) => shift(&mut n.token, delta),
            Node::Literal(n) => shift(&mut n.token, delta),
            Node::Folded(n) => shift(&mut n.token, delta),
            Node::Alias(n) => shift(&mut n.token, delta),
            Node::Directive(n) => shift(&mut n.token, delta),
            Node::Tag(n) => {
                shift(&mut n.token, delta);
                n.value.add_column(delta);
            }
            Node::Anchor(n) => {
                shift(&mut n.start_token, delta);
                n.value.add_column(delta);
            }
            Node::MappingValue(n) => {
                shift(&mut n.start_token, delta);
                n.key.add_column(delta);
                n.value.add_column(delta);
            }
            Node::Mapping(n) => {
                shift(&mut n.start_token, delta);
                for entry in &mut n.values {
                    shift(&mut entry.start_token, delta);
                    entry.key.add_column(delta);
                    entry.value.add_column(delta);
                }
            }
            Node::Sequence(n) => {
                shift(&mut n.start_token, delta);
                for entry in &mut n.entries {
                    entry.add_column(delta);
                }
            }
            Node::Document(n) => {
                shift(&mut n.token, delta);
                if let Some(t) = &mut n.start_token {
                    shift(t, delta);
                }
                if let Some(t) = &mut n.end_token {
                    shift(t, delta);
                }
                if let Some(body) = &mut n.body {
                    body.add_column(delta);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{CharacterType, Indicator, TokenKind};

    fn tok(kind: TokenKind, value: &str, column: usize) -> Token {
        Token::new(
            kind,
            CharacterType::Miscellaneous,
            Indicator::None,
            value,
            value,
            Position {
                line: 1,
                column,
                offset: column,
                indent_num: 0,
                indent_level: 0,
            },
        )
    }

    #[test]
    fn add_column_shifts_nested_tokens() {
        let mut mapping = Node::Mapping(MappingNode {
            start_token: tok(TokenKind::MappingStart, "", 1),
            is_flow_style: false,
            values: smallvec::smallvec![MappingValueNode {
                start_token: tok(TokenKind::MappingValue, ":", 2),
                key: Box::new(Node::String(StringNode {
                    token: tok(TokenKind::String, "a", 1),
                    value: "a".into(),
                })),
                value: Box::new(Node::Integer(IntegerNode {
                    token: tok(TokenKind::Integer, "1", 4),
                    value: IntegerValue::Signed(1),
                })),
            }],
        });
        mapping.add_column(2);
        if let Node::Mapping(m) = &mapping {
            assert_eq!(m.values[0].key.position().column, 3);
            assert_eq!(m.values[0].value.position().column, 6);
        } else {
            unreachable!();
        }
    }

    #[test]
    fn unwrap_meta_passes_through_anchor_and_tag() {
        let inner = Node::String(StringNode {
            token: tok(TokenKind::String, "x", 1),
            value: "x".into(),
        });
        let tagged = Node::Tag(TagNode {
            token: tok(TokenKind::Tag, "!!str", 1),
            value: Box::new(inner.clone()),
        });
        let anchored = Node::Anchor(AnchorNode {
            start_token: tok(TokenKind::Anchor, "", 1),
            name: "a".into(),
            value: Box::new(tagged),
        });
        assert_eq!(anchored.unwrap_meta(), &inner);
    }
}
