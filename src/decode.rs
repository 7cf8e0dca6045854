//! A thin `serde::Deserialize` bridge over the AST (§10.1), in the same
//! shape as the teacher's (unwired) `de.rs`: `deserialize_any` dispatch over
//! the ~17 [`Node`] variants, integer widening by range, `!!binary` → bytes
//! via base64, and merge-key flattening for `deserialize_map`/`deserialize_struct`.
//!
//! This is the one piece of "external reflection decoder" the AST model
//! allows into the core, because the path engine's `read(path, dst)`
//! operation needs somewhere to land a matched subtree (§4.4.2).

use base64::Engine;
use serde::de::{self, EnumAccess, IntoDeserializer, MapAccess, SeqAccess, VariantAccess, Visitor};

use crate::ast::{AnchorMap, File, IntegerValue, MappingNode, Node};
use crate::error::DecodeError;

/// Resolves `Node::Alias` during decoding by name lookup against the anchor
/// map built while parsing `file` (§4.2.3, §10.3).
#[derive(Clone, Copy)]
pub struct AnchorContext<'de> {
    pub file: &'de File,
    pub anchors: &'de AnchorMap,
}

/// Knobs threaded through the bridge (§6.5, §10.1).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Reject unknown struct fields under `deserialize_struct` instead of
    /// silently ignoring them.
    pub strict: bool,
}

impl DecodeOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// Post-decode validation hook (§6.5 `Validator(v)`), called by a caller
/// after a struct decodes successfully.
pub trait Validate {
    fn validate(&self) -> Result<(), DecodeError>;
}

/// Decode `node` into `T`. A `Node::Alias` reached during decoding is
/// `DecodeError::UnresolvedAlias` — no anchor map is reachable through this
/// entry point. Use [`from_node_with_anchors`] when `node` may contain
/// aliases.
pub fn from_node<T: serde::de::DeserializeOwned>(
    node: &Node,
    options: &DecodeOptions,
) -> Result<T, DecodeError> {
    T::deserialize(NodeDeserializer::new(node, *options, None))
}

/// Decode `node` into `T`, resolving `Node::Alias` references against
/// `anchors` (the map produced by [`crate::parser::parse_bytes`] over
/// `file`) as they're encountered (§4.2.3 "anchor resolution").
pub fn from_node_with_anchors<T: serde::de::DeserializeOwned>(
    node: &Node,
    file: &File,
    anchors: &AnchorMap,
    options: &DecodeOptions,
) -> Result<T, DecodeError> {
    T::deserialize(NodeDeserializer::new(
        node,
        *options,
        Some(AnchorContext { file, anchors }),
    ))
}

fn integer_as_f64(v: IntegerValue) -> f64 {
    match v {
        IntegerValue::Signed(v) => v as f64,
        IntegerValue::Unsigned(v) => v as f64,
    }
}

fn format_integer(v: IntegerValue) -> String {
    match v {
        IntegerValue::Signed(v) => v.to_string(),
        IntegerValue::Unsigned(v) => v.to_string(),
    }
}

#[inline]
fn visit_integer<'de, V: Visitor<'de>>(value: IntegerValue, visitor: V) -> Result<V::Value, DecodeError> {
    match value {
        IntegerValue::Signed(v) if v < 0 => {
            if v >= i8::MIN as i64 {
                visitor.visit_i8(v as i8)
            } else if v >= i16::MIN as i64 {
                visitor.visit_i16(v as i16)
            } else if v >= i32::MIN as i64 {
                visitor.visit_i32(v as i32)
            } else {
                visitor.visit_i64(v)
            }
        }
        IntegerValue::Signed(v) => visit_unsigned(v as u64, visitor),
        IntegerValue::Unsigned(v) => visit_unsigned(v, visitor),
    }
}

#[inline]
fn visit_unsigned<'de, V: Visitor<'de>>(value: u64, visitor: V) -> Result<V::Value, DecodeError> {
    if value <= u8::MAX as u64 {
        visitor.visit_u8(value as u8)
    } else if value <= u16::MAX as u64 {
        visitor.visit_u16(value as u16)
    } else if value <= u32::MAX as u64 {
        visitor.visit_u32(value as u32)
    } else {
        visitor.visit_u64(value)
    }
}

/// Strip `Anchor` wrappers and resolve `Alias` references in a loop, leaving
/// `Tag` wrappers in place — callers still need to inspect those for e.g.
/// `!!binary`.
fn resolve<'de>(mut node: &'de Node, anchors: Option<AnchorContext<'de>>) -> Result<&'de Node, DecodeError> {
    loop {
        match node {
            Node::Anchor(a) => node = &a.value,
            Node::Alias(a) => {
                let Some(ctx) = anchors else {
                    log::warn!("alias '{}' cannot resolve: no anchor context", a.name);
                    return Err(DecodeError::UnresolvedAlias(a.name.clone()));
                };
                let path = ctx.anchors.get(&a.name).ok_or_else(|| {
                    log::warn!("alias '{}' has no matching anchor", a.name);
                    DecodeError::UnresolvedAlias(a.name.clone())
                })?;
                node = path
                    .resolve(ctx.file)
                    .ok_or_else(|| DecodeError::UnresolvedAlias(a.name.clone()))?;
            }
            _ => return Ok(node),
        }
    }
}

fn strip_tag(node: &Node) -> &Node {
    match node {
        Node::Tag(t) => strip_tag(&t.value),
        other => other,
    }
}

fn is_binary_tag(node: &Node) -> bool {
    matches!(node, Node::Tag(t) if t.token.value == "!!binary")
}

fn same_key(a: &Node, b: &Node) -> bool {
    match (a.unwrap_meta(), b.unwrap_meta()) {
        (Node::String(x), Node::String(y)) => x.value == y.value,
        (Node::MergeKey(_), Node::MergeKey(_)) => true,
        _ => false,
    }
}

/// Flatten `<<` merge-key entries into a mapping's iteration order: explicit
/// keys keep their place and win on collision, merged entries are appended
/// in the order their source mappings were visited (§4.1.4, §10.1).
fn expand_merge_keys<'de>(
    m: &'de MappingNode,
    anchors: Option<AnchorContext<'de>>,
) -> Result<Vec<(&'de Node, &'de Node)>, DecodeError> {
    let mut explicit = Vec::new();
    let mut merged = Vec::new();
    for entry in &m.values {
        if matches!(entry.key.unwrap_meta(), Node::MergeKey(_)) {
            let source = resolve(&entry.value, anchors)?;
            collect_merge_source(source, anchors, &mut merged)?;
        } else {
            explicit.push((entry.key.as_ref(), entry.value.as_ref()));
        }
    }
    let mut out = explicit;
    'merge: for (key, value) in merged {
        for (existing, _) in &out {
            if same_key(existing, key) {
                continue 'merge;
            }
        }
        out.push((key, value));
    }
    log::trace!("merge-key expansion: {} entries after flattening", out.len());
    Ok(out)
}

fn collect_merge_source<'de>(
    value: &'de Node,
    anchors: Option<AnchorContext<'de>>,
    out: &mut Vec<(&'de Node, &'de Node)>,
) -> Result<(), DecodeError> {
    match strip_tag(value) {
        Node::Mapping(m) => {
            for entry in &m.values {
                out.push((entry.key.as_ref(), entry.value.as_ref()));
            }
            Ok(())
        }
        Node::Sequence(s) => {
            for item in &s.entries {
                let resolved = resolve(item, anchors)?;
                collect_merge_source(resolved, anchors, out)?;
            }
            Ok(())
        }
        other => Err(DecodeError::TypeMismatch {
            expected: "mapping or sequence of mappings for merge key",
            found: other.type_name(),
        }),
    }
}

pub struct NodeDeserializer<'de> {
    node: &'de Node,
    options: DecodeOptions,
    anchors: Option<AnchorContext<'de>>,
}

impl<'de> NodeDeserializer<'de> {
    #[inline]
    pub fn new(node: &'de Node, options: DecodeOptions, anchors: Option<AnchorContext<'de>>) -> Self {
        Self { node, options, anchors }
    }

    fn resolved(&self) -> Result<&'de Node, DecodeError> {
        resolve(self.node, self.anchors)
    }

    fn child(&self, node: &'de Node) -> Self {
        Self::new(node, self.options, self.anchors)
    }
}

impl<'de> de::Deserializer<'de> for NodeDeserializer<'de> {
    type Error = DecodeError;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        let node = self.resolved()?;
        match node {
            Node::Tag(t) if is_binary_tag(node) => {
                let inner = resolve(&t.value, self.anchors)?;
                match inner {
                    Node::String(s) => {
                        let bytes = base64::engine::general_purpose::STANDARD
                            .decode(s.value.trim())
                            .map_err(|e| DecodeError::Custom(e.to_string()))?;
                        visitor.visit_byte_buf(bytes)
                    }
                    other => Err(DecodeError::TypeMismatch {
                        expected: "string",
                        found: other.type_name(),
                    }),
                }
            }
            Node::Tag(t) => self.child(&t.value).deserialize_any(visitor),
            Node::Null(_) => visitor.visit_unit(),
            Node::Bool(b) => visitor.visit_bool(b.value),
            Node::Integer(i) => visit_integer(i.value, visitor),
            Node::Float(f) => visitor.visit_f64(f.value),
            Node::Infinity(inf) => {
                visitor.visit_f64(if inf.negative { f64::NEG_INFINITY } else { f64::INFINITY })
            }
            Node::Nan(_) => visitor.visit_f64(f64::NAN),
            Node::String(s) => visitor.visit_str(&s.value),
            Node::Literal(l) => visitor.visit_str(&l.value),
            Node::Folded(f) => visitor.visit_str(&f.value),
            Node::MergeKey(_) => visitor.visit_str("<<"),
            Node::Directive(d) => visitor.visit_str(&d.value),
            Node::Sequence(_) => self.deserialize_seq(visitor),
            Node::Mapping(_) => self.deserialize_map(visitor),
            Node::MappingValue(_) | Node::Document(_) | Node::Anchor(_) | Node::Alias(_) => {
                Err(DecodeError::TypeMismatch {
                    expected: "scalar, sequence or mapping",
                    found: node.type_name(),
                })
            }
        }
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match strip_tag(self.resolved()?) {
            Node::Bool(b) => visitor.visit_bool(b.value),
            other => Err(DecodeError::TypeMismatch { expected: "bool", found: other.type_name() }),
        }
    }

    fn deserialize_i8<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match strip_tag(self.resolved()?) {
            Node::Integer(i) => {
                let v = i8::try_from(i.value.as_i64().ok_or(DecodeError::Overflow)?)
                    .map_err(|_| DecodeError::Overflow)?;
                visitor.visit_i8(v)
            }
            other => Err(DecodeError::TypeMismatch { expected: "integer", found: other.type_name() }),
        }
    }

    fn deserialize_i16<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match strip_tag(self.resolved()?) {
            Node::Integer(i) => {
                let v = i16::try_from(i.value.as_i64().ok_or(DecodeError::Overflow)?)
                    .map_err(|_| DecodeError::Overflow)?;
                visitor.visit_i16(v)
            }
            other => Err(DecodeError::TypeMismatch { expected: "integer", found: other.type_name() }),
        }
    }

    fn deserialize_i32<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match strip_tag(self.resolved()?) {
            Node::Integer(i) => {
                let v = i32::try_from(i.value.as_i64().ok_or(DecodeError::Overflow)?)
                    .map_err(|_| DecodeError::Overflow)?;
                visitor.visit_i32(v)
            }
            other => Err(DecodeError::TypeMismatch { expected: "integer", found: other.type_name() }),
        }
    }

    fn deserialize_i64<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match strip_tag(self.resolved()?) {
            Node::Integer(i) => visitor.visit_i64(i.value.as_i64().ok_or(DecodeError::Overflow)?),
            other => Err(DecodeError::TypeMismatch { expected: "integer", found: other.type_name() }),
        }
    }

    fn deserialize_i128<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match strip_tag(self.resolved()?) {
            Node::Integer(i) => visitor.visit_i128(i128::from(i.value.as_i64().ok_or(DecodeError::Overflow)?)),
            other => Err(DecodeError::TypeMismatch { expected: "integer", found: other.type_name() }),
        }
    }

    fn deserialize_u8<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match strip_tag(self.resolved()?) {
            Node::Integer(i) => {
                let v = u8::try_from(i.value.as_u64().ok_or(DecodeError::Overflow)?)
                    .map_err(|_| DecodeError::Overflow)?;
                visitor.visit_u8(v)
            }
            other => Err(DecodeError::TypeMismatch { expected: "integer", found: other.type_name() }),
        }
    }

    fn deserialize_u16<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match strip_tag(self.resolved()?) {
            Node::Integer(i) => {
                let v = u16::try_from(i.value.as_u64().ok_or(DecodeError::Overflow)?)
                    .map_err(|_| DecodeError::Overflow)?;
                visitor.visit_u16(v)
            }
            other => Err(DecodeError::TypeMismatch { expected: "integer", found: other.type_name() }),
        }
    }

    fn deserialize_u32<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match strip_tag(self.resolved()?) {
            Node::Integer(i) => {
                let v = u32::try_from(i.value.as_u64().ok_or(DecodeError::Overflow)?)
                    .map_err(|_| DecodeError::Overflow)?;
                visitor.visit_u32(v)
            }
            other => Err(DecodeError::TypeMismatch { expected: "integer", found: other.type_name() }),
        }
    }

    fn deserialize_u64<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match strip_tag(self.resolved()?) {
            Node::Integer(i) => visitor.visit_u64(i.value.as_u64().ok_or(DecodeError::Overflow)?),
            other => Err(DecodeError::TypeMismatch { expected: "integer", found: other.type_name() }),
        }
    }

    fn deserialize_u128<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match strip_tag(self.resolved()?) {
            Node::Integer(i) => visitor.visit_u128(u128::from(i.value.as_u64().ok_or(DecodeError::Overflow)?)),
            other => Err(DecodeError::TypeMismatch { expected: "integer", found: other.type_name() }),
        }
    }

    fn deserialize_f32<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match strip_tag(self.resolved()?) {
            Node::Float(f) => visitor.visit_f32(f.value as f32),
            Node::Integer(i) => visitor.visit_f32(integer_as_f64(i.value) as f32),
            Node::Infinity(inf) => visitor.visit_f32(if inf.negative { f32::NEG_INFINITY } else { f32::INFINITY }),
            Node::Nan(_) => visitor.visit_f32(f32::NAN),
            other => Err(DecodeError::TypeMismatch { expected: "number", found: other.type_name() }),
        }
    }

    fn deserialize_f64<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match strip_tag(self.resolved()?) {
            Node::Float(f) => visitor.visit_f64(f.value),
            Node::Integer(i) => visitor.visit_f64(integer_as_f64(i.value)),
            Node::Infinity(inf) => visitor.visit_f64(if inf.negative { f64::NEG_INFINITY } else { f64::INFINITY }),
            Node::Nan(_) => visitor.visit_f64(f64::NAN),
            other => Err(DecodeError::TypeMismatch { expected: "number", found: other.type_name() }),
        }
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match strip_tag(self.resolved()?) {
            Node::String(s) => {
                let mut chars = s.value.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => visitor.visit_char(c),
                    _ => Err(DecodeError::TypeMismatch {
                        expected: "single-character string",
                        found: "String",
                    }),
                }
            }
            other => Err(DecodeError::TypeMismatch { expected: "string", found: other.type_name() }),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match strip_tag(self.resolved()?) {
            Node::String(s) => visitor.visit_str(&s.value),
            Node::Literal(l) => visitor.visit_str(&l.value),
            Node::Folded(f) => visitor.visit_str(&f.value),
            Node::Directive(d) => visitor.visit_str(&d.value),
            Node::MergeKey(_) => visitor.visit_str("<<"),
            Node::Bool(b) => visitor.visit_str(if b.value { "true" } else { "false" }),
            Node::Null(_) => visitor.visit_str(""),
            Node::Integer(i) => visitor.visit_string(format_integer(i.value)),
            Node::Float(f) => visitor.visit_string(f.value.to_string()),
            other => Err(DecodeError::TypeMismatch { expected: "string", found: other.type_name() }),
        }
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        let node = self.resolved()?;
        if is_binary_tag(node) {
            let Node::Tag(t) = node else { unreachable!() };
            let inner = resolve(&t.value, self.anchors)?;
            if let Node::String(s) = inner {
                let bytes = base64::engine::general_purpose::STANDARD
                    .decode(s.value.trim())
                    .map_err(|e| DecodeError::Custom(e.to_string()))?;
                return visitor.visit_byte_buf(bytes);
            }
        }
        match strip_tag(node) {
            Node::String(s) => visitor.visit_bytes(s.value.as_bytes()),
            other => Err(DecodeError::TypeMismatch {
                expected: "string or !!binary tag",
                found: other.type_name(),
            }),
        }
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match strip_tag(self.resolved()?) {
            Node::Null(_) => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match strip_tag(self.resolved()?) {
            Node::Null(_) => visitor.visit_unit(),
            other => Err(DecodeError::TypeMismatch { expected: "null", found: other.type_name() }),
        }
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        const EMPTY: &[Node] = &[];
        match strip_tag(self.resolved()?) {
            Node::Sequence(s) => visitor.visit_seq(NodeSeqAccess::new(s.entries.iter(), self.options, self.anchors)),
            Node::Null(_) => visitor.visit_seq(NodeSeqAccess::new(EMPTY.iter(), self.options, self.anchors)),
            other => Err(DecodeError::TypeMismatch { expected: "sequence", found: other.type_name() }),
        }
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match strip_tag(self.resolved()?) {
            Node::Mapping(m) => {
                let entries = expand_merge_keys(m, self.anchors)?;
                visitor.visit_map(NodeMapAccess::new(entries.into_iter(), self.options, self.anchors))
            }
            Node::Null(_) => visitor.visit_map(NodeMapAccess::new(Vec::new().into_iter(), self.options, self.anchors)),
            other => Err(DecodeError::TypeMismatch { expected: "mapping", found: other.type_name() }),
        }
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        if self.options.strict {
            if let Node::Mapping(m) = strip_tag(self.resolved()?) {
                for entry in &m.values {
                    if let Node::String(k) = entry.key.unwrap_meta() {
                        if k.value != "<<" && !fields.contains(&k.value.as_str()) {
                            return Err(DecodeError::UnknownField(k.value.clone()));
                        }
                    }
                }
            }
        }
        self.deserialize_map(visitor)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match strip_tag(self.resolved()?) {
            Node::String(s) => visitor.visit_enum(StringEnumDeserializer::new(&s.value)),
            Node::Mapping(m) if m.values.len() == 1 => {
                let entry = &m.values[0];
                visitor.visit_enum(NodeMapEnumDeserializer::new(
                    entry.key.as_ref(),
                    entry.value.as_ref(),
                    self.options,
                    self.anchors,
                ))
            }
            Node::Mapping(_) => Err(DecodeError::Custom("enum map must have exactly one entry".into())),
            other => Err(DecodeError::TypeMismatch {
                expected: "string or single-entry mapping for enum",
                found: other.type_name(),
            }),
        }
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }
}

pub struct NodeSeqAccess<'de, I> {
    iter: I,
    options: DecodeOptions,
    anchors: Option<AnchorContext<'de>>,
}

impl<'de, I> NodeSeqAccess<'de, I> {
    #[inline]
    fn new(iter: I, options: DecodeOptions, anchors: Option<AnchorContext<'de>>) -> Self {
        Self { iter, options, anchors }
    }
}

impl<'de, I> SeqAccess<'de> for NodeSeqAccess<'de, I>
where
    I: Iterator<Item = &'de Node>,
{
    type Error = DecodeError;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, Self::Error>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed
                .deserialize(NodeDeserializer::new(value, self.options, self.anchors))
                .map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        self.iter.size_hint().1
    }
}

pub struct NodeMapAccess<'de, I> {
    iter: I,
    next_value: Option<&'de Node>,
    options: DecodeOptions,
    anchors: Option<AnchorContext<'de>>,
}

impl<'de, I> NodeMapAccess<'de, I> {
    #[inline]
    fn new(iter: I, options: DecodeOptions, anchors: Option<AnchorContext<'de>>) -> Self {
        Self { iter, next_value: None, options, anchors }
    }
}

impl<'de, I> MapAccess<'de> for NodeMapAccess<'de, I>
where
    I: Iterator<Item = (&'de Node, &'de Node)>,
{
    type Error = DecodeError;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.next_value = Some(value);
                seed.deserialize(NodeDeserializer::new(key, self.options, self.anchors)).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.next_value.take() {
            Some(value) => seed.deserialize(NodeDeserializer::new(value, self.options, self.anchors)),
            None => Err(DecodeError::Custom("value requested before key".into())),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        self.iter.size_hint().1
    }
}

pub struct StringEnumDeserializer<'de> {
    value: &'de str,
}

impl<'de> StringEnumDeserializer<'de> {
    #[inline]
    fn new(value: &'de str) -> Self {
        Self { value }
    }
}

impl<'de> EnumAccess<'de> for StringEnumDeserializer<'de> {
    type Error = DecodeError;
    type Variant = UnitVariantDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant), Self::Error>
    where
        V: de::DeserializeSeed<'de>,
    {
        use serde::de::value::StrDeserializer;
        let deserializer: StrDeserializer<DecodeError> = self.value.into_deserializer();
        let variant = seed.deserialize(deserializer)?;
        Ok((variant, UnitVariantDeserializer))
    }
}

pub struct NodeMapEnumDeserializer<'de> {
    key: &'de Node,
    value: &'de Node,
    options: DecodeOptions,
    anchors: Option<AnchorContext<'de>>,
}

impl<'de> NodeMapEnumDeserializer<'de> {
    #[inline]
    fn new(key: &'de Node, value: &'de Node, options: DecodeOptions, anchors: Option<AnchorContext<'de>>) -> Self {
        Self { key, value, options, anchors }
    }
}

impl<'de> EnumAccess<'de> for NodeMapEnumDeserializer<'de> {
    type Error = DecodeError;
    type Variant = NodeDeserializer<'de>;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant), Self::Error>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(NodeDeserializer::new(self.key, self.options, self.anchors))?;
        Ok((variant, NodeDeserializer::new(self.value, self.options, self.anchors)))
    }
}

pub struct UnitVariantDeserializer;

impl<'de> VariantAccess<'de> for UnitVariantDeserializer {
    type Error = DecodeError;

    fn unit_variant(self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn newtype_variant_seed<T>(self, _seed: T) -> Result<T::Value, Self::Error>
    where
        T: de::DeserializeSeed<'de>,
    {
        Err(DecodeError::Custom("unit variant cannot be newtype".into()))
    }

    fn tuple_variant<V>(self, _len: usize, _visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        Err(DecodeError::Custom("unit variant cannot be tuple".into()))
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], _visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        Err(DecodeError::Custom("unit variant cannot be struct".into()))
    }
}

impl<'de> VariantAccess<'de> for NodeDeserializer<'de> {
    type Error = DecodeError;

    fn unit_variant(self) -> Result<(), Self::Error> {
        match strip_tag(self.resolved()?) {
            Node::Null(_) => Ok(()),
            other => Err(DecodeError::TypeMismatch { expected: "null", found: other.type_name() }),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value, Self::Error>
    where
        T: de::DeserializeSeed<'de>,
    {
        seed.deserialize(self)
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_bytes, ParseMode};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[test]
    fn decodes_struct_from_mapping() {
        let (file, _) = parse_bytes("x: 1\ny: 2\n", ParseMode::new()).unwrap();
        let body = file.documents[0].body.as_deref().unwrap();
        let point: Point = from_node(body, &DecodeOptions::new()).unwrap();
        assert_eq!(point, Point { x: 1, y: 2 });
    }

    #[test]
    fn decodes_sequence_of_integers() {
        let (file, _) = parse_bytes("[1, 2, 3]\n", ParseMode::new()).unwrap();
        let body = file.documents[0].body.as_deref().unwrap();
        let values: Vec<i64> = from_node(body, &DecodeOptions::new()).unwrap();
        assert_eq!(values, vec![1, 2, 3]);
    }

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

    #[test]
    fn decodes_binary_tag_into_bytes() {
        use serde::de::Deserializer as _;

        let (file, _) = parse_bytes("a: !!binary gIGC\n", ParseMode::new()).unwrap();
        let body = file.documents[0].body.as_deref().unwrap();
        let crate::ast::Node::Mapping(m) = body else {
            panic!("expected mapping");
        };
        let value = m.values[0].value.as_ref();
        let bytes = NodeDeserializer::new(value, DecodeOptions::new(), None)
            .deserialize_bytes(BytesVisitor)
            .unwrap();
        assert_eq!(bytes, vec![0x80, 0x81, 0x82]);
    }

    #[test]
    fn strict_mode_rejects_unknown_field() {
        let (file, _) = parse_bytes("x: 1\ny: 2\nz: 3\n", ParseMode::new()).unwrap();
        let body = file.documents[0].body.as_deref().unwrap();
        let err = from_node::<Point>(body, &DecodeOptions::new().strict(true)).unwrap_err();
        assert_eq!(err, DecodeError::UnknownField("z".into()));
    }

    #[test]
    fn merge_key_flattens_aliased_mapping() {
        let (file, anchors) = parse_bytes("base: &b\n  x: 1\npoint:\n  <<: *b\n  y: 2\n", ParseMode::new()).unwrap();
        let body = file.documents[0].body.as_deref().unwrap();
        let crate::ast::Node::Mapping(m) = body else {
            panic!("expected mapping");
        };
        let point_entry = m.values.iter().find(|e| matches!(e.key.unwrap_meta(), Node::String(s) if s.value == "point")).unwrap();
        let point: Point = from_node_with_anchors(&point_entry.value, &file, &anchors, &DecodeOptions::new()).unwrap();
        assert_eq!(point, Point { x: 1, y: 2 });
    }

    #[test]
    fn alias_without_anchor_context_is_unresolved() {
        let (file, _) = parse_bytes("a: &x 1\nb: *x\n", ParseMode::new()).unwrap();
        let crate::ast::Node::Mapping(m) = file.documents[0].body.as_deref().unwrap() else {
            panic!("expected mapping");
        };
        let b_value = m.values[1].value.as_ref();
        let result: Result<i64, DecodeError> = from_node(b_value, &DecodeOptions::new());
        assert_eq!(result, Err(DecodeError::UnresolvedAlias("x".into())));
    }
}
