//! The pretty-printer: renders a [`Node`] back to YAML text honoring block
//! vs. flow style and the indentation recorded in `position.column`.

use std::fmt;

use super::node::{IntegerValue, Node};

/// Printer configuration (§10.5 configuration surface).
#[derive(Clone, Copy, Debug)]
pub struct PrintOptions {
    /// Spaces per indentation level in block style.
    pub indent: usize,
    /// Once a container's nesting depth reaches this value, render it (and
    /// everything below it) in flow style regardless of its own recorded
    /// style. `None` always honors each node's own `is_flow_style`.
    pub inline_after_depth: Option<usize>,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            inline_after_depth: None,
        }
    }
}

#[derive(Debug)]
pub enum PrintError {
    Fmt(fmt::Error),
}

impl From<fmt::Error> for PrintError {
    fn from(e: fmt::Error) -> Self {
        PrintError::Fmt(e)
    }
}

impl fmt::Display for PrintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrintError::Fmt(e) => write!(f, "format error: {e}"),
        }
    }
}

impl std::error::Error for PrintError {}

pub type PrintResult = Result<(), PrintError>;

/// Render `node` to a fresh `String`.
pub fn print(node: &Node, options: PrintOptions) -> Result<String, PrintError> {
    let mut out = String::new();
    Printer::new(&mut out, options).print_node(node, 0)?;
    Ok(out)
}

struct Printer<'a> {
    writer: &'a mut dyn fmt::Write,
    options: PrintOptions,
}

impl<'a> Printer<'a> {
    fn new(writer: &'a mut dyn fmt::Write, options: PrintOptions) -> Self {
        Self { writer, options }
    }

    fn write_indent(&mut self, depth: usize) -> PrintResult {
        for _ in 0..(depth * self.options.indent) {
            write!(self.writer, " ")?;
        }
        Ok(())
    }

    fn flow_forced(&self, depth: usize) -> bool {
        matches!(self.options.inline_after_depth, Some(max) if depth >= max)
    }

    fn print_node(&mut self, node: &Node, depth: usize) -> PrintResult {
        match node {
            Node::Null(_) => write!(self.writer, "~")?,
            Node::Bool(n) => write!(self.writer, "{}", n.value)?,
            Node::Integer(n) => match n.value {
                IntegerValue::Signed(v) => write!(self.writer, "{v}")?,
                IntegerValue::Unsigned(v) => write!(self.writer, "{v}")?,
            },
            Node::Float(n) => write!(self.writer, "{:.*}", n.precision, n.value)?,
            Node::Infinity(n) => write!(self.writer, "{}.inf", if n.negative { "-" } else { "" })?,
            Node::Nan(_) => write!(self.writer, ".nan")?,
            Node::String(n) => self.print_string(&n.value)?,
            Node::MergeKey(_) => write!(self.writer, "<<")?,
            Node::Literal(n) => self.print_block_scalar('|', &n.value, depth)?,
            Node::Folded(n) => self.print_block_scalar('>', &n.value, depth)?,
            Node::Mapping(m) => {
                if self.flow_forced(depth) || m.is_flow_style {
                    self.print_flow_mapping(m, depth)?;
                } else {
                    self.print_block_mapping(m, depth)?;
                }
            }
            Node::MappingValue(entry) => {
                self.print_node(&entry.key, depth)?;
                write!(self.writer, ": ")?;
                self.print_node(&entry.value, depth)?;
            }
            Node::Sequence(s) => {
                if self.flow_forced(depth) || s.is_flow_style {
                    self.print_flow_sequence(s, depth)?;
                } else {
                    self.print_block_sequence(s, depth)?;
                }
            }
            Node::Anchor(a) => {
                write!(self.writer, "&{} ", a.name)?;
                self.print_node(&a.value, depth)?;
            }
            Node::Alias(a) => write!(self.writer, "*{}", a.name)?,
            Node::Tag(t) => {
                write!(self.writer, "{} ", t.token.value)?;
                self.print_node(&t.value, depth)?;
            }
            Node::Directive(d) => write!(self.writer, "%{}", d.value)?,
            Node::Document(d) => {
                if d.has_explicit_start() {
                    writeln!(self.writer, "---")?;
                }
                if let Some(body) = &d.body {
                    self.print_node(body, depth)?;
                }
                if d.has_explicit_end() {
                    writeln!(self.writer)?;
                    write!(self.writer, "...")?;
                }
            }
        }
        Ok(())
    }

    fn print_block_mapping(&mut self, m: &super::node::MappingNode, depth: usize) -> PrintResult {
        if m.values.is_empty() {
            write!(self.writer, "{{}}")?;
            return Ok(());
        }
        for (i, entry) in m.values.iter().enumerate() {
            if i > 0 {
                writeln!(self.writer)?;
                self.write_indent(depth)?;
            }
            self.print_node(&entry.key, depth)?;
            write!(self.writer, ":")?;
            match entry.value.as_ref() {
                Node::Mapping(inner) if !inner.values.is_empty() && !self.flow_forced(depth + 1) && !inner.is_flow_style => {
                    writeln!(self.writer)?;
                    self.write_indent(depth + 1)?;
                    self.print_node(&entry.value, depth + 1)?;
                }
                Node::Sequence(inner) if !inner.entries.is_empty() && !self.flow_forced(depth + 1) && !inner.is_flow_style => {
                    writeln!(self.writer)?;
                    self.write_indent(depth)?;
                    self.print_node(&entry.value, depth)?;
                }
                _ => {
                    write!(self.writer, " ")?;
                    self.print_node(&entry.value, depth + 1)?;
                }
            }
        }
        Ok(())
    }

    fn print_block_sequence(&mut self, s: &super::node::SequenceNode, depth: usize) -> PrintResult {
        if s.entries.is_empty() {
            write!(self.writer, "[]")?;
            return Ok(());
        }
        for (i, entry) in s.entries.iter().enumerate() {
            if i > 0 {
                writeln!(self.writer)?;
                self.write_indent(depth)?;
            }
            write!(self.writer, "- ")?;
            self.print_node(entry, depth + 1)?;
        }
        Ok(())
    }

    fn print_flow_mapping(&mut self, m: &super::node::MappingNode, depth: usize) -> PrintResult {
        write!(self.writer, "{{")?;
        for (i, entry) in m.values.iter().enumerate() {
            if i > 0 {
                write!(self.writer, ", ")?;
            }
            self.print_node(&entry.key, depth)?;
            write!(self.writer, ": ")?;
            self.print_node(&entry.value, depth)?;
        }
        write!(self.writer, "}}")?;
        Ok(())
    }

    fn print_flow_sequence(&mut self, s: &super::node::SequenceNode, depth: usize) -> PrintResult {
        write!(self.writer, "[")?;
        for (i, entry) in s.entries.iter().enumerate() {
            if i > 0 {
                write!(self.writer, ", ")?;
            }
            self.print_node(entry, depth)?;
        }
        write!(self.writer, "]")?;
        Ok(())
    }

    fn print_block_scalar(&mut self, header: char, value: &str, depth: usize) -> PrintResult {
        writeln!(self.writer, "{header}")?;
        let inner_depth = depth + 1;
        let mut lines = value.split('\n').peekable();
        while let Some(line) = lines.next() {
            self.write_indent(inner_depth)?;
            write!(self.writer, "{line}")?;
            if lines.peek().is_some() {
                writeln!(self.writer)?;
            }
        }
        Ok(())
    }

    fn print_string(&mut self, s: &str) -> PrintResult {
        if needs_quotes(s) {
            write!(self.writer, "\"")?;
            for c in s.chars() {
                match c {
                    '"' => write!(self.writer, "\\\"")?,
                    '\\' => write!(self.writer, "\\\\")?,
                    '\n' => write!(self.writer, "\\n")?,
                    '\t' => write!(self.writer, "\\t")?,
                    '\r' => write!(self.writer, "\\r")?,
                    _ if c.is_control() => write!(self.writer, "\\u{:04x}", c as u32)?,
                    _ => write!(self.writer, "{c}")?,
                }
            }
            write!(self.writer, "\"")?;
        } else {
            write!(self.writer, "{s}")?;
        }
        Ok(())
    }
}

/// Whether `s` would be re-read as something other than a plain string scalar
/// if emitted unquoted, and so needs double-quoting.
fn needs_quotes(s: &str) -> bool {
    if s.is_empty() || s.starts_with(' ') || s.ends_with(' ') {
        return true;
    }
    if s.parse::<i64>().is_ok() || s.parse::<f64>().is_ok() {
        return true;
    }
    if matches!(
        s,
        "null" | "~" | "NULL" | "Null" | "true" | "false" | "True" | "False" | "TRUE" | "FALSE"
    ) {
        return true;
    }
    if s.starts_with(|c: char| {
        matches!(
            c,
            ':' | '&' | '*' | '?' | '|' | '-' | '<' | '>' | '=' | '!' | '%' | '@' | '#'
        )
    }) {
        return true;
    }
    s.contains(|c: char| {
        matches!(c, '{' | '}' | '[' | ']' | ',' | '#' | '`' | '"' | '\'' | '\\')
            || c.is_control()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::node::{BoolNode, IntegerNode, MappingNode, MappingValueNode, NullNode, SequenceNode, StringNode};
    use crate::token::{CharacterType, Indicator, Position, Token, TokenKind};

    fn tok(kind: TokenKind) -> Token {
        Token::new(kind, CharacterType::Miscellaneous, Indicator::None, "", "", Position::start())
    }

    #[test]
    fn prints_block_mapping_with_nested_sequence() {
        let node = Node::Mapping(MappingNode {
            start_token: tok(TokenKind::MappingStart),
            is_flow_style: false,
            values: smallvec::smallvec![MappingValueNode {
                start_token: tok(TokenKind::MappingValue),
                key: Box::new(Node::String(StringNode { token: tok(TokenKind::String), value: "items".into() })),
                value: Box::new(Node::Sequence(SequenceNode {
                    start_token: tok(TokenKind::SequenceStart),
                    is_flow_style: false,
                    entries: smallvec::smallvec![
                        Node::Integer(IntegerNode { token: tok(TokenKind::Integer), value: IntegerValue::Signed(1) }),
                        Node::Integer(IntegerNode { token: tok(TokenKind::Integer), value: IntegerValue::Signed(2) }),
                    ],
                })),
            }],
        });
        let out = print(&node, PrintOptions::default()).unwrap();
        assert_eq!(out, "items:\n- 1\n- 2");
    }

    #[test]
    fn prints_flow_mapping_when_forced_by_depth() {
        let node = Node::Mapping(MappingNode {
            start_token: tok(TokenKind::MappingStart),
            is_flow_style: false,
            values: smallvec::smallvec![MappingValueNode {
                start_token: tok(TokenKind::MappingValue),
                key: Box::new(Node::String(StringNode { token: tok(TokenKind::String), value: "a".into() })),
                value: Box::new(Node::Bool(BoolNode { token: tok(TokenKind::Bool), value: true })),
            }],
        });
        let out = print(&node, PrintOptions { indent: 2, inline_after_depth: Some(0) }).unwrap();
        assert_eq!(out, "{a: true}");
    }

    #[test]
    fn quotes_ambiguous_strings() {
        let node = Node::String(StringNode { token: tok(TokenKind::String), value: "true".into() });
        let out = print(&node, PrintOptions::default()).unwrap();
        assert_eq!(out, "\"true\"");
        let plain = Node::String(StringNode { token: tok(TokenKind::String), value: "hello".into() });
        assert_eq!(print(&plain, PrintOptions::default()).unwrap(), "hello");
    }

    #[test]
    fn prints_null_as_tilde() {
        let node = Node::Null(NullNode { token: tok(TokenKind::Null) });
        assert_eq!(print(&node, PrintOptions::default()).unwrap(), "~");
    }
}
