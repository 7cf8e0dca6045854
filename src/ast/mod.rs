//! The AST model (C3): node types, a depth-first visitor, and a pretty-printer.

mod node;
mod print;
mod visitor;

pub use node::{
    AliasNode, AnchorNode, BoolNode, DirectiveNode, DocumentNode, FloatNode, FoldedNode,
    InfinityNode, IntegerNode, IntegerValue, LiteralNode, MappingEntryVec, MappingNode,
    MappingValueNode, MergeKeyNode, NanNode, Node, NodeVec, NullNode, SequenceNode, StringNode,
    TagNode,
};
pub use print::{print, PrintError, PrintOptions, PrintResult};
pub use visitor::{for_each, walk_children, Visitor};

use std::collections::HashMap;

/// A parsed file: an ordered sequence of documents (§3.3 "File").
#[derive(Clone, Debug, Default, PartialEq)]
pub struct File {
    pub documents: Vec<DocumentNode>,
}

impl File {
    #[must_use]
    pub fn new(documents: Vec<DocumentNode>) -> Self {
        Self { documents }
    }
}

/// A non-owning coordinate into a [`File`]: which document, then a chain of
/// child indices descended from that document's body (§3.4, §9). Resolving a
/// path never copies the subtree it points at; only a consumer that actually
/// needs an owned value clones the result.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct NodePath {
    pub document_index: usize,
    pub child_path: Vec<usize>,
}

impl NodePath {
    #[must_use]
    pub fn new(document_index: usize, child_path: Vec<usize>) -> Self {
        Self { document_index, child_path }
    }

    /// Resolve this coordinate against `file`, returning the node it points
    /// at, or `None` if the document/children it names no longer exist
    /// (e.g. after a prior edit removed them).
    #[must_use]
    pub fn resolve<'a>(&self, file: &'a File) -> Option<&'a Node> {
        let doc = file.documents.get(self.document_index)?;
        let mut current = doc.body.as_deref()?;
        for &step in &self.child_path {
            current = current.child(step)?;
        }
        Some(current)
    }
}

/// `anchor name -> coordinate of the anchored node`, built by the parser as
/// it walks the token stream (§4.2.3). Aliases resolve through this map by
/// name; the map itself never owns a copy of the anchored subtree.
pub type AnchorMap = HashMap<String, NodePath>;
