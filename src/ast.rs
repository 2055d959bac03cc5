//! The node protocol and the finished syntax tree.
//!
//! Grammar constructs implement [`Syntax`]. The parser keeps every completed
//! node in an arena and links them by [`NodeId`], so attaching, flattening
//! and reassociating nodes are index-list operations. A finished parse is an
//! [`Ast`]: the arena plus the id of its root.

use std::fmt::Write;

use serde::Serialize;

use crate::parser::{ParseResult, Parser};
use crate::source::{SourceSegment, SourceTable};

/// A grammar construct the parser can build a node for.
pub trait Syntax: Sized {
    /// Name used in tree dumps and "while parsing ..." notes.
    fn rule_name(&self) -> &'static str;

    /// Helper constructs splice their children into the parent instead of
    /// appearing in the tree themselves.
    fn is_helper(&self) -> bool {
        false
    }

    /// Payload worth showing in a tree dump, such as an identifier's text.
    fn detail(&self) -> Option<String> {
        None
    }

    /// Consumes this construct's tokens. Children are added by calling back
    /// into the parser.
    fn parse(&mut self, parser: &mut Parser<Self>) -> ParseResult;
}

/// Index of a node in an arena.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct Node<S> {
    pub syntax: S,
    pub segment: SourceSegment,
    /// Whether the construct committed before it finished.
    pub sufficient: bool,
    pub children: Vec<NodeId>,
}

/// A parsed tree.
#[derive(Debug, Clone)]
pub struct Ast<S> {
    nodes: Vec<Node<S>>,
    root: NodeId,
}

impl<S: Syntax> Ast<S> {
    pub(crate) fn new(nodes: Vec<Node<S>>, root: NodeId) -> Self {
        Self { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node<S> {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node<S>> {
        self.nodes.get(id.0)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn rule_name(&self, id: NodeId) -> &'static str {
        self.nodes[id.0].syntax.rule_name()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node ids in pre-order from the root.
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        order
    }

    /// First node named `rule_name` in pre-order.
    pub fn find(&self, rule_name: &str) -> Option<NodeId> {
        self.preorder()
            .into_iter()
            .find(|id| self.rule_name(*id) == rule_name)
    }

    pub fn find_all(&self, rule_name: &str) -> Vec<NodeId> {
        self.preorder()
            .into_iter()
            .filter(|id| self.rule_name(*id) == rule_name)
            .collect()
    }

    /// Indented text rendering for debugging. Not a stable format.
    ///
    /// ```text
    /// compilation-unit @1:1
    ///   namespace-declaration @1:1
    ///     identifier "A" @1:11
    /// ```
    pub fn dump(&self, table: &SourceTable) -> String {
        let mut out = String::new();
        self.dump_node(self.root, 0, table, &mut out);
        out
    }

    fn dump_node(&self, id: NodeId, depth: usize, table: &SourceTable, out: &mut String) {
        let node = self.node(id);
        let coords = table.coords_of(node.segment.position);
        let _ = write!(out, "{:indent$}{}", "", node.syntax.rule_name(), indent = depth * 2);
        if let Some(detail) = node.syntax.detail() {
            let _ = write!(out, " {detail:?}");
        }
        let _ = writeln!(out, " @{}:{}", coords.row, coords.col);
        for child in &node.children {
            self.dump_node(*child, depth + 1, table, out);
        }
    }

    /// Parenthesised rule names, e.g. `(binary-operator (identifier) (identifier))`.
    /// Handy for asserting tree shapes.
    pub fn sexp(&self, id: NodeId) -> String {
        let node = self.node(id);
        let mut out = format!("({}", node.syntax.rule_name());
        if let Some(detail) = node.syntax.detail() {
            out.push(' ');
            out.push_str(&detail);
        }
        for child in &node.children {
            out.push(' ');
            out.push_str(&self.sexp(*child));
        }
        out.push(')');
        out
    }
}
