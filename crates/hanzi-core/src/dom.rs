//! Minimal document model the lookup pipeline walks.
//!
//! Hosts expose their page through [`TextDocument`]; [`Document`] is an
//! arena-backed implementation used by the demo host and the tests.

use std::fmt::Debug;

/// Read access to a tree of element and text nodes.
///
/// Offsets are counted in characters.
pub trait TextDocument {
    type Node: Copy + Eq + Debug;

    /// Text of a text node, `None` for anything else
    fn text(&self, node: Self::Node) -> Option<&str>;

    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// Pre-order successor of `node`, `None` past the last node
    fn next_in_order(&self, node: Self::Node) -> Option<Self::Node>;

    /// Next text node after `node` in document order
    fn next_text_node(&self, node: Self::Node) -> Option<Self::Node> {
        let mut cursor = self.next_in_order(node);
        while let Some(candidate) = cursor {
            if self.text(candidate).is_some() {
                return Some(candidate);
            }
            cursor = self.next_in_order(candidate);
        }
        None
    }

    /// Character count of a text node
    fn text_len(&self, node: Self::Node) -> Option<usize> {
        self.text(node).map(|t| t.chars().count())
    }

    /// Text covered by `range`, crossing text nodes as needed
    fn range_text(&self, range: &TextRange<Self::Node>) -> String {
        let mut out = String::new();
        let mut node = range.start.node;
        let mut from = range.start.offset;

        loop {
            let Some(text) = self.text(node) else {
                break;
            };
            if node == range.end.node {
                let to = range.end.offset.max(from);
                out.extend(text.chars().skip(from).take(to - from));
                break;
            }
            out.extend(text.chars().skip(from));
            match self.next_text_node(node) {
                Some(next) => {
                    node = next;
                    from = 0;
                }
                None => break,
            }
        }

        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextPosition<N> {
    pub node: N,
    pub offset: usize,
}

impl<N> TextPosition<N> {
    pub fn new(node: N, offset: usize) -> Self {
        Self { node, offset }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRange<N> {
    pub start: TextPosition<N>,
    pub end: TextPosition<N>,
}

/// The page's text selection
pub trait Selection<D: TextDocument + ?Sized> {
    fn is_collapsed(&self) -> bool;

    fn text(&self, doc: &D) -> String;

    fn select(&mut self, doc: &D, range: TextRange<D::Node>);

    fn clear(&mut self);
}

/// Maps pointer coordinates onto the document
pub trait CaretResolver<D: TextDocument + ?Sized> {
    /// Innermost element under the pointer
    fn element_at(&self, doc: &D, x: f64, y: f64) -> Option<D::Node>;

    /// Caret position under the pointer, if it falls inside text
    fn caret_at(&self, doc: &D, x: f64, y: f64) -> Option<TextPosition<D::Node>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element { tag: String },
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Element {
                    tag: "body".to_string(),
                },
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        self.push(
            parent,
            NodeKind::Element {
                tag: tag.to_string(),
            },
        )
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push(parent, NodeKind::Text(text.to_string()))
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn kind(&self, node: NodeId) -> Option<&NodeKind> {
        self.nodes.get(node.0).map(|n| &n.kind)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.nodes.get(node.0)?.parent?;
        let siblings = &self.nodes[parent.0].children;
        let position = siblings.iter().position(|&c| c == node)?;
        siblings.get(position + 1).copied()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl TextDocument for Document {
    type Node = NodeId;

    fn text(&self, node: NodeId) -> Option<&str> {
        match self.kind(node)? {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element { .. } => None,
        }
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0)?.parent
    }

    fn next_in_order(&self, node: NodeId) -> Option<NodeId> {
        if let Some(&first) = self.children(node).first() {
            return Some(first);
        }

        // Climb until some ancestor has a following sibling
        let mut cursor = node;
        loop {
            if let Some(sibling) = self.next_sibling(cursor) {
                return Some(sibling);
            }
            cursor = self.parent(cursor)?;
        }
    }
}

/// In-memory selection over a [`TextDocument`]
#[derive(Debug, Clone)]
pub struct MemorySelection<N> {
    range: Option<TextRange<N>>,
}

impl<N: Copy> MemorySelection<N> {
    pub fn new() -> Self {
        Self { range: None }
    }

    pub fn range(&self) -> Option<TextRange<N>> {
        self.range
    }
}

impl<N: Copy> Default for MemorySelection<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: TextDocument + ?Sized> Selection<D> for MemorySelection<D::Node> {
    fn is_collapsed(&self) -> bool {
        match &self.range {
            Some(range) => range.start == range.end,
            None => true,
        }
    }

    fn text(&self, doc: &D) -> String {
        self.range
            .as_ref()
            .map(|range| doc.range_text(range))
            .unwrap_or_default()
    }

    fn select(&mut self, _doc: &D, range: TextRange<D::Node>) {
        self.range = Some(range);
    }

    fn clear(&mut self) {
        self.range = None;
    }
}
