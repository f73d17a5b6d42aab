#![forbid(unsafe_code)]

//! Retained document model.
//!
//! A single-document node tree that the widgets mutate directly. Nodes are
//! held in an arena and addressed by [`NodeId`]; the `id` attribute is a
//! rendering attribute mirrored into a lookup map, never an ownership or
//! identity mechanism.
//!
//! # Invariants
//!
//! - A node has at most one parent; [`Document::append_child`] detaches the
//!   node from its previous parent first.
//! - Reparenting preserves the node and its whole subtree.
//! - Nodes are never freed while the document lives, so a stored `NodeId`
//!   stays valid (it may refer to a detached node).
//!
//! # Failure Modes
//!
//! - A `NodeId` from a different document indexes arbitrary nodes or panics;
//!   that is a caller contract violation, not a guarded error.

use ahash::HashMap;
use ahash::HashMapExt;

use crate::geometry::Size;

/// Handle to a node in a [`Document`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// CSS-like display override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    Block,
    None,
}

/// Inline style values a widget may set on a node.
///
/// Only the properties the widgets actually drive are modeled; everything
/// else (colors, fonts, transitions) belongs to external stylesheets.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InlineStyle {
    /// `left` in pixels.
    pub left: Option<i32>,
    /// `top` in pixels.
    pub top: Option<i32>,
    /// Explicit `width` in pixels.
    pub width: Option<i32>,
    /// `margin-right` in pixels.
    pub margin_right: Option<i32>,
    /// `display` override.
    pub display: Option<Display>,
    /// `opacity` in `[0.0, 1.0]`.
    pub opacity: Option<f64>,
}

/// A simple selector: `#id`, `.class`, or a bare tag name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Id(String),
    Class(String),
    Tag(String),
}

impl Selector {
    /// Parse a selector string.
    ///
    /// Leading `#` selects by id, leading `.` by class, anything else by
    /// tag name. Invalid or compound selectors are not validated; they
    /// simply match nothing useful (caller contract).
    pub fn parse(s: &str) -> Selector {
        let s = s.trim();
        if let Some(rest) = s.strip_prefix('#') {
            Selector::Id(rest.to_string())
        } else if let Some(rest) = s.strip_prefix('.') {
            Selector::Class(rest.to_string())
        } else {
            Selector::Tag(s.to_string())
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    style: InlineStyle,
    outer_size: Size,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            id: None,
            classes: Vec::new(),
            style: InlineStyle::default(),
            outer_size: Size::default(),
            parent: None,
            children: Vec::new(),
        }
    }
}

/// The retained node tree.
///
/// Construction seeds the `html` root element with a `body` child, matching
/// the minimal structure the widgets rely on.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    ids: HashMap<String, NodeId>,
    root: NodeId,
    body: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document with an `html` root and a `body` child.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            ids: HashMap::new(),
            root: NodeId(0),
            body: NodeId(0),
        };
        doc.root = doc.create_element("html");
        doc.body = doc.create_element("body");
        doc.append_child(doc.root, doc.body);
        doc
    }

    /// The root (`html`) element.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The `body` element.
    #[inline]
    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Number of nodes in the arena (attached or not).
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the arena holds no nodes. Never true for a constructed
    /// document, present for API completeness.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(tag));
        id
    }

    /// Append `child` as the last child of `parent`, detaching it from its
    /// previous parent first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child {
            return;
        }
        self.detach(child);
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
    }

    /// Remove `node` from its parent's child list. No-op when detached.
    pub fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.index()].parent.take() {
            let siblings = &mut self.nodes[parent.index()].children;
            siblings.retain(|&c| c != node);
        }
    }

    /// The node's parent, if attached.
    #[inline]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.index()].parent
    }

    /// The node's children in document order.
    #[inline]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.index()].children
    }

    /// The node's tag name.
    #[inline]
    pub fn tag(&self, node: NodeId) -> &str {
        &self.nodes[node.index()].tag
    }

    /// The node's `id` attribute.
    #[inline]
    pub fn id(&self, node: NodeId) -> Option<&str> {
        self.nodes[node.index()].id.as_deref()
    }

    /// Set the node's `id` attribute, keeping the lookup map in sync.
    ///
    /// A later node claiming an id already in use steals the mapping, as a
    /// duplicate-id document would resolve unpredictably anyway.
    pub fn set_id(&mut self, node: NodeId, id: &str) {
        if let Some(old) = self.nodes[node.index()].id.take() {
            self.ids.remove(&old);
        }
        self.nodes[node.index()].id = Some(id.to_string());
        self.ids.insert(id.to_string(), node);
    }

    /// Look up a node by its `id` attribute.
    #[inline]
    pub fn node_by_id(&self, id: &str) -> Option<NodeId> {
        self.ids.get(id).copied()
    }

    /// Check for a class on the node.
    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes[node.index()].classes.iter().any(|c| c == class)
    }

    /// Add a class; duplicates are ignored.
    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if !self.has_class(node, class) {
            self.nodes[node.index()].classes.push(class.to_string());
        }
    }

    /// Remove a class. No-op when absent.
    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        self.nodes[node.index()].classes.retain(|c| c != class);
    }

    /// The node's classes in insertion order.
    pub fn classes(&self, node: NodeId) -> &[String] {
        &self.nodes[node.index()].classes
    }

    /// Copy of the node's inline style.
    #[inline]
    pub fn style(&self, node: NodeId) -> InlineStyle {
        self.nodes[node.index()].style
    }

    /// Mutable access to the node's inline style.
    #[inline]
    pub fn style_mut(&mut self, node: NodeId) -> &mut InlineStyle {
        &mut self.nodes[node.index()].style
    }

    /// The node's measured outer size (content plus margins).
    ///
    /// Layout is an external collaborator; the embedder reports measured
    /// sizes here and the widgets consume them for centering.
    #[inline]
    pub fn outer_size(&self, node: NodeId) -> Size {
        self.nodes[node.index()].outer_size
    }

    /// Record the node's measured outer size.
    #[inline]
    pub fn set_outer_size(&mut self, node: NodeId, size: Size) {
        self.nodes[node.index()].outer_size = size;
    }

    /// True when `node` is `ancestor` or one of its descendants.
    pub fn is_within(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(n) = cursor {
            if n == ancestor {
                return true;
            }
            cursor = self.nodes[n.index()].parent;
        }
        false
    }

    /// Check whether a node matches a selector.
    pub fn matches(&self, node: NodeId, selector: &Selector) -> bool {
        let n = &self.nodes[node.index()];
        match selector {
            Selector::Id(id) => n.id.as_deref() == Some(id.as_str()),
            Selector::Class(class) => n.classes.iter().any(|c| c == class),
            Selector::Tag(tag) => n.tag == *tag,
        }
    }

    /// All attached nodes matching a selector, in document order.
    pub fn select(&self, selector: &Selector) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            if self.matches(node, selector) {
                out.push(node);
            }
            let children = &self.nodes[node.index()].children;
            for &child in children.iter().rev() {
                stack.push(child);
            }
        }
        out
    }
}
