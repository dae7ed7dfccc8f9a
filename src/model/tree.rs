//! Arena-backed mutable document tree.
//!
//! Nodes are owned by the [`Tree`] and addressed by [`NodeId`]. Parent links
//! exist for navigation; every structural change goes through an explicit
//! arena operation ([`Tree::append`], [`Tree::detach`], [`Tree::replace`],
//! [`Tree::unwrap`]). Detached nodes stay in the arena but are no longer
//! reachable from the root, so traversals from the root never see them.

use std::collections::BTreeSet;

/// Index of a node inside its [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Raw arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// An element's tag name and attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lowercase local tag name
    pub name: String,

    /// Attributes in source order
    pub attrs: Vec<(String, String)>,
}

impl Element {
    /// Create an element without attributes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
        }
    }

    /// Add an attribute and return self.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    /// Look up an attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// What a node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The document root marker
    Document,
    /// A markup element
    Element(Element),
    /// A run of character data
    Text(String),
    /// A markup comment
    Comment(String),
}

/// A node in the arena.
#[derive(Debug, Clone)]
pub struct Node {
    /// Node payload
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Parent of this node, if attached.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in document order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Tag name if this is an element.
    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element(element) => Some(element.name.as_str()),
            _ => None,
        }
    }

    /// Element data if this is an element.
    pub fn element(&self) -> Option<&Element> {
        match &self.kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Text content if this is a text node.
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Check if this node is a comment.
    pub fn is_comment(&self) -> bool {
        matches!(self.kind, NodeKind::Comment(_))
    }
}

/// A mutable document tree.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Create a tree holding only the document root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Document)],
        }
    }

    /// The document root.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes in the arena, detached ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree holds nothing but the root.
    pub fn is_empty(&self) -> bool {
        self.nodes[0].children.is_empty()
    }

    /// Get a node.
    ///
    /// # Panics
    /// Panics if `id` was not created by this tree.
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Tag name of an element node.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.get(id).tag()
    }

    /// Create a detached element node.
    pub fn create_element(&mut self, element: Element) -> NodeId {
        self.push(NodeKind::Element(element))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Text(text.into()))
    }

    /// Create a detached comment node.
    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Comment(text.into()))
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(kind));
        id
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Remove a node from its parent. The subtree stays intact.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&child| child != id);
        }
    }

    /// Put `new` where `old` is and detach `old`.
    ///
    /// Returns `false` (and does nothing) if `old` has no parent.
    pub fn replace(&mut self, old: NodeId, new: NodeId) -> bool {
        let Some(parent) = self.nodes[old.0].parent else {
            return false;
        };
        self.detach(new);
        let position = self.position(parent, old);
        self.nodes[parent.0].children[position] = new;
        self.nodes[new.0].parent = Some(parent);
        self.nodes[old.0].parent = None;
        true
    }

    /// Remove a node and splice its children into its parent at its position.
    ///
    /// Returns `false` (and does nothing) if the node has no parent.
    pub fn unwrap(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.nodes[id.0].parent else {
            return false;
        };
        let position = self.position(parent, id);
        let children = std::mem::take(&mut self.nodes[id.0].children);
        for &child in &children {
            self.nodes[child.0].parent = Some(parent);
        }
        self.nodes[parent.0]
            .children
            .splice(position..=position, children);
        self.nodes[id.0].parent = None;
        true
    }

    fn position(&self, parent: NodeId, child: NodeId) -> usize {
        self.nodes[parent.0]
            .children
            .iter()
            .position(|&c| c == child)
            .unwrap_or_else(|| unreachable!("child {:?} missing from its parent", child))
    }

    /// Check if a node is reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == self.root() {
                return true;
            }
            match self.nodes[current.0].parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Pre-order traversal of `id` and its descendants.
    pub fn traverse(&self, id: NodeId) -> Traverse<'_> {
        Traverse {
            tree: self,
            stack: vec![id],
        }
    }

    /// Reachable element nodes in document order.
    pub fn elements(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.traverse(self.root())
            .filter(move |&id| self.get(id).element().is_some())
    }

    /// Reachable elements with the given tag, in document order.
    pub fn elements_by_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = NodeId> + 'a {
        self.elements().filter(move |&id| self.tag(id) == Some(tag))
    }

    /// Ancestors of a node, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.get(id).parent, move |&node| self.get(node).parent)
    }

    /// The single string a node holds directly.
    ///
    /// A node with exactly one child has that child's text, if it is a text
    /// node, or that child's direct text, if it is an element. Any other
    /// shape has none.
    pub fn direct_text(&self, id: NodeId) -> Option<&str> {
        let mut current = id;
        loop {
            let node = self.get(current);
            let [only] = node.children() else {
                return None;
            };
            let child = self.get(*only);
            match &child.kind {
                NodeKind::Text(text) => return Some(text.as_str()),
                NodeKind::Element(_) => current = *only,
                _ => return None,
            }
        }
    }

    /// All character data under a node, markup removed.
    ///
    /// Comments and the subtrees of elements named in `opaque` contribute
    /// nothing.
    pub fn text_content(&self, id: NodeId, opaque: &BTreeSet<String>) -> String {
        let mut output = String::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = self.get(current);
            match &node.kind {
                NodeKind::Text(text) => output.push_str(text),
                NodeKind::Comment(_) => {}
                NodeKind::Element(element) if opaque.contains(&element.name) => {}
                _ => stack.extend(node.children.iter().rev()),
            }
        }
        output
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

/// Pre-order iterator over a subtree. See [`Tree::traverse`].
pub struct Traverse<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl Iterator for Traverse<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.get(id).children.iter().rev().copied());
        Some(id)
    }
}
