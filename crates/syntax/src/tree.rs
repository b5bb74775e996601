use crate::edit::Journal;
use crate::SyntaxKind;
use lintkit_types::{LineColumn, LineIndex};

/// Stable handle to a node in a [`SyntaxTree`].
///
/// Handles stay valid for the lifetime of the tree: removing a node detaches
/// it but never frees its slot, so a handle held across an edit still refers to
/// the same node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Position of the node in the arena.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) kind: SyntaxKind,
    /// `Some` for tokens, `None` for composite nodes
    pub(crate) text: Option<String>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

/// A mutable syntax tree for one file.
///
/// Nodes live in an arena and are addressed by [`NodeId`]. The concatenated
/// text of all leaves, in document order, is the source text of the file.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    pub(crate) nodes: Vec<NodeData>,
    pub(crate) root: NodeId,
    pub(crate) journal: Journal,
    /// Bumped by every structural or text edit, including undos
    pub(crate) revision: u64,
}

impl SyntaxTree {
    /// Create a tree holding only an empty root node.
    #[must_use]
    pub fn new(root_kind: SyntaxKind) -> Self {
        Self {
            nodes: vec![NodeData {
                kind: root_kind,
                text: None,
                parent: None,
                children: Vec::new(),
            }],
            root: NodeId(0),
            journal: Journal::default(),
            revision: 0,
        }
    }

    pub(crate) fn alloc(&mut self, kind: SyntaxKind, text: Option<String>) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(NodeData {
            kind,
            text,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn data(&self, node: NodeId) -> &NodeData {
        &self.nodes[node.index()]
    }

    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes ever allocated, including detached ones.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn kind(&self, node: NodeId) -> SyntaxKind {
        self.data(node).kind
    }

    #[must_use]
    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.data(node).text.is_some()
    }

    /// Text of a token, `None` for composite nodes.
    #[must_use]
    pub fn leaf_text(&self, node: NodeId) -> Option<&str> {
        self.data(node).text.as_deref()
    }

    /// Full text covered by the node.
    #[must_use]
    pub fn text(&self, node: NodeId) -> String {
        let mut out = String::with_capacity(self.text_len(node));
        self.write_text(node, &mut out);
        out
    }

    fn write_text(&self, node: NodeId, out: &mut String) {
        let data = self.data(node);
        if let Some(text) = &data.text {
            out.push_str(text);
        }
        for child in &data.children {
            self.write_text(*child, out);
        }
    }

    /// Length in bytes of the text covered by the node.
    #[must_use]
    pub fn text_len(&self, node: NodeId) -> usize {
        let data = self.data(node);
        data.text.as_ref().map_or(0, String::len)
            + data
                .children
                .iter()
                .map(|child| self.text_len(*child))
                .sum::<usize>()
    }

    /// Serialize the whole tree back to source text.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.text(self.root)
    }

    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.data(node).parent
    }

    #[must_use]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.data(node).children
    }

    #[must_use]
    pub fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.children(node).first().copied()
    }

    #[must_use]
    pub fn last_child(&self, node: NodeId) -> Option<NodeId> {
        self.children(node).last().copied()
    }

    /// Index of the node in its parent's child list.
    #[must_use]
    pub fn child_index(&self, node: NodeId) -> Option<usize> {
        let parent = self.parent(node)?;
        self.children(parent).iter().position(|c| *c == node)
    }

    #[must_use]
    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let index = self.child_index(node)?;
        self.children(parent).get(index + 1).copied()
    }

    #[must_use]
    pub fn prev_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let index = self.child_index(node)?;
        index
            .checked_sub(1)
            .and_then(|i| self.children(parent).get(i).copied())
    }

    /// Next sibling that is neither whitespace nor a comment.
    #[must_use]
    pub fn next_code_sibling(&self, node: NodeId) -> Option<NodeId> {
        let mut current = self.next_sibling(node);
        while let Some(sibling) = current {
            if !self.kind(sibling).is_trivia() {
                return Some(sibling);
            }
            current = self.next_sibling(sibling);
        }
        None
    }

    /// Previous sibling that is neither whitespace nor a comment.
    #[must_use]
    pub fn prev_code_sibling(&self, node: NodeId) -> Option<NodeId> {
        let mut current = self.prev_sibling(node);
        while let Some(sibling) = current {
            if !self.kind(sibling).is_trivia() {
                return Some(sibling);
            }
            current = self.prev_sibling(sibling);
        }
        None
    }

    #[must_use]
    pub fn find_child_by_kind(&self, node: NodeId, kind: SyntaxKind) -> Option<NodeId> {
        self.children(node)
            .iter()
            .copied()
            .find(|c| self.kind(*c) == kind)
    }

    /// Parent chain of the node, nearest first, excluding the node itself.
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(node), move |n| self.parent(*n))
    }

    /// `true` when the node is reachable from the root.
    #[must_use]
    pub fn is_attached(&self, node: NodeId) -> bool {
        node == self.root || self.ancestors(node).any(|a| a == self.root)
    }

    /// Node and all its descendants in depth-first pre-order.
    #[must_use]
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Leaves of the subtree in document order.
    #[must_use]
    pub fn leaves(&self, node: NodeId) -> Vec<NodeId> {
        self.descendants(node)
            .into_iter()
            .filter(|n| self.is_leaf(*n))
            .collect()
    }

    #[must_use]
    pub fn first_leaf(&self, node: NodeId) -> Option<NodeId> {
        if self.is_leaf(node) {
            return Some(node);
        }
        self.children(node)
            .iter()
            .find_map(|child| self.first_leaf(*child))
    }

    #[must_use]
    pub fn last_leaf(&self, node: NodeId) -> Option<NodeId> {
        if self.is_leaf(node) {
            return Some(node);
        }
        self.children(node)
            .iter()
            .rev()
            .find_map(|child| self.last_leaf(*child))
    }

    /// The leaf directly before the node in document order.
    #[must_use]
    pub fn prev_leaf(&self, node: NodeId) -> Option<NodeId> {
        let mut current = node;
        loop {
            if let Some(sibling) = self.prev_sibling(current) {
                if let Some(leaf) = self.last_leaf(sibling) {
                    return Some(leaf);
                }
                current = sibling;
            } else {
                current = self.parent(current)?;
            }
        }
    }

    /// The leaf directly after the node in document order.
    #[must_use]
    pub fn next_leaf(&self, node: NodeId) -> Option<NodeId> {
        let mut current = node;
        loop {
            if let Some(sibling) = self.next_sibling(current) {
                if let Some(leaf) = self.first_leaf(sibling) {
                    return Some(leaf);
                }
                current = sibling;
            } else {
                current = self.parent(current)?;
            }
        }
    }

    #[must_use]
    pub fn prev_code_leaf(&self, node: NodeId) -> Option<NodeId> {
        let mut current = self.prev_leaf(node);
        while let Some(leaf) = current {
            if !self.is_part_of_comment(leaf) && !self.kind(leaf).is_whitespace() {
                return Some(leaf);
            }
            current = self.prev_leaf(leaf);
        }
        None
    }

    #[must_use]
    pub fn next_code_leaf(&self, node: NodeId) -> Option<NodeId> {
        let mut current = self.next_leaf(node);
        while let Some(leaf) = current {
            if !self.is_part_of_comment(leaf) && !self.kind(leaf).is_whitespace() {
                return Some(leaf);
            }
            current = self.next_leaf(leaf);
        }
        None
    }

    /// `true` for comments and anything nested inside one.
    #[must_use]
    pub fn is_part_of_comment(&self, node: NodeId) -> bool {
        self.kind(node).is_comment() || self.ancestors(node).any(|a| self.kind(a).is_comment())
    }

    /// `true` for a whitespace leaf containing a line break.
    #[must_use]
    pub fn is_whitespace_with_newline(&self, node: NodeId) -> bool {
        self.kind(node).is_whitespace() && self.leaf_text(node).is_some_and(|t| t.contains('\n'))
    }

    /// `true` for a whitespace leaf without any line break.
    #[must_use]
    pub fn is_whitespace_without_newline(&self, node: NodeId) -> bool {
        self.kind(node).is_whitespace() && self.leaf_text(node).is_some_and(|t| !t.contains('\n'))
    }

    /// Byte offset of the node's first character.
    ///
    /// For a detached node the offset is relative to the root of its own
    /// detached subtree.
    #[must_use]
    pub fn start_offset(&self, node: NodeId) -> usize {
        let mut offset = 0;
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            for sibling in self.children(parent) {
                if *sibling == current {
                    break;
                }
                offset += self.text_len(*sibling);
            }
            current = parent;
        }
        offset
    }

    /// Line and column of a byte offset in the current text.
    ///
    /// Serializes the whole tree; callers converting many offsets should keep
    /// a [`line_index`](Self::line_index) for as long as
    /// [`revision`](Self::revision) is unchanged.
    #[must_use]
    pub fn line_column(&self, offset: usize) -> LineColumn {
        self.line_index().line_column(offset)
    }

    #[must_use]
    pub fn line_index(&self) -> LineIndex {
        LineIndex::new(self.to_text())
    }

    /// Counter that changes whenever the structure or text of the tree
    /// changes, rolled back edits included.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Indentation of the line the node starts on: the text after the last
    /// line break of the whitespace before it, prefixed with a newline.
    ///
    /// Returns `"\n"` when the node is on the first line.
    #[must_use]
    pub fn indent(&self, node: NodeId) -> String {
        let mut current = self.prev_leaf(node);
        while let Some(leaf) = current {
            if let Some(text) = self.leaf_text(leaf) {
                if let Some(pos) = text.rfind('\n') {
                    let tail = &text[pos + 1..];
                    if self.kind(leaf).is_whitespace() {
                        return format!("\n{tail}");
                    }
                    let indent: String = tail.chars().take_while(|c| c.is_whitespace()).collect();
                    return format!("\n{indent}");
                }
            }
            current = self.prev_leaf(leaf);
        }
        String::from("\n")
    }

    /// Indented dump of the tree for snapshot tests.
    #[must_use]
    pub fn debug_dump(&self) -> String {
        let mut out = String::new();
        self.dump_node(self.root, 0, &mut out);
        out
    }

    fn dump_node(&self, node: NodeId, depth: usize, out: &mut String) {
        use std::fmt::Write;
        let _ = write!(out, "{:indent$}{}", "", self.kind(node), indent = depth * 2);
        if let Some(text) = self.leaf_text(node) {
            let _ = write!(out, " {text:?}");
        }
        out.push('\n');
        for child in self.children(node) {
            self.dump_node(*child, depth + 1, out);
        }
    }
}

impl std::fmt::Display for SyntaxTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_text())
    }
}
