use crate::{NodeId, SyntaxKind, SyntaxTree};

/// Incremental builder used by parsers (and tests) to produce a [`SyntaxTree`].
///
/// ```rust
/// use lintkit_syntax::{SyntaxKind, TreeBuilder};
///
/// let mut builder = TreeBuilder::new(SyntaxKind::File);
/// builder
///     .start_node(SyntaxKind::Property)
///     .token(SyntaxKind::Keyword, "val")
///     .ws(" ")
///     .token(SyntaxKind::Identifier, "a")
///     .finish_node();
/// let tree = builder.finish();
/// assert_eq!(tree.to_text(), "val a");
/// ```
#[derive(Debug)]
pub struct TreeBuilder {
    tree: SyntaxTree,
    stack: Vec<NodeId>,
}

impl TreeBuilder {
    #[must_use]
    pub fn new(root_kind: SyntaxKind) -> Self {
        let tree = SyntaxTree::new(root_kind);
        let root = tree.root();
        Self {
            tree,
            stack: vec![root],
        }
    }

    fn current(&self) -> NodeId {
        self.stack.last().copied().unwrap_or(self.tree.root())
    }

    fn attach(&mut self, node: NodeId) {
        let parent = self.current();
        self.tree.nodes[parent.index()].children.push(node);
        self.tree.nodes[node.index()].parent = Some(parent);
    }

    /// Open a composite node; following tokens and nodes become its children
    /// until the matching [`finish_node`](Self::finish_node).
    pub fn start_node(&mut self, kind: SyntaxKind) -> &mut Self {
        let node = self.tree.alloc(kind, None);
        self.attach(node);
        self.stack.push(node);
        self
    }

    pub fn token(&mut self, kind: SyntaxKind, text: &str) -> &mut Self {
        let leaf = self.tree.alloc(kind, Some(text.to_owned()));
        self.attach(leaf);
        self
    }

    /// Shorthand for a whitespace token.
    pub fn ws(&mut self, text: &str) -> &mut Self {
        self.token(SyntaxKind::Whitespace, text)
    }

    /// Close the innermost open node. Closing the root is a no-op.
    pub fn finish_node(&mut self) -> &mut Self {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
        self
    }

    /// Id of the innermost open node.
    #[must_use]
    pub fn current_node(&self) -> NodeId {
        self.current()
    }

    /// Close any nodes left open and return the tree.
    #[must_use]
    pub fn finish(self) -> SyntaxTree {
        self.tree
    }
}
