//! In-place structural edits and the undo journal behind tree transactions.
//!
//! Every edit made while a transaction is open is recorded so that the
//! transaction can be rolled back. Transactions nest; the journal is cleared
//! once the outermost transaction ends.

use crate::{NodeId, SyntaxKind, SyntaxTree};
use thiserror::Error;

/// Errors raised by structural edits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("node {0} is a token and cannot have children")]
    LeafHasNoChildren(NodeId),

    #[error("node {0} is not a token")]
    NotALeaf(NodeId),

    #[error("node {0} is already attached to a parent")]
    AlreadyAttached(NodeId),

    #[error("node {0} has no parent")]
    NoParent(NodeId),

    #[error("index {index} is out of bounds for node {parent} with {len} children")]
    IndexOutOfBounds {
        parent: NodeId,
        index: usize,
        len: usize,
    },

    #[error("attaching {child} under {parent} would make the node its own ancestor")]
    WouldCreateCycle { parent: NodeId, child: NodeId },
}

#[derive(Debug, Clone)]
enum Undo {
    /// `child` was inserted at `index` of `parent`
    Attached { parent: NodeId, index: usize },
    /// `child` was removed from `index` of `parent`
    Detached {
        parent: NodeId,
        index: usize,
        child: NodeId,
    },
    TextReplaced { leaf: NodeId, previous: String },
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Journal {
    entries: Vec<Undo>,
    /// Journal length at the start of each open transaction
    open: Vec<usize>,
}

impl Journal {
    fn record(&mut self, undo: Undo) {
        if !self.open.is_empty() {
            self.entries.push(undo);
        }
    }
}

/// Marker returned by [`SyntaxTree::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a checkpoint must be committed or rolled back"]
pub struct Checkpoint {
    depth: usize,
    mark: usize,
}

impl SyntaxTree {
    /// Open a transaction. Edits from here on can be undone with
    /// [`rollback`](Self::rollback).
    pub fn begin(&mut self) -> Checkpoint {
        let checkpoint = Checkpoint {
            depth: self.journal.open.len(),
            mark: self.journal.entries.len(),
        };
        self.journal.open.push(checkpoint.mark);
        checkpoint
    }

    /// Keep every edit made since `checkpoint`.
    pub fn commit(&mut self, checkpoint: Checkpoint) {
        self.journal.open.truncate(checkpoint.depth);
        if self.journal.open.is_empty() {
            self.journal.entries.clear();
        }
    }

    /// Undo every edit made since `checkpoint`, restoring the exact previous
    /// structure and text.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        let undone = self.journal.entries.len().saturating_sub(checkpoint.mark);
        while self.journal.entries.len() > checkpoint.mark {
            let Some(entry) = self.journal.entries.pop() else {
                break;
            };
            match entry {
                Undo::Attached { parent, index } => {
                    self.raw_remove(parent, index);
                }
                Undo::Detached {
                    parent,
                    index,
                    child,
                } => self.raw_insert(parent, index, child),
                Undo::TextReplaced { leaf, previous } => {
                    self.nodes[leaf.index()].text = Some(previous);
                    self.revision += 1;
                }
            }
        }
        if undone > 0 {
            tracing::trace!(undone, "Rolled back tree edits");
        }
        self.journal.open.truncate(checkpoint.depth);
        if self.journal.open.is_empty() {
            self.journal.entries.clear();
        }
    }

    /// `true` while at least one transaction is open.
    #[must_use]
    pub fn in_transaction(&self) -> bool {
        !self.journal.open.is_empty()
    }

    fn raw_insert(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.nodes[parent.index()].children.insert(index, child);
        self.nodes[child.index()].parent = Some(parent);
        self.revision += 1;
    }

    fn raw_remove(&mut self, parent: NodeId, index: usize) -> NodeId {
        let child = self.nodes[parent.index()].children.remove(index);
        self.nodes[child.index()].parent = None;
        self.revision += 1;
        child
    }

    /// Create a detached token.
    pub fn new_leaf(&mut self, kind: SyntaxKind, text: impl Into<String>) -> NodeId {
        self.alloc(kind, Some(text.into()))
    }

    /// Create a detached composite node without children.
    pub fn new_node(&mut self, kind: SyntaxKind) -> NodeId {
        self.alloc(kind, None)
    }

    /// Attach a detached node as the `index`-th child of `parent`.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        index: usize,
        child: NodeId,
    ) -> Result<(), TreeError> {
        if self.is_leaf(parent) {
            return Err(TreeError::LeafHasNoChildren(parent));
        }
        if self.parent(child).is_some() || child == self.root {
            return Err(TreeError::AlreadyAttached(child));
        }
        if parent == child || self.ancestors(parent).any(|a| a == child) {
            return Err(TreeError::WouldCreateCycle { parent, child });
        }
        let len = self.children(parent).len();
        if index > len {
            return Err(TreeError::IndexOutOfBounds { parent, index, len });
        }
        self.raw_insert(parent, index, child);
        self.journal.record(Undo::Attached { parent, index });
        Ok(())
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        let index = self.children(parent).len();
        self.insert_child(parent, index, child)
    }

    /// Attach `new` as the sibling directly before `anchor`.
    pub fn insert_before(&mut self, anchor: NodeId, new: NodeId) -> Result<(), TreeError> {
        let parent = self.parent(anchor).ok_or(TreeError::NoParent(anchor))?;
        let index = self
            .child_index(anchor)
            .ok_or(TreeError::NoParent(anchor))?;
        self.insert_child(parent, index, new)
    }

    /// Attach `new` as the sibling directly after `anchor`.
    pub fn insert_after(&mut self, anchor: NodeId, new: NodeId) -> Result<(), TreeError> {
        let parent = self.parent(anchor).ok_or(TreeError::NoParent(anchor))?;
        let index = self
            .child_index(anchor)
            .ok_or(TreeError::NoParent(anchor))?;
        self.insert_child(parent, index + 1, new)
    }

    /// Remove the node (and its subtree) from its parent. The node stays
    /// valid and can be attached elsewhere.
    pub fn detach(&mut self, node: NodeId) -> Result<(), TreeError> {
        let parent = self.parent(node).ok_or(TreeError::NoParent(node))?;
        let index = self.child_index(node).ok_or(TreeError::NoParent(node))?;
        self.raw_remove(parent, index);
        self.journal.record(Undo::Detached {
            parent,
            index,
            child: node,
        });
        Ok(())
    }

    /// Put `new` in the place of `old`, detaching `old`.
    pub fn replace(&mut self, old: NodeId, new: NodeId) -> Result<(), TreeError> {
        self.insert_before(old, new)?;
        self.detach(old)
    }

    /// Move an attached node so that it directly follows `anchor`.
    pub fn move_after(&mut self, node: NodeId, anchor: NodeId) -> Result<(), TreeError> {
        self.detach(node)?;
        self.insert_after(anchor, node)
    }

    /// Move an attached node so that it directly precedes `anchor`.
    pub fn move_before(&mut self, node: NodeId, anchor: NodeId) -> Result<(), TreeError> {
        self.detach(node)?;
        self.insert_before(anchor, node)
    }

    /// Change the text of a token.
    pub fn replace_text(&mut self, leaf: NodeId, text: impl Into<String>) -> Result<(), TreeError> {
        let slot = &mut self.nodes[leaf.index()].text;
        let Some(current) = slot.as_mut() else {
            return Err(TreeError::NotALeaf(leaf));
        };
        let previous = std::mem::replace(current, text.into());
        self.revision += 1;
        self.journal.record(Undo::TextReplaced { leaf, previous });
        Ok(())
    }

    /// Make sure the whitespace directly before `node` is `text`.
    ///
    /// An existing whitespace leaf is rewritten (or removed when `text` is
    /// empty); otherwise a new whitespace leaf is inserted as the previous
    /// sibling of `node`.
    pub fn upsert_whitespace_before(&mut self, node: NodeId, text: &str) -> Result<(), TreeError> {
        match self.prev_leaf(node) {
            Some(prev) if self.kind(prev).is_whitespace() => {
                if text.is_empty() {
                    self.detach(prev)
                } else {
                    self.replace_text(prev, text)
                }
            }
            _ if text.is_empty() => Ok(()),
            _ => {
                let whitespace = self.new_leaf(SyntaxKind::Whitespace, text);
                self.insert_before(node, whitespace)
            }
        }
    }

    /// Make sure the whitespace directly after `node` is `text`.
    pub fn upsert_whitespace_after(&mut self, node: NodeId, text: &str) -> Result<(), TreeError> {
        match self.next_leaf(node) {
            Some(next) if self.kind(next).is_whitespace() => {
                if text.is_empty() {
                    self.detach(next)
                } else {
                    self.replace_text(next, text)
                }
            }
            _ if text.is_empty() => Ok(()),
            _ => {
                let whitespace = self.new_leaf(SyntaxKind::Whitespace, text);
                self.insert_after(node, whitespace)
            }
        }
    }
}
