//! # Syntax Tree
//!
//! The mutable tree rules operate on. Parsers produce it through
//! [`TreeBuilder`]; rules read it through the navigation methods on
//! [`SyntaxTree`] and change it through journaled edits.
//!
//! ## Transactions
//!
//! Edits made between [`SyntaxTree::begin`] and [`SyntaxTree::commit`] can be
//! undone with [`SyntaxTree::rollback`]. The engine wraps every rule hook and
//! every autocorrect fix in a transaction so that a failing rule never leaves
//! a half-applied edit behind.
//!
//! ```rust
//! use lintkit_syntax::{SyntaxKind, TreeBuilder};
//!
//! let mut builder = TreeBuilder::new(SyntaxKind::File);
//! builder.token(SyntaxKind::Identifier, "a").ws("  ");
//! let mut tree = builder.finish();
//!
//! let checkpoint = tree.begin();
//! let ws = tree.children(tree.root())[1];
//! tree.replace_text(ws, " ").unwrap();
//! tree.rollback(checkpoint);
//! assert_eq!(tree.to_text(), "a  ");
//! ```

mod builder;
mod edit;
mod kind;
mod tree;

pub use builder::TreeBuilder;
pub use edit::{Checkpoint, TreeError};
pub use kind::SyntaxKind;
pub use tree::{NodeId, SyntaxTree};

#[cfg(test)]
mod tests {
    use super::*;

    /// `class A {\n    val a = 1\n}`
    fn class_tree() -> SyntaxTree {
        let mut b = TreeBuilder::new(SyntaxKind::File);
        b.start_node(SyntaxKind::Class)
            .token(SyntaxKind::Keyword, "class")
            .ws(" ")
            .token(SyntaxKind::Identifier, "A")
            .ws(" ")
            .start_node(SyntaxKind::ClassBody)
            .token(SyntaxKind::LBrace, "{")
            .ws("\n    ")
            .start_node(SyntaxKind::Property)
            .token(SyntaxKind::Keyword, "val")
            .ws(" ")
            .token(SyntaxKind::Identifier, "a")
            .ws(" ")
            .token(SyntaxKind::Eq, "=")
            .ws(" ")
            .token(SyntaxKind::IntegerLiteral, "1")
            .finish_node()
            .ws("\n")
            .token(SyntaxKind::RBrace, "}")
            .finish_node()
            .finish_node();
        b.finish()
    }

    fn find(tree: &SyntaxTree, kind: SyntaxKind) -> NodeId {
        tree.descendants(tree.root())
            .into_iter()
            .find(|n| tree.kind(*n) == kind)
            .unwrap()
    }

    #[test]
    fn test_builder_round_trips_text() {
        let tree = class_tree();
        assert_eq!(tree.to_text(), "class A {\n    val a = 1\n}");
        assert_eq!(tree.text_len(tree.root()), tree.to_text().len());
    }

    #[test]
    fn test_debug_dump() {
        let mut b = TreeBuilder::new(SyntaxKind::File);
        b.start_node(SyntaxKind::Property)
            .token(SyntaxKind::Keyword, "val")
            .ws(" ")
            .token(SyntaxKind::Identifier, "x")
            .finish_node();
        let tree = b.finish();
        insta::assert_snapshot!(tree.debug_dump(), @r#"
        FILE
          PROPERTY
            KEYWORD "val"
            WHITE_SPACE " "
            IDENTIFIER "x"
        "#);
    }

    #[test]
    fn test_navigation() {
        let tree = class_tree();
        let property = find(&tree, SyntaxKind::Property);
        let body = tree.parent(property).unwrap();
        assert_eq!(tree.kind(body), SyntaxKind::ClassBody);

        let prev = tree.prev_leaf(property).unwrap();
        assert!(tree.is_whitespace_with_newline(prev));
        let lbrace = tree.prev_code_leaf(property).unwrap();
        assert_eq!(tree.kind(lbrace), SyntaxKind::LBrace);
        let rbrace = tree.next_code_sibling(property).unwrap();
        assert_eq!(tree.kind(rbrace), SyntaxKind::RBrace);

        assert_eq!(tree.start_offset(property), 14);
        assert_eq!(tree.text(property), "val a = 1");
        assert_eq!(tree.indent(property), "\n    ");
        assert_eq!(tree.indent(body), "\n");
        assert_eq!(
            tree.ancestors(property).map(|a| tree.kind(a)).collect::<Vec<_>>(),
            vec![SyntaxKind::ClassBody, SyntaxKind::Class, SyntaxKind::File]
        );
    }

    #[test]
    fn test_line_column_uses_live_text() {
        let mut tree = class_tree();
        let property = find(&tree, SyntaxKind::Property);
        let offset = tree.start_offset(property);
        assert_eq!(tree.line_column(offset).to_string(), "2:5");

        let ws = tree.prev_leaf(property).unwrap();
        tree.replace_text(ws, " ").unwrap();
        let offset = tree.start_offset(property);
        assert_eq!(tree.line_column(offset).to_string(), "1:11");
    }

    #[test]
    fn test_detach_and_reattach() {
        let mut tree = class_tree();
        let property = find(&tree, SyntaxKind::Property);
        tree.detach(property).unwrap();
        assert!(!tree.is_attached(property));
        assert_eq!(tree.to_text(), "class A {\n    \n}");

        let rbrace = find(&tree, SyntaxKind::RBrace);
        tree.insert_before(rbrace, property).unwrap();
        assert!(tree.is_attached(property));
        assert_eq!(tree.to_text(), "class A {\n    \nval a = 1}");
    }

    #[test]
    fn test_insert_rejects_invalid_targets() {
        let mut tree = class_tree();
        let property = find(&tree, SyntaxKind::Property);
        let class = find(&tree, SyntaxKind::Class);
        let lbrace = find(&tree, SyntaxKind::LBrace);

        assert_eq!(
            tree.append_child(lbrace, property),
            Err(TreeError::LeafHasNoChildren(lbrace))
        );
        assert_eq!(
            tree.append_child(tree.root(), property),
            Err(TreeError::AlreadyAttached(property))
        );

        tree.detach(class).unwrap();
        assert_eq!(
            tree.append_child(property, class),
            Err(TreeError::WouldCreateCycle {
                parent: property,
                child: class
            })
        );
        let detached = tree.new_node(SyntaxKind::Block);
        assert_eq!(
            tree.insert_child(tree.root(), 3, detached),
            Err(TreeError::IndexOutOfBounds {
                parent: tree.root(),
                index: 3,
                len: 0
            })
        );
        assert_eq!(tree.detach(detached), Err(TreeError::NoParent(detached)));
    }

    #[test]
    fn test_rollback_restores_structure_and_text() {
        let mut tree = class_tree();
        let before = tree.debug_dump();
        let property = find(&tree, SyntaxKind::Property);
        let rbrace = find(&tree, SyntaxKind::RBrace);

        let checkpoint = tree.begin();
        assert!(tree.in_transaction());
        tree.upsert_whitespace_before(property, " ").unwrap();
        tree.move_after(property, rbrace).unwrap();
        let comment = tree.new_leaf(SyntaxKind::EolComment, "// x");
        tree.insert_before(rbrace, comment).unwrap();
        assert_ne!(tree.debug_dump(), before);

        tree.rollback(checkpoint);
        assert!(!tree.in_transaction());
        assert_eq!(tree.debug_dump(), before);
    }

    #[test]
    fn test_revision_moves_on_every_edit() {
        let mut tree = class_tree();
        let property = find(&tree, SyntaxKind::Property);
        let start = tree.revision();
        assert_eq!(tree.line_index().line_count(), 3);

        let checkpoint = tree.begin();
        tree.upsert_whitespace_before(property, "\n\n    ").unwrap();
        let edited = tree.revision();
        assert_ne!(edited, start);
        assert_eq!(tree.line_index().line_count(), 4);

        tree.rollback(checkpoint);
        assert_ne!(tree.revision(), edited);
        assert_eq!(tree.line_index().line_count(), 3);

        let rolled_back = tree.revision();
        let _ = tree.to_text();
        assert_eq!(tree.revision(), rolled_back);
    }

    #[test]
    fn test_nested_rollback_keeps_outer_edits() {
        let mut tree = class_tree();
        let property = find(&tree, SyntaxKind::Property);

        let outer = tree.begin();
        tree.upsert_whitespace_before(property, "\n  ").unwrap();
        let inner = tree.begin();
        tree.upsert_whitespace_before(property, "").unwrap();
        tree.rollback(inner);
        assert!(tree.in_transaction());
        tree.commit(outer);

        assert!(!tree.in_transaction());
        assert_eq!(tree.to_text(), "class A {\n  val a = 1\n}");
    }

    #[test]
    fn test_upsert_whitespace_inserts_when_missing() {
        let mut b = TreeBuilder::new(SyntaxKind::File);
        b.token(SyntaxKind::Identifier, "a")
            .token(SyntaxKind::Comma, ",")
            .token(SyntaxKind::Identifier, "b");
        let mut tree = b.finish();
        let comma = tree.children(tree.root())[1];

        tree.upsert_whitespace_after(comma, " ").unwrap();
        assert_eq!(tree.to_text(), "a, b");
        tree.upsert_whitespace_before(comma, "").unwrap();
        assert_eq!(tree.to_text(), "a, b");
        tree.upsert_whitespace_after(comma, "").unwrap();
        assert_eq!(tree.to_text(), "a,b");
    }

    #[test]
    fn test_replace_text_on_composite_fails() {
        let mut tree = class_tree();
        let class = find(&tree, SyntaxKind::Class);
        assert_eq!(
            tree.replace_text(class, "x"),
            Err(TreeError::NotALeaf(class))
        );
    }
}
