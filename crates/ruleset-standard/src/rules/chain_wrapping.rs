use lintkit_config::IndentConfig;
use lintkit_linter::prelude::*;

/// Chained calls and elvis operators wrap before the operator, other binary
/// operators wrap after it.
///
/// ```text
/// val a = b
///     .c()
///     ?: d
/// val e = f &&
///     g
/// ```
///
/// Spread operators and prefix `+`/`-` may start a line.
#[derive(Debug, Default)]
pub struct ChainWrappingRule {
    indent: IndentConfig,
}

impl ChainWrappingRule {
    pub const ID: &'static str = "standard:chain-wrapping";

    #[must_use]
    pub fn provider() -> RuleProvider {
        RuleProvider::new(Self::ID, Self::default)
            .uses_config_keys(&[ConfigKey::INDENT_SIZE, ConfigKey::INDENT_STYLE])
    }

    /// `.`, `?.` or `?:` at the end of a line moves to the start of the next.
    fn visit_next_line_token(&self, node: NodeId, ctx: &mut VisitContext<'_>) {
        let tree = ctx.tree();
        let Some(newline) = tree
            .next_code_leaf(node)
            .and_then(|leaf| tree.prev_leaf(leaf))
        else {
            return;
        };
        if !tree.is_whitespace_with_newline(newline) || is_elvis_before_comment(tree, node) {
            return;
        }

        let offset = tree.start_offset(node);
        let message = format!("Line must not end with \"{}\"", tree.text(node));
        if tree.kind(node) == SyntaxKind::Elvis {
            let indent = self.indent.child_indent_of(&tree.indent(node));
            ctx.emit_and_fix(offset, message, |tree| {
                tree.upsert_whitespace_before(node, &indent)?;
                tree.upsert_whitespace_after(node, " ")
            });
        } else {
            ctx.emit_and_fix(offset, message, |tree| tree.move_after(node, newline));
        }
    }

    /// Operators at the start of a line move to the end of the previous one.
    fn visit_same_line_token(node: NodeId, ctx: &mut VisitContext<'_>) {
        let tree = ctx.tree();
        if is_part_of_spread(tree, node) || is_in_prefix_position(tree, node) {
            return;
        }
        let Some(prev) = tree
            .prev_leaf(node)
            .filter(|leaf| tree.is_whitespace_with_newline(*leaf))
        else {
            return;
        };

        // Prefer dropping the line break before the operator so the indent
        // of the next line survives.
        let obsolete = match tree.next_leaf(node) {
            Some(next) if tree.is_whitespace_with_newline(next) => Some(prev),
            Some(next) if tree.is_whitespace_without_newline(next) => Some(next),
            _ => None,
        };
        let offset = tree.start_offset(node);
        let message = format!("Line must not begin with \"{}\"", tree.text(node));

        ctx.emit_and_fix(offset, message, |tree| {
            let operation = tree
                .parent(node)
                .filter(|parent| tree.kind(*parent) == SyntaxKind::OperationReference);
            if let Some(operation) = operation {
                let anchor = tree
                    .prev_code_sibling(operation)
                    .and_then(|sibling| tree.next_sibling(sibling))
                    .filter(|sibling| *sibling != operation);
                if let Some(anchor) = anchor {
                    tree.move_before(operation, anchor)?;
                }
                tree.upsert_whitespace_before(operation, " ")?;
            } else if let Some(insertion) = tree.prev_code_leaf(prev) {
                tree.move_after(node, insertion)?;
                tree.upsert_whitespace_after(insertion, " ")?;
            }
            match obsolete {
                Some(whitespace) => tree.detach(whitespace),
                None => Ok(()),
            }
        });
    }
}

impl Rule for ChainWrappingRule {
    fn before_first_node(&mut self, config: &ConfigView) {
        self.indent = config.indent_config();
    }

    fn before_visit_child_nodes(&mut self, node: NodeId, ctx: &mut VisitContext<'_>) {
        let kind = ctx.tree().kind(node);
        let next_line = matches!(
            kind,
            SyntaxKind::Dot | SyntaxKind::SafeAccess | SyntaxKind::Elvis
        );
        let same_line = matches!(
            kind,
            SyntaxKind::Mul
                | SyntaxKind::Div
                | SyntaxKind::Perc
                | SyntaxKind::AndAnd
                | SyntaxKind::OrOr
                | SyntaxKind::Plus
                | SyntaxKind::Minus
        );
        if !(next_line || same_line) || ctx.tree().is_part_of_comment(node) {
            return;
        }

        if next_line {
            self.visit_next_line_token(node, ctx);
        } else {
            Self::visit_same_line_token(node, ctx);
        }
    }
}

/// `?:` followed by a comment or a space on the same line.
fn is_elvis_before_comment(tree: &SyntaxTree, node: NodeId) -> bool {
    tree.kind(node) == SyntaxKind::Elvis
        && tree.next_leaf(node).is_some_and(|next| {
            tree.is_whitespace_without_newline(next) || tree.is_part_of_comment(next)
        })
}

/// `*` spreading an array into arguments, as in `f(*args)`.
fn is_part_of_spread(tree: &SyntaxTree, node: NodeId) -> bool {
    tree.kind(node) == SyntaxKind::Mul
        && tree.prev_code_leaf(node).is_some_and(|leaf| {
            let kind = tree.kind(leaf);
            matches!(
                kind,
                SyntaxKind::LPar | SyntaxKind::Comma | SyntaxKind::LBrace | SyntaxKind::ElseKeyword
            ) || kind.is_operation()
        })
}

/// Unary `+`/`-`, as in `-1`.
fn is_in_prefix_position(tree: &SyntaxTree, node: NodeId) -> bool {
    matches!(tree.kind(node), SyntaxKind::Plus | SyntaxKind::Minus)
        && tree
            .parent(node)
            .and_then(|parent| tree.parent(parent))
            .is_some_and(|grandparent| tree.kind(grandparent) == SyntaxKind::PrefixExpression)
}
