use lintkit_linter::prelude::*;

/// Spacing inside a function's parameter list.
///
/// No whitespace in an empty list, around the parameters on a single line,
/// or before a comma or colon. A single space after a comma, after a colon
/// and between modifiers. A type may move to the next line when it has
/// annotations or would not fit after the colon.
#[derive(Debug, Default)]
pub struct ParameterListSpacingRule {
    max_line_length: Option<usize>,
}

impl ParameterListSpacingRule {
    pub const ID: &'static str = "standard:parameter-list-spacing";

    #[must_use]
    pub fn provider() -> RuleProvider {
        RuleProvider::new(Self::ID, Self::default).uses_config_keys(&[ConfigKey::MAX_LINE_LENGTH])
    }

    fn visit_parameter_list(&self, list: NodeId, ctx: &mut VisitContext<'_>) {
        let tree = ctx.tree();
        let children = tree.children(list).to_vec();
        let total = children
            .iter()
            .filter(|child| tree.kind(**child) == SyntaxKind::ValueParameter)
            .count();
        let no_comments = children.iter().all(|child| !tree.is_part_of_comment(*child));
        let mut seen = 0;

        for child in children {
            match ctx.tree().kind(child) {
                SyntaxKind::Whitespace => {
                    let tree = ctx.tree();
                    let indent = is_indent(tree, child);
                    if total == 0 && no_comments {
                        remove_whitespace(child, ctx);
                    } else if (seen == 0 || seen == total) && !indent {
                        // Comments keep the space in front of them.
                        if no_comments {
                            remove_whitespace(child, ctx);
                        }
                    } else if tree
                        .next_code_sibling(child)
                        .is_some_and(|next| tree.kind(next) == SyntaxKind::Comma)
                    {
                        remove_whitespace(child, ctx);
                    } else if !indent && !is_single_space(tree, child) {
                        replace_with_single_space(child, ctx);
                    }
                }
                SyntaxKind::Comma => {
                    let tree = ctx.tree();
                    let missing = tree.next_leaf(child).is_some_and(|next| {
                        !matches!(tree.kind(next), SyntaxKind::Whitespace | SyntaxKind::RPar)
                    });
                    if missing {
                        add_missing_space_after(child, ctx);
                    }
                }
                SyntaxKind::ValueParameter => {
                    seen += 1;
                    self.visit_parameter(child, ctx);
                }
                _ => {}
            }
        }
    }

    fn visit_parameter(&self, parameter: NodeId, ctx: &mut VisitContext<'_>) {
        if let Some(modifiers) = ctx
            .tree()
            .find_child_by_kind(parameter, SyntaxKind::ModifierList)
        {
            let tree = ctx.tree();
            let mut spaces: Vec<NodeId> = tree
                .children(modifiers)
                .iter()
                .copied()
                .filter(|child| tree.kind(*child).is_whitespace())
                .collect();
            spaces.extend(
                tree.next_sibling(modifiers)
                    .filter(|next| tree.kind(*next).is_whitespace()),
            );
            for space in spaces {
                visit_space_after_modifier(space, ctx);
            }
        }

        let Some(colon) = ctx.tree().find_child_by_kind(parameter, SyntaxKind::Colon) else {
            return;
        };
        let tree = ctx.tree();
        if let Some(before) = tree
            .prev_leaf(colon)
            .filter(|leaf| tree.kind(*leaf).is_whitespace())
        {
            remove_whitespace(before, ctx);
        }

        let tree = ctx.tree();
        let Some(after) = tree
            .next_leaf(colon)
            .filter(|leaf| tree.kind(*leaf).is_whitespace())
        else {
            add_missing_space_after(colon, ctx);
            return;
        };
        if is_indent(tree, after)
            && (has_annotated_type(tree, parameter) || !self.type_fits_after_colon(tree, after))
        {
            return;
        }
        if !is_single_space(tree, after) {
            replace_with_single_space(after, ctx);
        }
    }

    /// Whether the type following the line break `whitespace` would fit on
    /// the line of the colon.
    fn type_fits_after_colon(&self, tree: &SyntaxTree, whitespace: NodeId) -> bool {
        let Some(max_line_length) = self.max_line_length else {
            return true;
        };
        let Some(type_reference) = tree
            .next_code_sibling(whitespace)
            .filter(|next| tree.kind(*next) == SyntaxKind::TypeReference)
        else {
            return true;
        };

        let Some(type_leaf) = tree.first_leaf(type_reference) else {
            return true;
        };

        let text = tree.to_text();
        let whitespace_start = tree.start_offset(whitespace);
        let line_start = text[..whitespace_start].rfind('\n').map_or(0, |pos| pos + 1);

        let length = text[line_start..whitespace_start].chars().count()
            + 1
            + line_width_from(tree, type_leaf);
        length <= max_line_length
    }
}

impl Rule for ParameterListSpacingRule {
    fn before_first_node(&mut self, config: &ConfigView) {
        self.max_line_length = config.max_line_length();
    }

    fn before_visit_child_nodes(&mut self, node: NodeId, ctx: &mut VisitContext<'_>) {
        if ctx.tree().kind(node) == SyntaxKind::ValueParameterList {
            self.visit_parameter_list(node, ctx);
        }
    }
}

/// Width of the rest of the line starting at `leaf`, without a trailing
/// end-of-line comment and the whitespace in front of it.
fn line_width_from(tree: &SyntaxTree, leaf: NodeId) -> usize {
    let mut widths: Vec<(SyntaxKind, usize)> = Vec::new();
    let mut current = Some(leaf);
    while let Some(leaf) = current {
        let text = tree.leaf_text(leaf).unwrap_or_default();
        if let Some((head, _)) = text.split_once('\n') {
            widths.push((tree.kind(leaf), head.chars().count()));
            break;
        }
        widths.push((tree.kind(leaf), text.chars().count()));
        current = tree.next_leaf(leaf);
    }

    while widths
        .last()
        .is_some_and(|(kind, width)| kind.is_whitespace() && *width == 0)
    {
        widths.pop();
    }
    if widths.last().is_some_and(|(kind, _)| *kind == SyntaxKind::EolComment) {
        widths.pop();
        if widths.last().is_some_and(|(kind, _)| kind.is_whitespace()) {
            widths.pop();
        }
    }
    widths.iter().map(|(_, width)| width).sum()
}

fn is_indent(tree: &SyntaxTree, whitespace: NodeId) -> bool {
    tree.is_whitespace_with_newline(whitespace)
}

fn is_single_space(tree: &SyntaxTree, whitespace: NodeId) -> bool {
    tree.leaf_text(whitespace) == Some(" ")
}

fn visit_space_after_modifier(space: NodeId, ctx: &mut VisitContext<'_>) {
    let tree = ctx.tree();
    // An annotation may sit on its own line.
    let annotation_line = is_indent(tree, space)
        && preceding_modifier(tree, space)
            .is_some_and(|modifier| tree.kind(modifier) == SyntaxKind::AnnotationEntry);
    if !annotation_line && !is_single_space(tree, space) {
        replace_with_single_space(space, ctx);
    }
}

fn preceding_modifier(tree: &SyntaxTree, space: NodeId) -> Option<NodeId> {
    let prev = tree.prev_code_sibling(space)?;
    if tree.kind(prev) == SyntaxKind::ModifierList {
        tree.last_child(prev)
    } else {
        Some(prev)
    }
}

fn has_annotated_type(tree: &SyntaxTree, parameter: NodeId) -> bool {
    tree.find_child_by_kind(parameter, SyntaxKind::TypeReference)
        .and_then(|type_reference| tree.find_child_by_kind(type_reference, SyntaxKind::ModifierList))
        .is_some()
}

fn remove_whitespace(whitespace: NodeId, ctx: &mut VisitContext<'_>) {
    let offset = ctx.tree().start_offset(whitespace);
    ctx.emit_and_fix(offset, "Unexpected whitespace", |tree| tree.detach(whitespace));
}

fn replace_with_single_space(whitespace: NodeId, ctx: &mut VisitContext<'_>) {
    let offset = ctx.tree().start_offset(whitespace);
    ctx.emit_and_fix(offset, "Expected a single space", |tree| {
        tree.replace_text(whitespace, " ")
    });
}

fn add_missing_space_after(token: NodeId, ctx: &mut VisitContext<'_>) {
    let offset = ctx.tree().start_offset(token);
    let message = format!("Whitespace after '{}' is missing", ctx.tree().text(token));
    ctx.emit_and_fix(offset, message, |tree| tree.upsert_whitespace_after(token, " "));
}
