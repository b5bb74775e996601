use lintkit_config::CodeStyle;
use lintkit_linter::prelude::*;

/// Declarations are separated from the code before them by a blank line.
///
/// ```text
/// class A {
///     val a = 1
///
///     fun b() = 2
/// }
/// ```
///
/// The first declaration of a class body, block or lambda body, consecutive
/// properties and local properties are exempt, as are a few places where a
/// declaration is used as an expression.
#[derive(Debug, Default)]
pub struct BlankLineBeforeDeclarationRule;

impl BlankLineBeforeDeclarationRule {
    pub const ID: &'static str = "standard:blank-line-before-declaration";

    #[must_use]
    pub fn provider() -> RuleProvider {
        RuleProvider::new(Self::ID, Self::default).requires_code_style(CodeStyle::KtlintOfficial)
    }
}

impl Rule for BlankLineBeforeDeclarationRule {
    fn before_visit_child_nodes(&mut self, node: NodeId, ctx: &mut VisitContext<'_>) {
        let tree = ctx.tree();
        if !tree.kind(node).is_declaration() || is_exempt(tree, node) {
            return;
        }
        if tree
            .prev_leaf(node)
            .and_then(|leaf| tree.leaf_text(leaf))
            .is_none_or(|text| text.starts_with("\n\n"))
        {
            return;
        }

        let offset = tree.start_offset(node);
        let whitespace = format!("\n{}", tree.indent(node));
        ctx.emit_and_fix(offset, "Expected a blank line for this declaration", |tree| {
            tree.upsert_whitespace_before(node, &whitespace)
        });
    }
}

fn is_exempt(tree: &SyntaxTree, node: NodeId) -> bool {
    let kind = tree.kind(node);
    let parent_kind = tree.parent(node).map(|parent| tree.kind(parent));
    let prev_code_kind = tree
        .prev_code_sibling(node)
        .map(|sibling| tree.kind(sibling));

    is_first_code_sibling_after_brace(tree, node)
        || is_first_code_sibling_in_lambda(tree, node)
        || is_consecutive_property(tree, node)
        || (is_property_related(kind) && parent_kind == Some(SyntaxKind::Block))
        // when (val x = f()) { ... }
        || (kind == SyntaxKind::Property && parent_kind == Some(SyntaxKind::When))
        // val f = fun() = 1
        || (kind == SyntaxKind::Fun
            && matches!(
                prev_code_kind,
                Some(SyntaxKind::Eq | SyntaxKind::ReturnKeyword)
            ))
        || (kind == SyntaxKind::Fun && parent_kind == Some(SyntaxKind::ValueArgument))
        || (kind == SyntaxKind::ObjectDeclaration
            && parent_kind == Some(SyntaxKind::ObjectLiteral))
}

/// First code after the `{` of a class body or block.
fn is_first_code_sibling_after_brace(tree: &SyntaxTree, node: NodeId) -> bool {
    tree.parent(node)
        .filter(|parent| matches!(tree.kind(*parent), SyntaxKind::ClassBody | SyntaxKind::Block))
        .and_then(|parent| tree.find_child_by_kind(parent, SyntaxKind::LBrace))
        .and_then(|brace| tree.next_code_sibling(brace))
        == Some(node)
}

fn is_first_code_sibling_in_lambda(tree: &SyntaxTree, node: NodeId) -> bool {
    let Some(block) = tree.parent(node) else {
        return false;
    };
    let in_lambda = tree.kind(block) == SyntaxKind::Block
        && tree
            .parent(block)
            .is_some_and(|parent| tree.kind(parent) == SyntaxKind::FunctionLiteral);
    in_lambda
        && tree
            .children(block)
            .iter()
            .find(|child| !tree.kind(**child).is_trivia())
            == Some(&node)
}

fn is_consecutive_property(tree: &SyntaxTree, node: NodeId) -> bool {
    if !is_property_related(tree.kind(node)) {
        return false;
    }
    tree.prev_code_sibling(node).is_some_and(|prev| {
        is_property_related(tree.kind(prev))
            || tree
                .parent(prev)
                .is_some_and(|parent| is_property_related(tree.kind(parent)))
    })
}

fn is_property_related(kind: SyntaxKind) -> bool {
    matches!(kind, SyntaxKind::Property | SyntaxKind::PropertyAccessor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lintkit_config::ConfigSnapshot;
    use lintkit_linter::AutocorrectAll;
    use lintkit_syntax::TreeBuilder;
    use lintkit_test_utils::{class_file, engine, format_violations};

    /// `fun <name>() = <value>`
    fn expression_fun(b: &mut TreeBuilder, name: &str, value: &str) {
        b.start_node(SyntaxKind::Fun)
            .token(SyntaxKind::Keyword, "fun")
            .ws(" ")
            .token(SyntaxKind::Identifier, name)
            .start_node(SyntaxKind::ValueParameterList)
            .token(SyntaxKind::LPar, "(")
            .token(SyntaxKind::RPar, ")")
            .finish_node()
            .ws(" ")
            .token(SyntaxKind::Eq, "=")
            .ws(" ")
            .token(SyntaxKind::IntegerLiteral, value)
            .finish_node();
    }

    /// `val <name> = <value>`
    fn property(b: &mut TreeBuilder, name: &str, value: &str) {
        b.start_node(SyntaxKind::Property)
            .token(SyntaxKind::Keyword, "val")
            .ws(" ")
            .token(SyntaxKind::Identifier, name)
            .ws(" ")
            .token(SyntaxKind::Eq, "=")
            .ws(" ")
            .token(SyntaxKind::IntegerLiteral, value)
            .finish_node();
    }

    fn two_functions() -> SyntaxTree {
        let mut b = TreeBuilder::new(SyntaxKind::File);
        expression_fun(&mut b, "a", "1");
        b.ws("\n");
        expression_fun(&mut b, "b", "2");
        b.finish()
    }

    fn lint(tree: &mut SyntaxTree, config: &ConfigSnapshot) -> String {
        let engine = engine(vec![BlankLineBeforeDeclarationRule::provider()]);
        let outcome = engine.lint(tree, config).unwrap();
        format_violations(&outcome.violations)
    }

    #[test]
    fn test_function_after_property_in_class_body() {
        let engine = engine(vec![BlankLineBeforeDeclarationRule::provider()]);
        let mut tree = class_file();

        let outcome = engine
            .format(&mut tree, &ConfigSnapshot::default(), &AutocorrectAll)
            .unwrap();

        insta::assert_snapshot!(format_violations(&outcome.violations), @"[1] 3:5 Expected a blank line for this declaration (standard:blank-line-before-declaration) [corrected]");
        assert_eq!(
            outcome.text.as_deref(),
            Some("class A {\n    val a = 1\n\n    fun b() = 2\n}\n")
        );
        assert_eq!(outcome.passes, 2);
    }

    #[test]
    fn test_top_level_functions() {
        let engine = engine(vec![BlankLineBeforeDeclarationRule::provider()]);
        let mut tree = two_functions();

        let outcome = engine
            .format(&mut tree, &ConfigSnapshot::default(), &AutocorrectAll)
            .unwrap();

        assert_eq!(outcome.violations.len(), 1);
        assert_eq!(outcome.violations[0].offset, 12);
        assert_eq!(outcome.text.as_deref(), Some("fun a() = 1\n\nfun b() = 2"));
    }

    #[test]
    fn test_consecutive_properties_allowed() {
        let mut b = TreeBuilder::new(SyntaxKind::File);
        property(&mut b, "a", "1");
        b.ws("\n");
        property(&mut b, "b", "2");
        let mut tree = b.finish();

        assert_eq!(lint(&mut tree, &ConfigSnapshot::default()), "(no violations)");
    }

    #[test]
    fn test_local_property_allowed() {
        // fun f() {
        //     g()
        //     val x = 1
        // }
        let mut b = TreeBuilder::new(SyntaxKind::File);
        b.start_node(SyntaxKind::Fun)
            .token(SyntaxKind::Keyword, "fun")
            .ws(" ")
            .token(SyntaxKind::Identifier, "f")
            .start_node(SyntaxKind::ValueParameterList)
            .token(SyntaxKind::LPar, "(")
            .token(SyntaxKind::RPar, ")")
            .finish_node()
            .ws(" ")
            .start_node(SyntaxKind::Block)
            .token(SyntaxKind::LBrace, "{")
            .ws("\n    ")
            .start_node(SyntaxKind::CallExpression)
            .token(SyntaxKind::Identifier, "g")
            .start_node(SyntaxKind::ValueArgumentList)
            .token(SyntaxKind::LPar, "(")
            .token(SyntaxKind::RPar, ")")
            .finish_node()
            .finish_node()
            .ws("\n    ");
        property(&mut b, "x", "1");
        b.ws("\n").token(SyntaxKind::RBrace, "}").finish_node().finish_node();
        let mut tree = b.finish();

        assert_eq!(lint(&mut tree, &ConfigSnapshot::default()), "(no violations)");
    }

    #[test]
    fn test_function_as_property_initializer_allowed() {
        // val f =
        //     fun g() = 1
        let mut b = TreeBuilder::new(SyntaxKind::File);
        b.start_node(SyntaxKind::Property)
            .token(SyntaxKind::Keyword, "val")
            .ws(" ")
            .token(SyntaxKind::Identifier, "f")
            .ws(" ")
            .token(SyntaxKind::Eq, "=")
            .ws("\n    ");
        expression_fun(&mut b, "g", "1");
        b.finish_node();
        let mut tree = b.finish();

        assert_eq!(lint(&mut tree, &ConfigSnapshot::default()), "(no violations)");
    }

    #[test]
    fn test_first_declaration_in_lambda_allowed() {
        // val f = {
        //     fun g() = 1
        // }
        let mut b = TreeBuilder::new(SyntaxKind::File);
        b.start_node(SyntaxKind::Property)
            .token(SyntaxKind::Keyword, "val")
            .ws(" ")
            .token(SyntaxKind::Identifier, "f")
            .ws(" ")
            .token(SyntaxKind::Eq, "=")
            .ws(" ")
            .start_node(SyntaxKind::FunctionLiteral)
            .token(SyntaxKind::LBrace, "{")
            .ws("\n    ")
            .start_node(SyntaxKind::Block);
        expression_fun(&mut b, "g", "1");
        b.finish_node()
            .ws("\n")
            .token(SyntaxKind::RBrace, "}")
            .finish_node()
            .finish_node();
        let mut tree = b.finish();

        assert_eq!(lint(&mut tree, &ConfigSnapshot::default()), "(no violations)");
    }

    #[test]
    fn test_inactive_for_other_code_styles() {
        let config = ConfigSnapshot::default().with_code_style(CodeStyle::IntellijIdea);
        let mut tree = two_functions();

        assert_eq!(lint(&mut tree, &config), "(no violations)");
    }
}
