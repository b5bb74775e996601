//! Small trees and engines shared by tests.

use lintkit_linter::{LintEngine, RuleProvider, RuleRegistry};
use lintkit_syntax::{SyntaxKind, SyntaxTree, TreeBuilder};

/// `fun f(a, b)`
#[must_use]
pub fn function_file() -> SyntaxTree {
    let mut b = TreeBuilder::new(SyntaxKind::File);
    b.start_node(SyntaxKind::Fun)
        .token(SyntaxKind::Keyword, "fun")
        .ws(" ")
        .token(SyntaxKind::Identifier, "f")
        .start_node(SyntaxKind::ValueParameterList)
        .token(SyntaxKind::LPar, "(")
        .start_node(SyntaxKind::ValueParameter)
        .token(SyntaxKind::Identifier, "a")
        .finish_node()
        .token(SyntaxKind::Comma, ",")
        .ws(" ")
        .start_node(SyntaxKind::ValueParameter)
        .token(SyntaxKind::Identifier, "b")
        .finish_node()
        .token(SyntaxKind::RPar, ")")
        .finish_node()
        .finish_node();
    b.finish()
}

/// A class with a property and a function:
///
/// ```text
/// class A {
///     val a = 1
///     fun b() = 2
/// }
/// ```
#[must_use]
pub fn class_file() -> SyntaxTree {
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
        .ws("\n    ")
        .start_node(SyntaxKind::Fun)
        .token(SyntaxKind::Keyword, "fun")
        .ws(" ")
        .token(SyntaxKind::Identifier, "b")
        .start_node(SyntaxKind::ValueParameterList)
        .token(SyntaxKind::LPar, "(")
        .token(SyntaxKind::RPar, ")")
        .finish_node()
        .ws(" ")
        .token(SyntaxKind::Eq, "=")
        .ws(" ")
        .token(SyntaxKind::IntegerLiteral, "2")
        .finish_node()
        .ws("\n")
        .token(SyntaxKind::RBrace, "}")
        .finish_node()
        .finish_node()
        .ws("\n");
    b.finish()
}

/// Registry from providers, panicking on invalid ids.
#[must_use]
pub fn registry(providers: Vec<RuleProvider>) -> RuleRegistry {
    RuleRegistry::new(providers).expect("test rule ids must be valid")
}

#[must_use]
pub fn engine(providers: Vec<RuleProvider>) -> LintEngine {
    LintEngine::new(registry(providers))
}
