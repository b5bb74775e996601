use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use lintkit_config::ConfigSnapshot;
use lintkit_linter::{
    sort_rule_providers, AutocorrectAll, LintEngine, Rule, RuleProvider, RuleRegistry,
    RunAfterMode,
};
use lintkit_ruleset_standard::StandardRuleSetProvider;
use lintkit_syntax::{SyntaxKind, SyntaxTree, TreeBuilder};
use std::collections::BTreeSet;
use std::hint::black_box;
use std::sync::Arc;

const RULE_COUNT: usize = 200;
const MEMBER_COUNT: usize = 500;

struct Noop;
impl Rule for Noop {}

/// Rules where every fifth rule runs after its predecessor and every
/// fiftieth runs as late as possible.
fn constrained_providers() -> Vec<Arc<RuleProvider>> {
    (0..RULE_COUNT)
        .map(|i| {
            let mut provider = RuleProvider::new(&format!("bench:rule-{i:03}"), || Noop);
            if i % 5 == 4 {
                provider = provider.run_after(
                    &format!("bench:rule-{:03}", i - 1),
                    RunAfterMode::Regardless,
                );
            }
            if i % 50 == 49 {
                provider = provider.run_as_late_as_possible();
            }
            Arc::new(provider)
        })
        .collect()
}

/// A class body with alternating properties and functions, none of them
/// separated by blank lines and every parameter list badly spaced.
fn large_class() -> SyntaxTree {
    let mut b = TreeBuilder::new(SyntaxKind::File);
    b.start_node(SyntaxKind::Class)
        .token(SyntaxKind::Keyword, "class")
        .ws(" ")
        .token(SyntaxKind::Identifier, "Large")
        .ws(" ")
        .start_node(SyntaxKind::ClassBody)
        .token(SyntaxKind::LBrace, "{");
    for i in 0..MEMBER_COUNT {
        b.ws("\n    ");
        if i % 2 == 0 {
            b.start_node(SyntaxKind::Property)
                .token(SyntaxKind::Keyword, "val")
                .ws(" ")
                .token(SyntaxKind::Identifier, &format!("p{i}"))
                .ws(" ")
                .token(SyntaxKind::Eq, "=")
                .ws(" ")
                .token(SyntaxKind::IntegerLiteral, "1")
                .finish_node();
        } else {
            b.start_node(SyntaxKind::Fun)
                .token(SyntaxKind::Keyword, "fun")
                .ws(" ")
                .token(SyntaxKind::Identifier, &format!("f{i}"))
                .start_node(SyntaxKind::ValueParameterList)
                .token(SyntaxKind::LPar, "(")
                .ws(" ")
                .start_node(SyntaxKind::ValueParameter)
                .token(SyntaxKind::Identifier, "a")
                .token(SyntaxKind::Colon, ":")
                .start_node(SyntaxKind::TypeReference)
                .token(SyntaxKind::Identifier, "Int")
                .finish_node()
                .finish_node()
                .token(SyntaxKind::RPar, ")")
                .finish_node()
                .finish_node();
        }
    }
    b.ws("\n").token(SyntaxKind::RBrace, "}").finish_node().finish_node();
    b.finish()
}

fn standard_engine() -> LintEngine {
    let registry = RuleRegistry::from_rule_sets(&[&StandardRuleSetProvider])
        .expect("standard rule ids are valid");
    LintEngine::new(registry)
}

fn bench_sort_rule_providers(c: &mut Criterion) {
    let providers = constrained_providers();
    let disabled = BTreeSet::new();
    c.bench_function("sort_rule_providers", |b| {
        b.iter(|| black_box(sort_rule_providers(&providers, &disabled)));
    });
}

fn bench_execution_order_cold(c: &mut Criterion) {
    let registry = Arc::new(
        RuleRegistry::new(constrained_providers().into_iter().map(Arc::unwrap_or_clone))
            .expect("bench rule ids are valid"),
    );
    let config = ConfigSnapshot::default();
    c.bench_function("execution_order_cold", |b| {
        b.iter_batched(
            || LintEngine::with_cache(Arc::clone(&registry), Arc::default()),
            |engine| black_box(engine.execution_order(&config)),
            BatchSize::SmallInput,
        );
    });
}

fn bench_execution_order_warm(c: &mut Criterion) {
    let registry = RuleRegistry::new(constrained_providers().into_iter().map(Arc::unwrap_or_clone))
        .expect("bench rule ids are valid");
    let engine = LintEngine::new(registry);
    let config = ConfigSnapshot::default();
    let _ = engine.execution_order(&config);
    c.bench_function("execution_order_warm", |b| {
        b.iter(|| black_box(engine.execution_order(&config)));
    });
}

fn bench_lint_large_class(c: &mut Criterion) {
    let engine = standard_engine();
    let config = ConfigSnapshot::default();
    c.bench_function("lint_large_class", |b| {
        b.iter_batched(
            large_class,
            |mut tree| black_box(engine.lint(&mut tree, &config)),
            BatchSize::LargeInput,
        );
    });
}

fn bench_format_large_class(c: &mut Criterion) {
    let engine = standard_engine();
    let config = ConfigSnapshot::default();
    c.bench_function("format_large_class", |b| {
        b.iter_batched(
            large_class,
            |mut tree| black_box(engine.format(&mut tree, &config, &AutocorrectAll)),
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(
    benches,
    bench_sort_rule_providers,
    bench_execution_order_cold,
    bench_execution_order_warm,
    bench_lint_large_class,
    bench_format_large_class,
);
criterion_main!(benches);
