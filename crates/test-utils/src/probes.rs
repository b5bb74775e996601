//! Probe rules for exercising the engine.

use crate::tracking::{events, InvocationLog};
use lintkit_linter::{Rule, RuleProvider, VisitContext};
use lintkit_config::ConfigView;
use lintkit_syntax::{NodeId, SyntaxKind, SyntaxTree, TreeError};

/// Leaf text, or the kind name of a composite node.
#[must_use]
pub fn describe_node(tree: &SyntaxTree, node: NodeId) -> String {
    match tree.leaf_text(node) {
        Some(text) => format!("{text:?}"),
        None => tree.kind(node).to_string(),
    }
}

/// Records every hook call into an [`InvocationLog`].
pub struct RecordingRule {
    rule_id: String,
    log: InvocationLog,
}

impl RecordingRule {
    /// Provider whose factory also records each created instance.
    #[must_use]
    pub fn provider(rule_id: &str, log: &InvocationLog) -> RuleProvider {
        let id = rule_id.to_owned();
        let log = log.clone();
        RuleProvider::new(rule_id, move || {
            log.record(&id, events::CREATED, "");
            RecordingRule {
                rule_id: id.clone(),
                log: log.clone(),
            }
        })
    }
}

impl Rule for RecordingRule {
    fn before_first_node(&mut self, _config: &ConfigView) {
        self.log.record(&self.rule_id, events::BEFORE_FIRST_NODE, "");
    }

    fn before_visit_child_nodes(&mut self, node: NodeId, ctx: &mut VisitContext<'_>) {
        self.log
            .record(&self.rule_id, events::BEFORE_VISIT, describe_node(ctx.tree(), node));
    }

    fn after_visit_child_nodes(&mut self, node: NodeId, ctx: &mut VisitContext<'_>) {
        self.log
            .record(&self.rule_id, events::AFTER_VISIT, describe_node(ctx.tree(), node));
    }

    fn after_last_node(&mut self, _ctx: &mut VisitContext<'_>) {
        self.log.record(&self.rule_id, events::AFTER_LAST_NODE, "");
    }
}

/// Edit applied by a [`KindReporter`] to a reported node.
pub type NodeFix = fn(&mut SyntaxTree, NodeId) -> Result<(), TreeError>;

/// Reports every node of one kind, fixing it when a fix is configured.
#[derive(Clone)]
pub struct KindReporter {
    kind: SyntaxKind,
    message: String,
    fix: Option<NodeFix>,
}

impl KindReporter {
    #[must_use]
    pub fn new(kind: SyntaxKind, message: &str) -> Self {
        Self {
            kind,
            message: message.to_owned(),
            fix: None,
        }
    }

    #[must_use]
    pub fn with_fix(mut self, fix: NodeFix) -> Self {
        self.fix = Some(fix);
        self
    }

    #[must_use]
    pub fn provider(self, rule_id: &str) -> RuleProvider {
        RuleProvider::new(rule_id, move || self.clone())
    }
}

impl Rule for KindReporter {
    fn before_visit_child_nodes(&mut self, node: NodeId, ctx: &mut VisitContext<'_>) {
        if ctx.tree().kind(node) != self.kind {
            return;
        }
        let offset = ctx.tree().start_offset(node);
        match self.fix {
            Some(fix) => {
                ctx.emit_and_fix(offset, self.message.clone(), |tree| fix(tree, node));
            }
            None => {
                let _ = ctx.emit(offset, self.message.clone(), false);
            }
        }
    }
}

/// Panics when it visits a node of the given kind, or at the end of the file.
#[derive(Clone)]
pub struct PanickingRule {
    kind: Option<SyntaxKind>,
    message: &'static str,
    edit_first: bool,
}

impl PanickingRule {
    /// Panic in `before_visit_child_nodes` for nodes of `kind`.
    #[must_use]
    pub fn on(kind: SyntaxKind, message: &'static str) -> Self {
        Self {
            kind: Some(kind),
            message,
            edit_first: false,
        }
    }

    /// Panic in `after_last_node`.
    #[must_use]
    pub fn at_end(message: &'static str) -> Self {
        Self {
            kind: None,
            message,
            edit_first: false,
        }
    }

    /// Report a fixable violation and blank out the first leaf of the node
    /// before panicking.
    #[must_use]
    pub fn after_editing(mut self) -> Self {
        self.edit_first = true;
        self
    }

    #[must_use]
    pub fn provider(self, rule_id: &str) -> RuleProvider {
        RuleProvider::new(rule_id, move || self.clone())
    }
}

impl Rule for PanickingRule {
    fn before_visit_child_nodes(&mut self, node: NodeId, ctx: &mut VisitContext<'_>) {
        if self.kind != Some(ctx.tree().kind(node)) {
            return;
        }
        if self.edit_first {
            let offset = ctx.tree().start_offset(node);
            if let Some(leaf) = ctx.tree().first_leaf(node) {
                ctx.emit_and_fix(offset, "About to fail", |tree| tree.replace_text(leaf, ""));
            }
        }
        panic!("{}", self.message);
    }

    fn after_last_node(&mut self, _ctx: &mut VisitContext<'_>) {
        if self.kind.is_none() {
            panic!("{}", self.message);
        }
    }
}

/// Provider whose factory always fails.
#[must_use]
pub fn failing_provider(rule_id: &str, reason: &'static str) -> RuleProvider {
    RuleProvider::try_new(rule_id, move || Err(reason.to_owned()))
}
