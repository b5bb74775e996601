//! Invocation tracking for testing traversal behavior.
//!
//! Probe rules record every hook call into a shared [`InvocationLog`]. Tests
//! take a checkpoint, run the engine and then look at what was called since.
//!
//! ## Usage
//!
//! ```ignore
//! use lintkit_test_utils::tracking::{events, InvocationLog};
//!
//! let log = InvocationLog::new();
//! let checkpoint = log.checkpoint();
//! engine.lint(&mut tree, &config)?;
//! assert_eq!(log.count_since("test:recorder", events::AFTER_LAST_NODE, checkpoint), 1);
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Event names used by the probe rules, to prevent typos in assertions.
pub mod events {
    pub const CREATED: &str = "created";
    pub const BEFORE_FIRST_NODE: &str = "before_first_node";
    pub const BEFORE_VISIT: &str = "before";
    pub const AFTER_VISIT: &str = "after";
    pub const AFTER_LAST_NODE: &str = "after_last_node";
}

/// One recorded hook call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub rule_id: String,
    pub event: &'static str,
    /// Kind name or leaf text of the visited node, empty for file level events
    pub node: String,
}

impl std::fmt::Display for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.node.is_empty() {
            write!(f, "{} {}", self.rule_id, self.event)
        } else {
            write!(f, "{} {} {}", self.rule_id, self.event, self.node)
        }
    }
}

#[derive(Default)]
struct Log {
    invocations: Vec<Invocation>,
    counts: HashMap<(String, &'static str), usize>,
}

impl Log {
    fn record(&mut self, invocation: Invocation) {
        *self
            .counts
            .entry((invocation.rule_id.clone(), invocation.event))
            .or_insert(0) += 1;
        self.invocations.push(invocation);
    }

    fn count_since(&self, rule_id: &str, event: &str, checkpoint: usize) -> usize {
        self.invocations
            .iter()
            .skip(checkpoint)
            .filter(|i| i.rule_id == rule_id && i.event == event)
            .count()
    }
}

/// Shared, thread safe record of hook calls.
///
/// Clones write to the same log, so one log can be handed to several probe
/// rules and to rule factories running on worker threads.
#[derive(Clone, Default)]
pub struct InvocationLog {
    log: Arc<Mutex<Log>>,
}

impl InvocationLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_log<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Log) -> R,
    {
        f(&mut self.log.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn record(&self, rule_id: &str, event: &'static str, node: impl Into<String>) {
        let invocation = Invocation {
            rule_id: rule_id.to_owned(),
            event,
            node: node.into(),
        };
        self.with_log(|log| log.record(invocation));
    }

    /// Current log position, for later comparison.
    #[must_use]
    pub fn checkpoint(&self) -> usize {
        self.with_log(|log| log.invocations.len())
    }

    /// Count calls of `event` by `rule_id` since the checkpoint.
    #[must_use]
    pub fn count_since(&self, rule_id: &str, event: &str, checkpoint: usize) -> usize {
        self.with_log(|log| log.count_since(rule_id, event, checkpoint))
    }

    #[must_use]
    pub fn invocations_since(&self, checkpoint: usize) -> Vec<Invocation> {
        self.with_log(|log| log.invocations.iter().skip(checkpoint).cloned().collect())
    }

    /// Every invocation, one per line.
    #[must_use]
    pub fn render(&self) -> String {
        self.with_log(|log| {
            log.invocations
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n")
        })
    }

    #[must_use]
    pub fn total_count(&self, rule_id: &str, event: &'static str) -> usize {
        self.with_log(|log| {
            log.counts
                .get(&(rule_id.to_owned(), event))
                .copied()
                .unwrap_or(0)
        })
    }

    pub fn reset(&self) {
        self.with_log(|log| {
            log.invocations.clear();
            log.counts.clear();
        });
    }
}
