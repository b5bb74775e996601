use crate::rule::RuleId;
use lintkit_types::LineColumn;
use serde::Serialize;

/// A style violation reported by a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintViolation {
    /// Byte offset in the text of the tree at the moment of reporting
    pub offset: usize,
    /// 1-based line
    pub line: usize,
    /// 1-based column, counted in characters
    pub col: usize,
    pub message: String,
    pub rule_id: RuleId,
    pub can_be_autocorrected: bool,
    /// Whether the engine allowed the rule to fix the violation
    pub corrected: bool,
}

impl LintViolation {
    #[must_use]
    pub fn line_column(&self) -> LineColumn {
        LineColumn::new(self.line, self.col)
    }
}

impl std::fmt::Display for LintViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{} {} ({})",
            self.line, self.col, self.message, self.rule_id
        )?;
        if self.corrected {
            f.write_str(" [corrected]")?;
        }
        Ok(())
    }
}

/// Rule hook during which a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HookPhase {
    BeforeFirstNode,
    BeforeVisitChildNodes,
    AfterVisitChildNodes,
    AfterLastNode,
    /// A fix passed to `emit_and_fix` returned an error
    Autocorrect,
}

impl HookPhase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BeforeFirstNode => "before_first_node",
            Self::BeforeVisitChildNodes => "before_visit_child_nodes",
            Self::AfterVisitChildNodes => "after_visit_child_nodes",
            Self::AfterLastNode => "after_last_node",
            Self::Autocorrect => "autocorrect",
        }
    }
}

impl std::fmt::Display for HookPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rule that failed while visiting a file.
///
/// Tree changes made by the failing call have been reverted and traversal
/// continued with the other rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleFailure {
    pub rule_id: RuleId,
    /// Start offset of the node being visited
    pub offset: usize,
    pub phase: HookPhase,
    pub message: String,
}

impl std::fmt::Display for RuleFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "rule '{}' failed in {} at offset {}: {}",
            self.rule_id, self.phase, self.offset, self.message
        )
    }
}

/// Collects the violations of one traversal in discovery order.
#[derive(Debug, Default)]
pub(crate) struct ViolationCollector {
    violations: Vec<LintViolation>,
}

impl ViolationCollector {
    pub(crate) fn push(&mut self, violation: LintViolation) -> usize {
        self.violations.push(violation);
        self.violations.len() - 1
    }

    pub(crate) fn len(&self) -> usize {
        self.violations.len()
    }

    pub(crate) fn set_corrected(&mut self, index: usize, corrected: bool) {
        if let Some(violation) = self.violations.get_mut(index) {
            violation.corrected = corrected;
        }
    }

    /// Clear the corrected flag of every violation from `start` on
    pub(crate) fn uncorrect_from(&mut self, start: usize) {
        for violation in self.violations.iter_mut().skip(start) {
            violation.corrected = false;
        }
    }

    /// Violations ordered by offset, ties kept in discovery order
    pub(crate) fn into_sorted(mut self) -> Vec<LintViolation> {
        self.violations.sort_by_key(|violation| violation.offset);
        self.violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn violation(offset: usize, message: &str) -> LintViolation {
        LintViolation {
            offset,
            line: 1,
            col: offset + 1,
            message: message.to_owned(),
            rule_id: RuleId::new("t:rule"),
            can_be_autocorrected: true,
            corrected: true,
        }
    }

    #[test]
    fn test_sorted_by_offset_stable() {
        let mut collector = ViolationCollector::default();
        collector.push(violation(5, "first at 5"));
        collector.push(violation(1, "at 1"));
        collector.push(violation(5, "second at 5"));
        let messages: Vec<String> = collector
            .into_sorted()
            .into_iter()
            .map(|v| v.message)
            .collect();
        assert_eq!(messages, vec!["at 1", "first at 5", "second at 5"]);
    }

    #[test]
    fn test_uncorrect_from() {
        let mut collector = ViolationCollector::default();
        collector.push(violation(0, "a"));
        let index = collector.push(violation(1, "b"));
        collector.push(violation(2, "c"));
        collector.uncorrect_from(index);
        let corrected: Vec<bool> = collector.into_sorted().iter().map(|v| v.corrected).collect();
        assert_eq!(corrected, vec![true, false, false]);
    }

    #[test]
    fn test_display() {
        let mut v = violation(3, "Unexpected whitespace");
        assert_eq!(v.to_string(), "1:4 Unexpected whitespace (t:rule) [corrected]");
        v.corrected = false;
        assert_eq!(v.to_string(), "1:4 Unexpected whitespace (t:rule)");
        assert_eq!(v.line_column(), LineColumn::new(1, 4));
    }

    #[test]
    fn test_serialize_failure() {
        let failure = RuleFailure {
            rule_id: RuleId::new("t:rule"),
            offset: 7,
            phase: HookPhase::AfterVisitChildNodes,
            message: "boom".to_owned(),
        };
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "rule_id": "t:rule",
                "offset": 7,
                "phase": "after_visit_child_nodes",
                "message": "boom"
            })
        );
    }
}
