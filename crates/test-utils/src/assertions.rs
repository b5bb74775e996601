//! Snapshot formatting for lint results.
//!
//! Violations and failures are rendered one per line so insta snapshots stay
//! readable.

use lintkit_linter::{FormatOutcome, LintOutcome, LintViolation, RuleFailure};

/// Format violations for snapshot testing.
///
/// # Example
///
/// ```ignore
/// use lintkit_test_utils::assertions::format_violations;
///
/// let outcome = engine.lint(&mut tree, &config)?;
/// insta::assert_snapshot!(format_violations(&outcome.violations));
/// ```
#[must_use]
pub fn format_violations(violations: &[LintViolation]) -> String {
    if violations.is_empty() {
        return String::from("(no violations)");
    }

    violations
        .iter()
        .enumerate()
        .map(|(i, v)| format!("[{}] {v}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

#[must_use]
pub fn format_failures(failures: &[RuleFailure]) -> String {
    if failures.is_empty() {
        return String::from("(no failures)");
    }

    failures
        .iter()
        .enumerate()
        .map(|(i, f)| format!("[{}] {f}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Violations followed by failures.
#[must_use]
pub fn format_outcome(outcome: &LintOutcome) -> String {
    if outcome.failures.is_empty() {
        return format_violations(&outcome.violations);
    }
    format!(
        "{}\n--\n{}",
        format_violations(&outcome.violations),
        format_failures(&outcome.failures)
    )
}

/// Violations and the formatted text of a format run.
#[must_use]
pub fn format_format_outcome(outcome: &FormatOutcome) -> String {
    let text = outcome.text.as_deref().unwrap_or("(unchanged)");
    format!(
        "{}\n--\n{text}",
        format_violations(&outcome.violations)
    )
}

/// Messages only, without positions.
#[must_use]
pub fn format_messages(violations: &[LintViolation]) -> String {
    if violations.is_empty() {
        return String::from("(no violations)");
    }

    violations
        .iter()
        .enumerate()
        .map(|(i, v)| format!("[{}] {}", i + 1, v.message))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use lintkit_linter::{HookPhase, RuleId};

    fn violation(message: &str, corrected: bool) -> LintViolation {
        LintViolation {
            offset: 0,
            line: 2,
            col: 3,
            message: message.to_owned(),
            rule_id: RuleId::new("t:rule"),
            can_be_autocorrected: true,
            corrected,
        }
    }

    #[test]
    fn test_format_violations_empty() {
        assert_eq!(format_violations(&[]), "(no violations)");
        assert_eq!(format_messages(&[]), "(no violations)");
    }

    #[test]
    fn test_format_violations() {
        let formatted = format_violations(&[violation("first", true), violation("second", false)]);
        assert_eq!(
            formatted,
            "[1] 2:3 first (t:rule) [corrected]\n[2] 2:3 second (t:rule)"
        );
    }

    #[test]
    fn test_format_outcome_with_failures() {
        let outcome = LintOutcome {
            violations: vec![violation("first", false)],
            failures: vec![RuleFailure {
                rule_id: RuleId::new("t:rule"),
                offset: 4,
                phase: HookPhase::AfterLastNode,
                message: "boom".to_owned(),
            }],
        };
        assert_eq!(
            format_outcome(&outcome),
            "[1] 2:3 first (t:rule)\n--\n[1] rule 't:rule' failed in after_last_node at offset 4: boom"
        );
    }
}
