use crate::rule::RuleId;
use crate::sorter::OrderingError;

/// Errors that stop the engine from processing a file.
///
/// Failures of individual rule hooks are not errors: they are reported as
/// [`RuleFailure`](crate::RuleFailure) in the outcome of the file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Ordering(#[from] OrderingError),

    #[error("failed to create rule '{rule_id}': {reason}")]
    RuleInstantiation { rule_id: RuleId, reason: String },

    #[error("worker stopped before finishing '{0}'")]
    WorkerLost(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
