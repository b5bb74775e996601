use crate::registry::{RegistryId, RuleRegistry};
use crate::rule::{RuleId, RuleProvider};
use crate::sorter::{sort_rule_providers, ExecutionOrder, OrderingError};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

type CacheKey = (RegistryId, BTreeSet<RuleId>);
type Slot = Arc<OnceLock<Result<ExecutionOrder, OrderingError>>>;

/// Memoized execution orders, keyed by registry identity and disabled rules.
///
/// The first caller for a key computes the order; concurrent callers for the
/// same key wait for that computation instead of repeating it. Failed
/// orderings are cached as well, so a contradiction is logged once.
#[derive(Debug, Default)]
pub struct ExecutionOrderCache {
    slots: Mutex<HashMap<CacheKey, Slot>>,
}

impl ExecutionOrderCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compute(
        &self,
        registry: &RuleRegistry,
        disabled: &BTreeSet<RuleId>,
    ) -> Result<ExecutionOrder, OrderingError> {
        let key = (registry.id(), disabled.clone());
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(key).or_default())
        };
        slot.get_or_init(|| {
            tracing::trace!(registry = ?registry.id(), "Computing execution order");
            compute(registry, disabled)
        })
        .clone()
    }

    /// Number of cached keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// Compute an order without consulting any cache.
pub(crate) fn compute(
    registry: &RuleRegistry,
    disabled: &BTreeSet<RuleId>,
) -> Result<ExecutionOrder, OrderingError> {
    let providers: Vec<Arc<RuleProvider>> = registry.providers().cloned().collect();
    sort_rule_providers(&providers, disabled)
}
