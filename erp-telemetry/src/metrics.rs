//! Dispatch counters.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use erp_tools::{DispatchEvent, DispatchObserver, FailureKind};
use serde::Serialize;

const KINDS: [FailureKind; 6] = [
    FailureKind::Configuration,
    FailureKind::UnknownTool,
    FailureKind::InvalidArguments,
    FailureKind::NotFound,
    FailureKind::InvalidOutput,
    FailureKind::Execution,
];

/// Lock-free counters of dispatch outcomes, usable as a [`DispatchObserver`].
#[derive(Debug, Default)]
pub struct DispatchStats {
    calls: AtomicU64,
    successes: AtomicU64,
    failures: [AtomicU64; KINDS.len()],
}

impl DispatchStats {
    /// Creates zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Point-in-time copy of the counters.
    #[must_use]
    pub fn snapshot(&self) -> DispatchSnapshot {
        DispatchSnapshot {
            calls: self.calls.load(Ordering::Relaxed),
            successes: self.successes.load(Ordering::Relaxed),
            failures: KINDS
                .iter()
                .zip(&self.failures)
                .map(|(kind, count)| (kind.as_str(), count.load(Ordering::Relaxed)))
                .filter(|(_, count)| *count > 0)
                .collect(),
        }
    }
}

impl DispatchObserver for DispatchStats {
    fn on_dispatch(&self, event: &DispatchEvent<'_>) {
        self.calls.fetch_add(1, Ordering::Relaxed);
        match event.result {
            Ok(_) => {
                self.successes.fetch_add(1, Ordering::Relaxed);
            }
            Err(err) => {
                let slot = KINDS
                    .iter()
                    .position(|kind| *kind == err.kind())
                    .unwrap_or(KINDS.len() - 1);
                self.failures[slot].fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

/// Serializable view of [`DispatchStats`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DispatchSnapshot {
    /// Total dispatches observed.
    pub calls: u64,
    /// Dispatches that returned an output.
    pub successes: u64,
    /// Non-zero failure counts keyed by failure kind.
    pub failures: BTreeMap<&'static str, u64>,
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use erp_tools::{FieldType, Shape, ToolDefinition, ToolRegistry, ToolShape};
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    use super::*;

    #[derive(Serialize, Deserialize)]
    struct Ping {
        id: i64,
    }

    impl ToolShape for Ping {
        fn shape() -> Shape {
            Shape::new().field("id", FieldType::Integer)
        }

        fn example() -> Self {
            Self { id: 1 }
        }
    }

    #[test]
    fn counts_outcomes_by_kind() {
        let stats = Arc::new(DispatchStats::new());
        let registry = ToolRegistry::from_definitions([ToolDefinition::from_fn(
            "ping",
            "Returns its input",
            |input: Ping| Ok(input),
        )
        .unwrap()])
        .unwrap()
        .with_observer(Arc::clone(&stats) as Arc<dyn DispatchObserver>);

        registry.dispatch("ping", json!({ "id": 7 })).unwrap();
        registry.dispatch("ping", json!({ "id": "seven" })).unwrap_err();
        registry.dispatch("pong", json!({})).unwrap_err();
        registry.dispatch("pong", json!({})).unwrap_err();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.calls, 4);
        assert_eq!(snapshot.successes, 1);
        assert_eq!(snapshot.failures.get("invalid_arguments"), Some(&1));
        assert_eq!(snapshot.failures.get("unknown_tool"), Some(&2));
        assert!(!snapshot.failures.contains_key("not_found"));

        let encoded = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(encoded["failures"]["unknown_tool"], 2);
    }
}
