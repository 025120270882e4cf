use indexmap::IndexMap;
use orion_error::StructError;
use serde::{Deserialize, Serialize};

use super::AnalyticsContext;
use crate::aggregator::AggregatorState;
use crate::error::{CoreReason, CoreResult};

/// Saved aggregator states, keyed by aggregator name in registry order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    pub states: IndexMap<String, AggregatorState>,
}

impl Snapshot {
    pub fn get(&self, name: &str) -> Option<&AggregatorState> {
        self.states.get(name)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn to_json(&self) -> CoreResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            StructError::from(CoreReason::Snapshot).with_detail(format!("encode: {e}"))
        })
    }

    pub fn from_json(json: &str) -> CoreResult<Self> {
        serde_json::from_str(json).map_err(|e| {
            StructError::from(CoreReason::Snapshot).with_detail(format!("decode: {e}"))
        })
    }
}

impl AnalyticsContext {
    pub fn save_state(&self) -> Snapshot {
        Snapshot {
            states: self
                .aggregators
                .iter()
                .map(|(name, agg)| (name.clone(), agg.save_state()))
                .collect(),
        }
    }

    /// Overwrite aggregator states from `snapshot` without replaying.
    ///
    /// Aggregators with no entry, or an entry of another kind, are reset.
    /// Snapshot entries for unregistered names are ignored. Returns the
    /// number of aggregators whose state was taken from the snapshot.
    pub fn restore_state(&mut self, snapshot: &Snapshot) -> usize {
        let mut restored = 0;
        for (name, aggregator) in self.aggregators.iter_mut() {
            let Some(state) = snapshot.get(name) else {
                aggregator.reset();
                continue;
            };
            if aggregator.restore_state(state.clone()) {
                restored += 1;
            } else {
                log::warn!(
                    "snapshot holds a {} state for {} aggregator {name:?}, resetting",
                    state.kind(),
                    aggregator.kind()
                );
            }
        }
        restored
    }
}
