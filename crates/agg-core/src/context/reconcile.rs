use std::collections::HashMap;

use agg_lang::{ParseError, Specification, parse_expr_with};
use orion_error::StructError;

use super::AnalyticsContext;
use crate::aggregator::Aggregator;
use crate::error::{CoreReason, CoreResult};

/// What one [`AnalyticsContext::update_with_spec`] call changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecUpdate {
    pub variables_changed: bool,
    /// Aggregators newly registered or re-parsed from a changed source.
    pub changed: Vec<String>,
    /// Aggregators dropped because the new specification no longer names
    /// them.
    pub removed: Vec<String>,
    /// Aggregator entries that failed to parse; any previous aggregator
    /// under the same name is gone.
    pub rejected: Vec<(String, ParseError)>,
    pub replayed: bool,
}

impl AnalyticsContext {
    /// Bring the context in line with `spec`.
    ///
    /// Function bodies are parsed before anything is touched: one bad body
    /// fails the call and leaves the context as it was. Aggregator entries
    /// that fail to parse are dropped and reported in
    /// [`SpecUpdate::rejected`]. When variables or the aggregator set
    /// changed, the whole event log is replayed.
    pub fn update_with_spec(&mut self, spec: &Specification) -> CoreResult<SpecUpdate> {
        let mut functions = HashMap::with_capacity(spec.functions.len());
        for (name, body) in &spec.functions {
            let expr = parse_expr_with(body, self.names.as_ref()).map_err(|e| {
                StructError::from(CoreReason::Spec(e))
                    .with_detail(format!("function {name:?}"))
            })?;
            functions.insert(name.clone(), expr);
        }

        let mut update = SpecUpdate::default();
        let mut dirty = false;

        if self.variables != spec.variables {
            self.variables = spec.variables.clone();
            update.variables_changed = true;
            dirty = true;
        }

        // Function changes alone do not trigger a replay.
        self.functions = functions;

        for (name, source) in &spec.aggregators {
            if self
                .aggregators
                .get(name)
                .is_some_and(|existing| existing.source() == source)
            {
                continue;
            }
            match Aggregator::parse(name, source, self.names.as_ref()) {
                Ok(aggregator) => {
                    log::debug!("registering aggregator {name:?} ({})", aggregator.kind());
                    // IndexMap::insert keeps the position of an existing key.
                    self.aggregators.insert(name.clone(), aggregator);
                    update.changed.push(name.clone());
                    dirty = true;
                }
                Err(e) => {
                    log::warn!("dropping aggregator {name:?}: {e}");
                    if self.aggregators.shift_remove(name).is_some() {
                        dirty = true;
                    }
                    update.rejected.push((name.clone(), e));
                }
            }
        }

        let stale: Vec<String> = self
            .aggregators
            .keys()
            .filter(|name| !spec.aggregators.contains_key(*name))
            .cloned()
            .collect();
        for name in stale {
            log::debug!("removing aggregator {name:?}");
            self.aggregators.shift_remove(&name);
            update.removed.push(name);
            dirty = true;
        }

        if dirty {
            self.replay_event_log()?;
            update.replayed = true;
        } else {
            log::debug!("specification unchanged, keeping aggregator state");
        }
        Ok(update)
    }
}
