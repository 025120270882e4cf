mod reconcile;
mod scope;
mod snapshot;


pub use reconcile::SpecUpdate;
pub use snapshot::Snapshot;

use std::collections::HashMap;

use agg_lang::{AnyName, Expr, Form, NameCheck, Value, parse_expr_with};
use indexmap::IndexMap;
use orion_error::StructError;

use crate::aggregator::Aggregator;
use crate::error::{CoreReason, CoreResult};
use crate::eval::{ArgStack, EvalError, EvalResult, eval};
use crate::event::Event;
use scope::Scope;

// ---------------------------------------------------------------------------
// AnalyticsContext: public API
// ---------------------------------------------------------------------------

/// Incremental aggregation engine.
///
/// Owns the append-only event log, the variable and function tables and the
/// aggregator registry. Specifications are applied with
/// [`update_with_spec`](Self::update_with_spec); events are pushed with
/// [`track_event`](Self::track_event).
///
/// Registry order is registration order: an aggregator keeps its position
/// when a new specification replaces it, newly named aggregators are
/// appended. During one event, aggregators earlier in that order are already
/// updated when later ones read them.
pub struct AnalyticsContext {
    events: Vec<Event>,
    variables: IndexMap<String, Value>,
    functions: HashMap<String, Expr>,
    aggregators: IndexMap<String, Aggregator>,
    names: Box<dyn NameCheck>,
    max_call_depth: usize,
}

impl AnalyticsContext {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            variables: IndexMap::new(),
            functions: HashMap::new(),
            aggregators: IndexMap::new(),
            names: Box::new(AnyName),
            max_call_depth: ArgStack::DEFAULT_MAX_DEPTH,
        }
    }

    /// Validate reference names with `names` whenever forms are parsed.
    pub fn with_names(mut self, names: impl NameCheck + 'static) -> Self {
        self.names = Box::new(names);
        self
    }

    pub fn with_max_call_depth(mut self, max_call_depth: usize) -> Self {
        self.max_call_depth = max_call_depth;
        self
    }

    /// Append `event` to the log and fold it into every aggregator, once
    /// each, in registration order.
    ///
    /// An evaluation error aborts the pass; aggregators after the failing
    /// one do not see the event, which stays in the log.
    pub fn track_event(&mut self, event: Event) -> CoreResult<()> {
        self.events.push(event);
        let index = self.events.len() - 1;
        self.process(index).map_err(eval_error)
    }

    /// Reset every aggregator and fold the whole log again under the current
    /// tables.
    pub fn replay_event_log(&mut self) -> CoreResult<()> {
        for aggregator in self.aggregators.values_mut() {
            aggregator.reset();
        }
        for index in 0..self.events.len() {
            self.process(index).map_err(eval_error)?;
        }
        log::debug!(
            "replayed {} events through {} aggregators",
            self.events.len(),
            self.aggregators.len()
        );
        Ok(())
    }

    /// Parse and evaluate `form` against the current tables, with the most
    /// recently tracked event as the current event.
    pub fn eval_form(&self, form: &Form) -> CoreResult<Value> {
        let expr = parse_expr_with(form, self.names.as_ref())
            .map_err(|e| StructError::from(CoreReason::Spec(e)))?;
        let scope = self.scope(self.events.last());
        let mut stack = ArgStack::with_max_depth(self.max_call_depth);
        eval(&expr, &scope, &mut stack).map_err(eval_error)
    }

    pub fn current_values(&self) -> IndexMap<String, Value> {
        self.aggregators
            .iter()
            .map(|(name, agg)| (name.clone(), agg.current_value()))
            .collect()
    }

    pub fn current_value(&self, name: &str) -> Option<Value> {
        self.aggregators.get(name).map(Aggregator::current_value)
    }

    pub fn aggregator(&self, name: &str) -> Option<&Aggregator> {
        self.aggregators.get(name)
    }

    pub fn aggregator_names(&self) -> impl Iterator<Item = &str> {
        self.aggregators.keys().map(String::as_str)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn variables(&self) -> &IndexMap<String, Value> {
        &self.variables
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn scope<'a>(&'a self, event: Option<&'a Event>) -> Scope<'a> {
        Scope {
            event,
            variables: &self.variables,
            functions: &self.functions,
            aggregators: &self.aggregators,
        }
    }

    /// Run logged event `index` through every aggregator.
    ///
    /// Each aggregator's next state is computed against the registry as it
    /// stands, then stored before the next aggregator runs.
    fn process(&mut self, index: usize) -> EvalResult<()> {
        let mut stack = ArgStack::with_max_depth(self.max_call_depth);
        for slot in 0..self.aggregators.len() {
            let next = {
                let scope = self.scope(self.events.get(index));
                match self.aggregators.get_index(slot) {
                    Some((_, aggregator)) => aggregator.transition(&scope, &mut stack)?,
                    None => None,
                }
            };
            if let (Some(state), Some((_, aggregator))) =
                (next, self.aggregators.get_index_mut(slot))
            {
                aggregator.restore_state(state);
            }
        }
        Ok(())
    }
}

impl Default for AnalyticsContext {
    fn default() -> Self {
        Self::new()
    }
}

fn eval_error(e: EvalError) -> StructError<CoreReason> {
    StructError::from(CoreReason::Eval(e))
}
