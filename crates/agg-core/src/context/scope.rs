use std::collections::HashMap;

use agg_lang::{Expr, Value};
use indexmap::IndexMap;

use crate::aggregator::Aggregator;
use crate::eval::Env;
use crate::event::Event;

/// The [`Env`] an [`AnalyticsContext`](super::AnalyticsContext) exposes to
/// one evaluation: borrowed views of its tables plus the event being
/// processed.
pub(super) struct Scope<'a> {
    pub event: Option<&'a Event>,
    pub variables: &'a IndexMap<String, Value>,
    pub functions: &'a HashMap<String, Expr>,
    pub aggregators: &'a IndexMap<String, Aggregator>,
}

impl Env for Scope<'_> {
    fn event_prop(&self, name: &str) -> Option<&Value> {
        self.event.and_then(|e| e.get(name))
    }

    fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    fn aggregator_value(&self, name: &str) -> Option<Value> {
        self.aggregators.get(name).map(Aggregator::current_value)
    }

    fn function(&self, name: &str) -> Option<&Expr> {
        self.functions.get(name)
    }
}
