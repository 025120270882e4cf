use std::collections::HashMap;

use agg_lang::{Expr, Value};

use crate::event::Event;

/// Read-only tables an expression is evaluated against.
pub trait Env {
    /// Property of the event currently being processed.
    fn event_prop(&self, name: &str) -> Option<&Value>;

    fn variable(&self, name: &str) -> Option<&Value>;

    /// Current value of another aggregator.
    fn aggregator_value(&self, name: &str) -> Option<Value>;

    /// Parsed body of a named function.
    fn function(&self, name: &str) -> Option<&Expr>;
}

/// Self-contained [`Env`] backed by owned maps, for embedding hosts that
/// evaluate expressions outside an [`AnalyticsContext`](crate::AnalyticsContext).
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    pub event: Option<Event>,
    pub variables: HashMap<String, Value>,
    pub aggregators: HashMap<String, Value>,
    pub functions: HashMap<String, Expr>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_event(mut self, event: Event) -> Self {
        self.event = Some(event);
        self
    }

    pub fn with_variable(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.variables.insert(name.to_string(), value.into());
        self
    }

    pub fn with_aggregator(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.aggregators.insert(name.to_string(), value.into());
        self
    }

    pub fn with_function(mut self, name: &str, body: Expr) -> Self {
        self.functions.insert(name.to_string(), body);
        self
    }
}

impl Env for MapEnv {
    fn event_prop(&self, name: &str) -> Option<&Value> {
        self.event.as_ref().and_then(|e| e.get(name))
    }

    fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    fn aggregator_value(&self, name: &str) -> Option<Value> {
        self.aggregators.get(name).cloned()
    }

    fn function(&self, name: &str) -> Option<&Expr> {
        self.functions.get(name)
    }
}
