#[cfg(test)]
mod tests;

use agg_lang::{
    AggregatorKind, AggregatorPlan, Expr, Form, NameCheck, ParseResult, Value,
    parse_aggregator_with,
};
use serde::{Deserialize, Serialize};

use crate::eval::{ArgStack, Env, EvalResult, eval};

// ---------------------------------------------------------------------------
// AggregatorState: serialisable internal state
// ---------------------------------------------------------------------------

/// Internal state of one aggregator, as saved and restored by snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "state", rename_all = "snake_case")]
pub enum AggregatorState {
    /// Last selected value.
    SelectIf(Value),
    /// Raw step counter, never wrapped.
    Funnel(u64),
    /// Current state index; may be any number once a transition set it.
    StateMachine(f64),
}

impl AggregatorState {
    pub fn initial(kind: AggregatorKind) -> Self {
        match kind {
            AggregatorKind::SelectIf => AggregatorState::SelectIf(Value::Null),
            AggregatorKind::Funnel => AggregatorState::Funnel(0),
            AggregatorKind::StateMachine => AggregatorState::StateMachine(0.0),
        }
    }

    pub fn kind(&self) -> AggregatorKind {
        match self {
            AggregatorState::SelectIf(_) => AggregatorKind::SelectIf,
            AggregatorState::Funnel(_) => AggregatorKind::Funnel,
            AggregatorState::StateMachine(_) => AggregatorKind::StateMachine,
        }
    }

    pub fn current_value(&self) -> Value {
        match self {
            AggregatorState::SelectIf(v) => v.clone(),
            AggregatorState::Funnel(c) => Value::Number(*c as f64),
            AggregatorState::StateMachine(s) => Value::Number(*s),
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregator
// ---------------------------------------------------------------------------

/// A named, stateful fold over the event stream.
///
/// `source` is the form the aggregator was parsed from and is only used to
/// detect whether a new specification changed it.
#[derive(Debug, Clone)]
pub struct Aggregator {
    name: String,
    source: Form,
    plan: AggregatorPlan,
    state: AggregatorState,
}

impl Aggregator {
    pub fn new(name: impl Into<String>, source: Form, plan: AggregatorPlan) -> Self {
        let state = AggregatorState::initial(plan.kind());
        Self {
            name: name.into(),
            source,
            plan,
            state,
        }
    }

    pub fn parse(name: &str, source: &Form, names: &dyn NameCheck) -> ParseResult<Self> {
        let plan = parse_aggregator_with(source, names)?;
        Ok(Self::new(name, source.clone(), plan))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &Form {
        &self.source
    }

    pub fn kind(&self) -> AggregatorKind {
        self.plan.kind()
    }

    pub fn current_value(&self) -> Value {
        self.state.current_value()
    }

    pub fn save_state(&self) -> AggregatorState {
        self.state.clone()
    }

    /// Replace the internal state. A state of another kind resets the
    /// aggregator instead; returns whether `state` was taken.
    pub fn restore_state(&mut self, state: AggregatorState) -> bool {
        if state.kind() == self.kind() {
            self.state = state;
            true
        } else {
            self.reset();
            false
        }
    }

    pub fn reset(&mut self) {
        self.state = AggregatorState::initial(self.kind());
    }

    /// Fold the env's current event into the state.
    pub fn process_event(&mut self, env: &dyn Env, stack: &mut ArgStack) -> EvalResult<()> {
        if let Some(next) = self.transition(env, stack)? {
            self.state = next;
        }
        Ok(())
    }

    /// Compute the state the current event moves this aggregator to, without
    /// mutating it. `None` means the state stays as it is.
    ///
    /// Lets the engine evaluate one aggregator while the env reads every
    /// aggregator's current value.
    pub fn transition(
        &self,
        env: &dyn Env,
        stack: &mut ArgStack,
    ) -> EvalResult<Option<AggregatorState>> {
        match (&self.plan, &self.state) {
            (AggregatorPlan::SelectIf { cond, value }, _) => {
                if eval(cond, env, stack)?.is_truthy() {
                    Ok(Some(AggregatorState::SelectIf(eval(value, env, stack)?)))
                } else {
                    Ok(None)
                }
            }
            (AggregatorPlan::Funnel { steps }, AggregatorState::Funnel(counter)) => {
                funnel_step(steps, *counter, env, stack)
            }
            (AggregatorPlan::StateMachine { states }, AggregatorState::StateMachine(state)) => {
                self.state_machine_step(states, *state, env, stack)
            }
            // restore_state/reset keep state and plan of the same kind
            _ => Ok(None),
        }
    }

    fn state_machine_step(
        &self,
        states: &[Expr],
        state: f64,
        env: &dyn Env,
        stack: &mut ArgStack,
    ) -> EvalResult<Option<AggregatorState>> {
        let Some(index) = state_index(state, states.len()) else {
            // Out-of-range states absorb every further event.
            return Ok(None);
        };
        match eval(&states[index], env, stack)? {
            Value::Number(next) => Ok(Some(AggregatorState::StateMachine(next))),
            other => {
                log::warn!(
                    "aggregator {:?}: invalid transition from state {} to non-numeric {:?}",
                    self.name,
                    state,
                    other
                );
                Ok(None)
            }
        }
    }
}

fn funnel_step(
    steps: &[Expr],
    counter: u64,
    env: &dyn Env,
    stack: &mut ArgStack,
) -> EvalResult<Option<AggregatorState>> {
    if steps.is_empty() {
        return Ok(None);
    }
    let step = &steps[(counter % steps.len() as u64) as usize];
    if eval(step, env, stack)?.is_truthy() {
        Ok(Some(AggregatorState::Funnel(counter + 1)))
    } else {
        Ok(None)
    }
}

/// `state` as an index into a table of `len` entries, if it is one.
fn state_index(state: f64, len: usize) -> Option<usize> {
    if state.fract() != 0.0 || state < 0.0 || state >= len as f64 {
        return None;
    }
    Some(state as usize)
}
