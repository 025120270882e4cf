pub mod aggregator;
mod context;
pub mod error;
pub mod eval;
mod event;

pub use aggregator::{Aggregator, AggregatorState};
pub use context::{AnalyticsContext, Snapshot, SpecUpdate};
pub use error::{CoreError, CoreReason, CoreResult};
pub use eval::{ArgStack, Env, EvalError, EvalResult, MapEnv, eval};
pub use event::Event;
