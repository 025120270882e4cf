#[macro_use]
mod log_macros;

pub mod error;
pub mod replay;
pub mod session;
pub mod tracing_init;

pub use error::{RuntimeError, RuntimeReason, RuntimeResult};
pub use replay::{ReplayReport, event_from_json};
pub use session::{Session, read_spec};
