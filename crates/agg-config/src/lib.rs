pub mod catalog;
pub mod engine;
pub mod logging;
mod validate;

pub use catalog::{EventCatalog, PropType};
pub use engine::{EngineConfig, EngineSection};
pub use logging::{LogFormat, LoggingConfig};
