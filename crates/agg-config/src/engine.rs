use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::catalog::EventCatalog;
use crate::logging::LoggingConfig;
use crate::validate;

pub const DEFAULT_MAX_CALL_DEPTH: usize = 2048;

/// The `[engine]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    /// Nesting limit for function calls during evaluation.
    pub max_call_depth: usize,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

// ---------------------------------------------------------------------------
// EngineConfig (resolved, validated)
// ---------------------------------------------------------------------------

/// Contents of `engine.toml`. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub engine: EngineSection,
    pub logging: LoggingConfig,
    pub catalog: EventCatalog,
}

impl EngineConfig {
    /// Read and parse an `engine.toml` file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.as_ref().display()))?;
        content.parse()
    }
}

impl FromStr for EngineConfig {
    type Err = anyhow::Error;

    /// Parse a TOML string into a validated [`EngineConfig`].
    fn from_str(toml_str: &str) -> anyhow::Result<Self> {
        let config: EngineConfig = toml::from_str(toml_str)?;
        validate::validate(&config)?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PropType;
    use crate::logging::LogFormat;

    const FULL_TOML: &str = r#"
[engine]
max_call_depth = 64

[logging]
level = "debug"
format = "json"
file = "logs/aggregate.log"
modules = { "agg_core::context" = "trace" }

[catalog]
props = { platform = "string", amount = "number" }
events = { platform_changed = ["platform"], purchase = ["amount"] }
"#;

    #[test]
    fn load_full_toml() {
        let cfg: EngineConfig = FULL_TOML.parse().unwrap();

        assert_eq!(cfg.engine.max_call_depth, 64);

        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.logging.format, LogFormat::Json);
        assert_eq!(
            cfg.logging.file.as_deref(),
            Some(Path::new("logs/aggregate.log"))
        );

        assert_eq!(cfg.catalog.prop_type("amount"), Some(PropType::Number));
        let events: Vec<&str> = cfg.catalog.events.keys().map(String::as_str).collect();
        assert_eq!(events, vec!["platform_changed", "purchase"]);
    }

    #[test]
    fn empty_file_uses_defaults() {
        let cfg: EngineConfig = "".parse().unwrap();
        assert_eq!(cfg.engine.max_call_depth, DEFAULT_MAX_CALL_DEPTH);
        assert_eq!(cfg.logging.level, "info");
        assert!(cfg.catalog.is_empty());
    }

    #[test]
    fn unknown_prop_type_rejected() {
        let toml = "[catalog]\nprops = { amount = \"decimal\" }\n";
        assert!(toml.parse::<EngineConfig>().is_err());
    }

    #[test]
    fn load_missing_file_names_path() {
        let err = EngineConfig::load("/nonexistent/engine.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/engine.toml"));
    }
}
