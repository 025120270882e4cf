use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

/// Logging configuration. All fields have defaults so the entire `[logging]`
/// section may be omitted from `engine.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Global log level filter (e.g. `"info"`, `"debug"`).
    pub level: String,
    /// Per-module level overrides, e.g. `{ "agg_core::context" = "debug" }`.
    pub modules: HashMap<String, String>,
    /// Optional log file. Relative paths are resolved against the config
    /// file's parent directory.
    pub file: Option<PathBuf>,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            modules: HashMap::new(),
            file: None,
            format: LogFormat::Plain,
        }
    }
}

impl LoggingConfig {
    /// `EnvFilter` directive string: global level followed by module
    /// overrides, sorted for a stable result.
    pub fn filter_directives(&self) -> String {
        let mut modules: Vec<_> = self.modules.iter().collect();
        modules.sort();
        let mut directives = self.level.clone();
        for (module, level) in modules {
            directives.push_str(&format!(",{module}={level}"));
        }
        directives
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines with a `[domain]` prefix.
    Plain,
    /// One JSON object per line.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_section_empty() {
        let cfg: LoggingConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.level, "info");
        assert_eq!(cfg.format, LogFormat::Plain);
        assert!(cfg.file.is_none());
        assert_eq!(cfg.filter_directives(), "info");
    }

    #[test]
    fn module_overrides_join_sorted() {
        let cfg: LoggingConfig = toml::from_str(
            r#"
level = "warn"
format = "json"
modules = { "agg_runtime" = "info", "agg_core::context" = "debug" }
"#,
        )
        .unwrap();
        assert_eq!(cfg.format, LogFormat::Json);
        assert_eq!(
            cfg.filter_directives(),
            "warn,agg_core::context=debug,agg_runtime=info"
        );
    }
}
