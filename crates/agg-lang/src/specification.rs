use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::value::{Form, Value};

/// Declarative engine input: variables, named functions, named aggregators.
///
/// Every map keeps document order; aggregator order becomes registration
/// order. `triggers` is carried verbatim and never evaluated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Specification {
    pub variables: IndexMap<String, Value>,
    pub functions: IndexMap<String, Form>,
    pub aggregators: IndexMap<String, Form>,
    pub triggers: IndexMap<String, serde_json::Value>,
}

impl Specification {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn with_variable(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.variables.insert(name.to_string(), value.into());
        self
    }

    pub fn with_function(mut self, name: &str, body: Form) -> Self {
        self.functions.insert(name.to_string(), body);
        self
    }

    pub fn with_aggregator(mut self, name: &str, form: Form) -> Self {
        self.aggregators.insert(name.to_string(), form);
        self
    }
}

impl FromStr for Specification {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_json(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_document_and_keeps_order() {
        let spec: Specification = r#"{
            "variables": { "grid": true },
            "aggregators": {
                "zeta": ["select_if", true, 1],
                "alpha": ["funnel", ["=", "event.name", "a"]]
            },
            "triggers": { "t": {"when": "x"} }
        }"#
        .parse()
        .unwrap();

        assert_eq!(spec.variables.get("grid"), Some(&Value::Bool(true)));
        assert!(spec.functions.is_empty());
        let names: Vec<&str> = spec.aggregators.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert_eq!(spec.triggers.len(), 1);
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let spec = Specification::from_json("{}").unwrap();
        assert_eq!(spec, Specification::default());
    }
}
