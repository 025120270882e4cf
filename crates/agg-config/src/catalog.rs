use agg_lang::{NameCheck, Value};
use indexmap::IndexMap;
use serde::Deserialize;

/// Properties every event carries whether or not the catalog lists them.
pub const IMPLICIT_PROPS: [&str; 2] = ["name", "time"];

/// Declared type of an event property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropType {
    String,
    Number,
    Boolean,
}

impl PropType {
    /// Whether `value` fits this type. Null fits every type.
    pub fn accepts(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (_, Value::Null)
                | (PropType::String, Value::Str(_))
                | (PropType::Number, Value::Number(_))
                | (PropType::Boolean, Value::Bool(_))
        )
    }
}

/// The `[catalog]` section: the event types a deployment emits and the
/// properties they carry.
///
/// An empty catalog accepts every name. Once `props` is non-empty,
/// `event.<prop>` references in forms must name a declared or implicit
/// property.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EventCatalog {
    pub props: IndexMap<String, PropType>,
    /// Event name → properties it carries, besides the implicit ones.
    pub events: IndexMap<String, Vec<String>>,
}

impl EventCatalog {
    pub fn is_empty(&self) -> bool {
        self.props.is_empty() && self.events.is_empty()
    }

    pub fn prop_type(&self, prop: &str) -> Option<PropType> {
        match prop {
            "name" => Some(PropType::String),
            "time" => Some(PropType::Number),
            _ => self.props.get(prop).copied(),
        }
    }

    pub fn is_known_event(&self, name: &str) -> bool {
        self.events.is_empty() || self.events.contains_key(name)
    }

    /// Properties of `fields` whose value contradicts the declared type.
    pub fn mistyped<'a>(
        &self,
        fields: impl IntoIterator<Item = (&'a String, &'a Value)>,
    ) -> Vec<&'a str> {
        let mut bad: Vec<&str> = fields
            .into_iter()
            .filter(|(prop, value)| {
                self.prop_type(prop)
                    .is_some_and(|ty| !ty.accepts(value))
            })
            .map(|(prop, _)| prop.as_str())
            .collect();
        bad.sort_unstable();
        bad
    }
}

impl NameCheck for EventCatalog {
    fn is_known_prop(&self, name: &str) -> bool {
        self.props.is_empty() || IMPLICIT_PROPS.contains(&name) || self.props.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> EventCatalog {
        toml::from_str(
            r#"
props = { platform = "string", amount = "number", was_signup = "boolean" }
events = { platform_changed = ["platform"], purchase = ["amount"] }
"#,
        )
        .unwrap()
    }

    #[test]
    fn empty_catalog_accepts_everything() {
        let catalog = EventCatalog::default();
        assert!(catalog.is_empty());
        assert!(catalog.is_known_prop("anything"));
        assert!(catalog.is_known_event("anything"));
    }

    #[test]
    fn declared_and_implicit_props_are_known() {
        let catalog = catalog();
        assert!(catalog.is_known_prop("platform"));
        assert!(catalog.is_known_prop("name"));
        assert!(catalog.is_known_prop("time"));
        assert!(!catalog.is_known_prop("platfrom"));
        assert!(catalog.is_known_variable("anything"));
    }

    #[test]
    fn catalog_rejects_undeclared_props_at_parse_time() {
        let form: agg_lang::Form =
            agg_lang::Form::List(vec!["=".into(), "event.colour".into(), "red".into()]);
        assert!(matches!(
            agg_lang::parse_expr_with(&form, &catalog()),
            Err(agg_lang::ParseError::UnknownName { .. })
        ));
    }

    #[test]
    fn known_events() {
        let catalog = catalog();
        assert!(catalog.is_known_event("purchase"));
        assert!(!catalog.is_known_event("refund"));
    }

    #[test]
    fn mistyped_props() {
        let catalog = catalog();
        let fields: IndexMap<String, Value> = [
            ("name".to_string(), Value::from("purchase")),
            ("amount".to_string(), Value::from("12")),
            ("platform".to_string(), Value::Null),
            ("extra".to_string(), Value::Bool(true)),
            ("time".to_string(), Value::Bool(false)),
        ]
        .into_iter()
        .collect();
        assert_eq!(catalog.mistyped(&fields), vec!["amount", "time"]);
    }
}
