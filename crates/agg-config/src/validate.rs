use crate::catalog::IMPLICIT_PROPS;
use crate::engine::EngineConfig;

/// Internal validation, called automatically during `EngineConfig::from_str` / `load`.
pub(crate) fn validate(config: &EngineConfig) -> anyhow::Result<()> {
    if config.engine.max_call_depth == 0 {
        anyhow::bail!("engine.max_call_depth must be > 0");
    }

    // Event prop lists may only name declared props, once any are declared.
    let catalog = &config.catalog;
    if !catalog.props.is_empty() {
        for (event, props) in &catalog.events {
            for prop in props {
                if !IMPLICIT_PROPS.contains(&prop.as_str()) && !catalog.props.contains_key(prop) {
                    anyhow::bail!(
                        "catalog.events.{event}: property {prop:?} is not declared in catalog.props",
                    );
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::engine::EngineConfig;

    #[test]
    fn zero_call_depth_rejected() {
        let err = "[engine]\nmax_call_depth = 0\n"
            .parse::<EngineConfig>()
            .unwrap_err();
        assert!(err.to_string().contains("max_call_depth"));
    }

    #[test]
    fn undeclared_event_prop_rejected() {
        let toml = r#"
[catalog]
props = { platform = "string" }
events = { purchase = ["amount"] }
"#;
        let err = toml.parse::<EngineConfig>().unwrap_err();
        assert!(err.to_string().contains("amount"));
    }

    #[test]
    fn event_props_unchecked_without_declared_props() {
        let toml = r#"
[catalog]
events = { purchase = ["amount"] }
"#;
        assert!(toml.parse::<EngineConfig>().is_ok());
    }

    #[test]
    fn implicit_props_need_no_declaration() {
        let toml = r#"
[catalog]
props = { platform = "string" }
events = { login = ["name", "time", "platform"] }
"#;
        assert!(toml.parse::<EngineConfig>().is_ok());
    }
}
