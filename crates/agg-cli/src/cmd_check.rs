use std::fmt;
use std::path::Path;
use std::process;

use anyhow::Result;

use agg_config::EngineConfig;
use agg_lang::{NameCheck, ParseError, Specification, parse_aggregator_with, parse_expr_with};

/// One rejected specification entry.
#[derive(Debug)]
pub struct Diagnostic {
    pub section: &'static str,
    pub name: String,
    pub error: ParseError,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error: {}.{}: {}", self.section, self.name, self.error)
    }
}

pub fn run(config: &EngineConfig, spec: &Path) -> Result<()> {
    let spec = agg_runtime::read_spec(spec).map_err(|e| anyhow::anyhow!("{e}"))?;
    let diagnostics = check_spec(&spec, &config.catalog);

    for diag in &diagnostics {
        eprintln!("{diag}");
    }

    if diagnostics.is_empty() {
        eprintln!(
            "No issues found: {} function(s), {} aggregator(s).",
            spec.functions.len(),
            spec.aggregators.len()
        );
        return Ok(());
    }

    eprintln!("\n{} error(s)", diagnostics.len());
    process::exit(1);
}

/// Parse every entry, collecting all failures rather than stopping at the
/// first.
pub fn check_spec(spec: &Specification, names: &dyn NameCheck) -> Vec<Diagnostic> {
    let functions = spec.functions.iter().filter_map(|(name, body)| {
        parse_expr_with(body, names).err().map(|error| Diagnostic {
            section: "functions",
            name: name.clone(),
            error,
        })
    });
    let aggregators = spec.aggregators.iter().filter_map(|(name, form)| {
        parse_aggregator_with(form, names).err().map(|error| Diagnostic {
            section: "aggregators",
            name: name.clone(),
            error,
        })
    });
    functions.chain(aggregators).collect()
}
