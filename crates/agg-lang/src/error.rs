use std::fmt;

/// Which table a reference name points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Property,
    Variable,
    Aggregator,
    Function,
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NameKind::Property => "property",
            NameKind::Variable => "variable",
            NameKind::Aggregator => "aggregator",
            NameKind::Function => "function",
        })
    }
}

/// Failure converting a [`Form`](crate::Form) into an expression or
/// aggregator plan.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("`{op}` requires {required} arguments, but found {found}")]
    Arity {
        op: String,
        required: usize,
        found: usize,
    },
    #[error("invalid expression form: {0}")]
    InvalidExpressionForm(String),
    #[error("unknown {kind} name: {name:?}")]
    UnknownName { kind: NameKind, name: String },
    #[error("empty expression form")]
    EmptyForm,
    #[error("unknown aggregator kind: {0:?}")]
    UnknownAggregatorKind(String),
    #[error("invalid aggregator form: {0}")]
    InvalidAggregatorForm(String),
}

pub type ParseResult<T> = Result<T, ParseError>;
