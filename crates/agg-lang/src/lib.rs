pub mod ast;
mod error;
mod names;
mod parser;
mod specification;
mod value;

pub use ast::{AggregatorKind, AggregatorPlan, Expr, PrimOp};
pub use error::{NameKind, ParseError, ParseResult};
pub use names::{AnyName, NameCheck};
pub use parser::{parse_aggregator, parse_aggregator_with, parse_expr, parse_expr_with};
pub use specification::Specification;
pub use value::{Form, Value};
