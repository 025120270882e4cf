use crate::ast::{AggregatorKind, AggregatorPlan, Expr, PrimOp};
use crate::error::{NameKind, ParseError, ParseResult};
use crate::names::{AnyName, NameCheck};
use crate::value::{Form, Value};


const EVENT_PREFIX: &str = "event.";
const VARIABLE_PREFIXES: [&str; 2] = ["var.", "variables."];
const AGGREGATOR_PREFIXES: [&str; 2] = ["agg.", "aggregators."];
const ARG_PREFIX: &str = "arg.";
const FUNC_PREFIX: &str = "func.";
const IF_HEAD: &str = "if";

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

/// Parse a [`Form`] into an [`Expr`], accepting every reference name.
pub fn parse_expr(form: &Form) -> ParseResult<Expr> {
    parse_expr_with(form, &AnyName)
}

/// Parse a [`Form`] into an [`Expr`], validating reference names with `names`.
pub fn parse_expr_with(form: &Form, names: &dyn NameCheck) -> ParseResult<Expr> {
    match form {
        Form::Null => Ok(Expr::Const(Value::Null)),
        Form::Bool(b) => Ok(Expr::Const(Value::Bool(*b))),
        Form::Number(n) => Ok(Expr::Const(Value::Number(*n))),
        Form::Str(s) => parse_atom(s, names),
        Form::List(items) => parse_list(items, names),
    }
}

fn parse_atom(s: &str, names: &dyn NameCheck) -> ParseResult<Expr> {
    if let Some(name) = s.strip_prefix(EVENT_PREFIX) {
        let name = checked_name(NameKind::Property, name, |n| names.is_known_prop(n))?;
        return Ok(Expr::EventProp(name));
    }
    if let Some(name) = strip_any(s, &VARIABLE_PREFIXES) {
        let name = checked_name(NameKind::Variable, name, |n| names.is_known_variable(n))?;
        return Ok(Expr::Variable(name));
    }
    if let Some(name) = strip_any(s, &AGGREGATOR_PREFIXES) {
        let name = checked_name(NameKind::Aggregator, name, |n| names.is_known_aggregator(n))?;
        return Ok(Expr::AggregatorRef(name));
    }
    if let Some(index) = s.strip_prefix(ARG_PREFIX) {
        return index.parse::<usize>().map(Expr::Arg).map_err(|_| {
            ParseError::InvalidExpressionForm(format!(
                "argument reference {s:?} needs a non-negative integer index"
            ))
        });
    }
    if s.starts_with(FUNC_PREFIX) {
        // A function name is only meaningful in head position.
        return Err(ParseError::InvalidExpressionForm(format!(
            "function reference {s:?} outside call position"
        )));
    }
    Ok(Expr::Const(Value::Str(s.to_string())))
}

fn parse_list(items: &[Form], names: &dyn NameCheck) -> ParseResult<Expr> {
    let Some((head, rest)) = items.split_first() else {
        return Err(ParseError::EmptyForm);
    };
    let Form::Str(head) = head else {
        return Err(ParseError::InvalidExpressionForm(format!(
            "unexpected form in operator position: {head}"
        )));
    };

    if let Some(func) = head.strip_prefix(FUNC_PREFIX) {
        if func.is_empty() {
            return Err(ParseError::UnknownName {
                kind: NameKind::Function,
                name: String::new(),
            });
        }
        return Ok(Expr::Call {
            func: func.to_string(),
            args: parse_all(rest, names)?,
        });
    }

    if head == IF_HEAD {
        require_exact(IF_HEAD, 3, rest.len())?;
        return Ok(Expr::IfThenElse {
            cond: Box::new(parse_expr_with(&rest[0], names)?),
            then_expr: Box::new(parse_expr_with(&rest[1], names)?),
            else_expr: Box::new(parse_expr_with(&rest[2], names)?),
        });
    }

    if let Some(op) = PrimOp::from_keyword(head) {
        if rest.len() < PrimOp::MIN_ARGS {
            return Err(ParseError::Arity {
                op: op.keyword().to_string(),
                required: PrimOp::MIN_ARGS,
                found: rest.len(),
            });
        }
        return Ok(Expr::Primitive {
            op,
            args: parse_all(rest, names)?,
        });
    }

    Err(ParseError::InvalidExpressionForm(format!(
        "unexpected form in operator position: {head:?}"
    )))
}

// ---------------------------------------------------------------------------
// Aggregators
// ---------------------------------------------------------------------------

/// Parse an aggregator form (`[kind, expr...]`) into an [`AggregatorPlan`].
pub fn parse_aggregator(form: &Form) -> ParseResult<AggregatorPlan> {
    parse_aggregator_with(form, &AnyName)
}

pub fn parse_aggregator_with(form: &Form, names: &dyn NameCheck) -> ParseResult<AggregatorPlan> {
    let Form::List(items) = form else {
        return Err(ParseError::InvalidAggregatorForm(format!(
            "expected [kind, expr...], found {form}"
        )));
    };
    let Some((head, rest)) = items.split_first() else {
        return Err(ParseError::EmptyForm);
    };
    let Form::Str(tag) = head else {
        return Err(ParseError::InvalidAggregatorForm(format!(
            "aggregator kind must be a string, found {head}"
        )));
    };
    let kind = AggregatorKind::from_tag(tag)
        .ok_or_else(|| ParseError::UnknownAggregatorKind(tag.clone()))?;

    match kind {
        AggregatorKind::SelectIf => {
            require_exact(kind.tag(), 2, rest.len())?;
            let [cond, value]: [Expr; 2] = parse_all(rest, names)?
                .try_into()
                .map_err(|_| ParseError::InvalidAggregatorForm(form.to_string()))?;
            Ok(AggregatorPlan::SelectIf { cond, value })
        }
        AggregatorKind::Funnel => {
            require_at_least(kind.tag(), 1, rest.len())?;
            Ok(AggregatorPlan::Funnel {
                steps: parse_all(rest, names)?,
            })
        }
        AggregatorKind::StateMachine => {
            require_at_least(kind.tag(), 1, rest.len())?;
            Ok(AggregatorPlan::StateMachine {
                states: parse_all(rest, names)?,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_all(forms: &[Form], names: &dyn NameCheck) -> ParseResult<Vec<Expr>> {
    forms.iter().map(|f| parse_expr_with(f, names)).collect()
}

fn strip_any<'a>(s: &'a str, prefixes: &[&str]) -> Option<&'a str> {
    prefixes.iter().find_map(|p| s.strip_prefix(p))
}

fn checked_name(
    kind: NameKind,
    name: &str,
    known: impl Fn(&str) -> bool,
) -> ParseResult<String> {
    if name.is_empty() || !known(name) {
        return Err(ParseError::UnknownName {
            kind,
            name: name.to_string(),
        });
    }
    Ok(name.to_string())
}

fn require_exact(op: &str, required: usize, found: usize) -> ParseResult<()> {
    if found != required {
        return Err(ParseError::Arity {
            op: op.to_string(),
            required,
            found,
        });
    }
    Ok(())
}

fn require_at_least(op: &str, required: usize, found: usize) -> ParseResult<()> {
    if found < required {
        return Err(ParseError::Arity {
            op: op.to_string(),
            required,
            found,
        });
    }
    Ok(())
}
