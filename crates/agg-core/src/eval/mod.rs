mod env;
mod stack;


pub use env::{Env, MapEnv};
pub use stack::{ArgStack, FrameGuard};

use agg_lang::{Expr, PrimOp, Value};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Evaluation failure. Lookup misses are not errors; they yield null.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("`{op}` expected a number, found {value:?}")]
    NotANumber { op: PrimOp, value: Value },
    #[error("call depth limit {limit} exceeded calling `{func}`")]
    CallDepthExceeded { func: String, limit: usize },
}

pub type EvalResult<T> = Result<T, EvalError>;

// ---------------------------------------------------------------------------
// Evaluator
// ---------------------------------------------------------------------------

/// Evaluate `expr` against `env`.
///
/// `stack` holds the argument frames of enclosing calls; `Arg(n)` reads the
/// top frame. Each `Call` pushes exactly one frame and pops it on every exit
/// path, so the stack is back to its entry depth when this returns.
pub fn eval(expr: &Expr, env: &dyn Env, stack: &mut ArgStack) -> EvalResult<Value> {
    match expr {
        Expr::Const(v) => Ok(v.clone()),
        Expr::EventProp(name) => Ok(env.event_prop(name).cloned().unwrap_or_default()),
        Expr::Variable(name) => Ok(env.variable(name).cloned().unwrap_or_default()),
        Expr::AggregatorRef(name) => Ok(env.aggregator_value(name).unwrap_or_default()),
        Expr::Arg(index) => Ok(stack.arg(*index).cloned().unwrap_or_default()),
        Expr::IfThenElse {
            cond,
            then_expr,
            else_expr,
        } => {
            if eval(cond, env, stack)?.is_truthy() {
                eval(then_expr, env, stack)
            } else {
                eval(else_expr, env, stack)
            }
        }
        Expr::Primitive { op, args } => {
            let values = eval_all(args, env, stack)?;
            fold_primitive(*op, values)
        }
        Expr::Call { func, args } => {
            let values = eval_all(args, env, stack)?;
            let mut frame = stack.enter(func, values)?;
            match env.function(func) {
                Some(body) => eval(body, env, &mut frame),
                None => Ok(Value::Null),
            }
        }
    }
}

fn eval_all(args: &[Expr], env: &dyn Env, stack: &mut ArgStack) -> EvalResult<Vec<Value>> {
    args.iter().map(|a| eval(a, env, stack)).collect()
}

/// Fold already-evaluated operands pairwise from the left:
/// `op(a, b, c) == op(op(a, b), c)`.
fn fold_primitive(op: PrimOp, values: Vec<Value>) -> EvalResult<Value> {
    let mut iter = values.into_iter();
    let Some(first) = iter.next() else {
        return Ok(Value::Null);
    };
    iter.try_fold(first, |acc, next| apply_primitive(op, acc, next))
}

fn apply_primitive(op: PrimOp, left: Value, right: Value) -> EvalResult<Value> {
    let out = match op {
        PrimOp::Eq => Value::Bool(left == right),
        PrimOp::Ne => Value::Bool(left != right),
        PrimOp::And => {
            if left.is_truthy() {
                right
            } else {
                left
            }
        }
        PrimOp::Or => {
            if left.is_truthy() {
                left
            } else {
                right
            }
        }
        PrimOp::Add => Value::Number(number(op, &left)? + number(op, &right)?),
        PrimOp::Sub => Value::Number(number(op, &left)? - number(op, &right)?),
        PrimOp::Mul => Value::Number(number(op, &left)? * number(op, &right)?),
        PrimOp::Div => Value::Number(number(op, &left)? / number(op, &right)?),
        PrimOp::Mod => Value::Number(number(op, &left)? % number(op, &right)?),
        PrimOp::Lt => Value::Bool(number(op, &left)? < number(op, &right)?),
        PrimOp::Gt => Value::Bool(number(op, &left)? > number(op, &right)?),
        PrimOp::Le => Value::Bool(number(op, &left)? <= number(op, &right)?),
        PrimOp::Ge => Value::Bool(number(op, &left)? >= number(op, &right)?),
    };
    Ok(out)
}

fn number(op: PrimOp, v: &Value) -> EvalResult<f64> {
    v.to_number().ok_or_else(|| EvalError::NotANumber {
        op,
        value: v.clone(),
    })
}
