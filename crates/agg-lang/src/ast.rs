use std::fmt;

use crate::value::Value;

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

/// Parsed, immutable expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal constant.
    Const(Value),
    /// `event.<name>`: property of the event currently being processed.
    EventProp(String),
    /// `var.<name>` / `variables.<name>`.
    Variable(String),
    /// `agg.<name>` / `aggregators.<name>`: another aggregator's current value.
    AggregatorRef(String),
    /// `arg.<n>`: positional argument of the innermost function call.
    Arg(usize),
    /// `["func.<name>", args...]`
    Call { func: String, args: Vec<Expr> },
    /// `["if", cond, then, else]`
    IfThenElse {
        cond: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },
    /// `[op, a, b, ...]`, folded pairwise left to right.
    Primitive { op: PrimOp, args: Vec<Expr> },
}

/// Built-in operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimOp {
    Eq,
    Ne,
    And,
    Or,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Lt,
    Gt,
    Le,
    Ge,
}

impl PrimOp {
    /// Every operator takes at least this many arguments.
    pub const MIN_ARGS: usize = 2;

    pub const ALL: [PrimOp; 13] = [
        PrimOp::Eq,
        PrimOp::Ne,
        PrimOp::And,
        PrimOp::Or,
        PrimOp::Add,
        PrimOp::Sub,
        PrimOp::Mul,
        PrimOp::Div,
        PrimOp::Mod,
        PrimOp::Lt,
        PrimOp::Gt,
        PrimOp::Le,
        PrimOp::Ge,
    ];

    pub fn from_keyword(s: &str) -> Option<Self> {
        Some(match s {
            "=" => PrimOp::Eq,
            "!=" => PrimOp::Ne,
            "and" => PrimOp::And,
            "or" => PrimOp::Or,
            "+" => PrimOp::Add,
            "-" => PrimOp::Sub,
            "*" => PrimOp::Mul,
            "/" => PrimOp::Div,
            "%" => PrimOp::Mod,
            "<" => PrimOp::Lt,
            ">" => PrimOp::Gt,
            "<=" => PrimOp::Le,
            ">=" => PrimOp::Ge,
            _ => return None,
        })
    }

    pub fn keyword(self) -> &'static str {
        match self {
            PrimOp::Eq => "=",
            PrimOp::Ne => "!=",
            PrimOp::And => "and",
            PrimOp::Or => "or",
            PrimOp::Add => "+",
            PrimOp::Sub => "-",
            PrimOp::Mul => "*",
            PrimOp::Div => "/",
            PrimOp::Mod => "%",
            PrimOp::Lt => "<",
            PrimOp::Gt => ">",
            PrimOp::Le => "<=",
            PrimOp::Ge => ">=",
        }
    }

    /// Operators that coerce both operands to numbers.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            PrimOp::Add
                | PrimOp::Sub
                | PrimOp::Mul
                | PrimOp::Div
                | PrimOp::Mod
                | PrimOp::Lt
                | PrimOp::Gt
                | PrimOp::Le
                | PrimOp::Ge
        )
    }
}

impl fmt::Display for PrimOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

// ---------------------------------------------------------------------------
// Aggregators
// ---------------------------------------------------------------------------

/// The three recognised aggregator kind tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregatorKind {
    SelectIf,
    Funnel,
    StateMachine,
}

impl AggregatorKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "select_if" => Some(AggregatorKind::SelectIf),
            "funnel" => Some(AggregatorKind::Funnel),
            "state_machine" => Some(AggregatorKind::StateMachine),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            AggregatorKind::SelectIf => "select_if",
            AggregatorKind::Funnel => "funnel",
            AggregatorKind::StateMachine => "state_machine",
        }
    }
}

impl fmt::Display for AggregatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Parsed aggregator body: the expressions each kind folds events with.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregatorPlan {
    /// `["select_if", cond, value]`
    SelectIf { cond: Expr, value: Expr },
    /// `["funnel", step, ...]`: at least one step.
    Funnel { steps: Vec<Expr> },
    /// `["state_machine", state, ...]`: at least one state.
    StateMachine { states: Vec<Expr> },
}

impl AggregatorPlan {
    pub fn kind(&self) -> AggregatorKind {
        match self {
            AggregatorPlan::SelectIf { .. } => AggregatorKind::SelectIf,
            AggregatorPlan::Funnel { .. } => AggregatorKind::Funnel,
            AggregatorPlan::StateMachine { .. } => AggregatorKind::StateMachine,
        }
    }
}
