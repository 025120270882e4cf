use agg_lang::ParseError;
use derive_more::From;
use orion_error::{ErrorCode, StructError, UvsReason};

use crate::eval::EvalError;

#[derive(Debug, Clone, PartialEq, thiserror::Error, From)]
pub enum CoreReason {
    #[error("specification error: {0}")]
    Spec(ParseError),
    #[error("evaluation error: {0}")]
    Eval(EvalError),
    #[error("snapshot error")]
    Snapshot,
    #[error("{0}")]
    Uvs(UvsReason),
}

impl ErrorCode for CoreReason {
    fn error_code(&self) -> i32 {
        match self {
            Self::Spec(_) => 1001,
            Self::Eval(_) => 1002,
            Self::Snapshot => 1003,
            Self::Uvs(u) => u.error_code(),
        }
    }
}

pub type CoreError = StructError<CoreReason>;
pub type CoreResult<T> = Result<T, CoreError>;
