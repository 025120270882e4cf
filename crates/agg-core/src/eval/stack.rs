use std::ops::{Deref, DerefMut};

use agg_lang::Value;

use super::{EvalError, EvalResult};

/// Argument frames of the function calls currently being evaluated.
///
/// Frames are only pushed through [`ArgStack::enter`], which returns a guard
/// that pops the frame when dropped.
#[derive(Debug, Clone)]
pub struct ArgStack {
    frames: Vec<Vec<Value>>,
    max_depth: usize,
}

impl ArgStack {
    pub const DEFAULT_MAX_DEPTH: usize = 2048;

    pub fn new() -> Self {
        Self::with_max_depth(Self::DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            frames: Vec::new(),
            max_depth,
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Argument `index` of the innermost call, if any.
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.frames.last().and_then(|frame| frame.get(index))
    }

    /// Push a frame for a call to `func`.
    pub fn enter(&mut self, func: &str, args: Vec<Value>) -> EvalResult<FrameGuard<'_>> {
        if self.frames.len() >= self.max_depth {
            return Err(EvalError::CallDepthExceeded {
                func: func.to_string(),
                limit: self.max_depth,
            });
        }
        self.frames.push(args);
        Ok(FrameGuard { stack: self })
    }
}

impl Default for ArgStack {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoped frame: pops exactly the frame it pushed when dropped, including
/// when the call body returns an error.
pub struct FrameGuard<'a> {
    stack: &'a mut ArgStack,
}

impl Deref for FrameGuard<'_> {
    type Target = ArgStack;

    fn deref(&self) -> &ArgStack {
        self.stack
    }
}

impl DerefMut for FrameGuard<'_> {
    fn deref_mut(&mut self) -> &mut ArgStack {
        self.stack
    }
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        self.stack.frames.pop();
    }
}
