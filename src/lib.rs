// SPDX-License-Identifier: MIT OR Apache-2.0
//! Facade crate for the Feather Tcl-dialect interpreter core.
//!
//! Re-exports the member crates that make up the core (data model,
//! glob/index/level parsing, script parser, evaluator, and built-in
//! catalog) under one name, plus [`Interpreter`]: a batteries-included
//! convenience wrapper over [`feather_stub::StubHost`] for embedders who
//! don't need a custom object system. Anyone bringing their own `Obj`
//! representation depends on `feather-core`/`feather-semantics`/
//! `feather-builtin` directly instead of going through this type.

pub use feather_builtin as builtin;
pub use feather_core as core;
pub use feather_fnmatch as fnmatch;
pub use feather_semantics as semantics;
pub use feather_stub as stub;
pub use feather_syntax as syntax;

pub use feather_core::{Flow, Interp, Limits, Signal};
pub use feather_stub::StubHost;

/// What went wrong running a script through [`Interpreter::eval`].
///
/// Wraps whichever non-`OK` [`Signal`] the script produced into a single
/// message string; a caller that needs the distinct return code or return
/// options dict should drop down to [`Interp`]/[`feather_semantics`]
/// directly rather than go through this convenience wrapper.
#[derive(thiserror::Error, Debug)]
pub enum EvalError {
    #[error("{0}")]
    Error(String),
    #[error("invoked \"return\" outside of a procedure")]
    Return,
    #[error("invoked \"break\" outside of a loop")]
    Break,
    #[error("invoked \"continue\" outside of a loop")]
    Continue,
    #[error("non-local exit with code {0}")]
    Custom(i32),
}

/// A ready-to-use interpreter: [`StubHost`] storage, the full built-in
/// catalog installed, wrapped behind a small string-in/string-out API.
///
/// This is the fast path for embedding Feather without writing a `Host`
/// implementation. It is not the only way to use this crate: any type
/// implementing [`feather_core::host::Host`] can run the same scripts
/// through [`feather_semantics::eval_string`] directly.
pub struct Interpreter {
    interp: Interp<StubHost>,
}

impl Interpreter {
    /// Builds an interpreter with [`Limits::default`] and the full built-in
    /// catalog (§4.6) installed.
    pub fn new() -> Self {
        Self::with_limits(Limits::default())
    }

    /// Builds an interpreter with caller-supplied resource limits.
    pub fn with_limits(limits: Limits) -> Self {
        let mut host = StubHost::new();
        feather_builtin::install(&mut host);
        Interpreter {
            interp: Interp::new(host, limits),
        }
    }

    /// Evaluates `script`, returning the final result's string projection on
    /// `OK`, or an [`EvalError`] describing the non-`OK` code otherwise.
    pub fn eval(&mut self, script: &str) -> Result<String, EvalError> {
        match feather_semantics::eval_string(&mut self.interp, script.as_bytes()) {
            Flow::Continue(value) => Ok(self.interp.host.text(&value)),
            Flow::Break(Signal::Error { message, .. }) => {
                Err(EvalError::Error(self.interp.host.text(&message)))
            }
            Flow::Break(Signal::Return { .. }) => Err(EvalError::Return),
            Flow::Break(Signal::Break) => Err(EvalError::Break),
            Flow::Break(Signal::Continue) => Err(EvalError::Continue),
            Flow::Break(Signal::Custom(code)) => Err(EvalError::Custom(code)),
        }
    }

    /// Reads a global variable's current value, if it exists.
    pub fn get_var(&self, name: &str) -> Option<String> {
        use feather_core::host::{FrameOps, StringOps, VarOps};
        let global = self.interp.host.frame_global();
        self.interp.host.var_get(global, name).map(|v| self.interp.host.text(&v))
    }

    /// Assigns a global variable.
    pub fn set_var(&mut self, name: &str, value: &str) {
        use feather_core::host::{FrameOps, StringOps, VarOps};
        let global = self.interp.host.frame_global();
        let obj = self.interp.host.intern(value.as_bytes());
        self.interp.host.var_set(global, name, obj);
    }

    /// Direct access to the underlying [`Interp`], for callers who need the
    /// full host vtable (e.g. to register additional builtins).
    pub fn interp_mut(&mut self) -> &mut Interp<StubHost> {
        &mut self.interp
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eval_runs_a_script_and_returns_its_result() {
        let mut interp = Interpreter::new();
        let result = interp.eval("set x 3; incr x 4; set x").unwrap();
        assert_eq!(result, "7");
    }

    #[test]
    fn eval_surfaces_errors() {
        let mut interp = Interpreter::new();
        let err = interp.eval("error oops").unwrap_err();
        assert_eq!(err.to_string(), "oops");
    }

    #[test]
    fn vars_are_readable_between_eval_calls() {
        let mut interp = Interpreter::new();
        interp.eval("set greeting hello").unwrap();
        assert_eq!(interp.get_var("greeting").as_deref(), Some("hello"));
        interp.set_var("greeting", "hi");
        assert_eq!(interp.eval("set greeting").unwrap(), "hi");
    }
}
