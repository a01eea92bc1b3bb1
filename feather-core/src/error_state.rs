// SPDX-License-Identifier: MIT OR Apache-2.0
//! The error-propagation state machine (return-options accumulation).
//!
//! When an `ERROR` signal unwinds through nested command and procedure calls,
//! each frame it passes through appends a line to a traceback (`errorInfo`)
//! and, the first time, seeds `errorCode`. This module holds that bookkeeping
//! as an explicit, inspectable state machine rather than folding it into the
//! control-flow propagation itself, the same separation of concerns the
//! interpreter's `-errorinfo`/`-errorcode` return options describe.

use crate::control::Signal;

/// One appended traceback line, in the order frames are unwound.
#[derive(Clone, Debug)]
pub struct StackEntry {
    pub text: String,
}

/// Traceback state accumulated while an `Error` signal is in flight.
#[derive(Clone, Debug, Default)]
struct MachineState {
    error_code_seeded: bool,
    error_code: Option<String>,
    stack: Vec<StackEntry>,
}

/// Finalized error state, read out once unwinding reaches a `catch` or the
/// top level.
#[derive(Clone, Debug)]
pub struct FinalizedError {
    /// Accumulated `errorInfo`-style traceback, newest-appended last.
    pub stack: Vec<StackEntry>,
    /// The explicit `errorCode`, if one was seeded; `None` means the
    /// default (`NONE`) applies.
    pub error_code: Option<String>,
}

/// Tracks traceback accumulation across a single error's unwind.
///
/// An `ErrorTracker` is a field of [`crate::Interp`], not of any individual
/// `Signal`: it is reset each time a *new* error is seeded and read out (via
/// [`ErrorTracker::finalize`]) wherever the unwind stops, typically inside
/// the `catch`/`try` builtin.
#[derive(Clone, Debug, Default)]
pub struct ErrorTracker {
    state: Option<MachineState>,
}

impl ErrorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff an error is currently unwinding.
    pub fn is_active(&self) -> bool {
        self.state.is_some()
    }

    /// Begins tracking a freshly raised error. Called exactly once, at the
    /// point the `Error` signal is first produced (e.g. by the `error`
    /// builtin or a failed built-in operation).
    pub fn seed(&mut self) {
        tracing::trace!("error state: idle -> accumulating");
        self.state = Some(MachineState::default());
    }

    /// Begins tracking an error that already carries an explicit error code
    /// (e.g. `return -code error -errorcode {...}` or `error msg info code`),
    /// suppressing the default error-code seeding that would otherwise
    /// happen on first traceback append.
    pub fn seed_explicit(&mut self, error_code: impl Into<String>) {
        self.state = Some(MachineState {
            error_code_seeded: true,
            error_code: Some(error_code.into()),
            stack: Vec::new(),
        });
    }

    /// True iff an explicit or default error code has already been recorded
    /// for the in-flight error.
    pub fn error_code_seeded(&self) -> bool {
        self.state.as_ref().map_or(false, |s| s.error_code_seeded)
    }

    pub fn mark_error_code_seeded(&mut self) {
        if let Some(state) = &mut self.state {
            state.error_code_seeded = true;
        }
    }

    /// The explicit error code seeded via [`Self::seed_explicit`], if any.
    pub fn error_code(&self) -> Option<&str> {
        self.state.as_ref().and_then(|s| s.error_code.as_deref())
    }

    /// Appends one traceback line as the error unwinds through a frame
    /// boundary. A no-op if no error is currently active (tracker was never
    /// seeded, or was already finalized).
    pub fn append_frame(&mut self, text: impl Into<String>) {
        if let Some(state) = &mut self.state {
            state.stack.push(StackEntry { text: text.into() });
        }
    }

    /// Consumes the in-flight state, returning the accumulated traceback.
    /// Returns `None` if no error was active.
    pub fn finalize(&mut self) -> Option<FinalizedError> {
        self.state.take().map(|state| FinalizedError {
            stack: state.stack,
            error_code: state.error_code,
        })
    }

    /// Discards in-flight tracking without finalizing, used when a `catch`
    /// consumes the error and the caller does not need the traceback text.
    pub fn discard(&mut self) {
        if self.state.is_some() {
            tracing::trace!("error state: accumulating -> idle (discarded)");
        }
        self.state = None;
    }
}

/// True iff `signal` is the kind of non-`OK` outcome that should seed or
/// extend error-traceback tracking (as opposed to `Break`/`Continue`/a custom
/// code, which carry no traceback).
pub fn tracks_traceback<O>(signal: &Signal<O>) -> bool {
    matches!(signal, Signal::Error { .. })
}
