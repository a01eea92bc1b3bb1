// SPDX-License-Identifier: MIT OR Apache-2.0
//! The interpreter handle.
//!
//! `Interp<H>` wraps a host together with the bookkeeping the core itself
//! owns: recursion depth, the in-flight error tracker, the tail-call slot,
//! and resource limits. The host owns all concrete value/variable/namespace
//! storage; everything in this struct besides `host` is storage the core
//! needs that has no natural home in the host vtable.

use crate::control::{Flow, Signal};
use crate::error_state::ErrorTracker;
use crate::host::Host;
use crate::limits::Limits;

/// A pending tail call, recorded by a builtin (`return`'s tailcall form, or
/// an evaluator optimization for a procedure's final command) for the
/// dispatcher to pick up instead of recursing further.
///
/// There is a single slot, not a stack: only the innermost pending tail call
/// matters, and a new one simply overwrites it.
pub struct TailCall<O> {
    pub command: String,
    pub args: Vec<O>,
}

/// A registered `trace add variable` entry: `name` is the traced variable,
/// `ops` the subset of `r`/`w`/`u` it was registered for, `command` the
/// prefix to invoke.
///
/// Registration and enumeration (`trace info variable`) are core-owned
/// bookkeeping the same way the tail-call slot is; there is no host hook to
/// store these against, since a traced name need not correspond to any
/// variable that exists yet.
pub struct VarTrace<O> {
    pub name: String,
    pub ops: String,
    pub command: O,
}

/// The interpreter core, generic over a host implementation `H`.
///
/// Construct with [`Interp::new`], supplying a host and the resource limits
/// to enforce. Evaluation entry points live in `feather-semantics`, which is
/// generic over `H: Host` and operates on `&mut Interp<H>`.
pub struct Interp<H: Host> {
    pub host: H,
    pub(crate) limits: Limits,
    pub(crate) depth: usize,
    pub(crate) errors: ErrorTracker,
    pub(crate) tailcall: Option<TailCall<H::Obj>>,
    pub(crate) var_traces: Vec<VarTrace<H::Obj>>,
}

impl<H: Host> Interp<H> {
    pub fn new(host: H, limits: Limits) -> Self {
        Interp {
            host,
            limits,
            depth: 0,
            errors: ErrorTracker::new(),
            tailcall: None,
            var_traces: Vec::new(),
        }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn errors(&mut self) -> &mut ErrorTracker {
        &mut self.errors
    }

    /// Current nesting depth (procedure calls, `uplevel`, nested `eval`).
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Enters one level of nesting for the duration of `body`, failing with
    /// an `Error` signal if doing so would exceed
    /// [`Limits::max_nesting_depth`] instead of overflowing the Rust call
    /// stack.
    pub fn with_nesting<T>(
        &mut self,
        body: impl FnOnce(&mut Self) -> Flow<H::Obj, T>,
    ) -> Flow<H::Obj, T> {
        if self.depth >= self.limits.max_nesting_depth {
            let message = self
                .host
                .intern(b"too many nested evaluations (infinite loop?)");
            let options = self.host.list_new();
            self.errors.seed();
            return Flow::Break(Signal::Error { message, options });
        }
        self.depth += 1;
        let result = body(self);
        self.depth -= 1;
        result
    }

    /// Records a pending tail call, overwriting any previous one.
    pub fn set_tailcall(&mut self, command: String, args: Vec<H::Obj>) {
        tracing::trace!(command = %command, argc = args.len(), "scheduling tailcall");
        self.tailcall = Some(TailCall { command, args });
    }

    /// Takes the pending tail call, if any, clearing the slot.
    pub fn take_tailcall(&mut self) -> Option<TailCall<H::Obj>> {
        self.tailcall.take()
    }

    /// Registers a variable trace (`trace add variable`).
    pub fn add_var_trace(&mut self, name: String, ops: String, command: H::Obj) {
        self.var_traces.push(VarTrace { name, ops, command });
    }

    /// Removes a previously-registered variable trace matching `name`,
    /// `ops`, and `command`'s string projection exactly.
    pub fn remove_var_trace(&mut self, name: &str, ops: &str, command_text: &str) {
        self.var_traces.retain(|t| !(t.name == name && t.ops == ops && self.host.text(&t.command) == command_text));
    }

    /// Traces currently registered against `name`.
    pub fn var_traces_for(&self, name: &str) -> impl Iterator<Item = &VarTrace<H::Obj>> {
        self.var_traces.iter().filter(move |t| t.name == name)
    }
}
