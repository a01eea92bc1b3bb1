// SPDX-License-Identifier: MIT OR Apache-2.0
//! The evaluator (C6): splits source text into commands and dispatches
//! each one, threading the canonical return codes described in §4.2.

use feather_core::host::Host;
use feather_core::{Flow, Interp};
use feather_syntax::{parse_command, skip_command_boundary};

use crate::dispatch::dispatch;
use crate::errors;
use crate::substitute::substitute_words;

/// Evaluates `src` as a script: zero or more commands, in textual order.
/// The result is the last command's result on `OK`; any other code (from a
/// parse error or a command) stops evaluation immediately and propagates.
///
/// Enters one level of the interpreter's nesting guard for the duration of
/// the call (§5's only visible suspension points are recursive entries into
/// this function and [`eval_obj`]).
pub fn eval_string<H: Host>(interp: &mut Interp<H>, src: &[u8]) -> Flow<H::Obj> {
    interp.with_nesting(|interp| eval_string_inner(interp, src))
}

fn eval_string_inner<H: Host>(interp: &mut Interp<H>, src: &[u8]) -> Flow<H::Obj> {
    let mut pos = 0;
    let mut result = interp.host.nil();
    loop {
        pos = skip_command_boundary(src, pos, false);
        if pos >= src.len() {
            break;
        }
        let parsed = match parse_command(src, pos) {
            Ok(p) => p,
            Err(e) => return Flow::Break(errors::raise(interp, &e.to_string())),
        };
        pos = parsed.consumed;
        if parsed.command.words.is_empty() {
            continue;
        }
        let words = match substitute_words(interp, &parsed.command.words) {
            Flow::Continue(w) => w,
            Flow::Break(signal) => return Flow::Break(signal),
        };
        match eval_obj(interp, &words) {
            Flow::Continue(v) => result = v,
            Flow::Break(signal) => return Flow::Break(signal),
        }
    }
    Flow::Continue(result)
}

/// Evaluates one already-substituted command: `args[0]` is the command
/// name, `args[1..]` are its arguments. Sets the interpreter's result slot
/// to the callee's value on `OK`; on any other code the result slot is left
/// untouched, matching §4.2's contract.
pub fn eval_obj<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.is_empty() {
        return Flow::Continue(interp.host.nil());
    }
    match dispatch(interp, args) {
        Flow::Continue(value) => {
            interp.host.set_result(value.clone());
            Flow::Continue(value)
        }
        Flow::Break(signal) => Flow::Break(signal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feather_core::host::{BuiltinFn, Command};
    use feather_core::Limits;
    use feather_stub::StubHost;

    fn cmd_echo<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
        Flow::Continue(args.first().cloned().unwrap_or_else(|| interp.host.nil()))
    }

    fn new_interp_with_echo() -> Interp<StubHost> {
        let mut interp = Interp::new(StubHost::new(), Limits::default());
        let root = interp.host.ns_root();
        let f: BuiltinFn<StubHost> = cmd_echo;
        interp.host.set_command(root, "echo", Command::Builtin(f));
        interp
    }

    #[test]
    fn evaluates_single_command() {
        let mut interp = new_interp_with_echo();
        let result = eval_string(&mut interp, b"echo hi");
        assert_matches::assert_matches!(result, Flow::Continue(v) => {
            assert_eq!(interp.host.text(&v), "hi");
        });
    }

    #[test]
    fn evaluates_multiple_commands_in_order() {
        let mut interp = new_interp_with_echo();
        let result = eval_string(&mut interp, b"echo first\necho second");
        assert_matches::assert_matches!(result, Flow::Continue(v) => {
            assert_eq!(interp.host.text(&v), "second");
        });
    }

    #[test]
    fn empty_script_yields_nil() {
        let mut interp = new_interp_with_echo();
        let result = eval_string(&mut interp, b"  \n  ; \n");
        assert_matches::assert_matches!(result, Flow::Continue(v) => {
            assert!(interp.host.is_nil(&v));
        });
    }

    #[test]
    fn nested_command_substitution_evaluates_recursively() {
        let mut interp = new_interp_with_echo();
        let result = eval_string(&mut interp, b"echo [echo inner]");
        assert_matches::assert_matches!(result, Flow::Continue(v) => {
            assert_eq!(interp.host.text(&v), "inner");
        });
    }
}
