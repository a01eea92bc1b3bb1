// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command dispatch (C8): resolving a command word to a callable and
//! invoking it, including the host's unknown-command hook and user
//! procedure invocation (frame push/bind/eval/pop, `RETURN` consumption,
//! and the tail-call hook).

use std::rc::Rc;

use feather_core::host::{BuiltinFn, Command, Host, ProcDef, UnknownResolution};
use feather_core::{Flow, Interp, Signal};
use tracing::trace;

use crate::errors;
use crate::eval::eval_string;
use crate::resolve::resolve_command;

/// Dispatches `args[0]` as a command name against `args[1..]` as arguments,
/// per §4.4. `args` must be non-empty; callers (`eval_obj`) are responsible
/// for that precondition.
pub fn dispatch<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    let name = interp.host.text(&args[0]);
    dispatch_named(interp, &name, args)
}

fn dispatch_named<H: Host>(interp: &mut Interp<H>, name: &str, args: &[H::Obj]) -> Flow<H::Obj> {
    let frame = interp.host.frame_current();
    match resolve_command(&interp.host, frame, name) {
        Some(command) => invoke(interp, name, command, &args[1..]),
        None => match interp.host.unknown(name, &args[1..]) {
            UnknownResolution::Builtin(f) => invoke(interp, name, Command::Builtin(f), &args[1..]),
            UnknownResolution::Proc(p) => invoke(interp, name, Command::Proc(p), &args[1..]),
            UnknownResolution::Alias(target) => {
                let mut forwarded = vec![interp.host.intern(target.as_bytes())];
                forwarded.extend_from_slice(&args[1..]);
                dispatch(interp, &forwarded)
            }
            UnknownResolution::NoSuchCommand => {
                trace!(command = name, "no such command");
                Flow::Break(errors::raise(interp, &format!("invalid command name \"{name}\"")))
            }
        },
    }
}

fn invoke<H: Host>(interp: &mut Interp<H>, name: &str, command: Command<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    match command {
        Command::Builtin(f) => invoke_builtin(interp, f, args),
        Command::Proc(def) => invoke_proc(interp, name, &def, args),
        Command::Alias(target) => {
            let mut forwarded = vec![interp.host.intern(target.as_bytes())];
            forwarded.extend_from_slice(args);
            dispatch(interp, &forwarded)
        }
    }
}

fn invoke_builtin<H: Host>(interp: &mut Interp<H>, f: BuiltinFn<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    f(interp, args)
}

/// Invokes a user procedure: pushes a frame in the procedure's defining
/// namespace, binds parameters (including a trailing variadic `args`),
/// evaluates the body as a script, and pops the frame. `RETURN` becomes the
/// procedure's normal result; `BREAK`/`CONTINUE` escaping the body become
/// errors; any other code (including a custom `return -code`) propagates
/// unchanged to the caller.
/// Invokes an anonymous procedure definition directly, the way `apply` does
/// for a `{params body}` lambda that was never registered under a command
/// name. Shares `invoke_proc`'s frame/bind/body/tailcall machinery.
pub fn apply_proc<H: Host>(interp: &mut Interp<H>, def: &Rc<ProcDef<H::Obj>>, args: &[H::Obj]) -> Flow<H::Obj> {
    invoke_proc(interp, "apply", def, args)
}

fn invoke_proc<H: Host>(
    interp: &mut Interp<H>,
    name: &str,
    def: &Rc<ProcDef<H::Obj>>,
    args: &[H::Obj],
) -> Flow<H::Obj> {
    if let Err(signal) = check_arity(interp, name, def, args.len()) {
        return Flow::Break(signal);
    }

    let ns = interp.host.frame_namespace(interp.host.frame_current());
    let proc_ns = crate::resolve::lookup_namespace_path(&interp.host, interp.host.ns_root(), &def.ns_name)
        .unwrap_or(ns);
    let frame = interp.host.frame_push(proc_ns);

    bind_params(interp, frame, def, args);

    let body = def.body.clone();
    let body_bytes = interp.host.bytes(&body);
    let outcome = eval_string(interp, &body_bytes);

    let value_or_signal = match outcome {
        Flow::Continue(v) => Ok(v),
        Flow::Break(Signal::Return { level }) if level <= 1 => Ok(interp.host.get_result()),
        Flow::Break(Signal::Return { level }) => Err(Signal::Return { level: level - 1 }),
        Flow::Break(signal) if signal.is_loop_control() => {
            let which = if matches!(signal, Signal::Break) {
                "break"
            } else {
                "continue"
            };
            Err(errors::loop_control_escaped(interp, which))
        }
        Flow::Break(signal) => {
            let line = interp.host.frame_line(frame);
            errors::append_proc_frame(interp, name, line);
            Err(signal)
        }
    };

    let result = match value_or_signal {
        Ok(value) => match interp.take_tailcall() {
            None => Flow::Continue(value),
            Some(tailcall) => {
                let mut forwarded = vec![interp.host.intern(tailcall.command.as_bytes())];
                forwarded.extend(tailcall.args);
                dispatch(interp, &forwarded)
            }
        },
        Err(signal) => Flow::Break(signal),
    };

    interp.host.frame_pop();
    result
}

fn check_arity<H: Host>(
    interp: &mut Interp<H>,
    name: &str,
    def: &ProcDef<H::Obj>,
    argc: usize,
) -> Result<(), Signal<H::Obj>> {
    let required = def.params.iter().filter(|p| p.default.is_none()).count();
    let max = if def.variadic { usize::MAX } else { def.params.len() };
    if argc < required || argc > max {
        let usage = format_usage(name, def);
        return Err(errors::raise(interp, &format!("wrong # args: should be \"{usage}\"")));
    }
    Ok(())
}

fn format_usage<H: Host>(name: &str, def: &ProcDef<H::Obj>) -> String {
    let mut parts = vec![name.to_string()];
    for (i, param) in def.params.iter().enumerate() {
        let is_last = i + 1 == def.params.len();
        if is_last && def.variadic {
            parts.push(param.name.clone());
        } else if param.default.is_some() {
            parts.push(format!("?{}?", param.name));
        } else {
            parts.push(param.name.clone());
        }
    }
    parts.join(" ")
}

fn bind_params<H: Host>(interp: &mut Interp<H>, frame: H::Frame, def: &ProcDef<H::Obj>, args: &[H::Obj]) {
    let mut i = 0;
    for (idx, param) in def.params.iter().enumerate() {
        let is_last = idx + 1 == def.params.len();
        if is_last && def.variadic {
            let mut rest = interp.host.list_new();
            for arg in &args[i.min(args.len())..] {
                rest = interp.host.list_push(&rest, arg.clone());
            }
            interp.host.var_set(frame, &param.name, rest);
            i = args.len();
        } else if i < args.len() {
            interp.host.var_set(frame, &param.name, args[i].clone());
            i += 1;
        } else if let Some(default) = &param.default {
            interp.host.var_set(frame, &param.name, default.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feather_core::Limits;
    use feather_stub::StubHost;

    #[test]
    fn unknown_command_is_an_error() {
        let mut interp = Interp::new(StubHost::new(), Limits::default());
        let cmd = interp.host.intern(b"nope");
        let result = dispatch(&mut interp, &[cmd]);
        assert_matches::assert_matches!(result, Flow::Break(Signal::Error { .. }));
    }
}
