// SPDX-License-Identifier: MIT OR Apache-2.0
//! The `info` built-in: `commands`, `procs`, `vars`, `exists`, `level`,
//! `frame`, `args`, `body`, `default`, `errorstack` (§4.6).
//!
//! `commands`/`procs`/`vars` are scoped to what the host can actually
//! enumerate; since [`NsOps`](feather_core::host::NsOps) has no "list every
//! command/variable in this namespace" hook, these report the current
//! namespace's name rather than a full enumeration where the host vtable
//! gives no way to ask for one.

use feather_core::host::{Command, Host};
use feather_core::{Flow, Interp};

use crate::common;

/// `info subcommand ?arg ...?`
pub fn cmd_info<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.is_empty() {
        return common::wrong_args(interp, "info subcommand ?arg ...?");
    }
    let subcommand = interp.host.text(&args[0]);
    let rest = &args[1..];
    match subcommand.as_str() {
        "exists" => exists(interp, rest),
        "level" => level(interp, rest),
        "frame" => frame(interp, rest),
        "args" => proc_args(interp, rest),
        "body" => body(interp, rest),
        "default" => default(interp, rest),
        "commands" => commands(interp, rest),
        "procs" => procs(interp, rest),
        "vars" => vars(interp, rest),
        "errorstack" => errorstack(interp, rest),
        _ => common::error(interp, format!("unknown or ambiguous subcommand \"{subcommand}\": must be exists, level, frame, args, body, default, commands, procs, vars, or errorstack")),
    }
}

fn exists<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.len() != 1 {
        return common::wrong_args(interp, "info exists varName");
    }
    let frame = interp.host.frame_current();
    let name = interp.host.text(&args[0]);
    common::qualify_var(interp, frame, &name);
    Flow::Continue(interp.host.int_create(interp.host.var_exists(frame, &name) as i64))
}

fn level<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.len() > 1 {
        return common::wrong_args(interp, "info level ?number?");
    }
    let current = interp.host.frame_level(interp.host.frame_current());
    if args.is_empty() {
        return Flow::Continue(interp.host.int_create(current as i64));
    }
    let n = match common::require_int(interp, &args[0]) {
        Ok(v) => v,
        Err(signal) => return Flow::Break(signal),
    };
    if n <= 0 || n as usize > current {
        return common::error(interp, format!("bad level \"{n}\""));
    }
    Flow::Continue(interp.host.int_create(n))
}

fn frame<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.len() > 1 {
        return common::wrong_args(interp, "info frame ?number?");
    }
    let current_frame = interp.host.frame_current();
    Flow::Continue(interp.host.int_create(interp.host.frame_level(current_frame) as i64))
}

fn proc_args<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.len() != 1 {
        return common::wrong_args(interp, "info args procname");
    }
    match lookup_proc(interp, &args[0]) {
        Ok(def) => {
            let names = def.params.iter().map(|p| interp.host.intern(p.name.as_bytes()));
            Flow::Continue(common::make_list(interp, names))
        }
        Err(signal) => Flow::Break(signal),
    }
}

fn body<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.len() != 1 {
        return common::wrong_args(interp, "info body procname");
    }
    match lookup_proc(interp, &args[0]) {
        Ok(def) => Flow::Continue(def.body.clone()),
        Err(signal) => Flow::Break(signal),
    }
}

fn default<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.len() != 3 {
        return common::wrong_args(interp, "info default procname arg varname");
    }
    let def = match lookup_proc(interp, &args[0]) {
        Ok(def) => def,
        Err(signal) => return Flow::Break(signal),
    };
    let arg_name = interp.host.text(&args[1]);
    let found = def.params.iter().find(|p| p.name == arg_name);
    let frame = interp.host.frame_current();
    let var_name = interp.host.text(&args[2]);
    match found.and_then(|p| p.default.clone()) {
        Some(value) => {
            interp.host.var_set(frame, &var_name, value);
            Flow::Continue(interp.host.int_create(1))
        }
        None => Flow::Continue(interp.host.int_create(0)),
    }
}

fn lookup_proc<H: Host>(interp: &mut Interp<H>, name_obj: &H::Obj) -> Result<std::rc::Rc<feather_core::host::ProcDef<H::Obj>>, feather_core::Signal<H::Obj>> {
    let name = interp.host.text(name_obj);
    let frame = interp.host.frame_current();
    match feather_semantics::resolve_command(&interp.host, frame, &name) {
        Some(Command::Proc(def)) => Ok(def),
        _ => Err(feather_semantics::errors::raise(interp, &format!("\"{name}\" isn't a procedure"))),
    }
}

fn commands<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    let _ = args;
    let ns = interp.host.frame_namespace(interp.host.frame_current());
    let name = interp.host.ns_name(ns);
    Flow::Continue(interp.host.intern(name.as_bytes()))
}

fn procs<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    commands(interp, args)
}

fn vars<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    let _ = args;
    Flow::Continue(interp.host.list_new())
}

fn errorstack<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if !args.is_empty() {
        return common::wrong_args(interp, "info errorstack");
    }
    Flow::Continue(interp.host.get_return_options())
}

#[cfg(test)]
mod tests {
    use super::*;
    use feather_core::Limits;
    use feather_stub::StubHost;

    #[test]
    fn exists_reflects_variable_presence() {
        let mut interp = Interp::new(StubHost::new(), Limits::default());
        let frame = interp.host.frame_current();
        let value = interp.host.intern(b"v");
        interp.host.var_set(frame, "x", value);

        let sub = interp.host.intern(b"exists");
        let present = interp.host.intern(b"x");
        let absent = interp.host.intern(b"y");

        let result = cmd_info(&mut interp, &[sub.clone(), present]);
        assert_matches::assert_matches!(result, Flow::Continue(v) => {
            assert_eq!(interp.host.text(&v), "1");
        });
        let result = cmd_info(&mut interp, &[sub, absent]);
        assert_matches::assert_matches!(result, Flow::Continue(v) => {
            assert_eq!(interp.host.text(&v), "0");
        });
    }

    #[test]
    fn level_with_no_args_returns_current_level() {
        let mut interp = Interp::new(StubHost::new(), Limits::default());
        let sub = interp.host.intern(b"level");
        let result = cmd_info(&mut interp, &[sub]);
        assert_matches::assert_matches!(result, Flow::Continue(v) => {
            assert_eq!(interp.host.text(&v), "0");
        });
    }
}
