// SPDX-License-Identifier: MIT OR Apache-2.0
//! `proc`, `apply`, `rename`, and `tailcall` (§4.6): defining, invoking, and
//! renaming user procedures.

use std::rc::Rc;

use feather_core::host::{Command, Host, Param, ProcDef};
use feather_core::{Flow, Interp};

use crate::common;

fn parse_params<H: Host>(interp: &mut Interp<H>, spec: &H::Obj) -> Result<(Vec<Param<H::Obj>>, bool), feather_core::Signal<H::Obj>> {
    let elements = common::list_elements(interp, spec)?;
    let mut params = Vec::with_capacity(elements.len());
    let mut variadic = false;
    for (i, elem) in elements.iter().enumerate() {
        let parts = common::list_elements(interp, elem)?;
        let (name, default) = match parts.len() {
            0 => continue,
            1 => (interp.host.text(&parts[0]), None),
            _ => (interp.host.text(&parts[0]), Some(parts[1].clone())),
        };
        let is_last = i + 1 == elements.len();
        if is_last && name == "args" {
            variadic = true;
        }
        params.push(Param { name, default });
    }
    Ok((params, variadic))
}

/// `proc name params body`
pub fn cmd_proc<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.len() != 3 {
        return common::wrong_args(interp, "proc name args body");
    }
    let name = interp.host.text(&args[0]);
    let (params, variadic) = match parse_params(interp, &args[1]) {
        Ok(p) => p,
        Err(signal) => return Flow::Break(signal),
    };

    let split = feather_semantics::split_qualified_name(&name);
    let root = interp.host.ns_root();
    let current_ns = interp.host.frame_namespace(interp.host.frame_current());
    let target_ns = if split.absolute || !split.namespace.is_empty() {
        match feather_semantics::resolve::lookup_namespace_path(&interp.host, root, &split.namespace) {
            Some(ns) => ns,
            None => return common::error(interp, format!("can't create procedure \"{name}\": parent namespace doesn't exist")),
        }
    } else {
        current_ns
    };
    let ns_name = interp.host.ns_name(target_ns);

    let def = Rc::new(ProcDef {
        params,
        variadic,
        body: args[2].clone(),
        ns_name,
    });
    interp.host.set_command(target_ns, &split.tail, Command::Proc(def));
    Flow::Continue(interp.host.nil())
}

/// `apply {params body} ?arg ...?` / `apply lambdaExpr ?arg ...?`
pub fn cmd_apply<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.is_empty() {
        return common::wrong_args(interp, "apply lambdaExpr ?arg ...?");
    }
    let parts = match common::list_elements(interp, &args[0]) {
        Ok(p) if p.len() >= 2 => p,
        Ok(_) => return common::error(interp, "can't interpret lambda expression"),
        Err(signal) => return Flow::Break(signal),
    };
    let (params, variadic) = match parse_params(interp, &parts[0]) {
        Ok(p) => p,
        Err(signal) => return Flow::Break(signal),
    };
    let ns_name = interp.host.ns_name(interp.host.frame_namespace(interp.host.frame_current()));
    let def = Rc::new(ProcDef {
        params,
        variadic,
        body: parts[1].clone(),
        ns_name,
    });
    feather_semantics::apply_proc(interp, &def, &args[1..])
}

/// `rename oldName newName` (an empty `newName` deletes the command).
pub fn cmd_rename<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.len() != 2 {
        return common::wrong_args(interp, "rename oldName newName");
    }
    let old_name = interp.host.text(&args[0]);
    let new_name = interp.host.text(&args[1]);

    let old_split = feather_semantics::split_qualified_name(&old_name);
    let root = interp.host.ns_root();
    let old_ns = if old_split.absolute || !old_split.namespace.is_empty() {
        match feather_semantics::resolve::lookup_namespace_path(&interp.host, root, &old_split.namespace) {
            Some(ns) => ns,
            None => return common::error(interp, format!("can't rename \"{old_name}\": command doesn't exist")),
        }
    } else {
        interp.host.frame_namespace(interp.host.frame_current())
    };

    let command = match interp.host.get_command(old_ns, &old_split.tail) {
        Some(c) => c,
        None => return common::error(interp, format!("can't rename \"{old_name}\": command doesn't exist")),
    };
    interp.host.delete_command(old_ns, &old_split.tail);

    if new_name.is_empty() {
        return Flow::Continue(interp.host.nil());
    }

    let new_split = feather_semantics::split_qualified_name(&new_name);
    let new_ns = if new_split.absolute || !new_split.namespace.is_empty() {
        match feather_semantics::resolve::lookup_namespace_path(&interp.host, root, &new_split.namespace) {
            Some(ns) => ns,
            None => return common::error(interp, format!("can't rename to \"{new_name}\": parent namespace doesn't exist")),
        }
    } else {
        old_ns
    };
    interp.host.set_command(new_ns, &new_split.tail, command);
    Flow::Continue(interp.host.nil())
}

/// `tailcall command ?arg ...?`
///
/// Registers the single-slot tail-call hook (§4.2) rather than dispatching
/// immediately: the call completes once the current procedure's frame is
/// popped, avoiding a nested stack frame for the replacement call.
pub fn cmd_tailcall<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.is_empty() {
        return common::wrong_args(interp, "tailcall command ?arg ...?");
    }
    let command = interp.host.text(&args[0]);
    interp.set_tailcall(command, args[1..].to_vec());
    Flow::Break(feather_core::Signal::Return { level: 1 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use feather_core::Limits;
    use feather_stub::StubHost;

    fn interp_with_proc() -> Interp<StubHost> {
        let mut interp = Interp::new(StubHost::new(), Limits::default());
        let root = interp.host.ns_root();
        interp.host.set_command(root, "proc", Command::Builtin(cmd_proc));
        interp
    }

    #[test]
    fn proc_then_call_returns_body_result() {
        let mut interp = interp_with_proc();
        let name = interp.host.intern(b"greet");
        let params = interp.host.intern(b"{}");
        let body = interp.host.intern(b"hello");
        let result = cmd_proc(&mut interp, &[name, params, body]);
        assert_matches::assert_matches!(result, Flow::Continue(_));

        let root = interp.host.ns_root();
        let command = interp.host.get_command(root, "greet");
        assert_matches::assert_matches!(command, Some(Command::Proc(_)));
    }

    #[test]
    fn rename_to_empty_deletes_command() {
        let mut interp = interp_with_proc();
        let root = interp.host.ns_root();
        let name = interp.host.intern(b"greet");
        let params = interp.host.intern(b"{}");
        let body = interp.host.intern(b"hello");
        let _ = cmd_proc(&mut interp, &[name, params, body]);

        let old = interp.host.intern(b"greet");
        let empty = interp.host.intern(b"");
        let result = cmd_rename(&mut interp, &[old, empty]);
        assert_matches::assert_matches!(result, Flow::Continue(_));
        assert!(interp.host.get_command(root, "greet").is_none());
    }
}
