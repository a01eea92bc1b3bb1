// SPDX-License-Identifier: MIT OR Apache-2.0
//! `trace`: `add variable`, `remove variable`, `info variable` (§4.6).
//!
//! Scoped to variable traces only (no `trace add command`/`execution`):
//! registration and enumeration are supported, but no call site in this
//! workspace fires a trace callback automatically on a variable write,
//! since the host vtable has no write-notification hook to build that on.
//! A host that wants live callbacks invokes `trace_fire`-equivalent logic
//! itself around its own `var_set` implementation.

use feather_core::host::Host;
use feather_core::{Flow, Interp};

use crate::common;

/// `trace subcommand ?arg ...?`
pub fn cmd_trace<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.is_empty() {
        return common::wrong_args(interp, "trace subcommand ?arg ...?");
    }
    let subcommand = interp.host.text(&args[0]);
    let rest = &args[1..];
    match subcommand.as_str() {
        "add" => add(interp, rest),
        "remove" => remove(interp, rest),
        "info" => info(interp, rest),
        _ => common::error(interp, format!("unknown or ambiguous subcommand \"{subcommand}\": must be add, remove, or info")),
    }
}

fn add<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.len() != 4 || interp.host.text(&args[0]) != "variable" {
        return common::wrong_args(interp, "trace add variable name ops command");
    }
    let name = interp.host.text(&args[1]);
    let ops = match common::list_elements(interp, &args[2]) {
        Ok(elems) => elems.iter().map(|e| interp.host.text(e)).collect::<Vec<_>>().join(""),
        Err(signal) => return Flow::Break(signal),
    };
    let command = args[3].clone();
    interp.add_var_trace(name, ops, command);
    Flow::Continue(interp.host.nil())
}

fn remove<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.len() != 4 || interp.host.text(&args[0]) != "variable" {
        return common::wrong_args(interp, "trace remove variable name ops command");
    }
    let name = interp.host.text(&args[1]);
    let ops = match common::list_elements(interp, &args[2]) {
        Ok(elems) => elems.iter().map(|e| interp.host.text(e)).collect::<Vec<_>>().join(""),
        Err(signal) => return Flow::Break(signal),
    };
    let command_text = interp.host.text(&args[3]);
    interp.remove_var_trace(&name, &ops, &command_text);
    Flow::Continue(interp.host.nil())
}

fn info<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.len() != 2 || interp.host.text(&args[0]) != "variable" {
        return common::wrong_args(interp, "trace info variable name");
    }
    let name = interp.host.text(&args[1]);
    let entries: Vec<(String, H::Obj)> = interp.var_traces_for(&name).map(|t| (t.ops.clone(), t.command.clone())).collect();
    let mut pairs = Vec::with_capacity(entries.len());
    for (ops, command) in entries {
        let ops_obj = interp.host.intern(ops.as_bytes());
        pairs.push(common::make_list(interp, [ops_obj, command]));
    }
    Flow::Continue(common::make_list(interp, pairs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use feather_core::Limits;
    use feather_stub::StubHost;

    #[test]
    fn add_then_info_reports_the_trace() {
        let mut interp = Interp::new(StubHost::new(), Limits::default());
        let add = interp.host.intern(b"add");
        let variable = interp.host.intern(b"variable");
        let name = interp.host.intern(b"x");
        let ops = interp.host.intern(b"w");
        let command = interp.host.intern(b"logit");
        let result = cmd_trace(&mut interp, &[add, variable.clone(), name.clone(), ops, command]);
        assert_matches::assert_matches!(result, Flow::Continue(_));

        let info_sub = interp.host.intern(b"info");
        let result = cmd_trace(&mut interp, &[info_sub, variable, name]);
        assert_matches::assert_matches!(result, Flow::Continue(v) => {
            assert_eq!(interp.host.list_len(&v), 1);
        });
    }
}
