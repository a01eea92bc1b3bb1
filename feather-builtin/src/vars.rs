// SPDX-License-Identifier: MIT OR Apache-2.0
//! Variable built-ins: `set`, `unset`, `incr`, `append`, `lappend`,
//! `global`, `variable`, `upvar` (§4.6).

use feather_core::host::Host;
use feather_core::{Flow, Interp};
use feather_syntax::parse_level;

use crate::common;

/// `set varName ?value?`
pub fn cmd_set<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.is_empty() || args.len() > 2 {
        return common::wrong_args(interp, "set varName ?newValue?");
    }
    let frame = interp.host.frame_current();
    let name = interp.host.text(&args[0]);
    common::qualify_var(interp, frame, &name);
    if args.len() == 2 {
        interp.host.var_set(frame, &name, args[1].clone());
    }
    match interp.host.var_get(frame, &name) {
        Some(v) => Flow::Continue(v),
        None => common::error(interp, format!("can't read \"{name}\": no such variable")),
    }
}

/// `unset ?-nocomplain? ?--? ?varName ...?`
pub fn cmd_unset<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    let mut i = 0;
    let mut nocomplain = false;
    while i < args.len() {
        let word = interp.host.text(&args[i]);
        match word.as_str() {
            "-nocomplain" => {
                nocomplain = true;
                i += 1;
            }
            "--" => {
                i += 1;
                break;
            }
            _ => break,
        }
    }
    let frame = interp.host.frame_current();
    for arg in &args[i..] {
        let name = interp.host.text(arg);
        common::qualify_var(interp, frame, &name);
        let existed = interp.host.var_unset(frame, &name);
        if !existed && !nocomplain {
            return common::error(interp, format!("can't unset \"{name}\": no such variable"));
        }
    }
    Flow::Continue(interp.host.nil())
}

/// `incr varName ?increment?`
pub fn cmd_incr<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.is_empty() || args.len() > 2 {
        return common::wrong_args(interp, "incr varName ?increment?");
    }
    let frame = interp.host.frame_current();
    let name = interp.host.text(&args[0]);
    common::qualify_var(interp, frame, &name);
    let delta = if args.len() == 2 {
        match common::require_int(interp, &args[1]) {
            Ok(v) => v,
            Err(signal) => return Flow::Break(signal),
        }
    } else {
        1
    };
    let current = match interp.host.var_get(frame, &name) {
        Some(v) => match common::require_int(interp, &v) {
            Ok(v) => v,
            Err(signal) => return Flow::Break(signal),
        },
        None => 0,
    };
    let updated = interp.host.int_create(current.wrapping_add(delta));
    interp.host.var_set(frame, &name, updated.clone());
    Flow::Continue(updated)
}

/// `append varName ?value value ...?`
pub fn cmd_append<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.is_empty() {
        return common::wrong_args(interp, "append varName ?value ...?");
    }
    let frame = interp.host.frame_current();
    let name = interp.host.text(&args[0]);
    common::qualify_var(interp, frame, &name);
    let mut current = interp.host.var_get(frame, &name).unwrap_or_else(|| interp.host.intern(b""));
    for value in &args[1..] {
        current = interp.host.concat(&current, value);
    }
    interp.host.var_set(frame, &name, current.clone());
    Flow::Continue(current)
}

/// `lappend varName ?value value ...?`
pub fn cmd_lappend<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.is_empty() {
        return common::wrong_args(interp, "lappend varName ?value ...?");
    }
    let frame = interp.host.frame_current();
    let name = interp.host.text(&args[0]);
    common::qualify_var(interp, frame, &name);
    let mut list = match interp.host.var_get(frame, &name) {
        Some(existing) => match interp.host.list_from(&existing) {
            Ok(l) => l,
            Err(e) => return common::error(interp, e.to_string()),
        },
        None => interp.host.list_new(),
    };
    for value in &args[1..] {
        list = interp.host.list_push(&list, value.clone());
    }
    interp.host.var_set(frame, &name, list.clone());
    Flow::Continue(list)
}

/// `global varName ?varName ...?`
pub fn cmd_global<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    let frame = interp.host.frame_current();
    let global_frame = interp.host.frame_global();
    if frame == global_frame {
        return Flow::Continue(interp.host.nil());
    }
    for arg in args {
        let name = interp.host.text(arg);
        let tail = feather_semantics::get_display_name(&name).to_string();
        interp.host.var_link(frame, &tail, global_frame, &tail);
    }
    Flow::Continue(interp.host.nil())
}

/// `variable ?name value? ...` (an odd trailing name with no value links
/// without assigning an initial value).
pub fn cmd_variable<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.is_empty() {
        return common::wrong_args(interp, "variable ?name value ...? ?name?");
    }
    let frame = interp.host.frame_current();
    let ns = interp.host.frame_namespace(frame);
    let mut i = 0;
    while i < args.len() {
        let name = interp.host.text(&args[i]);
        let has_value = i + 1 < args.len();
        if has_value {
            if !interp.host.ns_exists(ns) {
                return common::error(interp, "no current namespace");
            }
            let value = args[i + 1].clone();
            // Seed the namespace-scoped storage before linking, so a
            // variable that doesn't exist yet gets this initial value.
            interp.host.var_link_ns(frame, &name, ns, &name);
            if interp.host.var_get(frame, &name).is_none() {
                interp.host.var_set(frame, &name, value);
            }
            i += 2;
        } else {
            interp.host.var_link_ns(frame, &name, ns, &name);
            i += 1;
        }
    }
    Flow::Continue(interp.host.nil())
}

/// `upvar ?level? otherVar myVar ?otherVar myVar ...?`
pub fn cmd_upvar<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.len() < 2 {
        return common::wrong_args(interp, "upvar ?level? otherVar myVar ?otherVar myVar ...?");
    }
    let frame = interp.host.frame_current();
    let current_level = interp.host.frame_level(frame);

    // An odd argument count means the first word is an explicit level; an
    // even count means it's omitted and defaults to "1" (the caller).
    let (level_text, rest): (String, &[H::Obj]) = if args.len() % 2 == 1 {
        (interp.host.text(&args[0]), &args[1..])
    } else {
        ("1".to_string(), args)
    };

    if rest.is_empty() || rest.len() % 2 != 0 {
        return common::wrong_args(interp, "upvar ?level? otherVar myVar ?otherVar myVar ...?");
    }

    let target_level = match parse_level(&level_text, current_level) {
        Ok(l) => l,
        Err(e) => return common::error(interp, e.to_string()),
    };
    let target_frame = match interp.host.frame_at_level(target_level) {
        Some(f) => f,
        None => return common::error(interp, format!("bad level \"{level_text}\"")),
    };

    for pair in rest.chunks(2) {
        let other = interp.host.text(&pair[0]);
        let mine = interp.host.text(&pair[1]);
        interp.host.var_link(frame, &mine, target_frame, &other);
    }
    Flow::Continue(interp.host.nil())
}

#[cfg(test)]
mod tests {
    use super::*;
    use feather_core::Limits;
    use feather_stub::StubHost;

    fn new_interp() -> Interp<StubHost> {
        Interp::new(StubHost::new(), Limits::default())
    }

    #[test]
    fn set_then_read_roundtrips() {
        let mut interp = new_interp();
        let name = interp.host.intern(b"x");
        let value = interp.host.intern(b"hello");
        let result = cmd_set(&mut interp, &[name.clone(), value]);
        assert_matches::assert_matches!(result, Flow::Continue(v) => {
            assert_eq!(interp.host.text(&v), "hello");
        });
        let result = cmd_set(&mut interp, &[name]);
        assert_matches::assert_matches!(result, Flow::Continue(v) => {
            assert_eq!(interp.host.text(&v), "hello");
        });
    }

    #[test]
    fn incr_defaults_to_one_and_zero_base() {
        let mut interp = new_interp();
        let name = interp.host.intern(b"counter");
        let result = cmd_incr(&mut interp, &[name.clone()]);
        assert_matches::assert_matches!(result, Flow::Continue(v) => {
            assert_eq!(interp.host.text(&v), "1");
        });
        let result = cmd_incr(&mut interp, &[name]);
        assert_matches::assert_matches!(result, Flow::Continue(v) => {
            assert_eq!(interp.host.text(&v), "2");
        });
    }

    #[test]
    fn lappend_grows_a_list() {
        let mut interp = new_interp();
        let name = interp.host.intern(b"items");
        let a = interp.host.intern(b"a");
        let b = interp.host.intern(b"b");
        let result = cmd_lappend(&mut interp, &[name.clone(), a]);
        assert_matches::assert_matches!(result, Flow::Continue(_));
        let result = cmd_lappend(&mut interp, &[name, b]);
        assert_matches::assert_matches!(result, Flow::Continue(v) => {
            assert_eq!(interp.host.list_len(&v), 2);
        });
    }

    #[test]
    fn unset_missing_without_nocomplain_errors() {
        let mut interp = new_interp();
        let name = interp.host.intern(b"nope");
        let result = cmd_unset(&mut interp, &[name]);
        assert_matches::assert_matches!(result, Flow::Break(_));
    }

    #[test]
    fn unset_nocomplain_tolerates_missing() {
        let mut interp = new_interp();
        let flag = interp.host.intern(b"-nocomplain");
        let name = interp.host.intern(b"nope");
        let result = cmd_unset(&mut interp, &[flag, name]);
        assert_matches::assert_matches!(result, Flow::Continue(_));
    }
}
