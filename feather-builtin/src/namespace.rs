// SPDX-License-Identifier: MIT OR Apache-2.0
//! The `namespace` built-in: `eval`, `current`, `exists`, `delete`,
//! `children`, `parent`, `qualifiers`, `tail`, `which` (§4.6).

use feather_core::host::Host;
use feather_core::{Flow, Interp};
use feather_semantics::resolve::lookup_namespace_path;

use crate::common;
use crate::eval_builtins::cmd_eval;

/// `namespace subcommand ?arg ...?`
pub fn cmd_namespace<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.is_empty() {
        return common::wrong_args(interp, "namespace subcommand ?arg ...?");
    }
    let subcommand = interp.host.text(&args[0]);
    let rest = &args[1..];
    match subcommand.as_str() {
        "eval" => eval(interp, rest),
        "current" => current(interp, rest),
        "exists" => exists(interp, rest),
        "delete" => delete(interp, rest),
        "children" => children(interp, rest),
        "parent" => parent(interp, rest),
        "qualifiers" => qualifiers(interp, rest),
        "tail" => tail(interp, rest),
        "which" => which(interp, rest),
        _ => common::error(interp, format!("unknown or ambiguous subcommand \"{subcommand}\": must be eval, current, exists, delete, children, parent, qualifiers, tail, or which")),
    }
}

fn resolve_ns<H: Host>(interp: &mut Interp<H>, name: &str) -> Option<H::Ns> {
    let split = feather_semantics::split_qualified_name(name);
    let root = interp.host.ns_root();
    if split.absolute || !split.namespace.is_empty() || split.tail.is_empty() {
        let path = if split.namespace.is_empty() { split.tail.clone() } else { format!("{}::{}", split.namespace, split.tail) };
        return lookup_namespace_path(&interp.host, root, &path);
    }
    let current = interp.host.frame_namespace(interp.host.frame_current());
    interp.host.ns_child(current, &split.tail)
}

fn eval<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.len() < 2 {
        return common::wrong_args(interp, "namespace eval name arg ?arg ...?");
    }
    let name = interp.host.text(&args[0]);
    let split = feather_semantics::split_qualified_name(&name);
    let root = interp.host.ns_root();
    let parent = interp.host.frame_namespace(interp.host.frame_current());
    let base = if split.absolute { root } else { parent };
    let path = if split.namespace.is_empty() { split.tail.clone() } else { format!("{}::{}", split.namespace, split.tail) };

    let mut ns = base;
    for part in path.split("::").filter(|p| !p.is_empty()) {
        ns = interp.host.ns_create(ns, part);
    }

    let frame = interp.host.frame_push(ns);
    let result = cmd_eval(interp, &args[1..]);
    let _ = frame;
    interp.host.frame_pop();
    result
}

fn current<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if !args.is_empty() {
        return common::wrong_args(interp, "namespace current");
    }
    let ns = interp.host.frame_namespace(interp.host.frame_current());
    let name = interp.host.ns_name(ns);
    Flow::Continue(interp.host.intern(name.as_bytes()))
}

fn exists<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.len() != 1 {
        return common::wrong_args(interp, "namespace exists name");
    }
    let name = interp.host.text(&args[0]);
    let found = resolve_ns(interp, &name).is_some_and(|ns| interp.host.ns_exists(ns));
    Flow::Continue(interp.host.int_create(found as i64))
}

fn delete<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    for arg in args {
        let name = interp.host.text(arg);
        if let Some(ns) = resolve_ns(interp, &name) {
            interp.host.ns_delete(ns);
        }
    }
    Flow::Continue(interp.host.nil())
}

fn children<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.len() > 1 {
        return common::wrong_args(interp, "namespace children ?name?");
    }
    let ns = if let Some(arg) = args.first() {
        let name = interp.host.text(arg);
        match resolve_ns(interp, &name) {
            Some(ns) => ns,
            None => return common::error(interp, format!("unknown namespace \"{name}\"")),
        }
    } else {
        interp.host.frame_namespace(interp.host.frame_current())
    };
    let names: Vec<String> = interp.host.ns_children(ns).iter().map(|child| interp.host.ns_name(*child)).collect();
    let values = names.into_iter().map(|n| interp.host.intern(n.as_bytes()));
    Flow::Continue(common::make_list(interp, values))
}

fn parent<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.len() > 1 {
        return common::wrong_args(interp, "namespace parent ?name?");
    }
    let ns = if let Some(arg) = args.first() {
        let name = interp.host.text(arg);
        match resolve_ns(interp, &name) {
            Some(ns) => ns,
            None => return common::error(interp, format!("unknown namespace \"{name}\"")),
        }
    } else {
        interp.host.frame_namespace(interp.host.frame_current())
    };
    match interp.host.ns_parent(ns) {
        Some(p) => {
            let name = interp.host.ns_name(p);
            Flow::Continue(interp.host.intern(name.as_bytes()))
        }
        None => Flow::Continue(interp.host.nil()),
    }
}

fn qualifiers<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.len() != 1 {
        return common::wrong_args(interp, "namespace qualifiers string");
    }
    let name = interp.host.text(&args[0]);
    let split = feather_semantics::split_qualified_name(&name);
    let prefix = if split.absolute { "::" } else { "" };
    Flow::Continue(interp.host.intern(format!("{prefix}{}", split.namespace).as_bytes()))
}

fn tail<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.len() != 1 {
        return common::wrong_args(interp, "namespace tail string");
    }
    let name = interp.host.text(&args[0]);
    let split = feather_semantics::split_qualified_name(&name);
    Flow::Continue(interp.host.intern(split.tail.as_bytes()))
}

fn which<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    let mut i = 0;
    let mut want_command = true;
    if args.first().map(|a| interp.host.text(a)) == Some("-command".to_string()) {
        i = 1;
    } else if args.first().map(|a| interp.host.text(a)) == Some("-namespace".to_string()) {
        want_command = false;
        i = 1;
    }
    if i + 1 != args.len() {
        return common::wrong_args(interp, "namespace which ?-command|-namespace? name");
    }
    let name = interp.host.text(&args[i]);
    if want_command {
        let frame = interp.host.frame_current();
        match feather_semantics::resolve_command(&interp.host, frame, &name) {
            Some(_) => Flow::Continue(interp.host.intern(format!("::{name}").as_bytes())),
            None => Flow::Continue(interp.host.nil()),
        }
    } else {
        match resolve_ns(interp, &name) {
            Some(ns) => {
                let full = interp.host.ns_name(ns);
                Flow::Continue(interp.host.intern(full.as_bytes()))
            }
            None => Flow::Continue(interp.host.nil()),
        }
    }
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
    fn current_starts_at_global() {
        let mut interp = new_interp();
        let sub = interp.host.intern(b"current");
        let result = cmd_namespace(&mut interp, &[sub]);
        assert_matches::assert_matches!(result, Flow::Continue(v) => {
            assert_eq!(interp.host.text(&v), "::");
        });
    }

    #[test]
    fn eval_creates_and_enters_namespace() {
        use feather_core::host::Command;

        let mut interp = new_interp();
        let root = interp.host.ns_root();
        interp.host.set_command(root, "namespace", Command::Builtin(cmd_namespace));

        let sub = interp.host.intern(b"eval");
        let name = interp.host.intern(b"foo");
        let body = interp.host.intern(b"namespace current");
        let result = cmd_namespace(&mut interp, &[sub, name, body]);
        assert_matches::assert_matches!(result, Flow::Continue(v) => {
            assert_eq!(interp.host.text(&v), "::foo");
        });

        let child = interp.host.ns_child(root, "foo");
        assert!(child.is_some());
    }

    #[test]
    fn qualifiers_and_tail_split_a_name() {
        let mut interp = new_interp();
        let q = interp.host.intern(b"qualifiers");
        let t = interp.host.intern(b"tail");
        let name = interp.host.intern(b"::a::b::c");
        let qual = cmd_namespace(&mut interp, &[q, name.clone()]);
        assert_matches::assert_matches!(qual, Flow::Continue(v) => {
            assert_eq!(interp.host.text(&v), "::a::b");
        });
        let tail_result = cmd_namespace(&mut interp, &[t, name]);
        assert_matches::assert_matches!(tail_result, Flow::Continue(v) => {
            assert_eq!(interp.host.text(&v), "c");
        });
    }
}
