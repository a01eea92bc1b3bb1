// SPDX-License-Identifier: MIT OR Apache-2.0
//! The built-in command catalog (§4.6): every command a freshly constructed
//! interpreter needs before a single user script has run.
//!
//! Mirrors the reference host-shell project's own built-in registry: one
//! module per functional group, plus an `install` entry point a host calls
//! once at startup to register every built-in against its command table.

pub mod common;
pub mod control;
pub mod error;
pub mod eval_builtins;
pub mod expr;
pub mod format;
pub mod info;
pub mod list;
pub mod namespace;
pub mod proc;
pub mod string;
pub mod trace;
pub mod vars;

use feather_core::host::Host;

/// Registers every built-in in this catalog against `host`'s global
/// namespace, using [`Host::register_builtin`] (§4.4's dispatch-registry
/// contract).
pub fn install<H: Host>(host: &mut H) {
    host.register_builtin("if", control::cmd_if);
    host.register_builtin("while", control::cmd_while);
    host.register_builtin("for", control::cmd_for);
    host.register_builtin("foreach", control::cmd_foreach);
    host.register_builtin("switch", control::cmd_switch);
    host.register_builtin("break", control::cmd_break);
    host.register_builtin("continue", control::cmd_continue);
    host.register_builtin("catch", control::cmd_catch);
    host.register_builtin("try", control::cmd_try);

    host.register_builtin("set", vars::cmd_set);
    host.register_builtin("unset", vars::cmd_unset);
    host.register_builtin("incr", vars::cmd_incr);
    host.register_builtin("append", vars::cmd_append);
    host.register_builtin("lappend", vars::cmd_lappend);
    host.register_builtin("global", vars::cmd_global);
    host.register_builtin("variable", vars::cmd_variable);
    host.register_builtin("upvar", vars::cmd_upvar);

    host.register_builtin("eval", eval_builtins::cmd_eval);
    host.register_builtin("uplevel", eval_builtins::cmd_uplevel);
    host.register_builtin("subst", eval_builtins::cmd_subst);

    host.register_builtin("proc", proc::cmd_proc);
    host.register_builtin("apply", proc::cmd_apply);
    host.register_builtin("rename", proc::cmd_rename);
    host.register_builtin("tailcall", proc::cmd_tailcall);

    host.register_builtin("error", error::cmd_error);
    host.register_builtin("throw", error::cmd_throw);
    host.register_builtin("return", error::cmd_return);

    host.register_builtin("concat", list::cmd_concat);
    host.register_builtin("list", list::cmd_list);
    host.register_builtin("llength", list::cmd_llength);
    host.register_builtin("lindex", list::cmd_lindex);
    host.register_builtin("lrange", list::cmd_lrange);
    host.register_builtin("lreplace", list::cmd_lreplace);
    host.register_builtin("linsert", list::cmd_linsert);
    host.register_builtin("lset", list::cmd_lset);
    host.register_builtin("lsearch", list::cmd_lsearch);
    host.register_builtin("lsort", list::cmd_lsort);
    host.register_builtin("join", list::cmd_join);
    host.register_builtin("split", list::cmd_split);

    host.register_builtin("string", string::cmd_string);
    host.register_builtin("format", format::cmd_format);
    host.register_builtin("scan", format::cmd_scan);
    host.register_builtin("expr", expr::cmd_expr);

    host.register_builtin("namespace", namespace::cmd_namespace);
    host.register_builtin("info", info::cmd_info);
    host.register_builtin("trace", trace::cmd_trace);
}

/// The catalog's command names, in registration order, for introspection
/// and tests (`info commands` on a host that wants full enumeration can
/// seed itself from this list, since the core has no registry-walking hook
/// of its own).
pub const CATALOG: &[&str] = &[
    "if", "while", "for", "foreach", "switch", "break", "continue", "catch", "try", "set",
    "unset", "incr", "append", "lappend", "global", "variable", "upvar", "eval", "uplevel",
    "subst", "proc", "apply", "rename", "tailcall", "error", "throw", "return", "concat", "list",
    "llength", "lindex", "lrange", "lreplace", "linsert", "lset", "lsearch", "lsort", "join",
    "split", "string", "format", "scan", "expr", "namespace", "info", "trace",
];

#[cfg(test)]
mod tests {
    use super::*;
    use feather_core::{Flow, Interp, Limits};
    use feather_stub::StubHost;

    #[test]
    fn install_registers_every_catalog_entry() {
        let mut host = StubHost::new();
        install(&mut host);
        let root = host.ns_root();
        for name in CATALOG {
            assert!(host.get_command(root, name).is_some(), "missing builtin {name}");
        }
    }

    #[test]
    fn installed_interpreter_runs_a_small_script() {
        let mut host = StubHost::new();
        install(&mut host);
        let mut interp = Interp::new(host, Limits::default());
        let result = feather_semantics::eval_string(
            &mut interp,
            b"set total 0; foreach n {1 2 3 4} { set total [expr {$total + $n}] }; set total",
        );
        assert_matches::assert_matches!(result, Flow::Continue(v) => {
            assert_eq!(interp.host.text(&v), "10");
        });
    }
}
