// SPDX-License-Identifier: MIT OR Apache-2.0
//! The name resolver (C7): qualified-name splitting and command/namespace
//! lookup order.

use feather_core::host::{Command, Host};

/// The parts of a split qualified name, e.g. `::a::b::c` splits to
/// `absolute=true, namespace="a::b", tail="c"`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitName {
    pub absolute: bool,
    pub namespace: String,
    pub tail: String,
}

/// Splits `name` into its namespace path and tail component.
///
/// A leading `::` marks the name absolute; `namespace` is then relative to
/// the global namespace (empty namespace means "the global namespace
/// itself"). A name with no `::` anywhere is unqualified: `namespace` is
/// empty and not absolute.
pub fn split_qualified_name(name: &str) -> SplitName {
    let absolute = name.starts_with("::");
    let trimmed = if absolute { &name[2..] } else { name };
    match trimmed.rfind("::") {
        Some(idx) => SplitName {
            absolute,
            namespace: trimmed[..idx].to_string(),
            tail: trimmed[idx + 2..].to_string(),
        },
        None => SplitName {
            absolute,
            namespace: String::new(),
            tail: trimmed.to_string(),
        },
    }
}

/// Strips a single leading `::` from `name` for display purposes, but only
/// when no further `::` qualifiers follow (so `::foo` displays as `foo`, but
/// `::a::b` is left alone).
pub fn get_display_name(name: &str) -> &str {
    if let Some(rest) = name.strip_prefix("::") {
        if !rest.contains("::") {
            return rest;
        }
    }
    name
}

/// Walks `path` (a `::`-joined namespace path, without a leading `::`) from
/// `start`, looking up (never creating) each child. Returns `None` if any
/// component does not exist.
pub fn lookup_namespace_path<H: Host>(host: &H, start: H::Ns, path: &str) -> Option<H::Ns> {
    let mut current = start;
    for part in path.split("::").filter(|p| !p.is_empty()) {
        current = host.ns_child(current, part)?;
    }
    Some(current)
}

/// Resolves a command name to its registered [`Command`], honoring the
/// resolution order from §4.3: a qualified name (absolute or containing
/// `::`) is resolved directly from the global namespace; an unqualified name
/// is looked up first in `frame`'s current namespace, then in the global
/// namespace.
pub fn resolve_command<H: Host>(host: &H, frame: H::Frame, name: &str) -> Option<Command<H>> {
    let split = split_qualified_name(name);
    let root = host.ns_root();

    if split.absolute || !split.namespace.is_empty() {
        let ns = lookup_namespace_path(host, root, &split.namespace)?;
        return host.get_command(ns, &split.tail);
    }

    let current = host.frame_namespace(frame);
    if let Some(cmd) = host.get_command(current, &split.tail) {
        return Some(cmd);
    }
    if current != root {
        return host.get_command(root, &split.tail);
    }
    None
}

/// Resolves a variable name's governing namespace, for `variable`/`global`'s
/// namespace-relative links. Only relevant to qualified variable names;
/// unqualified variable references resolve purely within the current
/// frame's local scope (§4.3).
pub fn resolve_variable_namespace<H: Host>(host: &H, frame: H::Frame, name: &str) -> Option<(H::Ns, String)> {
    let split = split_qualified_name(name);
    if !split.absolute && split.namespace.is_empty() {
        return None;
    }
    let root = host.ns_root();
    let base = if split.absolute {
        root
    } else {
        host.frame_namespace(frame)
    };
    let ns = lookup_namespace_path(host, base, &split.namespace)?;
    Some((ns, split.tail))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_absolute_name() {
        let s = split_qualified_name("::a::b::c");
        assert!(s.absolute);
        assert_eq!(s.namespace, "a::b");
        assert_eq!(s.tail, "c");
    }

    #[test]
    fn splits_unqualified_name() {
        let s = split_qualified_name("foo");
        assert!(!s.absolute);
        assert_eq!(s.namespace, "");
        assert_eq!(s.tail, "foo");
    }

    #[test]
    fn splits_relative_qualified_name() {
        let s = split_qualified_name("a::b");
        assert!(!s.absolute);
        assert_eq!(s.namespace, "a");
        assert_eq!(s.tail, "b");
    }

    #[test]
    fn display_name_strips_single_leading_global_marker() {
        assert_eq!(get_display_name("::foo"), "foo");
        assert_eq!(get_display_name("::a::b"), "::a::b");
        assert_eq!(get_display_name("foo"), "foo");
    }
}
