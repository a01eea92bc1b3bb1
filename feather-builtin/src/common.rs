// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shared helpers for implementing built-ins: argument text access, the
//! standard `wrong # args` error, and integer coercion.
//!
//! Mirrors the role the reference host-shell project's own `common` module
//! plays for its built-ins, scaled down to this crate's synchronous,
//! non-I/O command set.

use feather_core::host::Host;
use feather_core::{Flow, Interp, Signal};

/// Reads `obj`'s string projection as owned text.
pub fn text<H: Host>(interp: &Interp<H>, obj: &H::Obj) -> String {
    interp.host.text(obj)
}

/// Builds the standard `wrong # args: should be "..."` error.
pub fn wrong_args<H: Host>(interp: &mut Interp<H>, usage: &str) -> Flow<H::Obj> {
    Flow::Break(feather_semantics::errors::raise(
        interp,
        &format!("wrong # args: should be \"{usage}\""),
    ))
}

/// Raises a plain `ERROR` with `message`.
pub fn error<H: Host>(interp: &mut Interp<H>, message: impl AsRef<str>) -> Flow<H::Obj> {
    Flow::Break(feather_semantics::errors::raise(interp, message.as_ref()))
}

/// Coerces `obj` to a signed 64-bit integer, or raises the standard
/// `expected integer but got "..."` error.
pub fn require_int<H: Host>(interp: &mut Interp<H>, obj: &H::Obj) -> Result<i64, Signal<H::Obj>> {
    match interp.host.int_get(obj) {
        Some(v) => Ok(v),
        None => {
            let text = interp.host.text(obj);
            Err(feather_semantics::errors::raise(
                interp,
                &format!("expected integer but got \"{text}\""),
            ))
        }
    }
}

/// Reads a host list into an owned `Vec<Obj>`.
pub fn list_elements<H: Host>(interp: &mut Interp<H>, obj: &H::Obj) -> Result<Vec<H::Obj>, Signal<H::Obj>> {
    let list = interp
        .host
        .list_from(obj)
        .map_err(|e| feather_semantics::errors::raise(interp, &e.to_string()))?;
    let len = interp.host.list_len(&list);
    Ok((0..len).filter_map(|i| interp.host.list_at(&list, i)).collect())
}

/// Establishes a namespace link for `name` in `frame` if `name` is
/// namespace-qualified (`::`-containing), so a subsequent `var_get`/
/// `var_set`/`var_unset` keyed by the same literal `name` reaches the
/// qualified namespace's storage rather than a frame-local variable
/// literally named e.g. `"::x::v"`. A no-op (and harmless to repeat) for
/// unqualified names, and for a qualified name whose namespace path
/// doesn't exist.
pub fn qualify_var<H: Host>(interp: &mut Interp<H>, frame: H::Frame, name: &str) {
    if let Some((ns, tail)) = feather_semantics::resolve_variable_namespace(&interp.host, frame, name) {
        interp.host.var_link_ns(frame, name, ns, &tail);
    }
}

/// Builds the return-options dict for a non-error outcome (`catch`/`try`
/// consuming `OK`/`RETURN`/`BREAK`/`CONTINUE`/a custom code), and records it
/// as the interpreter's current return options so `info errorstack` and
/// friends see a result consistent with what was just caught.
pub fn plain_options<H: Host>(interp: &mut Interp<H>, code: i64) -> H::Obj {
    let options = feather_semantics::errors::build_dict(
        interp,
        &[("-code", code.to_string()), ("-level", "0".to_string())],
    );
    interp.host.set_return_options(options.clone());
    options
}

/// Builds a host list value from `items`.
pub fn make_list<H: Host>(interp: &mut Interp<H>, items: impl IntoIterator<Item = H::Obj>) -> H::Obj {
    let mut list = interp.host.list_new();
    for item in items {
        list = interp.host.list_push(&list, item);
    }
    list
}
