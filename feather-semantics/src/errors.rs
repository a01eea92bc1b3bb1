// SPDX-License-Identifier: MIT OR Apache-2.0
//! Helpers around the error-propagation state machine (C9): constructing an
//! `Error` signal, appending the traceback line a procedure frame
//! contributes as an error unwinds through it (§4.5), and finalizing the
//! accumulated state into a return-options dict when `catch`/`try` consumes
//! the error.

use feather_core::host::Host;
use feather_core::{Interp, Signal};

/// Builds a dict-shaped `Obj` from alternating key/value pairs, the
/// return-options representation throughout C9 (`-code`, `-errorinfo`,
/// `-errorcode`, `-errorline`, `-level`, ...).
pub fn build_dict<H: Host>(interp: &mut Interp<H>, pairs: &[(&str, String)]) -> H::Obj {
    let mut list = interp.host.list_new();
    for (key, value) in pairs {
        let key_obj = interp.host.intern(key.as_bytes());
        let value_obj = interp.host.intern(value.as_bytes());
        list = interp.host.list_push(&list, key_obj);
        list = interp.host.list_push(&list, value_obj);
    }
    list
}

/// The return-options dict an error carries at the moment it is first
/// raised, before any frame has unwound through it: `-code 1 -level 1`.
/// `catch`/`try` replace this with the fuller dict [`finalize_options`]
/// builds once the traceback has finished accumulating.
fn initial_options<H: Host>(interp: &mut Interp<H>) -> H::Obj {
    build_dict(interp, &[("-code", "1".to_string()), ("-level", "1".to_string())])
}

/// Raises a new `ERROR` with `message`, seeding traceback accumulation the
/// way the `error`/`throw` builtins do for an error with no explicit
/// `-errorinfo`.
pub fn raise<H: Host>(interp: &mut Interp<H>, message: &str) -> Signal<H::Obj> {
    let message_obj = interp.host.intern(message.as_bytes());
    interp.errors().seed();
    interp.errors().append_frame(message.to_string());
    let options = initial_options(interp);
    Signal::Error {
        message: message_obj,
        options,
    }
}

/// Raises a new `ERROR` whose message is already a host value (e.g. an
/// argument passed verbatim to the `error` builtin), seeding traceback
/// accumulation the same way [`raise`] does.
pub fn raise_obj<H: Host>(interp: &mut Interp<H>, message: H::Obj) -> Signal<H::Obj> {
    let text = interp.host.text(&message);
    interp.errors().seed();
    interp.errors().append_frame(text);
    let options = initial_options(interp);
    Signal::Error { message, options }
}

/// Raises a new `ERROR` with an explicit `errorInfo`/`errorCode`, as given
/// to `error message errorInfo errorCode`: the traceback starts from the
/// supplied `errorInfo` text verbatim (no further frame is appended for the
/// raise site itself) and `errorCode` is seeded so later frame exits don't
/// overwrite it.
pub fn raise_explicit<H: Host>(
    interp: &mut Interp<H>,
    message: H::Obj,
    error_info: &str,
    error_code: &str,
) -> Signal<H::Obj> {
    interp.errors().seed_explicit(error_code.to_string());
    interp.errors().append_frame(error_info.to_string());
    let options = build_dict(
        interp,
        &[
            ("-code", "1".to_string()),
            ("-level", "1".to_string()),
            ("-errorcode", error_code.to_string()),
        ],
    );
    Signal::Error { message, options }
}

/// Finalizes the in-flight error-propagation state at the point `catch`/
/// `try` consumes it (§4.5's Accumulating → Idle transition): reads out the
/// accumulated `errorInfo` traceback, builds the full return-options dict
/// (`-code`, `-level`, `-errorinfo`, `-errorcode`), and mirrors `errorInfo`/
/// `errorCode` into the interpreter's global variables. `code` is the
/// numeric return code being caught (normally `1` for `ERROR`).
///
/// Returns the options dict together with the `errorInfo`/`errorCode`
/// strings mirrored into the globals, for callers (`info errorstack`,
/// tests) that want them directly rather than re-reading the dict.
pub fn finalize_options<H: Host>(interp: &mut Interp<H>, code: i64) -> (H::Obj, String, String) {
    let finalized = interp.errors().finalize();
    let error_info = finalized
        .as_ref()
        .map(|f| f.stack.iter().map(|e| e.text.as_str()).collect::<Vec<_>>().join(""))
        .unwrap_or_default();
    let error_code = finalized
        .as_ref()
        .and_then(|f| f.error_code.clone())
        .unwrap_or_else(|| "NONE".to_string());

    let options = build_dict(
        interp,
        &[
            ("-code", code.to_string()),
            ("-level", "0".to_string()),
            ("-errorinfo", error_info.clone()),
            ("-errorcode", error_code.clone()),
        ],
    );

    let global = interp.host.frame_global();
    let error_info_obj = interp.host.intern(error_info.as_bytes());
    let error_code_obj = interp.host.intern(error_code.as_bytes());
    interp.host.var_set(global, "errorInfo", error_info_obj);
    interp.host.var_set(global, "errorCode", error_code_obj);
    interp.host.set_return_options(options.clone());

    (options, error_info, error_code)
}

/// Appends the traceback line contributed by exiting a procedure frame named
/// `name` at source line `line`, per §4.5's Accumulating-state transition.
/// A no-op if no error is currently unwinding (e.g. the frame is exiting on
/// `RETURN`, not `ERROR`).
pub fn append_proc_frame<H: Host>(interp: &mut Interp<H>, name: &str, line: u32) {
    if interp.errors().is_active() {
        interp
            .errors()
            .append_frame(format!("\n    (procedure \"{name}\" line {line})"));
    }
}

/// Constructs the `-code error invoked "break"/"continue" outside of a loop`
/// error used when a loop-control signal escapes a procedure body (§4.2).
pub fn loop_control_escaped<H: Host>(interp: &mut Interp<H>, which: &str) -> Signal<H::Obj> {
    raise(interp, &format!("invoked \"{which}\" outside of a loop"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use feather_stub::StubHost;

    #[test]
    fn raise_seeds_tracker() {
        let mut interp = Interp::new(StubHost::new(), Default::default());
        assert!(!interp.errors().is_active());
        let _ = raise(&mut interp, "boom");
        assert!(interp.errors().is_active());
    }
}
