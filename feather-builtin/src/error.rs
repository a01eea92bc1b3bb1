// SPDX-License-Identifier: MIT OR Apache-2.0
//! `error` and `throw`, plus `return` (§4.2, §4.6).

use feather_core::host::Host;
use feather_core::{Flow, Interp, Signal};

use crate::common;

/// `error message ?errorInfo? ?errorCode?`
///
/// With no optional arguments, seeds the traceback from `message` the way
/// an ordinary raised error does. A supplied `errorInfo` replaces the
/// synthesized traceback seed with the caller's own text (e.g. to graft a
/// nested interpreter's trace onto this one's), and a supplied `errorCode`
/// is recorded verbatim instead of the default `NONE`.
pub fn cmd_error<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.is_empty() || args.len() > 3 {
        return common::wrong_args(interp, "error message ?errorInfo? ?errorCode?");
    }
    let message = args[0].clone();
    if args.len() == 1 {
        return Flow::Break(feather_semantics::errors::raise_obj(interp, message));
    }
    let error_info = interp.host.text(&args[1]);
    let error_code = args.get(2).map(|c| interp.host.text(c)).unwrap_or_else(|| "NONE".to_string());
    Flow::Break(feather_semantics::errors::raise_explicit(interp, message, &error_info, &error_code))
}

/// `throw code message`: a custom-code raise, for code values other than
/// the canonical `ERROR`.
pub fn cmd_throw<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.len() != 2 {
        return common::wrong_args(interp, "throw type message");
    }
    let _ = feather_semantics::errors::raise_obj(interp, args[1].clone());
    Flow::Break(Signal::Error {
        message: args[1].clone(),
        options: args[0].clone(),
    })
}

/// `return ?-code code? ?-errorinfo info? ?-errorcode code? ?-level n? ?value?`
///
/// The option/value pairs may appear in any order before the trailing
/// `value`; `-level` controls how many enclosing procedure frames the
/// return skips before taking effect (default `1`, the immediate caller).
pub fn cmd_return<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    let mut i = 0;
    let mut code: Option<i64> = None;
    let mut level: u32 = 1;
    let mut error_info: Option<String> = None;
    let mut error_code: Option<String> = None;
    while i + 1 < args.len() {
        let word = interp.host.text(&args[i]);
        match word.as_str() {
            "-code" => {
                match common::require_int(interp, &args[i + 1]) {
                    Ok(v) => code = Some(v),
                    Err(signal) => return Flow::Break(signal),
                }
                i += 2;
            }
            "-level" => {
                match common::require_int(interp, &args[i + 1]) {
                    Ok(v) if v >= 0 => level = v as u32,
                    Ok(v) => return common::error(interp, format!("bad -level value \"{v}\": must be non-negative")),
                    Err(signal) => return Flow::Break(signal),
                }
                i += 2;
            }
            "-errorinfo" => {
                error_info = Some(interp.host.text(&args[i + 1]));
                i += 2;
            }
            "-errorcode" => {
                error_code = Some(interp.host.text(&args[i + 1]));
                i += 2;
            }
            _ => break,
        }
    }
    let value = args.get(i).cloned().unwrap_or_else(|| interp.host.nil());
    interp.host.set_result(value);

    match code {
        Some(1) => {
            let message = interp.host.get_result();
            let info = error_info.unwrap_or_default();
            let code_str = error_code.unwrap_or_else(|| "NONE".to_string());
            Flow::Break(feather_semantics::errors::raise_explicit(interp, message, &info, &code_str))
        }
        None | Some(2) => Flow::Break(Signal::Return { level }),
        Some(0) => Flow::Continue(interp.host.get_result()),
        Some(c) => Flow::Break(Signal::Custom(c as i32)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feather_core::Limits;
    use feather_stub::StubHost;

    #[test]
    fn error_raises_with_given_message() {
        let mut interp = Interp::new(StubHost::new(), Limits::default());
        let message = interp.host.intern(b"boom");
        let result = cmd_error(&mut interp, &[message]);
        assert_matches::assert_matches!(result, Flow::Break(Signal::Error { message, .. }) => {
            assert_eq!(interp.host.text(&message), "boom");
        });
    }

    #[test]
    fn return_with_no_args_yields_plain_return() {
        let mut interp = Interp::new(StubHost::new(), Limits::default());
        let result = cmd_return(&mut interp, &[]);
        assert_matches::assert_matches!(result, Flow::Break(Signal::Return { level: 1 }));
    }

    #[test]
    fn return_with_custom_code() {
        let mut interp = Interp::new(StubHost::new(), Limits::default());
        let code = interp.host.intern(b"7");
        let value = interp.host.intern(b"v");
        let result = cmd_return(&mut interp, &[interp.host.intern(b"-code"), code, value]);
        assert_matches::assert_matches!(result, Flow::Break(Signal::Custom(7)));
    }

    #[test]
    fn return_with_level_does_not_consume_the_value_word() {
        let mut interp = Interp::new(StubHost::new(), Limits::default());
        let args = [interp.host.intern(b"-level"), interp.host.intern(b"2"), interp.host.intern(b"value")];
        let result = cmd_return(&mut interp, &args);
        assert_matches::assert_matches!(result, Flow::Break(Signal::Return { level: 2 }));
        assert_eq!(interp.host.text(&interp.host.get_result()), "value");
    }

    #[test]
    fn return_with_error_code_propagates_as_explicit_error() {
        let mut interp = Interp::new(StubHost::new(), Limits::default());
        let args = [
            interp.host.intern(b"-code"),
            interp.host.intern(b"1"),
            interp.host.intern(b"-errorcode"),
            interp.host.intern(b"MYERR"),
            interp.host.intern(b"boom"),
        ];
        let result = cmd_return(&mut interp, &args);
        assert_matches::assert_matches!(result, Flow::Break(Signal::Error { message, .. }) => {
            assert_eq!(interp.host.text(&message), "boom");
        });
    }
}
