// SPDX-License-Identifier: MIT OR Apache-2.0
//! `format` and `scan` (§4.6): printf-style formatting and its inverse,
//! covering the conversion set `%d %i %o %x %X %c %s %f %e %g %%`. `scan`'s
//! inverse direction is reduced to the subset most scripts actually use
//! (`%d`, `%s`, `%f`, `%c`).

use feather_core::host::Host;
use feather_core::{Flow, Interp};

use crate::common;

struct Spec {
    width: Option<usize>,
    zero_pad: bool,
    left_align: bool,
    precision: Option<usize>,
    conversion: char,
}

fn parse_spec(chars: &[char], pos: &mut usize) -> Option<Spec> {
    let mut left_align = false;
    let mut zero_pad = false;
    while let Some(&c) = chars.get(*pos) {
        match c {
            '-' => {
                left_align = true;
                *pos += 1;
            }
            '0' => {
                zero_pad = true;
                *pos += 1;
            }
            '+' | ' ' => {
                *pos += 1;
            }
            _ => break,
        }
    }
    let mut width = None;
    let start = *pos;
    while chars.get(*pos).is_some_and(|c| c.is_ascii_digit()) {
        *pos += 1;
    }
    if *pos > start {
        width = chars[start..*pos].iter().collect::<String>().parse().ok();
    }
    let mut precision = None;
    if chars.get(*pos) == Some(&'.') {
        *pos += 1;
        let start = *pos;
        while chars.get(*pos).is_some_and(|c| c.is_ascii_digit()) {
            *pos += 1;
        }
        precision = Some(chars[start..*pos].iter().collect::<String>().parse().unwrap_or(0));
    }
    let conversion = *chars.get(*pos)?;
    *pos += 1;
    Some(Spec { width, zero_pad, left_align, precision, conversion })
}

fn pad(s: String, spec: &Spec) -> String {
    let Some(width) = spec.width else { return s };
    if s.chars().count() >= width {
        return s;
    }
    let fill = width - s.chars().count();
    if spec.left_align {
        s + &" ".repeat(fill)
    } else if spec.zero_pad && !spec.left_align {
        let pad_char = "0".repeat(fill);
        if let Some(stripped) = s.strip_prefix('-') {
            format!("-{pad_char}{stripped}")
        } else {
            pad_char + &s
        }
    } else {
        " ".repeat(fill) + &s
    }
}

fn require_float<H: Host>(interp: &mut Interp<H>, obj: &H::Obj) -> Result<f64, feather_core::Signal<H::Obj>> {
    let text = interp.host.text(obj);
    text.trim()
        .parse()
        .map_err(|_| feather_semantics::errors::raise(interp, &format!("expected floating-point number but got \"{text}\"")))
}

fn trim_trailing_zeros(s: &str) -> String {
    if !s.contains('.') {
        return s.to_string();
    }
    let trimmed = s.trim_end_matches('0');
    trimmed.trim_end_matches('.').to_string()
}

/// `%g`: the shorter of `%e`/`%f` for `precision` significant digits,
/// trailing zeros stripped, matching C's `%g`.
fn format_general(v: f64, precision: usize) -> String {
    let precision = precision.max(1);
    if v == 0.0 {
        return "0".to_string();
    }
    let exp = v.abs().log10().floor() as i32;
    if exp < -4 || exp >= precision as i32 {
        let rendered = format!("{:.*e}", precision.saturating_sub(1), v);
        match rendered.split_once('e') {
            Some((mantissa, suffix)) => format!("{}e{suffix}", trim_trailing_zeros(mantissa)),
            None => rendered,
        }
    } else {
        let decimals = (precision as i32 - 1 - exp).max(0) as usize;
        trim_trailing_zeros(&format!("{v:.decimals$}"))
    }
}

/// `format formatString ?arg ...?`
pub fn cmd_format<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.is_empty() {
        return common::wrong_args(interp, "format formatString ?arg ...?");
    }
    let fmt = interp.host.text(&args[0]);
    let chars: Vec<char> = fmt.chars().collect();
    let mut out = String::new();
    let mut pos = 0;
    let mut arg_idx = 1;

    while pos < chars.len() {
        if chars[pos] != '%' {
            out.push(chars[pos]);
            pos += 1;
            continue;
        }
        pos += 1;
        if chars.get(pos) == Some(&'%') {
            out.push('%');
            pos += 1;
            continue;
        }
        let spec = match parse_spec(&chars, &mut pos) {
            Some(s) => s,
            None => return common::error(interp, "incomplete format specifier"),
        };
        let rendered = match spec.conversion {
            'd' | 'i' => {
                if arg_idx >= args.len() {
                    return common::error(interp, "not enough arguments for all format specifiers");
                }
                let v = match common::require_int(interp, &args[arg_idx]) {
                    Ok(v) => v,
                    Err(signal) => return Flow::Break(signal),
                };
                arg_idx += 1;
                v.to_string()
            }
            'x' => {
                if arg_idx >= args.len() {
                    return common::error(interp, "not enough arguments for all format specifiers");
                }
                let v = match common::require_int(interp, &args[arg_idx]) {
                    Ok(v) => v,
                    Err(signal) => return Flow::Break(signal),
                };
                arg_idx += 1;
                format!("{v:x}")
            }
            'o' => {
                if arg_idx >= args.len() {
                    return common::error(interp, "not enough arguments for all format specifiers");
                }
                let v = match common::require_int(interp, &args[arg_idx]) {
                    Ok(v) => v,
                    Err(signal) => return Flow::Break(signal),
                };
                arg_idx += 1;
                format!("{v:o}")
            }
            'X' => {
                if arg_idx >= args.len() {
                    return common::error(interp, "not enough arguments for all format specifiers");
                }
                let v = match common::require_int(interp, &args[arg_idx]) {
                    Ok(v) => v,
                    Err(signal) => return Flow::Break(signal),
                };
                arg_idx += 1;
                format!("{v:X}")
            }
            'f' => {
                if arg_idx >= args.len() {
                    return common::error(interp, "not enough arguments for all format specifiers");
                }
                let v = match require_float(interp, &args[arg_idx]) {
                    Ok(v) => v,
                    Err(signal) => return Flow::Break(signal),
                };
                arg_idx += 1;
                format!("{:.*}", spec.precision.unwrap_or(6), v)
            }
            'e' => {
                if arg_idx >= args.len() {
                    return common::error(interp, "not enough arguments for all format specifiers");
                }
                let v = match require_float(interp, &args[arg_idx]) {
                    Ok(v) => v,
                    Err(signal) => return Flow::Break(signal),
                };
                arg_idx += 1;
                format!("{:.*e}", spec.precision.unwrap_or(6), v)
            }
            'g' => {
                if arg_idx >= args.len() {
                    return common::error(interp, "not enough arguments for all format specifiers");
                }
                let v = match require_float(interp, &args[arg_idx]) {
                    Ok(v) => v,
                    Err(signal) => return Flow::Break(signal),
                };
                arg_idx += 1;
                format_general(v, spec.precision.unwrap_or(6))
            }
            's' => {
                if arg_idx >= args.len() {
                    return common::error(interp, "not enough arguments for all format specifiers");
                }
                let text = interp.host.text(&args[arg_idx]);
                arg_idx += 1;
                match spec.precision {
                    Some(p) => text.chars().take(p).collect(),
                    None => text,
                }
            }
            'c' => {
                if arg_idx >= args.len() {
                    return common::error(interp, "not enough arguments for all format specifiers");
                }
                let v = match common::require_int(interp, &args[arg_idx]) {
                    Ok(v) => v,
                    Err(signal) => return Flow::Break(signal),
                };
                arg_idx += 1;
                char::from_u32(v as u32).map(String::from).unwrap_or_default()
            }
            other => return common::error(interp, format!("bad field specifier \"{other}\"")),
        };
        out.push_str(&pad(rendered, &spec));
    }
    Flow::Continue(interp.host.intern(out.as_bytes()))
}

/// `scan string format ?varName ...?`
///
/// Supports `%d`, `%s`, `%f`, and `%c` fields separated by literal text, the
/// common subset used for parsing simple structured input.
pub fn cmd_scan<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.len() < 2 {
        return common::wrong_args(interp, "scan string format ?varName ...?");
    }
    let text = interp.host.text(&args[0]);
    let fmt = interp.host.text(&args[1]);
    let var_names = &args[2..];

    let mut remaining = text.as_str();
    let fmt_chars: Vec<char> = fmt.chars().collect();
    let mut fi = 0;
    let mut values: Vec<H::Obj> = Vec::new();

    while fi < fmt_chars.len() {
        if fmt_chars[fi] == '%' && fi + 1 < fmt_chars.len() {
            let conversion = fmt_chars[fi + 1];
            fi += 2;
            remaining = remaining.trim_start();
            match conversion {
                'd' => {
                    let end = remaining
                        .char_indices()
                        .find(|(i, c)| !(c.is_ascii_digit() || (*i == 0 && (*c == '-' || *c == '+'))))
                        .map(|(i, _)| i)
                        .unwrap_or(remaining.len());
                    if end == 0 {
                        break;
                    }
                    let (num, rest) = remaining.split_at(end);
                    remaining = rest;
                    match num.parse::<i64>() {
                        Ok(v) => values.push(interp.host.int_create(v)),
                        Err(_) => break,
                    }
                }
                'f' => {
                    let end = remaining
                        .char_indices()
                        .find(|(i, c)| !(c.is_ascii_digit() || *c == '.' || (*i == 0 && (*c == '-' || *c == '+'))))
                        .map(|(i, _)| i)
                        .unwrap_or(remaining.len());
                    if end == 0 {
                        break;
                    }
                    let (num, rest) = remaining.split_at(end);
                    remaining = rest;
                    values.push(interp.host.intern(num.as_bytes()));
                }
                's' => {
                    let end = remaining.find(char::is_whitespace).unwrap_or(remaining.len());
                    if end == 0 {
                        break;
                    }
                    let (word, rest) = remaining.split_at(end);
                    remaining = rest;
                    values.push(interp.host.intern(word.as_bytes()));
                }
                'c' => {
                    let mut it = remaining.chars();
                    match it.next() {
                        Some(c) => {
                            values.push(interp.host.int_create(c as i64));
                            remaining = it.as_str();
                        }
                        None => break,
                    }
                }
                '%' => {
                    remaining = remaining.strip_prefix('%').unwrap_or(remaining);
                }
                _ => break,
            }
        } else {
            let expected = fmt_chars[fi];
            if remaining.starts_with(expected) {
                remaining = &remaining[expected.len_utf8()..];
            } else {
                break;
            }
            fi += 1;
        }
    }

    let frame = interp.host.frame_current();
    if var_names.is_empty() {
        return Flow::Continue(common::make_list(interp, values));
    }
    for (name_obj, value) in var_names.iter().zip(values.iter()) {
        let name = interp.host.text(name_obj);
        interp.host.var_set(frame, &name, value.clone());
    }
    Flow::Continue(interp.host.int_create(values.len() as i64))
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
    fn format_substitutes_decimal_and_string() {
        let mut interp = new_interp();
        let fmt = interp.host.intern(b"%s is %d");
        let name = interp.host.intern(b"age");
        let n = interp.host.int_create(5);
        let result = cmd_format(&mut interp, &[fmt, name, n]);
        assert_matches::assert_matches!(result, Flow::Continue(v) => {
            assert_eq!(interp.host.text(&v), "age is 5");
        });
    }

    #[test]
    fn format_zero_pads_width() {
        let mut interp = new_interp();
        let fmt = interp.host.intern(b"%05d");
        let n = interp.host.int_create(42);
        let result = cmd_format(&mut interp, &[fmt, n]);
        assert_matches::assert_matches!(result, Flow::Continue(v) => {
            assert_eq!(interp.host.text(&v), "00042");
        });
    }

    #[test]
    fn format_uppercase_hex() {
        let mut interp = new_interp();
        let fmt = interp.host.intern(b"%X");
        let n = interp.host.int_create(255);
        let result = cmd_format(&mut interp, &[fmt, n]);
        assert_matches::assert_matches!(result, Flow::Continue(v) => {
            assert_eq!(interp.host.text(&v), "FF");
        });
    }

    #[test]
    fn format_scientific_notation() {
        let mut interp = new_interp();
        let fmt = interp.host.intern(b"%.2e");
        let n = interp.host.intern(b"1234.5");
        let result = cmd_format(&mut interp, &[fmt, n]);
        assert_matches::assert_matches!(result, Flow::Continue(v) => {
            assert_eq!(interp.host.text(&v), "1.23e3");
        });
    }

    #[test]
    fn format_general_strips_trailing_zeros() {
        let mut interp = new_interp();
        let fmt = interp.host.intern(b"%g");
        let n = interp.host.intern(b"100.0");
        let result = cmd_format(&mut interp, &[fmt, n]);
        assert_matches::assert_matches!(result, Flow::Continue(v) => {
            assert_eq!(interp.host.text(&v), "100");
        });
    }

    #[test]
    fn scan_extracts_integer_and_word() {
        let mut interp = new_interp();
        let text = interp.host.intern(b"count 42");
        let fmt = interp.host.intern(b"%s %d");
        let result = cmd_scan(&mut interp, &[text, fmt]);
        assert_matches::assert_matches!(result, Flow::Continue(v) => {
            assert_eq!(interp.host.list_len(&v), 2);
        });
    }
}
