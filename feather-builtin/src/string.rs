// SPDX-License-Identifier: MIT OR Apache-2.0
//! The `string` built-in: a subcommand dispatcher over `length`, `index`,
//! `range`, `compare`, `equal`, `match`, `toupper`, `tolower`, `trim`,
//! `trimleft`, `trimright`, `first`, `last`, `map`, `repeat`, `replace`,
//! and `reverse` (§4.6).

use feather_core::host::Host;
use feather_core::{Flow, Interp};
use feather_syntax::parse_index;

use crate::common;

fn resolve_index<H: Host>(interp: &mut Interp<H>, obj: &H::Obj, len: usize) -> Result<i64, feather_core::Signal<H::Obj>> {
    let text = interp.host.text(obj);
    parse_index(&text, len).map_err(|e| feather_semantics::errors::raise(interp, &e.to_string()))
}

/// `string subcommand ?arg ...?`
pub fn cmd_string<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.is_empty() {
        return common::wrong_args(interp, "string subcommand ?arg ...?");
    }
    let subcommand = interp.host.text(&args[0]);
    let rest = &args[1..];
    match subcommand.as_str() {
        "length" => length(interp, rest),
        "index" => index(interp, rest),
        "range" => range(interp, rest),
        "compare" => compare(interp, rest),
        "equal" => equal(interp, rest),
        "match" => string_match(interp, rest),
        "toupper" => case(interp, rest, str::to_uppercase),
        "tolower" => case(interp, rest, str::to_lowercase),
        "trim" => trim(interp, rest, true, true),
        "trimleft" => trim(interp, rest, true, false),
        "trimright" => trim(interp, rest, false, true),
        "first" => first(interp, rest),
        "last" => last(interp, rest),
        "map" => map(interp, rest),
        "repeat" => repeat(interp, rest),
        "replace" => replace(interp, rest),
        "reverse" => reverse(interp, rest),
        _ => common::error(interp, format!("unknown or ambiguous subcommand \"{subcommand}\": must be length, index, range, compare, equal, match, toupper, tolower, trim, trimleft, trimright, first, last, map, repeat, replace, or reverse")),
    }
}

fn length<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.len() != 1 {
        return common::wrong_args(interp, "string length string");
    }
    let text = interp.host.text(&args[0]);
    Flow::Continue(interp.host.int_create(text.chars().count() as i64))
}

fn index<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.len() != 2 {
        return common::wrong_args(interp, "string index string charIndex");
    }
    let text = interp.host.text(&args[0]);
    let chars: Vec<char> = text.chars().collect();
    let idx = match resolve_index(interp, &args[1], chars.len()) {
        Ok(i) => i,
        Err(signal) => return Flow::Break(signal),
    };
    if idx < 0 || idx as usize >= chars.len() {
        return Flow::Continue(interp.host.intern(b""));
    }
    let ch = chars[idx as usize];
    let mut buf = [0u8; 4];
    Flow::Continue(interp.host.intern(ch.encode_utf8(&mut buf).as_bytes()))
}

fn range<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.len() != 3 {
        return common::wrong_args(interp, "string range string first last");
    }
    let text = interp.host.text(&args[0]);
    let chars: Vec<char> = text.chars().collect();
    let first = match resolve_index(interp, &args[1], chars.len()) {
        Ok(i) => i.max(0) as usize,
        Err(signal) => return Flow::Break(signal),
    };
    let last = match resolve_index(interp, &args[2], chars.len()) {
        Ok(i) => i,
        Err(signal) => return Flow::Break(signal),
    };
    if last < 0 || first >= chars.len() || (last as usize) < first {
        return Flow::Continue(interp.host.intern(b""));
    }
    let end = (last as usize + 1).min(chars.len());
    let slice: String = chars[first..end].iter().collect();
    Flow::Continue(interp.host.intern(slice.as_bytes()))
}

fn compare<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.len() != 2 {
        return common::wrong_args(interp, "string compare string1 string2");
    }
    let a = interp.host.text(&args[0]);
    let b = interp.host.text(&args[1]);
    let result = match a.cmp(&b) {
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Equal => 0,
        std::cmp::Ordering::Greater => 1,
    };
    Flow::Continue(interp.host.int_create(result))
}

fn equal<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.len() != 2 {
        return common::wrong_args(interp, "string equal string1 string2");
    }
    let a = interp.host.text(&args[0]);
    let b = interp.host.text(&args[1]);
    Flow::Continue(interp.host.int_create((a == b) as i64))
}

fn string_match<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.len() != 2 {
        return common::wrong_args(interp, "string match pattern string");
    }
    let pattern = interp.host.text(&args[0]);
    let subject = interp.host.text(&args[1]);
    let matched = feather_fnmatch::matches(pattern.as_bytes(), subject.as_bytes());
    Flow::Continue(interp.host.int_create(matched as i64))
}

fn case<H: Host>(interp: &mut Interp<H>, args: &[H::Obj], transform: impl Fn(&str) -> String) -> Flow<H::Obj> {
    if args.len() != 1 {
        return common::wrong_args(interp, "string toupper|tolower string");
    }
    let text = interp.host.text(&args[0]);
    Flow::Continue(interp.host.intern(transform(&text).as_bytes()))
}

fn trim<H: Host>(interp: &mut Interp<H>, args: &[H::Obj], left: bool, right: bool) -> Flow<H::Obj> {
    if args.is_empty() || args.len() > 2 {
        return common::wrong_args(interp, "string trim string ?chars?");
    }
    let text = interp.host.text(&args[0]);
    let chars = if args.len() == 2 { interp.host.text(&args[1]) } else { " \t\n\r".to_string() };
    let pred = |c: char| chars.contains(c);
    let trimmed: &str = match (left, right) {
        (true, true) => text.trim_matches(pred),
        (true, false) => text.trim_start_matches(pred),
        (false, true) => text.trim_end_matches(pred),
        (false, false) => &text,
    };
    Flow::Continue(interp.host.intern(trimmed.as_bytes()))
}

fn first<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.len() != 2 {
        return common::wrong_args(interp, "string first needleString haystackString");
    }
    let needle = interp.host.text(&args[0]);
    let haystack = interp.host.text(&args[1]);
    let found = haystack
        .char_indices()
        .position(|(byte_idx, _)| haystack[byte_idx..].starts_with(&needle))
        .filter(|_| !needle.is_empty());
    let char_pos = found.map(|byte_idx| haystack[..byte_idx].chars().count() as i64).unwrap_or(-1);
    Flow::Continue(interp.host.int_create(char_pos))
}

fn last<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.len() != 2 {
        return common::wrong_args(interp, "string last needleString haystackString");
    }
    let needle = interp.host.text(&args[0]);
    let haystack = interp.host.text(&args[1]);
    let found = haystack
        .char_indices()
        .filter(|(byte_idx, _)| haystack[*byte_idx..].starts_with(&needle))
        .next_back()
        .filter(|_| !needle.is_empty());
    let char_pos = found.map(|(byte_idx, _)| haystack[..byte_idx].chars().count() as i64).unwrap_or(-1);
    Flow::Continue(interp.host.int_create(char_pos))
}

fn map<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.len() != 2 {
        return common::wrong_args(interp, "string map mapping string");
    }
    let pairs = match common::list_elements(interp, &args[0]) {
        Ok(p) => p,
        Err(signal) => return Flow::Break(signal),
    };
    let mut text = interp.host.text(&args[1]);
    for chunk in pairs.chunks(2) {
        if chunk.len() < 2 {
            break;
        }
        let from = interp.host.text(&chunk[0]);
        let to = interp.host.text(&chunk[1]);
        if !from.is_empty() {
            text = text.replace(&from, &to);
        }
    }
    Flow::Continue(interp.host.intern(text.as_bytes()))
}

fn repeat<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.len() != 2 {
        return common::wrong_args(interp, "string repeat string count");
    }
    let text = interp.host.text(&args[0]);
    let count = match common::require_int(interp, &args[1]) {
        Ok(v) => v,
        Err(signal) => return Flow::Break(signal),
    };
    if count < 0 {
        return common::error(interp, "cannot have a negative count");
    }
    Flow::Continue(interp.host.intern(text.repeat(count as usize).as_bytes()))
}

fn replace<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.len() < 3 || args.len() > 4 {
        return common::wrong_args(interp, "string replace string first last ?newString?");
    }
    let text = interp.host.text(&args[0]);
    let chars: Vec<char> = text.chars().collect();
    let first = match resolve_index(interp, &args[1], chars.len()) {
        Ok(i) => i.max(0) as usize,
        Err(signal) => return Flow::Break(signal),
    };
    let last = match resolve_index(interp, &args[2], chars.len()) {
        Ok(i) => i,
        Err(signal) => return Flow::Break(signal),
    };
    if last < 0 || first >= chars.len() || (last as usize) < first {
        return Flow::Continue(interp.host.intern(text.as_bytes()));
    }
    let end = (last as usize + 1).min(chars.len());
    let replacement = if args.len() == 4 { interp.host.text(&args[3]) } else { String::new() };
    let result: String = chars[..first]
        .iter()
        .collect::<String>()
        + &replacement
        + &chars[end..].iter().collect::<String>();
    Flow::Continue(interp.host.intern(result.as_bytes()))
}

fn reverse<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.len() != 1 {
        return common::wrong_args(interp, "string reverse string");
    }
    let text = interp.host.text(&args[0]);
    let reversed: String = text.chars().rev().collect();
    Flow::Continue(interp.host.intern(reversed.as_bytes()))
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
    fn length_counts_characters() {
        let mut interp = new_interp();
        let sub = interp.host.intern(b"length");
        let s = interp.host.intern(b"hello");
        let result = cmd_string(&mut interp, &[sub, s]);
        assert_matches::assert_matches!(result, Flow::Continue(v) => {
            assert_eq!(interp.host.text(&v), "5");
        });
    }

    #[test]
    fn range_uses_end_keyword() {
        let mut interp = new_interp();
        let sub = interp.host.intern(b"range");
        let s = interp.host.intern(b"hello");
        let first = interp.host.intern(b"1");
        let last = interp.host.intern(b"end");
        let result = cmd_string(&mut interp, &[sub, s, first, last]);
        assert_matches::assert_matches!(result, Flow::Continue(v) => {
            assert_eq!(interp.host.text(&v), "ello");
        });
    }

    #[test]
    fn match_uses_glob_semantics() {
        let mut interp = new_interp();
        let sub = interp.host.intern(b"match");
        let pat = interp.host.intern(b"h*o");
        let s = interp.host.intern(b"hello");
        let result = cmd_string(&mut interp, &[sub, pat, s]);
        assert_matches::assert_matches!(result, Flow::Continue(v) => {
            assert_eq!(interp.host.text(&v), "1");
        });
    }

    #[test]
    fn reverse_flips_characters() {
        let mut interp = new_interp();
        let sub = interp.host.intern(b"reverse");
        let s = interp.host.intern(b"abc");
        let result = cmd_string(&mut interp, &[sub, s]);
        assert_matches::assert_matches!(result, Flow::Continue(v) => {
            assert_eq!(interp.host.text(&v), "cba");
        });
    }

    #[test]
    fn unknown_subcommand_is_an_error() {
        let mut interp = new_interp();
        let sub = interp.host.intern(b"nope");
        let result = cmd_string(&mut interp, &[sub]);
        assert_matches::assert_matches!(result, Flow::Break(_));
    }
}
