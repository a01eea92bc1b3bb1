// SPDX-License-Identifier: MIT OR Apache-2.0
//! List built-ins: `concat`, `list`, `llength`, `lindex`, `lrange`,
//! `lreplace`, `linsert`, `lset`, `lsearch`, `lsort`, `join`, `split` (§4.6).

use feather_core::host::Host;
use feather_core::{Flow, Interp};
use feather_syntax::parse_index;

use crate::common;

/// Clamps a [`parse_index`] result into `0..=len` for use as a slice bound.
fn clamp_index(raw: i64, len: usize) -> usize {
    if raw < 0 {
        0
    } else {
        (raw as usize).min(len)
    }
}

fn resolve_index<H: Host>(interp: &mut Interp<H>, obj: &H::Obj, len: usize) -> Result<i64, feather_core::Signal<H::Obj>> {
    let text = interp.host.text(obj);
    parse_index(&text, len).map_err(|e| feather_semantics::errors::raise(interp, &e.to_string()))
}

/// `concat ?arg ...?`
pub fn cmd_concat<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    let mut elements = Vec::new();
    for arg in args {
        match common::list_elements(interp, arg) {
            Ok(e) => elements.extend(e),
            Err(signal) => return Flow::Break(signal),
        }
    }
    let text = elements
        .iter()
        .map(|e| interp.host.text(e))
        .collect::<Vec<_>>()
        .join(" ");
    Flow::Continue(interp.host.intern(text.as_bytes()))
}

/// `list ?arg ...?`
pub fn cmd_list<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    Flow::Continue(common::make_list(interp, args.iter().cloned()))
}

/// `llength list`
pub fn cmd_llength<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.len() != 1 {
        return common::wrong_args(interp, "llength list");
    }
    match common::list_elements(interp, &args[0]) {
        Ok(e) => Flow::Continue(interp.host.int_create(e.len() as i64)),
        Err(signal) => Flow::Break(signal),
    }
}

/// `lindex list ?index ...?`
pub fn cmd_lindex<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.is_empty() {
        return common::wrong_args(interp, "lindex list ?index ...?");
    }
    let mut current = args[0].clone();
    for index_arg in &args[1..] {
        let elements = match common::list_elements(interp, &current) {
            Ok(e) => e,
            Err(signal) => return Flow::Break(signal),
        };
        let idx = match resolve_index(interp, index_arg, elements.len()) {
            Ok(i) => i,
            Err(signal) => return Flow::Break(signal),
        };
        current = if idx < 0 || idx as usize >= elements.len() {
            interp.host.nil()
        } else {
            elements[idx as usize].clone()
        };
    }
    Flow::Continue(current)
}

/// `lrange list first last`
pub fn cmd_lrange<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.len() != 3 {
        return common::wrong_args(interp, "lrange list first last");
    }
    let elements = match common::list_elements(interp, &args[0]) {
        Ok(e) => e,
        Err(signal) => return Flow::Break(signal),
    };
    let first = match resolve_index(interp, &args[1], elements.len()) {
        Ok(i) => clamp_index(i, elements.len()),
        Err(signal) => return Flow::Break(signal),
    };
    let last = match resolve_index(interp, &args[2], elements.len()) {
        Ok(i) => clamp_index(i, elements.len()),
        Err(signal) => return Flow::Break(signal),
    };
    let slice = if first > last { &[][..] } else { &elements[first..last.max(first)] };
    Flow::Continue(common::make_list(interp, slice.iter().cloned()))
}

/// `lreplace list first last ?element ...?`
pub fn cmd_lreplace<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.len() < 3 {
        return common::wrong_args(interp, "lreplace list first last ?element ...?");
    }
    let elements = match common::list_elements(interp, &args[0]) {
        Ok(e) => e,
        Err(signal) => return Flow::Break(signal),
    };
    let first = match resolve_index(interp, &args[1], elements.len()) {
        Ok(i) => clamp_index(i, elements.len()),
        Err(signal) => return Flow::Break(signal),
    };
    let last = match resolve_index(interp, &args[2], elements.len()) {
        Ok(i) => clamp_index(i, elements.len()),
        Err(signal) => return Flow::Break(signal),
    };
    let mut result: Vec<H::Obj> = elements[..first].to_vec();
    result.extend(args[3..].iter().cloned());
    if last >= first {
        result.extend(elements[last.min(elements.len())..].iter().cloned());
    } else {
        result.extend(elements[first..].iter().cloned());
    }
    Flow::Continue(common::make_list(interp, result))
}

/// `linsert list index ?element ...?`
pub fn cmd_linsert<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.len() < 2 {
        return common::wrong_args(interp, "linsert list index ?element ...?");
    }
    let elements = match common::list_elements(interp, &args[0]) {
        Ok(e) => e,
        Err(signal) => return Flow::Break(signal),
    };
    let at = match resolve_index(interp, &args[1], elements.len()) {
        Ok(i) => clamp_index(i, elements.len()),
        Err(signal) => return Flow::Break(signal),
    };
    let mut result: Vec<H::Obj> = elements[..at].to_vec();
    result.extend(args[2..].iter().cloned());
    result.extend(elements[at..].iter().cloned());
    Flow::Continue(common::make_list(interp, result))
}

/// `lset listVar index value`
pub fn cmd_lset<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.len() != 3 {
        return common::wrong_args(interp, "lset listVar index value");
    }
    let frame = interp.host.frame_current();
    let name = interp.host.text(&args[0]);
    let current = match interp.host.var_get(frame, &name) {
        Some(v) => v,
        None => return common::error(interp, format!("can't read \"{name}\": no such variable")),
    };
    let elements = match common::list_elements(interp, &current) {
        Ok(e) => e,
        Err(signal) => return Flow::Break(signal),
    };
    let idx = match resolve_index(interp, &args[1], elements.len()) {
        Ok(i) => i,
        Err(signal) => return Flow::Break(signal),
    };
    if idx < 0 || idx as usize >= elements.len() {
        return common::error(interp, "list index out of range");
    }
    let mut result = elements;
    result[idx as usize] = args[2].clone();
    let updated = common::make_list(interp, result);
    interp.host.var_set(frame, &name, updated.clone());
    Flow::Continue(updated)
}

/// `lsearch ?-exact|-glob? ?-all? list pattern`
pub fn cmd_lsearch<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    let mut i = 0;
    let mut glob_mode = false;
    let mut all = false;
    while i < args.len() {
        let word = interp.host.text(&args[i]);
        match word.as_str() {
            "-exact" => {
                glob_mode = false;
                i += 1;
            }
            "-glob" => {
                glob_mode = true;
                i += 1;
            }
            "-all" => {
                all = true;
                i += 1;
            }
            _ => break,
        }
    }
    if i + 2 != args.len() {
        return common::wrong_args(interp, "lsearch ?-exact|-glob? ?-all? list pattern");
    }
    let elements = match common::list_elements(interp, &args[i]) {
        Ok(e) => e,
        Err(signal) => return Flow::Break(signal),
    };
    let pattern = interp.host.text(&args[i + 1]);

    let matches_fn = |candidate: &str| -> bool {
        if glob_mode {
            feather_fnmatch::matches(pattern.as_bytes(), candidate.as_bytes())
        } else {
            candidate == pattern
        }
    };

    if all {
        let hits: Vec<i64> = elements
            .iter()
            .enumerate()
            .filter(|(_, e)| matches_fn(&interp.host.text(e)))
            .map(|(idx, _)| idx as i64)
            .collect();
        let list = common::make_list(interp, hits.into_iter().map(|n| interp.host.int_create(n)));
        return Flow::Continue(list);
    }
    let found = elements.iter().position(|e| matches_fn(&interp.host.text(e)));
    Flow::Continue(interp.host.int_create(found.map(|i| i as i64).unwrap_or(-1)))
}

#[derive(Clone, Copy)]
enum SortMode {
    Ascii,
    Integer,
    Real,
    Dictionary,
}

/// `lsort ?-ascii|-integer|-real|-dictionary? ?-increasing|-decreasing? ?-unique? list`
pub fn cmd_lsort<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    let mut i = 0;
    let mut mode = SortMode::Ascii;
    let mut decreasing = false;
    let mut unique = false;
    while i < args.len() {
        let word = interp.host.text(&args[i]);
        match word.as_str() {
            "-ascii" => {
                mode = SortMode::Ascii;
                i += 1;
            }
            "-integer" => {
                mode = SortMode::Integer;
                i += 1;
            }
            "-real" => {
                mode = SortMode::Real;
                i += 1;
            }
            "-dictionary" => {
                mode = SortMode::Dictionary;
                i += 1;
            }
            "-increasing" => {
                decreasing = false;
                i += 1;
            }
            "-decreasing" => {
                decreasing = true;
                i += 1;
            }
            "-unique" => {
                unique = true;
                i += 1;
            }
            _ => break,
        }
    }
    if i + 1 != args.len() {
        return common::wrong_args(
            interp,
            "lsort ?-ascii|-integer|-real|-dictionary? ?-increasing|-decreasing? ?-unique? list",
        );
    }
    let mut elements = match common::list_elements(interp, &args[i]) {
        Ok(e) => e,
        Err(signal) => return Flow::Break(signal),
    };

    match mode {
        SortMode::Integer => elements.sort_by_key(|e| interp.host.int_get(e).unwrap_or(0)),
        SortMode::Real => {
            elements.sort_by(|a, b| {
                let x: f64 = interp.host.text(a).trim().parse().unwrap_or(0.0);
                let y: f64 = interp.host.text(b).trim().parse().unwrap_or(0.0);
                x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal)
            });
        }
        SortMode::Dictionary => {
            elements.sort_by(|a, b| interp.host.text(a).to_lowercase().cmp(&interp.host.text(b).to_lowercase()));
        }
        SortMode::Ascii => elements.sort_by(|a, b| interp.host.text(a).cmp(&interp.host.text(b))),
    }
    if decreasing {
        elements.reverse();
    }
    if unique {
        elements.dedup_by(|a, b| interp.host.text(a) == interp.host.text(b));
    }
    Flow::Continue(common::make_list(interp, elements))
}

/// `join list ?joinString?`
pub fn cmd_join<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.is_empty() || args.len() > 2 {
        return common::wrong_args(interp, "join list ?joinString?");
    }
    let sep = if args.len() == 2 { interp.host.text(&args[1]) } else { " ".to_string() };
    let elements = match common::list_elements(interp, &args[0]) {
        Ok(e) => e,
        Err(signal) => return Flow::Break(signal),
    };
    let joined = elements
        .iter()
        .map(|e| interp.host.text(e))
        .collect::<Vec<_>>()
        .join(&sep);
    Flow::Continue(interp.host.intern(joined.as_bytes()))
}

/// `split string ?splitChars?`
pub fn cmd_split<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    if args.is_empty() || args.len() > 2 {
        return common::wrong_args(interp, "split string ?splitChars?");
    }
    let text = interp.host.text(&args[0]);
    let chars = if args.len() == 2 {
        interp.host.text(&args[1])
    } else {
        " \t\n\r".to_string()
    };

    let pieces: Vec<&str> = if chars.is_empty() {
        text.split("").filter(|s| !s.is_empty()).collect()
    } else {
        text.split(|c| chars.contains(c)).collect()
    };
    let values = pieces.into_iter().map(|p| interp.host.intern(p.as_bytes()));
    Flow::Continue(common::make_list(interp, values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use feather_core::Limits;
    use feather_stub::StubHost;

    fn new_interp() -> Interp<StubHost> {
        Interp::new(StubHost::new(), Limits::default())
    }

    fn list_of(interp: &mut Interp<StubHost>, items: &[&str]) -> <StubHost as Host>::Obj {
        let objs: Vec<_> = items.iter().map(|s| interp.host.intern(s.as_bytes())).collect();
        common::make_list(interp, objs)
    }

    #[test]
    fn llength_counts_elements() {
        let mut interp = new_interp();
        let list = list_of(&mut interp, &["a", "b", "c"]);
        let result = cmd_llength(&mut interp, &[list]);
        assert_matches::assert_matches!(result, Flow::Continue(v) => {
            assert_eq!(interp.host.text(&v), "3");
        });
    }

    #[test]
    fn lindex_supports_end_keyword() {
        let mut interp = new_interp();
        let list = list_of(&mut interp, &["a", "b", "c"]);
        let end = interp.host.intern(b"end");
        let result = cmd_lindex(&mut interp, &[list, end]);
        assert_matches::assert_matches!(result, Flow::Continue(v) => {
            assert_eq!(interp.host.text(&v), "c");
        });
    }

    #[test]
    fn lrange_slices_inclusive() {
        let mut interp = new_interp();
        let list = list_of(&mut interp, &["a", "b", "c", "d"]);
        let first = interp.host.intern(b"1");
        let last = interp.host.intern(b"2");
        let result = cmd_lrange(&mut interp, &[list, first, last]);
        assert_matches::assert_matches!(result, Flow::Continue(v) => {
            assert_eq!(interp.host.list_len(&v), 2);
        });
    }

    #[test]
    fn lsort_integer_mode() {
        let mut interp = new_interp();
        let items = ["30", "4", "100"];
        let objs: Vec<_> = items.iter().map(|s| interp.host.int_create(s.parse().unwrap())).collect();
        let list = common::make_list(&mut interp, objs);
        let flag = interp.host.intern(b"-integer");
        let result = cmd_lsort(&mut interp, &[flag, list]);
        assert_matches::assert_matches!(result, Flow::Continue(v) => {
            let elements = common::list_elements(&mut interp, &v).unwrap();
            let rendered: Vec<String> = elements.iter().map(|e| interp.host.text(e)).collect();
            assert_eq!(rendered, vec!["4", "30", "100"]);
        });
    }

    #[test]
    fn lsort_real_mode() {
        let mut interp = new_interp();
        let items = ["3.5", "1.25", "2.0"];
        let objs: Vec<_> = items.iter().map(|s| interp.host.intern(s.as_bytes())).collect();
        let list = common::make_list(&mut interp, objs);
        let flag = interp.host.intern(b"-real");
        let result = cmd_lsort(&mut interp, &[flag, list]);
        assert_matches::assert_matches!(result, Flow::Continue(v) => {
            let elements = common::list_elements(&mut interp, &v).unwrap();
            let rendered: Vec<String> = elements.iter().map(|e| interp.host.text(e)).collect();
            assert_eq!(rendered, vec!["1.25", "2.0", "3.5"]);
        });
    }

    #[test]
    fn lsort_unique_drops_adjacent_duplicates() {
        let mut interp = new_interp();
        let items = ["b", "a", "b", "a"];
        let objs: Vec<_> = items.iter().map(|s| interp.host.intern(s.as_bytes())).collect();
        let list = common::make_list(&mut interp, objs);
        let flag = interp.host.intern(b"-unique");
        let result = cmd_lsort(&mut interp, &[flag, list]);
        assert_matches::assert_matches!(result, Flow::Continue(v) => {
            let elements = common::list_elements(&mut interp, &v).unwrap();
            let rendered: Vec<String> = elements.iter().map(|e| interp.host.text(e)).collect();
            assert_eq!(rendered, vec!["a", "b"]);
        });
    }

    #[test]
    fn split_on_default_whitespace() {
        let mut interp = new_interp();
        let text = interp.host.intern(b"a b  c");
        let result = cmd_split(&mut interp, &[text]);
        assert_matches::assert_matches!(result, Flow::Continue(v) => {
            assert!(interp.host.list_len(&v) >= 3);
        });
    }
}
