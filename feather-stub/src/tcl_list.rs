// SPDX-License-Identifier: MIT OR Apache-2.0
//! Canonical Tcl-list string encoding, used by [`crate::StubHost`] to back
//! every list value with its string representation rather than a second,
//! separate object type — the same "everything is a string, shimmered on
//! demand" model the reference language itself uses.

/// Splits `src` into its list elements, applying brace/quote grouping and
/// backslash unescaping. Returns an error if braces or quotes are
/// unbalanced.
pub fn split_list(src: &[u8]) -> Result<Vec<Vec<u8>>, String> {
    let mut i = 0usize;
    let n = src.len();
    let mut out = Vec::new();

    loop {
        while i < n && src[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= n {
            break;
        }
        if src[i] == b'{' {
            let mut depth = 1;
            i += 1;
            let start = i;
            while i < n && depth > 0 {
                match src[i] {
                    b'{' => depth += 1,
                    b'}' => depth -= 1,
                    b'\\' if i + 1 < n => i += 1,
                    _ => {}
                }
                i += 1;
            }
            if depth != 0 {
                return Err("unmatched open brace in list".to_string());
            }
            out.push(src[start..i - 1].to_vec());
        } else if src[i] == b'"' {
            i += 1;
            let start = i;
            while i < n && src[i] != b'"' {
                if src[i] == b'\\' && i + 1 < n {
                    i += 1;
                }
                i += 1;
            }
            if i >= n {
                return Err("unmatched open quote in list".to_string());
            }
            out.push(unescape(&src[start..i]));
            i += 1;
        } else {
            let start = i;
            while i < n && !src[i].is_ascii_whitespace() {
                if src[i] == b'\\' && i + 1 < n {
                    i += 1;
                }
                i += 1;
            }
            out.push(unescape(&src[start..i]));
        }
    }
    Ok(out)
}

fn unescape(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        if raw[i] == b'\\' && i + 1 < raw.len() {
            out.push(raw[i + 1]);
            i += 2;
        } else {
            out.push(raw[i]);
            i += 1;
        }
    }
    out
}

/// Joins `elements` back into canonical list string form, brace-quoting any
/// element that would not otherwise round-trip through [`split_list`].
pub fn join_list<I: IntoIterator<Item = V>, V: AsRef<[u8]>>(elements: I) -> Vec<u8> {
    let mut out = Vec::new();
    for (i, elem) in elements.into_iter().enumerate() {
        if i > 0 {
            out.push(b' ');
        }
        out.extend_from_slice(&format_element(elem.as_ref()));
    }
    out
}

fn format_element(e: &[u8]) -> Vec<u8> {
    let needs_braces = e.is_empty()
        || e.iter()
            .any(|&b| b.is_ascii_whitespace() || matches!(b, b'{' | b'}' | b'"' | b'\\' | b'$' | b'[' | b']' | b';'));
    if !needs_braces {
        return e.to_vec();
    }
    let mut out = Vec::with_capacity(e.len() + 2);
    out.push(b'{');
    out.extend_from_slice(e);
    out.push(b'}');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_plain_whitespace_separated_words() {
        assert_eq!(split_list(b"a b c").unwrap(), vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
    }

    #[test]
    fn brace_grouped_element_keeps_inner_spaces() {
        let elements = split_list(b"a {b c} d").unwrap();
        assert_eq!(elements, vec![b"a".to_vec(), b"b c".to_vec(), b"d".to_vec()]);
    }

    #[test]
    fn round_trips_through_join() {
        let elements = vec![b"a".to_vec(), b"b c".to_vec(), b"".to_vec()];
        let joined = join_list(elements.clone());
        let split = split_list(&joined).unwrap();
        assert_eq!(split, elements);
    }

    #[test]
    fn unmatched_brace_is_an_error() {
        assert!(split_list(b"a {b c").is_err());
    }
}
