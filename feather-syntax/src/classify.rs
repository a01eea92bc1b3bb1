// SPDX-License-Identifier: MIT OR Apache-2.0
//! Byte-level predicates and the UTF-8 codec used while parsing source text
//! and resolving `\x`/`\u`/`\U`/`\o` escapes.

/// Whitespace that separates words within a command, but does not end it:
/// space and tab. Newline is a command terminator, handled separately.
pub fn is_line_space(b: u8) -> bool {
    b == b' ' || b == b'\t' || b == b'\r'
}

/// True for a byte that ends a command when unquoted and unbraced.
pub fn is_command_terminator(b: u8) -> bool {
    b == b';' || b == b'\n'
}

/// True for a byte that ends a bare word when unquoted and unbraced:
/// line-space or a command terminator.
pub fn is_word_terminator(b: u8) -> bool {
    is_line_space(b) || is_command_terminator(b)
}

/// True for a byte that may appear in an unbraced `$name` variable name:
/// ASCII alphanumerics, underscore, or `:` (namespace separators appear as
/// `::`).
pub fn is_varname_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b':'
}

/// Encodes a Unicode scalar value as UTF-8 into `out`.
pub fn encode_utf8(c: char, out: &mut Vec<u8>) {
    let mut buf = [0u8; 4];
    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
}

/// Decodes one UTF-8 scalar value starting at `bytes[0]`, returning the
/// decoded character and its byte length. Returns `None` on invalid UTF-8 (in
/// which case the caller should fall back to treating the lead byte as a
/// single opaque byte).
pub fn decode_utf8_char(bytes: &[u8]) -> Option<(char, usize)> {
    if bytes.is_empty() {
        return None;
    }
    let len = utf8_len(bytes[0])?;
    if bytes.len() < len {
        return None;
    }
    std::str::from_utf8(&bytes[..len])
        .ok()
        .and_then(|s| s.chars().next())
        .map(|c| (c, len))
}

fn utf8_len(lead: u8) -> Option<usize> {
    if lead & 0x80 == 0 {
        Some(1)
    } else if lead & 0xE0 == 0xC0 {
        Some(2)
    } else if lead & 0xF0 == 0xE0 {
        Some(3)
    } else if lead & 0xF8 == 0xF0 {
        Some(4)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_space_vs_terminator() {
        assert!(is_line_space(b' '));
        assert!(is_line_space(b'\t'));
        assert!(!is_line_space(b'\n'));
        assert!(is_command_terminator(b'\n'));
        assert!(is_command_terminator(b';'));
        assert!(!is_command_terminator(b' '));
    }

    #[test]
    fn varname_bytes() {
        assert!(is_varname_byte(b'a'));
        assert!(is_varname_byte(b'_'));
        assert!(is_varname_byte(b':'));
        assert!(!is_varname_byte(b'('));
        assert!(!is_varname_byte(b' '));
    }

    #[test]
    fn round_trips_ascii_and_multibyte() {
        let mut out = Vec::new();
        encode_utf8('A', &mut out);
        encode_utf8('é', &mut out);
        encode_utf8('\u{1F600}', &mut out);
        let (c1, n1) = decode_utf8_char(&out).unwrap();
        assert_eq!(c1, 'A');
        assert_eq!(n1, 1);
        let (c2, n2) = decode_utf8_char(&out[n1..]).unwrap();
        assert_eq!(c2, 'é');
        assert_eq!(n2, 2);
        let (c3, n3) = decode_utf8_char(&out[n1 + n2..]).unwrap();
        assert_eq!(c3, '\u{1F600}');
        assert_eq!(n3, 4);
    }

    #[test]
    fn invalid_lead_byte_is_none() {
        assert_eq!(utf8_len(0xFF), None);
    }
}
