// SPDX-License-Identifier: MIT OR Apache-2.0
//! Index expression parsing: `N`, `end`, `end-N`, `end+N` against a known
//! length (§4.8).

/// Raised when a string is not a valid index expression.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("bad index \"{0}\"")]
pub struct BadIndex(pub String);

/// Parses `s` as an index against a sequence of `len` elements.
///
/// The result is signed and may be negative (e.g. `end-5` against a
/// length-2 sequence); per the data model's invariant 6, clamping that
/// negative result to a valid range is each operation's own responsibility,
/// not this parser's.
pub fn parse_index(s: &str, len: usize) -> Result<i64, BadIndex> {
    let bad = || BadIndex(s.to_string());

    if let Some(rest) = s.strip_prefix("end") {
        let end = len as i64 - 1;
        if rest.is_empty() {
            return Ok(end);
        }
        let (sign, digits) = match rest.as_bytes().first() {
            Some(b'-') => (-1i64, &rest[1..]),
            Some(b'+') => (1i64, &rest[1..]),
            _ => return Err(bad()),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad());
        }
        let offset: i64 = digits.parse().map_err(|_| bad())?;
        return Ok(end + sign * offset);
    }

    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1i64, &s[1..]),
        Some(b'+') => (1i64, &s[1..]),
        _ => (1i64, s),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(bad());
    }
    digits.parse::<i64>().map(|v| sign * v).map_err(|_| bad())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_decimal() {
        assert_eq!(parse_index("0", 5), Ok(0));
        assert_eq!(parse_index("3", 5), Ok(3));
        assert_eq!(parse_index("+3", 5), Ok(3));
        assert_eq!(parse_index("-3", 5), Ok(-3));
    }

    #[test]
    fn end_forms() {
        assert_eq!(parse_index("end", 5), Ok(4));
        assert_eq!(parse_index("end-1", 5), Ok(3));
        assert_eq!(parse_index("end+1", 5), Ok(5));
        assert_eq!(parse_index("end", 0), Ok(-1));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_index("banana", 5).is_err());
        assert!(parse_index("end-", 5).is_err());
        assert!(parse_index("end*3", 5).is_err());
        assert!(parse_index("1.5", 5).is_err());
        assert!(parse_index("", 5).is_err());
    }
}
