// SPDX-License-Identifier: MIT OR Apache-2.0
//! Stack-level expression parsing: `#N` (absolute) or `N` (relative to the
//! current frame), as used by `upvar`/`uplevel` (§4.8).

/// Raised when a string is not a valid level expression, or resolves outside
/// the current frame stack.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("bad level \"{0}\"")]
pub struct BadLevel(pub String);

/// Parses `s` as a stack level relative to `current` (the calling frame's
/// absolute level), returning the resolved absolute frame level.
///
/// `#N` addresses absolute level `N` directly. A bare `N` addresses the
/// frame `N` levels up from `current` (so `1` is the caller's caller's
/// frame, matching `uplevel`/`upvar`'s own convention of counting from the
/// frame that issued the call). A result would be negative or is itself
/// unparsable both resolve to a bad-level error.
pub fn parse_level(s: &str, current: usize) -> Result<usize, BadLevel> {
    let bad = || BadLevel(s.to_string());

    if let Some(digits) = s.strip_prefix('#') {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad());
        }
        let level: usize = digits.parse().map_err(|_| bad())?;
        if level > current {
            return Err(bad());
        }
        return Ok(level);
    }

    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(bad());
    }
    let relative: usize = s.parse().map_err(|_| bad())?;
    current.checked_sub(relative).ok_or_else(bad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_level() {
        assert_eq!(parse_level("#0", 3), Ok(0));
        assert_eq!(parse_level("#3", 3), Ok(3));
        assert!(parse_level("#4", 3).is_err());
    }

    #[test]
    fn relative_level() {
        assert_eq!(parse_level("0", 3), Ok(3));
        assert_eq!(parse_level("1", 3), Ok(2));
        assert_eq!(parse_level("3", 3), Ok(0));
        assert!(parse_level("4", 3).is_err());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_level("", 3).is_err());
        assert!(parse_level("-1", 3).is_err());
        assert!(parse_level("abc", 3).is_err());
        assert!(parse_level("#", 3).is_err());
    }
}
