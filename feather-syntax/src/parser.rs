// SPDX-License-Identifier: MIT OR Apache-2.0
//! The script parser (C5): tokenizes Tcl source text into [`Command`]s made
//! of [`Word`]s, honoring brace/quote/bare word rules and the substitution
//! grammar (`$name`, `[...]`, backslash escapes) described in §4.1.
//!
//! Parsing and substitution are two separate passes, the same split the
//! reference host-shell project draws between its syntax tree and its
//! expansion semantics: this module never evaluates anything. A `[...]`
//! command substitution is captured as the raw bytes of its inner script,
//! to be parsed again (one command at a time) and evaluated by
//! `feather-semantics` at run time.

use crate::classify::{is_line_space, is_varname_byte, is_word_terminator};
use crate::word::{Command, Word, WordUnit};

/// A parse failure: unbalanced delimiters or a malformed escape.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("missing close-brace")]
    UnbalancedBrace,
    #[error("extra characters after close-brace")]
    ExtraAfterBrace,
    #[error("missing \"")]
    UnbalancedQuote,
    #[error("extra characters after close-quote")]
    ExtraAfterQuote,
    #[error("missing close-bracket")]
    UnbalancedBracket,
    #[error("missing )")]
    UnbalancedParen,
    #[error("invalid Unicode escape")]
    BadUnicodeEscape,
}

/// Result of parsing one command: the command itself, and the source
/// position immediately after it (past any consumed terminator).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedCommand {
    pub command: Command,
    pub consumed: usize,
}

/// Skips line-space, command terminators (`;`, newline), and `#`-to-end-of-
/// line comments, the way a command boundary is skipped between one command
/// and the next. Stops at a non-skippable byte, at end of input, or (when
/// `bracket_term` is set) just before an unescaped `]` closing an enclosing
/// command substitution.
///
/// Shared between the top-level script driver and this module's own
/// recursive scan for the extent of a `[...]` command substitution, so both
/// agree on what counts as "between commands".
pub fn skip_command_boundary(src: &[u8], mut pos: usize, bracket_term: bool) -> usize {
    loop {
        while pos < src.len() && (is_line_space(src[pos]) || src[pos] == b';' || src[pos] == b'\n') {
            pos += 1;
        }
        if pos < src.len() && src[pos] == b'#' {
            while pos < src.len() && src[pos] != b'\n' {
                if src[pos] == b'\\' && pos + 1 < src.len() {
                    pos += 2;
                } else {
                    pos += 1;
                }
            }
            continue;
        }
        break;
    }
    let _ = bracket_term;
    pos
}

/// Parses a sequence of commands starting at `pos`, stopping at end of input
/// (`bracket_term == false`) or at the first unescaped `]` at the outer
/// nesting level (`bracket_term == true`), which is consumed. Returns the
/// parsed commands (empty commands are dropped) and the position just past
/// the stop point.
pub fn parse_script_commands(
    src: &[u8],
    mut pos: usize,
    bracket_term: bool,
) -> Result<(Vec<Command>, usize), ParseError> {
    let mut commands = Vec::new();
    loop {
        pos = skip_command_boundary(src, pos, bracket_term);
        if pos >= src.len() {
            if bracket_term {
                return Err(ParseError::UnbalancedBracket);
            }
            return Ok((commands, pos));
        }
        if bracket_term && src[pos] == b']' {
            return Ok((commands, pos + 1));
        }
        let parsed = parse_command_inner(src, pos, bracket_term)?;
        if !parsed.command.words.is_empty() {
            commands.push(parsed.command);
        }
        pos = parsed.consumed;
    }
}

/// Parses one command: a sequence of words up to the next unquoted/unbraced
/// `;` or newline, or end of input. The returned `consumed` position is past
/// any terminator byte consumed.
pub fn parse_command(src: &[u8], pos: usize) -> Result<ParsedCommand, ParseError> {
    parse_command_inner(src, pos, false)
}

/// As [`parse_command`], but also stops (without consuming) at an unescaped
/// `]` when `bracket_term` is set, for use while scanning a command
/// substitution's nested script.
fn parse_command_inner(src: &[u8], pos: usize, bracket_term: bool) -> Result<ParsedCommand, ParseError> {
    let mut i = pos;
    let mut words = Vec::new();
    loop {
        while i < src.len() && is_line_space(src[i]) {
            i += 1;
        }
        if i >= src.len() {
            break;
        }
        if src[i] == b';' {
            i += 1;
            break;
        }
        if src[i] == b'\n' {
            i += 1;
            break;
        }
        if bracket_term && src[i] == b']' {
            break;
        }
        let (word, next) = parse_word(src, i, bracket_term)?;
        words.push(word);
        i = next;
    }
    Ok(ParsedCommand {
        command: Command { words },
        consumed: i,
    })
}

/// Parses a single word starting at `pos`. `bracket_term` is true when this
/// word is part of a command substitution's nested script, so an unescaped
/// `]` also ends the word (and, at the command loop above, the command).
fn parse_word(src: &[u8], pos: usize, bracket_term: bool) -> Result<(Word, usize), ParseError> {
    match src.get(pos) {
        Some(b'{') => parse_braced_word(src, pos, bracket_term),
        Some(b'"') => parse_quoted_word(src, pos, bracket_term),
        _ => parse_bare_word(src, pos, bracket_term),
    }
}

fn at_word_boundary(src: &[u8], pos: usize, bracket_term: bool) -> bool {
    pos >= src.len() || is_word_terminator(src[pos]) || (bracket_term && src[pos] == b']')
}

fn parse_braced_word(src: &[u8], pos: usize, bracket_term: bool) -> Result<(Word, usize), ParseError> {
    debug_assert_eq!(src[pos], b'{');
    let mut depth = 1u32;
    let mut i = pos + 1;
    let content_start = i;
    let content_end;
    loop {
        match src.get(i) {
            None => return Err(ParseError::UnbalancedBrace),
            Some(b'{') => {
                depth += 1;
                i += 1;
            }
            Some(b'}') => {
                depth -= 1;
                i += 1;
                if depth == 0 {
                    content_end = i - 1;
                    break;
                }
            }
            Some(_) => i += 1,
        }
    }
    if !at_word_boundary(src, i, bracket_term) {
        return Err(ParseError::ExtraAfterBrace);
    }
    let content = collapse_brace_newlines(&src[content_start..content_end]);
    Ok((Word::literal(content), i))
}

/// Per the decided Tcl-8.6-compatible handling of backslash-newline inside a
/// braced word: the backslash, the newline, and any run of line-space
/// immediately after it collapse to a single space. Everything else in the
/// braced content is kept byte-for-byte.
fn collapse_brace_newlines(content: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(content.len());
    let mut i = 0;
    while i < content.len() {
        if content[i] == b'\\' && content.get(i + 1) == Some(&b'\n') {
            out.push(b' ');
            i += 2;
            while i < content.len() && is_line_space(content[i]) {
                i += 1;
            }
        } else {
            out.push(content[i]);
            i += 1;
        }
    }
    out
}

fn parse_quoted_word(src: &[u8], pos: usize, bracket_term: bool) -> Result<(Word, usize), ParseError> {
    debug_assert_eq!(src[pos], b'"');
    let (units, i) = scan_units(src, pos + 1, Terminator::Quote)?;
    if !at_word_boundary(src, i, bracket_term) {
        return Err(ParseError::ExtraAfterQuote);
    }
    Ok((Word(units), i))
}

fn parse_bare_word(src: &[u8], pos: usize, bracket_term: bool) -> Result<(Word, usize), ParseError> {
    let (units, i) = scan_units(src, pos, Terminator::Bare { bracket_term })?;
    Ok((Word(units), i))
}

#[derive(Clone, Copy)]
enum Terminator {
    /// Stop at (and consume) an unescaped `"`.
    Quote,
    /// Stop at (without consuming) a word terminator, or `]` when inside a
    /// command substitution.
    Bare { bracket_term: bool },
    /// Stop at (and consume) an unescaped `)`, used for array-element keys.
    ArrayKey,
    /// Never stop early: consume the whole input, for `subst`-style scanning
    /// that does not split on whitespace.
    Whole,
}

/// Scans `src` in its entirety as substitution units, without splitting on
/// whitespace or stopping at `;`/newline. Used by the `subst` builtin, which
/// substitutes a string's `$`/`[...]`/backslash content without the word
/// boundaries that govern ordinary command parsing.
pub fn scan_whole_units(src: &[u8]) -> Result<Vec<WordUnit>, ParseError> {
    let (units, _) = scan_units(src, 0, Terminator::Whole)?;
    Ok(units)
}

/// Scans a run of substitution units until `terminator` fires. Shared by
/// quoted words, bare words, and array-element key text: all three apply the
/// same `$`/`[...]`/backslash substitution grammar, differing only in what
/// ends them.
fn scan_units(src: &[u8], start: usize, terminator: Terminator) -> Result<(Vec<WordUnit>, usize), ParseError> {
    let mut units = Vec::new();
    let mut literal = Vec::new();
    let mut i = start;

    macro_rules! flush {
        () => {
            if !literal.is_empty() {
                units.push(WordUnit::Literal(std::mem::take(&mut literal)));
            }
        };
    }

    loop {
        match src.get(i) {
            None => match terminator {
                Terminator::Quote => return Err(ParseError::UnbalancedQuote),
                Terminator::ArrayKey => return Err(ParseError::UnbalancedParen),
                Terminator::Bare { .. } | Terminator::Whole => break,
            },
            Some(&b) => {
                match terminator {
                    Terminator::Quote if b == b'"' => {
                        i += 1;
                        break;
                    }
                    Terminator::ArrayKey if b == b')' => {
                        i += 1;
                        break;
                    }
                    Terminator::Bare { bracket_term } if at_word_boundary(src, i, bracket_term) => {
                        break;
                    }
                    _ => {}
                }
                match b {
                    b'\\' => {
                        let (bytes, next) = decode_backslash(src, i)?;
                        literal.extend(bytes);
                        i = next;
                    }
                    b'$' => match parse_var_sub(src, i)? {
                        Some((unit, next)) => {
                            flush!();
                            units.push(unit);
                            i = next;
                        }
                        None => {
                            literal.push(b'$');
                            i += 1;
                        }
                    },
                    b'[' => {
                        let inner_start = i + 1;
                        let (_commands, next) = parse_script_commands(src, inner_start, true)?;
                        let inner_end = next - 1;
                        flush!();
                        units.push(WordUnit::CommandSub(src[inner_start..inner_end].to_vec()));
                        i = next;
                    }
                    _ => {
                        literal.push(b);
                        i += 1;
                    }
                }
            }
        }
    }
    flush!();
    Ok((units, i))
}

/// Parses a `$name`, `${name}`, or `$name(key)` form starting at the `$` at
/// `pos`. Returns `None` if `$` is not followed by a valid name start, in
/// which case `$` is literal text.
fn parse_var_sub(src: &[u8], pos: usize) -> Result<Option<(WordUnit, usize)>, ParseError> {
    debug_assert_eq!(src[pos], b'$');
    let mut i = pos + 1;

    if src.get(i) == Some(&b'{') {
        let name_start = i + 1;
        let mut j = name_start;
        while j < src.len() && src[j] != b'}' {
            j += 1;
        }
        if j >= src.len() {
            return Ok(None);
        }
        let name = String::from_utf8_lossy(&src[name_start..j]).into_owned();
        return Ok(Some((WordUnit::VarSub { name, key: None }, j + 1)));
    }

    if !src.get(i).is_some_and(|&b| is_varname_byte(b)) {
        return Ok(None);
    }
    let name_start = i;
    while i < src.len() && is_varname_byte(src[i]) {
        i += 1;
    }
    let name = String::from_utf8_lossy(&src[name_start..i]).into_owned();

    if src.get(i) == Some(&b'(') {
        let (key_units, next) = scan_units(src, i + 1, Terminator::ArrayKey)?;
        return Ok(Some((
            WordUnit::VarSub {
                name,
                key: Some(Box::new(Word(key_units))),
            },
            next,
        )));
    }

    Ok(Some((WordUnit::VarSub { name, key: None }, i)))
}

/// Decodes one backslash escape starting at the `\` at `pos`, returning its
/// resolved bytes and the position just past the escape.
fn decode_backslash(src: &[u8], pos: usize) -> Result<(Vec<u8>, usize), ParseError> {
    debug_assert_eq!(src[pos], b'\\');
    let i = pos + 1;
    let Some(&c) = src.get(i) else {
        return Ok((vec![b'\\'], i));
    };
    match c {
        b'a' => Ok((vec![0x07], i + 1)),
        b'b' => Ok((vec![0x08], i + 1)),
        b'f' => Ok((vec![0x0C], i + 1)),
        b'n' => Ok((vec![b'\n'], i + 1)),
        b'r' => Ok((vec![b'\r'], i + 1)),
        b't' => Ok((vec![b'\t'], i + 1)),
        b'v' => Ok((vec![0x0B], i + 1)),
        b'\\' => Ok((vec![b'\\'], i + 1)),
        b'\n' => {
            let mut j = i + 1;
            while j < src.len() && is_line_space(src[j]) {
                j += 1;
            }
            Ok((vec![b' '], j))
        }
        b'x' => {
            let (value, next) = read_hex_digits(src, i + 1, 2);
            match value {
                Some(v) => Ok((vec![v as u8], next)),
                None => Ok((vec![b'x'], i + 1)),
            }
        }
        b'u' => {
            let (value, next) = read_hex_digits_exact(src, i + 1, 4);
            let value = value.ok_or(ParseError::BadUnicodeEscape)?;
            let c = char::from_u32(value).ok_or(ParseError::BadUnicodeEscape)?;
            let mut bytes = Vec::new();
            crate::classify::encode_utf8(c, &mut bytes);
            Ok((bytes, next))
        }
        b'U' => {
            let (value, next) = read_hex_digits_exact(src, i + 1, 8);
            let value = value.ok_or(ParseError::BadUnicodeEscape)?;
            let c = char::from_u32(value).ok_or(ParseError::BadUnicodeEscape)?;
            let mut bytes = Vec::new();
            crate::classify::encode_utf8(c, &mut bytes);
            Ok((bytes, next))
        }
        b'0'..=b'7' => {
            let mut j = i;
            let mut value: u32 = 0;
            let mut count = 0;
            while count < 3 && src.get(j).is_some_and(|b| (b'0'..=b'7').contains(b)) {
                value = value * 8 + (src[j] - b'0') as u32;
                j += 1;
                count += 1;
            }
            Ok((vec![(value & 0xFF) as u8], j))
        }
        other => Ok((vec![other], i + 1)),
    }
}

/// Reads up to `max` hex digits starting at `pos`, returning their value and
/// the position past them. `None` if there are no hex digits at all.
fn read_hex_digits(src: &[u8], pos: usize, max: usize) -> (Option<u32>, usize) {
    let mut j = pos;
    let mut value: u32 = 0;
    let mut count = 0;
    while count < max && src.get(j).is_some_and(|b| b.is_ascii_hexdigit()) {
        value = value * 16 + (src[j] as char).to_digit(16).unwrap();
        j += 1;
        count += 1;
    }
    if count == 0 {
        (None, pos)
    } else {
        (Some(value), j)
    }
}

/// Reads exactly `count` hex digits, or fails (returning `None`) if fewer
/// are available.
fn read_hex_digits_exact(src: &[u8], pos: usize, count: usize) -> (Option<u32>, usize) {
    let (value, next) = read_hex_digits(src, pos, count);
    match value {
        Some(v) if next - pos == count => (Some(v), next),
        _ => (None, pos),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Command {
        parse_command(src.as_bytes(), 0).unwrap().command
    }

    fn literal_words(cmd: &Command) -> Vec<Vec<u8>> {
        cmd.words
            .iter()
            .map(|w| w.as_literal().expect("literal word").to_vec())
            .collect()
    }

    #[test]
    fn bare_words_split_on_space() {
        let cmd = parse("set x 5");
        assert_eq!(
            literal_words(&cmd),
            vec![b"set".to_vec(), b"x".to_vec(), b"5".to_vec()]
        );
    }

    #[test]
    fn braced_word_is_literal_no_substitution() {
        let cmd = parse("puts {hello $x [foo]}");
        assert_eq!(cmd.words.len(), 2);
        assert_eq!(
            cmd.words[1].as_literal().unwrap(),
            b"hello $x [foo]".as_slice()
        );
    }

    #[test]
    fn unterminated_brace_errors() {
        let err = parse_command(b"puts {oops", 0).unwrap_err();
        assert_eq!(err, ParseError::UnbalancedBrace);
    }

    #[test]
    fn unterminated_quote_errors() {
        let err = parse_command(b"puts \"oops", 0).unwrap_err();
        assert_eq!(err, ParseError::UnbalancedQuote);
    }

    #[test]
    fn quoted_word_var_and_command_sub() {
        let cmd = parse("puts \"x=$x [foo bar]\"");
        assert_eq!(cmd.words.len(), 2);
        match &cmd.words[1].0[..] {
            [WordUnit::Literal(l), WordUnit::VarSub { name, key: None }, WordUnit::Literal(l2), WordUnit::CommandSub(inner)] =>
            {
                assert_eq!(l, b"x=");
                assert_eq!(name, "x");
                assert_eq!(l2, b" ");
                assert_eq!(inner, b"foo bar");
            }
            other => panic!("unexpected units: {other:?}"),
        }
    }

    #[test]
    fn array_element_variable() {
        let cmd = parse("set x $a(1)");
        match &cmd.words[2].0[..] {
            [WordUnit::VarSub { name, key: Some(key) }] => {
                assert_eq!(name, "a");
                assert_eq!(key.as_literal().unwrap(), b"1".as_slice());
            }
            other => panic!("unexpected units: {other:?}"),
        }
    }

    #[test]
    fn braced_variable_name() {
        let cmd = parse("set x ${a b}");
        match &cmd.words[2].0[..] {
            [WordUnit::VarSub { name, key: None }] => assert_eq!(name, "a b"),
            other => panic!("unexpected units: {other:?}"),
        }
    }

    #[test]
    fn nested_command_substitution() {
        let cmd = parse("puts [foo [bar]]");
        match &cmd.words[1].0[..] {
            [WordUnit::CommandSub(inner)] => assert_eq!(inner, b"foo [bar]"),
            other => panic!("unexpected units: {other:?}"),
        }
    }

    #[test]
    fn backslash_escapes() {
        let cmd = parse("puts a\\tb\\n");
        match &cmd.words[1].0[..] {
            [WordUnit::Literal(l)] => assert_eq!(l, b"a\tb\n"),
            other => panic!("unexpected units: {other:?}"),
        }
    }

    #[test]
    fn backslash_newline_collapses_to_space() {
        let cmd = parse("puts a\\\n   b");
        match &cmd.words[1].0[..] {
            [WordUnit::Literal(l)] => assert_eq!(l, b"a b"),
            other => panic!("unexpected units: {other:?}"),
        }
    }

    #[test]
    fn braced_word_collapses_brace_newline() {
        let cmd = parse("puts {a\\\n   b}");
        assert_eq!(cmd.words[1].as_literal().unwrap(), b"a b".as_slice());
    }

    #[test]
    fn command_ends_at_semicolon_or_newline() {
        let parsed = parse_command(b"set x 1; set y 2", 0).unwrap();
        assert_eq!(literal_words(&parsed.command), vec![b"set".to_vec(), b"x".to_vec(), b"1".to_vec()]);
        assert_eq!(parsed.consumed, 8);
    }

    #[test]
    fn script_commands_skip_comments() {
        let (commands, pos) = parse_script_commands(b"# a comment\nset x 1\n", 0, false).unwrap();
        assert_eq!(commands.len(), 1);
        assert_eq!(pos, 20);
    }

    #[test]
    fn unbalanced_bracket_in_substitution_errors() {
        let err = parse_command(b"puts [foo", 0).unwrap_err();
        assert_eq!(err, ParseError::UnbalancedBracket);
    }

    #[test]
    fn hex_and_unicode_escapes() {
        let cmd = parse("puts a\\x41b\\u00e9");
        match &cmd.words[1].0[..] {
            [WordUnit::Literal(l)] => assert_eq!(l, "aAbé".as_bytes()),
            other => panic!("unexpected units: {other:?}"),
        }
    }
}
