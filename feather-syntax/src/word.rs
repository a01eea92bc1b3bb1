// SPDX-License-Identifier: MIT OR Apache-2.0
//! The pure, host-independent word AST produced by the script parser (C5).
//!
//! A [`Word`] is a sequence of [`WordUnit`]s that, concatenated after each
//! unit is resolved, yields the word's final byte string. Splitting parsing
//! (this crate) from substitution (`feather-semantics`) mirrors the
//! reference host-shell project's own split between its syntax tree and its
//! expansion pass: this crate never touches a host, so it can be fuzzed and
//! unit-tested on its own.

/// One piece of a word, before substitution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WordUnit {
    /// Literal bytes, already fully resolved (backslash escapes have been
    /// decoded to their final byte sequence at parse time).
    Literal(Vec<u8>),

    /// `$name`, `${name}`, or `$name(key)`. `key` is itself a word (its
    /// contents are substituted before use), present only for the
    /// array-element form.
    VarSub { name: String, key: Option<Box<Word>> },

    /// `[...]`: the raw source text of the nested script (without the
    /// enclosing brackets), to be evaluated recursively and spliced in as
    /// bytes.
    CommandSub(Vec<u8>),
}

/// A single word: the concatenation of its units' resolved values.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Word(pub Vec<WordUnit>);

impl Word {
    pub fn literal(bytes: Vec<u8>) -> Self {
        Word(vec![WordUnit::Literal(bytes)])
    }

    /// True iff this word is a single literal unit, with no substitution to
    /// perform. Useful for fast-pathing evaluation of constant words.
    pub fn as_literal(&self) -> Option<&[u8]> {
        match self.0.as_slice() {
            [WordUnit::Literal(bytes)] => Some(bytes),
            [] => Some(&[]),
            _ => None,
        }
    }
}

/// One parsed command: an ordered sequence of words.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Command {
    pub words: Vec<Word>,
}
