// SPDX-License-Identifier: MIT OR Apache-2.0
//! Substitution: resolving a parsed [`Word`] AST into a host [`Host::Obj`]
//! by reading variables, evaluating nested command substitutions, and
//! concatenating the pieces (§4.1's substitution rules).

use feather_core::host::Host;
use feather_core::{Flow, Interp};
use feather_syntax::{Word, WordUnit};

use crate::eval::eval_string;

/// Substitutes one word, producing its final value.
pub fn substitute_word<H: Host>(interp: &mut Interp<H>, word: &Word) -> Flow<H::Obj> {
    if let Some(literal) = word.as_literal() {
        return Flow::Continue(interp.host.intern(literal));
    }

    let mut acc: Option<H::Obj> = None;
    for unit in &word.0 {
        let piece = match unit {
            WordUnit::Literal(bytes) => interp.host.intern(bytes),
            WordUnit::VarSub { name, key } => match substitute_var(interp, name, key.as_deref()) {
                Flow::Continue(v) => v,
                Flow::Break(signal) => return Flow::Break(signal),
            },
            WordUnit::CommandSub(inner) => match eval_string(interp, inner) {
                Flow::Continue(v) => v,
                Flow::Break(signal) => return Flow::Break(signal),
            },
        };
        acc = Some(match acc {
            Some(a) => interp.host.concat(&a, &piece),
            None => piece,
        });
    }
    Flow::Continue(acc.unwrap_or_else(|| interp.host.intern(b"")))
}

/// Substitutes a sequence of words in order, stopping at the first
/// non-`OK` result. Matches §5's ordering guarantee: each `[...]`
/// evaluation's side effects complete before the next word is built.
pub fn substitute_words<H: Host>(interp: &mut Interp<H>, words: &[Word]) -> Flow<H::Obj, Vec<H::Obj>> {
    let mut out = Vec::with_capacity(words.len());
    for word in words {
        match substitute_word(interp, word) {
            Flow::Continue(v) => out.push(v),
            Flow::Break(signal) => return Flow::Break(signal),
        }
    }
    Flow::Continue(out)
}

fn substitute_var<H: Host>(interp: &mut Interp<H>, name: &str, key: Option<&Word>) -> Flow<H::Obj> {
    let full_name = match key {
        None => name.to_string(),
        Some(key_word) => {
            let key_obj = match substitute_word(interp, key_word) {
                Flow::Continue(v) => v,
                Flow::Break(signal) => return Flow::Break(signal),
            };
            format!("{name}({})", interp.host.text(&key_obj))
        }
    };
    let frame = interp.host.frame_current();
    if let Some((ns, tail)) = crate::resolve::resolve_variable_namespace(&interp.host, frame, &full_name) {
        interp.host.var_link_ns(frame, &full_name, ns, &tail);
    }
    match interp.host.var_get(frame, &full_name) {
        Some(value) => Flow::Continue(value),
        None => Flow::Break(crate::errors::raise(
            interp,
            &format!("can't read \"{full_name}\": no such variable"),
        )),
    }
}

/// Implements the `subst` builtin's semantics directly: like substituting a
/// word, but over a whole string that may contain several substitutions not
/// bound into a single word (since `subst` does not split on whitespace).
/// Kept separate from [`substitute_word`] because its input is raw source
/// text, not an already-parsed `Word`.
pub fn subst_string<H: Host>(interp: &mut Interp<H>, src: &[u8]) -> Flow<H::Obj> {
    let units = match feather_syntax::parser::scan_whole_units(src) {
        Ok(units) => units,
        Err(e) => return Flow::Break(crate::errors::raise(interp, &e.to_string())),
    };
    substitute_word(interp, &Word(units))
}
