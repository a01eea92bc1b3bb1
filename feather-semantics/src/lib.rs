// SPDX-License-Identifier: MIT OR Apache-2.0
//! The evaluator, name resolver, and command-dispatch path for the Feather
//! Tcl-dialect interpreter core: this crate turns the parsed [`word::Word`]
//! AST from `feather-syntax` into host operations, generic over any
//! [`Host`](feather_core::Host) implementation.

pub mod dispatch;
pub mod errors;
pub mod eval;
pub mod resolve;
pub mod substitute;

pub use dispatch::{apply_proc, dispatch};
pub use eval::{eval_obj, eval_string};
pub use resolve::{
    get_display_name, resolve_command, resolve_variable_namespace, split_qualified_name, SplitName,
};
pub use substitute::{subst_string, substitute_word, substitute_words};
