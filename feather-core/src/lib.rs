// SPDX-License-Identifier: MIT OR Apache-2.0
//! Data model for the Feather Tcl-dialect interpreter core.
//!
//! This crate defines the **host vtable**: the set of capability traits a host
//! application implements to supply concrete value, variable, frame, and
//! namespace storage. The core (in `feather-syntax`, `feather-semantics`, and
//! `feather-builtin`) is generic over any type implementing [`Host`] and never
//! inspects a value handle's representation.
//!
//! Two implementors exist in this workspace: a production embedder brings its
//! own arena-backed type; `feather-stub` provides a pure in-memory reference
//! implementation used by this workspace's own tests.

pub mod control;
pub mod error_state;
pub mod host;
pub mod interp;
pub mod limits;

pub use control::{Flow, Signal};
pub use error_state::{ErrorTracker, FinalizedError};
pub use host::{
    BuiltinFn, Command, FrameOps, Host, HostError, IntegerOps, InterpOps, ListOps, NsOps, Param,
    ProcDef, StringOps, UnknownResolution, VarOps,
};
pub use interp::Interp;
pub use limits::Limits;
