// SPDX-License-Identifier: MIT OR Apache-2.0
//! The host vtable.
//!
//! Grouped the way §6 of the interpreter's specification groups it — `string`,
//! `integer`, `list`, `var`, `frame`, `ns`, `interp`, plus command dispatch —
//! as small capability traits rather than one monolithic interface, so host
//! code and test doubles can each depend on only the slice they implement or
//! exercise.

use crate::control::Flow;
use crate::interp::Interp;
use std::fmt::Debug;

/// Reads and builds the byte-string projection of a value.
///
/// Every other capability trait is a supertrait of `StringOps` (directly or
/// transitively), which is what lets `Self::Obj` be written unambiguously
/// throughout the rest of this module: it is always `StringOps::Obj`, no
/// matter how many supertraits a given method's `Self: ...` bound lists.
pub trait StringOps {
    /// Opaque value handle minted and owned by the host. The core never
    /// inspects its representation.
    type Obj: Clone + Debug;

    /// The nil sentinel: "no value / absent".
    fn nil(&self) -> Self::Obj;

    /// True iff `obj` is the nil sentinel.
    fn is_nil(&self, obj: &Self::Obj) -> bool;

    /// Interns a byte string, returning a handle to it.
    fn intern(&mut self, bytes: &[u8]) -> Self::Obj;

    /// Reads the byte-string projection of `obj`.
    fn bytes(&self, obj: &Self::Obj) -> Vec<u8>;

    /// Number of bytes in `obj`'s string projection.
    fn byte_len(&self, obj: &Self::Obj) -> usize {
        self.bytes(obj).len()
    }

    /// Byte at `index`, or `None` if out of range.
    fn byte_at(&self, obj: &Self::Obj, index: usize) -> Option<u8> {
        self.bytes(obj).get(index).copied()
    }

    /// Byte-range slice `[start, end)`, clamped to the string's length.
    fn slice(&mut self, obj: &Self::Obj, start: usize, end: usize) -> Self::Obj;

    /// Concatenates the byte strings of `a` and `b` into a new value.
    fn concat(&mut self, a: &Self::Obj, b: &Self::Obj) -> Self::Obj;

    /// Convenience: `obj`'s bytes decoded as UTF-8 (lossily, on invalid data).
    fn text(&self, obj: &Self::Obj) -> String {
        String::from_utf8_lossy(&self.bytes(obj)).into_owned()
    }
}

/// Integer projection of a value.
pub trait IntegerOps: StringOps {
    /// Mints a value from a signed 64-bit integer.
    fn int_create(&mut self, value: i64) -> Self::Obj;

    /// Parses `obj`'s string form as a signed 64-bit integer, or `None` if it
    /// is not one. Per the open-question decision in `DESIGN.md`, surrounding
    /// ASCII whitespace is tolerated.
    fn int_get(&self, obj: &Self::Obj) -> Option<i64>;
}

/// Errors a host may report when asked to parse a value as a list.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("unmatched open brace in list")]
    UnbalancedBraces,
    #[error("unmatched open quote in list")]
    UnbalancedQuotes,
    #[error("list element in braces followed by \"{0}\" instead of space")]
    TrailingGarbage(String),
}

/// List projection of a value. A value behaves as a list and a string at
/// once; `list_from` is how the core asks the host to view a string-shaped
/// value as a list without the core ever parsing Tcl list syntax itself.
pub trait ListOps: StringOps {
    /// An empty list.
    fn list_new(&mut self) -> Self::Obj;

    /// Parses `obj`'s string form as a Tcl list.
    fn list_from(&mut self, obj: &Self::Obj) -> Result<Self::Obj, HostError>;

    /// Number of elements.
    fn list_len(&self, obj: &Self::Obj) -> usize;

    /// Element at `index`, or `None` if out of range.
    fn list_at(&self, obj: &Self::Obj, index: usize) -> Option<Self::Obj>;

    /// A new list with `value` appended.
    fn list_push(&mut self, obj: &Self::Obj, value: Self::Obj) -> Self::Obj;

    /// Splits off the first element, if any: `(head, remaining_tail)`.
    fn list_shift(&mut self, obj: &Self::Obj) -> Option<(Self::Obj, Self::Obj)>;

    /// Element-range slice `[start, end)`, clamped to the list's length.
    fn list_slice(&mut self, obj: &Self::Obj, start: usize, end: usize) -> Self::Obj;

    /// A new list with the element at `index` replaced, or `None` if out of
    /// range.
    fn list_set_at(&mut self, obj: &Self::Obj, index: usize, value: Self::Obj) -> Option<Self::Obj>;
}

/// Namespace operations. A namespace is an opaque handle, distinct from an
/// `Obj`, since namespaces are containers rather than values.
pub trait NsOps: StringOps {
    type Ns: Copy + Eq + Debug;

    /// The global namespace `::`.
    fn ns_root(&self) -> Self::Ns;

    /// Creates (or returns, if already present) the child namespace `name`
    /// directly under `parent`.
    fn ns_create(&mut self, parent: Self::Ns, name: &str) -> Self::Ns;

    /// Deletes `ns` and everything nested under it.
    fn ns_delete(&mut self, ns: Self::Ns);

    /// True iff `ns` still exists (has not been deleted).
    fn ns_exists(&self, ns: Self::Ns) -> bool;

    /// `ns`'s fully qualified name, e.g. `::a::b`. The root namespace's name
    /// is `::`.
    fn ns_name(&self, ns: Self::Ns) -> String;

    /// Looks up a direct child namespace by name.
    fn ns_child(&self, ns: Self::Ns, name: &str) -> Option<Self::Ns>;

    /// Direct child namespaces, in no particular order.
    fn ns_children(&self, ns: Self::Ns) -> Vec<Self::Ns>;

    /// Parent namespace, or `None` for the root.
    fn ns_parent(&self, ns: Self::Ns) -> Option<Self::Ns>;
}

/// Call-frame operations.
pub trait FrameOps: NsOps {
    type Frame: Copy + Eq + Debug;

    /// Pushes a new frame bound to `ns`, returning its handle. The new
    /// frame's level is one more than the currently-current frame's.
    fn frame_push(&mut self, ns: Self::Ns) -> Self::Frame;

    /// Pops the current frame. Panics if asked to pop the global frame
    /// (index 0), which is a host-contract violation.
    fn frame_pop(&mut self);

    /// The currently-executing frame.
    fn frame_current(&self) -> Self::Frame;

    /// The global frame (index 0), always present.
    fn frame_global(&self) -> Self::Frame;

    /// `frame`'s nesting level (0 = global).
    fn frame_level(&self, frame: Self::Frame) -> usize;

    /// Total number of frames currently on the stack.
    fn frame_size(&self) -> usize;

    /// The frame at absolute level `level`, or `None` if out of range.
    fn frame_at_level(&self, level: usize) -> Option<Self::Frame>;

    /// `frame`'s current namespace binding.
    fn frame_namespace(&self, frame: Self::Frame) -> Self::Ns;

    /// `frame`'s source-line counter.
    fn frame_line(&self, frame: Self::Frame) -> u32;

    /// Updates `frame`'s source-line counter.
    fn frame_set_line(&mut self, frame: Self::Frame, line: u32);
}

/// Variable operations, addressed by frame.
///
/// Array-element references (`name(key)`) are encoded in `name` itself, e.g.
/// `"foo(bar)"`; the host, which owns variable storage, is responsible for
/// recognizing the trailing `(...)` and addressing the array element rather
/// than a scalar. The core never parses this syntax itself outside of
/// producing the combined string during substitution.
pub trait VarOps: FrameOps {
    /// Reads a variable's value, resolving through any link.
    fn var_get(&self, frame: Self::Frame, name: &str) -> Option<Self::Obj>;

    /// Assigns a variable's value, resolving through any link.
    fn var_set(&mut self, frame: Self::Frame, name: &str, value: Self::Obj);

    /// Removes a variable. Returns `true` if it existed.
    fn var_unset(&mut self, frame: Self::Frame, name: &str) -> bool;

    /// True iff `name` is bound (as a scalar, array, or link) in `frame`.
    fn var_exists(&self, frame: Self::Frame, name: &str) -> bool;

    /// Links `local` in `frame` to `target_name` in `target_frame`. The
    /// target need not exist yet.
    fn var_link(
        &mut self,
        frame: Self::Frame,
        local: &str,
        target_frame: Self::Frame,
        target_name: &str,
    );

    /// Links `local` in `frame` to `name` in namespace `ns` (used by
    /// `variable`/`global`, as opposed to `upvar`'s frame-relative links).
    fn var_link_ns(&mut self, frame: Self::Frame, local: &str, ns: Self::Ns, name: &str);
}

/// The interpreter-wide result slot and return-options dict.
pub trait InterpOps: StringOps {
    fn get_result(&self) -> Self::Obj;
    fn set_result(&mut self, value: Self::Obj);
    fn get_return_options(&self) -> Self::Obj;
    fn set_return_options(&mut self, options: Self::Obj);
}

/// A bound parameter in a `proc`/`apply` parameter list.
#[derive(Clone, Debug)]
pub struct Param<O> {
    pub name: String,
    pub default: Option<O>,
}

/// A registered user procedure.
#[derive(Clone, Debug)]
pub struct ProcDef<O> {
    pub params: Vec<Param<O>>,
    /// True iff the last parameter is the literal name `args`, which captures
    /// all remaining arguments as a list rather than binding a single value.
    pub variadic: bool,
    pub body: O,
    /// Namespace the procedure was defined in, used to resolve unqualified
    /// names in its body.
    pub ns_name: String,
}

/// A built-in command's entry point. Builtins are plain function pointers:
/// the core holds no closures, so the registry is freely `Copy`.
pub type BuiltinFn<H> = fn(&mut Interp<H>, &[<H as StringOps>::Obj]) -> Flow<<H as StringOps>::Obj>;

/// What a command name resolves to.
pub enum Command<H: Host> {
    Builtin(BuiltinFn<H>),
    Proc(std::rc::Rc<ProcDef<H::Obj>>),
    Alias(String),
}

impl<H: Host> Clone for Command<H> {
    fn clone(&self) -> Self {
        match self {
            Command::Builtin(f) => Command::Builtin(*f),
            Command::Proc(p) => Command::Proc(p.clone()),
            Command::Alias(s) => Command::Alias(s.clone()),
        }
    }
}

/// Outcome of the host's unknown-command hook (§4.4).
pub enum UnknownResolution<H: Host> {
    Builtin(BuiltinFn<H>),
    Proc(std::rc::Rc<ProcDef<H::Obj>>),
    Alias(String),
    NoSuchCommand,
}

/// The full host vtable: every capability the core needs, plus command
/// registration and the unknown-command hook (§4.4), which is where the
/// command registry actually lives. A host implements this trait once; the
/// rest of the workspace is generic over it.
pub trait Host: VarOps + IntegerOps + ListOps + InterpOps + Sized {
    /// Registers a built-in under `qualified_name` at interpreter
    /// initialization, per §4.4's dispatch-registry contract.
    fn register_builtin(&mut self, qualified_name: &str, func: BuiltinFn<Self>);

    /// Registers a user procedure (from `proc`) or renames/aliases a command.
    fn set_command(&mut self, ns: Self::Ns, name: &str, command: Command<Self>);

    /// Looks up a command registered directly in `ns` (does not search
    /// ancestor namespaces; that policy lives in the name resolver).
    fn get_command(&self, ns: Self::Ns, name: &str) -> Option<Command<Self>>;

    /// Removes a command registered in `ns`. Returns `true` if it existed.
    fn delete_command(&mut self, ns: Self::Ns, name: &str) -> bool;

    /// The dispatch hook: called when a command name does not resolve via
    /// `get_command` in either the current or global namespace. Most hosts
    /// simply return `NoSuchCommand`; a host may use this to implement
    /// dynamic/virtual commands.
    fn unknown(&mut self, cmd: &str, args: &[Self::Obj]) -> UnknownResolution<Self> {
        let _ = (cmd, args);
        UnknownResolution::NoSuchCommand
    }
}
