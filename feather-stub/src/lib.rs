// SPDX-License-Identifier: MIT OR Apache-2.0
//! `StubHost`: a pure in-memory reference [`Host`] implementation.
//!
//! Exists for this workspace's own test suites (`feather-semantics`,
//! `feather-builtin`) and as a minimal worked example of what a `Host`
//! implementor needs to provide. Values are represented as plain byte
//! strings; list-shaped operations parse and re-render the canonical list
//! encoding on demand rather than keeping a second, separate list
//! representation, mirroring the "everything is a string" value model the
//! host vtable itself is built around.
//!
//! Not tuned for performance: every list operation re-splits its operand's
//! full string form. A production embedder is expected to cache a parsed
//! representation behind its own `Obj`; this crate does not, since it only
//! needs to be correct, not fast.

mod tcl_list;

use std::collections::HashMap;
use std::rc::Rc;

use feather_core::host::{
    BuiltinFn, Command, FrameOps, Host, HostError, IntegerOps, InterpOps, ListOps, NsOps,
    StringOps, VarOps,
};
use slab::Slab;

#[derive(Clone, Debug)]
enum ObjData {
    Nil,
    Bytes(Vec<u8>),
}

/// An interned value handle. Cheap to clone (an `Rc` bump).
#[derive(Clone, Debug)]
pub struct Obj(Rc<ObjData>);

impl Obj {
    fn bytes_ref(&self) -> &[u8] {
        match &*self.0 {
            ObjData::Nil => &[],
            ObjData::Bytes(b) => b,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub struct NsId(usize);

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct FrameId(usize);

struct NsNode {
    name: String,
    parent: Option<NsId>,
    children: HashMap<String, NsId>,
    commands: HashMap<String, Command<StubHost>>,
    vars: HashMap<String, Obj>,
}

/// How a variable name in a frame actually resolves, once any `upvar`/
/// `global`/`variable` link has been followed.
enum VarSlot {
    Value(Obj),
    /// `upvar`-style link to another frame's variable.
    Link { frame: FrameId, name: String },
    /// `global`/`variable`-style link to namespace-scoped storage.
    LinkNs { ns: NsId, name: String },
}

struct FrameNode {
    ns: NsId,
    vars: HashMap<String, VarSlot>,
    line: u32,
}

enum Storage {
    Frame(FrameId, String),
    Ns(NsId, String),
}

/// The reference `Host`. One root namespace, one global frame, present from
/// construction; everything else is built up by the commands a script runs.
pub struct StubHost {
    namespaces: Slab<NsNode>,
    frames: Vec<FrameNode>,
    result: Obj,
    return_options: Obj,
}

impl StubHost {
    pub fn new() -> Self {
        let mut namespaces = Slab::new();
        let root = namespaces.insert(NsNode {
            name: String::new(),
            parent: None,
            children: HashMap::new(),
            commands: HashMap::new(),
            vars: HashMap::new(),
        });
        debug_assert_eq!(root, 0, "root namespace must be slab index 0");
        let frames = vec![FrameNode {
            ns: NsId(root),
            vars: HashMap::new(),
            line: 0,
        }];
        let nil = Obj(Rc::new(ObjData::Nil));
        StubHost {
            namespaces,
            frames,
            result: nil.clone(),
            return_options: nil,
        }
    }

    fn resolve_storage(&self, frame: FrameId, name: &str) -> Storage {
        let mut cur_frame = frame;
        let mut cur_name = name.to_string();
        for _ in 0..64 {
            match self.frames[cur_frame.0].vars.get(&cur_name) {
                Some(VarSlot::Link { frame: target, name: target_name }) => {
                    cur_frame = *target;
                    cur_name = target_name.clone();
                }
                Some(VarSlot::LinkNs { ns, name: target_name }) => {
                    return Storage::Ns(*ns, target_name.clone());
                }
                _ => return Storage::Frame(cur_frame, cur_name),
            }
        }
        Storage::Frame(cur_frame, cur_name)
    }

    fn list_elements(&self, obj: &Obj) -> Result<Vec<Vec<u8>>, HostError> {
        tcl_list::split_list(obj.bytes_ref()).map_err(|_| HostError::UnbalancedBraces)
    }
}

impl Default for StubHost {
    fn default() -> Self {
        Self::new()
    }
}

impl StringOps for StubHost {
    type Obj = Obj;

    fn nil(&self) -> Obj {
        Obj(Rc::new(ObjData::Nil))
    }

    fn is_nil(&self, obj: &Obj) -> bool {
        matches!(&*obj.0, ObjData::Nil)
    }

    fn intern(&mut self, bytes: &[u8]) -> Obj {
        Obj(Rc::new(ObjData::Bytes(bytes.to_vec())))
    }

    fn bytes(&self, obj: &Obj) -> Vec<u8> {
        obj.bytes_ref().to_vec()
    }

    fn slice(&mut self, obj: &Obj, start: usize, end: usize) -> Obj {
        let bytes = obj.bytes_ref();
        let start = start.min(bytes.len());
        let end = end.min(bytes.len()).max(start);
        self.intern(&bytes[start..end])
    }

    fn concat(&mut self, a: &Obj, b: &Obj) -> Obj {
        let mut out = a.bytes_ref().to_vec();
        out.extend_from_slice(b.bytes_ref());
        self.intern(&out)
    }
}

impl IntegerOps for StubHost {
    fn int_create(&mut self, value: i64) -> Obj {
        self.intern(value.to_string().as_bytes())
    }

    fn int_get(&self, obj: &Obj) -> Option<i64> {
        self.text(obj).trim().parse().ok()
    }
}

impl ListOps for StubHost {
    fn list_new(&mut self) -> Obj {
        self.intern(b"")
    }

    fn list_from(&mut self, obj: &Obj) -> Result<Obj, HostError> {
        self.list_elements(obj)?;
        Ok(obj.clone())
    }

    fn list_len(&self, obj: &Obj) -> usize {
        self.list_elements(obj).map(|e| e.len()).unwrap_or(0)
    }

    fn list_at(&self, obj: &Obj, index: usize) -> Option<Obj> {
        let elems = self.list_elements(obj).ok()?;
        elems.get(index).map(|e| Obj(Rc::new(ObjData::Bytes(e.clone()))))
    }

    fn list_push(&mut self, obj: &Obj, value: Obj) -> Obj {
        let mut elems = self.list_elements(obj).unwrap_or_default();
        elems.push(value.bytes_ref().to_vec());
        self.intern(&tcl_list::join_list(elems))
    }

    fn list_shift(&mut self, obj: &Obj) -> Option<(Obj, Obj)> {
        let mut elems = self.list_elements(obj).ok()?;
        if elems.is_empty() {
            return None;
        }
        let head = elems.remove(0);
        let head_obj = self.intern(&head);
        let tail_obj = self.intern(&tcl_list::join_list(elems));
        Some((head_obj, tail_obj))
    }

    fn list_slice(&mut self, obj: &Obj, start: usize, end: usize) -> Obj {
        let elems = self.list_elements(obj).unwrap_or_default();
        let start = start.min(elems.len());
        let end = end.min(elems.len()).max(start);
        self.intern(&tcl_list::join_list(&elems[start..end]))
    }

    fn list_set_at(&mut self, obj: &Obj, index: usize, value: Obj) -> Option<Obj> {
        let mut elems = self.list_elements(obj).ok()?;
        if index >= elems.len() {
            return None;
        }
        elems[index] = value.bytes_ref().to_vec();
        Some(self.intern(&tcl_list::join_list(elems)))
    }
}

impl NsOps for StubHost {
    type Ns = NsId;

    fn ns_root(&self) -> NsId {
        NsId(0)
    }

    fn ns_create(&mut self, parent: NsId, name: &str) -> NsId {
        if let Some(existing) = self.namespaces[parent.0].children.get(name) {
            return *existing;
        }
        let id = self.namespaces.insert(NsNode {
            name: name.to_string(),
            parent: Some(parent),
            children: HashMap::new(),
            commands: HashMap::new(),
            vars: HashMap::new(),
        });
        self.namespaces[parent.0].children.insert(name.to_string(), NsId(id));
        NsId(id)
    }

    fn ns_delete(&mut self, ns: NsId) {
        let (name, parent, children) = match self.namespaces.get(ns.0) {
            Some(node) => (node.name.clone(), node.parent, node.children.values().copied().collect::<Vec<_>>()),
            None => return,
        };
        for child in children {
            self.ns_delete(child);
        }
        if let Some(parent) = parent {
            if let Some(parent_node) = self.namespaces.get_mut(parent.0) {
                parent_node.children.remove(&name);
            }
        }
        self.namespaces.try_remove(ns.0);
    }

    fn ns_exists(&self, ns: NsId) -> bool {
        self.namespaces.contains(ns.0)
    }

    fn ns_name(&self, ns: NsId) -> String {
        let mut segments = Vec::new();
        let mut cur = Some(ns);
        while let Some(id) = cur {
            if id.0 == 0 {
                break;
            }
            match self.namespaces.get(id.0) {
                Some(node) => {
                    segments.push(node.name.clone());
                    cur = node.parent;
                }
                None => break,
            }
        }
        segments.reverse();
        if segments.is_empty() {
            "::".to_string()
        } else {
            format!("::{}", segments.join("::"))
        }
    }

    fn ns_child(&self, ns: NsId, name: &str) -> Option<NsId> {
        self.namespaces.get(ns.0)?.children.get(name).copied()
    }

    fn ns_children(&self, ns: NsId) -> Vec<NsId> {
        self.namespaces.get(ns.0).map(|n| n.children.values().copied().collect()).unwrap_or_default()
    }

    fn ns_parent(&self, ns: NsId) -> Option<NsId> {
        self.namespaces.get(ns.0)?.parent
    }
}

impl FrameOps for StubHost {
    type Frame = FrameId;

    fn frame_push(&mut self, ns: NsId) -> FrameId {
        self.frames.push(FrameNode { ns, vars: HashMap::new(), line: 0 });
        FrameId(self.frames.len() - 1)
    }

    fn frame_pop(&mut self) {
        assert!(self.frames.len() > 1, "cannot pop the global frame");
        self.frames.pop();
    }

    fn frame_current(&self) -> FrameId {
        FrameId(self.frames.len() - 1)
    }

    fn frame_global(&self) -> FrameId {
        FrameId(0)
    }

    fn frame_level(&self, frame: FrameId) -> usize {
        frame.0
    }

    fn frame_size(&self) -> usize {
        self.frames.len()
    }

    fn frame_at_level(&self, level: usize) -> Option<FrameId> {
        if level < self.frames.len() {
            Some(FrameId(level))
        } else {
            None
        }
    }

    fn frame_namespace(&self, frame: FrameId) -> NsId {
        self.frames[frame.0].ns
    }

    fn frame_line(&self, frame: FrameId) -> u32 {
        self.frames[frame.0].line
    }

    fn frame_set_line(&mut self, frame: FrameId, line: u32) {
        self.frames[frame.0].line = line;
    }
}

impl VarOps for StubHost {
    fn var_get(&self, frame: FrameId, name: &str) -> Option<Obj> {
        match self.resolve_storage(frame, name) {
            Storage::Frame(f, n) => match self.frames[f.0].vars.get(&n) {
                Some(VarSlot::Value(v)) => Some(v.clone()),
                _ => None,
            },
            Storage::Ns(ns, n) => self.namespaces.get(ns.0)?.vars.get(&n).cloned(),
        }
    }

    fn var_set(&mut self, frame: FrameId, name: &str, value: Obj) {
        match self.resolve_storage(frame, name) {
            Storage::Frame(f, n) => {
                self.frames[f.0].vars.insert(n, VarSlot::Value(value));
            }
            Storage::Ns(ns, n) => {
                if let Some(node) = self.namespaces.get_mut(ns.0) {
                    node.vars.insert(n, value);
                }
            }
        }
    }

    fn var_unset(&mut self, frame: FrameId, name: &str) -> bool {
        match self.resolve_storage(frame, name) {
            Storage::Frame(f, n) => self.frames[f.0].vars.remove(&n).is_some(),
            Storage::Ns(ns, n) => self.namespaces.get_mut(ns.0).map(|node| node.vars.remove(&n).is_some()).unwrap_or(false),
        }
    }

    fn var_exists(&self, frame: FrameId, name: &str) -> bool {
        match self.resolve_storage(frame, name) {
            Storage::Frame(f, n) => matches!(self.frames[f.0].vars.get(&n), Some(VarSlot::Value(_))),
            Storage::Ns(ns, n) => self.namespaces.get(ns.0).map(|node| node.vars.contains_key(&n)).unwrap_or(false),
        }
    }

    fn var_link(&mut self, frame: FrameId, local: &str, target_frame: FrameId, target_name: &str) {
        self.frames[frame.0].vars.insert(
            local.to_string(),
            VarSlot::Link { frame: target_frame, name: target_name.to_string() },
        );
    }

    fn var_link_ns(&mut self, frame: FrameId, local: &str, ns: NsId, name: &str) {
        self.frames[frame.0].vars.insert(local.to_string(), VarSlot::LinkNs { ns, name: name.to_string() });
    }
}

impl InterpOps for StubHost {
    fn get_result(&self) -> Obj {
        self.result.clone()
    }

    fn set_result(&mut self, value: Obj) {
        self.result = value;
    }

    fn get_return_options(&self) -> Obj {
        self.return_options.clone()
    }

    fn set_return_options(&mut self, options: Obj) {
        self.return_options = options;
    }
}

impl Host for StubHost {
    fn register_builtin(&mut self, qualified_name: &str, func: BuiltinFn<Self>) {
        let root = self.ns_root();
        self.set_command(root, qualified_name, Command::Builtin(func));
    }

    fn set_command(&mut self, ns: NsId, name: &str, command: Command<Self>) {
        if let Some(node) = self.namespaces.get_mut(ns.0) {
            node.commands.insert(name.to_string(), command);
        }
    }

    fn get_command(&self, ns: NsId, name: &str) -> Option<Command<Self>> {
        self.namespaces.get(ns.0)?.commands.get(name).cloned()
    }

    fn delete_command(&mut self, ns: NsId, name: &str) -> bool {
        self.namespaces.get_mut(ns.0).map(|node| node.commands.remove(name).is_some()).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feather_core::host::Command;

    #[test]
    fn intern_and_read_back_bytes() {
        let mut host = StubHost::new();
        let v = host.intern(b"hello");
        assert_eq!(host.text(&v), "hello");
    }

    #[test]
    fn list_round_trips_through_push_and_at() {
        let mut host = StubHost::new();
        let list = host.list_new();
        let a = host.intern(b"a");
        let b = host.intern(b"b c");
        let list = host.list_push(&list, a);
        let list = host.list_push(&list, b);
        assert_eq!(host.list_len(&list), 2);
        assert_eq!(host.text(&host.list_at(&list, 1).unwrap()), "b c");
    }

    #[test]
    fn namespaces_nest_and_qualify() {
        let mut host = StubHost::new();
        let root = host.ns_root();
        let foo = host.ns_create(root, "foo");
        let bar = host.ns_create(foo, "bar");
        assert_eq!(host.ns_name(bar), "::foo::bar");
        assert_eq!(host.ns_child(root, "foo"), Some(foo));
    }

    #[test]
    fn namespace_delete_removes_descendants() {
        let mut host = StubHost::new();
        let root = host.ns_root();
        let foo = host.ns_create(root, "foo");
        let _bar = host.ns_create(foo, "bar");
        host.ns_delete(foo);
        assert!(!host.ns_exists(foo));
        assert_eq!(host.ns_child(root, "foo"), None);
    }

    #[test]
    fn frame_push_and_pop_track_level() {
        let mut host = StubHost::new();
        let root = host.ns_root();
        let global = host.frame_global();
        assert_eq!(host.frame_level(global), 0);
        let child = host.frame_push(root);
        assert_eq!(host.frame_level(child), 1);
        assert_eq!(host.frame_current(), child);
        host.frame_pop();
        assert_eq!(host.frame_current(), global);
    }

    #[test]
    fn var_set_then_get_roundtrips_in_a_frame() {
        let mut host = StubHost::new();
        let global = host.frame_global();
        let v = host.intern(b"42");
        host.var_set(global, "x", v);
        assert_eq!(host.text(&host.var_get(global, "x").unwrap()), "42");
        assert!(host.var_exists(global, "x"));
        assert!(host.var_unset(global, "x"));
        assert!(!host.var_exists(global, "x"));
    }

    #[test]
    fn upvar_style_link_resolves_to_target_frame() {
        let mut host = StubHost::new();
        let root = host.ns_root();
        let global = host.frame_global();
        let callee = host.frame_push(root);
        let value = host.intern(b"outer");
        host.var_set(global, "src", value);
        host.var_link(callee, "alias", global, "src");
        assert_eq!(host.text(&host.var_get(callee, "alias").unwrap()), "outer");

        let updated = host.intern(b"updated");
        host.var_set(callee, "alias", updated);
        assert_eq!(host.text(&host.var_get(global, "src").unwrap()), "updated");
    }

    #[test]
    fn commands_register_and_resolve_per_namespace() {
        let mut host = StubHost::new();
        let root = host.ns_root();
        fn noop(interp: &mut feather_core::Interp<StubHost>, _args: &[Obj]) -> feather_core::Flow<Obj> {
            feather_core::Flow::Continue(interp.host.nil())
        }
        host.register_builtin("noop", noop);
        assert!(matches!(host.get_command(root, "noop"), Some(Command::Builtin(_))));
        assert!(host.delete_command(root, "noop"));
        assert!(host.get_command(root, "noop").is_none());
    }
}
