//! Member-implementation table
//!
//! The generator collaborator registers one Rust closure per reachable
//! member; invocation resolves a member declaration to its closure here.
//! Synthetic members (implicit accessors, default constructors) need no
//! entry; the session executes them directly against the object store.

use crate::error::ReflectResult;
use crate::object::ObjectRef;
use crate::session::Session;
use crate::value::Value;
use mirra_model::EntityId;
use rustc_hash::FxHashMap;
use std::rc::Rc;

/// A registered member implementation
///
/// Receives the session for reentrant reflective calls, plus the receiver
/// and arguments. Optional parameters arrive pre-filled with their declared
/// defaults.
pub type MemberFn = Rc<dyn Fn(&Rc<Session>, CallArgs) -> ReflectResult<Value>>;

/// Arguments of one dynamic call
#[derive(Debug, Clone)]
pub struct CallArgs {
    /// The receiver; absent for static and top-level calls
    pub receiver: Option<Value>,
    /// Positional arguments, in order
    pub positional: Vec<Value>,
    /// Named arguments
    pub named: FxHashMap<String, Value>,
}

impl CallArgs {
    /// Positional argument by index, null when absent
    pub fn arg(&self, index: usize) -> Value {
        self.positional.get(index).cloned().unwrap_or(Value::Null)
    }

    /// Named argument by name, null when absent
    pub fn named_arg(&self, name: &str) -> Value {
        self.named.get(name).cloned().unwrap_or(Value::Null)
    }

    /// The receiver as a live object, when it is one
    pub fn receiver_object(&self) -> Option<ObjectRef> {
        self.receiver
            .as_ref()
            .and_then(Value::as_object)
            .cloned()
    }
}

/// Member id to implementation mapping, frozen at session build time
#[derive(Clone, Default)]
pub struct ImplTable {
    members: FxHashMap<EntityId, MemberFn>,
}

impl ImplTable {
    /// Create an empty table
    pub fn new() -> Self {
        ImplTable::default()
    }

    /// Register the implementation of a member declaration
    pub fn register(&mut self, member: EntityId, implementation: MemberFn) {
        self.members.insert(member, implementation);
    }

    /// Look up the implementation of a member declaration
    pub fn get(&self, member: EntityId) -> Option<MemberFn> {
        self.members.get(&member).cloned()
    }

    /// Number of registered implementations
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl std::fmt::Debug for ImplTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImplTable")
            .field("members", &self.members.len())
            .finish()
    }
}
