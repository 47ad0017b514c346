//! Pre-resolved member invokers
//!
//! An [`Invoker`] resolves a member name against a class once and can then
//! be bound to any receiver of that class. Calls through an invoker execute
//! exactly the member-dispatch path that a name-based `invoke` would take;
//! the two cannot diverge because they share the resolved-call entry point.

use crate::error::{ReflectError, ReflectResult};
use crate::session::Session;
use crate::value::Value;
use mirra_model::EntityId;
use rustc_hash::FxHashMap;
use std::rc::Rc;

/// A member name resolved against a class, not yet bound to a receiver
#[derive(Clone)]
pub struct Invoker {
    pub(crate) cx: Rc<Session>,
    pub(crate) class: EntityId,
    pub(crate) member: EntityId,
    pub(crate) name: String,
}

impl Invoker {
    /// The resolved member name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The class the name was resolved against
    pub fn class_id(&self) -> EntityId {
        self.class
    }

    /// The resolved member declaration
    pub fn member_id(&self) -> EntityId {
        self.member
    }

    /// Bind the resolved member to a receiver
    pub fn bind(&self, receiver: Value) -> BoundInvoker {
        BoundInvoker {
            cx: self.cx.clone(),
            member: self.member,
            receiver,
        }
    }

    /// Resolve and call in one step
    pub fn call(
        &self,
        receiver: Value,
        positional: Vec<Value>,
        named: FxHashMap<String, Value>,
    ) -> ReflectResult<Value> {
        self.bind(receiver).call(positional, named)
    }
}

impl std::fmt::Debug for Invoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invoker")
            .field("name", &self.name)
            .field("class", &self.class)
            .finish()
    }
}

/// An invoker bound to one receiver
#[derive(Clone)]
pub struct BoundInvoker {
    cx: Rc<Session>,
    member: EntityId,
    receiver: Value,
}

impl BoundInvoker {
    /// The bound receiver
    pub fn receiver(&self) -> &Value {
        &self.receiver
    }

    /// Call the member with the given arguments
    ///
    /// A getter-like member returns its value when called with no
    /// arguments; with arguments the read value must be callable.
    pub fn call(
        &self,
        positional: Vec<Value>,
        named: FxHashMap<String, Value>,
    ) -> ReflectResult<Value> {
        Session::invoke_resolved(
            &self.cx,
            Some(self.receiver.clone()),
            self.member,
            positional,
            named,
        )
    }

    /// Read the member as a property
    pub fn get(&self) -> ReflectResult<Value> {
        self.call(Vec::new(), FxHashMap::default())
    }
}

impl std::fmt::Debug for BoundInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundInvoker")
            .field("member", &self.member)
            .field("receiver", &self.receiver)
            .finish()
    }
}

impl Session {
    /// Resolve an instance member name against a class for later binding
    pub(crate) fn resolve_invoker(
        cx: &Rc<Session>,
        class: EntityId,
        name: &str,
    ) -> ReflectResult<Invoker> {
        let declaration = cx.model().class(class)?.original.unwrap_or(class);
        let member = cx
            .instance_member(declaration, name)?
            .ok_or_else(|| ReflectError::NoSuchMember {
                target: cx.qualified_name_unchecked(class),
                member: name.to_string(),
                kind: "member",
            })?;
        Ok(Invoker {
            cx: cx.clone(),
            class: declaration,
            member,
            name: name.to_string(),
        })
    }
}
