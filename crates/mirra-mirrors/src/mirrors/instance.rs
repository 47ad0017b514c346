//! Instance and closure mirrors

use crate::error::{ReflectError, ReflectResult};
use crate::invoke::{self, Target};
use crate::mirrors::{ClassMirror, MethodMirror, ObjectMirror};
use crate::session::Session;
use crate::value::Value;
use rustc_hash::FxHashMap;
use std::rc::Rc;

/// A mirror over a live value
///
/// Unlike declaration mirrors, an instance mirror wraps a value rather than
/// an entity id; the mirrored class is derived from the value on demand.
#[derive(Clone)]
pub struct InstanceMirror {
    pub(crate) cx: Rc<Session>,
    pub(crate) value: Value,
}

impl InstanceMirror {
    /// The session this mirror was minted from
    pub fn session(&self) -> &Rc<Session> {
        &self.cx
    }

    /// The mirrored value
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Mirror of the declared runtime class of the value
    ///
    /// Simple values resolve through the session's primitive bindings and
    /// fail when their kind has no bound class.
    pub fn class_mirror(&self) -> ReflectResult<ClassMirror> {
        let id = self.cx.class_of_value(&self.value)?;
        Ok(ClassMirror {
            cx: self.cx.clone(),
            id,
        })
    }

    /// Whether [`InstanceMirror::reflectee`] can return the value
    ///
    /// True exactly for simple values: null, booleans, integers, floats,
    /// and strings.
    pub fn has_reflectee(&self) -> bool {
        self.value.is_simple()
    }

    /// The mirrored simple value
    ///
    /// # Panics
    ///
    /// Panics when the value is compound; probe
    /// [`InstanceMirror::has_reflectee`] first.
    pub fn reflectee(&self) -> Value {
        if !self.has_reflectee() {
            panic!(
                "reflectee is only available for simple values, not {}",
                self.value.type_name()
            );
        }
        self.value.clone()
    }

    /// View the value as a closure when it is callable
    ///
    /// Callable values are first-class functions and objects whose class
    /// declares a `call` instance member.
    pub fn as_closure(&self) -> ReflectResult<Option<ClosureMirror>> {
        let callable = match &self.value {
            Value::Function(_) => true,
            Value::Object(object) => self
                .cx
                .instance_member(object.class_id(), "call")?
                .is_some(),
            _ => false,
        };
        Ok(callable.then(|| ClosureMirror {
            inner: self.clone(),
        }))
    }
}

impl ObjectMirror for InstanceMirror {
    fn invoke(
        &self,
        member_name: &str,
        positional: Vec<Value>,
        named: FxHashMap<String, Value>,
    ) -> ReflectResult<Value> {
        invoke::invoke_member(
            &self.cx,
            Target::Instance(&self.value),
            member_name,
            positional,
            named,
        )
    }

    fn invoke_getter(&self, name: &str) -> ReflectResult<Value> {
        invoke::get_member(&self.cx, Target::Instance(&self.value), name)
    }

    fn invoke_setter(&self, name: &str, value: Value) -> ReflectResult<Value> {
        invoke::set_member(&self.cx, Target::Instance(&self.value), name, value)
    }
}

// Equality needs reflectees on both sides; mirrors over compound values
// never compare equal, so this relation is not reflexive and carries no
// `Eq` impl. The owning session does not participate: identical simple
// values compare equal across sessions.
impl PartialEq for InstanceMirror {
    fn eq(&self, other: &Self) -> bool {
        self.has_reflectee() && other.has_reflectee() && Value::identical(&self.value, &other.value)
    }
}

impl std::fmt::Debug for InstanceMirror {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceMirror")
            .field("value", &self.value)
            .finish()
    }
}

/// A mirror over a callable value
#[derive(Clone, Debug, PartialEq)]
pub struct ClosureMirror {
    inner: InstanceMirror,
}

impl ClosureMirror {
    /// The instance view of the callable value
    pub fn instance(&self) -> &InstanceMirror {
        &self.inner
    }

    /// The declaration behind the callable
    ///
    /// For a tear-off this is the torn-off member; for a callable object it
    /// is the class's `call` method. Absent for anonymous closures.
    pub fn function(&self) -> ReflectResult<Option<MethodMirror>> {
        let method = match &self.inner.value {
            Value::Function(function) => function.method(),
            Value::Object(object) => self.inner.cx.instance_member(object.class_id(), "call")?,
            _ => {
                return Err(ReflectError::Unsupported {
                    message: "closure mirror over non-callable value".to_string(),
                })
            }
        };
        Ok(method.map(|id| MethodMirror {
            cx: self.inner.cx.clone(),
            id,
        }))
    }

    /// Call the closure with the given arguments, no name resolution
    pub fn apply(
        &self,
        positional: Vec<Value>,
        named: FxHashMap<String, Value>,
    ) -> ReflectResult<Value> {
        match &self.inner.value {
            Value::Function(function) => function.call(positional, named),
            Value::Object(_) => self.inner.invoke("call", positional, named),
            _ => Err(ReflectError::Unsupported {
                message: "closure mirror over non-callable value".to_string(),
            }),
        }
    }
}

impl ObjectMirror for ClosureMirror {
    fn invoke(
        &self,
        member_name: &str,
        positional: Vec<Value>,
        named: FxHashMap<String, Value>,
    ) -> ReflectResult<Value> {
        if member_name == "call" {
            return self.apply(positional, named);
        }
        self.inner.invoke(member_name, positional, named)
    }

    fn invoke_getter(&self, name: &str) -> ReflectResult<Value> {
        self.inner.invoke_getter(name)
    }

    fn invoke_setter(&self, name: &str, value: Value) -> ReflectResult<Value> {
        self.inner.invoke_setter(name, value)
    }
}
