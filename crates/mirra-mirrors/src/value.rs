//! Base value representation
//!
//! A [`Value`] is an ordinary program value, as opposed to a mirror wrapping
//! one. Invocation operations consume and produce base values directly; a
//! mirror on a result can always be obtained separately when needed.
//!
//! Equality on `Value` is the identity relation of the modeled language:
//! structural for simple values, reference identity for objects and
//! callables.

use crate::error::ReflectResult;
use crate::object::ObjectRef;
use mirra_model::{Const, EntityId};
use rustc_hash::FxHashMap;
use std::fmt;
use std::rc::Rc;

/// An ordinary program value
#[derive(Clone)]
pub enum Value {
    /// The absent value
    Null,
    /// A boolean
    Bool(bool),
    /// An integer
    Int(i64),
    /// A double-precision float
    Float(f64),
    /// A string
    Str(String),
    /// A live object reference
    Object(ObjectRef),
    /// A callable: a tear-off or first-class function
    Function(FunctionRef),
}

impl Value {
    /// Convert a compile-time constant from the model into a base value
    pub fn from_const(c: &Const) -> Value {
        match c {
            Const::Null => Value::Null,
            Const::Bool(b) => Value::Bool(*b),
            Const::Int(i) => Value::Int(*i),
            Const::Float(x) => Value::Float(*x),
            Const::Str(s) => Value::Str(s.clone()),
            Const::Symbol(s) => Value::Str(s.clone()),
        }
    }

    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True for simple values: null, numeric, boolean, textual
    ///
    /// These are the values an instance mirror can hand back as a reflectee.
    pub fn is_simple(&self) -> bool {
        matches!(
            self,
            Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Str(_)
        )
    }

    /// Extract a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract an integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Extract a float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// Extract a string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Extract an object reference
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Extract a callable
    pub fn as_function(&self) -> Option<&FunctionRef> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Type name for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
        }
    }

    /// The identity relation: structural for simple values, reference
    /// identity for objects and callables
    pub fn identical(a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(x), Value::Bool(y)) => x == y,
            (Value::Int(x), Value::Int(y)) => x == y,
            (Value::Float(x), Value::Float(y)) => x == y,
            (Value::Str(x), Value::Str(y)) => x == y,
            (Value::Object(x), Value::Object(y)) => ObjectRef::ptr_eq(x, y),
            (Value::Function(x), Value::Function(y)) => FunctionRef::ptr_eq(x, y),
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        Value::identical(self, other)
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{}", s),
            Value::Object(obj) => write!(f, "[object {}]", obj.class_id()),
            Value::Function(func) => write!(f, "[function {}]", func.name()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "bool({})", b),
            Value::Int(i) => write!(f, "int({})", i),
            Value::Float(x) => write!(f, "float({})", x),
            Value::Str(s) => write!(f, "str({:?})", s),
            Value::Object(obj) => write!(f, "object({})", obj.class_id()),
            Value::Function(func) => write!(f, "function({})", func.name()),
        }
    }
}

/// Signature of a first-class callable
pub type CallFn = dyn Fn(Vec<Value>, FxHashMap<String, Value>) -> ReflectResult<Value>;

struct FunctionInner {
    name: String,
    method: Option<EntityId>,
    call: Box<CallFn>,
}

/// A callable value: a tear-off bound to a receiver, or a free function
///
/// Identity is reference identity of the underlying allocation; two
/// tear-offs of the same member are distinct values.
#[derive(Clone)]
pub struct FunctionRef(Rc<FunctionInner>);

impl FunctionRef {
    /// Wrap a callable under a diagnostic name
    ///
    /// `method` links back to the method declaration for tear-offs; it is
    /// absent for callables with no declaration in the model.
    pub fn new<F>(name: impl Into<String>, method: Option<EntityId>, call: F) -> Self
    where
        F: Fn(Vec<Value>, FxHashMap<String, Value>) -> ReflectResult<Value> + 'static,
    {
        FunctionRef(Rc::new(FunctionInner {
            name: name.into(),
            method,
            call: Box::new(call),
        }))
    }

    /// Diagnostic name of the callable
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// The method declaration behind a tear-off, when known
    pub fn method(&self) -> Option<EntityId> {
        self.0.method
    }

    /// Invoke the callable
    pub fn call(
        &self,
        positional: Vec<Value>,
        named: FxHashMap<String, Value>,
    ) -> ReflectResult<Value> {
        (self.0.call)(positional, named)
    }

    /// Reference identity
    pub fn ptr_eq(a: &FunctionRef, b: &FunctionRef) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }
}

impl fmt::Debug for FunctionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRef")
            .field("name", &self.0.name)
            .field("method", &self.0.method)
            .finish()
    }
}
