//! Mirra Mirrors
//!
//! The dynamic half of the reflection system: runtime values, the live
//! object store, reflector sessions, mirror handles, and the invocation
//! protocol (`invoke`, `invokeGetter`, `invokeSetter`, `delegate`,
//! `newInstance`, invokers, and tear-offs).
//!
//! A [`SessionBuilder`] combines a frozen [`mirra_model::ProgramModel`]
//! with capability grants, a coverage set, and generated member
//! implementations, and freezes them into a [`Reflector`] that mints
//! mirrors.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod error;
pub mod impls;
pub mod invoke;
pub mod invoker;
pub mod mirrors;
pub mod object;
pub mod session;
pub mod value;

pub use error::{ReflectError, ReflectResult};
pub use impls::{CallArgs, ImplTable, MemberFn};
pub use invoke::{Invocation, InvocationKind};
pub use invoker::{BoundInvoker, Invoker};
pub use mirrors::{
    ClassMirror, ClosureMirror, DeclarationMirror, FunctionTypeMirror, InstanceMirror,
    LibraryDependencyMirror, LibraryMirror, MethodMirror, Mirror, ObjectMirror, ParameterMirror,
    TypeMirror, TypeVariableMirror, TypedefMirror, VariableMirror,
};
pub use object::{ObjectData, ObjectRef};
pub use session::{PrimitiveKind, Reflector, Session, SessionBuilder};
pub use value::{FunctionRef, Value};
