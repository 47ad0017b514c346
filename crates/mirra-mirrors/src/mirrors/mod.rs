//! Mirror handles
//!
//! Mirrors are cheap handles: a shared session plus an entity id. All state
//! lives in the session's frozen model; two mirrors over the same entity in
//! the same session compare equal. Every declaration mirror implements
//! [`DeclarationMirror`]; type-shaped declarations add [`TypeMirror`]; the
//! reflective call surfaces (instances, classes, libraries) implement
//! [`ObjectMirror`].

mod class;
mod instance;
mod library;
mod method;
mod types;
mod variable;

pub use class::ClassMirror;
pub use instance::{ClosureMirror, InstanceMirror};
pub use library::{LibraryDependencyMirror, LibraryMirror};
pub use method::MethodMirror;
pub use types::{FunctionTypeMirror, TypeVariableMirror, TypedefMirror};
pub use variable::{ParameterMirror, VariableMirror};

use crate::error::{ReflectError, ReflectResult};
use crate::invoke::Invocation;
use crate::session::Session;
use crate::value::Value;
use mirra_model::{CapabilityKind, Entity, EntityId, RuntimeType, SourceLocation, TypeRef};
use rustc_hash::FxHashMap;
use std::rc::Rc;

/// Declares a mirror kind: session + id handle, identity equality, Debug
macro_rules! mirror_kind {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $name {
            pub(crate) cx: ::std::rc::Rc<$crate::session::Session>,
            pub(crate) id: ::mirra_model::EntityId,
        }

        impl $crate::mirrors::DeclarationMirror for $name {
            fn session(&self) -> &::std::rc::Rc<$crate::session::Session> {
                &self.cx
            }

            fn id(&self) -> ::mirra_model::EntityId {
                self.id
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                ::std::rc::Rc::ptr_eq(&self.cx, &other.cx) && self.id == other.id
            }
        }

        impl Eq for $name {}

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("id", &self.id)
                    .finish()
            }
        }
    };
}

pub(crate) use mirror_kind;

/// Shared surface of every declaration mirror
pub trait DeclarationMirror {
    /// The session this mirror was minted from
    fn session(&self) -> &Rc<Session>;

    /// The mirrored entity
    fn id(&self) -> EntityId;

    /// Simple name of the declaration
    fn simple_name(&self) -> String {
        self.session()
            .entity_unchecked(self.id())
            .simple_name()
            .to_string()
    }

    /// Dot-joined name from the enclosing library down
    fn qualified_name(&self) -> String {
        self.session().qualified_name_unchecked(self.id())
    }

    /// The enclosing declaration, absent for libraries
    fn owner(&self) -> Option<Mirror> {
        self.session()
            .entity_unchecked(self.id())
            .owner()
            .map(|owner| Mirror::of(self.session(), owner))
    }

    /// Whether the simple name marks the declaration private
    fn is_private(&self) -> bool {
        self.session().entity_unchecked(self.id()).is_private()
    }

    /// Whether the declaration sits directly in a library
    fn is_top_level(&self) -> bool {
        matches!(
            self.session()
                .entity_unchecked(self.id())
                .owner()
                .map(|owner| self.session().entity_unchecked(owner)),
            Some(Entity::Library(_))
        )
    }

    /// Source span of the declaration, when captured
    fn location(&self) -> Option<SourceLocation> {
        self.session()
            .entity_unchecked(self.id())
            .location()
            .cloned()
    }

    /// Annotation constants attached to the declaration, as runtime values
    fn metadata(&self) -> Vec<Value> {
        self.session()
            .entity_unchecked(self.id())
            .metadata()
            .iter()
            .map(Value::from_const)
            .collect()
    }
}

/// Surface of declarations that denote types
///
/// Reified runtime types are capability-gated; the `has_*` probes report
/// whether the corresponding accessor would succeed.
pub trait TypeMirror: DeclarationMirror {
    /// The type this declaration denotes, type arguments included
    fn type_ref(&self) -> TypeRef {
        self.session()
            .model()
            .reflected_type_ref(self.id())
            .unwrap_or(TypeRef::Entity(self.id()))
    }

    /// Whether [`TypeMirror::reflected_type`] would succeed
    fn has_reflected_type(&self) -> bool {
        self.session()
            .is_granted(self.id(), CapabilityKind::ReflectedType)
            && !self
                .session()
                .model()
                .contains_free_type_variables(&self.type_ref())
                .unwrap_or(true)
    }

    /// The fully instantiated runtime type of this declaration
    ///
    /// Fails when the capability is not granted or the type still contains
    /// free type variables.
    fn reflected_type(&self) -> ReflectResult<RuntimeType> {
        let cx = self.session();
        cx.require_grant(self.id(), CapabilityKind::ReflectedType)?;
        let ty = cx.model().reflected_type_ref(self.id())?;
        if cx.model().contains_free_type_variables(&ty)? {
            return Err(ReflectError::Unsupported {
                message: format!(
                    "type '{}' contains unresolved type variables",
                    self.qualified_name()
                ),
            });
        }
        Ok(RuntimeType::new(ty))
    }

    /// Whether [`TypeMirror::dynamic_reflected_type`] would succeed
    fn has_dynamic_reflected_type(&self) -> bool {
        self.session()
            .is_granted(self.id(), CapabilityKind::DynamicReflectedType)
            && !self
                .session()
                .model()
                .dynamic_type_ref(self.id())
                .and_then(|ty| self.session().model().contains_free_type_variables(&ty))
                .unwrap_or(true)
    }

    /// The erased runtime type: every type argument replaced by dynamic
    fn dynamic_reflected_type(&self) -> ReflectResult<RuntimeType> {
        let cx = self.session();
        cx.require_grant(self.id(), CapabilityKind::DynamicReflectedType)?;
        let ty = cx.model().dynamic_type_ref(self.id())?;
        if cx.model().contains_free_type_variables(&ty)? {
            return Err(ReflectError::Unsupported {
                message: format!(
                    "type '{}' has no erased runtime form",
                    self.qualified_name()
                ),
            });
        }
        Ok(RuntimeType::new(ty))
    }

    /// Whether either reflected-type accessor would succeed
    #[deprecated(note = "probe has_reflected_type or has_dynamic_reflected_type directly")]
    fn has_best_effort_reflected_type(&self) -> bool {
        self.has_reflected_type() || self.has_dynamic_reflected_type()
    }

    /// The instantiated runtime type when available, the erased one otherwise
    #[deprecated(note = "call reflected_type or dynamic_reflected_type directly")]
    fn best_effort_reflected_type(&self) -> ReflectResult<RuntimeType> {
        if self.has_reflected_type() {
            return self.reflected_type();
        }
        if self.has_dynamic_reflected_type() {
            return self.dynamic_reflected_type();
        }
        Err(ReflectError::Unsupported {
            message: format!(
                "no reflected type available for '{}'",
                self.qualified_name()
            ),
        })
    }

    /// Whether this type is a subtype of `other`
    ///
    /// Fails when either side falls outside the session's coverage or the
    /// type-relations capability is withheld.
    fn is_subtype_of(&self, other: &dyn TypeMirror) -> ReflectResult<bool> {
        let cx = self.session();
        if !Rc::ptr_eq(cx, other.session()) {
            return Err(ReflectError::Unsupported {
                message: "cannot relate types from different sessions".to_string(),
            });
        }
        let sub = self.type_ref();
        let sup = other.type_ref();
        Ok(cx.relation_context().is_subtype_of(&sub, &sup)?)
    }

    /// Whether a value of this type can be assigned to `other`
    fn is_assignable_to(&self, other: &dyn TypeMirror) -> ReflectResult<bool> {
        let cx = self.session();
        if !Rc::ptr_eq(cx, other.session()) {
            return Err(ReflectError::Unsupported {
                message: "cannot relate types from different sessions".to_string(),
            });
        }
        let from = self.type_ref();
        let to = other.type_ref();
        Ok(cx.relation_context().is_assignable_to(&from, &to)?)
    }
}

/// Reflective call surface shared by instances, classes, and libraries
pub trait ObjectMirror {
    /// Call a member by name
    fn invoke(
        &self,
        member_name: &str,
        positional: Vec<Value>,
        named: FxHashMap<String, Value>,
    ) -> ReflectResult<Value>;

    /// Read a property, or tear off a method as a callable value
    fn invoke_getter(&self, name: &str) -> ReflectResult<Value>;

    /// Write a property; evaluates to the assigned value
    fn invoke_setter(&self, name: &str, value: Value) -> ReflectResult<Value>;

    /// Replay a reified invocation against this target
    fn delegate(&self, invocation: &Invocation) -> ReflectResult<Value> {
        match invocation.kind {
            crate::invoke::InvocationKind::Method => self.invoke(
                &invocation.member_name,
                invocation.positional.clone(),
                invocation.named.clone(),
            ),
            crate::invoke::InvocationKind::Getter => self.invoke_getter(&invocation.member_name),
            crate::invoke::InvocationKind::Setter => self.invoke_setter(
                &invocation.member_name,
                invocation.positional.first().cloned().unwrap_or(Value::Null),
            ),
        }
    }
}

/// A declaration mirror of any kind
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mirror {
    /// A library
    Library(LibraryMirror),
    /// A class
    Class(ClassMirror),
    /// A method, getter, setter, or constructor
    Method(MethodMirror),
    /// A field or top-level variable
    Variable(VariableMirror),
    /// A formal parameter
    Parameter(ParameterMirror),
    /// A structural function type
    FunctionType(FunctionTypeMirror),
    /// A type variable
    TypeVariable(TypeVariableMirror),
    /// A typedef
    Typedef(TypedefMirror),
}

impl Mirror {
    /// Wrap an entity id in the mirror kind matching its entity
    pub(crate) fn of(cx: &Rc<Session>, id: EntityId) -> Mirror {
        match cx.entity_unchecked(id) {
            Entity::Library(_) => Mirror::Library(LibraryMirror { cx: cx.clone(), id }),
            Entity::Class(_) => Mirror::Class(ClassMirror { cx: cx.clone(), id }),
            Entity::Method(_) => Mirror::Method(MethodMirror { cx: cx.clone(), id }),
            Entity::Variable(_) => Mirror::Variable(VariableMirror { cx: cx.clone(), id }),
            Entity::Parameter(_) => Mirror::Parameter(ParameterMirror { cx: cx.clone(), id }),
            Entity::FunctionType(_) => {
                Mirror::FunctionType(FunctionTypeMirror { cx: cx.clone(), id })
            }
            Entity::TypeVariable(_) => {
                Mirror::TypeVariable(TypeVariableMirror { cx: cx.clone(), id })
            }
            Entity::Typedef(_) => Mirror::Typedef(TypedefMirror { cx: cx.clone(), id }),
        }
    }

    /// The class mirror, when this mirrors a class
    pub fn as_class(&self) -> Option<&ClassMirror> {
        match self {
            Mirror::Class(mirror) => Some(mirror),
            _ => None,
        }
    }

    /// The method mirror, when this mirrors a method
    pub fn as_method(&self) -> Option<&MethodMirror> {
        match self {
            Mirror::Method(mirror) => Some(mirror),
            _ => None,
        }
    }

    /// The variable mirror, when this mirrors a variable
    pub fn as_variable(&self) -> Option<&VariableMirror> {
        match self {
            Mirror::Variable(mirror) => Some(mirror),
            _ => None,
        }
    }

    /// The library mirror, when this mirrors a library
    pub fn as_library(&self) -> Option<&LibraryMirror> {
        match self {
            Mirror::Library(mirror) => Some(mirror),
            _ => None,
        }
    }
}

impl DeclarationMirror for Mirror {
    fn session(&self) -> &Rc<Session> {
        match self {
            Mirror::Library(m) => m.session(),
            Mirror::Class(m) => m.session(),
            Mirror::Method(m) => m.session(),
            Mirror::Variable(m) => m.session(),
            Mirror::Parameter(m) => m.session(),
            Mirror::FunctionType(m) => m.session(),
            Mirror::TypeVariable(m) => m.session(),
            Mirror::Typedef(m) => m.session(),
        }
    }

    fn id(&self) -> EntityId {
        match self {
            Mirror::Library(m) => m.id(),
            Mirror::Class(m) => m.id(),
            Mirror::Method(m) => m.id(),
            Mirror::Variable(m) => m.id(),
            Mirror::Parameter(m) => m.id(),
            Mirror::FunctionType(m) => m.id(),
            Mirror::TypeVariable(m) => m.id(),
            Mirror::Typedef(m) => m.id(),
        }
    }
}

/// Drop type arguments, leaving the bare declaration
pub(crate) fn erase(ty: &TypeRef) -> TypeRef {
    match ty {
        TypeRef::Instantiated { declaration, .. } => TypeRef::Entity(*declaration),
        other => other.clone(),
    }
}
