//! Type references and reflected runtime type handles
//!
//! A [`TypeRef`] names a type position inside the frozen model (a field type,
//! a return type, a type argument). A [`RuntimeType`] is the concrete handle
//! handed out by gated `reflected_type` queries; it is stable and comparable
//! across calls.

use crate::entity::EntityId;
use std::fmt;

/// Reference to a type from a declaration in the model
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// The universal (fully dynamic) type; assignable in both directions
    Dynamic,
    /// The `void` type (return positions only)
    Void,
    /// A declared entity: class, function type, typedef, or type variable
    Entity(EntityId),
    /// An instantiation of a generic declaration with bound arguments
    Instantiated {
        /// The uninstantiated generic declaration
        declaration: EntityId,
        /// Bound type arguments, in declaration order
        arguments: Vec<TypeRef>,
    },
}

impl TypeRef {
    /// Check if this reference is the universal dynamic type
    pub fn is_dynamic(&self) -> bool {
        matches!(self, TypeRef::Dynamic)
    }

    /// Check if this reference is `void`
    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Void)
    }

    /// Get the referenced declaration, if any
    pub fn declaration(&self) -> Option<EntityId> {
        match self {
            TypeRef::Entity(id) => Some(*id),
            TypeRef::Instantiated { declaration, .. } => Some(*declaration),
            _ => None,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Dynamic => write!(f, "dynamic"),
            TypeRef::Void => write!(f, "void"),
            TypeRef::Entity(id) => write!(f, "{}", id),
            TypeRef::Instantiated {
                declaration,
                arguments,
            } => {
                write!(f, "{}<", declaration)?;
                for (i, arg) in arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ">")
            }
        }
    }
}

/// Concrete runtime type handle produced by a granted `reflected_type` query
///
/// Two handles compare equal exactly when they denote the same instantiated
/// type; repeated queries on the same mirror yield equal handles.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuntimeType {
    repr: TypeRef,
}

impl RuntimeType {
    /// Wrap a fully resolved type reference
    ///
    /// Callers are expected to have checked that `repr` contains no free
    /// type variables; the gating logic in the mirror layer does so.
    pub fn new(repr: TypeRef) -> Self {
        RuntimeType { repr }
    }

    /// The canonical type reference behind this handle
    pub fn as_type_ref(&self) -> &TypeRef {
        &self.repr
    }
}

impl fmt::Display for RuntimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.repr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_ref_predicates() {
        assert!(TypeRef::Dynamic.is_dynamic());
        assert!(!TypeRef::Void.is_dynamic());
        assert!(TypeRef::Void.is_void());
        assert!(TypeRef::Entity(EntityId::from_raw(3)).declaration().is_some());
        assert!(TypeRef::Dynamic.declaration().is_none());
    }

    #[test]
    fn test_runtime_type_equality_is_structural() {
        let a = RuntimeType::new(TypeRef::Instantiated {
            declaration: EntityId::from_raw(1),
            arguments: vec![TypeRef::Dynamic],
        });
        let b = RuntimeType::new(TypeRef::Instantiated {
            declaration: EntityId::from_raw(1),
            arguments: vec![TypeRef::Dynamic],
        });
        assert_eq!(a, b);

        let c = RuntimeType::new(TypeRef::Entity(EntityId::from_raw(1)));
        assert_ne!(a, c);
    }
}
