//! Capability gating for reflective operations
//!
//! Which reflective operations are permitted for which entities is decided
//! outside this crate. The model only consults a single injected predicate
//! before any gated query; a denied grant surfaces as
//! [`ModelError::CapabilityDenied`](crate::error::ModelError).

use crate::entity::EntityId;

/// Kinds of gated reflective operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapabilityKind {
    /// Obtaining a concrete `reflected_type` handle
    ReflectedType,
    /// Obtaining the fully-dynamic `dynamic_reflected_type` handle
    DynamicReflectedType,
    /// Subtype, assignability, and subclass queries
    TypeRelations,
}

impl CapabilityKind {
    /// Stable name for diagnostics
    pub fn name(self) -> &'static str {
        match self {
            CapabilityKind::ReflectedType => "reflected-type",
            CapabilityKind::DynamicReflectedType => "dynamic-reflected-type",
            CapabilityKind::TypeRelations => "type-relations",
        }
    }
}

/// Predicate supplied by the capability-declaration collaborator
///
/// Consulted before every gated operation; implementations must be pure with
/// respect to a single reflector session.
pub trait CapabilityGrants {
    /// Whether `capability` is granted for the entity
    fn is_granted(&self, entity: EntityId, capability: CapabilityKind) -> bool;
}

/// Grants every capability for every entity
#[derive(Debug, Clone, Copy, Default)]
pub struct GrantAll;

impl CapabilityGrants for GrantAll {
    fn is_granted(&self, _entity: EntityId, _capability: CapabilityKind) -> bool {
        true
    }
}

/// Denies every capability for every entity
#[derive(Debug, Clone, Copy, Default)]
pub struct GrantNone;

impl CapabilityGrants for GrantNone {
    fn is_granted(&self, _entity: EntityId, _capability: CapabilityKind) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blanket_grants() {
        let id = EntityId::from_raw(7);
        assert!(GrantAll.is_granted(id, CapabilityKind::ReflectedType));
        assert!(!GrantNone.is_granted(id, CapabilityKind::TypeRelations));
    }
}
