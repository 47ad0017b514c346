//! Program model errors

use thiserror::Error;

/// Errors raised while assembling or querying the frozen program model
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelError {
    /// An id does not refer to an entity in the arena
    #[error("Dangling entity id: {id}")]
    DanglingId {
        /// The offending id, formatted
        id: String,
    },

    /// An entity was used where a different kind was required
    #[error("Kind mismatch for {name}: expected {expected}, got {actual}")]
    KindMismatch {
        /// Entity name
        name: String,
        /// Expected kind
        expected: &'static str,
        /// Actual kind
        actual: &'static str,
    },

    /// An owner chain loops instead of terminating at a library
    #[error("Ownership cycle through {name}")]
    OwnershipCycle {
        /// An entity on the cycle
        name: String,
    },

    /// A generic instantiation binds the wrong number of type arguments
    #[error("Type argument arity mismatch on {name}: expected {expected}, got {actual}")]
    TypeArgumentArity {
        /// The instantiated class
        name: String,
        /// Number of type variables on the original declaration
        expected: usize,
        /// Number of bound arguments
        actual: usize,
    },

    /// A type-relation query reached a supertype outside the covered set
    #[error("Type relation undecidable: {name} is not covered by the reflector")]
    NotCovered {
        /// The uncovered supertype
        name: String,
    },

    /// A gated operation was attempted without the required capability
    #[error("Capability {capability} not granted for {name}")]
    CapabilityDenied {
        /// The gated capability
        capability: &'static str,
        /// The entity the operation targeted
        name: String,
    },
}
