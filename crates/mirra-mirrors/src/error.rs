//! Reflection errors
//!
//! Three failure kinds cross the mirror layer: unsupported operations
//! (missing capability or coverage; recoverable), resolution failures
//! (a member that does not exist under the requested arity and kind;
//! fatal to the attempted call), and values thrown by invoked code,
//! which propagate unchanged and unwrapped.

use crate::value::Value;
use mirra_model::ModelError;
use thiserror::Error;

/// Errors raised by mirror operations
#[derive(Debug, Clone, Error)]
pub enum ReflectError {
    /// A model-layer failure, including denied capabilities and missing
    /// supertype coverage
    #[error(transparent)]
    Model(#[from] ModelError),

    /// A reflective operation the session cannot support
    #[error("Unsupported reflective operation: {message}")]
    Unsupported {
        /// Why the operation is unsupported
        message: String,
    },

    /// A member name that does not resolve under the requested arity/kind
    ///
    /// Equivalent in severity to a compile-time name-resolution error.
    #[error("No such {kind} '{member}' on {target}")]
    NoSuchMember {
        /// The entity the lookup ran against
        target: String,
        /// The unresolved member name
        member: String,
        /// Requested member kind
        kind: &'static str,
    },

    /// A constructor name that does not resolve on the class
    #[error("No constructor '{constructor}' on class {class}")]
    NoSuchConstructor {
        /// The class searched
        class: String,
        /// The requested constructor name; empty means the unnamed constructor
        constructor: String,
    },

    /// A generative constructor was invoked on an abstract class
    #[error("Cannot instantiate abstract class {class}")]
    AbstractInstantiation {
        /// The abstract class
        class: String,
    },

    /// A value thrown by invoked code, crossing the mirror layer unchanged
    #[error("Uncaught exception: {0}")]
    Thrown(Value),
}

impl ReflectError {
    /// Throw a value out of a member implementation
    pub fn thrown(value: impl Into<Value>) -> Self {
        ReflectError::Thrown(value.into())
    }

    /// Whether this is the recoverable unsupported-operation failure kind
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            ReflectError::Unsupported { .. }
                | ReflectError::Model(ModelError::CapabilityDenied { .. })
                | ReflectError::Model(ModelError::NotCovered { .. })
        )
    }
}

/// Result of a mirror operation
pub type ReflectResult<T> = Result<T, ReflectError>;
