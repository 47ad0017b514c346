//! Mirra Program Model
//!
//! The frozen, already-resolved program model that mirrors reflect over:
//! entity records (libraries, classes, methods, variables, types), the
//! capability-gating contract, and the type-relation engine.
//!
//! Nothing in this crate executes user code; the dynamic half of the system
//! (values, invocation, tear-offs) lives in `mirra-mirrors`.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod capability;
pub mod entity;
pub mod error;
pub mod location;
pub mod model;
pub mod relations;
pub mod ty;

pub use capability::{CapabilityGrants, CapabilityKind, GrantAll, GrantNone};
pub use entity::{
    getter_name, setter_name, ClassEntity, Combinator, CombinatorKind, Const, ConstructorKind,
    DependencyKind, Entity, EntityId, FunctionTypeEntity, LibraryDependency, LibraryEntity,
    MethodEntity, MethodKind, ParameterEntity, TypeVariableEntity, TypedefEntity, VariableEntity,
};
pub use error::ModelError;
pub use location::{Comment, SourceLocation};
pub use model::{ProgramModel, ProgramModelBuilder};
pub use relations::RelationContext;
pub use ty::{RuntimeType, TypeRef};
