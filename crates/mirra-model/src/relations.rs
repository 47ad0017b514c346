//! Type-relation engine: subtype, assignability, and subclass queries
//!
//! Relations are defined only when every supertype reachable from the
//! receiver (and, for assignability, from the argument) is covered by the
//! active reflector and the type-relations capability has been granted.
//! Anything less fails with an explicit error instead of an approximate
//! boolean; callers must be able to tell "definitely not a subtype" from
//! "insufficient information".

use crate::capability::{CapabilityGrants, CapabilityKind};
use crate::entity::{Entity, EntityId};
use crate::error::ModelError;
use crate::model::ProgramModel;
use crate::ty::TypeRef;
use rustc_hash::FxHashSet;

/// Context for relation queries within one reflector session
pub struct RelationContext<'a> {
    model: &'a ProgramModel,
    covered: &'a FxHashSet<EntityId>,
    grants: &'a dyn CapabilityGrants,
}

impl<'a> RelationContext<'a> {
    /// Create a relation context over a frozen model
    pub fn new(
        model: &'a ProgramModel,
        covered: &'a FxHashSet<EntityId>,
        grants: &'a dyn CapabilityGrants,
    ) -> Self {
        RelationContext {
            model,
            covered,
            grants,
        }
    }

    /// Check `sub <: sup`
    pub fn is_subtype_of(&self, sub: &TypeRef, sup: &TypeRef) -> Result<bool, ModelError> {
        self.require_support(sub)?;
        Ok(self.subtype(sub, sup, 0))
    }

    /// Check whether a value of type `from` may be assigned where `to` is expected
    ///
    /// Assignability is subtyping in either direction, with the universal
    /// type assignable both ways.
    pub fn is_assignable_to(&self, from: &TypeRef, to: &TypeRef) -> Result<bool, ModelError> {
        self.require_support(from)?;
        self.require_support(to)?;
        if from.is_dynamic() || to.is_dynamic() {
            return Ok(true);
        }
        Ok(self.subtype(from, to, 0) || self.subtype(to, from, 0))
    }

    /// Class-only subtype query; reflexive
    pub fn is_subclass_of(&self, sub: EntityId, sup: EntityId) -> Result<bool, ModelError> {
        self.require_support(&TypeRef::Entity(sub))?;
        let sup_decl = self.original_of(sup);
        for ancestor in self.model.superclass_chain(sub)? {
            if self.original_of(ancestor) == sup_decl {
                return Ok(true);
            }
            if let Some(mixin) = self.model.class(ancestor)?.mixin {
                if self.original_of(mixin) == sup_decl {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Fail unless the capability is granted and every reachable supertype is covered
    fn require_support(&self, ty: &TypeRef) -> Result<(), ModelError> {
        let root = match ty.declaration() {
            Some(decl) => decl,
            // dynamic/void reach no declarations; nothing to cover.
            None => return Ok(()),
        };
        if !self.grants.is_granted(root, CapabilityKind::TypeRelations) {
            return Err(ModelError::CapabilityDenied {
                capability: CapabilityKind::TypeRelations.name(),
                name: self.model.simple_name(root)?.to_string(),
            });
        }

        let mut pending = vec![root];
        let mut seen = FxHashSet::default();
        while let Some(id) = pending.pop() {
            if !seen.insert(id) {
                continue;
            }
            if !self.covered.contains(&id) {
                return Err(ModelError::NotCovered {
                    name: self.model.simple_name(id)?.to_string(),
                });
            }
            match self.model.entity(id)? {
                Entity::Class(class) => {
                    pending.extend(class.superclass);
                    pending.extend(class.superinterfaces.iter().copied());
                    pending.extend(class.mixin);
                    pending.extend(class.original);
                    for arg in &class.type_arguments {
                        pending.extend(arg.declaration());
                    }
                }
                Entity::TypeVariable(tv) => {
                    pending.extend(tv.upper_bound.declaration());
                }
                Entity::Typedef(td) => pending.push(td.referent),
                Entity::FunctionType(ft) => {
                    pending.extend(ft.return_type.declaration());
                    for &param in &ft.parameters {
                        pending.extend(self.model.parameter(param)?.ty.declaration());
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// The uninstantiated declaration behind a class id
    fn original_of(&self, id: EntityId) -> EntityId {
        self.model
            .class(id)
            .ok()
            .and_then(|c| c.original)
            .unwrap_or(id)
    }

    /// Structural/nominal subtype relation over resolved references
    ///
    /// Coverage and capability have already been checked; missing entities
    /// conservatively answer false.
    fn subtype(&self, sub: &TypeRef, sup: &TypeRef, depth: usize) -> bool {
        // Guards against pathological reference cycles in hand-built models.
        if depth > self.model.len() + 8 {
            return false;
        }
        if sub == sup {
            return true;
        }
        if sup.is_dynamic() {
            return true;
        }
        match (sub, sup) {
            (TypeRef::Dynamic, _) | (TypeRef::Void, _) | (_, TypeRef::Void) => false,
            _ => {
                let (sub_decl, sub_args) = match self.resolve(sub) {
                    Some(resolved) => resolved,
                    None => return false,
                };
                let (sup_decl, sup_args) = match self.resolve(sup) {
                    Some(resolved) => resolved,
                    None => return false,
                };
                self.declared_subtype(sub_decl, &sub_args, sup_decl, &sup_args, depth)
            }
        }
    }

    /// Split a reference into its declaration and bound arguments, expanding
    /// typedefs and class instantiations
    fn resolve(&self, ty: &TypeRef) -> Option<(EntityId, Vec<TypeRef>)> {
        match ty {
            TypeRef::Entity(id) => match self.model.entity(*id).ok()? {
                Entity::Typedef(td) => Some((td.referent, Vec::new())),
                Entity::Class(class) => match class.original {
                    Some(declaration) => Some((declaration, class.type_arguments.clone())),
                    None => Some((*id, Vec::new())),
                },
                _ => Some((*id, Vec::new())),
            },
            TypeRef::Instantiated {
                declaration,
                arguments,
            } => Some((*declaration, arguments.clone())),
            _ => None,
        }
    }

    fn declared_subtype(
        &self,
        sub_decl: EntityId,
        sub_args: &[TypeRef],
        sup_decl: EntityId,
        sup_args: &[TypeRef],
        depth: usize,
    ) -> bool {
        let sub_entity = match self.model.entity(sub_decl) {
            Ok(e) => e,
            Err(_) => return false,
        };
        let sup_entity = match self.model.entity(sup_decl) {
            Ok(e) => e,
            Err(_) => return false,
        };

        match (sub_entity, sup_entity) {
            // A type variable is a subtype of whatever its bound is.
            (Entity::TypeVariable(tv), _) => {
                self.subtype(&tv.upper_bound.clone(), &TypeRef::Entity(sup_decl), depth + 1)
            }
            (_, Entity::TypeVariable(_)) => false,

            // Function types are structural: contravariant parameters,
            // covariant return type.
            (Entity::FunctionType(f1), Entity::FunctionType(f2)) => {
                let p1 = self.parameter_types(&f1.parameters);
                let p2 = self.parameter_types(&f2.parameters);
                if p1.len() != p2.len() {
                    return false;
                }
                let params_ok = p1
                    .iter()
                    .zip(&p2)
                    .all(|(a, b)| self.subtype(b, a, depth + 1)); // reversed
                params_ok && self.subtype(&f1.return_type, &f2.return_type, depth + 1)
            }

            // Classes are nominal: the declared supertype graph decides.
            (Entity::Class(_), Entity::Class(_)) => {
                if sub_decl == sup_decl {
                    return self.arguments_subtype(sub_args, sup_args, depth);
                }
                let mut pending = self.direct_supertypes(sub_decl);
                let mut seen = FxHashSet::default();
                while let Some(ancestor) = pending.pop() {
                    if !seen.insert(ancestor) {
                        continue;
                    }
                    if self.original_of(ancestor) == sup_decl {
                        // Type arguments do not propagate through the declared
                        // supertype edge, so an erased supertype matches only
                        // an unparameterized or all-dynamic expectation.
                        return sup_args.iter().all(TypeRef::is_dynamic);
                    }
                    pending.extend(self.direct_supertypes(ancestor));
                }
                false
            }

            _ => false,
        }
    }

    /// Covariant pairwise comparison of bound type arguments
    ///
    /// An unparameterized expectation (no arguments) matches any
    /// instantiation of the same declaration.
    fn arguments_subtype(&self, sub_args: &[TypeRef], sup_args: &[TypeRef], depth: usize) -> bool {
        if sup_args.is_empty() {
            return true;
        }
        if sub_args.is_empty() {
            return sup_args.iter().all(TypeRef::is_dynamic);
        }
        sub_args.len() == sup_args.len()
            && sub_args
                .iter()
                .zip(sup_args)
                .all(|(a, b)| self.subtype(a, b, depth + 1))
    }

    fn direct_supertypes(&self, class: EntityId) -> Vec<EntityId> {
        match self.model.class(class) {
            Ok(record) => {
                let mut supers = Vec::new();
                supers.extend(record.superclass);
                supers.extend(record.superinterfaces.iter().copied());
                supers.extend(record.mixin);
                supers
            }
            Err(_) => Vec::new(),
        }
    }

    fn parameter_types(&self, parameters: &[EntityId]) -> Vec<TypeRef> {
        parameters
            .iter()
            .filter_map(|&id| self.model.parameter(id).ok().map(|p| p.ty.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{GrantAll, GrantNone};
    use crate::entity::{ClassEntity, FunctionTypeEntity, LibraryEntity, ParameterEntity};
    use crate::model::ProgramModelBuilder;

    struct Fixture {
        model: ProgramModel,
        covered: FxHashSet<EntityId>,
        base: EntityId,
        derived: EntityId,
        other: EntityId,
    }

    fn fixture() -> Fixture {
        let mut b = ProgramModelBuilder::new();
        let lib = b.add_library(LibraryEntity::new("demo", "package:demo/demo.mirra"));
        let base = b.add_class(ClassEntity::new("Base"));
        b.declare(lib, base).unwrap();
        let mut derived = ClassEntity::new("Derived");
        derived.superclass = Some(base);
        let derived = b.add_class(derived);
        b.declare(lib, derived).unwrap();
        let other = b.add_class(ClassEntity::new("Other"));
        b.declare(lib, other).unwrap();
        let model = b.build().unwrap();
        let covered = [lib, base, derived, other].into_iter().collect();
        Fixture {
            model,
            covered,
            base,
            derived,
            other,
        }
    }

    #[test]
    fn test_subclass_reflexive() {
        let f = fixture();
        let ctx = RelationContext::new(&f.model, &f.covered, &GrantAll);
        assert!(ctx.is_subclass_of(f.base, f.base).unwrap());
        assert!(ctx.is_subclass_of(f.derived, f.derived).unwrap());
    }

    #[test]
    fn test_subclass_chain() {
        let f = fixture();
        let ctx = RelationContext::new(&f.model, &f.covered, &GrantAll);
        assert!(ctx.is_subclass_of(f.derived, f.base).unwrap());
        assert!(!ctx.is_subclass_of(f.base, f.derived).unwrap());
        assert!(!ctx.is_subclass_of(f.derived, f.other).unwrap());
    }

    #[test]
    fn test_subtype_nominal() {
        let f = fixture();
        let ctx = RelationContext::new(&f.model, &f.covered, &GrantAll);
        let base = TypeRef::Entity(f.base);
        let derived = TypeRef::Entity(f.derived);
        assert!(ctx.is_subtype_of(&derived, &base).unwrap());
        assert!(!ctx.is_subtype_of(&base, &derived).unwrap());
        assert!(ctx.is_subtype_of(&derived, &TypeRef::Dynamic).unwrap());
    }

    #[test]
    fn test_assignability_is_bidirectional() {
        let f = fixture();
        let ctx = RelationContext::new(&f.model, &f.covered, &GrantAll);
        let base = TypeRef::Entity(f.base);
        let derived = TypeRef::Entity(f.derived);
        // Downcast assignment is allowed by the language's assignability.
        assert!(ctx.is_assignable_to(&base, &derived).unwrap());
        assert!(ctx.is_assignable_to(&derived, &base).unwrap());
        assert!(!ctx.is_assignable_to(&base, &TypeRef::Entity(f.other)).unwrap());
        assert!(ctx.is_assignable_to(&TypeRef::Dynamic, &base).unwrap());
    }

    #[test]
    fn test_capability_denied() {
        let f = fixture();
        let ctx = RelationContext::new(&f.model, &f.covered, &GrantNone);
        let err = ctx.is_subclass_of(f.derived, f.base).unwrap_err();
        assert!(matches!(err, ModelError::CapabilityDenied { .. }));
    }

    #[test]
    fn test_uncovered_supertype_fails() {
        let f = fixture();
        let mut covered = f.covered.clone();
        covered.remove(&f.base);
        let ctx = RelationContext::new(&f.model, &covered, &GrantAll);
        // Base is reachable from Derived, so the query is undecidable.
        let err = ctx
            .is_subtype_of(&TypeRef::Entity(f.derived), &TypeRef::Entity(f.base))
            .unwrap_err();
        assert!(matches!(err, ModelError::NotCovered { .. }));
        // A query rooted at Base itself fails the same way.
        assert!(ctx
            .is_subtype_of(&TypeRef::Entity(f.base), &TypeRef::Dynamic)
            .is_err());
    }

    #[test]
    fn test_function_type_variance() {
        let mut b = ProgramModelBuilder::new();
        let lib = b.add_library(LibraryEntity::new("demo", "package:demo/demo.mirra"));
        let base = b.add_class(ClassEntity::new("Base"));
        b.declare(lib, base).unwrap();
        let mut derived = ClassEntity::new("Derived");
        derived.superclass = Some(base);
        let derived = b.add_class(derived);
        b.declare(lib, derived).unwrap();

        // f1: (Base) -> Derived, f2: (Derived) -> Base
        let f1 = b.add(Entity::FunctionType(FunctionTypeEntity::new(
            "Function",
            TypeRef::Entity(derived),
        )));
        b.add_parameter(f1, ParameterEntity::new("a", TypeRef::Entity(base)))
            .unwrap();
        let f2 = b.add(Entity::FunctionType(FunctionTypeEntity::new(
            "Function",
            TypeRef::Entity(base),
        )));
        b.add_parameter(f2, ParameterEntity::new("a", TypeRef::Entity(derived)))
            .unwrap();

        let model = b.build().unwrap();
        let covered: FxHashSet<EntityId> = [lib, base, derived, f1, f2].into_iter().collect();
        let ctx = RelationContext::new(&model, &covered, &GrantAll);

        let t1 = TypeRef::Entity(f1);
        let t2 = TypeRef::Entity(f2);
        // (Base) -> Derived <: (Derived) -> Base
        assert!(ctx.is_subtype_of(&t1, &t2).unwrap());
        assert!(!ctx.is_subtype_of(&t2, &t1).unwrap());
    }
}
