//! The frozen program model and its builder
//!
//! A [`ProgramModel`] is an arena of entity records assembled ahead of time
//! by the generator collaborator. It is immutable after [`ProgramModelBuilder::build`]
//! and owns every entity; mirrors and relation queries hold ids into it.
//!
//! The builder wires ownership, synthesizes the compiler-introduced members
//! the model carries (implicit field accessors, default constructors), and
//! validates the structural invariants: acyclic owner
//! chains, type-argument arity, id/kind integrity.

use crate::entity::{
    setter_name, ClassEntity, Entity, EntityId, LibraryDependency, LibraryEntity, MethodEntity,
    MethodKind, ConstructorKind, ParameterEntity,
};
use crate::error::ModelError;
use crate::ty::TypeRef;
use rustc_hash::{FxHashMap, FxHashSet};

/// Immutable, fully-resolved program model
#[derive(Debug, Clone)]
pub struct ProgramModel {
    entities: Vec<Entity>,
    libraries: Vec<EntityId>,
}

impl ProgramModel {
    /// Number of entities in the arena
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the arena is empty
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// All libraries, in registration order
    pub fn libraries(&self) -> &[EntityId] {
        &self.libraries
    }

    /// Look up an entity by id
    pub fn entity(&self, id: EntityId) -> Result<&Entity, ModelError> {
        self.entities.get(id.index()).ok_or(ModelError::DanglingId {
            id: id.to_string(),
        })
    }

    /// Look up a library record
    pub fn library(&self, id: EntityId) -> Result<&LibraryEntity, ModelError> {
        let entity = self.entity(id)?;
        entity.as_library().ok_or_else(|| self.kind_mismatch(entity, "library"))
    }

    /// Look up a class record
    pub fn class(&self, id: EntityId) -> Result<&ClassEntity, ModelError> {
        let entity = self.entity(id)?;
        entity.as_class().ok_or_else(|| self.kind_mismatch(entity, "class"))
    }

    /// Look up a method record
    pub fn method(&self, id: EntityId) -> Result<&MethodEntity, ModelError> {
        let entity = self.entity(id)?;
        entity.as_method().ok_or_else(|| self.kind_mismatch(entity, "method"))
    }

    /// Look up a parameter record
    pub fn parameter(&self, id: EntityId) -> Result<&ParameterEntity, ModelError> {
        let entity = self.entity(id)?;
        entity.as_parameter().ok_or_else(|| self.kind_mismatch(entity, "parameter"))
    }

    fn kind_mismatch(&self, entity: &Entity, expected: &'static str) -> ModelError {
        ModelError::KindMismatch {
            name: entity.simple_name().to_string(),
            expected,
            actual: entity.kind_name(),
        }
    }

    /// Find a library by name
    pub fn library_by_name(&self, name: &str) -> Option<EntityId> {
        self.libraries
            .iter()
            .copied()
            .find(|&id| self.entities[id.index()].simple_name() == name)
    }

    /// Find a library by canonical URI
    pub fn library_by_uri(&self, uri: &str) -> Option<EntityId> {
        self.libraries.iter().copied().find(|&id| {
            self.entities[id.index()]
                .as_library()
                .map(|lib| lib.uri == uri)
                .unwrap_or(false)
        })
    }

    /// Simple name of an entity
    pub fn simple_name(&self, id: EntityId) -> Result<&str, ModelError> {
        Ok(self.entity(id)?.simple_name())
    }

    /// Owner-qualified, dot-joined name of an entity
    pub fn qualified_name(&self, id: EntityId) -> Result<String, ModelError> {
        let entity = self.entity(id)?;
        match entity.owner() {
            None => Ok(entity.simple_name().to_string()),
            Some(owner) => Ok(format!(
                "{}.{}",
                self.qualified_name(owner)?,
                entity.simple_name()
            )),
        }
    }

    /// Whether the entity is declared directly in a library
    pub fn is_top_level(&self, id: EntityId) -> Result<bool, ModelError> {
        match self.entity(id)?.owner() {
            Some(owner) => Ok(matches!(self.entity(owner)?, Entity::Library(_))),
            None => Ok(false),
        }
    }

    /// Entities declared directly in a library or class, keyed by simple name
    pub fn declarations_of(&self, id: EntityId) -> Result<FxHashMap<String, EntityId>, ModelError> {
        let ids: &[EntityId] = match self.entity(id)? {
            Entity::Library(lib) => &lib.declarations,
            Entity::Class(class) => &class.declarations,
            other => {
                return Err(self.kind_mismatch(other, "library or class"));
            }
        };
        let mut map = FxHashMap::default();
        for &decl in ids {
            map.insert(self.entity(decl)?.simple_name().to_string(), decl);
        }
        Ok(map)
    }

    /// Find a directly declared entity by simple name
    pub fn find_declaration(&self, owner: EntityId, name: &str) -> Result<Option<EntityId>, ModelError> {
        let ids: &[EntityId] = match self.entity(owner)? {
            Entity::Library(lib) => &lib.declarations,
            Entity::Class(class) => &class.declarations,
            other => return Err(self.kind_mismatch(other, "library or class")),
        };
        for &decl in ids {
            if self.entity(decl)?.simple_name() == name {
                return Ok(Some(decl));
            }
        }
        Ok(None)
    }

    /// Superclass chain starting at `class` and ending at the root class
    pub fn superclass_chain(&self, class: EntityId) -> Result<Vec<EntityId>, ModelError> {
        let mut chain = Vec::new();
        let mut current = Some(class);
        while let Some(id) = current {
            if chain.len() > self.entities.len() {
                return Err(ModelError::OwnershipCycle {
                    name: self.simple_name(id)?.to_string(),
                });
            }
            chain.push(id);
            current = self.class(id)?.superclass;
        }
        Ok(chain)
    }

    /// Instance members of a class, inherited members included
    ///
    /// Fields are excluded; their implicit accessors are included. Subclass
    /// declarations shadow superclass members of the same name.
    pub fn instance_members(&self, class: EntityId) -> Result<FxHashMap<String, EntityId>, ModelError> {
        let mut members = FxHashMap::default();
        let chain = self.superclass_chain(class)?;
        // Root first so overriding subclass entries win.
        for &ancestor in chain.iter().rev() {
            let record = self.class(ancestor)?;
            for &id in record.declarations.iter().chain(&record.implicit_accessors) {
                let method = match self.entity(id)? {
                    Entity::Method(m) => m,
                    _ => continue,
                };
                if method.is_static || method.is_constructor() {
                    continue;
                }
                members.insert(method.simple_name.clone(), id);
            }
        }
        Ok(members)
    }

    /// Static members of a class: declared statics plus implicit accessors
    /// for static fields; constructors excluded
    pub fn static_members(&self, class: EntityId) -> Result<FxHashMap<String, EntityId>, ModelError> {
        let record = self.class(class)?;
        let mut members = FxHashMap::default();
        for &id in record.declarations.iter().chain(&record.implicit_accessors) {
            let method = match self.entity(id)? {
                Entity::Method(m) => m,
                _ => continue,
            };
            if !method.is_static || method.is_constructor() {
                continue;
            }
            members.insert(method.simple_name.clone(), id);
        }
        Ok(members)
    }

    /// Constructors declared on a class, implicit default included
    pub fn constructors_of(&self, class: EntityId) -> Result<Vec<EntityId>, ModelError> {
        let record = self.class(class)?;
        let mut ctors = Vec::new();
        for &id in &record.declarations {
            if let Entity::Method(m) = self.entity(id)? {
                if m.is_constructor() {
                    ctors.push(id);
                }
            }
        }
        Ok(ctors)
    }

    /// Find a constructor by constructor name; empty selects the unnamed one
    pub fn find_constructor(&self, class: EntityId, name: &str) -> Result<Option<EntityId>, ModelError> {
        for id in self.constructors_of(class)? {
            if self.method(id)?.constructor_name == name {
                return Ok(Some(id));
            }
        }
        Ok(None)
    }

    /// Fields contributing to the storage of an instance, root class first
    pub fn instance_fields(&self, class: EntityId) -> Result<Vec<EntityId>, ModelError> {
        let mut fields = Vec::new();
        for &ancestor in self.superclass_chain(class)?.iter().rev() {
            for &id in &self.class(ancestor)?.declarations {
                if let Entity::Variable(v) = self.entity(id)? {
                    if !v.is_static {
                        fields.push(id);
                    }
                }
            }
        }
        Ok(fields)
    }

    /// Whether a type reference mentions an unsubstituted type variable
    pub fn contains_free_type_variables(&self, ty: &TypeRef) -> Result<bool, ModelError> {
        let mut visited = FxHashSet::default();
        self.free_vars_inner(ty, &mut visited)
    }

    fn free_vars_inner(
        &self,
        ty: &TypeRef,
        visited: &mut FxHashSet<EntityId>,
    ) -> Result<bool, ModelError> {
        match ty {
            TypeRef::Dynamic | TypeRef::Void => Ok(false),
            TypeRef::Instantiated { arguments, .. } => {
                for arg in arguments {
                    if self.free_vars_inner(arg, visited)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            TypeRef::Entity(id) => {
                if !visited.insert(*id) {
                    return Ok(false);
                }
                match self.entity(*id)? {
                    Entity::TypeVariable(_) => Ok(true),
                    Entity::Class(class) => {
                        if class.is_original_declaration() && !class.type_variables.is_empty() {
                            // Uninstantiated generic: its variables are free.
                            return Ok(true);
                        }
                        for arg in &class.type_arguments {
                            if self.free_vars_inner(arg, visited)? {
                                return Ok(true);
                            }
                        }
                        Ok(false)
                    }
                    Entity::FunctionType(ft) => {
                        if self.free_vars_inner(&ft.return_type.clone(), visited)? {
                            return Ok(true);
                        }
                        for &param in &ft.parameters {
                            let ty = self.parameter(param)?.ty.clone();
                            if self.free_vars_inner(&ty, visited)? {
                                return Ok(true);
                            }
                        }
                        Ok(false)
                    }
                    Entity::Typedef(td) => {
                        let referent = TypeRef::Entity(td.referent);
                        self.free_vars_inner(&referent, visited)
                    }
                    _ => Ok(false),
                }
            }
        }
    }

    /// Canonical type reference reflected by a type entity
    pub fn reflected_type_ref(&self, id: EntityId) -> Result<TypeRef, ModelError> {
        match self.entity(id)? {
            Entity::Class(class) => match class.original {
                Some(original) => Ok(TypeRef::Instantiated {
                    declaration: original,
                    arguments: class.type_arguments.clone(),
                }),
                None => Ok(TypeRef::Entity(id)),
            },
            _ => Ok(TypeRef::Entity(id)),
        }
    }

    /// The fully-dynamic instantiation of a (possibly generic) type entity
    ///
    /// All type arguments are erased to the universal type.
    pub fn dynamic_type_ref(&self, id: EntityId) -> Result<TypeRef, ModelError> {
        match self.entity(id)? {
            Entity::Class(class) => {
                let original = class.original.unwrap_or(id);
                let arity = self.class(original)?.type_variables.len();
                if arity == 0 {
                    Ok(TypeRef::Entity(original))
                } else {
                    Ok(TypeRef::Instantiated {
                        declaration: original,
                        arguments: vec![TypeRef::Dynamic; arity],
                    })
                }
            }
            _ => Ok(TypeRef::Entity(id)),
        }
    }
}

/// Mutable assembly surface driven by the generator collaborator
#[derive(Debug, Default)]
pub struct ProgramModelBuilder {
    entities: Vec<Entity>,
}

impl ProgramModelBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        ProgramModelBuilder::default()
    }

    /// Add an entity to the arena
    pub fn add(&mut self, entity: Entity) -> EntityId {
        let id = EntityId::from_raw(self.entities.len() as u32);
        self.entities.push(entity);
        id
    }

    /// Add a library
    pub fn add_library(&mut self, library: LibraryEntity) -> EntityId {
        self.add(Entity::Library(library))
    }

    /// Add a class
    pub fn add_class(&mut self, class: ClassEntity) -> EntityId {
        self.add(Entity::Class(class))
    }

    /// Add a method
    pub fn add_method(&mut self, method: MethodEntity) -> EntityId {
        self.add(Entity::Method(method))
    }

    /// Mutable access to an already-added entity
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id.index())
    }

    /// Declare `child` directly inside `owner` (a library or class)
    pub fn declare(&mut self, owner: EntityId, child: EntityId) -> Result<(), ModelError> {
        self.check_id(child)?;
        match self.entities.get_mut(owner.index()) {
            Some(Entity::Library(lib)) => lib.declarations.push(child),
            Some(Entity::Class(class)) => class.declarations.push(child),
            Some(other) => {
                return Err(ModelError::KindMismatch {
                    name: other.simple_name().to_string(),
                    expected: "library or class",
                    actual: other.kind_name(),
                })
            }
            None => {
                return Err(ModelError::DanglingId {
                    id: owner.to_string(),
                })
            }
        }
        self.set_owner(child, owner);
        Ok(())
    }

    /// Attach a parameter to a method
    pub fn add_parameter(&mut self, method: EntityId, parameter: ParameterEntity) -> Result<EntityId, ModelError> {
        let id = self.add(Entity::Parameter(parameter));
        match self.entities.get_mut(method.index()) {
            Some(Entity::Method(m)) => m.parameters.push(id),
            Some(Entity::FunctionType(ft)) => ft.parameters.push(id),
            Some(other) => {
                return Err(ModelError::KindMismatch {
                    name: other.simple_name().to_string(),
                    expected: "method",
                    actual: other.kind_name(),
                })
            }
            None => {
                return Err(ModelError::DanglingId {
                    id: method.to_string(),
                })
            }
        }
        self.set_owner(id, method);
        Ok(id)
    }

    /// Record an import/export edge on its source library
    pub fn add_dependency(&mut self, dependency: LibraryDependency) -> Result<(), ModelError> {
        let source = dependency.source_library;
        match self.entities.get_mut(source.index()) {
            Some(Entity::Library(lib)) => {
                lib.dependencies.push(dependency);
                Ok(())
            }
            Some(other) => Err(ModelError::KindMismatch {
                name: other.simple_name().to_string(),
                expected: "library",
                actual: other.kind_name(),
            }),
            None => Err(ModelError::DanglingId {
                id: source.to_string(),
            }),
        }
    }

    fn set_owner(&mut self, child: EntityId, owner: EntityId) {
        if let Some(entity) = self.entities.get_mut(child.index()) {
            match entity {
                Entity::Library(_) => {}
                Entity::Class(e) => e.owner = Some(owner),
                Entity::FunctionType(e) => e.owner = Some(owner),
                Entity::TypeVariable(e) => e.owner = Some(owner),
                Entity::Typedef(e) => e.owner = Some(owner),
                Entity::Method(e) => e.owner = Some(owner),
                Entity::Variable(e) => e.owner = Some(owner),
                Entity::Parameter(e) => e.owner = Some(owner),
            }
        }
    }

    fn check_id(&self, id: EntityId) -> Result<(), ModelError> {
        if id.index() < self.entities.len() {
            Ok(())
        } else {
            Err(ModelError::DanglingId { id: id.to_string() })
        }
    }

    /// Freeze the model: synthesize implicit members, then validate
    pub fn build(mut self) -> Result<ProgramModel, ModelError> {
        self.synthesize_accessors();
        self.synthesize_default_constructors();
        let libraries = self
            .entities
            .iter()
            .enumerate()
            .filter(|(_, e)| matches!(e, Entity::Library(_)))
            .map(|(i, _)| EntityId::from_raw(i as u32))
            .collect();
        let model = ProgramModel {
            entities: self.entities,
            libraries,
        };
        model.validate()?;
        Ok(model)
    }

    /// Synthesize implicit getters (and setters for mutable fields) for every
    /// field declared on an original class declaration
    fn synthesize_accessors(&mut self) {
        let class_ids: Vec<usize> = (0..self.entities.len())
            .filter(|&i| {
                self.entities[i]
                    .as_class()
                    .map(|c| c.is_original_declaration())
                    .unwrap_or(false)
            })
            .collect();

        for class_index in class_ids {
            let class_id = EntityId::from_raw(class_index as u32);
            let fields: Vec<(EntityId, String, TypeRef, bool, bool)> = {
                let Some(class) = self.entities[class_index].as_class() else {
                    continue;
                };
                class
                    .declarations
                    .iter()
                    .filter_map(|&id| {
                        self.entities[id.index()].as_variable().map(|v| {
                            (
                                id,
                                v.simple_name.clone(),
                                v.ty.clone(),
                                v.is_static,
                                v.is_final || v.is_const,
                            )
                        })
                    })
                    .collect()
            };

            let mut accessors = Vec::new();
            for (_field, name, ty, is_static, read_only) in fields {
                let mut getter = MethodEntity::new(name.clone(), MethodKind::Getter, ty.clone());
                getter.owner = Some(class_id);
                getter.is_static = is_static;
                getter.is_synthetic = true;
                accessors.push(self.add(Entity::Method(getter)));

                if !read_only {
                    let mut setter =
                        MethodEntity::new(setter_name(&name), MethodKind::Setter, TypeRef::Void);
                    setter.owner = Some(class_id);
                    setter.is_static = is_static;
                    setter.is_synthetic = true;
                    let setter_id = self.add(Entity::Method(setter));
                    let mut param = ParameterEntity::new("value", ty);
                    param.owner = Some(setter_id);
                    let param_id = self.add(Entity::Parameter(param));
                    if let Some(Entity::Method(m)) = self.entities.get_mut(setter_id.index()) {
                        m.parameters.push(param_id);
                    }
                    accessors.push(setter_id);
                }
            }

            if let Some(Entity::Class(class)) = self.entities.get_mut(class_index) {
                class.implicit_accessors.extend(accessors);
            }
        }
    }

    /// Synthesize the unnamed default constructor for original class
    /// declarations that declare no constructor of their own
    fn synthesize_default_constructors(&mut self) {
        let class_ids: Vec<usize> = (0..self.entities.len())
            .filter(|&i| {
                self.entities[i]
                    .as_class()
                    .map(|c| c.is_original_declaration())
                    .unwrap_or(false)
            })
            .collect();

        for class_index in class_ids {
            let class_id = EntityId::from_raw(class_index as u32);
            let has_ctor = {
                let Some(class) = self.entities[class_index].as_class() else {
                    continue;
                };
                class.declarations.iter().any(|&id| {
                    self.entities[id.index()]
                        .as_method()
                        .map(|m| m.is_constructor())
                        .unwrap_or(false)
                })
            };
            if has_ctor {
                continue;
            }
            let name = self.entities[class_index].simple_name().to_string();
            let mut ctor = MethodEntity::new(
                name,
                MethodKind::Constructor(ConstructorKind::Generative {
                    is_redirecting: false,
                    is_const: false,
                }),
                TypeRef::Entity(class_id),
            );
            ctor.owner = Some(class_id);
            ctor.is_synthetic = true;
            let ctor_id = self.add(Entity::Method(ctor));
            if let Some(Entity::Class(class)) = self.entities.get_mut(class_index) {
                class.declarations.push(ctor_id);
            }
        }
    }
}

impl ProgramModel {
    /// Validate arena-wide invariants; called once at freeze time
    fn validate(&self) -> Result<(), ModelError> {
        for (index, entity) in self.entities.iter().enumerate() {
            let id = EntityId::from_raw(index as u32);
            self.validate_owner_chain(id)?;
            match entity {
                Entity::Class(class) => self.validate_class(id, class)?,
                Entity::Typedef(td) => {
                    let referent = self.entity(td.referent)?;
                    if !matches!(referent, Entity::FunctionType(_)) {
                        return Err(ModelError::KindMismatch {
                            name: td.simple_name.clone(),
                            expected: "function type",
                            actual: referent.kind_name(),
                        });
                    }
                }
                Entity::Method(method) => {
                    for &param in &method.parameters {
                        self.parameter(param)?;
                    }
                }
                Entity::Library(lib) => {
                    for dep in &lib.dependencies {
                        self.library(dep.source_library)?;
                        if let Some(target) = dep.target_library {
                            self.library(target)?;
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Owner chains must be acyclic and terminate at a library or at no owner
    fn validate_owner_chain(&self, id: EntityId) -> Result<(), ModelError> {
        let mut seen = FxHashSet::default();
        let mut current = id;
        loop {
            if !seen.insert(current) {
                return Err(ModelError::OwnershipCycle {
                    name: self.simple_name(id)?.to_string(),
                });
            }
            match self.entity(current)?.owner() {
                Some(owner) => {
                    self.check_arena_id(owner)?;
                    current = owner;
                }
                None => return Ok(()),
            }
        }
    }

    fn validate_class(&self, id: EntityId, class: &ClassEntity) -> Result<(), ModelError> {
        if let Some(superclass) = class.superclass {
            self.class(superclass)?;
        }
        for &iface in &class.superinterfaces {
            self.class(iface)?;
        }
        if let Some(mixin) = class.mixin {
            self.class(mixin)?;
        }
        for &tv in &class.type_variables {
            let entity = self.entity(tv)?;
            if !matches!(entity, Entity::TypeVariable(_)) {
                return Err(self.kind_mismatch(entity, "type variable"));
            }
        }
        if let Some(original) = class.original {
            let original_record = self.class(original)?;
            if class.type_arguments.len() != original_record.type_variables.len() {
                return Err(ModelError::TypeArgumentArity {
                    name: class.simple_name.clone(),
                    expected: original_record.type_variables.len(),
                    actual: class.type_arguments.len(),
                });
            }
        }
        // Superclass chain must not loop back to this class.
        self.superclass_chain(id)?;
        Ok(())
    }

    fn check_arena_id(&self, id: EntityId) -> Result<(), ModelError> {
        if id.index() < self.entities.len() {
            Ok(())
        } else {
            Err(ModelError::DanglingId { id: id.to_string() })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::VariableEntity;

    fn small_model() -> (ProgramModel, EntityId, EntityId) {
        let mut b = ProgramModelBuilder::new();
        let lib = b.add_library(LibraryEntity::new("demo", "package:demo/demo.mirra"));
        let class = b.add_class(ClassEntity::new("Point"));
        b.declare(lib, class).unwrap();
        let field = b.add(Entity::Variable(VariableEntity::new("x", TypeRef::Dynamic)));
        b.declare(class, field).unwrap();
        (b.build().unwrap(), lib, class)
    }

    #[test]
    fn test_qualified_names() {
        let (model, lib, class) = small_model();
        assert_eq!(model.qualified_name(lib).unwrap(), "demo");
        assert_eq!(model.qualified_name(class).unwrap(), "demo.Point");
        let field = model.find_declaration(class, "x").unwrap().unwrap();
        assert_eq!(model.qualified_name(field).unwrap(), "demo.Point.x");
    }

    #[test]
    fn test_top_level() {
        let (model, _lib, class) = small_model();
        assert!(model.is_top_level(class).unwrap());
        let field = model.find_declaration(class, "x").unwrap().unwrap();
        assert!(!model.is_top_level(field).unwrap());
    }

    #[test]
    fn test_implicit_accessors_synthesized() {
        let (model, _lib, class) = small_model();
        let members = model.instance_members(class).unwrap();
        // Field itself is excluded; the accessors appear in its place.
        let getter = members.get("x").copied().expect("implicit getter");
        let setter = members.get("x=").copied().expect("implicit setter");
        assert!(model.method(getter).unwrap().is_synthetic);
        assert!(model.method(setter).unwrap().is_setter());
    }

    #[test]
    fn test_default_constructor_synthesized() {
        let (model, _lib, class) = small_model();
        let ctor = model.find_constructor(class, "").unwrap().expect("default ctor");
        let record = model.method(ctor).unwrap();
        assert!(record.is_synthetic);
        assert!(record.is_generative_constructor());
    }

    #[test]
    fn test_final_field_has_no_setter() {
        let mut b = ProgramModelBuilder::new();
        let lib = b.add_library(LibraryEntity::new("demo", "package:demo/demo.mirra"));
        let class = b.add_class(ClassEntity::new("Config"));
        b.declare(lib, class).unwrap();
        let mut field = VariableEntity::new("limit", TypeRef::Dynamic);
        field.is_final = true;
        let field = b.add(Entity::Variable(field));
        b.declare(class, field).unwrap();
        let model = b.build().unwrap();

        let members = model.instance_members(class).unwrap();
        assert!(members.contains_key("limit"));
        assert!(!members.contains_key("limit="));
    }

    #[test]
    fn test_type_argument_arity_enforced() {
        let mut b = ProgramModelBuilder::new();
        let lib = b.add_library(LibraryEntity::new("demo", "package:demo/demo.mirra"));
        let t = b.add(Entity::TypeVariable(crate::entity::TypeVariableEntity::new("T")));
        let mut generic = ClassEntity::new("Box");
        generic.type_variables = vec![t];
        let generic = b.add_class(generic);
        b.declare(lib, generic).unwrap();

        let mut bad = ClassEntity::new("Box");
        bad.original = Some(generic);
        bad.type_arguments = Vec::new(); // one argument short
        let bad_id = b.add_class(bad);
        b.declare(lib, bad_id).unwrap();

        let err = b.build().unwrap_err();
        assert!(matches!(err, ModelError::TypeArgumentArity { expected: 1, actual: 0, .. }));
    }

    #[test]
    fn test_inherited_instance_members() {
        let mut b = ProgramModelBuilder::new();
        let lib = b.add_library(LibraryEntity::new("demo", "package:demo/demo.mirra"));
        let base = b.add_class(ClassEntity::new("Base"));
        b.declare(lib, base).unwrap();
        let m = b.add_method(MethodEntity::new(
            "describe",
            MethodKind::Regular { is_operator: false },
            TypeRef::Dynamic,
        ));
        b.declare(base, m).unwrap();

        let mut derived = ClassEntity::new("Derived");
        derived.superclass = Some(base);
        let derived = b.add_class(derived);
        b.declare(lib, derived).unwrap();

        let model = b.build().unwrap();
        let members = model.instance_members(derived).unwrap();
        assert_eq!(members.get("describe").copied(), Some(m));
    }

    #[test]
    fn test_dangling_id_rejected() {
        let model = ProgramModelBuilder::new().build().unwrap();
        let err = model.entity(EntityId::from_raw(42)).unwrap_err();
        assert!(matches!(err, ModelError::DanglingId { .. }));
    }
}
