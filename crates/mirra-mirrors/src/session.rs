//! Reflector session
//!
//! A [`Session`] is the explicit, passed-down context of one generator run:
//! the frozen program model, the capability grants, the coverage set, the
//! member-implementation table, and the live static-variable store. There is
//! no ambient global state; every mirror holds the session it was created
//! from.
//!
//! Callers interact through [`Reflector`], a cheap cloneable handle that
//! mints mirrors.

use crate::error::{ReflectError, ReflectResult};
use crate::impls::{CallArgs, ImplTable, MemberFn};
use crate::mirrors::{
    ClassMirror, ClosureMirror, InstanceMirror, LibraryMirror, MethodMirror, Mirror,
};
use crate::value::Value;
use mirra_model::{
    CapabilityGrants, CapabilityKind, Entity, EntityId, GrantAll, ModelError, ProgramModel,
    RelationContext,
};
use once_cell::unsync::OnceCell;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cell::RefCell;
use std::rc::Rc;

/// Classification used to attach class mirrors to simple values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// The null value
    Null,
    /// Booleans
    Bool,
    /// Integers
    Int,
    /// Floats
    Float,
    /// Strings
    Str,
    /// First-class functions
    Function,
}

impl PrimitiveKind {
    /// Classify a value; objects have their own class and return `None`
    pub fn of(value: &Value) -> Option<PrimitiveKind> {
        match value {
            Value::Null => Some(PrimitiveKind::Null),
            Value::Bool(_) => Some(PrimitiveKind::Bool),
            Value::Int(_) => Some(PrimitiveKind::Int),
            Value::Float(_) => Some(PrimitiveKind::Float),
            Value::Str(_) => Some(PrimitiveKind::Str),
            Value::Function(_) => Some(PrimitiveKind::Function),
            Value::Object(_) => None,
        }
    }
}

pub(crate) struct MemberTables {
    pub(crate) instance: FxHashMap<EntityId, Rc<FxHashMap<String, EntityId>>>,
    pub(crate) statics: FxHashMap<EntityId, Rc<FxHashMap<String, EntityId>>>,
}

/// One reflector session over a frozen program model
pub struct Session {
    pub(crate) model: ProgramModel,
    pub(crate) grants: Box<dyn CapabilityGrants>,
    pub(crate) covered: FxHashSet<EntityId>,
    pub(crate) impls: ImplTable,
    pub(crate) statics: RefCell<FxHashMap<EntityId, Value>>,
    pub(crate) primitives: FxHashMap<PrimitiveKind, EntityId>,
    tables: OnceCell<MemberTables>,
}

impl Session {
    /// The frozen program model
    pub fn model(&self) -> &ProgramModel {
        &self.model
    }

    /// Whether an entity is covered by this session
    pub fn is_covered(&self, id: EntityId) -> bool {
        self.covered.contains(&id)
    }

    /// Relation context over this session's coverage and grants
    pub fn relation_context(&self) -> RelationContext<'_> {
        RelationContext::new(&self.model, &self.covered, self.grants.as_ref())
    }

    /// Fail unless `capability` is granted for the entity
    pub(crate) fn require_grant(
        &self,
        id: EntityId,
        capability: CapabilityKind,
    ) -> ReflectResult<()> {
        if self.grants.is_granted(id, capability) {
            return Ok(());
        }
        Err(ReflectError::Model(ModelError::CapabilityDenied {
            capability: capability.name(),
            name: self.model.qualified_name(id)?,
        }))
    }

    /// Whether `capability` is granted for the entity
    pub(crate) fn is_granted(&self, id: EntityId, capability: CapabilityKind) -> bool {
        self.grants.is_granted(id, capability)
    }

    /// Look up an entity whose id was validated when its mirror was minted
    ///
    /// Panics on a dangling id; mirror factories are the only minting path.
    pub(crate) fn entity_unchecked(&self, id: EntityId) -> &Entity {
        self.model
            .entity(id)
            .unwrap_or_else(|_| panic!("mirror holds dangling {}", id))
    }

    /// Qualified name of a minted mirror's entity
    pub(crate) fn qualified_name_unchecked(&self, id: EntityId) -> String {
        self.model
            .qualified_name(id)
            .unwrap_or_else(|_| panic!("mirror holds dangling {}", id))
    }

    /// The class mirrored for a value, per the declared runtime class
    pub(crate) fn class_of_value(&self, value: &Value) -> ReflectResult<EntityId> {
        let kind = match value {
            Value::Object(obj) => return Ok(obj.class_id()),
            Value::Null => PrimitiveKind::Null,
            Value::Bool(_) => PrimitiveKind::Bool,
            Value::Int(_) => PrimitiveKind::Int,
            Value::Float(_) => PrimitiveKind::Float,
            Value::Str(_) => PrimitiveKind::Str,
            Value::Function(_) => PrimitiveKind::Function,
        };
        self.primitives.get(&kind).copied().ok_or_else(|| {
            ReflectError::Model(ModelError::NotCovered {
                name: value.type_name().to_string(),
            })
        })
    }

    /// Instance member of a class by name, inherited members included
    pub(crate) fn instance_member(
        &self,
        class: EntityId,
        name: &str,
    ) -> ReflectResult<Option<EntityId>> {
        let tables = self.member_tables()?;
        Ok(tables
            .instance
            .get(&class)
            .and_then(|members| members.get(name))
            .copied())
    }

    /// Static member of a class by name
    pub(crate) fn static_member(
        &self,
        class: EntityId,
        name: &str,
    ) -> ReflectResult<Option<EntityId>> {
        let tables = self.member_tables()?;
        Ok(tables
            .statics
            .get(&class)
            .and_then(|members| members.get(name))
            .copied())
    }

    pub(crate) fn instance_member_map(
        &self,
        class: EntityId,
    ) -> ReflectResult<Rc<FxHashMap<String, EntityId>>> {
        Ok(self
            .member_tables()?
            .instance
            .get(&class)
            .cloned()
            .unwrap_or_default())
    }

    pub(crate) fn static_member_map(
        &self,
        class: EntityId,
    ) -> ReflectResult<Rc<FxHashMap<String, EntityId>>> {
        Ok(self
            .member_tables()?
            .statics
            .get(&class)
            .cloned()
            .unwrap_or_default())
    }

    /// Member tables for every class, computed once per session
    fn member_tables(&self) -> ReflectResult<&MemberTables> {
        self.tables.get_or_try_init(|| {
            let mut instance = FxHashMap::default();
            let mut statics = FxHashMap::default();
            for raw in 0..self.model.len() as u32 {
                let id = EntityId::from_raw(raw);
                if self.model.entity(id)?.as_class().is_none() {
                    continue;
                }
                instance.insert(id, Rc::new(self.model.instance_members(id)?));
                statics.insert(id, Rc::new(self.model.static_members(id)?));
            }
            Ok::<_, ReflectError>(MemberTables { instance, statics })
        })
    }

    /// Current value of a static or top-level variable
    pub(crate) fn static_value(&self, variable: EntityId) -> Value {
        self.statics
            .borrow()
            .get(&variable)
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Assign a static or top-level variable
    pub(crate) fn set_static_value(&self, variable: EntityId, value: Value) {
        self.statics.borrow_mut().insert(variable, value);
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("entities", &self.model.len())
            .field("covered", &self.covered.len())
            .field("impls", &self.impls)
            .finish()
    }
}

/// Caller-facing handle that mints mirrors from a session
#[derive(Clone, Debug)]
pub struct Reflector {
    session: Rc<Session>,
}

impl Reflector {
    /// The underlying session
    pub fn session(&self) -> &Rc<Session> {
        &self.session
    }

    /// Mirror a library by name
    pub fn library(&self, name: &str) -> ReflectResult<LibraryMirror> {
        let id = self
            .session
            .model
            .library_by_name(name)
            .ok_or_else(|| ReflectError::NoSuchMember {
                target: "program".to_string(),
                member: name.to_string(),
                kind: "library",
            })?;
        Ok(LibraryMirror {
            cx: self.session.clone(),
            id,
        })
    }

    /// Mirror a library by canonical URI
    pub fn library_by_uri(&self, uri: &str) -> ReflectResult<LibraryMirror> {
        let id = self
            .session
            .model
            .library_by_uri(uri)
            .ok_or_else(|| ReflectError::NoSuchMember {
                target: "program".to_string(),
                member: uri.to_string(),
                kind: "library",
            })?;
        Ok(LibraryMirror {
            cx: self.session.clone(),
            id,
        })
    }

    /// Mirror a live value
    pub fn reflect(&self, value: Value) -> InstanceMirror {
        InstanceMirror {
            cx: self.session.clone(),
            value,
        }
    }

    /// Mirror a callable value; fails when the value is not callable
    pub fn reflect_closure(&self, value: Value) -> ReflectResult<ClosureMirror> {
        self.reflect(value)
            .as_closure()?
            .ok_or_else(|| ReflectError::Unsupported {
                message: "value is not callable".to_string(),
            })
    }

    /// Mirror a class entity by id
    pub fn class_mirror(&self, id: EntityId) -> ReflectResult<ClassMirror> {
        self.session.model.class(id)?;
        Ok(ClassMirror {
            cx: self.session.clone(),
            id,
        })
    }

    /// Mirror a method entity by id
    pub fn method_mirror(&self, id: EntityId) -> ReflectResult<MethodMirror> {
        self.session.model.method(id)?;
        Ok(MethodMirror {
            cx: self.session.clone(),
            id,
        })
    }

    /// Mirror any declaration by id
    pub fn mirror_of(&self, id: EntityId) -> ReflectResult<Mirror> {
        self.session.model.entity(id)?;
        Ok(Mirror::of(&self.session, id))
    }
}

/// Assembly surface for a session, driven by the generator collaborator
pub struct SessionBuilder {
    model: ProgramModel,
    grants: Box<dyn CapabilityGrants>,
    covered: FxHashSet<EntityId>,
    impls: ImplTable,
    statics: FxHashMap<EntityId, Value>,
    primitives: FxHashMap<PrimitiveKind, EntityId>,
}

impl SessionBuilder {
    /// Start a session over a frozen model; everything granted by default
    pub fn new(model: ProgramModel) -> Self {
        SessionBuilder {
            model,
            grants: Box::new(GrantAll),
            covered: FxHashSet::default(),
            impls: ImplTable::new(),
            statics: FxHashMap::default(),
            primitives: FxHashMap::default(),
        }
    }

    /// Install the capability-grant predicate
    pub fn grants(mut self, grants: impl CapabilityGrants + 'static) -> Self {
        self.grants = Box::new(grants);
        self
    }

    /// Mark one entity as covered by the reflector
    pub fn cover(mut self, id: EntityId) -> Self {
        self.covered.insert(id);
        self
    }

    /// Mark every entity in the model as covered
    pub fn cover_all(mut self) -> Self {
        for raw in 0..self.model.len() as u32 {
            self.covered.insert(EntityId::from_raw(raw));
        }
        self
    }

    /// Register the implementation of a member declaration
    pub fn implement<F>(mut self, member: EntityId, implementation: F) -> Self
    where
        F: Fn(&Rc<Session>, CallArgs) -> ReflectResult<Value> + 'static,
    {
        let implementation: MemberFn = Rc::new(implementation);
        self.impls.register(member, implementation);
        self
    }

    /// Seed the value of a static or top-level variable
    pub fn set_static(mut self, variable: EntityId, value: Value) -> Self {
        self.statics.insert(variable, value);
        self
    }

    /// Attach a class mirror to a primitive value kind
    pub fn bind_primitive(mut self, kind: PrimitiveKind, class: EntityId) -> Self {
        self.primitives.insert(kind, class);
        self
    }

    /// Freeze the session and hand out the reflector
    pub fn build(self) -> Reflector {
        Reflector {
            session: Rc::new(Session {
                model: self.model,
                grants: self.grants,
                covered: self.covered,
                impls: self.impls,
                statics: RefCell::new(self.statics),
                primitives: self.primitives,
                tables: OnceCell::new(),
            }),
        }
    }
}
