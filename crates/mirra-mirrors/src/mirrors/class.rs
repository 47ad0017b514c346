//! Class mirrors

use crate::error::{ReflectError, ReflectResult};
use crate::invoke::{self, Target};
use crate::invoker::Invoker;
use crate::mirrors::{
    mirror_kind, MethodMirror, Mirror, ObjectMirror, TypeMirror, TypeVariableMirror,
};
use crate::session::Session;
use crate::value::Value;
use mirra_model::{EntityId, TypeRef};
use rustc_hash::FxHashMap;

mirror_kind! {
    /// A mirror over a class declaration or a class instantiation
    ClassMirror
}

impl ClassMirror {
    fn class(&self) -> &mirra_model::ClassEntity {
        self.cx
            .entity_unchecked(self.id)
            .as_class()
            .unwrap_or_else(|| panic!("class mirror over non-class {}", self.id))
    }

    /// The superclass, absent for root classes
    pub fn superclass(&self) -> Option<ClassMirror> {
        self.class().superclass.map(|id| ClassMirror {
            cx: self.cx.clone(),
            id,
        })
    }

    /// Implemented interfaces, in declaration order
    pub fn superinterfaces(&self) -> Vec<ClassMirror> {
        self.class()
            .superinterfaces
            .iter()
            .map(|&id| ClassMirror {
                cx: self.cx.clone(),
                id,
            })
            .collect()
    }

    /// The mixin applied to this class, or the class itself when none is
    pub fn mixin(&self) -> ClassMirror {
        let id = self.class().mixin.unwrap_or(self.id);
        ClassMirror {
            cx: self.cx.clone(),
            id,
        }
    }

    /// Whether the class is abstract
    pub fn is_abstract(&self) -> bool {
        self.class().is_abstract
    }

    /// Whether the class is an enum declaration
    pub fn is_enum(&self) -> bool {
        self.class().is_enum
    }

    /// Whether this mirrors the generic declaration rather than an
    /// instantiation of it
    pub fn is_original_declaration(&self) -> bool {
        self.class().is_original_declaration()
    }

    /// The generic declaration behind an instantiation; self when original
    pub fn original_declaration(&self) -> ClassMirror {
        let id = self.class().original.unwrap_or(self.id);
        ClassMirror {
            cx: self.cx.clone(),
            id,
        }
    }

    /// Declared formal type variables, in order
    pub fn type_variables(&self) -> Vec<TypeVariableMirror> {
        self.class()
            .type_variables
            .iter()
            .map(|&id| TypeVariableMirror {
                cx: self.cx.clone(),
                id,
            })
            .collect()
    }

    /// Actual type arguments; empty on the original declaration
    pub fn type_arguments(&self) -> Vec<TypeRef> {
        self.class().type_arguments.clone()
    }

    /// Declarations written directly inside the class, keyed by simple name
    ///
    /// Implicit field accessors are not listed here; they surface through
    /// the member maps.
    pub fn declarations(&self) -> ReflectResult<FxHashMap<String, Mirror>> {
        let declaration = self.class().original.unwrap_or(self.id);
        let map = self.cx.model().declarations_of(declaration)?;
        Ok(map
            .into_iter()
            .map(|(name, id)| (name, Mirror::of(&self.cx, id)))
            .collect())
    }

    /// Instance members reachable on receivers of this class, inherited
    /// members included; subclass declarations shadow superclass ones
    pub fn instance_members(&self) -> ReflectResult<FxHashMap<String, MethodMirror>> {
        let declaration = self.class().original.unwrap_or(self.id);
        let members = self.cx.instance_member_map(declaration)?;
        Ok(members
            .iter()
            .map(|(name, &id)| {
                (
                    name.clone(),
                    MethodMirror {
                        cx: self.cx.clone(),
                        id,
                    },
                )
            })
            .collect())
    }

    /// Static members declared directly in the class
    pub fn static_members(&self) -> ReflectResult<FxHashMap<String, MethodMirror>> {
        let declaration = self.class().original.unwrap_or(self.id);
        let members = self.cx.static_member_map(declaration)?;
        Ok(members
            .iter()
            .map(|(name, &id)| {
                (
                    name.clone(),
                    MethodMirror {
                        cx: self.cx.clone(),
                        id,
                    },
                )
            })
            .collect())
    }

    /// Constructors declared in the class, synthesized defaults included
    pub fn constructors(&self) -> ReflectResult<Vec<MethodMirror>> {
        let declaration = self.class().original.unwrap_or(self.id);
        Ok(self
            .cx
            .model()
            .constructors_of(declaration)?
            .into_iter()
            .map(|id| MethodMirror {
                cx: self.cx.clone(),
                id,
            })
            .collect())
    }

    /// Whether this class is `other` or transitively derives from it
    ///
    /// Walks superclasses and mixins; fails outside the session's coverage.
    pub fn is_subclass_of(&self, other: &ClassMirror) -> ReflectResult<bool> {
        Ok(self
            .cx
            .relation_context()
            .is_subclass_of(self.id, other.id)?)
    }

    /// Construct an instance through the named constructor
    ///
    /// The empty name selects the unnamed constructor. A generative
    /// constructor allocates the receiver with every instance field
    /// initialized to null before its implementation runs; a factory
    /// returns whatever its implementation returns.
    pub fn new_instance(
        &self,
        constructor_name: &str,
        positional: Vec<Value>,
        named: FxHashMap<String, Value>,
    ) -> ReflectResult<Value> {
        Session::new_instance(&self.cx, self.id, constructor_name, positional, named)
    }

    /// Resolve an instance member name for repeated dispatch
    pub fn invoker(&self, name: &str) -> ReflectResult<Invoker> {
        Session::resolve_invoker(&self.cx, self.id, name)
    }
}

impl TypeMirror for ClassMirror {}

impl ObjectMirror for ClassMirror {
    fn invoke(
        &self,
        member_name: &str,
        positional: Vec<Value>,
        named: FxHashMap<String, Value>,
    ) -> ReflectResult<Value> {
        invoke::invoke_member(&self.cx, Target::Class(self.id), member_name, positional, named)
    }

    fn invoke_getter(&self, name: &str) -> ReflectResult<Value> {
        invoke::get_member(&self.cx, Target::Class(self.id), name)
    }

    fn invoke_setter(&self, name: &str, value: Value) -> ReflectResult<Value> {
        invoke::set_member(&self.cx, Target::Class(self.id), name, value)
    }
}

impl Session {
    /// Allocate and initialize an instance of `class`
    pub(crate) fn new_instance(
        cx: &std::rc::Rc<Session>,
        class: EntityId,
        constructor_name: &str,
        positional: Vec<Value>,
        named: FxHashMap<String, Value>,
    ) -> ReflectResult<Value> {
        let declaration = cx.model().class(class)?.original.unwrap_or(class);
        let constructor = match cx.model().find_constructor(declaration, constructor_name)? {
            Some(constructor) => constructor,
            None => {
                return Err(ReflectError::NoSuchConstructor {
                    class: cx.model().qualified_name(class)?,
                    constructor: constructor_name.to_string(),
                })
            }
        };
        let method = cx.model().method(constructor)?;
        if method.is_factory_constructor() {
            return Session::call_method(cx, None, constructor, positional, named);
        }
        if cx.model().class(declaration)?.is_abstract {
            return Err(ReflectError::AbstractInstantiation {
                class: cx.model().qualified_name(class)?,
            });
        }
        let fields: Vec<String> = cx
            .model()
            .instance_fields(declaration)?
            .into_iter()
            .map(|id| Ok(cx.model().simple_name(id)?.to_string()))
            .collect::<ReflectResult<_>>()?;
        let receiver = Value::Object(crate::object::ObjectRef::new(declaration, fields));
        Session::call_method(cx, Some(receiver.clone()), constructor, positional, named)?;
        Ok(receiver)
    }
}
