//! Dynamic invocation
//!
//! Member resolution and call execution shared by every reflective surface:
//! instance mirrors, class mirrors (static scope), library mirrors
//! (top-level scope), tear-offs, and invokers all funnel through the
//! functions here, so a member behaves identically regardless of how it was
//! reached.

use crate::error::{ReflectError, ReflectResult};
use crate::impls::CallArgs;
use crate::session::Session;
use crate::value::{FunctionRef, Value};
use mirra_model::{getter_name, setter_name, Entity, EntityId, MethodEntity, MethodKind, ParameterEntity};
use rustc_hash::{FxHashMap, FxHashSet};
use std::rc::Rc;

/// What a reified invocation asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationKind {
    /// An ordinary method call
    Method,
    /// A property read
    Getter,
    /// A property write
    Setter,
}

/// A reified invocation, replayable against any reflective target
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Name of the member; setters may carry the trailing `=` or not
    pub member_name: String,
    /// Whether this is a call, a read, or a write
    pub kind: InvocationKind,
    /// Positional arguments; a write carries the assigned value here
    pub positional: Vec<Value>,
    /// Named arguments; empty for reads and writes
    pub named: FxHashMap<String, Value>,
}

impl Invocation {
    /// A method-call invocation
    pub fn method(
        name: impl Into<String>,
        positional: Vec<Value>,
        named: FxHashMap<String, Value>,
    ) -> Self {
        Invocation {
            member_name: name.into(),
            kind: InvocationKind::Method,
            positional,
            named,
        }
    }

    /// A property-read invocation
    pub fn getter(name: impl Into<String>) -> Self {
        Invocation {
            member_name: name.into(),
            kind: InvocationKind::Getter,
            positional: Vec::new(),
            named: FxHashMap::default(),
        }
    }

    /// A property-write invocation
    pub fn setter(name: impl Into<String>, value: Value) -> Self {
        Invocation {
            member_name: name.into(),
            kind: InvocationKind::Setter,
            positional: vec![value],
            named: FxHashMap::default(),
        }
    }

    /// True for method-call invocations
    pub fn is_method(&self) -> bool {
        self.kind == InvocationKind::Method
    }

    /// True for property reads
    pub fn is_getter(&self) -> bool {
        self.kind == InvocationKind::Getter
    }

    /// True for property writes
    pub fn is_setter(&self) -> bool {
        self.kind == InvocationKind::Setter
    }
}

/// The reflective scope a lookup runs in
#[derive(Clone)]
pub(crate) enum Target<'a> {
    /// Instance scope of a live value; inherited members resolve
    Instance(&'a Value),
    /// Static scope of a class; declared members only
    Class(EntityId),
    /// Top-level scope of a library
    Library(EntityId),
}

/// A name resolved inside a scope
enum Resolved {
    Method(EntityId),
    Variable(EntityId),
}

fn target_name(cx: &Session, target: &Target<'_>) -> ReflectResult<String> {
    match target {
        Target::Instance(value) => {
            let class = cx.class_of_value(value)?;
            Ok(cx.model().qualified_name(class)?)
        }
        Target::Class(id) | Target::Library(id) => Ok(cx.model().qualified_name(*id)?),
    }
}

/// Resolve `name` inside the scope; `None` when no member matches
fn lookup(cx: &Session, target: &Target<'_>, name: &str) -> ReflectResult<Option<Resolved>> {
    match target {
        Target::Instance(value) => {
            let class = cx.class_of_value(value)?;
            Ok(cx.instance_member(class, name)?.map(Resolved::Method))
        }
        Target::Class(id) => {
            // Instantiations share the static scope of their declaration.
            let declaration = cx.model().class(*id)?.original.unwrap_or(*id);
            Ok(cx.static_member(declaration, name)?.map(Resolved::Method))
        }
        Target::Library(id) => {
            let found = match cx.model().find_declaration(*id, name)? {
                Some(found) => found,
                None => return Ok(None),
            };
            match cx.model().entity(found)? {
                Entity::Method(_) => Ok(Some(Resolved::Method(found))),
                Entity::Variable(_) => Ok(Some(Resolved::Variable(found))),
                _ => Ok(None),
            }
        }
    }
}

fn no_such_member(
    cx: &Session,
    target: &Target<'_>,
    name: &str,
    kind: &'static str,
) -> ReflectError {
    let target = target_name(cx, target).unwrap_or_else(|_| "<unknown>".to_string());
    ReflectError::NoSuchMember {
        target,
        member: name.to_string(),
        kind,
    }
}

/// Call a value that should be callable; tear-offs and stored closures
fn call_value(value: Value, positional: Vec<Value>, named: FxHashMap<String, Value>) -> ReflectResult<Value> {
    match value {
        Value::Function(function) => function.call(positional, named),
        other => Err(ReflectError::NoSuchMember {
            target: other.type_name().to_string(),
            member: "call".to_string(),
            kind: "method",
        }),
    }
}

/// `invoke`: call a member by name in the scope
pub(crate) fn invoke_member(
    cx: &Rc<Session>,
    target: Target<'_>,
    name: &str,
    positional: Vec<Value>,
    named: FxHashMap<String, Value>,
) -> ReflectResult<Value> {
    let receiver = receiver_of(&target);
    match lookup(cx, &target, name)? {
        Some(Resolved::Method(method)) => {
            Session::invoke_resolved(cx, receiver, method, positional, named)
        }
        Some(Resolved::Variable(variable)) => {
            let value = cx.static_value(variable);
            if positional.is_empty() && named.is_empty() {
                Ok(value)
            } else {
                call_value(value, positional, named)
            }
        }
        None => Err(no_such_member(cx, &target, name, "method")),
    }
}

/// `invokeGetter`: read a property or tear off a method
pub(crate) fn get_member(cx: &Rc<Session>, target: Target<'_>, name: &str) -> ReflectResult<Value> {
    let receiver = receiver_of(&target);
    match lookup(cx, &target, name)? {
        Some(Resolved::Method(method_id)) => {
            let method = cx.model().method(method_id)?;
            if method.is_regular_method() {
                Session::tear_off(cx, receiver, method_id)
            } else if method.is_getter() {
                Session::call_method(cx, receiver, method_id, Vec::new(), FxHashMap::default())
            } else {
                Err(no_such_member(cx, &target, name, "getter"))
            }
        }
        Some(Resolved::Variable(variable)) => Ok(cx.static_value(variable)),
        None => Err(no_such_member(cx, &target, name, "getter")),
    }
}

/// `invokeSetter`: write a property; evaluates to the assigned value
///
/// Accepts the field name with or without the trailing `=`.
pub(crate) fn set_member(
    cx: &Rc<Session>,
    target: Target<'_>,
    name: &str,
    value: Value,
) -> ReflectResult<Value> {
    let receiver = receiver_of(&target);
    let normalized = setter_name(getter_name(name));
    match lookup(cx, &target, &normalized)? {
        Some(Resolved::Method(method)) => {
            Session::call_method(cx, receiver, method, vec![value.clone()], FxHashMap::default())?;
            Ok(value)
        }
        Some(Resolved::Variable(_)) => Err(no_such_member(cx, &target, name, "setter")),
        None => {
            // Top-level variables without an explicit setter assign directly.
            if let Target::Library(library) = &target {
                if let Some(found) = cx.model().find_declaration(*library, getter_name(name))? {
                    if let Some(variable) = cx.model().entity(found)?.as_variable() {
                        if !variable.is_final && !variable.is_const {
                            cx.set_static_value(found, value.clone());
                            return Ok(value);
                        }
                    }
                }
            }
            Err(no_such_member(cx, &target, name, "setter"))
        }
    }
}

fn receiver_of(target: &Target<'_>) -> Option<Value> {
    match target {
        Target::Instance(value) => Some((*value).clone()),
        Target::Class(_) | Target::Library(_) => None,
    }
}

impl Session {
    /// Execute a resolved member the way `invoke` reaches it
    ///
    /// Getters are read first; when arguments were supplied the read value
    /// must be callable and is called. Invokers reuse this path so that a
    /// resolved member and a name-based `invoke` cannot diverge.
    pub(crate) fn invoke_resolved(
        cx: &Rc<Session>,
        receiver: Option<Value>,
        method_id: EntityId,
        positional: Vec<Value>,
        named: FxHashMap<String, Value>,
    ) -> ReflectResult<Value> {
        let method = cx.model().method(method_id)?;
        if method.is_getter() {
            let value =
                Session::call_method(cx, receiver, method_id, Vec::new(), FxHashMap::default())?;
            if positional.is_empty() && named.is_empty() {
                return Ok(value);
            }
            return call_value(value, positional, named);
        }
        Session::call_method(cx, receiver, method_id, positional, named)
    }

    /// Execute one member declaration: arity check, default filling, then
    /// the registered implementation or the synthetic fast path
    pub(crate) fn call_method(
        cx: &Rc<Session>,
        receiver: Option<Value>,
        method_id: EntityId,
        mut positional: Vec<Value>,
        mut named: FxHashMap<String, Value>,
    ) -> ReflectResult<Value> {
        let method = cx.model().method(method_id)?.clone();
        let parameters = cx.resolved_parameters(&method)?;
        cx.check_arity(&method, &parameters, &positional, &named)?;
        fill_defaults(&parameters, &mut positional, &mut named);
        if let Some(implementation) = cx.impls.get(method_id) {
            return implementation(
                cx,
                CallArgs {
                    receiver,
                    positional,
                    named,
                },
            );
        }
        if method.is_synthetic {
            return cx.synthetic_dispatch(&method, receiver, positional);
        }
        Err(ReflectError::Unsupported {
            message: format!(
                "no implementation registered for '{}'",
                cx.model().qualified_name(method_id)?
            ),
        })
    }

    /// Reify a method as a callable value bound to its receiver
    pub(crate) fn tear_off(
        cx: &Rc<Session>,
        receiver: Option<Value>,
        method_id: EntityId,
    ) -> ReflectResult<Value> {
        let name = cx.model().simple_name(method_id)?.to_string();
        let session = cx.clone();
        let function = FunctionRef::new(name, Some(method_id), move |positional, named| {
            Session::invoke_resolved(&session, receiver.clone(), method_id, positional, named)
        });
        Ok(Value::Function(function))
    }

    fn resolved_parameters(&self, method: &MethodEntity) -> ReflectResult<Vec<ParameterEntity>> {
        method
            .parameters
            .iter()
            .map(|&id| Ok(self.model().parameter(id)?.clone()))
            .collect()
    }

    /// Reject argument shapes the declaration cannot accept
    fn check_arity(
        &self,
        method: &MethodEntity,
        parameters: &[ParameterEntity],
        positional: &[Value],
        named: &FxHashMap<String, Value>,
    ) -> ReflectResult<()> {
        let required = parameters
            .iter()
            .filter(|p| !p.is_named && !p.is_optional)
            .count();
        let positional_total = parameters.iter().filter(|p| !p.is_named).count();
        let named_names: FxHashSet<&str> = parameters
            .iter()
            .filter(|p| p.is_named)
            .map(|p| p.simple_name.as_str())
            .collect();
        let shape_ok = positional.len() >= required
            && positional.len() <= positional_total
            && named.keys().all(|name| named_names.contains(name.as_str()));
        if shape_ok {
            return Ok(());
        }
        let target = match method.owner {
            Some(owner) => self.model().qualified_name(owner)?,
            None => "<detached>".to_string(),
        };
        Err(ReflectError::NoSuchMember {
            target,
            member: method.simple_name.clone(),
            kind: method_kind_str(method),
        })
    }

    /// Execute an implicit accessor or default constructor without a
    /// registered implementation
    fn synthetic_dispatch(
        &self,
        method: &MethodEntity,
        receiver: Option<Value>,
        positional: Vec<Value>,
    ) -> ReflectResult<Value> {
        match &method.kind {
            MethodKind::Getter => {
                let field = method.simple_name.as_str();
                if method.is_static {
                    let variable = self.synthetic_backing_field(method, field)?;
                    Ok(self.static_value(variable))
                } else {
                    let object = receiver
                        .as_ref()
                        .and_then(Value::as_object)
                        .ok_or_else(|| synthetic_misuse(method))?;
                    object.get_field(field).ok_or_else(|| synthetic_misuse(method))
                }
            }
            MethodKind::Setter => {
                let field = getter_name(&method.simple_name).to_string();
                let value = positional.into_iter().next().unwrap_or(Value::Null);
                if method.is_static {
                    let variable = self.synthetic_backing_field(method, &field)?;
                    self.set_static_value(variable, value.clone());
                } else {
                    let object = receiver
                        .as_ref()
                        .and_then(Value::as_object)
                        .ok_or_else(|| synthetic_misuse(method))?;
                    object
                        .set_field(&field, value.clone())
                        .map_err(|_| synthetic_misuse(method))?;
                }
                Ok(value)
            }
            // Default constructors have an empty body; allocation happens in
            // `newInstance` before the constructor runs.
            MethodKind::Constructor(_) => Ok(Value::Null),
            MethodKind::Regular { .. } => Err(synthetic_misuse(method)),
        }
    }

    /// The variable a synthetic static accessor reads and writes
    fn synthetic_backing_field(
        &self,
        method: &MethodEntity,
        field: &str,
    ) -> ReflectResult<EntityId> {
        let owner = method.owner.ok_or_else(|| synthetic_misuse(method))?;
        match self.model().find_declaration(owner, field)? {
            Some(variable) if self.model().entity(variable)?.as_variable().is_some() => {
                Ok(variable)
            }
            _ => Err(synthetic_misuse(method)),
        }
    }
}

/// Supply declared defaults for optional parameters the caller left out
fn fill_defaults(
    parameters: &[ParameterEntity],
    positional: &mut Vec<Value>,
    named: &mut FxHashMap<String, Value>,
) {
    let positional_params: Vec<&ParameterEntity> =
        parameters.iter().filter(|p| !p.is_named).collect();
    for parameter in positional_params.into_iter().skip(positional.len()) {
        positional.push(default_of(parameter));
    }
    for parameter in parameters.iter().filter(|p| p.is_named) {
        named
            .entry(parameter.simple_name.clone())
            .or_insert_with(|| default_of(parameter));
    }
}

fn default_of(parameter: &ParameterEntity) -> Value {
    parameter
        .default_value
        .as_ref()
        .map(Value::from_const)
        .unwrap_or(Value::Null)
}

fn method_kind_str(method: &MethodEntity) -> &'static str {
    match method.kind {
        MethodKind::Regular { .. } => "method",
        MethodKind::Getter => "getter",
        MethodKind::Setter => "setter",
        MethodKind::Constructor(_) => "constructor",
    }
}

fn synthetic_misuse(method: &MethodEntity) -> ReflectError {
    ReflectError::Unsupported {
        message: format!(
            "synthetic member '{}' has no backing storage for this receiver",
            method.simple_name
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_constructors() {
        let call = Invocation::method("scale", vec![Value::Int(2)], FxHashMap::default());
        assert!(call.is_method());
        assert_eq!(call.positional.len(), 1);

        let read = Invocation::getter("x");
        assert!(read.is_getter());
        assert!(read.positional.is_empty());

        let write = Invocation::setter("x", Value::Int(7));
        assert!(write.is_setter());
        assert_eq!(write.positional, vec![Value::Int(7)]);
    }

    #[test]
    fn test_fill_defaults_positional_and_named() {
        let mut scale = ParameterEntity::new("scale", mirra_model::TypeRef::Dynamic);
        scale.is_optional = true;
        scale.has_default_value = true;
        scale.default_value = Some(mirra_model::Const::Int(2));
        let mut label = ParameterEntity::new("label", mirra_model::TypeRef::Dynamic);
        label.is_named = true;
        label.is_optional = true;
        let parameters = vec![
            ParameterEntity::new("base", mirra_model::TypeRef::Dynamic),
            scale,
            label,
        ];

        let mut positional = vec![Value::Int(10)];
        let mut named = FxHashMap::default();
        fill_defaults(&parameters, &mut positional, &mut named);
        assert_eq!(positional, vec![Value::Int(10), Value::Int(2)]);
        assert_eq!(named.get("label"), Some(&Value::Null));
    }
}
