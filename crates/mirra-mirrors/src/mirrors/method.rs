//! Method mirrors

use crate::error::{ReflectError, ReflectResult};
use crate::mirrors::{erase, mirror_kind, DeclarationMirror, ParameterMirror};
use mirra_model::{CapabilityKind, RuntimeType, TypeRef};

mirror_kind! {
    /// A mirror over a method, getter, setter, or constructor
    MethodMirror
}

impl MethodMirror {
    fn method(&self) -> &mirra_model::MethodEntity {
        self.cx
            .entity_unchecked(self.id)
            .as_method()
            .unwrap_or_else(|| panic!("method mirror over non-method {}", self.id))
    }

    /// True for ordinary methods, operators included
    pub fn is_regular_method(&self) -> bool {
        self.method().is_regular_method()
    }

    /// True for operator declarations
    pub fn is_operator(&self) -> bool {
        self.method().is_operator()
    }

    /// True for getters, implicit ones included
    pub fn is_getter(&self) -> bool {
        self.method().is_getter()
    }

    /// True for setters; the simple name keeps the trailing `=`
    pub fn is_setter(&self) -> bool {
        self.method().is_setter()
    }

    /// True for constructors of any kind
    pub fn is_constructor(&self) -> bool {
        self.method().is_constructor()
    }

    /// True for generative constructors
    pub fn is_generative_constructor(&self) -> bool {
        self.method().is_generative_constructor()
    }

    /// True for factory constructors
    pub fn is_factory_constructor(&self) -> bool {
        self.method().is_factory_constructor()
    }

    /// True for redirecting constructors of either kind
    pub fn is_redirecting_constructor(&self) -> bool {
        self.method().is_redirecting_constructor()
    }

    /// True for const constructors of either kind
    pub fn is_const_constructor(&self) -> bool {
        self.method().is_const_constructor()
    }

    /// Whether the member is static; factories are, other constructors are
    /// not
    pub fn is_static(&self) -> bool {
        self.method().is_static
    }

    /// Whether the member is abstract
    pub fn is_abstract(&self) -> bool {
        self.method().is_abstract
    }

    /// True for compiler-introduced members: implicit accessors and
    /// synthesized default constructors
    pub fn is_synthetic(&self) -> bool {
        self.method().is_synthetic
    }

    /// Constructor name; empty for the unnamed constructor and non-constructors
    pub fn constructor_name(&self) -> String {
        self.method().constructor_name.clone()
    }

    /// Declared formal parameters, in order
    pub fn parameters(&self) -> Vec<ParameterMirror> {
        self.method()
            .parameters
            .iter()
            .map(|&id| ParameterMirror {
                cx: self.cx.clone(),
                id,
            })
            .collect()
    }

    /// Declared return type
    pub fn return_type(&self) -> TypeRef {
        self.method().return_type.clone()
    }

    /// The reified return type, gated on the reflected-type capability
    pub fn reflected_return_type(&self) -> ReflectResult<RuntimeType> {
        self.cx
            .require_grant(self.id, CapabilityKind::ReflectedType)?;
        let ty = self.method().return_type.clone();
        if self.cx.model().contains_free_type_variables(&ty)? {
            return Err(ReflectError::Unsupported {
                message: format!(
                    "return type of '{}' contains unresolved type variables",
                    self.qualified_name()
                ),
            });
        }
        Ok(RuntimeType::new(ty))
    }

    /// Whether [`MethodMirror::reflected_return_type`] would succeed
    pub fn has_reflected_return_type(&self) -> bool {
        self.cx.is_granted(self.id, CapabilityKind::ReflectedType)
            && !self
                .cx
                .model()
                .contains_free_type_variables(&self.method().return_type)
                .unwrap_or(true)
    }

    /// The erased reified return type: type arguments become dynamic
    pub fn dynamic_reflected_return_type(&self) -> ReflectResult<RuntimeType> {
        self.cx
            .require_grant(self.id, CapabilityKind::DynamicReflectedType)?;
        let ty = erase(&self.method().return_type);
        if self.cx.model().contains_free_type_variables(&ty)? {
            return Err(ReflectError::Unsupported {
                message: format!(
                    "return type of '{}' has no erased runtime form",
                    self.qualified_name()
                ),
            });
        }
        Ok(RuntimeType::new(ty))
    }

    /// Whether [`MethodMirror::dynamic_reflected_return_type`] would succeed
    pub fn has_dynamic_reflected_return_type(&self) -> bool {
        self.cx
            .is_granted(self.id, CapabilityKind::DynamicReflectedType)
            && !self
                .cx
                .model()
                .contains_free_type_variables(&erase(&self.method().return_type))
                .unwrap_or(true)
    }

    /// Source text of the declaration, when captured
    pub fn source(&self) -> Option<String> {
        self.method().source.clone()
    }
}
