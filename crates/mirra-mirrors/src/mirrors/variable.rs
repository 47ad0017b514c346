//! Variable and parameter mirrors

use crate::error::{ReflectError, ReflectResult};
use crate::mirrors::{erase, mirror_kind, DeclarationMirror};
use crate::value::Value;
use mirra_model::{CapabilityKind, RuntimeType, TypeRef};

mirror_kind! {
    /// A mirror over a field or top-level variable
    VariableMirror
}

impl VariableMirror {
    fn variable(&self) -> &mirra_model::VariableEntity {
        self.cx
            .entity_unchecked(self.id)
            .as_variable()
            .unwrap_or_else(|| panic!("variable mirror over non-variable {}", self.id))
    }

    /// Whether the variable is static; top-level variables are
    pub fn is_static(&self) -> bool {
        self.variable().is_static
    }

    /// Whether the variable is final
    pub fn is_final(&self) -> bool {
        self.variable().is_final
    }

    /// Whether the variable is const
    pub fn is_const(&self) -> bool {
        self.variable().is_const
    }

    /// Declared type of the variable
    pub fn variable_type(&self) -> TypeRef {
        self.variable().ty.clone()
    }

    /// The reified declared type, gated on the reflected-type capability
    pub fn reflected_variable_type(&self) -> ReflectResult<RuntimeType> {
        self.cx
            .require_grant(self.id, CapabilityKind::ReflectedType)?;
        let ty = self.variable().ty.clone();
        if self.cx.model().contains_free_type_variables(&ty)? {
            return Err(ReflectError::Unsupported {
                message: format!(
                    "type of '{}' contains unresolved type variables",
                    self.qualified_name()
                ),
            });
        }
        Ok(RuntimeType::new(ty))
    }

    /// Whether [`VariableMirror::reflected_variable_type`] would succeed
    pub fn has_reflected_variable_type(&self) -> bool {
        self.cx.is_granted(self.id, CapabilityKind::ReflectedType)
            && !self
                .cx
                .model()
                .contains_free_type_variables(&self.variable().ty)
                .unwrap_or(true)
    }

    /// The erased reified type: type arguments become dynamic
    pub fn dynamic_reflected_variable_type(&self) -> ReflectResult<RuntimeType> {
        self.cx
            .require_grant(self.id, CapabilityKind::DynamicReflectedType)?;
        let ty = erase(&self.variable().ty);
        if self.cx.model().contains_free_type_variables(&ty)? {
            return Err(ReflectError::Unsupported {
                message: format!(
                    "type of '{}' has no erased runtime form",
                    self.qualified_name()
                ),
            });
        }
        Ok(RuntimeType::new(ty))
    }

    /// Whether [`VariableMirror::dynamic_reflected_variable_type`] would succeed
    pub fn has_dynamic_reflected_variable_type(&self) -> bool {
        self.cx
            .is_granted(self.id, CapabilityKind::DynamicReflectedType)
            && !self
                .cx
                .model()
                .contains_free_type_variables(&erase(&self.variable().ty))
                .unwrap_or(true)
    }
}

mirror_kind! {
    /// A mirror over a formal parameter
    ParameterMirror
}

impl ParameterMirror {
    fn parameter(&self) -> &mirra_model::ParameterEntity {
        self.cx
            .entity_unchecked(self.id)
            .as_parameter()
            .unwrap_or_else(|| panic!("parameter mirror over non-parameter {}", self.id))
    }

    /// Whether the parameter is optional
    pub fn is_optional(&self) -> bool {
        self.parameter().is_optional
    }

    /// Whether the parameter is named
    pub fn is_named(&self) -> bool {
        self.parameter().is_named
    }

    /// Whether the parameter is final
    pub fn is_final(&self) -> bool {
        self.parameter().is_final
    }

    /// Whether a default value was declared
    pub fn has_default_value(&self) -> bool {
        self.parameter().has_default_value
    }

    /// The declared default, absent for required parameters and
    /// undeclared defaults
    pub fn default_value(&self) -> Option<Value> {
        self.parameter().default_value.as_ref().map(Value::from_const)
    }

    /// Declared type of the parameter
    pub fn parameter_type(&self) -> TypeRef {
        self.parameter().ty.clone()
    }

    /// The reified declared type, gated on the reflected-type capability
    pub fn reflected_parameter_type(&self) -> ReflectResult<RuntimeType> {
        self.cx
            .require_grant(self.id, CapabilityKind::ReflectedType)?;
        let ty = self.parameter().ty.clone();
        if self.cx.model().contains_free_type_variables(&ty)? {
            return Err(ReflectError::Unsupported {
                message: format!(
                    "type of '{}' contains unresolved type variables",
                    self.qualified_name()
                ),
            });
        }
        Ok(RuntimeType::new(ty))
    }

    /// Whether [`ParameterMirror::reflected_parameter_type`] would succeed
    pub fn has_reflected_parameter_type(&self) -> bool {
        self.cx.is_granted(self.id, CapabilityKind::ReflectedType)
            && !self
                .cx
                .model()
                .contains_free_type_variables(&self.parameter().ty)
                .unwrap_or(true)
    }

    /// The erased reified type: type arguments become dynamic
    pub fn dynamic_reflected_parameter_type(&self) -> ReflectResult<RuntimeType> {
        self.cx
            .require_grant(self.id, CapabilityKind::DynamicReflectedType)?;
        let ty = erase(&self.parameter().ty);
        if self.cx.model().contains_free_type_variables(&ty)? {
            return Err(ReflectError::Unsupported {
                message: format!(
                    "type of '{}' has no erased runtime form",
                    self.qualified_name()
                ),
            });
        }
        Ok(RuntimeType::new(ty))
    }

    /// Whether [`ParameterMirror::dynamic_reflected_parameter_type`] would succeed
    pub fn has_dynamic_reflected_parameter_type(&self) -> bool {
        self.cx
            .is_granted(self.id, CapabilityKind::DynamicReflectedType)
            && !self
                .cx
                .model()
                .contains_free_type_variables(&erase(&self.parameter().ty))
                .unwrap_or(true)
    }
}
