//! Function type, type variable, and typedef mirrors

use crate::mirrors::{mirror_kind, MethodMirror, ParameterMirror, TypeMirror};
use mirra_model::TypeRef;

mirror_kind! {
    /// A mirror over a structural function type
    FunctionTypeMirror
}

impl FunctionTypeMirror {
    fn function_type(&self) -> &mirra_model::FunctionTypeEntity {
        self.cx
            .entity_unchecked(self.id)
            .as_function_type()
            .unwrap_or_else(|| panic!("function type mirror over non-function-type {}", self.id))
    }

    /// Declared return type
    pub fn return_type(&self) -> TypeRef {
        self.function_type().return_type.clone()
    }

    /// Declared formal parameters, in order
    pub fn parameters(&self) -> Vec<ParameterMirror> {
        self.function_type()
            .parameters
            .iter()
            .map(|&id| ParameterMirror {
                cx: self.cx.clone(),
                id,
            })
            .collect()
    }

    /// The implicit `call` method of the function type, when modeled
    pub fn call_method(&self) -> Option<MethodMirror> {
        self.function_type().call_method.map(|id| MethodMirror {
            cx: self.cx.clone(),
            id,
        })
    }
}

impl TypeMirror for FunctionTypeMirror {}

mirror_kind! {
    /// A mirror over a formal type variable
    TypeVariableMirror
}

impl TypeVariableMirror {
    fn type_variable(&self) -> &mirra_model::TypeVariableEntity {
        self.cx
            .entity_unchecked(self.id)
            .as_type_variable()
            .unwrap_or_else(|| panic!("type variable mirror over non-type-variable {}", self.id))
    }

    /// Declared upper bound; dynamic when unbounded
    pub fn upper_bound(&self) -> TypeRef {
        self.type_variable().upper_bound.clone()
    }

    /// Type variables are never static members
    pub fn is_static(&self) -> bool {
        false
    }
}

impl TypeMirror for TypeVariableMirror {}

mirror_kind! {
    /// A mirror over a typedef declaration
    TypedefMirror
}

impl TypedefMirror {
    fn typedef(&self) -> &mirra_model::TypedefEntity {
        self.cx
            .entity_unchecked(self.id)
            .as_typedef()
            .unwrap_or_else(|| panic!("typedef mirror over non-typedef {}", self.id))
    }

    /// The function type the typedef names
    pub fn referent(&self) -> FunctionTypeMirror {
        FunctionTypeMirror {
            cx: self.cx.clone(),
            id: self.typedef().referent,
        }
    }
}

impl TypeMirror for TypedefMirror {}
