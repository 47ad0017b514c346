//! Entity records for the frozen program model
//!
//! Every named program entity is one variant of the closed [`Entity`] enum,
//! stored in the [`ProgramModel`](crate::model::ProgramModel) arena and
//! addressed by [`EntityId`]. Back-references (`owner`, dependency targets)
//! are ids into the arena, never owning edges.

use crate::location::SourceLocation;
use crate::ty::TypeRef;
use std::fmt;

/// Simple names starting with this character denote private declarations.
pub const PRIVACY_MARKER: char = '_';

/// Trailing marker distinguishing a setter from the getter of the same name.
pub const SETTER_SUFFIX: char = '=';

/// Unique identifier of an entity in the program model arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub(crate) u32);

impl EntityId {
    /// Construct an id from a raw arena index
    ///
    /// Intended for generator tooling and tests; ids that do not name an
    /// entity are rejected by every model query.
    pub fn from_raw(raw: u32) -> Self {
        EntityId(raw)
    }

    /// The raw arena index
    pub fn as_u32(self) -> u32 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

/// Compile-time constant value attached to declarations
///
/// Metadata annotations and parameter defaults are constants of the modeled
/// program, surfaced to callers as base values by the mirror layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Const {
    /// The absent value
    Null,
    /// A boolean constant
    Bool(bool),
    /// An integer constant
    Int(i64),
    /// A floating-point constant
    Float(f64),
    /// A string constant
    Str(String),
    /// An opaque symbolic constant, carried as its source text
    Symbol(String),
}

impl fmt::Display for Const {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Const::Null => write!(f, "null"),
            Const::Bool(b) => write!(f, "{}", b),
            Const::Int(i) => write!(f, "{}", i),
            Const::Float(x) => write!(f, "{}", x),
            Const::Str(s) => write!(f, "{:?}", s),
            Const::Symbol(s) => write!(f, "{}", s),
        }
    }
}

/// A library: the top of every owner chain
#[derive(Debug, Clone)]
pub struct LibraryEntity {
    /// Library name (also its simple name)
    pub simple_name: String,
    /// Canonical URI of the library
    pub uri: String,
    /// Entities declared directly in the library, in declaration order
    pub declarations: Vec<EntityId>,
    /// Import/export edges, in source order
    pub dependencies: Vec<LibraryDependency>,
    /// Source span, absent for synthetic libraries
    pub location: Option<SourceLocation>,
    /// Annotation constants, in source order
    pub metadata: Vec<Const>,
}

impl LibraryEntity {
    /// Create an empty library
    pub fn new(name: impl Into<String>, uri: impl Into<String>) -> Self {
        LibraryEntity {
            simple_name: name.into(),
            uri: uri.into(),
            declarations: Vec::new(),
            dependencies: Vec::new(),
            location: None,
            metadata: Vec::new(),
        }
    }
}

/// An import or export edge between two libraries
#[derive(Debug, Clone)]
pub struct LibraryDependency {
    /// Import or export
    pub kind: DependencyKind,
    /// Whether the dependency is deferred
    pub is_deferred: bool,
    /// The library the directive appears in
    pub source_library: EntityId,
    /// The imported/exported library, absent when unresolved or not loaded
    pub target_library: Option<EntityId>,
    /// Import prefix, absent unless a prefixed import
    pub prefix: Option<String>,
    /// Show/hide filters, in source order
    pub combinators: Vec<Combinator>,
    /// Source span of the directive
    pub location: Option<SourceLocation>,
    /// Annotation constants on the directive
    pub metadata: Vec<Const>,
}

impl LibraryDependency {
    /// True for import edges
    pub fn is_import(&self) -> bool {
        self.kind == DependencyKind::Import
    }

    /// True for export edges
    pub fn is_export(&self) -> bool {
        self.kind == DependencyKind::Export
    }
}

/// Kind of a library dependency edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    /// An `import` directive
    Import,
    /// An `export` directive
    Export,
}

/// A show/hide filter on a library dependency
#[derive(Debug, Clone)]
pub struct Combinator {
    /// Filtered identifiers, in source order
    pub identifiers: Vec<String>,
    /// Show or hide
    pub kind: CombinatorKind,
}

impl Combinator {
    /// True for `show` combinators
    pub fn is_show(&self) -> bool {
        self.kind == CombinatorKind::Show
    }

    /// True for `hide` combinators
    pub fn is_hide(&self) -> bool {
        self.kind == CombinatorKind::Hide
    }
}

/// Kind of a combinator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombinatorKind {
    /// `show a, b`
    Show,
    /// `hide a, b`
    Hide,
}

/// A class declaration or a generic class instantiation
#[derive(Debug, Clone)]
pub struct ClassEntity {
    /// Simple name of the class
    pub simple_name: String,
    /// Owning library (or enclosing declaration)
    pub owner: Option<EntityId>,
    /// Superclass, absent only for the root class
    pub superclass: Option<EntityId>,
    /// Implemented interfaces, in declaration order
    pub superinterfaces: Vec<EntityId>,
    /// Applied mixin class, absent when the class is not a mixin application
    pub mixin: Option<EntityId>,
    /// Whether the class is abstract
    pub is_abstract: bool,
    /// Whether the class is an enum
    pub is_enum: bool,
    /// Type variables, as declared
    pub type_variables: Vec<EntityId>,
    /// Bound type arguments; empty unless this is an instantiation
    pub type_arguments: Vec<TypeRef>,
    /// The uninstantiated generic; absent when this is the original declaration
    pub original: Option<EntityId>,
    /// Entities declared directly in the class, in declaration order
    pub declarations: Vec<EntityId>,
    /// Synthesized implicit field accessors (populated at build time)
    pub implicit_accessors: Vec<EntityId>,
    /// Source span, absent for synthetic classes
    pub location: Option<SourceLocation>,
    /// Annotation constants
    pub metadata: Vec<Const>,
}

impl ClassEntity {
    /// Create a class with no members and no supertypes
    pub fn new(name: impl Into<String>) -> Self {
        ClassEntity {
            simple_name: name.into(),
            owner: None,
            superclass: None,
            superinterfaces: Vec::new(),
            mixin: None,
            is_abstract: false,
            is_enum: false,
            type_variables: Vec::new(),
            type_arguments: Vec::new(),
            original: None,
            declarations: Vec::new(),
            implicit_accessors: Vec::new(),
            location: None,
            metadata: Vec::new(),
        }
    }

    /// True when this class has no bound type arguments
    pub fn is_original_declaration(&self) -> bool {
        self.original.is_none()
    }
}

/// A function type, with its synthesized call signature
#[derive(Debug, Clone)]
pub struct FunctionTypeEntity {
    /// Simple name ("Function" unless aliased)
    pub simple_name: String,
    /// Owning library or enclosing declaration
    pub owner: Option<EntityId>,
    /// Return type of the signature
    pub return_type: TypeRef,
    /// Parameters, in declaration order
    pub parameters: Vec<EntityId>,
    /// The synthesized `call` method describing the signature
    pub call_method: Option<EntityId>,
    /// Type variables, for generic function types
    pub type_variables: Vec<EntityId>,
    /// Source span
    pub location: Option<SourceLocation>,
    /// Annotation constants
    pub metadata: Vec<Const>,
}

impl FunctionTypeEntity {
    /// Create a function type with the given return type
    pub fn new(name: impl Into<String>, return_type: TypeRef) -> Self {
        FunctionTypeEntity {
            simple_name: name.into(),
            owner: None,
            return_type,
            parameters: Vec::new(),
            call_method: None,
            type_variables: Vec::new(),
            location: None,
            metadata: Vec::new(),
        }
    }
}

/// A type variable of a generic declaration
#[derive(Debug, Clone)]
pub struct TypeVariableEntity {
    /// Simple name of the type variable
    pub simple_name: String,
    /// The generic declaration that declares it
    pub owner: Option<EntityId>,
    /// Declared upper bound; `dynamic` when unbounded
    pub upper_bound: TypeRef,
    /// Source span
    pub location: Option<SourceLocation>,
    /// Annotation constants
    pub metadata: Vec<Const>,
}

impl TypeVariableEntity {
    /// Create an unbounded type variable
    pub fn new(name: impl Into<String>) -> Self {
        TypeVariableEntity {
            simple_name: name.into(),
            owner: None,
            upper_bound: TypeRef::Dynamic,
            location: None,
            metadata: Vec::new(),
        }
    }
}

/// A typedef: a named alias expanding to a function type
#[derive(Debug, Clone)]
pub struct TypedefEntity {
    /// Simple name of the alias
    pub simple_name: String,
    /// Owning library
    pub owner: Option<EntityId>,
    /// The function type the alias expands to
    pub referent: EntityId,
    /// Type variables, for generic typedefs
    pub type_variables: Vec<EntityId>,
    /// Source span
    pub location: Option<SourceLocation>,
    /// Annotation constants
    pub metadata: Vec<Const>,
}

/// Classification of a method declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    /// An ordinary method; operators are regular methods
    Regular {
        /// True for operator declarations
        is_operator: bool,
    },
    /// An explicit or implicit getter
    Getter,
    /// An explicit or implicit setter
    Setter,
    /// A constructor
    Constructor(ConstructorKind),
}

/// Classification of a constructor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructorKind {
    /// A generative constructor; allocates the receiver before the body runs
    Generative {
        /// True for redirecting generative constructors
        is_redirecting: bool,
        /// True for const constructors
        is_const: bool,
    },
    /// A factory constructor; classified as static
    Factory {
        /// True for redirecting factories
        is_redirecting: bool,
        /// True for const factories
        is_const: bool,
    },
}

/// A method, getter, setter, or constructor declaration
#[derive(Debug, Clone)]
pub struct MethodEntity {
    /// Simple name; setters keep the trailing `=`
    pub simple_name: String,
    /// Enclosing class, function type, or library
    pub owner: Option<EntityId>,
    /// Classification of this method
    pub kind: MethodKind,
    /// Constructor name; empty unless a named constructor or factory
    pub constructor_name: String,
    /// Whether the method is static (factories are; other constructors are not)
    pub is_static: bool,
    /// Whether the method is abstract
    pub is_abstract: bool,
    /// True for compiler-introduced members (implicit accessors, default constructors)
    pub is_synthetic: bool,
    /// Declared return type
    pub return_type: TypeRef,
    /// Parameters, in declaration order
    pub parameters: Vec<EntityId>,
    /// Source text of the declaration, when captured
    pub source: Option<String>,
    /// Source span
    pub location: Option<SourceLocation>,
    /// Annotation constants
    pub metadata: Vec<Const>,
}

impl MethodEntity {
    /// Create a method of the given kind with defaults for everything else
    pub fn new(name: impl Into<String>, kind: MethodKind, return_type: TypeRef) -> Self {
        let is_static = matches!(kind, MethodKind::Constructor(ConstructorKind::Factory { .. }));
        MethodEntity {
            simple_name: name.into(),
            owner: None,
            kind,
            constructor_name: String::new(),
            is_static,
            is_abstract: false,
            is_synthetic: false,
            return_type,
            parameters: Vec::new(),
            source: None,
            location: None,
            metadata: Vec::new(),
        }
    }

    /// True for ordinary methods (operators included)
    pub fn is_regular_method(&self) -> bool {
        matches!(self.kind, MethodKind::Regular { .. })
    }

    /// True for operator declarations; implies `is_regular_method`
    pub fn is_operator(&self) -> bool {
        matches!(self.kind, MethodKind::Regular { is_operator: true })
    }

    /// True for getters
    pub fn is_getter(&self) -> bool {
        self.kind == MethodKind::Getter
    }

    /// True for setters
    pub fn is_setter(&self) -> bool {
        self.kind == MethodKind::Setter
    }

    /// True for constructors of any kind
    pub fn is_constructor(&self) -> bool {
        matches!(self.kind, MethodKind::Constructor(_))
    }

    /// True for generative constructors
    pub fn is_generative_constructor(&self) -> bool {
        matches!(self.kind, MethodKind::Constructor(ConstructorKind::Generative { .. }))
    }

    /// True for factory constructors
    pub fn is_factory_constructor(&self) -> bool {
        matches!(self.kind, MethodKind::Constructor(ConstructorKind::Factory { .. }))
    }

    /// True for redirecting constructors of either kind
    pub fn is_redirecting_constructor(&self) -> bool {
        matches!(
            self.kind,
            MethodKind::Constructor(ConstructorKind::Generative { is_redirecting: true, .. })
                | MethodKind::Constructor(ConstructorKind::Factory { is_redirecting: true, .. })
        )
    }

    /// True for const constructors of either kind
    pub fn is_const_constructor(&self) -> bool {
        matches!(
            self.kind,
            MethodKind::Constructor(ConstructorKind::Generative { is_const: true, .. })
                | MethodKind::Constructor(ConstructorKind::Factory { is_const: true, .. })
        )
    }
}

/// A field or top-level variable declaration
#[derive(Debug, Clone)]
pub struct VariableEntity {
    /// Simple name of the variable
    pub simple_name: String,
    /// Enclosing class or library
    pub owner: Option<EntityId>,
    /// Declared type
    pub ty: TypeRef,
    /// Whether the variable is static; top-level variables are implicitly static
    pub is_static: bool,
    /// Whether the variable is final
    pub is_final: bool,
    /// Whether the variable is const
    pub is_const: bool,
    /// Source span
    pub location: Option<SourceLocation>,
    /// Annotation constants
    pub metadata: Vec<Const>,
}

impl VariableEntity {
    /// Create a non-static, non-final variable
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        VariableEntity {
            simple_name: name.into(),
            owner: None,
            ty,
            is_static: false,
            is_final: false,
            is_const: false,
            location: None,
            metadata: Vec::new(),
        }
    }
}

/// A formal parameter of a method or function type
#[derive(Debug, Clone)]
pub struct ParameterEntity {
    /// Simple name of the parameter
    pub simple_name: String,
    /// The declaring method or function type
    pub owner: Option<EntityId>,
    /// Declared type
    pub ty: TypeRef,
    /// Whether the parameter is optional
    pub is_optional: bool,
    /// Whether the parameter is named
    pub is_named: bool,
    /// Whether a default value was declared
    pub has_default_value: bool,
    /// Declared default; absent for required parameters and undeclared defaults
    pub default_value: Option<Const>,
    /// Whether the parameter is final
    pub is_final: bool,
    /// Source span
    pub location: Option<SourceLocation>,
    /// Annotation constants
    pub metadata: Vec<Const>,
}

impl ParameterEntity {
    /// Create a required positional parameter
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        ParameterEntity {
            simple_name: name.into(),
            owner: None,
            ty,
            is_optional: false,
            is_named: false,
            has_default_value: false,
            default_value: None,
            is_final: false,
            location: None,
            metadata: Vec::new(),
        }
    }
}

/// A named program entity in the model arena
///
/// The kind set is closed; call sites that need kind-specific behavior match
/// exhaustively.
#[derive(Debug, Clone)]
pub enum Entity {
    /// A library
    Library(LibraryEntity),
    /// A class or class instantiation
    Class(ClassEntity),
    /// A function type
    FunctionType(FunctionTypeEntity),
    /// A type variable
    TypeVariable(TypeVariableEntity),
    /// A typedef
    Typedef(TypedefEntity),
    /// A method, getter, setter, or constructor
    Method(MethodEntity),
    /// A field or top-level variable
    Variable(VariableEntity),
    /// A formal parameter
    Parameter(ParameterEntity),
}

impl Entity {
    /// Simple name of the entity
    pub fn simple_name(&self) -> &str {
        match self {
            Entity::Library(e) => &e.simple_name,
            Entity::Class(e) => &e.simple_name,
            Entity::FunctionType(e) => &e.simple_name,
            Entity::TypeVariable(e) => &e.simple_name,
            Entity::Typedef(e) => &e.simple_name,
            Entity::Method(e) => &e.simple_name,
            Entity::Variable(e) => &e.simple_name,
            Entity::Parameter(e) => &e.simple_name,
        }
    }

    /// Owner back-reference; absent for libraries
    pub fn owner(&self) -> Option<EntityId> {
        match self {
            Entity::Library(_) => None,
            Entity::Class(e) => e.owner,
            Entity::FunctionType(e) => e.owner,
            Entity::TypeVariable(e) => e.owner,
            Entity::Typedef(e) => e.owner,
            Entity::Method(e) => e.owner,
            Entity::Variable(e) => e.owner,
            Entity::Parameter(e) => e.owner,
        }
    }

    /// Source span; absent for synthetic entities
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            Entity::Library(e) => e.location.as_ref(),
            Entity::Class(e) => e.location.as_ref(),
            Entity::FunctionType(e) => e.location.as_ref(),
            Entity::TypeVariable(e) => e.location.as_ref(),
            Entity::Typedef(e) => e.location.as_ref(),
            Entity::Method(e) => e.location.as_ref(),
            Entity::Variable(e) => e.location.as_ref(),
            Entity::Parameter(e) => e.location.as_ref(),
        }
    }

    /// Annotation constants attached to the entity, in source order
    pub fn metadata(&self) -> &[Const] {
        match self {
            Entity::Library(e) => &e.metadata,
            Entity::Class(e) => &e.metadata,
            Entity::FunctionType(e) => &e.metadata,
            Entity::TypeVariable(e) => &e.metadata,
            Entity::Typedef(e) => &e.metadata,
            Entity::Method(e) => &e.metadata,
            Entity::Variable(e) => &e.metadata,
            Entity::Parameter(e) => &e.metadata,
        }
    }

    /// Whether the simple name carries the privacy marker; always false for libraries
    pub fn is_private(&self) -> bool {
        if matches!(self, Entity::Library(_)) {
            return false;
        }
        self.simple_name().starts_with(PRIVACY_MARKER)
    }

    /// Kind name for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Entity::Library(_) => "library",
            Entity::Class(_) => "class",
            Entity::FunctionType(_) => "function type",
            Entity::TypeVariable(_) => "type variable",
            Entity::Typedef(_) => "typedef",
            Entity::Method(_) => "method",
            Entity::Variable(_) => "variable",
            Entity::Parameter(_) => "parameter",
        }
    }

    /// Get the library record if this is a library
    pub fn as_library(&self) -> Option<&LibraryEntity> {
        match self {
            Entity::Library(e) => Some(e),
            _ => None,
        }
    }

    /// Get the class record if this is a class
    pub fn as_class(&self) -> Option<&ClassEntity> {
        match self {
            Entity::Class(e) => Some(e),
            _ => None,
        }
    }

    /// Get the method record if this is a method
    pub fn as_method(&self) -> Option<&MethodEntity> {
        match self {
            Entity::Method(e) => Some(e),
            _ => None,
        }
    }

    /// Get the variable record if this is a variable
    pub fn as_variable(&self) -> Option<&VariableEntity> {
        match self {
            Entity::Variable(e) => Some(e),
            _ => None,
        }
    }

    /// Get the parameter record if this is a parameter
    pub fn as_parameter(&self) -> Option<&ParameterEntity> {
        match self {
            Entity::Parameter(e) => Some(e),
            _ => None,
        }
    }

    /// Get the function type record if this is a function type
    pub fn as_function_type(&self) -> Option<&FunctionTypeEntity> {
        match self {
            Entity::FunctionType(e) => Some(e),
            _ => None,
        }
    }

    /// Get the type variable record if this is a type variable
    pub fn as_type_variable(&self) -> Option<&TypeVariableEntity> {
        match self {
            Entity::TypeVariable(e) => Some(e),
            _ => None,
        }
    }

    /// Get the typedef record if this is a typedef
    pub fn as_typedef(&self) -> Option<&TypedefEntity> {
        match self {
            Entity::Typedef(e) => Some(e),
            _ => None,
        }
    }
}

/// Strip a trailing setter marker from a member name, if present
pub fn getter_name(name: &str) -> &str {
    name.strip_suffix(SETTER_SUFFIX).unwrap_or(name)
}

/// Append the setter marker to a member name, unless already present
pub fn setter_name(name: &str) -> String {
    if name.ends_with(SETTER_SUFFIX) {
        name.to_string()
    } else {
        format!("{}{}", name, SETTER_SUFFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privacy_marker() {
        let public = Entity::Variable(VariableEntity::new("count", TypeRef::Dynamic));
        let private = Entity::Variable(VariableEntity::new("_count", TypeRef::Dynamic));
        assert!(!public.is_private());
        assert!(private.is_private());

        // Libraries are never private, marker or not.
        let lib = Entity::Library(LibraryEntity::new("_secrets", "package:demo/_secrets.mirra"));
        assert!(!lib.is_private());
    }

    #[test]
    fn test_method_flags_regular_and_operator() {
        let m = MethodEntity::new("plus", MethodKind::Regular { is_operator: true }, TypeRef::Dynamic);
        assert!(m.is_regular_method());
        assert!(m.is_operator());
        assert!(!m.is_getter());
        assert!(!m.is_constructor());
        assert!(!m.is_static);
    }

    #[test]
    fn test_factory_constructors_are_static() {
        let factory = MethodEntity::new(
            "Point.unit",
            MethodKind::Constructor(ConstructorKind::Factory {
                is_redirecting: false,
                is_const: false,
            }),
            TypeRef::Dynamic,
        );
        assert!(factory.is_constructor());
        assert!(factory.is_factory_constructor());
        assert!(factory.is_static);

        let generative = MethodEntity::new(
            "Point",
            MethodKind::Constructor(ConstructorKind::Generative {
                is_redirecting: false,
                is_const: false,
            }),
            TypeRef::Dynamic,
        );
        assert!(generative.is_generative_constructor());
        assert!(!generative.is_static);
    }

    #[test]
    fn test_constructor_subflags() {
        let redirecting = MethodEntity::new(
            "Point.origin",
            MethodKind::Constructor(ConstructorKind::Generative {
                is_redirecting: true,
                is_const: true,
            }),
            TypeRef::Dynamic,
        );
        assert!(redirecting.is_redirecting_constructor());
        assert!(redirecting.is_const_constructor());
    }

    #[test]
    fn test_dependency_kind_exclusive() {
        let dep = LibraryDependency {
            kind: DependencyKind::Import,
            is_deferred: false,
            source_library: EntityId::from_raw(0),
            target_library: None,
            prefix: None,
            combinators: Vec::new(),
            location: None,
            metadata: Vec::new(),
        };
        assert!(dep.is_import() != dep.is_export());
    }

    #[test]
    fn test_combinator_kind_exclusive() {
        let show = Combinator {
            identifiers: vec!["a".to_string()],
            kind: CombinatorKind::Show,
        };
        assert!(show.is_show() != show.is_hide());
    }

    #[test]
    fn test_setter_name_helpers() {
        assert_eq!(setter_name("x"), "x=");
        assert_eq!(setter_name("x="), "x=");
        assert_eq!(getter_name("x="), "x");
        assert_eq!(getter_name("x"), "x");
    }
}
