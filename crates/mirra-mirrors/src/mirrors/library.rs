//! Library mirrors

use crate::error::ReflectResult;
use crate::invoke::{self, Target};
use crate::mirrors::{mirror_kind, Mirror, ObjectMirror};
use crate::session::Session;
use crate::value::Value;
use mirra_model::{Combinator, EntityId, LibraryDependency, SourceLocation};
use rustc_hash::FxHashMap;
use std::rc::Rc;

mirror_kind! {
    /// A mirror over one library
    LibraryMirror
}

impl LibraryMirror {
    fn library(&self) -> &mirra_model::LibraryEntity {
        self.cx
            .entity_unchecked(self.id)
            .as_library()
            .unwrap_or_else(|| panic!("library mirror over non-library {}", self.id))
    }

    /// Canonical URI of the library
    pub fn uri(&self) -> String {
        self.library().uri.clone()
    }

    /// Top-level declarations keyed by simple name
    pub fn declarations(&self) -> ReflectResult<FxHashMap<String, Mirror>> {
        let map = self.cx.model().declarations_of(self.id)?;
        Ok(map
            .into_iter()
            .map(|(name, id)| (name, Mirror::of(&self.cx, id)))
            .collect())
    }

    /// Import and export edges of the library, in source order
    pub fn dependencies(&self) -> Vec<LibraryDependencyMirror> {
        (0..self.library().dependencies.len())
            .map(|index| LibraryDependencyMirror {
                cx: self.cx.clone(),
                library: self.id,
                index,
            })
            .collect()
    }
}

impl ObjectMirror for LibraryMirror {
    fn invoke(
        &self,
        member_name: &str,
        positional: Vec<Value>,
        named: FxHashMap<String, Value>,
    ) -> ReflectResult<Value> {
        invoke::invoke_member(
            &self.cx,
            Target::Library(self.id),
            member_name,
            positional,
            named,
        )
    }

    fn invoke_getter(&self, name: &str) -> ReflectResult<Value> {
        invoke::get_member(&self.cx, Target::Library(self.id), name)
    }

    fn invoke_setter(&self, name: &str, value: Value) -> ReflectResult<Value> {
        invoke::set_member(&self.cx, Target::Library(self.id), name, value)
    }
}

/// A mirror over one import or export edge
///
/// Dependency edges are not named declarations; they identify themselves by
/// source library and position.
#[derive(Clone)]
pub struct LibraryDependencyMirror {
    cx: Rc<Session>,
    library: EntityId,
    index: usize,
}

impl LibraryDependencyMirror {
    fn dependency(&self) -> &LibraryDependency {
        let library = self
            .cx
            .entity_unchecked(self.library)
            .as_library()
            .unwrap_or_else(|| panic!("dependency mirror over non-library {}", self.library));
        &library.dependencies[self.index]
    }

    /// True for import edges; an edge is an import xor an export
    pub fn is_import(&self) -> bool {
        self.dependency().is_import()
    }

    /// True for export edges
    pub fn is_export(&self) -> bool {
        self.dependency().is_export()
    }

    /// Whether the dependency is deferred
    pub fn is_deferred(&self) -> bool {
        self.dependency().is_deferred
    }

    /// The library containing the directive
    pub fn source_library(&self) -> LibraryMirror {
        LibraryMirror {
            cx: self.cx.clone(),
            id: self.library,
        }
    }

    /// The imported or exported library, absent when not loaded
    pub fn target_library(&self) -> Option<LibraryMirror> {
        self.dependency().target_library.map(|id| LibraryMirror {
            cx: self.cx.clone(),
            id,
        })
    }

    /// Import prefix, absent unless a prefixed import
    pub fn prefix(&self) -> Option<String> {
        self.dependency().prefix.clone()
    }

    /// Show/hide filters, in source order
    pub fn combinators(&self) -> Vec<Combinator> {
        self.dependency().combinators.clone()
    }

    /// Source span of the directive
    pub fn location(&self) -> Option<SourceLocation> {
        self.dependency().location.clone()
    }

    /// Annotation constants on the directive, as runtime values
    pub fn metadata(&self) -> Vec<Value> {
        self.dependency()
            .metadata
            .iter()
            .map(Value::from_const)
            .collect()
    }
}

impl PartialEq for LibraryDependencyMirror {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cx, &other.cx) && self.library == other.library && self.index == other.index
    }
}

impl Eq for LibraryDependencyMirror {}

impl std::fmt::Debug for LibraryDependencyMirror {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibraryDependencyMirror")
            .field("library", &self.library)
            .field("index", &self.index)
            .finish()
    }
}
