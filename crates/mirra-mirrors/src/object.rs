//! Live object store
//!
//! Reflectively constructed instances are plain field records behind a
//! shared single-threaded cell. The mirror layer is synchronous by contract,
//! so no locking is involved; identity is the `Rc` allocation.

use crate::value::Value;
use mirra_model::EntityId;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Field storage of one live instance
#[derive(Debug)]
pub struct ObjectData {
    /// The runtime class of the instance
    pub class: EntityId,
    /// Field values, keyed by field simple name
    pub fields: FxHashMap<String, Value>,
}

/// Shared reference to a live instance
#[derive(Clone)]
pub struct ObjectRef(Rc<RefCell<ObjectData>>);

impl ObjectRef {
    /// Allocate an instance of `class` with all listed fields set to null
    pub fn new(class: EntityId, field_names: impl IntoIterator<Item = String>) -> Self {
        let fields = field_names
            .into_iter()
            .map(|name| (name, Value::Null))
            .collect();
        ObjectRef(Rc::new(RefCell::new(ObjectData { class, fields })))
    }

    /// The runtime class of the instance
    pub fn class_id(&self) -> EntityId {
        self.0.borrow().class
    }

    /// Read a field by name
    pub fn get_field(&self, name: &str) -> Option<Value> {
        self.0.borrow().fields.get(name).cloned()
    }

    /// Write a field by name
    pub fn set_field(&self, name: &str, value: Value) -> Result<(), String> {
        let mut data = self.0.borrow_mut();
        match data.fields.get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(format!("unknown field '{}'", name)),
        }
    }

    /// Number of fields
    pub fn field_count(&self) -> usize {
        self.0.borrow().fields.len()
    }

    /// Reference identity
    pub fn ptr_eq(a: &ObjectRef, b: &ObjectRef) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    #[cfg(test)]
    pub(crate) fn new_raw() -> Self {
        ObjectRef::new(EntityId::from_raw(0), Vec::new())
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        f.debug_struct("ObjectRef")
            .field("class", &data.class)
            .field("fields", &data.fields)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_default_to_null() {
        let obj = ObjectRef::new(EntityId::from_raw(0), vec!["x".to_string(), "y".to_string()]);
        assert_eq!(obj.field_count(), 2);
        assert_eq!(obj.get_field("x"), Some(Value::Null));
        assert_eq!(obj.get_field("missing"), None);
    }

    #[test]
    fn test_set_and_get_field() {
        let obj = ObjectRef::new(EntityId::from_raw(0), vec!["x".to_string()]);
        obj.set_field("x", Value::Int(5)).unwrap();
        assert_eq!(obj.get_field("x"), Some(Value::Int(5)));
        assert!(obj.set_field("y", Value::Null).is_err());
    }

    #[test]
    fn test_shared_mutation_visible_through_clones() {
        let obj = ObjectRef::new(EntityId::from_raw(0), vec!["x".to_string()]);
        let alias = obj.clone();
        alias.set_field("x", Value::Int(9)).unwrap();
        assert_eq!(obj.get_field("x"), Some(Value::Int(9)));
        assert!(ObjectRef::ptr_eq(&obj, &alias));
    }
}
