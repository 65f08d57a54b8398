//! Classes and objects.
//!
//! Classes are live, shared definitions: superclass lists hold `Rc`s to the
//! parent classes and member maps are mutated in place, so every subclass
//! and instance sees later changes made through the class.
//!
//! Resolution order is leftmost-first depth-first over the superclass list.

use std::cell::RefCell;
use std::fmt;
use std::ptr;
use std::rc::Rc;

use pith_ir::Name;
use rustc_hash::FxHashMap;

use super::Value;

/// Shared class handle.
pub type ClassRef = Rc<ClassValue>;

/// Shared object handle.
pub type ObjectRef = Rc<ObjectValue>;

/// Member table of a class or attribute table of an object.
pub type Members = FxHashMap<Name, Value>;

/// A class definition.
pub struct ClassValue {
    name: Name,
    members: RefCell<Members>,
    supers: Vec<ClassRef>,
}

impl ClassValue {
    pub fn new(name: Name, members: Members, supers: Vec<ClassRef>) -> ClassRef {
        Rc::new(ClassValue {
            name,
            members: RefCell::new(members),
            supers,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Direct superclasses in declaration order.
    #[inline]
    pub fn supers(&self) -> &[ClassRef] {
        &self.supers
    }

    /// Member defined on this class itself.
    pub fn own_member(&self, name: &str) -> Option<Value> {
        self.members.borrow().get(name).cloned()
    }

    pub fn set_member(&self, name: Name, value: Value) {
        self.members.borrow_mut().insert(name, value);
    }

    /// Resolve a member through this class and its superclasses.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.own_member(name)
            .or_else(|| self.supers.iter().find_map(|sup| sup.lookup(name)))
    }

    /// Whether `other` is this class or one of its ancestors.
    pub fn is_subclass_of(&self, other: &ClassValue) -> bool {
        ptr::eq(self, other) || self.supers.iter().any(|sup| sup.is_subclass_of(other))
    }

    /// Build a new instance.
    ///
    /// Non-function members are copied from the superclasses (visited in
    /// reverse order, so the leftmost wins) and then from the class itself.
    /// Methods stay on the class.
    pub fn create_object(class: &ClassRef) -> ObjectRef {
        fn collect_fields(class: &ClassValue, fields: &mut Members) {
            for sup in class.supers.iter().rev() {
                collect_fields(sup, fields);
            }
            for (name, value) in class.members.borrow().iter() {
                if !value.is_function() {
                    fields.insert(Name::clone(name), value.clone());
                }
            }
        }

        let mut fields = Members::default();
        collect_fields(class, &mut fields);
        tracing::trace!(class = %class.name, fields = fields.len(), "created object");
        Rc::new(ObjectValue {
            class: Rc::clone(class),
            attrs: RefCell::new(fields),
        })
    }
}

impl fmt::Debug for ClassValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassValue")
            .field("name", &self.name)
            .field(
                "supers",
                &self.supers.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

/// An instance of a class.
pub struct ObjectValue {
    class: ClassRef,
    attrs: RefCell<Members>,
}

impl ObjectValue {
    #[inline]
    pub fn class(&self) -> &ClassRef {
        &self.class
    }

    /// Attribute stored on the instance itself.
    pub fn get_attr(&self, name: &str) -> Option<Value> {
        self.attrs.borrow().get(name).cloned()
    }

    pub fn set_attr(&self, name: Name, value: Value) {
        self.attrs.borrow_mut().insert(name, value);
    }

    /// Whether the object's class is `class` or derives from it.
    pub fn is_instance_of(&self, class: &ClassValue) -> bool {
        self.class.is_subclass_of(class)
    }
}

impl fmt::Debug for ObjectValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectValue")
            .field("class", &self.class.name())
            .finish_non_exhaustive()
    }
}
